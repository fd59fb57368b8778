//! 地理位置记录

/// 一次查询得到的精简地理位置
///
/// 字段总是同时存在：数据库中缺失的字段以零值填充（空字符串 / 0），
/// 不会出现“部分记录”。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoLocation {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "SE", "JP")，未知时为空
    pub country_iso_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 精度半径（公里），67% 置信度下用户位于该半径范围内
    pub accuracy_radius_km: u32,
}

impl GeoLocation {
    pub fn new(
        country_iso_code: impl Into<String>,
        latitude: f64,
        longitude: f64,
        accuracy_radius_km: u32,
    ) -> Self {
        Self {
            country_iso_code: country_iso_code.into(),
            latitude,
            longitude,
            accuracy_radius_km,
        }
    }
}
