//! MaxMind GeoIP2/GeoLite2 数据库实现
//!
//! 只解码我们需要的四个字段，比解码完整的 City 记录更快。

use std::net::IpAddr;
use std::path::Path;

use chrono::{DateTime, Utc};
use maxminddb::Reader;
use serde::Deserialize;
use tracing::trace;

use super::provider::{GeoOracle, OracleError};
use super::GeoLocation;

/// 数据库中的最小记录结构
#[derive(Deserialize, Default)]
struct MinimalRecord {
    #[serde(default)]
    country: CountryRecord,
    #[serde(default)]
    location: LocationRecord,
}

#[derive(Deserialize, Default)]
struct CountryRecord {
    #[serde(default)]
    iso_code: Option<String>,
}

#[derive(Deserialize, Default)]
struct LocationRecord {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    accuracy_radius: Option<u16>,
}

impl From<MinimalRecord> for GeoLocation {
    fn from(record: MinimalRecord) -> Self {
        GeoLocation {
            country_iso_code: record.country.iso_code.unwrap_or_default(),
            latitude: record.location.latitude.unwrap_or_default(),
            longitude: record.location.longitude.unwrap_or_default(),
            accuracy_radius_km: u32::from(record.location.accuracy_radius.unwrap_or_default()),
        }
    }
}

/// 数据库元信息（启动日志用）
#[derive(Debug, Clone)]
pub struct DatabaseMetadata {
    pub database_type: String,
    pub node_count: u32,
    pub ip_version: u16,
    pub build_time: Option<DateTime<Utc>>,
}

/// MaxMind GeoIP Oracle
pub struct MaxMindOracle {
    reader: Reader<Vec<u8>>,
}

impl MaxMindOracle {
    /// 从文件路径打开数据库（整个文件读入内存）
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self { reader })
    }

    pub fn metadata(&self) -> DatabaseMetadata {
        let meta = &self.reader.metadata;
        DatabaseMetadata {
            database_type: meta.database_type.clone(),
            node_count: meta.node_count,
            ip_version: meta.ip_version,
            build_time: i64::try_from(meta.build_epoch)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

impl GeoOracle for MaxMindOracle {
    fn lookup(&self, ip: IpAddr) -> Result<GeoLocation, OracleError> {
        let result = self
            .reader
            .lookup(ip)
            .map_err(|e| OracleError::Database(e.to_string()))?;

        // 未命中时 decode 返回 Ok(None)，需要自己转换成 NotFound
        let record = result
            .decode::<MinimalRecord>()
            .map_err(|e| OracleError::Database(e.to_string()))?
            .ok_or(OracleError::NotFound(ip))?;

        let location = GeoLocation::from(record);
        trace!(
            "MaxMind lookup for {}: country={:?}, radius={}",
            ip, location.country_iso_code, location.accuracy_radius_km
        );
        Ok(location)
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
