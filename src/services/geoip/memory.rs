//! 内存表 GeoIP 实现
//!
//! 不依赖数据库文件，主要用于测试和基准；同时统计查询次数，便于验证缓存命中。

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::provider::{GeoOracle, OracleError};
use super::GeoLocation;

#[derive(Default)]
pub struct StaticOracle {
    records: HashMap<IpAddr, GeoLocation>,
    failure: Option<String>,
    calls: AtomicU64,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一条记录
    pub fn with_record(mut self, ip: IpAddr, location: GeoLocation) -> Self {
        self.records.insert(ip, location);
        self
    }

    /// 让所有查询都以数据库错误失败
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// 到目前为止的查询次数
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl GeoOracle for StaticOracle {
    fn lookup(&self, ip: IpAddr) -> Result<GeoLocation, OracleError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(ref msg) = self.failure {
            return Err(OracleError::Database(msg.clone()));
        }

        self.records
            .get(&ip)
            .cloned()
            .ok_or(OracleError::NotFound(ip))
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}
