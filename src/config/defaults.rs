//! 默认配置值

use std::time::Duration;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "IPGEO";

pub const SERVER_HOST: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 9000;

pub const DATABASE_PATH: &str = "data/GeoLite2-City.mmdb";

/// TTL 策略下条目的存活时间
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// 后台清扫间隔
pub const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);
/// 字节上限策略的默认上限（MB）
pub const CACHE_MAX_SIZE_MB: u64 = 256;
/// 字节上限策略下条目的存活时间
pub const CACHE_SIZE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const CACHE_SHARDS: usize = 256;

pub const ORIGIN_POLICY: &str = "*";

pub const LOG_LEVEL: &str = "info";
pub const LOG_FORMAT: &str = "text";
pub const LOG_MAX_BACKUPS: u32 = 5;
