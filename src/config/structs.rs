use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::cache::CachePolicy;
use crate::errors::{IpGeoError, Result};
use crate::pipeline::InputSource;
use crate::pool;

/// 应用配置
///
/// 启动时构造一次，之后以只读方式传递给各组件。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub buffer_pool: BufferPoolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > 配置文件 > 默认值
    /// ENV 前缀：IPGEO，分隔符：__
    /// 示例：IPGEO__SERVER__PORT=9999
    ///
    /// 未指定 `path` 时读取当前目录的 `config.toml`（可不存在）；
    /// 显式指定的文件必须存在。
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let (file, required) = match path {
            Some(p) => (p, true),
            None => (defaults::CONFIG_FILE, false),
        };

        let settings = Config::builder()
            .add_source(File::with_name(file).required(required))
            .add_source(
                Environment::with_prefix(defaults::ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<()> {
        if self.server.workers == 0 {
            return Err(IpGeoError::config("server.workers must be at least 1"));
        }
        if self.database.path.is_empty() {
            return Err(IpGeoError::config("database.path must not be empty"));
        }
        if self.buffer_pool.initial_capacity == 0 {
            return Err(IpGeoError::config(
                "buffer_pool.initial_capacity must be greater than 0",
            ));
        }
        match self.logging.format.as_str() {
            "text" | "json" => {}
            other => {
                return Err(IpGeoError::config(format!(
                    "invalid logging.format '{}', expected 'text' or 'json'",
                    other
                )));
            }
        }
        self.cache.policy()?;
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// HTTP worker 线程数，默认为 CPU 核数
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// GeoIP 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// MaxMind GeoIP2 / GeoLite2 City 数据库路径
    #[serde(default = "default_database_path")]
    pub path: String,
}

/// 缓存模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    Disabled,
    #[default]
    Ttl,
    Size,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Ttl => write!(f, "ttl"),
            Self::Size => write!(f, "size"),
        }
    }
}

impl FromStr for CacheMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            "ttl" => Ok(Self::Ttl),
            "size" => Ok(Self::Size),
            _ => Err(format!(
                "Invalid cache mode: '{}'. Valid: disabled, ttl, size",
                s
            )),
        }
    }
}

/// 响应缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub mode: CacheMode,
    /// TTL 模式下的存活时间（秒）
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// 后台清扫间隔（秒），两种模式共用
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// size 模式下的内存上限（MB）
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,
    /// size 模式下的存活时间（秒）
    #[serde(default = "default_size_ttl_secs")]
    pub size_ttl_secs: u64,
    /// size 模式下的分片数（向上取整到 2 的幂）
    #[serde(default = "default_shards")]
    pub shards: usize,
}

impl CacheConfig {
    /// 转换为缓存策略，同时检查取值
    pub fn policy(&self) -> Result<CachePolicy> {
        let non_zero = |value: u64, name: &str| -> Result<Duration> {
            if value == 0 {
                Err(IpGeoError::config(format!(
                    "cache.{} must be greater than 0",
                    name
                )))
            } else {
                Ok(Duration::from_secs(value))
            }
        };

        match self.mode {
            CacheMode::Disabled => Ok(CachePolicy::Disabled),
            CacheMode::Ttl => Ok(CachePolicy::Ttl {
                ttl: non_zero(self.ttl_secs, "ttl_secs")?,
                cleanup_interval: non_zero(self.cleanup_interval_secs, "cleanup_interval_secs")?,
            }),
            CacheMode::Size => {
                if self.max_size_mb == 0 {
                    return Err(IpGeoError::config(
                        "cache.max_size_mb must be greater than 0, use mode = \"disabled\" to turn caching off",
                    ));
                }
                let max_bytes = self.max_size_mb.checked_mul(1024 * 1024).ok_or_else(|| {
                    IpGeoError::config(format!("cache.max_size_mb {} is too large", self.max_size_mb))
                })?;
                Ok(CachePolicy::SizeBound {
                    max_bytes,
                    ttl: non_zero(self.size_ttl_secs, "size_ttl_secs")?,
                    cleanup_interval: non_zero(self.cleanup_interval_secs, "cleanup_interval_secs")?,
                    shards: self.shards.max(1),
                })
            }
        }
    }
}

/// HTTP 响应配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// `Access-Control-Allow-Origin` 的值，空字符串表示不发送
    #[serde(default = "default_origin_policy")]
    pub origin_policy: String,
    /// IP 从 `?ip=` 还是路径中读取
    #[serde(default)]
    pub input: InputSource,
    /// 成功响应是否带 `Last-Modified`（进程启动时间）
    #[serde(default = "default_true")]
    pub last_modified: bool,
    /// 记录每个请求（高负载下影响性能）
    #[serde(default)]
    pub access_log: bool,
}

/// 响应缓冲区池配置（仅在缓存关闭时使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferPoolConfig {
    #[serde(default = "default_max_pooled")]
    pub max_pooled: usize,
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// text 或 json
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    defaults::SERVER_HOST.to_string()
}

fn default_server_port() -> u16 {
    defaults::SERVER_PORT
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_database_path() -> String {
    defaults::DATABASE_PATH.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    defaults::CACHE_TTL.as_secs()
}

fn default_cleanup_interval_secs() -> u64 {
    defaults::CACHE_CLEANUP_INTERVAL.as_secs()
}

fn default_max_size_mb() -> u64 {
    defaults::CACHE_MAX_SIZE_MB
}

fn default_size_ttl_secs() -> u64 {
    defaults::CACHE_SIZE_TTL.as_secs()
}

fn default_shards() -> usize {
    defaults::CACHE_SHARDS
}

fn default_origin_policy() -> String {
    defaults::ORIGIN_POLICY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_pooled() -> usize {
    pool::DEFAULT_MAX_POOLED
}

fn default_initial_capacity() -> usize {
    pool::DEFAULT_INITIAL_CAPACITY
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

fn default_log_format() -> String {
    defaults::LOG_FORMAT.to_string()
}

fn default_max_backups() -> u32 {
    defaults::LOG_MAX_BACKUPS
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::default(),
            ttl_secs: default_cache_ttl_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            max_size_mb: default_max_size_mb(),
            size_ttl_secs: default_size_ttl_secs(),
            shards: default_shards(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            origin_policy: default_origin_policy(),
            input: InputSource::default(),
            last_modified: true,
            access_log: false,
        }
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            max_pooled: default_max_pooled(),
            initial_capacity: default_initial_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
