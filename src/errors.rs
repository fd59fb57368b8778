use std::fmt;

/// 启动阶段错误（配置、数据库、监听等）
///
/// 请求路径上的错误见 [`crate::pipeline::LookupError`]，它们在 HTTP 边界处
/// 被转换为响应，不会传播到这里。
#[derive(Debug, Clone)]
pub enum IpGeoError {
    Config(String),
    DatabaseOpen(String),
    FileOperation(String),
    Serialization(String),
    Logging(String),
    Bind(String),
}

impl IpGeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            IpGeoError::Config(_) => "E001",
            IpGeoError::DatabaseOpen(_) => "E002",
            IpGeoError::FileOperation(_) => "E003",
            IpGeoError::Serialization(_) => "E004",
            IpGeoError::Logging(_) => "E005",
            IpGeoError::Bind(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            IpGeoError::Config(_) => "Configuration Error",
            IpGeoError::DatabaseOpen(_) => "Database Open Error",
            IpGeoError::FileOperation(_) => "File Operation Error",
            IpGeoError::Serialization(_) => "Serialization Error",
            IpGeoError::Logging(_) => "Logging Setup Error",
            IpGeoError::Bind(_) => "Listener Bind Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            IpGeoError::Config(msg)
            | IpGeoError::DatabaseOpen(msg)
            | IpGeoError::FileOperation(msg)
            | IpGeoError::Serialization(msg)
            | IpGeoError::Logging(msg)
            | IpGeoError::Bind(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for IpGeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for IpGeoError {}

// 便捷的构造函数
impl IpGeoError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Config(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        IpGeoError::DatabaseOpen(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        IpGeoError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Serialization(msg.into())
    }

    pub fn logging<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Logging(msg.into())
    }

    pub fn bind<T: Into<String>>(msg: T) -> Self {
        IpGeoError::Bind(msg.into())
    }
}

impl From<std::io::Error> for IpGeoError {
    fn from(err: std::io::Error) -> Self {
        IpGeoError::FileOperation(err.to_string())
    }
}

impl From<config::ConfigError> for IpGeoError {
    fn from(err: config::ConfigError) -> Self {
        IpGeoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for IpGeoError {
    fn from(err: toml::ser::Error) -> Self {
        IpGeoError::Serialization(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for IpGeoError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        IpGeoError::DatabaseOpen(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, IpGeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            IpGeoError::config("a"),
            IpGeoError::database_open("b"),
            IpGeoError::file_operation("c"),
            IpGeoError::serialization("d"),
            IpGeoError::logging("e"),
            IpGeoError::bind("f"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = IpGeoError::database_open("GeoLite2-City.mmdb: No such file");
        assert_eq!(
            err.to_string(),
            "Database Open Error: GeoLite2-City.mmdb: No such file"
        );
        assert_eq!(err.message(), "GeoLite2-City.mmdb: No such file");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: IpGeoError = io.into();
        assert!(matches!(err, IpGeoError::FileOperation(_)));
    }
}
