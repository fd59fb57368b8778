//! GeoIP 查询抽象层
//!
//! 数据库被视为只读的键值“预言机”：给定一个已校验的 IP，返回一条
//! [`GeoLocation`]，或者一个可区分的 [`OracleError`]。

use std::fmt;
use std::net::IpAddr;

use super::GeoLocation;

/// 查询失败原因
///
/// `NotFound` 是预期内的结果（数据库中没有该网段），与数据库本身的故障分开，
/// 以便上层选择不同的处理方式。
#[derive(Debug, Clone, PartialEq)]
pub enum OracleError {
    NotFound(IpAddr),
    Database(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::NotFound(ip) => write!(f, "no match for {} found in database", ip),
            OracleError::Database(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for OracleError {}

/// GeoIP 查询 trait
///
/// 实现必须是只读的，可以被任意多个线程并发调用。输入由调用方预先校验，
/// 实现不再做校验；任何失败都必须以 `Err` 返回，不能映射成零值成功。
pub trait GeoOracle: Send + Sync {
    /// 查询 IP 地址的地理位置（阻塞调用）
    fn lookup(&self, ip: IpAddr) -> Result<GeoLocation, OracleError>;

    /// 获取实现名称（用于日志）
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = OracleError::NotFound("127.0.0.1".parse().unwrap());
        assert_eq!(err.to_string(), "no match for 127.0.0.1 found in database");
    }

    #[test]
    fn test_not_found_message_ipv6_is_canonical() {
        let err = OracleError::NotFound("2001:db8:0000::1".parse().unwrap());
        assert_eq!(err.to_string(), "no match for 2001:db8::1 found in database");
    }

    #[test]
    fn test_database_message_passthrough() {
        let err = OracleError::Database("invalid search tree".to_string());
        assert_eq!(err.to_string(), "invalid search tree");
    }
}
