use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LookupError;

/// IP 文本的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// `?ip=<addr>`
    #[default]
    Query,
    /// `/<addr>`
    Path,
}

impl FromStr for InputSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(InputSource::Query),
            "path" => Ok(InputSource::Path),
            other => Err(format!(
                "invalid input source '{}', expected 'query' or 'path'",
                other
            )),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Query => write!(f, "query"),
            InputSource::Path => write!(f, "path"),
        }
    }
}

/// 解析请求中的 IP 文本
///
/// 先判空再解析，空字符串永远是 `MissingInput` 而不是 `InvalidInput`。
#[inline]
pub fn parse_ip(text: &str) -> Result<IpAddr, LookupError> {
    if text.is_empty() {
        return Err(LookupError::MissingInput);
    }
    IpAddr::from_str(text).map_err(|_| LookupError::InvalidInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip(""), Err(LookupError::MissingInput));
        assert_eq!(parse_ip("not-an-ip"), Err(LookupError::InvalidInput));
        assert_eq!(parse_ip("[::1]"), Err(LookupError::InvalidInput));
        assert_eq!(parse_ip(" 8.8.8.8"), Err(LookupError::InvalidInput));
        assert!(parse_ip("8.8.8.8").unwrap().is_ipv4());
        assert!(parse_ip("2001:db8::1").unwrap().is_ipv6());
    }

    #[test]
    fn test_input_source_from_str() {
        assert_eq!("query".parse::<InputSource>(), Ok(InputSource::Query));
        assert_eq!("PATH".parse::<InputSource>(), Ok(InputSource::Path));
        assert!("header".parse::<InputSource>().is_err());
        assert_eq!(InputSource::Path.to_string(), "path");
    }
}
