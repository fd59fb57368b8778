//! 查询结果编解码
//!
//! 两条编码路径对同一输入产生逐字节相同的 JSON：
//! - [`Codec::Generic`]：serde_json 结构化序列化，作为正确性基准
//! - [`Codec::Specialized`]：手写的字节拼接，热路径（缓存未命中）使用
//!
//! 两者的等价性由属性测试保证，而不是靠约定。

mod fast;
mod wire;

use std::fmt;

use crate::services::geoip::GeoLocation;

/// 一次编码结果的典型长度，用于预分配
pub const ENCODED_SIZE_HINT: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    Generic,
    #[default]
    Specialized,
}

/// 编码失败
///
/// 对合法的 [`GeoLocation`] 不应发生。
#[derive(Debug, Clone, PartialEq)]
pub struct CodecError(String);

impl CodecError {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CodecError {}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError(err.to_string())
    }
}

impl Codec {
    /// 追加编码结果到 `out`
    ///
    /// 失败时 `out` 会被截断回调用前的长度，不会留下半截 JSON。
    pub fn encode_into(self, location: &GeoLocation, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let start = out.len();
        let result = match self {
            Codec::Generic => wire::encode_into(location, out),
            Codec::Specialized => fast::encode_into(location, out),
        };
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    pub fn encode(self, location: &GeoLocation) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(ENCODED_SIZE_HINT);
        self.encode_into(location, &mut out)?;
        Ok(out)
    }

    /// 从响应体解码（客户端 / 测试用）
    pub fn decode(bytes: &[u8]) -> Result<GeoLocation, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
