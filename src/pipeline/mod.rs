//! 查询流水线
//!
//! ParseInput → CacheCheck → OracleLookup → Encode → Sink。
//! 与 HTTP 框架无关：输入是请求中的 IP 文本，输出是响应体或 [`LookupError`]。
//! 整个流程是同步的，不跨 await 点。

mod error;
mod input;
mod sink;

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, trace};

use crate::cache::ResponseCache;
use crate::codec::Codec;
use crate::pool::BufferPool;
use crate::services::geoip::GeoOracle;

pub use error::LookupError;
pub use input::{InputSource, parse_ip};
use sink::Sink;

pub struct LookupPipeline {
    oracle: Arc<dyn GeoOracle>,
    cache: Option<Arc<dyn ResponseCache>>,
    pool: Arc<BufferPool>,
    codec: Codec,
}

impl LookupPipeline {
    pub fn new(
        oracle: Arc<dyn GeoOracle>,
        cache: Option<Arc<dyn ResponseCache>>,
        pool: Arc<BufferPool>,
        codec: Codec,
    ) -> Self {
        Self {
            oracle,
            cache,
            pool,
            codec,
        }
    }

    /// 处理一次查询，返回序列化好的响应体
    pub fn handle(&self, ip_text: &str) -> Result<Bytes, LookupError> {
        let ip = parse_ip(ip_text)?;

        if let Some(cache) = self.cache.as_deref() {
            if let Some(body) = cache.get(ip_text) {
                trace!("Cache hit for {}", ip_text);
                return Ok(body);
            }
            trace!("Cache miss for {}", ip_text);
        }

        let location = self.oracle.lookup(ip).map_err(|e| {
            trace!("Lookup failed for {}: {}", ip, e);
            LookupError::LookupFailed(e.to_string())
        })?;

        let sink = match self.cache.as_deref() {
            Some(cache) => Sink::Cache(cache),
            None => Sink::Pool(&self.pool),
        };

        sink.write(ip_text, self.codec, &location).map_err(|e| {
            error!("Failed to encode location for {}: {}", ip, e);
            LookupError::EncodeFailure(e.message().to_string())
        })
    }

    pub fn cache(&self) -> Option<&Arc<dyn ResponseCache>> {
        self.cache.as_ref()
    }

    pub fn oracle(&self) -> &Arc<dyn GeoOracle> {
        &self.oracle
    }
}
