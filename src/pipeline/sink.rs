use std::sync::Arc;

use bytes::Bytes;

use crate::cache::ResponseCache;
use crate::codec::{Codec, CodecError, ENCODED_SIZE_HINT};
use crate::pool::BufferPool;
use crate::services::geoip::GeoLocation;

/// 编码结果的去向，二者只取其一
pub(super) enum Sink<'a> {
    /// 写入缓存，响应体与缓存条目共享同一块内存
    Cache(&'a dyn ResponseCache),
    /// 借用池中的缓冲区，响应发送完毕后归还
    Pool(&'a Arc<BufferPool>),
}

impl Sink<'_> {
    pub(super) fn write(
        &self,
        key: &str,
        codec: Codec,
        location: &GeoLocation,
    ) -> Result<Bytes, CodecError> {
        match self {
            Sink::Cache(cache) => {
                let mut out = Vec::with_capacity(ENCODED_SIZE_HINT);
                codec.encode_into(location, &mut out)?;
                // 缓存按字节计费，只保留恰好大小的分配
                out.shrink_to_fit();
                let body = Bytes::from(out);
                cache.put(key, body.clone());
                Ok(body)
            }
            Sink::Pool(pool) => {
                // 编码失败时 buf 在此处被释放，缓冲区回到池中
                let mut buf = pool.acquire();
                codec.encode_into(location, buf.as_mut_vec())?;
                Ok(buf.into_body())
            }
        }
    }
}
