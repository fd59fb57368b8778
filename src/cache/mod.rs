//! 响应缓存
//!
//! 以请求中的原始 IP 文本为键，缓存序列化好的响应体。两种互斥策略：
//! - [`TtlCache`]：固定 TTL，读时惰性判过期 + 后台定时清扫
//! - [`SizedCache`]：字节上限，按分片 FIFO 淘汰，同时带较长的 TTL
//!
//! 禁用缓存时不构造任何缓存对象（`None`）。策略、容量与 TTL 在构造时固定，
//! 切换策略需要重新构造一个新实例。

pub mod sized;
mod sweeper;
pub mod traits;
pub mod ttl;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use sized::SizedCache;
pub use traits::{ResponseCache, entry_weight};
pub use ttl::TtlCache;

/// 缓存策略（构造时确定）
#[derive(Debug, Clone, PartialEq)]
pub enum CachePolicy {
    Disabled,
    Ttl {
        ttl: Duration,
        cleanup_interval: Duration,
    },
    SizeBound {
        max_bytes: u64,
        ttl: Duration,
        cleanup_interval: Duration,
        shards: usize,
    },
}

/// 根据策略构造缓存，`Disabled` 返回 `None`
pub fn create_response_cache(policy: &CachePolicy) -> Option<Arc<dyn ResponseCache>> {
    let cache: Arc<dyn ResponseCache> = match *policy {
        CachePolicy::Disabled => {
            info!("Response cache disabled");
            return None;
        }
        CachePolicy::Ttl {
            ttl,
            cleanup_interval,
        } => Arc::new(TtlCache::new(ttl, cleanup_interval)),
        CachePolicy::SizeBound {
            max_bytes,
            ttl,
            cleanup_interval,
            shards,
        } => Arc::new(SizedCache::new(max_bytes, ttl, cleanup_interval, shards)),
    };

    info!("Response cache initialized with {} policy", cache.policy_name());
    Some(cache)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_disabled_builds_nothing() {
        assert!(create_response_cache(&CachePolicy::Disabled).is_none());
    }

    #[test]
    fn test_policies_share_put_get_contract() {
        let policies = [
            CachePolicy::Ttl {
                ttl: Duration::from_secs(60),
                cleanup_interval: Duration::from_secs(60),
            },
            CachePolicy::SizeBound {
                max_bytes: 1024 * 1024,
                ttl: Duration::from_secs(60),
                cleanup_interval: Duration::from_secs(60),
                shards: 4,
            },
        ];

        for policy in &policies {
            let cache = create_response_cache(policy).unwrap();
            let body = Bytes::from_static(br#"{"country":{"iso_code":"SE"}}"#);

            assert!(cache.get("89.160.20.112").is_none());
            cache.put("89.160.20.112", body.clone());
            assert_eq!(cache.get("89.160.20.112"), Some(body.clone()));
            // 重复读取返回相同字节
            assert_eq!(cache.get("89.160.20.112"), Some(body));

            // 覆盖而不是合并
            let replaced = Bytes::from_static(b"{}");
            cache.put("89.160.20.112", replaced.clone());
            assert_eq!(cache.get("89.160.20.112"), Some(replaced));

            cache.close();
        }
    }

    #[test]
    fn test_textual_variants_are_distinct_keys() {
        let cache = create_response_cache(&CachePolicy::SizeBound {
            max_bytes: 1024 * 1024,
            ttl: Duration::from_secs(60),
            cleanup_interval: Duration::from_secs(60),
            shards: 2,
        })
        .unwrap();

        cache.put("::1", Bytes::from_static(b"a"));
        assert!(cache.get("[::1]").is_none());
        assert!(cache.get("0:0:0:0:0:0:0:1").is_none());
        cache.close();
    }
}
