use std::time::Duration;

use bytes::Bytes;
use moka::sync::Cache;
use tracing::{debug, trace};

use super::sweeper::Sweeper;
use super::traits::{ResponseCache, entry_weight};

/// TTL 策略缓存
///
/// 每个条目在插入后 `ttl` 过期。过期被双重保证：
/// - 读取时 moka 会检查过期时间，已过期但尚未清扫的条目视为未命中
/// - 后台线程按 `cleanup_interval` 定期调用 `run_pending_tasks` 回收过期条目
///
/// moka 内部按段加锁，清扫不会持有整个缓存的锁。
pub struct TtlCache {
    inner: Cache<String, Bytes>,
    sweeper: Sweeper,
}

impl TtlCache {
    pub fn new(ttl: Duration, cleanup_interval: Duration) -> Self {
        let inner: Cache<String, Bytes> = Cache::builder()
            .time_to_live(ttl)
            .weigher(|key: &String, value: &Bytes| {
                u32::try_from(entry_weight(key, value)).unwrap_or(u32::MAX)
            })
            .build();

        let sweep_target = inner.clone();
        let sweeper = Sweeper::spawn("ipgeo-ttl-sweeper", cleanup_interval, move || {
            sweep_target.run_pending_tasks();
            trace!(
                "TTL cache sweep finished, {} entries remain",
                sweep_target.entry_count()
            );
        });

        debug!(
            "TtlCache initialized with TTL: {:?}, cleanup interval: {:?}",
            ttl, cleanup_interval
        );
        Self { inner, sweeper }
    }

    /// 立即执行一次清扫（测试、关闭前统计用）
    pub fn sweep(&self) {
        self.inner.run_pending_tasks();
    }
}

impl ResponseCache for TtlCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: Bytes) {
        self.inner.insert(key.to_string(), value);
    }

    fn close(&self) {
        self.sweeper.stop();
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn weighted_size(&self) -> u64 {
        self.inner.weighted_size()
    }

    fn policy_name(&self) -> &'static str {
        "ttl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn body(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn test_put_then_get() {
        let cache = TtlCache::new(Duration::from_secs(60), Duration::from_secs(60));
        cache.put("8.8.8.8", body("{\"a\":1}"));
        assert_eq!(cache.get("8.8.8.8"), Some(body("{\"a\":1}")));
        assert!(cache.get("8.8.4.4").is_none());
        cache.close();
    }

    #[test]
    fn test_hit_before_ttl_and_miss_after() {
        // 清扫间隔远大于 TTL，确保过期由读路径判断
        let ttl = Duration::from_millis(300);
        let cache = TtlCache::new(ttl, Duration::from_secs(3600));
        cache.put("1.1.1.1", body("x"));

        thread::sleep(Duration::from_millis(100));
        assert!(cache.get("1.1.1.1").is_some(), "entry should still be live");

        thread::sleep(Duration::from_millis(400));
        assert!(cache.get("1.1.1.1").is_none(), "entry should have expired");
        cache.close();
    }

    #[test]
    fn test_background_sweep_reclaims_expired_entries() {
        let cache = TtlCache::new(Duration::from_millis(50), Duration::from_millis(20));
        for i in 0..100 {
            cache.put(&format!("10.0.0.{}", i), body("payload"));
        }
        cache.sweep();
        assert_eq!(cache.entry_count(), 100);

        thread::sleep(Duration::from_millis(400));
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.weighted_size(), 0);
        cache.close();
    }

    #[test]
    fn test_weighted_size_counts_key_and_value() {
        let cache = TtlCache::new(Duration::from_secs(60), Duration::from_secs(60));
        cache.put("8.8.8.8", body("12345"));
        cache.sweep();
        assert_eq!(cache.weighted_size(), ("8.8.8.8".len() + 5) as u64);
        cache.close();
    }

    #[test]
    fn test_concurrent_disjoint_keys() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60), Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = format!("{}.{}", t, i);
                        let value = Bytes::from(key.clone().into_bytes());
                        cache.put(&key, value.clone());
                        assert_eq!(cache.get(&key), Some(value));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        cache.sweep();
        assert_eq!(cache.entry_count(), 8 * 500);
        cache.close();
    }
}
