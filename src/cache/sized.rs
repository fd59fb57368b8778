//! 字节上限缓存
//!
//! 键空间按 xxh64 哈希分到若干分片，每个分片独立加锁，并拥有
//! `max_bytes / shards` 的字节预算（余数分给前几个分片）。插入时在分片内
//! 按插入顺序淘汰最早的条目直到放得下，淘汰与插入在同一把锁内同步完成，
//! 因此任何时刻总占用都不超过上限，没有宽限窗口。
//!
//! 占用按条目在堆上的实际开销计：键和值的字节数，加上键的引用计数头、
//! 哈希表槽位、插入顺序队列记录等簿记开销（见 `ENTRY_OVERHEAD`）。
//! 值应当是独占一块恰好大小的分配（流水线写缓存时就是这样构造的）。
//!
//! 条目同时带有较长的 TTL：读取时惰性判断，后台线程逐个分片清扫。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::{debug, trace};
use xxhash_rust::xxh64::xxh64;

use super::sweeper::Sweeper;
use super::traits::{ResponseCache, entry_weight};

/// 分片数上限
const MAX_SHARDS: usize = 1024;
/// 单个分片的最小预算，预算太小时减少分片数
const MIN_SHARD_BYTES: u64 = 64 * 1024;

/// 哈希表一个槽位：键、条目和一个控制字节
const SLOT_BYTES: usize = size_of::<(Arc<str>, Entry)>() + 1;
/// 插入顺序队列中的一条记录
const RECORD_BYTES: usize = size_of::<(Arc<str>, u64)>();
/// `Arc<str>` 的引用计数头，外加按 8 字节对齐的尾部填充
const KEY_HEADER_BYTES: usize = 3 * size_of::<usize>();
/// 值被 clone 后 `Bytes` 分配的共享头
const VALUE_HEADER_BYTES: usize = 4 * size_of::<usize>();

/// 哈希表按 2 的幂扩容、负载因子 7/8，槽位数不超过条目数的 16/7 倍；
/// 超过 5/2 倍容量时收缩，两者都在 3 倍以内
const SLOTS_PER_ENTRY: usize = 3;
/// order 长度不超过条目数的 1.5 倍（加常数），VecDeque 翻倍扩容后不超过 3 倍
const RECORDS_PER_ENTRY: usize = 3;

/// 每个条目除键、值字节外的开销
const ENTRY_OVERHEAD: usize = KEY_HEADER_BYTES
    + VALUE_HEADER_BYTES
    + SLOTS_PER_ENTRY * SLOT_BYTES
    + RECORDS_PER_ENTRY * RECORD_BYTES;

/// 容量相关的常数余量（条目数）
const SLACK_ENTRIES: usize = 16;

/// 每个分片预先扣除的固定开销：小表的最小分配、控制字节组尾部、
/// order 中常数级的失效记录
const SHARD_RESERVE: usize =
    2 * SLACK_ENTRIES * SLOT_BYTES + 2 * 16 + 2 * (SLACK_ENTRIES + 1) * RECORD_BYTES;

/// 条目计入分片预算的字节数
#[inline]
fn charged_weight(key: &str, value: &Bytes) -> usize {
    entry_weight(key, value) + ENTRY_OVERHEAD
}

struct Entry {
    value: Bytes,
    inserted_at: Instant,
    generation: u64,
    weight: usize,
}

#[derive(Default)]
struct Shard {
    /// 键只分配一次，map 与 order 共享
    map: HashMap<Arc<str>, Entry>,
    /// 插入顺序，(key, generation)；被覆盖或已删除的记录在出队时跳过
    order: VecDeque<(Arc<str>, u64)>,
    used: usize,
    capacity: usize,
    next_generation: u64,
}

impl Shard {
    fn with_budget(budget: usize) -> Self {
        Self {
            capacity: budget.saturating_sub(SHARD_RESERVE),
            ..Self::default()
        }
    }

    fn get(&self, key: &str, now: Instant, ttl: Duration) -> Option<Bytes> {
        let entry = self.map.get(key)?;
        if now.duration_since(entry.inserted_at) >= ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    /// 插入条目，返回被淘汰的条目数；条目超过分片预算时不收录
    fn insert(&mut self, key: &str, value: Bytes, now: Instant) -> Option<usize> {
        let weight = charged_weight(key, &value);

        // 覆盖语义：先移除旧值
        if let Some(old) = self.map.remove(key) {
            self.used -= old.weight;
        }

        if weight > self.capacity {
            self.shrink_if_sparse();
            return None;
        }

        let mut evicted = 0;
        while self.used + weight > self.capacity {
            if !self.evict_oldest() {
                break;
            }
            evicted += 1;
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let key: Arc<str> = Arc::from(key);
        self.map.insert(
            Arc::clone(&key),
            Entry {
                value,
                inserted_at: now,
                generation,
                weight,
            },
        );
        self.order.push_back((key, generation));
        self.used += weight;

        self.compact_order();
        self.shrink_if_sparse();
        Some(evicted)
    }

    fn evict_oldest(&mut self) -> bool {
        while let Some((key, generation)) = self.order.pop_front() {
            let live = self
                .map
                .get(&key)
                .is_some_and(|entry| entry.generation == generation);
            if live && let Some(entry) = self.map.remove(&key) {
                self.used -= entry.weight;
                return true;
            }
        }
        false
    }

    /// 覆盖写入会在 order 中留下失效记录，超过条目数一半时整理一次
    fn compact_order(&mut self) {
        let len = self.map.len();
        if self.order.len() <= len + len / 2 + SLACK_ENTRIES {
            return;
        }
        let map = &self.map;
        self.order.retain(|(key, generation)| {
            map.get(key)
                .is_some_and(|entry| entry.generation == *generation)
        });
    }

    /// 大量淘汰或过期之后，释放哈希表和队列多余的容量
    fn shrink_if_sparse(&mut self) {
        let len = self.map.len();
        if self.map.capacity() > len * 5 / 2 + SLACK_ENTRIES {
            self.map.shrink_to_fit();
        }
        if self.order.capacity() > len * RECORDS_PER_ENTRY + 2 * SLACK_ENTRIES {
            self.order.shrink_to_fit();
        }
    }

    fn purge_expired(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.map.len();
        let mut freed = 0;
        self.map.retain(|_, entry| {
            let keep = now.duration_since(entry.inserted_at) < ttl;
            if !keep {
                freed += entry.weight;
            }
            keep
        });
        self.used -= freed;
        self.compact_order();
        self.shrink_if_sparse();
        before - self.map.len()
    }
}

struct Shards {
    shards: Box<[RwLock<Shard>]>,
    ttl: Duration,
}

impl Shards {
    #[inline]
    fn shard(&self, key: &str) -> &RwLock<Shard> {
        let hash = xxh64(key.as_bytes(), 0) as usize;
        // 分片数总是 2 的幂
        &self.shards[hash & (self.shards.len() - 1)]
    }

    fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for shard in self.shards.iter() {
            // 每次只持有一个分片的锁
            let now = Instant::now();
            removed += shard.write().purge_expired(now, self.ttl);
        }
        removed
    }
}

/// 字节上限策略缓存
pub struct SizedCache {
    inner: Arc<Shards>,
    max_bytes: u64,
    sweeper: Sweeper,
}

impl SizedCache {
    pub fn new(max_bytes: u64, ttl: Duration, cleanup_interval: Duration, shards: usize) -> Self {
        let shard_count = Self::shard_count_for(max_bytes, shards);
        let shards = (0..shard_count)
            .map(|index| Self::shard_capacity_for(max_bytes, shard_count, index))
            .map(|budget| RwLock::new(Shard::with_budget(budget)))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let inner = Arc::new(Shards { shards, ttl });

        let sweep_target = Arc::clone(&inner);
        let sweeper = Sweeper::spawn("ipgeo-size-sweeper", cleanup_interval, move || {
            let removed = sweep_target.purge_expired();
            if removed > 0 {
                trace!("Sized cache sweep removed {} expired entries", removed);
            }
        });

        debug!(
            "SizedCache initialized with max size: {} bytes, {} shards, TTL: {:?}",
            max_bytes, shard_count, ttl
        );
        Self {
            inner,
            max_bytes,
            sweeper,
        }
    }

    /// 配置的字节上限
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn shard_count(&self) -> usize {
        self.inner.shards.len()
    }

    /// 立即清扫一次过期条目，返回删除数
    pub fn sweep(&self) -> usize {
        self.inner.purge_expired()
    }

    fn shard_count_for(max_bytes: u64, requested: usize) -> usize {
        let mut count = requested.clamp(1, MAX_SHARDS).next_power_of_two();
        while count > 1 && max_bytes / (count as u64) < MIN_SHARD_BYTES {
            count /= 2;
        }
        count
    }

    fn shard_capacity_for(total: u64, shards: usize, index: usize) -> usize {
        let base = total / shards as u64;
        let remainder = total % shards as u64;
        let capacity = base + u64::from((index as u64) < remainder);
        usize::try_from(capacity).unwrap_or(usize::MAX)
    }
}

impl ResponseCache for SizedCache {
    fn get(&self, key: &str) -> Option<Bytes> {
        self.inner
            .shard(key)
            .read()
            .get(key, Instant::now(), self.inner.ttl)
    }

    fn put(&self, key: &str, value: Bytes) {
        let inserted = self
            .inner
            .shard(key)
            .write()
            .insert(key, value, Instant::now());

        match inserted {
            Some(0) => {}
            Some(evicted) => trace!("Evicted {} entries to admit {}", evicted, key),
            None => trace!("Entry for {} exceeds shard budget, not cached", key),
        }
    }

    fn close(&self) {
        self.sweeper.stop();
    }

    fn entry_count(&self) -> u64 {
        self.inner
            .shards
            .iter()
            .map(|shard| shard.read().map.len() as u64)
            .sum()
    }

    fn weighted_size(&self) -> u64 {
        self.inner
            .shards
            .iter()
            .map(|shard| shard.read().used as u64)
            .sum()
    }

    fn policy_name(&self) -> &'static str {
        "size"
    }
}
