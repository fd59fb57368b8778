//! 字节上限缓存的真实堆占用
//!
//! 全局分配器替换为计数分配器，因此这个文件只放一个测试，避免
//! 其它测试线程的分配混入读数。

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use ipgeo::cache::{ResponseCache, SizedCache};

struct CountingAlloc;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            ALLOCATED.fetch_add(new_size, Ordering::Relaxed);
        }
        new_ptr
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

const SE_BODY: &[u8] = br#"{"country":{"iso_code":"SE"},"location":{"latitude":58.4167,"longitude":15.6167,"accuracy_radius":76}}"#;

fn allocated() -> usize {
    ALLOCATED.load(Ordering::Relaxed)
}

#[test]
fn test_heap_usage_stays_under_ceiling() {
    const MAX_BYTES: u64 = 1024 * 1024;
    const HOUR: Duration = Duration::from_secs(3600);

    let cache = SizedCache::new(MAX_BYTES, HOUR, HOUR, 1);
    assert_eq!(cache.shard_count(), 1);
    // 等清扫线程启动完毕，它之后只会阻塞在 channel 上
    thread::sleep(Duration::from_millis(50));
    let baseline = allocated();

    let mut peak = 0;
    for i in 0u32..200_000 {
        let key = format!("10.{}.{}.{}", i >> 16, (i >> 8) & 0xff, i & 0xff);
        cache.put(&key, Bytes::copy_from_slice(SE_BODY));
        // 响应路径会 clone 一份值
        drop(cache.get(&key));
        if i % 1_000 == 0 {
            peak = peak.max(allocated().saturating_sub(baseline));
        }
    }

    let used = allocated().saturating_sub(baseline);
    peak = peak.max(used);

    assert!(cache.weighted_size() <= MAX_BYTES);
    assert!(
        peak as u64 <= MAX_BYTES,
        "heap delta {} exceeds ceiling {} (entries={}, weighted={})",
        peak,
        MAX_BYTES,
        cache.entry_count(),
        cache.weighted_size()
    );
    // 计费不至于悲观到几乎不缓存
    assert!(cache.entry_count() > 1_000, "entries={}", cache.entry_count());
    assert!(cache.get("10.3.13.63").is_some());

    cache.close();
}
