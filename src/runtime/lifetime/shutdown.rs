use std::sync::Arc;

use tracing::info;

use crate::cache::ResponseCache;

/// 服务器停止后的清理：停止缓存清扫线程并输出统计
pub fn perform_shutdown(cache: Option<&Arc<dyn ResponseCache>>) {
    match cache {
        Some(cache) => {
            info!(
                "Closing {} cache: {} entries, {} bytes retained",
                cache.policy_name(),
                cache.entry_count(),
                cache.weighted_size()
            );
            cache.close();
        }
        None => info!("No response cache to close"),
    }
    info!("Shutdown complete");
}
