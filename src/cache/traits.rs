use bytes::Bytes;

/// 条目的负载字节数（键 + 值）
///
/// TTL 策略直接以此作为 moka 的权重；字节上限策略在此基础上
/// 再加上每个条目的簿记开销。
#[inline]
pub fn entry_weight(key: &str, value: &Bytes) -> usize {
    key.len() + value.len()
}

/// 响应缓存接口
///
/// - `get` 不会因为其它键上的并发写入而阻塞
/// - `put` 是覆盖语义，后写入者胜出
/// - `close` 释放后台资源（清扫线程），由所有者在关闭时调用一次；
///   关闭后继续使用缓存属于调用方错误
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Bytes>;

    fn put(&self, key: &str, value: Bytes);

    fn close(&self);

    /// 当前条目数（TTL 策略下为近似值）
    fn entry_count(&self) -> u64;

    /// 当前占用字节数（至少包含 [`entry_weight`]）
    fn weighted_size(&self) -> u64;

    /// 策略名称（用于日志）
    fn policy_name(&self) -> &'static str;
}
