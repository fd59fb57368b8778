//! 响应缓冲区池
//!
//! 未启用缓存时，序列化结果写进从池中借出的缓冲区，再作为响应体交给
//! HTTP 层。缓冲区在最后一个 `Bytes` 被释放（响应写完）时自动归还。
//!
//! 借出的缓冲区由 [`PooledBuffer`] 独占持有，只能通过 `Drop` 归还，
//! 因此不存在重复归还或归还后继续使用的情况。

use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::trace;

use crate::codec::ENCODED_SIZE_HINT;

/// 池中最多保留的缓冲区数量
pub const DEFAULT_MAX_POOLED: usize = 1024;
/// 新缓冲区的初始容量
pub const DEFAULT_INITIAL_CAPACITY: usize = ENCODED_SIZE_HINT;
/// 容量超过该值的缓冲区不回收
pub const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
    initial_capacity: usize,
    max_capacity: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POOLED, DEFAULT_INITIAL_CAPACITY)
    }
}

impl BufferPool {
    pub fn new(max_pooled: usize, initial_capacity: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(max_pooled.min(DEFAULT_MAX_POOLED))),
            max_pooled,
            initial_capacity,
            max_capacity: MAX_RETAINED_CAPACITY.max(initial_capacity),
        }
    }

    /// 借出一个空缓冲区（长度为 0）
    pub fn acquire(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .buffers
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity));

        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    /// 当前池中空闲缓冲区数量
    pub fn pooled(&self) -> usize {
        self.buffers.lock().len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        let capacity = buf.capacity();
        if capacity == 0 || capacity > self.max_capacity {
            trace!("Dropping buffer with capacity {} instead of pooling", capacity);
            return;
        }

        buf.clear();
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.max_pooled {
            buffers.push(buf);
        }
    }
}

/// 从 [`BufferPool`] 借出的缓冲区
///
/// 只能移动不能复制；`Drop` 时归还给池。
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    pub fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 转换为响应体，最后一个 `Bytes` 释放时缓冲区归还给池
    pub fn into_body(self) -> Bytes {
        Bytes::from_owner(self)
    }

    /// 取出底层 `Vec`，之后不再归还
    ///
    /// 留下的空 `Vec` 没有容量，`Drop` 时不会进入池。
    pub fn detach(mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

impl AsRef<[u8]> for PooledBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
