//! 后台清扫线程
//!
//! 与请求流量无关，按固定间隔运行一次清扫闭包。停止信号通过
//! crossbeam channel 发送，线程在 `recv_timeout` 上等待，所以停止是即时的。

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::{debug, warn};

pub(crate) struct Sweeper {
    name: &'static str,
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Sweeper {
    /// 启动清扫线程
    ///
    /// 线程创建失败时只记录警告：读路径上的惰性过期检查仍然保证正确性，
    /// 只是过期条目占用的内存要等到被覆盖或淘汰时才释放。
    pub(crate) fn spawn<F>(name: &'static str, interval: Duration, sweep: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || Self::run(stop_rx, interval, sweep));

        let handle = match handle {
            Ok(handle) => {
                debug!("{} started, interval {:?}", name, interval);
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to spawn {}: {}, expired entries are only dropped lazily", name, e);
                None
            }
        };

        Self {
            name,
            stop_tx: Mutex::new(Some(stop_tx)),
            handle: Mutex::new(handle),
        }
    }

    fn run<F: Fn()>(stop_rx: Receiver<()>, interval: Duration, sweep: F) {
        loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => sweep(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// 停止并等待线程退出，可重复调用
    pub(crate) fn stop(&self) {
        // 丢弃发送端即可唤醒 recv_timeout
        drop(self.stop_tx.lock().take());

        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!("{} panicked before shutdown", self.name);
            } else {
                debug!("{} stopped", self.name);
            }
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}
