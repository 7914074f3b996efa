//! Single-flight 守卫
//!
//! 共享的模型句柄不能被并发调用，同一时刻只允许一个生成任务进入

use std::future::Future;

use tokio::sync::Mutex;

/// 串行化守卫
///
/// 由服务上下文持有，生命周期与进程一致
#[derive(Debug, Default)]
pub struct SingleFlight {
    lock: Mutex<()>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在持有锁期间执行 `work`
    ///
    /// 等待者按 FIFO 顺序获得锁；调用方的 future 被丢弃时锁随之释放
    pub async fn run<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock.lock().await;
        work.await
    }

    /// 当前是否有任务在执行
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
