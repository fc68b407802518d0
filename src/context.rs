//! 阶段上下文
//! 截止时间 + 取消标志，worker 在每次迭代开始时协作式检查

use crate::error::StoreError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 可取消的阶段上下文
#[derive(Debug)]
pub struct PhaseContext {
    deadline: Option<Instant>,
    cancelled: AtomicBool,
}

impl PhaseContext {
    /// 不带截止时间的上下文
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancelled: AtomicBool::new(false),
        }
    }

    /// 从当前时刻起 `timeout` 后到期的上下文
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancelled: AtomicBool::new(false),
        }
    }

    /// 显式取消
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// 已取消或已到期
    #[inline]
    pub fn is_done(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// 距离截止时间的剩余时长；没有截止时间时返回 `None`
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// 上下文结束时立即返回取消错误
    #[inline]
    pub fn ensure_active(&self) -> Result<(), StoreError> {
        if self.is_done() {
            Err(StoreError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }

    /// 在上下文约束下执行后端调用
    ///
    /// 上下文已结束时不会轮询 `fut`；否则调用最多持续到截止时间，
    /// 超时映射为 [`StoreError::DeadlineExceeded`]。
    pub async fn guard<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        self.ensure_active()?;
        match self.remaining() {
            None => fut.await,
            Some(remaining) => compio::time::timeout(remaining, fut)
                .await
                .map_err(|_| StoreError::DeadlineExceeded)?,
        }
    }

    /// 阻塞直到截止时间；没有截止时间时立即返回
    pub async fn wait(&self) {
        // 计时器可能提前唤醒，以 Instant 为准
        while let Some(remaining) = self.remaining().filter(|r| !r.is_zero()) {
            compio::time::sleep(remaining).await;
        }
    }
}
