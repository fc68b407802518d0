//! 结果聚合
//! 所有 worker 共享同一个 `Stats`，计数器只做原子递增

use crate::error::StoreError;
use std::sync::atomic::{AtomicU64, Ordering};

/// 单个阶段的成功/失败计数
#[derive(Debug, Default)]
pub struct Stats {
    ok: AtomicU64,
    err: AtomicU64,
}

/// 阶段结束后读取的计数快照
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ok: u64,
    pub err: u64,
}

impl StatsSnapshot {
    #[inline]
    pub fn total(&self) -> u64 {
        self.ok + self.err
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次成功
    #[inline]
    pub fn record_success(&self) {
        self.ok.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录一次失败
    ///
    /// 截止时间导致的取消直接丢弃，既不计数也不输出日志；
    /// 返回值表示该失败是否被计入。
    pub fn record_failure(&self, err: &StoreError) -> bool {
        if err.is_deadline() {
            return false;
        }
        tracing::warn!(error = %err, "operation failed");
        self.err.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// 读取当前计数
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ok: self.ok.load(Ordering::Acquire),
            err: self.err.load(Ordering::Acquire),
        }
    }
}
