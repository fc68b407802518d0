//! 配置模块
//! 定义默认常量以及运行时使用的压测配置

use crate::error::{AppError, Result};
use crate::store::BackendKind;
use std::time::Duration;

/// 默认并发 worker 数量
pub const DEFAULT_WORKERS: usize = 100;

/// 每个阶段的默认持续时间（秒）
pub const DEFAULT_PHASE_SECS: u64 = 10;

/// 默认后端连接目标（SQLite 数据库文件）
pub const DEFAULT_TARGET: &str = "kvbench.sqlite3";

/// 连接池保留的最大空闲连接数
pub const DEFAULT_IDLE_POOL_SIZE: usize = 30;

/// 有界 LRU 后端的默认容量
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// setup 阶段的超时时间（秒）
pub const DEFAULT_SETUP_SECS: u64 = 30;

/// SQLite 忙等待超时（毫秒）
pub const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 错误消息常量
pub mod messages {
    pub const RUNTIME_CREATE_FAILED: &str = "Failed to create Compio runtime";
    pub const BACKEND_OPEN_FAILED: &str = "Failed to open backend";
    pub const SETUP_FAILED: &str = "Backend setup failed";
    pub const INVALID_CONFIG: &str = "Invalid benchmark configuration";
}

/// 压测配置
#[derive(Clone, Debug, PartialEq)]
pub struct BenchConfig {
    /// 每个阶段启动的 worker 数量
    pub workers: usize,
    /// 每个阶段的墙钟时长
    pub phase_duration: Duration,
    /// 后端类型
    pub backend: BackendKind,
    /// 后端连接目标
    pub target: String,
    /// 空闲连接池大小
    pub idle_pool_size: usize,
    /// LRU 后端容量
    pub cache_capacity: usize,
    /// setup 超时
    pub setup_timeout: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            phase_duration: Duration::from_secs(DEFAULT_PHASE_SECS),
            backend: BackendKind::Sqlite,
            target: DEFAULT_TARGET.to_owned(),
            idle_pool_size: DEFAULT_IDLE_POOL_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            setup_timeout: Duration::from_secs(DEFAULT_SETUP_SECS),
        }
    }
}

impl BenchConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(AppError::Config("workers must be greater than zero".into()));
        }
        if self.phase_duration.is_zero() {
            return Err(AppError::Config("phase duration must be non-zero".into()));
        }
        if self.setup_timeout.is_zero() {
            return Err(AppError::Config("setup timeout must be non-zero".into()));
        }
        if self.idle_pool_size == 0 {
            return Err(AppError::Config("idle pool size must be greater than zero".into()));
        }
        if self.cache_capacity == 0 {
            return Err(AppError::Config("cache capacity must be greater than zero".into()));
        }
        Ok(())
    }
}
