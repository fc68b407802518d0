//! 键值存储抽象模块
//! 定义后端操作的统一接口

mod lru;
mod moka;
mod sqlite;

pub use self::lru::LruStore;
pub use self::moka::MokaStore;
pub use self::sqlite::SqliteStore;

use crate::context::PhaseContext;
use crate::error::StoreError;
use std::fmt;
use std::future::Future;

/// 后端类型，启动时由配置选择
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// 关系型后端（SQLite）
    Sqlite,
    /// 无界内存缓存（mini-moka）
    Moka,
    /// 有界内存 LRU
    Lru,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Sqlite => "sqlite",
            BackendKind::Moka => "moka",
            BackendKind::Lru => "lru",
        })
    }
}

/// 键值存储trait，统一接口
///
/// 所有操作接收阶段上下文；上下文结束时应尽快返回
/// [`StoreError::DeadlineExceeded`] 而不是阻塞。
pub trait KeyValueStore {
    /// 后端名称（用于输出）
    fn name(&self) -> &'static str;

    /// 准备后端状态，可重复调用
    fn setup(&self, ctx: &PhaseContext) -> impl Future<Output = Result<(), StoreError>>;

    /// upsert：已存在则覆盖
    fn set(
        &self,
        ctx: &PhaseContext,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// 读取当前值；从未写入的 key 返回空字符串
    fn get(&self, ctx: &PhaseContext, key: &str) -> impl Future<Output = Result<String, StoreError>>;

    /// 最多能同时保存的 key 数量；`None` 表示不会淘汰
    fn capacity(&self) -> Option<usize> {
        None
    }
}
