//! 键值存储并发压测库
//!
//! 在固定时长内用大量并发 worker 对可替换的键值后端施压，
//! 统计成功/失败次数与近似吞吐量，并校验读回的数据是否正确。
//!
//! 特性：
//! - 使用Compio异步运行时
//! - 写入阶段 + 读取校验阶段，各自独立计时
//! - 无锁原子计数，截止时间导致的取消不计入错误
//! - SQLite、mini-moka、LRU 三种后端

pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod runner;
pub mod stats;
pub mod store;

pub use context::PhaseContext;
pub use error::{AppError, Result, StoreError};
pub use orchestrator::{BenchReport, Orchestrator};
pub use runner::{PhaseReport, WorkItem, Workload};
pub use stats::{Stats, StatsSnapshot};
pub use store::{BackendKind, KeyValueStore, LruStore, MokaStore, SqliteStore};
