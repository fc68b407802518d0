//! 命令行入口
//! 解析参数、初始化日志，按配置选择后端并运行压测

use clap::Parser;
use kv_bench::config::{self, BenchConfig, messages};
use kv_bench::error::{AppError, ErrorContext, Result};
use kv_bench::{BackendKind, KeyValueStore, LruStore, MokaStore, Orchestrator, SqliteStore};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "键值存储并发压测", long_about = None)]
struct Cli {
    /// 每个阶段的并发 worker 数量
    #[arg(long, default_value_t = config::DEFAULT_WORKERS)]
    workers: usize,

    /// 每个阶段的持续时间（秒）
    #[arg(long, default_value_t = config::DEFAULT_PHASE_SECS)]
    duration_secs: u64,

    /// 后端类型
    #[arg(long, value_enum, default_value_t = BackendKind::Sqlite)]
    backend: BackendKind,

    /// 后端连接目标（SQLite 数据库路径，仅 sqlite 后端使用）
    #[arg(long, default_value = config::DEFAULT_TARGET)]
    target: String,

    /// 连接池保留的最大空闲连接数（仅 sqlite 后端使用）
    #[arg(long, default_value_t = config::DEFAULT_IDLE_POOL_SIZE)]
    idle_pool_size: usize,

    /// 有界 LRU 后端的容量（仅 lru 后端使用）
    #[arg(long, default_value_t = config::DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// setup 超时（秒）
    #[arg(long, default_value_t = config::DEFAULT_SETUP_SECS)]
    setup_timeout_secs: u64,
}

impl From<Cli> for BenchConfig {
    fn from(cli: Cli) -> Self {
        BenchConfig {
            workers: cli.workers,
            phase_duration: Duration::from_secs(cli.duration_secs),
            backend: cli.backend,
            target: cli.target,
            idle_pool_size: cli.idle_pool_size,
            cache_capacity: cli.cache_capacity,
            setup_timeout: Duration::from_secs(cli.setup_timeout_secs),
        }
    }
}

async fn bench<S: KeyValueStore + 'static>(store: S, config: BenchConfig) -> Result<()> {
    Orchestrator::new(store, config).run().await?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BenchConfig::from(Cli::parse());
    config.validate().with_context(messages::INVALID_CONFIG)?;
    tracing::debug!(backend = %config.backend, target = %config.target, "configuration loaded");

    let runtime = compio::runtime::Runtime::new()
        .map_err(|e| AppError::RuntimeCreate(e.to_string()))
        .with_context(messages::RUNTIME_CREATE_FAILED)?;

    runtime.block_on(async {
        match config.backend {
            BackendKind::Sqlite => {
                let store = SqliteStore::open(&config.target, config.idle_pool_size)
                    .with_context(messages::BACKEND_OPEN_FAILED)?;
                bench(store, config).await
            }
            BackendKind::Moka => {
                bench(MokaStore::with_initial_capacity(config.workers), config).await
            }
            BackendKind::Lru => bench(LruStore::new(config.cache_capacity), config).await,
        }
    })
}
