//! 阶段编排
//! setup -> 写入阶段 -> 读取校验阶段，阶段之间不重叠

use crate::config::{BenchConfig, messages};
use crate::context::PhaseContext;
use crate::error::{AppError, ErrorContext, Result};
use crate::runner::{PhaseReport, Workload, run_phase};
use crate::store::KeyValueStore;
use std::rc::Rc;

/// 一次完整压测的结果
#[derive(Clone, Debug)]
pub struct BenchReport {
    pub backend: &'static str,
    pub write: PhaseReport,
    pub read: PhaseReport,
}

/// 阶段编排器
pub struct Orchestrator<S> {
    store: Rc<S>,
    config: BenchConfig,
}

impl<S: KeyValueStore + 'static> Orchestrator<S> {
    pub fn new(store: S, config: BenchConfig) -> Self {
        Self {
            store: Rc::new(store),
            config,
        }
    }

    /// 共享的后端实例
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 后端容量必须覆盖全部 worker 的 key，否则读取阶段会把被淘汰的 key 记为错误
    fn check_capacity(&self) -> Result<()> {
        match self.store.capacity() {
            Some(capacity) if capacity < self.config.workers => Err(AppError::Config(format!(
                "{} capacity {} is smaller than worker count {}",
                self.store.name(),
                capacity,
                self.config.workers
            ))),
            _ => Ok(()),
        }
    }

    /// 准备后端；失败时整个压测中止
    pub async fn setup(&self) -> Result<()> {
        let ctx = PhaseContext::with_timeout(self.config.setup_timeout);
        self.store
            .setup(&ctx)
            .await
            .with_context(messages::SETUP_FAILED)?;
        tracing::debug!(backend = self.store.name(), "backend ready");
        Ok(())
    }

    /// 运行单个阶段并打印摘要
    pub async fn run_phase(&self, workload: Workload) -> PhaseReport {
        let report = run_phase(
            Rc::clone(&self.store),
            workload,
            self.config.workers,
            self.config.phase_duration,
        )
        .await;
        println!("{report}");
        report
    }

    /// 依次运行写入阶段与读取校验阶段
    pub async fn run(&self) -> Result<BenchReport> {
        self.config.validate()?;
        self.check_capacity()?;
        self.setup().await?;

        let backend = self.store.name();
        println!("backend: {backend}");
        tracing::info!(
            backend,
            workers = self.config.workers,
            duration = ?self.config.phase_duration,
            "benchmark started"
        );

        let write = self.run_phase(Workload::Write).await;
        let read = self.run_phase(Workload::ReadVerify).await;

        Ok(BenchReport {
            backend,
            write,
            read,
        })
    }
}
