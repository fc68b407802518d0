//! 工作负载运行器
//! 每个阶段启动 N 个 worker，在截止时间前不停地对各自的 key 发起请求

use crate::context::PhaseContext;
use crate::error::StoreError;
use crate::stats::{Stats, StatsSnapshot};
use crate::store::KeyValueStore;
use futures_util::future::join_all;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// 工作负载类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workload {
    /// 写入 `key_<i> = value_<i>`
    Write,
    /// 读取并校验 `key_<i>`
    ReadVerify,
}

impl Workload {
    /// 阶段名称（用于输出）
    pub fn name(&self) -> &'static str {
        match self {
            Workload::Write => "set",
            Workload::ReadVerify => "get",
        }
    }
}

/// worker 负责的 key 及其期望值
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub key: String,
    pub value: String,
}

impl WorkItem {
    pub fn new(index: usize) -> Self {
        Self {
            key: format!("key_{index}"),
            value: format!("value_{index}"),
        }
    }
}

/// 让出一次调度
///
/// 内存后端的调用会同步完成，不让出的话单线程运行时上的其他 worker
/// 和截止时间计时器都得不到执行机会。compio 与 futures-util 都没有提供
/// `yield_now`，这里自己实现。
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

async fn yield_now() {
    YieldNow::default().await
}

/// 写入循环
pub async fn run_write<S: KeyValueStore>(store: &S, ctx: &PhaseContext, stats: &Stats, item: &WorkItem) {
    while !ctx.is_done() {
        match store.set(ctx, &item.key, &item.value).await {
            Ok(()) => stats.record_success(),
            Err(err) => {
                stats.record_failure(&err);
            }
        }
        yield_now().await;
    }
}

/// 读取校验循环
pub async fn run_read_verify<S: KeyValueStore>(
    store: &S,
    ctx: &PhaseContext,
    stats: &Stats,
    item: &WorkItem,
) {
    while !ctx.is_done() {
        match store.get(ctx, &item.key).await {
            Ok(value) if value == item.value => stats.record_success(),
            Ok(actual) => {
                stats.record_failure(&StoreError::UnexpectedValue {
                    key: item.key.clone(),
                    expected: item.value.clone(),
                    actual,
                });
            }
            Err(err) => {
                stats.record_failure(&err);
            }
        }
        yield_now().await;
    }
}

/// 单个 worker
pub async fn run_worker<S: KeyValueStore>(
    workload: Workload,
    store: &S,
    ctx: &PhaseContext,
    stats: &Stats,
    index: usize,
) {
    let item = WorkItem::new(index);
    match workload {
        Workload::Write => run_write(store, ctx, stats, &item).await,
        Workload::ReadVerify => run_read_verify(store, ctx, stats, &item).await,
    }
}

/// 单个阶段的结果
#[derive(Clone, Copy, Debug)]
pub struct PhaseReport {
    pub workload: Workload,
    pub elapsed: Duration,
    pub stats: StatsSnapshot,
}

impl PhaseReport {
    #[inline]
    pub fn total(&self) -> u64 {
        self.stats.total()
    }

    #[inline]
    pub fn ok(&self) -> u64 {
        self.stats.ok
    }

    #[inline]
    pub fn err(&self) -> u64 {
        self.stats.err
    }

    /// 近似吞吐量（次/秒）
    pub fn ops_per_sec(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0
        } else {
            (self.total() as f64 / secs) as u64
        }
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==== {} ====", self.workload.name())?;
        writeln!(f, "total: {}", self.total())?;
        writeln!(f, "ops: {}", self.ops_per_sec())?;
        writeln!(f, "ok: {}", self.ok())?;
        write!(f, "err: {}", self.err())
    }
}

/// 运行一个阶段
///
/// 截止时间到达后取消上下文并等待所有 worker 退出，再读取计数。
pub async fn run_phase<S>(
    store: Rc<S>,
    workload: Workload,
    workers: usize,
    duration: Duration,
) -> PhaseReport
where
    S: KeyValueStore + 'static,
{
    let start = Instant::now();
    let ctx = Rc::new(PhaseContext::with_timeout(duration));
    let stats = Rc::new(Stats::new());

    tracing::debug!(phase = workload.name(), workers, ?duration, "phase started");

    let handles: Vec<_> = (0..workers)
        .map(|index| {
            let store = Rc::clone(&store);
            let ctx = Rc::clone(&ctx);
            let stats = Rc::clone(&stats);
            compio::runtime::spawn(async move {
                run_worker(workload, store.as_ref(), &ctx, &stats, index).await;
            })
        })
        .collect();

    ctx.wait().await;
    ctx.cancel();
    // drain：保证读取计数时没有 worker 仍在递增
    join_all(handles).await;

    let report = PhaseReport {
        workload,
        elapsed: start.elapsed(),
        stats: stats.snapshot(),
    };
    tracing::info!(
        phase = workload.name(),
        total = report.total(),
        ok = report.ok(),
        err = report.err(),
        "phase finished"
    );
    report
}
