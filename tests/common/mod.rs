#![allow(dead_code)]

use kv_bench::{KeyValueStore, MokaStore, PhaseContext, StoreError};
use parking_lot::Mutex;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

pub fn block_on<F: Future>(fut: F) -> F::Output {
    compio::runtime::Runtime::new()
        .expect("Failed to create Compio runtime")
        .block_on(fut)
}

/// 收集 tracing 输出，用于断言日志内容
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// 在当前线程安装临时订阅者运行 `f`，返回结果与日志
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, capture.contents())
}

/// 所有读写都失败的后端
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn setup(&self, _ctx: &PhaseContext) -> Result<(), StoreError> {
        Ok(())
    }

    async fn set(&self, ctx: &PhaseContext, _key: &str, _value: &str) -> Result<(), StoreError> {
        ctx.ensure_active()?;
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn get(&self, ctx: &PhaseContext, _key: &str) -> Result<String, StoreError> {
        ctx.ensure_active()?;
        Err(StoreError::Backend("connection refused".into()))
    }
}

/// setup 失败的后端
pub struct BrokenSetupStore;

impl KeyValueStore for BrokenSetupStore {
    fn name(&self) -> &'static str {
        "broken-setup"
    }

    async fn setup(&self, _ctx: &PhaseContext) -> Result<(), StoreError> {
        Err(StoreError::Backend("relation \"kv\" cannot be created".into()))
    }

    async fn set(&self, _ctx: &PhaseContext, _key: &str, _value: &str) -> Result<(), StoreError> {
        unreachable!("phases must not start after a failed setup")
    }

    async fn get(&self, _ctx: &PhaseContext, _key: &str) -> Result<String, StoreError> {
        unreachable!("phases must not start after a failed setup")
    }
}

/// 对指定 key 返回错误值的后端
pub struct CorruptingStore {
    pub inner: MokaStore,
    pub corrupt_key: &'static str,
}

impl KeyValueStore for CorruptingStore {
    fn name(&self) -> &'static str {
        "corrupting"
    }

    async fn setup(&self, ctx: &PhaseContext) -> Result<(), StoreError> {
        self.inner.setup(ctx).await
    }

    async fn set(&self, ctx: &PhaseContext, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.set(ctx, key, value).await
    }

    async fn get(&self, ctx: &PhaseContext, key: &str) -> Result<String, StoreError> {
        let value = self.inner.get(ctx, key).await?;
        if key == self.corrupt_key {
            return Ok("corrupted".to_owned());
        }
        Ok(value)
    }
}

/// 每次调用都很慢的后端，调用总会跨越阶段截止时间
pub struct SlowStore {
    pub latency: Duration,
}

impl KeyValueStore for SlowStore {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn setup(&self, _ctx: &PhaseContext) -> Result<(), StoreError> {
        Ok(())
    }

    async fn set(&self, ctx: &PhaseContext, _key: &str, _value: &str) -> Result<(), StoreError> {
        ctx.guard(async {
            compio::time::sleep(self.latency).await;
            Ok(())
        })
        .await
    }

    async fn get(&self, ctx: &PhaseContext, key: &str) -> Result<String, StoreError> {
        ctx.guard(async {
            compio::time::sleep(self.latency).await;
            Ok(key.replace("key_", "value_"))
        })
        .await
    }
}
