//! 无界内存缓存后端

use super::KeyValueStore;
use crate::context::PhaseContext;
use crate::error::StoreError;
use mini_moka::sync::Cache;

/// 基于 mini-moka 并发缓存的内存后端，无容量上限、无过期
#[derive(Clone)]
pub struct MokaStore {
    cache: Cache<String, String>,
}

impl Default for MokaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaStore {
    pub fn new() -> Self {
        Self::with_initial_capacity(0)
    }

    /// 预分配初始容量，减少动态扩容开销
    pub fn with_initial_capacity(capacity: usize) -> Self {
        Self {
            cache: Cache::builder().initial_capacity(capacity).build(),
        }
    }
}

impl KeyValueStore for MokaStore {
    #[inline]
    fn name(&self) -> &'static str {
        "mini-moka"
    }

    async fn setup(&self, ctx: &PhaseContext) -> Result<(), StoreError> {
        ctx.ensure_active()?;
        self.cache.invalidate_all();
        Ok(())
    }

    async fn set(&self, ctx: &PhaseContext, key: &str, value: &str) -> Result<(), StoreError> {
        ctx.ensure_active()?;
        self.cache.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, ctx: &PhaseContext, key: &str) -> Result<String, StoreError> {
        ctx.ensure_active()?;
        Ok(self.cache.get(&key.to_owned()).unwrap_or_default())
    }
}
