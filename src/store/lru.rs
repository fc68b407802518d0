//! 有界 LRU 内存后端

use super::KeyValueStore;
use crate::context::PhaseContext;
use crate::error::StoreError;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// 超出容量时淘汰最久未访问的 key
pub struct LruStore {
    cache: Mutex<LruCache<String, String>>,
    capacity: NonZeroUsize,
}

impl LruStore {
    /// 容量为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl KeyValueStore for LruStore {
    #[inline]
    fn name(&self) -> &'static str {
        "lru"
    }

    async fn setup(&self, ctx: &PhaseContext) -> Result<(), StoreError> {
        ctx.ensure_active()?;
        self.cache.lock().clear();
        Ok(())
    }

    async fn set(&self, ctx: &PhaseContext, key: &str, value: &str) -> Result<(), StoreError> {
        ctx.ensure_active()?;
        self.cache.lock().put(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get(&self, ctx: &PhaseContext, key: &str) -> Result<String, StoreError> {
        ctx.ensure_active()?;
        Ok(self.cache.lock().get(key).cloned().unwrap_or_default())
    }

    #[inline]
    fn capacity(&self) -> Option<usize> {
        Some(self.capacity.get())
    }
}
