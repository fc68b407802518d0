//! SQLite 关系型后端

use super::KeyValueStore;
use crate::config::SQLITE_BUSY_TIMEOUT_MS;
use crate::context::PhaseContext;
use crate::error::StoreError;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SETUP_SQL: &str = "
    DROP TABLE IF EXISTS kv;
    CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT NOT NULL);
";

const UPSERT_SQL: &str =
    "INSERT INTO kv (k, v) VALUES (?1, ?2) ON CONFLICT (k) DO UPDATE SET v = excluded.v";

const SELECT_SQL: &str = "SELECT v FROM kv WHERE k = ?1";

/// 连接池：按需打开新连接，最多保留 `max_idle` 个空闲连接
struct ConnectionPool {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
    max_idle: usize,
}

impl ConnectionPool {
    fn open(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_millis(SQLITE_BUSY_TIMEOUT_MS))?;
        // 不需要持久性：关闭 fsync，使用 WAL 提升并发
        conn.pragma_update(None, "synchronous", "OFF")?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Ok(conn)
    }

    fn acquire(&self) -> Result<Connection, StoreError> {
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        self.open()
    }

    fn release(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }

    fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

/// 关系型后端
///
/// SQLite 调用是阻塞的，通过 `spawn_blocking` 移出运行时线程。
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteStore {
    /// 打开数据库文件，并验证可以建立连接
    pub fn open(path: impl AsRef<Path>, max_idle: usize) -> Result<Self, StoreError> {
        if max_idle == 0 {
            return Err(StoreError::Pool("idle pool size must be greater than zero".into()));
        }
        let pool = ConnectionPool {
            path: path.as_ref().to_path_buf(),
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        };
        let conn = pool.open()?;
        pool.release(conn);
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// 当前空闲连接数
    pub fn idle_connections(&self) -> usize {
        self.pool.idle_count()
    }

    async fn with_connection<T, F>(&self, ctx: &PhaseContext, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        ctx.guard(async move {
            compio::runtime::spawn_blocking(move || {
                let conn = pool.acquire()?;
                let res = f(&conn);
                pool.release(conn);
                res.map_err(StoreError::from)
            })
            .await
            .map_err(|_| StoreError::Pool("blocking sqlite task panicked".into()))?
        })
        .await
    }
}

impl KeyValueStore for SqliteStore {
    #[inline]
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn setup(&self, ctx: &PhaseContext) -> Result<(), StoreError> {
        self.with_connection(ctx, |conn| conn.execute_batch(SETUP_SQL))
            .await
    }

    async fn set(&self, ctx: &PhaseContext, key: &str, value: &str) -> Result<(), StoreError> {
        let (key, value) = (key.to_owned(), value.to_owned());
        self.with_connection(ctx, move |conn| {
            conn.prepare_cached(UPSERT_SQL)?.execute(params![key, value])?;
            Ok(())
        })
        .await
    }

    async fn get(&self, ctx: &PhaseContext, key: &str) -> Result<String, StoreError> {
        let key = key.to_owned();
        self.with_connection(ctx, move |conn| {
            let value = conn
                .prepare_cached(SELECT_SQL)?
                .query_row([&key], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value.unwrap_or_default())
        })
        .await
    }
}
