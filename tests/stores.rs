mod common;

use common::block_on;
use kv_bench::{KeyValueStore, LruStore, MokaStore, PhaseContext, SqliteStore, StoreError};
use std::time::Duration;

/// 所有后端都必须满足的契约
async fn check_contract<S: KeyValueStore>(store: &S) {
    let ctx = PhaseContext::background();
    store.setup(&ctx).await.expect("setup");

    // 从未写入的 key 返回空值且不报错
    assert_eq!(store.get(&ctx, "missing").await.expect("get missing"), "");

    store.set(&ctx, "key_1", "value_1").await.expect("set");
    assert_eq!(store.get(&ctx, "key_1").await.expect("get"), "value_1");

    // 重复写入同一值
    store.set(&ctx, "key_1", "value_1").await.expect("set again");
    assert_eq!(store.get(&ctx, "key_1").await.expect("get"), "value_1");

    // 覆盖写入
    store.set(&ctx, "key_1", "value_2").await.expect("overwrite");
    assert_eq!(store.get(&ctx, "key_1").await.expect("get"), "value_2");

    // setup 可重复执行，并清空已有数据
    store.setup(&ctx).await.expect("setup again");
    assert_eq!(store.get(&ctx, "key_1").await.expect("get after setup"), "");
}

async fn check_expired_context<S: KeyValueStore>(store: &S) {
    let ctx = PhaseContext::with_timeout(Duration::ZERO);
    assert!(matches!(
        store.set(&ctx, "key_0", "value_0").await,
        Err(StoreError::DeadlineExceeded)
    ));
    assert!(matches!(
        store.get(&ctx, "key_0").await,
        Err(StoreError::DeadlineExceeded)
    ));
}

#[test]
fn moka_store_contract() {
    let store = MokaStore::new();
    assert_eq!(store.name(), "mini-moka");
    block_on(async {
        check_contract(&store).await;
        check_expired_context(&store).await;
    });
}

#[test]
fn lru_store_contract() {
    let store = LruStore::new(16);
    assert_eq!(store.name(), "lru");
    block_on(async {
        check_contract(&store).await;
        check_expired_context(&store).await;
    });
}

#[test]
fn lru_store_evicts_beyond_capacity() {
    let store = LruStore::new(2);
    assert_eq!(store.capacity(), Some(2));
    assert!(store.is_empty());
    block_on(async {
        let ctx = PhaseContext::background();
        for i in 0..3 {
            store
                .set(&ctx, &format!("key_{i}"), &format!("value_{i}"))
                .await
                .unwrap();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&ctx, "key_0").await.unwrap(), "");
        assert_eq!(store.get(&ctx, "key_2").await.unwrap(), "value_2");

        store.setup(&ctx).await.unwrap();
        assert!(store.is_empty());
    });
}

#[test]
fn unbounded_stores_report_no_capacity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sqlite = SqliteStore::open(dir.path().join("kv.sqlite3"), 1).expect("open");
    assert_eq!(MokaStore::new().capacity(), None);
    assert_eq!(sqlite.capacity(), None);
    // 容量 0 按 1 处理
    assert_eq!(LruStore::new(0).capacity(), Some(1));
}

#[test]
fn sqlite_store_contract() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::open(dir.path().join("kv.sqlite3"), 4).expect("open");
    assert_eq!(store.name(), "sqlite");
    block_on(async {
        check_contract(&store).await;
        check_expired_context(&store).await;
    });
    assert!(store.idle_connections() <= 4);
}

#[test]
fn sqlite_store_rejects_empty_pool() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        SqliteStore::open(dir.path().join("kv.sqlite3"), 0),
        Err(StoreError::Pool(_))
    ));
}

#[test]
fn sqlite_store_survives_concurrent_writers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = std::rc::Rc::new(SqliteStore::open(dir.path().join("kv.sqlite3"), 2).expect("open"));
    block_on(async {
        let ctx = PhaseContext::background();
        store.setup(&ctx).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                compio::runtime::spawn(async move {
                    let ctx = PhaseContext::background();
                    for round in 0..5 {
                        store
                            .set(&ctx, &format!("key_{i}"), &format!("value_{i}_{round}"))
                            .await
                            .unwrap();
                    }
                })
            })
            .collect();
        futures_util::future::join_all(handles).await;

        for i in 0..8 {
            assert_eq!(store.get(&ctx, &format!("key_{i}")).await.unwrap(), format!("value_{i}_4"));
        }
    });
    // 空闲连接数不超过上限
    assert!(store.idle_connections() <= 2);
}
