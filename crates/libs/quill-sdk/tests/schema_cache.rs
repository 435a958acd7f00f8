use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use quill_sdk::{SdkError, TtlCache};

const TTL: Duration = Duration::from_millis(100);

async fn fetch_counted(
    cache: &TtlCache<String>,
    calls: &AtomicUsize,
    key: &str,
) -> Result<String, SdkError> {
    cache
        .get_or_fetch(key, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{key}-schema"))
        })
        .await
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn fresh_entry_is_served_without_fetching() {
    let cache = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);

    fetch_counted(&cache, &calls, "mydb").await.expect("t=0");
    tokio::time::advance(Duration::from_millis(50)).await;
    fetch_counted(&cache, &calls, "mydb").await.expect("t=50ms");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn expired_entry_is_fetched_again() {
    let cache = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);

    fetch_counted(&cache, &calls, "mydb").await.expect("t=0");
    tokio::time::advance(Duration::from_millis(150)).await;
    fetch_counted(&cache, &calls, "mydb").await.expect("t=150ms");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let cache: TtlCache<String> = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);
    let counter = &calls;

    let err = cache
        .get_or_fetch("mydb", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(SdkError::fetch("mydb", "503"))
        })
        .await
        .expect_err("fetch fails");
    assert!(err.is_retryable());
    assert!(!cache.has("mydb"));

    fetch_counted(&cache, &calls, "mydb").await.expect("retry");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.get("mydb").as_deref(), Some("mydb-schema"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn namespaces_are_independent() {
    let cache = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);

    fetch_counted(&cache, &calls, "a").await.expect("a");
    tokio::time::advance(Duration::from_millis(60)).await;
    fetch_counted(&cache, &calls, "b").await.expect("b");
    tokio::time::advance(Duration::from_millis(60)).await;

    assert!(!cache.has("a"));
    assert!(cache.has("b"));

    cache.set("c", "pinned".to_owned());
    assert!(cache.delete("b"));
    assert_eq!(cache.get("c").as_deref(), Some("pinned"));
}

#[tokio::test]
async fn concurrent_misses_each_fetch() {
    let cache: TtlCache<String> = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);

    let counter = &calls;
    let slow_fetch = move |value: &'static str| {
        move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<_, SdkError>(value.to_owned())
        }
    };

    let (first, second) = tokio::join!(
        cache.get_or_fetch("mydb", slow_fetch("first")),
        cache.get_or_fetch("mydb", slow_fetch("second")),
    );
    assert_eq!(first.expect("first"), "first");
    assert_eq!(second.expect("second"), "second");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let cached = cache.get("mydb").expect("last success is cached");
    assert!(cached == "first" || cached == "second");
}

#[tokio::test]
async fn clear_forces_refetch() {
    let cache = TtlCache::new(TTL);
    let calls = AtomicUsize::new(0);

    fetch_counted(&cache, &calls, "mydb").await.expect("fetch");
    cache.clear();
    assert!(cache.is_empty());
    fetch_counted(&cache, &calls, "mydb").await.expect("refetch");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
