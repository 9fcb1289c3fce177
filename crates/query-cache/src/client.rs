use crate::key::QueryKey;
use crate::options::QueryOptions;
use crate::state::QueryState;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

type CachedValue = Arc<dyn Any + Send + Sync>;
type Outcome = Result<CachedValue, String>;
type InFlight = Shared<BoxFuture<'static, ()>>;
type Store = Mutex<HashMap<QueryKey, Entry>>;

struct Entry {
    data: Option<CachedValue>,
    error: Option<String>,
    updated_at: Option<Instant>,
    last_used: Instant,
    cache_time: Duration,
    /// The pending request and the id that entitles it to write its result.
    in_flight: Option<(u64, InFlight)>,
}

impl Entry {
    fn new(now: Instant, cache_time: Duration) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            last_used: now,
            cache_time,
            in_flight: None,
        }
    }

    fn is_fresh(&self, refresh_after: Duration, now: Instant) -> bool {
        self.data.is_some()
            && self
                .updated_at
                .is_some_and(|at| now.duration_since(at) < refresh_after)
    }

    fn state<T: Send + Sync + 'static>(&self) -> QueryState<T> {
        let data = self.data.clone().and_then(|value| value.downcast::<T>().ok());
        QueryState {
            is_loading: data.is_none() && self.in_flight.is_some(),
            is_fetching: self.in_flight.is_some(),
            data,
            error: self.error.clone(),
            is_previous_data: false,
            updated_at: self.updated_at,
        }
    }
}

/// Writes a finished request into its entry, unless the entry was removed or
/// a newer request has taken its place.
async fn settle(store: &Store, key: &QueryKey, fetch_id: u64, outcome: Outcome) {
    let mut entries = store.lock().await;
    let Some(entry) = entries.get_mut(key) else {
        return;
    };
    if !entry.in_flight.as_ref().is_some_and(|(id, _)| *id == fetch_id) {
        tracing::debug!(%key, "dropping superseded result");
        return;
    }
    entry.in_flight = None;
    match outcome {
        Ok(value) => {
            entry.data = Some(value);
            entry.error = None;
            entry.updated_at = Some(Instant::now());
        }
        Err(message) => {
            tracing::warn!(endpoint = key.name(), %key, error = %message, "query failed, keeping previous data");
            entry.error = Some(message);
        }
    }
}

/// Keyed store of query results shared by every page.
///
/// Cloning is cheap; clones share one store.
#[derive(Clone, Default)]
pub struct QueryClient {
    entries: Arc<Store>,
    next_fetch_id: Arc<AtomicU64>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached state of `key`, refetching through `fetcher` when
    /// the entry is missing or older than `options.refresh_after()`.
    ///
    /// - Callers that find a request already in flight join it instead of
    ///   issuing another one. If the entry still holds older data they get
    ///   that data back immediately rather than waiting.
    /// - Requests run on their own task, so they settle even when every
    ///   caller waiting on them is cancelled.
    /// - A failed request records its message and keeps the previous data.
    /// - A request whose entry was invalidated while it ran writes nothing.
    pub async fn fetch<T, E, F, Fut>(&self, key: QueryKey, options: &QueryOptions, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        E: Display + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Instant::now();
        let request = {
            let mut entries = self.entries.lock().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(now, options.cache_time));
            entry.last_used = now;
            entry.cache_time = options.cache_time;

            if entry.is_fresh(options.refresh_after(), now) {
                tracing::trace!(%key, "cache hit");
                return entry.state();
            }

            match &entry.in_flight {
                Some((_, request)) => {
                    if entry.data.is_some() {
                        return entry.state();
                    }
                    tracing::trace!(%key, "joining in-flight request");
                    request.clone()
                }
                None => {
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let pending = fetcher();
                    let store = Arc::downgrade(&self.entries);
                    let settle_key = key.clone();
                    let request = async move {
                        let outcome = pending
                            .await
                            .map(|value| Arc::new(value) as CachedValue)
                            .map_err(|e| e.to_string());
                        // Nothing to write into once the client is gone.
                        if let Some(store) = store.upgrade() {
                            settle(&store, &settle_key, id, outcome).await;
                        }
                    }
                    .boxed()
                    .shared();
                    tracing::debug!(%key, stale = entry.data.is_some(), "fetching");
                    entry.in_flight = Some((id, request.clone()));
                    tokio::spawn(request.clone());
                    request
                }
            }
        };

        request.await;

        let entries = self.entries.lock().await;
        entries.get(&key).map(Entry::state::<T>).unwrap_or_default()
    }

    /// The cached state of `key` without triggering a request.
    pub async fn snapshot<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.lock().await;
        entries.get(key).map(Entry::state::<T>).unwrap_or_default()
    }

    /// Marks `key` stale and detaches its in-flight request, whose result
    /// will then be dropped. Cached data stays visible until the refetch.
    pub async fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.updated_at = None;
            entry.in_flight = None;
        }
    }

    /// Drops entries nobody has read for longer than their cache time.
    /// Returns how many were removed.
    pub async fn gc(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.in_flight.is_some() || now.duration_since(entry.last_used) < entry.cache_time
        });
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "collected unused queries");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{advance, sleep};

    fn counting(calls: &Arc<AtomicUsize>, value: u32) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                sleep(Duration::from_millis(100)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    fn failing(message: &'static str) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> {
        move || async move { Err(message.to_string()) }.boxed()
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetches_share_one_request() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("stats");

        let (a, b) = tokio::join!(
            client.fetch(key.clone(), &opts, counting(&calls, 7)),
            client.fetch(key.clone(), &opts, counting(&calls, 8)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.data(), Some(&7));
        assert_eq!(b.data(), Some(&7));
        assert!(!a.is_loading && !b.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_data_is_served_from_cache_until_stale() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("overview").with(&7u32);

        client.fetch(key.clone(), &opts, counting(&calls, 1)).await;
        let cached = client.fetch(key.clone(), &opts, counting(&calls, 2)).await;
        assert_eq!(cached.data(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        advance(opts.stale_time + Duration::from_secs(1)).await;
        let refreshed = client.fetch(key.clone(), &opts, counting(&calls, 3)).await;
        assert_eq!(refreshed.data(), Some(&3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_interval_triggers_refetch() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default().polling(Duration::from_secs(30));
        let key = QueryKey::new("health");

        client.fetch(key.clone(), &opts, counting(&calls, 1)).await;
        advance(Duration::from_secs(10)).await;
        client.fetch(key.clone(), &opts, counting(&calls, 2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(31)).await;
        let polled = client.fetch(key.clone(), &opts, counting(&calls, 2)).await;
        assert_eq!(polled.data(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_keeps_previous_data() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("tokens");

        client.fetch(key.clone(), &opts, counting(&calls, 5)).await;
        advance(opts.stale_time).await;

        let failed = client.fetch(key.clone(), &opts, failing("Server error")).await;
        assert_eq!(failed.data(), Some(&5));
        assert_eq!(failed.error.as_deref(), Some("Server error"));

        let recovered = client.fetch(key.clone(), &opts, counting(&calls, 6)).await;
        assert_eq!(recovered.data(), Some(&6));
        assert!(recovered.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_has_no_data() {
        let client = QueryClient::new();
        let state = client
            .fetch(QueryKey::new("exchanges"), &QueryOptions::default(), failing("down"))
            .await;
        assert!(state.data.is_none());
        assert!(state.is_error());
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_data_is_served_while_refetching() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("opportunities").with(&1u32);

        client.fetch(key.clone(), &opts, counting(&calls, 1)).await;
        advance(opts.stale_time).await;

        let (refetched, meanwhile) = tokio::join!(
            client.fetch(key.clone(), &opts, counting(&calls, 2)),
            async {
                tokio::task::yield_now().await;
                client.fetch(key.clone(), &opts, counting(&calls, 3)).await
            }
        );

        assert_eq!(meanwhile.data(), Some(&1));
        assert!(meanwhile.is_fetching);
        assert!(!meanwhile.is_loading);
        assert_eq!(refetched.data(), Some(&2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidated_request_result_is_ignored() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("analytics").with(&30u32);

        let (superseded, ()) = tokio::join!(
            client.fetch(key.clone(), &opts, counting(&calls, 9)),
            async {
                tokio::task::yield_now().await;
                client.invalidate(&key).await;
            }
        );

        assert!(superseded.data.is_none());
        let cached: QueryState<u32> = client.snapshot(&key).await;
        assert!(cached.data.is_none());
        assert!(!cached.is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_refetch_still_settles() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("stats");

        client.fetch(key.clone(), &opts, counting(&calls, 1)).await;
        advance(opts.stale_time).await;

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            client.fetch(key.clone(), &opts, counting(&calls, 2)),
        )
        .await;
        assert!(abandoned.is_err());

        sleep(Duration::from_millis(200)).await;
        let settled: QueryState<u32> = client.snapshot(&key).await;
        assert_eq!(settled.data(), Some(&2));
        assert!(!settled.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Stale again: the next read issues a new request instead of
        // waiting on the abandoned one.
        advance(opts.stale_time).await;
        let polled = client.fetch(key.clone(), &opts, counting(&calls, 3)).await;
        assert_eq!(polled.data(), Some(&3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        advance(opts.cache_time + Duration::from_secs(1)).await;
        assert_eq!(client.gc().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_first_load_still_fills_the_cache() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();
        let key = QueryKey::new("overview").with(&7u32);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            client.fetch(key.clone(), &opts, counting(&calls, 4)),
        )
        .await;
        assert!(abandoned.is_err());

        let joined = client.fetch(key.clone(), &opts, counting(&calls, 5)).await;
        assert_eq!(joined.data(), Some(&4));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_entries_are_collected() {
        let client = QueryClient::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let opts = QueryOptions::default();

        client.fetch(QueryKey::new("a"), &opts, counting(&calls, 1)).await;
        advance(Duration::from_secs(300)).await;
        client.fetch(QueryKey::new("b"), &opts, counting(&calls, 2)).await;
        assert_eq!(client.gc().await, 0);

        advance(Duration::from_secs(301)).await;
        assert_eq!(client.gc().await, 1);
        assert_eq!(client.len().await, 1);
        let gone: QueryState<u32> = client.snapshot(&QueryKey::new("a")).await;
        assert!(gone.data.is_none());
    }
}
