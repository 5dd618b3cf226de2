//! Short-lived read cache with in-flight de-duplication.
//!
//! At most one fetch is outstanding per cache. Callers arriving while it runs
//! await the same result. Successful results are served until the TTL expires
//! or [`ReadCache::invalidate`] is called; failures are never stored.

use freeclub_core::Result;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync>;
type SharedFetch<T> = Shared<BoxFuture<'static, Result<Arc<Vec<T>>>>>;

struct Entry<T> {
    items: Arc<Vec<T>>,
    fetched_at: Instant,
}

struct State<T> {
    entry: Option<Entry<T>>,
    in_flight: Option<SharedFetch<T>>,
    /// Bumped by every invalidation; a fetch started under an older
    /// generation must not repopulate the cache.
    generation: u64,
}

pub struct ReadCache<T> {
    name: &'static str,
    ttl: Duration,
    fetcher: Fetcher<T>,
    state: Arc<Mutex<State<T>>>,
}

impl<T> Clone for ReadCache<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            ttl: self.ttl,
            fetcher: Arc::clone(&self.fetcher),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Send + Sync + 'static> ReadCache<T> {
    pub fn new<F, Fut>(name: &'static str, ttl: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move || fetch().boxed());
        Self {
            name,
            ttl,
            fetcher,
            state: Arc::new(Mutex::new(State {
                entry: None,
                in_flight: None,
                generation: 0,
            })),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached list, joining or starting a fetch when it is stale.
    pub async fn get(&self) -> Result<Arc<Vec<T>>> {
        let fetch = {
            let mut state = self.lock();
            if let Some(items) = self.fresh_items(&state) {
                tracing::trace!(cache = self.name, "cache hit");
                return Ok(items);
            }
            if let Some(in_flight) = state.in_flight.clone() {
                tracing::trace!(cache = self.name, "joining in-flight fetch");
                in_flight
            } else {
                let fetch = self.start_fetch(state.generation);
                state.in_flight = Some(fetch.clone());
                fetch
            }
        };
        fetch.await
    }

    /// The cached list if it is still fresh. Never fetches.
    pub fn peek(&self) -> Option<Arc<Vec<T>>> {
        let state = self.lock();
        self.fresh_items(&state)
    }

    pub fn is_fresh(&self) -> bool {
        self.peek().is_some()
    }

    /// Drops the cached list and detaches any in-flight fetch.
    ///
    /// Callers already awaiting the detached fetch still get its result, but
    /// it is not stored.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.entry = None;
        state.in_flight = None;
        state.generation = state.generation.wrapping_add(1);
        tracing::debug!(cache = self.name, "cache invalidated");
    }

    fn fresh_items(&self, state: &State<T>) -> Option<Arc<Vec<T>>> {
        state
            .entry
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.items))
    }

    fn start_fetch(&self, generation: u64) -> SharedFetch<T> {
        tracing::debug!(cache = self.name, "cache miss, fetching");
        let request = (self.fetcher)();
        let state = Arc::clone(&self.state);
        let name = self.name;

        async move {
            let result = request.await.map(Arc::new);
            {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation == generation {
                    state.in_flight = None;
                    if let Ok(items) = &result {
                        state.entry = Some(Entry {
                            items: Arc::clone(items),
                            fetched_at: Instant::now(),
                        });
                    }
                }
            }
            if let Err(e) = &result {
                tracing::warn!(cache = name, error = %e, "fetch failed");
            }
            result
        }
        .boxed()
        .shared()
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
