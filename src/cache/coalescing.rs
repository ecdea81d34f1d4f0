//! 合并式缓存
//!
//! 同一 key 同时最多只有一个 fetch 在执行：
//! - 缓存命中：直接返回
//! - 已有 fetch 在途：克隆其共享 future 一起等待同一结果
//! - 否则：登记 pending，spawn fetch，完成后写缓存并清除 pending
//!
//! fetch 在独立任务中执行，调用方放弃等待不会取消它。每次 fetch 带一个
//! 递增代次，只有当前登记的代次可以写缓存；`invalidate()` 清空缓存的
//! 同时让在途 fetch 失效，它们的结果只返回给各自的等待者。失败结果
//! 不写缓存，下次请求会重新 fetch。

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::errors::{PromoError, Result};

type FetchResult<V> = Result<Arc<V>>;
type SharedFetch<V> = Shared<BoxFuture<'static, FetchResult<V>>>;

struct PendingFetch<V> {
    generation: u64,
    future: SharedFetch<V>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    fetches: AtomicU64,
    discarded: AtomicU64,
}

/// 缓存统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// 加入在途 fetch 的请求数
    pub coalesced: u64,
    /// 实际发起的 fetch 数
    pub fetches: u64,
    /// 因代次过期未写入缓存的 fetch 数
    pub discarded: u64,
}

struct Inner<K, V> {
    entries: Cache<K, Arc<V>>,
    pending: Mutex<HashMap<K, PendingFetch<V>>>,
    next_generation: AtomicU64,
    counters: Counters,
}

pub struct CoalescingCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for CoalescingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> CoalescingCache<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(max_capacity: u64) -> Self {
        debug!(
            "CoalescingCache initialized with max capacity: {}",
            max_capacity
        );
        Self {
            inner: Arc::new(Inner {
                entries: Cache::builder().max_capacity(max_capacity).build(),
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                counters: Counters::default(),
            }),
        }
    }

    /// 只查缓存，不触发 fetch
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.inner.entries.get(key)
    }

    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> FetchResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let counters = &self.inner.counters;

        if let Some(hit) = self.inner.entries.get(&key) {
            counters.hits.fetch_add(1, Ordering::Relaxed);
            trace!("CoalescingCache: hit for {:?}", key);
            return Ok(hit);
        }

        let shared = {
            let mut pending = self.inner.pending.lock();

            // 拿锁期间可能已有 fetch 完成
            if let Some(hit) = self.inner.entries.get(&key) {
                counters.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(hit);
            }

            match pending.get(&key) {
                Some(in_flight) => {
                    counters.coalesced.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        "CoalescingCache: joining in-flight fetch for {:?} (generation {})",
                        key, in_flight.generation
                    );
                    in_flight.future.clone()
                }
                None => {
                    counters.misses.fetch_add(1, Ordering::Relaxed);
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(
                        "CoalescingCache: miss for {:?}, starting fetch (generation {})",
                        key, generation
                    );
                    let future = Inner::spawn_fetch(&self.inner, key.clone(), generation, fetch());
                    pending.insert(
                        key,
                        PendingFetch {
                            generation,
                            future: future.clone(),
                        },
                    );
                    future
                }
            }
        };

        shared.await
    }

    /// 清空缓存，并让所有在途 fetch 失效
    pub fn invalidate(&self) {
        let mut pending = self.inner.pending.lock();
        let retired = pending.len();
        pending.clear();
        self.inner.entries.invalidate_all();
        debug!(
            "CoalescingCache: invalidated all entries, retired {} in-flight fetches",
            retired
        );
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.inner.pending.lock().contains_key(key)
    }

    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().len()
    }

    pub fn pending_keys(&self) -> Vec<K> {
        self.inner.pending.lock().keys().cloned().collect()
    }

    pub fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            coalesced: c.coalesced.load(Ordering::Relaxed),
            fetches: c.fetches.load(Ordering::Relaxed),
            discarded: c.discarded.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn spawn_fetch<Fut>(inner: &Arc<Self>, key: K, generation: u64, fetch: Fut) -> SharedFetch<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        inner.counters.fetches.fetch_add(1, Ordering::Relaxed);

        let task_inner = Arc::clone(inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fetch.await.map(Arc::new);
            task_inner.complete(&task_key, generation, &result);
            result
        });

        let inner = Arc::clone(inner);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(PromoError::fetch(format!(
                        "fetch task for {:?} did not finish: {}",
                        key, e
                    )));
                    inner.complete(&key, generation, &result);
                    result
                }
            }
        }
        .boxed()
        .shared()
    }

    /// fetch 结束：仅当前代次可以写缓存并清除 pending
    fn complete(&self, key: &K, generation: u64, result: &FetchResult<V>) {
        let mut pending = self.pending.lock();
        let is_latest = pending
            .get(key)
            .is_some_and(|in_flight| in_flight.generation == generation);
        if !is_latest {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            debug!(
                "CoalescingCache: discarding superseded fetch for {:?} (generation {})",
                key, generation
            );
            return;
        }

        pending.remove(key);
        match result {
            Ok(value) => {
                self.entries.insert(key.clone(), Arc::clone(value));
                trace!("CoalescingCache: cached {:?} (generation {})", key, generation);
            }
            Err(e) => warn!("CoalescingCache: fetch for {:?} failed, not cached: {}", key, e),
        }
    }
}
