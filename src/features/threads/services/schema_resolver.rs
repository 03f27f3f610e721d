use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::threads::models::ThreadConvention;
use crate::features::threads::services::store::ThreadStore;

/// Postgres error code for a relation that does not exist
const UNDEFINED_TABLE: &str = "42P01";

/// Request-scoped memo of thread-id resolutions. Built fresh per request and
/// passed through the call chain; never shared across requests.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: HashMap<Uuid, ThreadConvention>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, thread_id: Uuid) -> Option<ThreadConvention> {
        self.entries.get(&thread_id).copied()
    }

    fn insert(&mut self, thread_id: Uuid, convention: ThreadConvention) {
        self.entries.insert(thread_id, convention);
    }
}

/// Decides which physical store owns a thread id.
///
/// Probes the legacy store first, then the modern one. A probe hitting a
/// missing relation is a non-match rather than a failure: environments that
/// never ran one subsystem simply don't have its tables.
pub struct SchemaResolver {
    legacy: Arc<dyn ThreadStore>,
    modern: Arc<dyn ThreadStore>,
}

impl SchemaResolver {
    pub fn new(legacy: Arc<dyn ThreadStore>, modern: Arc<dyn ThreadStore>) -> Self {
        Self { legacy, modern }
    }

    pub fn store(&self, convention: ThreadConvention) -> Arc<dyn ThreadStore> {
        match convention {
            ThreadConvention::Legacy => Arc::clone(&self.legacy),
            ThreadConvention::Modern => Arc::clone(&self.modern),
        }
    }

    /// Resolve which store owns `thread_id`, memoizing in `cache`.
    /// Fails `NotFound` when neither store has the row.
    pub async fn resolve(
        &self,
        thread_id: Uuid,
        cache: &mut ResolutionCache,
    ) -> Result<Arc<dyn ThreadStore>> {
        if let Some(convention) = cache.get(thread_id) {
            return Ok(self.store(convention));
        }

        if tolerate_missing_table(self.legacy.probe(thread_id).await)? {
            cache.insert(thread_id, ThreadConvention::Legacy);
            return Ok(Arc::clone(&self.legacy));
        }

        if tolerate_missing_table(self.modern.probe(thread_id).await)? {
            cache.insert(thread_id, ThreadConvention::Modern);
            return Ok(Arc::clone(&self.modern));
        }

        Err(AppError::NotFound("Thread not found".to_string()))
    }
}

/// Treat "relation does not exist" as a clean non-match; every other probe
/// error propagates.
fn tolerate_missing_table(result: Result<bool>) -> Result<bool> {
    match result {
        Err(AppError::Database(sqlx::Error::Database(ref db)))
            if db.code().as_deref() == Some(UNDEFINED_TABLE) =>
        {
            Ok(false)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryThreadStore;

    #[tokio::test]
    async fn resolves_each_convention_and_misses_cleanly() {
        let legacy = Arc::new(InMemoryThreadStore::legacy());
        let modern = Arc::new(InMemoryThreadStore::modern());
        let legacy_thread = legacy.seed_thread("alice", "bob", None);
        let modern_thread = modern.seed_thread("alice", "carol", None);

        let resolver = SchemaResolver::new(legacy.clone(), modern.clone());
        let mut cache = ResolutionCache::new();

        let store = resolver.resolve(legacy_thread.id, &mut cache).await.unwrap();
        assert_eq!(store.convention(), ThreadConvention::Legacy);

        let store = resolver.resolve(modern_thread.id, &mut cache).await.unwrap();
        assert_eq!(store.convention(), ThreadConvention::Modern);

        let miss = resolver.resolve(Uuid::new_v4(), &mut cache).await;
        assert!(matches!(miss, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn repeated_resolution_hits_the_cache() {
        let legacy = Arc::new(InMemoryThreadStore::legacy());
        let modern = Arc::new(InMemoryThreadStore::modern());
        let thread = modern.seed_thread("alice", "bob", None);

        let resolver = SchemaResolver::new(legacy.clone(), modern.clone());
        let mut cache = ResolutionCache::new();

        resolver.resolve(thread.id, &mut cache).await.unwrap();
        let probes_after_first = modern.probe_calls();

        resolver.resolve(thread.id, &mut cache).await.unwrap();
        assert_eq!(modern.probe_calls(), probes_after_first);

        // A fresh cache probes again, as a new request would
        let mut fresh = ResolutionCache::new();
        resolver.resolve(thread.id, &mut fresh).await.unwrap();
        assert!(modern.probe_calls() > probes_after_first);
    }
}
