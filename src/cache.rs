//! Whole-database schema cache.
//!
//! The cache holds at most one [`Schema`]: the result of the last successful
//! fetch. It has no TTL and no per-table invalidation; callers drop it with
//! [`SchemaCache::clear`] when the database changes and the next
//! [`SchemaCache::get`] fetches again.
//!
//! `get` and `clear` share one critical section. The fetch runs while the lock
//! is held, so a `clear` issued mid-fetch waits for the fetch to finish and no
//! caller ever sees a half-built schema.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::schema::Schema;

/// Process-scoped cache for the database schema.
#[derive(Debug, Default)]
pub struct SchemaCache {
    slot: Mutex<Option<Arc<Schema>>>
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema, or run `fetch` once and cache its result.
    ///
    /// An empty schema is returned but not served from cache on the next call.
    ///
    /// # Errors
    ///
    /// Propagates the error from `fetch` unchanged. The cache keeps whatever
    /// it held before the call.
    pub fn get<F, E>(&self, fetch: F) -> Result<Arc<Schema>, E>
    where
        F: FnOnce() -> Result<Schema, E>
    {
        let mut slot = self.lock();
        if let Some(schema) = slot.as_ref().filter(|schema| !schema.is_empty()) {
            info!(tables = schema.len(), "Fetching schema from cache");
            return Ok(Arc::clone(schema));
        }

        info!("Fetching schema from the database");
        let schema = Arc::new(fetch()?);
        *slot = Some(Arc::clone(&schema));
        info!(tables = schema.len(), "Schema fetched and cached");
        Ok(schema)
    }

    /// Drop the cached schema. Clearing an empty cache is a no-op.
    pub fn clear(&self) {
        if self.lock().take().is_some() {
            info!("Schema cache cleared");
        } else {
            debug!("Schema cache already empty");
        }
    }

    /// Whether a non-empty schema is currently cached
    pub fn is_cached(&self) -> bool {
        self.lock().as_ref().is_some_and(|schema| !schema.is_empty())
    }

    // The slot is only ever replaced whole, so a poisoned lock still guards a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<Schema>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
