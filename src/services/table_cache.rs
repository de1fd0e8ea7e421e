//! Time-expiring cache for the loaded tender table.
//!
//! Holds at most one table. Freshness is the only key: filters are applied
//! in memory after a fetch and never reach the data source. Concurrent fetches
//! of an expired table share a single load.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::loader::TenderSource;
use crate::domain::TenderTable;
use crate::error::DashboardResult;
use crate::pipeline::FilterOptions;

/// A loaded table plus everything derived from it once per load.
#[derive(Debug)]
pub struct TableSnapshot {
    pub tenders: TenderTable,
    pub options: FilterOptions,
    pub loaded_at: Instant,
}

impl TableSnapshot {
    pub fn new(tenders: TenderTable, loaded_at: Instant) -> Self {
        let options = FilterOptions::from_table(&tenders);
        Self {
            tenders,
            options,
            loaded_at,
        }
    }

    pub fn age(&self) -> Duration {
        self.loaded_at.elapsed()
    }
}

pub struct TableCache<S> {
    source: S,
    ttl: Duration,
    current: RwLock<Option<Arc<TableSnapshot>>>,
    /// Held for the duration of a load; never taken while `current` is locked.
    reload_lock: Mutex<()>,
}

impl<S: TenderSource> TableCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the cached table, reloading it first when it is older than the TTL.
    ///
    /// Load failures are returned as-is and leave any previous table in place.
    pub async fn fetch(&self) -> DashboardResult<Arc<TableSnapshot>> {
        if let Some(snapshot) = self.fresh() {
            debug!(age_ms = snapshot.age().as_millis() as u64, "Table cache hit");
            return Ok(snapshot);
        }

        let _guard = self.reload_lock.lock().await;
        // Whoever held the lock before us may have just reloaded.
        if let Some(snapshot) = self.fresh() {
            debug!("Table reloaded by a concurrent fetch");
            return Ok(snapshot);
        }
        self.reload().await
    }

    /// Loads unconditionally and replaces the cached table. Callers hold `reload_lock`.
    async fn reload(&self) -> DashboardResult<Arc<TableSnapshot>> {
        let tenders = self.source.load().await?;
        let snapshot = Arc::new(TableSnapshot::new(tenders, Instant::now()));

        *self.current.write() = Some(snapshot.clone());

        info!(
            rows = snapshot.tenders.len(),
            ttl_secs = self.ttl.as_secs(),
            "Tender table cached"
        );
        Ok(snapshot)
    }

    /// Drops the cached table so the next fetch reloads.
    pub fn invalidate(&self) {
        if self.current.write().take().is_some() {
            debug!("Table cache invalidated");
        }
    }

    /// Age of the cached table, if any.
    pub fn cached_age(&self) -> Option<Duration> {
        self.current.read().as_ref().map(|snapshot| snapshot.age())
    }

    fn fresh(&self) -> Option<Arc<TableSnapshot>> {
        self.current
            .read()
            .as_ref()
            .filter(|snapshot| snapshot.age() < self.ttl)
            .cloned()
    }
}
