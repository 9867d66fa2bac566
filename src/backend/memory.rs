//! In-memory notification source
//!
//! Behaves like the notification API (ascending date order, `since` lower
//! bound, 1-based pages, unknown repositories rejected) without a network.
//! Counts calls and can be told to fail, which makes it the engine's test
//! double.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{NotificationRecord, NotificationSource};
use crate::cursor::Scope;
use crate::error::{GateError, Result};

/// Notification store held in memory
///
/// ## Concurrency:
/// - `records` / `routes`: RwLock (many concurrent readers)
/// - counters: atomics, so `&self` everywhere
#[derive(Default)]
pub struct MemorySource {
    /// All notifications, kept sorted by (last_updated, id)
    records: RwLock<Vec<NotificationRecord>>,

    /// Repository account id -> ids of notifications routed to it
    routes: RwLock<HashMap<String, HashSet<String>>>,

    /// Remaining calls that should fail as unavailable
    failures_pending: AtomicU32,

    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source preloaded with unrouted notifications
    pub fn with_records(records: impl IntoIterator<Item = NotificationRecord>) -> Self {
        let source = Self::new();
        for record in records {
            source.insert(record);
        }
        source
    }

    /// Add a notification visible in the global scope only
    pub fn insert(&self, record: NotificationRecord) {
        let mut records = self.records.write();
        records.retain(|r| r.id != record.id);
        let pos = records
            .partition_point(|r| (r.last_updated, r.id.as_str()) < (record.last_updated, record.id.as_str()));
        records.insert(pos, record);
    }

    /// Register a repository account with no notifications yet
    pub fn add_repository(&self, repo_id: impl Into<String>) {
        self.routes.write().entry(repo_id.into()).or_default();
    }

    /// Add a notification and route it to a repository
    pub fn route(&self, repo_id: impl Into<String>, record: NotificationRecord) {
        self.routes
            .write()
            .entry(repo_id.into())
            .or_default()
            .insert(record.id.clone());
        self.insert(record);
    }

    /// Make the next `count` calls fail with `BackendUnavailable`
    pub fn fail_next(&self, count: u32) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    /// Number of `list` calls served (including failed ones)
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `get` calls served (including failed ones)
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.get_calls()
    }

    fn maybe_fail(&self) -> Result<()> {
        let took = self
            .failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match took {
            Ok(_) => Err(GateError::BackendUnavailable("injected failure".to_string())),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationSource for MemorySource {
    async fn list(
        &self,
        scope: &Scope,
        since: DateTime<Utc>,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<NotificationRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        let routes = self.routes.read();
        let allowed = match scope {
            Scope::Global => None,
            Scope::Repository(id) => Some(
                routes
                    .get(id)
                    .ok_or_else(|| GateError::UnknownScope(id.clone()))?,
            ),
        };

        let skip = (page.max(1) as usize - 1) * page_size;
        let records = self.records.read();
        Ok(records
            .iter()
            .filter(|r| r.last_updated >= since)
            .filter(|r| allowed.map_or(true, |ids| ids.contains(&r.id)))
            .skip(skip)
            .take(page_size)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_fail()?;

        Ok(self.records.read().iter().find(|r| r.id == id).cloned())
    }
}
