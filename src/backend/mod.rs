//! Backend Module
//!
//! Access to the notification delivery API.
//!
//! ## Layers
//! - [`NotificationSource`]: the raw data source (HTTP client, or the
//!   in-memory source used by tests)
//! - [`Pager`]: one page per call, with the harvesting horizon applied and
//!   transient failures retried

mod record;
mod client;
mod memory;
mod pager;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use record::{Author, License, NotificationMetadata, NotificationRecord, Source, TypedIdentifier};
pub use client::JperClient;
pub use memory::MemorySource;
pub use pager::{Pager, RetryPolicy};

use crate::cursor::Scope;
use crate::error::Result;

/// Records per backend page; not negotiable by harvesters
pub const PAGE_SIZE: usize = 100;

/// A paginated store of notifications
///
/// Pages are 1-based and ordered by ascending `last_updated`.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// One page of notifications updated at or after `since`
    ///
    /// An unknown repository scope is `GateError::UnknownScope`.
    async fn list(
        &self,
        scope: &Scope,
        since: DateTime<Utc>,
        page: u32,
        page_size: usize,
    ) -> Result<Vec<NotificationRecord>>;

    /// A single notification, or `None` if it does not exist
    async fn get(&self, id: &str) -> Result<Option<NotificationRecord>>;
}
