//! Backend pagination client
//!
//! The single point of contact with the notification store for the
//! protocol engine: one page per call, never aggregating.
//!
//! ## Responsibilities
//! - Report the harvesting horizon and default the lower date bound to it
//! - Fix the page size
//! - Retry transient failures with exponential backoff

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{NotificationRecord, NotificationSource, PAGE_SIZE};
use crate::clock::Clock;
use crate::config::Config;
use crate::cursor::Scope;
use crate::dates::format_datestamp;
use crate::error::Result;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,

    /// Delay before the second attempt; doubles after each failure
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// Only transient errors (`BackendUnavailable`) are retried.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.backoff;
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.attempts,
                        error = %e,
                        "{what} failed, retrying in {:?}",
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self::new(config.retry_attempts, config.retry_backoff)
    }
}

/// Paged access to notifications inside the harvesting horizon
#[derive(Clone)]
pub struct Pager {
    source: Arc<dyn NotificationSource>,
    clock: Arc<dyn Clock>,
    lookback: Duration,
    retry: RetryPolicy,
}

impl Pager {
    pub fn new(
        source: Arc<dyn NotificationSource>,
        clock: Arc<dyn Clock>,
        lookback: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            clock,
            lookback,
            retry,
        }
    }

    /// Earliest date harvesters can reach: now minus the lookback
    pub fn horizon(&self) -> DateTime<Utc> {
        let lookback = chrono::Duration::from_std(self.lookback).unwrap_or(chrono::Duration::MAX);
        self.clock
            .now()
            .checked_sub_signed(lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Fetch one page of [`PAGE_SIZE`] notifications
    ///
    /// `since` defaults to the horizon. A given `since` is used as is, so
    /// every page of one listing counts offsets from the same lower bound.
    pub async fn fetch(
        &self,
        scope: &Scope,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> Result<Vec<NotificationRecord>> {
        let since = since.unwrap_or_else(|| self.horizon());

        tracing::debug!(
            scope = %scope,
            since = %format_datestamp(&since),
            page,
            "fetching notification page"
        );

        let records = self
            .retry
            .run("notification page", || self.source.list(scope, since, page, PAGE_SIZE))
            .await?;

        tracing::debug!(scope = %scope, page, count = records.len(), "notification page received");
        Ok(records)
    }

    /// Look up a single notification
    pub async fn fetch_one(&self, id: &str) -> Result<Option<NotificationRecord>> {
        self.retry
            .run("notification lookup", || self.source.get(id))
            .await
    }
}
