//! Cursor definitions
//!
//! The pagination state of one harvesting listing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

/// The partition of notifications a request can see
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Every routed notification
    Global,

    /// Notifications routed to one repository account
    Repository(String),
}

impl Scope {
    /// Repository account id, if scoped
    pub fn repository_id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Repository(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "all"),
            Scope::Repository(id) => write!(f, "repo/{id}"),
        }
    }
}

/// Where a listing is, and what it is listing
///
/// Never mutated: the next page is a new cursor from [`Cursor::next_page`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    scope: Scope,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    metadata_prefix: String,
    page: u32,
}

impl Cursor {
    /// Build a cursor, enforcing `page >= 1` and `from <= until`
    pub fn new(
        scope: Scope,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        metadata_prefix: impl Into<String>,
        page: u32,
    ) -> Result<Self> {
        let cursor = Self {
            scope,
            from,
            until,
            metadata_prefix: metadata_prefix.into(),
            page,
        };
        cursor.validate()?;
        Ok(cursor)
    }

    /// First page of a fresh listing
    pub fn first(
        scope: Scope,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        metadata_prefix: impl Into<String>,
    ) -> Result<Self> {
        Self::new(scope, from, until, metadata_prefix, 1)
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(GateError::BadCursor(format!("page {} is below 1", self.page)));
        }
        if let (Some(from), Some(until)) = (self.from, self.until) {
            if from > until {
                return Err(GateError::BadCursor(format!(
                    "from {from} is after until {until}"
                )));
            }
        }
        if self.metadata_prefix.is_empty() {
            return Err(GateError::BadCursor("empty metadata prefix".to_string()));
        }
        Ok(())
    }

    /// The cursor for the following page, or `None` past the last
    /// addressable page
    pub fn next_page(&self) -> Option<Self> {
        let page = self.page.checked_add(1)?;
        Some(Self {
            page,
            ..self.clone()
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    pub fn metadata_prefix(&self) -> &str {
        &self.metadata_prefix
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of records that precede this page
    pub fn offset(&self, page_size: usize) -> u64 {
        u64::from(self.page.saturating_sub(1)) * page_size as u64
    }
}
