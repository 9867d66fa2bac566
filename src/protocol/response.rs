//! Response definitions
//!
//! Structured results of the engine, before rendering to XML.

use chrono::{DateTime, Utc};

use super::{ProtocolError, Request};
use crate::cursor::Cursor;
use crate::translate::{MetadataFormat, MetadataRecord};

/// Protocol version reported by Identify
pub const PROTOCOL_VERSION: &str = "2.0";

/// Static repository description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifyInfo {
    pub repository_name: String,
    pub admin_email: String,
    pub earliest_datestamp: DateTime<Utc>,
    pub granularity: &'static str,
    pub deleted_record: &'static str,
}

/// Everything a harvester needs to fetch the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub cursor: Cursor,

    /// Opaque token text for the cursor
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult {
    pub records: Vec<MetadataRecord>,

    /// Present iff more pages may exist inside the date window
    pub next: Option<Continuation>,

    /// This page was reached through a resumption token
    pub resumed: bool,

    /// Position of this page's first record in the complete list
    pub offset: u64,
}

impl ListResult {
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next.as_ref().map(|c| &c.cursor)
    }
}

/// Successful verb results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Identify(IdentifyInfo),

    ListMetadataFormats {
        formats: Vec<MetadataFormat>,
        /// Protocol identifier the formats were requested for
        identifier: Option<String>,
    },

    /// Sets are not modeled; always empty
    ListSets,

    ListIdentifiers(ListResult),

    ListRecords(ListResult),

    GetRecord(MetadataRecord),
}

/// A complete answer to one request
#[derive(Debug, Clone)]
pub struct Response {
    pub request: Request,
    pub response_date: DateTime<Utc>,
    pub outcome: std::result::Result<Payload, ProtocolError>,
}

impl Response {
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}
