//! Notification records
//!
//! The subset of the notification API's JSON that the crosswalk reads.
//! Unknown fields are ignored; missing optional fields default to empty.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::parse_backend_date;

/// A routed notification as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNotification")]
pub struct NotificationRecord {
    /// Backend notification id
    pub id: String,

    /// When the notification last changed; drives date windows
    #[serde(rename = "analysis_date")]
    pub last_updated: DateTime<Utc>,

    /// Bibliographic metadata
    pub metadata: NotificationMetadata,
}

/// Notifications carry `analysis_date` and usually `last_updated` too;
/// the former wins when both are present.
#[derive(Deserialize)]
struct WireNotification {
    id: String,
    #[serde(default)]
    analysis_date: Option<String>,
    #[serde(default)]
    last_updated: Option<String>,
    #[serde(default)]
    metadata: NotificationMetadata,
}

impl TryFrom<WireNotification> for NotificationRecord {
    type Error = String;

    fn try_from(wire: WireNotification) -> Result<Self, Self::Error> {
        let raw = wire
            .analysis_date
            .or(wire.last_updated)
            .ok_or_else(|| format!("notification {} has no date", wire.id))?;
        let last_updated = parse_backend_date(&raw)
            .ok_or_else(|| format!("notification {} has unrecognised date {raw:?}", wire.id))?;
        Ok(Self {
            id: wire.id,
            last_updated: last_updated.trunc_subsecs(0),
            metadata: wire.metadata,
        })
    }
}

impl NotificationRecord {
    /// A record with empty metadata
    ///
    /// Dates are kept at whole seconds, the granularity datestamps and
    /// request bounds are expressed in.
    pub fn new(id: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            last_updated: last_updated.trunc_subsecs(0),
            metadata: NotificationMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: NotificationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationMetadata {
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub source: Option<Source>,
    pub identifier: Vec<TypedIdentifier>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub author: Vec<Author>,
    pub language: Option<String>,
    pub publication_date: Option<String>,
    pub license_ref: Option<License>,
    pub subject: Vec<String>,
}

/// The journal or other venue a notification came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub name: Option<String>,
    pub identifier: Vec<TypedIdentifier>,
}

/// `{"type": "doi", "id": "10.1/abc"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypedIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl TypedIdentifier {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// `type:id`, the form used in Dublin Core output
    pub fn qualified(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: Option<String>,
    pub identifier: Vec<TypedIdentifier>,
    pub affiliation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct License {
    pub title: Option<String>,
}
