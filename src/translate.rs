//! Record translator
//!
//! Crosswalk from backend notifications to the one metadata format this
//! service disseminates, `oai_dc` (simple Dublin Core).

use chrono::{DateTime, Utc};

use crate::backend::NotificationRecord;

/// Descriptor of a disseminated metadata format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataFormat {
    pub prefix: &'static str,
    pub schema: &'static str,
    pub namespace: &'static str,
}

/// The only supported format
pub const OAI_DC: MetadataFormat = MetadataFormat {
    prefix: "oai_dc",
    schema: "http://www.openarchives.org/OAI/2.0/oai_dc.xsd",
    namespace: "http://www.openarchives.org/OAI/2.0/oai_dc/",
};

/// Qualifier inserted into every record identifier
pub const IDENTIFIER_QUALIFIER: &str = "notification";

/// Simple Dublin Core elements, each repeatable, in output order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DublinCore {
    pub title: Vec<String>,
    pub publisher: Vec<String>,
    pub source: Vec<String>,
    pub identifier: Vec<String>,
    pub kind: Vec<String>,
    pub creator: Vec<String>,
    pub contributor: Vec<String>,
    pub language: Vec<String>,
    pub date: Vec<String>,
    pub rights: Vec<String>,
    pub subject: Vec<String>,
}

impl DublinCore {
    /// `(element name, values)` pairs in document order
    pub fn elements(&self) -> [(&'static str, &[String]); 11] {
        [
            ("title", self.title.as_slice()),
            ("publisher", self.publisher.as_slice()),
            ("source", self.source.as_slice()),
            ("identifier", self.identifier.as_slice()),
            ("type", self.kind.as_slice()),
            ("creator", self.creator.as_slice()),
            ("contributor", self.contributor.as_slice()),
            ("language", self.language.as_slice()),
            ("date", self.date.as_slice()),
            ("rights", self.rights.as_slice()),
            ("subject", self.subject.as_slice()),
        ]
    }
}

/// A record ready for a protocol response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// `oai:<namespace>/notification:<id>`
    pub identifier: String,
    pub datestamp: DateTime<Utc>,
    pub metadata: DublinCore,
}

/// Build the protocol identifier for a notification id
pub fn oai_identifier(namespace: &str, id: &str) -> String {
    format!("oai:{namespace}/{IDENTIFIER_QUALIFIER}:{id}")
}

/// Recover the notification id from a protocol identifier
///
/// Only the segment after the last `:` matters; a bare id passes through.
pub fn internal_id(oai_identifier: &str) -> &str {
    oai_identifier.rsplit(':').next().unwrap_or(oai_identifier)
}

/// Translate one notification; pure and total
pub fn translate(record: &NotificationRecord, namespace: &str) -> MetadataRecord {
    let md = &record.metadata;
    let mut dc = DublinCore::default();

    dc.title.extend(md.title.clone());
    dc.publisher.extend(md.publisher.clone());

    if let Some(source) = &md.source {
        dc.source.extend(source.name.clone());
        dc.source.extend(source.identifier.iter().map(|i| i.qualified()));
    }

    dc.identifier.extend(md.identifier.iter().map(|i| i.qualified()));
    dc.kind.extend(md.kind.clone());

    for author in &md.author {
        dc.creator.extend(author.name.clone());
        dc.creator.extend(author.identifier.iter().map(|i| i.qualified()));
        if let Some(aff) = &author.affiliation {
            if !dc.contributor.contains(aff) {
                dc.contributor.push(aff.clone());
            }
        }
    }

    dc.language.extend(md.language.clone());
    dc.date.extend(md.publication_date.clone());
    dc.rights
        .extend(md.license_ref.as_ref().and_then(|l| l.title.clone()));
    dc.subject.extend(md.subject.iter().cloned());

    MetadataRecord {
        identifier: oai_identifier(namespace, &record.id),
        datestamp: record.last_updated,
        metadata: dc,
    }
}
