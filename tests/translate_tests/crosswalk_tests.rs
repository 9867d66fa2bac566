//! Crosswalk Tests
//!
//! Tests verify:
//! - Identifier construction and parsing
//! - Each notification field lands in the right Dublin Core element
//! - Missing fields produce empty elements, never errors

use chrono::{TimeZone, Utc};

use oaigate::backend::{Author, License, NotificationMetadata, NotificationRecord, Source, TypedIdentifier};
use oaigate::translate::{self, internal_id, oai_identifier, OAI_DC};

const NS: &str = "pubrouter.jisc.ac.uk";

fn full_record() -> NotificationRecord {
    let metadata = NotificationMetadata {
        title: Some("On Routing".into()),
        publisher: Some("Example Press".into()),
        source: Some(Source {
            name: Some("Journal of Routing".into()),
            identifier: vec![TypedIdentifier::new("issn", "1234-5678")],
        }),
        identifier: vec![TypedIdentifier::new("doi", "10.1/abc")],
        kind: Some("article".into()),
        author: vec![
            Author {
                name: Some("Smith, J".into()),
                identifier: vec![TypedIdentifier::new("orcid", "0000-0001")],
                affiliation: Some("University A".into()),
            },
            Author {
                name: Some("Jones, K".into()),
                identifier: vec![],
                affiliation: Some("University A".into()),
            },
            Author {
                name: Some("Lee, M".into()),
                identifier: vec![],
                affiliation: Some("Institute B".into()),
            },
        ],
        language: Some("eng".into()),
        publication_date: Some("2016-01-05".into()),
        license_ref: Some(License {
            title: Some("CC BY".into()),
        }),
        subject: vec!["routing".into(), "metadata".into()],
    };

    NotificationRecord::new("abc123", Utc.with_ymd_and_hms(2016, 1, 5, 12, 0, 0).unwrap())
        .with_metadata(metadata)
}

// =============================================================================
// Identifier Tests
// =============================================================================

#[test]
fn test_oai_identifier_format() {
    assert_eq!(
        oai_identifier(NS, "abc123"),
        "oai:pubrouter.jisc.ac.uk/notification:abc123"
    );
}

#[test]
fn test_internal_id_takes_last_segment() {
    assert_eq!(internal_id("oai:pubrouter.jisc.ac.uk/notification:abc123"), "abc123");
    assert_eq!(internal_id("abc123"), "abc123");
    assert_eq!(internal_id("oai:x/notification:"), "");
}

// =============================================================================
// Crosswalk Tests
// =============================================================================

#[test]
fn test_full_record_crosswalk() {
    let record = translate::translate(&full_record(), NS);
    let dc = &record.metadata;

    assert_eq!(record.identifier, "oai:pubrouter.jisc.ac.uk/notification:abc123");
    assert_eq!(record.datestamp, Utc.with_ymd_and_hms(2016, 1, 5, 12, 0, 0).unwrap());

    assert_eq!(dc.title, vec!["On Routing"]);
    assert_eq!(dc.publisher, vec!["Example Press"]);
    assert_eq!(dc.source, vec!["Journal of Routing", "issn:1234-5678"]);
    assert_eq!(dc.identifier, vec!["doi:10.1/abc"]);
    assert_eq!(dc.kind, vec!["article"]);
    assert_eq!(dc.creator, vec!["Smith, J", "orcid:0000-0001", "Jones, K", "Lee, M"]);
    assert_eq!(dc.language, vec!["eng"]);
    assert_eq!(dc.date, vec!["2016-01-05"]);
    assert_eq!(dc.rights, vec!["CC BY"]);
    assert_eq!(dc.subject, vec!["routing", "metadata"]);
}

#[test]
fn test_affiliations_deduplicated_in_order() {
    let dc = translate::translate(&full_record(), NS).metadata;
    assert_eq!(dc.contributor, vec!["University A", "Institute B"]);
}

#[test]
fn test_empty_metadata_translates_to_empty_elements() {
    let record = NotificationRecord::new("bare", Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap());
    let out = translate::translate(&record, NS);

    assert!(out.metadata.elements().iter().all(|(_, values)| values.is_empty()));
    assert_eq!(out.identifier, "oai:pubrouter.jisc.ac.uk/notification:bare");
}

#[test]
fn test_elements_in_document_order() {
    let dc = translate::translate(&full_record(), NS).metadata;
    let names: Vec<_> = dc.elements().iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec![
            "title", "publisher", "source", "identifier", "type", "creator", "contributor",
            "language", "date", "rights", "subject"
        ]
    );
}

#[test]
fn test_only_oai_dc_is_supported() {
    assert_eq!(OAI_DC.prefix, "oai_dc");
}

#[test]
fn test_backend_json_crosswalk() {
    let json = r#"{
        "id": "n1",
        "analysis_date": "2016-01-05T12:00:00Z",
        "metadata": {
            "title": "From JSON",
            "type": "article",
            "identifier": [{"type": "doi", "id": "10.9/xyz"}],
            "unknown_field": 1
        }
    }"#;
    let record: NotificationRecord = serde_json::from_str(json).unwrap();
    let dc = translate::translate(&record, NS).metadata;

    assert_eq!(dc.title, vec!["From JSON"]);
    assert_eq!(dc.kind, vec!["article"]);
    assert_eq!(dc.identifier, vec!["doi:10.9/xyz"]);
}
