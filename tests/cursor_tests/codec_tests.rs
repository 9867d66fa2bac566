//! Resumption Token Tests
//!
//! Tests verify:
//! - Encode/decode preserves the cursor and issue time
//! - Every malformed or tampered token is rejected as a bad cursor
//! - Decoded cursors always satisfy their invariants
//! - Expiry is measured from the issue time

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bincode::Options;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use oaigate::cursor::{decode, encode, Cursor, Scope, MAX_TOKEN_LEN, TOKEN_VERSION};
use oaigate::GateError;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn sample_cursor() -> Cursor {
    Cursor::new(
        Scope::Repository("repo-42".into()),
        Some(at(2016, 1, 1)),
        Some(at(2016, 1, 10)),
        "oai_dc",
        3,
    )
    .unwrap()
}

/// Same shape as `Cursor`, without its constructor checks
#[derive(Serialize)]
struct RawCursor {
    scope: Scope,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    metadata_prefix: String,
    page: u32,
}

/// Build a well-formed frame around arbitrary payload bytes
fn frame(version: u8, issued_at: i64, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![version];
    bytes.extend_from_slice(&issued_at.to_be_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    let crc = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&crc.to_be_bytes());
    bytes
}

fn raw_token(raw: &RawCursor) -> String {
    let payload = bincode::DefaultOptions::new().serialize(raw).unwrap();
    URL_SAFE_NO_PAD.encode(frame(TOKEN_VERSION, 1_451_606_400, &payload))
}

fn assert_bad_cursor(token: &str) {
    match decode(token) {
        Err(GateError::BadCursor(_)) => {}
        other => panic!("expected BadCursor for {token:?}, got {other:?}"),
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_decode_returns_encoded_cursor() {
    let cursor = sample_cursor();
    let issued = at(2016, 2, 1);

    let token = encode(&cursor, issued).unwrap();
    let decoded = decode(&token).unwrap();

    assert_eq!(decoded.cursor, cursor);
    assert_eq!(decoded.issued_at, issued);
}

#[test]
fn test_global_cursor_without_dates() {
    let cursor = Cursor::first(Scope::Global, None, None, "oai_dc").unwrap();
    let token = encode(&cursor, at(2016, 2, 1)).unwrap();

    let decoded = decode(&token).unwrap().cursor;
    assert_eq!(decoded.scope(), &Scope::Global);
    assert_eq!(decoded.from(), None);
    assert_eq!(decoded.until(), None);
    assert_eq!(decoded.page(), 1);
}

#[test]
fn test_next_page_token_differs() {
    let cursor = sample_cursor();
    let issued = at(2016, 2, 1);

    let a = encode(&cursor, issued).unwrap();
    let b = encode(&cursor.next_page().unwrap(), issued).unwrap();

    assert_ne!(a, b);
    assert_eq!(decode(&b).unwrap().cursor.page(), 4);
}

#[test]
fn test_no_page_after_last() {
    let cursor = Cursor::new(Scope::Global, None, None, "oai_dc", u32::MAX).unwrap();
    assert!(cursor.next_page().is_none());
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_empty_token_rejected() {
    assert_bad_cursor("");
}

#[test]
fn test_garbage_rejected() {
    assert_bad_cursor("not a token!");
    assert_bad_cursor("AAAA");
    assert_bad_cursor("!!!!!!!!!!!!!!!!!!!!!!!!");
}

#[test]
fn test_truncated_token_rejected() {
    let token = encode(&sample_cursor(), at(2016, 2, 1)).unwrap();
    for len in [1, token.len() / 2, token.len() - 3] {
        assert_bad_cursor(&token[..len]);
    }
}

#[test]
fn test_tampered_payload_rejected() {
    let token = encode(&sample_cursor(), at(2016, 2, 1)).unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;

    assert_bad_cursor(&URL_SAFE_NO_PAD.encode(bytes));
}

#[test]
fn test_unknown_version_rejected() {
    let token = encode(&sample_cursor(), at(2016, 2, 1)).unwrap();
    let bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();

    // Re-frame with a different version and a valid checksum
    let payload_len = u32::from_be_bytes(bytes[9..13].try_into().unwrap()) as usize;
    let payload = &bytes[13..13 + payload_len];
    let reframed = frame(TOKEN_VERSION + 1, 1_451_606_400, payload);

    assert_bad_cursor(&URL_SAFE_NO_PAD.encode(reframed));
}

#[test]
fn test_trailing_bytes_rejected() {
    let token = encode(&sample_cursor(), at(2016, 2, 1)).unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
    bytes.push(0);

    assert_bad_cursor(&URL_SAFE_NO_PAD.encode(bytes));
}

#[test]
fn test_overlong_token_rejected() {
    assert_bad_cursor(&"A".repeat(MAX_TOKEN_LEN + 1));
}

#[test]
fn test_page_zero_rejected() {
    let token = raw_token(&RawCursor {
        scope: Scope::Global,
        from: None,
        until: None,
        metadata_prefix: "oai_dc".into(),
        page: 0,
    });
    assert_bad_cursor(&token);
}

#[test]
fn test_inverted_dates_rejected() {
    let token = raw_token(&RawCursor {
        scope: Scope::Global,
        from: Some(at(2016, 1, 10)),
        until: Some(at(2016, 1, 1)),
        metadata_prefix: "oai_dc".into(),
        page: 1,
    });
    assert_bad_cursor(&token);
}

#[test]
fn test_valid_raw_cursor_accepted() {
    let token = raw_token(&RawCursor {
        scope: Scope::Repository("r".into()),
        from: Some(at(2016, 1, 1)),
        until: Some(at(2016, 1, 10)),
        metadata_prefix: "oai_dc".into(),
        page: 7,
    });

    let cursor = decode(&token).unwrap().cursor;
    assert_eq!(cursor.page(), 7);
    assert_eq!(cursor.scope(), &Scope::Repository("r".into()));
}

#[test]
fn test_constructor_enforces_invariants() {
    assert!(Cursor::new(Scope::Global, None, None, "oai_dc", 0).is_err());
    assert!(Cursor::new(Scope::Global, Some(at(2016, 1, 2)), Some(at(2016, 1, 1)), "oai_dc", 1).is_err());
    assert!(Cursor::new(Scope::Global, None, None, "", 1).is_err());
    assert!(Cursor::new(Scope::Global, Some(at(2016, 1, 1)), Some(at(2016, 1, 1)), "oai_dc", 1).is_ok());
}

// =============================================================================
// Expiry Tests
// =============================================================================

#[test]
fn test_token_live_within_lifetime() {
    let issued = at(2016, 2, 1);
    let token = encode(&sample_cursor(), issued).unwrap();
    let decoded = decode(&token).unwrap();
    let lifetime = Duration::from_secs(86_400);

    assert_eq!(decoded.expires_at(lifetime), at(2016, 2, 2));
    let cursor = decoded
        .into_live_cursor(at(2016, 2, 2), lifetime)
        .unwrap();
    assert_eq!(cursor, sample_cursor());
}

#[test]
fn test_token_expired_after_lifetime() {
    let issued = at(2016, 2, 1);
    let token = encode(&sample_cursor(), issued).unwrap();
    let decoded = decode(&token).unwrap();

    let late = at(2016, 2, 2) + chrono::Duration::seconds(1);
    match decoded.into_live_cursor(late, Duration::from_secs(86_400)) {
        Err(GateError::BadCursor(msg)) => assert!(msg.contains("expired")),
        other => panic!("expected expiry, got {other:?}"),
    }
}
