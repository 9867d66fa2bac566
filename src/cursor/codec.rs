//! Resumption token codec
//!
//! Encoding and decoding between [`Cursor`] and the opaque token string.
//!
//! Decoding never panics and never yields a cursor that breaks its
//! invariants: every malformed, truncated, tampered or foreign token is a
//! `GateError::BadCursor`.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bincode::Options;
use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, TimeZone, Utc};

use super::Cursor;
use crate::error::{GateError, Result};

/// Current token layout version
pub const TOKEN_VERSION: u8 = 1;

/// Header size: 1 byte version + 8 bytes issue time + 4 bytes payload length
pub const HEADER_SIZE: usize = 13;

/// Trailing CRC32 over header and payload
const CHECKSUM_SIZE: usize = 4;

/// Maximum payload size (1 KB); real cursors are well under 200 bytes
const MAX_PAYLOAD_SIZE: u32 = 1024;

/// Longest token text accepted before any decoding work
pub const MAX_TOKEN_LEN: usize = 4096;

/// A decoded token: the cursor plus when it was handed out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    pub cursor: Cursor,
    pub issued_at: DateTime<Utc>,
}

impl ResumptionToken {
    /// When this token stops being accepted
    pub fn expires_at(&self, lifetime: Duration) -> DateTime<Utc> {
        let lifetime = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);
        self.issued_at
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Unwrap the cursor if the token is still inside its lifetime
    pub fn into_live_cursor(self, now: DateTime<Utc>, lifetime: Duration) -> Result<Cursor> {
        let expires_at = self.expires_at(lifetime);
        if now > expires_at {
            return Err(GateError::BadCursor(format!(
                "token expired at {}",
                expires_at.format("%Y-%m-%dT%H:%M:%SZ")
            )));
        }
        Ok(self.cursor)
    }
}

fn payload_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(u64::from(MAX_PAYLOAD_SIZE))
        .reject_trailing_bytes()
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a cursor into token text
///
/// Format: version (1) + issued_at (8) + payload_len (4) + payload + crc (4),
/// then URL-safe base64.
pub fn encode(cursor: &Cursor, issued_at: DateTime<Utc>) -> Result<String> {
    let payload = payload_options()
        .serialize(cursor)
        .map_err(|e| GateError::Serialization(format!("cursor payload: {e}")))?;

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
    frame.put_u8(TOKEN_VERSION);
    frame.put_i64(issued_at.timestamp());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(&payload);

    let crc = crc32fast::hash(&frame);
    frame.put_u32(crc);

    Ok(URL_SAFE_NO_PAD.encode(&frame))
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode token text back into a cursor and its issue time
pub fn decode(token: &str) -> Result<ResumptionToken> {
    if token.is_empty() {
        return Err(GateError::BadCursor("empty token".to_string()));
    }
    if token.len() > MAX_TOKEN_LEN {
        return Err(GateError::BadCursor(format!(
            "token too long: {} characters (max {})",
            token.len(),
            MAX_TOKEN_LEN
        )));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| GateError::BadCursor(format!("not a token: {e}")))?;

    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(GateError::BadCursor(format!(
            "incomplete token: expected at least {} bytes, got {}",
            HEADER_SIZE + CHECKSUM_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let mut header = &bytes[..HEADER_SIZE];
    let version = header.get_u8();
    let issued_secs = header.get_i64();
    let payload_len = header.get_u32();

    if version != TOKEN_VERSION {
        return Err(GateError::BadCursor(format!(
            "unsupported token version {version} (expected {TOKEN_VERSION})"
        )));
    }

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(GateError::BadCursor(format!(
            "payload too large: {payload_len} bytes (max {MAX_PAYLOAD_SIZE})"
        )));
    }

    let body_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() != body_end + CHECKSUM_SIZE {
        return Err(GateError::BadCursor(format!(
            "token length mismatch: expected {} bytes, got {}",
            body_end + CHECKSUM_SIZE,
            bytes.len()
        )));
    }

    // Verify checksum before trusting the payload
    let stored_crc = (&bytes[body_end..]).get_u32();
    let actual_crc = crc32fast::hash(&bytes[..body_end]);
    if stored_crc != actual_crc {
        return Err(GateError::BadCursor(format!(
            "checksum mismatch: stored 0x{stored_crc:08x}, computed 0x{actual_crc:08x}"
        )));
    }

    let cursor: Cursor = payload_options()
        .deserialize(&bytes[HEADER_SIZE..body_end])
        .map_err(|e| GateError::BadCursor(format!("unreadable cursor: {e}")))?;
    cursor.validate()?;

    let issued_at = Utc
        .timestamp_opt(issued_secs, 0)
        .single()
        .ok_or_else(|| GateError::BadCursor(format!("invalid issue time {issued_secs}")))?;

    Ok(ResumptionToken { cursor, issued_at })
}
