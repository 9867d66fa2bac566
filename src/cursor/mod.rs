//! Cursor Module
//!
//! Resumable listing state and its opaque token form.
//!
//! The server keeps no sessions: everything needed to produce the next page
//! of a listing travels inside the resumption token the harvester echoes
//! back, so any instance can serve any page.
//!
//! ## Token Format (V1)
//! ```text
//! ┌─────────┬───────────────┬──────────┬──────────────────┬─────────┐
//! │ Ver (1) │ Issued At (8) │ Len (4)  │ bincode(Cursor)  │ CRC (4) │
//! └─────────┴───────────────┴──────────┴──────────────────┴─────────┘
//! ```
//! The frame is then written as URL-safe base64 without padding, so it can
//! sit in a query parameter untouched.

mod state;
mod codec;

pub use state::{Cursor, Scope};
pub use codec::{decode, encode, ResumptionToken, TOKEN_VERSION, HEADER_SIZE, MAX_TOKEN_LEN};
