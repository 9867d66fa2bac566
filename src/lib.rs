//! # oaigate
//!
//! An OAI-PMH harvesting endpoint in front of a paginated notification
//! delivery API:
//! - Stateless paging through opaque, checksummed resumption tokens
//! - Date windows clamped to a rolling harvesting horizon
//! - Dublin Core crosswalk of notification metadata
//! - Global and per-repository endpoints over HTTP
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Server                             │
//! │            /oaipmh/all   /oaipmh/repo/{repo_id}              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Engine                            │
//! │        (verb dispatch, argument checks, listings)            │
//! └──────┬──────────────┬───────────────────┬───────────────────┘
//!        │              │                   │
//!        ▼              ▼                   ▼
//!  ┌───────────┐  ┌───────────┐     ┌──────────────┐
//!  │  Cursor   │  │  Window   │     │  Translate   │
//!  │  (token)  │  │  (until)  │     │  (oai_dc)    │
//!  └───────────┘  └───────────┘     └──────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │    Pager     │──── retry / horizon
//!               └──────┬───────┘
//!                      ▼
//!             NotificationSource (HTTP API / memory)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod clock;
pub mod dates;

pub mod cursor;
pub mod backend;
pub mod window;
pub mod translate;
pub mod protocol;
pub mod engine;
pub mod render;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GateError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of oaigate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
