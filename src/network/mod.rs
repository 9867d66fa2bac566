//! Network Module
//!
//! HTTP surface of the gateway.
//!
//! ## Routes
//! - `GET|POST /oaipmh/all`              - every routed notification
//! - `GET|POST /oaipmh/repo/{repo_id}`   - notifications routed to one repository
//! - `GET /health`                       - liveness probe
//!
//! Arguments come from the query string (GET) or a form body (POST); both
//! are handed to the engine as raw pairs so repeated arguments survive.

mod handlers;
mod server;

pub use server::{router, serve};
