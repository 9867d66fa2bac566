//! Protocol Module
//!
//! The OAI-PMH request/response model.
//!
//! ## Verbs
//! - Identify            - no arguments
//! - ListMetadataFormats - identifier (optional)
//! - ListSets            - resumptionToken (ignored)
//! - ListIdentifiers     - metadataPrefix [from] [until] [set] | resumptionToken
//! - ListRecords         - metadataPrefix [from] [until] [set] | resumptionToken
//! - GetRecord           - identifier, metadataPrefix
//!
//! ## Error Codes
//! - badVerb, badArgument, badResumptionToken, cannotDisseminateFormat,
//!   noRecordsMatch, idDoesNotExist
//! - serviceUnavailable (backend failure; not an OAI-PMH code)

mod verb;
mod request;
mod response;
mod error;

pub use verb::Verb;
pub use request::Request;
pub use response::{Continuation, IdentifyInfo, ListResult, Payload, Response, PROTOCOL_VERSION};
pub use error::{ErrorKind, ProtocolError};
