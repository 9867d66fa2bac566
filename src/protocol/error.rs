//! Protocol errors
//!
//! The errors a harvester sees. Each ends request processing; there are
//! no partial responses.

use std::fmt;

use thiserror::Error;

use crate::error::GateError;

/// Error kinds reported to harvesters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadVerb,
    BadArgument,
    BadCursor,
    CannotDisseminateFormat,
    NoRecordsMatch,
    UnknownScope,
    IdDoesNotExist,
    BackendUnavailable,
}

impl ErrorKind {
    /// Code written into the `error` element
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::BadVerb => "badVerb",
            ErrorKind::BadArgument => "badArgument",
            ErrorKind::BadCursor => "badResumptionToken",
            ErrorKind::CannotDisseminateFormat => "cannotDisseminateFormat",
            ErrorKind::NoRecordsMatch => "noRecordsMatch",
            ErrorKind::UnknownScope | ErrorKind::IdDoesNotExist => "idDoesNotExist",
            ErrorKind::BackendUnavailable => "serviceUnavailable",
        }
    }

    /// Infrastructure failure rather than client misuse
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, ErrorKind::BackendUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A terminal protocol error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ProtocolError {
    pub kind: ErrorKind,
    pub detail: String,
}

impl ProtocolError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn bad_verb(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadVerb, detail)
    }

    pub fn bad_argument(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadArgument, detail)
    }

    pub fn bad_cursor(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadCursor, detail)
    }

    pub fn cannot_disseminate(prefix: &str) -> Self {
        Self::new(
            ErrorKind::CannotDisseminateFormat,
            format!("metadata format {prefix:?} is not supported"),
        )
    }

    pub fn no_records_match() -> Self {
        Self::new(
            ErrorKind::NoRecordsMatch,
            "no records match the requested arguments",
        )
    }

    pub fn unknown_scope(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownScope, detail)
    }

    pub fn id_does_not_exist(identifier: &str) -> Self {
        Self::new(
            ErrorKind::IdDoesNotExist,
            format!("no record with identifier {identifier:?}"),
        )
    }
}

/// Every infrastructure error lands on exactly one protocol kind, whichever
/// component raised it
impl From<GateError> for ProtocolError {
    fn from(err: GateError) -> Self {
        let kind = match &err {
            GateError::BadCursor(_) => ErrorKind::BadCursor,
            GateError::UnknownScope(_) => ErrorKind::UnknownScope,
            GateError::BackendUnavailable(_)
            | GateError::BackendRejected { .. }
            | GateError::Io(_)
            | GateError::Serialization(_)
            | GateError::Config(_) => ErrorKind::BackendUnavailable,
        };
        let detail = match err {
            GateError::UnknownScope(id) => format!("repository {id:?} does not exist"),
            GateError::BadCursor(detail) => detail,
            other => other.to_string(),
        };
        Self { kind, detail }
    }
}
