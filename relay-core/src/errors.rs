//! # Errors (Feathers-style)
//!
//! Structured errors shared by the HTTP surface, the router, and the worker.
//! Core goals:
//! - consistent status codes + class names
//! - can be carried through anyhow::Error (for the admission/worker pipeline)
//! - transport-agnostic (the HTTP crate decides how to serialize)
//!
//! If you enable feature `serde`, you also get:
//! - `data` / `errors` as serde_json::Value
//! - `to_json()` helper

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for relay-core APIs.
pub type RelayResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    Timeout,          // 408 (not used for the wait-for-result 500; see RelayError::general_error)
    Unprocessable,    // 422
    GeneralError,     // 500
    BadGateway,       // 502
    Unavailable,      // 503
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Timeout => 408,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::Unavailable => 503,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::BadGateway => "BadGateway",
            ErrorKind::Unavailable => "Unavailable",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::BadGateway => "bad-gateway",
            ErrorKind::Unavailable => "unavailable",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct RelayError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl RelayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the admission pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `RelayError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&RelayError> {
        err.downcast_ref::<RelayError>()
    }

    /// Turn any error into a RelayError: keep it if it already is one,
    /// otherwise wrap as GeneralError (the caller never sees provider
    /// internals beyond the message).
    pub fn normalize(err: AnyError) -> RelayError {
        match err.downcast::<RelayError>() {
            Ok(relay) => relay,
            Err(other) => RelayError::new(ErrorKind::GeneralError, other.to_string()).with_source(other),
        }
    }

    /// Drop the inner `source` before handing the error to a client.
    pub fn sanitize_for_client(&self) -> RelayError {
        RelayError {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadGateway, msg)
    }
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, msg)
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl RelayError {
    /// `{"error": message}` — the only error shape the front-end promises.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.message })
    }
}

/// Convenience helper for “bail with RelayError”.
#[macro_export]
macro_rules! bail_relay {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::RelayError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::RelayError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}
