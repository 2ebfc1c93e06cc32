//! # Error Classification
//!
//! The relay distinguishes exactly two failure tiers, and the distinction
//! is internal only:
//!
//! - **Provider**: the Deepgram call itself failed (network, auth, rejected
//!   audio). The browser client treats this as "service up, provider down".
//! - **Handler**: anything else that went wrong while servicing the
//!   request (unreadable body, missing file field, a response missing its
//!   transcript structure).
//!
//! Both tiers answer HTTP 200 with an identical JSON shape carrying the
//! fixed message `"Audio processing failed"` — the existing browser client
//! depends on that shape, so the tier shows up only in logs and metrics.

use crate::transcription::ProviderError;
use serde_json::{json, Value};
use std::fmt;

/// Fixed client-facing message shared by both failure tiers.
pub const ERROR_MESSAGE: &str = "Audio processing failed";

/// A classified request failure.
///
/// The variant is the tier; the payload is the raw detail string passed
/// through to the client verbatim.
#[derive(Debug)]
pub enum RelayError {
    /// The provider round-trip failed
    Provider(String),

    /// The relay itself failed before or after the provider call
    Handler(String),
}

impl RelayError {
    /// Tier label used in logs and the metrics registry.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Provider(_) => "provider",
            RelayError::Handler(_) => "handler",
        }
    }

    pub fn details(&self) -> &str {
        match self {
            RelayError::Provider(details) | RelayError::Handler(details) => details,
        }
    }

    /// The wire-contract error body. Identical for both tiers.
    pub fn to_body(&self) -> Value {
        json!({
            "status": "error",
            "error": ERROR_MESSAGE,
            "details": self.details(),
        })
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Provider(details) => write!(f, "provider error: {}", details),
            RelayError::Handler(details) => write!(f, "handler error: {}", details),
        }
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        RelayError::Provider(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for RelayError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        RelayError::Handler(format!("multipart error: {}", err))
    }
}
