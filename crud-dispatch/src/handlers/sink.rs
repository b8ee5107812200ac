//! Response sinks
//!
//! [`JsonSink`] writes envelopes as axum JSON responses. [`NormalizedSink`]
//! hands the envelope back as data.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::error::default_error_message;
use super::outcome::NormalizedResponse;
use super::traits::ResponseSink;
use crate::config::Config;

/// Sink producing axum JSON responses
///
/// By default every message is sent verbatim. With
/// [`JsonSink::redact_unexpected`], messages not marked client-safe are
/// replaced by the default error message.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink {
    redact_unexpected: bool,
}

impl JsonSink {
    /// Create a sink that forwards every message verbatim
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sink from the `responses` section of the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            redact_unexpected: config.responses.redact_unexpected,
        }
    }

    /// Replace messages that are not client-safe with the default message
    #[must_use]
    pub fn redact_unexpected(mut self, redact: bool) -> Self {
        self.redact_unexpected = redact;
        self
    }

    fn envelope(&self, status: StatusCode, message: String, client_safe: bool) -> NormalizedResponse {
        if client_safe || !self.redact_unexpected {
            NormalizedResponse::message(status, message)
        } else {
            NormalizedResponse::message(status, default_error_message())
        }
    }
}

impl ResponseSink for JsonSink {
    type Output = Response;

    fn success(&self, payload: Value, status: StatusCode) -> Response {
        NormalizedResponse::success(payload, status).into_response()
    }

    fn error(&self, status: StatusCode, message: String, client_safe: bool) -> Response {
        self.envelope(status, message, client_safe).into_response()
    }
}

/// Sink returning the envelope itself
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedSink;

impl ResponseSink for NormalizedSink {
    type Output = NormalizedResponse;

    fn success(&self, payload: Value, status: StatusCode) -> NormalizedResponse {
        NormalizedResponse::success(payload, status)
    }

    fn error(&self, status: StatusCode, message: String, _client_safe: bool) -> NormalizedResponse {
        NormalizedResponse::message(status, message)
    }
}
