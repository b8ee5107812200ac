//! CRUD request dispatch
//!
//! This module maps the canonical CRUD verbs onto an injected business object
//! and normalizes every outcome into one HTTP envelope.
//!
//! # Features
//!
//! - **Dispatcher**: [`Dispatcher`] with one entry point per [`Operation`]
//! - **Business boundary**: [`BusinessHandle`] trait returning [`BusinessError`]
//! - **Classification**: closed [`ErrorKind`] mapped to 422 / 409 / 500
//! - **Emission**: [`ResponseSink`] with [`JsonSink`] (axum) and [`NormalizedSink`]
//!
//! # Status Codes
//!
//! | Outcome                          | Status |
//! |----------------------------------|--------|
//! | success, create                  | 201    |
//! | success, anything else           | 200    |
//! | `Validation`                     | 422    |
//! | `Conflict` on create             | 409    |
//! | anything else                    | 500    |
//!
//! Failure bodies are `{ "message": ... }`. A list result without `results`
//! is emitted with `results: []`, and a missing record as `{}`.

mod dispatcher;
mod error;
mod outcome;
mod sink;
mod traits;

pub use dispatcher::Dispatcher;
pub use error::{
    default_error_message, install_default_message, BusinessError, ErrorKind, Operation,
    DEFAULT_ERROR_MESSAGE,
};
pub use outcome::{Collection, NormalizedResponse, Outcome};
pub use sink::{JsonSink, NormalizedSink};
pub use traits::{BusinessHandle, BusinessResult, ResponseSink};
