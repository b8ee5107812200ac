//! # crud-dispatch
//!
//! Generic HTTP request-handling adapter for CRUD services. Maps the canonical
//! CRUD verbs onto an injected business object and normalizes every outcome,
//! success or failure, into one response envelope.
//!
//! ## Features
//!
//! - **Dispatcher**: list, filtered list, get, create, update, patch, remove, delete
//! - **Error classification**: validation → 422, conflict on create → 409, anything else → 500
//! - **Empty-result normalization**: `results: null` → `[]`, missing record → `{}`
//! - **axum integration**: envelopes are written as JSON `Response`s
//! - **Configuration**: Figment (TOML files + environment), JSON tracing output
//!
//! ## Example
//!
//! ```rust,ignore
//! use crud_dispatch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!     config.install_defaults();
//!
//!     let users = Dispatcher::with_sink(UserBusiness::connect().await?, JsonSink::from_config(&config));
//!
//!     let app = Router::new()
//!         .route("/users", get(list_users).post(create_user))
//!         .route("/users/{id}", get(get_user).put(update_user).delete(remove_user))
//!         .with_state(users);
//!
//!     // serve `app` with axum
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ResponseConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        default_error_message, BusinessError, BusinessHandle, BusinessResult, Collection,
        Dispatcher, ErrorKind, JsonSink, NormalizedResponse, NormalizedSink, Operation, Outcome,
        ResponseSink,
    };
    pub use crate::observability::{init_tracing, shutdown_tracing};

    pub use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{delete, get, patch, post, put},
        Json, Router,
    };
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value};
}
