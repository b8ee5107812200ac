//! Outcomes of business operations and the normalized response envelope
//!
//! # Example
//!
//! ```rust
//! use crud_dispatch::handlers::{Collection, Outcome};
//! use serde_json::json;
//!
//! let outcome = Outcome::from_collection(Collection::empty());
//! assert_eq!(outcome, Outcome::Success(json!({ "results": [] })));
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::error::{BusinessError, ErrorKind};

/// Collection envelope returned by list operations
///
/// `results` may be absent or `null`; every other field is passed through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Records in the collection
    #[serde(default)]
    pub results: Option<Vec<Value>>,
    /// Any other envelope fields (counts, paging, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Collection {
    /// A collection with no `results` field set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a collection holding the given records
    pub fn new(results: Vec<Value>) -> Self {
        Self {
            results: Some(results),
            extra: Map::new(),
        }
    }

    /// Attach an extra envelope field
    ///
    /// A `"results"` field only fills in missing records; see
    /// [`normalized`](Self::normalized).
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Replace a missing `results` field with an empty sequence
    ///
    /// A `"results"` key in `extra` would shadow the typed field when
    /// serialized, so it is folded in: an array is used only when no records
    /// are set, anything else is dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(Value::Array(records)) = self.extra.remove("results") {
            self.results.get_or_insert(records);
        }
        self.results.get_or_insert_with(Vec::new);
        self
    }
}

/// Result of invoking a business operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation returned a payload
    Success(Value),
    /// The operation raised a classified error
    Failure {
        /// Kind declared where the error was raised
        kind: ErrorKind,
        /// Message carried by the error
        message: String,
    },
}

impl Outcome {
    /// Successful list outcome, with `results` normalized
    pub fn from_collection(collection: Collection) -> Self {
        match serde_json::to_value(collection.normalized()) {
            Ok(value) => Self::Success(value),
            Err(err) => Self::from(BusinessError::from(err)),
        }
    }

    /// Successful lookup outcome, with a missing record turned into `{}`
    pub fn from_record(record: Option<Value>) -> Self {
        match record {
            None | Some(Value::Null) => Self::Success(json!({})),
            Some(value) => Self::Success(value),
        }
    }
}

impl From<BusinessError> for Outcome {
    fn from(err: BusinessError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

/// The envelope written to the transport, exactly once per request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResponse {
    /// HTTP status code
    #[serde(with = "status_code")]
    pub status: StatusCode,
    /// Success payload, or `{ "message": ... }` for failures
    pub body: Value,
}

impl NormalizedResponse {
    /// A success envelope
    pub fn success(payload: Value, status: StatusCode) -> Self {
        Self {
            status,
            body: payload,
        }
    }

    /// A failure envelope carrying only a message
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }),
        }
    }
}

impl IntoResponse for NormalizedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

mod status_code {
    use axum::http::StatusCode;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(status.as_u16())
    }
}
