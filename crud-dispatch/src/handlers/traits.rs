//! Collaborator traits for the dispatcher
//!
//! - [`BusinessHandle`]: the injected domain object the dispatcher calls into
//! - [`ResponseSink`]: writes a normalized envelope to the transport
//!
//! Both use RPITIT (Return Position Impl Trait In Traits) where async is
//! needed, so no `async_trait` boxing is involved.
//!
//! # Example
//!
//! ```rust,ignore
//! use crud_dispatch::handlers::{BusinessError, BusinessHandle, Collection};
//! use serde_json::Value;
//!
//! struct UserBusiness { /* ... */ }
//!
//! impl BusinessHandle for UserBusiness {
//!     type Id = u64;
//!     type Filter = UserFilter;
//!
//!     async fn find(&self, filter: UserFilter) -> Result<Collection, BusinessError> {
//!         let users = self.store.search(&filter).await?;
//!         Ok(Collection::new(users))
//!     }
//!
//!     async fn save(&self, body: Value) -> Result<Value, BusinessError> {
//!         if body.get("name").is_none() {
//!             return Err(BusinessError::validation("name required"));
//!         }
//!         // ...
//!     }
//!
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use axum::http::StatusCode;
use serde_json::Value;

use super::error::BusinessError;
use super::outcome::Collection;

/// Result type for business operations
pub type BusinessResult<T> = std::result::Result<T, BusinessError>;

/// Domain operations the dispatcher maps the CRUD verbs onto
///
/// Implementations classify their own failures by returning the right
/// [`BusinessError`] kind.
///
/// # Type Parameters
///
/// - `Id`: identifier type extracted upstream (e.g. a path segment)
/// - `Filter`: filter set extracted upstream for filtered listing
pub trait BusinessHandle: Send + Sync {
    /// Record identifier
    type Id: Send;
    /// Filter set for [`BusinessHandle::find`]
    type Filter: Send;

    /// Find records matching a filter
    fn find(
        &self,
        filter: Self::Filter,
    ) -> impl Future<Output = BusinessResult<Collection>> + Send;

    /// Find every record
    fn find_all(&self) -> impl Future<Output = BusinessResult<Collection>> + Send;

    /// Find a record by ID, `None` when it does not exist
    fn find_by_id(
        &self,
        id: Self::Id,
    ) -> impl Future<Output = BusinessResult<Option<Value>>> + Send;

    /// Create a record
    ///
    /// # Errors
    ///
    /// - `Validation` if the body is rejected
    /// - `Conflict` if the record collides with an existing one
    fn save(&self, body: Value) -> impl Future<Output = BusinessResult<Value>> + Send;

    /// Replace a record
    fn update(
        &self,
        id: Self::Id,
        body: Value,
    ) -> impl Future<Output = BusinessResult<Value>> + Send;

    /// Partially update a record
    fn patch(
        &self,
        id: Self::Id,
        body: Value,
    ) -> impl Future<Output = BusinessResult<Value>> + Send;

    /// Remove a record
    fn remove(&self, id: Self::Id) -> impl Future<Output = BusinessResult<Value>> + Send;

    /// Delete a record, with a request body
    fn delete(
        &self,
        id: Self::Id,
        body: Value,
    ) -> impl Future<Output = BusinessResult<Value>> + Send;
}

/// Writes normalized envelopes to the transport
///
/// `Output` stands for whatever the transport needs back, e.g. an axum
/// `Response`.
pub trait ResponseSink: Send + Sync {
    /// What the sink produces for the transport
    type Output;

    /// Emit a success payload
    fn success(&self, payload: Value, status: StatusCode) -> Self::Output;

    /// Emit a failure
    ///
    /// `client_safe` tells whether `message` was meant for clients.
    fn error(&self, status: StatusCode, message: String, client_safe: bool) -> Self::Output;
}
