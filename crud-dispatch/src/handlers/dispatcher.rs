//! Request dispatcher
//!
//! Maps each CRUD verb onto the injected [`BusinessHandle`], classifies the
//! outcome and emits exactly one envelope through the [`ResponseSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::{extract::{Path, State}, response::Response, routing::get, Json, Router};
//! use crud_dispatch::handlers::Dispatcher;
//!
//! async fn get_user(State(users): State<Dispatcher<UserBusiness>>, Path(id): Path<u64>) -> Response {
//!     users.get_by_id(id).await
//! }
//!
//! async fn create_user(State(users): State<Dispatcher<UserBusiness>>, Json(body): Json<Value>) -> Response {
//!     users.create(body).await
//! }
//!
//! let app = Router::new()
//!     .route("/users", axum::routing::post(create_user))
//!     .route("/users/{id}", get(get_user))
//!     .with_state(Dispatcher::new(UserBusiness::default()));
//! ```

use std::sync::Arc;

use serde_json::Value;

use super::error::Operation;
use super::outcome::{Collection, Outcome};
use super::sink::JsonSink;
use super::traits::{BusinessHandle, BusinessResult, ResponseSink};

/// Dispatches CRUD verbs to a business handle
///
/// Holds no per-request state; clones share the same business handle.
pub struct Dispatcher<B, S = JsonSink> {
    business: Arc<B>,
    sink: S,
}

impl<B, S: Clone> Clone for Dispatcher<B, S> {
    fn clone(&self) -> Self {
        Self {
            business: Arc::clone(&self.business),
            sink: self.sink.clone(),
        }
    }
}

impl<B, S: std::fmt::Debug> std::fmt::Debug for Dispatcher<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("business", &std::any::type_name::<B>())
            .field("sink", &self.sink)
            .finish()
    }
}

impl<B: BusinessHandle> Dispatcher<B, JsonSink> {
    /// Create a dispatcher emitting axum JSON responses
    pub fn new(business: B) -> Self {
        Self::with_sink(business, JsonSink::new())
    }
}

impl<B: BusinessHandle, S: ResponseSink> Dispatcher<B, S> {
    /// Create a dispatcher with a custom sink
    pub fn with_sink(business: B, sink: S) -> Self {
        Self::from_shared(Arc::new(business), sink)
    }

    /// Create a dispatcher around an already shared business handle
    pub fn from_shared(business: Arc<B>, sink: S) -> Self {
        Self { business, sink }
    }

    /// The injected business handle
    pub fn business(&self) -> &B {
        &self.business
    }

    /// The response sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// List every record (`find_all`)
    pub async fn list(&self) -> S::Output {
        tracing::debug!(operation = %Operation::List, "dispatching");
        let outcome = collection_outcome(self.business.find_all().await);
        self.emit(Operation::List, outcome)
    }

    /// List records matching a filter (`find`)
    pub async fn list_filtered(&self, filter: B::Filter) -> S::Output {
        tracing::debug!(operation = %Operation::ListFiltered, "dispatching");
        let outcome = collection_outcome(self.business.find(filter).await);
        self.emit(Operation::ListFiltered, outcome)
    }

    /// Get a record by ID (`find_by_id`)
    pub async fn get_by_id(&self, id: B::Id) -> S::Output {
        tracing::debug!(operation = %Operation::GetById, "dispatching");
        let outcome = match self.business.find_by_id(id).await {
            Ok(record) => Outcome::from_record(record),
            Err(err) => err.into(),
        };
        self.emit(Operation::GetById, outcome)
    }

    /// Create a record (`save`)
    pub async fn create(&self, body: Value) -> S::Output {
        tracing::debug!(operation = %Operation::Create, "dispatching");
        let outcome = record_outcome(self.business.save(body).await);
        self.emit(Operation::Create, outcome)
    }

    /// Replace a record (`update`)
    pub async fn update(&self, id: B::Id, body: Value) -> S::Output {
        tracing::debug!(operation = %Operation::Update, "dispatching");
        let outcome = record_outcome(self.business.update(id, body).await);
        self.emit(Operation::Update, outcome)
    }

    /// Partially update a record (`patch`)
    pub async fn patch(&self, id: B::Id, body: Value) -> S::Output {
        tracing::debug!(operation = %Operation::Patch, "dispatching");
        let outcome = record_outcome(self.business.patch(id, body).await);
        self.emit(Operation::Patch, outcome)
    }

    /// Remove a record (`remove`)
    pub async fn remove(&self, id: B::Id) -> S::Output {
        tracing::debug!(operation = %Operation::Remove, "dispatching");
        let outcome = record_outcome(self.business.remove(id).await);
        self.emit(Operation::Remove, outcome)
    }

    /// Delete a record with a request body (`delete`)
    pub async fn delete(&self, id: B::Id, body: Value) -> S::Output {
        tracing::debug!(operation = %Operation::Delete, "dispatching");
        let outcome = record_outcome(self.business.delete(id, body).await);
        self.emit(Operation::Delete, outcome)
    }

    fn emit(&self, operation: Operation, outcome: Outcome) -> S::Output {
        match outcome {
            Outcome::Success(payload) => {
                let status = operation.success_status();
                tracing::debug!(
                    operation = %operation,
                    status = status.as_u16(),
                    "operation succeeded"
                );
                self.sink.success(payload, status)
            }
            Outcome::Failure { kind, message } => {
                let classified = operation.classify(kind);
                let status = classified.status_code();
                let client_safe = classified.is_client_safe();

                if client_safe {
                    tracing::warn!(
                        operation = %operation,
                        raised = %kind,
                        kind = %classified,
                        status = status.as_u16(),
                        "operation rejected: {}", message
                    );
                } else {
                    tracing::error!(
                        operation = %operation,
                        raised = %kind,
                        kind = %classified,
                        status = status.as_u16(),
                        "operation failed: {}", message
                    );
                }

                self.sink.error(status, message, client_safe)
            }
        }
    }
}

fn collection_outcome(result: BusinessResult<Collection>) -> Outcome {
    match result {
        Ok(collection) => Outcome::from_collection(collection),
        Err(err) => err.into(),
    }
}

fn record_outcome(result: BusinessResult<Value>) -> Outcome {
    match result {
        Ok(record) => Outcome::Success(record),
        Err(err) => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        default_error_message, BusinessError, ErrorKind, NormalizedResponse, NormalizedSink,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    /// Business handle returning canned results and recording its calls
    #[derive(Default)]
    struct MockBusiness {
        calls: Mutex<Vec<String>>,
        fail_with: Option<BusinessError>,
        collection: Option<Collection>,
        record: Option<Value>,
    }

    impl MockBusiness {
        fn failing(err: BusinessError) -> Self {
            Self {
                fail_with: Some(err),
                ..Self::default()
            }
        }

        fn log_call(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn answer<T>(&self, value: T) -> BusinessResult<T> {
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(value),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BusinessHandle for MockBusiness {
        type Id = u64;
        type Filter = Vec<(String, String)>;

        async fn find(&self, filter: Self::Filter) -> BusinessResult<Collection> {
            self.log_call(format!("find {filter:?}"));
            self.answer(self.collection.clone().unwrap_or_default())
        }

        async fn find_all(&self) -> BusinessResult<Collection> {
            self.log_call("find_all".to_string());
            self.answer(self.collection.clone().unwrap_or_default())
        }

        async fn find_by_id(&self, id: u64) -> BusinessResult<Option<Value>> {
            self.log_call(format!("find_by_id {id}"));
            self.answer(self.record.clone())
        }

        async fn save(&self, body: Value) -> BusinessResult<Value> {
            self.log_call(format!("save {body}"));
            self.answer(body)
        }

        async fn update(&self, id: u64, body: Value) -> BusinessResult<Value> {
            self.log_call(format!("update {id} {body}"));
            self.answer(body)
        }

        async fn patch(&self, id: u64, body: Value) -> BusinessResult<Value> {
            self.log_call(format!("patch {id} {body}"));
            self.answer(body)
        }

        async fn remove(&self, id: u64) -> BusinessResult<Value> {
            self.log_call(format!("remove {id}"));
            self.answer(json!({ "id": id }))
        }

        async fn delete(&self, id: u64, body: Value) -> BusinessResult<Value> {
            self.log_call(format!("delete {id} {body}"));
            self.answer(body)
        }
    }

    fn dispatcher(business: MockBusiness) -> Dispatcher<MockBusiness, NormalizedSink> {
        Dispatcher::with_sink(business, NormalizedSink)
    }

    async fn run_all(dispatcher: &Dispatcher<MockBusiness, NormalizedSink>) -> Vec<(Operation, NormalizedResponse)> {
        vec![
            (Operation::List, dispatcher.list().await),
            (
                Operation::ListFiltered,
                dispatcher.list_filtered(vec![]).await,
            ),
            (Operation::GetById, dispatcher.get_by_id(1).await),
            (Operation::Create, dispatcher.create(json!({})).await),
            (Operation::Update, dispatcher.update(1, json!({})).await),
            (Operation::Patch, dispatcher.patch(1, json!({})).await),
            (Operation::Remove, dispatcher.remove(1).await),
            (Operation::Delete, dispatcher.delete(1, json!({})).await),
        ]
    }

    #[tokio::test]
    async fn test_success_statuses() {
        let dispatcher = dispatcher(MockBusiness::default());
        for (op, response) in run_all(&dispatcher).await {
            let expected = if op == Operation::Create {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            assert_eq!(response.status, expected, "{op}");
        }
    }

    #[tokio::test]
    async fn test_validation_is_422_everywhere() {
        let dispatcher = dispatcher(MockBusiness::failing(BusinessError::validation("bad input")));
        for (op, response) in run_all(&dispatcher).await {
            assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{op}");
            assert_eq!(response.body, json!({ "message": "bad input" }));
        }
    }

    #[tokio::test]
    async fn test_conflict_is_409_only_on_create() {
        let dispatcher = dispatcher(MockBusiness::failing(BusinessError::conflict("duplicate")));
        for (op, response) in run_all(&dispatcher).await {
            let expected = if op == Operation::Create {
                StatusCode::CONFLICT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            assert_eq!(response.status, expected, "{op}");
            assert_eq!(response.body, json!({ "message": "duplicate" }));
        }
    }

    #[tokio::test]
    async fn test_unexpected_is_500_everywhere() {
        let dispatcher = dispatcher(MockBusiness::failing(BusinessError::unexpected("boom")));
        for (op, response) in run_all(&dispatcher).await {
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{op}");
            assert_eq!(response.body, json!({ "message": "boom" }));
        }
    }

    #[tokio::test]
    async fn test_classification_is_repeatable() {
        let dispatcher = dispatcher(MockBusiness::failing(BusinessError::validation("again")));
        let first = dispatcher.create(json!({})).await;
        let second = dispatcher.create(json!({})).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_message_uses_default() {
        let dispatcher = dispatcher(MockBusiness::failing(BusinessError::without_message(
            ErrorKind::Unexpected,
        )));
        let response = dispatcher.update(7, json!({ "name": "x" })).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body, json!({ "message": default_error_message() }));
    }

    #[tokio::test]
    async fn test_null_results_become_empty_list() {
        let dispatcher = dispatcher(MockBusiness {
            collection: Some(Collection::empty().with_field("total", json!(0))),
            ..MockBusiness::default()
        });
        let response = dispatcher.list().await;
        assert_eq!(response.body, json!({ "results": [], "total": 0 }));

        let response = dispatcher.list_filtered(vec![]).await;
        assert_eq!(response.body, json!({ "results": [], "total": 0 }));
    }

    #[tokio::test]
    async fn test_results_extra_field_never_emits_null() {
        let with_records = dispatcher(MockBusiness {
            collection: Some(Collection::new(vec![json!(1)]).with_field("results", Value::Null)),
            ..MockBusiness::default()
        });
        let response = with_records.list().await;
        assert_eq!(response.body, json!({ "results": [1] }));

        let without_records = dispatcher(MockBusiness {
            collection: Some(Collection::empty().with_field("results", Value::Null)),
            ..MockBusiness::default()
        });
        let response = without_records.list_filtered(vec![]).await;
        assert_eq!(response.body, json!({ "results": [] }));
    }

    #[tokio::test]
    async fn test_missing_record_becomes_empty_object() {
        let dispatcher = dispatcher(MockBusiness::default());
        let response = dispatcher.get_by_id(42).await;
        assert_eq!(response, NormalizedResponse::success(json!({}), StatusCode::OK));
    }

    #[tokio::test]
    async fn test_found_record_is_passed_through() {
        let dispatcher = dispatcher(MockBusiness {
            record: Some(json!({ "id": 42, "name": "x" })),
            ..MockBusiness::default()
        });
        let response = dispatcher.get_by_id(42).await;
        assert_eq!(response.body, json!({ "id": 42, "name": "x" }));
    }

    #[tokio::test]
    async fn test_parameters_passed_unchanged() {
        let dispatcher = dispatcher(MockBusiness::default());
        let filter = vec![("name".to_string(), "x".to_string())];
        dispatcher.list_filtered(filter).await;
        dispatcher.get_by_id(3).await;
        dispatcher.create(json!({ "a": 1 })).await;
        dispatcher.update(4, json!({ "b": 2 })).await;
        dispatcher.patch(5, json!({ "c": 3 })).await;
        dispatcher.remove(6).await;
        dispatcher.delete(7, json!({ "reason": "gone" })).await;

        assert_eq!(
            dispatcher.business().calls(),
            vec![
                r#"find [("name", "x")]"#.to_string(),
                "find_by_id 3".to_string(),
                r#"save {"a":1}"#.to_string(),
                r#"update 4 {"b":2}"#.to_string(),
                r#"patch 5 {"c":3}"#.to_string(),
                "remove 6".to_string(),
                r#"delete 7 {"reason":"gone"}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_clones_share_business() {
        let first = dispatcher(MockBusiness::default());
        let second = first.clone();
        second.remove(1).await;
        assert_eq!(first.business().calls(), vec!["remove 1".to_string()]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn events(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[tokio::test]
    async fn test_failure_logs_raised_and_classified_kind() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let conflicting = dispatcher(MockBusiness::failing(BusinessError::conflict("stale")));
        conflicting.update(1, json!({})).await;
        conflicting.create(json!({})).await;

        let events = logs.events();
        assert_eq!(events.len(), 2);

        let failed = &events[0]["fields"];
        assert_eq!(events[0]["level"], "ERROR");
        assert_eq!(failed["operation"], "update");
        assert_eq!(failed["raised"], "conflict");
        assert_eq!(failed["kind"], "unexpected");
        assert_eq!(failed["status"], 500);

        let rejected = &events[1]["fields"];
        assert_eq!(events[1]["level"], "WARN");
        assert_eq!(rejected["operation"], "create");
        assert_eq!(rejected["raised"], "conflict");
        assert_eq!(rejected["kind"], "conflict");
        assert_eq!(rejected["status"], 409);
    }
}
