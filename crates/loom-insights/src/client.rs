// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Insights client for reporting clicks, conversions and views.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use loom_insights_core::{
	builders, Credentials, EventLimits, EventParams, EventValidator, InsightsEvent,
	SessionContext, ValidationError,
};
use tracing::{debug, info};

use crate::dispatch::{DispatchMode, Dispatcher, RequestDispatcher, RequestSender};
use crate::error::{InsightsError, Result};
use crate::transport::retry::RetryConfig;
use crate::transport::HttpRequestSender;

/// Configuration for the insights client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Timeout for HTTP requests.
	pub request_timeout: Duration,
	/// Retry configuration for HTTP requests.
	pub retry_config: RetryConfig,
	/// Whether callers wait for the outcome of each dispatch.
	pub dispatch_mode: DispatchMode,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(10),
			retry_config: RetryConfig::default(),
			dispatch_mode: DispatchMode::Wait,
		}
	}
}

/// Builder for constructing an InsightsClient.
pub struct InsightsClientBuilder {
	base_url: Option<String>,
	credentials: Option<Credentials>,
	request_sender: Option<Arc<dyn RequestSender>>,
	dispatcher: Option<Arc<dyn Dispatcher>>,
	validator: Arc<dyn EventValidator>,
	config: ClientConfig,
}

impl InsightsClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			base_url: None,
			credentials: None,
			request_sender: None,
			dispatcher: None,
			validator: Arc::new(EventLimits::default()),
			config: ClientConfig::default(),
		}
	}

	/// Sets the base URL of the ingestion endpoint.
	///
	/// Example: `https://insights.example.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Initializes the client with these credentials when it is built.
	pub fn credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = Some(credentials);
		self
	}

	/// Uses a custom request capability instead of the HTTP sender.
	pub fn request_sender(mut self, sender: Arc<dyn RequestSender>) -> Self {
		self.request_sender = Some(sender);
		self
	}

	/// Replaces the dispatcher entirely. Takes precedence over
	/// [`request_sender`](Self::request_sender) and [`dispatch_mode`](Self::dispatch_mode).
	pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
		self.dispatcher = Some(dispatcher);
		self
	}

	/// Replaces the limit checks applied to every event before dispatch.
	pub fn validator(mut self, validator: impl EventValidator + 'static) -> Self {
		self.validator = Arc::new(validator);
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;
		self
	}

	/// Sets the retry configuration.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.config.retry_config = config;
		self
	}

	pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
		self.config.dispatch_mode = mode;
		self
	}

	/// Builds the InsightsClient.
	///
	/// A base URL is required unless a request sender or dispatcher was supplied.
	pub fn build(self) -> Result<InsightsClient> {
		let dispatcher: Arc<dyn Dispatcher> = match self.dispatcher {
			Some(dispatcher) => dispatcher,
			None => {
				let sender: Arc<dyn RequestSender> = match self.request_sender {
					Some(sender) => sender,
					None => {
						let base_url = self
							.base_url
							.filter(|url| !url.trim().is_empty())
							.ok_or(InsightsError::InvalidBaseUrl)?;
						Arc::new(HttpRequestSender::new(
							&base_url,
							self.config.request_timeout,
							self.config.retry_config.clone(),
						)?)
					}
				};
				Arc::new(RequestDispatcher::new(sender, self.config.dispatch_mode))
			}
		};

		let client = InsightsClient::with_validator(dispatcher, self.validator);

		if let Some(credentials) = self.credentials {
			client.init(credentials)?;
		}

		Ok(client)
	}
}

impl Default for InsightsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	session: OnceLock<SessionContext>,
	dispatcher: Arc<dyn Dispatcher>,
	validator: Arc<dyn EventValidator>,
}

/// Client for reporting search insights events.
///
/// Every operation validates its parameters, builds one event, and dispatches
/// it as a single-event batch. Nothing is dispatched when validation fails.
///
/// Clones share the same session and dispatcher.
///
/// # Example
///
/// ```ignore
/// use loom_insights::{Credentials, EventParams, InsightsClient};
///
/// let client = InsightsClient::builder()
///     .base_url("https://insights.example.com")
///     .build()?;
///
/// client.init(Credentials::new("app-id", "search-key"))?;
///
/// client.clicked_object_ids_after_search(&EventParams::new()
///     .event_name("product_clicked")
///     .index("products")
///     .object_ids(["sku-1"])
///     .positions([1])
///     .query_id("a7b1c2")
/// ).await?;
/// ```
#[derive(Clone)]
pub struct InsightsClient {
	inner: Arc<ClientInner>,
}

impl InsightsClient {
	/// Creates a new builder for constructing an InsightsClient.
	pub fn builder() -> InsightsClientBuilder {
		InsightsClientBuilder::new()
	}

	/// Creates an uninitialized client on top of `dispatcher` with the default limits.
	pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
		Self::with_validator(dispatcher, Arc::new(EventLimits::default()))
	}

	fn with_validator(dispatcher: Arc<dyn Dispatcher>, validator: Arc<dyn EventValidator>) -> Self {
		Self {
			inner: Arc::new(ClientInner {
				session: OnceLock::new(),
				dispatcher,
				validator,
			}),
		}
	}

	/// Validates `credentials` and stores the resulting session.
	///
	/// The session is set once; a second call fails with
	/// [`InsightsError::AlreadyInitialized`] and leaves the first session in place.
	pub fn init(&self, credentials: Credentials) -> Result<()> {
		if self.is_initialized() {
			return Err(InsightsError::AlreadyInitialized);
		}

		let session = loom_insights_core::init(credentials)?;
		let app_id = session.app_id().to_string();
		let anonymous = session.is_anonymous();

		self
			.inner
			.session
			.set(session)
			.map_err(|_| InsightsError::AlreadyInitialized)?;

		info!(app_id = %app_id, anonymous, "Insights client initialized");
		Ok(())
	}

	pub fn is_initialized(&self) -> bool {
		self.inner.session.get().is_some()
	}

	pub fn session(&self) -> Option<&SessionContext> {
		self.inner.session.get()
	}

	/// The user token attached to dispatched events, once initialized.
	pub fn user_token(&self) -> Option<&str> {
		self.session().map(SessionContext::user_token)
	}

	/// Reports that the user clicked objects in a search response.
	///
	/// Requires `eventName`, `index`, `objectIDs`, `queryID`, and one
	/// `positions` entry per object ID.
	pub async fn clicked_object_ids_after_search(&self, params: &EventParams) -> Result<()> {
		self
			.send_built(builders::clicked_object_ids_after_search(params))
			.await
	}

	/// Reports that the user clicked objects outside of a search response.
	pub async fn clicked_object_ids(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::clicked_object_ids(params)).await
	}

	/// Reports that the user clicked filters.
	pub async fn clicked_filters(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::clicked_filters(params)).await
	}

	/// Reports a conversion on objects from a search response. Requires `queryID`.
	pub async fn converted_object_ids_after_search(&self, params: &EventParams) -> Result<()> {
		self
			.send_built(builders::converted_object_ids_after_search(params))
			.await
	}

	pub async fn converted_object_ids(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::converted_object_ids(params)).await
	}

	pub async fn converted_filters(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::converted_filters(params)).await
	}

	pub async fn viewed_object_ids(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::viewed_object_ids(params)).await
	}

	pub async fn viewed_filters(&self, params: &EventParams) -> Result<()> {
		self.send_built(builders::viewed_filters(params)).await
	}

	/// Sends `events` as one batch.
	///
	/// The batch is checked against the configured limits, then handed to the
	/// dispatcher exactly once, in order. The dispatcher's outcome is returned
	/// unchanged.
	pub async fn send_events(&self, events: Vec<InsightsEvent>) -> Result<()> {
		if events.is_empty() {
			return Err(ValidationError::EmptyBatch.into());
		}

		for event in &events {
			self.inner.validator.validate(event)?;
		}

		let session = self.session().ok_or(InsightsError::NotInitialized)?;

		debug!(count = events.len(), "Sending insights events");
		self.inner.dispatcher.dispatch(session, events).await
	}

	async fn send_built(
		&self,
		built: std::result::Result<InsightsEvent, ValidationError>,
	) -> Result<()> {
		let event = built?;
		self.send_events(vec![event]).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TransportError;
	use loom_insights_core::{EventType, NoLimits};
	use serde_json::{json, Value};
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use tokio::sync::Mutex;
	use tokio_test::{assert_err, assert_ok};

	/// Records every batch instead of sending it.
	struct MockDispatcher {
		batches: Mutex<Vec<Vec<InsightsEvent>>>,
		user_tokens: Mutex<Vec<String>>,
		calls: AtomicUsize,
		should_fail: AtomicBool,
	}

	impl MockDispatcher {
		fn new() -> Self {
			Self {
				batches: Mutex::new(Vec::new()),
				user_tokens: Mutex::new(Vec::new()),
				calls: AtomicUsize::new(0),
				should_fail: AtomicBool::new(false),
			}
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		async fn batches_json(&self) -> Vec<Value> {
			self.batches
				.lock()
				.await
				.iter()
				.map(|batch| Value::Array(batch.iter().map(InsightsEvent::to_json).collect()))
				.collect()
		}
	}

	#[async_trait::async_trait]
	impl Dispatcher for MockDispatcher {
		async fn dispatch(
			&self,
			session: &SessionContext,
			events: Vec<InsightsEvent>,
		) -> Result<()> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.should_fail.load(Ordering::SeqCst) {
				return Err(TransportError::Server {
					status: 503,
					message: "ingestion unavailable".to_string(),
				}
				.into());
			}
			self.user_tokens
				.lock()
				.await
				.push(session.user_token().to_string());
			self.batches.lock().await.push(events);
			Ok(())
		}
	}

	fn credentials() -> Credentials {
		Credentials::new("test", "test")
	}

	fn initialized_client() -> (InsightsClient, Arc<MockDispatcher>) {
		let dispatcher = Arc::new(MockDispatcher::new());
		let client = InsightsClient::new(dispatcher.clone());
		client.init(credentials()).unwrap();
		(client, dispatcher)
	}

	fn base() -> EventParams {
		EventParams::new().event_name("testEvent").index("my-index")
	}

	#[tokio::test]
	async fn test_clicked_object_ids_after_search_attaches_event_type() {
		let (client, dispatcher) = initialized_client();
		let params = base().positions([1]).object_ids(["2"]).query_id("testing");

		assert_ok!(client.clicked_object_ids_after_search(&params).await);

		assert_eq!(
			dispatcher.batches_json().await,
			vec![json!([{
				"eventType": "click",
				"positions": [1],
				"objectIDs": ["2"],
				"queryID": "testing",
				"eventName": "testEvent",
				"index": "my-index",
			}])]
		);
	}

	#[tokio::test]
	async fn test_clicked_object_ids_attaches_event_type() {
		let (client, dispatcher) = initialized_client();

		assert_ok!(client.clicked_object_ids(&base().object_ids(["2"])).await);

		assert_eq!(
			dispatcher.batches_json().await,
			vec![json!([{
				"eventType": "click",
				"objectIDs": ["2"],
				"eventName": "testEvent",
				"index": "my-index",
			}])]
		);
	}

	#[tokio::test]
	async fn test_clicked_filters_attaches_event_type() {
		let (client, dispatcher) = initialized_client();

		assert_ok!(client.clicked_filters(&base().filters(["brands:apple"])).await);

		assert_eq!(
			dispatcher.batches_json().await,
			vec![json!([{
				"eventType": "click",
				"filters": ["brands:apple"],
				"eventName": "testEvent",
				"index": "my-index",
			}])]
		);
	}

	#[tokio::test]
	async fn test_conversion_and_view_operations_attach_event_type() {
		let (client, dispatcher) = initialized_client();

		assert_ok!(
			client
				.converted_object_ids_after_search(&base().object_ids(["2"]).query_id("q"))
				.await
		);
		assert_ok!(client.converted_object_ids(&base().object_ids(["2"])).await);
		assert_ok!(client.converted_filters(&base().filters(["brands:apple"])).await);
		assert_ok!(client.viewed_object_ids(&base().object_ids(["2"])).await);
		assert_ok!(client.viewed_filters(&base().filters(["brands:apple"])).await);

		let types: Vec<EventType> = dispatcher
			.batches
			.lock()
			.await
			.iter()
			.map(|batch| {
				assert_eq!(batch.len(), 1);
				batch[0].event_type()
			})
			.collect();
		assert_eq!(
			types,
			vec![
				EventType::Conversion,
				EventType::Conversion,
				EventType::Conversion,
				EventType::View,
				EventType::View,
			]
		);
	}

	#[tokio::test]
	async fn test_invalid_parameters_are_never_dispatched() {
		let (client, dispatcher) = initialized_client();

		let missing_name = EventParams::new().index("my-index").object_ids(["2"]);
		let missing_index = EventParams::new().event_name("testEvent").object_ids(["2"]);
		let both = base().object_ids(["2"]).filters(["brands:apple"]);
		let neither = base();
		let mismatched = base().object_ids(["1", "2"]).positions([1]).query_id("q");

		for params in [&missing_name, &missing_index, &both, &neither] {
			let err = assert_err!(client.clicked_object_ids(params).await);
			assert!(matches!(err, InsightsError::InvalidParameters(_)), "{err}");
		}
		let err = assert_err!(client.clicked_object_ids_after_search(&mismatched).await);
		assert!(matches!(
			err,
			InsightsError::InvalidParameters(ValidationError::LengthMismatch { .. })
		));

		assert_eq!(dispatcher.calls(), 0);
	}

	#[tokio::test]
	async fn test_missing_field_is_named_in_error() {
		let (client, _dispatcher) = initialized_client();

		let err = assert_err!(
			client
				.clicked_filters(&EventParams::new().index("my-index").filters(["a:b"]))
				.await
		);
		assert_eq!(
			err.to_string(),
			"invalid parameters: missing required field: eventName"
		);
	}

	#[tokio::test]
	async fn test_limit_violation_is_not_dispatched() {
		let (client, dispatcher) = initialized_client();
		let ids: Vec<String> = (0..21).map(|i| i.to_string()).collect();

		let err = assert_err!(client.viewed_object_ids(&base().object_ids(ids)).await);

		assert!(matches!(
			err,
			InsightsError::InvalidParameters(ValidationError::TooMany { .. })
		));
		assert_eq!(dispatcher.calls(), 0);
	}

	#[tokio::test]
	async fn test_over_long_filter_is_not_dispatched() {
		let (client, dispatcher) = initialized_client();
		let filter = format!("brand:{}", "x".repeat(512));

		let err = assert_err!(client.converted_filters(&base().filters([filter])).await);

		assert!(matches!(
			err,
			InsightsError::InvalidParameters(ValidationError::TooLong {
				field: "filters",
				len: 518,
				max: 512,
			})
		));
		assert_eq!(dispatcher.calls(), 0);
	}

	#[tokio::test]
	async fn test_custom_validator_replaces_limits() {
		let dispatcher = Arc::new(MockDispatcher::new());
		let client = InsightsClient::builder()
			.dispatcher(dispatcher.clone())
			.validator(NoLimits)
			.credentials(credentials())
			.build()
			.unwrap();
		let ids: Vec<String> = (0..21).map(|i| i.to_string()).collect();

		assert_ok!(client.viewed_object_ids(&base().object_ids(ids)).await);
		assert_eq!(dispatcher.calls(), 1);
	}

	#[tokio::test]
	async fn test_not_initialized_is_reported_and_not_dispatched() {
		let dispatcher = Arc::new(MockDispatcher::new());
		let client = InsightsClient::new(dispatcher.clone());

		let err = assert_err!(client.clicked_object_ids(&base().object_ids(["2"])).await);

		assert!(matches!(err, InsightsError::NotInitialized));
		assert!(!client.is_initialized());
		assert_eq!(dispatcher.calls(), 0);
	}

	#[tokio::test]
	async fn test_init_is_write_once() {
		let (client, _dispatcher) = initialized_client();
		let first_token = client.user_token().unwrap().to_string();

		let second = Credentials::new("other", "other").with_user_token("u2");
		let err = assert_err!(client.init(second));

		assert!(matches!(err, InsightsError::AlreadyInitialized));
		assert_eq!(client.user_token(), Some(first_token.as_str()));
		assert_eq!(client.session().unwrap().app_id(), "test");
	}

	#[tokio::test]
	async fn test_init_rejects_bad_credentials() {
		let client = InsightsClient::new(Arc::new(MockDispatcher::new()));

		let err = assert_err!(client.init(Credentials::new("", "key")));

		assert!(matches!(err, InsightsError::InvalidCredentials(_)));
		assert!(!client.is_initialized());
		assert_ok!(client.init(credentials()));
	}

	#[tokio::test]
	async fn test_same_input_twice_dispatches_two_equal_batches() {
		let (client, dispatcher) = initialized_client();
		let params = base().filters(["brands:apple"]);

		assert_ok!(client.viewed_filters(&params).await);
		assert_ok!(client.viewed_filters(&params).await);

		let batches = dispatcher.batches.lock().await;
		assert_eq!(batches.len(), 2);
		assert_eq!(batches[0], batches[1]);
	}

	#[tokio::test]
	async fn test_transport_failure_is_relayed_unchanged() {
		let (client, dispatcher) = initialized_client();
		dispatcher.should_fail.store(true, Ordering::SeqCst);

		let err = assert_err!(client.clicked_object_ids(&base().object_ids(["2"])).await);

		match err {
			InsightsError::Transport(TransportError::Server { status, message }) => {
				assert_eq!(status, 503);
				assert_eq!(message, "ingestion unavailable");
			}
			other => panic!("unexpected error: {other}"),
		}
		assert_eq!(dispatcher.calls(), 1);
	}

	#[tokio::test]
	async fn test_send_events_keeps_batch_together_and_ordered() {
		let (client, dispatcher) = initialized_client();
		let events = vec![
			builders::viewed_object_ids(&base().object_ids(["1"])).unwrap(),
			builders::clicked_object_ids(&base().object_ids(["1"])).unwrap(),
			builders::converted_object_ids(&base().object_ids(["1"])).unwrap(),
		];

		assert_ok!(client.send_events(events.clone()).await);

		let batches = dispatcher.batches.lock().await;
		assert_eq!(batches.len(), 1);
		assert_eq!(batches[0], events);
	}

	#[tokio::test]
	async fn test_send_events_rejects_empty_batch() {
		let (client, dispatcher) = initialized_client();

		let err = assert_err!(client.send_events(Vec::new()).await);

		assert!(matches!(
			err,
			InsightsError::InvalidParameters(ValidationError::EmptyBatch)
		));
		assert_eq!(dispatcher.calls(), 0);
	}

	#[tokio::test]
	async fn test_session_user_token_reaches_dispatcher() {
		let dispatcher = Arc::new(MockDispatcher::new());
		let client = InsightsClient::new(dispatcher.clone());
		client
			.init(credentials().with_user_token("user-99"))
			.unwrap();

		assert_ok!(client.clicked_object_ids(&base().object_ids(["2"])).await);

		assert_eq!(*dispatcher.user_tokens.lock().await, vec!["user-99".to_string()]);
	}

	#[tokio::test]
	async fn test_concurrent_calls_dispatch_independent_batches() {
		let (client, dispatcher) = initialized_client();

		let handles: Vec<_> = (0..10)
			.map(|i| {
				let client = client.clone();
				tokio::spawn(async move {
					client
						.clicked_object_ids(&base().object_ids([i.to_string()]))
						.await
				})
			})
			.collect();

		for handle in handles {
			assert_ok!(handle.await.unwrap());
		}

		let batches = dispatcher.batches.lock().await;
		assert_eq!(batches.len(), 10);
		assert!(batches.iter().all(|batch| batch.len() == 1));
	}

	#[test]
	fn test_builder_requires_base_url() {
		let result = InsightsClientBuilder::new().build();
		assert!(matches!(result, Err(InsightsError::InvalidBaseUrl)));

		let result = InsightsClientBuilder::new().base_url("  ").build();
		assert!(matches!(result, Err(InsightsError::InvalidBaseUrl)));
	}

	#[test]
	fn test_builder_with_base_url_and_credentials() {
		let client = InsightsClient::builder()
			.base_url("https://insights.example.com/")
			.credentials(credentials().with_user_token("user-1"))
			.build()
			.unwrap();

		assert!(client.is_initialized());
		assert_eq!(client.user_token(), Some("user-1"));
	}

	#[test]
	fn test_builder_propagates_credential_errors() {
		let result = InsightsClient::builder()
			.base_url("https://insights.example.com")
			.credentials(Credentials::new("app", ""))
			.build();

		assert!(matches!(result, Err(InsightsError::InvalidCredentials(_))));
	}

	#[test]
	fn test_client_config_defaults() {
		let config = ClientConfig::default();
		assert_eq!(config.request_timeout, Duration::from_secs(10));
		assert_eq!(config.retry_config.max_attempts, 3);
		assert_eq!(config.dispatch_mode, DispatchMode::Wait);
	}
}
