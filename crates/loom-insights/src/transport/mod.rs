// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP request sender for the insights ingestion endpoint.
//!
//! A batch is sent as one `POST {base_url}/1/events` request:
//!
//! ```text
//! X-Insights-Application-Id: <app id>
//! X-Insights-API-Key: <api key>
//!
//! {"events": [{"eventType": "click", ..., "userToken": "<user token>"}, ...]}
//! ```

pub mod retry;

use std::time::Duration;

use loom_insights_core::{InsightsEvent, SessionContext};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::dispatch::RequestSender;
use crate::error::TransportError;
use retry::RetryConfig;

/// SDK version for the User-Agent header.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
/// SDK name for the User-Agent header.
const SDK_NAME: &str = "loom-insights";

pub const APP_ID_HEADER: &str = "X-Insights-Application-Id";
pub const API_KEY_HEADER: &str = "X-Insights-API-Key";
pub const EVENTS_PATH: &str = "/1/events";

/// Returns the SDK User-Agent, `loom-insights/<version>`.
pub fn user_agent() -> String {
	format!("{SDK_NAME}/{SDK_VERSION}")
}

/// One event as it appears on the wire: the event fields plus the session's user token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent<'a> {
	#[serde(flatten)]
	event: &'a InsightsEvent,
	user_token: &'a str,
}

#[derive(Debug, Serialize)]
struct EventsRequest<'a> {
	events: Vec<WireEvent<'a>>,
}

/// Sends batches to the ingestion endpoint over HTTP.
pub struct HttpRequestSender {
	http_client: Client,
	events_url: String,
	retry_config: RetryConfig,
}

impl HttpRequestSender {
	/// Creates a sender for `base_url` with the SDK User-Agent and `timeout`.
	pub fn new(
		base_url: &str,
		timeout: Duration,
		retry_config: RetryConfig,
	) -> Result<Self, TransportError> {
		let http_client = Client::builder()
			.user_agent(user_agent())
			.timeout(timeout)
			.build()?;

		Ok(Self::with_client(http_client, base_url, retry_config))
	}

	/// Creates a sender around an existing reqwest client.
	pub fn with_client(http_client: Client, base_url: &str, retry_config: RetryConfig) -> Self {
		let events_url = format!("{}{}", base_url.trim_end_matches('/'), EVENTS_PATH);
		Self {
			http_client,
			events_url,
			retry_config,
		}
	}

	pub fn events_url(&self) -> &str {
		&self.events_url
	}

	async fn post(
		&self,
		session: &SessionContext,
		body: &EventsRequest<'_>,
	) -> Result<(), TransportError> {
		let response = self
			.http_client
			.post(&self.events_url)
			.header(APP_ID_HEADER, session.app_id())
			.header(API_KEY_HEADER, session.api_key().expose())
			.json(body)
			.send()
			.await?;

		check_response(response).await
	}
}

async fn check_response(response: Response) -> Result<(), TransportError> {
	let status = response.status();

	if status == StatusCode::TOO_MANY_REQUESTS {
		let retry_after_secs = response
			.headers()
			.get(reqwest::header::RETRY_AFTER)
			.and_then(|v| v.to_str().ok())
			.and_then(|s| s.parse().ok());
		return Err(TransportError::RateLimited { retry_after_secs });
	}

	if !status.is_success() {
		return Err(TransportError::Server {
			status: status.as_u16(),
			message: response.text().await.unwrap_or_default(),
		});
	}

	Ok(())
}

#[async_trait::async_trait]
impl RequestSender for HttpRequestSender {
	async fn send(
		&self,
		session: &SessionContext,
		events: &[InsightsEvent],
	) -> Result<(), TransportError> {
		let body = EventsRequest {
			events: events
				.iter()
				.map(|event| WireEvent {
					event,
					user_token: session.user_token(),
				})
				.collect(),
		};

		debug!(
			url = %self.events_url,
			count = body.events.len(),
			"Sending insights batch"
		);

		retry::retry(&self.retry_config, || self.post(session, &body)).await
	}
}
