// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for Loom search insights.
//!
//! This crate reports what users do with search results: clicks on results or
//! filters, conversions, and views. Each operation validates its parameters,
//! builds one event, and hands it to a dispatcher as a single-event batch.
//!
//! # Quick Start
//!
//! ```ignore
//! use loom_insights::{Credentials, EventParams, InsightsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InsightsClient::builder()
//!         .base_url("https://insights.example.com")
//!         .build()?;
//!
//!     // Nothing is sent before the client holds a session.
//!     client.init(Credentials::new("app-id", "search-key").with_user_token("user-42"))?;
//!
//!     client.clicked_object_ids_after_search(&EventParams::new()
//!         .event_name("product_clicked")
//!         .index("products")
//!         .object_ids(["sku-1", "sku-2"])
//!         .positions([1, 2])
//!         .query_id("a7b1c2")
//!     ).await?;
//!
//!     client.converted_filters(&EventParams::new()
//!         .event_name("filtered_purchase")
//!         .index("products")
//!         .filters(["brand:acme"])
//!     ).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Operations
//!
//! | Operation | Event type | Target | Search correlation |
//! |-----------|------------|--------|--------------------|
//! | `clicked_object_ids_after_search` | click | objectIDs | queryID + positions |
//! | `clicked_object_ids` | click | objectIDs | none |
//! | `clicked_filters` | click | filters | none |
//! | `converted_object_ids_after_search` | conversion | objectIDs | queryID |
//! | `converted_object_ids` | conversion | objectIDs | none |
//! | `converted_filters` | conversion | filters | none |
//! | `viewed_object_ids` | view | objectIDs | none |
//! | `viewed_filters` | view | filters | none |
//!
//! # Dispatch
//!
//! By default the caller waits for the HTTP request and receives its outcome.
//! With [`DispatchMode::Detached`] the batch is sent from a background task and
//! failures are only logged. Retries happen inside the HTTP transport, never
//! in the client.
//!
//! # Error Handling
//!
//! ```ignore
//! use loom_insights::InsightsError;
//!
//! match client.viewed_object_ids(&params).await {
//!     Ok(()) => {}
//!     Err(InsightsError::InvalidParameters(e)) => eprintln!("rejected: {e}"),
//!     Err(InsightsError::NotInitialized) => eprintln!("call init() first"),
//!     Err(InsightsError::Transport(e)) => eprintln!("send failed: {e}"),
//!     Err(e) => eprintln!("unexpected error: {e}"),
//! }
//! ```

pub mod client;
pub mod dispatch;
pub mod error;
pub mod transport;

pub use client::{ClientConfig, InsightsClient, InsightsClientBuilder};
pub use dispatch::{DispatchMode, Dispatcher, RequestDispatcher, RequestSender};
pub use error::{InsightsError, Result, TransportError};
pub use transport::retry::{RetryConfig, RetryableError};
pub use transport::HttpRequestSender;

// Re-export types from loom-insights-core that users may need
pub use loom_insights_core::{
	builders, ApiKey, Credentials, EventLimits, EventParams, EventType, EventValidator,
	InsightsEvent, NoLimits, SessionContext, SessionError, ValidationError,
};
