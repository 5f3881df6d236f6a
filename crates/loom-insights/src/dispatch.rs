// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Dispatch of event batches.
//!
//! Two seams sit between the client and the network:
//!
//! - [`Dispatcher`] receives every batch the client sends, together with the
//!   session it belongs to. Tests substitute it to observe batches.
//! - [`RequestSender`] is the request capability that actually delivers a
//!   batch (HTTP in production, see [`HttpRequestSender`](crate::HttpRequestSender)).
//!
//! [`RequestDispatcher`] connects the two.

use std::sync::Arc;

use loom_insights_core::{InsightsEvent, SessionContext};
use tracing::{debug, error};

use crate::error::{Result, TransportError};

/// Receives each batch the client sends.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
	/// Delivers `events` as one unit, in order, on behalf of `session`.
	async fn dispatch(&self, session: &SessionContext, events: Vec<InsightsEvent>) -> Result<()>;
}

/// Delivers a batch to the ingestion endpoint.
#[async_trait::async_trait]
pub trait RequestSender: Send + Sync {
	async fn send(
		&self,
		session: &SessionContext,
		events: &[InsightsEvent],
	) -> std::result::Result<(), TransportError>;
}

/// How a dispatch reports its outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
	/// Wait for the request sender and return its outcome.
	#[default]
	Wait,
	/// Hand the batch to a background task and return immediately.
	///
	/// Failures are logged and not returned. Requires a tokio runtime.
	Detached,
}

/// The production [`Dispatcher`], backed by a [`RequestSender`].
pub struct RequestDispatcher {
	sender: Arc<dyn RequestSender>,
	mode: DispatchMode,
}

impl RequestDispatcher {
	pub fn new(sender: Arc<dyn RequestSender>, mode: DispatchMode) -> Self {
		Self { sender, mode }
	}

	pub fn mode(&self) -> DispatchMode {
		self.mode
	}
}

#[async_trait::async_trait]
impl Dispatcher for RequestDispatcher {
	async fn dispatch(&self, session: &SessionContext, events: Vec<InsightsEvent>) -> Result<()> {
		debug!(
			count = events.len(),
			event_types = ?events.iter().map(|e| e.event_type().as_str()).collect::<Vec<_>>(),
			mode = ?self.mode,
			"Dispatching insights batch"
		);

		match self.mode {
			DispatchMode::Wait => {
				self.sender.send(session, &events).await?;
				Ok(())
			}
			DispatchMode::Detached => {
				let sender = Arc::clone(&self.sender);
				let session = session.clone();
				tokio::spawn(async move {
					if let Err(e) = sender.send(&session, &events).await {
						error!(
							error = %e,
							count = events.len(),
							"Failed to send detached insights batch"
						);
					}
				});
				Ok(())
			}
		}
	}
}
