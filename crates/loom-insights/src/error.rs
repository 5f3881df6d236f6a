// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the insights SDK.

use std::time::Duration;

use loom_insights_core::{SessionError, ValidationError};
use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::retry::RetryableError;

/// Insights SDK errors.
///
/// The client never retries or suppresses these: each one reaches the caller
/// of the operation that produced it.
#[derive(Debug, Error)]
pub enum InsightsError {
	/// The parameters were rejected before anything was dispatched.
	#[error("invalid parameters: {0}")]
	InvalidParameters(#[from] ValidationError),

	/// An event was sent before the client was initialized.
	#[error("client is not initialized: call init() with credentials first")]
	NotInitialized,

	/// `init` was called on a client that already holds a session.
	#[error("client is already initialized")]
	AlreadyInitialized,

	/// The credentials passed to `init` were rejected.
	#[error("invalid credentials: {0}")]
	InvalidCredentials(#[from] SessionError),

	/// No base URL was configured for the HTTP transport.
	#[error("invalid base URL")]
	InvalidBaseUrl,

	/// The request capability reported a failure. Relayed unchanged.
	#[error("transport failure: {0}")]
	Transport(#[from] TransportError),
}

/// Failures reported by a [`RequestSender`](crate::dispatch::RequestSender).
#[derive(Debug, Error)]
pub enum TransportError {
	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	Request(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error ({status}): {message}")]
	Server { status: u16, message: String },

	/// Rate limited by the server.
	#[error("rate limited, retry after {retry_after_secs:?} seconds")]
	RateLimited { retry_after_secs: Option<u64> },

	/// Failure reported by a custom request sender.
	#[error("{0}")]
	Other(String),
}

impl RetryableError for TransportError {
	fn is_retryable(&self) -> bool {
		match self {
			TransportError::Request(e) => e.is_timeout() || e.is_connect(),
			TransportError::RateLimited { .. } => true,
			_ => false,
		}
	}

	fn status(&self) -> Option<StatusCode> {
		match self {
			TransportError::Request(e) => e.status(),
			TransportError::Server { status, .. } => StatusCode::from_u16(*status).ok(),
			TransportError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
			TransportError::Other(_) => None,
		}
	}

	fn retry_after(&self) -> Option<Duration> {
		match self {
			TransportError::RateLimited {
				retry_after_secs: Some(secs),
			} => Some(Duration::from_secs(*secs)),
			_ => None,
		}
	}
}

/// Result type alias for insights operations.
pub type Result<T> = std::result::Result<T, InsightsError>;
