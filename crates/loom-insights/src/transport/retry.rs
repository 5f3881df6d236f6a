// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry with exponential backoff for the HTTP transport.
//!
//! Only the transport retries. Events that fail after the last attempt are
//! reported to the caller as a transport failure.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::warn;

/// Backoff policy for transport retries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts, including the first one.
	pub max_attempts: u32,
	pub base_delay: Duration,
	pub max_delay: Duration,
	pub backoff_factor: f64,
	/// Scales each delay by a random factor in `[0.5, 1.5)`.
	pub jitter: bool,
	/// Response statuses that are worth another attempt.
	pub retryable_statuses: Vec<StatusCode>,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			base_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(5),
			backoff_factor: 2.0,
			jitter: true,
			retryable_statuses: vec![
				StatusCode::TOO_MANY_REQUESTS,
				StatusCode::REQUEST_TIMEOUT,
				StatusCode::INTERNAL_SERVER_ERROR,
				StatusCode::BAD_GATEWAY,
				StatusCode::SERVICE_UNAVAILABLE,
				StatusCode::GATEWAY_TIMEOUT,
			],
		}
	}
}

impl RetryConfig {
	/// A policy that makes exactly one attempt.
	pub fn no_retry() -> Self {
		Self {
			max_attempts: 1,
			..Self::default()
		}
	}

	fn should_retry<E: RetryableError>(&self, err: &E) -> bool {
		err.is_retryable()
			|| err
				.status()
				.is_some_and(|status| self.retryable_statuses.contains(&status))
	}
}

/// Classifies errors for [`retry`].
pub trait RetryableError {
	/// Returns `true` if the failure is transient regardless of configuration.
	fn is_retryable(&self) -> bool;

	/// The HTTP status carried by the error, matched against
	/// [`RetryConfig::retryable_statuses`].
	fn status(&self) -> Option<StatusCode> {
		None
	}

	/// The minimum wait the server asked for before the next attempt.
	fn retry_after(&self) -> Option<Duration> {
		None
	}
}

fn calculate_delay(cfg: &RetryConfig, attempt: u32) -> Duration {
	let exponential = cfg.base_delay.as_secs_f64() * cfg.backoff_factor.powi(attempt as i32);
	let capped = exponential.min(cfg.max_delay.as_secs_f64()).max(0.0);

	if cfg.jitter {
		Duration::from_secs_f64(capped * (0.5 + fastrand::f64()))
	} else {
		Duration::from_secs_f64(capped)
	}
}

/// Runs `f` until it succeeds, fails with a non-retryable error, or the
/// attempts in `cfg` are used up. The last error is returned unchanged.
///
/// A server-requested wait ([`RetryableError::retry_after`]) is a lower bound
/// on the next delay. When it exceeds `cfg.max_delay` no further attempt is
/// made and the error is returned as is.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Display,
{
	let mut attempt = 0;

	loop {
		let err = match f().await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};
		attempt += 1;

		if !cfg.should_retry(&err) {
			return Err(err);
		}

		if attempt >= cfg.max_attempts {
			warn!(
				error = %err,
				attempt,
				max_attempts = cfg.max_attempts,
				"Insights request failed, retry attempts exhausted"
			);
			return Err(err);
		}

		let mut delay = calculate_delay(cfg, attempt - 1);
		if let Some(requested) = err.retry_after() {
			if requested > cfg.max_delay {
				warn!(
					error = %err,
					attempt,
					retry_after_ms = requested.as_millis() as u64,
					max_delay_ms = cfg.max_delay.as_millis() as u64,
					"Server asked for a longer wait than allowed, giving up"
				);
				return Err(err);
			}
			delay = delay.max(requested);
		}

		warn!(
			error = %err,
			attempt,
			max_attempts = cfg.max_attempts,
			delay_ms = delay.as_millis() as u64,
			"Retrying insights request"
		);

		tokio::time::sleep(delay).await;
	}
}
