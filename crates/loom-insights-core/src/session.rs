// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credentials and the initialized session context.
//!
//! [`init`] turns caller-supplied [`Credentials`] into an immutable
//! [`SessionContext`]. The context is what gets attached to every outgoing
//! batch: the application id and API key authenticate the request, and the
//! user token identifies who performed the interactions.
//!
//! When no user token is supplied an anonymous one (`anonymous-<uuid>`) is
//! generated, so events are always attributable to a stable token for the
//! lifetime of the session.

use std::path::PathBuf;
use std::sync::Arc;
use std::{env, fmt, fs};

use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

/// Maximum length of a user token.
pub const MAX_USER_TOKEN_LENGTH: usize = 129;
/// Prefix of generated anonymous user tokens.
pub const ANONYMOUS_TOKEN_PREFIX: &str = "anonymous-";

/// Environment variable holding the application id.
pub const APP_ID_ENV: &str = "INSIGHTS_APP_ID";
/// Environment variable holding the API key (`INSIGHTS_API_KEY_FILE` is also honored).
pub const API_KEY_ENV: &str = "INSIGHTS_API_KEY";
/// Environment variable holding an optional user token.
pub const USER_TOKEN_ENV: &str = "INSIGHTS_USER_TOKEN";

const REDACTED: &str = "[REDACTED]";

/// Errors produced while initializing a session.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("application id is required")]
	MissingAppId,

	#[error("API key is required")]
	MissingApiKey,

	#[error("invalid user token: {0}")]
	InvalidUserToken(String),

	#[error("environment variable {0} is not set")]
	MissingEnv(String),

	#[error("failed to read secret file at {path}: {source}")]
	SecretFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// An API key that never shows up in logs and is zeroed on drop.
///
/// ```
/// use loom_insights_core::ApiKey;
///
/// let key = ApiKey::new("search-key");
/// assert_eq!(format!("{key:?}"), "ApiKey(\"[REDACTED]\")");
/// assert_eq!(key.to_string(), "[REDACTED]");
/// assert_eq!(key.expose(), "search-key");
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct ApiKey(String);

impl ApiKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self(key.into())
	}

	/// Returns the raw key. Call sites opt in to seeing the secret.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` if the key is empty or only whitespace.
	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ApiKey").field(&REDACTED).finish()
	}
}

impl fmt::Display for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

/// Caller-supplied credentials, before validation.
#[derive(Debug, Clone)]
pub struct Credentials {
	pub app_id: String,
	pub api_key: ApiKey,
	pub user_token: Option<String>,
}

impl Credentials {
	pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self {
			app_id: app_id.into(),
			api_key: ApiKey::new(api_key),
			user_token: None,
		}
	}

	/// Sets the token identifying the end user.
	pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
		self.user_token = Some(token.into());
		self
	}

	/// Loads credentials from the environment.
	///
	/// - `INSIGHTS_APP_ID` (required)
	/// - `INSIGHTS_API_KEY_FILE` or `INSIGHTS_API_KEY` (required; the file
	///   form wins and has one trailing newline stripped)
	/// - `INSIGHTS_USER_TOKEN` (optional)
	pub fn from_env() -> Result<Self, SessionError> {
		let app_id =
			env::var(APP_ID_ENV).map_err(|_| SessionError::MissingEnv(APP_ID_ENV.to_string()))?;
		let api_key = load_api_key()?;
		let user_token = env::var(USER_TOKEN_ENV).ok();

		Ok(Self {
			app_id,
			api_key,
			user_token,
		})
	}
}

fn load_api_key() -> Result<ApiKey, SessionError> {
	let file_var = format!("{API_KEY_ENV}_FILE");

	if let Ok(path) = env::var(&file_var) {
		let path = PathBuf::from(path);
		let content = fs::read_to_string(&path).map_err(|source| SessionError::SecretFile {
			path: path.clone(),
			source,
		})?;
		let key = content.strip_suffix('\n').unwrap_or(&content);
		return Ok(ApiKey::new(key));
	}

	env::var(API_KEY_ENV)
		.map(ApiKey::new)
		.map_err(|_| SessionError::MissingEnv(API_KEY_ENV.to_string()))
}

#[derive(Debug)]
struct SessionInner {
	app_id: String,
	api_key: ApiKey,
	user_token: String,
	anonymous: bool,
}

/// The initialized, immutable session attached to every dispatched batch.
///
/// Cloning is cheap; all clones share the same values.
#[derive(Debug, Clone)]
pub struct SessionContext {
	inner: Arc<SessionInner>,
}

impl SessionContext {
	pub fn app_id(&self) -> &str {
		&self.inner.app_id
	}

	pub fn api_key(&self) -> &ApiKey {
		&self.inner.api_key
	}

	pub fn user_token(&self) -> &str {
		&self.inner.user_token
	}

	/// Returns `true` if the user token was generated rather than supplied.
	pub fn is_anonymous(&self) -> bool {
		self.inner.anonymous
	}
}

/// Validates credentials and produces a session context.
pub fn init(credentials: Credentials) -> Result<SessionContext, SessionError> {
	let Credentials {
		app_id,
		api_key,
		user_token,
	} = credentials;

	if app_id.trim().is_empty() {
		return Err(SessionError::MissingAppId);
	}
	if api_key.is_empty() {
		return Err(SessionError::MissingApiKey);
	}

	let (user_token, anonymous) = match user_token {
		Some(token) => {
			validate_user_token(&token)?;
			(token, false)
		}
		None => (anonymous_user_token(), true),
	};

	Ok(SessionContext {
		inner: Arc::new(SessionInner {
			app_id,
			api_key,
			user_token,
			anonymous,
		}),
	})
}

/// Generates an anonymous user token of the form `anonymous-<uuid v4>`.
pub fn anonymous_user_token() -> String {
	format!("{ANONYMOUS_TOKEN_PREFIX}{}", Uuid::new_v4())
}

/// Checks that a user token is 1 to 129 characters of `[A-Za-z0-9_=/+-]`.
pub fn validate_user_token(token: &str) -> Result<(), SessionError> {
	if token.is_empty() || token.len() > MAX_USER_TOKEN_LENGTH {
		return Err(SessionError::InvalidUserToken(format!(
			"must be between 1 and {MAX_USER_TOKEN_LENGTH} characters"
		)));
	}

	if let Some(c) = token
		.chars()
		.find(|&c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '=' | '/' | '+' | '-')))
	{
		return Err(SessionError::InvalidUserToken(format!(
			"unsupported character {c:?}"
		)));
	}

	Ok(())
}
