// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parameter validation.
//!
//! Two layers of checks run before an event is dispatched:
//!
//! 1. **Shape checks** (always on): required fields, the objectIDs/filters
//!    exclusivity rule, and the positions length rule. These live in
//!    [`crate::builders`] and use the helpers in this module.
//! 2. **Limit checks** (pluggable): size limits enforced through an
//!    [`EventValidator`]. [`EventLimits`] carries the ingestion endpoint's
//!    documented limits; [`NoLimits`] disables the step.

use thiserror::Error;

use crate::event::{EventType, InsightsEvent};

/// Maximum length of an event name.
pub const MAX_EVENT_NAME_LENGTH: usize = 64;
/// Maximum number of object IDs in one event.
pub const MAX_OBJECT_IDS: usize = 20;
/// Maximum number of filters in one event.
pub const MAX_FILTERS: usize = 10;
/// Maximum length of one filter expression.
pub const MAX_FILTER_LENGTH: usize = 512;

/// Why a set of parameters was rejected.
///
/// Field names are reported using their wire names (`eventName`, `objectIDs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("missing required field: {field}")]
	Missing { field: &'static str },

	#[error("field must not be empty: {field}")]
	Empty { field: &'static str },

	#[error("{first} and {second} are mutually exclusive")]
	Conflicting {
		first: &'static str,
		second: &'static str,
	},

	#[error("field {field} is not accepted by {event_type} events of this kind")]
	Unexpected {
		field: &'static str,
		event_type: EventType,
	},

	#[error("positions has {positions} entries but objectIDs has {object_ids}")]
	LengthMismatch { positions: usize, object_ids: usize },

	#[error("{field} is {len} characters long (max {max})")]
	TooLong {
		field: &'static str,
		len: usize,
		max: usize,
	},

	#[error("{field} has {len} entries (max {max})")]
	TooMany {
		field: &'static str,
		len: usize,
		max: usize,
	},

	#[error("invalid position {position}: positions are 1-based")]
	InvalidPosition { position: u32 },

	#[error("an event batch must contain at least one event")]
	EmptyBatch,
}

/// Returns the value of a required, non-empty string field.
pub fn require_str<'a>(
	field: &'static str,
	value: Option<&'a String>,
) -> Result<&'a String, ValidationError> {
	match value {
		None => Err(ValidationError::Missing { field }),
		Some(v) if v.is_empty() => Err(ValidationError::Empty { field }),
		Some(v) => Ok(v),
	}
}

/// Returns the value of a required, non-empty list of non-empty strings.
pub fn require_list<'a>(
	field: &'static str,
	value: Option<&'a Vec<String>>,
) -> Result<&'a Vec<String>, ValidationError> {
	match value {
		None => Err(ValidationError::Missing { field }),
		Some(list) if list.is_empty() || list.iter().any(String::is_empty) => {
			Err(ValidationError::Empty { field })
		}
		Some(list) => Ok(list),
	}
}

/// A pluggable check applied to built events before dispatch.
pub trait EventValidator: Send + Sync {
	fn validate(&self, event: &InsightsEvent) -> Result<(), ValidationError>;
}

/// Size limits enforced by the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLimits {
	pub max_event_name_length: usize,
	pub max_object_ids: usize,
	pub max_filters: usize,
	pub max_filter_length: usize,
}

impl Default for EventLimits {
	fn default() -> Self {
		Self {
			max_event_name_length: MAX_EVENT_NAME_LENGTH,
			max_object_ids: MAX_OBJECT_IDS,
			max_filters: MAX_FILTERS,
			max_filter_length: MAX_FILTER_LENGTH,
		}
	}
}

impl EventValidator for EventLimits {
	fn validate(&self, event: &InsightsEvent) -> Result<(), ValidationError> {
		let name_len = event.event_name().chars().count();
		if name_len > self.max_event_name_length {
			return Err(ValidationError::TooLong {
				field: "eventName",
				len: name_len,
				max: self.max_event_name_length,
			});
		}

		if let Some(ids) = event.object_ids() {
			if ids.len() > self.max_object_ids {
				return Err(ValidationError::TooMany {
					field: "objectIDs",
					len: ids.len(),
					max: self.max_object_ids,
				});
			}
		}

		if let Some(filters) = event.filters() {
			if filters.len() > self.max_filters {
				return Err(ValidationError::TooMany {
					field: "filters",
					len: filters.len(),
					max: self.max_filters,
				});
			}
			if let Some(filter) = filters
				.iter()
				.find(|f| f.chars().count() > self.max_filter_length)
			{
				return Err(ValidationError::TooLong {
					field: "filters",
					len: filter.chars().count(),
					max: self.max_filter_length,
				});
			}
		}

		if let Some(&position) = event.positions().and_then(|p| p.iter().find(|&&p| p == 0)) {
			return Err(ValidationError::InvalidPosition { position });
		}

		Ok(())
	}
}

/// Disables limit checks; only the builders' shape checks apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimits;

impl EventValidator for NoLimits {
	fn validate(&self, _event: &InsightsEvent) -> Result<(), ValidationError> {
		Ok(())
	}
}
