// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event builders.
//!
//! One function per interaction family. Each builder checks the shape of the
//! caller's [`EventParams`] and returns an [`InsightsEvent`] stamped with the
//! builder's [`EventType`]. Values are copied verbatim.
//!
//! | Builder | Event type | Targets | Search correlation |
//! |---------|------------|---------|--------------------|
//! | [`clicked_object_ids_after_search`] | click | objectIDs | queryID + positions |
//! | [`clicked_object_ids`] | click | objectIDs | none |
//! | [`clicked_filters`] | click | filters | none |
//! | [`converted_object_ids_after_search`] | conversion | objectIDs | queryID |
//! | [`converted_object_ids`] | conversion | objectIDs | none |
//! | [`converted_filters`] | conversion | filters | none |
//! | [`viewed_object_ids`] | view | objectIDs | none |
//! | [`viewed_filters`] | view | filters | none |
//!
//! Fields a family does not take (for example `queryID` on [`clicked_object_ids`])
//! are rejected with [`ValidationError::Unexpected`].

use crate::event::{EventType, InsightsEvent, Target};
use crate::params::EventParams;
use crate::validation::{require_list, require_str, ValidationError};

const EVENT_NAME: &str = "eventName";
const INDEX: &str = "index";
const OBJECT_IDS: &str = "objectIDs";
const FILTERS: &str = "filters";
const POSITIONS: &str = "positions";
const QUERY_ID: &str = "queryID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
	ObjectIds,
	Filters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchCorrelation {
	None,
	QueryId,
	QueryIdAndPositions,
}

/// The contract of one builder family.
#[derive(Debug, Clone, Copy)]
struct EventShape {
	event_type: EventType,
	target: TargetKind,
	search: SearchCorrelation,
}

const CLICK_AFTER_SEARCH: EventShape = EventShape {
	event_type: EventType::Click,
	target: TargetKind::ObjectIds,
	search: SearchCorrelation::QueryIdAndPositions,
};

const CLICK: EventShape = EventShape {
	event_type: EventType::Click,
	target: TargetKind::ObjectIds,
	search: SearchCorrelation::None,
};

const CLICK_FILTERS: EventShape = EventShape {
	event_type: EventType::Click,
	target: TargetKind::Filters,
	search: SearchCorrelation::None,
};

const CONVERSION_AFTER_SEARCH: EventShape = EventShape {
	event_type: EventType::Conversion,
	target: TargetKind::ObjectIds,
	search: SearchCorrelation::QueryId,
};

const CONVERSION: EventShape = EventShape {
	event_type: EventType::Conversion,
	target: TargetKind::ObjectIds,
	search: SearchCorrelation::None,
};

const CONVERSION_FILTERS: EventShape = EventShape {
	event_type: EventType::Conversion,
	target: TargetKind::Filters,
	search: SearchCorrelation::None,
};

const VIEW: EventShape = EventShape {
	event_type: EventType::View,
	target: TargetKind::ObjectIds,
	search: SearchCorrelation::None,
};

const VIEW_FILTERS: EventShape = EventShape {
	event_type: EventType::View,
	target: TargetKind::Filters,
	search: SearchCorrelation::None,
};

fn build(shape: EventShape, params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	let event_name = require_str(EVENT_NAME, params.event_name.as_ref())?;
	let index = require_str(INDEX, params.index.as_ref())?;

	if params.object_ids.is_some() && params.filters.is_some() {
		return Err(ValidationError::Conflicting {
			first: OBJECT_IDS,
			second: FILTERS,
		});
	}

	let target = match shape.target {
		TargetKind::ObjectIds => {
			if params.filters.is_some() {
				return Err(ValidationError::Unexpected {
					field: FILTERS,
					event_type: shape.event_type,
				});
			}
			Target::ObjectIds(require_list(OBJECT_IDS, params.object_ids.as_ref())?.clone())
		}
		TargetKind::Filters => {
			if params.object_ids.is_some() {
				return Err(ValidationError::Unexpected {
					field: OBJECT_IDS,
					event_type: shape.event_type,
				});
			}
			Target::Filters(require_list(FILTERS, params.filters.as_ref())?.clone())
		}
	};

	let query_id = match shape.search {
		SearchCorrelation::None => {
			reject_present(QUERY_ID, params.query_id.is_some(), shape.event_type)?;
			None
		}
		SearchCorrelation::QueryId | SearchCorrelation::QueryIdAndPositions => {
			Some(require_str(QUERY_ID, params.query_id.as_ref())?.clone())
		}
	};

	let positions = match (shape.search, &target) {
		(SearchCorrelation::QueryIdAndPositions, Target::ObjectIds(ids)) => {
			let positions = params
				.positions
				.as_ref()
				.ok_or(ValidationError::Missing { field: POSITIONS })?;
			if positions.len() != ids.len() {
				return Err(ValidationError::LengthMismatch {
					positions: positions.len(),
					object_ids: ids.len(),
				});
			}
			Some(positions.clone())
		}
		_ => {
			reject_present(POSITIONS, params.positions.is_some(), shape.event_type)?;
			None
		}
	};

	Ok(InsightsEvent::from_parts(
		shape.event_type,
		event_name.clone(),
		index.clone(),
		target,
		positions,
		query_id,
	))
}

fn reject_present(
	field: &'static str,
	present: bool,
	event_type: EventType,
) -> Result<(), ValidationError> {
	if present {
		return Err(ValidationError::Unexpected { field, event_type });
	}
	Ok(())
}

/// Builds a click on objects from a search response.
///
/// Requires `eventName`, `index`, `objectIDs`, `queryID`, and `positions`
/// with one position per object ID.
pub fn clicked_object_ids_after_search(
	params: &EventParams,
) -> Result<InsightsEvent, ValidationError> {
	build(CLICK_AFTER_SEARCH, params)
}

/// Builds a click on objects, not tied to a search response.
pub fn clicked_object_ids(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(CLICK, params)
}

/// Builds a click on filters.
pub fn clicked_filters(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(CLICK_FILTERS, params)
}

/// Builds a conversion on objects from a search response. Requires `queryID`.
pub fn converted_object_ids_after_search(
	params: &EventParams,
) -> Result<InsightsEvent, ValidationError> {
	build(CONVERSION_AFTER_SEARCH, params)
}

pub fn converted_object_ids(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(CONVERSION, params)
}

pub fn converted_filters(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(CONVERSION_FILTERS, params)
}

pub fn viewed_object_ids(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(VIEW, params)
}

pub fn viewed_filters(params: &EventParams) -> Result<InsightsEvent, ValidationError> {
	build(VIEW_FILTERS, params)
}
