// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The canonical insights event.
//!
//! An [`InsightsEvent`] describes one user interaction with search results.
//! Events can only be produced by the builder functions in
//! [`crate::builders`], which guarantees that:
//!
//! - `event_type` always matches the builder that produced the event
//! - exactly one of `object_ids` / `filters` is populated
//! - `positions`, when present, has the same length as `object_ids`
//!
//! Events are immutable: every field is private and exposed through accessors.

use serde::Serialize;

/// The category of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
	/// The user clicked a result or a filter.
	Click,
	/// The user converted (purchase, signup, add-to-cart) on a result or filter.
	Conversion,
	/// The user viewed results or filters.
	View,
}

impl EventType {
	/// Returns the wire representation ("click", "conversion" or "view").
	pub fn as_str(&self) -> &'static str {
		match self {
			EventType::Click => "click",
			EventType::Conversion => "conversion",
			EventType::View => "view",
		}
	}
}

impl std::fmt::Display for EventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for EventType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"click" => Ok(EventType::Click),
			"conversion" => Ok(EventType::Conversion),
			"view" => Ok(EventType::View),
			_ => Err(format!("invalid event type: {}", s)),
		}
	}
}

/// A validated insights event, ready to be dispatched.
///
/// The serialized form is the wire shape expected by the ingestion endpoint:
///
/// ```text
/// {"eventType": "click", "eventName": "...", "index": "...",
///  "objectIDs": [...], "positions": [...], "queryID": "..."}
/// ```
///
/// Optional fields that are not set are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsEvent {
	event_type: EventType,
	event_name: String,
	index: String,
	#[serde(rename = "objectIDs", skip_serializing_if = "Option::is_none")]
	object_ids: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	filters: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	positions: Option<Vec<u32>>,
	#[serde(rename = "queryID", skip_serializing_if = "Option::is_none")]
	query_id: Option<String>,
}

/// Which list an event targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
	ObjectIds(Vec<String>),
	Filters(Vec<String>),
}

impl InsightsEvent {
	/// Assembles an event from already-validated parts.
	pub(crate) fn from_parts(
		event_type: EventType,
		event_name: String,
		index: String,
		target: Target,
		positions: Option<Vec<u32>>,
		query_id: Option<String>,
	) -> Self {
		let (object_ids, filters) = match target {
			Target::ObjectIds(ids) => (Some(ids), None),
			Target::Filters(filters) => (None, Some(filters)),
		};

		Self {
			event_type,
			event_name,
			index,
			object_ids,
			filters,
			positions,
			query_id,
		}
	}

	pub fn event_type(&self) -> EventType {
		self.event_type
	}

	pub fn event_name(&self) -> &str {
		&self.event_name
	}

	/// The searched collection the interaction refers to.
	pub fn index(&self) -> &str {
		&self.index
	}

	pub fn object_ids(&self) -> Option<&[String]> {
		self.object_ids.as_deref()
	}

	pub fn filters(&self) -> Option<&[String]> {
		self.filters.as_deref()
	}

	/// 1-based ranks of `object_ids` in the originating result list.
	pub fn positions(&self) -> Option<&[u32]> {
		self.positions.as_deref()
	}

	/// Correlates the event with a specific search response.
	pub fn query_id(&self) -> Option<&str> {
		self.query_id.as_deref()
	}

	/// Returns `true` if the event is tied to a search response.
	pub fn is_after_search(&self) -> bool {
		self.query_id.is_some()
	}

	/// Serializes the event to its wire JSON value.
	pub fn to_json(&self) -> serde_json::Value {
		// Serializing a struct of strings and integers into a Value cannot fail.
		serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn click_after_search() -> InsightsEvent {
		InsightsEvent::from_parts(
			EventType::Click,
			"testEvent".to_string(),
			"my-index".to_string(),
			Target::ObjectIds(vec!["2".to_string()]),
			Some(vec![1]),
			Some("testing".to_string()),
		)
	}

	#[test]
	fn event_type_wire_names() {
		assert_eq!(EventType::Click.as_str(), "click");
		assert_eq!(EventType::Conversion.as_str(), "conversion");
		assert_eq!(EventType::View.as_str(), "view");
		assert_eq!(
			serde_json::to_value(EventType::Conversion).unwrap(),
			json!("conversion")
		);
	}

	#[test]
	fn event_type_parses_from_str() {
		assert_eq!("view".parse::<EventType>().unwrap(), EventType::View);
		assert!("Click".parse::<EventType>().is_err());
	}

	#[test]
	fn serializes_after_search_event_in_wire_shape() {
		assert_eq!(
			click_after_search().to_json(),
			json!({
				"eventType": "click",
				"eventName": "testEvent",
				"index": "my-index",
				"objectIDs": ["2"],
				"positions": [1],
				"queryID": "testing",
			})
		);
	}

	#[test]
	fn filter_event_omits_object_fields() {
		let event = InsightsEvent::from_parts(
			EventType::View,
			"viewed".to_string(),
			"products".to_string(),
			Target::Filters(vec!["brands:apple".to_string()]),
			None,
			None,
		);

		let value = event.to_json();
		let obj = value.as_object().unwrap();
		assert_eq!(obj.len(), 4);
		assert!(!obj.contains_key("objectIDs"));
		assert!(!obj.contains_key("positions"));
		assert!(!obj.contains_key("queryID"));
		assert_eq!(value["filters"], json!(["brands:apple"]));
		assert!(!event.is_after_search());
	}

	#[test]
	fn accessors_expose_fields() {
		let event = click_after_search();
		assert_eq!(event.event_type(), EventType::Click);
		assert_eq!(event.event_name(), "testEvent");
		assert_eq!(event.index(), "my-index");
		assert_eq!(event.object_ids(), Some(&["2".to_string()][..]));
		assert_eq!(event.filters(), None);
		assert_eq!(event.positions(), Some(&[1u32][..]));
		assert_eq!(event.query_id(), Some("testing"));
		assert!(event.is_after_search());
	}
}
