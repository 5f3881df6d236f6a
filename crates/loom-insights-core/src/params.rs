// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller-supplied parameters for the event builders.

use serde::{Deserialize, Serialize};

/// Parameters describing one interaction, before validation.
///
/// Every field is optional so that a missing field can be reported by name.
/// Which fields are required depends on the builder the parameters are passed
/// to; see [`crate::builders`].
///
/// The serde representation uses the wire names, so a JSON parameter object
/// can be deserialized directly:
///
/// ```
/// use loom_insights_core::EventParams;
///
/// let params: EventParams = serde_json::from_value(serde_json::json!({
///     "eventName": "product_clicked",
///     "index": "products",
///     "objectIDs": ["sku-1"],
///     "positions": [3],
///     "queryID": "a7b1c2",
/// })).unwrap();
///
/// let same = EventParams::new()
///     .event_name("product_clicked")
///     .index("products")
///     .object_ids(["sku-1"])
///     .positions([3])
///     .query_id("a7b1c2");
///
/// assert_eq!(params, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub event_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<String>,
	#[serde(
		rename = "objectIDs",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	pub object_ids: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filters: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub positions: Option<Vec<u32>>,
	#[serde(rename = "queryID", default, skip_serializing_if = "Option::is_none")]
	pub query_id: Option<String>,
}

impl EventParams {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn event_name(mut self, name: impl Into<String>) -> Self {
		self.event_name = Some(name.into());
		self
	}

	pub fn index(mut self, index: impl Into<String>) -> Self {
		self.index = Some(index.into());
		self
	}

	pub fn object_ids<I, S>(mut self, ids: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.object_ids = Some(ids.into_iter().map(Into::into).collect());
		self
	}

	pub fn filters<I, S>(mut self, filters: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.filters = Some(filters.into_iter().map(Into::into).collect());
		self
	}

	pub fn positions<I>(mut self, positions: I) -> Self
	where
		I: IntoIterator<Item = u32>,
	{
		self.positions = Some(positions.into_iter().collect());
		self
	}

	pub fn query_id(mut self, query_id: impl Into<String>) -> Self {
		self.query_id = Some(query_id.into());
		self
	}
}
