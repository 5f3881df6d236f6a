// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom search insights.
//!
//! Search insights report what users do with search results: which results or
//! filters they click, which lead to a conversion, and which they view. This
//! crate holds the I/O-free part of the client SDK (`loom-insights`):
//!
//! - [`InsightsEvent`], the canonical event record, and its [`EventType`]
//! - [`EventParams`], the caller's parameter record
//! - one builder per interaction family in [`builders`]
//! - [`ValidationError`] and the pluggable [`EventValidator`] limits step
//! - [`Credentials`], [`init`] and the immutable [`SessionContext`]
//!
//! # Example
//!
//! ```
//! use loom_insights_core::{builders, Credentials, EventParams, EventType};
//!
//! let session = loom_insights_core::init(
//!     Credentials::new("app-id", "search-key").with_user_token("user-42"),
//! ).unwrap();
//!
//! let event = builders::clicked_object_ids_after_search(
//!     &EventParams::new()
//!         .event_name("product_clicked")
//!         .index("products")
//!         .object_ids(["sku-1"])
//!         .positions([1])
//!         .query_id("a7b1c2"),
//! ).unwrap();
//!
//! assert_eq!(event.event_type(), EventType::Click);
//! assert_eq!(session.user_token(), "user-42");
//! ```

pub mod builders;
pub mod event;
pub mod params;
pub mod session;
pub mod validation;

pub use builders::{
	clicked_filters, clicked_object_ids, clicked_object_ids_after_search, converted_filters,
	converted_object_ids, converted_object_ids_after_search, viewed_filters, viewed_object_ids,
};
pub use event::{EventType, InsightsEvent};
pub use params::EventParams;
pub use session::{
	anonymous_user_token, init, validate_user_token, ApiKey, Credentials, SessionContext,
	SessionError,
};
pub use validation::{EventLimits, EventValidator, NoLimits, ValidationError};
