// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sends one click-after-search event.
//!
//! ```text
//! INSIGHTS_BASE_URL=https://insights.example.com \
//! INSIGHTS_APP_ID=app-id INSIGHTS_API_KEY=search-key \
//! RUST_LOG=loom_insights=debug \
//!     cargo run -p loom-insights --example send_click
//! ```

use anyhow::{Context, Result};
use loom_insights::{Credentials, EventParams, InsightsClient};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.init();

	let base_url = std::env::var("INSIGHTS_BASE_URL").context("INSIGHTS_BASE_URL is not set")?;
	let credentials = Credentials::from_env()?;

	let client = InsightsClient::builder()
		.base_url(base_url)
		.credentials(credentials)
		.build()?;

	client
		.clicked_object_ids_after_search(
			&EventParams::new()
				.event_name("product_clicked")
				.index("products")
				.object_ids(["sku-1", "sku-2"])
				.positions([1, 2])
				.query_id("a7b1c2d3e4f5"),
		)
		.await?;

	info!(user_token = client.user_token().unwrap_or_default(), "Click event sent");
	Ok(())
}
