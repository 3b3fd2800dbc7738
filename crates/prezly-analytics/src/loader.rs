// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading the underlying SDK.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::AnalyticsConfig;
use crate::destination::{Destination, Plausible, PrezlyCollector, SegmentHttp};
use crate::error::{AnalyticsError, Result};
use crate::router::{EventRouter, RouterSetup};

/// Produces the [`EventRouter`] that queued calls are drained into.
///
/// Loading happens at most once per [`Analytics`](crate::Analytics)
/// instance, the first time the current consent allows it. A failed load
/// leaves the client inert.
#[async_trait]
pub trait SdkLoader: Send + Sync {
	async fn load(&self, setup: RouterSetup) -> Result<EventRouter>;
}

/// Builds the standard destinations from configuration.
///
/// - the Prezly collector when a newsroom is set
/// - Segment when a write key is set
/// - Plausible when a domain is set
///
/// Destinations from `setup` are appended after these.
pub struct DefaultLoader {
	config: AnalyticsConfig,
}

impl DefaultLoader {
	pub fn new(config: AnalyticsConfig) -> Self {
		Self { config }
	}

	fn builtin_destinations(&self, http: &Client) -> Vec<Arc<dyn Destination>> {
		let config = &self.config;
		let mut destinations: Vec<Arc<dyn Destination>> = Vec::new();

		if let Some(newsroom) = config.newsroom {
			destinations.push(Arc::new(PrezlyCollector::new(
				http.clone(),
				config.collector_api_base(),
				newsroom,
			)));
		}
		if let Some(write_key) = &config.segment_write_key {
			destinations.push(Arc::new(SegmentHttp::new(
				http.clone(),
				&config.segment_api_host,
				write_key,
			)));
		}
		if let Some(domain) = &config.plausible.domain {
			destinations.push(Arc::new(Plausible::new(
				http.clone(),
				&config.plausible.api_host,
				domain,
			)));
		}
		destinations
	}
}

#[async_trait]
impl SdkLoader for DefaultLoader {
	async fn load(&self, mut setup: RouterSetup) -> Result<EventRouter> {
		let http = Client::builder()
			.timeout(self.config.request_timeout())
			.build()
			.map_err(|e| AnalyticsError::SdkLoad(e.to_string()))?;

		let mut destinations = self.builtin_destinations(&http);
		destinations.append(&mut setup.destinations);
		setup.destinations = destinations;

		let router = setup.into_router();
		info!(
			destinations = ?router.destination_names(),
			collector = self.config.collector_api_base(),
			"Analytics SDK loaded"
		);
		Ok(router)
	}
}
