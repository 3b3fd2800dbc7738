// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Destinations receive enriched events from the router.
//!
//! Each destination checks its own integration flag on the event before
//! sending, so a destination the visitor has not consented to never sees
//! network traffic even though the event itself is still routed.
//!
//! [`LogToConsole`] lives here too but is not a destination: the client
//! logs each call with it as the call is made.

mod console;
mod plausible;
mod prezly;
mod segment;

pub use console::{stringify, LogToConsole};
pub use plausible::Plausible;
pub use prezly::{collector_endpoint, PrezlyCollector};
pub use segment::SegmentHttp;

use async_trait::async_trait;
use prezly_analytics_core::Event;

use crate::error::{AnalyticsError, Result};

/// User agent sent by HTTP destinations.
pub(crate) const USER_AGENT: &str = concat!("prezly-analytics/", env!("CARGO_PKG_VERSION"));

/// A sink for analytics events.
#[async_trait]
pub trait Destination: Send + Sync {
	/// Human-readable name, used in logs.
	fn name(&self) -> &'static str;

	/// Integration flag this destination obeys. `None` means the destination
	/// receives every event.
	fn integration(&self) -> Option<&'static str> {
		None
	}

	/// Whether `event` may be sent here.
	fn accepts(&self, event: &Event) -> bool {
		self
			.integration()
			.map_or(true, |name| event.integrations.allows(name))
	}

	/// Sends one event. Called at most once per event.
	async fn send(&self, event: &Event) -> Result<()>;
}

/// Maps a non-success response to [`AnalyticsError::ServerError`].
pub(crate) async fn check_response_status(response: reqwest::Response) -> Result<reqwest::Response> {
	if response.status().is_success() {
		return Ok(response);
	}

	let status = response.status().as_u16();
	let message = response.text().await.unwrap_or_default();
	Err(AnalyticsError::ServerError { status, message })
}

pub(crate) async fn check_response(response: reqwest::Response) -> Result<()> {
	check_response_status(response).await.map(|_| ())
}

#[cfg(test)]
mod tests {
	use super::*;
	use prezly_analytics_core::{Integrations, PLAUSIBLE_INTEGRATION};
	use serde_json::Map;

	struct Gated;

	#[async_trait]
	impl Destination for Gated {
		fn name(&self) -> &'static str {
			"gated"
		}

		fn integration(&self) -> Option<&'static str> {
			Some(PLAUSIBLE_INTEGRATION)
		}

		async fn send(&self, _event: &Event) -> Result<()> {
			Ok(())
		}
	}

	#[test]
	fn missing_flag_is_allowed() {
		let event = Event::track("Search", Map::new());
		assert!(Gated.accepts(&event));
	}

	#[test]
	fn explicit_false_blocks() {
		let event = Event::track("Search", Map::new())
			.with_integrations(Integrations::new().with(PLAUSIBLE_INTEGRATION, false));
		assert!(!Gated.accepts(&event));

		let event = Event::track("Search", Map::new())
			.with_integrations(Integrations::new().with(PLAUSIBLE_INTEGRATION, true));
		assert!(Gated.accepts(&event));
	}
}
