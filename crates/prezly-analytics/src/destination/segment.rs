// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Segment HTTP tracking API.

use async_trait::async_trait;
use prezly_analytics_core::{Event, SEGMENT_INTEGRATION};
use reqwest::Client;
use tracing::debug;

use super::{check_response, Destination, USER_AGENT};
use crate::error::Result;

/// Posts events to `{api_host}/v1/{type}` authenticated with the write key.
pub struct SegmentHttp {
	http: Client,
	api_host: String,
	write_key: String,
}

impl SegmentHttp {
	pub fn new(http: Client, api_host: impl Into<String>, write_key: impl Into<String>) -> Self {
		let api_host = api_host.into().trim_end_matches('/').to_string();
		Self {
			http,
			api_host,
			write_key: write_key.into(),
		}
	}

	fn url_for(&self, event: &Event) -> String {
		format!("{}/v1/{}", self.api_host, event.event_type.as_str())
	}
}

#[async_trait]
impl Destination for SegmentHttp {
	fn name(&self) -> &'static str {
		"Segment.io"
	}

	fn integration(&self) -> Option<&'static str> {
		Some(SEGMENT_INTEGRATION)
	}

	async fn send(&self, event: &Event) -> Result<()> {
		let url = self.url_for(event);
		debug!(url = %url, message_id = %event.message_id, "Sending event to Segment");

		let response = self
			.http
			.post(&url)
			.basic_auth(&self.write_key, None::<&str>)
			.header(reqwest::header::USER_AGENT, USER_AGENT)
			.json(event)
			.send()
			.await?;

		check_response(response).await
	}
}
