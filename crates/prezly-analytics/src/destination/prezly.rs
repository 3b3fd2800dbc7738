// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! First-party Prezly Analytics collector.

use async_trait::async_trait;
use prezly_analytics_core::{Event, EventType, PREZLY_INTEGRATION};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use super::{check_response, Destination, USER_AGENT};
use crate::error::Result;

/// Collector path for each event type. Screen events are not collected.
pub fn collector_endpoint(event_type: EventType) -> Option<&'static str> {
	match event_type {
		EventType::Alias => Some("/track/a"),
		EventType::Group => Some("/track/g"),
		EventType::Identify => Some("/track/i"),
		EventType::Page => Some("/track/p"),
		EventType::Track => Some("/track/t"),
		EventType::Screen => None,
	}
}

/// Posts events to the Prezly collector, keyed by newsroom.
pub struct PrezlyCollector {
	http: Client,
	api_base: String,
	newsroom: Uuid,
}

impl PrezlyCollector {
	pub fn new(http: Client, api_base: impl Into<String>, newsroom: Uuid) -> Self {
		let api_base = api_base.into().trim_end_matches('/').to_string();
		Self {
			http,
			api_base,
			newsroom,
		}
	}
}

#[async_trait]
impl Destination for PrezlyCollector {
	fn name(&self) -> &'static str {
		"Send events to Prezly Analytics"
	}

	fn integration(&self) -> Option<&'static str> {
		Some(PREZLY_INTEGRATION)
	}

	async fn send(&self, event: &Event) -> Result<()> {
		let Some(endpoint) = collector_endpoint(event.event_type) else {
			trace!(event_type = %event.event_type, "Event type not collected");
			return Ok(());
		};

		let mut payload = serde_json::to_value(event)?;
		if let Value::Object(map) = &mut payload {
			// The collector reads the newsroom from the write key.
			map.insert("writeKey".to_string(), Value::String(self.newsroom.to_string()));
		}

		let url = format!("{}{}", self.api_base, endpoint);
		debug!(url = %url, message_id = %event.message_id, "Sending event to collector");

		let response = self
			.http
			.post(&url)
			.header(reqwest::header::USER_AGENT, USER_AGENT)
			.json(&payload)
			.send()
			.await?;

		check_response(response).await
	}
}
