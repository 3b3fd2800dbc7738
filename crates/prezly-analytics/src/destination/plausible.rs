// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Plausible events API.
//!
//! Only `track` calls become Plausible custom events; page views are counted
//! by Plausible's own script on the page.

use async_trait::async_trait;
use prezly_analytics_core::{Event, EventType, PLAUSIBLE_INTEGRATION};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{check_response, Destination, USER_AGENT};
use crate::error::Result;

#[derive(Debug, Serialize, PartialEq)]
struct PlausibleEvent<'a> {
	name: &'a str,
	domain: &'a str,
	url: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	props: Option<&'a Map<String, Value>>,
}

pub struct Plausible {
	http: Client,
	api_host: String,
	domain: String,
}

impl Plausible {
	pub fn new(http: Client, api_host: impl Into<String>, domain: impl Into<String>) -> Self {
		Self {
			http,
			api_host: api_host.into(),
			domain: domain.into(),
		}
	}

	fn body_for<'a>(&'a self, event: &'a Event) -> Option<PlausibleEvent<'a>> {
		if event.event_type != EventType::Track {
			return None;
		}
		let name = event.event.as_deref()?;

		// Page URL from the event context when the host supplied one.
		let url = event
			.context
			.get("page")
			.and_then(|page| page.get("url"))
			.and_then(Value::as_str)
			.map(str::to_string)
			.unwrap_or_else(|| format!("https://{}/", self.domain));

		Some(PlausibleEvent {
			name,
			domain: &self.domain,
			url,
			props: event.properties.as_ref().filter(|props| !props.is_empty()),
		})
	}
}

#[async_trait]
impl Destination for Plausible {
	fn name(&self) -> &'static str {
		"Send events to Plausible"
	}

	fn integration(&self) -> Option<&'static str> {
		Some(PLAUSIBLE_INTEGRATION)
	}

	async fn send(&self, event: &Event) -> Result<()> {
		let Some(body) = self.body_for(event) else {
			trace!(event_type = %event.event_type, "Event not sent to Plausible");
			return Ok(());
		};

		debug!(name = body.name, domain = %self.domain, "Sending event to Plausible");

		let response = self
			.http
			.post(&self.api_host)
			.header(reqwest::header::USER_AGENT, USER_AGENT)
			.json(&body)
			.send()
			.await?;

		check_response(response).await
	}
}
