// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Campaign recipient lookup.
//!
//! Links in Prezly campaign emails carry the recipient in `utm_id`. The
//! collector resolves it to the contact id used for `identify`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::destination::check_response_status;
use crate::error::Result;

/// A campaign recipient as returned by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientInfo {
	pub campaign_id: u64,
	pub id: String,
	pub recipient_id: String,
}

/// Returns true if `value` looks like a campaign recipient id, e.g.
/// `campaign_abcd_efgh.contact_zxcv_asdf`.
///
/// The id is two or more dot-separated segments, each a lowercase word
/// followed by one or more `_`-separated alphanumeric parts. The last
/// segment names the contact.
pub fn is_recipient_id_format(value: &str) -> bool {
	let segments: Vec<&str> = value.split('.').collect();
	if segments.len() < 2 {
		return false;
	}

	let well_formed = segments.iter().all(|segment| {
		let mut parts = segment.split('_');
		let prefix_ok = parts
			.next()
			.is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase()));
		let rest: Vec<&str> = parts.collect();
		prefix_ok
			&& !rest.is_empty()
			&& rest
				.iter()
				.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()))
	});

	well_formed && segments.last().is_some_and(|s| s.starts_with("contact_"))
}

/// Looks up recipients on the collector API.
#[derive(Debug, Clone)]
pub struct RecipientClient {
	http: Client,
	api_base: String,
}

impl RecipientClient {
	pub fn new(http: Client, api_base: impl Into<String>) -> Self {
		let api_base = api_base.into().trim_end_matches('/').to_string();
		Self { http, api_base }
	}

	pub async fn fetch(&self, recipient_id: &str) -> Result<RecipientInfo> {
		let url = format!("{}/recipients", self.api_base);
		debug!(url = %url, recipient_id, "Fetching campaign recipient");

		let response = self
			.http
			.get(&url)
			.query(&[("id", recipient_id)])
			.send()
			.await?;

		let response = check_response_status(response).await?;
		Ok(response.json().await?)
	}
}
