// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for reading tracking data out of page URLs and links.

use std::collections::BTreeMap;

use url::Url;

/// Host serving newsroom assets. Links to it are not outbound.
pub const UPLOADCARE_CDN_HOSTNAME: &str = "cdn.uc.assets.prezly.com";

/// Query parameter families carrying tracking data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterPrefix {
	/// `asset_*`, used by campaign links pointing at a specific asset.
	Asset,
	/// `utm_*` campaign parameters. `utm_id` carries the recipient id.
	Utm,
}

impl ParameterPrefix {
	pub fn as_str(&self) -> &'static str {
		match self {
			ParameterPrefix::Asset => "asset_",
			ParameterPrefix::Utm => "utm_",
		}
	}
}

/// Returns the query parameters of `url` starting with `prefix`, keyed by
/// the name with the prefix removed.
///
/// Empty values and the literal string `undefined` are skipped. When a name
/// repeats, the last value wins.
pub fn url_parameters(url: &Url, prefix: ParameterPrefix) -> BTreeMap<String, String> {
	url
		.query_pairs()
		.filter(|(_, value)| !value.is_empty() && value != "undefined")
		.filter_map(|(name, value)| {
			name
				.strip_prefix(prefix.as_str())
				.map(|key| (key.to_string(), value.into_owned()))
		})
		.collect()
}

/// Whether a click on `href` from a page served at `page_host` leaves the
/// newsroom.
pub fn is_outbound_link(href: &Url, page_host: &str) -> bool {
	match href.host_str() {
		Some(host) => host != page_host && host != UPLOADCARE_CDN_HOSTNAME,
		None => false,
	}
}
