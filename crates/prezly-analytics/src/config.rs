// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SDK configuration: TOML files and environment variables.
//!
//! Environment variables override file values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PREZLY_ANALYTICS_TRACKING_POLICY` | `tracking_policy` |
//! | `PREZLY_ANALYTICS_NEWSROOM` | `newsroom` |
//! | `PREZLY_ANALYTICS_SEGMENT_WRITE_KEY` | `segment_write_key` |
//! | `PREZLY_ANALYTICS_PLAUSIBLE_DOMAIN` | `plausible.domain` |
//! | `PREZLY_ANALYTICS_GOOGLE_ID` | `google_analytics_id` |
//! | `PREZLY_ANALYTICS_ENV` | `environment` |
//! | `PREZLY_ANALYTICS_FORCE_PROD_API` | `force_production_api` |

use std::path::Path;
use std::time::Duration;

use prezly_analytics_core::{Consent, PermissionGate, TrackingPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AnalyticsError, Result};

/// Production collector.
pub const PRODUCTION_API_URL: &str = "https://analytics.prezly.com";
/// Local collector used outside production.
pub const DEVELOPMENT_API_URL: &str = "http://analytics.prezly.test";
pub const DEFAULT_SEGMENT_API_HOST: &str = "https://api.segment.io";
pub const DEFAULT_PLAUSIBLE_API_HOST: &str = "https://atlas.prezly.com/api/event";

const PRODUCTION: &str = "production";

/// Plausible settings. Plausible is configured when `domain` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibleConfig {
	pub domain: Option<String>,
	pub api_host: String,
}

impl Default for PlausibleConfig {
	fn default() -> Self {
		Self {
			domain: None,
			api_host: DEFAULT_PLAUSIBLE_API_HOST.to_string(),
		}
	}
}

/// Configuration for an [`Analytics`](crate::Analytics) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
	pub tracking_policy: TrackingPolicy,
	/// Newsroom UUID, sent as the first-party collector's write key.
	pub newsroom: Option<Uuid>,
	pub segment_write_key: Option<String>,
	pub segment_api_host: String,
	pub plausible: PlausibleConfig,
	pub google_analytics_id: Option<String>,
	pub cookie_domain: Option<String>,
	/// Consent to start with when none is persisted.
	pub consent: Option<Consent>,
	/// Grant every consent category regardless of the visitor's choice.
	pub ignore_consent: bool,
	/// `production` sends to the production collector and disables
	/// console logging of calls.
	pub environment: String,
	pub force_production_api: bool,
	pub request_timeout_secs: u64,
}

impl Default for AnalyticsConfig {
	fn default() -> Self {
		Self {
			tracking_policy: TrackingPolicy::default(),
			newsroom: None,
			segment_write_key: None,
			segment_api_host: DEFAULT_SEGMENT_API_HOST.to_string(),
			plausible: PlausibleConfig::default(),
			google_analytics_id: None,
			cookie_domain: None,
			consent: None,
			ignore_consent: false,
			environment: "development".to_string(),
			force_production_api: false,
			request_timeout_secs: 10,
		}
	}
}

impl AnalyticsConfig {
	pub fn from_toml_str(content: &str) -> Result<Self> {
		let mut config: AnalyticsConfig = toml::from_str(content)
			.map_err(|e| AnalyticsError::invalid_config(format!("failed to parse TOML: {e}")))?;
		config.normalize();
		Ok(config)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		debug!(path = %path.display(), "loading analytics config file");
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Applies `PREZLY_ANALYTICS_*` variables from the process environment.
	pub fn apply_env(&mut self) -> Result<()> {
		self.apply_env_overrides(|name| std::env::var(name).ok())
	}

	/// Applies overrides read through `lookup`. Empty values are ignored.
	pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

		if let Some(policy) = var("PREZLY_ANALYTICS_TRACKING_POLICY") {
			self.tracking_policy = policy
				.parse::<TrackingPolicy>()
				.map_err(|e| AnalyticsError::invalid_config(e.to_string()))?;
		}
		if let Some(newsroom) = var("PREZLY_ANALYTICS_NEWSROOM") {
			let uuid = Uuid::parse_str(&newsroom).map_err(|_| {
				AnalyticsError::invalid_config(format!("invalid newsroom uuid '{newsroom}'"))
			})?;
			self.newsroom = Some(uuid);
		}
		if let Some(key) = var("PREZLY_ANALYTICS_SEGMENT_WRITE_KEY") {
			self.segment_write_key = Some(key);
		}
		if let Some(domain) = var("PREZLY_ANALYTICS_PLAUSIBLE_DOMAIN") {
			self.plausible.domain = Some(domain);
		}
		if let Some(id) = var("PREZLY_ANALYTICS_GOOGLE_ID") {
			self.google_analytics_id = Some(id);
		}
		if let Some(environment) = var("PREZLY_ANALYTICS_ENV") {
			self.environment = environment;
		}
		if let Some(force) = var("PREZLY_ANALYTICS_FORCE_PROD_API") {
			self.force_production_api = force.eq_ignore_ascii_case("true") || force == "1";
		}

		self.normalize();
		Ok(())
	}

	fn normalize(&mut self) {
		if self.segment_write_key.as_deref() == Some("") {
			self.segment_write_key = None;
		}
		if self.plausible.domain.as_deref() == Some("") {
			self.plausible.domain = None;
		}
	}

	pub fn is_production(&self) -> bool {
		self.environment == PRODUCTION
	}

	pub fn has_segment_write_key(&self) -> bool {
		self.segment_write_key.is_some()
	}

	pub fn is_plausible_configured(&self) -> bool {
		self.plausible.domain.is_some()
	}

	/// Whether there is anywhere to send events at all.
	pub fn is_enabled(&self) -> bool {
		self.has_segment_write_key() || self.newsroom.is_some()
	}

	/// Base URL of the first-party collector.
	///
	/// Outside production the local collector is used, unless
	/// `force_production_api` is set.
	pub fn collector_api_base(&self) -> &'static str {
		if self.is_production() || self.force_production_api {
			PRODUCTION_API_URL
		} else {
			DEVELOPMENT_API_URL
		}
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	pub fn permission_gate(&self) -> PermissionGate {
		PermissionGate::new(
			self.tracking_policy,
			self.has_segment_write_key(),
			self.is_plausible_configured(),
		)
	}

	/// Consent to use when nothing has been persisted yet.
	pub fn initial_consent(&self) -> Consent {
		if self.ignore_consent {
			return Consent::all();
		}
		self.consent.clone().unwrap_or_default()
	}
}
