// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Visitor consent: granular categories and the legacy yes/no/unknown decision.
//!
//! A [`Consent`] is a set of granted [`ConsentCategory`] values. There is no
//! explicit "denied" marker: a category that is absent is not granted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::policy::TrackingPolicy;

/// A granular opt-in grant given by a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentCategory {
	Necessary,
	FirstPartyAnalytics,
	ThirdPartyCookies,
}

impl ConsentCategory {
	/// All categories, in a stable order.
	pub const ALL: [ConsentCategory; 3] = [
		ConsentCategory::Necessary,
		ConsentCategory::FirstPartyAnalytics,
		ConsentCategory::ThirdPartyCookies,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ConsentCategory::Necessary => "necessary",
			ConsentCategory::FirstPartyAnalytics => "first-party-analytics",
			ConsentCategory::ThirdPartyCookies => "third-party-cookies",
		}
	}
}

impl std::fmt::Display for ConsentCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// The set of categories a visitor has granted.
///
/// Equality is set equality, so the order in which categories were granted
/// (or serialized) does not matter. Duplicates collapse on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
	#[serde(default)]
	pub categories: BTreeSet<ConsentCategory>,
}

impl Consent {
	/// Consent with no categories granted.
	pub fn none() -> Self {
		Self::default()
	}

	/// Consent with every category granted.
	pub fn all() -> Self {
		Self::from_categories(ConsentCategory::ALL)
	}

	pub fn from_categories(categories: impl IntoIterator<Item = ConsentCategory>) -> Self {
		Self {
			categories: categories.into_iter().collect(),
		}
	}

	/// Maps a legacy boolean consent decision onto categories.
	///
	/// "Allow" grants everything; "disallow" keeps only what is strictly
	/// necessary.
	pub fn from_decision(allowed: bool) -> Self {
		if allowed {
			Self::all()
		} else {
			Self::from_categories([ConsentCategory::Necessary])
		}
	}

	/// Returns a copy with `category` added (builder pattern).
	pub fn with(mut self, category: ConsentCategory) -> Self {
		self.categories.insert(category);
		self
	}

	pub fn grants(&self, category: ConsentCategory) -> bool {
		self.categories.contains(&category)
	}

	pub fn is_empty(&self) -> bool {
		self.categories.is_empty()
	}

	/// Returns `true` if either analytics category is granted. `Necessary`
	/// alone, as recorded for an explicit refusal, does not count.
	pub fn grants_tracking(&self) -> bool {
		self.grants(ConsentCategory::FirstPartyAnalytics)
			|| self.grants(ConsentCategory::ThirdPartyCookies)
	}
}

/// The browser-level tracking preference ("Do Not Track" and cookie support).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigatorPreference {
	/// Tracking explicitly allowed (`doNotTrack == "0"`).
	Allowed,
	/// Tracking disallowed (`doNotTrack == "1"` or cookies disabled).
	Disallowed,
	/// No preference expressed, or not running in a browser.
	#[default]
	Unspecified,
}

impl NavigatorPreference {
	/// Derives the preference from raw navigator signals.
	pub fn from_signals(cookies_enabled: bool, do_not_track: Option<&str>) -> Self {
		if !cookies_enabled {
			return NavigatorPreference::Disallowed;
		}

		match do_not_track {
			Some("1") => NavigatorPreference::Disallowed,
			Some("0") => NavigatorPreference::Allowed,
			_ => NavigatorPreference::Unspecified,
		}
	}
}

/// Resolves the visitor's yes/no/unknown tracking decision.
///
/// - `Some(true)`: the visitor clicked "Allow"
/// - `Some(false)`: the visitor clicked "Disallow", the newsroom has tracking
///   disabled, or the browser asks not to be tracked
/// - `None`: nothing decided yet, the visitor should be asked
pub fn resolve_user_consent(
	stored: Option<bool>,
	policy: TrackingPolicy,
	navigator: NavigatorPreference,
) -> Option<bool> {
	if policy.is_disabled() {
		return Some(false);
	}

	if stored.is_some() {
		return stored;
	}

	if navigator == NavigatorPreference::Disallowed {
		return Some(false);
	}

	// An explicit "allow" from the browser still requires asking.
	None
}
