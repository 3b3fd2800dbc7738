// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission evaluation: which destinations may receive which events.
//!
//! [`compute_permissions`] is a pure, total function of the tracking policy,
//! the visitor's consent and two configuration gates. It never fails; any
//! combination it is given resolves to a fully populated
//! [`TrackingPermissions`].
//!
//! Precedence:
//!
//! | Policy | Effect |
//! |--------|--------|
//! | `Disabled` | every permission denied |
//! | `Lenient` | every permission granted, subject to configuration |
//! | `Strict`, `Normal` | permissions derived from consent categories |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consent::{Consent, ConsentCategory};
use crate::policy::TrackingPolicy;

/// Integration name of the first-party collector.
pub const PREZLY_INTEGRATION: &str = "Prezly";
/// Integration name of the Segment-compatible pipeline.
pub const SEGMENT_INTEGRATION: &str = "Segment.io";
/// Integration name of Plausible.
pub const PLAUSIBLE_INTEGRATION: &str = "Plausible";
/// Integration name of Google Analytics / Tag Manager.
pub const GOOGLE_INTEGRATION: &str = "Google";

/// Per-destination permissions derived from policy and consent.
///
/// Recomputed on every consent change and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPermissions {
	pub can_identify: bool,
	pub can_track_to_prezly: bool,
	pub can_track_to_segment: bool,
	pub can_track_to_google: bool,
	pub can_track_to_plausible: bool,
	/// Whether the underlying SDK is needed at all.
	pub can_load_segment: bool,
}

impl TrackingPermissions {
	/// The fail-closed permission set.
	pub fn none() -> Self {
		Self::default()
	}

	/// Returns the integration flags attached to outgoing events.
	pub fn integrations(&self) -> Integrations {
		Integrations::new()
			.with(PREZLY_INTEGRATION, self.can_track_to_prezly)
			.with(SEGMENT_INTEGRATION, self.can_track_to_segment)
			.with(PLAUSIBLE_INTEGRATION, self.can_track_to_plausible)
			.with(GOOGLE_INTEGRATION, self.can_track_to_google)
	}

	fn as_array(&self) -> [bool; 6] {
		[
			self.can_identify,
			self.can_track_to_prezly,
			self.can_track_to_segment,
			self.can_track_to_google,
			self.can_track_to_plausible,
			self.can_load_segment,
		]
	}

	/// Returns `true` if every permission granted by `other` is also granted
	/// by `self`.
	pub fn includes(&self, other: &TrackingPermissions) -> bool {
		self
			.as_array()
			.iter()
			.zip(other.as_array().iter())
			.all(|(mine, theirs)| *mine || !*theirs)
	}
}

/// Derives destination permissions.
pub fn compute_permissions(
	consent: &Consent,
	policy: TrackingPolicy,
	has_segment_write_key: bool,
	is_plausible_configured: bool,
) -> TrackingPermissions {
	let mut permissions = match policy {
		TrackingPolicy::Disabled => return TrackingPermissions::none(),
		TrackingPolicy::Lenient => TrackingPermissions {
			can_identify: true,
			can_track_to_prezly: true,
			can_track_to_segment: has_segment_write_key,
			can_track_to_google: true,
			can_track_to_plausible: is_plausible_configured,
			can_load_segment: false,
		},
		TrackingPolicy::Strict | TrackingPolicy::Normal => {
			let third_party = consent.grants(ConsentCategory::ThirdPartyCookies);
			let first_party = third_party || consent.grants(ConsentCategory::FirstPartyAnalytics);

			TrackingPermissions {
				can_identify: first_party,
				can_track_to_prezly: policy != TrackingPolicy::Strict || first_party,
				can_track_to_segment: has_segment_write_key && third_party,
				can_track_to_google: third_party,
				can_track_to_plausible: is_plausible_configured && first_party,
				can_load_segment: false,
			}
		}
	};

	permissions.can_load_segment = permissions.can_track_to_prezly || permissions.can_track_to_segment;
	permissions
}

/// Integration flags keyed by destination name.
///
/// A destination whose name is missing is allowed, mirroring how the
/// Segment-compatible pipeline treats its `integrations` option. Flags are
/// only ever written as explicit `true`/`false` by this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Integrations(BTreeMap<String, bool>);

impl Integrations {
	pub fn new() -> Self {
		Self(BTreeMap::new())
	}

	/// Sets the flag for `name` (builder pattern).
	pub fn with(mut self, name: impl Into<String>, enabled: bool) -> Self {
		self.0.insert(name.into(), enabled);
		self
	}

	pub fn set(&mut self, name: impl Into<String>, enabled: bool) {
		self.0.insert(name.into(), enabled);
	}

	/// Returns the explicit flag for `name`, if any.
	pub fn get(&self, name: &str) -> Option<bool> {
		self.0.get(name).copied()
	}

	/// Returns `true` unless `name` is explicitly disabled.
	pub fn allows(&self, name: &str) -> bool {
		self.get(name) != Some(false)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
