// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission gate consumed by the dispatch layer.

use serde::{Deserialize, Serialize};

use crate::consent::Consent;
use crate::permissions::{compute_permissions, Integrations, TrackingPermissions};
use crate::policy::TrackingPolicy;

/// Binds the session-constant inputs of [`compute_permissions`] so callers
/// only supply the visitor's current consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGate {
	policy: TrackingPolicy,
	has_segment_write_key: bool,
	is_plausible_configured: bool,
}

impl PermissionGate {
	pub fn new(
		policy: TrackingPolicy,
		has_segment_write_key: bool,
		is_plausible_configured: bool,
	) -> Self {
		Self {
			policy,
			has_segment_write_key,
			is_plausible_configured,
		}
	}

	pub fn policy(&self) -> TrackingPolicy {
		self.policy
	}

	pub fn permissions(&self, consent: &Consent) -> TrackingPermissions {
		compute_permissions(
			consent,
			self.policy,
			self.has_segment_write_key,
			self.is_plausible_configured,
		)
	}

	/// Whether the underlying SDK should be loaded at all.
	pub fn can_load_segment(&self, consent: &Consent) -> bool {
		self.permissions(consent).can_load_segment
	}

	pub fn integrations(&self, consent: &Consent) -> Integrations {
		self.permissions(consent).integrations()
	}
}

/// The out-of-band Google Analytics opt-out signal.
///
/// Google's tag honours a global boolean named `ga-disable-<id>`; when it is
/// `true` no hits are sent for that property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleOptOut {
	pub key: String,
	pub disabled: bool,
}

impl GoogleOptOut {
	pub fn for_permissions(analytics_id: &str, permissions: &TrackingPermissions) -> Self {
		Self {
			key: format!("ga-disable-{analytics_id}"),
			disabled: !permissions.can_track_to_google,
		}
	}
}
