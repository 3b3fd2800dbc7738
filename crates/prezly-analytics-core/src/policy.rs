// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Site-level tracking policy.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How permissive default tracking is for a newsroom, independent of the
/// visitor's own consent.
///
/// Exactly one policy is active for a newsroom configuration and it does not
/// change for the lifetime of an analytics session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingPolicy {
	/// First-party tracking itself requires explicit consent.
	Strict,
	/// First-party, non-identifying tracking is allowed by default.
	#[default]
	Normal,
	/// No consent is needed for anything.
	Lenient,
	/// Nothing is tracked, whatever the visitor consents to.
	Disabled,
}

/// Error returned when a tracking policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tracking policy: {0}")]
pub struct UnknownTrackingPolicy(pub String);

impl TrackingPolicy {
	/// Returns the canonical wire name.
	pub fn as_str(&self) -> &'static str {
		match self {
			TrackingPolicy::Strict => "STRICT",
			TrackingPolicy::Normal => "DEFAULT",
			TrackingPolicy::Lenient => "WILD_WEST",
			TrackingPolicy::Disabled => "DISABLED",
		}
	}

	/// Returns `true` if nothing may be tracked under this policy.
	pub fn is_disabled(&self) -> bool {
		matches!(self, TrackingPolicy::Disabled)
	}
}

impl std::fmt::Display for TrackingPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl std::str::FromStr for TrackingPolicy {
	type Err = UnknownTrackingPolicy;

	/// Parses a policy name, accepting the legacy aliases.
	///
	/// `CONSENT_TO_IDENTIFY` is the deprecated name of `STRICT`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"STRICT" | "CONSENT_TO_IDENTIFY" => Ok(TrackingPolicy::Strict),
			"DEFAULT" | "NORMAL" => Ok(TrackingPolicy::Normal),
			"WILD_WEST" | "LENIENT" => Ok(TrackingPolicy::Lenient),
			"DISABLED" => Ok(TrackingPolicy::Disabled),
			_ => Err(UnknownTrackingPolicy(s.to_string())),
		}
	}
}

impl Serialize for TrackingPolicy {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for TrackingPolicy {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn parses_canonical_names() {
		assert_eq!("STRICT".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Strict));
		assert_eq!("DEFAULT".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Normal));
		assert_eq!("WILD_WEST".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Lenient));
		assert_eq!("DISABLED".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Disabled));
	}

	#[test]
	fn parses_aliases() {
		assert_eq!("CONSENT_TO_IDENTIFY".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Strict));
		assert_eq!("normal".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Normal));
		assert_eq!("Lenient".parse::<TrackingPolicy>(), Ok(TrackingPolicy::Lenient));
	}

	#[test]
	fn rejects_unknown_names() {
		let err = "PERMISSIVE".parse::<TrackingPolicy>().unwrap_err();
		assert_eq!(err.to_string(), "unknown tracking policy: PERMISSIVE");
	}

	#[test]
	fn default_is_normal() {
		assert_eq!(TrackingPolicy::default(), TrackingPolicy::Normal);
	}

	#[test]
	fn serde_uses_wire_names() {
		let json = serde_json::to_string(&TrackingPolicy::Lenient).unwrap();
		assert_eq!(json, "\"WILD_WEST\"");

		let parsed: TrackingPolicy = serde_json::from_str("\"CONSENT_TO_IDENTIFY\"").unwrap();
		assert_eq!(parsed, TrackingPolicy::Strict);
	}

	fn any_policy() -> impl Strategy<Value = TrackingPolicy> {
		prop_oneof![
			Just(TrackingPolicy::Strict),
			Just(TrackingPolicy::Normal),
			Just(TrackingPolicy::Lenient),
			Just(TrackingPolicy::Disabled),
		]
	}

	proptest! {
		#[test]
		fn display_parses_back(policy in any_policy()) {
			let parsed: TrackingPolicy = policy.to_string().parse().unwrap();
			prop_assert_eq!(parsed, policy);
		}
	}
}
