// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Persisted visitor state: the deferred identity and the consent decision.

use std::sync::Arc;

use prezly_analytics_core::Consent;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::KeyValueStorage;

/// Storage key of the deferred identity.
pub const DEFERRED_IDENTITY_KEY: &str = "prezly_ajs_deferred_identity";
/// Storage key of the consent decision.
pub const CONSENT_KEY: &str = "prezly_consent";

/// An identify call held back until the visitor allows identification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredIdentity {
	pub user_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub traits: Option<Map<String, Value>>,
}

impl DeferredIdentity {
	pub fn new(user_id: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			traits: None,
		}
	}

	pub fn with_traits(mut self, traits: Map<String, Value>) -> Self {
		self.traits = Some(traits);
		self
	}
}

/// Single-slot store for the deferred identity. Every `set` replaces the
/// previous value.
#[derive(Clone)]
pub struct DeferredIdentityStore {
	storage: Arc<dyn KeyValueStorage>,
}

impl DeferredIdentityStore {
	pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
		Self { storage }
	}

	/// Returns the stored identity. Unparseable values read as absent.
	pub async fn get(&self) -> Result<Option<DeferredIdentity>> {
		let Some(raw) = self.storage.get(DEFERRED_IDENTITY_KEY).await? else {
			return Ok(None);
		};

		match serde_json::from_str(&raw) {
			Ok(identity) => Ok(Some(identity)),
			Err(e) => {
				warn!(error = %e, "Ignoring malformed deferred identity");
				Ok(None)
			}
		}
	}

	pub async fn set(&self, identity: &DeferredIdentity) -> Result<()> {
		let raw = serde_json::to_string(identity)?;
		self.storage.set(DEFERRED_IDENTITY_KEY, &raw).await?;
		debug!(user_id = %identity.user_id, "Stored deferred identity");
		Ok(())
	}

	pub async fn remove(&self) -> Result<()> {
		self.storage.remove(DEFERRED_IDENTITY_KEY).await
	}
}

/// Persists the visitor's consent between sessions.
#[derive(Clone)]
pub struct ConsentStore {
	storage: Arc<dyn KeyValueStorage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredConsent {
	Categories(Consent),
	Decision(bool),
}

impl ConsentStore {
	pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
		Self { storage }
	}

	/// Returns the stored consent.
	///
	/// A bare `true`/`false` written by older clients is mapped with
	/// [`Consent::from_decision`]. Anything else unparseable reads as absent.
	pub async fn get(&self) -> Result<Option<Consent>> {
		let Some(raw) = self.storage.get(CONSENT_KEY).await? else {
			return Ok(None);
		};

		match serde_json::from_str(&raw) {
			Ok(StoredConsent::Categories(consent)) => Ok(Some(consent)),
			Ok(StoredConsent::Decision(allowed)) => Ok(Some(Consent::from_decision(allowed))),
			Err(e) => {
				warn!(error = %e, "Ignoring malformed stored consent");
				Ok(None)
			}
		}
	}

	pub async fn set(&self, consent: &Consent) -> Result<()> {
		let raw = serde_json::to_string(consent)?;
		self.storage.set(CONSENT_KEY, &raw).await
	}

	pub async fn remove(&self) -> Result<()> {
		self.storage.remove(CONSENT_KEY).await
	}
}
