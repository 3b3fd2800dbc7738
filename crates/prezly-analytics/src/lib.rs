// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Consent-gated analytics SDK for Prezly newsrooms.
//!
//! This crate mediates `identify`, `alias`, `page` and `track` calls between
//! a host application and the analytics destinations of a newsroom: the
//! first-party Prezly collector, Segment, Plausible and Google Analytics.
//! What may reach each destination is decided by the newsroom's tracking
//! policy together with the visitor's consent.
//!
//! # Features
//!
//! - **Consent gating**: per-destination permission flags, recomputed on
//!   every consent change
//! - **Call queue**: calls made before the SDK loads are replayed in order
//! - **Deferred identity**: `identify` is held back until identification is
//!   allowed, then replayed
//! - **Enrichment**: Prezly page metadata attached to every event
//!
//! # Example
//!
//! ```ignore
//! use prezly_analytics::{Analytics, AnalyticsConfig, Consent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = AnalyticsConfig::from_file("analytics.toml")?;
//!     config.apply_env()?;
//!
//!     let analytics = Analytics::builder().config(config).build().await?;
//!
//!     analytics.track("Search", serde_json::Map::new(), None).await?;
//!     analytics.set_consent(Consent::all()).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
pub mod destination;
mod error;
mod identity;
mod loader;
mod queue;
mod recipient;
mod router;
pub mod storage;

pub use client::{Analytics, AnalyticsBuilder, Callback, MASKED_IP};
pub use config::{
	AnalyticsConfig, PlausibleConfig, DEFAULT_PLAUSIBLE_API_HOST, DEFAULT_SEGMENT_API_HOST,
	DEVELOPMENT_API_URL, PRODUCTION_API_URL,
};
pub use destination::Destination;
pub use error::{AnalyticsError, Result};
pub use identity::{
	ConsentStore, DeferredIdentity, DeferredIdentityStore, CONSENT_KEY, DEFERRED_IDENTITY_KEY,
};
pub use loader::{DefaultLoader, SdkLoader};
pub use queue::EventQueue;
pub use recipient::{is_recipient_id_format, RecipientClient, RecipientInfo};
pub use router::{EventRouter, RouterSetup, User};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

// Re-export core types for convenience
pub use prezly_analytics_core::{
	compute_permissions, events, is_outbound_link, meta_from_tags, resolve_user_consent,
	url_parameters, Consent, ConsentCategory, EnrichmentPipeline, EnrichmentStage, Event,
	EventType, GoogleOptOut, Integrations, MetaProvider, NavigatorPreference, PageMetaTags,
	ParameterPrefix, PermissionGate, PrezlyMeta, SharedMeta, TrackingPermissions, TrackingPolicy,
	GOOGLE_INTEGRATION, PLAUSIBLE_INTEGRATION, PREZLY_INTEGRATION, SEGMENT_INTEGRATION,
};
