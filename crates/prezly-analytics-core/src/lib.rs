// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Prezly newsroom analytics.
//!
//! This crate holds everything that can be decided without I/O:
//!
//! - **Policy and consent**: [`TrackingPolicy`], [`Consent`] and the
//!   navigator-signal helpers
//! - **Permissions**: [`compute_permissions`], the pure mapping from policy and
//!   consent to per-destination flags, and the [`PermissionGate`] wrapper
//! - **Events**: the Segment-shaped [`Event`] and the standard event names
//! - **Enrichment**: the [`EnrichmentPipeline`] that attaches Prezly metadata
//!
//! The `prezly-analytics` crate builds the async client on top of these.

pub mod consent;
pub mod enrichment;
pub mod event;
pub mod events;
pub mod gate;
pub mod links;
pub mod meta;
pub mod permissions;
pub mod policy;

pub use consent::{resolve_user_consent, Consent, ConsentCategory, NavigatorPreference};
pub use enrichment::{
	EnrichmentPipeline, EnrichmentStage, InjectPrezlyMeta, NormalizePrezlyMeta, PREZLY_KEY,
};
pub use event::{Event, EventType};
pub use gate::{GoogleOptOut, PermissionGate};
pub use links::{is_outbound_link, url_parameters, ParameterPrefix, UPLOADCARE_CDN_HOSTNAME};
pub use meta::{meta_from_tags, MetaProvider, PageMetaTags, PrezlyMeta, SharedMeta, META_PREFIX};
pub use permissions::{
	compute_permissions, Integrations, TrackingPermissions, GOOGLE_INTEGRATION,
	PLAUSIBLE_INTEGRATION, PREZLY_INTEGRATION, SEGMENT_INTEGRATION,
};
pub use policy::{TrackingPolicy, UnknownTrackingPolicy};
