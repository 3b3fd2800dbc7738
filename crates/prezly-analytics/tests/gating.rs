// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Consent gating of destinations and event enrichment.

mod common;

use std::sync::Arc;

use common::{config, LocalLoader, RecordingDestination, NEWSROOM};
use prezly_analytics::{
	Analytics, AnalyticsConfig, Consent, ConsentCategory, EnrichmentStage, Event, PrezlyMeta,
	SharedMeta, TrackingPolicy, MASKED_IP,
};
use prezly_analytics_core::{PREZLY_INTEGRATION, SEGMENT_INTEGRATION};
use serde_json::{json, Map, Value};
use uuid::Uuid;

struct Recorders {
	prezly: Arc<RecordingDestination>,
	segment: Arc<RecordingDestination>,
}

async fn client(config: AnalyticsConfig) -> (Analytics, Recorders) {
	let recorders = Recorders {
		prezly: RecordingDestination::for_integration(PREZLY_INTEGRATION),
		segment: RecordingDestination::for_integration(SEGMENT_INTEGRATION),
	};
	let analytics = Analytics::builder()
		.config(config)
		.loader(Arc::new(LocalLoader))
		.destination(recorders.prezly.clone())
		.destination(recorders.segment.clone())
		.build()
		.await
		.unwrap();
	(analytics, recorders)
}

fn with_segment(policy: TrackingPolicy) -> AnalyticsConfig {
	AnalyticsConfig {
		segment_write_key: Some("write-key".to_string()),
		..config(policy)
	}
}

#[tokio::test]
async fn normal_policy_without_consent_tracks_to_prezly_only() {
	let (analytics, recorders) = client(with_segment(TrackingPolicy::Normal)).await;
	assert!(analytics.is_loaded());

	analytics.track("Search", Map::new(), None).await.unwrap();

	let events = recorders.prezly.events();
	assert_eq!(events.len(), 1);
	assert!(recorders.segment.events().is_empty());
	assert_eq!(events[0].integrations.get(PREZLY_INTEGRATION), Some(true));
	assert_eq!(events[0].integrations.get(SEGMENT_INTEGRATION), Some(false));
	assert_eq!(events[0].context["ip"], MASKED_IP);
}

#[tokio::test]
async fn third_party_consent_opens_segment() {
	let (analytics, recorders) = client(with_segment(TrackingPolicy::Normal)).await;

	analytics
		.set_consent(Consent::none().with(ConsentCategory::ThirdPartyCookies))
		.await
		.unwrap();
	analytics.track("Search", Map::new(), None).await.unwrap();

	assert_eq!(recorders.prezly.events().len(), 1);
	let events = recorders.segment.events();
	assert_eq!(events.len(), 1);
	assert!(!events[0].context.contains_key("ip"));

	let permissions = analytics.permissions();
	assert!(permissions.can_identify);
	assert!(permissions.can_track_to_google);
	assert!(!permissions.can_track_to_plausible);
}

#[tokio::test]
async fn strict_policy_resolves_flags_when_the_call_is_made() {
	let (analytics, recorders) = client(with_segment(TrackingPolicy::Strict)).await;

	analytics.track("Before consent", Map::new(), None).await.unwrap();
	analytics
		.set_consent(Consent::none().with(ConsentCategory::FirstPartyAnalytics))
		.await
		.unwrap();
	analytics.track("After consent", Map::new(), None).await.unwrap();

	// The early call was queued with Prezly disabled and stays that way.
	assert_eq!(recorders.prezly.labels(), vec!["After consent"]);
	assert!(recorders.segment.events().is_empty());
}

#[tokio::test]
async fn lenient_policy_tracks_everywhere_but_masks_ip() {
	let (analytics, recorders) = client(with_segment(TrackingPolicy::Lenient)).await;

	assert!(analytics.permissions().can_identify);
	analytics.identify("u1", Map::new(), None).await.unwrap();

	let events = recorders.segment.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].user_id.as_deref(), Some("u1"));
	assert_eq!(events[0].context["ip"], MASKED_IP);
	assert_eq!(recorders.prezly.events().len(), 1);
}

#[tokio::test]
async fn events_carry_current_page_meta() {
	let (analytics, recorders) = client(config(TrackingPolicy::Normal)).await;
	let newsroom = Uuid::parse_str(NEWSROOM).unwrap();
	let story = Uuid::new_v4();

	analytics.track("No meta", Map::new(), None).await.unwrap();
	analytics.set_meta(Some(PrezlyMeta::new(newsroom).with_story(story)));
	analytics.track("With meta", Map::new(), None).await.unwrap();

	let events = recorders.prezly.events();
	assert_eq!(events[0].prezly, None);
	let prezly = events[1].prezly.as_ref().unwrap();
	assert_eq!(prezly["newsroom"], newsroom.to_string());
	assert_eq!(prezly["story"], story.to_string());
	assert_eq!(analytics.meta(), Some(PrezlyMeta::new(newsroom).with_story(story)));
}

#[tokio::test]
async fn nested_prezly_payload_moves_to_event_root() {
	let meta = SharedMeta::new();
	let recorder = RecordingDestination::new();
	let analytics = Analytics::builder()
		.config(config(TrackingPolicy::Normal))
		.loader(Arc::new(LocalLoader))
		.meta(meta.clone())
		.destination(recorder.clone())
		.build()
		.await
		.unwrap();

	let properties = json!({"query": "launch", "prezly": {"newsroom": "from-payload"}});
	analytics
		.track("Search", properties.as_object().cloned().unwrap(), None)
		.await
		.unwrap();

	let event = &recorder.events()[0];
	let properties = event.properties.as_ref().unwrap();
	assert!(!properties.contains_key("prezly"));
	assert_eq!(properties["query"], "launch");
	assert_eq!(event.prezly, Some(json!({"newsroom": "from-payload"})));
}

struct TagRelease;

impl EnrichmentStage for TagRelease {
	fn name(&self) -> &'static str {
		"Tag Release"
	}

	fn apply(&self, event: Event) -> Event {
		event.with_context("release", Value::String("2025.1".to_string()))
	}
}

#[tokio::test]
async fn custom_enrichment_stages_run_after_builtin_ones() {
	let recorder = RecordingDestination::new();
	let analytics = Analytics::builder()
		.config(config(TrackingPolicy::Lenient))
		.loader(Arc::new(LocalLoader))
		.enrichment_stage(Arc::new(TagRelease))
		.destination(recorder.clone())
		.build()
		.await
		.unwrap();

	analytics.page(None, Some("Home"), Map::new(), None).await.unwrap();

	assert_eq!(recorder.events()[0].context["release"], "2025.1");
}
