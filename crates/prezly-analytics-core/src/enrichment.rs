// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event enrichment pipeline.
//!
//! Stages run in order on every event as it is dispatched, after it leaves
//! the queue. They are pure transforms: they never fail and never decide
//! whether an event is sent. Per-destination gating happens at the send
//! edge.
//!
//! The default pipeline is:
//!
//! 1. [`NormalizePrezlyMeta`] moves a caller-supplied `prezly` key out of
//!    `properties` / `traits` to the event root.
//! 2. [`InjectPrezlyMeta`] overwrites the root `prezly` block with the
//!    current page metadata, when any is known.

use std::sync::Arc;

use serde_json::Value;

use crate::event::{Event, EventType};
use crate::meta::MetaProvider;

/// Key of the Prezly metadata block.
pub const PREZLY_KEY: &str = "prezly";

/// A single transform applied to outgoing events.
pub trait EnrichmentStage: Send + Sync {
	/// Human-readable stage name, used in logs.
	fn name(&self) -> &'static str;

	fn apply(&self, event: Event) -> Event;
}

/// Writes the current metadata to the event root.
///
/// Re-applying overwrites the block with the then-current values; it never
/// merges with what is already there.
pub struct InjectPrezlyMeta {
	provider: Arc<dyn MetaProvider>,
}

impl InjectPrezlyMeta {
	pub fn new(provider: Arc<dyn MetaProvider>) -> Self {
		Self { provider }
	}
}

impl EnrichmentStage for InjectPrezlyMeta {
	fn name(&self) -> &'static str {
		"Inject Prezly Meta"
	}

	fn apply(&self, mut event: Event) -> Event {
		if let Some(meta) = self.provider.current() {
			event.prezly = Some(Value::Object(meta));
		}
		event
	}
}

/// Relocates a `prezly` key from the event payload to the event root.
///
/// Some destinations read root-level metadata while others only accept
/// top-level properties, so the block must live in exactly one place. For
/// `identify` the payload is `traits`; for `track` and `page` it is
/// `properties`. Other event types pass through unchanged, as does any event
/// without a non-null nested `prezly` key, which makes the stage idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizePrezlyMeta;

impl EnrichmentStage for NormalizePrezlyMeta {
	fn name(&self) -> &'static str {
		"Normalize Prezly Meta"
	}

	fn apply(&self, mut event: Event) -> Event {
		if !matches!(
			event.event_type,
			EventType::Identify | EventType::Track | EventType::Page
		) {
			return event;
		}

		let Some(payload) = event.payload_mut() else {
			return event;
		};

		if payload.get(PREZLY_KEY).map_or(true, Value::is_null) {
			return event;
		}

		let meta = payload.remove(PREZLY_KEY);
		event.prezly = meta;
		event
	}
}

/// An ordered list of enrichment stages.
#[derive(Default, Clone)]
pub struct EnrichmentPipeline {
	stages: Vec<Arc<dyn EnrichmentStage>>,
}

impl EnrichmentPipeline {
	pub fn new() -> Self {
		Self::default()
	}

	/// The standard pipeline: normalize, then inject from `provider`.
	pub fn standard(provider: Arc<dyn MetaProvider>) -> Self {
		Self::new()
			.with_stage(Arc::new(NormalizePrezlyMeta))
			.with_stage(Arc::new(InjectPrezlyMeta::new(provider)))
	}

	/// Appends a stage (builder pattern).
	pub fn with_stage(mut self, stage: Arc<dyn EnrichmentStage>) -> Self {
		self.stages.push(stage);
		self
	}

	pub fn push(&mut self, stage: Arc<dyn EnrichmentStage>) {
		self.stages.push(stage);
	}

	pub fn len(&self) -> usize {
		self.stages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.stages.is_empty()
	}

	pub fn stage_names(&self) -> Vec<&'static str> {
		self.stages.iter().map(|stage| stage.name()).collect()
	}

	/// Runs every stage in order.
	pub fn apply_all(&self, event: Event) -> Event {
		self
			.stages
			.iter()
			.fold(event, |event, stage| stage.apply(event))
	}
}

impl std::fmt::Debug for EnrichmentPipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EnrichmentPipeline")
			.field("stages", &self.stage_names())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::meta::{PageMetaTags, PrezlyMeta, SharedMeta};
	use proptest::prelude::*;
	use serde_json::{json, Map};

	fn props(value: Value) -> Map<String, Value> {
		value.as_object().cloned().unwrap_or_default()
	}

	#[test]
	fn normalize_leaves_events_without_meta_untouched() {
		let event = Event::track("Test Event", Map::new());
		let normalized = NormalizePrezlyMeta.apply(event.clone());
		assert_eq!(normalized, event);
		assert!(normalized.prezly.is_none());

		let event = Event::identify("Test ID", Map::new());
		assert_eq!(NormalizePrezlyMeta.apply(event.clone()), event);
	}

	#[test]
	fn normalize_moves_meta_from_properties() {
		let event = Event::track("Test Event", props(json!({"prezly": {"newsroom": "abcd"}, "a": 1})));
		let normalized = NormalizePrezlyMeta.apply(event);

		assert_eq!(normalized.prezly, Some(json!({"newsroom": "abcd"})));
		let properties = normalized.properties.unwrap();
		assert!(!properties.contains_key("prezly"));
		assert_eq!(properties["a"], 1);
	}

	#[test]
	fn normalize_moves_meta_from_traits() {
		let event = Event::identify("Test ID", props(json!({"prezly": {"newsroom": "abcd"}})));
		let normalized = NormalizePrezlyMeta.apply(event);

		assert_eq!(normalized.prezly, Some(json!({"newsroom": "abcd"})));
		assert!(normalized.traits.unwrap().is_empty());
	}

	#[test]
	fn normalize_ignores_null_meta() {
		let event = Event::page(None, None, props(json!({"prezly": null})));
		let normalized = NormalizePrezlyMeta.apply(event.clone());
		assert_eq!(normalized, event);
	}

	#[test]
	fn normalize_skips_alias() {
		let event = Event::alias("new", "old");
		assert_eq!(NormalizePrezlyMeta.apply(event.clone()), event);
	}

	#[test]
	fn inject_without_tags_sets_empty_block() {
		let stage = InjectPrezlyMeta::new(Arc::new(PageMetaTags::new()));
		let event = stage.apply(Event::track("Test Event", Map::new()));
		assert_eq!(event.prezly, Some(json!({})));
	}

	#[test]
	fn inject_reads_page_tags() {
		let tags = PageMetaTags::new()
			.with("prezly:newsroom", "abcd")
			.with("prezly:story", "asdf");
		let stage = InjectPrezlyMeta::new(Arc::new(tags));
		let event = stage.apply(Event::track("Test Event", Map::new()));
		assert_eq!(event.prezly, Some(json!({"newsroom": "abcd", "story": "asdf"})));
	}

	#[test]
	fn inject_overwrites_rather_than_merges() {
		let shared = SharedMeta::new();
		let stage = InjectPrezlyMeta::new(Arc::new(shared.clone()));

		let mut event = Event::track("Test Event", Map::new());
		event.prezly = Some(json!({"newsroom": "stale", "gallery": "old-gallery"}));

		let newsroom = uuid::Uuid::new_v4();
		shared.set(Some(PrezlyMeta::new(newsroom)));
		let event = stage.apply(event);

		assert_eq!(event.prezly, Some(json!({"newsroom": newsroom.to_string()})));
	}

	#[test]
	fn inject_without_known_meta_is_noop() {
		let stage = InjectPrezlyMeta::new(Arc::new(SharedMeta::new()));
		let event = Event::track("Test Event", props(json!({"prezly": {"newsroom": "abcd"}})));
		assert_eq!(stage.apply(event.clone()), event);
	}

	#[test]
	fn standard_pipeline_prefers_current_meta() {
		let shared = SharedMeta::new();
		let newsroom = uuid::Uuid::new_v4();
		shared.set(Some(PrezlyMeta::new(newsroom)));
		let pipeline = EnrichmentPipeline::standard(Arc::new(shared));

		let event = pipeline.apply_all(Event::track(
			"Search",
			props(json!({"prezly": {"newsroom": "caller"}, "query": "x"})),
		));

		assert_eq!(event.prezly, Some(json!({"newsroom": newsroom.to_string()})));
		assert!(!event.properties.as_ref().unwrap().contains_key("prezly"));
		assert_eq!(pipeline.stage_names(), vec!["Normalize Prezly Meta", "Inject Prezly Meta"]);
	}

	#[test]
	fn empty_pipeline_is_identity() {
		let event = Event::track("A", props(json!({"prezly": {"x": 1}})));
		assert_eq!(EnrichmentPipeline::new().apply_all(event.clone()), event);
	}

	fn any_payload() -> impl Strategy<Value = Map<String, Value>> {
		(
			proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..5),
			proptest::option::of("[a-z0-9]{1,8}"),
		)
			.prop_map(|(entries, newsroom)| {
				let mut map: Map<String, Value> = entries
					.into_iter()
					.filter(|(k, _)| k != PREZLY_KEY)
					.map(|(k, v)| (k, Value::String(v)))
					.collect();
				if let Some(newsroom) = newsroom {
					map.insert(PREZLY_KEY.to_string(), json!({"newsroom": newsroom}));
				}
				map
			})
	}

	proptest! {
		#[test]
		fn normalize_is_idempotent(payload in any_payload(), identify in any::<bool>()) {
			let event = if identify {
				Event::identify("user", payload)
			} else {
				Event::track("event", payload)
			};
			let once = NormalizePrezlyMeta.apply(event);
			let twice = NormalizePrezlyMeta.apply(once.clone());
			prop_assert_eq!(twice, once);
		}

		#[test]
		fn normalize_never_loses_meta(payload in any_payload()) {
			let expected = payload.get(PREZLY_KEY).cloned();
			let event = NormalizePrezlyMeta.apply(Event::track("event", payload));
			prop_assert_eq!(event.prezly, expected);
			prop_assert!(!event.properties.unwrap().contains_key(PREZLY_KEY));
		}
	}
}
