// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Prezly page metadata attached to every outgoing event.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::policy::TrackingPolicy;

/// Prefix of page `<meta>` tag names carrying Prezly metadata.
pub const META_PREFIX: &str = "prezly:";

/// Identifiers of the newsroom (and story or gallery) the current page
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrezlyMeta {
	pub newsroom: Uuid,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub story: Option<Uuid>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gallery: Option<Uuid>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tracking_policy: Option<TrackingPolicy>,
}

impl PrezlyMeta {
	pub fn new(newsroom: Uuid) -> Self {
		Self {
			newsroom,
			story: None,
			gallery: None,
			tracking_policy: None,
		}
	}

	pub fn with_story(mut self, story: Uuid) -> Self {
		self.story = Some(story);
		self
	}

	pub fn with_gallery(mut self, gallery: Uuid) -> Self {
		self.gallery = Some(gallery);
		self
	}

	pub fn with_tracking_policy(mut self, policy: TrackingPolicy) -> Self {
		self.tracking_policy = Some(policy);
		self
	}

	pub fn to_map(&self) -> Map<String, Value> {
		match serde_json::to_value(self) {
			Ok(Value::Object(map)) => map,
			_ => Map::new(),
		}
	}
}

/// Collects `prezly:*` page meta tags into a metadata map.
///
/// The prefix is stripped and `-` / `:` in the remaining name become `_`, so
/// `prezly:tracking-policy` is stored as `tracking_policy`. Tags without the
/// prefix are ignored; a later tag with the same name wins.
pub fn meta_from_tags<'a, I>(tags: I) -> Map<String, Value>
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	tags
		.into_iter()
		.filter_map(|(name, content)| {
			let key = name.strip_prefix(META_PREFIX)?.replace(&['-', ':'][..], "_");
			Some((key, Value::String(content.to_string())))
		})
		.collect()
}

/// Source of the metadata block injected into events.
///
/// `None` means no metadata is known and events are left untouched.
pub trait MetaProvider: Send + Sync {
	fn current(&self) -> Option<Map<String, Value>>;
}

impl MetaProvider for PrezlyMeta {
	fn current(&self) -> Option<Map<String, Value>> {
		Some(self.to_map())
	}
}

/// A snapshot of the page's `<meta>` tags.
#[derive(Debug, Clone, Default)]
pub struct PageMetaTags {
	tags: Vec<(String, String)>,
}

impl PageMetaTags {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a `name` / `content` pair (builder pattern).
	pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
		self.tags.push((name.into(), content.into()));
		self
	}
}

impl MetaProvider for PageMetaTags {
	fn current(&self) -> Option<Map<String, Value>> {
		Some(meta_from_tags(
			self.tags.iter().map(|(n, c)| (n.as_str(), c.as_str())),
		))
	}
}

/// Metadata that the host application updates as the visitor navigates.
#[derive(Debug, Clone, Default)]
pub struct SharedMeta {
	inner: Arc<RwLock<Option<PrezlyMeta>>>,
}

impl SharedMeta {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&self, meta: Option<PrezlyMeta>) {
		let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
		*guard = meta;
	}

	pub fn get(&self) -> Option<PrezlyMeta> {
		self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
	}
}

impl MetaProvider for SharedMeta {
	fn current(&self) -> Option<Map<String, Value>> {
		self.get().map(|meta| meta.to_map())
	}
}
