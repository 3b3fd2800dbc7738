// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Outgoing analytics events.
//!
//! The shape follows the Segment message format (`type`, `userId`, `anonymousId`,
//! `properties`, `traits`, `integrations`, `context`) plus a root-level
//! `prezly` metadata block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::permissions::Integrations;

/// Kind of analytics call that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
	Identify,
	Alias,
	Page,
	Track,
	Group,
	Screen,
}

impl EventType {
	pub fn as_str(&self) -> &'static str {
		match self {
			EventType::Identify => "identify",
			EventType::Alias => "alias",
			EventType::Page => "page",
			EventType::Track => "track",
			EventType::Group => "group",
			EventType::Screen => "screen",
		}
	}
}

impl std::fmt::Display for EventType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// A single outgoing analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	#[serde(rename = "type")]
	pub event_type: EventType,
	pub message_id: String,
	pub timestamp: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub anonymous_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub previous_id: Option<String>,
	/// Event name, set for `track` events.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub event: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<Map<String, Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub traits: Option<Map<String, Value>>,
	/// Root-level Prezly metadata (newsroom, story, gallery, policy).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prezly: Option<Value>,
	#[serde(default, skip_serializing_if = "Integrations::is_empty")]
	pub integrations: Integrations,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub context: Map<String, Value>,
}

impl Event {
	fn new(event_type: EventType) -> Self {
		Self {
			event_type,
			message_id: format!("ajs-next-{}", Uuid::new_v4().simple()),
			timestamp: Utc::now(),
			user_id: None,
			anonymous_id: None,
			previous_id: None,
			event: None,
			category: None,
			name: None,
			properties: None,
			traits: None,
			prezly: None,
			integrations: Integrations::new(),
			context: Map::new(),
		}
	}

	pub fn track(event: impl Into<String>, properties: Map<String, Value>) -> Self {
		Self {
			event: Some(event.into()),
			properties: Some(properties),
			..Self::new(EventType::Track)
		}
	}

	pub fn page(
		category: Option<String>,
		name: Option<String>,
		properties: Map<String, Value>,
	) -> Self {
		Self {
			category,
			name,
			properties: Some(properties),
			..Self::new(EventType::Page)
		}
	}

	pub fn identify(user_id: impl Into<String>, traits: Map<String, Value>) -> Self {
		Self {
			user_id: Some(user_id.into()),
			traits: Some(traits),
			..Self::new(EventType::Identify)
		}
	}

	pub fn alias(user_id: impl Into<String>, previous_id: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id.into()),
			previous_id: Some(previous_id.into()),
			..Self::new(EventType::Alias)
		}
	}

	/// Sets the integration flags (builder pattern).
	pub fn with_integrations(mut self, integrations: Integrations) -> Self {
		self.integrations = integrations;
		self
	}

	/// Sets a context entry (builder pattern).
	pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
		self.context.insert(key.into(), value);
		self
	}

	/// Returns the event's payload map: traits for identify, properties
	/// otherwise.
	pub fn payload(&self) -> Option<&Map<String, Value>> {
		match self.event_type {
			EventType::Identify => self.traits.as_ref(),
			_ => self.properties.as_ref(),
		}
	}

	pub fn payload_mut(&mut self) -> Option<&mut Map<String, Value>> {
		match self.event_type {
			EventType::Identify => self.traits.as_mut(),
			_ => self.properties.as_mut(),
		}
	}
}
