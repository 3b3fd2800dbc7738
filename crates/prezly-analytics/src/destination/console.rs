// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Development-time logging of every analytics call.

use prezly_analytics_core::{Event, EventType};
use serde_json::Value;
use tracing::info;

/// Joins values as compact JSON separated by `", "`.
pub fn stringify(values: &[Value]) -> String {
	values
		.iter()
		.map(Value::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}

fn opt(value: &Option<String>) -> Value {
	value.clone().map(Value::String).unwrap_or(Value::Null)
}

fn map(value: &Option<serde_json::Map<String, Value>>) -> Value {
	value.clone().map(Value::Object).unwrap_or(Value::Null)
}

/// Logs `analytics.<type>(...)` lines for each call at `info` level.
///
/// Runs when a call is made, before consent decides where the event may go,
/// and only outside production.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogToConsole;

impl LogToConsole {
	/// Renders the call that produced `event`, or `None` for types that are
	/// not logged.
	pub fn format(event: &Event) -> Option<String> {
		let args = match event.event_type {
			EventType::Identify => vec![opt(&event.user_id), map(&event.traits)],
			EventType::Alias => vec![opt(&event.user_id), opt(&event.previous_id)],
			EventType::Page => vec![
				opt(&event.category),
				opt(&event.name),
				map(&event.properties),
			],
			EventType::Track => vec![opt(&event.event), map(&event.properties)],
			EventType::Group | EventType::Screen => return None,
		};
		Some(format!("analytics.{}({})", event.event_type, stringify(&args)))
	}

	pub fn log(event: &Event) {
		if let Some(line) = Self::format(event) {
			info!(target: "prezly_analytics::console", "{line}");
		}
	}
}
