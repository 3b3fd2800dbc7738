// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The loaded SDK: stamps identity, enriches and fans events out to
//! destinations.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use prezly_analytics_core::{EnrichmentPipeline, Event, EventType};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::destination::Destination;

#[derive(Debug, Default)]
struct UserState {
	id: Option<String>,
	anonymous_id: Option<String>,
}

/// Handle to the current visitor's identity.
///
/// Before the SDK is loaded [`Analytics::user`](crate::Analytics::user)
/// returns a null user whose ids are always `None` and whose setters do
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct User {
	state: Option<Arc<RwLock<UserState>>>,
}

impl User {
	pub(crate) fn anonymous() -> Self {
		let state = UserState {
			id: None,
			anonymous_id: Some(Uuid::new_v4().to_string()),
		};
		Self {
			state: Some(Arc::new(RwLock::new(state))),
		}
	}

	/// A user that is not backed by a loaded SDK.
	pub fn null() -> Self {
		Self::default()
	}

	pub fn is_null(&self) -> bool {
		self.state.is_none()
	}

	pub fn id(&self) -> Option<String> {
		let state = self.state.as_ref()?;
		state.read().unwrap_or_else(|e| e.into_inner()).id.clone()
	}

	pub fn anonymous_id(&self) -> Option<String> {
		let state = self.state.as_ref()?;
		state
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.anonymous_id
			.clone()
	}

	pub fn set_id(&self, id: Option<String>) {
		if let Some(state) = &self.state {
			state.write().unwrap_or_else(|e| e.into_inner()).id = id;
		}
	}

	/// Forgets the user id, returning the visitor to anonymous.
	pub fn reset(&self) {
		self.set_id(None);
	}
}

/// Inputs for building an [`EventRouter`].
#[derive(Clone, Default)]
pub struct RouterSetup {
	pub pipeline: EnrichmentPipeline,
	pub destinations: Vec<Arc<dyn Destination>>,
}

impl RouterSetup {
	pub fn new(pipeline: EnrichmentPipeline, destinations: Vec<Arc<dyn Destination>>) -> Self {
		Self {
			pipeline,
			destinations,
		}
	}

	pub fn into_router(self) -> EventRouter {
		EventRouter {
			pipeline: self.pipeline,
			destinations: self.destinations,
			user: User::anonymous(),
		}
	}
}

/// Routes events to every destination whose integration flag allows them.
pub struct EventRouter {
	pipeline: EnrichmentPipeline,
	destinations: Vec<Arc<dyn Destination>>,
	user: User,
}

impl EventRouter {
	pub fn new(pipeline: EnrichmentPipeline) -> Self {
		RouterSetup::new(pipeline, Vec::new()).into_router()
	}

	/// Adds a destination (builder pattern).
	pub fn with_destination(mut self, destination: Arc<dyn Destination>) -> Self {
		self.destinations.push(destination);
		self
	}

	pub fn destination_names(&self) -> Vec<&'static str> {
		self.destinations.iter().map(|d| d.name()).collect()
	}

	pub fn user(&self) -> User {
		self.user.clone()
	}

	/// Enriches `event` and sends it to each allowed destination.
	///
	/// Sends run concurrently. A failing destination is logged and skipped;
	/// nothing is retried. Returns the event as it was sent.
	pub async fn dispatch(&self, event: Event) -> Event {
		let event = self.pipeline.apply_all(self.stamp_identity(event));

		let sends = self
			.destinations
			.iter()
			.filter(|destination| {
				let accepted = destination.accepts(&event);
				if !accepted {
					trace!(
						destination = destination.name(),
						message_id = %event.message_id,
						"Destination disabled for event"
					);
				}
				accepted
			})
			.map(|destination| {
				let event = &event;
				async move { (destination.name(), destination.send(event).await) }
			});

		for (name, result) in join_all(sends).await {
			if let Err(e) = result {
				warn!(
					destination = name,
					event_type = %event.event_type,
					error = %e,
					"Failed to send analytics event"
				);
			}
		}

		debug!(event_type = %event.event_type, message_id = %event.message_id, "Dispatched event");
		event
	}

	fn stamp_identity(&self, mut event: Event) -> Event {
		if event.event_type == EventType::Identify {
			self.user.set_id(event.user_id.clone());
		}
		if event.user_id.is_none() {
			event.user_id = self.user.id();
		}
		if event.anonymous_id.is_none() {
			event.anonymous_id = self.user.anonymous_id();
		}
		event
	}
}
