// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prezly_analytics::{
	AnalyticsConfig, Destination, Event, EventRouter, Result, RouterSetup, SdkLoader,
	TrackingPolicy,
};
use uuid::Uuid;

pub const NEWSROOM: &str = "9a1c6a2e-0c44-4b59-9b8d-3f3f0f7f6d11";

/// Records every event it is given, optionally obeying an integration flag.
#[derive(Default)]
pub struct RecordingDestination {
	integration: Option<&'static str>,
	events: Mutex<Vec<Event>>,
}

impl RecordingDestination {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn for_integration(integration: &'static str) -> Arc<Self> {
		Arc::new(Self {
			integration: Some(integration),
			events: Mutex::new(Vec::new()),
		})
	}

	pub fn events(&self) -> Vec<Event> {
		self.events.lock().unwrap().clone()
	}

	/// Event names (track) or types (other calls), in arrival order.
	pub fn labels(&self) -> Vec<String> {
		self
			.events()
			.iter()
			.map(|event| {
				event
					.event
					.clone()
					.unwrap_or_else(|| event.event_type.to_string())
			})
			.collect()
	}
}

#[async_trait]
impl Destination for RecordingDestination {
	fn name(&self) -> &'static str {
		"recording"
	}

	fn integration(&self) -> Option<&'static str> {
		self.integration
	}

	async fn send(&self, event: &Event) -> Result<()> {
		self.events.lock().unwrap().push(event.clone());
		Ok(())
	}
}

/// Loader that builds the router from the setup alone, without any
/// network destinations.
pub struct LocalLoader;

#[async_trait]
impl SdkLoader for LocalLoader {
	async fn load(&self, setup: RouterSetup) -> Result<EventRouter> {
		Ok(setup.into_router())
	}
}

pub fn config(policy: TrackingPolicy) -> AnalyticsConfig {
	AnalyticsConfig {
		tracking_policy: policy,
		newsroom: Some(Uuid::parse_str(NEWSROOM).unwrap()),
		..Default::default()
	}
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter("prezly_analytics=debug")
		.with_test_writer()
		.try_init();
}

/// Log output collected by a thread-local subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
	}
}

impl io::Write for CapturedLogs {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Routes `info` and above on the current thread into the returned buffer
/// until the guard is dropped.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
	let logs = CapturedLogs::default();
	let writer = logs.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_ansi(false)
		.with_max_level(tracing::Level::INFO)
		.with_writer(move || writer.clone())
		.finish();
	(logs, tracing::subscriber::set_default(subscriber))
}
