// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Development logging of calls as they are made.

mod common;

use std::sync::Arc;

use common::{capture_logs, config, LocalLoader};
use prezly_analytics::{Analytics, AnalyticsConfig, TrackingPolicy};
use serde_json::json;

async fn strict_client(environment: &str) -> Analytics {
	Analytics::builder()
		.config(AnalyticsConfig {
			environment: environment.to_string(),
			..config(TrackingPolicy::Strict)
		})
		.loader(Arc::new(LocalLoader))
		.build()
		.await
		.unwrap()
}

#[tokio::test]
async fn calls_are_logged_before_consent_in_development() {
	let (logs, _guard) = capture_logs();
	let analytics = strict_client("development").await;

	let properties = json!({"query": "launch"}).as_object().cloned().unwrap();
	analytics.track("Search", properties, None).await.unwrap();
	analytics
		.page(None, Some("Home"), serde_json::Map::new(), None)
		.await
		.unwrap();
	analytics
		.identify("u1", serde_json::Map::new(), None)
		.await
		.unwrap();

	assert!(!analytics.is_loaded());
	let output = logs.contents();
	assert!(output.contains(r#"analytics.track("Search", {"query":"launch"})"#));
	assert!(output.contains(r#"analytics.page(null, "Home", {})"#));
	assert!(output.contains(r#"analytics.identify("u1", {})"#));
}

#[tokio::test]
async fn calls_are_not_logged_in_production() {
	let (logs, _guard) = capture_logs();
	let analytics = strict_client("production").await;

	analytics
		.track("Search", serde_json::Map::new(), None)
		.await
		.unwrap();

	assert!(!logs.contents().contains("analytics.track"));
}
