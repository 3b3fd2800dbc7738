// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The consent-gated analytics client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::{BoxFuture, FutureExt};
use prezly_analytics_core::{
	url_parameters, Consent, EnrichmentPipeline, EnrichmentStage, Event, GoogleOptOut,
	ParameterPrefix, PermissionGate, PrezlyMeta, SharedMeta, TrackingPermissions,
};
use reqwest::Client;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::config::AnalyticsConfig;
use crate::destination::{Destination, LogToConsole};
use crate::error::{AnalyticsError, Result};
use crate::identity::{ConsentStore, DeferredIdentity, DeferredIdentityStore};
use crate::loader::{DefaultLoader, SdkLoader};
use crate::queue::EventQueue;
use crate::recipient::{is_recipient_id_format, RecipientClient, RecipientInfo};
use crate::router::{EventRouter, RouterSetup, User};
use crate::storage::{KeyValueStorage, MemoryStorage};

/// IP address reported in place of the visitor's unless analytics consent
/// is given.
pub const MASKED_IP: &str = "0.0.0.0";

/// Invoked once a call has been handled.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// A tracking call waiting for the SDK, with its arguments already resolved.
type QueuedCall = Box<dyn FnOnce(Arc<EventRouter>) -> BoxFuture<'static, ()> + Send>;

/// Builder for constructing an [`Analytics`] client.
pub struct AnalyticsBuilder {
	config: Option<AnalyticsConfig>,
	storage: Option<Arc<dyn KeyValueStorage>>,
	loader: Option<Arc<dyn SdkLoader>>,
	meta: SharedMeta,
	destinations: Vec<Arc<dyn Destination>>,
	stages: Vec<Arc<dyn EnrichmentStage>>,
}

impl Default for AnalyticsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl AnalyticsBuilder {
	pub fn new() -> Self {
		Self {
			config: None,
			storage: None,
			loader: None,
			meta: SharedMeta::new(),
			destinations: Vec::new(),
			stages: Vec::new(),
		}
	}

	pub fn config(mut self, config: AnalyticsConfig) -> Self {
		self.config = Some(config);
		self
	}

	/// Sets where the deferred identity and consent are persisted.
	///
	/// Defaults to in-memory storage.
	pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Replaces the default SDK loader.
	pub fn loader(mut self, loader: Arc<dyn SdkLoader>) -> Self {
		self.loader = Some(loader);
		self
	}

	/// Shares page metadata with the host application.
	pub fn meta(mut self, meta: SharedMeta) -> Self {
		self.meta = meta;
		self
	}

	/// Adds a destination after the built-in ones.
	pub fn destination(mut self, destination: Arc<dyn Destination>) -> Self {
		self.destinations.push(destination);
		self
	}

	/// Adds an enrichment stage after the built-in ones.
	pub fn enrichment_stage(mut self, stage: Arc<dyn EnrichmentStage>) -> Self {
		self.stages.push(stage);
		self
	}

	/// Builds the client, restores persisted consent and loads the SDK if
	/// the consent allows it.
	pub async fn build(self) -> Result<Analytics> {
		let config = self.config.ok_or(AnalyticsError::MissingConfig("analytics config"))?;
		let storage = self
			.storage
			.unwrap_or_else(|| Arc::new(MemoryStorage::new()) as Arc<dyn KeyValueStorage>);

		let enabled = config.is_enabled();
		if !enabled {
			warn!("No Segment write key or newsroom configured, analytics is disabled");
		}

		let consents = ConsentStore::new(storage.clone());
		let consent = if config.ignore_consent {
			Consent::all()
		} else {
			consents
				.get()
				.await?
				.unwrap_or_else(|| config.initial_consent())
		};

		let mut pipeline = EnrichmentPipeline::standard(Arc::new(self.meta.clone()));
		for stage in self.stages {
			pipeline.push(stage);
		}

		let http = Client::builder().timeout(config.request_timeout()).build()?;
		let recipients = RecipientClient::new(http, config.collector_api_base());
		let loader = self
			.loader
			.unwrap_or_else(|| Arc::new(DefaultLoader::new(config.clone())) as Arc<dyn SdkLoader>);

		info!(
			tracking_policy = %config.tracking_policy,
			enabled,
			environment = %config.environment,
			"Analytics client initialized"
		);

		let inner = Arc::new(AnalyticsInner {
			gate: config.permission_gate(),
			config,
			enabled,
			consent: RwLock::new(consent),
			meta: self.meta,
			setup: RouterSetup::new(pipeline, self.destinations),
			loader,
			router: RwLock::new(None),
			load_started: AtomicBool::new(false),
			queue: EventQueue::new(),
			drain_lock: Mutex::new(()),
			identities: DeferredIdentityStore::new(storage),
			consents,
			recipients,
		});

		let analytics = Analytics { inner };
		if enabled {
			analytics.ensure_loaded().await;
			analytics.reconcile_identity().await?;
			analytics.process_queue().await;
		}

		Ok(analytics)
	}
}

struct AnalyticsInner {
	config: AnalyticsConfig,
	gate: PermissionGate,
	enabled: bool,
	consent: RwLock<Consent>,
	meta: SharedMeta,
	setup: RouterSetup,
	loader: Arc<dyn SdkLoader>,
	router: RwLock<Option<Arc<EventRouter>>>,
	load_started: AtomicBool,
	queue: EventQueue<QueuedCall>,
	/// Serializes draining so queued calls reach the router in order.
	drain_lock: Mutex<()>,
	identities: DeferredIdentityStore,
	consents: ConsentStore,
	recipients: RecipientClient,
}

/// Consent-gated analytics client.
///
/// Calls made before the SDK is loaded are queued and replayed in order once
/// it is. Permission flags are resolved when a call is made, so a later
/// consent change never widens what an earlier call may reach.
///
/// Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct Analytics {
	inner: Arc<AnalyticsInner>,
}

impl Analytics {
	pub fn builder() -> AnalyticsBuilder {
		AnalyticsBuilder::new()
	}

	pub fn config(&self) -> &AnalyticsConfig {
		&self.inner.config
	}

	pub fn consent(&self) -> Consent {
		self
			.inner
			.consent
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	pub fn permissions(&self) -> TrackingPermissions {
		self.inner.gate.permissions(&self.consent())
	}

	/// The Google Analytics opt-out signal, when a property is configured.
	pub fn google_opt_out(&self) -> Option<GoogleOptOut> {
		let analytics_id = self.inner.config.google_analytics_id.as_deref()?;
		Some(GoogleOptOut::for_permissions(
			analytics_id,
			&self.permissions(),
		))
	}

	/// Whether the SDK has been loaded.
	pub fn is_loaded(&self) -> bool {
		self.router().is_some()
	}

	/// Number of calls waiting for the SDK.
	pub fn queued(&self) -> usize {
		self.inner.queue.len()
	}

	pub fn set_meta(&self, meta: Option<PrezlyMeta>) {
		self.inner.meta.set(meta);
	}

	pub fn meta(&self) -> Option<PrezlyMeta> {
		self.inner.meta.get()
	}

	/// The current visitor, or a null user before the SDK is loaded.
	pub fn user(&self) -> User {
		self
			.router()
			.map(|router| router.user())
			.unwrap_or_else(User::null)
	}

	/// Records the visitor's consent and applies it.
	///
	/// Loads the SDK if the new consent allows it, replays a deferred
	/// identity once identification is allowed, and otherwise moves the
	/// current user id back into the deferred slot.
	pub async fn set_consent(&self, consent: Consent) -> Result<()> {
		// The visitor's own choice is what persists; `ignore_consent` only
		// overrides the running session.
		self.inner.consents.set(&consent).await?;
		let effective = if self.inner.config.ignore_consent {
			Consent::all()
		} else {
			consent
		};

		debug!(categories = ?effective.categories, "Consent updated");
		*self.inner.consent.write().unwrap_or_else(|e| e.into_inner()) = effective;

		if let Some(opt_out) = self.google_opt_out() {
			debug!(key = %opt_out.key, disabled = opt_out.disabled, "Google Analytics opt-out updated");
		}

		if !self.inner.enabled {
			return Ok(());
		}

		self.ensure_loaded().await;
		self.reconcile_identity().await?;
		self.process_queue().await;
		Ok(())
	}

	/// Identifies the visitor.
	///
	/// While identification is not allowed the call is stored as the
	/// deferred identity instead, replacing any earlier one, and `callback`
	/// runs immediately.
	pub async fn identify(
		&self,
		user_id: impl Into<String>,
		traits: Map<String, Value>,
		callback: Option<Callback>,
	) -> Result<()> {
		if !self.inner.enabled {
			return Ok(());
		}

		let user_id = user_id.into();
		if !self.permissions().can_identify {
			if !self.inner.config.is_production() {
				LogToConsole::log(&Event::identify(user_id.clone(), traits.clone()));
			}
			let mut identity = DeferredIdentity::new(user_id);
			if !traits.is_empty() {
				identity = identity.with_traits(traits);
			}
			self.inner.identities.set(&identity).await?;
			if let Some(callback) = callback {
				callback();
			}
			return Ok(());
		}

		self.enqueue(Event::identify(user_id, traits), callback);
		self.process_queue().await;
		Ok(())
	}

	pub async fn alias(
		&self,
		user_id: impl Into<String>,
		previous_id: impl Into<String>,
	) -> Result<()> {
		if !self.inner.enabled {
			return Ok(());
		}

		self.enqueue(Event::alias(user_id, previous_id), None);
		self.process_queue().await;
		Ok(())
	}

	pub async fn page(
		&self,
		category: Option<&str>,
		name: Option<&str>,
		properties: Map<String, Value>,
		callback: Option<Callback>,
	) -> Result<()> {
		if !self.inner.enabled {
			return Ok(());
		}

		let event = Event::page(
			category.map(str::to_string),
			name.map(str::to_string),
			properties,
		);
		self.enqueue(event, callback);
		self.process_queue().await;
		Ok(())
	}

	pub async fn track(
		&self,
		event: impl Into<String>,
		properties: Map<String, Value>,
		callback: Option<Callback>,
	) -> Result<()> {
		if !self.inner.enabled {
			return Ok(());
		}

		self.enqueue(Event::track(event, properties), callback);
		self.process_queue().await;
		Ok(())
	}

	/// Identifies a visitor arriving from a campaign email.
	///
	/// Reads the recipient from the page's `utm_id` parameter and identifies
	/// the visitor as the matching contact. Returns `None` when the page has
	/// no recipient id, or `utm_id` is not in recipient id format.
	pub async fn identify_campaign_recipient(&self, page_url: &Url) -> Result<Option<RecipientInfo>> {
		let utm = url_parameters(page_url, ParameterPrefix::Utm);
		let Some(recipient_id) = utm.get("id").filter(|id| is_recipient_id_format(id)) else {
			return Ok(None);
		};

		let info = self.inner.recipients.fetch(recipient_id).await?;
		self.identify(info.id.clone(), Map::new(), None).await?;
		Ok(Some(info))
	}

	/// Loads the SDK if needed and drains every queued call.
	///
	/// Returns [`AnalyticsError::Uninitialized`] if the SDK is not loaded,
	/// leaving queued calls in place.
	pub async fn flush(&self) -> Result<()> {
		self.ensure_loaded().await;
		if !self.is_loaded() {
			return Err(AnalyticsError::Uninitialized);
		}
		self.process_queue().await;
		Ok(())
	}

	fn router(&self) -> Option<Arc<EventRouter>> {
		self
			.inner
			.router
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Queues `event` with integration flags and context resolved now.
	fn enqueue(&self, event: Event, callback: Option<Callback>) {
		let consent = self.consent();
		let permissions = self.inner.gate.permissions(&consent);

		let mut event = event.with_integrations(permissions.integrations());
		if !consent.grants_tracking() {
			event = event.with_context("ip", Value::String(MASKED_IP.to_string()));
		}
		if !self.inner.config.is_production() {
			LogToConsole::log(&event);
		}

		trace!(event_type = %event.event_type, message_id = %event.message_id, "Queueing call");
		let call: QueuedCall = Box::new(move |router: Arc<EventRouter>| {
			async move {
				router.dispatch(event).await;
				if let Some(callback) = callback {
					callback();
				}
			}
			.boxed()
		});
		self.inner.queue.enqueue(call);
	}

	/// Drains the queue into the router, one call at a time. Returns
	/// immediately if the SDK is not loaded.
	async fn process_queue(&self) {
		let Some(router) = self.router() else {
			return;
		};

		let _guard = self.inner.drain_lock.lock().await;
		while let Some(call) = self.inner.queue.drain() {
			call(router.clone()).await;
		}
	}

	async fn ensure_loaded(&self) {
		if !self.inner.enabled || !self.permissions().can_load_segment {
			return;
		}
		if self.inner.load_started.swap(true, Ordering::SeqCst) {
			return;
		}

		match self.inner.loader.load(self.inner.setup.clone()).await {
			Ok(router) => {
				*self.inner.router.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(router));
			}
			Err(e) => {
				error!(error = %e, "Failed to load analytics SDK, analytics disabled");
			}
		}
	}

	/// Moves identity between the SDK and the deferred slot to match the
	/// current consent.
	async fn reconcile_identity(&self) -> Result<()> {
		if self.permissions().can_identify {
			if let Some(identity) = self.inner.identities.get().await? {
				debug!(user_id = %identity.user_id, "Replaying deferred identity");
				let traits = identity.traits.unwrap_or_default();
				self.enqueue(Event::identify(identity.user_id, traits), None);
				self.inner.identities.remove().await?;
			}
			return Ok(());
		}

		let user = self.user();
		if let Some(id) = user.id() {
			let stored = self.inner.identities.get().await?;
			if stored.as_ref().map(|s| s.user_id.as_str()) != Some(id.as_str()) {
				self.inner.identities.set(&DeferredIdentity::new(id)).await?;
			}
		}
		user.reset();
		Ok(())
	}
}
