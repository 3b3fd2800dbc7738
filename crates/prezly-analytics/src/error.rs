// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the analytics SDK.

use thiserror::Error;

/// Analytics SDK errors.
#[derive(Debug, Error)]
pub enum AnalyticsError {
	/// The underlying SDK could not be loaded.
	#[error("failed to load analytics SDK: {0}")]
	SdkLoad(String),

	/// A required configuration value is missing.
	#[error("missing configuration: {0}")]
	MissingConfig(&'static str),

	/// A configuration value could not be parsed.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Reading or writing persisted state failed.
	#[error("storage error: {0}")]
	Storage(#[from] std::io::Error),

	/// Serialization error.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// The client is not initialized.
	#[error("analytics uninitialized")]
	Uninitialized,
}

impl AnalyticsError {
	pub fn invalid_config(message: impl Into<String>) -> Self {
		AnalyticsError::InvalidConfig(message.into())
	}

	/// Returns true for errors raised while talking to a destination.
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			AnalyticsError::RequestFailed(_) | AnalyticsError::ServerError { .. }
		)
	}
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
