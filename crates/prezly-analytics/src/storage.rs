// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key-value storage for client-side state.
//!
//! The SDK persists two small values: the deferred identity and the visitor's
//! consent. Backends only need string get/set/remove.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tracing::trace;
use uuid::Uuid;

use crate::error::Result;

/// String key-value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>>;
	async fn set(&self, key: &str, value: &str) -> Result<()>;
	async fn remove(&self, key: &str) -> Result<()>;
}

/// In-process storage. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
		Ok(values.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
		values.insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
		values.remove(key);
		Ok(())
	}
}

/// Stores each key in its own file under a directory.
///
/// Writes go to a temp file that is renamed into place, so a crash never
/// leaves a half-written value behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
	root: PathBuf,
}

impl FileStorage {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn path_for(&self, key: &str) -> PathBuf {
		let name: String = key
			.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
					c
				} else {
					'_'
				}
			})
			.collect();
		self.root.join(format!("{name}.json"))
	}
}

/// Write bytes atomically using temp file + rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).await?;
	}

	// Same directory keeps the rename on one filesystem. The unique suffix
	// lets concurrent writers of one key each rename their own file.
	let tmp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
	fs::write(&tmp_path, bytes).await?;
	fs::rename(&tmp_path, path).await
}

#[async_trait]
impl KeyValueStorage for FileStorage {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		match fs::read_to_string(self.path_for(key)).await {
			Ok(value) => Ok(Some(value)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		let path = self.path_for(key);
		trace!(path = %path.display(), "writing stored value");
		write_atomic(&path, value.as_bytes()).await?;
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<()> {
		match fs::remove_file(self.path_for(key)).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}
