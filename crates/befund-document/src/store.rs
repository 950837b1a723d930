// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document store — transient, releasable handles to assembled PDFs.
//
// Each successful assembly publishes its bytes here and hands back a handle.
// The bytes live until the handle is released; releasing twice is harmless.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use befund_core::error::{BefundError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

/// Reference to one assembled document held by a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub id: Uuid,
    /// Suggested file name for saving or downloading.
    pub file_name: String,
    pub size: usize,
    /// SHA-256 of the document bytes, lowercase hex.
    pub digest: String,
    pub created_at: DateTime<Utc>,
}

/// Shared in-memory map of published documents.
///
/// Cloning is cheap; all clones see the same documents.
#[derive(Clone, Default)]
pub struct DocumentStore {
    documents: Arc<Mutex<HashMap<Uuid, Arc<[u8]>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` and return a handle to them.
    pub fn insert(&self, bytes: Vec<u8>, file_name: impl Into<String>) -> DocumentHandle {
        let handle = DocumentHandle {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            size: bytes.len(),
            digest: hash_bytes(&bytes),
            created_at: Utc::now(),
        };

        self.lock().insert(handle.id, Arc::from(bytes));
        info!(id = %handle.id, bytes = handle.size, "Document published");
        handle
    }

    /// Bytes behind `handle`, while it has not been released.
    pub fn get(&self, handle: &DocumentHandle) -> Result<Arc<[u8]>> {
        self.lock()
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| BefundError::UnknownHandle(handle.id.to_string()))
    }

    /// Drop the bytes behind `handle`. Returns whether anything was released.
    pub fn release(&self, handle: &DocumentHandle) -> bool {
        let released = self.lock().remove(&handle.id).is_some();
        debug!(id = %handle.id, released, "Document handle released");
        released
    }

    /// Write the document behind `handle` to `path`.
    pub fn write_to(&self, handle: &DocumentHandle, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.get(handle)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(path = %path.as_ref().display(), "Wrote PDF");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<[u8]>>> {
        self.documents.lock().expect("document store lock poisoned")
    }
}

/// SHA-256 of `data` as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
