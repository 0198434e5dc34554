//! Token-addressed store of translated artifacts awaiting download.
//!
//! Each request's artifact is stored under its own request id, so two
//! concurrent uploads can never overwrite each other's result. Payloads are
//! immutable once inserted. The store is bounded: inserting past capacity
//! evicts the oldest entry.

use crate::output::ArtifactPayload;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Default number of artifacts kept for download.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Default)]
struct Inner {
    entries: HashMap<Uuid, Arc<ArtifactPayload>>,
    order: VecDeque<Uuid>,
}

/// Shared, bounded artifact store. Cloning shares the same storage.
#[derive(Clone)]
pub struct ArtifactStore {
    inner: Arc<RwLock<Inner>>,
    capacity: usize,
}

impl ArtifactStore {
    /// A store holding at most `capacity` artifacts (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&self, token: Uuid, payload: ArtifactPayload) {
        let mut inner = self.inner.write();
        if inner.entries.insert(token, Arc::new(payload)).is_none() {
            inner.order.push_back(token);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                debug!("Evicted artifact {}", oldest);
            }
        }
    }

    pub fn get(&self, token: &Uuid) -> Option<Arc<ArtifactPayload>> {
        self.inner.read().entries.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
