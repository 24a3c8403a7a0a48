// ABOUTME: TraceStore - bounded, insertion-ordered index of recent traces.
// ABOUTME: Evicts the oldest entry once capacity is exceeded.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{TraceRecord, TraceRecorder};

/// Default number of traces kept in memory.
pub const DEFAULT_TRACE_CAPACITY: usize = 50;

#[derive(Default)]
struct TraceIndex {
    order: VecDeque<String>,
    records: HashMap<String, TraceRecord>,
    latest: Option<String>,
}

/// In-memory index of recently completed traces.
///
/// Eviction is strictly by insertion order; reads do not refresh an entry.
/// The `latest` pointer is a single cursor shared by all callers, so under
/// concurrent calls it names whichever trace was saved last.
#[derive(Clone)]
pub struct TraceStore {
    inner: Arc<RwLock<TraceIndex>>,
    capacity: usize,
}

impl TraceStore {
    /// Create a store holding at most `capacity` traces (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(TraceIndex::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Open a recorder for a new call under a fresh trace id.
    pub fn create_trace(
        &self,
        tool_name: impl Into<String>,
        root: Option<PathBuf>,
    ) -> TraceRecorder {
        TraceRecorder::open(Uuid::new_v4().to_string(), tool_name, root)
    }

    /// Insert or overwrite a record, evicting the oldest when over capacity.
    pub async fn save(&self, record: TraceRecord) {
        let mut index = self.inner.write().await;
        let id = record.trace_id.clone();
        if index.records.insert(id.clone(), record).is_none() {
            index.order.push_back(id.clone());
        }
        while index.order.len() > self.capacity {
            if let Some(evicted) = index.order.pop_front() {
                index.records.remove(&evicted);
                debug!(trace_id = %evicted, "Evicted trace");
            }
        }
        index.latest = Some(id);
    }

    /// The most recently saved trace.
    pub async fn latest(&self) -> Option<TraceRecord> {
        let index = self.inner.read().await;
        index
            .latest
            .as_ref()
            .and_then(|id| index.records.get(id))
            .cloned()
    }

    /// Look up a trace by id.
    pub async fn get(&self, trace_id: &str) -> Option<TraceRecord> {
        self.inner.read().await.records.get(trace_id).cloned()
    }

    /// Up to `limit` traces, newest first by insertion.
    pub async fn recent(&self, limit: usize) -> Vec<TraceRecord> {
        let index = self.inner.read().await;
        index
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| index.records.get(id))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}
