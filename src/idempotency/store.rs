// ABOUTME: IdempotencyStore - a single JSON file mapping fingerprints to results.
// ABOUTME: Lets side-effecting operations skip work that already happened.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::IdempotencyError;
use crate::tool::ToolOutput;

/// A stored result, keyed by the fingerprint that produced it.
///
/// Serialized flat: the result's fields are stored verbatim, next to the
/// bookkeeping keys [`RESULT_KEY_FIELD`] and [`CREATED_AT_FIELD`]. Results
/// may not use those two names themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    #[serde(rename = "_resultKey")]
    pub result_key: String,
    #[serde(flatten)]
    pub result: Map<String, Value>,
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Record key holding the fingerprint.
pub const RESULT_KEY_FIELD: &str = "_resultKey";

/// Record key holding the time the result was first stored.
pub const CREATED_AT_FIELD: &str = "_createdAt";

/// Payload key [`IdempotentOutcome::into_output`] uses for the reuse flag.
pub const REUSED_FIELD: &str = "reused";

/// The whole index file: fingerprint -> record.
pub type IdempotencyIndex = BTreeMap<String, IdempotencyRecord>;

/// The value produced (or recalled) by [`IdempotencyStore::run_once`].
#[derive(Debug, Clone, PartialEq)]
pub struct IdempotentOutcome<T> {
    pub key: String,
    pub value: T,

    /// True when the value came from the index and the work was skipped.
    pub reused: bool,

    pub created_at: DateTime<Utc>,
}

impl<T: Serialize> IdempotentOutcome<T> {
    /// Turn the outcome into a handler output whose data carries `reused`.
    ///
    /// `reused` is reserved: a payload field of that name is replaced by
    /// the reuse flag.
    pub fn into_output(self) -> Result<ToolOutput, IdempotencyError> {
        let mut data = to_object(&self.key, &self.value)?;
        let flag = Value::Bool(self.reused);
        if let Some(shadowed) = data.insert(REUSED_FIELD.to_string(), flag) {
            warn!(
                key = %self.key,
                %shadowed,
                "Result field 'reused' replaced by the reuse flag"
            );
        }
        Ok(ToolOutput::with_data(Value::Object(data)))
    }
}

/// File-backed idempotency index shared by every call of a session.
///
/// Each `lookup` and `save` re-reads the whole file; `save` rewrites it.
/// A missing or unparseable file reads as an empty index. Writes within
/// this process are serialized, and [`run_once`](Self::run_once) holds a
/// per-fingerprint lock so concurrent duplicates run the work once.
/// Separate processes sharing one file are not coordinated.
pub struct IdempotencyStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    inflight: StdMutex<HashMap<String, InflightSlot>>,
}

/// Per-fingerprint lock shared by every `run_once` currently waiting on or
/// running that fingerprint.
struct InflightSlot {
    lock: Arc<Mutex<()>>,
    users: usize,
}

/// One caller's membership in an [`InflightSlot`]. Leaving happens on drop,
/// so a cancelled `run_once` still removes its entry.
struct FlightTicket<'a> {
    inflight: &'a StdMutex<HashMap<String, InflightSlot>>,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl Drop for FlightTicket<'_> {
    fn drop(&mut self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = inflight.get_mut(&self.key) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                inflight.remove(&self.key);
            }
        }
    }
}

impl IdempotencyStore {
    /// Use the index file at `path`. Nothing is read until first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole index. Returns an empty index if the file doesn't
    /// exist or is invalid.
    pub async fn load(&self) -> IdempotencyIndex {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Failed to parse {}: {}", self.path.display(), e);
                IdempotencyIndex::new()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {}", self.path.display(), e);
                }
                IdempotencyIndex::new()
            }
        }
    }

    /// Find the record stored under `key`.
    pub async fn lookup(&self, key: &str) -> Option<IdempotencyRecord> {
        self.load().await.remove(key)
    }

    /// Store `result` under `key`.
    ///
    /// The first record written for a key wins; saving again returns the
    /// existing record unchanged. `result` is stored verbatim and must not
    /// use the bookkeeping names [`RESULT_KEY_FIELD`] or [`CREATED_AT_FIELD`].
    pub async fn save(
        &self,
        key: &str,
        result: Map<String, Value>,
    ) -> Result<IdempotencyRecord, IdempotencyError> {
        if let Some(field) = [RESULT_KEY_FIELD, CREATED_AT_FIELD]
            .into_iter()
            .find(|f| result.contains_key(*f))
        {
            return Err(IdempotencyError::ReservedField {
                key: key.to_string(),
                field: field.to_string(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut index = self.load().await;
        if let Some(existing) = index.get(key) {
            debug!(key, "Record already stored, keeping the first");
            return Ok(existing.clone());
        }

        let record = IdempotencyRecord {
            result_key: key.to_string(),
            result,
            created_at: Utc::now(),
        };
        index.insert(key.to_string(), record.clone());
        self.write(&index).await?;
        Ok(record)
    }

    /// Number of records in the index.
    pub async fn len(&self) -> usize {
        self.load().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.load().await.is_empty()
    }

    /// Run `work` unless a result for `key` is already stored.
    ///
    /// On a hit the stored result is returned with `reused = true` and
    /// `work` never runs. Otherwise `work` runs, its result (which must
    /// serialize to a JSON object) is stored, and returned with
    /// `reused = false`. Errors from `work` pass through untouched and
    /// nothing is stored.
    pub async fn run_once<T, F, Fut>(
        &self,
        key: &str,
        work: F,
    ) -> Result<IdempotentOutcome<T>, anyhow::Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let ticket = self.join_flight(key);
        let _flight = ticket.lock.lock().await;
        self.run_locked(key, work).await
    }

    async fn run_locked<T, F, Fut>(
        &self,
        key: &str,
        work: F,
    ) -> Result<IdempotentOutcome<T>, anyhow::Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        if let Some(record) = self.lookup(key).await {
            info!(key, "Reusing stored result");
            let value = serde_json::from_value(Value::Object(record.result))
                .map_err(IdempotencyError::from)?;
            return Ok(IdempotentOutcome {
                key: key.to_string(),
                value,
                reused: true,
                created_at: record.created_at,
            });
        }

        let value = work().await?;
        let result = to_object(key, &value)?;
        let record = self.save(key, result).await?;
        info!(key, "Stored new result");
        Ok(IdempotentOutcome {
            key: key.to_string(),
            value,
            reused: false,
            created_at: record.created_at,
        })
    }

    fn join_flight(&self, key: &str) -> FlightTicket<'_> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = inflight
            .entry(key.to_string())
            .or_insert_with(|| InflightSlot {
                lock: Arc::new(Mutex::new(())),
                users: 0,
            });
        slot.users += 1;
        FlightTicket {
            inflight: &self.inflight,
            key: key.to_string(),
            lock: slot.lock.clone(),
        }
    }

    /// Number of fingerprints with a `run_once` waiting or running.
    pub fn inflight_len(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn write(&self, index: &IdempotencyIndex) -> Result<(), IdempotencyError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(index)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn to_object<T: Serialize>(key: &str, value: &T) -> Result<Map<String, Value>, IdempotencyError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(IdempotencyError::NotAnObject(key.to_string())),
    }
}
