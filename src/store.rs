//! Session persistence: one JSON blob under a well-known key.
//!
//! The written form always carries every field. The read form tolerates
//! missing fields so snapshots from older versions still load.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::AnswerRecord;
use crate::engine::{EngineState, SavedEngineState};
use crate::error::Result;

pub const STORAGE_KEY: &str = "xuci_practice_session";

/// Host-side session log: identity plus the append-only answer records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
  #[serde(default)]
  pub session_id: String,
  #[serde(default = "Utc::now")]
  pub start_time: DateTime<Utc>,
  #[serde(default)]
  pub records: Vec<AnswerRecord>,
}

impl Default for SessionLog {
  fn default() -> Self {
    Self { session_id: String::new(), start_time: Utc::now(), records: Vec::new() }
  }
}

/// What gets written.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
  pub session: SessionLog,
  pub engine_state: EngineState,
}

/// What gets read back.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
  #[serde(default)]
  pub session: SessionLog,
  #[serde(default)]
  pub engine_state: Option<SavedEngineState>,
}

pub trait SessionStore {
  fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()>;
  /// `Ok(None)` when nothing is stored under the key, `Err` when what is stored does not parse.
  fn load(&self) -> Result<Option<SavedSession>>;
  fn clear(&mut self) -> Result<()>;
}

/// JSON file holding a key → blob object, the local-storage analogue.
#[derive(Clone, Debug)]
pub struct FileStore {
  path: PathBuf,
  key: String,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), key: STORAGE_KEY.to_string() }
  }

  pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
    Self { path: path.into(), key: key.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn read_entries(&self) -> Result<BTreeMap<String, serde_json::Value>> {
    match fs::read_to_string(&self.path) {
      Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
      Ok(s) => Ok(serde_json::from_str(&s)?),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
      Err(e) => Err(e.into()),
    }
  }

  fn write_entries(&self, entries: &BTreeMap<String, serde_json::Value>) -> Result<()> {
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir)?;
    }
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
    fs::rename(&tmp, &self.path)?;
    Ok(())
  }
}

impl SessionStore for FileStore {
  #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
  fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
    // An unreadable file is replaced rather than blocking the save.
    let mut entries = self.read_entries().unwrap_or_default();
    entries.insert(self.key.clone(), serde_json::to_value(snapshot)?);
    self.write_entries(&entries)?;
    debug!(target: "store", records = snapshot.session.records.len(), "Session saved");
    Ok(())
  }

  fn load(&self) -> Result<Option<SavedSession>> {
    let mut entries = self.read_entries()?;
    match entries.remove(&self.key) {
      Some(v) => Ok(Some(serde_json::from_value(v)?)),
      None => Ok(None),
    }
  }

  fn clear(&mut self) -> Result<()> {
    let mut entries = self.read_entries()?;
    if entries.remove(&self.key).is_some() {
      self.write_entries(&entries)?;
    }
    Ok(())
  }
}

/// In-memory store with an optional byte quota; used by tests and `SESSION_PATH=:memory:`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
  entries: HashMap<String, String>,
  quota: Option<usize>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Writes larger than `bytes` fail like a full browser storage would.
  pub fn with_quota(bytes: usize) -> Self {
    Self { entries: HashMap::new(), quota: Some(bytes) }
  }

  pub fn raw(&self) -> Option<&str> {
    self.entries.get(STORAGE_KEY).map(String::as_str)
  }

  pub fn put_raw(&mut self, blob: impl Into<String>) {
    self.entries.insert(STORAGE_KEY.to_string(), blob.into());
  }
}

impl SessionStore for MemoryStore {
  fn save(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
    let blob = serde_json::to_string(snapshot)?;
    if let Some(q) = self.quota.filter(|q| blob.len() > *q) {
      return Err(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("storage quota exceeded ({} > {} bytes)", blob.len(), q),
      )
      .into());
    }
    self.entries.insert(STORAGE_KEY.to_string(), blob);
    Ok(())
  }

  fn load(&self) -> Result<Option<SavedSession>> {
    match self.entries.get(STORAGE_KEY) {
      Some(blob) => Ok(Some(serde_json::from_str(blob)?)),
      None => Ok(None),
    }
  }

  fn clear(&mut self) -> Result<()> {
    self.entries.remove(STORAGE_KEY);
    Ok(())
  }
}
