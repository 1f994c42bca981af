//! Engine state, level-history entries, and the lenient saved-state schema.
//!
//! `EngineState` is what gets written out: every field, always present.
//! `SavedEngineState` is what gets read back: every field optional, and a field
//! that fails to parse is treated as absent instead of failing the whole load.
//! Snapshots written by older versions (plain basic/advanced levels, no
//! category forcing, no fixed queue) therefore still restore.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::domain::Level;

/// One level transition (or the initial level).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelChange {
  pub level: Level,
  pub reason: String,
  pub timestamp: DateTime<Utc>,
}

impl LevelChange {
  pub fn now(level: Level, reason: impl Into<String>) -> Self {
    Self { level, reason: reason.into(), timestamp: Utc::now() }
  }
}

/// Complete session-scoped engine state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
  pub current_level: Level,
  /// Unbroken correct streak at Basic.
  pub consecutive_correct: u32,
  /// Wrong answers at Advanced since the last transition.
  pub advanced_wrong_count: u32,
  /// Ids presented this session, each once, in first-answer order.
  pub answered_ids: Vec<String>,
  pub level_history: Vec<LevelChange>,
  /// One entry per wrong Advanced answer; cleared by a correct Advanced answer.
  pub advanced_wrong_categories: Vec<String>,
  pub forced_category: Option<String>,
  pub forced_category_remaining: u32,
  /// Pending fixed questions, front first. Serialized as a plain array.
  pub fixed_question_ids: VecDeque<String>,
  pub fixed_questions_completed: bool,
}

impl EngineState {
  pub(crate) fn initial(fixed_question_ids: Vec<String>) -> Self {
    let fixed_questions_completed = fixed_question_ids.is_empty();
    Self {
      current_level: Level::Basic,
      consecutive_correct: 0,
      advanced_wrong_count: 0,
      answered_ids: Vec::new(),
      level_history: vec![LevelChange::now(Level::Basic, super::REASON_INITIAL)],
      advanced_wrong_categories: Vec::new(),
      forced_category: None,
      forced_category_remaining: 0,
      fixed_question_ids: fixed_question_ids.into(),
      fixed_questions_completed,
    }
  }

  pub fn is_answered(&self, id: &str) -> bool {
    self.answered_ids.iter().any(|a| a == id)
  }

  pub(crate) fn clear_forced_category(&mut self) {
    self.forced_category = None;
    self.forced_category_remaining = 0;
  }
}

/// Saved engine state as read from storage.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEngineState {
  #[serde(default, deserialize_with = "lenient")]
  pub current_level: Option<Level>,
  #[serde(default, deserialize_with = "lenient")]
  pub consecutive_correct: Option<u32>,
  #[serde(default, deserialize_with = "lenient")]
  pub advanced_wrong_count: Option<u32>,
  #[serde(default, deserialize_with = "lenient")]
  pub answered_ids: Option<Vec<String>>,
  #[serde(default, deserialize_with = "lenient")]
  pub level_history: Option<Vec<LevelChange>>,
  #[serde(default, deserialize_with = "lenient")]
  pub advanced_wrong_categories: Option<Vec<String>>,
  #[serde(default, deserialize_with = "lenient")]
  pub forced_category: Option<String>,
  #[serde(default, deserialize_with = "lenient")]
  pub forced_category_remaining: Option<u32>,
  #[serde(default, deserialize_with = "lenient")]
  pub fixed_question_ids: Option<Vec<String>>,
  #[serde(default, deserialize_with = "lenient")]
  pub fixed_questions_completed: Option<bool>,
}

impl SavedEngineState {
  /// Fill every absent field with its initialization value.
  pub(crate) fn into_state(self) -> EngineState {
    let fixed_question_ids = self.fixed_question_ids.unwrap_or_default();
    let mut base = EngineState::initial(fixed_question_ids);
    let mut answered_ids: Vec<String> = Vec::new();
    for id in self.answered_ids.unwrap_or_default() {
      if !answered_ids.contains(&id) {
        answered_ids.push(id);
      }
    }
    if let Some(level) = self.current_level { base.current_level = level; }
    if let Some(n) = self.consecutive_correct { base.consecutive_correct = n; }
    if let Some(n) = self.advanced_wrong_count { base.advanced_wrong_count = n; }
    if let Some(h) = self.level_history.filter(|h| !h.is_empty()) { base.level_history = h; }
    if let Some(c) = self.advanced_wrong_categories { base.advanced_wrong_categories = c; }
    if let Some(done) = self.fixed_questions_completed { base.fixed_questions_completed = done; }
    base.answered_ids = answered_ids;
    base.forced_category = self.forced_category.filter(|c| !c.is_empty());
    base.forced_category_remaining = match base.forced_category {
      Some(_) => self.forced_category_remaining.unwrap_or(0),
      None => 0,
    };
    base
  }
}

impl From<EngineState> for SavedEngineState {
  fn from(s: EngineState) -> Self {
    Self {
      current_level: Some(s.current_level),
      consecutive_correct: Some(s.consecutive_correct),
      advanced_wrong_count: Some(s.advanced_wrong_count),
      answered_ids: Some(s.answered_ids),
      level_history: Some(s.level_history),
      advanced_wrong_categories: Some(s.advanced_wrong_categories),
      forced_category: s.forced_category,
      forced_category_remaining: Some(s.forced_category_remaining),
      fixed_question_ids: Some(s.fixed_question_ids.into()),
      fixed_questions_completed: Some(s.fixed_questions_completed),
    }
  }
}

/// Deserialize a field, mapping null or an unparseable value to `None`.
fn lenient<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let raw = serde_json::Value::deserialize(de)?;
  Ok(serde_json::from_value(raw).ok())
}
