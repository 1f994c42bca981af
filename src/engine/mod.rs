//! Adaptive difficulty engine.
//!
//! Rules:
//!   - a session starts at Basic
//!   - `upgrade_threshold` consecutive correct Basic answers switch to Advanced
//!   - `downgrade_threshold` wrong Advanced answers (not necessarily consecutive) switch back
//!   - if the last `downgrade_threshold` wrong Advanced answers share one category, the next
//!     `category_forced_count` Basic picks are drawn from that category
//!   - questions flagged `fixed` are served first, in bank order
//!   - within a level picks are uniform random over unanswered questions
//!
//! The engine is an owned value: construct it per session, drive it with
//! `record_answer` / `select_next_question`, persist it through `snapshot`.

mod select;
mod state;

pub use state::{EngineState, LevelChange, SavedEngineState};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::{Level, Question};

pub(crate) const REASON_INITIAL: &str = "初始难度";

/// Engine thresholds. Fixed for the lifetime of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
  pub upgrade_threshold: u32,
  pub downgrade_threshold: u32,
  pub category_forced_count: u32,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self { upgrade_threshold: 3, downgrade_threshold: 2, category_forced_count: 2 }
  }
}

/// Result of recording one answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
  pub level_changed: bool,
  pub previous_level: Level,
  pub new_level: Level,
  /// Empty when the level did not change.
  pub reason: String,
  /// Forced category active after this answer, whoever set it.
  pub forced_category: Option<String>,
}

/// Remaining unanswered questions, fixed ones included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingCount {
  pub basic: usize,
  pub advanced: usize,
  pub total: usize,
  pub current_level: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForcedCategoryInfo {
  pub category: String,
  pub remaining: u32,
}

/// Read-only progress summary for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressInfo {
  pub current_level: Level,
  pub consecutive_correct: u32,
  pub advanced_wrong_count: u32,
  pub answered_count: usize,
  /// `(streak, threshold)` while at Basic.
  pub upgrade_progress: Option<(u32, u32)>,
  /// `(wrong, threshold)` while at Advanced.
  pub downgrade_progress: Option<(u32, u32)>,
  pub forced_category: Option<ForcedCategoryInfo>,
  pub fixed_questions_remaining: usize,
  pub fixed_questions_completed: bool,
}

#[derive(Clone, Debug)]
pub struct AdaptiveEngine {
  config: EngineConfig,
  state: EngineState,
}

impl AdaptiveEngine {
  /// Fresh engine with default thresholds. `pool` only seeds the fixed-question queue.
  pub fn new(pool: &[Question]) -> Self {
    Self::with_config(EngineConfig::default(), pool)
  }

  pub fn with_config(config: EngineConfig, pool: &[Question]) -> Self {
    let mut engine = Self { config, state: EngineState::initial(Vec::new()) };
    engine.initialize(pool);
    engine
  }

  /// Reset all state; the fixed queue is rebuilt from `pool` in pool order.
  #[instrument(level = "debug", skip_all, fields(pool_len = pool.len()))]
  pub fn initialize(&mut self, pool: &[Question]) {
    let fixed: Vec<String> = pool.iter().filter(|q| q.fixed).map(|q| q.id.clone()).collect();
    debug!(target: "engine", fixed = fixed.len(), "Engine initialized");
    self.state = EngineState::initial(fixed);
  }

  pub fn config(&self) -> EngineConfig {
    self.config
  }

  /// Update streak counters for one answered question.
  ///
  /// Call exactly once per answered question: counters are not guarded against
  /// a repeated id, only `answered_ids` membership is.
  #[instrument(level = "debug", skip(self), fields(level = %self.state.current_level))]
  pub fn record_answer(
    &mut self,
    question_id: &str,
    is_correct: bool,
    question_level: Level,
    question_category: Option<&str>,
  ) -> AnswerOutcome {
    if !self.state.is_answered(question_id) {
      self.state.answered_ids.push(question_id.to_string());
    }

    let previous_level = self.state.current_level;
    let transition = match previous_level {
      Level::Basic => {
        let t = self.process_basic(is_correct);
        if self.state.forced_category_remaining > 0 {
          self.state.forced_category_remaining -= 1;
          if self.state.forced_category_remaining == 0 {
            self.state.forced_category = None;
          }
        }
        t
      }
      Level::Advanced => self.process_advanced(is_correct, question_category),
    };

    let (level_changed, reason) = match transition {
      Some(reason) => {
        let level = self.state.current_level;
        info!(target: "engine", from = %previous_level, to = %level, %reason, "Level changed");
        self.state.level_history.push(LevelChange::now(level, reason.clone()));
        (true, reason)
      }
      None => (false, String::new()),
    };

    AnswerOutcome {
      level_changed,
      previous_level,
      new_level: self.state.current_level,
      reason,
      forced_category: self.state.forced_category.clone(),
    }
  }

  fn process_basic(&mut self, is_correct: bool) -> Option<String> {
    if !is_correct {
      self.state.consecutive_correct = 0;
      return None;
    }
    self.state.consecutive_correct += 1;
    if self.state.consecutive_correct < self.config.upgrade_threshold {
      return None;
    }
    self.state.current_level = Level::Advanced;
    self.state.consecutive_correct = 0;
    self.state.advanced_wrong_count = 0;
    Some(format!("连续答对{}道L1题，升级为L2题", self.config.upgrade_threshold))
  }

  fn process_advanced(&mut self, is_correct: bool, category: Option<&str>) -> Option<String> {
    if is_correct {
      // A correct answer breaks the same-category chain but keeps the wrong count.
      self.state.advanced_wrong_categories.clear();
      return None;
    }

    self.state.advanced_wrong_count += 1;
    if let Some(c) = category.filter(|c| !c.is_empty()) {
      self.state.advanced_wrong_categories.push(c.to_string());
    }
    let n = self.config.downgrade_threshold;
    if self.state.advanced_wrong_count < n {
      return None;
    }

    let reason = match self.repeated_wrong_category() {
      Some(c) if self.config.category_forced_count > 0 => {
        let reason = format!(
          "连续答错{}道{}类L2题，降级为L1题，接下来{}道L1题将从该类别中抽取",
          n, c, self.config.category_forced_count
        );
        self.state.forced_category = Some(c);
        self.state.forced_category_remaining = self.config.category_forced_count;
        reason
      }
      _ => format!("答错{}道L2题，降级为L1题", n),
    };

    self.state.current_level = Level::Basic;
    self.state.advanced_wrong_count = 0;
    self.state.consecutive_correct = 0;
    self.state.advanced_wrong_categories.clear();
    Some(reason)
  }

  /// Category shared by the last `downgrade_threshold` wrong Advanced answers, if any.
  fn repeated_wrong_category(&self) -> Option<String> {
    let n = self.config.downgrade_threshold as usize;
    let cats = &self.state.advanced_wrong_categories;
    if n == 0 || cats.len() < n {
      return None;
    }
    let last = &cats[cats.len() - n..];
    let first = &last[0];
    last.iter().all(|c| c == first).then(|| first.clone())
  }

  pub fn current_level(&self) -> Level {
    self.state.current_level
  }

  /// Deep copy of the state, safe to persist while the engine keeps running.
  pub fn snapshot(&self) -> EngineState {
    self.state.clone()
  }

  pub fn state(&self) -> &EngineState {
    &self.state
  }

  /// Replace state from storage. Absent fields get initialization values; `None` is a no-op.
  pub fn restore(&mut self, saved: Option<SavedEngineState>) {
    if let Some(saved) = saved {
      self.state = saved.into_state();
      debug!(target: "engine", level = %self.state.current_level, answered = self.state.answered_ids.len(), "Engine state restored");
    }
  }

  pub fn remaining(&self, pool: &[Question]) -> RemainingCount {
    let count = |level: Level| {
      pool.iter().filter(|q| q.level == level && !self.state.is_answered(&q.id)).count()
    };
    let basic = count(Level::Basic);
    let advanced = count(Level::Advanced);
    RemainingCount {
      basic,
      advanced,
      total: basic + advanced,
      current_level: match self.state.current_level {
        Level::Basic => basic,
        Level::Advanced => advanced,
      },
    }
  }

  pub fn has_more_questions(&self, pool: &[Question]) -> bool {
    self.remaining(pool).total > 0
  }

  pub fn in_fixed_phase(&self) -> bool {
    !self.state.fixed_questions_completed && !self.state.fixed_question_ids.is_empty()
  }

  pub fn in_forced_category_mode(&self) -> bool {
    self.state.forced_category.is_some() && self.state.forced_category_remaining > 0
  }

  pub fn forced_category_info(&self) -> Option<ForcedCategoryInfo> {
    if !self.in_forced_category_mode() {
      return None;
    }
    self.state.forced_category.as_ref().map(|c| ForcedCategoryInfo {
      category: c.clone(),
      remaining: self.state.forced_category_remaining,
    })
  }

  pub fn progress(&self) -> ProgressInfo {
    let s = &self.state;
    ProgressInfo {
      current_level: s.current_level,
      consecutive_correct: s.consecutive_correct,
      advanced_wrong_count: s.advanced_wrong_count,
      answered_count: s.answered_ids.len(),
      upgrade_progress: (s.current_level == Level::Basic)
        .then_some((s.consecutive_correct, self.config.upgrade_threshold)),
      downgrade_progress: (s.current_level == Level::Advanced)
        .then_some((s.advanced_wrong_count, self.config.downgrade_threshold)),
      forced_category: self.forced_category_info(),
      fixed_questions_remaining: s.fixed_question_ids.len(),
      fixed_questions_completed: s.fixed_questions_completed,
    }
  }
}
