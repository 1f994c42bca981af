//! Practice session: the host that drives the engine.
//!
//! Owns the question bank, the engine, the answer-record log and the store.
//! Grades submissions, keeps a learner-facing correct streak for celebrations,
//! and persists after every state change. Persistence is best effort: store
//! failures are logged and the in-memory session carries on.

use rand::RngCore;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::bank::{QuestionBank, QuestionRepository};
use crate::catalog::CategoryCatalog;
use crate::domain::{AnswerRecord, Question, QuestionKind};
use crate::engine::{AdaptiveEngine, AnswerOutcome};
use crate::report::{Report, ReportGenerator};
use crate::store::{SessionLog, SessionSnapshot, SessionStore};
use crate::util::{new_session_id, percent, trunc_for_log};

const MINOR_CELEBRATION_STREAK: u32 = 5;
const MAJOR_CELEBRATION_STREAK: u32 = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmitError {
  #[error("no question is being shown")]
  NoQuestion,
  #[error("no option selected")]
  EmptySelection,
  #[error("answer already submitted")]
  AlreadySubmitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Celebration {
  Minor,
  Major,
}

/// What the learner sees after submitting.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
  pub is_correct: bool,
  pub correct_answer: Vec<String>,
  pub analysis: String,
  pub outcome: AnswerOutcome,
  pub celebration: Option<Celebration>,
}

pub struct PracticeSession {
  bank: QuestionBank,
  engine: AdaptiveEngine,
  log: SessionLog,
  store: Box<dyn SessionStore>,
  rng: Box<dyn RngCore>,
  limit: usize,
  current: Option<Question>,
  selection: Vec<String>,
  submitted: bool,
  streak: u32,
}

impl PracticeSession {
  /// `limit` is capped at the bank size.
  pub fn new(bank: QuestionBank, store: Box<dyn SessionStore>, limit: usize) -> Self {
    let engine = AdaptiveEngine::new(bank.questions());
    let limit = limit.min(bank.len());
    Self {
      bank,
      engine,
      log: SessionLog::default(),
      store,
      rng: Box::new(rand::thread_rng()),
      limit,
      current: None,
      selection: Vec::new(),
      submitted: false,
      streak: 0,
    }
  }

  pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
    self.rng = Box::new(rng);
    self
  }

  /// Begin a fresh session and show the first question.
  #[instrument(level = "info", skip(self), fields(bank = self.bank.len(), limit = self.limit))]
  pub fn start(&mut self) -> Option<&Question> {
    self.log = SessionLog { session_id: new_session_id(), ..SessionLog::default() };
    self.streak = 0;
    self.engine.initialize(self.bank.questions());
    info!(target: "session", session_id = %self.log.session_id, "Practice started");
    self.load_next();
    self.persist();
    self.current.as_ref()
  }

  /// Continue a stored session that has at least one answer. Returns false otherwise.
  #[instrument(level = "info", skip(self))]
  pub fn resume(&mut self) -> bool {
    let saved = match self.store.load() {
      Ok(Some(saved)) => saved,
      Ok(None) => return false,
      Err(e) => {
        warn!(target: "store", error = %e, "Stored session unreadable; ignoring it");
        return false;
      }
    };
    if saved.session.records.is_empty() {
      return false;
    }
    self.log = saved.session;
    self.engine.restore(saved.engine_state);
    self.streak = 0;
    info!(target: "session", session_id = %self.log.session_id, answered = self.log.records.len(), "Practice resumed");
    if self.has_more() {
      self.load_next();
    } else {
      // Stored at the limit: only the report is left.
      self.current = None;
      self.selection.clear();
      self.submitted = false;
    }
    true
  }

  /// Whether the store holds an unfinished session, and how many answers it has.
  pub fn stored_progress(&self) -> Option<usize> {
    match self.store.load() {
      Ok(Some(saved)) if !saved.session.records.is_empty() => Some(saved.session.records.len()),
      _ => None,
    }
  }

  fn load_next(&mut self) {
    let next = self
      .engine
      .select_next_question_with(self.bank.questions(), &mut *self.rng)
      .cloned();
    if let Some(q) = &next {
      info!(target: "session", id = %q.id, level = %q.level, category = %q.category, stem = %trunc_for_log(&q.stem, 24), "Question shown");
    }
    self.current = next;
    self.selection.clear();
    self.submitted = false;
  }

  pub fn current_question(&self) -> Option<&Question> {
    self.current.as_ref()
  }

  pub fn selection(&self) -> &[String] {
    &self.selection
  }

  /// Single/judgment questions replace the selection; multiple-choice toggles the key.
  pub fn select_option(&mut self, key: &str) {
    let Some(q) = &self.current else { return };
    if self.submitted {
      return;
    }
    match q.kind {
      QuestionKind::Single | QuestionKind::Judgment => {
        self.selection = vec![key.to_string()];
      }
      QuestionKind::Multiple => {
        if let Some(i) = self.selection.iter().position(|k| k == key) {
          self.selection.remove(i);
        } else {
          self.selection.push(key.to_string());
        }
      }
    }
  }

  /// Grade the current selection, record it, and update the engine.
  #[instrument(level = "info", skip(self))]
  pub fn submit(&mut self) -> Result<Feedback, SubmitError> {
    let q = self.current.as_ref().ok_or(SubmitError::NoQuestion)?;
    if self.submitted {
      return Err(SubmitError::AlreadySubmitted);
    }
    if self.selection.is_empty() {
      return Err(SubmitError::EmptySelection);
    }

    let is_correct = q.is_correct(&self.selection);
    self.log.records.push(AnswerRecord::new(q, self.selection.clone(), is_correct));
    let outcome = self.engine.record_answer(&q.id, is_correct, q.level, Some(&q.category));

    let celebration = if is_correct {
      self.streak += 1;
      match self.streak {
        MAJOR_CELEBRATION_STREAK => Some(Celebration::Major),
        MINOR_CELEBRATION_STREAK => Some(Celebration::Minor),
        _ => None,
      }
    } else {
      self.streak = 0;
      None
    };

    info!(target: "session", id = %q.id, is_correct, level_changed = outcome.level_changed, answered = self.log.records.len(), "Answer submitted");
    let feedback = Feedback {
      is_correct,
      correct_answer: q.answer.clone(),
      analysis: q.analysis.clone(),
      outcome,
      celebration,
    };
    self.submitted = true;
    self.persist();
    Ok(feedback)
  }

  pub fn has_more(&self) -> bool {
    self.answered_count() < self.limit && self.engine.has_more_questions(self.bank.questions())
  }

  /// Show the next question; `None` means the session is over.
  pub fn advance(&mut self) -> Option<&Question> {
    if !self.has_more() {
      self.current = None;
      return None;
    }
    self.load_next();
    self.current.as_ref()
  }

  /// Build the report and drop the stored session.
  #[instrument(level = "info", skip_all, fields(answered = self.log.records.len()))]
  pub fn finish(&mut self, catalog: &CategoryCatalog) -> Report {
    let report = ReportGenerator::new(catalog).generate(&self.log.records);
    info!(target: "session", session_id = %self.log.session_id, accuracy = report.overall.accuracy, "Practice finished");
    self.current = None;
    self.clear_store();
    report
  }

  /// Abandon the session entirely.
  pub fn reset(&mut self) {
    info!(target: "session", session_id = %self.log.session_id, "Practice reset");
    self.log = SessionLog::default();
    self.current = None;
    self.selection.clear();
    self.submitted = false;
    self.streak = 0;
    self.clear_store();
  }

  pub fn records(&self) -> &[AnswerRecord] {
    &self.log.records
  }

  pub fn session_id(&self) -> &str {
    &self.log.session_id
  }

  pub fn answered_count(&self) -> usize {
    self.log.records.len()
  }

  pub fn session_limit(&self) -> usize {
    self.limit
  }

  pub fn progress_percent(&self) -> u32 {
    percent(self.answered_count(), self.limit)
  }

  /// Accuracy so far, rounded percent.
  pub fn accuracy(&self) -> u32 {
    percent(self.log.records.iter().filter(|r| r.is_correct).count(), self.log.records.len())
  }

  pub fn correct_streak(&self) -> u32 {
    self.streak
  }

  pub fn engine(&self) -> &AdaptiveEngine {
    &self.engine
  }

  pub fn bank(&self) -> &QuestionBank {
    &self.bank
  }

  fn persist(&mut self) {
    let snapshot = SessionSnapshot { session: self.log.clone(), engine_state: self.engine.snapshot() };
    if let Err(e) = self.store.save(&snapshot) {
      warn!(target: "store", error = %e, "Could not save session; continuing in memory");
    }
  }

  fn clear_store(&mut self) {
    if let Err(e) = self.store.clear() {
      warn!(target: "store", error = %e, "Could not clear stored session");
    }
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::domain::Level;
  use crate::seeds::seed_category_catalog;
  use crate::store::MemoryStore;

  fn session(limit: usize) -> PracticeSession {
    PracticeSession::new(QuestionBank::load(None), Box::new(MemoryStore::new()), limit)
      .with_rng(StdRng::seed_from_u64(42))
  }

  fn answer_current(s: &mut PracticeSession, correctly: bool) -> Feedback {
    let q = s.current_question().unwrap().clone();
    let keys: Vec<String> = if correctly {
      q.answer.clone()
    } else if q.kind == QuestionKind::Judgment {
      vec![if q.answer[0] == "T" { "F" } else { "T" }.to_string()]
    } else {
      let wrong = q.options.iter().find(|o| !q.answer.contains(&o.key)).unwrap();
      vec![wrong.key.clone()]
    };
    for k in &keys {
      s.select_option(k);
    }
    s.submit().unwrap()
  }

  #[test]
  fn start_serves_fixed_questions_first() {
    let mut s = session(30);
    let first = s.start().unwrap().clone();
    assert!(first.fixed);
    assert_eq!(first.id, "conjunction_L1_027");
    answer_current(&mut s, true);
    assert_eq!(s.advance().unwrap().id, "modal_L1_005");
  }

  #[test]
  fn submit_requires_selection_and_question() {
    let mut s = session(30);
    assert_eq!(s.submit().unwrap_err(), SubmitError::NoQuestion);
    s.start();
    assert_eq!(s.submit().unwrap_err(), SubmitError::EmptySelection);
    answer_current(&mut s, true);
    assert_eq!(s.submit().unwrap_err(), SubmitError::AlreadySubmitted);
    assert_eq!(s.answered_count(), 1);
  }

  #[test]
  fn multiple_choice_selection_toggles() {
    let mut s = session(30);
    s.start();
    s.current = s.bank.get("modal_L2_04").cloned();
    s.select_option("A");
    s.select_option("C");
    s.select_option("A");
    assert_eq!(s.selection(), &["C".to_string()]);
  }

  #[test]
  fn records_and_engine_advance_together() {
    let mut s = session(30);
    s.start();
    for _ in 0..3 {
      answer_current(&mut s, true);
      s.advance();
    }
    assert_eq!(s.records().len(), 3);
    assert_eq!(s.engine().current_level(), Level::Advanced);
    assert_eq!(s.accuracy(), 100);
    assert_eq!(s.correct_streak(), 3);
  }

  #[test]
  fn celebrations_at_five_and_ten() {
    let mut s = session(30);
    s.start();
    let mut seen = Vec::new();
    for _ in 0..10 {
      let fb = answer_current(&mut s, true);
      if let Some(c) = fb.celebration {
        seen.push((s.correct_streak(), c));
      }
      s.advance();
    }
    assert_eq!(seen, vec![(5, Celebration::Minor), (10, Celebration::Major)]);
  }

  #[test]
  fn limit_ends_session() {
    let mut s = session(2);
    s.start();
    answer_current(&mut s, false);
    assert!(s.advance().is_some());
    answer_current(&mut s, false);
    assert!(!s.has_more());
    assert!(s.advance().is_none());
    assert_eq!(s.progress_percent(), 100);
  }

  #[test]
  fn resume_restores_records_and_engine() {
    let mut s = session(30);
    s.start();
    for _ in 0..4 {
      answer_current(&mut s, true);
      s.advance();
    }
    let answered: Vec<String> = s.engine().state().answered_ids.clone();
    let session_id = s.session_id().to_string();
    let store = std::mem::replace(&mut s.store, Box::new(MemoryStore::new()));

    let mut resumed = PracticeSession::new(QuestionBank::load(None), store, 30)
      .with_rng(StdRng::seed_from_u64(1));
    assert_eq!(resumed.stored_progress(), Some(4));
    assert!(resumed.resume());
    assert_eq!(resumed.session_id(), session_id);
    assert_eq!(resumed.records().len(), 4);
    assert_eq!(resumed.engine().state().answered_ids, answered);
    let next = resumed.current_question().unwrap();
    assert!(!answered.contains(&next.id));
  }

  #[test]
  fn resume_at_limit_goes_straight_to_report() {
    let mut s = session(2);
    s.start();
    answer_current(&mut s, true);
    s.advance();
    answer_current(&mut s, true);
    // Process ends before finish(): the full session stays in the store.
    let store = std::mem::replace(&mut s.store, Box::new(MemoryStore::new()));

    let mut resumed = PracticeSession::new(QuestionBank::load(None), store, 2)
      .with_rng(StdRng::seed_from_u64(1));
    assert!(resumed.resume());
    assert_eq!(resumed.answered_count(), 2);
    assert!(!resumed.has_more());
    assert!(resumed.current_question().is_none());
    assert_eq!(resumed.submit(), Err(SubmitError::NoQuestion));
    assert_eq!(resumed.progress_percent(), 100);
  }

  #[test]
  fn resume_ignores_empty_sessions() {
    let mut s = session(30);
    s.start();
    assert_eq!(s.stored_progress(), None);
    assert!(!s.resume());
  }

  #[test]
  fn storage_failures_do_not_interrupt_practice() {
    let mut s = PracticeSession::new(QuestionBank::load(None), Box::new(MemoryStore::with_quota(8)), 30)
      .with_rng(StdRng::seed_from_u64(3));
    s.start();
    answer_current(&mut s, true);
    assert_eq!(s.answered_count(), 1);
    assert!(s.advance().is_some());
  }

  #[test]
  fn finish_reports_and_clears_store() {
    let catalog = seed_category_catalog();
    let mut s = session(3);
    s.start();
    for _ in 0..3 {
      answer_current(&mut s, true);
      s.advance();
    }
    let report = s.finish(&catalog);
    assert_eq!(report.overall.total, 3);
    assert_eq!(s.stored_progress(), None);
    assert!(s.current_question().is_none());
  }

  #[test]
  fn reset_drops_everything() {
    let mut s = session(30);
    s.start();
    answer_current(&mut s, false);
    s.reset();
    assert!(s.records().is_empty());
    assert!(s.current_question().is_none());
    assert_eq!(s.stored_progress(), None);
  }
}
