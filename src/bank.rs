//! Question bank: merges configured entries with built-in seeds, validates them,
//! and offers read-only lookups and statistics.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::{QuestionCfg, TrainerConfig};
use crate::domain::{Level, Question, QuestionKind};
use crate::error::{Result, TrainerError};
use crate::seeds::seed_questions;

/// Read-only source of questions for a session.
pub trait QuestionRepository {
  fn questions(&self) -> &[Question];

  fn get(&self, id: &str) -> Option<&Question> {
    self.questions().iter().find(|q| q.id == id)
  }
}

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  questions: Vec<Question>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
  pub basic: usize,
  pub advanced: usize,
  pub total: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BankStats {
  pub total: usize,
  pub by_category: BTreeMap<String, LevelCounts>,
  pub by_level: LevelCounts,
  pub by_kind: BTreeMap<String, usize>,
}

impl QuestionRepository for QuestionBank {
  fn questions(&self) -> &[Question] {
    &self.questions
  }
}

impl QuestionBank {
  /// Build from config (if any) plus built-in seeds. Config entries win on id collisions.
  #[instrument(level = "info", skip_all)]
  pub fn load(cfg: Option<&TrainerConfig>) -> Self {
    let mut bank = QuestionBank::default();
    if let Some(cfg) = cfg {
      for qc in &cfg.questions {
        bank.push_validated(from_cfg(qc));
      }
    }
    for q in seed_questions() {
      bank.push_validated(q);
    }

    let stats = bank.stats();
    for (category, c) in &stats.by_category {
      info!(target: "bank", %category, basic = c.basic, advanced = c.advanced, "Startup question inventory");
    }
    info!(target: "bank", total = stats.total, fixed = bank.questions.iter().filter(|q| q.fixed).count(), "Question bank loaded");
    bank
  }

  /// Bank from an explicit list; invalid or duplicate entries are skipped.
  pub fn from_questions(questions: impl IntoIterator<Item = Question>) -> Self {
    let mut bank = QuestionBank::default();
    for q in questions {
      bank.push_validated(q);
    }
    bank
  }

  fn push_validated(&mut self, q: Question) {
    if self.questions.iter().any(|e| e.id == q.id) {
      warn!(target: "bank", id = %q.id, "Skipping duplicate question id");
      return;
    }
    match validate(&q) {
      Ok(()) => self.questions.push(q),
      Err(e) => warn!(target: "bank", error = %e, "Skipping invalid question"),
    }
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.questions.is_empty()
  }

  pub fn by_category(&self, category: &str) -> Vec<&Question> {
    self.questions.iter().filter(|q| q.category == category).collect()
  }

  pub fn by_level(&self, level: Level) -> Vec<&Question> {
    self.questions.iter().filter(|q| q.level == level).collect()
  }

  pub fn by_tag(&self, tag: &str) -> Vec<&Question> {
    self.questions.iter().filter(|q| q.tag == tag).collect()
  }

  pub fn stats(&self) -> BankStats {
    let mut stats = BankStats { total: self.questions.len(), ..BankStats::default() };
    for q in &self.questions {
      let cat = stats.by_category.entry(q.category.clone()).or_default();
      bump(cat, q.level);
      bump(&mut stats.by_level, q.level);
      let kind = serde_json::to_value(q.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
      *stats.by_kind.entry(kind).or_default() += 1;
    }
    stats
  }
}

fn bump(c: &mut LevelCounts, level: Level) {
  match level {
    Level::Basic => c.basic += 1,
    Level::Advanced => c.advanced += 1,
  }
  c.total += 1;
}

fn from_cfg(qc: &QuestionCfg) -> Question {
  Question {
    id: qc.id.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| Uuid::new_v4().to_string()),
    kind: qc.kind.unwrap_or_default(),
    level: qc.level,
    category: qc.category.clone(),
    tag: qc.tag.clone(),
    stem: qc.stem.clone(),
    options: qc.options.clone(),
    answer: qc.answer.clone(),
    analysis: qc.analysis.clone(),
    fixed: qc.fixed,
  }
}

/// Structural checks a question must pass before it can be served.
pub fn validate(q: &Question) -> Result<()> {
  let invalid = |reason: &str| TrainerError::InvalidQuestion { id: q.id.clone(), reason: reason.into() };

  if q.id.trim().is_empty() { return Err(invalid("empty id")); }
  if q.category.trim().is_empty() { return Err(invalid("empty category")); }
  if q.tag.trim().is_empty() { return Err(invalid("empty tag")); }
  if q.stem.trim().is_empty() { return Err(invalid("empty stem")); }
  if q.answer.is_empty() { return Err(invalid("empty answer set")); }

  match q.kind {
    QuestionKind::Judgment => {
      if q.answer.len() != 1 || !matches!(q.answer[0].as_str(), "T" | "F") {
        return Err(invalid("judgment answer must be exactly one of T/F"));
      }
    }
    QuestionKind::Single | QuestionKind::Multiple => {
      if q.options.is_empty() {
        return Err(invalid("choice question without options"));
      }
      let keys: HashSet<&str> = q.options.iter().map(|o| o.key.as_str()).collect();
      if keys.len() != q.options.len() {
        return Err(invalid("duplicate option keys"));
      }
      if let Some(a) = q.answer.iter().find(|a| !keys.contains(a.as_str())) {
        return Err(TrainerError::InvalidQuestion { id: q.id.clone(), reason: format!("answer key {a} is not an option") });
      }
      if q.kind == QuestionKind::Single && q.answer.len() != 1 {
        return Err(invalid("single-choice question with several answers"));
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::TrainerConfig;
  use crate::domain::AnswerOption;

  fn choice(id: &str, answer: &[&str]) -> Question {
    Question {
      id: id.into(),
      kind: QuestionKind::Single,
      level: Level::Basic,
      category: "modal".into(),
      tag: "语气词/作用辨析".into(),
      stem: "stem".into(),
      options: vec![
        AnswerOption { key: "A".into(), text: "a".into() },
        AnswerOption { key: "B".into(), text: "b".into() },
      ],
      answer: answer.iter().map(|s| s.to_string()).collect(),
      analysis: String::new(),
      fixed: false,
    }
  }

  #[test]
  fn seeds_are_all_valid() {
    let seeds = seed_questions();
    let bank = QuestionBank::load(None);
    assert_eq!(bank.len(), seeds.len());
    assert!(bank.questions().iter().any(|q| q.fixed));
    for category in ["preposition", "particle", "conjunction", "modal"] {
      assert!(!bank.by_category(category).is_empty(), "{category}");
    }
  }

  #[test]
  fn invalid_entries_are_skipped() {
    let mut bad_judgment = choice("j", &["X"]);
    bad_judgment.kind = QuestionKind::Judgment;
    let bank = QuestionBank::from_questions(vec![
      choice("ok", &["A"]),
      choice("ok", &["B"]),
      choice("missing_key", &["C"]),
      choice("two_answers", &["A", "B"]),
      bad_judgment,
    ]);
    assert_eq!(bank.len(), 1);
    assert_eq!(bank.get("ok").unwrap().answer, vec!["A".to_string()]);
  }

  #[test]
  fn config_entries_override_seeds() {
    let cfg: TrainerConfig = toml::from_str(
      r#"
        [[questions]]
        id = "modal_L1_009"
        type = "judgment"
        level = "L1"
        category = "modal"
        tag = "语气词/特征"
        stem = "替换后的题干"
        answer = ["T"]

        [[questions]]
        level = "L2"
        category = "adverb"
        tag = "副词/作用辨析"
        stem = "无编号题目"
        options = [{ key = "A", text = "甲" }]
        answer = ["A"]
      "#,
    )
    .unwrap();
    let bank = QuestionBank::load(Some(&cfg));
    assert_eq!(bank.get("modal_L1_009").unwrap().stem, "替换后的题干");
    assert_eq!(bank.by_category("adverb").len(), 1);
    assert!(!bank.by_category("adverb")[0].id.is_empty());
    assert_eq!(bank.len(), seed_questions().len() + 1);
  }

  #[test]
  fn stats_count_by_category_level_and_kind() {
    let mut adv = choice("b", &["B"]);
    adv.level = Level::Advanced;
    let bank = QuestionBank::from_questions(vec![choice("a", &["A"]), adv]);
    let s = bank.stats();
    assert_eq!(s.total, 2);
    assert_eq!(s.by_level, LevelCounts { basic: 1, advanced: 1, total: 2 });
    assert_eq!(s.by_category["modal"].total, 2);
    assert_eq!(s.by_kind["single"], 2);
    assert_eq!(bank.by_tag("语气词/作用辨析").len(), 2);
    assert_eq!(bank.by_level(Level::Advanced).len(), 1);
  }
}
