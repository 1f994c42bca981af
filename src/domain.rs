//! Domain models: difficulty levels, question kinds, questions and answer records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two difficulty tiers questions and engine state are partitioned by.
///
/// Serialized as `L1`/`L2`; the older `basic`/`advanced` spellings are accepted on read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
  #[serde(rename = "L1", alias = "basic", alias = "Basic")]
  Basic,
  #[serde(rename = "L2", alias = "advanced", alias = "Advanced")]
  Advanced,
}

impl Default for Level {
  fn default() -> Self { Level::Basic }
}

impl Level {
  pub fn other(self) -> Level {
    match self {
      Level::Basic => Level::Advanced,
      Level::Advanced => Level::Basic,
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Level::Basic => "L1",
      Level::Advanced => "L2",
    }
  }

  /// Display name shown to learners.
  pub fn display_name(self) -> &'static str {
    match self {
      Level::Basic => "基础题",
      Level::Advanced => "进阶题",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

/// How the learner answers a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  /// Exactly one option key.
  Single,
  /// One or more option keys, toggled.
  Multiple,
  /// True/false statement; answer keys are `T` or `F`.
  Judgment,
}
impl Default for QuestionKind {
  fn default() -> Self { QuestionKind::Single }
}

impl QuestionKind {
  pub fn display_name(self) -> &'static str {
    match self {
      QuestionKind::Single => "单选题",
      QuestionKind::Multiple => "多选题",
      QuestionKind::Judgment => "判断题",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
  pub key: String,
  pub text: String,
}

/// A question record as stored in the bank.
///
/// The engine only reads `id`, `level`, `category` and `fixed`; the rest is for display and grading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  #[serde(default, rename = "type")]
  pub kind: QuestionKind,
  pub level: Level,
  pub category: String,
  #[serde(default)] pub tag: String,
  #[serde(default)] pub stem: String,
  #[serde(default)] pub options: Vec<AnswerOption>,
  #[serde(default)] pub answer: Vec<String>,
  #[serde(default)] pub analysis: String,
  /// Presented before any random pick at session start.
  #[serde(default)] pub fixed: bool,
}

impl Question {
  /// Option-order-independent comparison of a submitted key set with the answer set.
  pub fn is_correct(&self, submitted: &[String]) -> bool {
    let mut expected = self.answer.clone();
    let mut given = submitted.to_vec();
    expected.sort();
    given.sort();
    expected.dedup();
    given.dedup();
    !given.is_empty() && expected == given
  }
}

/// One entry of the host's append-only answer log, consumed by the report generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
  pub question_id: String,
  pub level: Level,
  pub category: String,
  #[serde(default)] pub tag: String,
  #[serde(rename = "type", default)]
  pub kind: QuestionKind,
  #[serde(default)] pub user_answer: Vec<String>,
  #[serde(default)] pub correct_answer: Vec<String>,
  pub is_correct: bool,
  pub timestamp: DateTime<Utc>,
}

impl AnswerRecord {
  pub fn new(q: &Question, user_answer: Vec<String>, is_correct: bool) -> Self {
    Self {
      question_id: q.id.clone(),
      level: q.level,
      category: q.category.clone(),
      tag: q.tag.clone(),
      kind: q.kind,
      user_answer,
      correct_answer: q.answer.clone(),
      is_correct,
      timestamp: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn q(answer: &[&str]) -> Question {
    Question {
      id: "q".into(),
      kind: QuestionKind::Multiple,
      level: Level::Basic,
      category: "particle".into(),
      tag: "助词/词类识别".into(),
      stem: String::new(),
      options: vec![],
      answer: answer.iter().map(|s| s.to_string()).collect(),
      analysis: String::new(),
      fixed: false,
    }
  }

  #[test]
  fn grading_ignores_key_order() {
    let q = q(&["A", "B", "C"]);
    assert!(q.is_correct(&["C".into(), "A".into(), "B".into()]));
    assert!(!q.is_correct(&["A".into(), "B".into()]));
    assert!(!q.is_correct(&[]));
  }

  #[test]
  fn level_accepts_legacy_names() {
    let l: Level = serde_json::from_str("\"advanced\"").unwrap();
    assert_eq!(l, Level::Advanced);
    let l: Level = serde_json::from_str("\"L1\"").unwrap();
    assert_eq!(l, Level::Basic);
    assert_eq!(serde_json::to_string(&Level::Advanced).unwrap(), "\"L2\"");
  }
}
