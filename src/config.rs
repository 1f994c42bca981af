//! Loading trainer configuration (session settings, extra bank entries, catalog
//! overrides) from TOML, plus environment overrides.
//!
//! Expected TOML schema:
//!
//! ```toml
//! [session]
//! limit = 30
//! store_path = "./.xuci_session.json"
//! show_pinyin = false
//!
//! [[questions]]
//! id = "modal_L1_101"
//! type = "single"
//! level = "L1"
//! category = "modal"
//! tag = "语气词/作用辨析"
//! stem = "..."
//! options = [{ key = "A", text = "..." }, { key = "B", text = "..." }]
//! answer = ["A"]
//! analysis = "..."
//! fixed = true
//!
//! [categories.modal]
//! name = "语气词"
//! advice = "..."
//!
//! [tag_descriptions]
//! "语气词/特征" = "..."
//!
//! [study_suggestions."语气词/特征"]
//! title = "..."
//! content = "..."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::catalog::{CategoryCatalog, CategoryInfo, Suggestion};
use crate::domain::{AnswerOption, Level, QuestionKind};
use crate::error::{Result, TrainerError};

pub const DEFAULT_SESSION_LIMIT: usize = 30;
pub const DEFAULT_STORE_PATH: &str = "./.xuci_session.json";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub session: SessionCfg,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
  #[serde(default)]
  pub categories: BTreeMap<String, CategoryInfo>,
  #[serde(default)]
  pub tag_descriptions: BTreeMap<String, String>,
  #[serde(default)]
  pub study_suggestions: BTreeMap<String, Suggestion>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct SessionCfg {
  #[serde(default)] pub limit: Option<usize>,
  #[serde(default)] pub store_path: Option<PathBuf>,
  #[serde(default)] pub show_pinyin: Option<bool>,
}

/// Question entry accepted in TOML. Missing ids are generated at load time.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  #[serde(default, rename = "type")] pub kind: Option<QuestionKind>,
  pub level: Level,
  pub category: String,
  #[serde(default)] pub tag: String,
  #[serde(default)] pub stem: String,
  #[serde(default)] pub options: Vec<AnswerOption>,
  #[serde(default)] pub answer: Vec<String>,
  #[serde(default)] pub analysis: String,
  #[serde(default)] pub fixed: bool,
}

impl TrainerConfig {
  /// Merge catalog overrides from this config into `catalog`.
  pub fn apply_to_catalog(&self, catalog: &mut CategoryCatalog) {
    for (id, info) in &self.categories {
      catalog.insert_category(id.clone(), info.clone());
    }
    for (tag, desc) in &self.tag_descriptions {
      catalog.insert_tag_description(tag.clone(), desc.clone());
    }
    for (tag, s) in &self.study_suggestions {
      catalog.insert_study_suggestion(tag.clone(), s.clone());
    }
  }
}

pub fn load_trainer_config(path: &Path) -> Result<TrainerConfig> {
  let s = std::fs::read_to_string(path)?;
  Ok(toml::from_str::<TrainerConfig>(&s)?)
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_trainer_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match load_trainer_config(Path::new(&path)) {
    Ok(cfg) => {
      info!(target: "xuci_trainer", %path, questions = cfg.questions.len(), "Loaded trainer config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "xuci_trainer", %path, error = %e, "Failed to load TOML config");
      None
    }
  }
}

/// Effective runtime settings: env over TOML over defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
  pub session_limit: usize,
  pub store_path: PathBuf,
  pub show_pinyin: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      session_limit: DEFAULT_SESSION_LIMIT,
      store_path: PathBuf::from(DEFAULT_STORE_PATH),
      show_pinyin: false,
    }
  }
}

impl Settings {
  pub fn resolve(cfg: Option<&TrainerConfig>) -> Self {
    let mut s = Settings::default();
    if let Some(sc) = cfg.map(|c| &c.session) {
      match sc.limit {
        Some(0) => warn!(target: "xuci_trainer", "Ignoring [session] limit = 0; session limit must be a positive integer"),
        Some(limit) => s.session_limit = limit,
        None => {}
      }
      if let Some(p) = &sc.store_path { s.store_path = p.clone(); }
      if let Some(b) = sc.show_pinyin { s.show_pinyin = b; }
    }
    if let Ok(v) = std::env::var("SESSION_LIMIT") {
      match parse_limit(&v) {
        Ok(limit) => s.session_limit = limit,
        Err(e) => warn!(target: "xuci_trainer", error = %e, "Ignoring SESSION_LIMIT"),
      }
    }
    if let Ok(p) = std::env::var("SESSION_PATH") {
      s.store_path = PathBuf::from(p);
    }
    if let Ok(v) = std::env::var("SHOW_PINYIN") {
      s.show_pinyin = parse_flag(&v);
    }
    s
  }
}

pub fn parse_limit(v: &str) -> Result<usize> {
  match v.trim().parse::<usize>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(TrainerError::Config(format!("session limit must be a positive integer, got {:?}", v))),
  }
}

fn parse_flag(v: &str) -> bool {
  matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_full_toml() {
    let cfg: TrainerConfig = toml::from_str(
      r#"
        [session]
        limit = 12
        show_pinyin = true

        [[questions]]
        type = "judgment"
        level = "L1"
        category = "modal"
        tag = "语气词/特征"
        stem = "语气词一般位于句末。"
        answer = ["T"]
        fixed = true

        [categories.adverb]
        name = "副词"

        [study_suggestions."语气词/特征"]
        title = "复习语气词位置"
        content = "朗读含语气词的句子。"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.session.limit, Some(12));
    assert_eq!(cfg.questions.len(), 1);
    assert_eq!(cfg.questions[0].kind, Some(QuestionKind::Judgment));
    assert!(cfg.questions[0].fixed);

    let mut catalog = CategoryCatalog::new();
    cfg.apply_to_catalog(&mut catalog);
    assert_eq!(catalog.name("adverb"), "副词");
    assert!(catalog.study_suggestion("语气词/特征").is_some());
  }

  #[test]
  fn limit_must_be_positive() {
    assert_eq!(parse_limit(" 20 ").unwrap(), 20);
    assert!(parse_limit("0").is_err());
    assert!(parse_limit("many").is_err());
  }

  #[test]
  fn zero_toml_limit_keeps_default() {
    let cfg: TrainerConfig = toml::from_str("[session]\nlimit = 0\n").unwrap();
    assert_eq!(cfg.session.limit, Some(0));
    let s = Settings::resolve(Some(&cfg));
    if std::env::var("SESSION_LIMIT").is_err() {
      assert_eq!(s.session_limit, DEFAULT_SESSION_LIMIT);
    }
    assert!(s.session_limit > 0);
  }

  #[test]
  fn settings_use_toml_values() {
    let cfg = TrainerConfig {
      session: SessionCfg { limit: Some(5), store_path: Some("x.json".into()), show_pinyin: Some(true) },
      ..TrainerConfig::default()
    };
    let s = Settings::resolve(Some(&cfg));
    // Env vars are not set in the test environment for these keys.
    if std::env::var("SESSION_LIMIT").is_err() {
      assert_eq!(s.session_limit, 5);
    }
    if std::env::var("SESSION_PATH").is_err() {
      assert_eq!(s.store_path, PathBuf::from("x.json"));
    }
  }
}
