//! Display metadata for categories and tags.
//!
//! Passed explicitly to the report layer and the terminal presenter; nothing
//! looks categories up through global state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
  /// Learner-facing name, e.g. "助词".
  pub name: String,
  /// Study advice used when the whole category performs poorly.
  #[serde(default)]
  pub advice: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
  pub title: String,
  pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
  /// Category ids in report order.
  order: Vec<String>,
  categories: BTreeMap<String, CategoryInfo>,
  tag_descriptions: BTreeMap<String, String>,
  study_suggestions: BTreeMap<String, Suggestion>,
}

impl CategoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace a category. New ids are appended to the report order.
  pub fn insert_category(&mut self, id: impl Into<String>, info: CategoryInfo) {
    let id = id.into();
    if !self.order.contains(&id) {
      self.order.push(id.clone());
    }
    self.categories.insert(id, info);
  }

  pub fn insert_tag_description(&mut self, tag: impl Into<String>, description: impl Into<String>) {
    self.tag_descriptions.insert(tag.into(), description.into());
  }

  pub fn insert_study_suggestion(&mut self, tag: impl Into<String>, suggestion: Suggestion) {
    self.study_suggestions.insert(tag.into(), suggestion);
  }

  /// Known category ids, in insertion order.
  pub fn category_ids(&self) -> &[String] {
    &self.order
  }

  /// Display name, or the id itself for unknown categories.
  pub fn name<'a>(&'a self, category: &'a str) -> &'a str {
    self.categories.get(category).map(|c| c.name.as_str()).unwrap_or(category)
  }

  pub fn advice(&self, category: &str) -> String {
    match self.categories.get(category) {
      Some(c) if !c.advice.is_empty() => c.advice.clone(),
      _ => "建议多做练习，加强对该类虚词的理解。".into(),
    }
  }

  pub fn tag_description(&self, tag: &str) -> String {
    self.tag_descriptions
      .get(tag)
      .cloned()
      .unwrap_or_else(|| format!("\"{}\"相关知识点需要加强练习。", tag))
  }

  pub fn study_suggestion(&self, tag: &str) -> Option<&Suggestion> {
    self.study_suggestions.get(tag)
  }
}
