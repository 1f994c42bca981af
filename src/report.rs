//! End-of-session report: overall and per-level accuracy, per-category analysis,
//! weak points by tag, and study suggestions.
//!
//! Works only on the host's answer records, never on engine state. Display
//! names and advice come from the `CategoryCatalog` passed in.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::catalog::{CategoryCatalog, Suggestion};
use crate::domain::{AnswerRecord, Level};
use crate::util::{format_datetime, percent};

/// Error-rate threshold (percent) for a tag to count as a weak point.
const WEAK_POINT_ERROR_RATE: u32 = 40;
/// Wrong-answer count that makes a tag a weak point regardless of rate.
const WEAK_POINT_WRONG_COUNT: usize = 2;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
  pub total: usize,
  pub correct: usize,
  pub wrong: usize,
  pub accuracy: u32,
}

impl Tally {
  fn of<'a>(records: impl Iterator<Item = &'a AnswerRecord>) -> Self {
    let (mut total, mut correct) = (0, 0);
    for r in records {
      total += 1;
      if r.is_correct { correct += 1; }
    }
    Tally { total, correct, wrong: total - correct, accuracy: percent(correct, total) }
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeakPoint {
  pub tag: String,
  pub category: String,
  pub total_count: usize,
  pub wrong_count: usize,
  pub error_rate: u32,
  pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub generated_at: DateTime<Local>,
  pub overall: Tally,
  pub basic: Tally,
  pub advanced: Tally,
  /// Keyed by category id; known categories always present.
  pub category_analysis: BTreeMap<String, Tally>,
  pub weak_points: Vec<WeakPoint>,
  pub suggestions: Vec<Suggestion>,
}

pub struct ReportGenerator<'a> {
  catalog: &'a CategoryCatalog,
}

impl<'a> ReportGenerator<'a> {
  pub fn new(catalog: &'a CategoryCatalog) -> Self {
    Self { catalog }
  }

  pub fn generate(&self, records: &[AnswerRecord]) -> Report {
    let category_analysis = self.category_analysis(records);
    if records.is_empty() {
      return Report {
        generated_at: Local::now(),
        overall: Tally::default(),
        basic: Tally::default(),
        advanced: Tally::default(),
        category_analysis,
        weak_points: Vec::new(),
        suggestions: vec![Suggestion {
          title: "开始练习".into(),
          content: "您还没有答题记录，请先完成一些练习题目。".into(),
        }],
      };
    }

    let overall = Tally::of(records.iter());
    let weak_points = self.weak_points(records);
    let suggestions = self.suggestions(&overall, &category_analysis, &weak_points);
    Report {
      generated_at: Local::now(),
      overall,
      basic: Tally::of(records.iter().filter(|r| r.level == Level::Basic)),
      advanced: Tally::of(records.iter().filter(|r| r.level == Level::Advanced)),
      category_analysis,
      weak_points,
      suggestions,
    }
  }

  fn category_analysis(&self, records: &[AnswerRecord]) -> BTreeMap<String, Tally> {
    let mut ids: Vec<&str> = self.catalog.category_ids().iter().map(String::as_str).collect();
    for r in records {
      if !ids.contains(&r.category.as_str()) {
        ids.push(&r.category);
      }
    }
    ids
      .into_iter()
      .map(|id| (id.to_string(), Tally::of(records.iter().filter(|r| r.category == id))))
      .collect()
  }

  /// Tags with at least one miss and either a high error rate or repeated misses.
  fn weak_points(&self, records: &[AnswerRecord]) -> Vec<WeakPoint> {
    // tag -> (category, total, wrong), in first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut by_tag: BTreeMap<&str, (&str, usize, usize)> = BTreeMap::new();
    for r in records {
      let e = by_tag.entry(r.tag.as_str()).or_insert_with(|| {
        order.push(r.tag.as_str());
        (r.category.as_str(), 0, 0)
      });
      e.1 += 1;
      if !r.is_correct { e.2 += 1; }
    }

    let mut points: Vec<WeakPoint> = order
      .into_iter()
      .filter_map(|tag| {
        let (category, total, wrong) = by_tag[tag];
        let rate = percent(wrong, total);
        let weak = wrong >= 1 && (rate >= WEAK_POINT_ERROR_RATE || wrong >= WEAK_POINT_WRONG_COUNT);
        weak.then(|| WeakPoint {
          tag: tag.to_string(),
          category: category.to_string(),
          total_count: total,
          wrong_count: wrong,
          error_rate: rate,
          description: self.catalog.tag_description(tag),
        })
      })
      .collect();
    // Stable: ties keep first-seen order.
    points.sort_by(|a, b| b.error_rate.cmp(&a.error_rate));
    points
  }

  fn suggestions(
    &self,
    overall: &Tally,
    categories: &BTreeMap<String, Tally>,
    weak_points: &[WeakPoint],
  ) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = Vec::new();
    for p in weak_points {
      if let Some(s) = self.catalog.study_suggestion(&p.tag) {
        if !out.iter().any(|e| e.title == s.title) {
          out.push(s.clone());
        }
      }
    }

    if out.is_empty() {
      out.push(if overall.accuracy < 80 {
        Suggestion {
          title: "继续巩固虚词基础知识".into(),
          content: "建议系统复习虚词的基本分类和用法，通过大量例句加深理解。可以尝试整理错题本，分析错误原因。".into(),
        }
      } else {
        Suggestion {
          title: "保持良好学习状态".into(),
          content: "您的虚词掌握情况良好！建议继续保持学习习惯，可以尝试更多进阶题目来进一步提升。".into(),
        }
      });
    }

    for id in self.ordered_categories(categories) {
      let t = &categories[id];
      if t.total >= 2 && t.accuracy < 60 {
        let name = self.catalog.name(id);
        if !out.iter().any(|s| s.title.contains(name)) {
          out.push(Suggestion { title: format!("重点加强{}学习", name), content: self.catalog.advice(id) });
        }
      }
    }

    out.truncate(MAX_SUGGESTIONS);
    out
  }

  /// Catalog order first, then categories only seen in records.
  fn ordered_categories<'m>(&self, categories: &'m BTreeMap<String, Tally>) -> Vec<&'m str> {
    let mut ids: Vec<&'m str> = Vec::new();
    for id in self.catalog.category_ids() {
      if let Some((k, _)) = categories.get_key_value(id) {
        ids.push(k.as_str());
      }
    }
    for k in categories.keys() {
      if !ids.contains(&k.as_str()) {
        ids.push(k.as_str());
      }
    }
    ids
  }

  /// Plain-text rendering for saving or printing.
  pub fn export_text(&self, report: &Report) -> String {
    let rule = "═══════════════════════════════════════\n";
    let mut text = String::new();
    text.push_str(rule);
    text.push_str("        现代汉语虚词学习测评报告\n");
    text.push_str(rule);
    text.push('\n');
    text.push_str(&format!("生成时间：{}\n\n", format_datetime(&report.generated_at)));

    text.push_str("【基础数据】\n");
    text.push_str(&format!("总答题数：{} 题\n", report.overall.total));
    text.push_str(&format!("总正确率：{}%\n", report.overall.accuracy));
    text.push_str(&format!(
      "基础题：{}/{} 正确（{}%）\n",
      report.basic.correct, report.basic.total, report.basic.accuracy
    ));
    text.push_str(&format!(
      "进阶题：{}/{} 正确（{}%）\n\n",
      report.advanced.correct, report.advanced.total, report.advanced.accuracy
    ));

    text.push_str("【虚词类别分析】\n");
    for id in self.ordered_categories(&report.category_analysis) {
      let t = &report.category_analysis[id];
      if t.total > 0 {
        text.push_str(&format!("{}：{}/{} 正确（{}%）\n", self.catalog.name(id), t.correct, t.total, t.accuracy));
      }
    }
    text.push('\n');

    text.push_str("【薄弱点定位】\n");
    if report.weak_points.is_empty() {
      text.push_str("恭喜！本次练习未发现明显薄弱点。\n");
    } else {
      for (i, p) in report.weak_points.iter().enumerate() {
        text.push_str(&format!("{}. {} - {}\n", i + 1, self.catalog.name(&p.category), p.tag));
        text.push_str(&format!("   错误 {}/{} 题（错误率 {}%）\n", p.wrong_count, p.total_count, p.error_rate));
        text.push_str(&format!("   {}\n\n", p.description));
      }
    }

    text.push_str("【学习建议】\n");
    for (i, s) in report.suggestions.iter().enumerate() {
      text.push_str(&format!("{}. {}\n", i + 1, s.title));
      text.push_str(&format!("   {}\n\n", s.content));
    }
    text.push_str(rule);
    text
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::domain::QuestionKind;
  use crate::seeds::seed_category_catalog;

  fn rec(id: &str, level: Level, category: &str, tag: &str, ok: bool) -> AnswerRecord {
    AnswerRecord {
      question_id: id.into(),
      level,
      category: category.into(),
      tag: tag.into(),
      kind: QuestionKind::Single,
      user_answer: vec!["A".into()],
      correct_answer: vec![if ok { "A" } else { "B" }.into()],
      is_correct: ok,
      timestamp: Utc::now(),
    }
  }

  #[test]
  fn empty_records_give_starter_report() {
    let catalog = seed_category_catalog();
    let r = ReportGenerator::new(&catalog).generate(&[]);
    assert_eq!(r.overall, Tally::default());
    assert_eq!(r.category_analysis.len(), 4);
    assert_eq!(r.suggestions.len(), 1);
    assert_eq!(r.suggestions[0].title, "开始练习");
  }

  #[test]
  fn stats_split_by_level_and_category() {
    let catalog = seed_category_catalog();
    let records = vec![
      rec("1", Level::Basic, "modal", "语气词/特征", true),
      rec("2", Level::Basic, "modal", "语气词/特征", true),
      rec("3", Level::Advanced, "particle", "助词/动态助词", false),
      rec("4", Level::Advanced, "adverb", "副词/作用辨析", true),
    ];
    let r = ReportGenerator::new(&catalog).generate(&records);
    assert_eq!(r.overall.total, 4);
    assert_eq!(r.overall.accuracy, 75);
    assert_eq!((r.basic.total, r.basic.correct), (2, 2));
    assert_eq!((r.advanced.total, r.advanced.correct), (2, 1));
    assert_eq!(r.category_analysis["modal"].accuracy, 100);
    assert_eq!(r.category_analysis["preposition"].total, 0);
    assert_eq!(r.category_analysis["adverb"].total, 1);
  }

  #[test]
  fn weak_points_need_rate_or_repeats() {
    let catalog = seed_category_catalog();
    let mut records = vec![
      // 1/2 wrong => 50% => weak
      rec("1", Level::Basic, "modal", "A", false),
      rec("2", Level::Basic, "modal", "A", true),
    ];
    // 1/3 wrong => 33% and only one miss => not weak
    records.push(rec("3", Level::Basic, "particle", "B", false));
    records.push(rec("4", Level::Basic, "particle", "B", true));
    records.push(rec("5", Level::Basic, "particle", "B", true));
    // 2/6 wrong => 33% but two misses => weak
    for i in 0..6 {
      records.push(rec(&format!("c{i}"), Level::Basic, "conjunction", "C", i >= 2));
    }
    let r = ReportGenerator::new(&catalog).generate(&records);
    let tags: Vec<&str> = r.weak_points.iter().map(|w| w.tag.as_str()).collect();
    assert_eq!(tags, vec!["A", "C"]);
    assert_eq!(r.weak_points[0].error_rate, 50);
    assert!(r.weak_points[0].description.contains("A"));
  }

  #[test]
  fn suggestions_use_tag_advice_then_weak_categories() {
    let mut catalog = seed_category_catalog();
    catalog.insert_study_suggestion(
      "助词/的地得辨析",
      Suggestion { title: "区分的地得".into(), content: "定语用的，状语用地，补语用得。".into() },
    );
    let records = vec![
      rec("1", Level::Advanced, "particle", "助词/的地得辨析", false),
      rec("2", Level::Advanced, "particle", "助词/的地得辨析", false),
      rec("3", Level::Basic, "modal", "语气词/特征", false),
      rec("4", Level::Basic, "modal", "语气词/特征", false),
    ];
    let r = ReportGenerator::new(&catalog).generate(&records);
    let titles: Vec<&str> = r.suggestions.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles[0], "区分的地得");
    assert!(titles.contains(&"重点加强助词学习"));
    assert!(titles.contains(&"重点加强语气词学习"));
    assert!(r.suggestions.len() <= MAX_SUGGESTIONS);
  }

  #[test]
  fn generic_suggestion_depends_on_accuracy() {
    let catalog = seed_category_catalog();
    let good: Vec<_> = (0..5).map(|i| rec(&i.to_string(), Level::Basic, "modal", "T", true)).collect();
    let r = ReportGenerator::new(&catalog).generate(&good);
    assert_eq!(r.suggestions[0].title, "保持良好学习状态");
  }

  #[test]
  fn text_export_lists_sections() {
    let catalog = seed_category_catalog();
    let gen = ReportGenerator::new(&catalog);
    let r = gen.generate(&[rec("1", Level::Basic, "modal", "语气词/特征", false)]);
    let text = gen.export_text(&r);
    assert!(text.contains("【基础数据】"));
    assert!(text.contains("语气词：0/1 正确（0%）"));
    assert!(text.contains("错误率 100%"));
    assert!(!text.contains("介词："));
  }
}
