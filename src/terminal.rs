//! Text-mode presenter: renders questions, feedback and progress, and parses
//! learner input. Pure string in / string out; `main` does the I/O.

use crate::catalog::CategoryCatalog;
use crate::domain::{Question, QuestionKind};
use crate::engine::ProgressInfo;
use crate::pinyin::to_pinyin_diacritics;
use crate::session::{Celebration, Feedback};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
  /// Option keys in the order typed.
  Answer(Vec<String>),
  Quit,
  Reset,
  Help,
  Invalid(String),
}

pub const HELP: &str = "输入选项字母作答（多选题可输入多个，如 AC），判断题输入 T/F 或 对/错。\n  q 退出并保存进度   r 重置练习   h 帮助";

/// Parse one input line in the context of the question being shown.
pub fn parse_input(q: &Question, line: &str) -> Command {
  let t = line.trim();
  match t.to_ascii_lowercase().as_str() {
    "q" | "quit" | "exit" => return Command::Quit,
    "r" | "reset" => return Command::Reset,
    "h" | "help" | "?" => return Command::Help,
    "" => return Command::Invalid("请先选择答案".into()),
    _ => {}
  }

  if q.kind == QuestionKind::Judgment {
    return match t {
      "T" | "t" | "对" | "√" => Command::Answer(vec!["T".into()]),
      "F" | "f" | "错" | "×" => Command::Answer(vec!["F".into()]),
      _ => Command::Invalid("判断题请输入 T 或 F".into()),
    };
  }

  let mut keys: Vec<String> = Vec::new();
  for ch in t.chars().filter(|c| !c.is_whitespace() && *c != ',' && *c != '，') {
    let key = ch.to_ascii_uppercase().to_string();
    if !q.options.iter().any(|o| o.key == key) {
      return Command::Invalid(format!("没有选项 {}", key));
    }
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
  if keys.is_empty() {
    return Command::Invalid("请先选择答案".into());
  }
  if q.kind == QuestionKind::Single && keys.len() > 1 {
    return Command::Invalid("单选题只能选择一个选项".into());
  }
  Command::Answer(keys)
}

pub fn render_question(
  q: &Question,
  number: usize,
  limit: usize,
  progress: &ProgressInfo,
  catalog: &CategoryCatalog,
  show_pinyin: bool,
) -> String {
  let mut out = String::new();
  out.push_str(&format!(
    "\n第 {}/{} 题 · {} · {} · {}\n",
    number, limit, q.level.display_name(), catalog.name(&q.category), q.kind.display_name()
  ));
  if let Some((n, of)) = progress.upgrade_progress {
    out.push_str(&format!("（连续答对 {}/{}）\n", n, of));
  }
  if let Some(f) = &progress.forced_category {
    out.push_str(&format!("（专项巩固：{}，还剩 {} 题）\n", catalog.name(&f.category), f.remaining));
  }
  out.push_str(&q.stem);
  out.push('\n');
  if show_pinyin {
    out.push_str(&to_pinyin_diacritics(&q.stem));
    out.push('\n');
  }
  match q.kind {
    QuestionKind::Judgment => out.push_str("  T. 正确\n  F. 错误\n"),
    _ => {
      for o in &q.options {
        out.push_str(&format!("  {}. {}\n", o.key, o.text));
      }
    }
  }
  out
}

pub fn render_feedback(fb: &Feedback, catalog: &CategoryCatalog) -> String {
  let mut out = String::new();
  if fb.is_correct {
    out.push_str("✓ 回答正确！\n");
  } else {
    out.push_str(&format!("✗ 回答错误，正确答案：{}\n", fb.correct_answer.join("")));
  }
  if !fb.analysis.is_empty() {
    out.push_str(&format!("解析：{}\n", fb.analysis));
  }
  if fb.outcome.level_changed {
    out.push_str(&format!("难度调整：{}\n", fb.outcome.reason));
    if let Some(c) = &fb.outcome.forced_category {
      out.push_str(&format!("接下来将重点练习{}。\n", catalog.name(c)));
    }
  }
  match fb.celebration {
    Some(Celebration::Minor) => out.push_str("🎉 连续答对 5 题！\n"),
    Some(Celebration::Major) => out.push_str("🏆 连续答对 10 题，太棒了！\n"),
    None => {}
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::bank::{QuestionBank, QuestionRepository};
  use crate::engine::AdaptiveEngine;
  use crate::seeds::seed_category_catalog;

  fn bank() -> QuestionBank {
    QuestionBank::load(None)
  }

  #[test]
  fn parses_choice_keys() {
    let b = bank();
    let multi = b.get("modal_L2_04").unwrap();
    assert_eq!(parse_input(multi, "c, a"), Command::Answer(vec!["C".into(), "A".into()]));
    assert_eq!(parse_input(multi, "AZ"), Command::Invalid("没有选项 Z".into()));
    let single = b.get("modal_L1_003").unwrap();
    assert!(matches!(parse_input(single, "AB"), Command::Invalid(_)));
    assert_eq!(parse_input(single, " b "), Command::Answer(vec!["B".into()]));
    assert_eq!(parse_input(single, "q"), Command::Quit);
  }

  #[test]
  fn parses_judgment_answers() {
    let b = bank();
    let j = b.get("modal_L1_009").unwrap();
    assert_eq!(parse_input(j, "错"), Command::Answer(vec!["F".into()]));
    assert_eq!(parse_input(j, "t"), Command::Answer(vec!["T".into()]));
    assert!(matches!(parse_input(j, "A"), Command::Invalid(_)));
  }

  #[test]
  fn renders_options_and_progress() {
    let b = bank();
    let catalog = seed_category_catalog();
    let q = b.get("modal_L1_003").unwrap();
    let e = AdaptiveEngine::new(&[]);
    let text = render_question(q, 1, 30, &e.progress(), &catalog, false);
    assert!(text.contains("第 1/30 题 · 基础题 · 语气词 · 单选题"));
    assert!(text.contains("  B. 你已经知道结果吧"));
    assert!(text.contains("连续答对 0/3"));
  }
}
