//! Built-in question bank and category catalog.
//!
//! Guarantees the trainer is usable without an external bank file. Entries from
//! `TRAINER_CONFIG_PATH` are merged on top (see `bank`).

use crate::catalog::{CategoryCatalog, CategoryInfo};
use crate::domain::{AnswerOption, Level, Question, QuestionKind};

#[allow(clippy::too_many_arguments)]
fn q(
  id: &str,
  kind: QuestionKind,
  level: Level,
  category: &str,
  tag: &str,
  stem: &str,
  options: &[(&str, &str)],
  answer: &[&str],
  analysis: &str,
) -> Question {
  Question {
    id: id.into(),
    kind,
    level,
    category: category.into(),
    tag: tag.into(),
    stem: stem.into(),
    options: options
      .iter()
      .map(|(k, t)| AnswerOption { key: (*k).into(), text: (*t).into() })
      .collect(),
    answer: answer.iter().map(|a| (*a).into()).collect(),
    analysis: analysis.into(),
    fixed: false,
  }
}

fn fixed(mut question: Question) -> Question {
  question.fixed = true;
  question
}

pub fn seed_questions() -> Vec<Question> {
  use Level::{Advanced, Basic};
  use QuestionKind::{Judgment, Multiple, Single};

  vec![
    // 介词
    q("preposition_L1_001", Single, Basic, "preposition", "介词/词类识别",
      "句子\"他为祖国的发展奉献了毕生精力\"中，\"为\"的词类是（ ）",
      &[("A", "介词"), ("B", "连词"), ("C", "副词"), ("D", "语气词")], &["A"],
      "\"为\"后接名词性短语，构成介词短语，表示对象或目的，是介词。"),
    q("preposition_L1_002", Single, Basic, "preposition", "介词/作用辨析",
      "句子\"我们从清晨等到日暮\"中，介词\"从\"的作用是（ ）",
      &[("A", "引出处所"), ("B", "引出时间"), ("C", "引出对象"), ("D", "引出原因")], &["B"],
      "\"从\"后接时间名词\"清晨\"，表示动作开始的时间。"),
    q("preposition_L1_003", Single, Basic, "preposition", "介词/作用辨析",
      "句子\"大家对这个决策有不同看法\"中，介词\"对\"的作用是（ ）",
      &[("A", "引出对象"), ("B", "引出时间"), ("C", "引出原因"), ("D", "引出凭借")], &["A"],
      "\"对\"用于引出动作或态度的对象。"),
    q("preposition_L1_004", Single, Basic, "preposition", "介词/句法功能",
      "介词短语的核心语法功能是（ ）",
      &[("A", "充当主语"), ("B", "充当谓语"), ("C", "修饰谓词性词语"), ("D", "充当宾语")], &["C"],
      "介词短语不能独立作主语或谓语，其核心功能是修饰谓词性词语。"),
    q("preposition_L2_001", Single, Advanced, "preposition", "介词/词类辨析",
      "下列句子中，\"从\"作介词的是（ ）",
      &[("A", "他从不迟到"), ("B", "他从北京回来"), ("C", "他从来没见过"), ("D", "从前这里很热闹")], &["B"],
      "\"从北京回来\"中，\"从\"后接名词性成分，作介词；其余为副词或时间名词。"),
    q("preposition_L2_003", Multiple, Advanced, "preposition", "介词/词类辨析",
      "下列句子中，\"到\"用作介词的是（ ）",
      &[("A", "他已经到了上海"), ("B", "到上海去出差"), ("C", "时间到了"), ("D", "到那时，我们已经毕业了")], &["B", "D"],
      "\"到上海去\"中，\"到\"不能带动态助词，作介词；D 中\"到\"引出时间名词；A、C 为动词。"),
    // 助词
    q("particle_L1_001", Single, Basic, "particle", "助词/词类识别",
      "句子“他刚才和我说会议已经结束了”中，“了”的词类是（ ）",
      &[("A", "结构助词"), ("B", "动态助词"), ("C", "副词"), ("D", "语气词")], &["B"],
      "“了”附着在动词“结束”后，表示动作实现，是动态助词。"),
    q("particle_L1_003", Single, Basic, "particle", "助词/作用辨析",
      "句子“她把材料整理得很清楚”中，“得”的作用是（ ）",
      &[("A", "引出定语"), ("B", "标记状语"), ("C", "引出补语"), ("D", "表示完成")], &["C"],
      "“得”引出对动作结果的补充说明，是补语标记。"),
    q("particle_L1_004", Single, Basic, "particle", "助词/作用辨析",
      "下列句子中，“着”表示状态持续的是（ ）",
      &[("A", "孩子们唱着歌走进教室"), ("B", "教室的灯还亮着"), ("C", "他弯着腰搬箱子"), ("D", "她沿着河边散步")], &["B"],
      "“亮着”表示状态的持续；A、C 表示伴随方式，D 中“沿着”是介词。"),
    q("particle_L2_001", Multiple, Advanced, "particle", "助词/的地得辨析",
      "下列句子中，“的、地、得”使用正确的是（ ）",
      &[("A", "他高兴地跳了起来"), ("B", "她跑得很快"), ("C", "认真的完成作业"), ("D", "我的书包")], &["A", "B", "D"],
      "状语后用“地”，补语前用“得”，定语后用“的”；C 应为“认真地完成作业”。"),
    q("particle_L2_002", Single, Advanced, "particle", "助词/动态助词",
      "句子“我去过长城”中，“过”表示（ ）",
      &[("A", "动作正在进行"), ("B", "动作曾经发生"), ("C", "状态持续"), ("D", "动作即将发生")], &["B"],
      "动态助词“过”表示曾经有过某种经历。"),
    // 连词
    fixed(q("conjunction_L1_027", Judgment, Basic, "conjunction", "连词/特征",
      "连词通常不修饰动词或形容词。", &[], &["T"],
      "修饰功能主要由副词承担，连词只连接。")),
    q("conjunction_L1_001", Single, Basic, "conjunction", "连词/词类识别",
      "下列词语中，属于连词的是（ ）",
      &[("A", "因为"), ("B", "已经"), ("C", "正在"), ("D", "非常")], &["A"],
      "\"因为\"起连接作用，表示原因，是连词。"),
    q("conjunction_L1_002", Single, Basic, "conjunction", "连词/作用辨析",
      "句子\"我想去，但是时间不够\"中，\"但是\"表示（ ）",
      &[("A", "并列关系"), ("B", "选择关系"), ("C", "转折关系"), ("D", "因果关系")], &["C"],
      "\"但是\"表示前后意思相反或相对，表转折。"),
    q("conjunction_L1_028", Single, Basic, "conjunction", "连词/作用辨析",
      "\"除非下雨，否则比赛照常进行\"中，\"除非……否则……\"表示（ ）",
      &[("A", "选择"), ("B", "条件"), ("C", "并列"), ("D", "转折")], &["B"],
      "\"除非……否则……\"表示必要条件关系。"),
    q("conjunction_L2_101", Single, Advanced, "conjunction", "连词/作用辨析",
      "下列句子中，\"和\"用作连词的是（ ）",
      &[("A", "我和小明是同学"), ("B", "他和我商量这件事"), ("C", "他和我对答案"), ("D", "他和过老师打招呼")], &["A"],
      "A 中\"和\"连接两个名词，表示并列，是连词。"),
    // 语气词
    fixed(q("modal_L1_005", Judgment, Basic, "modal", "语气词/特征",
      "语气词一般位于句末，用来表达说话人的态度或语气。（ ）", &[], &["T"],
      "语气词主要附着于句末或句中，表达语气而不改变句子语义。")),
    q("modal_L1_003", Single, Basic, "modal", "语气词/作用辨析",
      "下列句子中，“吧”表示揣测语气的是（ ）",
      &[("A", "我们走吧"), ("B", "你已经知道结果吧"), ("C", "别说话吧"), ("D", "休息一下吧")], &["B"],
      "B 中“吧”用于判断性陈述，表示说话人的推测。"),
    q("modal_L1_009", Judgment, Basic, "modal", "语气词/特征",
      "语气词会改变句子的基本语义内容。（ ）", &[], &["F"],
      "语气词只影响语气类型，不改变句子语义。"),
    q("modal_L2_04", Multiple, Advanced, "modal", "语气词/作用辨析",
      "下列句子中，“啊”主要用于加强感叹语气的是（ ）",
      &[("A", "这么巧啊！你也在这里"), ("B", "你啊，就是太急了"), ("C", "这道题好难啊！我得再想想"), ("D", "原来是你啊，我还以为认错人了")],
      &["A", "C", "D"],
      "A、C、D 的“啊”加强感叹（惊讶/感慨）；B 多为句中停顿、带评价。"),
  ]
}

/// The four known categories with learner-facing names and category-level advice.
pub fn seed_category_catalog() -> CategoryCatalog {
  let mut catalog = CategoryCatalog::new();
  let entries = [
    ("preposition", "介词",
      "介词用于表示时间、处所、方向、对象等关系。建议重点学习常用介词\"在、从、向、对、把、被\"的用法差异，通过造句练习加深理解。"),
    ("particle", "助词",
      "助词分为结构助词、动态助词和语气助词。建议重点掌握\"的、地、得\"的区分规则，以及\"了、着、过\"的时态表达功能。"),
    ("conjunction", "连词",
      "连词用于连接词、短语或句子。建议系统学习关联词的搭配规则，区分表示并列、递进、转折、因果、条件等不同关系的关联词。"),
    ("modal", "语气词",
      "语气词表达说话人的态度和情感。建议通过朗读练习培养语感，注意\"吗、呢、吧、啊\"等语气词在不同语境中的使用。"),
  ];
  for (id, name, advice) in entries {
    catalog.insert_category(id, CategoryInfo { name: name.into(), advice: advice.into() });
  }
  catalog
}
