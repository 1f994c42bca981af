//! Reading aid: Hanzi in a question stem rendered as tone-marked pinyin.
//!
//! 输入: "语气词“吧”表示（ ）"
//! 输出: "yǔ qì cí“ba”biǎo shì（ ）"
use pinyin::ToPinyin;

/// Per-character conversion, no word segmentation: polyphonic function words
/// such as 了/得/着 get their default reading, so the line is a reading aid and
/// never a hint. Syllables of adjacent Hanzi are space-separated; everything
/// else passes through untouched.
pub fn to_pinyin_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut prev_syllable = false;

    for (ch, reading) in text.chars().zip(text.to_pinyin()) {
        match reading {
            Some(p) => {
                if prev_syllable {
                    out.push(' ');
                }
                out.push_str(p.with_tone());
            }
            None => out.push(ch),
        }
        prev_syllable = reading.is_some();
    }
    out
}
