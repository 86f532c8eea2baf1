//! 文本分割器
//!
//! 把故事正文切成朗读片段，支持两种策略：
//! - 段落：按空行分割
//! - 句组：按句末标点分句，再按固定句数合并

use serde::Deserialize;

/// 默认每个片段包含的句子数
pub const DEFAULT_SENTENCES_PER_SEGMENT: usize = 2;

/// 分割策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPolicy {
    /// 按空行分段（片段更自然，首段延迟更高）
    #[default]
    Paragraph,
    /// 按句分割并成组（首段更短，出声更快）
    SentencePairs,
}

impl SegmentPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::SentencePairs => "sentence_pairs",
        }
    }
}

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    pub policy: SegmentPolicy,
    /// 句组策略下每个片段的句子数
    pub sentences_per_segment: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            policy: SegmentPolicy::default(),
            sentences_per_segment: DEFAULT_SENTENCES_PER_SEGMENT,
        }
    }
}

impl SegmentConfig {
    pub fn paragraphs() -> Self {
        Self {
            policy: SegmentPolicy::Paragraph,
            ..Default::default()
        }
    }

    pub fn sentence_groups(per_segment: usize) -> Self {
        Self {
            policy: SegmentPolicy::SentencePairs,
            sentences_per_segment: per_segment.max(1),
        }
    }
}

/// 检查是否为句末标点
#[inline]
fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!')
}

/// 句末标点之后可以跟随的闭合符号
#[inline]
fn is_closing_mark(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '\u{201D}' | '\u{2019}' | ')' | '」')
}

/// 检查片段是否只包含引号或空白（应该被合并）
#[inline]
fn is_trivial_segment(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(c, '"' | '\u{201C}' | '\u{201D}' | '\'' | '\u{2018}' | '\u{2019}')
            || c.is_whitespace()
    })
}

/// 按空行分段
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n").trim().to_string());
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs
}

/// 按句末标点分句
///
/// 连续的标点（如 `...`、`?!`）和紧随的闭合引号归入同一句；
/// 标点后必须是空白或文本结尾才分句，避免切开 `3.14` 这类内容。
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);
        i += 1;

        if !is_sentence_terminator(ch) {
            continue;
        }

        while i < chars.len() && (is_sentence_terminator(chars[i]) || is_closing_mark(chars[i])) {
            current.push(chars[i]);
            i += 1;
        }

        let at_boundary = i >= chars.len() || chars[i].is_whitespace() || !ch.is_ascii();
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }

    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    // 只有引号的片段合并到前一句
    if is_trivial_segment(trimmed) {
        if let Some(last) = sentences.last_mut() {
            last.push_str(trimmed);
            return;
        }
    }
    sentences.push(trimmed.to_string());
}

/// 把句子按固定数量合并成片段
fn group_sentences(sentences: Vec<String>, per_segment: usize) -> Vec<String> {
    sentences
        .chunks(per_segment.max(1))
        .map(|group| group.join(" "))
        .collect()
}

/// 对文本进行分段
///
/// 返回的片段按原文顺序排列，均已去除首尾空白且非空。
/// 空文本返回空列表。
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<String> {
    match config.policy {
        SegmentPolicy::Paragraph => split_paragraphs(text),
        SegmentPolicy::SentencePairs => {
            group_sentences(split_sentences(text), config.sentences_per_segment)
        }
    }
}

/// 使用默认配置分段（便捷方法）
pub fn segment_text_default(text: &str) -> Vec<String> {
    segment_text(text, &SegmentConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_sentence_pairs_example() {
        let config = SegmentConfig::sentence_groups(2);
        let segments = segment_text("Sentence one. Sentence two. Sentence three.", &config);
        assert_eq!(segments, vec!["Sentence one. Sentence two.", "Sentence three."]);
    }

    #[test]
    fn test_paragraph_split_on_blank_lines() {
        let text = "Once upon a time.\nThere was a hen.\n\n  \nShe found seeds.\n\n\nThe end.";
        let segments = segment_text(text, &SegmentConfig::paragraphs());
        assert_eq!(
            segments,
            vec![
                "Once upon a time.\nThere was a hen.",
                "She found seeds.",
                "The end."
            ]
        );
    }

    #[test]
    fn test_paragraph_handles_crlf() {
        let segments = segment_text("First.\r\n\r\nSecond.", &SegmentConfig::paragraphs());
        assert_eq!(segments, vec!["First.", "Second."]);
    }

    #[test]
    fn test_empty_text_produces_no_segments() {
        assert!(segment_text("", &SegmentConfig::paragraphs()).is_empty());
        assert!(segment_text("  \n\n \t", &SegmentConfig::sentence_groups(2)).is_empty());
    }

    #[test]
    fn test_closing_quote_stays_with_sentence() {
        let config = SegmentConfig::sentence_groups(1);
        let segments = segment_text(r#""Not I," said the cat. The hen said "I will." Done"#, &config);
        assert_eq!(
            segments,
            vec![r#""Not I," said the cat."#, r#"The hen said "I will.""#, "Done"]
        );
    }

    #[test]
    fn test_decimal_point_does_not_split() {
        let config = SegmentConfig::sentence_groups(1);
        let segments = segment_text("Pi is 3.14 exactly. Or so.", &config);
        assert_eq!(segments, vec!["Pi is 3.14 exactly.", "Or so."]);
    }

    #[test]
    fn test_ellipsis_and_mixed_terminators() {
        let config = SegmentConfig::sentence_groups(1);
        let segments = segment_text("Wait... Really?! Yes", &config);
        assert_eq!(segments, vec!["Wait...", "Really?!", "Yes"]);
    }

    #[test]
    fn test_cjk_terminators_split_without_space() {
        let config = SegmentConfig::sentence_groups(1);
        let segments = segment_text("第一句。第二句！", &config);
        assert_eq!(segments, vec!["第一句。", "第二句！"]);
    }

    #[test]
    fn test_trivial_segment_detection() {
        assert!(is_trivial_segment("\""));
        assert!(is_trivial_segment("\u{201D} "));
        assert!(!is_trivial_segment("content"));
    }

    #[test]
    fn test_segments_reconstruct_content() {
        let text = "The hare ran fast.  He slept under a tree!\n\nThe tortoise kept walking. \
                    Slow and steady wins the race? Indeed\n\nThe end.";
        for config in [
            SegmentConfig::paragraphs(),
            SegmentConfig::sentence_groups(1),
            SegmentConfig::sentence_groups(2),
            SegmentConfig::sentence_groups(3),
        ] {
            let segments = segment_text(text, &config);
            assert!(segments.iter().all(|s| !s.is_empty() && s.trim() == s));
            assert_eq!(words(&segments.join(" ")), words(text), "policy {:?}", config);
        }
    }

    #[test]
    fn test_default_config_is_paragraph() {
        let segments = segment_text_default("One. Two.\n\nThree.");
        assert_eq!(segments, vec!["One. Two.", "Three."]);
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: SegmentPolicy = serde_json::from_str("\"sentence_pairs\"").unwrap();
        assert_eq!(policy, SegmentPolicy::SentencePairs);
        assert_eq!(policy.as_str(), "sentence_pairs");
    }
}
