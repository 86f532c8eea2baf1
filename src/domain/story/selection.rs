//! Story Context - 生成参数的选择状态
//!
//! 关键词、睡眠问题和记忆的选择/取消规则

use super::{
    normalize_keyword, AdultStory, AdultStoryRequest, PersonName, PersonalisedStory,
    PersonalisedStoryRequest, StoryError,
};

/// 自定义文本（睡眠原因、个人记忆）必须超过的字符数
pub const MIN_CUSTOM_TEXT_CHARS: usize = 10;

/// 已选标签的最大展示字符数
pub const LABEL_MAX_CHARS: usize = 50;

/// 截断标签文本，超出部分以 `...` 结尾
pub fn truncate_label(text: &str) -> String {
    if text.chars().count() > LABEL_MAX_CHARS {
        let head: String = text.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn validate_custom_text(raw: &str, what: &'static str) -> Result<String, StoryError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(StoryError::EmptyCustomText(what));
    }
    if text.chars().count() <= MIN_CUSTOM_TEXT_CHARS {
        return Err(StoryError::CustomTextTooShort {
            what,
            min: MIN_CUSTOM_TEXT_CHARS,
        });
    }
    Ok(text.to_string())
}

/// 个性化故事的关键词选择
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSelection {
    keywords: Vec<String>,
}

impl KeywordSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已保存的故事恢复选择
    pub fn from_story(story: &PersonalisedStory) -> Self {
        let mut selection = Self::new();
        for keyword in &story.keywords {
            selection.add_custom(keyword);
        }
        selection
    }

    /// 切换预设关键词，返回切换后是否处于选中状态
    pub fn toggle(&mut self, keyword: &str) -> bool {
        if let Some(index) = self.keywords.iter().position(|k| k == keyword) {
            self.keywords.remove(index);
            false
        } else {
            self.keywords.push(keyword.to_string());
            true
        }
    }

    /// 添加自定义关键词；空白或重复时忽略并返回 false
    pub fn add_custom(&mut self, raw: &str) -> bool {
        match normalize_keyword(raw) {
            Some(keyword) if !self.keywords.contains(&keyword) => {
                self.keywords.push(keyword);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| k != keyword);
        self.keywords.len() != before
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn can_generate(&self) -> bool {
        !self.keywords.is_empty()
    }

    pub fn clear(&mut self) {
        self.keywords.clear();
    }

    pub fn to_request(&self, child_name: &str) -> Result<PersonalisedStoryRequest, StoryError> {
        if !self.can_generate() {
            return Err(StoryError::NoKeywords);
        }
        Ok(PersonalisedStoryRequest {
            keywords: self.keywords.clone(),
            child_name: PersonName::new(child_name)?,
        })
    }
}

/// 成人故事的睡眠问题与记忆选择
///
/// 预设睡眠问题与自定义原因互斥，后设置的覆盖先设置的。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SleepStorySelection {
    sleep_issue: Option<String>,
    custom_sleep_reason: Option<String>,
    memories: Vec<String>,
    custom_memory: Option<String>,
}

impl SleepStorySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_story(story: &AdultStory) -> Self {
        Self {
            sleep_issue: story.sleep_issue.clone().filter(|s| !s.is_empty()),
            custom_sleep_reason: Some(story.custom_sleep_reason.clone()).filter(|s| !s.is_empty()),
            memories: story.memories.clone(),
            custom_memory: Some(story.custom_memory.clone()).filter(|s| !s.is_empty()),
        }
    }

    pub fn select_sleep_issue(&mut self, issue: &str) {
        self.sleep_issue = Some(issue.to_string());
        self.custom_sleep_reason = None;
    }

    pub fn set_custom_sleep_reason(&mut self, raw: &str) -> Result<(), StoryError> {
        let reason = validate_custom_text(raw, "reason")?;
        self.custom_sleep_reason = Some(reason);
        self.sleep_issue = None;
        Ok(())
    }

    pub fn clear_custom_sleep_reason(&mut self) {
        self.custom_sleep_reason = None;
    }

    /// 切换怀旧记忆，返回切换后是否处于选中状态
    pub fn toggle_memory(&mut self, memory: &str) -> bool {
        if let Some(index) = self.memories.iter().position(|m| m == memory) {
            self.memories.remove(index);
            false
        } else {
            self.memories.push(memory.to_string());
            true
        }
    }

    pub fn set_custom_memory(&mut self, raw: &str) -> Result<(), StoryError> {
        self.custom_memory = Some(validate_custom_text(raw, "memory")?);
        Ok(())
    }

    pub fn clear_custom_memory(&mut self) {
        self.custom_memory = None;
    }

    pub fn sleep_issue(&self) -> Option<&str> {
        self.sleep_issue.as_deref()
    }

    pub fn custom_sleep_reason(&self) -> Option<&str> {
        self.custom_sleep_reason.as_deref()
    }

    pub fn memories(&self) -> &[String] {
        &self.memories
    }

    pub fn custom_memory(&self) -> Option<&str> {
        self.custom_memory.as_deref()
    }

    pub fn can_generate(&self) -> bool {
        self.sleep_issue.is_some() || self.custom_sleep_reason.is_some()
    }

    /// 已选元素的展示标签
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if let Some(issue) = &self.sleep_issue {
            labels.push(issue.clone());
        }
        if let Some(reason) = &self.custom_sleep_reason {
            labels.push(format!("Sleep Issue: {}", truncate_label(reason)));
        }
        labels.extend(self.memories.iter().cloned());
        if let Some(memory) = &self.custom_memory {
            labels.push(format!("Personal Memory: {}", truncate_label(memory)));
        }
        labels
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_request(&self, adult_name: &str) -> Result<AdultStoryRequest, StoryError> {
        if !self.can_generate() {
            return Err(StoryError::NoSleepIssue);
        }
        Ok(AdultStoryRequest {
            sleep_issue: self.sleep_issue.clone(),
            custom_sleep_reason: self.custom_sleep_reason.clone(),
            memories: self.memories.clone(),
            custom_memory: self.custom_memory.clone(),
            adult_name: PersonName::new(adult_name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_toggle() {
        let mut selection = KeywordSelection::new();
        assert!(selection.toggle("dragons"));
        assert!(selection.toggle("moon"));
        assert!(!selection.toggle("dragons"));
        assert_eq!(selection.keywords(), &["moon".to_string()]);
    }

    #[test]
    fn test_custom_keyword_normalized_and_deduplicated() {
        let mut selection = KeywordSelection::new();
        assert!(selection.add_custom("  Unicorn "));
        assert!(!selection.add_custom("unicorn"));
        assert!(!selection.add_custom("   "));
        assert_eq!(selection.keywords(), &["unicorn".to_string()]);
        assert!(selection.remove("unicorn"));
        assert!(!selection.remove("unicorn"));
    }

    #[test]
    fn test_keyword_request_validation() {
        let mut selection = KeywordSelection::new();
        assert_eq!(selection.to_request("Mia").unwrap_err(), StoryError::NoKeywords);
        selection.toggle("stars");
        assert_eq!(selection.to_request(" ").unwrap_err(), StoryError::MissingName);
        let request = selection.to_request("Mia").unwrap();
        assert_eq!(request.child_name.as_str(), "Mia");
        assert_eq!(request.keywords, vec!["stars"]);
    }

    #[test]
    fn test_sleep_issue_and_custom_reason_are_exclusive() {
        let mut selection = SleepStorySelection::new();
        selection.select_sleep_issue("anxiety");
        selection
            .set_custom_sleep_reason("I keep replaying the day in my head")
            .unwrap();
        assert!(selection.sleep_issue().is_none());
        assert!(selection.custom_sleep_reason().is_some());

        selection.select_sleep_issue("insomnia");
        assert_eq!(selection.sleep_issue(), Some("insomnia"));
        assert!(selection.custom_sleep_reason().is_none());
    }

    #[test]
    fn test_custom_text_length_rules() {
        let mut selection = SleepStorySelection::new();
        assert_eq!(
            selection.set_custom_sleep_reason("   ").unwrap_err(),
            StoryError::EmptyCustomText("reason")
        );
        // 恰好 10 个字符不够
        assert_eq!(
            selection.set_custom_memory("0123456789").unwrap_err(),
            StoryError::CustomTextTooShort { what: "memory", min: 10 }
        );
        assert!(selection.set_custom_memory("01234567890").is_ok());
    }

    #[test]
    fn test_adult_request_requires_issue_and_name() {
        let mut selection = SleepStorySelection::new();
        assert_eq!(selection.to_request("Sam").unwrap_err(), StoryError::NoSleepIssue);
        selection.select_sleep_issue("stress");
        selection.toggle_memory("summer_holidays");
        assert_eq!(selection.to_request("").unwrap_err(), StoryError::MissingName);

        let request = selection.to_request("Sam").unwrap();
        assert_eq!(request.sleep_issue.as_deref(), Some("stress"));
        assert_eq!(request.memories, vec!["summer_holidays"]);
        assert!(request.custom_memory.is_none());
    }

    #[test]
    fn test_labels_truncate_custom_text() {
        let mut selection = SleepStorySelection::new();
        selection.set_custom_sleep_reason(&"a".repeat(60)).unwrap();
        let labels = selection.labels();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0], format!("Sleep Issue: {}...", "a".repeat(50)));
    }

    #[test]
    fn test_restore_from_story() {
        let story = AdultStory {
            title: "t".into(),
            content: "c".into(),
            sleep_issue: Some(String::new()),
            custom_sleep_reason: "Work deadlines keep me up".into(),
            sleep_issue_display: "Work deadlines keep me up".into(),
            memories: vec!["grandmas_kitchen".into()],
            custom_memory: String::new(),
            adult_name: "Sam".into(),
            timestamp: None,
            story_type: None,
            temporary: true,
        };
        let selection = SleepStorySelection::from_story(&story);
        assert!(selection.sleep_issue().is_none());
        assert_eq!(selection.custom_sleep_reason(), Some("Work deadlines keep me up"));
        assert!(selection.custom_memory().is_none());
        assert!(selection.can_generate());
    }
}
