//! Story Context - Value Objects

use serde::{Deserialize, Serialize};

use super::StoryError;

/// 经典故事 ID（由故事服务分配）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Result<Self, StoryError> {
        let id = id.into();
        let trimmed = id.trim();
        // ID 会拼进 URL 路径
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(StoryError::InvalidStoryId(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 预渲染音频的相对路径
    pub fn prerendered_audio_path(&self) -> String {
        format!("/static/audio/classic_{}.mp3", self.0)
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 主角或听众的名字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, StoryError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(StoryError::MissingName);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 规范化用户输入的关键词：去空白、转小写
pub fn normalize_keyword(raw: &str) -> Option<String> {
    let keyword = raw.trim().to_lowercase();
    if keyword.is_empty() {
        None
    } else {
        Some(keyword)
    }
}

/// 睡眠问题的展示文本
///
/// 自定义原因原样展示；预设问题把 `_` 换成空格并逐词首字母大写。
pub fn sleep_issue_display(sleep_issue: Option<&str>, custom_reason: Option<&str>) -> String {
    if let Some(reason) = custom_reason.filter(|r| !r.is_empty()) {
        return reason.to_string();
    }
    sleep_issue
        .unwrap_or_default()
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
