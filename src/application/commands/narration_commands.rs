//! Narration Commands - 朗读控制

use crate::domain::story::{ClassicStory, GeneratedStory};

/// 朗读的故事来源
#[derive(Debug, Clone)]
pub enum ReadSource {
    /// 刚生成的故事，逐段远端合成
    Generated(GeneratedStory),
    /// 经典故事，优先使用预渲染音频
    Classic(ClassicStory),
    /// 任意文本
    Text(String),
}

/// 开始朗读
#[derive(Debug, Clone)]
pub struct ReadStory {
    pub source: ReadSource,
}

/// 暂停 / 继续 / 取消
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlNarration {
    Pause,
    Resume,
    Cancel,
}
