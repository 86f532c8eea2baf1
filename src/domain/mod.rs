//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Story Context: 故事实体与生成参数
//! - Narration Context: 朗读会话状态机

pub mod narration;
pub mod story;

// 共享的文本分割器
mod text_segmenter;

pub use text_segmenter::{
    segment_text, segment_text_default, SegmentConfig, SegmentPolicy, DEFAULT_SENTENCES_PER_SEGMENT,
};
