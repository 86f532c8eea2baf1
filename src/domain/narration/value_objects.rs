//! Narration Context - Value Objects

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// 朗读会话唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// 播放句柄标识
///
/// 进程内全局递增，旧会话的迟到事件不会与新会话的句柄撞号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HandleId(u64);

impl HandleId {
    pub fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// 片段音频的来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioRequest {
    /// 调用远端 TTS 合成该文本
    Synthesize(String),
    /// 直接播放预渲染的音频（路径或 URL）
    Prerendered(String),
}

impl AudioRequest {
    pub fn is_prerendered(&self) -> bool {
        matches!(self, Self::Prerendered(_))
    }
}

/// 朗读片段：一次合成、一次播放的文本单位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub text: String,
    pub audio: AudioRequest,
}

/// 朗读请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationRequest {
    /// 由远端 TTS 逐段合成
    Text(String),
    /// 整篇使用预渲染音频
    Prerendered { text: String, audio_path: String },
}

impl NarrationRequest {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Prerendered { text, .. } => text,
        }
    }
}
