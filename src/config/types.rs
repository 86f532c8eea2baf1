//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::narrator::{BackendKind, NarratorConfig, SpeechSettings};
use crate::domain::{SegmentConfig, SegmentPolicy, DEFAULT_SENTENCES_PER_SEGMENT};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 故事服务配置（故事生成与 TTS 共用）
    #[serde(default)]
    pub api: ApiConfig,

    /// 朗读配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 本地语音合成配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 音频播放器配置
    #[serde(default)]
    pub player: PlayerConfig,

    /// 会话故事存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// 换算成 narrator 配置
    pub fn narrator_config(&self) -> NarratorConfig {
        NarratorConfig {
            backend: self.narration.backend,
            segment: self.narration.segment_config(),
            prefetch: self.narration.prefetch,
            mid_stream_retries: self.narration.mid_stream_retries,
            speech: self.speech.settings(),
        }
    }
}

/// 故事服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 服务基础 URL
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_api_timeout() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

/// 朗读配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// 后端类型：remote / local
    #[serde(default)]
    pub backend: BackendKind,

    /// 分割策略：paragraph / sentence_pairs
    #[serde(default)]
    pub segmentation: SegmentPolicy,

    /// 句组策略下每个片段的句子数
    #[serde(default = "default_sentences_per_segment")]
    pub sentences_per_segment: usize,

    /// 当前片段开始播放时预取下一段
    #[serde(default)]
    pub prefetch: bool,

    /// 后续片段获取失败时的重试次数
    #[serde(default = "default_mid_stream_retries")]
    pub mid_stream_retries: u32,
}

fn default_sentences_per_segment() -> usize {
    DEFAULT_SENTENCES_PER_SEGMENT
}

fn default_mid_stream_retries() -> u32 {
    1
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            segmentation: SegmentPolicy::default(),
            sentences_per_segment: default_sentences_per_segment(),
            prefetch: false,
            mid_stream_retries: default_mid_stream_retries(),
        }
    }
}

impl NarrationConfig {
    pub fn segment_config(&self) -> SegmentConfig {
        SegmentConfig {
            policy: self.segmentation,
            sentences_per_segment: self.sentences_per_segment,
        }
    }
}

/// 本地语音合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 合成程序
    #[serde(default = "default_speech_command")]
    pub command: String,

    #[serde(default = "default_speech_rate")]
    pub rate: f32,

    #[serde(default = "default_unit")]
    pub pitch: f32,

    #[serde(default = "default_unit")]
    pub volume: f32,

    /// 偏好音色关键字，空字符串表示使用默认音色
    #[serde(default = "default_voice_hint")]
    pub voice_hint: String,
}

fn default_speech_command() -> String {
    "espeak-ng".to_string()
}

fn default_speech_rate() -> f32 {
    0.8
}

fn default_unit() -> f32 {
    1.0
}

fn default_voice_hint() -> String {
    "female".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: default_speech_command(),
            rate: default_speech_rate(),
            pitch: default_unit(),
            volume: default_unit(),
            voice_hint: default_voice_hint(),
        }
    }
}

impl SpeechConfig {
    pub fn settings(&self) -> SpeechSettings {
        let hint = self.voice_hint.trim();
        SpeechSettings {
            rate: self.rate,
            pitch: self.pitch,
            volume: self.volume,
            voice_hint: (!hint.is_empty()).then(|| hint.to_string()),
        }
    }
}

/// 音频播放器配置
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    /// 播放程序
    #[serde(default = "default_player_command")]
    pub command: String,

    /// 音频来源之前的参数
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

fn default_player_command() -> String {
    "ffplay".to_string()
}

fn default_player_args() -> Vec<String> {
    ["-nodisp", "-autoexit", "-loglevel", "error"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: default_player_args(),
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// 仅在进程内保留
    Memory,
    /// 每个故事一个 JSON 文件
    #[default]
    File,
}

/// 会话故事存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,

    /// 文件存储目录
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
}

fn default_session_dir() -> PathBuf {
    PathBuf::from("data/session")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            session_dir: default_session_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrator_config_mapping() {
        let mut config = AppConfig::default();
        config.narration.segmentation = SegmentPolicy::SentencePairs;
        config.narration.sentences_per_segment = 3;
        config.speech.voice_hint = "  ".into();

        let narrator = config.narrator_config();
        assert_eq!(narrator.backend, BackendKind::Remote);
        assert_eq!(narrator.segment.policy, SegmentPolicy::SentencePairs);
        assert_eq!(narrator.segment.sentences_per_segment, 3);
        assert_eq!(narrator.mid_stream_retries, 1);
        assert!(!narrator.prefetch);
        assert_eq!(narrator.speech.voice_hint, None);
    }

    #[test]
    fn test_speech_defaults() {
        let settings = SpeechConfig::default().settings();
        assert_eq!(settings, SpeechSettings::default());
    }
}
