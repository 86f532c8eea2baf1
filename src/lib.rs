//! Lullaby - 睡前故事朗读客户端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: 故事实体、生成参数选择与校验
//! - Narration Context: 分段朗读会话状态机
//!
//! 应用层 (application/):
//! - Ports: 端口定义（StoryApi, TtsEngine, Playback, SpeechSynthesizer, StoryStore, NarrationControls）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//! - Narrator: 远端逐段 / 本地合成两种朗读后端
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 故事/TTS 客户端、外部进程播放器与合成器、模拟实现
//! - Memory: 会话故事内存存储
//! - Persistence: 会话故事文件存储
//! - Events: 控件事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
