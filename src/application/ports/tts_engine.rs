//! TTS Engine Port - 远端语音合成抽象
//!
//! 定义逐段合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesizeRequest {
    /// 要合成的片段文本
    pub text: String,
}

impl SynthesizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 合成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// 可播放音频的地址（已解析为绝对 URL）
    pub audio_url: String,
}

/// TTS Engine Port
///
/// 外部 TTS 服务的抽象接口：每次调用合成一个片段
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成一个片段，返回音频地址
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizedAudio, TtsError>;

    /// 把服务端返回的相对路径解析为可直接播放的地址
    fn resolve_url(&self, path: &str) -> String {
        path.to_string()
    }

    /// 检查 TTS 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
