//! HTTP TTS Client - 调用故事服务的 TTS 接口
//!
//! 实现 TtsEnginePort trait，每个片段一次请求
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts
//! Request: {"text": "..."}  (JSON)
//! Response: {"audio_url": "/static/audio/tts_xxx.mp3"}

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{SynthesizeRequest, SynthesizedAudio, TtsEnginePort, TtsError};

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
}

/// TTS 响应体
#[derive(Debug, Deserialize)]
struct TtsHttpResponse {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    base_url: Url,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TtsError::NetworkError(format!("Invalid base URL {}: {}", config.base_url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> Result<Self, TtsError> {
        Self::new(HttpTtsClientConfig::default())
    }

    /// 获取合成 URL
    fn tts_url(&self) -> String {
        self.resolve_url("/api/tts")
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizedAudio, TtsError> {
        let url = self.tts_url();
        tracing::debug!(url = %url, text_len = request.text.len(), "Sending TTS request");

        let response = self
            .client
            .post(&url)
            .json(&TtsHttpRequest {
                text: &request.text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        let body: TtsHttpResponse = response
            .json()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("HTTP {}: {}", status, e)))?;

        if !status.is_success() {
            let message = body
                .error
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(TtsError::ServiceError(message));
        }

        let audio_url = body
            .audio_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| TtsError::InvalidResponse("missing audio_url".to_string()))?;

        tracing::debug!(audio_url = %audio_url, "TTS segment synthesized");
        Ok(SynthesizedAudio {
            audio_url: self.resolve_url(&audio_url),
        })
    }

    fn resolve_url(&self, path: &str) -> String {
        match self.base_url.join(path) {
            Ok(url) => url.to_string(),
            Err(_) => path.to_string(),
        }
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.base_url.clone())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
