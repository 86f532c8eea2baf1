//! Fake TTS Client - 离线模式与测试用的 TTS 客户端
//!
//! 不调用任何服务，按片段顺序返回 `fake://segment/<n>` 地址

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{SynthesizeRequest, SynthesizedAudio, TtsEnginePort, TtsError};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 模拟合成延迟
    pub latency: Duration,
    /// 文本包含该子串时返回服务错误
    pub fail_on: Option<String>,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(200),
            fail_on: None,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    calls: AtomicUsize,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(latency_ms = config.latency.as_millis() as u64, "FakeTtsClient initialized");
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 已收到的合成请求数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizedAudio, TtsError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(text_len = request.text.len(), call = n, "FakeTtsClient: synthesizing");

        // 模拟合成延迟
        tokio::time::sleep(self.config.latency).await;

        if let Some(marker) = &self.config.fail_on {
            if request.text.contains(marker.as_str()) {
                return Err(TtsError::ServiceError("Failed to generate audio".to_string()));
            }
        }

        Ok(SynthesizedAudio {
            audio_url: format!("fake://segment/{}", n),
        })
    }
}
