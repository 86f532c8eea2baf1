//! HTTP Story Client - 调用故事服务
//!
//! 实现 StoryApiPort trait
//!
//! 外部 API:
//! POST {base_url}/api/generate-story        {"keywords": [...], "childName": "..."}
//! POST {base_url}/api/generate-adult-story  {"sleepIssue", "customSleepReason", "memories", "customMemory", "adultName"}
//! GET  {base_url}/api/stories
//! GET  {base_url}/api/story/{id}
//!
//! 非 2xx 响应体为 {"error": "..."}

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{StoryApiError, StoryApiPort};
use crate::domain::story::{
    AdultStory, AdultStoryRequest, ClassicStory, PersonalisedStory, PersonalisedStoryRequest,
    StoryId,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStoryBody<'a> {
    keywords: &'a [String],
    child_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateAdultStoryBody<'a> {
    sleep_issue: &'a str,
    custom_sleep_reason: &'a str,
    memories: &'a [String],
    custom_memory: &'a str,
    adult_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP 故事客户端配置
#[derive(Debug, Clone)]
pub struct HttpStoryClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒），故事生成较慢
    pub timeout_secs: u64,
}

impl Default for HttpStoryClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpStoryClientConfig {
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

/// HTTP 故事客户端
pub struct HttpStoryClient {
    client: Client,
    base_url: Url,
}

impl HttpStoryClient {
    pub fn new(config: HttpStoryClientConfig) -> Result<Self, StoryApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            StoryApiError::NetworkError(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoryApiError::NetworkError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, StoryApiError> {
        self.base_url
            .join(path)
            .map_err(|e| StoryApiError::NetworkError(format!("Invalid path {}: {}", path, e)))
    }

    /// 发送请求并解析 JSON；非 2xx 时提取 {error}
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, StoryApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoryApiError::Timeout
            } else if e.is_connect() {
                StoryApiError::NetworkError(format!("Cannot connect to story service: {}", e))
            } else {
                StoryApiError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("HTTP {}", status));

            if status == StatusCode::NOT_FOUND {
                return Err(StoryApiError::NotFound(resource.to_string()));
            }
            return Err(StoryApiError::ServiceError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoryApiError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl StoryApiPort for HttpStoryClient {
    async fn generate_story(
        &self,
        request: &PersonalisedStoryRequest,
    ) -> Result<PersonalisedStory, StoryApiError> {
        let url = self.url("/api/generate-story")?;
        tracing::debug!(url = %url, keywords = request.keywords.len(), "Requesting story generation");

        let body = GenerateStoryBody {
            keywords: &request.keywords,
            child_name: request.child_name.as_str(),
        };
        self.send_json(self.client.post(url).json(&body), "generated story")
            .await
    }

    async fn generate_adult_story(
        &self,
        request: &AdultStoryRequest,
    ) -> Result<AdultStory, StoryApiError> {
        let url = self.url("/api/generate-adult-story")?;
        tracing::debug!(url = %url, memories = request.memories.len(), "Requesting adult story generation");

        let body = GenerateAdultStoryBody {
            sleep_issue: request.sleep_issue.as_deref().unwrap_or_default(),
            custom_sleep_reason: request.custom_sleep_reason.as_deref().unwrap_or_default(),
            memories: &request.memories,
            custom_memory: request.custom_memory.as_deref().unwrap_or_default(),
            adult_name: request.adult_name.as_str(),
        };
        self.send_json(self.client.post(url).json(&body), "generated story")
            .await
    }

    async fn list_stories(&self) -> Result<Vec<ClassicStory>, StoryApiError> {
        let url = self.url("/api/stories")?;
        let stories: Vec<ClassicStory> = self.send_json(self.client.get(url), "stories").await?;
        tracing::debug!(count = stories.len(), "Classic stories fetched");
        Ok(stories)
    }

    async fn get_story(&self, id: &StoryId) -> Result<ClassicStory, StoryApiError> {
        let url = self.url(&format!("/api/story/{}", id))?;
        self.send_json(self.client.get(url), id.as_str()).await
    }
}
