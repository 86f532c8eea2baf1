//! Story API Adapter - 故事服务 HTTP 客户端

mod http_story_client;

pub use http_story_client::*;
