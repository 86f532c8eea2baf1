//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：经典故事与会话故事恢复

mod story_queries;

pub mod handlers;

pub use story_queries::*;
