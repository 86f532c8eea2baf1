//! Memory Layer - In-Memory State Management
//!
//! 会话级故事存储的内存实现

mod story_store;

pub use story_store::InMemoryStoryStore;
