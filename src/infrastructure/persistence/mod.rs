//! Persistence Layer - 数据持久化
//!
//! 会话故事的文件存储实现

mod file_story_store;

pub use file_story_store::FileStoryStore;
