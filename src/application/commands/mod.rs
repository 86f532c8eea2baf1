//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：故事生成、重置与朗读控制

mod narration_commands;
mod story_commands;

pub mod handlers;

pub use narration_commands::*;
pub use story_commands::*;
