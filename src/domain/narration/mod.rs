//! Narration Context - 朗读限界上下文
//!
//! 职责:
//! - 朗读会话状态机（不含 IO，只产出副作用指令）
//! - 控件视图
//! - 片段与播放句柄标识

mod errors;
mod session;
mod value_objects;
mod view;

pub use errors::NarrationError;
pub use session::{
    NarrationEffect, NarrationPhase, NarrationSession, NarrationSnapshot, SessionOptions,
};
pub use value_objects::{AudioRequest, HandleId, NarrationRequest, Segment, SessionId};
pub use view::ControlView;
