//! Narration Controls Port - 朗读控件
//!
//! 调用方提供的两个控件（开始朗读、暂停/继续）以及提示框

use crate::domain::narration::{ControlView, SessionId};

/// Narration Controls Port
///
/// 由 narrator 在事件循环内同步调用，实现方不应阻塞
pub trait NarrationControls: Send + Sync {
    /// 更新控件状态
    fn render(&self, session_id: SessionId, view: ControlView);

    /// 向用户显示错误提示
    fn alert(&self, session_id: SessionId, message: &str);

    /// 某个片段开始播放
    fn segment_started(&self, _session_id: SessionId, _index: usize, _total: usize) {}

    /// 会话正常播放完毕
    fn finished(&self, _session_id: SessionId) {}
}
