//! Event Publisher Implementation
//!
//! 把 narrator 的控件更新广播给前端（终端界面、测试等）

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::NarrationControls;
use crate::domain::narration::{ControlView, SessionId};

/// 朗读事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum NarrationEvent {
    /// 控件状态变更
    ViewChanged {
        session_id: SessionId,
        view: ControlView,
    },
    /// 需要提示用户的错误
    Alert {
        session_id: SessionId,
        message: String,
    },
    /// 片段开始播放
    SegmentStarted {
        session_id: SessionId,
        index: usize,
        total: usize,
    },
    /// 整个会话播放完毕
    Finished { session_id: SessionId },
}

/// 事件发布器
pub struct EventPublisher {
    /// session_id -> broadcast sender (for session-specific events)
    session_channels: DashMap<SessionId, broadcast::Sender<NarrationEvent>>,
    /// 所有事件（含提示）
    global_channel: broadcast::Sender<NarrationEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            session_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<NarrationEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅某个会话的事件
    ///
    /// 通道在会话首次更新控件时注册，回到空闲时注销；
    /// 会话已结束（或从未开始）时返回 None
    pub fn subscribe_session(
        &self,
        session_id: SessionId,
    ) -> Option<broadcast::Receiver<NarrationEvent>> {
        self.session_channels
            .get(&session_id)
            .map(|sender| sender.subscribe())
    }

    fn register_session(&self, session_id: SessionId) {
        self.session_channels
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(100).0);
    }

    /// 取消注册会话
    pub fn unregister_session(&self, session_id: SessionId) {
        self.session_channels.remove(&session_id);
    }

    fn publish(&self, session_id: Option<SessionId>, event: NarrationEvent) {
        if let Some(session_id) = session_id {
            if let Some(sender) = self.session_channels.get(&session_id) {
                let _ = sender.send(event.clone());
            }
        }
        if let Err(e) = self.global_channel.send(event) {
            tracing::trace!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationControls for EventPublisher {
    fn render(&self, session_id: SessionId, view: ControlView) {
        if view != ControlView::Idle {
            self.register_session(session_id);
        }
        self.publish(
            Some(session_id),
            NarrationEvent::ViewChanged { session_id, view },
        );
        if view == ControlView::Idle {
            self.unregister_session(session_id);
        }
    }

    fn alert(&self, session_id: SessionId, message: &str) {
        self.publish(
            Some(session_id),
            NarrationEvent::Alert {
                session_id,
                message: message.to_string(),
            },
        );
    }

    fn segment_started(&self, session_id: SessionId, index: usize, total: usize) {
        self.publish(
            Some(session_id),
            NarrationEvent::SegmentStarted {
                session_id,
                index,
                total,
            },
        );
    }

    fn finished(&self, session_id: SessionId) {
        self.publish(Some(session_id), NarrationEvent::Finished { session_id });
    }
}
