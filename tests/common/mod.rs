//! 集成测试公共设施
//!
//! 可手动驱动的播放器、可编排失败的 TTS，以及等待事件的辅助函数。

#![allow(dead_code)]

pub mod fakes;

use std::time::Duration;

use lullaby::infrastructure::NarrationEvent;
use lullaby::domain::narration::{ControlView, SessionId};
use tokio::sync::broadcast;

/// 等待事件的上限
pub const WAIT: Duration = Duration::from_secs(10);

/// 读取事件直到满足条件，返回该事件
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<NarrationEvent>, mut pred: F) -> NarrationEvent
where
    F: FnMut(&NarrationEvent) -> bool,
{
    let found = tokio::time::timeout(WAIT, async {
        loop {
            let event = rx.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await;
    found.expect("timed out waiting for narration event")
}

pub async fn wait_view(
    rx: &mut broadcast::Receiver<NarrationEvent>,
    session: SessionId,
    expected: ControlView,
) {
    wait_for(rx, |e| {
        matches!(e, NarrationEvent::ViewChanged { session_id, view }
            if *session_id == session && *view == expected)
    })
    .await;
}

pub async fn wait_segment(
    rx: &mut broadcast::Receiver<NarrationEvent>,
    session: SessionId,
    expected: usize,
) -> usize {
    match wait_for(rx, |e| {
        matches!(e, NarrationEvent::SegmentStarted { session_id, index, .. }
            if *session_id == session && *index == expected)
    })
    .await
    {
        NarrationEvent::SegmentStarted { total, .. } => total,
        _ => unreachable!(),
    }
}

pub async fn wait_alert(rx: &mut broadcast::Receiver<NarrationEvent>) -> String {
    match wait_for(rx, |e| matches!(e, NarrationEvent::Alert { .. })).await {
        NarrationEvent::Alert { message, .. } => message,
        _ => unreachable!(),
    }
}

/// 轮询直到条件成立
pub async fn eventually<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never became true");
}

/// 让事件循环把已排队的消息处理完
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
