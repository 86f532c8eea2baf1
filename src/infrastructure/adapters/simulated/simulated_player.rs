//! Simulated Player

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::ports::{
    PlaybackError, PlaybackEvent, PlaybackHandle, PlaybackListener, PlaybackPort,
};
use crate::domain::narration::HandleId;
use crate::infrastructure::adapters::process::ListenerSlot;

#[derive(Debug, Clone)]
pub struct SimulatedPlayerConfig {
    /// 每个片段的模拟时长
    pub segment_duration: Duration,
    /// 打开时视为不存在的音频来源
    pub unavailable_sources: Vec<String>,
}

impl Default for SimulatedPlayerConfig {
    fn default() -> Self {
        Self {
            segment_duration: Duration::from_secs(2),
            unavailable_sources: Vec::new(),
        }
    }
}

pub struct SimulatedPlayer {
    config: SimulatedPlayerConfig,
}

impl SimulatedPlayer {
    pub fn new(config: SimulatedPlayerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PlaybackPort for SimulatedPlayer {
    async fn open(
        &self,
        source: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        if self.config.unavailable_sources.iter().any(|s| s == source) {
            return Err(PlaybackError::SourceUnavailable(source.to_string()));
        }
        tracing::debug!(handle = %listener.handle(), source = %source, "Simulated audio opened");
        Ok(Box::new(SimulatedHandle {
            id: listener.handle(),
            remaining: self.config.segment_duration,
            resumed_at: None,
            timer: None,
            listener: ListenerSlot::new(listener),
        }))
    }
}

struct SimulatedHandle {
    id: HandleId,
    remaining: Duration,
    resumed_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
    listener: ListenerSlot<PlaybackListener>,
}

impl PlaybackHandle for SimulatedHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.timer.is_some() {
            return Ok(());
        }
        let remaining = self.remaining;
        let listener = self.listener.clone();
        self.resumed_at = Some(Instant::now());
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            listener.with(|l| l.emit(PlaybackEvent::Ended));
        }));
        self.listener.with(|l| l.emit(PlaybackEvent::Started));
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        let timer = self.timer.take().ok_or(PlaybackError::Released)?;
        timer.abort();
        if let Some(resumed_at) = self.resumed_at.take() {
            self.remaining = self.remaining.saturating_sub(resumed_at.elapsed());
        }
        self.listener.with(|l| l.emit(PlaybackEvent::Paused));
        Ok(())
    }

    fn detach(&mut self) {
        self.listener.clear();
    }

    fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
