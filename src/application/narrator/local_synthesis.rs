//! Local Synthesis Narrator - 本地合成整篇朗读
//!
//! 整篇文本作为一个 utterance；暂停/继续直接交给合成器。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{request, BackendKind, Command, NarrationBackend, NarratorError, SpeechSettings};
use crate::application::ports::{
    pick_voice, NarrationControls, SpeechEvent, SpeechListener, SpeechNotice,
    SpeechSynthesizerPort, Utterance,
};
use crate::domain::narration::{
    ControlView, HandleId, NarrationError, NarrationPhase, NarrationRequest, NarrationSnapshot,
    SessionId,
};

#[derive(Clone)]
pub struct LocalSynthesisNarrator {
    inbox: mpsc::UnboundedSender<Command>,
}

impl LocalSynthesisNarrator {
    /// 启动事件循环；必须在 tokio 运行时内调用
    pub fn spawn(
        settings: SpeechSettings,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        controls: Arc<dyn NarrationControls>,
    ) -> Self {
        let (inbox, inbox_rx) = mpsc::unbounded_channel();
        let worker = SpeechWorker::new(settings, inbox_rx, synthesizer, controls);
        tokio::spawn(worker.run());
        Self { inbox }
    }
}

#[async_trait]
impl NarrationBackend for LocalSynthesisNarrator {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn start(&self, narration: NarrationRequest) -> Result<SessionId, NarratorError> {
        request(&self.inbox, |reply| Command::Start {
            request: narration,
            reply,
        })
        .await?
    }

    async fn pause(&self) -> Result<(), NarratorError> {
        request(&self.inbox, |reply| Command::Pause { reply }).await?
    }

    async fn resume(&self) -> Result<(), NarratorError> {
        request(&self.inbox, |reply| Command::Resume { reply }).await?
    }

    async fn cancel(&self) {
        let _ = request(&self.inbox, |reply| Command::Cancel { reply }).await;
    }

    async fn snapshot(&self) -> Option<NarrationSnapshot> {
        request(&self.inbox, |reply| Command::Snapshot { reply })
            .await
            .ok()
            .flatten()
    }
}

/// 正在朗读的 utterance
struct Speaking {
    session_id: SessionId,
    utterance: HandleId,
    phase: NarrationPhase,
}

impl Speaking {
    fn snapshot(&self) -> NarrationSnapshot {
        NarrationSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            total_segments: 1,
            cursor: 1,
            current_index: (!self.phase.is_terminal()).then_some(0),
            user_paused: self.phase == NarrationPhase::Paused,
        }
    }
}

struct SpeechWorker {
    settings: SpeechSettings,
    inbox: mpsc::UnboundedReceiver<Command>,
    notice_tx: mpsc::UnboundedSender<SpeechNotice>,
    notice_rx: mpsc::UnboundedReceiver<SpeechNotice>,
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    controls: Arc<dyn NarrationControls>,
    current: Option<Speaking>,
}

impl SpeechWorker {
    fn new(
        settings: SpeechSettings,
        inbox: mpsc::UnboundedReceiver<Command>,
        synthesizer: Arc<dyn SpeechSynthesizerPort>,
        controls: Arc<dyn NarrationControls>,
    ) -> Self {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        Self {
            settings,
            inbox,
            notice_tx,
            notice_rx,
            synthesizer,
            controls,
            current: None,
        }
    }

    async fn run(mut self) {
        tracing::info!(
            rate = self.settings.rate,
            pitch = self.settings.pitch,
            volume = self.settings.volume,
            "Local narrator started"
        );

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(notice) = self.notice_rx.recv() => self.handle_notice(notice),
            }
        }

        self.synthesizer.cancel();
        tracing::info!("Local narrator stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { request, reply } => {
                let _ = reply.send(self.start(request).await);
            }
            Command::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            Command::Resume { reply } => {
                let _ = reply.send(self.resume());
            }
            Command::Cancel { reply } => {
                self.cancel();
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.current.as_ref().map(Speaking::snapshot));
            }
        }
    }

    async fn start(&mut self, request: NarrationRequest) -> Result<SessionId, NarratorError> {
        // 预渲染音频在本地后端退化为朗读文本
        let text = request.text().trim().to_string();
        if text.is_empty() {
            return Err(NarrationError::EmptyText.into());
        }

        self.synthesizer.cancel();
        self.cancel();

        let session_id = SessionId::new();
        if !self.synthesizer.is_available().await {
            tracing::warn!("Speech synthesizer unavailable");
            self.controls.alert(
                session_id,
                "Sorry, your system does not support text-to-speech.",
            );
            return Err(NarratorError::Unavailable);
        }

        let voices = self.synthesizer.voices().await;
        let voice = self
            .settings
            .voice_hint
            .as_deref()
            .and_then(|hint| pick_voice(&voices, hint))
            .map(|v| v.name.clone());

        let utterance = HandleId::next();
        tracing::info!(
            session_id = %session_id,
            utterance = %utterance,
            text_len = text.len(),
            voice = voice.as_deref().unwrap_or("default"),
            "Speaking story"
        );

        let listener = SpeechListener::new(utterance, self.notice_tx.clone());
        let spoken = Utterance {
            text,
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            volume: self.settings.volume,
            voice,
        };
        if let Err(e) = self.synthesizer.speak(spoken, listener) {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to start speech");
            self.controls
                .alert(session_id, &format!("Error reading story: {}", e));
            self.controls.render(session_id, ControlView::Idle);
            self.current = Some(Speaking {
                session_id,
                utterance,
                phase: NarrationPhase::Failed,
            });
            return Ok(session_id);
        }

        self.current = Some(Speaking {
            session_id,
            utterance,
            phase: NarrationPhase::Playing,
        });
        self.controls.render(session_id, ControlView::Playing);
        Ok(session_id)
    }

    fn pause(&mut self) -> Result<(), NarratorError> {
        let current = self.current.as_mut().ok_or(NarratorError::NoActiveSession)?;
        if current.phase != NarrationPhase::Playing {
            return Err(NarrationError::NotPlaying(current.phase).into());
        }
        // 合成器确实暂停后才切换控件
        if let Err(e) = self.synthesizer.pause() {
            tracing::warn!(session_id = %current.session_id, error = %e, "Synthesizer pause failed");
            return Err(e.into());
        }
        current.phase = NarrationPhase::Paused;
        self.controls.render(current.session_id, ControlView::Paused);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), NarratorError> {
        let current = self.current.as_mut().ok_or(NarratorError::NoActiveSession)?;
        if current.phase != NarrationPhase::Paused {
            return Err(NarrationError::NotPaused(current.phase).into());
        }
        if let Err(e) = self.synthesizer.resume() {
            tracing::warn!(session_id = %current.session_id, error = %e, "Synthesizer resume failed");
            return Err(e.into());
        }
        current.phase = NarrationPhase::Playing;
        self.controls.render(current.session_id, ControlView::Playing);
        Ok(())
    }

    fn cancel(&mut self) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if current.phase.is_terminal() {
            return;
        }
        self.synthesizer.cancel();
        current.phase = NarrationPhase::Cancelled;
        tracing::info!(session_id = %current.session_id, "Speech cancelled");
        self.controls.render(current.session_id, ControlView::Idle);
    }

    fn handle_notice(&mut self, notice: SpeechNotice) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if current.utterance != notice.utterance || current.phase.is_terminal() {
            return;
        }

        match notice.event {
            SpeechEvent::Started => {
                self.controls.segment_started(current.session_id, 0, 1);
            }
            SpeechEvent::Paused => {
                current.phase = NarrationPhase::Paused;
                self.controls.render(current.session_id, ControlView::Paused);
            }
            SpeechEvent::Resumed => {
                current.phase = NarrationPhase::Playing;
                self.controls.render(current.session_id, ControlView::Playing);
            }
            SpeechEvent::Ended => {
                current.phase = NarrationPhase::Finished;
                tracing::info!(session_id = %current.session_id, "Speech finished");
                self.controls.finished(current.session_id);
                self.controls.render(current.session_id, ControlView::Idle);
            }
            SpeechEvent::Failed(error) => {
                current.phase = NarrationPhase::Failed;
                tracing::warn!(session_id = %current.session_id, error = %error, "Speech failed");
                self.controls.alert(
                    current.session_id,
                    &format!("Error reading story: {}", error),
                );
                self.controls.render(current.session_id, ControlView::Idle);
            }
        }
    }
}
