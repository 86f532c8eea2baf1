//! Remote Chunked Narrator - 逐段远端合成 + 顺序播放
//!
//! 事件循环独占 [`NarrationSession`]：命令、取数结果、播放通知都在同一个任务里处理，
//! 状态机产出的副作用也在这里执行。取数在独立任务中进行，结果带会话 ID 和句柄 ID 回送。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{request, BackendKind, Command, NarrationBackend, NarratorError};
use crate::application::ports::{
    NarrationControls, PlaybackEvent, PlaybackHandle, PlaybackListener, PlaybackNotice,
    PlaybackPort, SynthesizeRequest, TtsEnginePort,
};
use crate::domain::narration::{
    AudioRequest, HandleId, NarrationEffect, NarrationRequest, NarrationSession,
    NarrationSnapshot, SessionId, SessionOptions,
};

/// 远端逐段朗读
///
/// 克隆开销很小，所有克隆共享同一个事件循环
#[derive(Clone)]
pub struct RemoteChunkedNarrator {
    inbox: mpsc::UnboundedSender<Command>,
}

impl RemoteChunkedNarrator {
    /// 启动事件循环；必须在 tokio 运行时内调用
    pub fn spawn(
        options: SessionOptions,
        tts: Arc<dyn TtsEnginePort>,
        playback: Arc<dyn PlaybackPort>,
        controls: Arc<dyn NarrationControls>,
    ) -> Self {
        let (inbox, inbox_rx) = mpsc::unbounded_channel();
        let worker = NarrationWorker::new(options, inbox_rx, tts, playback, controls);
        tokio::spawn(worker.run());
        Self { inbox }
    }
}

#[async_trait]
impl NarrationBackend for RemoteChunkedNarrator {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
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
        // 事件循环已退出时没有可取消的会话
        let _ = request(&self.inbox, |reply| Command::Cancel { reply }).await;
    }

    async fn snapshot(&self) -> Option<NarrationSnapshot> {
        request(&self.inbox, |reply| Command::Snapshot { reply })
            .await
            .ok()
            .flatten()
    }
}

/// 取数任务的结果
struct FetchOutcome {
    session_id: SessionId,
    handle: HandleId,
    index: usize,
    result: Result<Box<dyn PlaybackHandle>, String>,
}

/// 事件循环
struct NarrationWorker {
    options: SessionOptions,
    inbox: mpsc::UnboundedReceiver<Command>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    notice_tx: mpsc::UnboundedSender<PlaybackNotice>,
    notice_rx: mpsc::UnboundedReceiver<PlaybackNotice>,
    tts: Arc<dyn TtsEnginePort>,
    playback: Arc<dyn PlaybackPort>,
    controls: Arc<dyn NarrationControls>,
    session: Option<NarrationSession>,
    /// 当前会话持有的句柄（正在播放的 + 预取就绪的）
    handles: HashMap<HandleId, Box<dyn PlaybackHandle>>,
}

impl NarrationWorker {
    fn new(
        options: SessionOptions,
        inbox: mpsc::UnboundedReceiver<Command>,
        tts: Arc<dyn TtsEnginePort>,
        playback: Arc<dyn PlaybackPort>,
        controls: Arc<dyn NarrationControls>,
    ) -> Self {
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        Self {
            options,
            inbox,
            fetch_tx,
            fetch_rx,
            notice_tx,
            notice_rx,
            tts,
            playback,
            controls,
            session: None,
            handles: HashMap::new(),
        }
    }

    async fn run(mut self) {
        tracing::info!(
            prefetch = self.options.prefetch,
            mid_stream_retries = self.options.mid_stream_retries,
            "Remote narrator started"
        );

        loop {
            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(outcome) = self.fetch_rx.recv() => self.handle_fetch(outcome),
                Some(notice) = self.notice_rx.recv() => self.handle_notice(notice),
            }
        }

        // 所有调用方都已释放，停止残留播放
        if let Some(session) = self.session.as_mut() {
            let effects = session.cancel();
            self.apply(effects);
        }
        for (_, mut handle) in self.handles.drain() {
            handle.detach();
            handle.stop();
        }
        tracing::info!("Remote narrator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { request, reply } => {
                let _ = reply.send(self.start(request));
            }
            Command::Pause { reply } => {
                let _ = reply.send(self.pause());
            }
            Command::Resume { reply } => {
                let result = match self.session.as_mut() {
                    Some(session) => session.resume().map_err(NarratorError::from),
                    None => Err(NarratorError::NoActiveSession),
                };
                let result = result.map(|effects| self.apply(effects));
                let _ = reply.send(result);
            }
            Command::Cancel { reply } => {
                if let Some(session) = self.session.as_mut() {
                    let session_id = session.id();
                    let effects = session.cancel();
                    if !effects.is_empty() {
                        tracing::info!(session_id = %session_id, "Narration cancelled");
                    }
                    self.apply(effects);
                }
                let _ = reply.send(());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.as_ref().map(NarrationSession::snapshot));
            }
        }
    }

    fn start(&mut self, request: NarrationRequest) -> Result<SessionId, NarratorError> {
        // 校验失败时不影响正在进行的会话
        let mut session = NarrationSession::new(request, self.options.clone())?;

        if let Some(previous) = self.session.as_mut() {
            let effects = previous.cancel();
            if !effects.is_empty() {
                tracing::info!(session_id = %previous.id(), "Previous narration replaced");
            }
            self.apply(effects);
        }

        let session_id = session.id();
        tracing::info!(
            session_id = %session_id,
            segments = session.segments().len(),
            "Narration started"
        );
        let effects = session.begin();
        self.session = Some(session);
        self.apply(effects);
        Ok(session_id)
    }

    /// 先暂停底层句柄，成功后才切换控件；失败时会话保持播放中
    fn pause(&mut self) -> Result<(), NarratorError> {
        let session = self.session.as_mut().ok_or(NarratorError::NoActiveSession)?;
        let session_id = session.id();
        let effects = session.pause()?;

        let mut rest = Vec::with_capacity(effects.len());
        for effect in effects {
            let handle = match effect {
                NarrationEffect::Pause(handle) => handle,
                other => {
                    rest.push(other);
                    continue;
                }
            };
            let result = match self.handles.get_mut(&handle) {
                Some(playable) => playable.pause(),
                None => Ok(()),
            };
            if let Err(e) = result {
                tracing::warn!(
                    session_id = %session_id,
                    handle = %handle,
                    error = %e,
                    "Failed to pause playback"
                );
                if let Some(session) = self.session.as_mut() {
                    session.revert_pause();
                }
                return Err(e.into());
            }
        }
        self.apply(rest);
        Ok(())
    }

    fn handle_fetch(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            session_id,
            handle,
            index,
            result,
        } = outcome;

        let session = match self.session.as_mut() {
            Some(session) if session.id() == session_id => session,
            _ => {
                // 旧会话迟到的句柄：直接停止
                if let Ok(mut stale) = result {
                    tracing::debug!(handle = %handle, "Stopping handle of a stale session");
                    stale.detach();
                    stale.stop();
                }
                return;
            }
        };

        let effects = match result {
            Ok(playable) => {
                tracing::debug!(
                    session_id = %session_id,
                    segment_index = index,
                    handle = %handle,
                    "Segment audio ready"
                );
                self.handles.insert(handle, playable);
                session.on_fetch_succeeded(handle)
            }
            Err(error) => {
                tracing::warn!(
                    session_id = %session_id,
                    segment_index = index,
                    error = %error,
                    "Segment audio fetch failed"
                );
                session.on_fetch_failed(handle, &error)
            }
        };
        self.apply(effects);
    }

    fn handle_notice(&mut self, notice: PlaybackNotice) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let PlaybackNotice { handle, event } = notice;
        let effects = match event {
            PlaybackEvent::Started => session.on_playback_started(handle),
            PlaybackEvent::Paused => session.on_playback_paused(handle),
            PlaybackEvent::Ended => session.on_playback_ended(handle),
            PlaybackEvent::Failed(error) => {
                tracing::warn!(handle = %handle, error = %error, "Playback failed");
                session.on_playback_failed(handle, &error)
            }
        };
        self.apply(effects);
    }

    /// 执行副作用；执行中产生的后续事件按顺序排队处理
    fn apply(&mut self, effects: Vec<NarrationEffect>) {
        let Some(session_id) = self.session.as_ref().map(NarrationSession::id) else {
            return;
        };
        let mut queue: VecDeque<NarrationEffect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                NarrationEffect::Render(view) => self.controls.render(session_id, view),
                NarrationEffect::Fetch {
                    handle,
                    index,
                    audio,
                } => self.spawn_fetch(session_id, handle, index, audio),
                NarrationEffect::Play(handle) => {
                    let result = match self.handles.get_mut(&handle) {
                        Some(playable) => playable.play().map_err(|e| e.to_string()),
                        None => Err("playback handle missing".to_string()),
                    };
                    if let Err(error) = result {
                        tracing::warn!(handle = %handle, error = %error, "Failed to start playback");
                        let failure = match self.session.as_mut() {
                            Some(session) => session.on_playback_failed(handle, &error),
                            None => Vec::new(),
                        };
                        if !failure.is_empty() {
                            // 会话已失败：同批次里剩下的控件更新作废，只保留句柄释放
                            queue.retain(|e| matches!(e, NarrationEffect::Release(_)));
                            queue.extend(failure);
                        }
                    }
                }
                NarrationEffect::Pause(handle) => {
                    if let Some(playable) = self.handles.get_mut(&handle) {
                        if let Err(e) = playable.pause() {
                            tracing::warn!(handle = %handle, error = %e, "Failed to pause playback");
                        }
                    }
                }
                NarrationEffect::Release(handle) => {
                    // 先解除监听，避免停止时发出的通知干扰状态
                    if let Some(mut playable) = self.handles.remove(&handle) {
                        playable.detach();
                        playable.stop();
                        tracing::debug!(handle = %handle, "Playback handle released");
                    }
                }
                NarrationEffect::Alert(message) => {
                    tracing::warn!(session_id = %session_id, message = %message, "Narration alert");
                    self.controls.alert(session_id, &message);
                }
                NarrationEffect::SegmentStarted { index } => {
                    let total = self
                        .session
                        .as_ref()
                        .map(|s| s.segments().len())
                        .unwrap_or_default();
                    tracing::info!(
                        session_id = %session_id,
                        segment_index = index,
                        total,
                        "Segment playing"
                    );
                    self.controls.segment_started(session_id, index, total);
                }
                NarrationEffect::Finished => {
                    tracing::info!(session_id = %session_id, "Narration finished");
                    self.controls.finished(session_id);
                }
            }
        }
    }

    fn spawn_fetch(&self, session_id: SessionId, handle: HandleId, index: usize, audio: AudioRequest) {
        tracing::debug!(
            session_id = %session_id,
            segment_index = index,
            handle = %handle,
            prerendered = audio.is_prerendered(),
            "Fetching segment audio"
        );

        let tts = self.tts.clone();
        let playback = self.playback.clone();
        let listener = PlaybackListener::new(handle, self.notice_tx.clone());
        let fetch_tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            let result = Self::fetch_audio(tts, playback, audio, listener).await;
            let _ = fetch_tx.send(FetchOutcome {
                session_id,
                handle,
                index,
                result,
            });
        });
    }

    async fn fetch_audio(
        tts: Arc<dyn TtsEnginePort>,
        playback: Arc<dyn PlaybackPort>,
        audio: AudioRequest,
        listener: PlaybackListener,
    ) -> Result<Box<dyn PlaybackHandle>, String> {
        let source = match audio {
            AudioRequest::Synthesize(text) => {
                tts.synthesize(SynthesizeRequest::new(text))
                    .await
                    .map_err(|e| e.to_string())?
                    .audio_url
            }
            AudioRequest::Prerendered(path) => tts.resolve_url(&path),
        };
        playback
            .open(&source, listener)
            .await
            .map_err(|e| e.to_string())
    }
}
