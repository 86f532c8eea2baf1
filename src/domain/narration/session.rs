//! 朗读会话状态机
//!
//! 会话本身不做任何 IO：每个输入（命令或事件）返回一组 [`NarrationEffect`]，
//! 由驱动方（narrator）负责执行。所有播放/取数事件都带句柄 ID，
//! 与当前句柄不符的事件一律丢弃。

use serde::Serialize;

use super::{
    AudioRequest, ControlView, HandleId, NarrationError, NarrationRequest, Segment, SessionId,
};
use crate::domain::text_segmenter::{segment_text, SegmentConfig};

/// 会话阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationPhase {
    /// 首段音频获取中
    Generating,
    Playing,
    Paused,
    Finished,
    Cancelled,
    Failed,
}

impl NarrationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for NarrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 状态机产出的副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEffect {
    /// 更新控件
    Render(ControlView),
    /// 获取片段音频并为其准备播放句柄
    Fetch {
        handle: HandleId,
        index: usize,
        audio: AudioRequest,
    },
    /// 开始或继续播放
    Play(HandleId),
    /// 原位暂停
    Pause(HandleId),
    /// 先解除事件监听，再停止并释放句柄
    Release(HandleId),
    /// 提示用户
    Alert(String),
    SegmentStarted { index: usize },
    Finished,
}

/// 会话选项
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub segment: SegmentConfig,
    /// 当前片段开始播放时即获取下一段
    pub prefetch: bool,
    /// 非首段获取失败后的重试次数
    pub mid_stream_retries: u32,
}

/// 会话快照（用于查询和日志）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrationSnapshot {
    pub session_id: SessionId,
    pub phase: NarrationPhase,
    pub total_segments: usize,
    pub cursor: usize,
    pub current_index: Option<usize>,
    pub user_paused: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    index: usize,
    handle: HandleId,
}

#[derive(Debug, Clone, Copy)]
struct Current {
    index: usize,
    handle: HandleId,
    started: bool,
}

/// 朗读会话
#[derive(Debug)]
pub struct NarrationSession {
    id: SessionId,
    segments: Vec<Segment>,
    /// 下一个尚未获取的片段
    cursor: usize,
    in_flight: Option<InFlight>,
    current: Option<Current>,
    /// 预取完成、等待播放的片段
    ready: Option<(usize, HandleId)>,
    /// 仅由 pause() 置位，播放（重新）开始时清除
    user_paused: bool,
    retries_left: u32,
    /// 预取失败时当前片段仍在播放，等其结束后再失败
    pending_failure: Option<String>,
    phase: NarrationPhase,
    options: SessionOptions,
}

impl NarrationSession {
    /// 创建会话，文本在此一次性分段
    pub fn new(request: NarrationRequest, options: SessionOptions) -> Result<Self, NarrationError> {
        let segments: Vec<Segment> = match request {
            NarrationRequest::Text(text) => segment_text(&text, &options.segment)
                .into_iter()
                .enumerate()
                .map(|(index, text)| Segment {
                    index,
                    audio: AudioRequest::Synthesize(text.clone()),
                    text,
                })
                .collect(),
            NarrationRequest::Prerendered { text, audio_path } => {
                if text.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![Segment {
                        index: 0,
                        text: text.trim().to_string(),
                        audio: AudioRequest::Prerendered(audio_path),
                    }]
                }
            }
        };

        if segments.is_empty() {
            return Err(NarrationError::EmptyText);
        }

        Ok(Self {
            id: SessionId::new(),
            segments,
            cursor: 0,
            in_flight: None,
            current: None,
            ready: None,
            user_paused: false,
            retries_left: options.mid_stream_retries,
            pending_failure: None,
            phase: NarrationPhase::Generating,
            options,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> NarrationPhase {
        self.phase
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_user_paused(&self) -> bool {
        self.user_paused
    }

    pub fn current_handle(&self) -> Option<HandleId> {
        self.current.map(|c| c.handle)
    }

    pub fn snapshot(&self) -> NarrationSnapshot {
        NarrationSnapshot {
            session_id: self.id,
            phase: self.phase,
            total_segments: self.segments.len(),
            cursor: self.cursor,
            current_index: self.current.map(|c| c.index),
            user_paused: self.user_paused,
        }
    }

    /// 开始会话：显示生成中并获取首段
    pub fn begin(&mut self) -> Vec<NarrationEffect> {
        let view = if self.segments[0].audio.is_prerendered() {
            ControlView::Loading
        } else {
            ControlView::Generating
        };
        vec![NarrationEffect::Render(view), self.fetch(0)]
    }

    fn fetch(&mut self, index: usize) -> NarrationEffect {
        let handle = HandleId::next();
        self.in_flight = Some(InFlight { index, handle });
        self.cursor = self.cursor.max(index + 1);
        NarrationEffect::Fetch {
            handle,
            index,
            audio: self.segments[index].audio.clone(),
        }
    }

    fn is_current(&self, handle: HandleId) -> bool {
        !self.phase.is_terminal() && self.current.map(|c| c.handle) == Some(handle)
    }

    /// 进入失败终态，释放所有句柄
    fn fail(&mut self, message: String) -> Vec<NarrationEffect> {
        let mut effects = self.release_all();
        self.phase = NarrationPhase::Failed;
        effects.push(NarrationEffect::Alert(message));
        effects.push(NarrationEffect::Render(ControlView::Idle));
        effects
    }

    fn release_all(&mut self) -> Vec<NarrationEffect> {
        let mut effects = Vec::new();
        if let Some(current) = self.current.take() {
            effects.push(NarrationEffect::Release(current.handle));
        }
        if let Some((_, handle)) = self.ready.take() {
            effects.push(NarrationEffect::Release(handle));
        }
        // 在途获取的结果到达时会被当作过期句柄释放
        self.in_flight = None;
        self.user_paused = false;
        effects
    }

    /// 片段音频已就绪（句柄已创建但未播放）
    pub fn on_fetch_succeeded(&mut self, handle: HandleId) -> Vec<NarrationEffect> {
        let in_flight = match self.in_flight {
            Some(f) if f.handle == handle && !self.phase.is_terminal() => f,
            _ => return vec![NarrationEffect::Release(handle)],
        };
        self.in_flight = None;

        if self.current.is_some() {
            self.ready = Some((in_flight.index, handle));
            return Vec::new();
        }

        self.current = Some(Current {
            index: in_flight.index,
            handle,
            started: false,
        });

        if self.user_paused {
            // 暂停期间到达的片段先挂起，resume 时再播放
            return Vec::new();
        }

        let mut effects = vec![NarrationEffect::Play(handle)];
        if self.phase == NarrationPhase::Generating {
            self.phase = NarrationPhase::Playing;
            effects.push(NarrationEffect::Render(ControlView::Playing));
        }
        effects
    }

    pub fn on_fetch_failed(&mut self, handle: HandleId, error: &str) -> Vec<NarrationEffect> {
        let in_flight = match self.in_flight {
            Some(f) if f.handle == handle && !self.phase.is_terminal() => f,
            _ => return Vec::new(),
        };
        self.in_flight = None;

        if self.phase == NarrationPhase::Generating {
            return self.fail(format!("Failed to generate audio: {}", error));
        }

        if self.retries_left > 0 {
            self.retries_left -= 1;
            return vec![self.fetch(in_flight.index)];
        }

        let message = format!(
            "Narration stopped: failed to generate audio for part {} of {}: {}",
            in_flight.index + 1,
            self.segments.len(),
            error
        );
        if self.current.map(|c| c.started).unwrap_or(false) {
            self.pending_failure = Some(message);
            return Vec::new();
        }
        self.fail(message)
    }

    pub fn on_playback_started(&mut self, handle: HandleId) -> Vec<NarrationEffect> {
        if !self.is_current(handle) {
            return Vec::new();
        }
        let Some(current) = self.current.as_mut() else {
            return Vec::new();
        };

        let first_start = !current.started;
        current.started = true;
        let index = current.index;
        self.user_paused = false;
        self.phase = NarrationPhase::Playing;

        let mut effects = Vec::new();
        if first_start {
            self.retries_left = self.options.mid_stream_retries;
            effects.push(NarrationEffect::SegmentStarted { index });
        }
        effects.push(NarrationEffect::Render(ControlView::Playing));

        if self.options.prefetch
            && self.in_flight.is_none()
            && self.ready.is_none()
            && self.cursor < self.segments.len()
        {
            let next = self.cursor;
            effects.push(self.fetch(next));
        }
        effects
    }

    /// 底层"已暂停"通知：只有用户主动暂停时才切换为"继续"
    pub fn on_playback_paused(&mut self, handle: HandleId) -> Vec<NarrationEffect> {
        if self.is_current(handle) && self.user_paused {
            vec![NarrationEffect::Render(ControlView::Paused)]
        } else {
            Vec::new()
        }
    }

    pub fn on_playback_ended(&mut self, handle: HandleId) -> Vec<NarrationEffect> {
        if !self.is_current(handle) {
            return Vec::new();
        }
        self.current = None;
        let mut effects = vec![NarrationEffect::Release(handle)];

        if let Some(message) = self.pending_failure.take() {
            effects.extend(self.fail(message));
            return effects;
        }

        if let Some((index, next)) = self.ready.take() {
            self.current = Some(Current {
                index,
                handle: next,
                started: false,
            });
            if !self.user_paused {
                effects.push(NarrationEffect::Play(next));
            }
        } else if self.in_flight.is_some() {
            // 预取仍在进行，结果到达后直接播放
        } else if self.cursor < self.segments.len() {
            let next = self.cursor;
            effects.push(self.fetch(next));
        } else {
            self.phase = NarrationPhase::Finished;
            self.user_paused = false;
            effects.push(NarrationEffect::Finished);
            effects.push(NarrationEffect::Render(ControlView::Idle));
        }
        effects
    }

    /// 播放出错；过期句柄的错误直接忽略
    pub fn on_playback_failed(&mut self, handle: HandleId, error: &str) -> Vec<NarrationEffect> {
        let Some(current) = self.current.filter(|_| self.is_current(handle)) else {
            return Vec::new();
        };
        let message = match &self.segments[current.index].audio {
            AudioRequest::Prerendered(_) => {
                "Audio file not found. Please try again later.".to_string()
            }
            AudioRequest::Synthesize(_) => format!("Error playing audio: {}", error),
        };
        self.fail(message)
    }

    pub fn pause(&mut self) -> Result<Vec<NarrationEffect>, NarrationError> {
        if self.phase != NarrationPhase::Playing {
            return Err(NarrationError::NotPlaying(self.phase));
        }
        self.user_paused = true;
        self.phase = NarrationPhase::Paused;

        let mut effects = Vec::new();
        if let Some(current) = self.current {
            effects.push(NarrationEffect::Pause(current.handle));
        }
        effects.push(NarrationEffect::Render(ControlView::Paused));
        Ok(effects)
    }

    /// 底层暂停失败：回到播放中。Render(Paused) 尚未执行，控件无需更新
    pub fn revert_pause(&mut self) {
        if self.phase == NarrationPhase::Paused {
            self.phase = NarrationPhase::Playing;
            self.user_paused = false;
        }
    }

    pub fn resume(&mut self) -> Result<Vec<NarrationEffect>, NarrationError> {
        if self.phase != NarrationPhase::Paused {
            return Err(NarrationError::NotPaused(self.phase));
        }
        self.user_paused = false;
        self.phase = NarrationPhase::Playing;

        let mut effects = Vec::new();
        if let Some(current) = self.current {
            effects.push(NarrationEffect::Play(current.handle));
        }
        effects.push(NarrationEffect::Render(ControlView::Playing));
        Ok(effects)
    }

    /// 取消会话；对已结束的会话是空操作
    pub fn cancel(&mut self) -> Vec<NarrationEffect> {
        if self.phase.is_terminal() {
            return Vec::new();
        }
        let mut effects = self.release_all();
        self.pending_failure = None;
        self.phase = NarrationPhase::Cancelled;
        effects.push(NarrationEffect::Render(ControlView::Idle));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NarrationEffect::*;

    const THREE_PARAGRAPHS: &str = "First part.\n\nSecond part.\n\nThird part.";

    fn session(text: &str) -> NarrationSession {
        NarrationSession::new(NarrationRequest::Text(text.to_string()), SessionOptions::default())
            .unwrap()
    }

    fn with_options(text: &str, options: SessionOptions) -> NarrationSession {
        NarrationSession::new(NarrationRequest::Text(text.to_string()), options).unwrap()
    }

    fn fetched(effects: &[NarrationEffect]) -> Vec<(HandleId, usize)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Fetch { handle, index, .. } => Some((*handle, *index)),
                _ => None,
            })
            .collect()
    }

    fn only_fetch(effects: &[NarrationEffect]) -> (HandleId, usize) {
        let fetches = fetched(effects);
        assert_eq!(fetches.len(), 1, "expected one fetch in {:?}", effects);
        fetches[0]
    }

    /// 驱动首段：获取成功并开始播放
    fn start_playing(session: &mut NarrationSession) -> HandleId {
        let (h0, index) = only_fetch(&session.begin());
        assert_eq!(index, 0);
        session.on_fetch_succeeded(h0);
        session.on_playback_started(h0);
        h0
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = NarrationSession::new(NarrationRequest::Text("  \n\n ".into()), SessionOptions::default())
            .unwrap_err();
        assert_eq!(err, NarrationError::EmptyText);
    }

    #[test]
    fn test_begin_renders_generating_and_fetches_first_segment() {
        let mut s = session(THREE_PARAGRAPHS);
        let effects = s.begin();
        assert_eq!(effects[0], Render(ControlView::Generating));
        match &effects[1] {
            Fetch { index, audio, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(*audio, AudioRequest::Synthesize("First part.".into()));
            }
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(s.phase(), NarrationPhase::Generating);
    }

    #[test]
    fn test_first_fetch_success_plays_immediately() {
        let mut s = session(THREE_PARAGRAPHS);
        let (h0, _) = only_fetch(&s.begin());
        let effects = s.on_fetch_succeeded(h0);
        assert_eq!(effects, vec![Play(h0), Render(ControlView::Playing)]);
        assert_eq!(s.phase(), NarrationPhase::Playing);
    }

    #[test]
    fn test_first_fetch_failure_returns_to_idle_without_handle() {
        let mut s = session(THREE_PARAGRAPHS);
        let (h0, _) = only_fetch(&s.begin());
        let effects = s.on_fetch_failed(h0, "HTTP 500");
        assert_eq!(
            effects,
            vec![
                Alert("Failed to generate audio: HTTP 500".into()),
                Render(ControlView::Idle)
            ]
        );
        assert_eq!(s.phase(), NarrationPhase::Failed);
        assert!(s.current_handle().is_none());
    }

    #[test]
    fn test_segment_end_fetches_next_and_continues() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);

        let effects = s.on_playback_ended(h0);
        assert_eq!(effects[0], Release(h0));
        let (h1, index) = only_fetch(&effects);
        assert_eq!(index, 1);

        assert_eq!(s.on_fetch_succeeded(h1), vec![Play(h1)]);
        assert_eq!(
            s.on_playback_started(h1),
            vec![SegmentStarted { index: 1 }, Render(ControlView::Playing)]
        );
    }

    #[test]
    fn test_last_segment_end_finishes_session() {
        let mut s = session("Only part.");
        let h0 = start_playing(&mut s);
        let effects = s.on_playback_ended(h0);
        assert_eq!(effects, vec![Release(h0), Finished, Render(ControlView::Idle)]);
        assert_eq!(s.phase(), NarrationPhase::Finished);
    }

    #[test]
    fn test_no_fetch_while_segment_is_playing_without_prefetch() {
        let mut s = session(THREE_PARAGRAPHS);
        let (h0, _) = only_fetch(&s.begin());
        let effects = s.on_fetch_succeeded(h0);
        assert!(fetched(&effects).is_empty());
        let effects = s.on_playback_started(h0);
        assert!(fetched(&effects).is_empty());
        assert_eq!(s.snapshot().cursor, 1);
    }

    #[test]
    fn test_pause_then_resume_keeps_position() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        let h1 = {
            let effects = s.on_playback_ended(h0);
            let (h1, _) = only_fetch(&effects);
            s.on_fetch_succeeded(h1);
            s.on_playback_started(h1);
            h1
        };

        let effects = s.pause().unwrap();
        assert_eq!(effects, vec![Pause(h1), Render(ControlView::Paused)]);
        assert!(s.is_user_paused());
        // 底层 paused 通知
        assert_eq!(s.on_playback_paused(h1), vec![Render(ControlView::Paused)]);

        let effects = s.resume().unwrap();
        assert_eq!(effects, vec![Play(h1), Render(ControlView::Playing)]);
        assert!(fetched(&effects).is_empty());

        // 继续播放同一句柄，不重复 SegmentStarted，也不提前获取第三段
        let effects = s.on_playback_started(h1);
        assert_eq!(effects, vec![Render(ControlView::Playing)]);
        assert_eq!(s.snapshot().current_index, Some(1));
        assert_eq!(s.snapshot().cursor, 2);

        let effects = s.on_playback_ended(h1);
        assert_eq!(only_fetch(&effects).1, 2);
    }

    #[test]
    fn test_revert_pause_restores_playing() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        s.pause().unwrap();
        s.revert_pause();

        assert_eq!(s.phase(), NarrationPhase::Playing);
        assert!(!s.is_user_paused());
        // 片段结束后照常获取下一段，不会被当作暂停挂起
        let (h1, index) = only_fetch(&s.on_playback_ended(h0));
        assert_eq!(index, 1);
        assert_eq!(s.on_fetch_succeeded(h1), vec![Play(h1)]);
    }

    #[test]
    fn test_natural_pause_notification_ignored_without_user_pause() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        assert!(s.on_playback_paused(h0).is_empty());
    }

    #[test]
    fn test_pause_requires_playing() {
        let mut s = session(THREE_PARAGRAPHS);
        s.begin();
        assert_eq!(
            s.pause().unwrap_err(),
            NarrationError::NotPlaying(NarrationPhase::Generating)
        );
        assert_eq!(
            s.resume().unwrap_err(),
            NarrationError::NotPaused(NarrationPhase::Generating)
        );
    }

    #[test]
    fn test_pause_between_segments_holds_next_segment() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        let (h1, _) = only_fetch(&s.on_playback_ended(h0));

        let effects = s.pause().unwrap();
        assert_eq!(effects, vec![Render(ControlView::Paused)]);

        // 暂停不取消在途获取；结果到达后挂起
        assert!(s.on_fetch_succeeded(h1).is_empty());
        assert_eq!(s.current_handle(), Some(h1));

        assert_eq!(s.resume().unwrap(), vec![Play(h1), Render(ControlView::Playing)]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        assert_eq!(s.cancel(), vec![Release(h0), Render(ControlView::Idle)]);
        assert!(s.cancel().is_empty());
        assert_eq!(s.phase(), NarrationPhase::Cancelled);
    }

    #[test]
    fn test_events_after_cancel_are_ignored() {
        let mut s = session(THREE_PARAGRAPHS);
        let h0 = start_playing(&mut s);
        s.cancel();
        assert!(s.on_playback_ended(h0).is_empty());
        assert!(s.on_playback_failed(h0, "stopped").is_empty());
        assert!(s.on_playback_started(h0).is_empty());
    }

    #[test]
    fn test_late_fetch_after_cancel_is_released() {
        let mut s = session(THREE_PARAGRAPHS);
        let (h0, _) = only_fetch(&s.begin());
        assert_eq!(s.cancel(), vec![Render(ControlView::Idle)]);
        assert_eq!(s.on_fetch_succeeded(h0), vec![Release(h0)]);
        assert!(s.on_fetch_failed(h0, "late").is_empty());
    }

    #[test]
    fn test_mid_stream_failure_retries_then_stops_cleanly() {
        let options = SessionOptions {
            mid_stream_retries: 1,
            ..Default::default()
        };
        let mut s = with_options(THREE_PARAGRAPHS, options);
        let h0 = start_playing(&mut s);
        let (h1, _) = only_fetch(&s.on_playback_ended(h0));

        let (retry, index) = only_fetch(&s.on_fetch_failed(h1, "timeout"));
        assert_eq!(index, 1);
        assert_ne!(retry, h1);

        let effects = s.on_fetch_failed(retry, "timeout");
        assert!(matches!(&effects[0], Alert(msg) if msg.contains("part 2 of 3")));
        assert_eq!(effects.last(), Some(&Render(ControlView::Idle)));
        assert_eq!(s.phase(), NarrationPhase::Failed);
    }

    #[test]
    fn test_prefetch_fetches_next_when_segment_starts() {
        let options = SessionOptions {
            prefetch: true,
            ..Default::default()
        };
        let mut s = with_options(THREE_PARAGRAPHS, options);
        let (h0, _) = only_fetch(&s.begin());
        s.on_fetch_succeeded(h0);
        let (h1, index) = only_fetch(&s.on_playback_started(h0));
        assert_eq!(index, 1);

        // 预取结果在当前片段播放期间到达，不打断播放
        assert!(s.on_fetch_succeeded(h1).is_empty());

        let effects = s.on_playback_ended(h0);
        assert_eq!(effects, vec![Release(h0), Play(h1)]);
    }

    #[test]
    fn test_prefetch_failure_waits_for_current_segment_to_end() {
        let options = SessionOptions {
            prefetch: true,
            mid_stream_retries: 0,
            ..Default::default()
        };
        let mut s = with_options(THREE_PARAGRAPHS, options);
        let (h0, _) = only_fetch(&s.begin());
        s.on_fetch_succeeded(h0);
        let (h1, _) = only_fetch(&s.on_playback_started(h0));

        assert!(s.on_fetch_failed(h1, "HTTP 502").is_empty());
        assert_eq!(s.phase(), NarrationPhase::Playing);

        let effects = s.on_playback_ended(h0);
        assert_eq!(effects[0], Release(h0));
        assert!(effects.iter().any(|e| matches!(e, Alert(_))));
        assert_eq!(s.phase(), NarrationPhase::Failed);
    }

    #[test]
    fn test_prerendered_session_is_single_segment() {
        let request = NarrationRequest::Prerendered {
            text: "A classic tale.\n\nWith two paragraphs.".into(),
            audio_path: "/static/audio/classic_42.mp3".into(),
        };
        let mut s = NarrationSession::new(request, SessionOptions::default()).unwrap();
        assert_eq!(s.segments().len(), 1);
        let effects = s.begin();
        assert_eq!(effects[0], Render(ControlView::Loading));
        assert!(matches!(
            &effects[1],
            Fetch { audio: AudioRequest::Prerendered(p), .. } if p == "/static/audio/classic_42.mp3"
        ));
    }

    #[test]
    fn test_missing_prerendered_audio_alerts_while_current() {
        let request = NarrationRequest::Prerendered {
            text: "Tale.".into(),
            audio_path: "/static/audio/classic_1.mp3".into(),
        };
        let mut s = NarrationSession::new(request, SessionOptions::default()).unwrap();
        let (h0, _) = only_fetch(&s.begin());
        s.on_fetch_succeeded(h0);
        let effects = s.on_playback_failed(h0, "404");
        assert_eq!(
            effects,
            vec![
                Release(h0),
                Alert("Audio file not found. Please try again later.".into()),
                Render(ControlView::Idle)
            ]
        );
    }

    #[test]
    fn test_snapshot_reports_progress() {
        let mut s = session(THREE_PARAGRAPHS);
        start_playing(&mut s);
        let snap = s.snapshot();
        assert_eq!(snap.total_segments, 3);
        assert_eq!(snap.current_index, Some(0));
        assert_eq!(snap.phase, NarrationPhase::Playing);
        assert!(!snap.user_paused);
    }
}
