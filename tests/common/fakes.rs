//! 测试用端口实现

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use lullaby::application::ports::{
    PlaybackError, PlaybackEvent, PlaybackHandle, PlaybackListener, PlaybackPort,
    SynthesizeRequest, SynthesizedAudio, TtsEnginePort, TtsError,
};
use lullaby::domain::narration::HandleId;

/// 可编排失败的 TTS
#[derive(Default)]
pub struct ScriptedTts {
    calls: Mutex<Vec<String>>,
    /// 文本 -> 剩余失败次数
    failures: Mutex<HashMap<String, u32>>,
    delay: Duration,
}

impl ScriptedTts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    /// 合成该文本时先失败 `times` 次
    pub fn fail_times(self, text: &str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(text.to_string(), times);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TtsEnginePort for ScriptedTts {
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesizedAudio, TtsError> {
        self.calls.lock().unwrap().push(request.text.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut failures = self.failures.lock().unwrap();
        if let Some(left) = failures.get_mut(&request.text) {
            if *left > 0 {
                *left -= 1;
                return Err(TtsError::ServiceError("Failed to generate audio".into()));
            }
        }
        Ok(SynthesizedAudio {
            audio_url: format!("mem://{}", request.text),
        })
    }

    fn resolve_url(&self, path: &str) -> String {
        format!("http://stories.test{}", path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Opened,
    Playing,
    Paused,
    Ended,
    Stopped,
}

struct Record {
    source: String,
    id: HandleId,
    listener: PlaybackListener,
    state: HandleState,
    detached: bool,
}

type Registry = Arc<Mutex<Vec<Record>>>;

/// 句柄操作要返回的错误
#[derive(Default)]
struct Faults {
    play: Option<String>,
    pause: Option<String>,
}

/// 由测试手动结束片段的播放器
#[derive(Clone, Default)]
pub struct ManualPlayer {
    records: Registry,
    faults: Arc<Mutex<Faults>>,
}

impl ManualPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按打开顺序列出音频来源
    pub fn opened(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.source.clone())
            .collect()
    }

    pub fn state(&self, index: usize) -> HandleState {
        self.records.lock().unwrap()[index].state
    }

    pub fn is_detached(&self, index: usize) -> bool {
        self.records.lock().unwrap()[index].detached
    }

    /// 正在播放或暂停中的句柄数
    pub fn active(&self) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches!(r.state, HandleState::Playing | HandleState::Paused))
            .count()
    }

    /// 第 index 个句柄播放完毕
    pub fn end(&self, index: usize) {
        let mut records = self.records.lock().unwrap();
        let record = &mut records[index];
        record.state = HandleState::Ended;
        if !record.detached {
            record.listener.emit(PlaybackEvent::Ended);
        }
    }

    /// 第 index 个句柄播放出错
    pub fn fail(&self, index: usize, error: &str) {
        let records = self.records.lock().unwrap();
        let record = &records[index];
        if !record.detached {
            record.listener.emit(PlaybackEvent::Failed(error.to_string()));
        }
    }

    /// 之后所有句柄的 play() 都返回错误
    pub fn fail_play(&self, error: &str) {
        self.faults.lock().unwrap().play = Some(error.to_string());
    }

    /// 之后所有句柄的 pause() 都返回错误
    pub fn fail_pause(&self, error: &str) {
        self.faults.lock().unwrap().pause = Some(error.to_string());
    }

    fn fault(&self, pick: impl FnOnce(&Faults) -> Option<String>) -> Result<(), PlaybackError> {
        match pick(&self.faults.lock().unwrap()) {
            Some(error) => Err(PlaybackError::PlayerError(error)),
            None => Ok(()),
        }
    }

    /// 无视 detach 直接发送事件，模拟迟到的通知
    pub fn emit_late(&self, index: usize, event: PlaybackEvent) {
        self.records.lock().unwrap()[index].listener.emit(event);
    }

    fn update(&self, id: HandleId, f: impl FnOnce(&mut Record)) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            f(record);
        }
    }
}

#[async_trait]
impl PlaybackPort for ManualPlayer {
    async fn open(
        &self,
        source: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        let id = listener.handle();
        self.records.lock().unwrap().push(Record {
            source: source.to_string(),
            id,
            listener,
            state: HandleState::Opened,
            detached: false,
        });
        Ok(Box::new(ManualHandle {
            id,
            player: self.clone(),
        }))
    }
}

struct ManualHandle {
    id: HandleId,
    player: ManualPlayer,
}

impl ManualHandle {
    fn set(&self, state: HandleState, event: Option<PlaybackEvent>) -> Result<(), PlaybackError> {
        let mut result = Ok(());
        self.player.update(self.id, |record| {
            if record.state == HandleState::Stopped {
                result = Err(PlaybackError::Released);
                return;
            }
            record.state = state;
            if let Some(event) = event {
                if !record.detached {
                    record.listener.emit(event);
                }
            }
        });
        result
    }
}

impl PlaybackHandle for ManualHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.player.fault(|f| f.play.clone())?;
        self.set(HandleState::Playing, Some(PlaybackEvent::Started))
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        self.player.fault(|f| f.pause.clone())?;
        self.set(HandleState::Paused, Some(PlaybackEvent::Paused))
    }

    fn detach(&mut self) {
        self.player.update(self.id, |record| record.detached = true);
    }

    fn stop(&mut self) {
        self.player.update(self.id, |record| record.state = HandleState::Stopped);
    }
}
