//! Process Player - 通过外部播放器进程播放音频片段
//!
//! 默认使用 `ffplay -nodisp -autoexit`，也可配置为 mpv 等任何
//! 接受 URL/路径作为最后一个参数、播放完毕即退出的程序。

use async_trait::async_trait;
use tokio::process::Command;

use super::child::{ChildProcess, ExitOutcome, ListenerSlot};
use crate::application::ports::{
    PlaybackError, PlaybackEvent, PlaybackHandle, PlaybackListener, PlaybackPort,
};
use crate::domain::narration::HandleId;

/// 播放器进程配置
#[derive(Debug, Clone)]
pub struct ProcessPlayerConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for ProcessPlayerConfig {
    fn default() -> Self {
        Self {
            command: "ffplay".to_string(),
            args: vec![
                "-nodisp".to_string(),
                "-autoexit".to_string(),
                "-loglevel".to_string(),
                "error".to_string(),
            ],
        }
    }
}

/// 外部进程播放器
pub struct ProcessPlayer {
    config: ProcessPlayerConfig,
}

impl ProcessPlayer {
    pub fn new(config: ProcessPlayerConfig) -> Self {
        Self { config }
    }
}

/// 检查音频来源是否可交给播放器
fn validate_source(source: &str) -> Result<(), PlaybackError> {
    if source.trim().is_empty() {
        return Err(PlaybackError::SourceUnavailable("empty audio source".to_string()));
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        return Ok(());
    }
    let path = source.strip_prefix("file://").unwrap_or(source);
    if std::path::Path::new(path).is_file() {
        Ok(())
    } else {
        Err(PlaybackError::SourceUnavailable(source.to_string()))
    }
}

#[async_trait]
impl PlaybackPort for ProcessPlayer {
    async fn open(
        &self,
        source: &str,
        listener: PlaybackListener,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        validate_source(source)?;
        tracing::debug!(handle = %listener.handle(), source = %source, "Audio source opened");

        Ok(Box::new(ProcessPlaybackHandle {
            id: listener.handle(),
            source: source.to_string(),
            config: self.config.clone(),
            listener: ListenerSlot::new(listener),
            process: None,
        }))
    }
}

/// 一段音频的播放句柄
///
/// 首次 play 时启动播放器进程；暂停即挂起进程
struct ProcessPlaybackHandle {
    id: HandleId,
    source: String,
    config: ProcessPlayerConfig,
    listener: ListenerSlot<PlaybackListener>,
    process: Option<ChildProcess>,
}

impl ProcessPlaybackHandle {
    fn emit(&self, event: PlaybackEvent) {
        self.listener.with(|l| l.emit(event));
    }
}

impl PlaybackHandle for ProcessPlaybackHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        match self.process.as_mut() {
            Some(process) => {
                process
                    .resume()
                    .map_err(|e| PlaybackError::PlayerError(e.to_string()))?;
            }
            None => {
                let mut command = Command::new(&self.config.command);
                command.args(&self.config.args).arg(&self.source);

                let listener = self.listener.clone();
                let process = ChildProcess::spawn(command, move |outcome| {
                    let event = match outcome {
                        ExitOutcome::Finished => PlaybackEvent::Ended,
                        ExitOutcome::Failed(e) => PlaybackEvent::Failed(e),
                        ExitOutcome::Killed => return,
                    };
                    listener.with(|l| l.emit(event));
                })
                .map_err(|e| {
                    PlaybackError::PlayerError(format!("cannot start {}: {}", self.config.command, e))
                })?;

                tracing::debug!(handle = %self.id, pid = ?process.pid(), "Player process started");
                self.process = Some(process);
            }
        }
        self.emit(PlaybackEvent::Started);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        let process = self.process.as_mut().ok_or(PlaybackError::Released)?;
        process
            .suspend()
            .map_err(|e| PlaybackError::PlayerError(e.to_string()))?;
        self.emit(PlaybackEvent::Paused);
        Ok(())
    }

    fn detach(&mut self) {
        self.listener.clear();
    }

    fn stop(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.kill();
            tracing::debug!(handle = %self.id, "Player process stopped");
        }
    }
}
