//! eSpeak Synthesizer - 通过 espeak-ng 进程本地朗读
//!
//! 语速/音高/音量按 espeak-ng 的默认值（175 wpm / 50 / 100）线性换算；
//! 暂停/继续同样通过挂起进程实现。可用性和音色列表在首次查询时异步探测并缓存。

use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::child::{ChildProcess, ExitOutcome, ListenerSlot};
use crate::application::ports::{
    SpeechError, SpeechEvent, SpeechListener, SpeechSynthesizerPort, Utterance, VoiceInfo,
};

const DEFAULT_WORDS_PER_MINUTE: f32 = 175.0;
const DEFAULT_PITCH: f32 = 50.0;
const DEFAULT_AMPLITUDE: f32 = 100.0;

/// espeak-ng 配置
#[derive(Debug, Clone)]
pub struct EspeakConfig {
    pub command: String,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            command: "espeak-ng".to_string(),
        }
    }
}

/// 一个可用音色及其 `-v` 参数
#[derive(Debug, Clone, PartialEq, Eq)]
struct EspeakVoice {
    info: VoiceInfo,
    arg: String,
}

/// 解析 `espeak-ng --voices` 输出
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  2  en-gb           --/M      English_(Great_Britain) gmw/en
/// ```
///
/// 男声的英语音色额外提供一个 `+f3` 女声变体。
fn parse_voice_list(output: &str) -> Vec<EspeakVoice> {
    let mut voices = Vec::new();
    for line in output.lines().skip(1) {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 4 {
            continue;
        }
        let lang = columns[1];
        let gender = match columns[2].rsplit('/').next() {
            Some("F") => "female",
            Some("M") => "male",
            _ => "",
        };
        let name = columns[3].replace('_', " ");

        voices.push(EspeakVoice {
            info: VoiceInfo {
                name: format!("{} {}", name, gender).trim().to_string(),
                lang: lang.to_string(),
            },
            arg: lang.to_string(),
        });
        if gender == "male" && lang.starts_with("en") {
            voices.push(EspeakVoice {
                info: VoiceInfo {
                    name: format!("{} female", name),
                    lang: lang.to_string(),
                },
                arg: format!("{}+f3", lang),
            });
        }
    }
    voices
}

/// 把 utterance 参数换算成命令行参数
fn speech_args(utterance: &Utterance, voice_arg: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "-s".to_string(),
        ((utterance.rate * DEFAULT_WORDS_PER_MINUTE).round() as u32).to_string(),
        "-p".to_string(),
        ((utterance.pitch * DEFAULT_PITCH).round().clamp(0.0, 99.0) as u32).to_string(),
        "-a".to_string(),
        ((utterance.volume * DEFAULT_AMPLITUDE).round().clamp(0.0, 200.0) as u32).to_string(),
    ];
    if let Some(voice) = voice_arg {
        args.push("-v".to_string());
        args.push(voice.to_string());
    }
    // 文本放在 `--` 之后，避免以 `-` 开头的正文被当作选项
    args.push("--".to_string());
    args.push(utterance.text.clone());
    args
}

struct Active {
    listener: ListenerSlot<SpeechListener>,
    process: ChildProcess,
}

/// espeak-ng 合成器
pub struct EspeakSynthesizer {
    config: EspeakConfig,
    available: OnceCell<bool>,
    voices: OnceCell<Vec<EspeakVoice>>,
    active: Mutex<Option<Active>>,
}

impl EspeakSynthesizer {
    pub fn new(config: EspeakConfig) -> Self {
        Self {
            config,
            available: OnceCell::new(),
            voices: OnceCell::new(),
            active: Mutex::new(None),
        }
    }

    async fn voice_table(&self) -> &[EspeakVoice] {
        self.voices
            .get_or_init(|| async {
                let output = Command::new(&self.config.command)
                    .arg("--voices")
                    .stdin(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .output()
                    .await;
                match output {
                    Ok(output) if output.status.success() => {
                        parse_voice_list(&String::from_utf8_lossy(&output.stdout))
                    }
                    Ok(output) => {
                        tracing::warn!(status = %output.status, "Listing voices failed");
                        Vec::new()
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Listing voices failed");
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// 已探测到的音色对应的 `-v` 参数；未探测时不指定音色
    fn voice_arg(&self, name: &str) -> Option<String> {
        self.voices
            .get()?
            .iter()
            .find(|v| v.info.name == name)
            .map(|v| v.arg.clone())
    }

    fn with_active<T>(&self, f: impl FnOnce(&mut Option<Active>) -> T) -> T {
        let mut guard = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for EspeakSynthesizer {
    async fn is_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                let available = Command::new(&self.config.command)
                    .arg("--version")
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .status()
                    .await
                    .map(|s| s.success())
                    .unwrap_or(false);
                tracing::debug!(command = %self.config.command, available, "Speech synthesizer probed");
                available
            })
            .await
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        self.voice_table()
            .await
            .iter()
            .map(|v| v.info.clone())
            .collect()
    }

    fn speak(&self, utterance: Utterance, listener: SpeechListener) -> Result<(), SpeechError> {
        // 可用性必须已经探测过
        if self.available.get() != Some(&true) {
            return Err(SpeechError::Unavailable);
        }
        let voice_arg = utterance.voice.as_deref().and_then(|name| self.voice_arg(name));

        let mut command = Command::new(&self.config.command);
        command.args(speech_args(&utterance, voice_arg.as_deref()));

        let slot = ListenerSlot::new(listener);
        let on_exit = slot.clone();
        let process = ChildProcess::spawn(command, move |outcome| {
            let event = match outcome {
                ExitOutcome::Finished => SpeechEvent::Ended,
                ExitOutcome::Failed(e) => SpeechEvent::Failed(e),
                ExitOutcome::Killed => return,
            };
            on_exit.with(|l| l.emit(event));
        })
        .map_err(|e| SpeechError::SynthesizerError(e.to_string()))?;

        slot.with(|l| l.emit(SpeechEvent::Started));
        self.with_active(|active| {
            // 调用方应先 cancel；这里兜底停止旧进程
            if let Some(mut previous) = active.take() {
                previous.listener.clear();
                previous.process.kill();
            }
            *active = Some(Active {
                listener: slot,
                process,
            });
        });
        Ok(())
    }

    fn pause(&self) -> Result<(), SpeechError> {
        self.with_active(|active| {
            let active = active.as_mut().ok_or(SpeechError::NotSpeaking)?;
            active
                .process
                .suspend()
                .map_err(|e| SpeechError::SynthesizerError(e.to_string()))?;
            active.listener.with(|l| l.emit(SpeechEvent::Paused));
            Ok(())
        })
    }

    fn resume(&self) -> Result<(), SpeechError> {
        self.with_active(|active| {
            let active = active.as_mut().ok_or(SpeechError::NotSpeaking)?;
            active
                .process
                .resume()
                .map_err(|e| SpeechError::SynthesizerError(e.to_string()))?;
            active.listener.with(|l| l.emit(SpeechEvent::Resumed));
            Ok(())
        })
    }

    fn cancel(&self) {
        self.with_active(|active| {
            if let Some(mut current) = active.take() {
                current.listener.clear();
                current.process.kill();
                tracing::debug!(pid = ?current.process.pid(), "Speech process cancelled");
            }
        });
    }
}
