//! Simulated Synthesizer
//!
//! 朗读时长按词数和语速估算

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::ports::{
    SpeechError, SpeechEvent, SpeechListener, SpeechSynthesizerPort, Utterance, VoiceInfo,
};
use crate::infrastructure::adapters::process::ListenerSlot;

#[derive(Debug, Clone)]
pub struct SimulatedSynthesizerConfig {
    pub available: bool,
    /// 语速为 1.0 时每秒朗读的词数
    pub words_per_second: f32,
    pub voices: Vec<VoiceInfo>,
}

impl Default for SimulatedSynthesizerConfig {
    fn default() -> Self {
        Self {
            available: true,
            words_per_second: 2.5,
            voices: vec![
                VoiceInfo {
                    name: "Simulated male".into(),
                    lang: "en-US".into(),
                },
                VoiceInfo {
                    name: "Simulated female".into(),
                    lang: "en-US".into(),
                },
            ],
        }
    }
}

struct Speaking {
    listener: ListenerSlot<SpeechListener>,
    remaining: Duration,
    resumed_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl Speaking {
    fn start_timer(&mut self) {
        let remaining = self.remaining;
        let listener = self.listener.clone();
        self.resumed_at = Some(Instant::now());
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            listener.with(|l| l.emit(SpeechEvent::Ended));
        }));
    }
}

pub struct SimulatedSynthesizer {
    config: SimulatedSynthesizerConfig,
    speaking: Mutex<Option<Speaking>>,
    last_utterance: Mutex<Option<Utterance>>,
}

impl SimulatedSynthesizer {
    pub fn new(config: SimulatedSynthesizerConfig) -> Self {
        Self {
            config,
            speaking: Mutex::new(None),
            last_utterance: Mutex::new(None),
        }
    }

    /// 最近一次 speak 收到的参数
    pub fn last_utterance(&self) -> Option<Utterance> {
        self.last_utterance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn estimate(&self, utterance: &Utterance) -> Duration {
        let words = utterance.text.split_whitespace().count().max(1) as f32;
        let per_second = (self.config.words_per_second * utterance.rate).max(0.1);
        Duration::from_secs_f32(words / per_second)
    }
}

#[async_trait]
impl SpeechSynthesizerPort for SimulatedSynthesizer {
    async fn is_available(&self) -> bool {
        self.config.available
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        self.config.voices.clone()
    }

    fn speak(&self, utterance: Utterance, listener: SpeechListener) -> Result<(), SpeechError> {
        if !self.config.available {
            return Err(SpeechError::Unavailable);
        }
        let mut speaking = Speaking {
            listener: ListenerSlot::new(listener),
            remaining: self.estimate(&utterance),
            resumed_at: None,
            timer: None,
        };
        speaking.start_timer();
        speaking.listener.with(|l| l.emit(SpeechEvent::Started));

        *self
            .last_utterance
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(utterance);
        let mut guard = self.speaking.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = guard.replace(speaking) {
            previous.listener.clear();
            if let Some(timer) = previous.timer {
                timer.abort();
            }
        }
        Ok(())
    }

    fn pause(&self) -> Result<(), SpeechError> {
        let mut guard = self.speaking.lock().unwrap_or_else(PoisonError::into_inner);
        let speaking = guard.as_mut().ok_or(SpeechError::NotSpeaking)?;
        let timer = speaking.timer.take().ok_or(SpeechError::NotSpeaking)?;
        timer.abort();
        if let Some(resumed_at) = speaking.resumed_at.take() {
            speaking.remaining = speaking.remaining.saturating_sub(resumed_at.elapsed());
        }
        speaking.listener.with(|l| l.emit(SpeechEvent::Paused));
        Ok(())
    }

    fn resume(&self) -> Result<(), SpeechError> {
        let mut guard = self.speaking.lock().unwrap_or_else(PoisonError::into_inner);
        let speaking = guard.as_mut().ok_or(SpeechError::NotSpeaking)?;
        if speaking.timer.is_none() {
            speaking.start_timer();
            speaking.listener.with(|l| l.emit(SpeechEvent::Resumed));
        }
        Ok(())
    }

    fn cancel(&self) {
        let mut guard = self.speaking.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(speaking) = guard.take() {
            speaking.listener.clear();
            if let Some(timer) = speaking.timer {
                timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::narration::HandleId;
    use tokio::sync::mpsc;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_pause_resume_end() {
        let synth = SimulatedSynthesizer::new(SimulatedSynthesizerConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = HandleId::next();
        synth
            .speak(utterance("one two three four five"), SpeechListener::new(id, tx))
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().event, SpeechEvent::Started);
        synth.pause().unwrap();
        assert_eq!(rx.recv().await.unwrap().event, SpeechEvent::Paused);
        synth.resume().unwrap();
        assert_eq!(rx.recv().await.unwrap().event, SpeechEvent::Resumed);
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.event, SpeechEvent::Ended);
        assert_eq!(notice.utterance, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_silences_utterance() {
        let synth = SimulatedSynthesizer::new(SimulatedSynthesizerConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        synth
            .speak(utterance("hello"), SpeechListener::new(HandleId::next(), tx))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().event, SpeechEvent::Started);

        synth.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert!(matches!(synth.pause(), Err(SpeechError::NotSpeaking)));
    }

    #[test]
    fn test_unavailable() {
        let synth = SimulatedSynthesizer::new(SimulatedSynthesizerConfig {
            available: false,
            ..Default::default()
        });
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(matches!(
            synth.speak(utterance("hi"), SpeechListener::new(HandleId::next(), tx)),
            Err(SpeechError::Unavailable)
        ));
    }
}
