//! Process Adapters - 外部进程播放与本地合成

mod child;
mod espeak_synthesizer;
mod process_player;

pub use child::{ChildProcess, ExitOutcome, ListenerSlot};
pub use espeak_synthesizer::{EspeakConfig, EspeakSynthesizer};
pub use process_player::{ProcessPlayer, ProcessPlayerConfig};
