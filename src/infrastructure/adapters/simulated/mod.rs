//! Simulated Adapters - 不出声的播放器与合成器
//!
//! 用计时器模拟音频时长，供离线模式和测试使用

mod simulated_player;
mod simulated_synthesizer;

pub use simulated_player::{SimulatedPlayer, SimulatedPlayerConfig};
pub use simulated_synthesizer::{SimulatedSynthesizer, SimulatedSynthesizerConfig};
