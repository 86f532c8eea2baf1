//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod process;
pub mod simulated;
pub mod story_api;
pub mod tts;

pub use process::{EspeakConfig, EspeakSynthesizer, ProcessPlayer, ProcessPlayerConfig};
pub use simulated::{
    SimulatedPlayer, SimulatedPlayerConfig, SimulatedSynthesizer, SimulatedSynthesizerConfig,
};
pub use story_api::*;
pub use tts::*;
