//! Narration Context - Errors

use thiserror::Error;

use super::NarrationPhase;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NarrationError {
    #[error("No text to read")]
    EmptyText,

    #[error("Cannot pause narration while {0}")]
    NotPlaying(NarrationPhase),

    #[error("Cannot resume narration while {0}")]
    NotPaused(NarrationPhase),
}
