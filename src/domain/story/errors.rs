//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoryError {
    #[error("Please select at least one keyword")]
    NoKeywords,

    #[error("Please enter your name!")]
    MissingName,

    #[error("Please select a sleep issue or describe your specific situation")]
    NoSleepIssue,

    #[error("Please enter a {0} to add")]
    EmptyCustomText(&'static str),

    #[error("Please provide a more detailed {what} (at least {min} characters)")]
    CustomTextTooShort { what: &'static str, min: usize },

    #[error("Invalid story id: {0:?}")]
    InvalidStoryId(String),

    #[error("No text to read")]
    EmptyContent,
}
