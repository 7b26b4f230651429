use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SageError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("{0}")]
    EmptyResult(String),

    #[error("No output from AI")]
    EmptyOutput,

    #[error("Invalid AI response format: {0}")]
    Format(String),

    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
}

pub type SageResult<T> = Result<T, SageError>;

impl From<reqwest::Error> for SageError {
    fn from(err: reqwest::Error) -> Self {
        SageError::Transport(err.to_string())
    }
}
