use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Wakeword error: {0}")]
    Wakeword(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<crate::config::ConfigError> for ScoutError {
    fn from(err: crate::config::ConfigError) -> Self {
        ScoutError::Config(err.to_string())
    }
}

impl From<crate::services::inference::InferenceError> for ScoutError {
    fn from(err: crate::services::inference::InferenceError) -> Self {
        ScoutError::Inference(err.to_string())
    }
}
