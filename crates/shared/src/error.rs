use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("session id must not be empty")]
    EmptySessionId,
    #[error("video id must not be empty")]
    EmptyVideoId,
    #[error("progress body is not a number: {0:?}")]
    InvalidProgress(String),
    #[error("progress value {0} is outside 0..=100")]
    ProgressOutOfRange(f64),
}
