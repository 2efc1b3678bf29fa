use crate::request::SessionState;

/// Errors returned by the producer calls and configuration setters of a
/// [`SynthesisRequest`](crate::SynthesisRequest).
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("{operation} is not allowed in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Synthesis was stopped")]
    Cancelled,
    #[error("Audio sink rejected data: {0}")]
    SinkRejected(#[from] SinkError),
    #[error("Engine failed: {0}")]
    EngineFailed(String),
    #[error("Invalid synthesis params: {0}")]
    Config(String),
}

impl SynthesisError {
    /// True when the error came from a [`stop`](crate::SynthesisRequest::stop)
    /// rather than a hard failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SynthesisError::Cancelled)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("Downstream consumer closed")]
    Closed,
    #[error("Sink received audio before begin()")]
    NotStarted,
    #[error("Sink is full ({capacity} bytes)")]
    Full { capacity: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
