//! Audio sinks that receive the output of a synthesis request.
//!
//! A sink sees one `begin`, any number of `write`s, and then either `finish`
//! (normal completion) or `abort` (stop, engine error, or a rejected write).
//! `write` must consume or copy the chunk before returning: the engine is
//! free to overwrite the buffer as soon as the call returns.

mod channel;
mod memory;
mod wav;

pub use channel::{ChannelSink, SinkEvent};
pub use memory::{CapturedAudio, MemorySink, StreamOutcome};
pub use wav::WavSink;

use crate::error::SinkError;
use crate::format::AudioParams;

pub trait AudioSink: Send {
    /// Called once when the engine announces its output format.
    fn begin(&mut self, params: &AudioParams) -> Result<(), SinkError>;

    fn write(&mut self, chunk: &[u8]) -> Result<(), SinkError>;

    /// No further audio will arrive; the request completed normally.
    ///
    /// Only called after the request has committed to `Done`, so a sink that
    /// sees `finish` never belongs to a request the driver sees as stopped.
    /// If this fails the request ends in `Error` and `abort` follows.
    fn finish(&mut self) -> Result<(), SinkError>;

    /// The stream ended early. Called at most once, possibly without `begin`.
    fn abort(&mut self) {}
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn begin(&mut self, params: &AudioParams) -> Result<(), SinkError> {
        (**self).begin(params)
    }

    fn write(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        (**self).write(chunk)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }

    fn abort(&mut self) {
        (**self).abort()
    }
}
