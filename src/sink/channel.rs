use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use super::AudioSink;
use crate::error::SinkError;
use crate::format::AudioParams;

/// Events delivered to the consumer side of a [`ChannelSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Begin(AudioParams),
    Audio(Vec<u8>),
    Finished,
    Aborted,
}

/// Sink that hands each chunk to a consumer thread, e.g. a playback loop.
///
/// The channel is bounded, so a slow consumer applies backpressure to the
/// synthesis thread. Dropping the receiver makes the next write fail with
/// [`SinkError::Closed`].
pub struct ChannelSink {
    tx: SyncSender<SinkEvent>,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, Receiver<SinkEvent>) {
        let (tx, rx) = mpsc::sync_channel(capacity);
        (Self { tx }, rx)
    }

    fn send(&self, event: SinkEvent) -> Result<(), SinkError> {
        self.tx.send(event).map_err(|_| SinkError::Closed)
    }
}

impl AudioSink for ChannelSink {
    fn begin(&mut self, params: &AudioParams) -> Result<(), SinkError> {
        self.send(SinkEvent::Begin(*params))
    }

    fn write(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        self.send(SinkEvent::Audio(chunk.to_vec()))
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.send(SinkEvent::Finished)
    }

    fn abort(&mut self) {
        // Never block on abort; a full or closed channel just misses it.
        match self.tx.try_send(SinkEvent::Aborted) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => log::warn!("Sink channel full, abort not delivered"),
        }
    }
}
