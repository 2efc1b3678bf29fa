use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::error::{SinkError, SynthesisError};
use crate::format::{AudioFormat, AudioParams};
use crate::request::{checked_range, SessionState, SynthesisCallback};
use crate::sink::AudioSink;

/// Default preferred chunk size for one `audio_available` call.
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 8192;

struct SinkSlot {
    sink: Box<dyn AudioSink>,
    /// Set once `finish` or `abort` has been delivered.
    closed: bool,
}

/// [`SynthesisCallback`] that forwards audio synchronously to an [`AudioSink`].
///
/// The lifecycle state is a single atomic so that [`stop`](SynthesisCallback::stop)
/// never blocks and never loses a race with a producer call. The sink lock
/// is only ever taken on the synthesis thread.
pub struct StreamingSession {
    state: AtomicU8,
    audio_params: OnceLock<AudioParams>,
    max_buffer_size: usize,
    sink: Mutex<SinkSlot>,
}

impl StreamingSession {
    pub fn new(sink: impl AudioSink + 'static) -> Self {
        Self::with_max_buffer_size(sink, DEFAULT_MAX_BUFFER_SIZE)
    }

    pub fn with_max_buffer_size(sink: impl AudioSink + 'static, max_buffer_size: usize) -> Self {
        Self {
            state: AtomicU8::new(SessionState::Created as u8),
            audio_params: OnceLock::new(),
            max_buffer_size: max_buffer_size.max(1),
            sink: Mutex::new(SinkSlot {
                sink: Box::new(sink),
                closed: false,
            }),
        }
    }

    fn load_state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Compare-and-swap `from -> to`, returning the actual state on failure.
    fn transition(&self, from: SessionState, to: SessionState) -> Result<(), SessionState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| log::debug!("synthesis state {from:?} -> {to:?}"))
            .map_err(SessionState::from_u8)
    }

    /// Move any non-terminal state to `to`, returning the previous state.
    fn terminate(&self, to: SessionState) -> Result<SessionState, SessionState> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (!SessionState::from_u8(current).is_terminal()).then_some(to as u8)
            })
            .map(SessionState::from_u8)
            .map_err(SessionState::from_u8)
    }

    /// Build the error for a producer call made in `state`.
    fn reject(&self, operation: &'static str, state: SessionState) -> SynthesisError {
        if state == SessionState::Stopped {
            self.abort_sink();
            log::debug!("{operation} observed stop");
            return SynthesisError::Cancelled;
        }
        log::warn!("{operation} rejected in state {state:?}");
        SynthesisError::InvalidState { operation, state }
    }

    fn abort_sink(&self) {
        let mut slot = self.sink.lock();
        if !slot.closed {
            slot.closed = true;
            slot.sink.abort();
        }
    }

    /// The sink could not complete the stream after `done` claimed `Done`.
    fn finish_failed(&self, err: SinkError) -> SynthesisError {
        log::warn!("audio sink failed to finish: {err}");
        if self.transition(SessionState::Done, SessionState::Error).is_err() {
            log::warn!("finish failure observed outside Done");
        }
        self.abort_sink();
        SynthesisError::SinkRejected(err)
    }

    /// The sink refused data: the session ends in `Error`.
    fn sink_failed(&self, err: SinkError) -> SynthesisError {
        log::warn!("audio sink rejected data: {err}");
        if let Ok(previous) = self.terminate(SessionState::Error) {
            log::debug!("synthesis state {previous:?} -> Error");
        }
        self.abort_sink();
        SynthesisError::SinkRejected(err)
    }
}

impl SynthesisCallback for StreamingSession {
    fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    fn start(
        &self,
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
    ) -> Result<(), SynthesisError> {
        let state = self.load_state();
        if state != SessionState::Created {
            return Err(self.reject("start", state));
        }
        let params = AudioParams::new(sample_rate_hz, format, channel_count)?;
        // Recorded before the state leaves Created so that any observer of
        // Started also sees the format. Only one start gets this far.
        let _ = self.audio_params.set(params);
        self.transition(SessionState::Created, SessionState::Started)
            .map_err(|actual| self.reject("start", actual))?;

        let begun = self.sink.lock().sink.begin(&params);
        begun.map_err(|e| self.sink_failed(e))
    }

    fn audio_available(
        &self,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), SynthesisError> {
        let state = self.load_state();
        if !matches!(state, SessionState::Started | SessionState::Streaming) {
            return Err(self.reject("audio_available", state));
        }
        let chunk = checked_range(buffer, offset, length)?;

        let written = self.sink.lock().sink.write(chunk);
        written.map_err(|e| self.sink_failed(e))?;

        if state == SessionState::Started {
            // A concurrent stop wins; this chunk was still delivered.
            let _ = self.transition(SessionState::Started, SessionState::Streaming);
        }
        Ok(())
    }

    fn done(&self) -> Result<(), SynthesisError> {
        let state = self.load_state();
        if !matches!(state, SessionState::Started | SessionState::Streaming) {
            return Err(self.reject("done", state));
        }

        // Claim Done first: a stop landing after this is a no-op, and one
        // landing before it means the sink is aborted instead of finished.
        self.transition(state, SessionState::Done)
            .map_err(|actual| self.reject("done", actual))?;

        let finished = {
            let mut slot = self.sink.lock();
            let result = slot.sink.finish();
            slot.closed = result.is_ok();
            result
        };
        finished.map_err(|e| self.finish_failed(e))
    }

    fn error(&self) -> Result<(), SynthesisError> {
        match self.terminate(SessionState::Error) {
            Ok(previous) => {
                log::warn!("engine reported synthesis failure in state {previous:?}");
                self.abort_sink();
                Ok(())
            }
            Err(state) => Err(self.reject("error", state)),
        }
    }

    fn stop(&self) {
        if let Ok(previous) = self.terminate(SessionState::Stopped) {
            log::debug!("stop requested in state {previous:?}");
        }
    }

    fn state(&self) -> SessionState {
        self.load_state()
    }

    fn audio_params(&self) -> Option<AudioParams> {
        self.audio_params.get().copied()
    }
}
