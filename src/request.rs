use crate::error::SynthesisError;
use crate::format::{AudioFormat, AudioParams};
use crate::params::{Locale, SynthesisParams};
use crate::session::StreamingSession;
use crate::sink::AudioSink;

/// Lifecycle of a synthesis request.
///
/// `Done`, `Stopped` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    Created = 0,
    Started = 1,
    Streaming = 2,
    Done = 3,
    Stopped = 4,
    Error = 5,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Stopped | SessionState::Error
        )
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Created,
            1 => SessionState::Started,
            2 => SessionState::Streaming,
            3 => SessionState::Done,
            4 => SessionState::Stopped,
            _ => SessionState::Error,
        }
    }
}

/// Closed result code for a producer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

impl<T> From<&Result<T, SynthesisError>> for Status {
    fn from(result: &Result<T, SynthesisError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(_) => Status::Error,
        }
    }
}

/// Callback surface an engine drives while synthesizing a request.
///
/// `start`, `audio_available`, `done` and `error` are producer calls: they
/// are only made from the engine's synthesis thread, one at a time. `stop`
/// may be called from any thread at any time. Any `Err` from a producer call
/// means the engine must stop driving this request.
pub trait SynthesisCallback: Send + Sync {
    /// Preferred upper bound on the bytes passed to one `audio_available`
    /// call. Larger in-bounds chunks are still accepted.
    fn max_buffer_size(&self) -> usize;

    /// Announce the output format. Accepted at most once.
    fn start(
        &self,
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
    ) -> Result<(), SynthesisError>;

    /// Forward `buffer[offset..offset + length]` to the audio sink.
    ///
    /// The data has been consumed when this returns, so the caller may reuse
    /// `buffer` immediately.
    fn audio_available(
        &self,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), SynthesisError>;

    /// Signal that all audio has been delivered.
    fn done(&self) -> Result<(), SynthesisError>;

    /// Signal that the engine failed and will deliver no more audio.
    fn error(&self) -> Result<(), SynthesisError>;

    /// Request early termination; takes effect at the next producer call.
    fn stop(&self);

    fn state(&self) -> SessionState;

    /// Format recorded by a successful `start`.
    fn audio_params(&self) -> Option<AudioParams>;

    /// Deliver a fully rendered utterance: `start`, the audio split into
    /// chunks of whole frames no larger than `max_buffer_size` (at least one
    /// frame), then `done`. If anything fails after `start` succeeded the
    /// request is closed out with `error` unless it is already terminal.
    fn complete_audio_available(
        &self,
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), SynthesisError> {
        let audio = checked_range(buffer, offset, length)?;
        self.start(sample_rate_hz, format, channel_count)?;

        let frame = format.bytes_per_sample() * channel_count as usize;
        let step = (self.max_buffer_size() / frame).max(1) * frame;
        let delivered = audio
            .chunks(step)
            .try_for_each(|chunk| self.audio_available(chunk, 0, chunk.len()))
            .and_then(|()| self.done());
        if delivered.is_err() && !self.state().is_terminal() {
            let _ = self.error();
        }
        delivered
    }
}

pub(crate) fn checked_range(
    buffer: &[u8],
    offset: usize,
    length: usize,
) -> Result<&[u8], SynthesisError> {
    offset
        .checked_add(length)
        .filter(|&end| end <= buffer.len())
        .map(|end| &buffer[offset..end])
        .ok_or_else(|| {
            SynthesisError::InvalidArgument(format!(
                "range {offset}+{length} exceeds buffer of {} bytes",
                buffer.len()
            ))
        })
}

/// A request for speech synthesis given to an engine for processing.
///
/// The driver configures the request through `&mut self` setters, then
/// shares it (typically through an `Arc`) with the engine thread and any
/// thread that may need to [`stop`](Self::stop) it. Once `start` has been
/// accepted the text and parameters never change, so the engine reads them
/// without locking.
pub struct SynthesisRequest {
    text: String,
    params: SynthesisParams,
    callback: Box<dyn SynthesisCallback>,
}

impl SynthesisRequest {
    /// Create a request with default parameters that streams into `sink`.
    pub fn new(text: impl Into<String>, sink: impl AudioSink + 'static) -> Self {
        Self::with_params(text, SynthesisParams::default(), sink)
    }

    pub fn with_params(
        text: impl Into<String>,
        params: SynthesisParams,
        sink: impl AudioSink + 'static,
    ) -> Self {
        Self::with_callback(text, params, StreamingSession::new(sink))
    }

    /// Create a request around a custom callback implementation.
    pub fn with_callback(
        text: impl Into<String>,
        params: SynthesisParams,
        callback: impl SynthesisCallback + 'static,
    ) -> Self {
        Self {
            text: text.into(),
            params,
            callback: Box::new(callback),
        }
    }

    /// Sets the locale for the request.
    pub fn set_language(
        &mut self,
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Result<(), SynthesisError> {
        self.ensure_configurable("set_language")?;
        self.params.locale = Locale::new(language, country, variant);
        Ok(())
    }

    pub fn set_speech_rate(&mut self, speech_rate: i32) -> Result<(), SynthesisError> {
        self.ensure_configurable("set_speech_rate")?;
        self.params.speech_rate = speech_rate;
        Ok(())
    }

    pub fn set_pitch(&mut self, pitch: i32) -> Result<(), SynthesisError> {
        self.ensure_configurable("set_pitch")?;
        self.params.pitch = pitch;
        Ok(())
    }

    fn ensure_configurable(&self, operation: &'static str) -> Result<(), SynthesisError> {
        match self.callback.state() {
            SessionState::Created => Ok(()),
            state => {
                log::warn!("{operation} called after synthesis began ({state:?})");
                Err(SynthesisError::InvalidState { operation, state })
            }
        }
    }

    /// Gets the text which should be synthesized.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    pub fn locale(&self) -> &Locale {
        &self.params.locale
    }

    pub fn language(&self) -> &str {
        &self.params.locale.language
    }

    pub fn country(&self) -> &str {
        &self.params.locale.country
    }

    pub fn variant(&self) -> &str {
        &self.params.locale.variant
    }

    /// [`DEFAULT_RATE`](crate::DEFAULT_RATE) is the normal rate.
    pub fn speech_rate(&self) -> i32 {
        self.params.speech_rate
    }

    /// [`DEFAULT_PITCH`](crate::DEFAULT_PITCH) is the normal pitch.
    pub fn pitch(&self) -> i32 {
        self.params.pitch
    }

    pub fn callback(&self) -> &dyn SynthesisCallback {
        self.callback.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.callback.state()
    }

    pub fn audio_params(&self) -> Option<AudioParams> {
        self.callback.audio_params()
    }

    pub fn max_buffer_size(&self) -> usize {
        self.callback.max_buffer_size()
    }

    pub fn start(
        &self,
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
    ) -> Result<(), SynthesisError> {
        self.callback.start(sample_rate_hz, format, channel_count)
    }

    pub fn audio_available(
        &self,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), SynthesisError> {
        self.callback.audio_available(buffer, offset, length)
    }

    pub fn done(&self) -> Result<(), SynthesisError> {
        self.callback.done()
    }

    pub fn error(&self) -> Result<(), SynthesisError> {
        self.callback.error()
    }

    pub fn complete_audio_available(
        &self,
        sample_rate_hz: u32,
        format: AudioFormat,
        channel_count: u16,
        buffer: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), SynthesisError> {
        self.callback.complete_audio_available(
            sample_rate_hz,
            format,
            channel_count,
            buffer,
            offset,
            length,
        )
    }

    /// Aborts the request. Can be called from multiple threads.
    pub fn stop(&self) {
        self.callback.stop()
    }
}

impl std::fmt::Debug for SynthesisRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisRequest")
            .field("text", &self.text)
            .field("params", &self.params)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, StreamOutcome};
    use crate::{DEFAULT_PITCH, DEFAULT_RATE};

    #[test]
    fn setters_work_before_start() {
        let mut request = SynthesisRequest::new("hello", MemorySink::new());
        request.set_language("eng", "USA", "").unwrap();
        request.set_speech_rate(150).unwrap();
        request.set_pitch(90).unwrap();

        assert_eq!(request.language(), "eng");
        assert_eq!(request.country(), "USA");
        assert_eq!(request.variant(), "");
        assert_eq!(request.speech_rate(), 150);
        assert_eq!(request.pitch(), 90);
        assert_eq!(request.state(), SessionState::Created);
    }

    #[test]
    fn unset_request_uses_defaults() {
        let request = SynthesisRequest::new("", MemorySink::new());
        assert_eq!(request.text(), "");
        assert!(request.locale().is_unset());
        assert_eq!(request.speech_rate(), DEFAULT_RATE);
        assert_eq!(request.pitch(), DEFAULT_PITCH);
    }

    #[test]
    fn setters_are_rejected_once_started() {
        let mut request = SynthesisRequest::new("hello", MemorySink::new());
        request.set_pitch(120).unwrap();
        request.start(16000, AudioFormat::Pcm16, 1).unwrap();

        let err = request.set_pitch(50).unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::InvalidState {
                operation: "set_pitch",
                state: SessionState::Started
            }
        ));
        assert!(request.set_speech_rate(10).is_err());
        assert!(request.set_language("fra", "", "").is_err());

        assert_eq!(request.pitch(), 120);
        assert_eq!(request.speech_rate(), DEFAULT_RATE);
        assert!(request.locale().is_unset());
        assert_eq!(request.state(), SessionState::Started);
    }

    #[test]
    fn setters_are_rejected_after_stop() {
        let mut request = SynthesisRequest::new("hello", MemorySink::new());
        request.stop();
        assert!(request.set_speech_rate(200).is_err());
        assert_eq!(request.speech_rate(), DEFAULT_RATE);
    }

    #[test]
    fn status_maps_results() {
        let request = SynthesisRequest::new("hello", MemorySink::new());
        assert_eq!(Status::from(&request.done()), Status::Error);
        assert_eq!(
            Status::from(&request.start(8000, AudioFormat::Pcm8, 1)),
            Status::Success
        );
    }

    #[test]
    fn complete_audio_available_chunks_on_frame_boundaries() {
        let sink = MemorySink::new();
        let captured = sink.handle();
        let request = SynthesisRequest::with_callback(
            "hello",
            SynthesisParams::default(),
            StreamingSession::with_max_buffer_size(sink, 7),
        );
        let audio: Vec<u8> = (0..20).collect();

        request
            .complete_audio_available(16000, AudioFormat::Pcm16, 1, &audio, 2, 16)
            .unwrap();

        assert_eq!(request.state(), SessionState::Done);
        assert_eq!(captured.data(), audio[2..18].to_vec());
        // 7 bytes rounds down to 3 whole 16-bit frames per chunk.
        assert_eq!(captured.chunk_sizes(), vec![6, 6, 4]);
    }

    #[test]
    fn complete_audio_available_sends_whole_frames_below_preferred_size() {
        let sink = MemorySink::new();
        let captured = sink.handle();
        let request = SynthesisRequest::with_callback(
            "hello",
            SynthesisParams::default(),
            StreamingSession::with_max_buffer_size(sink, 1),
        );

        request
            .complete_audio_available(16000, AudioFormat::Pcm16, 1, &[0u8; 4], 0, 4)
            .unwrap();

        assert_eq!(request.state(), SessionState::Done);
        assert_eq!(captured.chunk_sizes(), vec![2, 2]);
    }

    #[test]
    fn complete_audio_available_closes_out_on_sink_failure() {
        let sink = MemorySink::with_limit(4);
        let captured = sink.handle();
        let request = SynthesisRequest::with_callback(
            "hello",
            SynthesisParams::default(),
            StreamingSession::with_max_buffer_size(sink, 4),
        );

        let err = request
            .complete_audio_available(16000, AudioFormat::Pcm16, 1, &[0u8; 8], 0, 8)
            .unwrap_err();

        assert!(matches!(err, SynthesisError::SinkRejected(_)));
        assert!(request.state().is_terminal());
        assert_eq!(captured.outcome(), Some(StreamOutcome::Aborted));
    }

    #[test]
    fn complete_audio_available_checks_range_before_starting() {
        let request = SynthesisRequest::new("hello", MemorySink::new());
        let audio = [0u8; 4];
        let err = request
            .complete_audio_available(16000, AudioFormat::Pcm16, 1, &audio, 2, 4)
            .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidArgument(_)));
        assert_eq!(request.state(), SessionState::Created);
    }
}
