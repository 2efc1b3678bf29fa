//! # tts-request
//!
//! The contract between a text-to-speech engine and the component driving it.
//!
//! A [`SynthesisRequest`] carries the text and parameters (locale, rate,
//! pitch) into an engine and receives the synthesized audio back through a
//! narrow, ordered callback protocol:
//!
//! - the engine calls [`start`](SynthesisRequest::start) once with the output
//!   format, then [`audio_available`](SynthesisRequest::audio_available) for
//!   every chunk, then [`done`](SynthesisRequest::done);
//! - every chunk is forwarded synchronously to an [`AudioSink`] before the call
//!   returns, so the engine may reuse its buffer right away;
//! - any thread may call [`stop`](SynthesisRequest::stop); the next producer
//!   call returns [`SynthesisError::Cancelled`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tts_request::engines::SilenceEngine;
//! use tts_request::sink::MemorySink;
//! use tts_request::{BatchEngine, SynthesisEngine, SynthesisRequest};
//!
//! let sink = MemorySink::new();
//! let captured = sink.handle();
//!
//! let mut request = SynthesisRequest::new("Hello, world!", sink);
//! request.set_language("eng", "USA", "")?;
//! request.set_speech_rate(150)?;
//!
//! let request = Arc::new(request);
//! let mut engine = SilenceEngine::default().streamed();
//! engine.synthesize(&request)?;
//!
//! assert!(request.state().is_terminal());
//! assert!(!captured.data().is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;
pub mod error;
pub mod format;
pub mod params;
pub mod request;
pub mod session;
pub mod sink;

use std::path::Path;

pub use error::{SinkError, SynthesisError};
pub use format::{AudioFormat, AudioParams};
pub use params::{Locale, SynthesisParams, SynthesisParamsBuilder, DEFAULT_PITCH, DEFAULT_RATE};
pub use request::{SessionState, Status, SynthesisCallback, SynthesisRequest};
pub use session::{StreamingSession, DEFAULT_MAX_BUFFER_SIZE};
pub use sink::AudioSink;

/// A whole utterance rendered by a [`BatchEngine`].
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw mono audio samples as f32 values
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples as little-endian bytes, the `PcmFloat` wire layout.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// An engine that drives a [`SynthesisRequest`] through its callbacks.
///
/// Implementations run on the engine's synthesis thread. They must leave the
/// request in a terminal state: after a successful `start` either `done` or
/// `error` is called, or a stop is observed.
pub trait SynthesisEngine {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError>;
}

/// Engines that render a whole utterance at once.
///
/// Wrap one in [`engines::Streamed`] to drive a request with it.
pub trait BatchEngine {
    fn render(
        &mut self,
        text: &str,
        params: &SynthesisParams,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Render and write straight to a WAV file.
    ///
    /// Default implementation calls `render()` then `SynthesisResult::write_wav()`.
    fn render_to_file(
        &mut self,
        text: &str,
        params: &SynthesisParams,
        wav_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.render(text, params)?.write_wav(wav_path)
    }

    fn streamed(self) -> engines::Streamed<Self>
    where
        Self: Sized,
    {
        engines::Streamed::new(self)
    }
}
