use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::AudioSink;
use crate::error::SinkError;
use crate::format::{AudioFormat, AudioParams};

/// Sink that writes the stream to a WAV file.
///
/// Chunks do not need to be sample aligned: a sample split across two
/// chunks is held back until its remaining bytes arrive. If the stream is
/// aborted, or finalizing the header fails, the partial file is removed.
pub struct WavSink {
    path: PathBuf,
    writer: Option<WavWriter<BufWriter<File>>>,
    /// The file exists on disk but has not been finalized.
    partial: bool,
    format: AudioFormat,
    pending: Vec<u8>,
}

impl WavSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            partial: false,
            format: AudioFormat::Pcm16,
            pending: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn wav_spec(params: &AudioParams) -> WavSpec {
    let sample_format = match params.format {
        AudioFormat::Pcm8 | AudioFormat::Pcm16 => SampleFormat::Int,
        AudioFormat::PcmFloat => SampleFormat::Float,
    };
    WavSpec {
        channels: params.channel_count,
        sample_rate: params.sample_rate_hz,
        bits_per_sample: (params.format.bytes_per_sample() * 8) as u16,
        sample_format,
    }
}

impl AudioSink for WavSink {
    fn begin(&mut self, params: &AudioParams) -> Result<(), SinkError> {
        log::info!(
            "Writing {:?} audio at {} Hz to {}",
            params.format,
            params.sample_rate_hz,
            self.path.display()
        );
        self.writer = Some(WavWriter::create(&self.path, wav_spec(params))?);
        self.partial = true;
        self.format = params.format;
        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::NotStarted)?;
        self.pending.extend_from_slice(chunk);

        let width = self.format.bytes_per_sample();
        let whole = self.pending.len() / width * width;
        for s in self.pending[..whole].chunks_exact(width) {
            match self.format {
                // 8-bit WAV is unsigned on disk; hound takes it as i8.
                AudioFormat::Pcm8 => writer.write_sample((s[0] as i16 - 128) as i8)?,
                AudioFormat::Pcm16 => writer.write_sample(i16::from_le_bytes([s[0], s[1]]))?,
                AudioFormat::PcmFloat => {
                    writer.write_sample(f32::from_le_bytes([s[0], s[1], s[2], s[3]]))?
                }
            }
        }
        self.pending.drain(..whole);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let writer = self.writer.take().ok_or(SinkError::NotStarted)?;
        if !self.pending.is_empty() {
            log::warn!(
                "Dropping {} trailing bytes that do not form a whole sample",
                self.pending.len()
            );
            self.pending.clear();
        }
        writer.finalize()?;
        self.partial = false;
        Ok(())
    }

    fn abort(&mut self) {
        self.writer = None;
        self.pending.clear();
        if !std::mem::take(&mut self.partial) {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::info!("Removed partial WAV file {}", self.path.display()),
            Err(e) => log::warn!("Failed to remove {}: {e}", self.path.display()),
        }
    }
}
