use crate::params::{SynthesisParams, DEFAULT_RATE};
use crate::{BatchEngine, SynthesisResult};

/// Renders silence: a fixed duration per non-whitespace character, scaled by
/// the request's speech rate. Empty text renders zero samples.
#[derive(Debug, Clone)]
pub struct SilenceEngine {
    pub sample_rate: u32,
    /// Milliseconds per character at [`DEFAULT_RATE`].
    pub millis_per_char: u32,
}

impl Default for SilenceEngine {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            millis_per_char: 60,
        }
    }
}

impl SilenceEngine {
    fn sample_count(&self, text: &str, speech_rate: i32) -> usize {
        let chars = text.chars().filter(|c| !c.is_whitespace()).count() as u64;
        let rate = speech_rate.max(1) as u64;
        let millis = chars * self.millis_per_char as u64 * DEFAULT_RATE as u64 / rate;
        (millis * self.sample_rate as u64 / 1000) as usize
    }
}

impl BatchEngine for SilenceEngine {
    fn render(
        &mut self,
        text: &str,
        params: &SynthesisParams,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let samples = vec![0.0; self.sample_count(text, params.speech_rate)];
        log::info!("Rendering {} samples of silence", samples.len());
        Ok(SynthesisResult {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SessionState;
    use crate::sink::{MemorySink, StreamOutcome};
    use crate::{SynthesisEngine, SynthesisRequest};

    #[test]
    fn duration_scales_with_rate() {
        let engine = SilenceEngine::default();
        // 5 chars * 60ms = 300ms at 16kHz.
        assert_eq!(engine.sample_count("hello", DEFAULT_RATE), 4800);
        assert_eq!(engine.sample_count("hello", 200), 2400);
        assert_eq!(engine.sample_count("  ", DEFAULT_RATE), 0);
    }

    #[test]
    fn empty_text_streams_nothing_and_completes() {
        let sink = MemorySink::new();
        let captured = sink.handle();
        let request = SynthesisRequest::new("", sink);

        SilenceEngine::default().streamed().synthesize(&request).unwrap();

        assert_eq!(request.state(), SessionState::Done);
        assert!(captured.data().is_empty());
        assert_eq!(captured.outcome(), Some(StreamOutcome::Finished));
    }

    #[test]
    fn render_to_file_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silence.wav");
        SilenceEngine::default()
            .render_to_file("abc", &SynthesisParams::default(), &path)
            .unwrap();
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 2880);
    }
}
