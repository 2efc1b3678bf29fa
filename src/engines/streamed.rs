use crate::error::SynthesisError;
use crate::format::AudioFormat;
use crate::request::SynthesisRequest;
use crate::{BatchEngine, SynthesisEngine};

/// Streams the output of a [`BatchEngine`] through a request as mono
/// [`AudioFormat::PcmFloat`], in chunks of at most the request's
/// `max_buffer_size`.
pub struct Streamed<E> {
    inner: E,
}

impl<E: BatchEngine> Streamed<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: BatchEngine> SynthesisEngine for Streamed<E> {
    fn synthesize(&mut self, request: &SynthesisRequest) -> Result<(), SynthesisError> {
        let rendered = match self.inner.render(request.text(), request.params()) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::warn!("Batch render failed: {e}");
                let _ = request.error();
                return Err(SynthesisError::EngineFailed(e.to_string()));
            }
        };
        log::debug!(
            "Rendered {:.2}s of audio for {} chars",
            rendered.duration_secs(),
            request.text().chars().count()
        );

        let bytes = rendered.to_le_bytes();
        let result = request.complete_audio_available(
            rendered.sample_rate,
            AudioFormat::PcmFloat,
            1,
            &bytes,
            0,
            bytes.len(),
        );
        if result.is_err() && !request.state().is_terminal() {
            // A rejected start leaves the request Created; close it out.
            let _ = request.error();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SynthesisParams;
    use crate::request::{SessionState, SynthesisCallback};
    use crate::session::StreamingSession;
    use crate::sink::{MemorySink, StreamOutcome};
    use crate::SynthesisResult;

    struct Fixed(Result<Vec<f32>, &'static str>, u32);

    impl BatchEngine for Fixed {
        fn render(
            &mut self,
            _text: &str,
            _params: &SynthesisParams,
        ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
            match &self.0 {
                Ok(samples) => Ok(SynthesisResult {
                    samples: samples.clone(),
                    sample_rate: self.1,
                }),
                Err(msg) => Err((*msg).into()),
            }
        }
    }

    #[test]
    fn streams_rendered_samples_as_float_bytes() {
        let sink = MemorySink::new();
        let captured = sink.handle();
        let request = SynthesisRequest::with_callback(
            "hi",
            SynthesisParams::default(),
            StreamingSession::with_max_buffer_size(sink, 10),
        );
        let samples = vec![0.5f32, -0.25, 1.0];

        Fixed(Ok(samples.clone()), 24000)
            .streamed()
            .synthesize(&request)
            .unwrap();

        assert_eq!(request.state(), SessionState::Done);
        let params = captured.params().unwrap();
        assert_eq!(params.format, AudioFormat::PcmFloat);
        assert_eq!(params.sample_rate_hz, 24000);
        // 10 byte limit fits two 4-byte samples per chunk.
        assert_eq!(captured.chunk_sizes(), vec![8, 4]);
        let expected: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(captured.data(), expected);
    }

    #[test]
    fn render_failure_ends_request_in_error() {
        let sink = MemorySink::new();
        let captured = sink.handle();
        let request = SynthesisRequest::new("hi", sink);

        let err = Fixed(Err("model missing"), 24000)
            .streamed()
            .synthesize(&request)
            .unwrap_err();

        assert!(matches!(err, SynthesisError::EngineFailed(ref m) if m == "model missing"));
        assert_eq!(request.state(), SessionState::Error);
        assert_eq!(captured.outcome(), Some(StreamOutcome::Aborted));
    }

    #[test]
    fn zero_sample_rate_is_closed_out() {
        let request = SynthesisRequest::new("hi", MemorySink::new());
        let err = Fixed(Ok(vec![0.0]), 0)
            .streamed()
            .synthesize(&request)
            .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidArgument(_)));
        assert_eq!(request.state(), SessionState::Error);
    }

    #[test]
    fn stopped_request_reports_cancelled() {
        let request = SynthesisRequest::new("hi", MemorySink::new());
        request.stop();
        let err = Fixed(Ok(vec![0.0; 16]), 16000)
            .streamed()
            .synthesize(&request)
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(request.callback().state(), SessionState::Stopped);
    }
}
