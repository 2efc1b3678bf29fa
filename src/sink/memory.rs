use std::sync::Arc;

use parking_lot::Mutex;

use super::AudioSink;
use crate::error::SinkError;
use crate::format::AudioParams;

/// How a captured stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Finished,
    Aborted,
}

#[derive(Debug, Default)]
struct Captured {
    params: Option<AudioParams>,
    data: Vec<u8>,
    chunk_sizes: Vec<usize>,
    outcome: Option<StreamOutcome>,
    aborts: usize,
}

/// Sink that copies every chunk into memory.
///
/// Keep a [`CapturedAudio`] handle (from [`handle`](Self::handle)) before
/// moving the sink into a request to inspect what was delivered.
pub struct MemorySink {
    captured: Arc<Mutex<Captured>>,
    limit: Option<usize>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            captured: Arc::new(Mutex::new(Captured::default())),
            limit: None,
        }
    }

    /// A sink that rejects any write that would grow it past `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn handle(&self) -> CapturedAudio {
        CapturedAudio {
            captured: Arc::clone(&self.captured),
        }
    }
}

impl AudioSink for MemorySink {
    fn begin(&mut self, params: &AudioParams) -> Result<(), SinkError> {
        self.captured.lock().params = Some(*params);
        Ok(())
    }

    fn write(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        let mut captured = self.captured.lock();
        if captured.params.is_none() {
            return Err(SinkError::NotStarted);
        }
        if let Some(capacity) = self.limit {
            if captured.data.len() + chunk.len() > capacity {
                return Err(SinkError::Full { capacity });
            }
        }
        captured.data.extend_from_slice(chunk);
        captured.chunk_sizes.push(chunk.len());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.captured.lock().outcome = Some(StreamOutcome::Finished);
        Ok(())
    }

    fn abort(&mut self) {
        let mut captured = self.captured.lock();
        captured.outcome = Some(StreamOutcome::Aborted);
        captured.aborts += 1;
    }
}

/// Shared view of the audio a [`MemorySink`] received.
#[derive(Clone)]
pub struct CapturedAudio {
    captured: Arc<Mutex<Captured>>,
}

impl CapturedAudio {
    pub fn params(&self) -> Option<AudioParams> {
        self.captured.lock().params
    }

    pub fn data(&self) -> Vec<u8> {
        self.captured.lock().data.clone()
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.captured.lock().chunk_sizes.clone()
    }

    pub fn outcome(&self) -> Option<StreamOutcome> {
        self.captured.lock().outcome
    }

    pub fn abort_count(&self) -> usize {
        self.captured.lock().aborts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::AudioFormat;

    #[test]
    fn write_before_begin_is_rejected() {
        let mut sink = MemorySink::new();
        assert!(matches!(sink.write(&[1, 2]), Err(SinkError::NotStarted)));
    }

    #[test]
    fn limit_rejects_overflowing_write() {
        let mut sink = MemorySink::with_limit(4);
        let handle = sink.handle();
        sink.begin(&AudioParams::new(8000, AudioFormat::Pcm8, 1).unwrap())
            .unwrap();
        sink.write(&[1, 2, 3]).unwrap();
        assert!(matches!(
            sink.write(&[4, 5]),
            Err(SinkError::Full { capacity: 4 })
        ));
        sink.write(&[4]).unwrap();
        assert_eq!(handle.data(), vec![1, 2, 3, 4]);
        assert_eq!(handle.chunk_sizes(), vec![3, 1]);
    }
}
