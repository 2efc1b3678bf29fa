use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tts_request::{
    engines::SilenceEngine,
    sink::{ChannelSink, SinkEvent, WavSink},
    BatchEngine, SynthesisEngine, SynthesisParams, SynthesisRequest,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let params = match std::env::args().nth(1) {
        Some(path) => SynthesisParams::from_json_file(&PathBuf::from(path))?,
        None => SynthesisParams::default(),
    };
    println!("Using params: {params:?}");

    let text = "Hello! This request streams synthesized audio through the callback protocol.";

    // Stream to a WAV file on the calling thread.
    let request = SynthesisRequest::with_params(text, params.clone(), WavSink::new("output.wav"));
    let synth_start = Instant::now();
    SilenceEngine::default().streamed().synthesize(&request)?;
    println!(
        "Finished in {:.2?} with state {:?}; saved to output.wav",
        synth_start.elapsed(),
        request.state()
    );

    // Stream to a consumer thread and cancel from the driver.
    let (sink, events) = ChannelSink::bounded(1);
    let request = Arc::new(SynthesisRequest::with_params(text, params, sink));
    let engine_thread = {
        let request = Arc::clone(&request);
        thread::spawn(move || {
            let mut engine = SilenceEngine::default().streamed();
            engine.synthesize(&request)
        })
    };

    let consumer = thread::spawn(move || {
        let mut bytes = 0;
        for event in events {
            match event {
                SinkEvent::Audio(chunk) => {
                    bytes += chunk.len();
                    // Simulate a real-time playback device.
                    thread::sleep(Duration::from_millis(5));
                }
                SinkEvent::Begin(params) => println!("Playback format: {params:?}"),
                end => println!("Playback ended: {end:?}"),
            }
        }
        bytes
    });

    thread::sleep(Duration::from_millis(20));
    request.stop();

    match engine_thread.join().map_err(|_| "engine thread panicked")? {
        Ok(()) => println!("Synthesis completed before stop"),
        Err(e) if e.is_cancelled() => println!("Synthesis stopped: state {:?}", request.state()),
        Err(e) => return Err(e.into()),
    }
    drop(request);

    let played = consumer.join().map_err(|_| "consumer thread panicked")?;
    println!("Consumer received {played} bytes");
    Ok(())
}
