//! Alarm tones
//!
//! Uses rodio to play a generated beep pattern on a detached thread.

use rodio::source::{SineWave, Zero};
use rodio::{OutputStreamBuilder, Sink, Source};
use std::time::Duration;
use tracing::debug;

use crate::config::AlarmSettings;

/// Play the alarm pattern without blocking the caller
///
/// A missing or busy audio device only produces a debug log entry.
pub fn play_alarm(settings: &AlarmSettings) {
    let settings = settings.clone();
    std::thread::spawn(move || {
        if let Err(e) = play_beeps(&settings) {
            debug!(error = %e, "alarm sound unavailable");
        }
    });
}

fn play_beeps(settings: &AlarmSettings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _stream = OutputStreamBuilder::open_default_stream()?;
    let sink = Sink::connect_new(_stream.mixer());

    let beep = Duration::from_millis(settings.beep_duration_ms);
    let pause = Duration::from_millis(settings.beep_pause_ms);

    for _ in 0..settings.beeps {
        let source = SineWave::new(settings.frequency)
            .take_duration(beep)
            .amplify(settings.volume);
        sink.append(source);

        let silence = Zero::new(2, settings.sample_rate).take_duration(pause);
        sink.append(silence);
    }

    sink.sleep_until_end();
    Ok(())
}
