use std::f32::consts::PI;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rodio::{OutputStream, Sink, Source};

use super::{AlertEvent, AlertSink};

const CHIME_FREQUENCY_HZ: f32 = 1000.0;
const CHIME_DURATION_MS: u64 = 500;

/// A short synthesized sine chime.
pub struct AlertChime {
    frequency: f32,
    sample_rate: u32,
    num_sample: usize,
    total_samples: usize,
}

impl AlertChime {
    pub fn new(frequency: f32, duration: Duration) -> Self {
        let sample_rate = 44100;
        let total_samples = (duration.as_secs_f32() * sample_rate as f32) as usize;
        Self {
            frequency,
            sample_rate,
            num_sample: 0,
            total_samples,
        }
    }
}

impl Iterator for AlertChime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }
        self.num_sample += 1;

        let t = self.num_sample as f32 / self.sample_rate as f32;
        let sample = (2.0 * PI * self.frequency * t).sin();

        Some(sample * 0.15) // Lower amplitude to prevent clipping
    }
}

impl Source for AlertChime {
    fn current_frame_len(&self) -> Option<usize> {
        None // Length comes from the iterator running out
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(
            (self.total_samples as u64 * 1000) / self.sample_rate as u64,
        ))
    }
}

/// Default delivery: play the chime on the system output device.
///
/// The output stream is opened per delivery because rodio stream handles
/// are not `Send`; deliveries happen on the dispatch thread and a beep at
/// most every few seconds keeps that cheap enough.
pub struct ChimeAlertSink;

impl AlertSink for ChimeAlertSink {
    fn deliver(&self, _event: AlertEvent) -> Result<()> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|err| anyhow!("failed to open audio output: {err}"))?;
        let sink = Sink::try_new(&handle)
            .map_err(|err| anyhow!("failed to create audio sink: {err}"))?;

        sink.append(AlertChime::new(
            CHIME_FREQUENCY_HZ,
            Duration::from_millis(CHIME_DURATION_MS),
        ));
        sink.sleep_until_end();
        Ok(())
    }
}
