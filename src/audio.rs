//! Synthesized sound output.
//!
//! One `SoundService` is built in `main` and handed to the effect
//! interpreter; nothing else touches the audio device. Cues are short
//! generated tones and the music loop is a generated pattern, so the binary
//! ships no sound assets. Without a working output device the service runs
//! silent.

use std::f32::consts::TAU;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{source::SineWave, OutputStream, OutputStreamHandle, Sink, Source};

const SAMPLE_RATE: u32 = 44_100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Hover,
    Confirm,
    Disabled,
    Randomize,
}

pub struct SoundService {
    backend: Option<Backend>,
    muted: bool,
}

struct Backend {
    _stream: OutputStream,
    music: Sink,
    hover: Sink,
    confirm: Sink,
    disabled: Sink,
    randomize: Sink,
}

impl SoundService {
    pub fn new(muted: bool) -> Result<Self, String> {
        Ok(Self {
            backend: Some(Backend::new()?),
            muted,
        })
    }

    /// A service with no output device; every call is a no-op.
    pub fn disabled(muted: bool) -> Self {
        Self {
            backend: None,
            muted,
        }
    }

    /// Mute pauses the music sink in place; unmute resumes it from where it
    /// stopped. Cues check the flag at play time.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(backend) = &self.backend {
            if muted {
                backend.music.pause();
            } else {
                backend.music.play();
            }
        }
    }

    /// One-shot cue playback. The sink is stopped first so a rapid
    /// re-trigger restarts the cue instead of queueing it, and confirm or
    /// disabled silence an in-flight hover blip before they sound.
    pub fn play(&self, cue: Cue) {
        if self.muted {
            return;
        }
        let Some(backend) = &self.backend else {
            return;
        };
        if matches!(cue, Cue::Confirm | Cue::Disabled) {
            backend.hover.stop();
        }
        let sink = backend.cue_sink(cue);
        sink.stop();
        append_cue(sink, cue);
        sink.play();
    }

    pub fn start_loop(&self) {
        if self.muted {
            return;
        }
        if let Some(backend) = &self.backend {
            backend.music.play();
        }
    }

    pub fn stop_loop(&self) {
        if let Some(backend) = &self.backend {
            backend.music.pause();
        }
    }
}

impl Backend {
    fn new() -> Result<Self, String> {
        let (stream, handle) = OutputStream::try_default().map_err(|err| err.to_string())?;
        let music = make_sink(&handle)?;
        music.append(music_source());
        music.pause();
        Ok(Self {
            _stream: stream,
            music,
            hover: make_sink(&handle)?,
            confirm: make_sink(&handle)?,
            disabled: make_sink(&handle)?,
            randomize: make_sink(&handle)?,
        })
    }

    fn cue_sink(&self, cue: Cue) -> &Sink {
        match cue {
            Cue::Hover => &self.hover,
            Cue::Confirm => &self.confirm,
            Cue::Disabled => &self.disabled,
            Cue::Randomize => &self.randomize,
        }
    }
}

fn make_sink(handle: &OutputStreamHandle) -> Result<Sink, String> {
    Sink::try_new(handle).map_err(|err| err.to_string())
}

fn append_cue(sink: &Sink, cue: Cue) {
    let tone = |freq: f32, ms: u64, amp: f32| {
        SineWave::new(freq)
            .take_duration(Duration::from_millis(ms))
            .amplify(amp)
    };
    match cue {
        Cue::Hover => sink.append(tone(880.0, 35, 0.10)),
        Cue::Confirm => {
            sink.append(tone(659.3, 70, 0.16));
            sink.append(tone(987.8, 110, 0.16));
        }
        Cue::Disabled => {
            sink.append(tone(196.0, 60, 0.18));
            sink.append(tone(185.0, 110, 0.18));
        }
        Cue::Randomize => {
            for freq in [523.3, 659.3, 784.0, 1046.5] {
                sink.append(tone(freq, 45, 0.14));
            }
        }
    }
}

/// Eight-note pattern repeated forever. Each note gets a short linear
/// fade-in/out so the loop seam and note boundaries stay click-free.
fn music_source() -> impl Source<Item = f32> + Send {
    const PATTERN: [(f32, u64); 8] = [
        (220.00, 300),
        (261.63, 300),
        (329.63, 300),
        (261.63, 300),
        (196.00, 300),
        (246.94, 300),
        (293.66, 300),
        (246.94, 300),
    ];
    const AMPLITUDE: f32 = 0.05;

    let fade = SAMPLE_RATE as usize / 100;
    let mut samples = Vec::new();
    for (freq, ms) in PATTERN {
        let len = (SAMPLE_RATE as u64 * ms / 1000) as usize;
        for i in 0..len {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = (i.min(len - i) as f32 / fade as f32).min(1.0);
            samples.push((t * freq * TAU).sin() * AMPLITUDE * envelope);
        }
    }
    SamplesBuffer::new(1, SAMPLE_RATE, samples).repeat_infinite()
}
