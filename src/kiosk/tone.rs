//! Audible feedback. The kiosk only decides *which* tone to play; the front
//! end synthesises it from the description sent alongside the screen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// A key was accepted.
    Key,
    /// Confirm was pressed on a number that matches no candidate.
    Reject,
    /// A vote is being cast.
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
}

/// One note of a tone, timed from the start of the tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub frequency_hz: u32,
    pub start_ms: u32,
    pub duration_ms: u32,
}

const fn note(frequency_hz: u32, start_ms: u32, duration_ms: u32) -> Note {
    Note {
        frequency_hz,
        start_ms,
        duration_ms,
    }
}

const KEY_NOTES: [Note; 1] = [note(880, 0, 50)];
const REJECT_NOTES: [Note; 1] = [note(440, 0, 100)];
const CONFIRM_NOTES: [Note; 4] = [
    note(1100, 0, 150),
    note(1100, 150, 150),
    note(1100, 300, 150),
    note(1350, 450, 500),
];

impl Tone {
    pub fn waveform(self) -> Waveform {
        match self {
            Self::Key | Self::Reject => Waveform::Sine,
            Self::Confirm => Waveform::Square,
        }
    }

    pub fn notes(self) -> &'static [Note] {
        match self {
            Self::Key => &KEY_NOTES,
            Self::Reject => &REJECT_NOTES,
            Self::Confirm => &CONFIRM_NOTES,
        }
    }
}

/// Everything the front end needs to play a tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneDesc {
    pub tone: Tone,
    pub waveform: Waveform,
    pub notes: Vec<Note>,
}

impl From<Tone> for ToneDesc {
    fn from(tone: Tone) -> Self {
        Self {
            tone,
            waveform: tone.waveform(),
            notes: tone.notes().to_vec(),
        }
    }
}
