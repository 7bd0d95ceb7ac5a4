// Copyright (c) 2024 Mike Tsao

use super::FrequencyHz;
use anyhow::anyhow;
use core::{fmt::Display, str::FromStr};
use serde::{Deserialize, Serialize};

/// A MIDI note number, 0..=127.
///
/// There are two different mappings of piano notes to MIDI numbers. They both
/// agree that MIDI note 0 is a C, but they otherwise differ by an octave. We
/// use C4=60, so the notes 0-11 are in octave -1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Note(pub u8);
#[allow(missing_docs)]
impl Note {
    pub const MIN: Note = Note(0);
    pub const MAX: Note = Note(127);
    pub const A4: Note = Note(69);
    pub const C4: Note = Note(60);

    const NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    /// Returns the note's name without octave, such as "F#".
    pub fn name(&self) -> &'static str {
        Self::NAMES[(self.0 % 12) as usize]
    }

    /// Returns the octave, with C4 = 60.
    pub fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }
}
impl Display for Note {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}
impl From<u8> for Note {
    fn from(value: u8) -> Self {
        Self(value.min(Self::MAX.0))
    }
}
impl From<Note> for u8 {
    fn from(value: Note) -> Self {
        value.0
    }
}
impl FromStr for Note {
    type Err = anyhow::Error;

    /// Parses names like "C4", "F#3", "Bb2", and "C-1".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars().peekable();
        let letter = chars
            .next()
            .ok_or_else(|| anyhow!("empty note name"))?
            .to_ascii_uppercase();
        let mut semitone: i16 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(anyhow!("{s} doesn't start with a note letter")),
        };
        match chars.peek() {
            Some('#') | Some('s') => {
                semitone += 1;
                chars.next();
            }
            Some('b') => {
                semitone -= 1;
                chars.next();
            }
            _ => {}
        }
        let octave: String = chars.collect();
        let octave: i16 = octave
            .parse()
            .map_err(|_| anyhow!("{s} has an invalid octave"))?;
        if !(-1..=9).contains(&octave) {
            return Err(anyhow!("{s} is outside the MIDI note range"));
        }
        let value = (octave + 1) * 12 + semitone;
        if (Self::MIN.0 as i16..=Self::MAX.0 as i16).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(anyhow!("{s} is outside the MIDI note range"))
        }
    }
}

/// Maps a [Note] to the frequency it should sound at.
pub trait MapsPitch {
    /// Returns the base frequency for the given note.
    fn note_to_frequency(&self, note: Note) -> FrequencyHz;
}
impl<F> MapsPitch for F
where
    F: Fn(Note) -> FrequencyHz,
{
    fn note_to_frequency(&self, note: Note) -> FrequencyHz {
        self(note)
    }
}

/// Twelve-tone equal temperament, tuned relative to A4.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EqualTemperament {
    /// The frequency of A4 (MIDI note 69).
    pub a4: FrequencyHz,
}
impl Default for EqualTemperament {
    fn default() -> Self {
        Self {
            a4: FrequencyHz(440.0),
        }
    }
}
impl MapsPitch for EqualTemperament {
    fn note_to_frequency(&self, note: Note) -> FrequencyHz {
        FrequencyHz(self.a4.0 * 2.0f64.powf((note.0 as f64 - Note::A4.0 as f64) / 12.0))
    }
}
