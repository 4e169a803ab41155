//! # Pitch Module
//!
//! Equal-temperament pitch math shared by the comparator and by presentation
//! layers that label axes and tooltips.
//!
//! ## Features
//! - Frequency to MIDI-like note number (A4 = 69 = 440 Hz)
//! - Note number to pitch class and octave
//! - Cent deviation from the nearest tempered note
//! - Semitone distance between two frequencies

use std::fmt;

use serde::Serialize;

use crate::error::DiffError;

/// Concert pitch of A4 in Hz.
pub const A4_FREQUENCY_HZ: f64 = 440.0;
/// Note number of A4.
pub const A4_NOTE: i32 = 69;

const CENTS_PER_OCTAVE: f64 = 1200.0;
const SEMITONES_PER_OCTAVE: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// Chromatic order starting at C.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C♯",
            PitchClass::D => "D",
            PitchClass::DSharp => "D♯",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F♯",
            PitchClass::G => "G",
            PitchClass::GSharp => "G♯",
            PitchClass::A => "A",
            PitchClass::ASharp => "A♯",
            PitchClass::B => "B",
        }
    }

    /// Spelling with `#`, as score files write it.
    pub fn as_ascii(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NoteName {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

fn check_frequency(freq_hz: f64) -> Result<f64, DiffError> {
    if freq_hz.is_finite() && freq_hz > 0.0 {
        Ok(freq_hz)
    } else {
        Err(DiffError::InvalidPitch { pitch: freq_hz })
    }
}

/// Nearest equal-tempered note number for a frequency.
///
/// # Arguments
/// * `freq_hz` - Frequency in Hz, must be finite and positive
///
/// # Returns
/// * `round(12 * log2(freq / 440) + 69)`
pub fn note_from_frequency(freq_hz: f64) -> Result<i32, DiffError> {
    let freq_hz = check_frequency(freq_hz)?;
    let note = SEMITONES_PER_OCTAVE * (freq_hz / A4_FREQUENCY_HZ).log2() + A4_NOTE as f64;
    Ok(note.round() as i32)
}

/// Pitch class and octave of a note number. Octave 4 starts at middle C (60).
pub fn note_name(note: i32) -> NoteName {
    NoteName {
        pitch_class: PitchClass::ALL[note.rem_euclid(12) as usize],
        octave: note.div_euclid(12) - 1,
    }
}

/// Equal-tempered frequency of a note number.
pub fn standard_frequency(note: i32) -> f64 {
    A4_FREQUENCY_HZ * 2.0_f64.powf((note - A4_NOTE) as f64 / SEMITONES_PER_OCTAVE)
}

/// Calculates the deviation of a frequency from a tempered note in cents.
///
/// - 100 cents = 1 semitone
/// - Positive values are sharp, negative values flat
pub fn cents_deviation(freq_hz: f64, note: i32) -> Result<f64, DiffError> {
    cents_between(freq_hz, standard_frequency(note))
}

/// Signed interval from `reference_hz` to `freq_hz` in cents.
pub fn cents_between(freq_hz: f64, reference_hz: f64) -> Result<f64, DiffError> {
    let freq_hz = check_frequency(freq_hz)?;
    let reference_hz = check_frequency(reference_hz)?;
    Ok(CENTS_PER_OCTAVE * (freq_hz / reference_hz).log2())
}

/// Unsigned distance between two frequencies in (fractional) semitones.
pub fn semitone_distance(a_hz: f64, b_hz: f64) -> Result<f64, DiffError> {
    Ok((cents_between(a_hz, b_hz)? / 100.0).abs())
}

/// Name of the tempered note closest to a frequency, e.g. `"A♯4"`.
pub fn frequency_to_note_name(freq_hz: f64) -> Result<NoteName, DiffError> {
    note_from_frequency(freq_hz).map(note_name)
}
