//! `NoteEvent` and `DrumPattern`: the composition/arranger output units.

use serde::{Deserialize, Serialize};

/// The atomic unit of composition output (SPEC_FULL §3/§8).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub midi_note_number: u8,
    pub velocity: u8,
    pub start_beats: f64,
    pub duration_beats: f64,
}

impl NoteEvent {
    pub fn new(midi_note_number: u8, velocity: u8, start_beats: f64, duration_beats: f64) -> Self {
        Self {
            midi_note_number,
            velocity,
            start_beats,
            duration_beats,
        }
    }

    /// SPEC_FULL §8 invariant check.
    pub fn is_valid(&self) -> bool {
        self.midi_note_number <= 127
            && self.velocity >= 1
            && self.velocity <= 127
            && self.duration_beats > 0.0
            && self.start_beats >= 0.0
    }

    /// Truncate so `start_beats + duration_beats` never exceeds
    /// `clip_length_beats`, per SPEC_FULL §3. Returns `None` if the note
    /// starts at or past the clip boundary (nothing left to keep).
    pub fn truncated_to(mut self, clip_length_beats: f64) -> Option<Self> {
        if self.start_beats >= clip_length_beats {
            return None;
        }
        let max_duration = clip_length_beats - self.start_beats;
        if self.duration_beats > max_duration {
            self.duration_beats = max_duration;
        }
        Some(self)
    }
}

/// Grid character codes per SPEC_FULL §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridStep {
    Hit,
    Accent,
    Ghost,
    Rest,
}

impl GridStep {
    pub fn velocity(self) -> u8 {
        match self {
            GridStep::Hit => 100,
            GridStep::Accent => 127,
            GridStep::Ghost => 60,
            GridStep::Rest => 0,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'x' => Some(GridStep::Hit),
            'X' => Some(GridStep::Accent),
            'o' => Some(GridStep::Ghost),
            '-' => Some(GridStep::Rest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrumPattern {
    pub drum_name: String,
    pub grid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity: Option<u8>,
}

/// The fixed enumeration of canonical drum names from SPEC_FULL §4.2.
pub const CANONICAL_DRUM_NAMES: &[&str] = &[
    "kick",
    "snare",
    "closed_hihat",
    "open_hihat",
    "crash",
    "ride",
    "low_tom",
    "mid_tom",
    "high_tom",
    "clap",
    "rimshot",
    "cowbell",
    "tambourine",
    "shaker",
];

impl DrumPattern {
    pub fn is_canonical_drum(name: &str) -> bool {
        CANONICAL_DRUM_NAMES.contains(&name)
    }

    /// Validate grid characters per SPEC_FULL §3 ("grid character validation
    /// is done here" — §4.3 Drummer lowering).
    pub fn validate_grid(grid: &str) -> Result<(), String> {
        if grid.is_empty() {
            return Err("grid must not be empty".to_string());
        }
        for c in grid.chars() {
            if GridStep::from_char(c).is_none() {
                return Err(format!("invalid grid character '{c}'"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_note_passes_invariants() {
        let n = NoteEvent::new(60, 100, 0.0, 1.0);
        assert!(n.is_valid());
    }

    #[test]
    fn zero_duration_is_invalid() {
        let n = NoteEvent::new(60, 100, 0.0, 0.0);
        assert!(!n.is_valid());
    }

    #[test]
    fn overshoot_is_truncated_at_clip_boundary() {
        let n = NoteEvent::new(60, 100, 3.5, 2.0);
        let truncated = n.truncated_to(4.0).unwrap();
        assert_eq!(truncated.duration_beats, 0.5);
    }

    #[test]
    fn note_past_clip_end_is_dropped() {
        let n = NoteEvent::new(60, 100, 5.0, 1.0);
        assert!(n.truncated_to(4.0).is_none());
    }

    #[test]
    fn grid_rejects_unknown_characters() {
        assert!(DrumPattern::validate_grid("x-X-o-q-").is_err());
        assert!(DrumPattern::validate_grid("x---x---x---x---").is_ok());
    }
}
