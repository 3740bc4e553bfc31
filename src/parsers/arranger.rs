//! Arranger DSL parser and lowering: chord/arpeggio/progression/note
//! statements → `NoteEvent`s, wrapped one-per-statement into an `add_midi`
//! `Action` (SPEC_FULL §4.3 "Arranger lowering").
//!
//! Chord voicings default to octave 4, matching the `ChordToMIDI` boundary
//! laws of SPEC_FULL §8 (`ChordToMIDI("C", 4) = [48, 52, 55]`).

use super::music_theory::{chord_to_midi, note_name_to_midi};
use super::rhythm::{self, RhythmTemplate};
use super::tokenizer::{Cursor, Token, tokenize};
use crate::types::{Action, ActionKind, NoteEvent, TrackSelector, validate_action_ranges};

const DEFAULT_OCTAVE: i32 = 4;
const DEFAULT_VELOCITY: u8 = 100;
const SIXTEENTH_NOTE: f64 = 0.25;
const DEFAULT_STATEMENT_LENGTH: f64 = 4.0;

#[derive(Debug, Clone)]
enum IntermediateOp {
    Arpeggio {
        symbol: String,
        note_duration: f64,
        length: f64,
        rhythm_template: Option<String>,
    },
    Chord {
        symbol: String,
        length: f64,
    },
    Progression {
        chords: Vec<String>,
        length: f64,
    },
    Note {
        pitch: String,
        duration: f64,
    },
}

pub fn parse(dsl: &str) -> Result<Vec<Action>, String> {
    let ops = parse_ops(dsl)?;
    ops.iter().map(lower_statement).collect()
}

fn parse_ops(dsl: &str) -> Result<Vec<IntermediateOp>, String> {
    let tokens = tokenize(dsl)?;
    let mut cursor = Cursor::new(&tokens);
    let mut ops = Vec::new();

    while !cursor.is_at_end() {
        let head = cursor.expect_ident()?;
        cursor.expect(&Token::LParen)?;
        let op = match head.as_str() {
            "arpeggio" => parse_arpeggio(&mut cursor)?,
            "chord" => parse_chord(&mut cursor)?,
            "progression" => parse_progression(&mut cursor)?,
            "note" => parse_note(&mut cursor)?,
            other => return Err(format!("unknown arranger statement '{other}'")),
        };
        cursor.expect(&Token::RParen)?;
        cursor.eat(&Token::Semicolon);
        ops.push(op);
    }

    Ok(ops)
}

fn expect_key(cursor: &mut Cursor, key: &str) -> Result<(), String> {
    let name = cursor.expect_ident()?;
    if name != key {
        return Err(format!("expected keyword argument '{key}', found '{name}'"));
    }
    cursor.expect(&Token::Equals)
}

fn parse_chord_symbol_token(cursor: &mut Cursor) -> Result<String, String> {
    match cursor.next() {
        Some(Token::Ident(s)) => Ok(s.clone()),
        Some(t) => Err(format!("expected a chord symbol, found {t:?}")),
        None => Err("expected a chord symbol, found end of input".to_string()),
    }
}

fn parse_arpeggio(cursor: &mut Cursor) -> Result<IntermediateOp, String> {
    expect_key(cursor, "symbol")?;
    let symbol = parse_chord_symbol_token(cursor)?;

    let mut note_duration = SIXTEENTH_NOTE;
    let mut length = DEFAULT_STATEMENT_LENGTH;
    let mut rhythm_template = None;

    while cursor.eat(&Token::Comma) {
        let key = cursor.expect_ident()?;
        cursor.expect(&Token::Equals)?;
        match key.as_str() {
            "note_duration" => note_duration = cursor.expect_number()?,
            "length" => length = cursor.expect_number()?,
            "rhythm_template" => rhythm_template = Some(cursor.expect_str()?),
            other => return Err(format!("unknown arpeggio argument '{other}'")),
        }
    }

    if note_duration <= 0.0 {
        return Err(format!("note_duration {note_duration} must be positive"));
    }
    if length <= 0.0 {
        return Err(format!("length {length} must be positive"));
    }

    Ok(IntermediateOp::Arpeggio {
        symbol,
        note_duration,
        length,
        rhythm_template,
    })
}

fn parse_chord(cursor: &mut Cursor) -> Result<IntermediateOp, String> {
    expect_key(cursor, "symbol")?;
    let symbol = parse_chord_symbol_token(cursor)?;
    let mut length = DEFAULT_STATEMENT_LENGTH;
    if cursor.eat(&Token::Comma) {
        expect_key(cursor, "length")?;
        length = cursor.expect_number()?;
    }
    if length <= 0.0 {
        return Err(format!("length {length} must be positive"));
    }
    Ok(IntermediateOp::Chord { symbol, length })
}

fn parse_progression(cursor: &mut Cursor) -> Result<IntermediateOp, String> {
    expect_key(cursor, "chords")?;
    cursor.expect(&Token::LBracket)?;
    let mut chords = Vec::new();
    if cursor.peek() != Some(&Token::RBracket) {
        loop {
            chords.push(parse_chord_symbol_token(cursor)?);
            if !cursor.eat(&Token::Comma) {
                break;
            }
        }
    }
    cursor.expect(&Token::RBracket)?;
    if chords.is_empty() {
        return Err("progression requires at least one chord".to_string());
    }

    let mut length = chords.len() as f64 * DEFAULT_STATEMENT_LENGTH;
    if cursor.eat(&Token::Comma) {
        expect_key(cursor, "length")?;
        length = cursor.expect_number()?;
    }
    if length <= 0.0 {
        return Err(format!("length {length} must be positive"));
    }
    Ok(IntermediateOp::Progression { chords, length })
}

fn parse_note(cursor: &mut Cursor) -> Result<IntermediateOp, String> {
    expect_key(cursor, "pitch")?;
    let pitch = cursor.expect_str()?;
    let mut duration = DEFAULT_STATEMENT_LENGTH;
    if cursor.eat(&Token::Comma) {
        expect_key(cursor, "duration")?;
        duration = cursor.expect_number()?;
    }
    if duration <= 0.0 {
        return Err(format!("duration {duration} must be positive"));
    }
    Ok(IntermediateOp::Note { pitch, duration })
}

fn lower_statement(op: &IntermediateOp) -> Result<Action, String> {
    let notes = match op {
        IntermediateOp::Arpeggio {
            symbol,
            note_duration,
            length,
            rhythm_template,
        } => lower_arpeggio(symbol, *note_duration, *length, rhythm_template.as_deref())?,
        IntermediateOp::Chord { symbol, length } => lower_chord(symbol, *length)?,
        IntermediateOp::Progression { chords, length } => lower_progression(chords, *length)?,
        IntermediateOp::Note { pitch, duration } => vec![lower_note(pitch, *duration)?],
    };

    let notes_json: Vec<serde_json::Value> = notes
        .iter()
        .map(|n| {
            serde_json::json!({
                "midi_note_number": n.midi_note_number,
                "velocity": n.velocity,
                "start_beats": n.start_beats,
                "duration_beats": n.duration_beats,
            })
        })
        .collect();

    let action = Action::new(ActionKind::AddMidi)
        .with_track(TrackSelector::Selected)
        .with_attr("notes", serde_json::Value::Array(notes_json));
    validate_action_ranges(&action)?;
    Ok(action)
}

/// Arpeggio lowering (SPEC_FULL §4.3/§8): note duration defaults to a
/// sixteenth note; repeat count auto-fills the declared length; a rhythm
/// template overrides per-step offset, velocity accent, and articulation.
fn lower_arpeggio(
    symbol: &str,
    note_duration: f64,
    length: f64,
    rhythm_template: Option<&str>,
) -> Result<Vec<NoteEvent>, String> {
    let tones = chord_to_midi(symbol, DEFAULT_OCTAVE)?;
    if tones.is_empty() {
        return Err(format!("chord '{symbol}' resolved to no tones"));
    }
    let template = RhythmLookupExt::flatten(rhythm_template.map(rhythm::lookup))?;

    let step_count = (length / note_duration).round().max(0.0) as usize;
    let mut notes = Vec::with_capacity(step_count);

    for i in 0..step_count {
        let tone = tones[i % tones.len()];
        if !(0..=127).contains(&tone) {
            return Err(format!("arpeggio tone {tone} out of MIDI range"));
        }

        let nominal_start = i as f64 * note_duration;
        let (start, velocity, duration) = match template {
            Some(t) => {
                let start = nominal_start + t.offset_for_step(i) * note_duration;
                let velocity = t.apply_velocity(i, DEFAULT_VELOCITY);
                let duration = (note_duration * t.articulation).min(note_duration);
                (start.max(0.0), velocity, duration)
            }
            None => (nominal_start, DEFAULT_VELOCITY, note_duration),
        };

        let note = NoteEvent::new(tone as u8, velocity, start, duration);
        if let Some(truncated) = note.truncated_to(length) {
            notes.push(truncated);
        }
    }

    Ok(notes)
}

/// A rhythm template name that fails to resolve is a semantic parse error,
/// not a silent fallback to the default timing.
trait RhythmLookupExt {
    fn flatten(self) -> Result<Option<RhythmTemplate>, String>;
}
impl RhythmLookupExt for Option<Option<RhythmTemplate>> {
    fn flatten(self) -> Result<Option<RhythmTemplate>, String> {
        match self {
            None => Ok(None),
            Some(None) => Err("unknown rhythm_template".to_string()),
            Some(Some(t)) => Ok(Some(t)),
        }
    }
}

fn lower_chord(symbol: &str, length: f64) -> Result<Vec<NoteEvent>, String> {
    let tones = chord_to_midi(symbol, DEFAULT_OCTAVE)?;
    tones
        .into_iter()
        .map(|tone| {
            if !(0..=127).contains(&tone) {
                return Err(format!("chord tone {tone} out of MIDI range"));
            }
            Ok(NoteEvent::new(tone as u8, DEFAULT_VELOCITY, 0.0, length))
        })
        .collect()
}

/// Progression lowering (SPEC_FULL §8): `chord duration = length / len(chords)`.
fn lower_progression(chords: &[String], length: f64) -> Result<Vec<NoteEvent>, String> {
    let chord_duration = length / chords.len() as f64;
    let mut notes = Vec::new();
    for (i, symbol) in chords.iter().enumerate() {
        let tones = chord_to_midi(symbol, DEFAULT_OCTAVE)?;
        let start = i as f64 * chord_duration;
        for tone in tones {
            if !(0..=127).contains(&tone) {
                return Err(format!("chord tone {tone} out of MIDI range"));
            }
            notes.push(NoteEvent::new(
                tone as u8,
                DEFAULT_VELOCITY,
                start,
                chord_duration,
            ));
        }
    }
    Ok(notes)
}

fn lower_note(pitch: &str, duration: f64) -> Result<NoteEvent, String> {
    let midi = note_name_to_midi(pitch)?;
    if !(0..=127).contains(&midi) {
        return Err(format!("note '{pitch}' resolved to out-of-range MIDI {midi}"));
    }
    Ok(NoteEvent::new(midi as u8, DEFAULT_VELOCITY, 0.0, duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes_of(action: &Action) -> Vec<NoteEvent> {
        action
            .attrs
            .get("notes")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| {
                NoteEvent::new(
                    v["midi_note_number"].as_u64().unwrap() as u8,
                    v["velocity"].as_u64().unwrap() as u8,
                    v["start_beats"].as_f64().unwrap(),
                    v["duration_beats"].as_f64().unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn arpeggio_default_sixteenth_notes_fill_declared_length() {
        let actions = parse("arpeggio(symbol=Em, length=4)").unwrap();
        let notes = notes_of(&actions[0]);
        assert_eq!(notes.len(), 16);
        for n in &notes {
            assert_eq!(n.duration_beats, 0.25);
        }
        for pair in notes.windows(2) {
            assert!(pair[1].start_beats > pair[0].start_beats);
        }
    }

    #[test]
    fn progression_splits_length_evenly_across_chords() {
        let actions = parse("progression(chords=[C, Am, F, G], length=16)").unwrap();
        let notes = notes_of(&actions[0]);
        assert_eq!(notes.len(), 12);
        let starts: Vec<f64> = notes.iter().map(|n| n.start_beats).collect();
        assert_eq!(starts, vec![0.0, 0.0, 0.0, 4.0, 4.0, 4.0, 8.0, 8.0, 8.0, 12.0, 12.0, 12.0]);
        assert!(notes.iter().all(|n| n.duration_beats == 4.0));
    }

    #[test]
    fn single_note_call_resolves_pitch() {
        let actions = parse(r#"note(pitch="E1", duration=4)"#).unwrap();
        let notes = notes_of(&actions[0]);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].midi_note_number, 28);
    }

    #[test]
    fn unknown_rhythm_template_is_a_parse_error() {
        let result = parse("arpeggio(symbol=Em, length=4, rhythm_template=\"not-a-template\")");
        assert!(result.is_err());
    }

    #[test]
    fn rhythm_template_never_overlaps_the_next_step() {
        let actions =
            parse("arpeggio(symbol=Cmaj7, note_duration=0.5, length=4, rhythm_template=\"legato\")")
                .unwrap();
        let notes = notes_of(&actions[0]);
        for pair in notes.windows(2) {
            assert!(pair[0].start_beats + pair[0].duration_beats <= pair[1].start_beats + 1e-9);
        }
    }

    #[test]
    fn invalid_chord_root_is_rejected() {
        assert!(parse("chord(symbol=H, length=4)").is_err());
    }
}
