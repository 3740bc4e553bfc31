//! Pure music-theory functions: note-name/chord resolution to MIDI numbers.
//!
//! Grounded in the scale-semitone-table idiom of a MIDI-generation utility:
//! small `&'static [i8]` interval tables keyed by an enum, looked up with a
//! plain `match`, no external music-theory crate.

/// `A–G` with `#`/`b` accidentals and a signed octave. `C4 = 60`
/// (SPEC_FULL §8).
pub fn note_name_to_midi(name: &str) -> Result<i32, String> {
    let name = name.trim();
    let mut chars = name.chars().peekable();

    let letter = chars
        .next()
        .ok_or_else(|| "empty note name".to_string())?
        .to_ascii_uppercase();
    let base = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        other => return Err(format!("invalid note letter '{other}'")),
    };

    let mut accidental = 0i32;
    if let Some(&c) = chars.peek() {
        match c {
            '#' => {
                accidental = 1;
                chars.next();
            }
            'b' => {
                accidental = -1;
                chars.next();
            }
            _ => {}
        }
    }

    let octave_str: String = chars.collect();
    if octave_str.is_empty() {
        return Err(format!("missing octave in note name '{name}'"));
    }
    let octave: i32 = octave_str
        .parse()
        .map_err(|_| format!("invalid octave '{octave_str}' in note name '{name}'"))?;

    // MIDI octave numbering: C-1 = 0, C4 = 60.
    Ok(base + accidental + (octave + 1) * 12)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
    Dim,
    Aug,
    Sus2,
    Sus4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordExtension {
    None,
    Seven,
    Maj7,
    Min7,
    Nine,
    Eleven,
    Thirteen,
    Add9,
    Add11,
    Add13,
}

fn quality_intervals(q: ChordQuality) -> &'static [i32] {
    match q {
        ChordQuality::Major => &[0, 4, 7],
        ChordQuality::Minor => &[0, 3, 7],
        ChordQuality::Dim => &[0, 3, 6],
        ChordQuality::Aug => &[0, 4, 8],
        ChordQuality::Sus2 => &[0, 2, 7],
        ChordQuality::Sus4 => &[0, 5, 7],
    }
}

fn extension_extra_interval(e: ChordExtension) -> Option<i32> {
    match e {
        ChordExtension::None => None,
        ChordExtension::Seven => Some(10),
        ChordExtension::Maj7 => Some(11),
        ChordExtension::Min7 => Some(10),
        ChordExtension::Nine => Some(14),
        ChordExtension::Eleven => Some(17),
        ChordExtension::Thirteen => Some(21),
        ChordExtension::Add9 => Some(14),
        ChordExtension::Add11 => Some(17),
        ChordExtension::Add13 => Some(21),
    }
}

struct ParsedChordSymbol {
    root: i32,
    quality: ChordQuality,
    extension: ChordExtension,
    bass: Option<i32>,
}

fn parse_chord_symbol(symbol: &str) -> Result<ParsedChordSymbol, String> {
    let (body, bass) = match symbol.split_once('/') {
        Some((body, bass)) => (body, Some(parse_root(bass)?)),
        None => (symbol, None),
    };

    let mut chars = body.chars().peekable();
    let letter = chars
        .next()
        .ok_or_else(|| "empty chord symbol".to_string())?
        .to_ascii_uppercase();
    let root_base = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        other => return Err(format!("invalid chord root '{other}'")),
    };
    let mut root = root_base;
    if let Some(&c) = chars.peek() {
        match c {
            '#' => {
                root += 1;
                chars.next();
            }
            'b' => {
                root -= 1;
                chars.next();
            }
            _ => {}
        }
    }

    let rest: String = chars.collect();
    let rest_lower = rest.to_ascii_lowercase();

    // "maj7" names a major-seventh extension, not a "maj" quality prefix —
    // checked before the generic "m"/"min" quality prefixes.
    let (quality, remainder) = if let Some(r) = rest_lower.strip_prefix("maj") {
        (ChordQuality::Major, r)
    } else if let Some(r) = rest_lower.strip_prefix("min") {
        (ChordQuality::Minor, r)
    } else if let Some(r) = rest_lower.strip_prefix('m') {
        (ChordQuality::Minor, r)
    } else if let Some(r) = rest_lower.strip_prefix("dim") {
        (ChordQuality::Dim, r)
    } else if let Some(r) = rest_lower.strip_prefix("aug") {
        (ChordQuality::Aug, r)
    } else if let Some(r) = rest_lower.strip_prefix("sus2") {
        (ChordQuality::Sus2, r)
    } else if let Some(r) = rest_lower.strip_prefix("sus4") {
        (ChordQuality::Sus4, r)
    } else {
        (ChordQuality::Major, rest_lower.as_str())
    };

    let extension = match remainder {
        "" => ChordExtension::None,
        "7" => {
            if quality == ChordQuality::Major && rest_lower.starts_with("maj") {
                ChordExtension::Maj7
            } else if quality == ChordQuality::Minor {
                ChordExtension::Min7
            } else {
                ChordExtension::Seven
            }
        }
        "9" => ChordExtension::Nine,
        "11" => ChordExtension::Eleven,
        "13" => ChordExtension::Thirteen,
        "add9" => ChordExtension::Add9,
        "add11" => ChordExtension::Add11,
        "add13" => ChordExtension::Add13,
        other => return Err(format!("unrecognized chord extension '{other}'")),
    };

    Ok(ParsedChordSymbol {
        root,
        quality,
        extension,
        bass,
    })
}

fn parse_root(letter_and_accidental: &str) -> Result<i32, String> {
    let mut chars = letter_and_accidental.chars();
    let letter = chars
        .next()
        .ok_or_else(|| "empty bass note".to_string())?
        .to_ascii_uppercase();
    let mut root = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        other => return Err(format!("invalid bass note '{other}'")),
    };
    for c in chars {
        match c {
            '#' => root += 1,
            'b' => root -= 1,
            other => return Err(format!("invalid bass accidental '{other}'")),
        }
    }
    Ok(root)
}

/// Resolve a chord symbol (e.g. `"Am7"`, `"Em/G"`) to absolute MIDI note
/// numbers at the given base octave (SPEC_FULL §8).
pub fn chord_to_midi(symbol: &str, octave: i32) -> Result<Vec<i32>, String> {
    let parsed = parse_chord_symbol(symbol)?;
    // Chord octave convention: ChordToMIDI("C", 4) = [48, 52, 55], i.e. the
    // root sits at `root_pc + octave * 12` (distinct from NoteNameToMIDI's
    // `(octave + 1) * 12`, which is a pitch-name convention, not a chord
    // voicing convention).
    let root_midi = parsed.root + octave * 12;

    let mut notes: Vec<i32> = quality_intervals(parsed.quality)
        .iter()
        .map(|i| root_midi + i)
        .collect();
    if let Some(extra) = extension_extra_interval(parsed.extension) {
        notes.push(root_midi + extra);
    }

    if let Some(bass_pc) = parsed.bass {
        // Bass note one octave below the root's octave, per SPEC_FULL §8
        // "begins with a bass G one octave below".
        let bass_midi = bass_pc + (octave - 1) * 12;
        notes.insert(0, bass_midi);
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_name_boundary_laws() {
        assert_eq!(note_name_to_midi("C4").unwrap(), 60);
        assert_eq!(note_name_to_midi("E1").unwrap(), 28);
        assert_eq!(note_name_to_midi("A4").unwrap(), 69);
        assert_eq!(note_name_to_midi("Bb2").unwrap(), 46);
        assert_eq!(note_name_to_midi("C-1").unwrap(), 0);
    }

    #[test]
    fn chord_to_midi_boundary_laws() {
        assert_eq!(chord_to_midi("C", 4).unwrap(), vec![48, 52, 55]);
        assert_eq!(chord_to_midi("Em", 4).unwrap(), vec![52, 55, 59]);
        assert_eq!(chord_to_midi("Am7", 4).unwrap(), vec![57, 60, 64, 67]);
    }

    #[test]
    fn inversion_places_bass_one_octave_below() {
        let notes = chord_to_midi("Em/G", 4).unwrap();
        assert_eq!(notes[0], 43);
        assert!(notes[0] < notes[1]);
    }

    #[test]
    fn rejects_invalid_note_letter() {
        assert!(note_name_to_midi("H4").is_err());
    }

    #[test]
    fn rejects_invalid_chord_root() {
        assert!(chord_to_midi("H", 4).is_err());
    }
}
