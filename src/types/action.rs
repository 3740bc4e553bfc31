//! `Action`: the closed-vocabulary output unit of the DAW path (SPEC_FULL §3).

use serde::{Deserialize, Serialize};

/// How a DSL referred to a track. `Selected` is a sentinel the core never
/// resolves itself — per SPEC_FULL §4.3/§9 "Deferred track selection", the
/// caller decides what "currently selected" means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum TrackSelector {
    Index(u32),
    Id(u32),
    Name(String),
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateTrack,
    AddMidi,
    AddFx,
    SetVolume,
    SetPan,
    SetMute,
    SetSolo,
    SetName,
    DeleteTrack,
    DeleteClip,
    CreateClipAtBar,
    DrumPattern,
    Comment,
    Error,
}

/// A single, immutable editor command. Once constructed it is never
/// mutated — SPEC_FULL §3 "An action is an immutable value".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackSelector>,
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            track: None,
            attrs: serde_json::Map::new(),
        }
    }

    pub fn with_track(mut self, track: TrackSelector) -> Self {
        self.track = Some(track);
        self
    }

    pub fn with_attr(mut self, key: &str, value: serde_json::Value) -> Self {
        self.attrs.insert(key.to_string(), value);
        self
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(ActionKind::Comment).with_attr("text", serde_json::Value::String(text.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ActionKind::Error).with_attr("message", serde_json::Value::String(message.into()))
    }

    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attrs.get(key).and_then(|v| v.as_f64())
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(|v| v.as_str())
    }

    /// Dedup key used by the orchestrator merge step for adjacent
    /// `create_track` suppression (SPEC_FULL §3, Open Question (b)).
    pub fn dedup_key(&self) -> Option<(String, String)> {
        if self.kind != ActionKind::CreateTrack {
            return None;
        }
        let name = self.attr_str("name").unwrap_or("").to_string();
        let instrument = self.attr_str("instrument").unwrap_or("").to_string();
        Some((name, instrument))
    }
}

/// Validate an Action's numeric attributes against their declared ranges
/// (SPEC_FULL §3/§8). Parsers call this before returning an Action.
pub fn validate_action_ranges(action: &Action) -> Result<(), String> {
    if let Some(pan) = action.attr_f64("pan") {
        if !(-1.0..=1.0).contains(&pan) {
            return Err(format!("pan {pan} out of range [-1, 1]"));
        }
    }
    if let Some(midi_note) = action.attr_f64("midi_note") {
        if !(0.0..=127.0).contains(&midi_note) {
            return Err(format!("midi_note {midi_note} out of range [0, 127]"));
        }
    }
    if let Some(velocity) = action.attr_f64("velocity") {
        if !(1.0..=127.0).contains(&velocity) {
            return Err(format!("velocity {velocity} out of range [1, 127]"));
        }
    }
    if let Some(bar) = action.attr_f64("bar") {
        if bar < 1.0 {
            return Err(format!("bar {bar} must be >= 1"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_out_of_range_is_rejected() {
        let a = Action::new(ActionKind::SetPan)
            .with_track(TrackSelector::Name("synth".into()))
            .with_attr("pan", serde_json::json!(-1.5));
        assert!(validate_action_ranges(&a).is_err());
    }

    #[test]
    fn pan_within_range_is_accepted() {
        let a = Action::new(ActionKind::SetPan)
            .with_track(TrackSelector::Name("synth".into()))
            .with_attr("pan", serde_json::json!(-1.0));
        assert!(validate_action_ranges(&a).is_ok());
    }

    #[test]
    fn dedup_key_only_applies_to_create_track() {
        let a = Action::new(ActionKind::SetMute);
        assert_eq!(a.dedup_key(), None);

        let b = Action::new(ActionKind::CreateTrack)
            .with_attr("name", serde_json::json!("Drums"))
            .with_attr("instrument", serde_json::json!("piano"));
        assert_eq!(b.dedup_key(), Some(("Drums".to_string(), "piano".to_string())));
    }
}
