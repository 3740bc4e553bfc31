//! Merge step: combine heterogeneous agent outputs into one ordered,
//! deduplicated action list (SPEC_FULL §4.5 step 3).

use crate::types::Action;

/// Concatenate in fixed priority order (DAW → Arranger → Drummer) so
/// track-lifecycle actions precede content additions; within each agent the
/// parser's emission order is preserved.
pub fn merge(daw: Vec<Action>, arranger: Vec<Action>, drummer: Vec<Action>) -> Vec<Action> {
    let mut merged = Vec::with_capacity(daw.len() + arranger.len() + drummer.len());
    merged.extend(daw);
    merged.extend(arranger);
    merged.extend(drummer);
    dedup_adjacent_create_track(merged)
}

/// Suppress a `create_track` that is immediately preceded by another
/// `create_track` with the same `(name, instrument)` (SPEC_FULL §3, Open
/// Question (b): "source suppresses obvious duplicates only").
pub fn dedup_adjacent_create_track(actions: Vec<Action>) -> Vec<Action> {
    let mut out: Vec<Action> = Vec::with_capacity(actions.len());
    for action in actions {
        let is_adjacent_duplicate = match (action.dedup_key(), out.last().and_then(Action::dedup_key)) {
            (Some(current), Some(previous)) => current == previous,
            _ => false,
        };
        if !is_adjacent_duplicate {
            out.push(action);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;

    fn create_track(name: &str, instrument: &str) -> Action {
        Action::new(ActionKind::CreateTrack)
            .with_attr("name", serde_json::json!(name))
            .with_attr("instrument", serde_json::json!(instrument))
    }

    #[test]
    fn daw_actions_precede_arranger_and_drummer() {
        let daw = vec![Action::new(ActionKind::SetMute)];
        let arranger = vec![Action::new(ActionKind::AddMidi)];
        let drummer = vec![Action::new(ActionKind::DrumPattern)];
        let merged = merge(daw, arranger, drummer);
        assert_eq!(merged[0].kind, ActionKind::SetMute);
        assert_eq!(merged[1].kind, ActionKind::AddMidi);
        assert_eq!(merged[2].kind, ActionKind::DrumPattern);
    }

    #[test]
    fn adjacent_identical_create_track_is_suppressed() {
        let actions = vec![
            create_track("Drums", "none"),
            create_track("Drums", "none"),
            create_track("Piano", "piano"),
        ];
        let deduped = dedup_adjacent_create_track(actions);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn non_adjacent_identical_create_track_is_not_suppressed() {
        let actions = vec![
            create_track("Drums", "none"),
            Action::new(ActionKind::SetMute),
            create_track("Drums", "none"),
        ];
        let deduped = dedup_adjacent_create_track(actions);
        assert_eq!(deduped.len(), 3);
    }
}
