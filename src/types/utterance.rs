//! `Utterance` and the classifier's output.

use serde::{Deserialize, Serialize};

/// The user's natural-language string plus an opaque editor-state snapshot.
/// The core never mutates `state`; it is passed into prompts verbatim
/// (SPEC_FULL §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    pub question: String,
    #[serde(default)]
    pub state: Option<serde_json::Value>,
}

/// The classifier's `{needs_daw, needs_arranger, needs_drummer}` output
/// (SPEC_FULL §4.5).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Classification {
    pub needs_daw: bool,
    pub needs_arranger: bool,
    pub needs_drummer: bool,
}

impl Classification {
    pub fn is_out_of_scope(&self) -> bool {
        !self.needs_daw && !self.needs_arranger && !self.needs_drummer
    }

    /// "The DAW bit is always treated as true whenever any action is
    /// requested" — SPEC_FULL §4.5.
    pub fn normalized(self) -> Self {
        let any = self.needs_daw || self.needs_arranger || self.needs_drummer;
        Self {
            needs_daw: self.needs_daw || any,
            needs_arranger: self.needs_arranger,
            needs_drummer: self.needs_drummer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_false_is_out_of_scope() {
        assert!(Classification::default().is_out_of_scope());
    }

    #[test]
    fn arranger_only_normalizes_daw_to_true() {
        let c = Classification {
            needs_daw: false,
            needs_arranger: true,
            needs_drummer: false,
        }
        .normalized();
        assert!(c.needs_daw);
        assert!(c.needs_arranger);
        assert!(!c.needs_drummer);
    }
}
