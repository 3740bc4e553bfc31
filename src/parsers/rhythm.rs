//! Named rhythm templates (SPEC_FULL §4.3 "Arranger lowering"): a template
//! overrides default uniform timing with per-step offsets, accent velocity
//! multipliers, and an articulation (duration) multiplier clipped so a note
//! never overlaps the next step.

#[derive(Debug, Clone, Copy)]
pub struct RhythmTemplate {
    /// Per-step start offset, as a fraction of one step's nominal duration.
    /// Cycled over the generated steps.
    pub offsets: &'static [f64],
    /// Per-step velocity multiplier, applied to the grid/tone velocity and
    /// clamped to `[1, 127]` afterward. Cycled over the generated steps.
    pub accents: &'static [f64],
    /// Fraction of the nominal step duration actually sounded, before the
    /// overlap clip. `1.0` = fully legato.
    pub articulation: f64,
}

pub fn lookup(name: &str) -> Option<RhythmTemplate> {
    match name.to_ascii_lowercase().as_str() {
        "swing" => Some(RhythmTemplate {
            offsets: &[0.0, 0.33],
            accents: &[1.0, 0.85],
            articulation: 0.9,
        }),
        "bossa" => Some(RhythmTemplate {
            offsets: &[0.0, 0.0, 0.25, 0.0],
            accents: &[1.0, 0.8, 1.0, 0.8],
            articulation: 0.8,
        }),
        "tresillo" => Some(RhythmTemplate {
            offsets: &[0.0, 0.375, 0.75],
            accents: &[1.1, 0.9, 1.0],
            articulation: 0.85,
        }),
        "alberti" => Some(RhythmTemplate {
            offsets: &[0.0, 0.0, 0.0, 0.0],
            accents: &[1.0, 0.8, 0.9, 0.8],
            articulation: 1.0,
        }),
        "stride" => Some(RhythmTemplate {
            offsets: &[0.0, 0.0],
            accents: &[1.15, 0.75],
            articulation: 0.75,
        }),
        "offbeat" => Some(RhythmTemplate {
            offsets: &[0.5],
            accents: &[1.0],
            articulation: 0.9,
        }),
        "syncopated" => Some(RhythmTemplate {
            offsets: &[0.0, 0.25, 0.5, -0.125],
            accents: &[1.0, 0.9, 1.1, 0.85],
            articulation: 0.9,
        }),
        "staccato" => Some(RhythmTemplate {
            offsets: &[0.0],
            accents: &[1.0],
            articulation: 0.4,
        }),
        "legato" => Some(RhythmTemplate {
            offsets: &[0.0],
            accents: &[1.0],
            articulation: 1.0,
        }),
        "6/8" => Some(RhythmTemplate {
            offsets: &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            accents: &[1.15, 0.8, 0.8, 1.0, 0.8, 0.8],
            articulation: 0.95,
        }),
        "waltz" => Some(RhythmTemplate {
            offsets: &[0.0, 0.0, 0.0],
            accents: &[1.2, 0.75, 0.85],
            articulation: 0.9,
        }),
        _ => None,
    }
}

impl RhythmTemplate {
    pub fn offset_for_step(&self, step: usize) -> f64 {
        self.offsets[step % self.offsets.len()]
    }

    pub fn accent_for_step(&self, step: usize) -> f64 {
        self.accents[step % self.accents.len()]
    }

    /// Apply the velocity accent and clamp into the valid MIDI velocity
    /// range (SPEC_FULL §8).
    pub fn apply_velocity(&self, step: usize, base_velocity: u8) -> u8 {
        let scaled = (base_velocity as f64 * self.accent_for_step(step)).round();
        scaled.clamp(1.0, 127.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_template_name_is_none() {
        assert!(lookup("not-a-template").is_none());
    }

    #[test]
    fn every_named_template_resolves() {
        for name in [
            "swing",
            "bossa",
            "tresillo",
            "alberti",
            "stride",
            "offbeat",
            "syncopated",
            "staccato",
            "legato",
            "6/8",
            "waltz",
        ] {
            assert!(lookup(name).is_some(), "missing template '{name}'");
        }
    }

    #[test]
    fn accent_velocity_is_clamped() {
        let t = lookup("stride").unwrap();
        assert_eq!(t.apply_velocity(0, 120), 127);
    }
}
