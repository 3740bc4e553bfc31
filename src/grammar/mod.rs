//! Lark-style CFG sources for the four DSLs (SPEC_FULL §4.2), plus a
//! cleanup pass that strips directives the provider's grammar engine
//! rejects.

mod arranger;
mod cleanup;
mod daw;
mod drummer;
mod jsfx;

pub use cleanup::strip_unsupported;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarSyntax {
    Lark,
    Regex,
}

/// A grammar binding attached to a provider request (SPEC_FULL §4.1).
#[derive(Debug, Clone)]
pub struct GrammarBinding {
    pub tool_name: &'static str,
    pub description: &'static str,
    pub grammar_text: String,
    pub syntax: GrammarSyntax,
}

impl GrammarBinding {
    fn new(tool_name: &'static str, description: &'static str, raw: &'static str) -> Self {
        Self {
            tool_name,
            description,
            grammar_text: strip_unsupported(raw),
            syntax: GrammarSyntax::Lark,
        }
    }

    pub fn daw() -> Self {
        Self::new(
            "daw_dsl",
            "Emit one or more chained track operations in the DAW DSL.",
            daw::GRAMMAR,
        )
    }

    pub fn arranger() -> Self {
        Self::new(
            "arranger_dsl",
            "Emit one or more musical statements in the Arranger DSL.",
            arranger::GRAMMAR,
        )
    }

    pub fn drummer() -> Self {
        Self::new(
            "drummer_dsl",
            "Emit one or more drum pattern statements in the Drummer DSL.",
            drummer::GRAMMAR,
        )
    }

    pub fn jsfx() -> Self {
        Self::new(
            "jsfx_code",
            "Emit a complete JSFX effect file.",
            jsfx::GRAMMAR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_grammar_is_cleaned_up_once() {
        for binding in [
            GrammarBinding::daw(),
            GrammarBinding::arranger(),
            GrammarBinding::drummer(),
            GrammarBinding::jsfx(),
        ] {
            assert!(!binding.grammar_text.contains("//"));
            assert!(!binding.grammar_text.is_empty());
        }
    }
}
