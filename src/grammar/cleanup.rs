//! Grammar cleanup pass: strips comments and directives the provider's
//! grammar engine rejects (SPEC_FULL §4.2). Run once at `Agent` registry
//! initialization and cached on the `AgentRecord` — never re-run per
//! request.

/// Strip `//` line comments and `%import`/`%ignore` Lark directives.
pub fn strip_unsupported(grammar: &str) -> String {
    grammar
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !(trimmed.starts_with("//")
                || trimmed.starts_with("%import")
                || trimmed.starts_with("%ignore"))
        })
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_directives() {
        let raw = "// a comment\nstart: track_call+\n%import common.WS\n%ignore WS\ntrack_call: \"track\" \"(\" args \")\"";
        let cleaned = strip_unsupported(raw);
        assert!(!cleaned.contains("//"));
        assert!(!cleaned.contains("%import"));
        assert!(!cleaned.contains("%ignore"));
        assert!(cleaned.contains("start: track_call+"));
    }
}
