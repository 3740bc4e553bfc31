//! Drummer DSL grammar source (SPEC_FULL §4.2).

pub const GRAMMAR: &str = r#"
// Multiple pattern calls separated by ';'.
start: pattern_call (";" pattern_call)* ";"?
pattern_call: "pattern" "(" "drum" "=" DRUM_NAME "," "grid" "=" STRING ("," "velocity" "=" INT)? ")"

DRUM_NAME: "kick" | "snare" | "closed_hihat" | "open_hihat" | "crash" | "ride"
         | "low_tom" | "mid_tom" | "high_tom" | "clap" | "rimshot" | "cowbell"
         | "tambourine" | "shaker"
STRING: /"[^"]*"/
INT: /[0-9]+/

%import common.WS
%ignore WS
"#;
