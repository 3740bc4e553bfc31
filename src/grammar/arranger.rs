//! Arranger DSL grammar source (SPEC_FULL §4.2).

pub const GRAMMAR: &str = r#"
// One musical statement per call.
start: statement+
statement: arpeggio_call | chord_call | progression_call | note_call

arpeggio_call: "arpeggio" "(" "symbol" "=" CHORD_SYMBOL ("," "note_duration" "=" NUMBER)? ("," "length" "=" NUMBER)? ("," "rhythm_template" "=" STRING)? ")" ";"?
chord_call: "chord" "(" "symbol" "=" CHORD_SYMBOL ("," "length" "=" NUMBER)? ")" ";"?
progression_call: "progression" "(" "chords" "=" "[" CHORD_SYMBOL ("," CHORD_SYMBOL)* "]" ("," "length" "=" NUMBER)? ")" ";"?
note_call: "note" "(" "pitch" "=" STRING ("," "duration" "=" NUMBER)? ")" ";"?

CHORD_SYMBOL: /[A-G](#|b)?[a-zA-Z0-9]*(\/[A-G](#|b)?)?/
STRING: /"[^"]*"/
NUMBER: /-?[0-9]+(\.[0-9]+)?/

%import common.WS
%ignore WS
"#;
