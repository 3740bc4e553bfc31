//! DAW DSL grammar source (SPEC_FULL §4.2).

pub const GRAMMAR: &str = r#"
// Method-chained track operations. Method names are snake_case only.
start: statement+
statement: track_ref method_call* "." method_call ";"?

track_ref: "track" "(" selector ")"
selector: "index" "=" INT
        | "id" "=" INT
        | "name" "=" STRING
        | "selected" "=" "true"

method_call: "." METHOD_NAME "(" [arg_list] ")"
METHOD_NAME: "new_clip" | "add_midi" | "set_volume" | "set_pan" | "set_mute"
           | "set_solo" | "set_name" | "delete" | "delete_clip" | "add_fx"
           | "create_clip_at_bar"

arg_list: arg ("," arg)*
arg: NAME "=" value
value: NUMBER | STRING | "true" | "false" | list
list: "[" [value ("," value)*] "]"

NAME: /[a-z_][a-z0-9_]*/
STRING: /"[^"]*"/
NUMBER: /-?[0-9]+(\.[0-9]+)?/
INT: /[0-9]+/

%import common.WS
%ignore WS
"#;
