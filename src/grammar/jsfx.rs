//! JSFX grammar source (SPEC_FULL §4.2). Validates the raw effect file
//! structure: header lines, slider declarations, sectioned code blocks.

pub const GRAMMAR: &str = r#"
start: header_line* slider_decl* section+

header_line: "desc:" REST_OF_LINE
           | "author:" REST_OF_LINE
           | "tags:" REST_OF_LINE

slider_decl: "slider" INT ":" REST_OF_LINE

section: SECTION_NAME NEWLINE section_body
SECTION_NAME: "@init" | "@slider" | "@block" | "@sample" | "@gfx" | "@serialize"
section_body: /[^@]*/

REST_OF_LINE: /[^\n]*/
NEWLINE: /\n/
INT: /[0-9]+/

%ignore /[ \t]+/
"#;
