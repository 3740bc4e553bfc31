//! JSFX structural validation beyond what the grammar captures (SPEC_FULL
//! §4.2/§4.3): slider indices must be unique and positive, and the file
//! needs at least one sectioned code block.

use std::collections::HashSet;

pub fn validate(code: &str) -> Result<(), String> {
    let mut slider_indices = HashSet::new();
    let mut has_section = false;

    for line in code.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("slider") {
            if let Some(colon) = rest.find(':') {
                let index_str = &rest[..colon];
                let index: u32 = index_str
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid slider index '{index_str}'"))?;
                if !slider_indices.insert(index) {
                    return Err(format!("duplicate slider index {index}"));
                }
            }
        }
        if trimmed.starts_with('@') {
            has_section = true;
        }
    }

    if !has_section {
        return Err("JSFX file has no sectioned code block (@init, @block, ...)".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_slider_indices() {
        let code = "slider1:0<0,1,0.01>Gain\nslider1:0<0,1,0.01>Gain2\n@init\nx = 0;\n";
        assert!(validate(code).is_err());
    }

    #[test]
    fn requires_at_least_one_section() {
        assert!(validate("desc:no sections here").is_err());
    }

    #[test]
    fn accepts_a_minimal_valid_file() {
        let code = "desc:Gain\nslider1:0<0,1,0.01>Gain\n@init\ngain = 1;\n@sample\nspl0 *= gain;\n";
        assert!(validate(code).is_ok());
    }
}
