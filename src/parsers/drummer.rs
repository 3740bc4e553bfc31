//! Drummer DSL parser: `pattern(drum=..., grid=..., velocity=?)` calls →
//! `drum_pattern` `Action`s (SPEC_FULL §4.3 "Drummer lowering"). Grid
//! character validation happens here.

use crate::parsers::tokenizer::{Cursor, Token, tokenize};
use crate::types::{Action, ActionKind, DrumPattern, TrackSelector, validate_action_ranges};

pub fn parse(dsl: &str) -> Result<Vec<Action>, String> {
    let tokens = tokenize(dsl)?;
    let mut cursor = Cursor::new(&tokens);
    let mut actions = Vec::new();

    loop {
        let head = cursor.expect_ident()?;
        if head != "pattern" {
            return Err(format!("expected 'pattern', found '{head}'"));
        }
        cursor.expect(&Token::LParen)?;

        cursor.expect(&Token::Ident("drum".to_string()))?;
        cursor.expect(&Token::Equals)?;
        let drum = cursor.expect_ident()?;
        if !DrumPattern::is_canonical_drum(&drum) {
            return Err(format!("'{drum}' is not a canonical drum name"));
        }

        cursor.expect(&Token::Comma)?;
        cursor.expect(&Token::Ident("grid".to_string()))?;
        cursor.expect(&Token::Equals)?;
        let grid = cursor.expect_str()?;
        DrumPattern::validate_grid(&grid)?;

        let velocity = if cursor.eat(&Token::Comma) {
            cursor.expect(&Token::Ident("velocity".to_string()))?;
            cursor.expect(&Token::Equals)?;
            Some(cursor.expect_number()? as u8)
        } else {
            None
        };

        cursor.expect(&Token::RParen)?;

        let mut action = Action::new(ActionKind::DrumPattern)
            .with_track(TrackSelector::Selected)
            .with_attr("drum", serde_json::json!(drum))
            .with_attr("grid", serde_json::json!(grid));
        if let Some(v) = velocity {
            action = action.with_attr("velocity", serde_json::json!(v));
        }
        validate_action_ranges(&action)?;
        actions.push(action);

        if !cursor.eat(&Token::Semicolon) {
            break;
        }
        if cursor.is_at_end() {
            break;
        }
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_on_the_floor_kick() {
        let actions = parse(r#"pattern(drum=kick, grid="x---x---x---x---")"#).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::DrumPattern);
        assert_eq!(actions[0].attr_str("drum"), Some("kick"));
        assert_eq!(actions[0].attr_str("grid"), Some("x---x---x---x---"));
    }

    #[test]
    fn multiple_patterns_separated_by_semicolon() {
        let actions = parse(
            r#"pattern(drum=kick, grid="x---x---x---x---"); pattern(drum=snare, grid="--x---x---x---x-")"#,
        )
        .unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn rejects_non_canonical_drum() {
        assert!(parse(r#"pattern(drum=triangle, grid="x---")"#).is_err());
    }

    #[test]
    fn rejects_invalid_grid_character() {
        assert!(parse(r#"pattern(drum=kick, grid="x-q-")"#).is_err());
    }

    #[test]
    fn optional_velocity_is_captured() {
        let actions = parse(r#"pattern(drum=snare, grid="x---", velocity=110)"#).unwrap();
        assert_eq!(actions[0].attr_f64("velocity"), Some(110.0));
    }
}
