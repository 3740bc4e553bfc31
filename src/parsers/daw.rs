//! DAW DSL parser: method-chained track operations → `Action`s
//! (SPEC_FULL §4.3 "DAW lowering"). Each chained method emits one Action.

use serde_json::Value;

use super::tokenizer::{Cursor, Token, tokenize};
use crate::types::{Action, ActionKind, TrackSelector, validate_action_ranges};

pub fn parse(dsl: &str) -> Result<Vec<Action>, String> {
    let tokens = tokenize(dsl)?;
    let mut cursor = Cursor::new(&tokens);
    let mut actions = Vec::new();

    while !cursor.is_at_end() {
        let selector = parse_track_ref(&mut cursor)?;
        loop {
            if !cursor.eat(&Token::Dot) {
                break;
            }
            let method = cursor.expect_ident()?;
            cursor.expect(&Token::LParen)?;
            let attrs = parse_arg_list(&mut cursor)?;
            cursor.expect(&Token::RParen)?;

            let kind = method_to_kind(&method)?;
            let action = Action::new(kind).with_track(selector.clone());
            let action = attrs
                .into_iter()
                .fold(action, |a, (k, v)| a.with_attr(&k, v));
            validate_action_ranges(&action)?;
            actions.push(action);
        }
        cursor.eat(&Token::Semicolon);
    }

    Ok(actions)
}

fn method_to_kind(method: &str) -> Result<ActionKind, String> {
    match method {
        "new_clip" | "create_clip_at_bar" => Ok(ActionKind::CreateClipAtBar),
        "add_midi" => Ok(ActionKind::AddMidi),
        "set_volume" => Ok(ActionKind::SetVolume),
        "set_pan" => Ok(ActionKind::SetPan),
        "set_mute" => Ok(ActionKind::SetMute),
        "set_solo" => Ok(ActionKind::SetSolo),
        "set_name" => Ok(ActionKind::SetName),
        "delete" => Ok(ActionKind::DeleteTrack),
        "delete_clip" => Ok(ActionKind::DeleteClip),
        "add_fx" => Ok(ActionKind::AddFx),
        other => Err(format!("unknown DAW method '{other}'")),
    }
}

fn parse_track_ref(cursor: &mut Cursor) -> Result<TrackSelector, String> {
    let head = cursor.expect_ident()?;
    if head != "track" {
        return Err(format!("expected 'track', found '{head}'"));
    }
    cursor.expect(&Token::LParen)?;
    let key = cursor.expect_ident()?;
    cursor.expect(&Token::Equals)?;
    let selector = match key.as_str() {
        "index" => TrackSelector::Index(cursor.expect_number()? as u32),
        "id" => TrackSelector::Id(cursor.expect_number()? as u32),
        "name" => TrackSelector::Name(cursor.expect_str()?),
        "selected" => {
            match cursor.next() {
                Some(Token::Bool(true)) => TrackSelector::Selected,
                other => return Err(format!("expected 'true' for selected=, found {other:?}")),
            }
        }
        other => return Err(format!("unknown track selector key '{other}'")),
    };
    cursor.expect(&Token::RParen)?;
    Ok(selector)
}

fn parse_arg_list(cursor: &mut Cursor) -> Result<Vec<(String, Value)>, String> {
    let mut args = Vec::new();
    if cursor.peek() == Some(&Token::RParen) {
        return Ok(args);
    }
    loop {
        let name = cursor.expect_ident()?;
        cursor.expect(&Token::Equals)?;
        let value = parse_value(cursor)?;
        args.push((name, value));
        if !cursor.eat(&Token::Comma) {
            break;
        }
    }
    Ok(args)
}

fn parse_value(cursor: &mut Cursor) -> Result<Value, String> {
    match cursor.peek() {
        Some(Token::Number(_)) => Ok(Value::from(cursor.expect_number()?)),
        Some(Token::Str(_)) => Ok(Value::String(cursor.expect_str()?)),
        Some(Token::Bool(_)) => match cursor.next() {
            Some(Token::Bool(b)) => Ok(Value::Bool(*b)),
            _ => unreachable!(),
        },
        Some(Token::LBracket) => {
            cursor.next();
            let mut items = Vec::new();
            if cursor.peek() != Some(&Token::RBracket) {
                loop {
                    items.push(parse_value(cursor)?);
                    if !cursor.eat(&Token::Comma) {
                        break;
                    }
                }
            }
            cursor.expect(&Token::RBracket)?;
            Ok(Value::Array(items))
        }
        other => Err(format!("expected a value, found {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pan_statement() {
        let actions = parse(r#"track(name="synth").set_pan(pan=-1.0)"#).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::SetPan);
        assert_eq!(actions[0].attr_f64("pan"), Some(-1.0));
        assert_eq!(
            actions[0].track,
            Some(TrackSelector::Name("synth".to_string()))
        );
    }

    #[test]
    fn each_chained_method_emits_one_action() {
        let actions =
            parse(r#"track(id=1).new_clip(bar=1).add_midi(notes=[60,64,67])"#).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::CreateClipAtBar);
        assert_eq!(actions[1].kind, ActionKind::AddMidi);
    }

    #[test]
    fn selected_true_is_a_sentinel_not_resolved() {
        let actions = parse(r#"track(selected=true).set_mute(mute=true)"#).unwrap();
        assert_eq!(actions[0].track, Some(TrackSelector::Selected));
    }

    #[test]
    fn pan_out_of_range_fails_parse() {
        assert!(parse(r#"track(id=1).set_pan(pan=2.0)"#).is_err());
    }

    #[test]
    fn multiple_statements_separated_by_semicolon() {
        let actions = parse(r#"track(id=1).set_mute(mute=true); track(id=2).set_solo(solo=true)"#)
            .unwrap();
        assert_eq!(actions.len(), 2);
    }
}
