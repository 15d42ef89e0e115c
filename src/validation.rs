//! Payload validation shared by create, update and bulk import

use serde_json::{Map, Value};

use crate::{
    error::ValidationError,
    models::book::BookFields,
    sanitize,
};

/// Sanitize and validate a raw JSON payload.
///
/// Only fields present in the payload end up in the result, so the same
/// function serves full creates (`require_title = true`) and partial updates.
/// `null` counts as absent. A payload that is not an object is treated as an
/// empty one.
pub fn validate(payload: &Value, require_title: bool) -> Result<BookFields, ValidationError> {
    let empty = Map::new();
    let data = payload.as_object().unwrap_or(&empty);
    let mut clean = BookFields::default();

    match text_field(data, "title").map(|t| sanitize::plain_text(&t)) {
        Some(title) if !title.is_empty() => clean.title = Some(title),
        Some(_) => return Err(ValidationError::MissingTitle),
        None if require_title => return Err(ValidationError::MissingTitle),
        None => {}
    }

    if let Some(description) = text_field(data, "description") {
        clean.description = Some(sanitize::rich_text(&description));
    }

    if let Some(author) = text_field(data, "author") {
        clean.author = Some(sanitize::plain_text(&author));
    }

    match data.get("publication_year") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if s.is_empty() => {}
        Some(value) => clean.publication_year = Some(parse_year(value)?),
    }

    match data.get("status") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => clean.status = Some(sanitize::plain_text(s).parse()?),
        Some(_) => return Err(ValidationError::InvalidStatus),
    }

    Ok(clean)
}

/// Strings pass through, numbers are stringified, anything else is absent.
fn text_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept integers, floats (truncated) and numeric strings; reject negatives.
fn parse_year(value: &Value) -> Result<i32, ValidationError> {
    let number = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    number
        .filter(|n| *n >= 0)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or(ValidationError::InvalidYear)
}
