//! Decoding of list values a provider could only hand out as text.
//!
//! Flags and environment variables are plain strings, so a list arrives as
//! either a relaxed JSON literal (`[{'name':'a','count':1}]`) or a comma
//! separated string (`1,2,3`).

use crate::error::BindError;
use crate::shape::Shape;
use crate::value::{Value, parse_relaxed};

/// Turn text destined for a list field into a [`Value::Sequence`]. Anything
/// else passes through unchanged.
pub fn normalize(value: Value, shape: &Shape) -> Result<Value, BindError> {
    let Value::String(text) = &value else {
        return Ok(value);
    };
    if !shape.is_list() {
        return Ok(value);
    }

    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        let json = parse_relaxed(trimmed).map_err(|e| BindError::MalformedProviderValue {
            value: text.clone(),
            reason: e.to_string(),
        })?;
        if !json.is_array() {
            return Err(BindError::MalformedProviderValue {
                value: text.clone(),
                reason: "expected a list literal".into(),
            });
        }
        return Value::try_from(json).map_err(|()| BindError::MalformedProviderValue {
            value: text.clone(),
            reason: "expected a list literal".into(),
        });
    }

    if trimmed.is_empty() {
        return Ok(Value::Sequence(Vec::new()));
    }
    Ok(Value::Sequence(
        trimmed
            .split(',')
            .map(|item| Value::String(item.trim().to_string()))
            .collect(),
    ))
}
