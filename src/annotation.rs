//! Per-field annotation parsing.
//!
//! An annotation is a relaxed JSON object literal written with single quotes:
//!
//! ```text
//! {'name':'file-path','desc':'Path to the store','default':'configs/'}
//! ```
//!
//! `name` is required. `desc` and `default` are optional, and any other key is
//! ignored. A field without a `default` (or with `'default':null`) is required.

use serde::Deserialize;

use crate::cast::Bind;
use crate::error::BindError;
use crate::shape::{Class, classify};
use crate::value::{Value, join_name, parse_relaxed};

/// A parsed annotation, with the default already normalized through the
/// field's type.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Hierarchical name: the parent path joined with `key`.
    pub name: String,
    /// The field's own name as written in the annotation.
    pub key: String,
    pub description: String,
    pub default: Option<Value>,
}

#[derive(Deserialize)]
struct RawAnnotation {
    name: Option<String>,
    desc: Option<String>,
    default: Option<serde_json::Value>,
}

/// Parse the annotation of a field of type `F` living under `parent`.
pub fn parse<F: Bind>(text: &str, parent: &str) -> Result<Annotation, BindError> {
    let raw: RawAnnotation =
        serde_json::from_value(parse_relaxed(text).map_err(|source| {
            BindError::MalformedAnnotation {
                annotation: text.to_string(),
                source,
            }
        })?)
        .map_err(|source| BindError::MalformedAnnotation {
            annotation: text.to_string(),
            source,
        })?;

    let key = raw.name.unwrap_or_default();
    if key.is_empty() {
        return Err(BindError::MissingRequiredField {
            annotation: text.to_string(),
        });
    }
    let name = join_name(parent, &key);

    let default = match raw.default.and_then(|json| Value::try_from(json).ok()) {
        None => None,
        Some(_) if matches!(classify(&F::shape()), Ok(Class::Composite)) => {
            return Err(BindError::CompositeDefault { name });
        }
        Some(raw_default) => {
            let typed = F::cast(&raw_default).map_err(|e| BindError::DefaultCastFailure {
                name: name.clone(),
                source: Box::new(e),
            })?;
            typed.to_value()
        }
    };

    Ok(Annotation {
        name,
        key,
        description: raw.desc.unwrap_or_default(),
        default,
    })
}
