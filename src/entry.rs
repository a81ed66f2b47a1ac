use std::fmt;

use crate::annotation::Annotation;
use crate::shape::Shape;
use crate::value::Value;

/// One leaf binding unit: the provider registers it, and later it is looked
/// up by `name` when values are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    /// Hierarchical, dot-joined name. Unique across a schema.
    pub name: String,
    pub description: String,
    /// Default normalized through the field type.
    pub default: Option<Value>,
    /// `true` iff there is no default.
    pub required: bool,
    pub shape: Shape,
}

impl ConfigEntry {
    pub fn new(annotation: Annotation, shape: Shape) -> Self {
        ConfigEntry {
            required: annotation.default.is_none(),
            name: annotation.name,
            description: annotation.description,
            default: annotation.default,
            shape,
        }
    }

    /// Environment variable carrying this entry.
    pub fn env_var(&self, prefix: &str) -> String {
        crate::env::var_name(prefix, &self.name)
    }
}

impl fmt::Display for ConfigEntry {
    /// One-line usage: `--name <shape>  description (default: x)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{} <{}>", self.name, self.shape)?;
        if !self.description.is_empty() {
            write!(f, "  {}", self.description)?;
        }
        match &self.default {
            Some(default) => write!(f, " (default: {default})"),
            None => write!(f, " (required)"),
        }
    }
}
