use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("Malformed annotation '{annotation}': {source}")]
    MalformedAnnotation {
        annotation: String,
        source: serde_json::Error,
    },

    #[error("Annotation '{annotation}' has no 'name'")]
    MissingRequiredField { annotation: String },

    #[error("Default value for '{name}' does not fit the field type: {source}")]
    DefaultCastFailure {
        name: String,
        source: Box<BindError>,
    },

    #[error("Default values are not allowed on nested structure '{name}'")]
    CompositeDefault { name: String },

    #[error("Type '{type_name}' is not supported")]
    UnsupportedType { type_name: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Missing value for required key '{key}'")]
    MissingRequiredValue { key: String },

    #[error("Field '{field}' (key '{key}') cannot be assigned")]
    UnassignableField { field: String, key: String },

    #[error("Can't bind into {0} (target has to be a present structure)")]
    UnsupportedTarget(String),

    #[error("Malformed provider value '{value}': {reason}")]
    MalformedProviderValue { value: String, reason: String },

    #[error("Duplicate config entry '{name}'")]
    DuplicateEntry { name: String },

    #[error("Missing required config entries: {}", .0.join(", "))]
    MissingRequiredEntries(Vec<String>),

    #[error("{path}: {source}")]
    Field {
        path: String,
        source: Box<BindError>,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<BindError>),

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[cfg(feature = "clap")]
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("App name is required: call .app_name() on the builder")]
    AppNameRequired,
}

impl BindError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &crate::value::Value) -> Self {
        BindError::TypeMismatch {
            expected: expected.into(),
            found: found.describe(),
        }
    }

    /// Attach a path segment. Wrapping an already wrapped error prepends the
    /// segment, so errors raised deep in a traversal end up carrying the full
    /// dotted path.
    pub fn within(self, segment: &str) -> Self {
        match self {
            BindError::Field { path, source } => BindError::Field {
                path: join_path(segment, &path),
                source,
            },
            other => BindError::Field {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The dotted path of the field that failed, if the error carries one.
    pub fn path(&self) -> Option<&str> {
        match self {
            BindError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error, with all path wrapping removed.
    pub fn root_cause(&self) -> &BindError {
        match self {
            BindError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.starts_with('[') {
        format!("{segment}{rest}")
    } else {
        format!("{segment}.{rest}")
    }
}
