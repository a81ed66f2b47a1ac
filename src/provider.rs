//! Providers: the name → value lookup the applier reads from.
//!
//! Any map keyed by dotted entry name is a provider. [`LayeredProvider`]
//! stacks the usual sources on top of each other:
//!
//! ```text
//! Annotation defaults
//!        ↑ overridden by
//! Config file           TOML, or JSON for a `.json` path
//!        ↑ overridden by
//! Environment vars      PREFIX_CONFIG_STORE_FILE_PATH
//!        ↑ overridden by
//! Command-line flags    --config-store.file-path
//!        ↑ overridden by
//! Overrides             .override_value()
//! ```
//!
//! Resolution operates on pre-loaded data ([`ResolveInput`]) with no I/O, so
//! the whole layering is testable with synthetic inputs.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use crate::entry::ConfigEntry;
use crate::env;
use crate::error::BindError;
use crate::flatten::flatten;
use crate::types::Source;
use crate::validate;
use crate::value::Value;

/// Read-only lookup of raw values by hierarchical entry name.
pub trait Provider {
    /// Whether a value is present for `name`.
    fn is_set(&self, name: &str) -> bool;

    /// The raw value for `name`, if any.
    fn get(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> Provider for HashMap<String, Value, S> {
    fn is_set(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

impl Provider for BTreeMap<String, Value> {
    fn is_set(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }
}

/// All pre-loaded data needed to resolve a provider. No I/O happens here.
#[derive(Debug, Default)]
pub struct ResolveInput {
    /// The config file to read, as `(path, contents)`.
    pub file: Option<(PathBuf, String)>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"MYAPP"`, or `""` for none). `None` disables the layer.
    pub env_prefix: Option<String>,
    /// Values given as command-line flags.
    pub args: Vec<(String, Value)>,
    /// Programmatic overrides, highest priority.
    pub overrides: Vec<(String, Value)>,
    /// Whether to reject unknown keys in the config file.
    pub strict: bool,
}

/// Values of every layer merged by precedence, each remembering its layer.
#[derive(Debug, Clone, Default)]
pub struct LayeredProvider {
    values: IndexMap<String, (Value, Source)>,
}

impl LayeredProvider {
    /// Layer `input` over the defaults of `entries`.
    pub fn resolve(entries: &[ConfigEntry], input: ResolveInput) -> Result<Self, BindError> {
        let mut provider = LayeredProvider::default();

        for entry in entries {
            if let Some(default) = &entry.default {
                provider.set(&entry.name, default.clone(), Source::Default);
            }
        }

        if let Some((path, content)) = &input.file {
            let pairs = parse_file(path, content)?;
            if input.strict {
                validate::validate_unknown_keys(&pairs, entries, content, path)?;
            }
            for (name, value) in pairs {
                let Some(value) = value else { continue };
                if !entries.iter().any(|e| e.name == name) {
                    debug!(name = %name, path = %path.display(), "unknown key ignored");
                    continue;
                }
                provider.set(&name, value, Source::File(path.clone()));
            }
        }

        if let Some(prefix) = &input.env_prefix {
            for (name, var, value) in env::env_values(prefix, entries, input.env_vars) {
                provider.set(&name, value, Source::Env(var));
            }
        }

        for (name, value) in input.args {
            provider.set(&name, value, Source::Args);
        }
        for (name, value) in input.overrides {
            provider.set(&name, value, Source::Override);
        }
        Ok(provider)
    }

    /// Set `name` to `value`, replacing whatever a lower layer put there.
    pub fn set(&mut self, name: &str, value: Value, source: Source) {
        self.values.insert(name.to_string(), (value, source));
    }

    /// The layer the value of `name` came from.
    pub fn source(&self, name: &str) -> Option<&Source> {
        self.values.get(name).map(|(_, source)| source)
    }

    /// Resolved values in the order they were first set.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value, &Source)> {
        self.values
            .iter()
            .map(|(name, (value, source))| (name.as_str(), value, source))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Provider for LayeredProvider {
    fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).map(|(value, _)| value.clone())
    }
}

/// Parse a config file into dotted pairs. `.json` files are JSON, everything
/// else TOML.
fn parse_file(
    path: &std::path::Path,
    content: &str,
) -> Result<Vec<(String, Option<Value>)>, BindError> {
    let flattened = if validate::is_json(path) {
        let doc: serde_json::Value =
            serde_json::from_str(content).map_err(|source| BindError::JsonError {
                path: path.to_path_buf(),
                source,
            })?;
        flatten(&doc)
    } else {
        let doc: toml::Table = toml::from_str(content).map_err(|source| BindError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        flatten(&doc)
    };
    flattened.map_err(|e| BindError::MalformedProviderValue {
        value: path.display().to_string(),
        reason: e.to_string(),
    })
}
