//! Declarative binding of annotated configuration structures to flags,
//! environment variables and config files.
//!
//! Describe a structure once, with one small annotation per field, and
//! bindfig derives everything else from it: the flat list of config entries,
//! their command-line flags and environment variables, their defaults, and
//! the typed assignment of whatever the layers resolve to.
//!
//! ```ignore
//! let cfg: Cfg = Binder::builder::<Cfg>()
//!     .app_name("myapp")
//!     .args(std::env::args_os().skip(1))
//!     .load()?;
//! ```
//!
//! # Declaring a schema
//!
//! ```
//! use bindfig::schema;
//!
//! #[derive(Debug, Default)]
//! struct ConfigStore {
//!     file_path: String,
//! }
//!
//! schema! {
//!     ConfigStore {
//!         file_path => "{'name':'file-path','desc':'the path','default':'configs/'}",
//!     }
//! }
//!
//! #[derive(Debug, Default)]
//! struct Cfg {
//!     prio: i32,
//!     config_store: ConfigStore,
//! }
//!
//! schema! {
//!     Cfg {
//!         prio => "{'name':'prio','desc':'the prio','default':0}",
//!         config_store => "{'name':'config-store','desc':'the config store'}",
//!     }
//! }
//!
//! let names: Vec<String> = bindfig::extract::<Cfg>()
//!     .unwrap()
//!     .into_iter()
//!     .map(|e| e.name)
//!     .collect();
//! assert_eq!(names, vec!["prio", "config-store.file-path"]);
//! ```
//!
//! An annotation is a relaxed JSON object (single quotes allowed) with a
//! mandatory `name`, an optional `desc` and an optional `default`. A field
//! without a default is required. Fields not annotated are left alone.
//!
//! Scalars, paths, durations (`"1h30m"`) and lists of any of those or of
//! structures are **primitive**: one entry each, bound as a whole. Nested
//! structures are **composite**: they contribute their fields' entries under
//! a dotted prefix and never carry a default themselves. Maps are not
//! supported.
//!
//! # Layer precedence
//!
//! ```text
//! Annotation defaults   'default': ...
//!        ↑ overridden by
//! Config file           searched, or --config-file / APP_CONFIG_FILE
//!        ↑ overridden by
//! Environment vars      APP_CONFIG_STORE_FILE_PATH
//!        ↑ overridden by
//! Command-line flags    --config-store.file-path
//!        ↑ overridden by
//! Overrides             .override_value() / .overrides_from()
//! ```
//!
//! Every layer is sparse. Unset entries fall through to the layer below;
//! entries no layer sets keep the structure's `Default` value, and loading
//! fails if any of them is required.
//!
//! Flags and environment variables only carry text. Lists given that way
//! are either comma separated (`--levels=a,b`) or a relaxed JSON literal
//! (`--target-secrets="[{'name':'a','key':'k'}]"`).
//!
//! # Lower-level API
//!
//! [`Binder`] is a convenience. The pieces it composes are public:
//! [`extract`] produces the entries, any [`Provider`] (a `HashMap` will do)
//! supplies values, [`apply`] writes them onto a live structure and
//! [`ensure_required`] checks what is still missing.
//!
//! # Clap adapter
//!
//! The `clap` Cargo feature (on by default) generates one long flag per
//! entry, with its description and default in `--help`. Without it the
//! flag layer is absent:
//!
//! ```toml
//! bindfig = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Extraction, application and file discovery emit [`tracing`] events. The
//! library never installs a subscriber.
//!
//! # Error handling
//!
//! All fallible operations return [`BindError`]. Failures inside a field
//! are wrapped with the field's dotted path, so
//! `config-store.target-secret.count: Type mismatch: ...` points at the
//! offending entry; [`BindError::root_cause`] strips the wrapping.

pub mod error;
pub mod types;

mod annotation;
mod apply;
mod builder;
mod cast;
#[cfg(feature = "clap")]
mod cli;
mod duration;
mod entry;
mod env;
mod extract;
mod file;
mod flatten;
mod normalize;
mod provider;
mod schema;
mod shape;
mod validate;
mod value;

#[cfg(test)]
mod fixtures;

pub use annotation::Annotation;
pub use apply::{apply, ensure_required};
pub use builder::{Binder, BinderBuilder};
pub use cast::{Bind, cast};
#[cfg(feature = "clap")]
pub use cli::{CliValues, build_command};
pub use duration::{format_duration, parse_duration};
pub use entry::ConfigEntry;
pub use error::BindError;
pub use extract::extract;
pub use normalize::normalize;
pub use provider::{LayeredProvider, Provider, ResolveInput};
pub use schema::{FieldDescriptor, Schema, SchemaBuilder, describe_fields};
pub use shape::{Class, ScalarKind, Shape, classify};
pub use types::{SearchPath, Source};
pub use value::Value;
