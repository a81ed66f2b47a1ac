use std::marker::PhantomData;
#[cfg(feature = "clap")]
use std::ffi::OsString;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::apply::{apply, ensure_required};
use crate::entry::ConfigEntry;
use crate::env;
use crate::error::BindError;
use crate::extract::extract;
use crate::file;
use crate::flatten;
use crate::provider::{LayeredProvider, ResolveInput};
use crate::schema::Schema;
use crate::types::SearchPath;
use crate::value::Value;

/// Entry point for binding a configuration structure.
pub struct Binder;

impl Binder {
    pub fn builder<T: Schema>() -> BinderBuilder<T> {
        BinderBuilder::new()
    }
}

/// Builder for gathering the layers and binding them onto `T`.
///
/// Every knob has a default derived from [`app_name()`](Self::app_name), so
/// the shortest useful call chain is `Binder::builder::<T>().app_name("x").load()`.
pub struct BinderBuilder<T: Schema> {
    app_name: Option<String>,
    file_name: Option<String>,
    search_paths: Option<Vec<SearchPath>>,
    config_file: Option<PathBuf>,
    config_flag: String,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    #[cfg(feature = "clap")]
    args: Option<Vec<OsString>>,
    strict: bool,
    overrides: Vec<(String, Value)>,
    /// First override source that could not be flattened: `(type, reason)`.
    unflattened: Option<(String, String)>,
    _phantom: PhantomData<T>,
}

impl<T: Schema> BinderBuilder<T> {
    fn new() -> Self {
        Self {
            app_name: None,
            file_name: None,
            search_paths: None,
            config_file: None,
            config_flag: "config-file".to_string(),
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            #[cfg(feature = "clap")]
            args: None,
            strict: true,
            overrides: Vec::new(),
            unflattened: None,
            _phantom: PhantomData,
        }
    }

    /// Set the application name. This derives sensible defaults:
    /// - `file_name` → `"{app_name}.toml"`
    /// - `search_paths` → `[SearchPath::Platform]`
    /// - `env_prefix` → `"{APP_NAME}"` (uppercased)
    pub fn app_name(mut self, name: &str) -> Self {
        self.app_name = Some(name.to_string());
        self
    }

    /// Override the config file name (default: `"{app_name}.toml"`).
    /// A `.json` name is read as JSON.
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Replace the default search paths entirely.
    ///
    /// Paths are listed in **priority-ascending** order: the last directory
    /// holding the file is the one used.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = Some(paths);
        self
    }

    /// Read this file instead of searching. It must exist.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Name of the flag (and environment variable suffix) that points at a
    /// config file (default: `"config-file"`).
    pub fn config_flag(mut self, name: &str) -> Self {
        self.config_flag = name.to_string();
        self
    }

    /// Override the environment variable prefix (default: uppercased
    /// `app_name`). An empty prefix reads bare variable names.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Read these pairs instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Command-line arguments, without the binary name. Pass
    /// `std::env::args_os().skip(1)` for the real ones; without this call
    /// the flag layer is empty.
    #[cfg(feature = "clap")]
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable strict mode (default: `true`).
    /// In strict mode, unknown keys in the config file produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set `name` regardless of every other layer.
    pub fn override_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.overrides.push((name.to_string(), value.into()));
        self
    }

    /// Add overrides from any serializable source, matched by entry name.
    ///
    /// Serializes `source` into dotted pairs and skips `None` values. Names
    /// that match no entry are ignored when loading, so unrelated fields of a
    /// clap struct do no harm. Later calls take precedence.
    pub fn overrides_from<S: Serialize>(mut self, source: &S) -> Self {
        match flatten::flatten(source) {
            Ok(pairs) => {
                self.overrides.extend(
                    pairs
                        .into_iter()
                        .filter_map(|(name, value)| value.map(|v| (name, v))),
                );
            }
            Err(e) => {
                self.unflattened
                    .get_or_insert((std::any::type_name::<S>().to_string(), e.to_string()));
            }
        }
        self
    }

    /// Resolve the effective app name, or error if not set.
    fn effective_app_name(&self) -> Result<&str, BindError> {
        self.app_name.as_deref().ok_or(BindError::AppNameRequired)
    }

    fn effective_file_name(&self) -> Result<String, BindError> {
        if let Some(name) = &self.file_name {
            return Ok(name.clone());
        }
        let app = self.effective_app_name()?;
        Ok(format!("{app}.toml"))
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        self.search_paths
            .clone()
            .unwrap_or_else(|| vec![SearchPath::Platform])
    }

    /// Resolve the effective env prefix (None if env disabled).
    fn effective_env_prefix(&self) -> Result<Option<String>, BindError> {
        if !self.env_enabled {
            return Ok(None);
        }
        if let Some(prefix) = &self.env_prefix {
            return Ok(Some(prefix.clone()));
        }
        let app = self.effective_app_name()?;
        Ok(Some(app.to_uppercase()))
    }

    #[cfg(feature = "clap")]
    fn parse_flags(&self, entries: &[ConfigEntry]) -> Result<crate::cli::CliValues, BindError> {
        let Some(args) = &self.args else {
            return Ok(crate::cli::CliValues::default());
        };
        let app = self.app_name.as_deref().unwrap_or("app");
        crate::cli::parse_args(app, entries, &self.config_flag, args.clone())
    }

    /// Pick the config file: the builder's, then the flag's, then the
    /// environment's, then the search paths. An empty path means no file.
    fn locate_file(
        &self,
        flag_file: Option<PathBuf>,
        env_prefix: Option<&str>,
        env_vars: &[(String, String)],
    ) -> Result<Option<(PathBuf, String)>, BindError> {
        let env_file = env_prefix
            .and_then(|prefix| env::env_value(prefix, &self.config_flag, env_vars.iter().cloned()))
            .map(PathBuf::from);

        if let Some(path) = self.config_file.clone().or(flag_file).or(env_file) {
            if path.as_os_str().is_empty() {
                debug!("empty config file path, file layer disabled");
                return Ok(None);
            }
            return file::read_config_file(&path).map(Some);
        }

        let app = self.effective_app_name();
        let search_paths = self.effective_search_paths();
        let app = match app {
            Ok(app) => app,
            Err(e) if search_paths.contains(&SearchPath::Platform) => return Err(e),
            Err(_) => "",
        };
        file::find_config_file(&search_paths, &self.effective_file_name()?, app)
    }

    /// Gather every layer into a provider, without binding.
    pub fn provider(&self) -> Result<(Vec<ConfigEntry>, LayeredProvider), BindError> {
        if let Some((value, reason)) = &self.unflattened {
            return Err(BindError::MalformedProviderValue {
                value: value.clone(),
                reason: reason.clone(),
            });
        }
        let entries = extract::<T>()?;

        #[cfg(feature = "clap")]
        let (args, flag_file) = {
            let flags = self.parse_flags(&entries)?;
            (flags.values, flags.config_file)
        };
        #[cfg(not(feature = "clap"))]
        let (args, flag_file) = (Vec::new(), None);

        let env_prefix = self.effective_env_prefix()?;
        let env_vars = match &self.env_vars {
            Some(vars) => vars.clone(),
            None if env_prefix.is_some() => std::env::vars().collect(),
            None => Vec::new(),
        };

        let file = self.locate_file(flag_file, env_prefix.as_deref(), &env_vars)?;
        match &file {
            Some((path, _)) => info!(path = %path.display(), "using config file"),
            None => debug!("no config file"),
        }

        let overrides = self
            .overrides
            .iter()
            .filter(|(name, _)| entries.iter().any(|e| e.name == *name))
            .cloned()
            .collect();

        let provider = LayeredProvider::resolve(
            &entries,
            ResolveInput {
                file,
                env_vars,
                env_prefix,
                args,
                overrides,
                strict: self.strict,
            },
        )?;
        Ok((entries, provider))
    }

    /// Load every layer and bind it onto `T::default()`.
    ///
    /// Fails when a required entry has no value in any layer.
    pub fn load(self) -> Result<T, BindError> {
        let (entries, provider) = self.provider()?;

        let mut target = T::default();
        apply(&provider, &mut target)?;
        ensure_required(&provider, &entries)?;
        Ok(target)
    }
}
