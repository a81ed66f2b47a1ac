use std::path::PathBuf;

/// Where to search for a config file when none is named explicitly.
///
/// Listed in priority-ascending order on the builder: the last directory that
/// holds the file wins.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit path.
    Path(PathBuf),
}

/// The layer a resolved value came from, lowest priority first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    File(PathBuf),
    /// Carries the variable name.
    Env(String),
    Args,
    Override,
}
