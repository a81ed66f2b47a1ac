//! Locating and reading the config file.
//!
//! A file named explicitly (on the builder, with the config-file flag or its
//! environment variable) must exist. Otherwise each [`SearchPath`] is resolved
//! to a directory and the highest-priority directory holding the file wins;
//! finding nothing is fine.

use std::path::{Path, PathBuf};

use crate::error::BindError;
use crate::types::SearchPath;

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// `app_name` is used by `SearchPath::Platform` to construct the platform-specific
/// config directory (e.g. `~/.config/{app_name}/` on Linux).
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath, app_name: &str) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", app_name)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Read an explicitly named config file. A missing file is an error.
pub fn read_config_file(path: &Path) -> Result<(PathBuf, String), BindError> {
    std::fs::read_to_string(path)
        .map(|content| (path.to_path_buf(), content))
        .map_err(|source| BindError::IoError {
            path: path.to_path_buf(),
            source,
        })
}

/// Find `file_name` in the search paths, highest priority (last) first.
///
/// Missing files are skipped; other I/O errors are propagated.
pub fn find_config_file(
    search_paths: &[SearchPath],
    file_name: &str,
    app_name: &str,
) -> Result<Option<(PathBuf, String)>, BindError> {
    let dirs: Vec<PathBuf> = search_paths
        .iter()
        .filter_map(|sp| resolve_search_path(sp, app_name))
        .collect();

    for dir in dirs.iter().rev() {
        let file_path = dir.join(file_name);
        match std::fs::read_to_string(&file_path) {
            Ok(content) => return Ok(Some((file_path, content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(BindError::IoError {
                    path: file_path,
                    source: e,
                });
            }
        }
    }
    Ok(None)
}
