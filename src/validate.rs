//! Strict-mode validation: detect keys in a config file that match no entry.
//!
//! Reports each unknown key with its file path and best-effort line number.

use std::collections::HashSet;
use std::path::Path;

use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::value::Value;

/// Check the flattened pairs of a config file against the entry names.
pub fn validate_unknown_keys(
    pairs: &[(String, Option<Value>)],
    entries: &[ConfigEntry],
    content: &str,
    path: &Path,
) -> Result<(), BindError> {
    let known: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    let json = is_json(path);

    let errors: Vec<BindError> = pairs
        .iter()
        .filter(|(key, _)| !known.contains(key.as_str()))
        .map(|(key, _)| BindError::UnknownKey {
            key: key.clone(),
            path: path.to_path_buf(),
            line: if json {
                find_json_key_line(content, key)
            } else {
                find_key_line(content, key)
            },
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(BindError::UnknownKeys(errors))
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Find the 1-indexed line number for a key in TOML content.
///
/// For a dotted key like `"config-store.typo"`, tracks the current
/// `[section]` header while scanning and only matches the leaf key when inside
/// the correct section. Quoted keys and inline tables are not handled.
/// Returns 0 if the key cannot be located.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let (expected_section, leaf) = match dotted_key.rsplit_once('.') {
        Some((section, leaf)) => (section.split('.').collect::<Vec<_>>(), leaf),
        None => (Vec::new(), dotted_key),
    };
    let mut current_section: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            continue;
        }

        let in_right_section = expected_section.len() == current_section.len()
            && expected_section
                .iter()
                .zip(&current_section)
                .all(|(a, b)| *a == b);

        if in_right_section
            && let Some(after_key) = trimmed.strip_prefix(leaf)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}

/// JSON has no sections to track: the first line holding `"leaf":` wins.
fn find_json_key_line(content: &str, dotted_key: &str) -> usize {
    let leaf = dotted_key.rsplit('.').next().unwrap_or(dotted_key);
    let needle = format!("\"{leaf}\"");
    content
        .lines()
        .position(|line| {
            line.find(&needle)
                .is_some_and(|at| line[at + needle.len()..].trim_start().starts_with(':'))
        })
        .map_or(0, |i| i + 1)
}
