use crate::entry::ConfigEntry;
use crate::value::Value;

/// Collect the environment values of `entries`.
///
/// Entry `config-store.file-path` with prefix `ABCDE` is read from
/// `ABCDE_CONFIG_STORE_FILE_PATH`. An empty prefix drops the leading
/// `PREFIX_`. Values stay text; the caster parses them per field.
///
/// Takes an iterator so tests can pass synthetic data instead of
/// `std::env::vars()`. Returns `(entry name, variable, value)` in entry order.
pub fn env_values(
    prefix: &str,
    entries: &[ConfigEntry],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, String, Value)> {
    let vars: Vec<(String, String)> = vars.into_iter().collect();
    let lookup = |var: &str| {
        vars.iter()
            .rev()
            .find(|(k, _)| k == var)
            .map(|(_, v)| v.clone())
    };

    entries
        .iter()
        .filter_map(|entry| {
            let var = entry.env_var(prefix);
            lookup(&var).map(|value| (entry.name.clone(), var, Value::String(value)))
        })
        .collect()
}

/// Variable name for a dotted entry name: `.` and `-` become `_`, everything
/// is uppercased, and a non-empty prefix is prepended with `_`.
pub fn var_name(prefix: &str, name: &str) -> String {
    let body: String = name
        .chars()
        .map(|c| match c {
            '.' | '-' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    if prefix.is_empty() {
        body
    } else {
        format!("{}_{body}", prefix.to_ascii_uppercase())
    }
}

/// Environment value of a single name that is not an entry, such as the
/// config file path.
pub fn env_value(
    prefix: &str,
    name: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Option<String> {
    let var = var_name(prefix, name);
    vars.into_iter()
        .filter(|(k, _)| *k == var)
        .map(|(_, v)| v)
        .last()
}
