//! The untyped value every raw input is expressed in before casting.
//!
//! Annotation defaults, config file contents, environment variables and
//! command-line flags all end up as a [`Value`]. The set of variants is closed,
//! so the caster in [`cast`](crate::cast) is a total function over it.

use std::fmt;

use indexmap::IndexMap;

/// An untyped raw value: a scalar, an ordered sequence or an ordered mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in type mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Sequence(items) => format!("sequence of {} element(s)", items.len()),
            Value::Mapping(map) => format!("mapping with {} key(s)", map.len()),
            scalar => format!("{} {scalar}", scalar.kind_name()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{key:?}:{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(v: Vec<V>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ();

    /// JSON `null` has no counterpart and maps to `Err(())`. Nulls nested in
    /// arrays or objects are dropped.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match json {
            serde_json::Value::Null => return Err(()),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Int(i),
                (None, Some(u)) => Value::String(u.to_string()),
                (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .filter_map(|item| Value::try_from(item).ok())
                    .collect(),
            ),
            serde_json::Value::Object(map) => Value::Mapping(
                map.into_iter()
                    .filter_map(|(k, v)| Value::try_from(v).ok().map(|v| (k, v)))
                    .collect(),
            ),
        })
    }
}

/// Join a parent path and a leaf name with `.`.
pub fn join_name(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// Rewrite the relaxed single-quote literal syntax into strict JSON.
///
/// `{'name':'a','desc':'say "hi"'}` becomes `{"name":"a","desc":"say \"hi\""}`.
/// Inside a single-quoted string `\'` stands for a literal quote. Double-quoted
/// strings are copied unchanged.
pub fn relaxed_to_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '\'' => break,
                        '\\' => match chars.next() {
                            Some('\'') => out.push('\''),
                            Some(escaped) => {
                                out.push('\\');
                                out.push(escaped);
                            }
                            None => out.push('\\'),
                        },
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '"' => break,
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        _ => {}
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Decode a relaxed literal into JSON.
pub fn parse_relaxed(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(&relaxed_to_json(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_quotes_become_double_quotes() {
        assert_eq!(
            relaxed_to_json("{'name':'prio','default':0}"),
            r#"{"name":"prio","default":0}"#
        );
    }

    #[test]
    fn double_quotes_inside_single_quoted_string_are_escaped() {
        let json = relaxed_to_json(r#"{'desc':'say "hi"'}"#);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["desc"], "say \"hi\"");
    }

    #[test]
    fn escaped_single_quote_is_kept() {
        let parsed = parse_relaxed(r"{'desc':'can\'t be modified'}").unwrap();
        assert_eq!(parsed["desc"], "can't be modified");
    }

    #[test]
    fn double_quoted_strings_pass_through() {
        let parsed = parse_relaxed(r#"{"name":"it's"}"#).unwrap();
        assert_eq!(parsed["name"], "it's");
    }

    #[test]
    fn json_numbers_keep_integer_and_float_apart() {
        let v = Value::try_from(serde_json::json!([1, 2.5, "x", true])).unwrap();
        assert_eq!(
            v,
            Value::Sequence(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::String("x".into()),
                Value::Bool(true),
            ])
        );
    }

    #[test]
    fn json_object_becomes_mapping() {
        let v = Value::try_from(parse_relaxed("{'b':1,'a':null}").unwrap()).unwrap();
        let map = v.as_mapping().unwrap();
        assert_eq!(map.get("b"), Some(&Value::Int(1)));
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn mapping_keeps_written_key_order() {
        let v = Value::try_from(parse_relaxed("{'zeta':1,'alpha':2,'mid':3}").unwrap()).unwrap();
        let keys: Vec<&str> = v.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn unsigned_beyond_i64_becomes_text() {
        let v = Value::try_from(serde_json::json!(u64::MAX)).unwrap();
        assert_eq!(v, Value::String("18446744073709551615".into()));
    }

    #[test]
    fn null_has_no_value() {
        assert!(Value::try_from(serde_json::Value::Null).is_err());
    }

    #[test]
    fn join_name_skips_empty_parent() {
        assert_eq!(join_name("", "root"), "root");
        assert_eq!(join_name("root", "child"), "root.child");
        assert_eq!(join_name("root.children", "child"), "root.children.child");
    }

    #[test]
    fn display_renders_literal() {
        let v = Value::Sequence(vec![Value::Int(1), Value::String("a".into())]);
        assert_eq!(v.to_string(), r#"[1,"a"]"#);
    }
}
