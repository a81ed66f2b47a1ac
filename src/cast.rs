//! Casting untyped [`Value`]s into concrete Rust types.
//!
//! [`Bind`] is implemented for every supported destination:
//!
//! - scalars: `bool`, `String`, `PathBuf`, all integer widths, `f32`, `f64`
//!   and `Duration`
//! - `Vec<T>` of any bindable `T`, including structures
//! - `Option<T>`, transparent
//! - every [`Schema`] type, cast from a mapping keyed by annotation names
//!
//! `HashMap` and `BTreeMap` implement it only to report
//! [`BindError::UnsupportedType`] when used as a field.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::trace;

use crate::apply::apply_fields;
use crate::duration::{format_duration, parse_duration};
use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::extract::extract_fields;
use crate::normalize::normalize;
use crate::provider::Provider;
use crate::schema::{Schema, describe_fields};
use crate::shape::{Class, ScalarKind, Shape};
use crate::value::Value;

/// A type the engine can fill from a [`Value`].
pub trait Bind: Sized {
    /// The static shape used for classification.
    fn shape() -> Shape;

    /// Convert a raw value into `Self`.
    fn cast(value: &Value) -> Result<Self, BindError>;

    /// Render back into a raw value. `None` for an empty `Option`.
    fn to_value(&self) -> Option<Value>;

    /// Entries of a structure rooted at `parent`. Only structures have any.
    fn extract_entries(_parent: &str) -> Result<Vec<ConfigEntry>, BindError> {
        Err(BindError::UnsupportedTarget(type_name::<Self>().to_string()))
    }

    /// Assign provider values to the annotated fields below `parent`.
    fn apply_from(&mut self, _provider: &dyn Provider, _parent: &str) -> Result<(), BindError> {
        Err(BindError::UnsupportedTarget(type_name::<Self>().to_string()))
    }
}

// -- Scalars -----------------------------------------------------------------

impl Bind for bool {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Bool)
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::String(s) => match s.trim() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
                _ => Err(BindError::mismatch("bool", value)),
            },
            _ => Err(BindError::mismatch("bool", value)),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Bool(*self))
    }
}

impl Bind for String {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Text)
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(x) => Ok(x.to_string()),
            _ => Err(BindError::mismatch("string", value)),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }
}

impl Bind for PathBuf {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Path)
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        match value {
            Value::String(s) => Ok(PathBuf::from(s)),
            _ => Err(BindError::mismatch("path", value)),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::String(self.to_string_lossy().into_owned()))
    }
}

impl Bind for Duration {
    fn shape() -> Shape {
        Shape::Scalar(ScalarKind::Duration)
    }

    /// Text goes through [`parse_duration`]; integers count nanoseconds.
    fn cast(value: &Value) -> Result<Self, BindError> {
        match value {
            Value::String(s) => parse_duration(s).map_err(|reason| BindError::TypeMismatch {
                expected: "duration".into(),
                found: reason,
            }),
            Value::Int(n) => u64::try_from(*n)
                .map(Duration::from_nanos)
                .map_err(|_| BindError::mismatch("non-negative duration", value)),
            _ => Err(BindError::mismatch("duration", value)),
        }
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::String(format_duration(*self)))
    }
}

/// Integer text with optional sign and `0x`/`0o`/`0b` radix prefix.
fn parse_int_text(text: &str) -> Option<i128> {
    let s = text.trim().replace('_', "");
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s.as_str())),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x" | "0X") => (16, &digits[2..]),
        Some("0o" | "0O") => (8, &digits[2..]),
        Some("0b" | "0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

macro_rules! bind_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl Bind for $ty {
            fn shape() -> Shape {
                Shape::Scalar(ScalarKind::Int)
            }

            fn cast(value: &Value) -> Result<Self, BindError> {
                let wide: i128 = match value {
                    Value::Int(i) => i128::from(*i),
                    Value::Float(x) if x.is_finite() && x.fract() == 0.0 => *x as i128,
                    Value::String(s) => parse_int_text(s)
                        .ok_or_else(|| BindError::mismatch(stringify!($ty), value))?,
                    _ => return Err(BindError::mismatch(stringify!($ty), value)),
                };
                <$ty>::try_from(wide).map_err(|_| {
                    BindError::mismatch(concat!(stringify!($ty), " within range"), value)
                })
            }

            fn to_value(&self) -> Option<Value> {
                Some(match i64::try_from(*self) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::String(self.to_string()),
                })
            }
        }
    )*};
}

bind_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! bind_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Bind for $ty {
            fn shape() -> Shape {
                Shape::Scalar(ScalarKind::Float)
            }

            fn cast(value: &Value) -> Result<Self, BindError> {
                match value {
                    Value::Float(x) => Ok(*x as $ty),
                    Value::Int(i) => Ok(*i as $ty),
                    Value::String(s) => s
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| BindError::mismatch(stringify!($ty), value)),
                    _ => Err(BindError::mismatch(stringify!($ty), value)),
                }
            }

            fn to_value(&self) -> Option<Value> {
                Some(Value::Float(f64::from(*self)))
            }
        }
    )*};
}

bind_float!(f32, f64);

// -- Containers --------------------------------------------------------------

impl<T: Bind> Bind for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        let Value::Sequence(items) = value else {
            return Err(BindError::mismatch("sequence", value));
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| T::cast(item).map_err(|e| e.within(&format!("[{i}]"))))
            .collect()
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::Sequence(
            self.iter().filter_map(Bind::to_value).collect(),
        ))
    }
}

impl<T: Bind> Bind for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        T::cast(value).map(Some)
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(Bind::to_value)
    }

    fn extract_entries(parent: &str) -> Result<Vec<ConfigEntry>, BindError> {
        T::extract_entries(parent)
    }

    fn apply_from(&mut self, provider: &dyn Provider, parent: &str) -> Result<(), BindError> {
        match self {
            Some(inner) => inner.apply_from(provider, parent),
            None => Err(BindError::UnsupportedTarget(format!(
                "empty {}",
                type_name::<Self>()
            ))),
        }
    }
}

impl<K, V, S> Bind for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Unsupported(type_name::<Self>())
    }

    fn cast(_value: &Value) -> Result<Self, BindError> {
        Err(BindError::UnsupportedType {
            type_name: type_name::<Self>().to_string(),
        })
    }

    fn to_value(&self) -> Option<Value> {
        None
    }
}

impl<K, V> Bind for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Unsupported(type_name::<Self>())
    }

    fn cast(_value: &Value) -> Result<Self, BindError> {
        Err(BindError::UnsupportedType {
            type_name: type_name::<Self>().to_string(),
        })
    }

    fn to_value(&self) -> Option<Value> {
        None
    }
}

// -- Structures --------------------------------------------------------------

impl<T: Schema> Bind for T {
    fn shape() -> Shape {
        Shape::Struct(type_name::<T>())
    }

    fn cast(value: &Value) -> Result<Self, BindError> {
        cast_struct(value)
    }

    fn to_value(&self) -> Option<Value> {
        Some(render_struct(self))
    }

    fn extract_entries(parent: &str) -> Result<Vec<ConfigEntry>, BindError> {
        extract_fields::<T>(parent)
    }

    fn apply_from(&mut self, provider: &dyn Provider, parent: &str) -> Result<(), BindError> {
        apply_fields(self, provider, parent)
    }
}

/// Build a fresh `T` from a mapping keyed by the fields' own annotation
/// names. Absent keys fall back to the field default; nested structures
/// without a key are built from an empty mapping so their own defaults apply.
///
/// The instance is only returned once every field has been filled.
fn cast_struct<T: Schema>(value: &Value) -> Result<T, BindError> {
    let Value::Mapping(map) = value else {
        return Err(BindError::mismatch(
            format!("mapping for {}", type_name::<T>()),
            value,
        ));
    };
    let empty = Value::Mapping(IndexMap::new());
    let mut out = T::default();

    for field in describe_fields::<T>() {
        let Some((text, binding)) = field.bound() else {
            continue;
        };
        let (ann, class) = binding.describe(field.ident(), text, "")?;

        let Some(assign) = &binding.assign else {
            return Err(BindError::UnassignableField {
                field: field.ident().to_string(),
                key: ann.key.clone(),
            }
            .within(&ann.key));
        };

        let raw = match (map.get(&ann.key), &ann.default, class) {
            (Some(given), _, _) => given,
            (None, Some(default), _) => default,
            (None, None, Class::Composite) => &empty,
            (None, None, Class::Primitive) => {
                return Err(BindError::MissingRequiredValue {
                    key: ann.key.clone(),
                }
                .within(&ann.key));
            }
        };
        let raw = normalize(raw.clone(), &binding.shape).map_err(|e| e.within(&ann.key))?;
        trace!(field = field.ident(), key = %ann.key, value = %raw, "casting struct field");
        assign(&mut out, &raw).map_err(|e| e.within(&ann.key))?;
    }
    Ok(out)
}

/// Render the annotated fields of `value` as a mapping keyed by annotation
/// names. Fields whose annotation does not parse are left out.
fn render_struct<T: Schema>(value: &T) -> Value {
    let mut map = IndexMap::new();
    for field in describe_fields::<T>() {
        let Some((text, binding)) = field.bound() else {
            continue;
        };
        let Ok(ann) = (binding.parse)(text, "") else {
            continue;
        };
        if let Some(v) = (binding.read)(value) {
            map.insert(ann.key, v);
        }
    }
    Value::Mapping(map)
}

/// Cast `value` into any bindable type. Equivalent to `T::cast`.
pub fn cast<T: Bind>(value: &Value) -> Result<T, BindError> {
    T::cast(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Nested, Outer, TargetSecret, Unexported};
    use crate::value::parse_relaxed;

    fn relaxed(text: &str) -> Value {
        Value::try_from(parse_relaxed(text).unwrap()).unwrap()
    }

    // -- Scalars --

    #[test]
    fn integers_from_ints_floats_and_text() {
        assert_eq!(cast::<i32>(&Value::Int(11)).unwrap(), 11);
        assert_eq!(cast::<u8>(&Value::Float(7.0)).unwrap(), 7);
        assert_eq!(cast::<i64>(&Value::String(" -42 ".into())).unwrap(), -42);
        assert_eq!(cast::<u32>(&Value::String("0x1F".into())).unwrap(), 31);
        assert_eq!(cast::<u64>(&Value::String("18446744073709551615".into())).unwrap(), u64::MAX);
    }

    #[test]
    fn integer_out_of_range_is_mismatch() {
        let err = cast::<u8>(&Value::Int(256)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
        assert!(cast::<u16>(&Value::Int(-1)).is_err());
        assert!(cast::<i32>(&Value::Float(1.5)).is_err());
        assert!(cast::<i32>(&Value::Bool(true)).is_err());
        assert!(cast::<i32>(&Value::String("eleven".into())).is_err());
    }

    #[test]
    fn large_unsigned_renders_as_text() {
        assert_eq!(
            u64::MAX.to_value(),
            Some(Value::String("18446744073709551615".into()))
        );
        assert_eq!(7u64.to_value(), Some(Value::Int(7)));
    }

    #[test]
    fn floats() {
        assert_eq!(cast::<f64>(&Value::Int(2)).unwrap(), 2.0);
        assert_eq!(cast::<f64>(&Value::Float(22.22)).unwrap(), 22.22);
        assert_eq!(cast::<f32>(&Value::String("0.5".into())).unwrap(), 0.5);
        assert!(cast::<f64>(&Value::Sequence(vec![])).is_err());
    }

    #[test]
    fn bools() {
        assert!(cast::<bool>(&Value::Bool(true)).unwrap());
        assert!(cast::<bool>(&Value::String("true".into())).unwrap());
        assert!(!cast::<bool>(&Value::String("F".into())).unwrap());
        assert!(cast::<bool>(&Value::Int(1)).unwrap());
        assert!(!cast::<bool>(&Value::Int(0)).unwrap());
        assert!(matches!(
            cast::<bool>(&Value::Int(5)).unwrap_err(),
            BindError::TypeMismatch { .. }
        ));
        assert!(cast::<bool>(&Value::String("yes".into())).is_err());
    }

    #[test]
    fn strings_accept_rendered_scalars() {
        assert_eq!(cast::<String>(&Value::String("hello".into())).unwrap(), "hello");
        assert_eq!(cast::<String>(&Value::Int(5)).unwrap(), "5");
        assert_eq!(cast::<String>(&Value::Bool(false)).unwrap(), "false");
        assert!(cast::<String>(&Value::Mapping(IndexMap::new())).is_err());
    }

    #[test]
    fn paths() {
        assert_eq!(
            cast::<PathBuf>(&Value::String("/etc/app".into())).unwrap(),
            PathBuf::from("/etc/app")
        );
        assert!(cast::<PathBuf>(&Value::Int(1)).is_err());
    }

    #[test]
    fn durations_from_text_and_nanoseconds() {
        assert_eq!(
            cast::<Duration>(&Value::String("5m".into())).unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(
            cast::<Duration>(&Value::Int(1_000_000)).unwrap(),
            Duration::from_millis(1)
        );
        assert!(cast::<Duration>(&Value::Int(-1)).is_err());
        let err = cast::<Duration>(&Value::String("soon".into())).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    // -- Lists --

    #[test]
    fn list_of_scalars() {
        let v = Value::Sequence(vec![Value::Int(11), Value::Int(22)]);
        assert_eq!(cast::<Vec<i32>>(&v).unwrap(), vec![11, 22]);
    }

    #[test]
    fn non_sequence_into_list_is_mismatch() {
        let err = cast::<Vec<i32>>(&Value::Int(10)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn sequence_into_scalar_is_mismatch() {
        let v = Value::Sequence(vec![Value::Int(11), Value::Int(22)]);
        assert!(cast::<i32>(&v).is_err());
    }

    #[test]
    fn bad_element_reports_its_index() {
        let v = Value::Sequence(vec![Value::Int(1), Value::String("x".into())]);
        let err = cast::<Vec<u8>>(&v).unwrap_err();
        assert_eq!(err.path(), Some("[1]"));
    }

    #[test]
    fn list_of_structures() {
        let v = relaxed("[{'name':'a','key':'k','count':1},{'name':'b','key':'l'}]");
        let secrets = cast::<Vec<TargetSecret>>(&v).unwrap();
        assert_eq!(
            secrets,
            vec![
                TargetSecret {
                    name: "a".into(),
                    key: "k".into(),
                    count: 1,
                },
                TargetSecret {
                    name: "b".into(),
                    key: "l".into(),
                    count: 0,
                },
            ]
        );
    }

    #[test]
    fn non_mapping_element_in_list_of_structures() {
        let v = relaxed("[{'name':'a','key':'k'}, 3]");
        let err = cast::<Vec<TargetSecret>>(&v).unwrap_err();
        assert_eq!(err.path(), Some("[1]"));
        assert!(matches!(err.root_cause(), BindError::TypeMismatch { .. }));
    }

    // -- Structures --

    #[test]
    fn structure_from_mapping() {
        let v = relaxed(
            "{'field_1':'a field','field_2':11,'field_3':{'field_a':22.22},\
             'field_4':[11,22],'field_5':[{'field_a':22.22}]}",
        );
        let outer = cast::<Outer>(&v).unwrap();
        assert_eq!(
            outer,
            Outer {
                field_1: "a field".into(),
                field_2: 11,
                field_3: Nested { field_a: 22.22 },
                field_4: vec![11, 22],
                field_5: vec![Nested { field_a: 22.22 }],
                ignored: false,
            }
        );
    }

    #[test]
    fn structure_casting_is_deterministic() {
        let v = relaxed("{'name':'a','key':'k','count':3}");
        let first = cast::<TargetSecret>(&v).unwrap();
        let second = cast::<TargetSecret>(&v).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_required_value_names_the_key() {
        let err = cast::<TargetSecret>(&relaxed("{'name':'a'}")).unwrap_err();
        assert_eq!(err.path(), Some("key"));
        assert!(matches!(
            err.root_cause(),
            BindError::MissingRequiredValue { key } if key == "key"
        ));
    }

    #[test]
    fn nested_required_value_reports_full_path() {
        let err = cast::<Outer>(&relaxed(
            "{'field_1':'x','field_2':1,'field_4':[],'field_5':[]}",
        ))
        .unwrap_err();
        assert_eq!(err.path(), Some("field_3.field_a"));
    }

    #[test]
    fn non_mapping_into_structure_is_mismatch() {
        let err = cast::<TargetSecret>(&Value::Int(11)).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn annotated_readonly_field_is_unassignable() {
        let err = cast::<Unexported>(&Value::Mapping(IndexMap::new())).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            BindError::UnassignableField { .. }
        ));
    }

    #[test]
    fn maps_are_unsupported() {
        let err = cast::<HashMap<String, i32>>(&Value::Mapping(IndexMap::new())).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { .. }));
    }

    #[test]
    fn optional_wraps_inner_cast() {
        assert_eq!(cast::<Option<u16>>(&Value::Int(80)).unwrap(), Some(80));
        assert_eq!(None::<u16>.to_value(), None);
    }

    #[test]
    fn structure_renders_back_to_mapping() {
        let secret = TargetSecret {
            name: "a".into(),
            key: "k".into(),
            count: 1,
        };
        let rendered = secret.to_value().unwrap();
        assert_eq!(rendered, relaxed("{'name':'a','key':'k','count':1}"));
        assert_eq!(cast::<TargetSecret>(&rendered).unwrap(), secret);
    }
}
