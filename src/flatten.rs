//! A serde Serializer that flattens any `Serialize` value into dotted
//! name/value pairs.
//!
//! Used for both config file contents (a parsed `toml::Table` or
//! `serde_json::Value`) and programmatic override sources. Structures and
//! maps are recursed into; sequences stay whole, since every list is a single
//! entry.

use serde::ser::{self, Serialize};

use crate::value::{Value, join_name};

/// Flatten a `Serialize` value into dotted pairs.
///
/// `None` (and JSON `null`) become `(name, None)`:
/// `Outer { store: Inner { path: "x" } }` gives `[("store.path", Some("x"))]`.
pub fn flatten<S: Serialize + ?Sized>(
    source: &S,
) -> Result<Vec<(String, Option<Value>)>, FlattenError> {
    let mut out = Vec::new();
    source.serialize(FlattenSerializer {
        prefix: String::new(),
        out: &mut out,
    })?;
    Ok(out)
}

#[derive(Debug)]
pub struct FlattenError(String);

impl std::fmt::Display for FlattenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flatten error: {}", self.0)
    }
}

impl std::error::Error for FlattenError {}

impl ser::Error for FlattenError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        FlattenError(msg.to_string())
    }
}

type Pairs = Vec<(String, Option<Value>)>;

struct FlattenSerializer<'a> {
    prefix: String,
    out: &'a mut Pairs,
}

impl FlattenSerializer<'_> {
    fn emit(self, value: Option<Value>) -> Result<(), FlattenError> {
        self.out.push((self.prefix, value));
        Ok(())
    }
}

impl<'a> ser::Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = FlattenError;
    type SerializeSeq = SeqCollector<'a>;
    type SerializeTuple = SeqCollector<'a>;
    type SerializeTupleStruct = SeqCollector<'a>;
    type SerializeTupleVariant = SeqCollector<'a>;
    type SerializeMap = MapFlattener<'a>;
    type SerializeStruct = MapFlattener<'a>;
    type SerializeStructVariant = MapFlattener<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), Self::Error> {
        self.emit(Some(Value::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i16(self, v: i16) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i32(self, v: i32) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_i64(self, v: i64) -> Result<(), Self::Error> {
        self.emit(Some(Value::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u16(self, v: u16) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u32(self, v: u32) -> Result<(), Self::Error> {
        self.serialize_i64(v.into())
    }

    fn serialize_u64(self, v: u64) -> Result<(), Self::Error> {
        match i64::try_from(v) {
            Ok(i) => self.serialize_i64(i),
            Err(_) => self.emit(Some(Value::String(v.to_string()))),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<(), Self::Error> {
        self.serialize_f64(v.into())
    }

    fn serialize_f64(self, v: f64) -> Result<(), Self::Error> {
        self.emit(Some(Value::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<(), Self::Error> {
        self.serialize_str(&v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<(), Self::Error> {
        self.emit(Some(Value::String(v.to_string())))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Self::Error> {
        Err(FlattenError("bytes not supported".into()))
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        self.emit(None)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        self.emit(None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        self.emit(None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Self::Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqCollector {
            prefix: self.prefix,
            out: self.out,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapFlattener {
            prefix: self.prefix,
            out: self.out,
            current_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.serialize_map(None)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.serialize_map(None)
    }
}

// -- Structures and maps -------------------------------------------------------

struct MapFlattener<'a> {
    prefix: String,
    out: &'a mut Pairs,
    current_key: Option<String>,
}

impl MapFlattener<'_> {
    fn descend<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), FlattenError> {
        value.serialize(FlattenSerializer {
            prefix: join_name(&self.prefix, key),
            out: self.out,
        })
    }
}

impl ser::SerializeStruct for MapFlattener<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.descend(key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for MapFlattener<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.descend(key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ser::SerializeMap for MapFlattener<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        let key = serde_json::to_value(key).map_err(|e| FlattenError(e.to_string()))?;
        match key {
            serde_json::Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(FlattenError("map keys must be strings".into())),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| FlattenError("map value without a key".into()))?;
        self.descend(&key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// -- Sequences -----------------------------------------------------------------

/// Collects a whole sequence into one [`Value::Sequence`]. Elements go through
/// `serde_json` so nested structures inside a list keep their shape.
struct SeqCollector<'a> {
    prefix: String,
    out: &'a mut Pairs,
    items: Vec<Value>,
}

impl SeqCollector<'_> {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), FlattenError> {
        let json =
            serde_json::to_value(value).map_err(|e| FlattenError(format!("list element: {e}")))?;
        if let Ok(v) = Value::try_from(json) {
            self.items.push(v);
        }
        Ok(())
    }

    fn finish(self) -> Result<(), FlattenError> {
        self.out.push((self.prefix, Some(Value::Sequence(self.items))));
        Ok(())
    }
}

impl ser::SerializeSeq for SeqCollector<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl ser::SerializeTuple for SeqCollector<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SeqCollector<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SeqCollector<'_> {
    type Ok = ();
    type Error = FlattenError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;

    #[test]
    fn flat_struct() {
        #[derive(Serialize)]
        struct Args {
            name: String,
            prio: u16,
        }
        let pairs = flatten(&Args {
            name: "hello".into(),
            prio: 23,
        })
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("name".into(), Some(Value::String("hello".into()))),
                ("prio".into(), Some(Value::Int(23))),
            ]
        );
    }

    #[test]
    fn option_none_emits_none() {
        #[derive(Serialize)]
        struct Args {
            name: Option<String>,
        }
        assert_eq!(
            flatten(&Args { name: None }).unwrap(),
            vec![("name".into(), None)]
        );
    }

    #[test]
    fn nested_struct_builds_dotted_names() {
        #[derive(Serialize)]
        struct Inner {
            #[serde(rename = "file-path")]
            file_path: String,
        }
        #[derive(Serialize)]
        struct Outer {
            #[serde(rename = "config-store")]
            store: Inner,
        }
        let pairs = flatten(&Outer {
            store: Inner {
                file_path: "/devops".into(),
            },
        })
        .unwrap();
        assert_eq!(
            pairs,
            vec![(
                "config-store.file-path".into(),
                Some(Value::String("/devops".into()))
            )]
        );
    }

    #[test]
    fn hashmap_input() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), "x".to_string());
        assert_eq!(
            flatten(&map).unwrap(),
            vec![("name".into(), Some(Value::String("x".into())))]
        );
    }

    #[test]
    fn toml_table_with_list_of_tables() {
        let table: toml::Table = toml::from_str(
            r#"
prio = 1

[config-store]
file-path = "cfgs"

[[target-secrets]]
name = "secret1"
count = 12
"#,
        )
        .unwrap();
        let pairs = flatten(&table).unwrap();
        assert!(pairs.contains(&("prio".into(), Some(Value::Int(1)))));
        assert!(pairs.contains(&(
            "config-store.file-path".into(),
            Some(Value::String("cfgs".into()))
        )));
        let (_, secrets) = pairs
            .iter()
            .find(|(k, _)| k == "target-secrets")
            .unwrap();
        let Some(Value::Sequence(items)) = secrets else {
            panic!("expected a sequence");
        };
        let first = items[0].as_mapping().unwrap();
        assert_eq!(first.get("count"), Some(&Value::Int(12)));
    }

    #[test]
    fn json_document() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"immutable": true, "config-store": {"target-secret": {"key": "k"}}, "gone": null}"#,
        )
        .unwrap();
        let pairs = flatten(&json).unwrap();
        assert!(pairs.contains(&("immutable".into(), Some(Value::Bool(true)))));
        assert!(pairs.contains(&(
            "config-store.target-secret.key".into(),
            Some(Value::String("k".into()))
        )));
        assert!(pairs.contains(&("gone".into(), None)));
    }

    #[test]
    fn unit_variant_serializes_as_string() {
        #[derive(Serialize)]
        enum Mode {
            Fast,
        }
        #[derive(Serialize)]
        struct Args {
            mode: Mode,
        }
        assert_eq!(
            flatten(&Args { mode: Mode::Fast }).unwrap(),
            vec![("mode".into(), Some(Value::String("Fast".into())))]
        );
    }

    #[test]
    fn huge_unsigned_becomes_text() {
        #[derive(Serialize)]
        struct Args {
            big: u64,
        }
        assert_eq!(
            flatten(&Args { big: u64::MAX }).unwrap(),
            vec![("big".into(), Some(Value::String(u64::MAX.to_string())))]
        );
    }

    #[test]
    fn empty_struct() {
        #[derive(Serialize)]
        struct Empty {}
        assert!(flatten(&Empty {}).unwrap().is_empty());
    }
}
