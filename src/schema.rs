//! Compile-time descriptor tables for configuration structures.
//!
//! A structure opts in by implementing [`Schema`], usually through the
//! [`schema!`](crate::schema!) macro:
//!
//! ```
//! use bindfig::schema;
//!
//! #[derive(Debug, Default)]
//! struct Cfg {
//!     name: String,
//!     prio: i32,
//!     scratch: String,
//! }
//!
//! schema! {
//!     Cfg {
//!         name => "{'name':'name','desc':'the name of the config'}",
//!         prio => "{'name':'prio','desc':'the prio','default':0}",
//!         scratch,
//!     }
//! }
//! ```
//!
//! A field listed without an annotation is skipped. `#[readonly] field =>
//! "..."` registers an annotated field the engine may read but never write;
//! binding into it fails with
//! [`BindError::UnassignableField`](crate::BindError::UnassignableField).

use crate::annotation::{self, Annotation};
use crate::cast::Bind;
use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::provider::Provider;
use crate::shape::{Class, Shape, classify};
use crate::value::Value;

/// A structure whose fields can be bound.
pub trait Schema: Default + 'static {
    /// Register the fields in declaration order.
    fn describe(fields: &mut SchemaBuilder<Self>);
}

type Read<T> = Box<dyn Fn(&T) -> Option<Value>>;
type Assign<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), BindError>>;
type Descend<T> = Box<dyn Fn(&mut T, &dyn Provider, &str) -> Result<(), BindError>>;

/// The typed operations of one annotated field, erased over the field type.
pub(crate) struct Binding<T> {
    pub(crate) shape: Shape,
    pub(crate) parse: fn(&str, &str) -> Result<Annotation, BindError>,
    pub(crate) extract: fn(&str) -> Result<Vec<ConfigEntry>, BindError>,
    pub(crate) read: Read<T>,
    /// Absent for read-only fields.
    pub(crate) assign: Option<Assign<T>>,
    /// Absent for read-only fields.
    pub(crate) descend: Option<Descend<T>>,
}

impl<T> Binding<T> {
    /// Parse the field's annotation under `parent` and classify its shape.
    ///
    /// Failures carry the annotation's own name as path segment. Only when
    /// the annotation is unreadable, and so has no name, the Rust field name
    /// stands in.
    pub(crate) fn describe(
        &self,
        ident: &str,
        text: &str,
        parent: &str,
    ) -> Result<(Annotation, Class), BindError> {
        let ann = (self.parse)(text, parent).map_err(|e| {
            let key = match &e {
                BindError::DefaultCastFailure { name, .. } | BindError::CompositeDefault { name } => {
                    leaf_of(name, parent).to_string()
                }
                _ => ident.to_string(),
            };
            e.within(&key)
        })?;
        let class = classify(&self.shape).map_err(|e| e.within(&ann.key))?;
        Ok((ann, class))
    }
}

fn leaf_of<'a>(name: &'a str, parent: &str) -> &'a str {
    if parent.is_empty() {
        return name;
    }
    name.strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(name)
}

/// One row of a structure's descriptor table.
pub struct FieldDescriptor<T> {
    ident: &'static str,
    annotation: Option<&'static str>,
    binding: Option<Binding<T>>,
}

impl<T> FieldDescriptor<T> {
    /// The Rust field name.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn annotation(&self) -> Option<&'static str> {
        self.annotation
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.binding.as_ref().map(|b| &b.shape)
    }

    pub fn is_writable(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| b.assign.is_some())
    }

    pub(crate) fn bound(&self) -> Option<(&'static str, &Binding<T>)> {
        self.annotation.zip(self.binding.as_ref())
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("ident", &self.ident)
            .field("annotation", &self.annotation)
            .field("shape", &self.shape())
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Collects the descriptor table of `T`.
pub struct SchemaBuilder<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Register an annotated field with read and write access.
    pub fn field<F, G, M>(
        &mut self,
        ident: &'static str,
        annotation: &'static str,
        get: G,
        get_mut: M,
    ) -> &mut Self
    where
        F: Bind + 'static,
        G: Fn(&T) -> &F + 'static,
        M: Fn(&mut T) -> &mut F + Clone + 'static,
    {
        let descend_mut = get_mut.clone();
        self.fields.push(FieldDescriptor {
            ident,
            annotation: Some(annotation),
            binding: Some(Binding {
                shape: F::shape(),
                parse: annotation::parse::<F>,
                extract: F::extract_entries,
                read: Box::new(move |target| get(target).to_value()),
                assign: Some(Box::new(move |target, value| {
                    *get_mut(target) = F::cast(value)?;
                    Ok(())
                })),
                descend: Some(Box::new(move |target, provider, parent| {
                    descend_mut(target).apply_from(provider, parent)
                })),
            }),
        });
        self
    }

    /// Register an annotated field that can be read but not written.
    pub fn readonly<F, G>(&mut self, ident: &'static str, annotation: &'static str, get: G) -> &mut Self
    where
        F: Bind + 'static,
        G: Fn(&T) -> &F + 'static,
    {
        self.fields.push(FieldDescriptor {
            ident,
            annotation: Some(annotation),
            binding: Some(Binding {
                shape: F::shape(),
                parse: annotation::parse::<F>,
                extract: F::extract_entries,
                read: Box::new(move |target| get(target).to_value()),
                assign: None,
                descend: None,
            }),
        });
        self
    }

    /// Register a field without annotation. It never contributes an entry
    /// and never receives a value.
    pub fn skip(&mut self, ident: &'static str) -> &mut Self {
        self.fields.push(FieldDescriptor {
            ident,
            annotation: None,
            binding: None,
        });
        self
    }
}

/// Build the descriptor table of `T`. The table is rebuilt on every call.
pub fn describe_fields<T: Schema>() -> Vec<FieldDescriptor<T>> {
    let mut builder = SchemaBuilder { fields: Vec::new() };
    T::describe(&mut builder);
    builder.fields
}

/// Implement [`Schema`] for a structure by listing its fields.
///
/// Each entry is one of:
///
/// - `field => "annotation"`: a bound field
/// - `#[readonly] field => "annotation"`: an annotated field without write access
/// - `field`: a skipped field
#[macro_export]
macro_rules! schema {
    ($ty:ident { $($body:tt)* }) => {
        impl $crate::Schema for $ty {
            fn describe(fields: &mut $crate::SchemaBuilder<Self>) {
                $crate::__schema_fields!(fields; $($body)*);
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_fields {
    ($b:ident;) => {};
    ($b:ident; #[readonly] $field:ident => $ann:expr $(, $($rest:tt)*)?) => {
        $b.readonly(stringify!($field), $ann, |s: &Self| &s.$field);
        $crate::__schema_fields!($b; $($($rest)*)?);
    };
    ($b:ident; $field:ident => $ann:expr $(, $($rest:tt)*)?) => {
        $b.field(
            stringify!($field),
            $ann,
            |s: &Self| &s.$field,
            |s: &mut Self| &mut s.$field,
        );
        $crate::__schema_fields!($b; $($($rest)*)?);
    };
    ($b:ident; $field:ident $(, $($rest:tt)*)?) => {
        $b.skip(stringify!($field));
        $crate::__schema_fields!($b; $($($rest)*)?);
    };
}
