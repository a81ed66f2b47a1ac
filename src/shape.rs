//! Static shape of a bindable type and its primitive/composite classification.

use std::fmt;

use crate::error::BindError;

/// The kind of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Text,
    Path,
    Duration,
}

/// What a field's type looks like, as far as binding is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar(ScalarKind),
    /// Ordered list of the inner shape.
    List(Box<Shape>),
    /// A type implementing [`Schema`](crate::Schema). Carries the type name.
    Struct(&'static str),
    /// `Option<T>`, transparent for classification.
    Optional(Box<Shape>),
    /// Maps and anything else the engine cannot bind. Carries the type name.
    Unsupported(&'static str),
}

/// How a field takes part in extraction and application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Bound atomically as one entry: scalars and all lists.
    Primitive,
    /// Recursed into: nested structures.
    Composite,
}

/// Classify a shape.
///
/// Lists are primitive even when their elements are structures: a list of
/// structures is replaced as a whole, never merged field by field.
pub fn classify(shape: &Shape) -> Result<Class, BindError> {
    match shape {
        Shape::Scalar(_) => Ok(Class::Primitive),
        Shape::List(inner) => classify(inner).map(|_| Class::Primitive),
        Shape::Struct(_) => Ok(Class::Composite),
        Shape::Optional(inner) => classify(inner),
        Shape::Unsupported(name) => Err(BindError::UnsupportedType {
            type_name: (*name).to_string(),
        }),
    }
}

impl Shape {
    /// Strip any number of `Optional` wrappers.
    pub fn inner(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner.inner(),
            other => other,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.inner(), Shape::List(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.inner(), Shape::Scalar(ScalarKind::Bool))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(kind) => {
                let name = match kind {
                    ScalarKind::Bool => "bool",
                    ScalarKind::Int => "int",
                    ScalarKind::Float => "float",
                    ScalarKind::Text => "string",
                    ScalarKind::Path => "path",
                    ScalarKind::Duration => "duration",
                };
                f.write_str(name)
            }
            Shape::List(inner) => write!(f, "list of {inner}"),
            Shape::Struct(name) => write!(f, "structure {name}"),
            Shape::Optional(inner) => write!(f, "optional {inner}"),
            Shape::Unsupported(name) => write!(f, "unsupported {name}"),
        }
    }
}
