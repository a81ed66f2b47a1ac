//! Schema extraction: the flat, hierarchically named entry list of a
//! structure.

use std::collections::HashSet;

use tracing::debug;

use crate::cast::Bind;
use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::schema::{Schema, describe_fields};
use crate::shape::Class;

/// Extract the entries of `T` in declaration order.
///
/// Composite fields contribute their children's entries under their own name,
/// primitive fields one entry each, unannotated fields nothing. Entry names
/// must be unique.
pub fn extract<T: Bind>() -> Result<Vec<ConfigEntry>, BindError> {
    let entries = T::extract_entries("")?;

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.name.as_str()) {
            return Err(BindError::DuplicateEntry {
                name: entry.name.clone(),
            });
        }
        debug!(name = %entry.name, required = entry.required, "extracted config entry");
    }
    Ok(entries)
}

pub(crate) fn extract_fields<T: Schema>(parent: &str) -> Result<Vec<ConfigEntry>, BindError> {
    let mut entries = Vec::new();

    for field in describe_fields::<T>() {
        let Some((text, binding)) = field.bound() else {
            debug!(parent, field = field.ident(), "no annotation, field skipped");
            continue;
        };
        let (ann, class) = binding.describe(field.ident(), text, parent)?;

        match class {
            Class::Composite => {
                let nested = (binding.extract)(&ann.name).map_err(|e| e.within(&ann.key))?;
                entries.extend(nested);
            }
            Class::Primitive => entries.push(ConfigEntry::new(ann, binding.shape.clone())),
        }
    }
    Ok(entries)
}
