//! Applying provider values onto a live structure.

use tracing::debug;

use crate::cast::Bind;
use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::normalize::normalize;
use crate::provider::Provider;
use crate::schema::{Schema, describe_fields};
use crate::shape::Class;

/// Assign every value the provider has set to the matching annotated field of
/// `target`. Fields the provider has not set keep their current value.
///
/// Not transactional: when a field fails, earlier siblings are already
/// written.
pub fn apply<T: Bind>(provider: &dyn Provider, target: &mut T) -> Result<(), BindError> {
    target.apply_from(provider, "")
}

/// Report every required entry the provider has no value for.
pub fn ensure_required(provider: &dyn Provider, entries: &[ConfigEntry]) -> Result<(), BindError> {
    let missing: Vec<String> = entries
        .iter()
        .filter(|e| e.required && !provider.is_set(&e.name))
        .map(|e| e.name.clone())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BindError::MissingRequiredEntries(missing))
    }
}

pub(crate) fn apply_fields<T: Schema>(
    target: &mut T,
    provider: &dyn Provider,
    parent: &str,
) -> Result<(), BindError> {
    for field in describe_fields::<T>() {
        let Some((text, binding)) = field.bound() else {
            continue;
        };
        let (ann, class) = binding.describe(field.ident(), text, parent)?;
        let unassignable = || {
            BindError::UnassignableField {
                field: field.ident().to_string(),
                key: ann.name.clone(),
            }
            .within(&ann.key)
        };

        if class == Class::Composite {
            let descend = binding.descend.as_ref().ok_or_else(unassignable)?;
            descend(target, provider, &ann.name).map_err(|e| e.within(&ann.key))?;
            continue;
        }

        if !provider.is_set(&ann.name) {
            debug!(name = %ann.name, "not provided, field left as is");
            continue;
        }
        let Some(raw) = provider.get(&ann.name) else {
            continue;
        };
        let assign = binding.assign.as_ref().ok_or_else(unassignable)?;
        let raw = normalize(raw, &binding.shape).map_err(|e| e.within(&ann.key))?;
        debug!(name = %ann.name, field = field.ident(), value = %raw, "applying value");
        assign(target, &raw).map_err(|e| e.within(&ann.key))?;
    }
    Ok(())
}
