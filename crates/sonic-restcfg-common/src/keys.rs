//! Keyed-collection model.
//!
//! List-typed config fields declare an identity key: one or more field names
//! whose values distinguish "the same entity" across desired and observed
//! configuration. Lists without a declared key (scalar value lists) use the
//! element itself as its key. All non-key fields are attributes subject to
//! diffing.

use std::collections::HashMap;

use crate::error::{RestCfgError, RestCfgResult};
use crate::node::{ConfigNode, Scalar};

/// Conventional field name under which the identity key of top-level list
/// entities is registered (the root of a feature's config is not itself a
/// named field).
pub const ROOT_FIELD: &str = "config";

/// Identity-key declaration for one list field.
#[derive(Debug, Clone, Copy)]
pub struct KeySpec {
    /// The list field this spec applies to ([`ROOT_FIELD`] for a list root).
    pub field: &'static str,
    /// The fields forming the identity key of each element.
    pub key_fields: &'static [&'static str],
}

/// Looks up the declared identity key for a list field.
///
/// `None` means the field has no declared key and elements are identified
/// by their whole value.
pub fn key_fields_for<'a>(specs: &'a [KeySpec], field: &str) -> Option<&'a [&'static str]> {
    specs
        .iter()
        .find(|spec| spec.field == field)
        .map(|spec| spec.key_fields)
}

/// The identity of one list element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// Tuple of declared key-field values.
    Tuple(Vec<Scalar>),
    /// The whole element, for lists without a declared key.
    Whole(ConfigNode),
}

/// Extracts the identity key of a list element.
///
/// Every declared key field must be present and scalar; a missing field is
/// a caller/schema bug and fails with [`RestCfgError::MissingKeyField`].
pub fn entity_key(
    element: &ConfigNode,
    list: &str,
    key_fields: Option<&[&'static str]>,
) -> RestCfgResult<EntityKey> {
    let fields = match key_fields {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Ok(EntityKey::Whole(element.clone())),
    };

    let mut tuple = Vec::with_capacity(fields.len());
    for field in fields {
        match element.get(field) {
            Some(ConfigNode::Scalar(value)) => tuple.push(value.clone()),
            Some(_) => {
                return Err(RestCfgError::invalid_config(
                    *field,
                    format!("identity key field of list '{}' must be scalar", list),
                ))
            }
            None => return Err(RestCfgError::missing_key_field(list, *field)),
        }
    }
    Ok(EntityKey::Tuple(tuple))
}

/// Builds a key-indexed view of a list's elements.
///
/// Duplicate keys are merged: object elements have their fields
/// shallow-merged (later occurrences win per field), other elements are
/// replaced outright.
pub fn index_by_key(
    elements: &[ConfigNode],
    list: &str,
    key_fields: Option<&[&'static str]>,
) -> RestCfgResult<HashMap<EntityKey, ConfigNode>> {
    let mut index: HashMap<EntityKey, ConfigNode> = HashMap::with_capacity(elements.len());
    for element in elements {
        let key = entity_key(element, list, key_fields)?;
        match (index.get_mut(&key), element) {
            (Some(ConfigNode::Object(existing)), ConfigNode::Object(update)) => {
                for (field, value) in update {
                    existing.insert(field.clone(), value.clone());
                }
            }
            (Some(existing), _) => *existing = element.clone(),
            (None, _) => {
                index.insert(key, element.clone());
            }
        }
    }
    Ok(index)
}
