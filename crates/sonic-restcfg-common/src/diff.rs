//! Tree diff engine.
//!
//! `diff(source, reference, specs)` answers "what in `source` is absent from
//! or different than `reference`":
//!
//! - scalar fields are included iff the value differs (or the field is
//!   missing from `reference`);
//! - non-keyed object fields recurse and are included iff the recursive
//!   diff is non-empty;
//! - keyed list fields match elements by identity key: an element with no
//!   counterpart is included whole, a matched element is included with only
//!   its differing attributes plus its key fields, and only when some
//!   attribute differs.
//!
//! The result preserves `source` list order and never contains elements
//! absent from `source`. Run in both directions it partitions the
//! attribute-level differences between two trees: `diff(want, have)` is
//! what must be added or changed, `diff(have, want)` is what exists only on
//! the device.

use crate::error::RestCfgResult;
use crate::keys::{entity_key, index_by_key, key_fields_for, KeySpec, ROOT_FIELD};
use crate::node::{ConfigNode, Fields};

/// Computes the structural difference of `source` against `reference`.
///
/// List roots use the key spec registered under [`ROOT_FIELD`].
pub fn diff(
    source: &ConfigNode,
    reference: &ConfigNode,
    specs: &[KeySpec],
) -> RestCfgResult<ConfigNode> {
    match (source, reference) {
        (ConfigNode::Object(src), ConfigNode::Object(refr)) => {
            Ok(ConfigNode::Object(diff_objects(src, refr, specs)?))
        }
        (ConfigNode::List(src), ConfigNode::List(refr)) => {
            Ok(ConfigNode::List(diff_list(ROOT_FIELD, src, refr, specs)?))
        }
        _ if source == reference => Ok(empty_like(source)),
        _ => Ok(source.clone()),
    }
}

fn empty_like(node: &ConfigNode) -> ConfigNode {
    match node {
        ConfigNode::List(_) => ConfigNode::list(),
        _ => ConfigNode::object(),
    }
}

fn diff_objects(source: &Fields, reference: &Fields, specs: &[KeySpec]) -> RestCfgResult<Fields> {
    let mut result = Fields::new();
    for (field, value) in source {
        let matched = match reference.get(field) {
            Some(matched) => matched,
            None => {
                result.insert(field.clone(), value.clone());
                continue;
            }
        };
        match (value, matched) {
            (ConfigNode::Scalar(_), _) => {
                if value != matched {
                    result.insert(field.clone(), value.clone());
                }
            }
            (ConfigNode::Object(src), ConfigNode::Object(refr)) => {
                let nested = diff_objects(src, refr, specs)?;
                if !nested.is_empty() {
                    result.insert(field.clone(), ConfigNode::Object(nested));
                }
            }
            (ConfigNode::List(src), ConfigNode::List(refr)) => {
                let nested = diff_list(field, src, refr, specs)?;
                if !nested.is_empty() {
                    result.insert(field.clone(), ConfigNode::List(nested));
                }
            }
            // Shape mismatch against the reference: the whole source value
            // is the difference.
            _ => {
                result.insert(field.clone(), value.clone());
            }
        }
    }
    Ok(result)
}

fn diff_list(
    field: &str,
    source: &[ConfigNode],
    reference: &[ConfigNode],
    specs: &[KeySpec],
) -> RestCfgResult<Vec<ConfigNode>> {
    let key_fields = key_fields_for(specs, field);
    let ref_index = index_by_key(reference, field, key_fields)?;

    let mut result = Vec::new();
    for element in source {
        let key = entity_key(element, field, key_fields)?;
        let matched = match ref_index.get(&key) {
            Some(matched) => matched,
            None => {
                // Whole-entity difference.
                result.push(element.clone());
                continue;
            }
        };
        let (fields, src, refr) = match (key_fields, element, matched) {
            (Some(fields), ConfigNode::Object(src), ConfigNode::Object(refr)) => {
                (fields, src, refr)
            }
            // Whole-element keys match iff the elements are equal.
            _ => continue,
        };
        // Key fields are equal by construction, so they never appear in the
        // attribute diff; they are re-added so the result stays identifiable.
        let mut attrs = diff_objects(src, refr, specs)?;
        if attrs.is_empty() {
            continue;
        }
        for key_field in fields {
            if let Some(value) = src.get(*key_field) {
                attrs.insert((*key_field).to_string(), value.clone());
            }
        }
        result.push(ConfigNode::Object(attrs));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(raw: serde_json::Value) -> ConfigNode {
        ConfigNode::from_json(&raw).unwrap().unwrap()
    }

    const SPECS: &[KeySpec] = &[
        KeySpec {
            field: ROOT_FIELD,
            key_fields: &["area_id", "vrf_name"],
        },
        KeySpec {
            field: "ranges",
            key_fields: &["prefix"],
        },
        KeySpec {
            field: "virtual_links",
            key_fields: &["router_id"],
        },
    ];

    #[test]
    fn test_scalar_fields() {
        let want = node(json!({"agent": "Ethernet0", "enabled": true, "sampling_rate": 4000}));
        let have = node(json!({"agent": "Ethernet4", "enabled": true}));
        let result = diff(&want, &have, &[]).unwrap();
        assert_eq!(
            result,
            node(json!({"agent": "Ethernet0", "sampling_rate": 4000}))
        );
    }

    #[test]
    fn test_nested_object_included_only_when_nonempty() {
        let want = node(json!({"stub": {"enabled": true, "no_summary": false}}));
        let have = node(json!({"stub": {"enabled": true, "no_summary": false}}));
        assert_eq!(diff(&want, &have, &[]).unwrap(), ConfigNode::object());

        let have = node(json!({"stub": {"enabled": true}}));
        assert_eq!(
            diff(&want, &have, &[]).unwrap(),
            node(json!({"stub": {"no_summary": false}}))
        );
    }

    #[test]
    fn test_keyed_list_whole_entity_and_attributes() {
        let want = node(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
            {"area_id": "0.0.0.2", "vrf_name": "default", "shortcut": "enable"},
        ]));
        let have = node(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 20},
        ]));
        let result = diff(&want, &have, SPECS).unwrap();
        // Changed attribute keeps its identity key; unseen entity comes whole.
        assert_eq!(
            result,
            node(json!([
                {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
                {"area_id": "0.0.0.2", "vrf_name": "default", "shortcut": "enable"},
            ]))
        );
    }

    #[test]
    fn test_keyed_list_equal_entities_excluded() {
        let want = node(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let result = diff(&want, &want, SPECS).unwrap();
        assert_eq!(result, ConfigNode::list());
    }

    #[test]
    fn test_scalar_list_membership() {
        let want = node(json!({"networks": ["10.1.0.0/24", "10.2.0.0/24"]}));
        let have = node(json!({"networks": ["10.2.0.0/24"]}));
        assert_eq!(
            diff(&want, &have, SPECS).unwrap(),
            node(json!({"networks": ["10.1.0.0/24"]}))
        );
        assert_eq!(diff(&have, &want, SPECS).unwrap(), ConfigNode::object());
    }

    #[test]
    fn test_nested_keyed_lists() {
        let want = node(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [
                {"router_id": "1.1.1.1", "dead_interval": 40},
                {"router_id": "2.2.2.2", "hello_interval": 10},
            ],
        }]));
        let have = node(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [
                {"router_id": "1.1.1.1", "dead_interval": 60},
                {"router_id": "2.2.2.2", "hello_interval": 10},
            ],
        }]));
        let result = diff(&want, &have, SPECS).unwrap();
        assert_eq!(
            result,
            node(json!([{
                "area_id": "0.0.0.1",
                "vrf_name": "default",
                "virtual_links": [{"router_id": "1.1.1.1", "dead_interval": 40}],
            }]))
        );
    }

    #[test]
    fn test_matching_subset_recovery() {
        // diff(want, diff(want, have)) recovers the part of want already
        // satisfied by have: the selection rule the deleted state relies on.
        let want = node(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
            {"area_id": "0.0.0.2", "vrf_name": "default", "default_cost": 20},
        ]));
        let have = node(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let not_matching = diff(&want, &have, SPECS).unwrap();
        let matching = diff(&want, &not_matching, SPECS).unwrap();
        assert_eq!(
            matching,
            node(json!([
                {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
            ]))
        );
    }

    #[test]
    fn test_diff_symmetry() {
        let want = node(json!({"agent": "Ethernet0", "enabled": true}));
        let have = node(json!({"agent": "Ethernet4", "enabled": true}));
        let add = diff(&want, &have, &[]).unwrap();
        let remove = diff(&have, &want, &[]).unwrap();
        // A differing attribute shows up in both directions with the
        // respective side's value; an equal one in neither.
        assert_eq!(add, node(json!({"agent": "Ethernet0"})));
        assert_eq!(remove, node(json!({"agent": "Ethernet4"})));
    }
}
