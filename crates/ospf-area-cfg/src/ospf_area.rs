//! OSPFv2 area reconciliation module.
//!
//! Areas are keyed by `(area_id, vrf_name)`; ranges, virtual links, and
//! message digest keys are nested keyed lists of their own. `merged` and
//! `deleted` work on attribute-level diffs; `replaced` and `overridden`
//! are entity-granular and recreate a differing area from scratch.

use serde_json::Value as Json;
use tracing::{debug, instrument};

use sonic_restcfg_common::{
    diff, plan_overridden, plan_replaced, update_states, Command, ConfigModule, ConfigNode,
    KeySpec, Request, RestCfgResult, State, ROOT_FIELD,
};

use crate::normalize::validate_normalize_config;
use crate::paths::fields;
use crate::requests::{build_areas_delete_requests, build_areas_merge_requests, same_area};

/// Identity keys of the area schema's keyed lists. Networks carry no
/// entry: a prefix is its own key.
pub const OSPF_AREA_KEY_SPECS: &[KeySpec] = &[
    KeySpec {
        field: ROOT_FIELD,
        key_fields: &[fields::AREA_ID, fields::VRF_NAME],
    },
    KeySpec {
        field: fields::RANGES,
        key_fields: &[fields::PREFIX],
    },
    KeySpec {
        field: fields::VIRTUAL_LINKS,
        key_fields: &[fields::ROUTER_ID],
    },
    KeySpec {
        field: fields::MESSAGE_DIGEST_KEYS,
        key_fields: &[fields::KEY_ID],
    },
];

/// The OSPF area configuration module.
pub struct OspfAreaModule;

impl OspfAreaModule {
    /// Creates the module.
    pub fn new() -> Self {
        Self
    }

    fn state_merged(
        &self,
        want: &[ConfigNode],
        have: &[ConfigNode],
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        if want.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let to_add = diff_areas(want, have)?;
        let to_add = post_process_diff(want, to_add, true);
        let requests = build_areas_merge_requests(&to_add)?;
        if to_add.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((update_states(to_add, State::Merged), requests))
    }

    fn state_deleted(
        &self,
        want: &[ConfigNode],
        have: &[ConfigNode],
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        if have.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        if want.is_empty() {
            let requests = build_areas_delete_requests(have, have, true)?;
            if requests.is_empty() {
                return Ok((Vec::new(), Vec::new()));
            }
            return Ok((update_states(have.to_vec(), State::Deleted), requests));
        }

        // The deletable subset of want is whatever matches the device:
        // strip the differing part off, what remains is present-and-equal.
        let differing = diff_areas(want, have)?;
        let differing = post_process_diff(want, differing, false);
        let matching = diff_areas(want, &differing)?;
        let requests = build_areas_delete_requests(&matching, have, false)?;
        if matching.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((update_states(matching, State::Deleted), requests))
    }

    fn state_replaced(
        &self,
        want: &[ConfigNode],
        have: &[ConfigNode],
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        if want.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        let plan = plan_replaced(want, have, OSPF_AREA_KEY_SPECS)?;
        self.apply_entity_plan(plan.to_delete, plan.to_add, have, State::Replaced)
    }

    fn state_overridden(
        &self,
        want: &[ConfigNode],
        have: &[ConfigNode],
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        let plan = plan_overridden(want, have, OSPF_AREA_KEY_SPECS)?;
        self.apply_entity_plan(plan.to_delete, plan.to_add, have, State::Overridden)
    }

    /// Turns an entity plan into requests: whole-area deletes first, then
    /// the merge PATCHes recreating or extending areas.
    fn apply_entity_plan(
        &self,
        to_delete: Vec<ConfigNode>,
        to_add: Vec<ConfigNode>,
        have: &[ConfigNode],
        add_state: State,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        let mut commands = Vec::new();
        let mut requests = Vec::new();
        if !to_delete.is_empty() {
            requests.extend(build_areas_delete_requests(&to_delete, have, true)?);
            commands.extend(update_states(to_delete, State::Deleted));
        }
        if !to_add.is_empty() {
            requests.extend(build_areas_merge_requests(&to_add)?);
            commands.extend(update_states(to_add, add_state));
        }
        if commands.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((commands, requests))
    }
}

impl Default for OspfAreaModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for OspfAreaModule {
    fn resource_name(&self) -> &str {
        "ospf_area"
    }

    #[instrument(skip(self, desired, have), fields(state = state.as_str()))]
    fn reconcile(
        &self,
        desired: &Json,
        state: State,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        let have_areas: Vec<ConfigNode> =
            have.as_list().map(<[ConfigNode]>::to_vec).unwrap_or_default();
        let want = validate_normalize_config(desired, &have_areas, state)?;
        debug!(areas = want.len(), "normalized desired config");
        match state {
            State::Merged => self.state_merged(&want, &have_areas),
            State::Deleted => self.state_deleted(&want, &have_areas),
            State::Overridden => self.state_overridden(&want, &have_areas),
            State::Replaced => self.state_replaced(&want, &have_areas),
        }
    }
}

fn diff_areas(source: &[ConfigNode], reference: &[ConfigNode]) -> RestCfgResult<Vec<ConfigNode>> {
    let result = diff(
        &ConfigNode::List(source.to_vec()),
        &ConfigNode::List(reference.to_vec()),
        OSPF_AREA_KEY_SPECS,
    )?;
    Ok(match result {
        ConfigNode::List(items) => items,
        _ => Vec::new(),
    })
}

/// Post-processes an area diff against the input that produced it.
///
/// In merged mode an area that names nothing but its identity keys is
/// dropped: there is nothing to merge, and such phantom areas do not show
/// up in facts. Authentication key material is repaired so `key` and
/// `key_encrypted` always travel together.
fn post_process_diff(
    want: &[ConfigNode],
    mut diff_areas: Vec<ConfigNode>,
    merged_mode: bool,
) -> Vec<ConfigNode> {
    let mut result = Vec::new();
    for area_w in want {
        if merged_mode && area_w.len() == 2 {
            continue;
        }
        let position = diff_areas.iter().position(|area| same_area(area, area_w));
        let mut area_d = match position {
            Some(position) => diff_areas.remove(position),
            None => continue,
        };
        repair_area_key_pairs(&mut area_d, area_w);
        result.push(area_d);
    }
    result
}

fn repair_area_key_pairs(area_d: &mut ConfigNode, area_w: &ConfigNode) {
    let want_vlinks = match area_w.get_list(fields::VIRTUAL_LINKS) {
        Some(list) => list,
        None => return,
    };
    let entry = match area_d.as_object_mut() {
        Some(entry) => entry,
        None => return,
    };
    let diff_vlinks = match entry.get_mut(fields::VIRTUAL_LINKS) {
        Some(ConfigNode::List(items)) => items,
        _ => return,
    };
    for vlink_d in diff_vlinks {
        let vlink_w = match want_vlinks
            .iter()
            .find(|vlink| vlink.get(fields::ROUTER_ID) == vlink_d.get(fields::ROUTER_ID))
        {
            Some(vlink) => vlink,
            None => continue,
        };
        if let Some(want_auth) = vlink_w.get(fields::AUTHENTICATION) {
            let want_auth = want_auth.clone();
            if let Some(vlink_entry) = vlink_d.as_object_mut() {
                if let Some(diff_auth) = vlink_entry.get_mut(fields::AUTHENTICATION) {
                    repair_key_pair(diff_auth, &want_auth);
                }
            }
        }
        let want_md_keys = match vlink_w.get_list(fields::MESSAGE_DIGEST_KEYS) {
            Some(list) => list,
            None => continue,
        };
        if let Some(vlink_entry) = vlink_d.as_object_mut() {
            if let Some(ConfigNode::List(diff_md_keys)) =
                vlink_entry.get_mut(fields::MESSAGE_DIGEST_KEYS)
            {
                for md_key_d in diff_md_keys {
                    if let Some(md_key_w) = want_md_keys
                        .iter()
                        .find(|md_key| md_key.get(fields::KEY_ID) == md_key_d.get(fields::KEY_ID))
                    {
                        repair_key_pair(md_key_d, md_key_w);
                    }
                }
            }
        }
    }
}

/// Restores the `key`/`key_encrypted` pair when the diff split it.
fn repair_key_pair(diff_node: &mut ConfigNode, want_node: &ConfigNode) {
    let has_key = diff_node.contains(fields::KEY);
    let has_encrypted = diff_node.contains(fields::KEY_ENCRYPTED);
    if has_key && !has_encrypted {
        if let Some(value) = want_node.get(fields::KEY_ENCRYPTED) {
            let value = value.clone();
            if let Some(entry) = diff_node.as_object_mut() {
                entry.insert(fields::KEY_ENCRYPTED.to_string(), value);
            }
        }
    }
    if !has_key && has_encrypted {
        if let Some(value) = want_node.get(fields::KEY) {
            let value = value.clone();
            if let Some(entry) = diff_node.as_object_mut() {
                entry.insert(fields::KEY.to_string(), value);
            }
        }
    }
}
