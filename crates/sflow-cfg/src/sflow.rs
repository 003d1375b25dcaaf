//! sFlow reconciliation module.
//!
//! Flat single-object feature: global scalars plus two keyed lists
//! (collectors, sampled interfaces). Merges go through one PATCH on the
//! sflow root, deletes are per-field or per-element against the leaf
//! endpoints.

use serde_json::{json, Map, Value as Json};
use tracing::{debug, instrument};

use sonic_restcfg_common::{
    diff, entity_key, index_by_key, key_fields_for, update_states, Command, ConfigModule,
    ConfigNode, EntityKey, Fields, KeySpec, Request, RestCfgError, RestCfgResult, State,
};

use crate::normalize::validate_normalize_config;
use crate::paths::{
    collector_uri, config_field_uri, fields, interface_uri, wire, SFLOW_DATA_KEY,
    SFLOW_ENABLED_DATA_KEY, SFLOW_URI,
};

/// Identity keys of the sFlow list fields.
pub const SFLOW_KEY_SPECS: &[KeySpec] = &[
    KeySpec {
        field: fields::COLLECTORS,
        key_fields: &[fields::ADDRESS, fields::NETWORK_INSTANCE, fields::PORT],
    },
    KeySpec {
        field: fields::INTERFACES,
        key_fields: &[fields::NAME],
    },
];

/// All top-level fields of the sFlow schema.
const TOP_LEVEL_FIELDS: &[&str] = &[
    fields::ENABLED,
    fields::POLLING_INTERVAL,
    fields::AGENT,
    fields::SAMPLING_RATE,
    fields::COLLECTORS,
    fields::INTERFACES,
];

/// Scalar fields deletable via their own config leaf, with wire names.
const SCALAR_DELETE_FIELDS: &[(&str, &str)] = &[
    (fields::POLLING_INTERVAL, wire::POLLING_INTERVAL),
    (fields::AGENT, fields::AGENT),
    (fields::SAMPLING_RATE, wire::SAMPLING_RATE),
];

/// The sFlow configuration module.
pub struct SflowModule;

impl SflowModule {
    /// Creates the module.
    pub fn new() -> Self {
        Self
    }

    fn state_merged(
        &self,
        want: &ConfigNode,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        if want.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let to_add = diff(want, have, SFLOW_KEY_SPECS)?;
        let requests = self.build_root_patch(&to_add)?;
        if to_add.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((update_states(vec![to_add], State::Merged), requests))
    }

    fn state_deleted(
        &self,
        want: &ConfigNode,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        // Empty desired config means clear everything currently configured.
        let want = if want.is_empty() {
            have.clone()
        } else {
            want.clone()
        };

        let mut commands = Fields::new();
        let mut requests = Vec::new();

        // enabled defaults to false and has no DELETE; reset it via PUT,
        // and only when both sides agree it is set.
        if want.get_bool(fields::ENABLED) == Some(true)
            && have.get_bool(fields::ENABLED) == Some(true)
        {
            commands.insert(fields::ENABLED.to_string(), true.into());
            requests.push(Request::put(
                config_field_uri(fields::ENABLED),
                json!({ SFLOW_ENABLED_DATA_KEY: false }),
            ));
        }

        // Scalars are deleted only when specified and matching current state.
        for (field, wire_field) in SCALAR_DELETE_FIELDS {
            if let (Some(wanted), Some(current)) = (want.get(field), have.get(field)) {
                if wanted == current {
                    commands.insert((*field).to_string(), current.clone());
                    requests.push(Request::delete(config_field_uri(wire_field)));
                }
            }
        }

        if let (Some(want_list), Some(have_list)) = (
            want.get_list(fields::COLLECTORS),
            have.get_list(fields::COLLECTORS),
        ) {
            let deleted = delete_list_elements(
                fields::COLLECTORS,
                want_list,
                have_list,
                &mut requests,
                |key| {
                    if let EntityKey::Tuple(parts) = key {
                        if let [address, network_instance, port] = parts.as_slice() {
                            return Some(collector_uri(address, port, network_instance));
                        }
                    }
                    None
                },
            )?;
            if !deleted.is_empty() {
                commands.insert(fields::COLLECTORS.to_string(), ConfigNode::List(deleted));
            }
        }

        if let (Some(want_list), Some(have_list)) = (
            want.get_list(fields::INTERFACES),
            have.get_list(fields::INTERFACES),
        ) {
            let deleted = delete_list_elements(
                fields::INTERFACES,
                want_list,
                have_list,
                &mut requests,
                |key| {
                    if let EntityKey::Tuple(parts) = key {
                        if let [name] = parts.as_slice() {
                            return Some(interface_uri(&name.to_string()));
                        }
                    }
                    None
                },
            )?;
            if !deleted.is_empty() {
                commands.insert(fields::INTERFACES.to_string(), ConfigNode::List(deleted));
            }
        }

        if commands.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((
            update_states(vec![ConfigNode::Object(commands)], State::Deleted),
            requests,
        ))
    }

    fn state_overridden(
        &self,
        want: &ConfigNode,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        let mut want = want.clone();
        fill_defaults(&mut want);

        let remove_diff = diff(have, &want, SFLOW_KEY_SPECS)?;
        let introduced = diff(&want, have, SFLOW_KEY_SPECS)?;
        let remove_diff = find_substitution_deletes(&remove_diff, &introduced);
        let introduced = rehydrate_interfaces(introduced, &want)?;

        let (mut commands, mut requests) = if remove_diff.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            self.state_deleted(&remove_diff, have)?
        };

        // The merge side is built from the rehydrated diff directly:
        // re-diffing against `have` would strip the attributes restored
        // for group-deleted interfaces.
        let merge_requests = self.build_root_patch(&introduced)?;
        if !introduced.is_empty() && !merge_requests.is_empty() {
            let merge_state = if commands.is_empty() {
                State::Merged
            } else {
                State::Overridden
            };
            commands.extend(update_states(vec![introduced], merge_state));
            requests.extend(merge_requests);
        }

        if commands.is_empty() || requests.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }
        Ok((commands, requests))
    }

    fn state_replaced(
        &self,
        want: &ConfigNode,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        if want.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        // Replaced must not clear sections the input never mentioned, and
        // overridden leaves matching settings alone. Backfilling the
        // unspecified sections from current state gets exactly that.
        let mut filled = want.clone();
        let filled_fields = filled
            .as_object_mut()
            .ok_or_else(|| RestCfgError::internal("normalized config is not an object"))?;
        for field in TOP_LEVEL_FIELDS {
            if !filled_fields.contains_key(*field) {
                if let Some(current) = have.get(field) {
                    filled_fields.insert((*field).to_string(), current.clone());
                }
            }
        }

        let (commands, requests) = self.state_overridden(&filled, have)?;
        let commands = commands
            .into_iter()
            .map(|mut command| {
                if command.state == State::Overridden {
                    command.state = State::Replaced;
                }
                command
            })
            .collect();
        Ok((commands, requests))
    }

    /// Builds the single PATCH against the sflow root covering all global
    /// settings, collectors, and interfaces in `config`.
    fn build_root_patch(&self, config: &ConfigNode) -> RestCfgResult<Vec<Request>> {
        if config.is_empty() {
            return Ok(Vec::new());
        }

        let mut body = Map::new();
        let config_body = global_config_body(config);
        let mut has_data = !config_body.is_empty();
        // The endpoint requires the config container even when empty.
        body.insert("config".to_string(), Json::Object(config_body));

        if let Some(collectors) = config.get_list(fields::COLLECTORS) {
            let collector_body = collectors_body(collectors)?;
            if !collector_body.is_empty() {
                body.insert(
                    "collectors".to_string(),
                    json!({ "collector": collector_body }),
                );
                has_data = true;
            }
        }

        if let Some(interfaces) = config.get_list(fields::INTERFACES) {
            let interface_body = interfaces_body(interfaces)?;
            if !interface_body.is_empty() {
                body.insert(
                    "interfaces".to_string(),
                    json!({ "interface": interface_body }),
                );
                has_data = true;
            }
        }

        if !has_data {
            return Ok(Vec::new());
        }
        Ok(vec![Request::patch(
            SFLOW_URI,
            json!({ SFLOW_DATA_KEY: Json::Object(body) }),
        )])
    }
}

impl Default for SflowModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for SflowModule {
    fn resource_name(&self) -> &str {
        "sflow"
    }

    #[instrument(skip(self, desired, have), fields(state = state.as_str()))]
    fn reconcile(
        &self,
        desired: &Json,
        state: State,
        have: &ConfigNode,
    ) -> RestCfgResult<(Vec<Command>, Vec<Request>)> {
        let want = validate_normalize_config(desired)?;
        debug!(fields = want.len(), "normalized desired config");
        match state {
            State::Merged => self.state_merged(&want, have),
            State::Deleted => self.state_deleted(&want, have),
            State::Overridden => self.state_overridden(&want, have),
            State::Replaced => self.state_replaced(&want, have),
        }
    }
}

/// Deletes the listed elements that match current state, one request per
/// element; an empty `want` list covers all of `have`. Returns the deleted
/// elements as recorded in `have`.
fn delete_list_elements(
    list: &str,
    want_list: &[ConfigNode],
    have_list: &[ConfigNode],
    requests: &mut Vec<Request>,
    element_uri: impl Fn(&EntityKey) -> Option<String>,
) -> RestCfgResult<Vec<ConfigNode>> {
    let to_delete = if want_list.is_empty() {
        have_list
    } else {
        want_list
    };
    let key_fields = key_fields_for(SFLOW_KEY_SPECS, list);
    let have_index = index_by_key(have_list, list, key_fields)?;

    let mut deleted = Vec::new();
    for element in to_delete {
        let key = entity_key(element, list, key_fields)?;
        let matched = match have_index.get(&key) {
            Some(matched) => matched,
            // Not on the device: nothing to do for this element.
            None => continue,
        };
        let uri = element_uri(&key)
            .ok_or_else(|| RestCfgError::internal(format!("malformed {} element key", list)))?;
        requests.push(Request::delete(uri));
        deleted.push(matched.clone());
    }
    Ok(deleted)
}

/// Fills schema defaults the device reports implicitly.
fn fill_defaults(want: &mut ConfigNode) {
    if let Some(fields_map) = want.as_object_mut() {
        fields_map
            .entry(fields::ENABLED.to_string())
            .or_insert_with(|| false.into());
    }
}

/// Keeps only the removals that are not substitutions.
///
/// A scalar field present in both diffs is getting a new value; the PATCH
/// overwrites it and a preceding delete would be redundant. List elements
/// are always kept: a "changed" element is a different entity to remove.
fn find_substitution_deletes(remove_diff: &ConfigNode, introduced: &ConfigNode) -> ConfigNode {
    let mut result = Fields::new();
    for field in [
        fields::AGENT,
        fields::ENABLED,
        fields::POLLING_INTERVAL,
        fields::SAMPLING_RATE,
    ] {
        if let Some(value) = remove_diff.get(field) {
            if !introduced.contains(field) {
                result.insert(field.to_string(), value.clone());
            }
        }
    }
    for field in [fields::COLLECTORS, fields::INTERFACES] {
        if let Some(value) = remove_diff.get(field) {
            result.insert(field.to_string(), value.clone());
        }
    }
    ConfigNode::Object(result)
}

/// Restores full interface entries in an additive diff.
///
/// Interface settings are cleared as a group when the interface element is
/// deleted, so any interface appearing in the diff must be re-created with
/// everything the desired config holds for it, not only the fields that
/// differed.
fn rehydrate_interfaces(introduced: ConfigNode, want: &ConfigNode) -> RestCfgResult<ConfigNode> {
    let mut introduced = introduced;
    let key_fields = key_fields_for(SFLOW_KEY_SPECS, fields::INTERFACES);
    let want_index = match want.get_list(fields::INTERFACES) {
        Some(want_list) => index_by_key(want_list, fields::INTERFACES, key_fields)?,
        None => return Ok(introduced),
    };

    if let Some(fields_map) = introduced.as_object_mut() {
        if let Some(ConfigNode::List(items)) = fields_map.get_mut(fields::INTERFACES) {
            for item in items {
                let key = entity_key(item, fields::INTERFACES, key_fields)?;
                let want_entry = match want_index.get(&key) {
                    Some(ConfigNode::Object(entry)) => entry.clone(),
                    _ => continue,
                };
                if let Some(entry) = item.as_object_mut() {
                    for (field, value) in want_entry {
                        entry.insert(field, value);
                    }
                }
            }
        }
    }
    Ok(introduced)
}

fn global_config_body(config: &ConfigNode) -> Map<String, Json> {
    let mut body = Map::new();
    if let Some(value) = config.get(fields::ENABLED) {
        body.insert(fields::ENABLED.to_string(), value.to_json());
    }
    if let Some(value) = config.get(fields::POLLING_INTERVAL) {
        body.insert(wire::POLLING_INTERVAL.to_string(), value.to_json());
    }
    if let Some(value) = config.get(fields::AGENT) {
        body.insert(fields::AGENT.to_string(), value.to_json());
    }
    if let Some(value) = config.get(fields::SAMPLING_RATE) {
        body.insert(wire::SAMPLING_RATE.to_string(), value.to_json());
    }
    body
}

fn collectors_body(collectors: &[ConfigNode]) -> RestCfgResult<Vec<Json>> {
    let mut body = Vec::with_capacity(collectors.len());
    for collector in collectors {
        let mut keys = Map::new();
        for (field, wire_field) in [
            (fields::ADDRESS, fields::ADDRESS),
            (fields::NETWORK_INSTANCE, wire::NETWORK_INSTANCE),
            (fields::PORT, fields::PORT),
        ] {
            let value = collector.get(field).ok_or_else(|| {
                RestCfgError::missing_key_field(fields::COLLECTORS, field)
            })?;
            keys.insert(wire_field.to_string(), value.to_json());
        }
        // The REST schema wants the key fields repeated inside a nested
        // config container.
        let mut entry = keys.clone();
        entry.insert("config".to_string(), Json::Object(keys));
        body.push(Json::Object(entry));
    }
    Ok(body)
}

fn interfaces_body(interfaces: &[ConfigNode]) -> RestCfgResult<Vec<Json>> {
    let mut body = Vec::new();
    for interface in interfaces {
        let mut config = Map::new();
        if let Some(value) = interface.get(fields::ENABLED) {
            config.insert(fields::ENABLED.to_string(), value.to_json());
        }
        if let Some(value) = interface.get(fields::SAMPLING_RATE) {
            config.insert(wire::SAMPLING_RATE.to_string(), value.to_json());
        }
        if config.is_empty() {
            // A bare name carries no configuration to create.
            continue;
        }
        let name = interface
            .get(fields::NAME)
            .ok_or_else(|| RestCfgError::missing_key_field(fields::INTERFACES, fields::NAME))?;
        config.insert(fields::NAME.to_string(), name.to_json());
        body.push(json!({ "name": name.to_json(), "config": Json::Object(config) }));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sonic_restcfg_common::Method;

    fn node(raw: Json) -> ConfigNode {
        ConfigNode::from_json(&raw).unwrap().unwrap()
    }

    fn reconcile(
        desired: Json,
        state: State,
        have: Json,
    ) -> (Vec<Command>, Vec<Request>) {
        SflowModule::new()
            .reconcile(&desired, state, &node(have))
            .unwrap()
    }

    #[test]
    fn test_merged_from_empty_builds_root_patch() {
        let (commands, requests) = reconcile(
            json!({
                "enabled": true,
                "agent": "Ethernet0",
                "collectors": [{"address": "10.0.0.1"}],
            }),
            State::Merged,
            json!({}),
        );

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].state, State::Merged);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Patch);
        assert_eq!(requests[0].path, SFLOW_URI);
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(
            body[SFLOW_DATA_KEY]["config"],
            json!({"enabled": true, "agent": "Ethernet0"})
        );
        assert_eq!(
            body[SFLOW_DATA_KEY]["collectors"]["collector"][0],
            json!({
                "address": "10.0.0.1",
                "network-instance": "default",
                "port": 6343,
                "config": {
                    "address": "10.0.0.1",
                    "network-instance": "default",
                    "port": 6343,
                },
            })
        );
    }

    #[test]
    fn test_merged_is_idempotent() {
        let current = json!({
            "enabled": true,
            "agent": "Ethernet0",
            "collectors": [
                {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
            ],
        });
        let (commands, requests) = reconcile(current.clone(), State::Merged, current);
        assert!(commands.is_empty());
        assert!(requests.is_empty());
    }

    #[test]
    fn test_merged_name_only_interface_is_noop() {
        let (commands, requests) = reconcile(
            json!({"interfaces": [{"name": "Ethernet8"}]}),
            State::Merged,
            json!({}),
        );
        assert!(commands.is_empty());
        assert!(requests.is_empty());
    }

    #[test]
    fn test_deleted_empty_want_clears_everything() {
        let (commands, requests) = reconcile(
            json!({}),
            State::Deleted,
            json!({
                "enabled": true,
                "polling_interval": 20,
                "collectors": [
                    {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
                ],
                "interfaces": [{"name": "Ethernet8", "enabled": true}],
            }),
        );

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].state, State::Deleted);
        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "data/openconfig-sampling-sflow:sampling/sflow/config/enabled",
                "data/openconfig-sampling-sflow:sampling/sflow/config/polling-interval",
                "data/openconfig-sampling-sflow:sampling/sflow/collectors/collector=10.0.0.1,6343,default",
                "data/openconfig-sampling-sflow:sampling/sflow/interfaces/interface=Ethernet8",
            ]
        );
        // enabled resets via PUT false, everything else is a DELETE.
        assert_eq!(requests[0].method, Method::Put);
        assert!(requests[1..].iter().all(|r| r.method == Method::Delete));
    }

    #[test]
    fn test_deleted_with_full_config_matches_empty_want() {
        let current = json!({
            "enabled": true,
            "polling_interval": 20,
            "collectors": [
                {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
            ],
        });
        let from_empty = reconcile(json!({}), State::Deleted, current.clone());
        let from_full = reconcile(current.clone(), State::Deleted, current);
        assert_eq!(from_empty.1, from_full.1);
    }

    #[test]
    fn test_deleted_requires_exact_scalar_match() {
        let (commands, requests) = reconcile(
            json!({"polling_interval": 30}),
            State::Deleted,
            json!({"polling_interval": 44}),
        );
        assert!(commands.is_empty());
        assert!(requests.is_empty());
    }

    #[test]
    fn test_deleted_collector_subset() {
        let (commands, requests) = reconcile(
            json!({
                "collectors": [
                    {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
                ],
            }),
            State::Deleted,
            json!({
                "collectors": [
                    {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
                    {"address": "10.0.0.2", "port": 6343, "network_instance": "default"},
                ],
            }),
        );
        assert_eq!(requests.len(), 1);
        assert!(requests[0].path.ends_with("collector=10.0.0.1,6343,default"));
        assert_eq!(
            commands[0].config.get_list(fields::COLLECTORS).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_overridden_substitution_skips_redundant_delete() {
        let (commands, requests) = reconcile(
            json!({"agent": "Ethernet4"}),
            State::Overridden,
            json!({"agent": "Ethernet0"}),
        );
        // The agent gets a new value; no preceding delete is emitted.
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Patch);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].state, State::Merged);
    }

    #[test]
    fn test_overridden_restores_interface_group() {
        let (commands, requests) = reconcile(
            json!({
                "interfaces": [
                    {"name": "Ethernet8", "enabled": true, "sampling_rate": 4000},
                ],
            }),
            State::Overridden,
            json!({
                "interfaces": [
                    {"name": "Ethernet8", "enabled": false, "sampling_rate": 4000},
                ],
            }),
        );

        // The interface element is deleted whole, then re-created with all
        // of its desired settings, not only the changed flag.
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Delete);
        assert!(requests[0].path.ends_with("interface=Ethernet8"));
        assert_eq!(requests[1].method, Method::Patch);
        let body = requests[1].body.as_ref().unwrap();
        assert_eq!(
            body[SFLOW_DATA_KEY]["interfaces"]["interface"][0]["config"]["sampling-rate"],
            json!(4000)
        );
        assert_eq!(commands[0].state, State::Deleted);
        assert_eq!(commands[1].state, State::Overridden);
    }

    #[test]
    fn test_replaced_leaves_unspecified_sections_alone() {
        let (_, requests) = reconcile(
            json!({"agent": "Ethernet4"}),
            State::Replaced,
            json!({
                "agent": "Ethernet0",
                "polling_interval": 20,
                "collectors": [
                    {"address": "10.0.0.1", "port": 6343, "network_instance": "default"},
                ],
            }),
        );
        // Only the agent changes; the collectors and polling interval
        // survive the replace untouched.
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Patch);
        let body = requests[0].body.as_ref().unwrap();
        assert_eq!(body[SFLOW_DATA_KEY]["config"]["agent"], json!("Ethernet4"));
        assert_eq!(body[SFLOW_DATA_KEY].get("collectors"), None);
    }

    #[test]
    fn test_replaced_empty_want_is_noop() {
        let (commands, requests) = reconcile(
            json!({}),
            State::Replaced,
            json!({"agent": "Ethernet0"}),
        );
        assert!(commands.is_empty());
        assert!(requests.is_empty());
    }
}
