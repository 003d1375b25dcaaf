//! REST request builders for OSPF area configuration.
//!
//! The merge side consolidates all areas of a VRF into one PATCH on the
//! OSPFv2 root, with virtual links created afterwards in their own PATCH
//! per area (a link can be created with only its router id, and the area
//! must exist first).
//!
//! The delete side walks the nested sections child-first. Several device
//! behaviors shape the output: deleting an area clears its scalar options,
//! stub settings, and propagation policy but NOT its ranges; deleting the
//! stub container clears the whole area, so stub attributes are only ever
//! deleted leaf by leaf; and a bulk virtual-link list delete breaks the
//! subsequent area delete when the area holds nothing but virtual links.

use serde_json::{json, Map, Value as Json};

use sonic_restcfg_common::{ConfigNode, Request, RestCfgError, RestCfgResult, ROOT_FIELD};

use crate::paths::{
    area_uri, auth_type_to_rest, escape_prefix, fields, ospf_uri, propagation_uri, OSPF_DATA_KEY,
    OSPF_EXT, VLINKS_DATA_KEY,
};

/// True when two areas are the same entity.
pub(crate) fn same_area(left: &ConfigNode, right: &ConfigNode) -> bool {
    left.get(fields::AREA_ID) == right.get(fields::AREA_ID)
        && left.get(fields::VRF_NAME) == right.get(fields::VRF_NAME)
}

fn area_identity(area: &ConfigNode) -> RestCfgResult<(String, String)> {
    let vrf_name = area
        .get_str(fields::VRF_NAME)
        .ok_or_else(|| RestCfgError::missing_key_field(ROOT_FIELD, fields::VRF_NAME))?;
    let area_id = area
        .get_str(fields::AREA_ID)
        .ok_or_else(|| RestCfgError::missing_key_field(ROOT_FIELD, fields::AREA_ID))?;
    Ok((vrf_name.to_string(), area_id.to_string()))
}

/// Builds the PATCH requests creating or merging the given areas.
///
/// Per-VRF bodies come first in first-seen VRF order, followed by one
/// virtual-links PATCH per area that carries them.
pub fn build_areas_merge_requests(areas: &[ConfigNode]) -> RestCfgResult<Vec<Request>> {
    let mut requests = Vec::new();
    let mut vlink_requests = Vec::new();
    let mut by_vrf: Vec<(String, Vec<Json>, Vec<Json>)> = Vec::new();

    for area in areas {
        let (vrf_name, area_id) = area_identity(area)?;
        // A listed area is always created, even with nothing but its id.
        let formatted_area = format_area_options(area, &area_id)?;
        let formatted_policy = format_area_policy(area, &area_id)?;

        if let Some(virtual_links) = area.get_list(fields::VIRTUAL_LINKS) {
            let formatted = format_virtual_links(virtual_links)?;
            if !formatted.is_empty() {
                vlink_requests.push(Request::patch(
                    format!("{}/virtual-links", area_uri(&vrf_name, &area_id)),
                    json!({ VLINKS_DATA_KEY: {"virtual-link": formatted} }),
                ));
            }
        }

        let slot = match by_vrf.iter().position(|(vrf, _, _)| vrf == &vrf_name) {
            Some(index) => &mut by_vrf[index],
            None => {
                by_vrf.push((vrf_name, Vec::new(), Vec::new()));
                let last = by_vrf.len() - 1;
                &mut by_vrf[last]
            }
        };
        slot.1.push(formatted_area);
        if let Some(policy) = formatted_policy {
            slot.2.push(policy);
        }
    }

    for (vrf_name, area_bodies, policy_bodies) in by_vrf {
        let mut body = Map::new();
        if !area_bodies.is_empty() {
            body.insert("areas".to_string(), json!({ "area": area_bodies }));
        }
        if !policy_bodies.is_empty() {
            let mut policies = Map::new();
            policies.insert(
                format!("{}inter-area-policy", OSPF_EXT),
                Json::Array(policy_bodies),
            );
            body.insert(
                "global".to_string(),
                json!({ "inter-area-propagation-policies": Json::Object(policies) }),
            );
        }
        if !body.is_empty() {
            requests.push(Request::patch(
                ospf_uri(&vrf_name),
                json!({ OSPF_DATA_KEY: Json::Object(body) }),
            ));
        }
    }
    requests.extend(vlink_requests);
    Ok(requests)
}

/// Formats the part of an area that lives under the `areas` subtree.
/// Virtual links are excluded; they go in their own request.
fn format_area_options(area: &ConfigNode, area_id: &str) -> RestCfgResult<Json> {
    let mut body = Map::new();

    let mut config = Map::new();
    if let Some(auth_type) = area.get_str(fields::AUTHENTICATION_TYPE) {
        let mapped = auth_type_to_rest(auth_type).ok_or_else(|| {
            RestCfgError::unsupported_value(format!(
                "unknown authentication type '{}'",
                auth_type
            ))
        })?;
        config.insert(format!("{}authentication-type", OSPF_EXT), json!(mapped));
    }
    if let Some(shortcut) = area.get_str(fields::SHORTCUT) {
        config.insert(
            format!("{}shortcut", OSPF_EXT),
            json!(shortcut.to_uppercase()),
        );
    }
    config.insert("identifier".to_string(), json!(area_id));
    body.insert("config".to_string(), Json::Object(config));

    // default-cost shares the stub container on the wire.
    let mut stub_config = Map::new();
    if let Some(stub) = area.get(fields::STUB) {
        if let Some(enabled) = stub.get(fields::ENABLED) {
            stub_config.insert("enable".to_string(), enabled.to_json());
        }
        if let Some(no_summary) = stub.get(fields::NO_SUMMARY) {
            stub_config.insert("no-summary".to_string(), no_summary.to_json());
        }
    }
    if let Some(cost) = area.get(fields::DEFAULT_COST) {
        stub_config.insert("default-cost".to_string(), cost.to_json());
    }
    if !stub_config.is_empty() {
        body.insert(
            format!("{}stub", OSPF_EXT),
            json!({ "config": Json::Object(stub_config) }),
        );
    }

    if let Some(networks) = area.get_list(fields::NETWORKS) {
        let formatted: Vec<Json> = networks
            .iter()
            .filter_map(ConfigNode::as_str)
            .map(|prefix| {
                json!({ "address-prefix": prefix, "config": {"address-prefix": prefix} })
            })
            .collect();
        if !formatted.is_empty() {
            body.insert(
                format!("{}networks", OSPF_EXT),
                json!({ "network": formatted }),
            );
        }
    }

    body.insert("identifier".to_string(), json!(area_id));
    Ok(Json::Object(body))
}

/// Formats the part of an area that lives in the inter-area propagation
/// policy subtree (ranges and filter lists).
fn format_area_policy(area: &ConfigNode, area_id: &str) -> RestCfgResult<Option<Json>> {
    let mut body = Map::new();
    if let Some(ranges) = area.get_list(fields::RANGES) {
        let formatted = format_ranges(ranges)?;
        if !formatted.is_empty() {
            body.insert("ranges".to_string(), json!({ "range": formatted }));
        }
    }
    if let Some(name) = area.get_str(fields::FILTER_LIST_IN) {
        body.insert(
            "filter-list-in".to_string(),
            json!({ "config": {"name": name} }),
        );
    }
    if let Some(name) = area.get_str(fields::FILTER_LIST_OUT) {
        body.insert(
            "filter-list-out".to_string(),
            json!({ "config": {"name": name} }),
        );
    }
    if body.is_empty() {
        return Ok(None);
    }
    body.insert("src-area".to_string(), json!(area_id));
    Ok(Some(Json::Object(body)))
}

fn format_ranges(ranges: &[ConfigNode]) -> RestCfgResult<Vec<Json>> {
    let mut formatted = Vec::with_capacity(ranges.len());
    for range in ranges {
        let prefix = range
            .get_str(fields::PREFIX)
            .ok_or_else(|| RestCfgError::missing_key_field(fields::RANGES, fields::PREFIX))?;
        let mut config = Map::new();
        if let Some(advertise) = range.get(fields::ADVERTISE) {
            config.insert("advertise".to_string(), advertise.to_json());
        }
        if let Some(cost) = range.get(fields::COST) {
            config.insert("metric".to_string(), cost.to_json());
        }
        if let Some(substitute) = range.get(fields::SUBSTITUTE) {
            // misspelled on the wire
            config.insert("substitue-prefix".to_string(), substitute.to_json());
        }
        config.insert("address-prefix".to_string(), json!(prefix));
        formatted.push(json!({ "address-prefix": prefix, "config": Json::Object(config) }));
    }
    Ok(formatted)
}

fn format_virtual_links(virtual_links: &[ConfigNode]) -> RestCfgResult<Vec<Json>> {
    let mut formatted = Vec::with_capacity(virtual_links.len());
    for vlink in virtual_links {
        let router_id = vlink.get_str(fields::ROUTER_ID).ok_or_else(|| {
            RestCfgError::missing_key_field(fields::VIRTUAL_LINKS, fields::ROUTER_ID)
        })?;
        let mut entry = Map::new();
        let mut config = Map::new();
        for (field, wire_leaf) in [
            (fields::ENABLED, "enable"),
            (fields::DEAD_INTERVAL, "dead-interval"),
            (fields::HELLO_INTERVAL, "hello-interval"),
            (fields::RETRANSMIT_INTERVAL, "retransmission-interval"),
            (fields::TRANSMIT_DELAY, "transmit-delay"),
        ] {
            if let Some(value) = vlink.get(field) {
                config.insert(format!("{}{}", OSPF_EXT, wire_leaf), value.to_json());
            }
        }
        if let Some(auth) = vlink.get(fields::AUTHENTICATION) {
            if let Some(auth_type) = auth.get_str(fields::AUTH_TYPE) {
                let mapped = auth_type_to_rest(auth_type).ok_or_else(|| {
                    RestCfgError::unsupported_value(format!(
                        "unknown authentication type '{}'",
                        auth_type
                    ))
                })?;
                config.insert(format!("{}authentication-type", OSPF_EXT), json!(mapped));
            }
            if let Some(key) = auth.get(fields::KEY) {
                config.insert(format!("{}authentication-key", OSPF_EXT), key.to_json());
            }
            if let Some(encrypted) = auth.get(fields::KEY_ENCRYPTED) {
                config.insert(
                    format!("{}authentication-key-encrypted", OSPF_EXT),
                    encrypted.to_json(),
                );
            }
        }
        if let Some(md_keys) = vlink.get_list(fields::MESSAGE_DIGEST_KEYS) {
            entry.insert(
                format!("{}md-authentications", OSPF_EXT),
                json!({ "md-authentication": format_md_keys(md_keys)? }),
            );
        }
        config.insert("remote-router-id".to_string(), json!(router_id));
        entry.insert("config".to_string(), Json::Object(config));
        entry.insert("remote-router-id".to_string(), json!(router_id));
        formatted.push(Json::Object(entry));
    }
    Ok(formatted)
}

fn format_md_keys(md_keys: &[ConfigNode]) -> RestCfgResult<Vec<Json>> {
    let mut formatted = Vec::with_capacity(md_keys.len());
    for md_key in md_keys {
        let key_id = md_key.get(fields::KEY_ID).ok_or_else(|| {
            RestCfgError::missing_key_field(fields::MESSAGE_DIGEST_KEYS, fields::KEY_ID)
        })?;
        let key = md_key.get(fields::KEY).ok_or_else(|| {
            RestCfgError::invalid_config(fields::KEY, "message digest keys must carry a key")
        })?;
        let mut config = Map::new();
        if let Some(encrypted) = md_key.get(fields::KEY_ENCRYPTED) {
            config.insert(
                "authentication-key-encrypted".to_string(),
                encrypted.to_json(),
            );
        }
        config.insert("authentication-key-id".to_string(), key_id.to_json());
        config.insert("authentication-md5-key".to_string(), key.to_json());
        formatted.push(json!({
            "authentication-key-id": key_id.to_json(),
            "config": Json::Object(config),
        }));
    }
    Ok(formatted)
}

/// Builds the delete requests for the given areas.
///
/// `commands` is a projection of `have`; areas not found on the device are
/// skipped. With `delete_everything` each area is cleared wholesale.
pub fn build_areas_delete_requests(
    commands: &[ConfigNode],
    have: &[ConfigNode],
    delete_everything: bool,
) -> RestCfgResult<Vec<Request>> {
    let mut requests = Vec::new();
    for area_c in commands {
        let matched = match have.iter().find(|area_h| same_area(area_h, area_c)) {
            Some(matched) => matched,
            None => continue,
        };
        let (_, area_requests) = build_area_delete_requests(area_c, matched, delete_everything)?;
        requests.extend(area_requests);
    }
    Ok(requests)
}

/// Builds the delete requests for one area.
///
/// Returns whether the area is being cleared entirely. The nested sections
/// (virtual links, ranges, networks) must go first and separately: the
/// final area delete clears the scalar options, the stub container, and
/// the propagation policy, but none of those three sections.
fn build_area_delete_requests(
    commands: &ConfigNode,
    have: &ConfigNode,
    delete_everything: bool,
) -> RestCfgResult<(bool, Vec<Request>)> {
    let (vrf_name, area_id) = area_identity(commands)?;
    let area_root = area_uri(&vrf_name, &area_id);
    let propagation_root = propagation_uri(&vrf_name, &area_id);
    // Nothing but the identity keys means clear the area.
    let delete_everything = delete_everything || commands.len() == 2;

    let section = |field: &str, node: &ConfigNode| -> Vec<ConfigNode> {
        node.get_list(field).map(<[ConfigNode]>::to_vec).unwrap_or_default()
    };
    let have_vlinks = section(fields::VIRTUAL_LINKS, have);
    let command_vlinks = if delete_everything {
        have_vlinks.clone()
    } else {
        section(fields::VIRTUAL_LINKS, commands)
    };
    let (vlinks_all_gone, vlink_requests) =
        build_virtual_links_delete_requests(&area_root, &command_vlinks, &have_vlinks)?;

    let have_ranges = section(fields::RANGES, have);
    let command_ranges = if delete_everything {
        have_ranges.clone()
    } else {
        section(fields::RANGES, commands)
    };
    let (ranges_all_gone, ranges_requests) =
        build_ranges_delete_requests(&propagation_root, &command_ranges, &have_ranges)?;

    let have_networks = section(fields::NETWORKS, have);
    let command_networks = if delete_everything {
        have_networks.clone()
    } else {
        section(fields::NETWORKS, commands)
    };
    let (networks_all_gone, networks_requests) =
        build_networks_delete_requests(&area_root, &command_networks, &have_networks)?;

    let vlink_request_count = vlink_requests.len();
    let mut requests = Vec::new();
    requests.extend(vlink_requests);
    requests.extend(ranges_requests);
    requests.extend(networks_requests);

    let (stub_all_gone, stub_requests) = build_stub_delete_requests(&area_root, commands, have);

    if delete_everything
        || (commands.len() == have.len()
            && stub_all_gone
            && vlinks_all_gone
            && ranges_all_gone
            && networks_all_gone)
    {
        // A bulk virtual-link list delete followed by the area delete fails
        // on an area holding nothing but virtual links; skip the area
        // delete there, the links going away removes the area.
        let vlink_only_area = vlink_request_count > 0
            && have.len() == 3
            && have.contains(fields::VIRTUAL_LINKS);
        if !vlink_only_area {
            requests.push(Request::delete(area_root));
        }
        return Ok((true, requests));
    }

    let (_, propagation_requests) =
        build_propagation_delete_requests(&propagation_root, commands, have, ranges_all_gone);
    requests.extend(propagation_requests);
    requests.extend(stub_requests);

    if commands.contains(fields::AUTHENTICATION_TYPE) {
        requests.push(Request::delete(format!(
            "{}/config/{}authentication-type",
            area_root, OSPF_EXT
        )));
    }
    if commands.contains(fields::SHORTCUT) {
        requests.push(Request::delete(format!(
            "{}/config/{}shortcut",
            area_root, OSPF_EXT
        )));
    }
    Ok((false, requests))
}

/// Builds the per-leaf deletes for an area's stub settings.
///
/// Deleting the stub container clears the whole area, so only individual
/// leaves are ever deleted here. Returns whether everything stub-related
/// on the device is covered.
fn build_stub_delete_requests(
    area_root: &str,
    commands: &ConfigNode,
    have: &ConfigNode,
) -> (bool, Vec<Request>) {
    let has_in = |node: &ConfigNode, field: &str| {
        node.get(fields::STUB).map(|stub| stub.contains(field)).unwrap_or(false)
    };
    let mut requests = Vec::new();
    if commands.contains(fields::DEFAULT_COST) {
        requests.push(Request::delete(format!(
            "{}/{}stub/config/default-cost",
            area_root, OSPF_EXT
        )));
    }
    if has_in(commands, fields::NO_SUMMARY) {
        requests.push(Request::delete(format!(
            "{}/{}stub/config/no-summary",
            area_root, OSPF_EXT
        )));
    }
    if has_in(commands, fields::ENABLED) {
        requests.push(Request::delete(format!(
            "{}/{}stub/config/enable",
            area_root, OSPF_EXT
        )));
    }
    if (has_in(have, fields::NO_SUMMARY) && !has_in(commands, fields::NO_SUMMARY))
        || (has_in(have, fields::ENABLED) && !has_in(commands, fields::ENABLED))
        || (have.contains(fields::DEFAULT_COST) && !commands.contains(fields::DEFAULT_COST))
    {
        return (false, requests);
    }
    (true, requests)
}

fn build_networks_delete_requests(
    area_root: &str,
    commands: &[ConfigNode],
    have: &[ConfigNode],
) -> RestCfgResult<(bool, Vec<Request>)> {
    if have.is_empty() {
        return Ok((true, Vec::new()));
    }
    if commands.len() == have.len() || commands.is_empty() {
        return Ok((
            true,
            vec![Request::delete(format!(
                "{}/{}networks/network",
                area_root, OSPF_EXT
            ))],
        ));
    }
    let mut requests = Vec::with_capacity(commands.len());
    for prefix in commands {
        let prefix = prefix.as_str().ok_or_else(|| {
            RestCfgError::invalid_config(fields::NETWORKS, "network prefixes must be strings")
        })?;
        requests.push(Request::delete(format!(
            "{}/{}networks/network={}",
            area_root,
            OSPF_EXT,
            escape_prefix(prefix)
        )));
    }
    Ok((false, requests))
}

/// Builds the delete requests for an area's virtual links.
///
/// A link named with only its router id, or whose listed settings cover
/// everything on the device, is deleted whole; otherwise its attributes
/// are deleted leaf by leaf. When every link is deleted whole the batch
/// collapses to one delete on the link list.
fn build_virtual_links_delete_requests(
    area_root: &str,
    commands: &[ConfigNode],
    have: &[ConfigNode],
) -> RestCfgResult<(bool, Vec<Request>)> {
    if have.is_empty() {
        return Ok((true, Vec::new()));
    }
    let list_uri = format!("{}/virtual-links/virtual-link", area_root);
    if commands.is_empty() {
        return Ok((true, vec![Request::delete(list_uri)]));
    }

    let mut requests = Vec::new();
    let mut partial_deletes = false;
    for vlink_c in commands {
        let router_id = vlink_c.get_str(fields::ROUTER_ID).ok_or_else(|| {
            RestCfgError::missing_key_field(fields::VIRTUAL_LINKS, fields::ROUTER_ID)
        })?;
        let matched = match have
            .iter()
            .find(|vlink_h| vlink_h.get_str(fields::ROUTER_ID) == Some(router_id))
        {
            Some(matched) => matched,
            None => continue,
        };
        let vlink_uri = format!("{}={}", list_uri, router_id);
        if vlink_c.len() == 1 {
            requests.push(Request::delete(vlink_uri));
            continue;
        }

        let (md_all_gone, md_requests) =
            match vlink_c.get_list(fields::MESSAGE_DIGEST_KEYS) {
                Some(md_commands) => build_md_auth_delete_requests(
                    &vlink_uri,
                    md_commands,
                    matched.get_list(fields::MESSAGE_DIGEST_KEYS).unwrap_or(&[]),
                )?,
                None => (true, Vec::new()),
            };

        if vlink_c.len() == matched.len() && md_all_gone {
            requests.push(Request::delete(vlink_uri));
            continue;
        }
        partial_deletes = true;
        requests.extend(md_requests);
        for (field, wire_leaf) in [
            (fields::ENABLED, "enable"),
            (fields::DEAD_INTERVAL, "dead-interval"),
            (fields::HELLO_INTERVAL, "hello-interval"),
            (fields::RETRANSMIT_INTERVAL, "retransmission-interval"),
            (fields::TRANSMIT_DELAY, "transmit-delay"),
        ] {
            if vlink_c.contains(field) {
                requests.push(Request::delete(format!(
                    "{}/config/{}{}",
                    vlink_uri, OSPF_EXT, wire_leaf
                )));
            }
        }
        if let Some(auth) = vlink_c.get(fields::AUTHENTICATION) {
            // An empty authentication object clears all three leaves.
            let clear_all = auth.is_empty();
            for (field, wire_leaf) in [
                (fields::AUTH_TYPE, "authentication-type"),
                (fields::KEY, "authentication-key"),
                (fields::KEY_ENCRYPTED, "authentication-key-encrypted"),
            ] {
                if clear_all || auth.contains(field) {
                    requests.push(Request::delete(format!(
                        "{}/config/{}{}",
                        vlink_uri, OSPF_EXT, wire_leaf
                    )));
                }
            }
        }
    }
    if commands.len() == have.len() && !partial_deletes {
        return Ok((true, vec![Request::delete(list_uri)]));
    }
    Ok((false, requests))
}

fn build_md_auth_delete_requests(
    vlink_uri: &str,
    commands: &[ConfigNode],
    have: &[ConfigNode],
) -> RestCfgResult<(bool, Vec<Request>)> {
    if have.is_empty() {
        return Ok((true, Vec::new()));
    }
    let list_uri = format!("{}/{}md-authentications/md-authentication", vlink_uri, OSPF_EXT);
    if commands.len() == have.len() || commands.is_empty() {
        return Ok((true, vec![Request::delete(list_uri)]));
    }
    let mut requests = Vec::with_capacity(commands.len());
    for md_c in commands {
        let key_id = match md_c.get(fields::KEY_ID) {
            Some(ConfigNode::Scalar(value)) => value.clone(),
            _ => {
                return Err(RestCfgError::missing_key_field(
                    fields::MESSAGE_DIGEST_KEYS,
                    fields::KEY_ID,
                ))
            }
        };
        // Only the whole entry is deletable, the key material is not
        // individually addressable.
        requests.push(Request::delete(format!("{}={}", list_uri, key_id)));
    }
    Ok((false, requests))
}

/// Builds the delete requests for an area's propagation policy scalars.
///
/// The policy endpoint technically contains the ranges too, but deleting
/// the policy does not remove them, so ranges are handled by the caller
/// and only their outcome is consulted here.
fn build_propagation_delete_requests(
    propagation_root: &str,
    commands: &ConfigNode,
    have: &ConfigNode,
    ranges_all_gone: bool,
) -> (bool, Vec<Request>) {
    let mut requests = Vec::new();
    if commands.contains(fields::FILTER_LIST_IN) {
        requests.push(Request::delete(format!("{}/filter-list-in", propagation_root)));
    }
    if commands.contains(fields::FILTER_LIST_OUT) {
        requests.push(Request::delete(format!("{}/filter-list-out", propagation_root)));
    }

    if (have.contains(fields::FILTER_LIST_IN) && !commands.contains(fields::FILTER_LIST_IN))
        || (have.contains(fields::FILTER_LIST_OUT) && !commands.contains(fields::FILTER_LIST_OUT))
        || (have.contains(fields::RANGES) && !commands.contains(fields::RANGES))
        || !ranges_all_gone
    {
        return (false, requests);
    }
    if !requests.is_empty() {
        // Everything in the policy is going away; one delete on the policy
        // replaces the per-leaf requests.
        return (true, vec![Request::delete(propagation_root.to_string())]);
    }
    (true, Vec::new())
}

fn build_ranges_delete_requests(
    propagation_root: &str,
    commands: &[ConfigNode],
    have: &[ConfigNode],
) -> RestCfgResult<(bool, Vec<Request>)> {
    if have.is_empty() {
        return Ok((true, Vec::new()));
    }
    let list_uri = format!("{}/ranges/range", propagation_root);
    if commands.is_empty() {
        return Ok((true, vec![Request::delete(list_uri)]));
    }

    let mut requests = Vec::new();
    let mut partial_deletes = false;
    for range_c in commands {
        let prefix = range_c
            .get_str(fields::PREFIX)
            .ok_or_else(|| RestCfgError::missing_key_field(fields::RANGES, fields::PREFIX))?;
        let matched = match have
            .iter()
            .find(|range_h| range_h.get_str(fields::PREFIX) == Some(prefix))
        {
            Some(matched) => matched,
            None => continue,
        };
        let range_uri = format!("{}={}", list_uri, escape_prefix(prefix));
        if range_c.len() == 1 || range_c.len() == matched.len() {
            requests.push(Request::delete(range_uri));
            continue;
        }
        partial_deletes = true;
        if range_c.contains(fields::ADVERTISE) {
            requests.push(Request::delete(format!("{}/config/advertise", range_uri)));
        }
        if range_c.contains(fields::COST) {
            requests.push(Request::delete(format!("{}/config/metric", range_uri)));
        }
        if range_c.contains(fields::SUBSTITUTE) {
            // misspelled on the wire
            requests.push(Request::delete(format!(
                "{}/config/substitue-prefix",
                range_uri
            )));
        }
    }
    if commands.len() == have.len() && !partial_deletes {
        return Ok((true, vec![Request::delete(list_uri)]));
    }
    Ok((false, requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sonic_restcfg_common::Method;

    fn areas(raw: Json) -> Vec<ConfigNode> {
        ConfigNode::from_json(&raw)
            .unwrap()
            .unwrap()
            .as_list()
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_merge_consolidates_areas_per_vrf() {
        let requests = build_areas_merge_requests(&areas(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "shortcut": "enable"},
            {"area_id": "0.0.0.2", "vrf_name": "default", "authentication_type": "message_digest"},
        ])))
        .unwrap();

        assert_eq!(requests.len(), 1);
        let body = requests[0].body.as_ref().unwrap();
        let area_list = &body[OSPF_DATA_KEY]["areas"]["area"];
        assert_eq!(area_list.as_array().unwrap().len(), 2);
        assert_eq!(
            area_list[0]["config"]["openconfig-ospfv2-ext:shortcut"],
            json!("ENABLE")
        );
        assert_eq!(
            area_list[1]["config"]["openconfig-ospfv2-ext:authentication-type"],
            json!("MD5HMAC")
        );
    }

    #[test]
    fn test_merge_splits_policy_from_area_settings() {
        let requests = build_areas_merge_requests(&areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "ranges": [
                {"prefix": "10.1.0.0/24", "cost": 4, "substitute": "10.2.0.0/24"},
            ],
            "filter_list_in": "pf1",
        }])))
        .unwrap();

        assert_eq!(requests.len(), 1);
        let body = requests[0].body.as_ref().unwrap();
        let policy = &body[OSPF_DATA_KEY]["global"]["inter-area-propagation-policies"]
            ["openconfig-ospfv2-ext:inter-area-policy"][0];
        assert_eq!(policy["src-area"], json!("0.0.0.1"));
        assert_eq!(policy["filter-list-in"]["config"]["name"], json!("pf1"));
        let range = &policy["ranges"]["range"][0];
        assert_eq!(range["config"]["metric"], json!(4));
        assert_eq!(range["config"]["substitue-prefix"], json!("10.2.0.0/24"));
    }

    #[test]
    fn test_merge_virtual_links_come_after_vrf_patches() {
        let requests = build_areas_merge_requests(&areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [
                {"router_id": "1.1.1.1", "hello_interval": 5,
                 "message_digest_keys": [{"key_id": 1, "key": "s", "key_encrypted": false}]},
            ],
        }])))
        .unwrap();

        assert_eq!(requests.len(), 2);
        assert!(requests[1].path.ends_with("/areas/area=0.0.0.1/virtual-links"));
        let vlink = &requests[1].body.as_ref().unwrap()[VLINKS_DATA_KEY]["virtual-link"][0];
        assert_eq!(vlink["remote-router-id"], json!("1.1.1.1"));
        assert_eq!(
            vlink["config"]["openconfig-ospfv2-ext:hello-interval"],
            json!(5)
        );
        assert_eq!(
            vlink["openconfig-ospfv2-ext:md-authentications"]["md-authentication"][0]["config"]
                ["authentication-md5-key"],
            json!("s")
        );
    }

    #[test]
    fn test_delete_everything_keeps_ranges_before_area_delete() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "shortcut": "enable",
            "ranges": [{"prefix": "10.1.0.0/24"}],
        }]));
        let requests = build_areas_delete_requests(&have, &have, true).unwrap();

        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        // The area delete clears the shortcut and the propagation policy
        // but not the ranges, which go first.
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("inter-area-policy=0.0.0.1/ranges/range"));
        assert!(paths[1].ends_with("/areas/area=0.0.0.1"));
        assert!(requests.iter().all(|r| r.method == Method::Delete));
    }

    #[test]
    fn test_delete_vlink_only_area_skips_area_delete() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [{"router_id": "1.1.1.1"}],
        }]));
        let requests = build_areas_delete_requests(&have, &have, true).unwrap();

        assert_eq!(requests.len(), 1);
        assert!(requests[0].path.ends_with("/virtual-links/virtual-link"));
    }

    #[test]
    fn test_delete_stub_leaves_individually() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "stub": {"enabled": true, "no_summary": true},
            "default_cost": 10,
            "shortcut": "enable",
        }]));
        let commands = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "stub": {"no_summary": true},
            "default_cost": 10,
        }]));
        let requests = build_areas_delete_requests(&commands, &have, false).unwrap();

        let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("openconfig-ospfv2-ext:stub/config/default-cost"));
        assert!(paths[1].ends_with("openconfig-ospfv2-ext:stub/config/no-summary"));
    }

    #[test]
    fn test_delete_network_prefix_is_escaped() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "networks": ["10.1.0.0/24", "10.2.0.0/24"],
            "shortcut": "enable",
        }]));
        let commands = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "networks": ["10.1.0.0/24"],
        }]));
        let requests = build_areas_delete_requests(&commands, &have, false).unwrap();

        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .path
            .ends_with("openconfig-ospfv2-ext:networks/network=10.1.0.0%2F24"));
    }

    #[test]
    fn test_delete_md_key_subset_is_per_entry() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [{
                "router_id": "1.1.1.1",
                "message_digest_keys": [
                    {"key_id": 1, "key": "a", "key_encrypted": false},
                    {"key_id": 2, "key": "b", "key_encrypted": false},
                ],
            }],
        }]));
        let commands = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [{
                "router_id": "1.1.1.1",
                "message_digest_keys": [
                    {"key_id": 1, "key": "a", "key_encrypted": false},
                ],
            }],
        }]));
        let requests = build_areas_delete_requests(&commands, &have, false).unwrap();

        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .path
            .ends_with("openconfig-ospfv2-ext:md-authentications/md-authentication=1"));
    }

    #[test]
    fn test_delete_all_md_keys_collapses_to_list_delete() {
        let have = areas(json!([{
            "area_id": "0.0.0.1",
            "vrf_name": "default",
            "virtual_links": [{
                "router_id": "1.1.1.1",
                "message_digest_keys": [
                    {"key_id": 1, "key": "a", "key_encrypted": false},
                    {"key_id": 2, "key": "b", "key_encrypted": false},
                ],
            }],
        }]));
        let requests = build_areas_delete_requests(&have, &have, false).unwrap();

        // Whole links deleted, whole list collapsed, and the area delete
        // suppressed because only virtual links existed.
        assert_eq!(requests.len(), 1);
        assert!(requests[0].path.ends_with("/virtual-links/virtual-link"));
    }
}
