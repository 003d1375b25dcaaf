//! Normalization and validation of raw OSPF area input.
//!
//! Area identifiers are canonicalized to dotted-quad form, the VRF defaults
//! to "default", enum-valued fields are checked, and the authentication key
//! material is completed (`key_encrypted` defaults to false wherever a key
//! is supplied) before the input reaches the diff engine.

use sonic_restcfg_common::{ConfigNode, RestCfgError, RestCfgResult, Scalar, State, ROOT_FIELD};

use crate::paths::{auth_type_to_rest, fields};

const SHORTCUT_CHOICES: &[&str] = &["default", "disable", "enable"];

/// Validates and normalizes a raw desired config into a list of areas.
///
/// `have` is consulted for the default-cost precondition: a default cost is
/// only settable on an area that is (or is becoming) a stub area.
pub fn validate_normalize_config(
    raw: &serde_json::Value,
    have: &[ConfigNode],
    state: State,
) -> RestCfgResult<Vec<ConfigNode>> {
    let parsed = match ConfigNode::from_json(raw)? {
        Some(node) => node,
        None => return Ok(Vec::new()),
    };
    let mut areas = match parsed {
        ConfigNode::List(items) => items,
        _ => {
            return Err(RestCfgError::invalid_config(
                "config",
                "ospf_area configuration must be a list of areas",
            ))
        }
    };

    for area in &mut areas {
        normalize_area(area, have, state)?;
    }
    Ok(areas)
}

/// Canonicalizes an area identifier.
///
/// Identifiers are accepted as dotted-quad strings, decimal strings, or
/// plain integers; the device works with dotted-quad only.
pub fn format_area_id(area_id: &Scalar) -> RestCfgResult<String> {
    let raw = match area_id {
        Scalar::Int(number) => return Ok(dotted_quad(*number)),
        Scalar::Str(raw) => raw,
        Scalar::Bool(_) => {
            return Err(RestCfgError::invalid_config(
                fields::AREA_ID,
                "area id must be a dotted-quad string or an integer",
            ))
        }
    };
    if raw.matches('.').count() >= 3 {
        return Ok(raw.clone());
    }
    let number: i64 = raw.trim().parse().map_err(|_| {
        RestCfgError::invalid_config(
            fields::AREA_ID,
            format!("'{}' is neither dotted-quad nor an integer", raw),
        )
    })?;
    Ok(dotted_quad(number))
}

fn dotted_quad(number: i64) -> String {
    format!(
        "{}.{}.{}.{}",
        (number >> 24) & 0xff,
        (number >> 16) & 0xff,
        (number >> 8) & 0xff,
        number & 0xff
    )
}

fn normalize_area(area: &mut ConfigNode, have: &[ConfigNode], state: State) -> RestCfgResult<()> {
    let area_id = match area.get(fields::AREA_ID) {
        Some(ConfigNode::Scalar(value)) => format_area_id(value)?,
        _ => return Err(RestCfgError::missing_key_field(ROOT_FIELD, fields::AREA_ID)),
    };
    {
        let entry = area.as_object_mut().ok_or_else(|| {
            RestCfgError::invalid_config("config", "area entries must be objects")
        })?;
        entry.insert(fields::AREA_ID.to_string(), area_id.clone().into());
        entry
            .entry(fields::VRF_NAME.to_string())
            .or_insert_with(|| "default".into());
    }
    let vrf_name = area
        .get_str(fields::VRF_NAME)
        .ok_or_else(|| {
            RestCfgError::invalid_config(fields::VRF_NAME, "vrf name must be a string")
        })?
        .to_string();

    if let Some(value) = area.get(fields::AUTHENTICATION_TYPE) {
        match value.as_str() {
            Some(name) if auth_type_to_rest(name).is_some() => {}
            _ => {
                return Err(RestCfgError::invalid_config(
                    fields::AUTHENTICATION_TYPE,
                    "must be one of message_digest, text, none",
                ))
            }
        }
    }
    if let Some(value) = area.get(fields::SHORTCUT) {
        match value.as_str() {
            Some(name) if SHORTCUT_CHOICES.contains(&name) => {}
            _ => {
                return Err(RestCfgError::invalid_config(
                    fields::SHORTCUT,
                    "must be one of default, disable, enable",
                ))
            }
        }
    }

    let adding = state != State::Deleted;
    if adding && area.contains(fields::DEFAULT_COST) {
        let area_h = have.iter().find(|candidate| {
            candidate.get_str(fields::AREA_ID) == Some(area_id.as_str())
                && candidate.get_str(fields::VRF_NAME) == Some(vrf_name.as_str())
        });
        let can_set_cost =
            area_h.map(stub_enabled).unwrap_or(false) || stub_enabled(area);
        if !can_set_cost {
            return Err(RestCfgError::invalid_config(
                fields::DEFAULT_COST,
                format!(
                    "cannot set default cost for area {} in vrf {}: not a stub or NSSA area",
                    area_id, vrf_name
                ),
            ));
        }
    }

    if let Some(entry) = area.as_object_mut() {
        if let Some(ConfigNode::List(virtual_links)) = entry.get_mut(fields::VIRTUAL_LINKS) {
            for virtual_link in virtual_links {
                normalize_virtual_link(virtual_link, adding)?;
            }
        }
    }
    Ok(())
}

fn stub_enabled(area: &ConfigNode) -> bool {
    area.get(fields::STUB)
        .and_then(|stub| stub.get_bool(fields::ENABLED))
        .unwrap_or(false)
}

fn normalize_virtual_link(virtual_link: &mut ConfigNode, adding: bool) -> RestCfgResult<()> {
    if virtual_link.get(fields::ROUTER_ID).is_none() {
        return Err(RestCfgError::missing_key_field(
            fields::VIRTUAL_LINKS,
            fields::ROUTER_ID,
        ));
    }
    if let Some(auth_type) = virtual_link
        .get(fields::AUTHENTICATION)
        .and_then(|auth| auth.get(fields::AUTH_TYPE))
    {
        match auth_type.as_str() {
            Some(name) if auth_type_to_rest(name).is_some() => {}
            _ => {
                return Err(RestCfgError::invalid_config(
                    fields::AUTH_TYPE,
                    "must be one of message_digest, text, none",
                ))
            }
        }
    }
    if !adding {
        return Ok(());
    }

    let entry = match virtual_link.as_object_mut() {
        Some(entry) => entry,
        None => return Ok(()),
    };
    // A supplied key is always either encrypted or not; complete the pair.
    if let Some(auth) = entry.get_mut(fields::AUTHENTICATION) {
        if auth.contains(fields::KEY) && !auth.contains(fields::KEY_ENCRYPTED) {
            if let Some(auth_entry) = auth.as_object_mut() {
                auth_entry.insert(fields::KEY_ENCRYPTED.to_string(), false.into());
            }
        }
    }
    if let Some(ConfigNode::List(md_keys)) = entry.get_mut(fields::MESSAGE_DIGEST_KEYS) {
        for md_key in md_keys {
            if md_key.get(fields::KEY_ID).is_none() {
                return Err(RestCfgError::missing_key_field(
                    fields::MESSAGE_DIGEST_KEYS,
                    fields::KEY_ID,
                ));
            }
            if !md_key.contains(fields::KEY) {
                return Err(RestCfgError::invalid_config(
                    fields::KEY,
                    "message digest keys must carry a key when adding configuration",
                ));
            }
            if let Some(md_entry) = md_key.as_object_mut() {
                md_entry
                    .entry(fields::KEY_ENCRYPTED.to_string())
                    .or_insert_with(|| false.into());
            }
        }
    }
    Ok(())
}
