//! Normalization and validation of raw sFlow input.
//!
//! Raw desired config arrives as JSON; nulls are stripped (empty lists and
//! objects remain meaningful as "clear this section"), interface names are
//! canonicalized, collector key defaults are filled in, and value ranges
//! are checked before the input reaches the diff engine.

use sonic_restcfg_common::intf::normalize_interface_name;
use sonic_restcfg_common::{ConfigNode, RestCfgError, RestCfgResult};

use crate::paths::{fields, DEFAULT_COLLECTOR_PORT, DEFAULT_NETWORK_INSTANCE};

/// Validates and normalizes a raw desired config.
///
/// A null input becomes an empty config. Fails on out-of-range values,
/// wrongly typed fields, and collectors or interfaces missing their
/// identity keys.
pub fn validate_normalize_config(raw: &serde_json::Value) -> RestCfgResult<ConfigNode> {
    let mut config = match ConfigNode::from_json(raw)? {
        Some(node) => node,
        None => return Ok(ConfigNode::object()),
    };
    if config.as_object().is_none() {
        return Err(RestCfgError::invalid_config(
            "config",
            "sflow configuration must be an object",
        ));
    }

    check_scalar_types(&config)?;

    if let Some(interval) = config.get_i64(fields::POLLING_INTERVAL) {
        if interval != 0 && !(5..=300).contains(&interval) {
            return Err(RestCfgError::invalid_config(
                fields::POLLING_INTERVAL,
                "must be 0 or in the range 5-300 inclusive",
            ));
        }
    }

    let agent = match config.get_str(fields::AGENT) {
        Some(name) => Some(normalize_interface_name(name)?),
        None => None,
    };
    let config_fields = config
        .as_object_mut()
        .ok_or_else(|| RestCfgError::internal("config changed shape during normalization"))?;
    if let Some(agent) = agent {
        config_fields.insert(fields::AGENT.to_string(), agent.into());
    }

    if let Some(ConfigNode::List(collectors)) = config_fields.get_mut(fields::COLLECTORS) {
        for collector in collectors {
            normalize_collector(collector)?;
        }
    }

    if let Some(ConfigNode::List(interfaces)) = config_fields.get_mut(fields::INTERFACES) {
        for interface in interfaces {
            let name = interface
                .get_str(fields::NAME)
                .ok_or_else(|| {
                    RestCfgError::missing_key_field(fields::INTERFACES, fields::NAME)
                })?
                .to_string();
            let normalized = normalize_interface_name(&name)?;
            if let Some(entry) = interface.as_object_mut() {
                entry.insert(fields::NAME.to_string(), normalized.into());
            }
        }
    }

    Ok(config)
}

fn check_scalar_types(config: &ConfigNode) -> RestCfgResult<()> {
    if let Some(node) = config.get(fields::ENABLED) {
        if node.as_bool().is_none() {
            return Err(RestCfgError::invalid_config(
                fields::ENABLED,
                "must be a boolean",
            ));
        }
    }
    for field in [fields::POLLING_INTERVAL, fields::SAMPLING_RATE] {
        if let Some(node) = config.get(field) {
            if node.as_i64().is_none() {
                return Err(RestCfgError::invalid_config(field, "must be an integer"));
            }
        }
    }
    if let Some(node) = config.get(fields::AGENT) {
        if node.as_str().is_none() {
            return Err(RestCfgError::invalid_config(
                fields::AGENT,
                "must be an interface name",
            ));
        }
    }
    Ok(())
}

fn normalize_collector(collector: &mut ConfigNode) -> RestCfgResult<()> {
    if collector.get_str(fields::ADDRESS).is_none() {
        return Err(RestCfgError::missing_key_field(
            fields::COLLECTORS,
            fields::ADDRESS,
        ));
    }
    let entry = collector.as_object_mut().ok_or_else(|| {
        RestCfgError::invalid_config(fields::COLLECTORS, "collector entries must be objects")
    })?;
    entry
        .entry(fields::PORT.to_string())
        .or_insert_with(|| DEFAULT_COLLECTOR_PORT.into());
    entry
        .entry(fields::NETWORK_INSTANCE.to_string())
        .or_insert_with(|| DEFAULT_NETWORK_INSTANCE.into());
    Ok(())
}
