//! REST endpoint paths and field name constants for the OSPFv2 area
//! resource.
//!
//! Area settings live in two distinct REST subtrees of the per-VRF OSPF
//! protocol instance: the `areas` list, and the inter-area propagation
//! policies under `global` (ranges and filter lists).

/// Path to the OSPFv2 settings of one network instance.
pub fn ospf_uri(vrf: &str) -> String {
    format!(
        "data/openconfig-network-instance:network-instances/network-instance={}\
         /protocols/protocol=OSPF,ospfv2/ospfv2",
        vrf
    )
}

/// Path to one area of a network instance.
pub fn area_uri(vrf: &str, area_id: &str) -> String {
    format!("{}/areas/area={}", ospf_uri(vrf), area_id)
}

/// Path to the inter-area propagation policy of one area.
pub fn propagation_uri(vrf: &str, area_id: &str) -> String {
    format!(
        "{}/global/inter-area-propagation-policies/{}inter-area-policy={}",
        ospf_uri(vrf),
        OSPF_EXT,
        area_id
    )
}

/// Namespace prefix of the OSPFv2 vendor extension keys.
pub const OSPF_EXT: &str = "openconfig-ospfv2-ext:";

/// Wire key wrapping the per-VRF merge PATCH body.
pub const OSPF_DATA_KEY: &str = "openconfig-network-instance:ospfv2";

/// Wire key wrapping a virtual-links merge PATCH body.
pub const VLINKS_DATA_KEY: &str = "openconfig-network-instance:virtual-links";

/// Escapes an address prefix for use inside a path segment.
pub fn escape_prefix(prefix: &str) -> String {
    prefix.replace('/', "%2F")
}

/// Maps an authentication type to its REST enum value.
pub fn auth_type_to_rest(value: &str) -> Option<&'static str> {
    match value {
        "message_digest" => Some("MD5HMAC"),
        "text" => Some("TEXT"),
        "none" => Some("NONE"),
        _ => None,
    }
}

/// Field names in the config-tree schema.
pub mod fields {
    /// Area identifier in dotted-quad form (identity key).
    pub const AREA_ID: &str = "area_id";

    /// Owning network instance (identity key).
    pub const VRF_NAME: &str = "vrf_name";

    pub const AUTHENTICATION_TYPE: &str = "authentication_type";
    pub const DEFAULT_COST: &str = "default_cost";
    pub const SHORTCUT: &str = "shortcut";

    /// Stub sub-object.
    pub const STUB: &str = "stub";
    pub const ENABLED: &str = "enabled";
    pub const NO_SUMMARY: &str = "no_summary";

    /// Advertised network prefixes (scalar list, element is its own key).
    pub const NETWORKS: &str = "networks";

    /// Summarization ranges, part of the propagation policy.
    pub const RANGES: &str = "ranges";
    pub const PREFIX: &str = "prefix";
    pub const ADVERTISE: &str = "advertise";
    pub const COST: &str = "cost";
    pub const SUBSTITUTE: &str = "substitute";

    pub const FILTER_LIST_IN: &str = "filter_list_in";
    pub const FILTER_LIST_OUT: &str = "filter_list_out";

    /// Virtual links list.
    pub const VIRTUAL_LINKS: &str = "virtual_links";
    pub const ROUTER_ID: &str = "router_id";
    pub const DEAD_INTERVAL: &str = "dead_interval";
    pub const HELLO_INTERVAL: &str = "hello_interval";
    pub const RETRANSMIT_INTERVAL: &str = "retransmit_interval";
    pub const TRANSMIT_DELAY: &str = "transmit_delay";

    /// Virtual-link authentication sub-object.
    pub const AUTHENTICATION: &str = "authentication";
    pub const AUTH_TYPE: &str = "auth_type";
    pub const KEY: &str = "key";
    pub const KEY_ENCRYPTED: &str = "key_encrypted";

    /// Message digest key list of a virtual link.
    pub const MESSAGE_DIGEST_KEYS: &str = "message_digest_keys";
    pub const KEY_ID: &str = "key_id";
}
