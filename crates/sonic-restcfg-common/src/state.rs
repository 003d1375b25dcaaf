//! Reconciliation states and command tagging.
//!
//! A [`Command`] is a fragment of configuration (a projection of either the
//! desired or the current tree) tagged with the state that produced it.
//! Commands are the audit-readable half of a reconciliation result; the
//! request list is the executable half, and the two are kept in lockstep by
//! the state handlers.

use serde::Serialize;

use crate::diff::diff;
use crate::error::RestCfgResult;
use crate::keys::{entity_key, index_by_key, key_fields_for, KeySpec, ROOT_FIELD};
use crate::node::ConfigNode;

/// The four reconciliation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Merge desired settings into current configuration.
    Merged,
    /// Replace matching entities wholesale, leave unmentioned ones alone.
    Replaced,
    /// Make the device match the desired configuration exactly.
    Overridden,
    /// Delete the specified (or all) configuration.
    Deleted,
}

impl State {
    /// Returns the state name as reported in command lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Merged => "merged",
            State::Replaced => "replaced",
            State::Overridden => "overridden",
            State::Deleted => "deleted",
        }
    }
}

/// An action-tagged configuration fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// The state that produced this fragment.
    pub state: State,
    /// The configuration subset being acted on.
    pub config: ConfigNode,
}

impl Command {
    /// Creates a command.
    pub fn new(state: State, config: ConfigNode) -> Self {
        Self { state, config }
    }
}

/// Tags a batch of configuration fragments with a state.
pub fn update_states(configs: Vec<ConfigNode>, state: State) -> Vec<Command> {
    configs
        .into_iter()
        .map(|config| Command::new(state, config))
        .collect()
}

/// Entity-level change plan for the `replaced` and `overridden` states.
///
/// `to_delete` entities are scheduled for whole-entity deletion (projections
/// of current state), `to_add` for re-creation or incremental addition
/// (projections of desired state).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EntityPlan {
    pub to_delete: Vec<ConfigNode>,
    pub to_add: Vec<ConfigNode>,
}

impl EntityPlan {
    /// True when the plan contains no changes.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

/// Compares one desired entity with its current counterpart.
///
/// Replace semantics are entity-granular: any attribute existing only on
/// the device forces delete-then-recreate of the whole entity; pure
/// additions merge incrementally.
fn compare_entity(
    want: &ConfigNode,
    have: &ConfigNode,
    specs: &[KeySpec],
    plan: &mut EntityPlan,
) -> RestCfgResult<()> {
    let want_list = ConfigNode::List(vec![want.clone()]);
    let have_list = ConfigNode::List(vec![have.clone()]);
    let to_remove = diff(&have_list, &want_list, specs)?;
    if !to_remove.is_empty() {
        plan.to_delete.push(have.clone());
        plan.to_add.push(want.clone());
        return Ok(());
    }
    let to_add = diff(&want_list, &have_list, specs)?;
    if !to_add.is_empty() {
        plan.to_add.push(want.clone());
    }
    Ok(())
}

/// Plans the `replaced` state over top-level keyed entities.
///
/// Entities present only in `want` are pure adds; entities present in both
/// follow the compare-and-replace-or-add rule. Entities present only on the
/// device are left untouched.
pub fn plan_replaced(
    want: &[ConfigNode],
    have: &[ConfigNode],
    specs: &[KeySpec],
) -> RestCfgResult<EntityPlan> {
    let root_keys = key_fields_for(specs, ROOT_FIELD);
    let have_index = index_by_key(have, ROOT_FIELD, root_keys)?;

    let mut plan = EntityPlan::default();
    for entity_w in want {
        let key = entity_key(entity_w, ROOT_FIELD, root_keys)?;
        match have_index.get(&key) {
            None => plan.to_add.push(entity_w.clone()),
            Some(entity_h) => compare_entity(entity_w, entity_h, specs, &mut plan)?,
        }
    }
    Ok(plan)
}

/// Plans the `overridden` state over top-level keyed entities.
///
/// The union of entity keys is walked: device-only entities are deleted (in
/// device order), desired-only entities are added (in desired order), and
/// entities present in both follow the compare-and-replace-or-add rule.
pub fn plan_overridden(
    want: &[ConfigNode],
    have: &[ConfigNode],
    specs: &[KeySpec],
) -> RestCfgResult<EntityPlan> {
    let root_keys = key_fields_for(specs, ROOT_FIELD);
    let want_index = index_by_key(want, ROOT_FIELD, root_keys)?;
    let have_index = index_by_key(have, ROOT_FIELD, root_keys)?;

    let mut plan = EntityPlan::default();
    for entity_h in have {
        let key = entity_key(entity_h, ROOT_FIELD, root_keys)?;
        if !want_index.contains_key(&key) {
            plan.to_delete.push(entity_h.clone());
        }
    }
    for entity_w in want {
        let key = entity_key(entity_w, ROOT_FIELD, root_keys)?;
        match have_index.get(&key) {
            None => plan.to_add.push(entity_w.clone()),
            Some(entity_h) => compare_entity(entity_w, entity_h, specs, &mut plan)?,
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(raw: serde_json::Value) -> ConfigNode {
        ConfigNode::from_json(&raw).unwrap().unwrap()
    }

    fn entities(raw: serde_json::Value) -> Vec<ConfigNode> {
        node(raw).as_list().unwrap().to_vec()
    }

    const SPECS: &[KeySpec] = &[KeySpec {
        field: ROOT_FIELD,
        key_fields: &["area_id", "vrf_name"],
    }];

    #[test]
    fn test_state_as_str() {
        assert_eq!(State::Merged.as_str(), "merged");
        assert_eq!(State::Deleted.as_str(), "deleted");
    }

    #[test]
    fn test_command_serializes_state_lowercase() {
        let cmd = Command::new(State::Overridden, node(json!({"vrf_name": "default"})));
        let serialized = serde_json::to_value(&cmd).unwrap();
        assert_eq!(serialized["state"], json!("overridden"));
    }

    #[test]
    fn test_plan_replaced_differing_entity_is_delete_then_add() {
        let want = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let have = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 20},
            {"area_id": "0.0.0.9", "vrf_name": "default", "shortcut": "enable"},
        ]));
        let plan = plan_replaced(&want, &have, SPECS).unwrap();
        // Unmentioned area 0.0.0.9 is untouched.
        assert_eq!(plan.to_delete, vec![have[0].clone()]);
        assert_eq!(plan.to_add, vec![want[0].clone()]);
    }

    #[test]
    fn test_plan_replaced_pure_addition_merges() {
        let want = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10, "shortcut": "enable"},
        ]));
        let have = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let plan = plan_replaced(&want, &have, SPECS).unwrap();
        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.to_add, vec![want[0].clone()]);
    }

    #[test]
    fn test_plan_replaced_identical_entity_is_noop() {
        let want = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let plan = plan_replaced(&want, &want.clone(), SPECS).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_overridden_deletes_unmentioned_entities() {
        let want = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let have = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
            {"area_id": "0.0.0.9", "vrf_name": "default", "shortcut": "enable"},
        ]));
        let plan = plan_overridden(&want, &have, SPECS).unwrap();
        assert_eq!(plan.to_delete, vec![have[1].clone()]);
        assert!(plan.to_add.is_empty());
    }

    #[test]
    fn test_plan_overridden_union_matches_merged_plus_deleted() {
        // Entities touched by overridden are exactly the union of what
        // deleted (device-only) and merged (desired) would touch.
        let want = entities(json!([
            {"area_id": "0.0.0.2", "vrf_name": "default", "default_cost": 5},
        ]));
        let have = entities(json!([
            {"area_id": "0.0.0.1", "vrf_name": "default", "default_cost": 10},
        ]));
        let plan = plan_overridden(&want, &have, SPECS).unwrap();
        assert_eq!(plan.to_delete, vec![have[0].clone()]);
        assert_eq!(plan.to_add, vec![want[0].clone()]);
    }
}
