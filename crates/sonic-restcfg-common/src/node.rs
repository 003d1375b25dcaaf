//! Configuration tree model.
//!
//! Desired and observed configuration are both held as [`ConfigNode`] trees:
//! a tagged union of scalar leaves, dict-like objects, and ordered lists.
//! The diff engine and the state handlers are schema-driven over this model,
//! so the same code serves flat and deeply nested features.
//!
//! Raw desired config arrives as JSON. [`ConfigNode::from_json`] strips
//! explicit nulls while converting, so an empty list or object can be used
//! to mean "clear this section" and is distinguishable from "not given".

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{RestCfgError, RestCfgResult};

/// A scalar configuration value.
///
/// Floats are deliberately not representable: identity keys must be
/// hashable and comparable, and device config schemas in this family only
/// carry booleans, integers, and strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    /// Converts to the JSON representation.
    pub fn to_json(&self) -> Json {
        match self {
            Scalar::Bool(b) => Json::Bool(*b),
            Scalar::Int(i) => Json::from(*i),
            Scalar::Str(s) => Json::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    /// Renders the value the way it is interpolated into REST paths.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// Field map of an object node.
pub type Fields = BTreeMap<String, ConfigNode>;

/// One node of a configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigNode {
    /// A scalar leaf.
    Scalar(Scalar),
    /// A dict-like sub-object.
    Object(Fields),
    /// An ordered list; elements are objects for keyed lists or scalars
    /// for value lists.
    List(Vec<ConfigNode>),
}

impl ConfigNode {
    /// Creates an empty object node.
    pub fn object() -> Self {
        ConfigNode::Object(Fields::new())
    }

    /// Creates an empty list node.
    pub fn list() -> Self {
        ConfigNode::List(Vec::new())
    }

    /// Parses raw JSON into a config tree, stripping explicit nulls.
    ///
    /// Returns `None` when the whole input is null. Floats and integers
    /// outside the `i64` range are rejected.
    pub fn from_json(raw: &Json) -> RestCfgResult<Option<Self>> {
        match raw {
            Json::Null => Ok(None),
            Json::Bool(b) => Ok(Some(ConfigNode::Scalar(Scalar::Bool(*b)))),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Some(ConfigNode::Scalar(Scalar::Int(i)))),
                None => Err(RestCfgError::unsupported_value(format!(
                    "number {} is not an integer in i64 range",
                    n
                ))),
            },
            Json::String(s) => Ok(Some(ConfigNode::Scalar(Scalar::Str(s.clone())))),
            Json::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(node) = Self::from_json(item)? {
                        list.push(node);
                    }
                }
                Ok(Some(ConfigNode::List(list)))
            }
            Json::Object(map) => {
                let mut fields = Fields::new();
                for (k, v) in map {
                    if let Some(node) = Self::from_json(v)? {
                        fields.insert(k.clone(), node);
                    }
                }
                Ok(Some(ConfigNode::Object(fields)))
            }
        }
    }

    /// Converts the tree back to JSON.
    pub fn to_json(&self) -> Json {
        match self {
            ConfigNode::Scalar(s) => s.to_json(),
            ConfigNode::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ConfigNode::List(items) => Json::Array(items.iter().map(|i| i.to_json()).collect()),
        }
    }

    /// Returns the scalar value, if this is a leaf.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ConfigNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the field map, if this is an object.
    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            ConfigNode::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the mutable field map, if this is an object.
    pub fn as_object_mut(&mut self) -> Option<&mut Fields> {
        match self {
            ConfigNode::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[ConfigNode]> {
        match self {
            ConfigNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mutable elements, if this is a list.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<ConfigNode>> {
        match self {
            ConfigNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean leaf.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer leaf.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigNode::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Looks up a field of an object node.
    pub fn get(&self, field: &str) -> Option<&ConfigNode> {
        self.as_object().and_then(|fields| fields.get(field))
    }

    /// Looks up a string field of an object node.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ConfigNode::as_str)
    }

    /// Looks up a boolean field of an object node.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(ConfigNode::as_bool)
    }

    /// Looks up an integer field of an object node.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(ConfigNode::as_i64)
    }

    /// Looks up a list field of an object node.
    pub fn get_list(&self, field: &str) -> Option<&[ConfigNode]> {
        self.get(field).and_then(ConfigNode::as_list)
    }

    /// True if an object node has the field.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of fields (object), elements (list), or 1 (scalar).
    ///
    /// Matches how the delete builders compare the breadth of a command
    /// against the breadth of current state.
    pub fn len(&self) -> usize {
        match self {
            ConfigNode::Scalar(_) => 1,
            ConfigNode::Object(fields) => fields.len(),
            ConfigNode::List(items) => items.len(),
        }
    }

    /// True for an empty object or list.
    pub fn is_empty(&self) -> bool {
        match self {
            ConfigNode::Scalar(_) => false,
            ConfigNode::Object(fields) => fields.is_empty(),
            ConfigNode::List(items) => items.is_empty(),
        }
    }
}

impl Serialize for ConfigNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl From<Scalar> for ConfigNode {
    fn from(v: Scalar) -> Self {
        ConfigNode::Scalar(v)
    }
}

impl From<bool> for ConfigNode {
    fn from(v: bool) -> Self {
        ConfigNode::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for ConfigNode {
    fn from(v: i64) -> Self {
        ConfigNode::Scalar(Scalar::Int(v))
    }
}

impl From<&str> for ConfigNode {
    fn from(v: &str) -> Self {
        ConfigNode::Scalar(Scalar::Str(v.to_string()))
    }
}

impl From<String> for ConfigNode {
    fn from(v: String) -> Self {
        ConfigNode::Scalar(Scalar::Str(v))
    }
}
