//! REST request representation.
//!
//! A reconciliation run produces an ordered list of [`Request`]s. Order is
//! significant: child resources are deleted before their ancestors (unless
//! the ancestor delete is known to clear them), and parent resources are
//! created before requests that reference them.

use serde::Serialize;
use serde_json::Value as Json;

/// HTTP method of a device request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Patch,
    Put,
    Delete,
}

impl Method {
    /// Returns the method as the wire verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A single REST operation against the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    /// API resource path with interpolated keys.
    pub path: String,
    /// HTTP method.
    pub method: Method,
    /// Request body in device wire format, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Json>,
}

impl Request {
    /// Creates a PATCH request.
    pub fn patch(path: impl Into<String>, body: Json) -> Self {
        Self {
            path: path.into(),
            method: Method::Patch,
            body: Some(body),
        }
    }

    /// Creates a PUT request.
    pub fn put(path: impl Into<String>, body: Json) -> Self {
        Self {
            path: path.into(),
            method: Method::Put,
            body: Some(body),
        }
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Delete,
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Put.as_str(), "PUT");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_delete_has_no_body() {
        let req = Request::delete("data/openconfig-sampling-sflow:sampling/sflow/config/agent");
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.body, None);
    }

    #[test]
    fn test_request_serialization() {
        let req = Request::put(
            "data/openconfig-sampling-sflow:sampling/sflow/config/enabled",
            json!({"openconfig-sampling-sflow:enabled": false}),
        );
        let serialized = serde_json::to_value(&req).unwrap();
        assert_eq!(
            serialized,
            json!({
                "path": "data/openconfig-sampling-sflow:sampling/sflow/config/enabled",
                "method": "PUT",
                "body": {"openconfig-sampling-sflow:enabled": false},
            })
        );
    }
}
