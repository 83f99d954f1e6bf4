use std::fmt;

use serde::{Deserialize, Serialize};

/// Default namespace watched for operator-facing values.
pub const SMART_DASHBOARD_PREFIX: &str = "/SmartDashboard/";

/// A table key with its namespace prefix stripped; the identity a control
/// registry binds controls to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyName(pub String);

impl PropertyName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// The key prefix marking values intended for operator display and editing.
///
/// Keys outside the namespace are technical and never synthesized into
/// controls, though fixed single-key widgets may still observe them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    prefix: String,
}

impl Namespace {
    /// Builds a namespace, normalizing to the `/Name/` shape keys use.
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn smart_dashboard() -> Self {
        Self::new(SMART_DASHBOARD_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// True iff `key` belongs to this namespace.
    pub fn contains(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }

    /// Strips the prefix, yielding the property name. `None` for keys outside
    /// the namespace, so malformed keys never reach a strip step.
    pub fn strip(&self, key: &str) -> Option<PropertyName> {
        key.strip_prefix(&self.prefix)
            .filter(|rest| !rest.is_empty())
            .map(|rest| PropertyName(rest.to_string()))
    }

    /// Rebuilds the fully-qualified key for a property name.
    pub fn qualify(&self, name: &PropertyName) -> String {
        format!("{}{}", self.prefix, name.0)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::smart_dashboard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_and_requalifies_in_namespace_keys() {
        let namespace = Namespace::smart_dashboard();
        let name = namespace.strip("/SmartDashboard/maxSpeed").expect("in scope");
        assert_eq!(name.as_str(), "maxSpeed");
        assert_eq!(namespace.qualify(&name), "/SmartDashboard/maxSpeed");
    }

    #[test]
    fn rejects_out_of_scope_and_degenerate_keys() {
        let namespace = Namespace::smart_dashboard();
        assert!(!namespace.contains("/robot/internal_tick"));
        assert_eq!(namespace.strip("/robot/internal_tick"), None);
        assert_eq!(namespace.strip("/SmartDashboard"), None);
        assert_eq!(namespace.strip("/SmartDashboard/"), None);
    }

    #[test]
    fn normalizes_prefix_shape() {
        let namespace = Namespace::new("SmartDashboard");
        assert_eq!(namespace.prefix(), "/SmartDashboard/");
        assert!(namespace.contains("/SmartDashboard/time"));
    }

    #[test]
    fn nested_property_names_keep_their_path() {
        let namespace = Namespace::smart_dashboard();
        let name = namespace.strip("/SmartDashboard/drive/kP").expect("in scope");
        assert_eq!(name.as_str(), "drive/kP");
    }
}
