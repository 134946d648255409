//! Decoded response tree with namespace-tolerant lookup
//!
//! YANG JSON encoding qualifies top-level members with their module
//! (`Cisco-IOS-XE-native:hostname`, `ietf-ip:ipv4`). Lookups here match
//! on the local name so callers never spell out module prefixes.

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Document for a node the device reported as absent
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Descend by local member names. A list met on the way is entered at its first entry.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let mut node = &self.0;
        for name in path {
            node = member(first_entry(node)?, name)?;
        }
        Some(node)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Object member by local name, ignoring any `module:` prefix
pub fn member<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    let map = node.as_object()?;
    if let Some(value) = map.get(name) {
        return Some(value);
    }
    map.iter()
        .find(|(key, _)| {
            key.rsplit_once(':')
                .is_some_and(|(_, local)| local == name)
        })
        .map(|(_, value)| value)
}

/// List entries; a single object is treated as a one-entry list
pub fn entries(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![node],
        _ => Vec::new(),
    }
}

fn first_entry(node: &Value) -> Option<&Value> {
    match node {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_ignores_module_prefix() {
        let doc = Document::new(json!({"Cisco-IOS-XE-native:hostname": "sw1"}));
        assert_eq!(doc.lookup(&["hostname"]), Some(&json!("sw1")));
        assert_eq!(doc.lookup(&["native"]), None);
    }

    #[test]
    fn test_lookup_enters_first_list_entry() {
        let doc = Document::new(json!({
            "ietf-interfaces:interface": [{
                "name": "GigabitEthernet1/0/1",
                "ietf-ip:ipv4": {"address": [{"ip": "10.1.1.1"}, {"ip": "10.1.1.2"}]}
            }]
        }));
        assert_eq!(
            doc.lookup(&["interface", "ipv4", "address", "ip"]),
            Some(&json!("10.1.1.1"))
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(Document::empty().is_empty());
        assert!(Document::new(json!({})).is_empty());
        assert!(!Document::new(json!({"a": 1})).is_empty());
    }

    #[test]
    fn test_entries_of_single_object() {
        let node = json!({"name": "x"});
        assert_eq!(entries(&node).len(), 1);
        assert!(entries(&json!("x")).is_empty());
    }
}
