//! Event wrapper with dot-notation field access.
//!
//! Wazuh-decoded events carry fields under nested objects such as
//! `win.eventdata.commandLine`; sample logs sometimes keep the dotted name
//! as a flat key. Flat keys take precedence over nested traversal.

use serde_json::Value;

/// A reference to a JSON event for field lookup during verification.
#[derive(Debug)]
pub struct Event<'a> {
    inner: &'a Value,
}

impl<'a> Event<'a> {
    /// Wrap a JSON value as an event.
    pub fn from_value(value: &'a Value) -> Self {
        Event { inner: value }
    }

    /// Resolve a field by name.
    ///
    /// Checks for the exact key first, then falls back to dot-separated
    /// traversal. When a path segment yields an array, each element is
    /// tried and the first one that resolves the rest of the path wins.
    pub fn get_field(&self, path: &str) -> Option<&'a Value> {
        if let Some(obj) = self.inner.as_object()
            && let Some(v) = obj.get(path)
        {
            return Some(v);
        }

        if path.contains('.') {
            let parts: Vec<&str> = path.split('.').collect();
            return traverse(self.inner, &parts);
        }

        None
    }

    /// Access the underlying JSON value.
    pub fn as_value(&self) -> &'a Value {
        self.inner
    }
}

fn traverse<'a>(current: &'a Value, parts: &[&str]) -> Option<&'a Value> {
    if parts.is_empty() {
        return Some(current);
    }

    match current {
        Value::Object(map) => {
            let next = map.get(parts[0])?;
            traverse(next, &parts[1..])
        }
        Value::Array(arr) => arr.iter().find_map(|item| traverse(item, parts)),
        _ => None,
    }
}
