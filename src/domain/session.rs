//! Request-scoped view of a user's session.

use serde_json::{Map, Value};

/// Session key for values that failed validation on a previous submission.
pub const ERROR_VALUES_KEY: &str = "errorValues";

/// Session state loaded for one request.
///
/// Handlers mutate the model freely; the web layer persists it afterwards
/// only when [`SessionModel::is_dirty`] reports a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionModel {
    values: Map<String, Value>,
    dirty: bool,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps values loaded from a store. The result starts clean.
    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            values,
            dirty: false,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
        self.dirty = true;
    }

    pub fn unset(&mut self, key: &str) -> Option<Value> {
        let removed = self.values.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loaded_model_is_clean() {
        let mut values = Map::new();
        values.insert("a".to_string(), json!(1));
        let model = SessionModel::from_values(values);
        assert!(!model.is_dirty());
        assert_eq!(model.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_set_marks_dirty() {
        let mut model = SessionModel::new();
        model.set("a", json!("x"));
        assert!(model.is_dirty());
    }

    #[test]
    fn test_unset_missing_key_stays_clean() {
        let mut model = SessionModel::new();
        assert_eq!(model.unset("missing"), None);
        assert!(!model.is_dirty());
    }
}
