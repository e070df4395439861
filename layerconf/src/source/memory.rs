//! In-memory source.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::source::Source;
use crate::tree::{kind_of, ValueTree};

/// A source backed by a fixed object.
///
/// Dotted names address into nested objects, so a static object
/// `{"server": {"http": {"port": 9000}}}` answers `server`, `server.http`
/// and `server.http.port`.
///
/// # Examples
///
/// ```
/// use layerconf::{Source, StaticSource};
/// use serde_json::json;
///
/// let source = StaticSource::new(json!({"server": {"http": {"port": 9000}}})).unwrap();
/// assert_eq!(source.get("server.http.port"), Some(json!(9000)));
/// assert_eq!(source.get("server.batch"), None);
/// ```
#[derive(Debug)]
pub struct StaticSource {
    tree: ValueTree,
}

impl StaticSource {
    /// Creates a source from an object value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `value` is not an object, or
    /// [`Error::InvalidName`] if any key violates the name grammar.
    pub fn new(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Self {
                tree: ValueTree::from_object("static", object)?,
            }),
            other => Err(Error::TypeMismatch {
                name: "static".to_string(),
                expected: "object",
                found: kind_of(&other),
            }),
        }
    }

    /// Creates a source that never has a value.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tree: ValueTree::new("static"),
        }
    }
}

impl Source for StaticSource {
    fn get(&self, name: &str) -> Option<Value> {
        self.tree.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        let err = StaticSource::new(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: "array", .. }));
    }

    #[test]
    fn test_null_member_is_found() {
        let source = StaticSource::new(json!({"server": {"http": null}})).unwrap();
        assert_eq!(source.get("server"), Some(json!({"http": null})));
        assert_eq!(source.get("server.http"), Some(Value::Null));
    }

    #[test]
    fn test_empty_has_nothing() {
        assert_eq!(StaticSource::empty().get("anything"), None);
    }
}
