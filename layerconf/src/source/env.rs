//! Environment variable source.

use std::env;

use serde_json::Value;

use crate::source::Source;

/// Reads each dotted name as one literal environment variable.
///
/// The name is not split or case-mapped: `server.http.port` looks up the
/// variable `server.http.port` (after the optional prefix). An unset or
/// empty variable counts as "not found". Values are always strings; the
/// typed accessors on [`Resolver`](crate::Resolver) coerce them.
///
/// # Examples
///
/// ```no_run
/// use layerconf::{EnvSource, Source};
///
/// let source = EnvSource::with_prefix("APP_");
/// // Looks up APP_port
/// let port = source.get("port");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    /// Creates a source without a prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that prepends `prefix` to every name.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The variable name looked up for `name`.
    #[must_use]
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }
}

impl Source for EnvSource {
    fn get(&self, name: &str) -> Option<Value> {
        let key = self.key(name);
        match env::var(&key) {
            Ok(value) if !value.is_empty() => {
                log::debug!("env {key}=\"{value}\"");
                Some(Value::String(value))
            }
            _ => None,
        }
    }
}
