//! Builder for a fully wired [`Resolver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::resolver::Resolver;
use crate::source::{EnvSource, FileSource, Source};

enum PendingSource {
    Ready(Arc<dyn Source>),
    File(PathBuf),
}

/// Builder for a [`Resolver`].
///
/// Sources are registered in the order the builder methods are called, so
/// the first one added is consulted first. Files are loaded by
/// [`ResolverBuilder::build`].
///
/// # Examples
///
/// ```
/// use layerconf::{ResolverBuilder, StaticSource};
/// use serde_json::json;
///
/// let resolver = ResolverBuilder::new()
///     .with_default("server.http", json!({"port": 8000, "address": "localhost"}))
///     .with_source(StaticSource::new(json!({"server": {"http": {"port": 9000}}})).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(resolver.get_int("server.http.port").unwrap(), Some(9000));
/// assert_eq!(
///     resolver.get_string("server.http.address").unwrap(),
///     Some("localhost".to_string())
/// );
/// ```
#[derive(Default)]
pub struct ResolverBuilder {
    defaults: Vec<(String, Value)>,
    sources: Vec<PendingSource>,
}

impl ResolverBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default value.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((name.into(), value.into()));
        self
    }

    /// Append a source.
    #[must_use]
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(PendingSource::Ready(Arc::new(source)));
        self
    }

    /// Append a configuration file, loaded at build time.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources
            .push(PendingSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Append an environment source without a prefix.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_source(EnvSource::new())
    }

    /// Append an environment source that prepends `prefix` to every name.
    #[must_use]
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_source(EnvSource::with_prefix(prefix))
    }

    /// Build the resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if a default cannot be registered or a file cannot
    /// be loaded.
    pub fn build(self) -> Result<Resolver> {
        let resolver = Resolver::new();

        for (name, value) in self.defaults {
            resolver.set_default(&name, value)?;
        }

        for pending in self.sources {
            let source = match pending {
                PendingSource::Ready(source) => source,
                PendingSource::File(path) => Arc::new(FileSource::load(&path)?),
            };
            resolver.add_shared_source(source);
        }

        Ok(resolver)
    }
}
