//! Pluggable value providers.
//!
//! A [`Source`] answers exactly one question: "what is the value at this
//! dotted name, if you have one?". How a provider interprets the name is its
//! own business. The bundled providers are:
//!
//! - [`StaticSource`]: an in-memory object
//! - [`EnvSource`]: one environment variable per dotted name
//! - [`FileSource`]: a JSON, YAML or TOML document
//!
//! [`ValueTree`](crate::ValueTree) also implements `Source`.

mod env;
mod file;
mod memory;

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;

pub use env::EnvSource;
pub use file::{FileFormat, FileSource};
pub use memory::StaticSource;

/// A provider of configuration values.
///
/// # Examples
///
/// ```
/// use layerconf::Source;
/// use serde_json::{json, Value};
///
/// struct Fixed;
///
/// impl Source for Fixed {
///     fn get(&self, name: &str) -> Option<Value> {
///         (name == "answer").then(|| json!(42))
///     }
/// }
///
/// assert_eq!(Fixed.get("answer"), Some(json!(42)));
/// assert_eq!(Fixed.get("question"), None);
/// ```
pub trait Source: Send + Sync {
    /// Look up `name`, returning `None` when this source has no value.
    fn get(&self, name: &str) -> Option<Value>;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn get(&self, name: &str) -> Option<Value> {
        (**self).get(name)
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn get(&self, name: &str) -> Option<Value> {
        (**self).get(name)
    }
}

/// Ordered, append-only list of sources behind one coarse lock.
#[derive(Default)]
pub struct SourceChain {
    sources: Mutex<Vec<Arc<dyn Source>>>,
}

impl SourceChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; it is consulted after every source added before it.
    pub fn push(&self, source: Arc<dyn Source>) {
        self.sources.lock().push(source);
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.lock().len()
    }

    /// Whether no source has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.lock().is_empty()
    }

    /// Hold the chain lock for a scan.
    ///
    /// While the returned guard lives no source can be appended and no other
    /// caller can scan.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Source>>> {
        self.sources.lock()
    }
}

impl fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceChain")
            .field("len", &self.len())
            .finish()
    }
}

/// Return the value from the first source in `sources` that has `name`,
/// along with that source's position.
pub(crate) fn first_match(sources: &[Arc<dyn Source>], name: &str) -> Option<(usize, Value)> {
    sources
        .iter()
        .enumerate()
        .find_map(|(index, source)| source.get(name).map(|value| (index, value)))
}
