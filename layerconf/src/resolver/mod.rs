//! Name resolution across the cache, the source chain and the defaults.
//!
//! A [`Resolver`] owns three pieces of process-scoped state:
//!
//! 1. the resolution cache, one frozen entry per name ever resolved
//! 2. the [`SourceChain`], consulted in registration order
//! 3. the defaults registry, consulted last
//!
//! # Resolution Order
//!
//! For a requested name:
//!
//! 1. A cached value is returned as is.
//! 2. Otherwise the first source that has the name wins. When both that
//!    value and the default at the same name are objects, the source's
//!    top-level keys are laid over the default object.
//! 3. Otherwise the default is used.
//!
//! Whatever is found is written to the cache and frozen before it is
//! returned, so every later read of the name yields the same value.
//!
//! # Examples
//!
//! ```
//! use layerconf::{Resolver, StaticSource};
//! use serde_json::json;
//!
//! let resolver = Resolver::new();
//! resolver.set_default("abc", 123).unwrap();
//! resolver
//!     .set_default("server.http", json!({"port": 8000, "address": "localhost"}))
//!     .unwrap();
//! resolver.add_source(StaticSource::new(json!({"server": {"http": {"port": 9000}}})).unwrap());
//!
//! assert_eq!(resolver.get_int("abc").unwrap(), Some(123));
//! assert_eq!(
//!     resolver.get("server.http").unwrap(),
//!     Some(json!({"port": 9000, "address": "localhost"}))
//! );
//! ```

mod builder;
mod coerce;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::name;
use crate::source::{first_match, Source, SourceChain};
use crate::tree::{merge_objects, ValueTree};

pub use builder::ResolverBuilder;

/// Layered configuration resolver.
///
/// Construct one at process start and share it by reference (or `Arc`).
/// Independent instances never see each other's state.
#[derive(Debug)]
pub struct Resolver {
    defaults: ValueTree,
    defined: ValueTree,
    sources: SourceChain,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver with no defaults and no sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: ValueTree::new("defaults"),
            defined: ValueTree::new("defined"),
            sources: SourceChain::new(),
        }
    }

    /// Returns a builder for configuring a resolver.
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Register a default used when no source has the name.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyDefined`] if the name was already resolved or a
    ///   default is already present there
    /// - [`Error::Locked`] if the name falls beneath a resolved branch
    /// - [`Error::InvalidName`] for a malformed name or object key
    pub fn set_default(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        name::split(name)?;
        // Ordered against first resolutions, which read the defaults under
        // the same lock.
        let _sources = self.sources.lock();
        if self.defined.get(name).is_some() {
            return Err(Error::AlreadyDefined {
                name: name.to_string(),
            });
        }
        if self.defined.is_locked_at(name) {
            return Err(Error::Locked {
                name: name.to_string(),
            });
        }
        self.defaults.set(name, value.into())
    }

    /// Register a serializable record as the default for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the record cannot be represented as a
    /// value, otherwise the same errors as [`Resolver::set_default`].
    pub fn set_default_record<T: Serialize>(&self, name: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record).map_err(|e| Error::Decode {
            name: name.to_string(),
            target: std::any::type_name::<T>(),
            message: e.to_string(),
        })?;
        self.set_default(name, value)
    }

    /// Append a source to the chain.
    ///
    /// Names that were already resolved keep their cached value.
    pub fn add_source(&self, source: impl Source + 'static) {
        self.sources.push(Arc::new(source));
    }

    /// Append an already shared source to the chain.
    pub fn add_shared_source(&self, source: Arc<dyn Source>) {
        self.sources.push(source);
    }

    /// Number of registered sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Resolve `name`, returning `Ok(None)` when nothing defines it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for a malformed name
    /// - [`Error::Locked`] if the name lies beneath a resolved branch that
    ///   does not contain it, so the new value cannot be cached
    pub fn get(&self, name: &str) -> Result<Option<Value>> {
        name::split(name)?;
        if let Some(value) = self.cached(name)? {
            log::debug!("{name}: cached");
            return Ok(Some(value));
        }

        let sources = self.sources.lock();
        // Another caller may have resolved the name while we waited.
        if let Some(value) = self.cached(name)? {
            log::debug!("{name}: cached");
            return Ok(Some(value));
        }

        if let Some((index, value)) = first_match(&sources, name) {
            log::debug!("{name}: found in source #{index}");
            let value = self.overlay_default(name, value)?;
            return self.define(name, value).map(Some);
        }

        if let Some(value) = self.defaults.get(name) {
            log::debug!("{name}: using default");
            return self.define(name, value).map(Some);
        }

        log::debug!("{name}: not defined");
        Ok(None)
    }

    /// Resolve `name`, failing with [`Error::NotDefined`] when absent.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`], plus [`Error::NotDefined`].
    pub fn require(&self, name: &str) -> Result<Value> {
        self.get(name)?.ok_or_else(|| Error::NotDefined {
            name: name.to_string(),
        })
    }

    /// Resolve `name` as an integer.
    ///
    /// Integers are returned directly; anything else is formatted as text
    /// and parsed, so the string `"8000"` yields `8000`.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`], plus [`Error::TypeMismatch`] if the
    /// value cannot be read as an integer.
    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        self.get(name)?
            .map(|value| coerce::to_int(name, &value))
            .transpose()
    }

    /// Resolve `name` as a float.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`], plus [`Error::TypeMismatch`] if the
    /// value cannot be read as a number.
    pub fn get_float(&self, name: &str) -> Result<Option<f64>> {
        self.get(name)?
            .map(|value| coerce::to_float(name, &value))
            .transpose()
    }

    /// Resolve `name` as a boolean.
    ///
    /// Accepts booleans and the strings true/1/yes/on and false/0/no/off
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`], plus [`Error::TypeMismatch`] if the
    /// value cannot be read as a boolean.
    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)?
            .map(|value| coerce::to_bool(name, &value))
            .transpose()
    }

    /// Resolve `name` as a string. Non-string values are formatted.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`].
    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        Ok(self.get(name)?.map(|value| coerce::to_string(&value)))
    }

    fn cached(&self, name: &str) -> Result<Option<Value>> {
        match self.defined.get_and_lock(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_defined() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Lay an object from a source over an object default at the same name.
    fn overlay_default(&self, name: &str, value: Value) -> Result<Value> {
        let overlay = match value {
            Value::Object(overlay) => overlay,
            other => return Ok(other),
        };
        match self.defaults.get(name) {
            Some(Value::Object(base)) => {
                log::debug!("{name}: merging source over defaults");
                merge_objects(base, overlay).map(Value::Object)
            }
            _ => Ok(Value::Object(overlay)),
        }
    }

    /// Cache `value` under `name` and hand back the frozen copy.
    fn define(&self, name: &str, value: Value) -> Result<Value> {
        self.defined.set(name, value)?;
        self.defined.get_and_lock(name)
    }
}
