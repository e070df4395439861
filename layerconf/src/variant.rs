//! Selecting one of several record shapes by a single-key object.
//!
//! A name configured for variant selection resolves to an object with
//! exactly one key. That key (the discriminator) picks the record type, and
//! its value is decoded into that type:
//!
//! ```yaml
//! server:
//!   http:
//!     port: 9000
//! ```
//!
//! Two or more keys mean no selection was made, which is an error rather
//! than an arbitrary pick. This matters when defaults are declared for every
//! variant: unless a source narrows the object down to one key, resolution
//! fails.
//!
//! # Examples
//!
//! ```
//! use layerconf::{Resolver, StaticSource, Validate, Variants};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct HttpConfig { port: u16 }
//! impl Validate for HttpConfig {}
//!
//! #[derive(Debug, Deserialize)]
//! struct BatchConfig { filename: String }
//! impl Validate for BatchConfig {}
//!
//! #[derive(Debug)]
//! enum Server {
//!     Http(HttpConfig),
//!     Batch(BatchConfig),
//! }
//!
//! let resolver = Resolver::new();
//! resolver.add_source(StaticSource::new(json!({"server": {"http": {"port": 9000}}})).unwrap());
//!
//! let variants = Variants::new()
//!     .variant("http", Server::Http)
//!     .variant("batch", Server::Batch);
//!
//! let (named, server) = resolver.get_named_struct("server", &variants).unwrap();
//! assert_eq!(named, "http");
//! assert!(matches!(server, Server::Http(HttpConfig { port: 9000 })));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::decode::{decode, Validate};
use crate::error::{Error, Result};
use crate::name;
use crate::resolver::Resolver;
use crate::tree::kind_of;

type DecodeFn<T> = Box<dyn Fn(&str, Value) -> Result<T> + Send + Sync>;

/// Mapping from discriminator to the record type it selects.
///
/// Every record type is converted into the common output type `T`, which is
/// typically an enum over the variants or a boxed trait object.
pub struct Variants<T> {
    entries: BTreeMap<String, DecodeFn<T>>,
}

impl<T: 'static> Variants<T> {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register record type `C` under `discriminator`.
    ///
    /// Registering the same discriminator twice keeps the later entry.
    #[must_use]
    pub fn variant<C, F>(mut self, discriminator: impl Into<String>, convert: F) -> Self
    where
        C: DeserializeOwned + Validate + 'static,
        F: Fn(C) -> T + Send + Sync + 'static,
    {
        let decode_fn: DecodeFn<T> =
            Box::new(move |name: &str, value: Value| decode::<C>(name, value).map(&convert));
        self.entries.insert(discriminator.into(), decode_fn);
        self
    }

    /// Recognized discriminators, in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Decode `value` with the template registered for `selected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSource`] if nothing is registered for
    /// `selected`, otherwise any error from decoding.
    pub fn decode(&self, name: &str, selected: &str, value: Value) -> Result<T> {
        let decode_fn = self.entries.get(selected).ok_or_else(|| Error::UnknownSource {
            name: name.to_string(),
            selected: selected.to_string(),
            expected: self.names(),
        })?;
        decode_fn(&name::join(name, selected), value)
    }
}

impl<T: 'static> Default for Variants<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Variants<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variants")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Resolver {
    /// Resolve `name` as a one-key object and return that key and its value.
    ///
    /// # Errors
    ///
    /// - [`Error::NotDefined`] if nothing defines `name` or the object is
    ///   empty
    /// - [`Error::TypeMismatch`] if the value is not an object
    /// - [`Error::AmbiguousSelection`] if the object has several keys
    /// - any error from [`Resolver::get`]
    pub fn get_named(&self, name: &str) -> Result<(String, Value)> {
        let object = match self.require(name)? {
            Value::Object(object) => object,
            other => {
                return Err(Error::TypeMismatch {
                    name: name.to_string(),
                    expected: "object",
                    found: kind_of(&other),
                })
            }
        };

        let mut entries = object.into_iter();
        match (entries.next(), entries.next()) {
            (Some((selected, value)), None) => Ok((selected, value)),
            (None, _) => Err(Error::NotDefined {
                name: name.to_string(),
            }),
            (Some((first, _)), Some((second, _))) => {
                let mut keys = vec![first, second];
                keys.extend(entries.map(|(key, _)| key));
                Err(Error::AmbiguousSelection {
                    name: name.to_string(),
                    keys,
                })
            }
        }
    }

    /// Resolve a one-key object and decode its value with the matching
    /// template from `variants`.
    ///
    /// Returns the discriminator together with the decoded record.
    ///
    /// # Errors
    ///
    /// Any error from [`Resolver::get_named`], [`Error::UnknownSource`] for
    /// an unrecognized discriminator, and decode or validation errors.
    pub fn get_named_struct<T: 'static>(
        &self,
        name: &str,
        variants: &Variants<T>,
    ) -> Result<(String, T)> {
        let (selected, value) = self.get_named(name)?;
        let record = variants.decode(name, &selected, value)?;
        Ok((selected, record))
    }
}
