//! Typed decoding of resolved values.
//!
//! A record type declares its shape with `serde::Deserialize`; field to key
//! mapping uses the usual serde attributes. After decoding, the record's
//! [`Validate`] hook runs and may normalize the record in place.
//!
//! # Examples
//!
//! ```
//! use layerconf::{Resolver, Validate, ValidationResult};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct HttpServerConfig {
//!     #[serde(default)]
//!     address: String,
//!     #[serde(default)]
//!     port: i64,
//! }
//!
//! impl Validate for HttpServerConfig {
//!     fn validate(&mut self) -> ValidationResult {
//!         if self.port == 0 {
//!             self.port = 8000;
//!         }
//!         if self.port < 0 {
//!             return Err(format!("negative port:{}", self.port).into());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let resolver = Resolver::new();
//! resolver.set_default("server.http", json!({"port": 0})).unwrap();
//!
//! let http: HttpServerConfig = resolver.get_struct("server.http").unwrap();
//! assert_eq!(http.port, 8000);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::resolver::Resolver;

/// Outcome of a [`Validate::validate`] call.
pub type ValidationResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Post-decode check for configuration records.
///
/// The default implementation accepts everything, so a record without
/// rules only needs an empty `impl Validate for MyRecord {}`. Changes made
/// to `self` inside `validate` are kept in the returned record; an
/// implementation that only inspects `self` leaves it unchanged.
pub trait Validate {
    /// Check, and optionally normalize, a freshly decoded record.
    ///
    /// # Errors
    ///
    /// Returns a description of why the record is unacceptable.
    fn validate(&mut self) -> ValidationResult {
        Ok(())
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&mut self) -> ValidationResult {
        (**self).validate()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&mut self) -> ValidationResult {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&mut self) -> ValidationResult {
        self.iter_mut().try_for_each(Validate::validate)
    }
}

/// Decode `value` into `T` and run its validation hook.
///
/// `name` is only used for error reporting.
///
/// # Errors
///
/// Returns [`Error::Decode`] on a structural mismatch and
/// [`Error::Validation`] if the hook rejects the record.
pub fn decode<T>(name: &str, value: Value) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let mut record: T = serde_json::from_value(value).map_err(|e| Error::Decode {
        name: name.to_string(),
        target: std::any::type_name::<T>(),
        message: e.to_string(),
    })?;

    record.validate().map_err(|source| Error::Validation {
        name: name.to_string(),
        source,
    })?;

    Ok(record)
}

impl Resolver {
    /// Resolve `name` and decode it into a validated record.
    ///
    /// Using `Box<T>` as the target yields a boxed record.
    ///
    /// # Errors
    ///
    /// - [`Error::NotDefined`] if nothing defines `name`
    /// - [`Error::Decode`] on a structural mismatch
    /// - [`Error::Validation`] if the record rejects itself
    /// - any error from [`Resolver::get`]
    pub fn get_struct<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let value = self.require(name)?;
        decode(name, value)
    }
}
