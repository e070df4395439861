//! Error types for the layerconf library.
//!
//! Every fallible operation in the crate reports one of these variants to
//! its caller. A lookup miss is not an error for [`Resolver::get`]; it
//! only becomes [`Error::NotDefined`] where a value is required.
//!
//! [`Resolver::get`]: crate::Resolver::get

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a layerconf error.
///
/// # Examples
///
/// ```
/// use layerconf::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(8080)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the layerconf library.
#[derive(Debug, Error)]
pub enum Error {
    /// A name segment does not match the name grammar.
    #[error("invalid name \"{segment}\" in \"{name}\"")]
    InvalidName {
        /// The offending segment.
        segment: String,
        /// The full dotted name that contained it.
        name: String,
    },

    /// A value is already present at the name and cannot be replaced.
    #[error("{name} is already defined")]
    AlreadyDefined {
        /// The dotted name that already holds a value.
        name: String,
    },

    /// The name lies beneath a branch that has been frozen by a read.
    #[error("{name} is locked, cannot change")]
    Locked {
        /// The dotted name that could not be changed.
        name: String,
    },

    /// Nothing is defined under the name.
    #[error("{name} is not defined")]
    NotDefined {
        /// The dotted name that was looked up.
        name: String,
    },

    /// A value is present but has the wrong shape for the operation.
    #[error("{name} is {found}, expected {expected}")]
    TypeMismatch {
        /// The dotted name that was looked up.
        name: String,
        /// The kind the operation required.
        expected: &'static str,
        /// The kind actually found.
        found: &'static str,
    },

    /// A variant selection found more than one candidate key.
    #[error("{name} must select exactly one of {}", keys.join("|"))]
    AmbiguousSelection {
        /// The dotted name that was looked up.
        name: String,
        /// The keys present on the object.
        keys: Vec<String>,
    },

    /// A selected variant has no matching template.
    #[error("unknown {name}.{selected} (no template, expecting {})", expected.join("|"))]
    UnknownSource {
        /// The dotted name that was looked up.
        name: String,
        /// The discriminator that was configured.
        selected: String,
        /// The discriminators the caller recognizes.
        expected: Vec<String>,
    },

    /// A resolved value could not be decoded into the target record.
    #[error("{name} cannot decode into {target}: {message}")]
    Decode {
        /// The dotted name that was decoded.
        name: String,
        /// The Rust type name of the target record.
        target: &'static str,
        /// The underlying decoder message.
        message: String,
    },

    /// A decoded record rejected its own contents.
    #[error("{name} invalid: {source}")]
    Validation {
        /// The dotted name that was decoded.
        name: String,
        /// The failure reported by the record.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A configuration file could not be read.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The file that could not be read.
        path: PathBuf,
        /// The reason the file could not be read.
        reason: String,
    },

    /// A configuration file could not be parsed.
    #[error("cannot parse {}: {message}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// A description of the parse failure.
        message: String,
    },

    /// A configuration file has an extension no parser handles.
    #[error("unknown suffix in {}, expecting json|yaml|yml|toml", path.display())]
    UnsupportedFormat {
        /// The file with the unrecognized extension.
        path: PathBuf,
    },
}

impl Error {
    /// Check if error indicates the name has no value.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerconf::Error;
    ///
    /// let err = Error::NotDefined { name: "server.http".to_string() };
    /// assert!(err.is_not_defined());
    /// ```
    #[must_use]
    pub fn is_not_defined(&self) -> bool {
        matches!(self, Self::NotDefined { .. })
    }

    /// Check if error was caused by a frozen branch.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerconf::Error;
    ///
    /// let err = Error::Locked { name: "server.http.limit".to_string() };
    /// assert!(err.is_locked());
    /// ```
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}
