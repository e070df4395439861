#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # layerconf
//!
//! Layered configuration values that freeze on first read.
//!
//! Values are resolved by dotted name from, in order, a cache of earlier
//! answers, a chain of pluggable sources, and a registry of defaults. The
//! first answer for a name is frozen and returned for the rest of the
//! process lifetime. Resolved values can be decoded into validated records,
//! including picking one of several record shapes by a single-key object.
//!
//! ## Core Types
//!
//! - [`Resolver`] and [`ResolverBuilder`]: name resolution
//! - [`ValueTree`]: dotted-name storage with set-once and freeze-on-read
//! - [`Source`] and the bundled [`StaticSource`], [`EnvSource`], [`FileSource`]
//! - [`Validate`] and [`Variants`]: typed decoding
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```
//! use layerconf::{Resolver, StaticSource};
//! use serde_json::json;
//!
//! let resolver = Resolver::new();
//! resolver.set_default("abc", 123).unwrap();
//! resolver.set_default("myName", "Jan").unwrap();
//!
//! assert_eq!(resolver.get_int("abc").unwrap(), Some(123));
//! assert_eq!(resolver.get_string("myName").unwrap(), Some("Jan".to_string()));
//!
//! // Too late: "abc" is frozen.
//! resolver.add_source(StaticSource::new(json!({"abc": 456})).unwrap());
//! assert_eq!(resolver.get_int("abc").unwrap(), Some(123));
//! ```

pub mod decode;
pub mod error;
pub mod name;
pub mod resolver;
pub mod source;
pub mod tree;
pub mod variant;

// Re-export key types at crate root for convenience
pub use decode::{Validate, ValidationResult};
pub use error::{Error, Result};
pub use resolver::{Resolver, ResolverBuilder};
pub use source::{EnvSource, FileFormat, FileSource, Source, SourceChain, StaticSource};
pub use tree::ValueTree;
pub use variant::Variants;
