//! Configuration file source.
//!
//! A file is read and parsed once, when the source is created. Its top
//! level must be an object.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::source::Source;
use crate::tree::{kind_of, ValueTree};

/// Document formats understood by [`FileSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl FileFormat {
    /// Pick a format from the file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use layerconf::FileFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(FileFormat::from_path(Path::new("config.yml")), Some(FileFormat::Yaml));
    /// assert_eq!(FileFormat::from_path(Path::new("config.xml")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse `contents` into a value.
    fn parse(self, contents: &str) -> std::result::Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str::<toml::Table>(contents)
                .map(|table| toml_to_json(toml::Value::Table(table)))
                .map_err(|e| e.to_string()),
        }
    }
}

/// Convert a TOML value, rendering datetimes as their TOML text.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or_else(|| Value::String(f.to_string()), Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

/// A source backed by one parsed configuration file.
///
/// # Examples
///
/// ```no_run
/// use layerconf::{FileSource, Source};
///
/// let source = FileSource::load("./config.yaml").unwrap();
/// let port = source.get("server.http.port");
/// ```
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    tree: ValueTree,
}

impl FileSource {
    /// Load and parse a configuration file.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedFormat`] if the extension is not recognized
    /// - [`Error::InvalidPath`] if the file cannot be read
    /// - [`Error::Parse`] if the contents are malformed or not an object
    /// - [`Error::InvalidName`] if a key violates the name grammar
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path).ok_or_else(|| Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;

        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read configuration file: {e}"),
        })?;

        let object = match format.parse(&contents) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                return Err(Error::Parse {
                    path: path.to_path_buf(),
                    message: format!("top level is {}, expected object", kind_of(&other)),
                })
            }
            Err(message) => {
                return Err(Error::Parse {
                    path: path.to_path_buf(),
                    message,
                })
            }
        };

        let tree = ValueTree::from_object(path.display().to_string(), object)?;
        log::debug!("loaded configuration file {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            tree,
        })
    }

    /// Path the source was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for FileSource {
    fn get(&self, name: &str) -> Option<Value> {
        self.tree.get(name)
    }
}
