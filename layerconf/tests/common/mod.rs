//! Common test utilities for integration tests.
//!
//! This module provides config file helpers and the record types used
//! across the layerconf integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use layerconf::{Validate, ValidationResult};
use serde::{Deserialize, Serialize};

/// Writes a config file into `dir` and returns its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, content).unwrap();
    path
}

/// HTTP server settings, normalized by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpServerConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: i64,
    #[serde(default)]
    pub limit_tps: i64,
}

impl Validate for HttpServerConfig {
    fn validate(&mut self) -> ValidationResult {
        if self.address.is_empty() {
            self.address = "localhost".to_string();
        }
        if self.port == 0 {
            self.port = 8000;
        }
        if self.port < 0 {
            return Err(format!("negative port:{}", self.port).into());
        }
        Ok(())
    }
}

/// Batch server settings with no rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchServerConfig {
    #[serde(default)]
    pub filename: String,
}

impl Validate for BatchServerConfig {}

/// The server variants a deployment can select between.
#[allow(dead_code)]
#[derive(Debug, PartialEq)]
pub enum Server {
    Http(HttpServerConfig),
    Batch(BatchServerConfig),
}
