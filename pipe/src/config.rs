//! Pipe configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default ring capacity: 4 MiB.
pub const DEFAULT_CAPACITY: usize = 4 * 1024 * 1024;

/// Configuration shared by the pipe constructors.
///
/// Missing fields fall back to their defaults when deserialized, so a pipe
/// section in a larger YAML or JSON config can be as small as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    /// Capacity of each ring buffer in bytes.
    pub capacity: usize,
    /// Label used in logs and ring buffer names.
    pub name: String,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            name: "pipe".to_string(),
        }
    }
}

impl PipeConfig {
    /// Creates a config with the given capacity and the default name.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks that the config can build a pipe.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::invalid("capacity must be greater than 0"));
        }
        if self.name.is_empty() {
            return Err(Error::invalid("name must not be empty"));
        }
        Ok(())
    }
}
