//! Smart-home switch state.
//!
//! There is no device integration yet: reads always report every switch off,
//! and writes are echoed back to the caller without being stored.

use serde::{Deserialize, Serialize};

/// Snapshot of the four known switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartHomeState {
    pub lights: bool,
    pub fan: bool,
    pub ac: bool,
    pub bedroom: bool,
}

impl SmartHomeState {
    /// The state reported to readers.
    pub fn snapshot() -> Self {
        Self::default()
    }
}

/// Requested switch changes; absent fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartHomeUpdate {
    #[serde(default)]
    pub lights: Option<bool>,
    #[serde(default)]
    pub fan: Option<bool>,
    #[serde(default)]
    pub ac: Option<bool>,
    #[serde(default)]
    pub bedroom: Option<bool>,
}
