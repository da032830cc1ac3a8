//! Page size policy.

use serde::{Deserialize, Serialize};

/// Page size applied when a request does not ask for one.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest page size a request may ask for.
pub const MAX_LIMIT: u32 = 200;

/// Turns a requested page size into the one the statement uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitPolicy {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl LimitPolicy {
    /// Missing or zero requests get the default; larger ones are clamped to
    /// the maximum.
    pub fn evaluate(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => self.default_limit,
            Some(n) => n.min(self.max_limit),
        }
    }
}
