//! Loop configuration.

use serde::{Deserialize, Serialize};

/// Options recognised when mounting a loop.
///
/// Deserializable so applications can keep them in their own config files;
/// missing keys fall back to the defaults.
///
/// ```rust
/// use oak_loop::LoopOptions;
///
/// let options = LoopOptions::new().log(true);
/// assert!(options.log);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopOptions {
    /// Trace every received event and every transition result.
    pub log: bool,
}

impl LoopOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }
}
