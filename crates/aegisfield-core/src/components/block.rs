//! Block capability components.
//!
//! The enumeration collaborator tags each block with the capabilities the
//! core cares about; nothing here encodes concrete block types.

use serde::{Deserialize, Serialize};

/// Human-readable block label, for notices and harness output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockLabel {
    pub name: String,
}

impl BlockLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Power production capability. Rated output counts toward the structure's
/// generation capacity while the block is intact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerProducer {
    pub max_output: f32,
}

/// A block that can be switched on and off, by its operator or by the
/// forced siege shutdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FunctionalSwitch {
    pub enabled: bool,
}

impl Default for FunctionalSwitch {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Structural condition of a block. Zero integrity means destroyed: the
/// block stops working and stops producing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockHealth {
    pub integrity: f32,
}

impl Default for BlockHealth {
    fn default() -> Self {
        Self { integrity: 1.0 }
    }
}

impl BlockHealth {
    pub fn is_destroyed(&self) -> bool {
        self.integrity <= 0.0
    }
}

/// Marker: excluded from the forced siege shutdown. Power producers,
/// collectors, and cockpits carry this so the structure stays powered
/// and controllable while under siege.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SiegeExempt;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_health_destroyed() {
        assert!(!BlockHealth::default().is_destroyed());
        assert!(BlockHealth { integrity: 0.0 }.is_destroyed());
    }
}
