//! Durable storage for user-tunable generator settings.
//!
//! Settings are bincode-encoded under a fixed key in the device's storage
//! slot. A missing slot, a decode failure, or a version mismatch all mean
//! "no saved settings" - the device falls back to configured defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::DeviceId;

/// Bump when the encoded layout changes.
pub const SETTINGS_VERSION: u32 = 1;

/// The persisted slice of device state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSettings {
    pub version: u32,
    pub field_power: f32,
    pub grid_modifier: f32,
}

impl SavedSettings {
    pub fn new(field_power: f32, grid_modifier: f32) -> Self {
        Self {
            version: SETTINGS_VERSION,
            field_power,
            grid_modifier,
        }
    }
}

/// Encode settings for the storage slot.
pub fn encode_settings(settings: &SavedSettings) -> Result<Vec<u8>, StorageError> {
    Ok(bincode::serialize(settings)?)
}

/// Decode a storage slot, rejecting unknown versions.
pub fn decode_settings(bytes: &[u8]) -> Result<SavedSettings, StorageError> {
    let settings: SavedSettings = bincode::deserialize(bytes)?;
    if settings.version != SETTINGS_VERSION {
        return Err(StorageError::VersionMismatch {
            expected: SETTINGS_VERSION,
            found: settings.version,
        });
    }
    Ok(settings)
}

/// One storage slot per device, keyed by device identity.
pub trait SettingsStore {
    fn read(&self, device: DeviceId) -> Option<Vec<u8>>;
    fn write(&mut self, device: DeviceId, bytes: Vec<u8>) -> Result<(), StorageError>;
}

/// In-memory store - the default for the control loop and all tests.
/// Hosts with real storage slots implement [`SettingsStore`] themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: HashMap<DeviceId, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self, device: DeviceId) -> Option<Vec<u8>> {
        self.slots.get(&device).cloned()
    }

    fn write(&mut self, device: DeviceId, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.slots.insert(device, bytes);
        Ok(())
    }
}

/// Errors that can occur while persisting settings.
#[derive(Debug)]
pub enum StorageError {
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    Backend(String),
}

impl From<Box<bincode::ErrorKind>> for StorageError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        StorageError::Bincode(e)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Bincode(e) => write!(f, "serialization error: {}", e),
            StorageError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "settings version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            StorageError::Backend(reason) => write!(f, "storage backend error: {}", reason),
        }
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip() {
        let settings = SavedSettings::new(12.0, 0.55);
        let bytes = encode_settings(&settings).expect("encode failed");
        let loaded = decode_settings(&bytes).expect("decode failed");
        assert_eq!(loaded, settings);
        // Exact float equality is part of the contract.
        assert_eq!(loaded.field_power, 12.0);
        assert_eq!(loaded.grid_modifier, 0.55);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let stale = SavedSettings {
            version: SETTINGS_VERSION + 1,
            field_power: 5.0,
            grid_modifier: 0.4,
        };
        let bytes = bincode::serialize(&stale).expect("encode failed");
        assert!(matches!(
            decode_settings(&bytes),
            Err(StorageError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_slot_rejected() {
        assert!(decode_settings(&[0xff, 0x01]).is_err());
    }

    #[test]
    fn test_memory_store_slots_are_per_device() {
        let mut store = MemoryStore::new();
        store.write(DeviceId(1), vec![1, 2, 3]).expect("write failed");
        assert_eq!(store.read(DeviceId(1)), Some(vec![1, 2, 3]));
        assert_eq!(store.read(DeviceId(2)), None);
    }
}
