//! Replication messages and the observer-side projection.
//!
//! Authority is explicit: observers send [`SyncMessage::SiegeRequest`] and
//! never mutate phase state themselves; the host applies guards, commits,
//! and broadcasts [`SyncMessage::SiegeState`]. Settings flow one way, host
//! to observers, on the synchronizer's throttled schedule.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::context::DeviceId;
use crate::persistence::SavedSettings;

/// Everything that crosses the host/observer boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// Observer asks the host to change the siege flag. A request, not a
    /// state change - the host may refuse it.
    SiegeRequest { device: DeviceId, requested: bool },
    /// Host committed a new siege flag value.
    SiegeState { device: DeviceId, requested: bool },
    /// Host flushed settings; observers overwrite their projection.
    Settings {
        device: DeviceId,
        settings: SavedSettings,
    },
}

/// Read-mostly projection of one device held by an observer.
#[derive(Debug, Clone)]
pub struct ReplicaView {
    pub device: DeviceId,
    pub field_power: f32,
    pub grid_modifier: f32,
    pub siege_requested: bool,
}

impl ReplicaView {
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            field_power: 0.0,
            grid_modifier: 0.0,
            siege_requested: false,
        }
    }

    /// Apply a committed broadcast. Requests and other devices' traffic
    /// are ignored - only the host interprets requests.
    pub fn apply(&mut self, message: &SyncMessage) {
        match message {
            SyncMessage::SiegeState { device, requested } if *device == self.device => {
                self.siege_requested = *requested;
            }
            SyncMessage::Settings { device, settings } if *device == self.device => {
                self.field_power = settings.field_power;
                self.grid_modifier = settings.grid_modifier;
            }
            _ => {}
        }
    }

    /// Ask the host to change the siege flag.
    pub fn request_siege(&self, bus: &Sender<SyncMessage>, requested: bool) {
        let _ = bus.send(SyncMessage::SiegeRequest {
            device: self.device,
            requested,
        });
    }
}
