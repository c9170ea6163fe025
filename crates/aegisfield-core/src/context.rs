//! Per-device context handed to each generator at construction.
//!
//! Replaces any notion of a process-wide singleton: the shared session
//! config and the outbound channels travel with the device.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use aegisfield_logic::config::GeneratorConfig;

use crate::notify::Notice;
use crate::sync::SyncMessage;

/// Stable identity of a device, shared by host and observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Which side of the replication topology this instance runs on.
///
/// The host owns ground truth and applies guards before committing;
/// observers only send change requests and apply committed broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Host,
    Observer,
}

/// Shared handles a device needs to do its job.
#[derive(Clone)]
pub struct DeviceContext {
    pub authority: Authority,
    /// Session configuration; devices keep a local cache and re-read on
    /// siege resets so drift resolves itself.
    pub config: Arc<GeneratorConfig>,
    /// Outbound replication bus.
    pub bus: Sender<SyncMessage>,
    /// Outbound notice channel to the UI layer.
    pub notices: Sender<Notice>,
}

impl DeviceContext {
    /// Send on the bus; a disconnected receiver just means nobody is
    /// listening anymore.
    pub fn send(&self, message: SyncMessage) {
        let _ = self.bus.send(message);
    }

    pub fn notify(&self, notice: Notice) {
        let _ = self.notices.send(notice);
    }
}
