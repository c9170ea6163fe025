//! Deterministic control loop driving every generator on a structure.
//!
//! Replaces the host's callback triad with explicit scheduled phases per
//! cycle: route the sync bus, run each device's cycle phases (ledger
//! refresh, siege evaluation, modifier publication), every 10th cycle the
//! control-cycle bookkeeping, then the power distributor's demand queries.
//!
//! This is also the single error boundary: fallible device operations
//! return `Result` and are logged here with device context, so one faulty
//! device cannot stall the others or the host loop.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use aegisfield_logic::config::{ConfigError, GeneratorConfig};
use aegisfield_logic::constants::cadence::CONTROL_CYCLE_STEP;

use crate::context::{Authority, DeviceContext, DeviceId};
use crate::device::FieldGenerator;
use crate::notify::Notice;
use crate::persistence::{MemoryStore, SettingsStore};
use crate::structure::{BlockSpec, Structure};
use crate::sync::{ReplicaView, SyncMessage};

/// Tick driver for one structure and its generators.
pub struct ControlLoop {
    structure: Structure,
    devices: Vec<FieldGenerator>,
    store: Box<dyn SettingsStore>,
    config: Arc<GeneratorConfig>,
    bus_tx: Sender<SyncMessage>,
    bus_rx: Receiver<SyncMessage>,
    notice_tx: Sender<Notice>,
    notice_rx: Receiver<Notice>,
    /// One observer-side projection per device, fed by committed broadcasts.
    replicas: HashMap<DeviceId, ReplicaView>,
    /// Last demand each device reported to the power distributor.
    last_demand: HashMap<DeviceId, f32>,
    cycle: u64,
    next_device_id: u64,
}

impl ControlLoop {
    /// Validates the session config up front; everything downstream may
    /// assume the invariants hold.
    pub fn new(structure: Structure, config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (bus_tx, bus_rx) = channel();
        let (notice_tx, notice_rx) = channel();
        Ok(Self {
            structure,
            devices: Vec::new(),
            store: Box::new(MemoryStore::new()),
            config: Arc::new(config),
            bus_tx,
            bus_rx,
            notice_tx,
            notice_rx,
            replicas: HashMap::new(),
            last_demand: HashMap::new(),
            cycle: 0,
            next_device_id: 1,
        })
    }

    /// Swap in a host-backed settings store.
    pub fn with_store(mut self, store: Box<dyn SettingsStore>) -> Self {
        self.store = store;
        self
    }

    /// Spawn the generator block and register its device. Initialization
    /// (config read, persisted settings) runs on the next step.
    pub fn add_generator(&mut self, spec: BlockSpec) -> DeviceId {
        let block = self.structure.add_block(spec);
        let id = DeviceId(self.next_device_id);
        self.next_device_id += 1;

        let ctx = DeviceContext {
            authority: Authority::Host,
            config: Arc::clone(&self.config),
            bus: self.bus_tx.clone(),
            notices: self.notice_tx.clone(),
        };
        self.devices.push(FieldGenerator::new(id, block, ctx));
        self.replicas.insert(id, ReplicaView::new(id));
        id
    }

    /// Remove a device: forced siege disengage, final save, block despawn.
    pub fn remove_generator(&mut self, id: DeviceId) -> bool {
        let Some(index) = self.devices.iter().position(|d| d.id() == id) else {
            return false;
        };
        let mut device = self.devices.remove(index);
        if let Err(e) = device.close(&mut self.structure, self.store.as_mut()) {
            log::error!("{}: final save on removal failed: {}", id, e);
        }
        self.structure.remove_block(device.block());
        self.replicas.remove(&id);
        self.last_demand.remove(&id);
        true
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut Structure {
        &mut self.structure
    }

    pub fn device(&self, id: DeviceId) -> Option<&FieldGenerator> {
        self.devices.iter().find(|d| d.id() == id)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut FieldGenerator> {
        self.devices.iter_mut().find(|d| d.id() == id)
    }

    /// Observer-side projection of a device.
    pub fn replica(&self, id: DeviceId) -> Option<&ReplicaView> {
        self.replicas.get(&id)
    }

    /// Sender remote participants use to file requests.
    pub fn remote_handle(&self) -> Sender<SyncMessage> {
        self.bus_tx.clone()
    }

    /// Demand the device reported on the most recent cycle.
    pub fn last_demand(&self, id: DeviceId) -> Option<f32> {
        self.last_demand.get(&id).copied()
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Pull everything the devices asked the UI to display.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notice_rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    /// Advance one simulation cycle through all scheduled phases.
    pub fn step(&mut self) {
        self.route_bus();
        self.initialize_new_devices();

        self.cycle += 1;

        let structure = &mut self.structure;
        for device in &mut self.devices {
            device.update_cycle(structure);
        }

        if self.cycle % CONTROL_CYCLE_STEP as u64 == 0 {
            let store = self.store.as_mut();
            for device in &mut self.devices {
                if let Err(e) = device.update_control_cycle(&mut *store) {
                    log::error!("{}: settings flush failed: {}", device.id(), e);
                }
            }
        }

        let structure = &self.structure;
        let demands = &mut self.last_demand;
        for device in &mut self.devices {
            demands.insert(device.id(), device.required_input(structure));
        }
    }

    /// Advance `cycles` simulation cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Host-save hook: persist every device outside the throttle.
    pub fn flush_all(&mut self) {
        let store = self.store.as_mut();
        for device in &self.devices {
            if let Err(e) = device.flush(&mut *store) {
                log::error!("{}: flush failed: {}", device.id(), e);
            }
        }
    }

    fn initialize_new_devices(&mut self) {
        let store = self.store.as_mut();
        for device in &mut self.devices {
            if !device.initialized() {
                if let Err(e) = device.on_first_update(&mut *store) {
                    log::error!("{}: initial settings save failed: {}", device.id(), e);
                }
            }
        }
    }

    /// Drain the bus: requests go to the owning device's guard path,
    /// committed broadcasts go to the observer projections.
    fn route_bus(&mut self) {
        while let Ok(message) = self.bus_rx.try_recv() {
            match &message {
                SyncMessage::SiegeRequest { device, .. } => {
                    let id = *device;
                    if let Some(dev) = self.devices.iter_mut().find(|d| d.id() == id) {
                        dev.handle_message(&message);
                    } else {
                        log::warn!("request for unknown device {}", id);
                    }
                }
                SyncMessage::SiegeState { device, .. } | SyncMessage::Settings { device, .. } => {
                    if let Some(replica) = self.replicas.get_mut(device) {
                        replica.apply(&message);
                    }
                }
            }
        }
    }
}
