//! Aegisfield Core - Integrity-Field Generator Simulation
//!
//! A structural-integrity field generator is a block on a structure that
//! spends shared generation capacity to scale down incoming damage, and can
//! engage a time-boxed siege mode that maximizes protection while forcing
//! most other systems on the structure offline.
//!
//! # Architecture
//!
//! - **Structure**: a `hecs` world of block entities tagged with capability
//!   components (power production, switchability, siege exemption). The core
//!   never inspects block types, only capabilities.
//! - **FieldGenerator**: the stateful device - siege lifecycle, power demand,
//!   modifier publication, settings persistence and replication.
//! - **ControlLoop**: deterministic tick driver - routes the sync bus, runs
//!   each device's cycle phases in a fixed order, and owns the single
//!   error-logging boundary so one faulty device cannot stall the rest.
//!
//! # Example
//!
//! ```rust,no_run
//! use aegisfield_core::prelude::*;
//! use aegisfield_logic::config::GeneratorConfig;
//!
//! let mut structure = Structure::new("Outpost");
//! structure.add_block(BlockSpec::reactor("Reactor", 200.0));
//!
//! let mut sim = ControlLoop::new(structure, GeneratorConfig::default()).unwrap();
//! let gen = sim.add_generator(BlockSpec::field_generator("Field Generator"));
//!
//! sim.device_mut(gen).unwrap().request_siege(true);
//! sim.run(600);
//! ```

pub mod components;
pub mod context;
pub mod controls;
pub mod device;
pub mod engine;
pub mod notify;
pub mod persistence;
pub mod publisher;
pub mod siege;
pub mod structure;
pub mod sync;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::context::{Authority, DeviceContext, DeviceId};
    pub use crate::device::FieldGenerator;
    pub use crate::engine::ControlLoop;
    pub use crate::notify::{Audience, Notice, NoticeLane, Severity};
    pub use crate::structure::{BlockSpec, Structure};
}
