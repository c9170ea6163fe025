//! Component definitions for the block ECS.
//!
//! Components are pure data structs attached to block entities.
//! They have no behavior - that lives on [`crate::structure::Structure`]
//! and in the device modules.

mod block;
mod common;

pub use block::*;
pub use common::*;
