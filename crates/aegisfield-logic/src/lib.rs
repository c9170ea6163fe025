//! Pure decision logic for the Aegisfield integrity-field generator.
//!
//! This crate contains every formula and guard decision that is independent
//! of the structure model, storage, or any runtime. Functions take plain
//! data and return results, making them unit-testable and portable between
//! the native control loop and headless tooling.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generator tuning values, defaults, and validation |
//! | [`constants`] | Draw fractions, siege override values, cadence counts |
//! | [`demand`] | Power draw curve for the shared power distributor |
//! | [`modifier`] | Field power → grid damage modifier mapping |
//! | [`siege`] | Siege phase type and entry/sustain/toggle guards |

pub mod config;
pub mod constants;
pub mod demand;
pub mod modifier;
pub mod siege;
