//! Machine selection.
//!
//! A host picks one hardware model at start-up from a [`MachineConfig`]
//! and drives it through [`HardwareModel`](kc_core::HardwareModel). The
//! set of models is closed, so [`Machine`] is an enum rather than an open
//! registry.

mod config;
mod machine;

pub use config::{ConfigError, MachineConfig, MachineKind};
pub use machine::Machine;
