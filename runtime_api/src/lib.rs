//! # Runtime API
//!
//! This crate defines the contracts of the collaborators a runtime controller
//! orchestrates but never implements.
//!
//! ## Philosophy
//!
//! **The engine, the loader and the document are opaque.**
//!
//! The controller only sees them through these traits, so the same lifecycle
//! logic runs in a browser and against the simulator.
//!
//! ## Design Principles
//!
//! 1. **Narrow capabilities**: Each trait exposes the handful of operations used
//! 2. **Handlers at construction**: Runtime callbacks are a parameter object,
//!    never an override of a base type
//! 3. **Signals over delays**: Module readiness is an explicit `ReadySource`
//! 4. **Mockable**: Every trait has an in-process implementation in `sim_runtime`

pub mod capability;
pub mod loader;
pub mod presentation;

pub use capability::{
    CapabilityHandlers, ModuleHandle, RuntimeCapability, RuntimeModule, StatusHandler,
    WarningHandler,
};
pub use loader::{LoadRequest, LoaderEvents, ModuleLoader};
pub use presentation::Presentation;
