//! # Simulated Runtime
//!
//! This crate provides in-process implementations of every collaborator a
//! runtime controller consumes.
//!
//! ## Purpose
//!
//! The simulated collaborators allow testing the lifecycle without a browser:
//! - Runs under `cargo test`
//! - Deterministic (frames and loader progress advance only when told to)
//! - Inspectable (all recorded state is readable)
//!
//! ## Philosophy
//!
//! **Testability is a first-class design constraint.**
//!
//! Each type is a cheap cloneable handle over shared state: one clone is
//! handed to the controller or scheduler, the other stays with the test that
//! drives it.

pub mod document;
pub mod frame;
pub mod loader;
pub mod module;

pub use document::{ElementKind, SimDocument, SimElement};
pub use frame::SimFramePrimitive;
pub use loader::SimModuleLoader;
pub use module::{SimCapability, SimRuntimeModule};
