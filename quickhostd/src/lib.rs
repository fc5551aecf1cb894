//! # QuickHost Daemon
//!
//! This crate provides a scripted host for the runtime controller and the
//! frame scheduler.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: The controller and scheduler never print
//! - **Output is snapshot rendering**: Each `snapshot` command prints one JSON line
//! - **Input is explicit events**: Loader progress, runtime status and frames
//!   are all script commands
//! - **Deterministic mode is first-class**: Every collaborator is simulated
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Download or compile a real runtime module
//! - Render frames
//! - Interpret the hosted source language

pub mod config;
pub mod logging;
pub mod runtime;
pub mod script;

pub use config::{HostConfig, HostConfigError};
pub use logging::LogLevel;
pub use runtime::{HostRuntime, HostRuntimeError, HostSnapshot};
pub use script::{HostCommand, HostScript, HostScriptError};
