//! # Runtime Host Service
//!
//! This crate implements the lifecycle controller for one precompiled
//! rendering runtime instance.
//!
//! ## Philosophy
//!
//! - **Observable state machine**: `Created → Loading → Running | Error`, with
//!   exactly one notification per actual change
//! - **Lazy, single instance**: The runtime is created on first need and never
//!   recreated
//! - **Pull errors, push warnings**: Failures land in `RunState::Error` and are
//!   read through `errors()`; warnings are forwarded as they arrive
//! - **Signals, not delays**: Source content is pushed once the module is
//!   ready, never after a guessed timeout
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A renderer
//! - A parser for the hosted source language
//! - A module downloader
//! - A manager for several runtime instances

pub mod config;
pub mod controller;
mod presentation;

pub use config::{ControllerConfig, PresentationSettings, StatusChangeCallback, WarningCallback};
pub use controller::RuntimeController;

use thiserror::Error;

/// Runtime controller error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Runtime module already loaded")]
    AlreadyLoaded,

    #[error("Runtime already disposed")]
    AlreadyDisposed,

    #[error("Controller is disposed")]
    Disposed,

    #[error("No container element configured")]
    MissingContainer,
}
