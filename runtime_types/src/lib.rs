#![cfg_attr(not(test), no_std)]

//! # Runtime Types
//!
//! Plain data shared between the runtime controller, the collaborators it
//! drives, and the hosts that observe it.
//!
//! ## Philosophy
//!
//! - **Data, not behavior**: No type here talks to a runtime or a document
//! - **Serializable**: Everything can be snapshot and compared in tests
//! - **Explicit states**: Lifecycle phases are an enum, never a bare integer
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A description of the hosted source language
//! - A DOM model
//! - A runtime error taxonomy (errors are opaque records from the runtime)

extern crate alloc;

use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque handle for a presentation element (container, canvas, placeholder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Creates a new unique element ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an ElementId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element:{}", self.0)
    }
}

/// Lifecycle phase of a runtime controller
///
/// A controller reports `Created` until its first explicit transition.
/// `Error` is not terminal: a later successful load moves back to `Running`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Constructed, nothing requested yet
    #[default]
    Created,
    /// Module or source content is being loaded
    Loading,
    /// The runtime reported a successful status
    Running,
    /// The runtime reported a failure status
    Error,
}

impl RunState {
    /// Returns true if the runtime reported success
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// Returns true if the runtime reported a failure
    pub fn is_error(&self) -> bool {
        matches!(self, RunState::Error)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Created => write!(f, "created"),
            RunState::Loading => write!(f, "loading"),
            RunState::Running => write!(f, "running"),
            RunState::Error => write!(f, "error"),
        }
    }
}

/// Status code reported by a runtime capability
///
/// Zero means success; every other value is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusCode(pub i32);

impl StatusCode {
    /// The success status
    pub const OK: StatusCode = StatusCode(0);

    /// Returns true for the success status
    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    /// Maps the code onto the controller state it implies
    pub fn run_state(&self) -> RunState {
        if self.is_ok() {
            RunState::Running
        } else {
            RunState::Error
        }
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:{}", self.0)
    }
}

/// Source content fed to the runtime
///
/// Inline code and a URL are mutually exclusive; replacing one drops the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceSpec {
    /// Inline source text
    Code(String),
    /// Location the runtime fetches the source from
    Url(String),
}

impl SourceSpec {
    /// Returns the inline code, if this is a code spec
    pub fn code(&self) -> Option<&str> {
        match self {
            SourceSpec::Code(code) => Some(code),
            SourceSpec::Url(_) => None,
        }
    }

    /// Returns the URL, if this is a URL spec
    pub fn url(&self) -> Option<&str> {
        match self {
            SourceSpec::Code(_) => None,
            SourceSpec::Url(url) => Some(url),
        }
    }
}

/// One error reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Human-readable description
    pub description: String,
    /// Source location the error refers to
    pub url: Option<String>,
    /// Line number (1-indexed)
    pub line: Option<u32>,
    /// Column number (1-indexed)
    pub column: Option<u32>,
}

impl ErrorRecord {
    /// Creates an error record with only a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            url: None,
            line: None,
            column: None,
        }
    }

    /// Sets the source location
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the line and column
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(url) = &self.url {
            write!(f, "{}:", url)?;
        }
        if let Some(line) = self.line {
            write!(f, "{}:", line)?;
            if let Some(column) = self.column {
                write!(f, "{}:", column)?;
            }
        }
        if self.url.is_some() || self.line.is_some() {
            write!(f, " ")?;
        }
        write!(f, "{}", self.description)
    }
}

/// Exit report from the module loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    /// Exit code of the runtime module
    pub code: i32,
    /// Optional exit message
    pub text: Option<String>,
}

impl ExitStatus {
    /// Creates an exit status without a message
    pub fn new(code: i32) -> Self {
        Self { code, text: None }
    }

    /// Attaches an exit message
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "exit {}: {}", self.code, text),
            None => write!(f, "exit {}", self.code),
        }
    }
}

/// Progress reported through the loader's `show_loader` callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderStatus {
    /// The module binary is being fetched
    Downloading,
    /// The module binary is being compiled
    Compiling,
}

impl fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderStatus::Downloading => write!(f, "Downloading"),
            LoaderStatus::Compiling => write!(f, "Compiling"),
        }
    }
}
