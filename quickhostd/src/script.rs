//! # Host Script Parser
//!
//! Line-based scripts that drive the simulated runtime.
//!
//! ## Format
//!
//! One command per line; blank lines and lines starting with `#` are skipped.
//!
//! - Controller: `source-code <text>`, `source-url <url>`, `load`, `dispose`
//! - Loader: `loader <downloading|compiling>`, `canvas`, `module-ready`,
//!   `load-error <text>`, `exit <code> [text]`
//! - Runtime: `status <code>`, `warning <text>`, `error <description>`
//! - Frames: `request [n]`, `pause`, `run`, `toggle`, `step`, `tick [n]`
//! - Output: `snapshot`
//!
//! ## Example
//!
//! ```text
//! # Load a scene, then step one frame while paused
//! source-code Item {}
//! load
//! loader downloading
//! canvas
//! module-ready
//! status 0
//! pause
//! request 3
//! step
//! tick
//! snapshot
//! ```

use runtime_types::{ExitStatus, LoaderStatus, StatusCode};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Host script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,

    #[error("Failed to read script {path}: {message}")]
    Io { path: String, message: String },
}

/// A single script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    SourceCode(String),
    SourceUrl(String),
    Load,
    Loader(LoaderStatus),
    Canvas,
    ModuleReady,
    LoadError(String),
    Exit(ExitStatus),
    Status(StatusCode),
    Warning(String),
    Error(String),
    /// Registers `n` independent frame callbacks
    Request(usize),
    Pause,
    Run,
    Toggle,
    Step,
    /// Advances the simulated display by `n` frames
    Tick(usize),
    Dispose,
    Snapshot,
}

/// A parsed script, with the line number of every command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostScript {
    commands: Vec<(usize, HostCommand)>,
}

impl HostScript {
    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, HostScriptError> {
        let mut commands = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line_num = index + 1;
            let command = parse_line(line).map_err(|message| HostScriptError::ParseError {
                line: line_num,
                message,
            })?;
            commands.push((line_num, command));
        }

        if commands.is_empty() {
            return Err(HostScriptError::EmptyScript);
        }

        Ok(Self { commands })
    }

    /// Reads and parses a script file
    pub fn load(path: &Path) -> Result<Self, HostScriptError> {
        let text = fs::read_to_string(path).map_err(|err| HostScriptError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_text(&text)
    }

    /// Returns the commands with their line numbers
    pub fn commands(&self) -> &[(usize, HostCommand)] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn parse_line(line: &str) -> Result<HostCommand, String> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    match keyword {
        "source-code" => required(keyword, rest).map(HostCommand::SourceCode),
        "source-url" => required(keyword, rest).map(HostCommand::SourceUrl),
        "load" => no_args(keyword, rest, HostCommand::Load),
        "loader" => match rest {
            "downloading" => Ok(HostCommand::Loader(LoaderStatus::Downloading)),
            "compiling" => Ok(HostCommand::Loader(LoaderStatus::Compiling)),
            other => Err(format!("Invalid loader status: {:?}", other)),
        },
        "canvas" => no_args(keyword, rest, HostCommand::Canvas),
        "module-ready" => no_args(keyword, rest, HostCommand::ModuleReady),
        "load-error" => required(keyword, rest).map(HostCommand::LoadError),
        "exit" => parse_exit(rest).map(HostCommand::Exit),
        "status" => parse_code(rest).map(|code| HostCommand::Status(StatusCode(code))),
        "warning" => required(keyword, rest).map(HostCommand::Warning),
        "error" => required(keyword, rest).map(HostCommand::Error),
        "request" => parse_count(rest).map(HostCommand::Request),
        "pause" => no_args(keyword, rest, HostCommand::Pause),
        "run" => no_args(keyword, rest, HostCommand::Run),
        "toggle" => no_args(keyword, rest, HostCommand::Toggle),
        "step" => no_args(keyword, rest, HostCommand::Step),
        "tick" => parse_count(rest).map(HostCommand::Tick),
        "dispose" => no_args(keyword, rest, HostCommand::Dispose),
        "snapshot" => no_args(keyword, rest, HostCommand::Snapshot),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required(keyword: &str, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("`{}` requires an argument", keyword))
    } else {
        Ok(rest.to_string())
    }
}

fn no_args(keyword: &str, rest: &str, command: HostCommand) -> Result<HostCommand, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(format!("`{}` takes no arguments", keyword))
    }
}

fn parse_count(rest: &str) -> Result<usize, String> {
    if rest.is_empty() {
        return Ok(1);
    }
    rest.parse()
        .map_err(|_| format!("Invalid count: {}", rest))
}

fn parse_code(text: &str) -> Result<i32, String> {
    text.parse()
        .map_err(|_| format!("Invalid status code: {:?}", text))
}

fn parse_exit(rest: &str) -> Result<ExitStatus, String> {
    let (code, text) = match rest.split_once(char::is_whitespace) {
        Some((code, text)) => (code, text.trim()),
        None => (rest, ""),
    };

    let status = ExitStatus::new(parse_code(code)?);
    Ok(if text.is_empty() {
        status
    } else {
        status.with_text(text)
    })
}
