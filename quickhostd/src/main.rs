//! # QuickHost Daemon
//!
//! Main entry point for the scripted runtime host.

use clap::Parser;
use quickhostd::{logging, HostConfig, HostRuntime, HostScript, LogLevel};
use std::path::PathBuf;
use std::process;

/// Drives a runtime controller and frame scheduler from a script
#[derive(Parser, Debug)]
#[command(name = "quickhostd")]
#[command(version, long_about = None)]
struct Args {
    /// Host script to execute
    #[arg(short, long, value_name = "FILE")]
    script: PathBuf,

    /// JSON host configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Diagnostic log level (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// Maximum commands to execute (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    max_steps: usize,
}

fn main() {
    let args = Args::parse();
    logging::init(args.log_level);

    let script = HostScript::load(&args.script).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let config = match &args.config {
        Some(path) => HostConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None => HostConfig::default(),
    };

    let mut runtime = HostRuntime::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to create runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.run_script(&script, args.max_steps, |snapshot| {
        match snapshot.to_json() {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("Error: {}", e),
        }
    });

    if let Err(e) = result {
        eprintln!("Runtime error: {}", e);
        process::exit(1);
    }
}
