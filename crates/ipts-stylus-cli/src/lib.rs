//! # IPTS Stylus CLI
//!
//! Userspace processing for IPTS stylus hardware.
//!
//! The binary connects the pieces of the stack: it reads touch data buffers
//! from the kernel interface (or a recorded dump), parses them into typed
//! events, runs the DFT decoder, and hands the resulting stylus state to a
//! sink.
//!
//! # Usage
//!
//! ```bash
//! # Process live data from the device
//! ipts-stylus run
//!
//! # Replay a recorded dump and print decoded DFT traffic
//! ipts-stylus print --position --stylus-status dump.bin
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod app;
pub mod config;
pub mod device;
pub mod print;
pub mod runner;

/// IPTS stylus command line interface
#[derive(Parser, Debug)]
#[command(name = "ipts-stylus")]
#[command(author, version, about = "Userspace stylus processing for Intel Precise Touch")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process live data from an IPTS device
    Run(RunArgs),

    /// Replay a recorded dump and print decoded DFT traffic
    Print(PrintArgs),
}

/// Arguments for the `run` command.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the IPTS character device.
    #[arg(long, default_value = "/dev/ipts")]
    pub device: PathBuf,
}

/// Arguments for the `print` command.
#[derive(clap::Args, Debug)]
pub struct PrintArgs {
    /// The recorded dump file to replay.
    pub file: PathBuf,

    /// Print position windows.
    #[arg(long)]
    pub position: bool,

    /// Print button windows.
    #[arg(long)]
    pub button: bool,

    /// Print pressure windows.
    #[arg(long)]
    pub pressure: bool,

    /// Print windows of unknown type.
    #[arg(long)]
    pub unknown: bool,

    /// Print the current stylus state before every window.
    #[arg(long)]
    pub stylus_status: bool,
}
