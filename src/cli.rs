//! Interface de linha de comando do parkgate baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (menu, table, script, demo)
//! e flags globais (--capacity, --gate-delay-ms, --config, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Parking-garage gate simulated as a deterministic finite automaton.
#[derive(Debug, Parser)]
#[command(name = "parkgate", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Number of parking spaces (overrides config and environment).
    #[arg(long, global = true)]
    pub capacity: Option<usize>,

    /// Gate-close delay in milliseconds.
    #[arg(long, global = true)]
    pub gate_delay_ms: Option<u64>,

    /// Path to a TOML config file (default: ./parkgate.toml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive operator menu.
    Menu,

    /// Print the states, input alphabet and transition table.
    Table,

    /// Run a JSON or TOML step file against a fresh lot.
    Script {
        /// Path to the step file.
        file: PathBuf,

        /// Print the final statistics and log as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run the built-in capacity-1 walkthrough.
    Demo,
}
