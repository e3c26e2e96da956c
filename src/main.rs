mod cli;
mod config;
mod dfa;
mod error;
mod script;
mod shell;
mod ui;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::ParkConfig;
use dfa::{NoDelay, ParkingDfa};
use script::{Script, run_script};
use shell::Shell;
use ui::{Screen, SpinnerDelay};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --verbose.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ParkConfig::load(cli.config.as_deref())?
        .with_overrides(cli.capacity, cli.gate_delay_ms);
    tracing::debug!(
        capacity = config.capacity,
        gate_close_delay_ms = config.gate_close_delay_ms,
        "configuration loaded"
    );
    let screen = Screen::new();

    match cli.command {
        Command::Menu => {
            let mut dfa = ParkingDfa::from_config(&config, SpinnerDelay)?;
            let mut shell = Shell::new(&mut dfa, io::stdin().lock(), io::stdout());
            shell.run().await?;
        }
        Command::Table => {
            let dfa = ParkingDfa::from_config(&config, NoDelay)?;
            println!("{}", screen.states(dfa.states()));
            println!("{}", screen.alphabet(dfa.alphabet()));
            print!("{}", screen.transition_table(dfa.transition_table()));
        }
        Command::Script { file, json } => {
            let script = Script::load(&file)?;
            let mut dfa = ParkingDfa::from_config(&config, SpinnerDelay)?;
            if json {
                let summary = run_script(&mut dfa, &script, &mut io::sink()).await?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let summary = run_script(&mut dfa, &script, &mut io::stdout()).await?;
                print!("{}", screen.stats(&summary.stats));
            }
        }
        Command::Demo => {
            let config = ParkConfig {
                capacity: 1,
                ..config
            };
            let mut dfa = ParkingDfa::from_config(&config, SpinnerDelay)?;
            let summary = run_script(&mut dfa, &Script::demo(), &mut io::stdout()).await?;
            print!("{}", screen.stats(&summary.stats));
            print!("{}", screen.log(&summary.log));
        }
    }

    Ok(())
}
