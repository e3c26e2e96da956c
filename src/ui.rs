//! Interface de terminal do parkgate: tabelas, log, estatísticas e resultados.
//!
//! Usa as crates `console` para estilização com cores e `indicatif` para o
//! spinner exibido enquanto o portão fecha. A [`Screen`] devolve `String`s,
//! de modo que o menu e o executor de scripts decidem para onde vão.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::Local;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::dfa::{
    CarId, EntryOutcome, EntryReport, ExitOutcome, GateDelay, InputSymbol, LogEntry, Stats,
    State, Step, Symbol, TableEntry, TokioDelay,
};

/// Styles for operator-facing text.
pub struct Screen {
    green: Style,
    red: Style,
    yellow: Style,
    heading: Style,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            heading: Style::new().cyan().bold(),
        }
    }

    pub fn heading(&self, title: &str) -> String {
        format!("{}", self.heading.apply_to(format!("--- {title} ---")))
    }

    pub fn warning(&self, message: &str) -> String {
        format!("{} {message}", self.yellow.apply_to("!"))
    }

    pub fn states(&self, states: &[State]) -> String {
        let names: Vec<String> = states.iter().map(State::to_string).collect();
        format!("States (Q): {{{}}}", names.join(", "))
    }

    pub fn alphabet(&self, alphabet: &[Symbol]) -> String {
        let names: Vec<&str> = alphabet.iter().map(Symbol::name).collect();
        format!("Input Alphabet (Σ): {{{}}}", names.join(", "))
    }

    pub fn transition_table(&self, table: &[TableEntry]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading("Transition Table"));
        let _ = writeln!(
            out,
            "{:<15} {:<15} {:<15}",
            "Current State",
            "Input Symbol",
            "Next State"
        );
        let _ = writeln!(out, "{}", "-".repeat(45));
        for entry in table {
            let _ = writeln!(
                out,
                "{:<15} {:<15} {:<15}",
                entry.from,
                entry.symbol,
                entry.to
            );
        }
        out
    }

    pub fn log(&self, entries: &[LogEntry]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading("Parking Log"));
        if entries.is_empty() {
            let _ = writeln!(out, "(no events yet)");
        }
        for entry in entries {
            let car = entry.car_id.as_ref().map(CarId::as_str).unwrap_or("N/A");
            // Symbols outside the alphabet stand out in the log.
            let symbol = match &entry.symbol {
                InputSymbol::Known(_) => format!("{:<12}", entry.symbol),
                InputSymbol::Unknown(_) => {
                    format!("{}", self.yellow.apply_to(format!("{:<12}", entry.symbol)))
                }
            };
            let _ = writeln!(
                out,
                "{} | Car ID: {:<10} | Input: {symbol} | State: {:<11} | Cars inside: {}",
                entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
                car,
                entry.state,
                entry.occupancy,
            );
        }
        out
    }

    pub fn stats(&self, stats: &Stats) -> String {
        let inside = if stats.cars_inside.is_empty() {
            "None".to_string()
        } else {
            let ids: Vec<&str> = stats.cars_inside.iter().map(CarId::as_str).collect();
            ids.join(", ")
        };
        let spaces = if stats.is_full() {
            format!("{}", self.red.apply_to(stats.spaces_left))
        } else {
            stats.spaces_left.to_string()
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading("Parking Lot Statistics"));
        let _ = writeln!(out, "Capacity: {}", stats.capacity);
        let _ = writeln!(out, "Cars inside ({}): {inside}", stats.occupancy());
        let _ = writeln!(out, "Spaces left: {spaces}");
        let _ = writeln!(out, "Total Accepted Entries: {}", stats.total_accepted);
        let _ = writeln!(out, "Total Rejected Entries: {}", stats.total_rejected);
        if stats.current_state.is_terminal() {
            let _ = writeln!(
                out,
                "Automaton state: {} (reset on next car)",
                stats.current_state
            );
        } else {
            let _ = writeln!(out, "Automaton state: {}", stats.current_state);
        }
        out
    }

    /// One-line summary of an entry workflow.
    pub fn entry(&self, report: &EntryReport, stats: &Stats) -> String {
        let car = &report.car_id;
        match &report.outcome {
            EntryOutcome::Admitted => format!(
                "{} Car {car} entered successfully. Cars inside: {}/{}",
                self.green.apply_to("✓"),
                stats.occupancy(),
                stats.capacity
            ),
            EntryOutcome::RejectedCapacity => format!(
                "{} Parking full! Car {car} entry rejected.",
                self.red.apply_to("✗")
            ),
            EntryOutcome::RejectedDuplicate => format!(
                "{} Car {car} is already inside the lot!",
                self.red.apply_to("✗")
            ),
            EntryOutcome::RejectedToken => format!(
                "{} Car {car} entry rejected due to invalid token.",
                self.red.apply_to("✗")
            ),
            EntryOutcome::Failed(state) => format!(
                "{} Car {car} entry failed in state {state}.",
                self.red.apply_to("✗")
            ),
        }
    }

    pub fn exit(&self, car: &CarId, outcome: ExitOutcome, stats: &Stats) -> String {
        match outcome {
            ExitOutcome::Exited => format!(
                "{} Car {car} exited. Cars inside: {}/{}",
                self.green.apply_to("✓"),
                stats.occupancy(),
                stats.capacity
            ),
            ExitOutcome::NotFound => format!(
                "{} Car {car} not found in the lot!",
                self.yellow.apply_to("?")
            ),
        }
    }

    /// Result of a single raw transition.
    pub fn step(&self, step: &Step) -> String {
        match step {
            Step::Advanced(state) => format!("→ {state}"),
            Step::Admitted(car) => {
                format!("{} ACCEPT, car {car} admitted", self.green.apply_to("✓"))
            }
            Step::Rejected(reason) => format!("{} REJECT: {reason}", self.red.apply_to("✗")),
            Step::Exited(car) => format!("{} car {car} exited", self.green.apply_to("✓")),
            Step::ExitNotFound(car) => format!(
                "{} car {car} not found in the lot",
                self.yellow.apply_to("?")
            ),
        }
    }
}

/// Real gate delay that shows a spinner while the gate closes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinnerDelay;

impl GateDelay for SpinnerDelay {
    async fn wait(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Waiting for gate to close...");
        pb.enable_steady_tick(Duration::from_millis(100));
        TokioDelay.wait(duration).await;
        pb.finish_and_clear();
    }
}
