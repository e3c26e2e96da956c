//! Scripted gate scenarios.
//!
//! A script is a list of steps read from JSON or TOML and replayed against a
//! fresh lot. Each step prints its outcome; the run ends with a
//! [`ScriptSummary`] that can be dumped as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dfa::{CarId, EntryReport, GateDelay, Input, LogEntry, ParkingDfa, Stats, Token};
use crate::error::ParkError;
use crate::ui::Screen;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ScriptStep {
    /// Full entry workflow. `token` goes through fail-closed normalisation.
    Enter { car: String, token: String },
    Exit { car: String },
    Reset,
    /// A single transition, symbol given as text so it can fall outside the alphabet.
    Raw {
        symbol: String,
        #[serde(default)]
        car: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    /// Read a step file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let script = if is_json {
            serde_json::from_str(&contents).map_err(ParkError::from)?
        } else {
            toml::from_str(&contents).map_err(ParkError::from)?
        };
        Ok(script)
    }

    /// Capacity-1 walkthrough: admit, refuse on a full lot, free the space,
    /// admit again, then try to release a car that was never there.
    pub fn demo() -> Self {
        let enter = |car: &str| ScriptStep::Enter {
            car: car.into(),
            token: "ValidToken".into(),
        };
        let exit = |car: &str| ScriptStep::Exit { car: car.into() };
        Self {
            steps: vec![enter("A"), enter("B"), exit("A"), enter("B"), exit("Z")],
        }
    }
}

/// Everything a finished script run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptSummary {
    pub entries: Vec<EntryReport>,
    pub stats: Stats,
    pub log: Vec<LogEntry>,
}

/// Replay `script` against `dfa`, writing one line per step to `out`.
pub async fn run_script<D: GateDelay, W: Write>(
    dfa: &mut ParkingDfa<D>,
    script: &Script,
    out: &mut W,
) -> Result<ScriptSummary> {
    let screen = Screen::new();
    let mut entries = Vec::new();

    for (idx, step) in script.steps.iter().enumerate() {
        let n = idx + 1;
        match step {
            ScriptStep::Enter { car, token } => {
                let car = CarId::new(car).with_context(|| format!("step {n}"))?;
                if !Token::is_recognized(token) {
                    let message = format!(
                        "step {n}: token {token:?} not recognised, treating as InvalidToken"
                    );
                    writeln!(out, "{}", screen.warning(&message))?;
                }
                let report = dfa.run_entry(car, Token::normalize(token)).await;
                writeln!(out, "[{n}] {}", screen.entry(&report, &dfa.stats()))?;
                entries.push(report);
            }
            ScriptStep::Exit { car } => {
                let car = CarId::new(car).with_context(|| format!("step {n}"))?;
                let outcome = dfa.run_exit(car.clone());
                writeln!(out, "[{n}] {}", screen.exit(&car, outcome, &dfa.stats()))?;
            }
            ScriptStep::Reset => {
                dfa.reset();
                writeln!(out, "[{n}] reset → {}", dfa.current_state())?;
            }
            ScriptStep::Raw { symbol, car } => {
                let input =
                    Input::parse(symbol, car.as_deref()).with_context(|| format!("step {n}"))?;
                let shown = input.symbol();
                let step = dfa.feed(input);
                writeln!(out, "[{n}] {shown}: {}", screen.step(&step))?;
            }
        }
    }

    Ok(ScriptSummary {
        entries,
        stats: dfa.stats(),
        log: dfa.log().to_vec(),
    })
}
