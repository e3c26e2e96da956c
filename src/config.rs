//! Configuração do estacionamento carregada a partir de `parkgate.toml`.
//!
//! A struct [`ParkConfig`] contém a capacidade do lote e o atraso de
//! fechamento do portão. Valores não presentes no arquivo usam defaults.
//! A variável de ambiente `PARKGATE_CAPACITY` tem precedência sobre o arquivo,
//! e as flags da CLI são aplicadas por cima pelo chamador.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ParkError;

pub const DEFAULT_CONFIG_FILE: &str = "parkgate.toml";
pub const CAPACITY_ENV: &str = "PARKGATE_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParkConfig {
    /// Number of spaces in the lot.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Time the gate takes to close after a car drives through.
    #[serde(default = "default_gate_close_delay_ms")]
    pub gate_close_delay_ms: u64,
}

// Valor padrão para a capacidade: 5 vagas.
fn default_capacity() -> usize {
    5
}

// Valor padrão para o fechamento do portão: 2000 ms.
fn default_gate_close_delay_ms() -> u64 {
    2000
}

impl Default for ParkConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            gate_close_delay_ms: default_gate_close_delay_ms(),
        }
    }
}

impl ParkConfig {
    /// Load `parkgate.toml` from the working directory, or `path` when given.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(raw) = std::env::var(CAPACITY_ENV) {
            config.capacity = parse_capacity(&raw)?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str::<ParkConfig>(&contents).map_err(ParkError::from)?;
        Ok(config)
    }

    pub fn gate_close_delay(&self) -> Duration {
        Duration::from_millis(self.gate_close_delay_ms)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, capacity: Option<usize>, gate_delay_ms: Option<u64>) -> Self {
        if let Some(capacity) = capacity {
            self.capacity = capacity;
        }
        if let Some(ms) = gate_delay_ms {
            self.gate_close_delay_ms = ms;
        }
        self
    }
}

fn parse_capacity(raw: &str) -> Result<usize, ParkError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| ParkError::Config(format!("{CAPACITY_ENV}={raw:?}: {e}")))
}
