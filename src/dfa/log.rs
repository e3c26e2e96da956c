use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{CarId, InputSymbol, State};

/// One record of the append-only event log, written once per transition call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub car_id: Option<CarId>,
    pub symbol: InputSymbol,
    /// State of the automaton after the call.
    pub state: State,
    /// Cars inside after the call.
    pub occupancy: usize,
}

/// Point-in-time snapshot of the lot, safe to hand to a renderer or serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub capacity: usize,
    pub cars_inside: Vec<CarId>,
    pub spaces_left: usize,
    pub total_accepted: u64,
    pub total_rejected: u64,
    pub current_state: State,
}

impl Stats {
    pub fn occupancy(&self) -> usize {
        self.cars_inside.len()
    }

    pub fn is_full(&self) -> bool {
        self.spaces_left == 0
    }
}
