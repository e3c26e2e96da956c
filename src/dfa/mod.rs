mod delay;
mod engine;
mod log;
mod state;

#[cfg(test)]
mod proptests;

pub use delay::{GateDelay, NoDelay, TokioDelay};
pub use engine::{EntryOutcome, EntryReport, ExitOutcome, ParkingDfa, Step};
pub use log::{LogEntry, Stats};
pub use state::{CarId, Input, InputSymbol, State, Symbol, TableEntry, Token};
