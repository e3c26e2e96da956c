use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::delay::GateDelay;
use super::log::{LogEntry, Stats};
use super::state::{
    CarId, Event, Input, InputSymbol, State, Symbol, TRANSITION_TABLE, TableEntry, Token, delta,
};
use crate::config::ParkConfig;
use crate::error::ParkError;

/// Why the automaton was sent to `REJECT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// `CarArrives` while every space is taken.
    CapacityFull,
    /// The token scan came back invalid.
    InvalidToken,
    /// The gate would admit a car that is already inside.
    AlreadyInside,
    /// Text outside the input alphabet.
    UnknownSymbol(String),
    /// A valid symbol with no edge from the current state.
    IllegalTransition { from: State, symbol: Symbol },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::CapacityFull => write!(f, "parking full"),
            RejectReason::InvalidToken => write!(f, "invalid token"),
            RejectReason::AlreadyInside => write!(f, "car already inside"),
            RejectReason::UnknownSymbol(raw) => write!(f, "unknown symbol {raw:?}"),
            RejectReason::IllegalTransition { from, symbol } => {
                write!(f, "no transition from {from} on {symbol}")
            }
        }
    }
}

/// The result of a single transition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Moved along a table edge to a non-accepting state.
    Advanced(State),
    /// Reached `ACCEPT`; the car is now in the occupancy registry.
    Admitted(CarId),
    Rejected(RejectReason),
    /// Removed from the registry. The automaton state is untouched.
    Exited(CarId),
    /// Exit requested for a car that is not inside. Nothing changed.
    ExitNotFound(CarId),
}

/// How an entry workflow ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EntryOutcome {
    Admitted,
    RejectedCapacity,
    RejectedDuplicate,
    RejectedToken,
    /// Ended in a state other than `ACCEPT` for any other reason.
    Failed(State),
}

impl EntryOutcome {
    fn from_reason(reason: &RejectReason) -> Self {
        match reason {
            RejectReason::CapacityFull => EntryOutcome::RejectedCapacity,
            RejectReason::InvalidToken => EntryOutcome::RejectedToken,
            RejectReason::AlreadyInside => EntryOutcome::RejectedDuplicate,
            RejectReason::UnknownSymbol(_) | RejectReason::IllegalTransition { .. } => {
                EntryOutcome::Failed(State::Reject)
            }
        }
    }
}

/// Audit record for one car's entry attempt.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub run_id: Uuid,
    pub car_id: CarId,
    pub outcome: EntryOutcome,
    /// States visited, starting with the state after `reset`.
    pub path: Vec<State>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitOutcome {
    Exited,
    NotFound,
}

/// The parking-lot gate automaton together with its occupancy registry,
/// counters and event log.
///
/// One car is processed at a time: the entry workflow borrows the engine
/// mutably across the gate-close wait, so nothing can interleave with it.
pub struct ParkingDfa<D> {
    capacity: usize,
    gate_close_delay: Duration,
    delay: D,
    current: State,
    inside: Vec<CarId>,
    total_accepted: u64,
    total_rejected: u64,
    log: Vec<LogEntry>,
}

impl<D: GateDelay> ParkingDfa<D> {
    pub fn new(capacity: usize, gate_close_delay: Duration, delay: D) -> Result<Self, ParkError> {
        if capacity == 0 {
            return Err(ParkError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            gate_close_delay,
            delay,
            current: State::START,
            inside: Vec::with_capacity(capacity),
            total_accepted: 0,
            total_rejected: 0,
            log: Vec::new(),
        })
    }

    pub fn from_config(config: &ParkConfig, delay: D) -> Result<Self, ParkError> {
        Self::new(config.capacity, config.gate_close_delay(), delay)
    }

    // ---------------- Automaton ----------------

    /// Put the automaton back in the start state. Registry, counters and log
    /// are left alone.
    pub fn reset(&mut self) {
        self.current = State::START;
    }

    pub fn transition(&mut self, event: Event) -> Step {
        self.feed(event.into())
    }

    /// Advance the automaton by one input and append exactly one log entry.
    ///
    /// Guards run in order: exit bookkeeping, capacity on arrival, alphabet
    /// membership, then the transition function. Any path that lands on
    /// `REJECT` counts one rejection.
    pub fn feed(&mut self, input: Input) -> Step {
        let symbol = input.symbol();
        let car = input.car_id().cloned();
        let step = self.apply(input);
        self.record(symbol, car);
        step
    }

    fn apply(&mut self, input: Input) -> Step {
        let event = match input {
            Input::Event(event) => event,
            Input::Unrecognized { symbol, .. } => {
                return self.reject(RejectReason::UnknownSymbol(symbol));
            }
        };

        match event {
            Event::Exits(car) => self.exit(car),
            Event::Arrives(_) if self.inside.len() >= self.capacity => {
                self.reject(RejectReason::CapacityFull)
            }
            event => self.lookup(event),
        }
    }

    fn lookup(&mut self, event: Event) -> Step {
        let from = self.current;
        let symbol = event.symbol();

        match delta(from, symbol) {
            Some(State::Reject) => self.reject(match symbol {
                Symbol::InvalidToken => RejectReason::InvalidToken,
                _ => RejectReason::IllegalTransition { from, symbol },
            }),
            Some(next) if next.is_accepting() => match event.car_id() {
                // The registry holds each car at most once.
                Some(car) if self.is_inside(car) => self.reject(RejectReason::AlreadyInside),
                Some(car) => {
                    let car = car.clone();
                    self.current = next;
                    self.inside.push(car.clone());
                    self.total_accepted += 1;
                    tracing::info!(car = %car, occupancy = self.inside.len(), "car admitted");
                    Step::Admitted(car)
                }
                None => {
                    self.current = next;
                    Step::Advanced(next)
                }
            },
            Some(next) => {
                self.current = next;
                Step::Advanced(next)
            }
            None => self.reject(RejectReason::IllegalTransition { from, symbol }),
        }
    }

    fn reject(&mut self, reason: RejectReason) -> Step {
        self.current = State::Reject;
        self.total_rejected += 1;
        tracing::warn!(%reason, "entry rejected");
        Step::Rejected(reason)
    }

    fn exit(&mut self, car: CarId) -> Step {
        match self.inside.iter().position(|c| *c == car) {
            Some(idx) => {
                self.inside.remove(idx);
                tracing::info!(car = %car, occupancy = self.inside.len(), "car exited");
                Step::Exited(car)
            }
            None => {
                tracing::warn!(car = %car, "exit requested for car not in the lot");
                Step::ExitNotFound(car)
            }
        }
    }

    fn record(&mut self, symbol: InputSymbol, car_id: Option<CarId>) {
        tracing::debug!(
            symbol = %symbol,
            state = %self.current,
            occupancy = self.inside.len(),
            "transition"
        );
        self.log.push(LogEntry {
            timestamp: Utc::now(),
            car_id,
            symbol,
            state: self.current,
            occupancy: self.inside.len(),
        });
    }

    // ---------------- Workflows ----------------

    /// Run one car through arrival, token check, entry and gate close.
    pub async fn run_entry(&mut self, car: CarId, token: Token) -> EntryReport {
        let started_at = Utc::now();
        let mut path = Vec::new();
        let outcome = self.drive_entry(&car, token, &mut path).await;

        EntryReport {
            run_id: Uuid::new_v4(),
            car_id: car,
            outcome,
            path,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn drive_entry(
        &mut self,
        car: &CarId,
        token: Token,
        path: &mut Vec<State>,
    ) -> EntryOutcome {
        // Capacity is checked first: on a full lot even a car already inside
        // goes through the arrival guard, which counts and logs the rejection.
        if self.is_inside(car) && self.spaces_remaining() > 0 {
            tracing::warn!(car = %car, "car already inside, entry refused");
            return EntryOutcome::RejectedDuplicate;
        }

        self.reset();
        path.push(self.current);

        let step = self.step_on_path(Event::Arrives(car.clone()), path);
        if let Step::Rejected(reason) = &step {
            return EntryOutcome::from_reason(reason);
        }

        let step = self.step_on_path(Event::Token(token), path);
        if let Step::Rejected(reason) = &step {
            return EntryOutcome::from_reason(reason);
        }

        let step = self.step_on_path(Event::Enters(car.clone()), path);
        if let Step::Rejected(reason) = &step {
            return EntryOutcome::from_reason(reason);
        }

        self.delay.wait(self.gate_close_delay).await;

        match self.step_on_path(Event::Timer(car.clone()), path) {
            Step::Admitted(_) => EntryOutcome::Admitted,
            Step::Rejected(reason) => EntryOutcome::from_reason(&reason),
            _ => EntryOutcome::Failed(self.current),
        }
    }

    fn step_on_path(&mut self, event: Event, path: &mut Vec<State>) -> Step {
        let step = self.transition(event);
        path.push(self.current);
        step
    }

    /// Remove a car from the lot. Exits never walk the automaton; they go
    /// through `transition` only so they reach the log.
    pub fn run_exit(&mut self, car: CarId) -> ExitOutcome {
        match self.transition(Event::Exits(car)) {
            Step::Exited(_) => ExitOutcome::Exited,
            _ => ExitOutcome::NotFound,
        }
    }

    // ---------------- Queries ----------------

    pub fn states(&self) -> &'static [State] {
        &State::ALL
    }

    pub fn alphabet(&self) -> &'static [Symbol] {
        &Symbol::ALL
    }

    pub fn transition_table(&self) -> &'static [TableEntry] {
        &TRANSITION_TABLE
    }

    pub fn current_state(&self) -> State {
        self.current
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn gate_close_delay(&self) -> Duration {
        self.gate_close_delay
    }

    pub fn occupancy(&self) -> &[CarId] {
        &self.inside
    }

    pub fn is_inside(&self, car: &CarId) -> bool {
        self.inside.contains(car)
    }

    pub fn spaces_remaining(&self) -> usize {
        self.capacity - self.inside.len()
    }

    pub fn total_accepted(&self) -> u64 {
        self.total_accepted
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn stats(&self) -> Stats {
        Stats {
            capacity: self.capacity,
            cars_inside: self.inside.clone(),
            spaces_left: self.spaces_remaining(),
            total_accepted: self.total_accepted(),
            total_rejected: self.total_rejected(),
            current_state: self.current,
        }
    }
}
