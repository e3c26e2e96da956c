use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParkError;

/// The six states of the gate automaton.
///
/// Each car flows through: IDLE → CHECK_TOKEN → OPEN_GATE → CLOSE_GATE → ACCEPT,
/// or falls into the REJECT sink on any guard failure or undefined transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    CheckToken,
    OpenGate,
    CloseGate,
    Accept,
    Reject,
}

impl State {
    pub const START: State = State::Idle;

    pub const ALL: [State; 6] = [
        State::Idle,
        State::CheckToken,
        State::OpenGate,
        State::CloseGate,
        State::Accept,
        State::Reject,
    ];

    pub fn is_accepting(&self) -> bool {
        matches!(self, State::Accept)
    }

    /// Terminal states need a `reset` before the automaton can take another car.
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Accept | State::Reject)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Idle => "IDLE",
            State::CheckToken => "CHECK_TOKEN",
            State::OpenGate => "OPEN_GATE",
            State::CloseGate => "CLOSE_GATE",
            State::Accept => "ACCEPT",
            State::Reject => "REJECT",
        };
        f.pad(s)
    }
}

/// The input alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    CarArrives,
    ValidToken,
    InvalidToken,
    CarEnters,
    Timer,
    CarExits,
}

impl Symbol {
    pub const ALL: [Symbol; 6] = [
        Symbol::CarArrives,
        Symbol::ValidToken,
        Symbol::InvalidToken,
        Symbol::CarEnters,
        Symbol::Timer,
        Symbol::CarExits,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Symbol::CarArrives => "CarArrives",
            Symbol::ValidToken => "ValidToken",
            Symbol::InvalidToken => "InvalidToken",
            Symbol::CarEnters => "CarEnters",
            Symbol::Timer => "Timer",
            Symbol::CarExits => "CarExits",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Symbol {
    type Err = ParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::ALL
            .into_iter()
            .find(|symbol| symbol.name() == s)
            .ok_or_else(|| ParkError::UnknownSymbol(s.to_string()))
    }
}

/// One edge of the transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub from: State,
    pub symbol: Symbol,
    pub to: State,
}

/// Every defined edge, in happy-path order.
pub const TRANSITION_TABLE: [TableEntry; 5] = [
    TableEntry {
        from: State::Idle,
        symbol: Symbol::CarArrives,
        to: State::CheckToken,
    },
    TableEntry {
        from: State::CheckToken,
        symbol: Symbol::ValidToken,
        to: State::OpenGate,
    },
    TableEntry {
        from: State::CheckToken,
        symbol: Symbol::InvalidToken,
        to: State::Reject,
    },
    TableEntry {
        from: State::OpenGate,
        symbol: Symbol::CarEnters,
        to: State::CloseGate,
    },
    TableEntry {
        from: State::CloseGate,
        symbol: Symbol::Timer,
        to: State::Accept,
    },
];

/// The transition function. `None` means the pair is undefined; the engine
/// sends the automaton to `REJECT` in that case.
pub fn delta(state: State, symbol: Symbol) -> Option<State> {
    match (state, symbol) {
        (State::Idle, Symbol::CarArrives) => Some(State::CheckToken),
        (State::CheckToken, Symbol::ValidToken) => Some(State::OpenGate),
        (State::CheckToken, Symbol::InvalidToken) => Some(State::Reject),
        (State::OpenGate, Symbol::CarEnters) => Some(State::CloseGate),
        (State::CloseGate, Symbol::Timer) => Some(State::Accept),
        _ => None,
    }
}

/// A car identifier or license plate. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarId(String);

impl CarId {
    pub fn new(raw: &str) -> Result<Self, ParkError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParkError::EmptyCarId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CarId {
    type Error = ParkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CarId::new(&value)
    }
}

impl From<CarId> for String {
    fn from(id: CarId) -> Self {
        id.0
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Result of scanning a car's token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Valid,
    Invalid,
}

impl Token {
    /// Fail-closed: only the exact text `ValidToken` is valid.
    pub fn normalize(raw: &str) -> Token {
        if raw.trim() == Symbol::ValidToken.name() {
            Token::Valid
        } else {
            Token::Invalid
        }
    }

    /// Whether `raw` names one of the two token symbols.
    pub fn is_recognized(raw: &str) -> bool {
        matches!(raw.trim(), "ValidToken" | "InvalidToken")
    }

    pub fn symbol(&self) -> Symbol {
        match self {
            Token::Valid => Symbol::ValidToken,
            Token::Invalid => Symbol::InvalidToken,
        }
    }
}

/// A symbol together with the car it concerns. Token scans carry no car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Arrives(CarId),
    Token(Token),
    Enters(CarId),
    Timer(CarId),
    Exits(CarId),
}

impl Event {
    pub fn symbol(&self) -> Symbol {
        match self {
            Event::Arrives(_) => Symbol::CarArrives,
            Event::Token(token) => token.symbol(),
            Event::Enters(_) => Symbol::CarEnters,
            Event::Timer(_) => Symbol::Timer,
            Event::Exits(_) => Symbol::CarExits,
        }
    }

    pub fn car_id(&self) -> Option<&CarId> {
        match self {
            Event::Arrives(car) | Event::Enters(car) | Event::Timer(car) | Event::Exits(car) => {
                Some(car)
            }
            Event::Token(_) => None,
        }
    }
}

/// The symbol recorded for a log entry: either part of the alphabet or the raw
/// text that failed the alphabet guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSymbol {
    Known(Symbol),
    Unknown(String),
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSymbol::Known(symbol) => f.pad(symbol.name()),
            InputSymbol::Unknown(raw) => f.pad(raw),
        }
    }
}

/// Anything that can be fed to the engine, including text outside the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Event(Event),
    Unrecognized { symbol: String, car: Option<CarId> },
}

impl Input {
    /// Build an input from operator or script text.
    ///
    /// A blank car is treated as absent. Text outside the alphabet becomes
    /// `Unrecognized`; a known symbol that needs a car but has none is an error.
    pub fn parse(symbol: &str, car: Option<&str>) -> Result<Input, ParkError> {
        let car = car
            .filter(|raw| !raw.trim().is_empty())
            .map(CarId::new)
            .transpose()?;

        let symbol_text = symbol.trim();
        let Ok(symbol) = symbol_text.parse::<Symbol>() else {
            return Ok(Input::Unrecognized {
                symbol: symbol_text.to_string(),
                car,
            });
        };

        let event = match (symbol, car) {
            (Symbol::ValidToken, _) => Event::Token(Token::Valid),
            (Symbol::InvalidToken, _) => Event::Token(Token::Invalid),
            (_, None) => return Err(ParkError::MissingCarId(symbol)),
            (Symbol::CarArrives, Some(car)) => Event::Arrives(car),
            (Symbol::CarEnters, Some(car)) => Event::Enters(car),
            (Symbol::Timer, Some(car)) => Event::Timer(car),
            (Symbol::CarExits, Some(car)) => Event::Exits(car),
        };
        Ok(Input::Event(event))
    }

    pub fn symbol(&self) -> InputSymbol {
        match self {
            Input::Event(event) => InputSymbol::Known(event.symbol()),
            Input::Unrecognized { symbol, .. } => InputSymbol::Unknown(symbol.clone()),
        }
    }

    pub fn car_id(&self) -> Option<&CarId> {
        match self {
            Input::Event(event) => event.car_id(),
            Input::Unrecognized { car, .. } => car.as_ref(),
        }
    }
}

impl From<Event> for Input {
    fn from(event: Event) -> Self {
        Input::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(State::Idle.to_string(), "IDLE");
        assert_eq!(State::CheckToken.to_string(), "CHECK_TOKEN");
        assert_eq!(State::OpenGate.to_string(), "OPEN_GATE");
        assert_eq!(State::CloseGate.to_string(), "CLOSE_GATE");
        assert_eq!(State::Accept.to_string(), "ACCEPT");
        assert_eq!(State::Reject.to_string(), "REJECT");
    }

    #[test]
    fn display_honours_padding() {
        assert_eq!(format!("{:<8}|", State::Idle), "IDLE    |");
        assert_eq!(format!("{:<8}|", Symbol::Timer), "Timer   |");
        assert_eq!(format!("{:<4}|", CarId::new("A").unwrap()), "A   |");
    }

    #[test]
    fn state_serializes_like_display() {
        for state in State::ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
    }

    #[test]
    fn only_accept_is_accepting() {
        for state in State::ALL {
            assert_eq!(state.is_accepting(), state == State::Accept);
        }
        assert!(State::Accept.is_terminal());
        assert!(State::Reject.is_terminal());
        assert!(!State::START.is_terminal());
    }

    #[test]
    fn delta_agrees_with_table() {
        for state in State::ALL {
            for symbol in Symbol::ALL {
                let listed = TRANSITION_TABLE
                    .iter()
                    .find(|e| e.from == state && e.symbol == symbol)
                    .map(|e| e.to);
                assert_eq!(delta(state, symbol), listed, "({state}, {symbol})");
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for symbol in Symbol::ALL {
            assert_eq!(delta(State::Accept, symbol), None);
            assert_eq!(delta(State::Reject, symbol), None);
        }
    }

    #[test]
    fn symbol_parses_exact_names() {
        for symbol in Symbol::ALL {
            assert_eq!(symbol.name().parse::<Symbol>().unwrap(), symbol);
        }
        assert!("carArrives".parse::<Symbol>().is_err());
        assert!("Honk".parse::<Symbol>().is_err());
    }

    #[test]
    fn car_id_rejects_blank() {
        assert!(matches!(CarId::new("   "), Err(ParkError::EmptyCarId)));
        assert_eq!(CarId::new("  ABC-123 ").unwrap().as_str(), "ABC-123");
    }

    #[test]
    fn car_id_deserialization_validates() {
        let ok: CarId = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(ok.as_str(), "A");
        assert!(serde_json::from_str::<CarId>("\"\"").is_err());
    }

    #[test]
    fn token_normalization_fails_closed() {
        assert_eq!(Token::normalize("ValidToken"), Token::Valid);
        assert_eq!(Token::normalize(" ValidToken "), Token::Valid);
        assert_eq!(Token::normalize("InvalidToken"), Token::Invalid);
        assert_eq!(Token::normalize("validtoken"), Token::Invalid);
        assert_eq!(Token::normalize(""), Token::Invalid);
        assert!(Token::is_recognized("InvalidToken"));
        assert!(!Token::is_recognized("yes"));
    }

    #[test]
    fn only_token_events_lack_a_car() {
        let car = CarId::new("A").unwrap();
        assert!(Event::Token(Token::Valid).car_id().is_none());
        assert_eq!(Event::Timer(car.clone()).car_id(), Some(&car));
        assert_eq!(Event::Exits(car.clone()).symbol(), Symbol::CarExits);
        assert_eq!(Event::Token(Token::Invalid).symbol(), Symbol::InvalidToken);
    }

    #[test]
    fn input_parse() {
        let input = Input::parse("CarArrives", Some("A")).unwrap();
        assert_eq!(
            input,
            Input::Event(Event::Arrives(CarId::new("A").unwrap()))
        );

        let input = Input::parse("ValidToken", None).unwrap();
        assert_eq!(input, Input::Event(Event::Token(Token::Valid)));

        let input = Input::parse("Honk", Some("A")).unwrap();
        assert_eq!(input.symbol(), InputSymbol::Unknown("Honk".into()));
        assert_eq!(input.car_id().map(CarId::as_str), Some("A"));

        assert!(matches!(
            Input::parse("CarEnters", Some("  ")),
            Err(ParkError::MissingCarId(Symbol::CarEnters))
        ));
    }

    #[test]
    fn input_symbol_serializes_as_plain_string() {
        let known = serde_json::to_string(&InputSymbol::Known(Symbol::Timer)).unwrap();
        assert_eq!(known, "\"Timer\"");
        let unknown = serde_json::to_string(&InputSymbol::Unknown("Honk".into())).unwrap();
        assert_eq!(unknown, "\"Honk\"");
    }
}
