use thiserror::Error;

use crate::dfa::Symbol;

#[derive(Debug, Error)]
pub enum ParkError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Capacity must be a positive integer, got {0}")]
    InvalidCapacity(usize),

    #[error("Car ID must not be empty")]
    EmptyCarId,

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Symbol {0} requires a car ID")]
    MissingCarId(Symbol),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            ParkError::InvalidCapacity(0).to_string(),
            "Capacity must be a positive integer, got 0"
        );
        assert_eq!(
            ParkError::EmptyCarId.to_string(),
            "Car ID must not be empty"
        );
        assert_eq!(
            ParkError::MissingCarId(Symbol::CarEnters).to_string(),
            "Symbol CarEnters requires a car ID"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParkError>();
    }
}
