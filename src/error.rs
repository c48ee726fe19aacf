//! Error taxonomy (spec §7): validation errors from malformed configurations
//! or templates, and usage errors from the search driver's own inputs.
//! Transport errors (distributed mode) are `std::io::Error` and are handled
//! in the client's connect-retry loop rather than surfaced here.

use std::fmt;

/// Errors raised while constructing or parsing a machine configuration or
/// template. Never swallowed by the search driver: an invalid configuration
/// must not enter the candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownRotorKind(String),
    UnknownReflectorKind(String),
    DuplicateRotorKind(String),
    InvalidReflectorWiring(String),
    SelfPairedPlug(char),
    DuplicatePlugLetter(char),
    OutOfRangeRingSetting(i32),
    OutOfRangePosition(char),
    NonLetterInput(char),
    MalformedConfigString(String),
    MalformedTemplate(String),
    WrongRotorCount(usize),
    MissingThinRotorInFourthSlot,
    ThinRotorOutsideFourthSlot,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownRotorKind(s) => write!(f, "unknown rotor kind: {s:?}"),
            ConfigError::UnknownReflectorKind(s) => write!(f, "unknown reflector kind: {s:?}"),
            ConfigError::DuplicateRotorKind(s) => {
                write!(f, "rotor kind {s:?} used more than once")
            }
            ConfigError::InvalidReflectorWiring(s) => {
                write!(f, "invalid reflector wiring string: {s:?}")
            }
            ConfigError::SelfPairedPlug(c) => {
                write!(f, "plugboard letter {c} cannot be paired with itself")
            }
            ConfigError::DuplicatePlugLetter(c) => {
                write!(f, "plugboard letter {c} used in more than one pair")
            }
            ConfigError::OutOfRangeRingSetting(v) => {
                write!(f, "ring setting {v} out of range 1..=26")
            }
            ConfigError::OutOfRangePosition(c) => write!(f, "position {c:?} is not A..Z"),
            ConfigError::NonLetterInput(c) => write!(f, "{c:?} is not an uppercase Latin letter"),
            ConfigError::MalformedConfigString(s) => {
                write!(f, "malformed configuration string: {s:?}")
            }
            ConfigError::MalformedTemplate(s) => write!(f, "malformed template: {s:?}"),
            ConfigError::WrongRotorCount(n) => {
                write!(f, "expected 3 or 4 rotors, got {n}")
            }
            ConfigError::MissingThinRotorInFourthSlot => write!(
                f,
                "a four-rotor configuration's fourth slot must hold Beta or Gamma"
            ),
            ConfigError::ThinRotorOutsideFourthSlot => write!(
                f,
                "Beta or Gamma may only occupy the fourth (leftmost) slot"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by the search driver about its own call, before any
/// candidate configuration is tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    EmptyCrib,
    CiphertextShorterThanCrib { ciphertext_len: usize, crib_len: usize },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::EmptyCrib => write!(f, "expected a non-empty crib"),
            SearchError::CiphertextShorterThanCrib {
                ciphertext_len,
                crib_len,
            } => write!(
                f,
                "ciphertext ({ciphertext_len} letters) is shorter than the crib ({crib_len} letters)"
            ),
        }
    }
}

impl std::error::Error for SearchError {}

/// Errors from the distributed execution shape: a usage error from the
/// search driver's own inputs, or a transport failure (spec §7's "Transport"
/// kind — connection refused, authentication failure, or any other I/O
/// error on the master/client TCP channel).
#[derive(Debug)]
pub enum DistributedError {
    Search(SearchError),
    Io(std::io::Error),
}

impl fmt::Display for DistributedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributedError::Search(e) => write!(f, "{e}"),
            DistributedError::Io(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for DistributedError {}

impl From<SearchError> for DistributedError {
    fn from(e: SearchError) -> Self {
        DistributedError::Search(e)
    }
}

impl From<std::io::Error> for DistributedError {
    fn from(e: std::io::Error) -> Self {
        DistributedError::Io(e)
    }
}
