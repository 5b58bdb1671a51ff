use thiserror::Error;

/// Errors surfaced by the library. Invariant violations are not represented
/// here; they panic with a message naming the broken invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("expected a Büchi automaton")]
    NotBuchi,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("automaton has no initial state")]
    MissingInitial,
    #[error("symbol '{0}' is not part of the alphabet")]
    UnknownSymbol(char),
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),
}
