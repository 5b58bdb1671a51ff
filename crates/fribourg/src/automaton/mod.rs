//! The finite-automaton substrate: states, the state store and the [`Fa`]
//! descriptor that ties alphabet, type, class and store together.

pub mod builder;
mod complete;
mod run;

use crate::alphabet::Alphabet;
use crate::store::{EntityStore, StoreEntry};

pub use builder::FaBuilder;

/// Handle to a state inside a [`StateStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The type of a finite automaton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaKind {
    /// An automaton over finite words.
    Ordinary,
    /// A Büchi automaton over infinite words.
    Buechi,
}

impl std::fmt::Display for FaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaKind::Ordinary => write!(f, "ordinary"),
            FaKind::Buechi => write!(f, "buechi"),
        }
    }
}

/// The class of a finite automaton, as declared by its producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaClass {
    Deterministic,
    NonDeterministic,
}

impl std::fmt::Display for FaClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaClass::Deterministic => write!(f, "deterministic"),
            FaClass::NonDeterministic => write!(f, "non-deterministic"),
        }
    }
}

/// A state of a finite automaton.
///
/// The transition relation is stored as one ordered successor list per
/// alphabet symbol; an empty list means the automaton has no transition for
/// that symbol, which is allowed for incomplete automata.
#[derive(Debug, Clone)]
pub struct AutState {
    pub(crate) label: String,
    pub(crate) accept: bool,
    pub(crate) reachable: bool,
    pub(crate) transitions: Vec<Vec<StateId>>,
}

impl AutState {
    pub fn new(label: impl Into<String>, accept: bool, nb_symbols: usize) -> Self {
        Self {
            label: label.into(),
            accept,
            reachable: false,
            transitions: vec![Vec::new(); nb_symbols],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn accept(&self) -> bool {
        self.accept
    }

    pub fn reachable(&self) -> bool {
        self.reachable
    }

    /// The ordered successors for the given symbol index.
    pub fn successors(&self, symbol: usize) -> &[StateId] {
        self.transitions.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl StoreEntry for AutState {
    type Key = String;
    type Id = StateId;

    fn key(&self) -> Self::Key {
        self.label.clone()
    }
    fn id(index: usize) -> Self::Id {
        StateId(index as u32)
    }
    fn index(id: Self::Id) -> usize {
        id.index()
    }
}

/// The labeled-entity store instantiated for automaton states.
pub type StateStore = EntityStore<AutState>;

/// A finite automaton.
#[derive(Debug, Clone)]
pub struct Fa {
    pub(crate) name: String,
    pub(crate) alphabet: Alphabet,
    pub(crate) kind: FaKind,
    pub(crate) class: FaClass,
    pub(crate) states: StateStore,
}

impl Fa {
    /// Starts building an automaton; see [`FaBuilder`].
    pub fn builder() -> FaBuilder {
        FaBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn kind(&self) -> FaKind {
        self.kind
    }

    pub fn class(&self) -> FaClass {
        self.class
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    pub fn initial(&self) -> Option<StateId> {
        self.states.initial()
    }

    pub(crate) fn replace_states(&mut self, states: StateStore) {
        self.states = states;
    }
}
