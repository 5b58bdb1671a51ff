//! A library for manipulating finite automata over finite alphabets.
//!
//! The centerpiece is a determinization-based complementation procedure for
//! nondeterministic Büchi automata, built from a modified subset construction
//! over sets of states and a colored tuple construction on top of it. See
//! [`complement`] for the entry point and [`Variant`] for the three flavors
//! of the construction.
//!
//! The remaining modules provide the substrate the procedure operates on: a
//! labeled-entity [`store`](crate::store), the [`Fa`] automaton type with its
//! [`builder`](FaBuilder), exact membership of ultimately periodic words, and
//! a GraphViz writer for the results.

pub mod alphabet;
pub mod automaton;
pub mod complement;
pub mod dot;
pub mod error;
pub mod store;

pub use alphabet::Alphabet;
pub use automaton::{AutState, Fa, FaClass, FaKind, StateId, StateStore};
pub use automaton::builder::FaBuilder;
pub use complement::{ComplementStats, Variant, Verbosity, complement};
pub use error::Error;
