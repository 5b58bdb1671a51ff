//! Determinization-based complementation of nondeterministic Büchi automata.
//!
//! The construction runs in three passes over one shared set store and one
//! shared tuple store. A colorless pass grows the *finite part* from the
//! initial singleton set; a colored pass re-seeds the initial tuple and grows
//! the *infinite part*, where every set carries a three-valued color tracking
//! the Büchi acceptance obligation; a final *connect pass* expands every
//! finite-part tuple once more in colored mode, wiring the two halves
//! together. The resulting tuple store is then flattened back into a state
//! store that replaces the input automaton's data.

mod project;
pub(crate) mod sets;
pub(crate) mod tuples;

use std::str::FromStr;
use std::time::{Duration, Instant};

use bit_set::BitSet;
use tracing::debug;

use crate::automaton::{Fa, FaClass, FaKind, StateStore};
use crate::error::Error;
use crate::store::StoreEntry;
use sets::{SetId, SetOfStates, SetStore, modified_subset_construction};
use tuples::{Part, Tuple, TupleId, TupleStore, tuple_construction};

/// The three flavors of the complementation construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// The plain construction; the input is used as is.
    Unifr,
    /// Prunes successors led by a trailing discontinued set; the input is
    /// made complete first.
    Unifr2,
    /// No pruning, but the input is made complete first. This differs from
    /// [`Variant::Unifr`] exactly by the completion step.
    Unifr3,
}

impl Variant {
    fn optimizes(self) -> bool {
        matches!(self, Variant::Unifr2)
    }

    fn completes(self) -> bool {
        matches!(self, Variant::Unifr2 | Variant::Unifr3)
    }

    /// The key under which the variant is requested on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Variant::Unifr => "unifr",
            Variant::Unifr2 => "unifr2",
            Variant::Unifr3 => "unifr3",
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unifr" => Ok(Variant::Unifr),
            "unifr2" => Ok(Variant::Unifr2),
            "unifr3" => Ok(Variant::Unifr3),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Verbosity switches of the complementation entry point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub time: bool,
    pub memory: bool,
}

/// Size and timing figures of a finished complementation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComplementStats {
    pub input_states: usize,
    pub sets: usize,
    pub tuples: usize,
    pub output_states: usize,
    pub runtime: Option<Duration>,
}

/// All state the construction threads through its components: the borrowed
/// input states, the two stores it owns, the current mode and the label of
/// the initial tuple consulted by the intern helpers.
pub(crate) struct ComplementationContext<'a> {
    pub(crate) states: &'a StateStore,
    pub(crate) nb_symbols: usize,
    pub(crate) sets: SetStore,
    pub(crate) tuples: TupleStore,
    pub(crate) part: Part,
    pub(crate) optimize: bool,
    pub(crate) initial_label: String,
    /// Scratch flags marking states already claimed by a successor tuple
    /// under construction; cleared after every symbol round.
    pub(crate) visited: BitSet,
}

impl<'a> ComplementationContext<'a> {
    fn new(states: &'a StateStore, nb_symbols: usize, optimize: bool) -> Self {
        Self {
            states,
            nb_symbols,
            sets: SetStore::new(),
            tuples: TupleStore::new(),
            part: Part::Finite,
            optimize,
            initial_label: String::new(),
            visited: BitSet::new(),
        }
    }

    /// Whether the construction currently attaches colors, i.e. builds the
    /// infinite part.
    pub(crate) fn colored(&self) -> bool {
        self.part == Part::Infinite
    }

    /// Interns a set of states: returns the incumbent entry for the compound
    /// key `(label, color)` or inserts the given set. The flag is `true` for
    /// a fresh insertion.
    pub(crate) fn intern_set(&mut self, set: SetOfStates) -> (SetId, bool) {
        if let Some(id) = self.sets.lookup(&set.key()) {
            (id, false)
        } else {
            (self.sets.insert(set), true)
        }
    }

    /// Interns a tuple. In the finite part the lookup is colorless: a label
    /// may refer to the initial tuple or a finite-part tuple. In the infinite
    /// part only infinite-part tuples compare equal, which is what lets the
    /// two copies of the initial tuple coexist.
    pub(crate) fn intern_tuple(&mut self, tuple: Tuple) -> (TupleId, bool) {
        let label = tuple.label().to_string();
        match self.part {
            Part::Finite => {
                if let Some(id) = self.tuples.lookup(&(label.clone(), Part::Initial)) {
                    return (id, false);
                }
                if let Some(id) = self.tuples.lookup(&(label, Part::Finite)) {
                    return (id, false);
                }
                (self.tuples.insert(tuple), true)
            }
            Part::Infinite => {
                if let Some(id) = self.tuples.lookup(&(label, Part::Infinite)) {
                    (id, false)
                } else {
                    (self.tuples.insert(tuple), true)
                }
            }
            Part::Initial => unreachable!("the construction never runs in initial mode"),
        }
    }

    /// Whether `label` starts with the full label of the initial tuple.
    pub(crate) fn matches_initial_label(&self, label: &str) -> bool {
        let prefix = self.initial_label.as_bytes();
        !prefix.is_empty() && label.as_bytes().get(..prefix.len()) == Some(prefix)
    }
}

/// Complements the given nondeterministic Büchi automaton in place.
///
/// The input must be a Büchi automaton; a deterministic one is returned
/// unchanged. On success the automaton's state store is replaced by the
/// complement, which is always classed non-deterministic; alphabet, name and
/// type are untouched.
pub fn complement(
    fa: &mut Fa,
    variant: Variant,
    verbosity: Verbosity,
) -> Result<ComplementStats, Error> {
    if fa.kind() != FaKind::Buechi {
        return Err(Error::NotBuchi);
    }
    if fa.class() == FaClass::Deterministic {
        debug!("automaton '{}' is deterministic, nothing to complement", fa.name());
        return Ok(ComplementStats::default());
    }

    let start = verbosity.time.then(Instant::now);
    if variant.completes() {
        fa.make_complete();
    }

    let input_states = fa.states().len();
    let (mut stats, projected) = {
        let ctx = construct(fa.states(), fa.alphabet().len(), variant)?;
        let stats = ComplementStats {
            input_states,
            sets: ctx.sets.len(),
            tuples: ctx.tuples.len(),
            output_states: 0,
            runtime: None,
        };
        (stats, project::project_tuples(ctx))
    };
    stats.output_states = projected.len();
    fa.replace_states(projected);

    stats.runtime = start.map(|t| t.elapsed());
    if let Some(runtime) = stats.runtime {
        debug!(
            "complementing Büchi automaton '{}' took {} μs",
            fa.name(),
            runtime.as_micros()
        );
    }
    if verbosity.memory {
        debug!(
            "complement of '{}': {} input states, {} sets, {} tuples, {} output states",
            fa.name(),
            stats.input_states,
            stats.sets,
            stats.tuples,
            stats.output_states
        );
    }
    Ok(stats)
}

/// Runs the three construction passes and returns the finished context. The
/// caller projects the tuple store into a state store and drops the rest.
pub(crate) fn construct<'a>(
    states: &'a StateStore,
    nb_symbols: usize,
    variant: Variant,
) -> Result<ComplementationContext<'a>, Error> {
    let initial = states.initial().ok_or(Error::MissingInitial)?;
    let mut ctx = ComplementationContext::new(states, nb_symbols, variant.optimizes());

    // finite part: colorless construction seeded with the initial singleton
    let initial_set = SetOfStates::from_states(states, vec![initial]);
    let (initial_set, _) = ctx.intern_set(initial_set);
    ctx.sets.set_initial(initial_set);
    modified_subset_construction(&mut ctx, vec![initial_set])?;

    let initial_tuple = Tuple::assemble(&ctx.sets, vec![initial_set], Part::Initial);
    ctx.initial_label = initial_tuple.label().to_string();
    let initial_tuple = ctx.tuples.insert(initial_tuple);
    ctx.tuples.set_initial(initial_tuple);
    tuple_construction(&mut ctx, vec![initial_tuple])?;
    debug!(
        "finite part holds {} tuples over {} sets",
        ctx.tuples.len(),
        ctx.sets.len()
    );

    // infinite part: the same loop in colored mode, re-seeded with the
    // initial tuple
    ctx.part = Part::Infinite;
    tuple_construction(&mut ctx, vec![initial_tuple])?;
    debug!(
        "infinite part grown to {} tuples over {} sets",
        ctx.tuples.len(),
        ctx.sets.len()
    );

    // connect pass: expand every finite-part tuple once more, colored
    let finite: Vec<TupleId> = ctx
        .tuples
        .iter()
        .filter(|(_, tuple)| tuple.part() == Part::Finite)
        .map(|(id, _)| id)
        .collect();
    if !finite.is_empty() {
        tuple_construction(&mut ctx, finite)?;
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::{ComplementationContext, Variant, construct};
    use crate::automaton::Fa;
    use crate::complement::sets::Color;
    use crate::complement::tuples::Part;

    fn one_state(accepting: bool) -> Fa {
        let builder = Fa::builder().with_transitions([("q0", 'a', "q0")]);
        let builder = if accepting {
            builder.with_accepting(["q0"])
        } else {
            builder
        };
        builder.into_buchi("q0").unwrap()
    }

    fn mixed_move() -> Fa {
        Fa::builder()
            .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q1", 'a', "q1")])
            .with_accepting(["q1"])
            .into_buchi("q0")
            .unwrap()
    }

    fn two_symbol_cycle() -> Fa {
        Fa::builder()
            .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q0")])
            .with_accepting(["q1"])
            .into_buchi("q0")
            .unwrap()
    }

    fn construct_for(fa: &Fa, variant: Variant) -> ComplementationContext<'_> {
        construct(fa.states(), fa.alphabet().len(), variant).unwrap()
    }

    fn assert_store_invariants(ctx: &ComplementationContext<'_>) {
        let mut set_keys = std::collections::HashSet::new();
        for (_, set) in ctx.sets.iter() {
            let (open, close) = set.color().brackets();
            assert!(set.label().starts_with(open) && set.label().ends_with(close));
            assert!(!set.states().is_empty());
            assert!(set_keys.insert((set.label().to_string(), set.color())));
            if set.mixed() {
                assert!(set.successors.is_none(), "mixed sets are never expanded");
            }
            if let Some(row) = &set.successors {
                for &cell in row.iter().flatten() {
                    let _ = ctx.sets.get(cell);
                }
            }
        }
        let mut tuple_keys = std::collections::HashSet::new();
        for (_, tuple) in ctx.tuples.iter() {
            assert!(tuple_keys.insert((tuple.label().to_string(), tuple.part())));
            for &member in tuple.members() {
                let _ = ctx.sets.get(member);
            }
            for cell in tuple.successors.as_ref().expect("expanded") {
                for &successor in cell {
                    let _ = ctx.tuples.get(successor);
                }
            }
        }
    }

    #[test]
    fn accepting_loop_yields_a_discontinued_copy() {
        let fa = one_state(true);
        let ctx = construct_for(&fa, Variant::Unifr);

        let finite: Vec<_> = ctx
            .tuples
            .iter()
            .filter(|(_, t)| t.part() != Part::Infinite)
            .collect();
        assert_eq!(finite.len(), 1);

        let copy = ctx
            .tuples
            .lookup(&("([q0])".to_string(), Part::Infinite))
            .unwrap();
        assert!(!ctx.tuples.get(copy).accept());
        assert!(ctx.tuples.get(copy).has_discontinued());
        assert!(ctx.tuples.iter().all(|(_, t)| !t.accept()));
    }

    #[test]
    fn rejecting_loop_yields_an_accepting_ordinary_copy() {
        let fa = one_state(false);
        let ctx = construct_for(&fa, Variant::Unifr);

        let copy = ctx
            .tuples
            .lookup(&("({q0})".to_string(), Part::Infinite))
            .unwrap();
        assert!(ctx.tuples.get(copy).accept());
        assert!(ctx.tuples.get(copy).visited, "the infinite copy of the initial tuple is marked");
        let ordinary = ctx
            .sets
            .lookup(&("{q0}".to_string(), Color::Ordinary))
            .unwrap();
        assert_eq!(ctx.tuples.get(copy).members(), [ordinary]);
    }

    #[test]
    fn mixed_sets_are_interned_but_not_expanded() {
        let fa = mixed_move();
        let ctx = construct_for(&fa, Variant::Unifr2);
        let mixed = ctx
            .sets
            .lookup(&("{q0,q1}".to_string(), Color::Fordinary))
            .unwrap();
        assert!(ctx.sets.get(mixed).mixed());
        assert!(ctx.sets.get(mixed).successors.is_none());
    }

    #[test]
    fn splitting_yields_the_colored_successor_tuple() {
        let fa = mixed_move();
        let ctx = construct_for(&fa, Variant::Unifr);

        let successor = ctx
            .tuples
            .lookup(&("({q0},[q1])".to_string(), Part::Infinite))
            .unwrap();
        let initial = ctx.tuples.initial().unwrap();
        let row = ctx.tuples.get(initial).successors.as_ref().unwrap();
        assert!(row[0].contains(&successor));
    }

    #[test]
    fn optimization_abandons_successors_with_discontinued_heads() {
        let fa = mixed_move();
        let ctx = construct_for(&fa, Variant::Unifr2);

        assert_eq!(
            ctx.tuples.lookup(&("({q0},[q1])".to_string(), Part::Infinite)),
            None
        );
        assert!(ctx.tuples.iter().all(|(_, t)| t.part() != Part::Infinite));
    }

    #[test]
    fn connect_pass_wires_finite_tuples_into_the_infinite_part() {
        let fa = two_symbol_cycle();
        let ctx = construct_for(&fa, Variant::Unifr);

        let finite: Vec<_> = ctx
            .tuples
            .iter()
            .filter(|(_, t)| t.part() == Part::Finite)
            .collect();
        assert!(!finite.is_empty());
        let wired = finite.iter().any(|(_, t)| {
            t.successors
                .as_ref()
                .unwrap()
                .iter()
                .flatten()
                .any(|&s| ctx.tuples.get(s).part() == Part::Infinite)
        });
        assert!(wired);
    }

    #[test]
    fn store_invariants_hold_for_every_variant() {
        for variant in [Variant::Unifr, Variant::Unifr2, Variant::Unifr3] {
            for mut fa in [one_state(true), one_state(false), mixed_move(), two_symbol_cycle()] {
                if matches!(variant, Variant::Unifr2 | Variant::Unifr3) {
                    fa.make_complete();
                }
                let ctx = construct_for(&fa, variant);
                assert_store_invariants(&ctx);
            }
        }
    }
}
