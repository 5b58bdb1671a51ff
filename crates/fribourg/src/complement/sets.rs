//! Sets of NBA states: the factory, the move primitive, the modified subset
//! construction and subset splitting.

use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use crate::automaton::{StateId, StateStore};
use crate::complement::ComplementationContext;
use crate::error::Error;
use crate::store::{EntityStore, StoreEntry};

/// The Büchi obligation attached to a set of states.
///
/// `Fordinary` is the colorless default every freshly built set carries; it
/// doubles as the color of the finite part. The outer bracket pair of a set
/// label encodes the color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Color {
    Fordinary,
    Ordinary,
    OnHold,
    Discontinued,
}

impl Color {
    pub(crate) fn brackets(self) -> (char, char) {
        match self {
            Color::Fordinary | Color::Ordinary => ('{', '}'),
            Color::OnHold => ('(', ')'),
            Color::Discontinued => ('[', ']'),
        }
    }
}

/// Handle to a set of states inside the set store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SetId(u32);

/// An ordered set of NBA states, the building block of a tuple.
#[derive(Debug)]
pub(crate) struct SetOfStates {
    label: String,
    color: Color,
    states: Vec<StateId>,
    accept: bool,
    reachable: bool,
    mixed: bool,
    /// One cell per symbol; populated exactly once, and only for non-mixed
    /// sets. Mixed sets are expanded through splitting instead.
    pub(crate) successors: Option<Vec<Option<SetId>>>,
}

impl SetOfStates {
    /// Builds a fresh set from a non-empty list of states that is already
    /// ordered ascending by state label and free of duplicates. The set
    /// starts out colorless with `{ }` brackets and an empty successor row.
    pub(crate) fn from_states(states: &StateStore, list: Vec<StateId>) -> Self {
        assert!(!list.is_empty(), "a set of states must not be empty");
        let mut accept = false;
        let mut non_accept = false;
        let mut reachable = false;
        for &q in &list {
            let state = states.get(q);
            if state.accept() {
                accept = true;
            } else {
                non_accept = true;
            }
            reachable |= state.reachable();
        }
        let label = format!("{{{}}}", list.iter().map(|&q| states.get(q).label()).join(","));
        Self {
            label,
            color: Color::Fordinary,
            states: list,
            accept,
            reachable,
            mixed: accept && non_accept,
            successors: None,
        }
    }

    /// Rewrites the outer bracket pair of the label to reflect `color` and
    /// updates the color itself. Any store lookup must happen afterwards.
    pub(crate) fn recolor(&mut self, color: Color) {
        let (open, close) = color.brackets();
        let inner = &self.label[1..self.label.len() - 1];
        self.label = format!("{open}{inner}{close}");
        self.color = color;
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn states(&self) -> &[StateId] {
        &self.states
    }

    pub(crate) fn accept(&self) -> bool {
        self.accept
    }

    pub(crate) fn reachable(&self) -> bool {
        self.reachable
    }

    pub(crate) fn mixed(&self) -> bool {
        self.mixed
    }
}

impl StoreEntry for SetOfStates {
    type Key = (String, Color);
    type Id = SetId;

    fn key(&self) -> Self::Key {
        (self.label.clone(), self.color)
    }
    fn id(index: usize) -> Self::Id {
        SetId(index as u32)
    }
    fn index(id: Self::Id) -> usize {
        id.0 as usize
    }
}

pub(crate) type SetStore = EntityStore<SetOfStates>;

/// Computes the union of `δ(q, symbol)` over all members, yielded as a list
/// ordered ascending by state label with duplicates collapsed. An empty list
/// means the set has no move for this symbol.
pub(crate) fn move_states(states: &StateStore, members: &[StateId], symbol: usize) -> Vec<StateId> {
    let mut out: Vec<StateId> = members
        .iter()
        .flat_map(|&q| states.get(q).successors(symbol))
        .copied()
        .collect();
    out.sort_by(|&a, &b| states.get(a).label().cmp(states.get(b).label()));
    out.dedup();
    out
}

/// The modified subset construction: expands the successor rows of all sets
/// on the worklist until closure. Freshly discovered non-mixed sets join the
/// worklist; mixed sets are interned but held back, to be consumed only by
/// subset splitting during tuple construction.
pub(crate) fn modified_subset_construction(
    ctx: &mut ComplementationContext<'_>,
    seeds: Vec<SetId>,
) -> Result<(), Error> {
    if seeds.is_empty() {
        return Err(Error::InvalidArgument("empty worklist for subset construction"));
    }
    if ctx.states.is_empty() {
        return Err(Error::InvalidArgument("empty state store"));
    }

    let mut work: VecDeque<SetId> = seeds.into();
    while let Some(sid) = work.pop_front() {
        debug_assert!(
            ctx.sets.get(sid).successors.is_none(),
            "a set of states is expanded at most once"
        );
        let members = ctx.sets.get(sid).states().to_vec();
        let mut row: Vec<Option<SetId>> = vec![None; ctx.nb_symbols];
        for symbol in 0..ctx.nb_symbols {
            let moved = move_states(ctx.states, &members, symbol);
            if moved.is_empty() {
                continue;
            }
            let successor = SetOfStates::from_states(ctx.states, moved);
            let (successor, fresh) = ctx.intern_set(successor);
            if fresh && !ctx.sets.get(successor).mixed() {
                work.push_back(successor);
            }
            row[symbol] = Some(successor);
        }
        trace!("expanded set {}", ctx.sets.get(sid).label());
        ctx.sets.get_mut(sid).successors = Some(row);
    }
    Ok(())
}

/// The color transition table applied when a mixed set is split, keyed on
/// the color of the parent-in-transition and on whether the tuple currently
/// being expanded already carries a discontinued member. Yields the colors
/// of the accepting and the non-accepting child, in that order.
pub(crate) fn split_colors(parent: Color, has_discontinued: bool) -> (Color, Color) {
    match (parent, has_discontinued) {
        (Color::Fordinary, _) => (Color::Discontinued, Color::Ordinary),
        (Color::Ordinary, false) => (Color::Discontinued, Color::Ordinary),
        (Color::Ordinary, true) => (Color::OnHold, Color::Ordinary),
        (Color::OnHold, false) => (Color::Discontinued, Color::Ordinary),
        (Color::OnHold, true) => (Color::OnHold, Color::OnHold),
        (Color::Discontinued, _) => (Color::Discontinued, Color::Discontinued),
    }
}

/// Splits a mixed set into its accepting and non-accepting parts, recolors
/// both per [`split_colors`] and interns them. The accepting child comes
/// first, matching the reverse list the tuple build step consumes.
pub(crate) fn subset_splitting(
    ctx: &mut ComplementationContext<'_>,
    mixed: SetId,
    parent_color: Color,
    has_discontinued: bool,
) -> [SetId; 2] {
    let set = ctx.sets.get(mixed);
    assert!(set.mixed(), "only mixed sets are split");
    let (accepting, non_accepting): (Vec<_>, Vec<_>) = set
        .states()
        .iter()
        .copied()
        .partition(|&q| ctx.states.get(q).accept());

    let mut acc = SetOfStates::from_states(ctx.states, accepting);
    let mut nac = SetOfStates::from_states(ctx.states, non_accepting);
    if ctx.colored() {
        let (acc_color, nac_color) = split_colors(parent_color, has_discontinued);
        acc.recolor(acc_color);
        nac.recolor(nac_color);
    }
    trace!(
        "split {} into {} and {}",
        ctx.sets.get(mixed).label(),
        acc.label(),
        nac.label()
    );
    let (acc, _) = ctx.intern_set(acc);
    let (nac, _) = ctx.intern_set(nac);
    [acc, nac]
}
