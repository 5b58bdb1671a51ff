//! Tuples of sets of states: the factory and the (optionally colored) tuple
//! construction that grows the complement automaton one symbol at a time.

use std::collections::VecDeque;

use itertools::Itertools;
use tracing::trace;

use crate::complement::ComplementationContext;
use crate::complement::sets::{
    Color, SetId, SetOfStates, SetStore, modified_subset_construction, move_states,
    subset_splitting,
};
use crate::error::Error;
use crate::store::{EntityStore, StoreEntry};

/// The part of the complement automaton a tuple was born in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Part {
    Initial,
    Finite,
    Infinite,
}

/// Handle to a tuple inside the tuple store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct TupleId(u32);

/// An ordered sequence of sets of states; a state of the complement.
#[derive(Debug)]
pub(crate) struct Tuple {
    label: String,
    part: Part,
    members: Vec<SetId>,
    accept: bool,
    reachable: bool,
    has_discontinued: bool,
    /// Marks the infinite-part copy of the initial tuple.
    pub(crate) visited: bool,
    /// One ordered successor list per symbol. The finite pass writes the
    /// first entry of a cell, the connect pass may append a second.
    pub(crate) successors: Option<Vec<Vec<TupleId>>>,
}

impl Tuple {
    /// Assembles a tuple from a non-empty, ordered list of member sets.
    ///
    /// In colorless mode the tuple never accepts; in colored mode it accepts
    /// iff no member is discontinued.
    pub(crate) fn assemble(sets: &SetStore, members: Vec<SetId>, part: Part) -> Self {
        assert!(!members.is_empty(), "a tuple must not be empty");
        let label = format!("({})", members.iter().map(|&m| sets.get(m).label()).join(","));
        let colored = part == Part::Infinite;
        let mut accept = colored;
        let mut has_discontinued = false;
        let mut reachable = false;
        for &m in &members {
            let set = sets.get(m);
            reachable |= set.reachable();
            if colored && set.color() == Color::Discontinued {
                accept = false;
                has_discontinued = true;
            }
        }
        Self {
            label,
            part,
            members,
            accept,
            reachable,
            has_discontinued,
            visited: false,
            successors: None,
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn part(&self) -> Part {
        self.part
    }

    pub(crate) fn members(&self) -> &[SetId] {
        &self.members
    }

    pub(crate) fn accept(&self) -> bool {
        self.accept
    }

    pub(crate) fn reachable(&self) -> bool {
        self.reachable
    }

    pub(crate) fn has_discontinued(&self) -> bool {
        self.has_discontinued
    }
}

impl StoreEntry for Tuple {
    type Key = (String, Part);
    type Id = TupleId;

    fn key(&self) -> Self::Key {
        (self.label.clone(), self.part)
    }
    fn id(index: usize) -> Self::Id {
        TupleId(index as u32)
    }
    fn index(id: Self::Id) -> usize {
        id.0 as usize
    }
}

pub(crate) type TupleStore = EntityStore<Tuple>;

/// The color a one-symbol move of a non-mixed member receives, keyed on the
/// member's own color and acceptance, the flags of the moved set and the
/// discontinued obligation of the enclosing tuple.
fn move_color(
    parent: Color,
    parent_accept: bool,
    successor_accept: bool,
    successor_mixed: bool,
    has_discontinued: bool,
) -> Color {
    match parent {
        Color::Fordinary if parent_accept || successor_mixed => Color::Discontinued,
        Color::Fordinary | Color::Ordinary => {
            if successor_accept || successor_mixed {
                if has_discontinued {
                    Color::OnHold
                } else {
                    Color::Discontinued
                }
            } else {
                Color::Ordinary
            }
        }
        Color::OnHold if has_discontinued => Color::OnHold,
        Color::OnHold | Color::Discontinued => Color::Discontinued,
    }
}

/// Folds the (reversed) list of split results for one member into the
/// accumulating successor tuple.
///
/// States already claimed by a previously processed set are skipped, so no
/// state appears in two member sets of one successor tuple; sets that become
/// empty after this pruning are dropped. The surviving list is re-interned
/// with the color of its source set restored and prepended, which yields the
/// left-to-right member order of the successor tuple.
fn build_successor_members(
    ctx: &mut ComplementationContext<'_>,
    successor_members: &mut Vec<SetId>,
    pending: &[SetId],
) -> Result<(), Error> {
    for &sid in pending {
        let (source_color, source_states) = {
            let set = ctx.sets.get(sid);
            (set.color(), set.states().to_vec())
        };
        let mut kept = Vec::new();
        for q in source_states {
            if ctx.visited.insert(q.index()) {
                kept.push(q);
            }
        }
        if kept.is_empty() {
            continue;
        }
        let mut set = SetOfStates::from_states(ctx.states, kept);
        if ctx.colored() {
            set.recolor(match source_color {
                Color::Fordinary | Color::Ordinary => Color::Ordinary,
                restored => restored,
            });
        }
        let (id, fresh) = ctx.intern_set(set);
        if fresh && !ctx.sets.get(id).mixed() {
            modified_subset_construction(ctx, vec![id])?;
        }
        successor_members.insert(0, id);
    }
    Ok(())
}

/// The tuple construction: computes the one-symbol successors of every tuple
/// on the worklist until closure, in the mode the context is currently in
/// (colorless for the finite part, colored for the infinite part and the
/// connect pass).
pub(crate) fn tuple_construction(
    ctx: &mut ComplementationContext<'_>,
    seeds: Vec<TupleId>,
) -> Result<(), Error> {
    if seeds.is_empty() {
        return Err(Error::InvalidArgument("empty worklist for tuple construction"));
    }

    let mut work: VecDeque<TupleId> = seeds.into();
    while let Some(tid) = work.pop_front() {
        debug_assert!(
            ctx.tuples.get(tid).successors.is_none()
                || (ctx.colored() && ctx.tuples.get(tid).part() != Part::Infinite),
            "a tuple is expanded at most once per mode"
        );
        if ctx.tuples.get(tid).successors.is_none() {
            ctx.tuples.get_mut(tid).successors = Some(vec![Vec::new(); ctx.nb_symbols]);
        }
        let members = ctx.tuples.get(tid).members().to_vec();
        let has_discontinued = ctx.tuples.get(tid).has_discontinued();
        let last = members.len() - 1;

        for symbol in 0..ctx.nb_symbols {
            let mut successor_members: Vec<SetId> = Vec::new();
            let mut abandoned = false;

            // members are visited rightmost first; prepending in the build
            // step restores the left-to-right order of the successor
            for (position, &member) in members.iter().enumerate().rev() {
                let (parent_color, parent_accept, parent_states) = {
                    let set = ctx.sets.get(member);
                    (set.color(), set.accept(), set.states().to_vec())
                };
                let moved = move_states(ctx.states, &parent_states, symbol);
                if moved.is_empty() {
                    continue;
                }
                let mut successor = SetOfStates::from_states(ctx.states, moved);
                if ctx.colored() {
                    successor.recolor(move_color(
                        parent_color,
                        parent_accept,
                        successor.accept(),
                        successor.mixed(),
                        has_discontinued,
                    ));
                }
                let (successor, fresh) = ctx.intern_set(successor);
                if fresh && !ctx.sets.get(successor).mixed() {
                    modified_subset_construction(ctx, vec![successor])?;
                }

                let pending: Vec<SetId> = if ctx.sets.get(successor).mixed() {
                    subset_splitting(ctx, successor, parent_color, has_discontinued).to_vec()
                } else {
                    vec![successor]
                };

                // a discontinued head at the rightmost position makes the
                // whole successor for this symbol redundant
                if ctx.optimize
                    && position == last
                    && ctx.sets.get(pending[0]).color() == Color::Discontinued
                {
                    debug_assert!(successor_members.is_empty());
                    trace!(
                        "abandoning successor of {} on symbol {symbol}",
                        ctx.tuples.get(tid).label()
                    );
                    abandoned = true;
                    break;
                }

                build_successor_members(ctx, &mut successor_members, &pending)?;
            }
            ctx.visited.clear();

            if abandoned || successor_members.is_empty() {
                continue;
            }

            let tuple = Tuple::assemble(&ctx.sets, successor_members, ctx.part);
            let (successor, fresh) = ctx.intern_tuple(tuple);
            if fresh {
                if ctx.matches_initial_label(ctx.tuples.get(successor).label()) {
                    ctx.tuples.get_mut(successor).visited = true;
                }
                trace!("discovered tuple {}", ctx.tuples.get(successor).label());
                work.push_back(successor);
            }
            ctx.tuples
                .get_mut(tid)
                .successors
                .as_mut()
                .expect("the successor row was allocated above")[symbol]
                .push(successor);
        }
    }
    Ok(())
}
