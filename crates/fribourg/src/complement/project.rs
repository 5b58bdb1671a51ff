//! Flattening of the finished tuple store into a state store.

use crate::automaton::{AutState, StateId, StateStore};
use crate::complement::ComplementationContext;
use crate::complement::tuples::{Part, Tuple};

/// Materializes one state per tuple, then wires the transition rows in a
/// second pass. Tuples of the infinite part have their outer parentheses
/// rewritten to `[ ]`, which keeps the two cohabiting copies of equally
/// labeled tuples apart in the flat store. The tuple and set stores die with
/// the context when this returns.
pub(crate) fn project_tuples(ctx: ComplementationContext<'_>) -> StateStore {
    let nb_symbols = ctx.nb_symbols;
    let mut out = StateStore::new();

    for (tid, tuple) in ctx.tuples.iter() {
        let mut state = AutState::new(projected_label(tuple), tuple.accept(), nb_symbols);
        state.reachable = tuple.reachable();
        let sid = out.insert(state);
        if ctx.tuples.initial() == Some(tid) {
            out.set_initial(sid);
        }
    }

    for (_, tuple) in ctx.tuples.iter() {
        let from = out
            .lookup(projected_label(tuple).as_str())
            .expect("every tuple was materialized in the first pass");
        let row = tuple
            .successors
            .as_ref()
            .expect("every tuple owns a successor row");
        let transitions: Vec<Vec<StateId>> = row
            .iter()
            .map(|cell| {
                cell.iter()
                    .map(|&successor| {
                        out.lookup(projected_label(ctx.tuples.get(successor)).as_str())
                            .expect("successor tuples live in the tuple store")
                    })
                    .collect()
            })
            .collect();
        out.get_mut(from).transitions = transitions;
    }

    out
}

fn projected_label(tuple: &Tuple) -> String {
    let label = tuple.label();
    if tuple.part() == Part::Infinite {
        format!("[{}]", &label[1..label.len() - 1])
    } else {
        label.to_string()
    }
}
