//! GraphViz egress for the state-store representation.

use std::fmt::Write;

use crate::automaton::Fa;

/// Renders the automaton as a GraphViz digraph. Accepting states are drawn
/// as double circles and an unlabeled point marks the initial state.
pub fn render_dot(fa: &Fa) -> String {
    let mut out = String::new();
    writeln!(&mut out, "digraph \"{}\" {{", escape(fa.name())).unwrap();
    writeln!(&mut out, "  rankdir = LR;").unwrap();

    for (_, state) in fa.states().iter() {
        let shape = if state.accept() { "doublecircle" } else { "circle" };
        writeln!(&mut out, "  \"{}\" [shape = {shape}];", escape(state.label())).unwrap();
    }

    if let Some(init) = fa.initial() {
        writeln!(&mut out, "  __init [shape = point, label = \"\"];").unwrap();
        writeln!(
            &mut out,
            "  __init -> \"{}\";",
            escape(fa.states().get(init).label())
        )
        .unwrap();
    }

    for (_, state) in fa.states().iter() {
        for (symbol, name) in fa.alphabet().symbols().enumerate() {
            for &to in state.successors(symbol) {
                writeln!(
                    &mut out,
                    "  \"{}\" -> \"{}\" [label = \"{name}\"];",
                    escape(state.label()),
                    escape(fa.states().get(to).label()),
                )
                .unwrap();
            }
        }
    }

    out.push_str("}\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}
