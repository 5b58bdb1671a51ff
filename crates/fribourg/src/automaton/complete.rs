use tracing::debug;

use crate::automaton::{AutState, Fa};

impl Fa {
    /// Completes the automaton: ensures `δ(q, s)` is non-empty for every
    /// state `q` and symbol `s` by adding at most one fresh non-accepting
    /// trap state that loops to itself on the whole alphabet.
    pub fn make_complete(&mut self) {
        let nb_symbols = self.alphabet.len();
        let missing: Vec<_> = self
            .states
            .iter()
            .flat_map(|(id, state)| {
                (0..nb_symbols)
                    .filter(move |&s| state.successors(s).is_empty())
                    .map(move |s| (id, s))
            })
            .collect();
        if missing.is_empty() {
            return;
        }

        let mut label = "sink".to_string();
        let mut n = 0usize;
        while self.states.lookup(label.as_str()).is_some() {
            n += 1;
            label = format!("sink{n}");
        }
        debug!("completing automaton '{}' with trap state '{label}'", self.name);

        let trap = self.states.insert(AutState::new(label, false, nb_symbols));
        let trap_state = self.states.get_mut(trap);
        trap_state.reachable = true;
        for row in &mut trap_state.transitions {
            row.push(trap);
        }
        for (id, symbol) in missing {
            self.states.get_mut(id).transitions[symbol].push(trap);
        }
    }
}
