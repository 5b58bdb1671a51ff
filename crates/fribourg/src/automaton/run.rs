use std::collections::{BTreeSet, VecDeque};

use crate::automaton::{Fa, FaKind, StateId};
use crate::error::Error;

impl Fa {
    /// Decides whether the ultimately periodic word `stem · cycle^ω` is
    /// accepted by this Büchi automaton.
    ///
    /// The stem is consumed by a subset simulation. Afterwards the search
    /// works on whole-cycle steps: reading the cycle once from a state `p`
    /// yields the pairs `(q, f)` where `f` records whether some accepting
    /// state was visited along the way. The word is accepted iff a state
    /// reachable from the stem front closes a cycle of such steps that
    /// carries at least one accepting visit.
    pub fn accepts_lasso(&self, stem: &str, cycle: &str) -> Result<bool, Error> {
        if self.kind != FaKind::Buechi {
            return Err(Error::NotBuchi);
        }
        if cycle.is_empty() {
            return Err(Error::InvalidArgument("the cycle of a lasso must not be empty"));
        }
        let stem = self.symbol_indices(stem)?;
        let cycle = self.symbol_indices(cycle)?;
        let Some(init) = self.states.initial() else {
            return Err(Error::MissingInitial);
        };

        let mut front = BTreeSet::from([init]);
        for &s in &stem {
            front = front
                .iter()
                .flat_map(|&q| self.states.get(q).successors(s))
                .copied()
                .collect();
        }

        let cycle_step = |p: StateId| -> BTreeSet<(StateId, bool)> {
            let mut frontier = BTreeSet::from([(p, false)]);
            for &s in &cycle {
                let mut next = BTreeSet::new();
                for &(q, f) in &frontier {
                    for &r in self.states.get(q).successors(s) {
                        next.insert((r, f || self.states.get(r).accept));
                    }
                }
                frontier = next;
            }
            frontier
        };

        // anchors: states reachable from the stem front via whole cycles
        let mut anchors = front.clone();
        let mut queue: VecDeque<_> = front.into_iter().collect();
        while let Some(p) = queue.pop_front() {
            for (q, _) in cycle_step(p) {
                if anchors.insert(q) {
                    queue.push_back(q);
                }
            }
        }

        for &anchor in &anchors {
            let mut seen = BTreeSet::new();
            let mut queue = VecDeque::new();
            for (q, f) in cycle_step(anchor) {
                if seen.insert((q, f)) {
                    queue.push_back((q, f));
                }
            }
            while let Some((q, f)) = queue.pop_front() {
                if q == anchor && f {
                    return Ok(true);
                }
                for (r, g) in cycle_step(q) {
                    let reached = (r, f || g);
                    if seen.insert(reached) {
                        queue.push_back(reached);
                    }
                }
            }
        }
        Ok(false)
    }

    fn symbol_indices(&self, word: &str) -> Result<Vec<usize>, Error> {
        word.chars()
            .map(|c| self.alphabet.index_of(c).ok_or(Error::UnknownSymbol(c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::Fa;
    use crate::error::Error;

    fn ab_cycle() -> Fa {
        // accepts exactly (ab)^ω; runs die on any other word
        Fa::builder()
            .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q0")])
            .with_accepting(["q1"])
            .into_buchi("q0")
            .unwrap()
    }

    fn finitely_many_a() -> Fa {
        // guesses the point after which only b is read
        Fa::builder()
            .with_transitions([
                ("s0", 'a', "s0"),
                ("s0", 'b', "s0"),
                ("s0", 'b', "s1"),
                ("s1", 'b', "s1"),
            ])
            .with_accepting(["s1"])
            .into_buchi("s0")
            .unwrap()
    }

    #[test]
    fn lasso_membership_on_a_cycle() {
        let fa = ab_cycle();
        assert!(fa.accepts_lasso("", "ab").unwrap());
        assert!(fa.accepts_lasso("ab", "ab").unwrap());
        // a(ba)^ω is the same word as (ab)^ω
        assert!(fa.accepts_lasso("a", "ba").unwrap());
        assert!(!fa.accepts_lasso("", "a").unwrap());
        assert!(!fa.accepts_lasso("b", "ab").unwrap());
        assert!(!fa.accepts_lasso("", "ba").unwrap());
    }

    #[test]
    fn lasso_membership_with_nondeterministic_guess() {
        let fa = finitely_many_a();
        assert!(fa.accepts_lasso("", "b").unwrap());
        assert!(fa.accepts_lasso("aab", "b").unwrap());
        assert!(!fa.accepts_lasso("", "a").unwrap());
        assert!(!fa.accepts_lasso("b", "ab").unwrap());
        assert!(!fa.accepts_lasso("", "ba").unwrap());
    }

    #[test]
    fn lasso_arguments_are_validated() {
        let fa = ab_cycle();
        assert_eq!(fa.accepts_lasso("", ""), Err(Error::InvalidArgument("the cycle of a lasso must not be empty")));
        assert_eq!(fa.accepts_lasso("c", "a"), Err(Error::UnknownSymbol('c')));
    }
}
