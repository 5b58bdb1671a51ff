use itertools::Itertools;

use crate::alphabet::Alphabet;
use crate::automaton::{AutState, Fa, FaClass, FaKind, StateStore};
use crate::error::Error;

/// Helper struct for the construction of finite automata. It collects
/// transitions, accepting state labels and extra alphabet symbols, and only
/// materializes states when the automaton is built.
///
/// # Example
///
/// A Büchi automaton with two states over the alphabet `['a', 'b']` where
/// `q1` is accepting and `q0` is initial:
/// ```
/// use fribourg::Fa;
///
/// let fa = Fa::builder()
///     .with_transitions([("q0", 'a', "q1"), ("q1", 'b', "q0")])
///     .with_accepting(["q1"])
///     .into_buchi("q0")
///     .unwrap();
/// assert_eq!(fa.states().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct FaBuilder {
    name: Option<String>,
    symbols: Vec<char>,
    states: Vec<String>,
    transitions: Vec<(String, char, String)>,
    accepting: Vec<String>,
    deterministic: bool,
}

impl FaBuilder {
    /// Sets the name of the automaton. Defaults to `"fa"`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// By default the alphabet consists of the symbols appearing on at least
    /// one transition. This method forces additional symbols to appear.
    pub fn with_alphabet_symbols<I: IntoIterator<Item = char>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Declares states that might not appear on any transition.
    pub fn with_states<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Adds transitions given as `(from, symbol, to)` triples. States are
    /// created on demand from the labels that appear here.
    pub fn with_transitions<I, S, T>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        self.transitions
            .extend(iter.into_iter().map(|(p, a, q)| (p.into(), a, q.into())));
        self
    }

    /// Marks the given state labels as accepting.
    pub fn with_accepting<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepting.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Declares the automaton deterministic. The class is taken at face
    /// value and not verified against the transition structure.
    pub fn deterministic(mut self) -> Self {
        self.deterministic = true;
        self
    }

    /// Builds a Büchi automaton with the given initial state.
    pub fn into_buchi(self, initial: &str) -> Result<Fa, Error> {
        self.build(FaKind::Buechi, initial)
    }

    /// Builds an automaton over finite words with the given initial state.
    pub fn into_ordinary(self, initial: &str) -> Result<Fa, Error> {
        self.build(FaKind::Ordinary, initial)
    }

    fn build(self, kind: FaKind, initial: &str) -> Result<Fa, Error> {
        let alphabet = Alphabet::new(
            self.symbols
                .iter()
                .copied()
                .chain(self.transitions.iter().map(|(_, a, _)| *a)),
        );

        let labels = self
            .states
            .iter()
            .map(String::as_str)
            .chain(
                self.transitions
                    .iter()
                    .flat_map(|(p, _, q)| [p.as_str(), q.as_str()]),
            )
            .chain(self.accepting.iter().map(String::as_str))
            .chain([initial])
            .unique();

        let mut states = StateStore::new();
        for label in labels {
            let accept = self.accepting.iter().any(|a| a == label);
            states.insert(AutState::new(label, accept, alphabet.len()));
        }

        for (from, symbol, to) in &self.transitions {
            let s = alphabet
                .index_of(*symbol)
                .ok_or(Error::UnknownSymbol(*symbol))?;
            let p = states.lookup(from.as_str()).expect("source state was created");
            let q = states.lookup(to.as_str()).expect("target state was created");
            if !states.get(p).transitions[s].contains(&q) {
                states.get_mut(p).transitions[s].push(q);
            }
            states.get_mut(q).reachable = true;
        }

        let init = states.lookup(initial).expect("initial state was created");
        states.get_mut(init).reachable = true;
        states.set_initial(init);

        Ok(Fa {
            name: self.name.unwrap_or_else(|| "fa".to_string()),
            alphabet,
            kind,
            class: if self.deterministic {
                FaClass::Deterministic
            } else {
                FaClass::NonDeterministic
            },
            states,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::automaton::{Fa, FaClass, FaKind};

    #[test]
    fn builder_creates_states_from_mentions() {
        let fa = Fa::builder()
            .with_name("demo")
            .with_transitions([("q0", 'a', "q0"), ("q0", 'a', "q1"), ("q1", 'b', "q0")])
            .with_accepting(["q1"])
            .into_buchi("q0")
            .unwrap();

        assert_eq!(fa.name(), "demo");
        assert_eq!(fa.kind(), FaKind::Buechi);
        assert_eq!(fa.class(), FaClass::NonDeterministic);
        assert_eq!(fa.alphabet().len(), 2);
        assert_eq!(fa.states().len(), 2);

        let q0 = fa.states().lookup("q0").unwrap();
        let q1 = fa.states().lookup("q1").unwrap();
        assert_eq!(fa.initial(), Some(q0));
        assert!(fa.states().get(q1).accept());
        assert_eq!(fa.states().get(q0).successors(0), [q0, q1]);
        assert_eq!(fa.states().get(q1).successors(1), [q0]);
        assert!(fa.states().get(q1).successors(0).is_empty());
    }

    #[test]
    fn duplicate_transitions_collapse() {
        let fa = Fa::builder()
            .with_transitions([("p", 'a', "q"), ("p", 'a', "q")])
            .into_buchi("p")
            .unwrap();
        let p = fa.states().lookup("p").unwrap();
        assert_eq!(fa.states().get(p).successors(0).len(), 1);
    }

    #[test]
    fn isolated_states_and_extra_symbols() {
        let fa = Fa::builder()
            .with_states(["lone"])
            .with_alphabet_symbols("ab".chars())
            .into_buchi("lone")
            .unwrap();
        assert_eq!(fa.alphabet().len(), 2);
        assert_eq!(fa.states().len(), 1);
        let lone = fa.states().lookup("lone").unwrap();
        assert!(fa.states().get(lone).successors(1).is_empty());
    }
}
