//! The line-based textual automaton format of the command line tool.
//!
//! ```text
//! # comment
//! name demo
//! type buechi
//! class non-deterministic
//! alphabet ab
//! initial q0
//! accepting q1
//! state lonely
//! q0 a q0 q1
//! q1 b q0
//! ```
//!
//! A line whose first token is none of the keywords is a transition line:
//! source label, one symbol, one or more target labels. State labels must not
//! contain whitespace and must not collide with the keywords.

use fribourg::{Fa, FaKind};

pub fn parse(text: &str) -> Result<Fa, String> {
    let mut name = None;
    let mut kind = FaKind::Buechi;
    let mut deterministic = false;
    let mut initial = None;
    let mut accepting: Vec<String> = Vec::new();
    let mut states: Vec<String> = Vec::new();
    let mut symbols: Vec<char> = Vec::new();
    let mut transitions: Vec<(String, char, String)> = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let head = tokens.next().expect("non-empty line has a first token");
        match head {
            "name" => {
                name = Some(
                    tokens
                        .next()
                        .ok_or(format!("line {number}: missing automaton name"))?
                        .to_string(),
                );
            }
            "type" => {
                kind = match tokens.next() {
                    Some("buechi") => FaKind::Buechi,
                    Some("ordinary") => FaKind::Ordinary,
                    other => {
                        return Err(format!("line {number}: unknown automaton type {other:?}"));
                    }
                };
            }
            "class" => {
                deterministic = match tokens.next() {
                    Some("deterministic") => true,
                    Some("non-deterministic") => false,
                    other => {
                        return Err(format!("line {number}: unknown automaton class {other:?}"));
                    }
                };
            }
            "alphabet" => {
                let value = tokens
                    .next()
                    .ok_or(format!("line {number}: missing alphabet symbols"))?;
                symbols.extend(value.chars());
            }
            "initial" => {
                initial = Some(
                    tokens
                        .next()
                        .ok_or(format!("line {number}: missing initial state"))?
                        .to_string(),
                );
            }
            "accepting" => accepting.extend(tokens.map(str::to_string)),
            "state" => states.extend(tokens.map(str::to_string)),
            from => {
                let symbol = tokens
                    .next()
                    .ok_or(format!("line {number}: transition without a symbol"))?;
                let mut chars = symbol.chars();
                let symbol = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => {
                        return Err(format!(
                            "line {number}: transition symbols are single characters"
                        ));
                    }
                };
                let mut any = false;
                for target in tokens {
                    transitions.push((from.to_string(), symbol, target.to_string()));
                    any = true;
                }
                if !any {
                    return Err(format!("line {number}: transition without a target"));
                }
            }
        }
    }

    let initial = initial.ok_or("the automaton declares no initial state".to_string())?;
    let mut builder = Fa::builder()
        .with_name(name.unwrap_or_else(|| "fa".to_string()))
        .with_alphabet_symbols(symbols)
        .with_states(states)
        .with_transitions(transitions)
        .with_accepting(accepting);
    if deterministic {
        builder = builder.deterministic();
    }
    let result = match kind {
        FaKind::Buechi => builder.into_buchi(&initial),
        FaKind::Ordinary => builder.into_ordinary(&initial),
    };
    result.map_err(|e| e.to_string())
}

pub fn render(fa: &Fa) -> String {
    let mut out = String::new();
    out.push_str(&format!("name {}\n", fa.name()));
    out.push_str(&format!("type {}\n", fa.kind()));
    out.push_str(&format!("class {}\n", fa.class()));
    out.push_str(&format!("alphabet {}\n", fa.alphabet()));
    if let Some(initial) = fa.initial() {
        out.push_str(&format!("initial {}\n", fa.states().get(initial).label()));
    }
    let accepting: Vec<_> = fa
        .states()
        .iter()
        .filter(|(_, s)| s.accept())
        .map(|(_, s)| s.label())
        .collect();
    if !accepting.is_empty() {
        out.push_str(&format!("accepting {}\n", accepting.join(" ")));
    }
    for (_, state) in fa.states().iter() {
        out.push_str(&format!("state {}\n", state.label()));
    }
    for (_, state) in fa.states().iter() {
        for (symbol, name) in fa.alphabet().symbols().enumerate() {
            let targets = state.successors(symbol);
            if targets.is_empty() {
                continue;
            }
            out.push_str(state.label());
            out.push(' ');
            out.push(name);
            for &target in targets {
                out.push(' ');
                out.push_str(fa.states().get(target).label());
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{parse, render};
    use fribourg::{FaClass, FaKind};

    const SAMPLE: &str = "\
# a two state automaton
name demo
type buechi
class non-deterministic
alphabet ab
initial q0
accepting q1
q0 a q0 q1
q1 b q0
";

    #[test]
    fn parses_the_sample() {
        let fa = parse(SAMPLE).unwrap();
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
    }

    #[test]
    fn round_trips_through_render() {
        let fa = parse(SAMPLE).unwrap();
        let again = parse(&render(&fa)).unwrap();
        assert_eq!(fa.name(), again.name());
        assert_eq!(fa.states().len(), again.states().len());
        for (_, state) in fa.states().iter() {
            let other = again.states().lookup(state.label()).unwrap();
            assert_eq!(again.states().get(other).accept(), state.accept());
            for symbol in 0..fa.alphabet().len() {
                assert_eq!(
                    state.successors(symbol).len(),
                    again.states().get(other).successors(symbol).len()
                );
            }
        }
    }

    #[test]
    fn reports_parse_errors_with_line_numbers() {
        assert!(parse("initial q0\nq0\n").unwrap_err().contains("line 2"));
        assert!(
            parse("initial q0\nq0 ab q1\n")
                .unwrap_err()
                .contains("single characters")
        );
        assert!(parse("q0 a q0\n").unwrap_err().contains("no initial state"));
    }
}
