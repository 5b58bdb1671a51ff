//! Command line companion of the `fribourg` library.
//!
//! Reads an automaton in the textual format of [`format`], runs the
//! requested algorithms against it and writes the result as text or DOT.

use std::io::Read;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, ValueEnum};
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

use fribourg::dot::render_dot;
use fribourg::{ComplementStats, Variant, Verbosity, complement};

mod format;

/// Prints the single diagnostic line every failure produces and exits.
macro_rules! fail {
    ($message:expr, $cause:expr) => {{
        eprintln!(" [BUECHI] {}:{} {}: {}", file!(), line!(), $message, $cause);
        exit(1)
    }};
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Dot,
}

#[derive(Parser)]
#[command(
    name = "fribourg",
    version,
    about = "Manipulate finite automata; complement nondeterministic Büchi automata."
)]
struct Cli {
    /// Input automaton description; `-` reads standard input.
    input: String,

    /// Comma separated algorithm requests of the form `category.key`,
    /// e.g. `complementation.unifr2`.
    #[arg(short, long, value_delimiter = ',')]
    algorithm: Vec<String>,

    /// Comma separated verbosity switches over {memory, time}.
    #[arg(short, long, value_delimiter = ',')]
    verbosity: Vec<String>,

    /// File the result is written to; standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output representation.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut verbosity = Verbosity::default();
    for switch in &cli.verbosity {
        match switch.as_str() {
            "time" => verbosity.time = true,
            "memory" => verbosity.memory = true,
            other => fail!("unknown verbosity switch", other),
        }
    }

    let text = if cli.input == "-" {
        let mut buffer = String::new();
        match std::io::stdin().read_to_string(&mut buffer) {
            Ok(_) => buffer,
            Err(e) => fail!("cannot read standard input", e),
        }
    } else {
        match std::fs::read_to_string(&cli.input) {
            Ok(text) => text,
            Err(e) => fail!("cannot read input file", e),
        }
    };
    let mut fa = match format::parse(&text) {
        Ok(fa) => fa,
        Err(e) => fail!("cannot parse automaton", e),
    };

    for request in &cli.algorithm {
        let Some(("complementation", key)) = request.split_once('.') else {
            fail!("unsupported algorithm request", request);
        };
        let variant: Variant = match key.parse() {
            Ok(variant) => variant,
            Err(e) => fail!("unsupported algorithm request", e),
        };
        let stats = match complement(&mut fa, variant, verbosity) {
            Ok(stats) => stats,
            Err(e) => fail!("failed to complement automaton", e),
        };
        if verbosity.time {
            if let Some(runtime) = stats.runtime {
                println!(
                    " [BUECHI] Complementing Büchi automaton '{}': {} s {} ns",
                    fa.name(),
                    runtime.as_secs(),
                    runtime.subsec_nanos()
                );
            }
        }
        if verbosity.memory {
            println!("{}", stats_table(&stats));
        }
    }

    let rendered = match cli.format {
        OutputFormat::Text => format::render(&fa),
        OutputFormat::Dot => render_dot(&fa),
    };
    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                fail!("cannot write output file", e);
            }
        }
        None => print!("{rendered}"),
    }
}

fn stats_table(stats: &ComplementStats) -> String {
    #[derive(Tabled)]
    struct Row {
        metric: &'static str,
        count: usize,
    }

    Table::new([
        Row {
            metric: "input states",
            count: stats.input_states,
        },
        Row {
            metric: "sets of states",
            count: stats.sets,
        },
        Row {
            metric: "tuples",
            count: stats.tuples,
        },
        Row {
            metric: "output states",
            count: stats.output_states,
        },
    ])
    .to_string()
}
