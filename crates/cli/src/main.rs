//! Tomasulo core simulator CLI.
//!
//! This binary provides a single entry point: load a program, run it to
//! completion against a configurable Tomasulo engine, and print the final
//! architectural state.

use std::path::Path;
use std::{fs, process};

use clap::Parser;
use tomasulo_core::asm;
use tomasulo_core::config::Config;
use tomasulo_core::engine::{Engine, Termination};
use tomasulo_core::stats::SimStats;
use tomasulo_core::SimError;

#[derive(Parser, Debug)]
#[command(
    name = "tomsim",
    author,
    version,
    about = "Tomasulo-style out-of-order core simulator",
    long_about = "Run a program against a configurable out-of-order core with a reorder buffer.\n\nExamples:\n  tomsim program.asm\n  tomsim program.asm --wide --trace\n  tomsim program.asm --config config.json"
)]
struct Cli {
    /// Assembly program to run.
    file: String,

    /// Path to a JSON config overriding the defaults.
    #[arg(long)]
    config: Option<String>,

    /// Use the wide preset (10 reservation stations, 10-entry ROB, width 8)
    /// instead of the narrow default. Ignored if `--config` is given.
    #[arg(long)]
    wide: bool,

    /// Emit a per-cycle trace via `tracing` (also controllable with
    /// `RUST_LOG`).
    #[arg(long)]
    trace: bool,

    /// Override the absolute cycle cap.
    #[arg(long)]
    max_cycles: Option<u64>,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path),
        None if cli.wide => Config::wide(),
        None => Config::default(),
    };
    if cli.trace {
        config.general.trace = true;
    }
    if let Some(max_cycles) = cli.max_cycles {
        config.general.max_cycles = max_cycles;
    }

    let source = read_program(&cli.file).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    let program = asm::parse(&source).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    if program.len() > config.sizes.instr_mem {
        eprintln!(
            "error: program has {} instructions, exceeds instr_mem={}",
            program.len(),
            config.sizes.instr_mem
        );
        process::exit(1);
    }

    let mut engine = Engine::new(config);
    let report = engine.run(&program);

    if !report.trace.is_empty() {
        let stats = SimStats::from_report(&report);
        stats.print_sections(report.termination);
        println!();
    }

    print!("registers: ");
    engine.registers().dump();

    match report.termination {
        Termination::Halted | Termination::ProgramExhausted => process::exit(0),
        Termination::CycleCap => {
            println!("note: simulation exceeded the cycle cap; state above is partial.");
            process::exit(0);
        }
        Termination::Deadlock => {
            println!("note: simulation made no progress for the deadlock window; aborting.");
            process::exit(0);
        }
    }
}

/// Reads the program file, translating an I/O failure into the library's
/// own error type rather than a CLI-local message.
fn read_program(path: &str) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|source| SimError::Io {
        path: Path::new(path).to_path_buf(),
        source,
    })
}

fn load_config(path: &str) -> Config {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: could not read config file {path}: {e}");
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: invalid config {path}: {e}");
        process::exit(1);
    })
}
