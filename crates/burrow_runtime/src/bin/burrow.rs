//! Burrow CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use burrow_debug::{Tracer, TracerConfig};
use burrow_runtime::Repl;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    // Debug flags
    trace_vm: bool,
    json: bool,
    dump_rules: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::from(2)
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--trace-vm" => config.trace_vm = true,
            "--json" => config.json = true,
            "--dump-rules" => config.dump_rules = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

/// Returns whether every file matched.
fn run(args: Vec<String>) -> Result<bool, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(true);
    }

    if config.show_version {
        println!("burrow {}", env!("CARGO_PKG_VERSION"));
        return Ok(true);
    }

    let mut tracer_config = TracerConfig::new();
    if config.trace_vm {
        tracer_config = tracer_config.enabled().to_stderr().with_instructions();
    }
    if config.json {
        tracer_config = tracer_config.json();
    }

    let mut repl = Repl::new()?.with_tracer(Tracer::new(tracer_config));

    if config.dump_rules {
        println!("{}", repl.grammar().disassemble());
    }

    let mut all_matched = true;
    for file in &config.files {
        let outcome = repl.eval_file(file)?;
        all_matched &= outcome.is_match();
        if config.files.len() > 1 {
            println!("{}: {outcome}", file.display());
        } else {
            println!("{outcome}");
        }
    }

    if config.batch_mode {
        return Ok(all_matched);
    }

    if !config.files.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(true)
}

fn print_help() {
    println!(
        "\x1b[1mBurrow\x1b[0m - Packrat parsing VM for combinator grammars

\x1b[1mUSAGE:\x1b[0m
    burrow [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Files to parse with the arithmetic grammar before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -b, --batch        Parse files and exit (no REPL)

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace-vm         Trace rule calls and instructions to stderr
    --json             Write trace records as JSON
    --dump-rules       Print the compiled rules before parsing

\x1b[1mEXIT STATUS:\x1b[0m
    0 when every file matched, 1 when one did not, 2 on a fault

\x1b[1mEXAMPLES:\x1b[0m
    burrow                          Start interactive REPL
    burrow -b sum.txt               Parse sum.txt and exit
    burrow --trace-vm -b sum.txt    Parse with a full VM trace
    burrow --dump-rules -b          Show the compiled grammar

\x1b[1mREPL COMMANDS:\x1b[0m
    :rules [NAME]      Show compiled rules
    :trace             Toggle tracing
    :last [N]          Show recent trace records
    :stats             Show trace statistics
    Ctrl+D             Exit REPL
    Ctrl+C             Cancel current input"
    );
}
