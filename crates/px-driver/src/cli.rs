//! Argument parsing for the `px` binary (spec §6).
//!
//! spec §6's flags are single-dash multi-letter mnemonics (`-wl`, `-lsl`,
//! `-c`, …), not the `--long`/`-short` shapes `clap`'s derive API targets,
//! so this is a small hand-rolled parser over `std::env::args()` instead —
//! the same call the teacher's `cc`-shelling `preprocessing.rs` makes when
//! it needs exact control over a command line it doesn't own the shape of.

use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use crate::callbacks::{Config, NullFrontend, StageSet};

const LOG_FILTERS: &[&str] = &["warn", "px_compiler=debug", "px_driver=debug"];

pub const HELP: &str = "\
px — front end for the px language compiler

USAGE:
    px [FLAGS] <file.px>...

FLAGS:
    -h, --help        Print this help and exit
    -v, --version     Print the version and exit
    -c                Compile: suppress output unless there are errors
    -wl -wp -ws -wsl  Write lexer/parser/semantic/semantic_log stages to stdout
    -w                Write every stage to stdout
    -ll -lp -ls -lsl  Write lexer/parser/semantic/semantic_log stages to files
    -lst -lv          Write the state/verbose stages to files
    -l                Write every stage to files

Each non-flag argument must name a file ending in `.px`; duplicates are an
error. `-c` may be given at most once.
";

pub const VERSION: &str = concat!("px ", env!("CARGO_PKG_VERSION"));

/// What a parsed command line asked for.
#[derive(Debug, Clone)]
pub enum ParsedArgs {
    Help,
    Version,
    Run(Config),
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("unknown flag '{0}'")]
    UnknownFlag(String),
    #[error("input file '{0}' does not end in .px")]
    InvalidExtension(String),
    #[error("input file '{0}' given more than once")]
    DuplicateInput(String),
    #[error("-c given more than once")]
    DuplicateCompile,
    #[error("no input files given")]
    NoInputFiles,
}

/// Parse a command line (spec §6). `args` excludes argv0.
pub fn parse_args<I, S>(args: I) -> Result<ParsedArgs, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cfg = Config::default();
    let mut compile_seen = false;

    for arg in args {
        let arg = arg.as_ref();
        match arg {
            "-h" | "--help" => return Ok(ParsedArgs::Help),
            "-v" | "--version" => return Ok(ParsedArgs::Version),
            "-c" => {
                if compile_seen {
                    return Err(CliError::DuplicateCompile);
                }
                compile_seen = true;
                cfg.compile = true;
            }
            "-wl" => cfg.stdout_stages.lexer = true,
            "-wp" => cfg.stdout_stages.parser = true,
            "-ws" => cfg.stdout_stages.semantic = true,
            "-wsl" => cfg.stdout_stages.semantic_log = true,
            "-w" => {
                cfg.stdout_stages = StageSet {
                    lexer: true,
                    parser: true,
                    semantic: true,
                    semantic_log: true,
                    state: false,
                    verbose: false,
                };
            }
            "-ll" => cfg.file_stages.lexer = true,
            "-lp" => cfg.file_stages.parser = true,
            "-ls" => cfg.file_stages.semantic = true,
            "-lsl" => cfg.file_stages.semantic_log = true,
            "-lst" => cfg.file_stages.state = true,
            "-lv" => cfg.file_stages.verbose = true,
            "-l" => cfg.file_stages = StageSet::all(),
            _ if arg.starts_with('-') => return Err(CliError::UnknownFlag(arg.to_string())),
            _ => {
                if !arg.ends_with(".px") {
                    return Err(CliError::InvalidExtension(arg.to_string()));
                }
                let path = PathBuf::from(arg);
                if cfg.inputs.contains(&path) {
                    return Err(CliError::DuplicateInput(arg.to_string()));
                }
                cfg.inputs.push(path);
            }
        }
    }

    if cfg.inputs.is_empty() {
        return Err(CliError::NoInputFiles);
    }

    Ok(ParsedArgs::Run(cfg))
}

/// Entry point for the `px` binary: parse arguments, run, and translate the
/// result into a process exit code (spec §6: 0 success, 1 otherwise).
#[doc(hidden)]
pub fn main() -> std::process::ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| LOG_FILTERS.join(",").parse().unwrap());
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(args) {
        Ok(ParsedArgs::Help) => {
            print!("{HELP}");
            std::process::ExitCode::SUCCESS
        }
        Ok(ParsedArgs::Version) => {
            println!("{VERSION}");
            std::process::ExitCode::SUCCESS
        }
        Ok(ParsedArgs::Run(cfg)) => {
            let code = crate::callbacks::run(&mut NullFrontend, &cfg);
            if code == 0 {
                std::process::ExitCode::SUCCESS
            } else {
                std::process::ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("px: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_flag_short_circuits() {
        assert!(matches!(parse_args(["-h", "whatever"]), Ok(ParsedArgs::Help)));
    }

    #[test]
    fn rejects_non_px_input() {
        let err = parse_args(["main.c"]).unwrap_err();
        assert!(matches!(err, CliError::InvalidExtension(_)));
    }

    #[test]
    fn rejects_duplicate_input() {
        let err = parse_args(["main.px", "main.px"]).unwrap_err();
        assert!(matches!(err, CliError::DuplicateInput(_)));
    }

    #[test]
    fn rejects_repeated_compile_flag() {
        let err = parse_args(["-c", "-c", "main.px"]).unwrap_err();
        assert!(matches!(err, CliError::DuplicateCompile));
    }

    #[test]
    fn w_sets_stdout_stage_bundle() {
        let ParsedArgs::Run(cfg) = parse_args(["-w", "main.px"]).unwrap() else {
            panic!("expected Run");
        };
        assert!(cfg.stdout_stages.semantic_log);
        assert!(!cfg.stdout_stages.state);
    }

    #[test]
    fn no_inputs_is_an_error() {
        assert!(matches!(parse_args(["-c"]), Err(CliError::NoInputFiles)));
    }
}
