//! Orchestrates one CLI invocation: read, preprocess, (optionally) parse and
//! analyze, then route each requested debug stage to stdout or a file.
//!
//! spec §1 scopes the lexer and the parser out of this repository entirely
//! ("external collaborators… reached only through typed boundaries"); the
//! [`Frontend`] trait is that boundary. A real end-to-end `px` binary needs
//! one wired in from elsewhere. Without one, [`run`] still does everything
//! this repository actually owns — preprocessing, and reporting why the
//! `lexer`/`parser` stages are unavailable — which is why spec §6 calls the
//! CLI surface "for testability only".

use std::path::{Path, PathBuf};

use px_compiler::debug::SymbolTableView;
use px_compiler::diagnostics::DiagnosticsRegistry;
use px_compiler::files::split_lines;
use px_syntax::ast::Ast;

/// The Lexer → Parser boundary (spec §1, §6). Implementors turn
/// preprocessed text into an AST; `None` means "no AST available", which
/// [`run`] treats the same as a failed parse.
pub trait Frontend {
    fn parse(&mut self, path: &Path, preprocessed: &str) -> Option<Ast>;
}

/// The `Frontend` used when no real lexer/parser is wired in. Every call
/// documents the gap instead of silently producing nothing.
#[derive(Debug, Default)]
pub struct NullFrontend;

impl Frontend for NullFrontend {
    fn parse(&mut self, _path: &Path, _preprocessed: &str) -> Option<Ast> {
        None
    }
}

/// Which of the six debug stages (spec §6's `lexer | parser | semantic |
/// semantic_log | state | verbose`) a sink (stdout or file) should receive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSet {
    pub lexer: bool,
    pub parser: bool,
    pub semantic: bool,
    pub semantic_log: bool,
    pub state: bool,
    pub verbose: bool,
}

impl StageSet {
    pub fn any(&self) -> bool {
        self.lexer
            || self.parser
            || self.semantic
            || self.semantic_log
            || self.state
            || self.verbose
    }

    pub fn all() -> Self {
        StageSet {
            lexer: true,
            parser: true,
            semantic: true,
            semantic_log: true,
            state: true,
            verbose: true,
        }
    }
}

/// One parsed CLI invocation (spec §6). Built by [`crate::cli`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    /// Stages written to stdout (`-wl -wp -ws -wsl -w`). spec §6 lists no
    /// stdout equivalent for `state`/`verbose`; those two fields stay
    /// `false` here regardless of what the caller sets.
    pub stdout_stages: StageSet,
    /// Stages written to `<basename>_<stage>.txt` (`-ll -lp -ls -lsl -lst
    /// -lv -l`).
    pub file_stages: StageSet,
    /// `-c`: suppress non-error output.
    pub compile: bool,
}

const LEXER_UNAVAILABLE: &str = "lexer output unavailable: the lexer is an external collaborator (spec §1), not built by this crate\n";
const PARSER_UNAVAILABLE: &str = "parser output unavailable: the parser is an external collaborator (spec §1), not built by this crate\n";

struct Stages {
    lexer: String,
    parser: String,
    semantic: String,
    semantic_log: String,
    state: String,
}

impl Stages {
    fn verbose(&self) -> String {
        format!(
            "== lexer ==\n{}\n== parser ==\n{}\n== semantic ==\n{}\n== semantic_log ==\n{}\n== state ==\n{}\n",
            self.lexer, self.parser, self.semantic, self.semantic_log, self.state
        )
    }

    fn get(&self, name: &str) -> &str {
        match name {
            "lexer" => &self.lexer,
            "parser" => &self.parser,
            "semantic" => &self.semantic,
            "semantic_log" => &self.semantic_log,
            "state" => &self.state,
            other => unreachable!("unknown stage {other}"),
        }
    }
}

/// Process every input file, writing requested stages and printing
/// diagnostics, returning the process exit code (spec §6: 0 on success, 1
/// otherwise).
#[tracing::instrument(level = "info", skip_all)]
pub fn run(frontend: &mut dyn Frontend, cfg: &Config) -> i32 {
    let mut exit_code = 0;
    for input in &cfg.inputs {
        match run_one(frontend, cfg, input) {
            Ok(had_errors) => {
                if had_errors {
                    exit_code = 1;
                }
            }
            Err(err) => {
                eprintln!("px: {}: {err}", input.display());
                exit_code = 1;
            }
        }
    }
    exit_code
}

fn run_one(frontend: &mut dyn Frontend, cfg: &Config, input: &Path) -> anyhow::Result<bool> {
    let source = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", input.display()))?;

    let mut diagnostics = DiagnosticsRegistry::new();
    let mut preproc = px_compiler::preprocessor::PreprocessorContext::new(&mut diagnostics);
    let preprocessed = preproc.preprocess_root(input, &source);
    let macro_state = preproc.macros.dump();
    let conditional_state = preproc.conditionals.dump();

    let ast = frontend.parse(input, &preprocessed);

    let semantic = match &ast {
        Some(ast) => {
            // `exit_on_error` is a driver policy (spec §4.2), not the same
            // knob as `-c`: `-c` only gates whether diagnostics print after
            // the run (below). No flag currently asks for fail-fast analysis,
            // so this is always `false`.
            let ctx = px_compiler::analyze(ast, &preprocessed, &mut diagnostics, false);
            serde_json::to_string_pretty(&SymbolTableView::new(&ctx))
                .unwrap_or_else(|e| format!("failed to serialize symbol table: {e}"))
        }
        None => PARSER_UNAVAILABLE.to_string(),
    };

    let lines = split_lines(&preprocessed);

    let stages = Stages {
        lexer: LEXER_UNAVAILABLE.to_string(),
        parser: match &ast {
            Some(ast) => serde_json::to_string_pretty(ast)
                .unwrap_or_else(|e| format!("failed to serialize AST: {e}")),
            None => PARSER_UNAVAILABLE.to_string(),
        },
        semantic,
        semantic_log: diagnostics.render_all(&lines),
        state: format!(
            "-- macros --\n{macro_state}-- conditionals --\n{conditional_state}"
        ),
    };

    emit_stdout(cfg, &stages);
    emit_files(cfg, input, &stages)?;

    let has_errors = diagnostics.has_errors() || diagnostics.has_fatal();
    if (!cfg.compile || has_errors) && !stages.semantic_log.is_empty() {
        print!("{}", stages.semantic_log);
    }

    Ok(has_errors)
}

fn emit_stdout(cfg: &Config, stages: &Stages) {
    let set = cfg.stdout_stages;
    for name in ["lexer", "parser", "semantic", "semantic_log"] {
        if stage_selected(&set, name) {
            print!("{}", stages.get(name));
        }
    }
}

fn emit_files(cfg: &Config, input: &Path, stages: &Stages) -> anyhow::Result<()> {
    let set = cfg.file_stages;
    for name in ["lexer", "parser", "semantic", "semantic_log", "state"] {
        if stage_selected(&set, name) {
            write_stage_file(input, name, stages.get(name))?;
        }
    }
    if set.verbose {
        write_stage_file(input, "verbose", &stages.verbose())?;
    }
    Ok(())
}

fn stage_selected(set: &StageSet, name: &str) -> bool {
    match name {
        "lexer" => set.lexer,
        "parser" => set.parser,
        "semantic" => set.semantic,
        "semantic_log" => set.semantic_log,
        "state" => set.state,
        "verbose" => set.verbose,
        _ => false,
    }
}

fn write_stage_file(input: &Path, stage: &str, content: &str) -> anyhow::Result<()> {
    let basename = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let path = input.with_file_name(format!("{basename}_{stage}.txt"));
    std::fs::write(&path, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}
