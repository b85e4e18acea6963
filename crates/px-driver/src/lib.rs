//! `px` compiler driver — argument parsing, file I/O, and stage selection
//! for the CORE subsystems (spec §1, §6).
//!
//! This crate owns none of the hard parts; it is the "driver boundary, for
//! testability only" spec §6 describes, wiring [`px_compiler::preprocess`]
//! and [`px_compiler::analyze`] to a file list and a set of debug stages to
//! dump (`lexer | parser | semantic | semantic_log | state | verbose`). The
//! lexer and parser are external collaborators this repository never
//! builds (spec §1); [`Frontend`] is the seam where one would be plugged
//! in, and [`NullFrontend`] is what the real `px` binary uses until then.
//!
//! ```rust
//! use px_driver::{Config, NullFrontend, run};
//!
//! let cfg = Config::default();
//! let exit_code = run(&mut NullFrontend, &cfg);
//! assert_eq!(exit_code, 0); // no inputs, nothing to fail on
//! ```

mod callbacks;
mod cli;

pub use crate::callbacks::{Config, Frontend, NullFrontend, StageSet, run};
pub use crate::cli::{CliError, ParsedArgs, main, parse_args};
