//! End-to-end scenarios exercising the preprocessor, semantic analyzer, and
//! diagnostics engine together, the way `px-driver` chains them.
//!
//! Grounded on the teacher's `integration-tests` crate (`libtest-mimic`,
//! `harness = false`), which discovers its cases from an external fixture
//! directory. There is no equivalent fixture corpus for `.px` sources, so
//! each scenario here is a short inline fixture instead — the scenarios
//! themselves are the worked examples named in spec §8.
//!
//! Scenarios 4-6 exercise the semantic analyzer, which only ever sees an
//! [`px_syntax::ast::Ast`] handed to it by the (out-of-scope) parser. Since
//! no parser lives in this workspace, those scenarios build the `Ast` by
//! hand, playing the parser's role the way a hand-written test double
//! would.

use libtest_mimic::{Failed, Trial};
use px_compiler::diagnostics::DiagnosticsRegistry;
use px_compiler::files::split_lines;

mod fixtures;

/// One named end-to-end scenario and the assertion it runs.
pub struct Scenario {
    pub name: &'static str,
    run: fn() -> Result<(), Failed>,
}

impl Scenario {
    pub fn trial(self) -> Trial {
        Trial::test(self.name, move || (self.run)())
    }
}

/// Every scenario this crate knows about, in spec §8's order.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "preprocessor::comment_stripping_preserves_lines",
            run: fixtures::comment_stripping_preserves_lines,
        },
        Scenario {
            name: "preprocessor::conditional_suppression",
            run: fixtures::conditional_suppression,
        },
        Scenario {
            name: "preprocessor::nested_false_branch",
            run: fixtures::nested_false_branch,
        },
        Scenario {
            name: "semantic::redeclaration",
            run: fixtures::redeclaration,
        },
        Scenario {
            name: "semantic::type_mismatch_in_assignment",
            run: fixtures::type_mismatch_in_assignment,
        },
        Scenario {
            name: "semantic::break_outside_loop",
            run: fixtures::break_outside_loop,
        },
        Scenario {
            name: "semantic::char_array_rejects_oversized_string_literal",
            run: fixtures::char_array_rejects_oversized_string_literal,
        },
        Scenario {
            name: "semantic::char_array_accepts_string_within_capacity",
            run: fixtures::char_array_accepts_string_within_capacity,
        },
        Scenario {
            name: "universal::preprocessor_identity_on_plain_input",
            run: fixtures::preprocessor_identity_on_plain_input,
        },
        Scenario {
            name: "universal::rendered_diagnostic_is_three_lines",
            run: fixtures::rendered_diagnostic_is_three_lines,
        },
    ]
}

/// Helper shared by the fixtures: preprocess `source` and render whatever
/// diagnostics came out of it, as `px-driver` would for the `semantic_log`
/// stage.
pub(crate) fn preprocess_and_render(source: &str) -> (String, DiagnosticsRegistry) {
    let mut diagnostics = DiagnosticsRegistry::new();
    let preprocessed =
        px_compiler::preprocess(std::path::Path::new("fixture.px"), source, &mut diagnostics);
    (preprocessed, diagnostics)
}

pub(crate) fn render(diagnostics: &DiagnosticsRegistry, preprocessed: &str) -> String {
    let lines = split_lines(preprocessed);
    diagnostics.render_all(&lines)
}
