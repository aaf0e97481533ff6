//! rpeg turns a [Grammar] into a standalone javascript parser.
//!
//! The grammar goes through named stages of passes (see [passes] for the
//! built-in ones, [pipeline] for how stages run) and the last of them leaves
//! the finished module in [Grammar::code]. The generated parser reports
//! failures with the same [Expectation](rpegrt::Expectation) shapes and
//! trace events as the rust runtime in rpegrt.

#[macro_use]
extern crate log;

pub mod codegen;
mod error;
pub mod intermediates;
mod options;
pub mod passes;
pub mod pipeline;
mod session;

use indexmap::IndexMap;

pub use error::{CompileError, Diagnostic, GrammarError, Severity};
pub use intermediates::{Expression, Grammar, Rule};
pub use options::{Format, Options};
pub use pipeline::{convert_passes, pass, run_stages, Pass, PassSet, Stages};
pub use session::Session;

/// check, transform, generate. Named, so callers can swap a single pass
/// out or add their own before handing the whole thing to [convert_passes]
pub fn default_passes() -> IndexMap<String, PassSet> {
    let mut check = IndexMap::new();
    check.insert("report_duplicate_rules".to_string(), pass(passes::report_duplicate_rules));
    check.insert("report_undefined_rules".to_string(), pass(passes::report_undefined_rules));
    let mut transform = IndexMap::new();
    transform.insert("remove_proxy_rules".to_string(), pass(passes::remove_proxy_rules));
    let mut generate = IndexMap::new();
    generate.insert("collect_expectations".to_string(), pass(passes::collect_expectations));
    generate.insert("generate_js".to_string(), pass(passes::generate_js));

    let mut stages = IndexMap::new();
    stages.insert("check".to_string(), PassSet::Named(check));
    stages.insert("transform".to_string(), PassSet::Named(transform));
    stages.insert("generate".to_string(), PassSet::Named(generate));
    stages
}

/// Resolve the options against the grammar, run every stage and hand back
/// the generated code. The grammar is left as the passes left it
pub fn compile(grammar: &mut Grammar, stages: &Stages, options: &Options) -> Result<String, CompileError> {
    let options = options.resolve(grammar)?;
    debug!("start rules: {}", options.allowed_start_rules.join(", "));
    grammar.code = None;
    let mut session = Session::new();
    run_stages(grammar, stages, &options, &mut session)?;
    for diagnostic in session.diagnostics() {
        trace!("{}", diagnostic);
    }
    grammar.code.clone().ok_or(CompileError::NoOutput)
}

/// [compile] with the [default_passes]
pub fn generate(mut grammar: Grammar, options: &Options) -> Result<String, CompileError> {
    compile(&mut grammar, &convert_passes(default_passes()), options)
}
