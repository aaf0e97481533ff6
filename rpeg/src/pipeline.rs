//! Stages and passes.
//!
//! A pass is one function over the [Grammar]. A stage is a named group of
//! passes, and stages run one after the other in the order they were given,
//! as do the passes inside them. Nothing runs in parallel: a pass is free
//! to rely on whatever every pass before it did to the grammar.
//!
//! Passes can be handed over either as a plain list or as a map from name
//! to pass (handy for replacing one by name). [convert_passes] flattens
//! both into lists, which is all [run_stages] deals with.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::{intermediates::Grammar, CompileError, Options, Session};

/// Shared so the pass that runs is the very one that was given, along with
/// anything it captured
pub type Pass = Rc<dyn Fn(&mut Grammar, &Options, &mut Session) -> Result<(), CompileError>>;

pub fn pass<F>(f: F) -> Pass
where
    F: Fn(&mut Grammar, &Options, &mut Session) -> Result<(), CompileError> + 'static,
{
    Rc::new(f)
}

/// The passes of one stage, in either form they're accepted in
#[derive(Clone)]
pub enum PassSet {
    Sequence(Vec<Pass>),
    /// Runs in insertion order, names are just for the caller's benefit
    Named(IndexMap<String, Pass>),
}
impl From<Vec<Pass>> for PassSet {
    fn from(passes: Vec<Pass>) -> Self {
        PassSet::Sequence(passes)
    }
}
impl From<IndexMap<String, Pass>> for PassSet {
    fn from(passes: IndexMap<String, Pass>) -> Self {
        PassSet::Named(passes)
    }
}

/// Stage name to its passes, in order. What [run_stages] takes
pub type Stages = IndexMap<String, Vec<Pass>>;

/// Lists stay as they are, maps become the list of their values in
/// insertion order. Stage order is kept, and nothing can go wrong
pub fn convert_passes(stages: IndexMap<String, PassSet>) -> Stages {
    stages
        .into_iter()
        .map(|(stage, passes)| {
            let passes = match passes {
                PassSet::Sequence(passes) => passes,
                PassSet::Named(passes) => passes.into_iter().map(|(_, pass)| pass).collect(),
            };
            (stage, passes)
        })
        .collect()
}

/// Run every stage, every pass. A pass's own error comes back exactly as it
/// returned it. Errors reported to the session stop things at the end of
/// the stage that reported them
pub fn run_stages(
    grammar: &mut Grammar,
    stages: &Stages,
    options: &Options,
    session: &mut Session,
) -> Result<(), CompileError> {
    for (stage, passes) in stages {
        debug!("process stage {} ({} passes)", stage, passes.len());
        session.enter_stage(stage);
        for (n, pass) in passes.iter().enumerate() {
            trace!("process pass {}.{}", stage, n);
            pass(grammar, options, session)?;
        }
        session.check_errors()?;
    }
    debug!("\n{}", grammar);
    Ok(())
}
