// Passes that look for mistakes in the grammar and report them, without
// changing anything

use indexmap::IndexMap;

use crate::{
    intermediates::{Expression, Grammar},
    CompileError, Options, Session,
};

pub fn report_duplicate_rules(
    grammar: &mut Grammar,
    _options: &Options,
    session: &mut Session,
) -> Result<(), CompileError> {
    let mut seen = IndexMap::new();
    for rule in &grammar.rules {
        if let Some(first) = seen.get(rule.name.as_str()) {
            session.error(
                format!("Rule \"{}\" is already defined at {}", rule.name, first),
                Some(rule.location),
            );
        } else {
            seen.insert(rule.name.as_str(), rule.location.start);
        }
    }
    Ok(())
}

pub fn report_undefined_rules(
    grammar: &mut Grammar,
    _options: &Options,
    session: &mut Session,
) -> Result<(), CompileError> {
    let names = grammar.rule_names();
    for rule in &grammar.rules {
        rule.expression.walk(&mut |expression| {
            if let Expression::RuleRef { name, location } = expression {
                if !names.contains(name) {
                    session.error(format!("Rule \"{}\" is not defined", name), Some(*location));
                }
            }
        });
    }
    Ok(())
}
