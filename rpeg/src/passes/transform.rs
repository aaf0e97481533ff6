// Passes that rewrite the grammar into something cheaper to generate

use crate::{
    intermediates::{Expression, Grammar},
    CompileError, Options, Session,
};

/// A proxy rule is one that only refers to another rule (`a = b`). Every
/// reference to `a` becomes a reference to `b`, and `a` goes away unless
/// it's a start rule (then it's still needed as an entry point)
pub fn remove_proxy_rules(
    grammar: &mut Grammar,
    options: &Options,
    session: &mut Session,
) -> Result<(), CompileError> {
    let mut removed = vec![];
    for i in 0..grammar.rules.len() {
        let (proxy, target) = match &grammar.rules[i].expression {
            Expression::RuleRef { name, .. } if *name != grammar.rules[i].name => {
                (grammar.rules[i].name.clone(), name.clone())
            }
            _ => continue,
        };
        trace!("proxy rule {} -> {}", proxy, target);
        for rule in &mut grammar.rules {
            rule.expression.walk_mut(&mut |expression| {
                if let Expression::RuleRef { name, .. } = expression {
                    if *name == proxy {
                        *name = target.clone();
                    }
                }
            });
        }
        if !options.allowed_start_rules.contains(&proxy) {
            removed.push(proxy);
        }
    }
    if !removed.is_empty() {
        session.info(format!("removed proxy rules: {}", removed.join(", ")), None);
        grammar.rules.retain(|rule| !removed.contains(&rule.name));
    }
    Ok(())
}
