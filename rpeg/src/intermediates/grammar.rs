//! The [Grammar] is the IR every pass works on. It comes in already parsed
//! (reading grammar syntax is someone else's job) and the passes check it,
//! rewrite it, and finally attach the generated code to it.
//!
//! It's kept deliberately small: rules made of literals, classes, `.`,
//! references to other rules, sequences, choices and display names. Remember
//! these are the *grammar's* sequences and choices, nothing to do with rust.

use indexmap::IndexSet;
use rpegrt::{ClassPart, Expectation, Location};

#[derive(PartialEq, Clone, Debug, Default)]
pub struct Grammar {
    pub rules: Vec<Rule>,
    pub location: Location,
    /// Every expectation the generated code refers to, indexed by position.
    /// Filled in by [collect_expectations](crate::passes::collect_expectations)
    pub expectations: IndexSet<Expectation>,
    /// The finished module, filled in by [generate_js](crate::passes::generate_js)
    pub code: Option<String>,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Rule {
    pub name: String,
    pub expression: Expression,
    pub location: Location,
}

#[derive(PartialEq, Clone, Debug)]
pub enum Expression {
    Literal {
        value: String,
        ignore_case: bool,
    },
    Class {
        parts: Vec<ClassPart>,
        inverted: bool,
        ignore_case: bool,
    },
    /// `.`
    Any,
    RuleRef {
        name: String,
        location: Location,
    },
    Sequence(Vec<Expression>),
    /// Ordered, first match wins
    Choice(Vec<Expression>),
    /// Failures inside read as one [Expectation::Other] with this name
    Named {
        name: String,
        expression: Box<Expression>,
    },
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }
    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name.clone()).collect()
    }
}

impl Rule {
    pub fn new(name: &str, expression: Expression) -> Self {
        Self {
            name: name.to_string(),
            expression,
            location: Location::default(),
        }
    }
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl Expression {
    pub fn literal(value: &str) -> Self {
        Expression::Literal {
            value: value.to_string(),
            ignore_case: false,
        }
    }
    pub fn literal_i(value: &str) -> Self {
        Expression::Literal {
            value: value.to_string(),
            ignore_case: true,
        }
    }
    pub fn class(parts: Vec<ClassPart>, inverted: bool, ignore_case: bool) -> Self {
        Expression::Class {
            parts,
            inverted,
            ignore_case,
        }
    }
    pub fn rule_ref(name: &str) -> Self {
        Expression::RuleRef {
            name: name.to_string(),
            location: Location::default(),
        }
    }
    pub fn named(name: &str, expression: Expression) -> Self {
        Expression::Named {
            name: name.to_string(),
            expression: Box::new(expression),
        }
    }

    /// What a failure of this node (by itself, not its children) expects
    pub fn expectation(&self) -> Option<Expectation> {
        match self {
            Expression::Literal { value, ignore_case } => {
                Some(Expectation::literal(value.as_str(), *ignore_case))
            }
            Expression::Class {
                parts,
                inverted,
                ignore_case,
            } => Some(Expectation::class(parts.clone(), *inverted, *ignore_case)),
            Expression::Any => Some(Expectation::any()),
            Expression::Named { name, .. } => Some(Expectation::other(name.as_str())),
            Expression::RuleRef { .. } | Expression::Sequence(_) | Expression::Choice(_) => None,
        }
    }

    /// Visit this node and everything under it, parents first
    pub fn walk<F: FnMut(&Expression)>(&self, visit: &mut F) {
        visit(self);
        match self {
            Expression::Sequence(elements) | Expression::Choice(elements) => {
                for element in elements {
                    element.walk(visit);
                }
            }
            Expression::Named { expression, .. } => expression.walk(visit),
            _ => {}
        }
    }
    pub fn walk_mut<F: FnMut(&mut Expression)>(&mut self, visit: &mut F) {
        visit(self);
        match self {
            Expression::Sequence(elements) | Expression::Choice(elements) => {
                for element in elements {
                    element.walk_mut(visit);
                }
            }
            Expression::Named { expression, .. } => expression.walk_mut(visit),
            _ => {}
        }
    }
}

// Display prints grammar syntax back out, which is mostly for debug logs

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.expression {
            Expression::Named { name, expression } => write!(
                f,
                "{} \"{}\" = {}",
                self.name,
                rpegrt::expectation::literal_escape(name),
                expression
            ),
            expression => write!(f, "{} = {}", self.name, expression),
        }
    }
}
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Expression::Literal { .. } | Expression::Class { .. } => {
                let ignore_case = match self {
                    Expression::Literal { ignore_case, .. }
                    | Expression::Class { ignore_case, .. } => *ignore_case,
                    _ => false,
                };
                // describe already prints grammar syntax for these
                let expectation = self.expectation().map(|e| e.describe()).unwrap_or_default();
                write!(f, "{}{}", expectation, if ignore_case { "i" } else { "" })
            }
            Expression::Any => write!(f, "."),
            Expression::RuleRef { name, .. } => write!(f, "{}", name),
            Expression::Sequence(elements) => {
                let elements: Vec<String> = elements
                    .iter()
                    .map(|element| match element {
                        Expression::Choice(_) => format!("({})", element),
                        _ => element.to_string(),
                    })
                    .collect();
                write!(f, "{}", elements.join(" "))
            }
            Expression::Choice(alternatives) => {
                let alternatives: Vec<String> =
                    alternatives.iter().map(|alt| alt.to_string()).collect();
                write!(f, "{}", alternatives.join(" / "))
            }
            Expression::Named { expression, .. } => write!(f, "({})", expression),
        }
    }
}
