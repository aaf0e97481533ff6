// Compiler configuration

use crate::{intermediates::Grammar, CompileError};

/// What kind of javascript module comes out
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Format {
    /// An expression evaluating to the parser object
    Bare,
    /// `module.exports = ...`
    CommonJs,
    /// `export { ... }`
    Es,
    /// Assigned to this property of the global object
    Globals(String),
}

#[derive(PartialEq, Clone, Debug)]
pub struct Options {
    /// Rules the generated parser may start from. Empty means just the first
    /// rule, `*` means every rule
    pub allowed_start_rules: Vec<String>,
    /// Generate the tracing hooks. Without it tracing costs nothing because
    /// there's no tracing code at all
    pub trace: bool,
    pub format: Format,
    /// Goes at the very top of the module, as is
    pub header: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allowed_start_rules: vec![],
            trace: false,
            format: Format::Bare,
            header: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn start_rules(mut self, rules: &[&str]) -> Self {
        self.allowed_start_rules = rules.iter().map(|rule| rule.to_string()).collect();
        self
    }
    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
    pub fn header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }

    /// Options as the passes see them: start rules resolved to real rule
    /// names of this grammar
    pub fn resolve(&self, grammar: &Grammar) -> Result<Options, CompileError> {
        let all_rules = grammar.rule_names();
        let first = match all_rules.first() {
            Some(first) => first.clone(),
            None => return Err(CompileError::EmptyGrammar),
        };
        let allowed = if self.allowed_start_rules.is_empty() {
            vec![first]
        } else if self.allowed_start_rules.iter().any(|rule| rule == "*") {
            all_rules
        } else {
            for rule in &self.allowed_start_rules {
                if !all_rules.contains(rule) {
                    return Err(CompileError::UnknownStartRule(rule.clone()));
                }
            }
            self.allowed_start_rules.clone()
        };
        Ok(Options {
            allowed_start_rules: allowed,
            ..self.clone()
        })
    }
}
