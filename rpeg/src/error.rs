// Errors for the whole compiler live here. Passes report problems with the
// grammar through the Session as diagnostics, and those become a
// GrammarError at the end of the stage

use rpegrt::Location;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(PartialEq, Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The stage that was running when this was reported
    pub stage: String,
    pub message: String,
    pub location: Option<Location>,
}
impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        match &self.location {
            Some(location) => write!(f, "[{}] {}: {}", label, location.start, self.message),
            None => write!(f, "[{}] {}", label, self.message),
        }
    }
}

/// Everything wrong with the grammar that one stage found
#[derive(PartialEq, Clone, Debug)]
pub struct GrammarError {
    pub stage: String,
    pub diagnostics: Vec<Diagnostic>,
}
impl std::fmt::Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "stage {} failed:", self.stage)?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n{}", diagnostic)?;
        }
        Ok(())
    }
}
impl std::error::Error for GrammarError {}

#[derive(PartialEq, Clone, Debug)]
pub enum CompileError {
    /// A grammar needs at least one rule, if only to start from
    EmptyGrammar,
    UnknownStartRule(String),
    Grammar(GrammarError),
    /// A pass gave up for reasons of its own
    Pass(String),
    /// Every stage ran but none of them produced code
    NoOutput,
}
impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use CompileError::*;
        match self {
            EmptyGrammar => write!(f, "[ERROR] grammar has no rules"),
            UnknownStartRule(rule) => write!(f, "[ERROR] unknown start rule \"{}\"", rule),
            Grammar(err) => write!(f, "{}", err),
            Pass(message) => write!(f, "[ERROR] {}", message),
            NoOutput => write!(f, "[ERROR] no pass generated any code"),
        }
    }
}
// All relevant details in Display and Debug
impl std::error::Error for CompileError {}
impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::Grammar(err)
    }
}
