// One compilation's worth of diagnostics

use crate::error::{Diagnostic, GrammarError, Severity};
use rpegrt::Location;

/// Passes report what they find here instead of bailing out on the first
/// problem, so one run shows every error in a stage. The stage executor
/// stops after any stage that reported an error
#[derive(Debug, Default)]
pub struct Session {
    stage: String,
    diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
    /// The stage currently running
    pub fn stage(&self) -> &str {
        &self.stage
    }
    pub(crate) fn enter_stage(&mut self, stage: &str) {
        self.stage = stage.to_string();
    }
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
    }

    fn report(&mut self, severity: Severity, message: String, location: Option<Location>) {
        let diagnostic = Diagnostic {
            severity,
            stage: self.stage.clone(),
            message,
            location,
        };
        match severity {
            Severity::Error => debug!("{}", diagnostic),
            Severity::Warning => warn!("{}", diagnostic),
            Severity::Info => info!("{}", diagnostic),
        }
        self.diagnostics.push(diagnostic);
    }
    pub fn error(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Error, message.into(), location);
    }
    pub fn warning(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Warning, message.into(), location);
    }
    pub fn info(&mut self, message: impl Into<String>, location: Option<Location>) {
        self.report(Severity::Info, message.into(), location);
    }

    /// Err with every error reported in the current stage, if there are any
    pub fn check_errors(&self) -> Result<(), GrammarError> {
        let errors: Vec<Diagnostic> = self
            .errors()
            .filter(|diagnostic| diagnostic.stage == self.stage)
            .cloned()
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GrammarError {
                stage: self.stage.clone(),
                diagnostics: errors,
            })
        }
    }
}
