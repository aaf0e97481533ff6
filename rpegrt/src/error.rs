// What a parser gives back when it doesn't give back a value

use crate::expectation::{describe_expected, describe_found, Expectation};
use crate::{Location, TraceError};

/// The input didn't match. Carries everything needed to say precisely why:
/// where ([SyntaxError::location]), what would have worked
/// ([SyntaxError::expected]) and what was there instead ([SyntaxError::found])
#[derive(PartialEq, Clone, Debug)]
pub struct SyntaxError {
    pub message: String,
    pub expected: Vec<Expectation>,
    /// None at end of input
    pub found: Option<String>,
    pub location: Location,
}

impl SyntaxError {
    pub fn new(expected: Vec<Expectation>, found: Option<String>, location: Location) -> Self {
        let message = Self::build_message(&expected, found.as_deref());
        Self {
            message,
            expected,
            found,
            location,
        }
    }
    pub fn build_message(expected: &[Expectation], found: Option<&str>) -> String {
        format!(
            "Expected {} but {} found.",
            describe_expected(expected),
            describe_found(found)
        )
    }
    /// Render the error with the offending source line and carets under
    /// the part that failed, `source` being whatever name the input goes by
    pub fn format(&self, source: &str, input: &str) -> String {
        let start = self.location.start;
        let end = self.location.end;
        let mut out = format!("Error: {}\n --> {}:{}", self.message, source, start);
        let line = match input.split('\n').nth(start.line.saturating_sub(1)) {
            Some(line) => line.trim_end_matches('\r'),
            None => return out,
        };
        let number = start.line.to_string();
        let filler = " ".repeat(number.len());
        let last = if start.line == end.line {
            end.column
        } else {
            line.chars().count() + 1
        };
        let hats = last.saturating_sub(start.column).max(1);
        out.push_str(&format!(
            "\n{} |\n{} | {}\n{} | {}{}",
            filler,
            number,
            line,
            filler,
            " ".repeat(start.column.saturating_sub(1)),
            "^".repeat(hats)
        ));
        out
    }
}
impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.location.start)
    }
}
impl std::error::Error for SyntaxError {}

/// Anything a parse call can fail with
#[derive(PartialEq, Clone, Debug)]
pub enum Error {
    Syntax(SyntaxError),
    /// The tracer refused an event
    Trace(TraceError),
    /// Asked to start from a rule that isn't an allowed start rule
    StartRule(String),
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Syntax(err) => write!(f, "{}", err),
            Error::Trace(err) => write!(f, "tracing failed: {}", err),
            Error::StartRule(rule) => write!(f, "Can't start parsing from rule \"{}\".", rule),
        }
    }
}
impl std::error::Error for Error {}
impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::Syntax(err)
    }
}
impl From<TraceError> for Error {
    fn from(err: TraceError) -> Self {
        Error::Trace(err)
    }
}
