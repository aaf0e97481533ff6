//! [ParseState] is the bookkeeping every parse needs regardless of grammar:
//! where we are, the furthest we've failed and what we expected there,
//! turning byte offsets into line:col, and telling the tracer (if there
//! is one) about rules as they come and go.
//!
//! A parser built on it looks like
//!
//! ```
//! use rpegrt::{Expectation, ParseState, ParseOptions};
//!
//! let hello = Expectation::literal("hello", false);
//! let mut state = ParseState::<String>::new("hello", ParseOptions::default().tracer);
//! let result = state
//!     .rule("greeting", |state| Ok(state.consume(&hello).map(String::from)))
//!     .unwrap();
//! assert_eq!(state.finish(result).unwrap(), "hello");
//! ```

use indexmap::IndexSet;

use crate::{
    ClassPart, Error, Expectation, Location, Position, SyntaxError, TraceError, TraceEvent,
    Tracer,
};

/// What the caller of a generated parser can configure
pub struct ParseOptions<'t, V> {
    /// None means the first allowed start rule
    pub start_rule: Option<String>,
    /// None means no tracing at all
    pub tracer: Option<&'t mut dyn Tracer<V>>,
}
impl<'t, V> Default for ParseOptions<'t, V> {
    fn default() -> Self {
        Self {
            start_rule: None,
            tracer: None,
        }
    }
}
impl<'t, V> ParseOptions<'t, V> {
    /// Pick the rule to start from out of the allowed ones. A compiled grammar
    /// always has at least one
    pub fn resolve_start_rule<'a>(&self, allowed: &[&'a str]) -> Result<&'a str, Error> {
        match &self.start_rule {
            None => allowed
                .first()
                .copied()
                .ok_or_else(|| Error::StartRule(String::new())),
            Some(name) => allowed
                .iter()
                .copied()
                .find(|rule| *rule == name.as_str())
                .ok_or_else(|| Error::StartRule(name.clone())),
        }
    }
}

pub struct ParseState<'i, 't, V> {
    input: &'i str,
    /// Current byte offset into the input
    pub pos: usize,
    max_fail_pos: usize,
    /// Set so that the same expectation reached by different paths is only
    /// reported once
    max_fail_expected: IndexSet<Expectation>,
    silent_fails: usize,
    /// Last computed position, scanning resumes from here when going forward
    pos_cache: (usize, Position),
    tracer: Option<&'t mut dyn Tracer<V>>,
}

impl<'i, 't, V> ParseState<'i, 't, V> {
    pub fn new(input: &'i str, tracer: Option<&'t mut dyn Tracer<V>>) -> Self {
        Self {
            input,
            pos: 0,
            max_fail_pos: 0,
            max_fail_expected: IndexSet::new(),
            silent_fails: 0,
            pos_cache: (0, Position::start()),
            tracer,
        }
    }
    pub fn input(&self) -> &'i str {
        self.input
    }
    /// Everything from the current position on
    pub fn rest(&self) -> &'i str {
        &self.input[self.pos..]
    }
    pub fn is_tracing(&self) -> bool {
        self.tracer.is_some()
    }
    /// The furthest failure so far, and what was expected there
    pub fn furthest_failure(&self) -> (usize, Vec<Expectation>) {
        (
            self.max_fail_pos,
            self.max_fail_expected.iter().cloned().collect(),
        )
    }

    /// Line and column of a byte offset
    pub fn position(&mut self, offset: usize) -> Position {
        let offset = offset.min(self.input.len());
        let (mut at, mut position) = self.pos_cache;
        if offset < at {
            at = 0;
            position = Position::start();
        }
        for c in self.input[at..offset].chars() {
            if c == '\n' {
                position.line += 1;
                position.column = 1;
            } else {
                position.column += 1;
            }
        }
        position.offset = Some(offset);
        self.pos_cache = (offset, position);
        position
    }
    pub fn location(&mut self, start: usize, end: usize) -> Location {
        Location::new(self.position(start), self.position(end))
    }

    /// Record that `expected` would have matched at the current position.
    /// Only the furthest position's expectations are kept
    pub fn fail(&mut self, expected: Expectation) {
        if self.silent_fails > 0 || self.pos < self.max_fail_pos {
            return;
        }
        if self.pos > self.max_fail_pos {
            self.max_fail_pos = self.pos;
            self.max_fail_expected.clear();
        }
        self.max_fail_expected.insert(expected);
    }
    /// Run `body` without recording any failures
    pub fn silenced<T, F>(&mut self, body: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.silent_fails += 1;
        let result = body(self);
        self.silent_fails -= 1;
        result
    }

    /// Try to match `expected` at the current position, moving past it on
    /// success and recording it as a failure otherwise. [Expectation::Other]
    /// doesn't describe any input by itself so it never matches
    pub fn consume(&mut self, expected: &Expectation) -> Option<&'i str> {
        let rest = self.rest();
        let len = match expected {
            Expectation::Literal { text, ignore_case } => {
                if *ignore_case {
                    let wanted = text.chars().count();
                    let end = rest
                        .char_indices()
                        .nth(wanted)
                        .map_or(rest.len(), |(i, _)| i);
                    let candidate = &rest[..end];
                    if candidate.chars().count() == wanted
                        && candidate.to_lowercase() == text.to_lowercase()
                    {
                        Some(end)
                    } else {
                        None
                    }
                } else if rest.starts_with(text.as_str()) {
                    Some(text.len())
                } else {
                    None
                }
            }
            Expectation::Class {
                parts,
                inverted,
                ignore_case,
            } => rest
                .chars()
                .next()
                .filter(|&c| class_contains(parts, *ignore_case, c) != *inverted)
                .map(char::len_utf8),
            Expectation::Any => rest.chars().next().map(char::len_utf8),
            Expectation::End => {
                if rest.is_empty() {
                    Some(0)
                } else {
                    None
                }
            }
            Expectation::Other { .. } => None,
        };
        match len {
            Some(len) => {
                self.pos += len;
                Some(&rest[..len])
            }
            None => {
                self.fail(expected.clone());
                None
            }
        }
    }

    fn emit(&mut self, event: &TraceEvent<V>) -> Result<(), TraceError> {
        match self.tracer.as_mut() {
            Some(tracer) => tracer.trace(event),
            None => Ok(()),
        }
    }

    /// Run one rule invocation. With a tracer there's one rule.enter before
    /// `body` and one rule.match or rule.fail after, without one this is just
    /// a call. Position is put back where it was on failure
    pub fn rule<F>(&mut self, name: &str, body: F) -> Result<Option<V>, TraceError>
    where
        F: FnOnce(&mut Self) -> Result<Option<V>, TraceError>,
    {
        let start = self.pos;
        if self.is_tracing() {
            let location = self.location(start, start);
            self.emit(&TraceEvent::Enter {
                rule: name,
                location,
            })?;
        }
        let result = body(self)?;
        if result.is_none() {
            self.pos = start;
        }
        if self.is_tracing() {
            match &result {
                Some(value) => {
                    let location = self.location(start, self.pos);
                    self.emit(&TraceEvent::Match {
                        rule: name,
                        location,
                        result: value,
                    })?;
                }
                None => {
                    let location = self.location(start, start);
                    self.emit(&TraceEvent::Fail {
                        rule: name,
                        location,
                    })?;
                }
            }
        }
        Ok(result)
    }

    /// A body whose failures all read as one `description`, the way a rule
    /// with a display name reports
    pub fn named<F>(&mut self, description: &str, body: F) -> Result<Option<V>, TraceError>
    where
        F: FnOnce(&mut Self) -> Result<Option<V>, TraceError>,
    {
        let result = self.silenced(body)?;
        if result.is_none() {
            self.fail(Expectation::other(description));
        }
        Ok(result)
    }

    /// Turn the start rule's result into the parse result. Anything short of
    /// consuming the whole input is a [SyntaxError] at the furthest failure
    pub fn finish(mut self, result: Option<V>) -> Result<V, SyntaxError> {
        match result {
            Some(value) if self.pos == self.input.len() => return Ok(value),
            Some(_) => self.fail(Expectation::end()),
            None => {}
        }
        Err(self.error())
    }

    pub fn error(&mut self) -> SyntaxError {
        let at = self.max_fail_pos;
        let found = self.input[at..].chars().next();
        let end = at + found.map_or(0, char::len_utf8);
        let location = self.location(at, end);
        let expected: Vec<Expectation> = self.max_fail_expected.iter().cloned().collect();
        debug!(
            "parse failed at {} with {} expectation(s)",
            location.start,
            expected.len()
        );
        SyntaxError::new(expected, found.map(String::from), location)
    }
}

fn class_contains(parts: &[ClassPart], ignore_case: bool, c: char) -> bool {
    if parts.iter().any(|part| part.contains(c)) {
        return true;
    }
    ignore_case
        && c.to_lowercase()
            .chain(c.to_uppercase())
            .any(|folded| parts.iter().any(|part| part.contains(folded)))
}
