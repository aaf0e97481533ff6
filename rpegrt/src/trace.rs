//! Tracing is how you watch a parser work: every rule invocation reports
//! a [TraceEvent::Enter] when it starts, and exactly one of
//! [TraceEvent::Match] or [TraceEvent::Fail] when it's done.
//!
//! Anything implementing [Tracer] can be handed to a parser. [DefaultTracer]
//! is the reference one, printing an indented line per event into whatever
//! [TraceSink] it's given.

use crate::Location;

/// The kind of event, and the tag it's known by in generated code
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum EventKind {
    Enter,
    Match,
    Fail,
}
impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Enter => "rule.enter",
            EventKind::Match => "rule.match",
            EventKind::Fail => "rule.fail",
        }
    }
}
impl std::str::FromStr for EventKind {
    type Err = TraceError;
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "rule.enter" => Ok(EventKind::Enter),
            "rule.match" => Ok(EventKind::Match),
            "rule.fail" => Ok(EventKind::Fail),
            _ => Err(TraceError::UnknownEvent(tag.to_string())),
        }
    }
}
impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `V` is whatever the parser produces, only match events carry one
#[derive(PartialEq, Debug)]
pub enum TraceEvent<'a, V> {
    Enter {
        rule: &'a str,
        location: Location,
    },
    Match {
        rule: &'a str,
        location: Location,
        result: &'a V,
    },
    Fail {
        rule: &'a str,
        location: Location,
    },
}

impl<'a, V> TraceEvent<'a, V> {
    /// Build an event from its textual tag. This is the one place an event
    /// can be unknown, and it's an error, not something to skip over
    pub fn from_tag(
        tag: &str,
        rule: &'a str,
        location: Location,
        result: Option<&'a V>,
    ) -> Result<Self, TraceError> {
        Ok(match tag.parse::<EventKind>()? {
            EventKind::Enter => TraceEvent::Enter { rule, location },
            EventKind::Match => match result {
                Some(result) => TraceEvent::Match {
                    rule,
                    location,
                    result,
                },
                None => return Err(TraceError::MissingResult(rule.to_string())),
            },
            EventKind::Fail => TraceEvent::Fail { rule, location },
        })
    }
    pub fn kind(&self) -> EventKind {
        match self {
            TraceEvent::Enter { .. } => EventKind::Enter,
            TraceEvent::Match { .. } => EventKind::Match,
            TraceEvent::Fail { .. } => EventKind::Fail,
        }
    }
    pub fn rule(&self) -> &'a str {
        match *self {
            TraceEvent::Enter { rule, .. }
            | TraceEvent::Match { rule, .. }
            | TraceEvent::Fail { rule, .. } => rule,
        }
    }
    pub fn location(&self) -> Location {
        match *self {
            TraceEvent::Enter { location, .. }
            | TraceEvent::Match { location, .. }
            | TraceEvent::Fail { location, .. } => location,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum TraceError {
    /// A tag that isn't one of the three events
    UnknownEvent(String),
    /// rule.match with nothing matched
    MissingResult(String),
    /// A rule closed that was never entered (would be negative depth)
    Unbalanced(String),
}
impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TraceError::*;
        match self {
            UnknownEvent(tag) => write!(f, "invalid event type: {}", tag),
            MissingResult(rule) => write!(f, "rule.match for {} has no result", rule),
            Unbalanced(rule) => write!(f, "{} closed without a matching rule.enter", rule),
        }
    }
}
impl std::error::Error for TraceError {}

/// Observes one event at a time
pub trait Tracer<V> {
    fn trace(&mut self, event: &TraceEvent<V>) -> Result<(), TraceError>;
}

/// Where [DefaultTracer] puts its lines
pub trait TraceSink {
    fn line(&mut self, line: &str);
}
/// Collects lines, mostly for tests
impl TraceSink for Vec<String> {
    fn line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}
/// Forwards every line to the `log` facade at info level
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;
impl TraceSink for LogSink {
    fn line(&mut self, line: &str) {
        info!(target: "rpegrt::trace", "{}", line);
    }
}

/// Prints `start-end tag    <indent>rule`. Children end up indented under
/// their parent, and the parent's closing line lines up with its opening one
#[derive(Debug)]
pub struct DefaultTracer<S: TraceSink> {
    sink: S,
    depth: usize,
}

impl<S: TraceSink> DefaultTracer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, depth: 0 }
    }
    /// How many rules are currently open
    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn sink(&self) -> &S {
        &self.sink
    }
    pub fn into_sink(self) -> S {
        self.sink
    }
    fn log<V>(&mut self, event: &TraceEvent<V>) {
        let line = format!(
            "{} {:<10} {}{}",
            event.location(),
            event.kind().as_str(),
            "  ".repeat(self.depth),
            event.rule()
        );
        self.sink.line(&line);
    }
}

impl<S: TraceSink, V> Tracer<V> for DefaultTracer<S> {
    fn trace(&mut self, event: &TraceEvent<V>) -> Result<(), TraceError> {
        match event {
            TraceEvent::Enter { .. } => {
                self.log(event);
                self.depth += 1;
            }
            TraceEvent::Match { rule, .. } | TraceEvent::Fail { rule, .. } => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or_else(|| TraceError::Unbalanced(rule.to_string()))?;
                self.log(event);
            }
        }
        Ok(())
    }
}
