//! Runtime for parsers generated by rpeg.
//!
//! Everything in here is something a parser needs no matter the grammar:
//!
//! - [Expectation]s, what a failed match wanted to see
//! - [Position]s and [Location]s in the input
//! - the [Tracer] protocol for watching rules enter, match and fail
//! - [ParseState], which keeps track of the furthest failure and produces
//!   the [SyntaxError] at the end

#[macro_use]
extern crate log;

mod error;
pub mod expectation;
mod location;
mod state;
pub mod trace;

pub use error::{Error, SyntaxError};
pub use expectation::{ClassPart, Expectation};
pub use location::{Location, Position};
pub use state::{ParseOptions, ParseState};
pub use trace::{DefaultTracer, EventKind, LogSink, TraceError, TraceEvent, TraceSink, Tracer};
