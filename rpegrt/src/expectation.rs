//! Expectations describe why a match failed: what the parser *expected* to
//! see at the position where it gave up.
//!
//! The same [Expectation] values are used on both sides of the compiler:
//! rpeg renders them into the generated parser as constant declarations, and
//! [ParseState](crate::ParseState) builds them at runtime. Since they're the
//! same rust type, a runtime expectation and a declared one are equal
//! exactly when their fields are, which is what lets error reporting merge
//! expectations collected while backtracking.

/// One member of a character class, either a single char (`_`) or an
/// inclusive range (`a-z`)
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum ClassPart {
    Char(char),
    Range(char, char),
}
impl ClassPart {
    pub fn contains(&self, c: char) -> bool {
        match *self {
            ClassPart::Char(only) => c == only,
            ClassPart::Range(lo, hi) => lo <= c && c <= hi,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub enum Expectation {
    /// An exact string
    Literal { text: String, ignore_case: bool },
    /// One char that is (or, inverted, isn't) in the class
    Class {
        parts: Vec<ClassPart>,
        inverted: bool,
        ignore_case: bool,
    },
    /// Any one char at all
    Any,
    /// Nothing left to parse
    End,
    /// Something with a name, like a rule with a display name
    Other { description: String },
}

impl Expectation {
    pub fn literal(text: impl Into<String>, ignore_case: bool) -> Self {
        Expectation::Literal {
            text: text.into(),
            ignore_case,
        }
    }
    pub fn class(parts: Vec<ClassPart>, inverted: bool, ignore_case: bool) -> Self {
        Expectation::Class {
            parts,
            inverted,
            ignore_case,
        }
    }
    pub fn any() -> Self {
        Expectation::Any
    }
    pub fn end() -> Self {
        Expectation::End
    }
    pub fn other(description: impl Into<String>) -> Self {
        Expectation::Other {
            description: description.into(),
        }
    }

    /// The tag the generated javascript uses for the `type` field
    pub fn tag(&self) -> &'static str {
        match self {
            Expectation::Literal { .. } => "literal",
            Expectation::Class { .. } => "class",
            Expectation::Any => "any",
            Expectation::End => "end",
            Expectation::Other { .. } => "other",
        }
    }

    /// What goes after "Expected" in an error message
    pub fn describe(&self) -> String {
        match self {
            Expectation::Literal { text, .. } => format!("\"{}\"", literal_escape(text)),
            Expectation::Class {
                parts, inverted, ..
            } => {
                let mut out = String::from("[");
                if *inverted {
                    out.push('^');
                }
                for part in parts {
                    match *part {
                        ClassPart::Char(c) => out.push_str(&class_escape(&c.to_string())),
                        ClassPart::Range(lo, hi) => {
                            out.push_str(&class_escape(&lo.to_string()));
                            out.push('-');
                            out.push_str(&class_escape(&hi.to_string()));
                        }
                    }
                }
                out.push(']');
                out
            }
            Expectation::Any => "any character".to_string(),
            Expectation::End => "end of input".to_string(),
            Expectation::Other { description } => description.clone(),
        }
    }
}

/// Sorted, deduplicated, and joined like a person would write it:
/// `a`, `a or b`, `a, b, or c`
pub fn describe_expected(expected: &[Expectation]) -> String {
    let mut descriptions: Vec<String> = expected.iter().map(Expectation::describe).collect();
    descriptions.sort();
    descriptions.dedup();
    match descriptions.split_last() {
        None => "nothing".to_string(),
        Some((last, [])) => last.clone(),
        Some((last, [only])) => format!("{} or {}", only, last),
        Some((last, init)) => format!("{}, or {}", init.join(", "), last),
    }
}

pub fn describe_found(found: Option<&str>) -> String {
    match found {
        Some(text) => format!("\"{}\"", literal_escape(text)),
        None => "end of input".to_string(),
    }
}

fn escape_control(c: char, out: &mut String) {
    match c {
        '\0' => out.push_str("\\0"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => {
            out.push_str(&format!("\\x{:02X}", c as u32))
        }
        _ => out.push(c),
    }
}

pub fn literal_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => escape_control(c, &mut out),
        }
    }
    out
}

pub fn class_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ']' => out.push_str("\\]"),
            '^' => out.push_str("\\^"),
            '-' => out.push_str("\\-"),
            _ => escape_control(c, &mut out),
        }
    }
    out
}
