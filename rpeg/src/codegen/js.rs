// Turning rust values into javascript source text

use rpegrt::{ClassPart, Expectation};

/// Escape for the inside of a double-quoted javascript string. Everything
/// outside printable ascii is escaped so the output survives any encoding
pub fn string_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => escape_char(c, &mut out),
        }
    }
    out
}

/// `"text"`, escaped
pub fn string_literal(text: &str) -> String {
    format!("\"{}\"", string_escape(text))
}

fn escape_char(c: char, out: &mut String) {
    match c {
        '\0' => out.push_str("\\0"),
        '\u{8}' => out.push_str("\\b"),
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\u{b}' => out.push_str("\\v"),
        '\u{c}' => out.push_str("\\f"),
        '\r' => out.push_str("\\r"),
        '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{ff}' => out.push_str(&format!("\\x{:02X}", c as u32)),
        '\u{100}'..='\u{ffff}' => out.push_str(&format!("\\u{:04X}", c as u32)),
        // astral chars as a surrogate pair, javascript strings are utf-16
        '\u{10000}'..='\u{10ffff}' => {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04X}", unit));
            }
        }
        _ => out.push(c),
    }
}

fn class_parts_array(parts: &[ClassPart]) -> String {
    let parts: Vec<String> = parts
        .iter()
        .map(|part| match *part {
            ClassPart::Char(c) => string_literal(&c.to_string()),
            ClassPart::Range(lo, hi) => format!(
                "[{}, {}]",
                string_literal(&lo.to_string()),
                string_literal(&hi.to_string())
            ),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// The name of the runtime constructor for an expectation's tag, the
/// prelude defines one per tag with exactly these names
pub fn expectation_constructor(tag: &str) -> String {
    format!("peg${}Expectation", tag)
}

/// The expression that builds `expected` at runtime, for the generated
/// parser's constant declarations
pub fn expectation_declaration(expected: &Expectation) -> String {
    let constructor = expectation_constructor(expected.tag());
    match expected {
        Expectation::Literal { text, ignore_case } => {
            format!("{}({}, {})", constructor, string_literal(text), ignore_case)
        }
        Expectation::Class {
            parts,
            inverted,
            ignore_case,
        } => format!(
            "{}({}, {}, {})",
            constructor,
            class_parts_array(parts),
            inverted,
            ignore_case
        ),
        Expectation::Any | Expectation::End => format!("{}()", constructor),
        Expectation::Other { description } => {
            format!("{}({})", constructor, string_literal(description))
        }
    }
}
