//! Code generation is text all the way down. There's no javascript AST here,
//! just [Ref]s (a name or expression, as text) that know how to combine into
//! bigger expressions and statements, and [Code], a buffer that keeps the
//! lines indented.
//!
//! Nothing here checks that the javascript makes sense. If every piece that
//! goes in is a valid expression, what comes out is too: that's the whole
//! contract.

pub mod js;

use std::fmt::Display;

/// A name or expression in the generated code
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct Ref(String);

impl Ref {
    pub fn new(text: impl Into<String>) -> Self {
        Ref(text.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
    /// `name = value;`
    pub fn set(&self, value: impl Display) -> String {
        format!("{} = {};", self, value)
    }
    /// `name(a, b)`
    pub fn call(&self, args: &[&dyn Display]) -> Ref {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        Ref(format!("{}({})", self, args.join(", ")))
    }
    /// `name[property]`
    pub fn get(&self, property: impl Display) -> Ref {
        Ref(format!("{}[{}]", self, property))
    }
    /// `name === right`
    pub fn equal(&self, right: impl Display) -> Ref {
        Ref(format!("{} === {}", self, right))
    }
    /// `right !== name`, the other way round from [Ref::equal] because
    /// `s0 !== peg$FAILED` reads better from `peg$FAILED.not_equal(s0)`
    pub fn not_equal(&self, right: impl Display) -> Ref {
        Ref(format!("{} !== {}", right, self))
    }
    pub fn substr(&self, start: impl Display, end: impl Display) -> Ref {
        Ref(format!("{}.substr({}, {})", self, start, end))
    }
    pub fn to_lower_case(&self) -> Ref {
        Ref(format!("{}.toLowerCase()", self))
    }
    pub fn inc(&self) -> Ref {
        Ref(format!("{}++", self))
    }
    pub fn dec(&self) -> Ref {
        Ref(format!("{}--", self))
    }
    pub fn length(&self) -> Ref {
        Ref(format!("{}.length", self))
    }
}
impl Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl From<&str> for Ref {
    fn from(text: &str) -> Self {
        Ref::new(text)
    }
}
impl From<String> for Ref {
    fn from(text: String) -> Self {
        Ref(text)
    }
}

/// `let name;` or `let name = init;`
pub fn let_decl(name: impl Display, init: Option<&dyn Display>) -> String {
    match init {
        Some(init) => format!("let {} = {};", name, init),
        None => format!("let {};", name),
    }
}

/// `const name = init;`
pub fn const_decl(name: impl Display, init: impl Display) -> String {
    format!("const {} = {};", name, init)
}

/// Lines of generated code, indented two spaces per level
#[derive(Debug, Default)]
pub struct Code {
    lines: Vec<String>,
    indent: usize,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn line(&mut self, text: impl Display) {
        let text = text.to_string();
        if text.is_empty() {
            self.lines.push(text);
        } else {
            self.lines.push(format!("{}{}", "  ".repeat(self.indent), text));
        }
    }
    /// Every line of a multi-line template, at the current indent
    pub fn lines(&mut self, template: &str) {
        for line in template.lines() {
            self.line(line);
        }
    }
    /// `head {`, then everything up to [Code::close] is one level deeper
    pub fn open(&mut self, head: impl Display) {
        self.line(format!("{} {{", head));
        self.indent += 1;
    }
    /// `} else {`
    pub fn else_(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("} else {");
        self.indent += 1;
    }
    pub fn close(&mut self) {
        self.close_with("}");
    }
    /// Close a block with something other than a plain `}`, like `})();`
    pub fn close_with(&mut self, text: impl Display) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}
