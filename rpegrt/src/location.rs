/// A position is a single point in the parser's input. line and column
/// start at 1 (that's what people expect to read in an error message), the
/// offset is the byte offset into the input and starts at 0
///
/// The offset is optional because positions built by hand (tests, grammar
/// IR handed to the compiler) often only know line:col
///
/// Positions order by line, then column, then offset (a position without
/// one comes first). Line and column always agree with the offset for
/// positions taken from the same input, so that's input order
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: Option<usize>,
}
impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            offset: None,
        }
    }
    pub fn with_offset(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset: Some(offset),
        }
    }
    /// Beginning of any input
    pub fn start() -> Self {
        Self::with_offset(1, 1, 0)
    }
}
impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}
impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// From the beginning (start) to the end (end) of something in the input.
/// Anything that builds one keeps start at or before end, construction
/// itself takes whatever it's given
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash, Default)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}
impl Location {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
    /// An empty location, used for rule entry and failure (nothing consumed)
    pub fn point(at: Position) -> Self {
        Self { start: at, end: at }
    }
}
impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
