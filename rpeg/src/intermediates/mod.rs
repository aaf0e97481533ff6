// Data structures the passes hand along. There's only the one

mod grammar;

pub use grammar::{Expression, Grammar, Rule};
