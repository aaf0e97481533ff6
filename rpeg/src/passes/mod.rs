//! The passes that check, transform and finally generate from a
//! [Grammar](crate::Grammar).
//!
//! [default_passes](crate::default_passes) runs them in this order:
//!
//! 1. check: [report_duplicate_rules], [report_undefined_rules]
//! 2. transform: [remove_proxy_rules]
//! 3. generate: [collect_expectations], [generate_js]
//!
//! Check passes never change the grammar, they report to the
//! [Session](crate::Session) and the stage stops the compile if anything
//! was an error. generate_js looks every expectation up in the pool
//! collect_expectations builds, so that one has to come first.

mod check;
mod generate;
mod transform;

pub use check::report_duplicate_rules;
pub use check::report_undefined_rules;
pub use generate::collect_expectations;
pub use generate::generate_js;
pub use transform::remove_proxy_rules;
