//! Source spans and the diagnostic data model shared by every later stage
//! of the checker: `tc-types` uses `Span` nowhere directly but `tc-checker`
//! threads it through every expression and statement node, and both crates
//! report failures as `Diagnostic` values defined here.

pub mod diagnostics;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticCategory, ErrorKind, RelatedInformation};
pub use span::{SourceExcerpt, Span};
