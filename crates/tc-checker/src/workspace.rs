use tc_common::{SourceExcerpt, Span};

use crate::ids::{BlockId, DeclId, ExprId};

/// The explicit-parameter replacement for the source's global `Workspace *`
/// (spec §9 Design Notes, "Global context"): scope resolution and
/// diagnostic source excerpting, provided by whatever owns the parser's
/// output. Nothing in `tc-checker` reaches for global/thread-local state —
/// every method that needs scope or file data takes a `&dyn Workspace`.
pub trait Workspace {
    /// Resolves an `Ident` expression to the declaration it names, per the
    /// lexical scope the parser already recorded on the expression
    /// (`enclosing_block`). Returns `None` for a genuinely unresolved name.
    fn find_declaration_from_identifier(&self, ident: ExprId) -> Option<DeclId>;

    /// Resolves a member name against a specific block (struct fields,
    /// enum values, namespace-of-Type members).
    fn find_declaration_in_block(&self, block: BlockId, name: &str) -> Option<DeclId>;

    /// Renders the two-line excerpt a diagnostic is presented with.
    fn source_excerpt(&self, span: Span) -> SourceExcerpt;
}
