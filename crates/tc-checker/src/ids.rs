pub use tc_types::{BlockId, DeclId};

/// Handle into an [`crate::expr::ExprArena`]. Every expression in a
/// declaration's tree, original or synthesized by folding/autocast/slice
/// promotion, gets one of these; parents address children through
/// [`crate::slot::Slot`], never through a borrowed reference, so that
/// substitution (overwriting the `ExprId` a slot holds) is possible while
/// other parts of the tree still hold the old id around in a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// Handle into a [`crate::block::StmtArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(pub u32);
