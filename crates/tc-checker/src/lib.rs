//! The type checker itself: the work-queue driver (C6), the per-kind
//! expression checker (C4), the statement checker (C5), and the flattener
//! (C3) that feeds them, built on top of `tc-types`' registry (C1) and
//! `tc-common`'s diagnostics (C8). `conversions` is the implicit-conversion
//! engine (C7); `slot` is the addressable-rewrite primitive everything
//! above substitution goes through (C2).

pub mod block;
pub mod checker;
pub mod constants;
pub mod conversions;
pub mod decl;
pub mod dispatch;
pub mod driver;
pub mod expr;
pub mod flatten;
pub mod ids;
pub mod layout;
pub mod lvalue;
pub mod number;
pub mod options;
pub mod slot;
pub mod statements;
pub mod workspace;

pub use block::{Block, BlockArena, LoopControlKind, Stmt, StmtArena, StmtKind};
pub use checker::Checker;
pub use decl::{Decl, DeclArena, DeclFlags};
pub use expr::{Expr, ExprArena, ExprKind};
pub use ids::{BlockId, DeclId, ExprId, StmtId};
pub use options::CheckerOptions;
pub use slot::{Slot, WorkItem};
pub use workspace::Workspace;
