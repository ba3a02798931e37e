//! The type registry: canonical builtin types and structural/nominal
//! equality (spec §4.1). This crate knows nothing about expressions or
//! declarations beyond the opaque [`DeclId`]/[`BlockId`] handles a few
//! `Type` variants carry — resolving those handles into checked state is
//! `tc_checker`'s job.

pub mod arena;
pub mod ids;
pub mod ty;

pub use arena::{TypeArena, TypeId};
pub use ids::{BlockId, DeclId};
pub use ty::{ArrayKind, LiteralKind, Type, TypeIdVec};
