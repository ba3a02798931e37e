//! Flattener (C3). Walks a declaration's type/value expression tree and
//! its body block, if any, and emits the post-order `flattened[]` list the
//! driver (`driver.rs`) consumes one item at a time. Every child is pushed
//! before the node that owns it so the driver never reaches a parent
//! before its dependencies are typed.
//!
//! Grounded on the teacher's `statements.rs` dispatch-by-kind idiom
//! (`tsz-checker/src/statements.rs`): a handful of free functions, each
//! recursing into the child slots relevant to one node kind, rather than a
//! visitor trait — this crate's tree is small enough that a trait-based
//! visitor would be ceremony without payoff.

use crate::block::{BlockArena, StmtArena, StmtKind};
use crate::decl::DeclArena;
use crate::expr::{ExprArena, ExprKind, TypeDefKind};
use crate::ids::{BlockId, DeclId, StmtId};
use crate::slot::{Slot, WorkItem};

/// Flattens `decl`, populating its `flattened[]` exactly once. Calling this
/// twice on the same declaration would duplicate every entry — callers
/// (the driver, on first seeing a declaration) are responsible for calling
/// it only before `flattened` has ever been touched.
pub fn flatten_declaration(
    decl_id: DeclId,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
) -> Vec<WorkItem> {
    let mut out = Vec::new();
    let decl = decls.get(decl_id);

    // A struct/enum declaration's member block hangs off its `my_type`
    // `Type_Definition` (the `Struct`/`Enum` `TypeDefKind` variant); a
    // procedure's body block hangs off its `my_value` `Procedure` node.
    // `decl.my_block` is the same block reached that way — it exists for
    // declaration-level lookup (scope resolution), not as a third
    // independent thing to flatten, so walking `my_type`/`my_value` below
    // already visits it exactly once.
    if decl.my_type.is_some() {
        flatten_expr(Slot::DeclType(decl_id), decls, exprs, blocks, stmts, &mut out);
    }
    if let Some(value) = decl.my_value {
        flatten_value(decl_id, value, decls, exprs, blocks, stmts, &mut out);
    }

    out
}

/// `my_value` gets special-cased only insofar as a `Procedure` body block
/// is flattened alongside its own lambda-type/foreign-name slots — the
/// walk rule spec §4.2 describes for the `Procedure` kind specifically.
fn flatten_value(
    decl_id: DeclId,
    value: crate::ids::ExprId,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
    out: &mut Vec<WorkItem>,
) {
    if let ExprKind::Procedure(proc) = &exprs.get(value).kind {
        flatten_expr(Slot::ProcedureLambdaType(value), decls, exprs, blocks, stmts, out);
        if let Some(body) = proc.body_block {
            flatten_block(body, decls, exprs, blocks, stmts, out);
        }
        if proc.foreign_library_name.is_some() {
            flatten_expr(Slot::ProcedureForeignName(value), decls, exprs, blocks, stmts, out);
        }
        out.push(WorkItem::Expression(Slot::DeclValue(decl_id)));
        return;
    }
    flatten_expr(Slot::DeclValue(decl_id), decls, exprs, blocks, stmts, out);
}

/// Recurses through the child slots of the expression currently sitting in
/// `slot`, pushing each child's own slot before appending `slot` itself —
/// the post-order invariant spec §4.2 requires so later re-reads through
/// `read_slot` always observe any in-place substitution a child underwent.
fn flatten_expr(
    slot: Slot,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
    out: &mut Vec<WorkItem>,
) {
    let Some(id) = crate::slot::read_slot(slot, exprs, decls, stmts) else {
        return;
    };

    match &exprs.get(id).kind {
        ExprKind::Number(_) | ExprKind::Literal(_) | ExprKind::Ident(_) => {}
        ExprKind::Unary(_) => {
            flatten_expr(Slot::Unary(id), decls, exprs, blocks, stmts, out);
        }
        ExprKind::Binary(_) => {
            flatten_expr(Slot::BinaryLeft(id), decls, exprs, blocks, stmts, out);
            flatten_expr(Slot::BinaryRight(id), decls, exprs, blocks, stmts, out);
        }
        ExprKind::Cast(_) => {
            flatten_expr(Slot::CastTargetType(id), decls, exprs, blocks, stmts, out);
            flatten_expr(Slot::CastSub(id), decls, exprs, blocks, stmts, out);
        }
        ExprKind::Selector(_) => {
            flatten_expr(Slot::SelectorNamespace(id), decls, exprs, blocks, stmts, out);
        }
        ExprKind::ProcedureCall(call) => {
            flatten_expr(Slot::CallProcedure(id), decls, exprs, blocks, stmts, out);
            for i in 0..call.arguments.len() {
                flatten_expr(Slot::CallArgument(id, i), decls, exprs, blocks, stmts, out);
            }
        }
        ExprKind::TypeInstantiation(inst) => {
            flatten_expr(Slot::InstantiationTypeDef(id), decls, exprs, blocks, stmts, out);
            for i in 0..inst.arguments.len() {
                flatten_expr(Slot::InstantiationArgument(id, i), decls, exprs, blocks, stmts, out);
            }
        }
        ExprKind::Procedure(_) => {
            // Reached only for a `Procedure` expression that is not itself
            // a declaration's `my_value` (e.g. a function-typed field) —
            // the declaration-value special case lives in `flatten_value`.
            flatten_expr(Slot::ProcedureLambdaType(id), decls, exprs, blocks, stmts, out);
        }
        ExprKind::TypeDefinition(typedef) => {
            flatten_typedef(id, &typedef.kind, decls, exprs, blocks, stmts, out);
        }
    }

    out.push(WorkItem::Expression(slot));
}

fn flatten_typedef(
    id: crate::ids::ExprId,
    kind: &TypeDefKind,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
    out: &mut Vec<WorkItem>,
) {
    match kind {
        TypeDefKind::Builtin(_) | TypeDefKind::Ident { .. } => {}
        TypeDefKind::Pointer { .. } => {
            flatten_expr(Slot::TypeDefPointerPointee(id), decls, exprs, blocks, stmts, out);
        }
        TypeDefKind::Array { length, .. } => {
            if length.is_some() {
                flatten_expr(Slot::TypeDefArrayLength(id), decls, exprs, blocks, stmts, out);
            }
            flatten_expr(Slot::TypeDefArrayElement(id), decls, exprs, blocks, stmts, out);
        }
        TypeDefKind::Struct { block } => {
            flatten_block(*block, decls, exprs, blocks, stmts, out);
        }
        TypeDefKind::Enum { block, .. } => {
            flatten_expr(Slot::TypeDefEnumUnderlying(id), decls, exprs, blocks, stmts, out);
            flatten_block(*block, decls, exprs, blocks, stmts, out);
        }
        TypeDefKind::Lambda { argument_types, .. } => {
            for i in 0..argument_types.len() {
                flatten_expr(Slot::TypeDefLambdaArgument(id, i), decls, exprs, blocks, stmts, out);
            }
            flatten_expr(Slot::TypeDefLambdaReturn(id), decls, exprs, blocks, stmts, out);
        }
    }
}

/// Flattens every sub-statement, then every declaration living directly in
/// the block — each declaration's own value/type/nested block in turn —
/// per spec §4.2's "For a Block statement" rule. Declarations are flattened
/// inline here rather than recursing back through `flatten_declaration` so
/// a single `Vec` accumulates the whole tree in one pass; nothing about
/// the driver requires a declaration's flattened list to be self-contained
/// — only that the owning declaration's queue, whichever one it is, sees
/// its dependencies before itself.
fn flatten_block(
    block_id: BlockId,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
    out: &mut Vec<WorkItem>,
) {
    let block = blocks.get(block_id);
    for &stmt_id in &block.statements {
        flatten_stmt(stmt_id, decls, exprs, blocks, stmts, out);
    }
    for &decl_id in &block.declarations {
        let decl = decls.get(decl_id);
        if decl.my_type.is_some() {
            flatten_expr(Slot::DeclType(decl_id), decls, exprs, blocks, stmts, out);
        }
        if let Some(value) = decl.my_value {
            flatten_value(decl_id, value, decls, exprs, blocks, stmts, out);
        }
    }
}

fn flatten_stmt(
    stmt_id: StmtId,
    decls: &DeclArena,
    exprs: &ExprArena,
    blocks: &BlockArena,
    stmts: &StmtArena,
    out: &mut Vec<WorkItem>,
) {
    match &stmts.get(stmt_id).kind {
        StmtKind::While { body, .. } => {
            flatten_expr(Slot::StmtCondition(stmt_id), decls, exprs, blocks, stmts, out);
            flatten_block(*body, decls, exprs, blocks, stmts, out);
        }
        StmtKind::If { then_block, else_block, .. } => {
            flatten_expr(Slot::StmtCondition(stmt_id), decls, exprs, blocks, stmts, out);
            flatten_block(*then_block, decls, exprs, blocks, stmts, out);
            if let Some(else_block) = else_block {
                flatten_block(*else_block, decls, exprs, blocks, stmts, out);
            }
        }
        StmtKind::For { body, .. } => {
            // The iterator declaration's type is established by the
            // statement checker once `range`'s element type is known
            // (spec §4.5 "For"), not pushed as its own work item here.
            flatten_expr(Slot::StmtForRange(stmt_id), decls, exprs, blocks, stmts, out);
            flatten_block(*body, decls, exprs, blocks, stmts, out);
        }
        StmtKind::Return { value, .. } => {
            if value.is_some() {
                flatten_expr(Slot::StmtReturnValue(stmt_id), decls, exprs, blocks, stmts, out);
            }
        }
        StmtKind::Variable { decl } => {
            let d = decls.get(*decl);
            if let Some(value) = d.my_value {
                flatten_value(*decl, value, decls, exprs, blocks, stmts, out);
            }
            if d.my_type.is_some() {
                flatten_expr(Slot::DeclType(*decl), decls, exprs, blocks, stmts, out);
            }
        }
        StmtKind::Assignment { .. } => {
            flatten_expr(Slot::StmtAssignmentTarget(stmt_id), decls, exprs, blocks, stmts, out);
            flatten_expr(Slot::StmtAssignmentValue(stmt_id), decls, exprs, blocks, stmts, out);
        }
        StmtKind::Using { .. } => {
            flatten_expr(Slot::StmtUsingSub(stmt_id), decls, exprs, blocks, stmts, out);
        }
        StmtKind::ExpressionStatement(_) => {
            flatten_expr(Slot::StmtExpression(stmt_id), decls, exprs, blocks, stmts, out);
        }
        StmtKind::Block(block) => {
            flatten_block(*block, decls, exprs, blocks, stmts, out);
        }
        StmtKind::LoopControl(_) | StmtKind::Import(_) => {}
    }

    out.push(WorkItem::Statement(stmt_id));
}
