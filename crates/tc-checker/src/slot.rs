use crate::block::{StmtArena, StmtKind};
use crate::decl::DeclArena;
use crate::expr::{ExprArena, ExprKind, TypeDefKind};
use crate::ids::{DeclId, ExprId, StmtId};

/// The Rust stand-in for the source's `Ast_Expression **`: a
/// `(parent_handle, field_tag)` pair (spec §9, "Slot addressability during
/// rewrite") that can be read through to the current child and written
/// through to substitute it, without ever holding a live borrow across the
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    DeclType(DeclId),
    DeclValue(DeclId),
    Unary(ExprId),
    BinaryLeft(ExprId),
    BinaryRight(ExprId),
    ProcedureLambdaType(ExprId),
    ProcedureForeignName(ExprId),
    CallProcedure(ExprId),
    CallArgument(ExprId, usize),
    CastTargetType(ExprId),
    CastSub(ExprId),
    SelectorNamespace(ExprId),
    InstantiationTypeDef(ExprId),
    InstantiationArgument(ExprId, usize),
    TypeDefPointerPointee(ExprId),
    TypeDefArrayLength(ExprId),
    TypeDefArrayElement(ExprId),
    TypeDefEnumUnderlying(ExprId),
    TypeDefLambdaArgument(ExprId, usize),
    TypeDefLambdaReturn(ExprId),
    /// Shared by `While` and `If` — both hold their condition in the same
    /// position and nothing else reads this slot kind-specifically.
    StmtCondition(StmtId),
    StmtForRange(StmtId),
    StmtReturnValue(StmtId),
    StmtAssignmentTarget(StmtId),
    StmtAssignmentValue(StmtId),
    StmtUsingSub(StmtId),
    StmtExpression(StmtId),
}

/// One entry of a declaration's flattened work list (spec §3 "Work item").
/// Exactly one of an expression slot or a statement is ever present —
/// modeled as a sum type rather than the source's two-optional-fields
/// struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    Expression(Slot),
    Statement(StmtId),
}

/// Reads the current `ExprId` stored at a slot. Panics on malformed input
/// (a slot tag that names a parent expression of the wrong kind) — this
/// can only happen from a bug in the flattener, never from checked input,
/// matching the source's undefined-behavior-on-corrupt-tree assumption.
pub fn read_slot(slot: Slot, exprs: &ExprArena, decls: &DeclArena, stmts: &StmtArena) -> Option<ExprId> {
    match slot {
        Slot::DeclType(d) => decls.get(d).my_type,
        Slot::DeclValue(d) => decls.get(d).my_value,
        Slot::Unary(parent) => match &exprs.get(parent).kind {
            ExprKind::Unary(u) => Some(u.sub),
            _ => panic!("Unary slot on non-Unary expression"),
        },
        Slot::BinaryLeft(parent) => match &exprs.get(parent).kind {
            ExprKind::Binary(b) => Some(b.left),
            _ => panic!("BinaryLeft slot on non-Binary expression"),
        },
        Slot::BinaryRight(parent) => match &exprs.get(parent).kind {
            ExprKind::Binary(b) => Some(b.right),
            _ => panic!("BinaryRight slot on non-Binary expression"),
        },
        Slot::ProcedureLambdaType(parent) => match &exprs.get(parent).kind {
            ExprKind::Procedure(p) => Some(p.lambda_type),
            _ => panic!("ProcedureLambdaType slot on non-Procedure expression"),
        },
        Slot::ProcedureForeignName(parent) => match &exprs.get(parent).kind {
            ExprKind::Procedure(p) => p.foreign_library_name,
            _ => panic!("ProcedureForeignName slot on non-Procedure expression"),
        },
        Slot::CallProcedure(parent) => match &exprs.get(parent).kind {
            ExprKind::ProcedureCall(c) => Some(c.procedure),
            _ => panic!("CallProcedure slot on non-ProcedureCall expression"),
        },
        Slot::CallArgument(parent, i) => match &exprs.get(parent).kind {
            ExprKind::ProcedureCall(c) => Some(c.arguments[i]),
            _ => panic!("CallArgument slot on non-ProcedureCall expression"),
        },
        Slot::CastTargetType(parent) => match &exprs.get(parent).kind {
            ExprKind::Cast(c) => Some(c.target_type),
            _ => panic!("CastTargetType slot on non-Cast expression"),
        },
        Slot::CastSub(parent) => match &exprs.get(parent).kind {
            ExprKind::Cast(c) => Some(c.sub),
            _ => panic!("CastSub slot on non-Cast expression"),
        },
        Slot::SelectorNamespace(parent) => match &exprs.get(parent).kind {
            ExprKind::Selector(s) => Some(s.namespace_expression),
            _ => panic!("SelectorNamespace slot on non-Selector expression"),
        },
        Slot::InstantiationTypeDef(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeInstantiation(t) => Some(t.type_definition),
            _ => panic!("InstantiationTypeDef slot on non-TypeInstantiation expression"),
        },
        Slot::InstantiationArgument(parent, i) => match &exprs.get(parent).kind {
            ExprKind::TypeInstantiation(t) => Some(t.arguments[i]),
            _ => panic!("InstantiationArgument slot on non-TypeInstantiation expression"),
        },
        Slot::TypeDefPointerPointee(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Pointer { pointee } => Some(*pointee),
                _ => panic!("TypeDefPointerPointee slot on non-Pointer type definition"),
            },
            _ => panic!("TypeDefPointerPointee slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefArrayLength(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Array { length, .. } => *length,
                _ => panic!("TypeDefArrayLength slot on non-Array type definition"),
            },
            _ => panic!("TypeDefArrayLength slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefArrayElement(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Array { element, .. } => Some(*element),
                _ => panic!("TypeDefArrayElement slot on non-Array type definition"),
            },
            _ => panic!("TypeDefArrayElement slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefEnumUnderlying(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Enum { underlying, .. } => Some(*underlying),
                _ => panic!("TypeDefEnumUnderlying slot on non-Enum type definition"),
            },
            _ => panic!("TypeDefEnumUnderlying slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefLambdaArgument(parent, i) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Lambda { argument_types, .. } => Some(argument_types[i]),
                _ => panic!("TypeDefLambdaArgument slot on non-Lambda type definition"),
            },
            _ => panic!("TypeDefLambdaArgument slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefLambdaReturn(parent) => match &exprs.get(parent).kind {
            ExprKind::TypeDefinition(t) => match &t.kind {
                TypeDefKind::Lambda { return_type, .. } => Some(*return_type),
                _ => panic!("TypeDefLambdaReturn slot on non-Lambda type definition"),
            },
            _ => panic!("TypeDefLambdaReturn slot on non-TypeDefinition expression"),
        },
        Slot::StmtCondition(s) => match &stmts.get(s).kind {
            StmtKind::While { condition, .. } => Some(*condition),
            StmtKind::If { condition, .. } => Some(*condition),
            _ => panic!("StmtCondition slot on a statement with no condition"),
        },
        Slot::StmtForRange(s) => match &stmts.get(s).kind {
            StmtKind::For { range, .. } => Some(*range),
            _ => panic!("StmtForRange slot on non-For statement"),
        },
        Slot::StmtReturnValue(s) => match &stmts.get(s).kind {
            StmtKind::Return { value, .. } => *value,
            _ => panic!("StmtReturnValue slot on non-Return statement"),
        },
        Slot::StmtAssignmentTarget(s) => match &stmts.get(s).kind {
            StmtKind::Assignment { target, .. } => Some(*target),
            _ => panic!("StmtAssignmentTarget slot on non-Assignment statement"),
        },
        Slot::StmtAssignmentValue(s) => match &stmts.get(s).kind {
            StmtKind::Assignment { value, .. } => Some(*value),
            _ => panic!("StmtAssignmentValue slot on non-Assignment statement"),
        },
        Slot::StmtUsingSub(s) => match &stmts.get(s).kind {
            StmtKind::Using { sub } => Some(*sub),
            _ => panic!("StmtUsingSub slot on non-Using statement"),
        },
        Slot::StmtExpression(s) => match &stmts.get(s).kind {
            StmtKind::ExpressionStatement(e) => Some(*e),
            _ => panic!("StmtExpression slot on non-ExpressionStatement statement"),
        },
    }
}

/// Overwrites the `ExprId` stored at a slot — the only way a node is ever
/// "replaced" in this model. Every substitution described in spec §4
/// (constant folding, ident-to-constant, literal coercion,
/// array-to-slice) goes through this function.
pub fn write_slot(slot: Slot, new: ExprId, exprs: &mut ExprArena, decls: &mut DeclArena, stmts: &mut StmtArena) {
    match slot {
        Slot::DeclType(d) => decls.get_mut(d).my_type = Some(new),
        Slot::DeclValue(d) => decls.get_mut(d).my_value = Some(new),
        Slot::Unary(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Unary(u) => u.sub = new,
            _ => panic!("Unary slot on non-Unary expression"),
        },
        Slot::BinaryLeft(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Binary(b) => b.left = new,
            _ => panic!("BinaryLeft slot on non-Binary expression"),
        },
        Slot::BinaryRight(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Binary(b) => b.right = new,
            _ => panic!("BinaryRight slot on non-Binary expression"),
        },
        Slot::ProcedureLambdaType(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Procedure(p) => p.lambda_type = new,
            _ => panic!("ProcedureLambdaType slot on non-Procedure expression"),
        },
        Slot::ProcedureForeignName(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Procedure(p) => p.foreign_library_name = Some(new),
            _ => panic!("ProcedureForeignName slot on non-Procedure expression"),
        },
        Slot::CallProcedure(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::ProcedureCall(c) => c.procedure = new,
            _ => panic!("CallProcedure slot on non-ProcedureCall expression"),
        },
        Slot::CallArgument(parent, i) => match &mut exprs.get_mut(parent).kind {
            ExprKind::ProcedureCall(c) => c.arguments[i] = new,
            _ => panic!("CallArgument slot on non-ProcedureCall expression"),
        },
        Slot::CastTargetType(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Cast(c) => c.target_type = new,
            _ => panic!("CastTargetType slot on non-Cast expression"),
        },
        Slot::CastSub(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Cast(c) => c.sub = new,
            _ => panic!("CastSub slot on non-Cast expression"),
        },
        Slot::SelectorNamespace(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::Selector(s) => s.namespace_expression = new,
            _ => panic!("SelectorNamespace slot on non-Selector expression"),
        },
        Slot::InstantiationTypeDef(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeInstantiation(t) => t.type_definition = new,
            _ => panic!("InstantiationTypeDef slot on non-TypeInstantiation expression"),
        },
        Slot::InstantiationArgument(parent, i) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeInstantiation(t) => t.arguments[i] = new,
            _ => panic!("InstantiationArgument slot on non-TypeInstantiation expression"),
        },
        Slot::TypeDefPointerPointee(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Pointer { pointee } => *pointee = new,
                _ => panic!("TypeDefPointerPointee slot on non-Pointer type definition"),
            },
            _ => panic!("TypeDefPointerPointee slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefArrayLength(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Array { length, .. } => *length = Some(new),
                _ => panic!("TypeDefArrayLength slot on non-Array type definition"),
            },
            _ => panic!("TypeDefArrayLength slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefArrayElement(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Array { element, .. } => *element = new,
                _ => panic!("TypeDefArrayElement slot on non-Array type definition"),
            },
            _ => panic!("TypeDefArrayElement slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefEnumUnderlying(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Enum { underlying, .. } => *underlying = new,
                _ => panic!("TypeDefEnumUnderlying slot on non-Enum type definition"),
            },
            _ => panic!("TypeDefEnumUnderlying slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefLambdaArgument(parent, i) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Lambda { argument_types, .. } => argument_types[i] = new,
                _ => panic!("TypeDefLambdaArgument slot on non-Lambda type definition"),
            },
            _ => panic!("TypeDefLambdaArgument slot on non-TypeDefinition expression"),
        },
        Slot::TypeDefLambdaReturn(parent) => match &mut exprs.get_mut(parent).kind {
            ExprKind::TypeDefinition(t) => match &mut t.kind {
                TypeDefKind::Lambda { return_type, .. } => *return_type = new,
                _ => panic!("TypeDefLambdaReturn slot on non-Lambda type definition"),
            },
            _ => panic!("TypeDefLambdaReturn slot on non-TypeDefinition expression"),
        },
        Slot::StmtCondition(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::While { condition, .. } => *condition = new,
            StmtKind::If { condition, .. } => *condition = new,
            _ => panic!("StmtCondition slot on a statement with no condition"),
        },
        Slot::StmtForRange(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::For { range, .. } => *range = new,
            _ => panic!("StmtForRange slot on non-For statement"),
        },
        Slot::StmtReturnValue(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::Return { value, .. } => *value = Some(new),
            _ => panic!("StmtReturnValue slot on non-Return statement"),
        },
        Slot::StmtAssignmentTarget(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::Assignment { target, .. } => *target = new,
            _ => panic!("StmtAssignmentTarget slot on non-Assignment statement"),
        },
        Slot::StmtAssignmentValue(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::Assignment { value, .. } => *value = new,
            _ => panic!("StmtAssignmentValue slot on non-Assignment statement"),
        },
        Slot::StmtUsingSub(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::Using { sub } => *sub = new,
            _ => panic!("StmtUsingSub slot on non-Using statement"),
        },
        Slot::StmtExpression(s) => match &mut stmts.get_mut(s).kind {
            StmtKind::ExpressionStatement(e) => *e = new,
            _ => panic!("StmtExpression slot on non-ExpressionStatement statement"),
        },
    }
}
