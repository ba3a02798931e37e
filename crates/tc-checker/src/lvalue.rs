use crate::decl::{DeclArena, DeclFlags};
use crate::expr::{BinaryOp, ExprArena, ExprKind, UnaryOp};
use crate::ids::ExprId;

/// Lvalue classification, per spec §4.8. An expression designates a
/// storage location iff it is a non-constant identifier, a selector whose
/// namespace is itself an lvalue, a pointer-dereference whose operand is
/// an lvalue, or an array subscript whose left side is an lvalue.
pub fn is_lvalue(expr: ExprId, exprs: &ExprArena, decls: &DeclArena) -> bool {
    match &exprs.get(expr).kind {
        ExprKind::Ident(ident) => match ident.resolved_declaration {
            Some(decl_id) => !decls.get(decl_id).flags.contains(DeclFlags::IS_CONSTANT),
            None => false,
        },
        ExprKind::Selector(selector) => is_lvalue(selector.namespace_expression, exprs, decls),
        ExprKind::Unary(unary) if unary.op == UnaryOp::Dereference => {
            is_lvalue(unary.sub, exprs, decls)
        }
        ExprKind::Binary(binary) if binary.op == BinaryOp::Subscript => {
            is_lvalue(binary.left, exprs, decls)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Decl;
    use crate::expr::{Expr, IdentData};
    use tc_common::Span;
    use tc_types::BlockId;

    #[test]
    fn non_constant_ident_is_lvalue() {
        let mut exprs = ExprArena::new();
        let mut decls = DeclArena::new();
        let decl_id = decls.alloc(Decl::new(Span::dummy()));
        let ident = exprs.alloc(Expr::new(
            ExprKind::Ident(IdentData {
                name: "x".to_string(),
                enclosing_block: BlockId(0),
                resolved_declaration: Some(decl_id),
            }),
            Span::dummy(),
        ));
        assert!(is_lvalue(ident, &exprs, &decls));
    }

    #[test]
    fn constant_ident_is_not_lvalue() {
        let mut exprs = ExprArena::new();
        let mut decls = DeclArena::new();
        let mut decl = Decl::new(Span::dummy());
        decl.flags |= DeclFlags::IS_CONSTANT;
        let decl_id = decls.alloc(decl);
        let ident = exprs.alloc(Expr::new(
            ExprKind::Ident(IdentData {
                name: "PI".to_string(),
                enclosing_block: BlockId(0),
                resolved_declaration: Some(decl_id),
            }),
            Span::dummy(),
        ));
        assert!(!is_lvalue(ident, &exprs, &decls));
    }
}
