//! Statement checker (C5). Every substatement and subexpression a
//! statement touches is already typed by the time it is reached — the
//! flattener (`flatten.rs`) pushes a statement's children before the
//! statement itself, matching `typecheck_statement`'s post-order dispatch
//! in the teacher's source. Statements never park (spec §4.9
//! "Suspension points"): every arm below either finishes or returns a
//! fatal `Diagnostic`.

use tc_common::{Diagnostic, ErrorKind};
use tc_types::Type;

use crate::block::StmtKind;
use crate::checker::Checker;
use crate::decl::DeclFlags;
use crate::expr::{BinaryOp, ExprKind};
use crate::ids::StmtId;
use crate::lvalue::is_lvalue;
use crate::slot::Slot;

impl<'w> Checker<'w> {
    pub fn check_statement(&mut self, stmt_id: StmtId) -> Result<(), Diagnostic> {
        if self.stmts.get(stmt_id).typechecked {
            return Ok(());
        }

        match self.stmts.get(stmt_id).kind.clone() {
            StmtKind::While { .. } | StmtKind::If { .. } => self.check_condition(stmt_id)?,
            StmtKind::For { range, .. } => self.check_for_range(range)?,
            StmtKind::Return { value, enclosing_procedure } => {
                self.check_return(stmt_id, value, enclosing_procedure)?
            }
            StmtKind::Variable { decl } => {
                self.run(decl)?;
            }
            StmtKind::Assignment { target, value: _ } => self.check_assignment(stmt_id, target)?,
            StmtKind::Using { .. } => {
                let location = self.stmts.get(stmt_id).location;
                return Err(Diagnostic::error(ErrorKind::Unimplemented, location, "'using' is not implemented"));
            }
            StmtKind::Block(_) | StmtKind::LoopControl(_) | StmtKind::Import(_) | StmtKind::ExpressionStatement(_) => {}
        }

        self.stmts.get_mut(stmt_id).typechecked = true;
        Ok(())
    }

    /// Shared by `While` and `If`: both hold their condition at
    /// `Slot::StmtCondition` and apply the identical bool-or-autocast rule.
    fn check_condition(&mut self, stmt_id: StmtId) -> Result<(), Diagnostic> {
        let condition = crate::slot::read_slot(Slot::StmtCondition(stmt_id), &self.exprs, &self.decls, &self.stmts)
            .expect("While/If always carries a condition");
        let ty = self.exprs.get(condition).inferred_type.expect("condition already typed");

        if matches!(self.types.get(ty), Type::Literal { kind: tc_types::LiteralKind::Bool, .. }) {
            return Ok(());
        }

        let location = self.exprs.get(condition).location;
        let Some(casted) = self.autocast_to_bool(condition) else {
            return Err(Diagnostic::error(
                ErrorKind::ShapeError,
                location,
                "condition must result in a boolean value",
            ));
        };
        if casted != condition {
            crate::slot::write_slot(Slot::StmtCondition(stmt_id), casted, &mut self.exprs, &mut self.decls, &mut self.stmts);
        }
        Ok(())
    }

    fn check_for_range(&mut self, range: crate::ids::ExprId) -> Result<(), Diagnostic> {
        if let ExprKind::Binary(binary) = &self.exprs.get(range).kind {
            if binary.op == BinaryOp::Range {
                return Ok(());
            }
        }
        let ty = self.exprs.get(range).inferred_type.expect("for-range already typed");
        if self.types.get(ty).is_array() {
            return Ok(());
        }
        let location = self.exprs.get(range).location;
        Err(Diagnostic::error(
            ErrorKind::ShapeError,
            location,
            "expected a range or an array in a 'for' statement",
        ))
    }

    fn check_return(
        &mut self,
        stmt_id: StmtId,
        value: Option<crate::ids::ExprId>,
        enclosing_procedure: crate::ids::DeclId,
    ) -> Result<(), Diagnostic> {
        let location = self.stmts.get(stmt_id).location;
        let proc_value = self
            .decls
            .get(enclosing_procedure)
            .my_value
            .expect("enclosing procedure has no my_value");
        let lambda_type_expr = match &self.exprs.get(proc_value).kind {
            ExprKind::Procedure(p) => p.lambda_type,
            _ => panic!("enclosing_procedure's my_value is not a Procedure expression"),
        };
        let return_type = match &self.exprs.get(lambda_type_expr).kind {
            ExprKind::TypeDefinition(t) => t.constructed_type,
            _ => None,
        }
        .expect("enclosing procedure's lambda type never resolved a constructed_type");

        match value {
            Some(_) => {
                self.check_that_types_match(Slot::StmtReturnValue(stmt_id), return_type)?;
            }
            None => {
                if !matches!(self.types.get(return_type), Type::Literal { kind: tc_types::LiteralKind::Void, .. }) {
                    return Err(Diagnostic::error(
                        ErrorKind::ShapeError,
                        location,
                        "missing return value for a non-void procedure",
                    ));
                }
            }
        }
        Ok(())
    }

    fn check_assignment(&mut self, stmt_id: StmtId, target: crate::ids::ExprId) -> Result<(), Diagnostic> {
        let location = self.exprs.get(target).location;

        if let ExprKind::Ident(ident) = &self.exprs.get(target).kind {
            let referent = ident.resolved_declaration.expect("assignment target ident already resolved");
            let flags = self.decls.get(referent).flags;
            if flags.contains(DeclFlags::IS_CONSTANT) {
                return Err(Diagnostic::error(ErrorKind::BadLvalue, location, "cannot assign to a constant"));
            }
            if flags.contains(DeclFlags::IS_FOR_LOOP_ITERATOR) {
                return Err(Diagnostic::error(ErrorKind::BadLvalue, location, "cannot assign to a for-loop iterator"));
            }
        } else if !is_lvalue(target, &self.exprs, &self.decls) {
            return Err(Diagnostic::error(ErrorKind::BadLvalue, location, "cannot assign to a non-lvalue"));
        }

        let target_type = self.exprs.get(target).inferred_type.expect("assignment target already typed");
        self.check_that_types_match(Slot::StmtAssignmentValue(stmt_id), target_type)?;
        Ok(())
    }
}
