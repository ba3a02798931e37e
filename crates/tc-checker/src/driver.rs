//! Declaration driver (C6): `run` drains one declaration's flattened work
//! list, dispatching each item to the expression checker (C4,
//! `dispatch.rs`) or the statement checker (C5, `statements.rs`), and
//! `finalize` applies the six post-queue rules in spec §4.3 once every
//! item is typed. Grounded on the teacher's dispatcher-struct idiom
//! (`tsz-checker/src/statements.rs`, `dispatch.rs`), adapted to this
//! crate's `impl<'w> Checker<'w>` convention rather than a trait of
//! callbacks — there is only ever one implementor here.

use tc_common::{Diagnostic, ErrorKind};
use tc_types::{Type, TypeId};

use crate::checker::Checker;
use crate::decl::DeclFlags;
use crate::expr::{Expr, ExprKind, LiteralValue, NumberData, NumberFlags, NumberValueBits, TypeInstantiationData};
use crate::ids::{DeclId, ExprId};
use crate::slot::{read_slot, write_slot, Slot, WorkItem};

/// Outcome of driving a declaration one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Every item drained and `finalize` ran.
    Done,
    /// An item parked; `typechecking_position` is left where it was so a
    /// later call resumes from the same item.
    NotDone,
}

impl<'w> Checker<'w> {
    /// `run(decl)` (spec §4.3). Flattens the declaration on first entry
    /// (`flattened` starts empty and `typechecking_position` at 0), then
    /// walks the work list from `typechecking_position`. Idempotent:
    /// calling this again on a `Done` declaration immediately re-finalizes
    /// against an already-populated `flattened[]` with a position at its
    /// end, which is a no-op loop followed by a no-op `finalize` (spec §8
    /// "Idempotence").
    pub fn run(&mut self, decl_id: DeclId) -> Result<DriveOutcome, Diagnostic> {
        if self.decls.get(decl_id).is_done() {
            return Ok(DriveOutcome::Done);
        }

        if self.decls.get(decl_id).flattened.is_empty() && self.decls.get(decl_id).typechecking_position == 0 {
            let flattened = crate::flatten::flatten_declaration(
                decl_id,
                &self.decls,
                &self.exprs,
                &self.blocks,
                &self.stmts,
            );
            self.decls.get_mut(decl_id).flattened = flattened;
        }

        loop {
            let position = self.decls.get(decl_id).typechecking_position;
            let len = self.decls.get(decl_id).flattened.len();
            if position >= len {
                break;
            }
            let item = self.decls.get(decl_id).flattened[position];

            match item {
                WorkItem::Expression(slot) => {
                    self.check_expression(slot, decl_id)?;
                    let Some(current) = read_slot(slot, &self.exprs, &self.decls, &self.stmts) else {
                        tracing::debug!(?decl_id, ?slot, "slot emptied mid-check");
                        return Ok(DriveOutcome::NotDone);
                    };
                    if self.exprs.get(current).inferred_type.is_none() {
                        tracing::debug!(?decl_id, position, "parked on expression item");
                        return Ok(DriveOutcome::NotDone);
                    }
                }
                WorkItem::Statement(stmt_id) => {
                    self.check_statement(stmt_id)?;
                    if !self.stmts.get(stmt_id).typechecked {
                        tracing::debug!(?decl_id, position, "parked on statement item");
                        return Ok(DriveOutcome::NotDone);
                    }
                }
            }

            self.decls.get_mut(decl_id).typechecking_position += 1;
        }

        self.finalize(decl_id)?;
        Ok(DriveOutcome::Done)
    }

    /// Finalization rules, spec §4.3, run exactly once per declaration
    /// right after its queue drains.
    fn finalize(&mut self, decl_id: DeclId) -> Result<(), Diagnostic> {
        let flags = self.decls.get(decl_id).flags;
        let location = self.decls.get(decl_id).location;

        if flags.contains(DeclFlags::IS_PROCEDURE) {
            let value = self.decls.get(decl_id).my_value.expect("IS_PROCEDURE declaration with no my_value");
            let proc = match &self.exprs.get(value).kind {
                ExprKind::Procedure(p) => *p,
                _ => panic!("IS_PROCEDURE declaration's my_value is not a Procedure expression"),
            };
            if let Some(foreign_name) = proc.foreign_library_name {
                let import_ident = match &self.exprs.get(foreign_name).kind {
                    ExprKind::Ident(ident) => ident.resolved_declaration,
                    _ => None,
                };
                let resolves_to_import = import_ident.is_some_and(|d| self.decls.get(d).my_import);
                if !resolves_to_import {
                    return Err(Diagnostic::error(
                        ErrorKind::UnresolvedName,
                        location,
                        "foreign procedure's library name does not resolve to an import",
                    ));
                }
            }
            let lambda_type = self
                .exprs
                .get(value)
                .inferred_type
                .expect("Procedure expression reached finalize without an inferred_type");
            self.decls.get_mut(decl_id).my_type_id = Some(lambda_type);
            self.decls.get_mut(decl_id).flags |= DeclFlags::HAS_BEEN_TYPECHECKED;
            return Ok(());
        }

        if self.decls.get(decl_id).my_import {
            self.decls.get_mut(decl_id).flags |= DeclFlags::HAS_BEEN_TYPECHECKED;
            return Ok(());
        }

        let my_type = self.decls.get(decl_id).my_type;
        let my_value = self.decls.get(decl_id).my_value;

        match (my_type, my_value) {
            (Some(type_expr), Some(value_expr)) => {
                let constructed = match &self.exprs.get(type_expr).kind {
                    ExprKind::TypeDefinition(t) => t.constructed_type,
                    _ => None,
                }
                .expect("declaration's my_type never resolved a constructed_type");

                if flags.contains(DeclFlags::IS_ENUM_VALUE) {
                    let underlying = match self.types.get(constructed) {
                        Type::Enum { underlying_int, .. } => *underlying_int,
                        _ => constructed,
                    };
                    self.check_number_expression(value_expr, Some(underlying))?;
                } else {
                    self.check_that_types_match(Slot::DeclValue(decl_id), constructed)?;
                }
                self.decls.get_mut(decl_id).my_type_id = Some(constructed);
            }
            (None, Some(value_expr)) => {
                if let ExprKind::Number(_) = &self.exprs.get(value_expr).kind {
                    if let ExprKind::Number(n) = &mut self.exprs.get_mut(value_expr).kind {
                        n.inferred_type_is_final = true;
                    }
                }
                let inferred = self.exprs.get(value_expr).inferred_type.expect(
                    "value-only declaration reached finalize with an untyped value",
                );
                self.decls.get_mut(decl_id).my_type_id = Some(inferred);
                self.decls.get_mut(decl_id).flags |= DeclFlags::TYPE_WAS_INFERRED_FROM_EXPRESSION;
            }
            (None, None) => {
                return Err(Diagnostic::error(
                    ErrorKind::ShapeError,
                    location,
                    "declaration has no type or value",
                ));
            }
            (Some(type_expr), None) => {
                let constructed = match &self.exprs.get(type_expr).kind {
                    ExprKind::TypeDefinition(t) => t.constructed_type,
                    _ => None,
                }
                .expect("declaration's my_type never resolved a constructed_type");

                if flags.contains(DeclFlags::IS_CONSTANT) {
                    return Err(Diagnostic::error(
                        ErrorKind::ShapeError,
                        location,
                        "constant declaration has no value",
                    ));
                }
                if matches!(self.types.get(constructed), Type::Literal { kind: tc_types::LiteralKind::Void, .. }) {
                    return Err(Diagnostic::error(
                        ErrorKind::ShapeError,
                        location,
                        "a declaration may not have type void",
                    ));
                }
                let default_value = self.default_for(constructed, location)?;
                self.decls.get_mut(decl_id).my_value = Some(default_value);
                self.decls.get_mut(decl_id).my_type_id = Some(constructed);
                self.decls.get_mut(decl_id).flags |= DeclFlags::VALUE_WAS_INFERRED_FROM_TYPE;
            }
        }

        self.decls.get_mut(decl_id).flags |= DeclFlags::HAS_BEEN_TYPECHECKED;
        Ok(())
    }

    /// `default_for` (spec §4.3): synthesizes the canonical zero value for
    /// `ty`, used both by declaration finalization (a type with no value)
    /// and by `Type_Instantiation` with zero arguments (C4). Enum is a
    /// spec §4.3 "Enum→unimplemented" construct (DESIGN.md decision #7),
    /// so it reports an `Unimplemented` diagnostic like every other
    /// unimplemented construct in this crate rather than aborting on input
    /// a caller can legitimately submit (`x : SomeEnum;`).
    pub fn default_for(&mut self, ty: TypeId, location: tc_common::Span) -> Result<ExprId, Diagnostic> {
        let id = match self.types.get(ty).clone() {
            Type::Number { .. } => self.exprs.alloc(Expr {
                kind: ExprKind::Number(NumberData {
                    value_bits: NumberValueBits::integer(0),
                    flags: NumberFlags::empty(),
                    inferred_type_is_final: true,
                }),
                location,
                inferred_type: Some(ty),
            }),
            Type::Literal { kind, .. } => {
                let value = match kind {
                    tc_types::LiteralKind::Bool => LiteralValue::Bool(false),
                    tc_types::LiteralKind::String => LiteralValue::Str(String::new()),
                    tc_types::LiteralKind::Null | tc_types::LiteralKind::Void => LiteralValue::Null,
                    tc_types::LiteralKind::Type => {
                        panic!("a declaration of type Type has no meaningful default value")
                    }
                };
                self.exprs.alloc(Expr { kind: ExprKind::Literal(value), location, inferred_type: Some(ty) })
            }
            Type::Pointer { .. } | Type::Lambda { .. } => {
                self.exprs.alloc(Expr { kind: ExprKind::Literal(LiteralValue::Null), location, inferred_type: Some(ty) })
            }
            Type::Struct { block, field_types } => {
                let field_decls = self.blocks.get(block).declarations.clone();
                let mut args = Vec::with_capacity(field_types.len());
                for field_decl in field_decls {
                    let value = match self.decls.get(field_decl).my_value {
                        Some(value) => value,
                        None => {
                            let field_type = crate::decl::annotation_type_id(self.decls.get(field_decl), &self.exprs)
                                .or(self.decls.get(field_decl).my_type_id)
                                .expect("struct field with neither my_value nor a resolved type");
                            self.default_for(field_type, location)?
                        }
                    };
                    args.push(value);
                }
                let type_definition = self.exprs.alloc(Expr {
                    kind: ExprKind::TypeDefinition(crate::expr::TypeDefinitionData {
                        kind: crate::expr::TypeDefKind::Struct { block },
                        constructed_type: Some(ty),
                    }),
                    location,
                    inferred_type: Some(TypeId::TYPE),
                });
                self.exprs.alloc(Expr {
                    kind: ExprKind::TypeInstantiation(TypeInstantiationData { type_definition, arguments: args }),
                    location,
                    inferred_type: Some(ty),
                })
            }
            Type::Array { kind, element, .. } => {
                let type_definition = self.exprs.alloc(Expr {
                    kind: ExprKind::TypeDefinition(crate::expr::TypeDefinitionData {
                        kind: crate::expr::TypeDefKind::Builtin(element),
                        constructed_type: Some(element),
                    }),
                    location,
                    inferred_type: Some(TypeId::TYPE),
                });
                let array_typedef = self.exprs.alloc(Expr {
                    kind: ExprKind::TypeDefinition(crate::expr::TypeDefinitionData {
                        kind: crate::expr::TypeDefKind::Array { kind, length: None, element: type_definition },
                        constructed_type: Some(ty),
                    }),
                    location,
                    inferred_type: Some(TypeId::TYPE),
                });
                self.exprs.alloc(Expr {
                    kind: ExprKind::TypeInstantiation(TypeInstantiationData {
                        type_definition: array_typedef,
                        arguments: Vec::new(),
                    }),
                    location,
                    inferred_type: Some(ty),
                })
            }
            Type::Enum { .. } => {
                return Err(Diagnostic::error(
                    ErrorKind::Unimplemented,
                    location,
                    "default-value synthesis for enum types is not implemented",
                ))
            }
            Type::Ident { .. } => panic!("default_for called on an unresolved Ident type"),
            Type::StructCall => panic!("default value synthesis for StructCall is unimplemented"),
        };
        Ok(id)
    }
}
