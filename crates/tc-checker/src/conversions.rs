use tc_common::{Diagnostic, ErrorKind};
use tc_types::{ArrayKind, LiteralKind, Type, TypeId};

use crate::checker::Checker;
use crate::expr::{
    BinaryData, BinaryOp, Expr, ExprKind, LiteralValue, NumberData, NumberFlags, NumberValue,
    NumberValueBits, SelectorData, TypeDefKind, TypeDefinitionData, TypeInstantiationData,
    UnaryData, UnaryOp,
};
use crate::ids::ExprId;
use crate::layout::{ARRAY_COUNT_FIELD, STRING_COUNT_FIELD};
use crate::slot::{read_slot, write_slot, Slot};

impl<'w> Checker<'w> {
    /// `check_that_types_match` (C7): reconciles the expression sitting in
    /// `slot` against `expected`, substituting the slot in place when one
    /// of the six coercions applies. The slot is re-read after any
    /// substitution so callers always see the reconciled node.
    pub fn check_that_types_match(&mut self, slot: Slot, expected: TypeId) -> Result<(), Diagnostic> {
        let current = read_slot(slot, &self.exprs, &self.decls, &self.stmts)
            .expect("check_that_types_match called on an empty slot");
        let current_type = self.exprs.get(current).inferred_type.expect(
            "check_that_types_match called before the expression in the slot was typechecked",
        );

        if self.types.types_are_equal(current_type, expected) {
            return Ok(());
        }

        // Case 2: un-finalized Number literal — re-run the Number check
        // with the expected type as its supplied type.
        if let ExprKind::Number(number) = &self.exprs.get(current).kind {
            if !number.inferred_type_is_final {
                return self.check_number_expression(current, Some(expected));
            }
        }

        // Case 3: string literal coercions.
        if let ExprKind::Literal(LiteralValue::Str(text)) = self.exprs.get(current).kind.clone() {
            if let Type::Number { .. } = self.types.get(expected) {
                if text.chars().count() == 1 {
                    let code = text.chars().next().unwrap() as i128;
                    let signed = matches!(self.types.get(expected), Type::Number { signed: true, .. });
                    let mut flags = NumberFlags::empty();
                    if signed {
                        flags |= NumberFlags::SIGNED;
                    }
                    let location = self.exprs.get(current).location;
                    let new = self.exprs.alloc(Expr {
                        kind: ExprKind::Number(NumberData {
                            value_bits: NumberValueBits::integer(code),
                            flags,
                            inferred_type_is_final: true,
                        }),
                        location,
                        inferred_type: Some(expected),
                    });
                    write_slot(slot, new, &mut self.exprs, &mut self.decls, &mut self.stmts);
                    return Ok(());
                }
            }
            if let Type::Pointer { pointee } = self.types.get(expected) {
                if self.types.types_are_equal(*pointee, TypeId::U8) {
                    self.exprs.get_mut(current).inferred_type = Some(expected);
                    return Ok(());
                }
            }
        }

        // Case 4: fixed-array-to-slice promotion.
        if let Type::Array { kind: ArrayKind::Fixed, length: Some(length), element: source_element } =
            *self.types.get(current_type)
        {
            if let Type::Array { kind: ArrayKind::Slice, element: expected_element, .. } =
                *self.types.get(expected)
            {
                if self.types.types_are_equal(source_element, expected_element) {
                    let new = self.synthesize_slice_promotion(current, source_element, length, expected);
                    write_slot(slot, new, &mut self.exprs, &mut self.decls, &mut self.stmts);
                    return Ok(());
                }
            }
        }

        let location = self.exprs.get(current).location;
        Err(Diagnostic::error(
            ErrorKind::TypeMismatch,
            location,
            "expression type does not match the expected type",
        ))
    }

    /// Builds `{ *(array[0]), length }` as a `Type_Instantiation` of the
    /// slice type, matching `typecheck.c`'s `check_that_types_match`
    /// exactly (see `SPEC_FULL.md` §8) rather than a generic "take the
    /// array's address" operation.
    fn synthesize_slice_promotion(
        &mut self,
        array_expr: ExprId,
        element: TypeId,
        length: u64,
        slice_type: TypeId,
    ) -> ExprId {
        let location = self.exprs.get(array_expr).location;

        let zero_index = self.exprs.alloc(Expr {
            kind: ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(0),
                flags: NumberFlags::SIGNED,
                inferred_type_is_final: true,
            }),
            location,
            inferred_type: Some(TypeId::INT),
        });
        let subscript = self.exprs.alloc(Expr {
            kind: ExprKind::Binary(BinaryData { op: BinaryOp::Subscript, left: array_expr, right: zero_index }),
            location,
            inferred_type: Some(element),
        });
        let pointer_type = self.types.alloc(Type::Pointer { pointee: element });
        let address_of = self.exprs.alloc(Expr {
            kind: ExprKind::Unary(UnaryData { op: UnaryOp::AddressOf, sub: subscript }),
            location,
            inferred_type: Some(pointer_type),
        });
        let length_literal = self.exprs.alloc(Expr {
            kind: ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(length as i128),
                flags: NumberFlags::empty(),
                inferred_type_is_final: true,
            }),
            location,
            inferred_type: Some(TypeId::INT),
        });
        let element_typedef = self.exprs.alloc(Expr {
            kind: ExprKind::TypeDefinition(TypeDefinitionData {
                kind: TypeDefKind::Builtin(element),
                constructed_type: Some(element),
            }),
            location,
            inferred_type: Some(TypeId::TYPE),
        });
        let slice_typedef = self.exprs.alloc(Expr {
            kind: ExprKind::TypeDefinition(TypeDefinitionData {
                kind: TypeDefKind::Array { kind: ArrayKind::Slice, length: None, element: element_typedef },
                constructed_type: Some(slice_type),
            }),
            location,
            inferred_type: Some(TypeId::TYPE),
        });
        self.exprs.alloc(Expr {
            kind: ExprKind::TypeInstantiation(TypeInstantiationData {
                type_definition: slice_typedef,
                arguments: vec![address_of, length_literal],
            }),
            location,
            inferred_type: Some(slice_type),
        })
    }

    /// `autocast_to_bool` (C7). Returns the (possibly substituted)
    /// expression id the caller should use in boolean context, or `None`
    /// when the expression's type has no boolean conversion at all
    /// (Struct/Enum/Lambda/Type/void) — callers turn that into a
    /// `ShapeError` with context-appropriate wording.
    pub fn autocast_to_bool(&mut self, expr: ExprId) -> Option<ExprId> {
        let ty = self.exprs.get(expr).inferred_type.expect("autocast_to_bool on an unchecked expression");
        let location = self.exprs.get(expr).location;

        if matches!(self.types.get(ty), Type::Literal { kind: LiteralKind::Bool, .. }) {
            return Some(expr);
        }

        match self.exprs.get(expr).kind.clone() {
            ExprKind::Literal(LiteralValue::Null) => {
                let new = self.exprs.alloc(Expr {
                    kind: ExprKind::Literal(LiteralValue::Bool(false)),
                    location,
                    inferred_type: Some(TypeId::BOOL),
                });
                return Some(new);
            }
            _ => {}
        }

        match self.types.get(ty).clone() {
            Type::Literal { kind: LiteralKind::String, .. } => {
                Some(self.synthesize_count_ne_zero(expr, STRING_COUNT_FIELD, location))
            }
            Type::Array { kind: ArrayKind::Fixed, length, .. } => {
                let is_nonzero = length.unwrap_or(0) != 0;
                let new = self.exprs.alloc(Expr {
                    kind: ExprKind::Literal(LiteralValue::Bool(is_nonzero)),
                    location,
                    inferred_type: Some(TypeId::BOOL),
                });
                Some(new)
            }
            Type::Array { kind: ArrayKind::Slice | ArrayKind::Dynamic, .. } => {
                Some(self.synthesize_count_ne_zero(expr, ARRAY_COUNT_FIELD, location))
            }
            Type::Number { .. } => {
                let zero = self.exprs.alloc(Expr {
                    kind: ExprKind::Number(NumberData {
                        value_bits: NumberValueBits::integer(0),
                        flags: NumberFlags::empty(),
                        inferred_type_is_final: true,
                    }),
                    location,
                    inferred_type: Some(ty),
                });
                let new = self.exprs.alloc(Expr {
                    kind: ExprKind::Binary(BinaryData { op: BinaryOp::Ne, left: expr, right: zero }),
                    location,
                    inferred_type: Some(TypeId::BOOL),
                });
                Some(new)
            }
            Type::Pointer { .. } => {
                let null = self.exprs.alloc(Expr {
                    kind: ExprKind::Literal(LiteralValue::Null),
                    location,
                    inferred_type: Some(ty),
                });
                let new = self.exprs.alloc(Expr {
                    kind: ExprKind::Binary(BinaryData { op: BinaryOp::Ne, left: expr, right: null }),
                    location,
                    inferred_type: Some(TypeId::BOOL),
                });
                Some(new)
            }
            _ => None,
        }
    }

    fn synthesize_count_ne_zero(&mut self, expr: ExprId, field_index: u32, location: tc_common::Span) -> ExprId {
        let selector = self.exprs.alloc(Expr {
            kind: ExprKind::Selector(SelectorData {
                namespace_expression: expr,
                ident: "count".to_string(),
                resolved_declaration: None,
                struct_field_index: Some(field_index),
            }),
            location,
            inferred_type: Some(TypeId::INT),
        });
        let zero = self.exprs.alloc(Expr {
            kind: ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(0),
                flags: NumberFlags::SIGNED,
                inferred_type_is_final: true,
            }),
            location,
            inferred_type: Some(TypeId::INT),
        });
        self.exprs.alloc(Expr {
            kind: ExprKind::Binary(BinaryData { op: BinaryOp::Ne, left: selector, right: zero }),
            location,
            inferred_type: Some(TypeId::BOOL),
        })
    }
}
