use tc_common::{Diagnostic, ErrorKind};
use tc_types::{Type, TypeId};

use crate::checker::Checker;
use crate::expr::{ExprKind, NumberFlags};
use crate::ids::ExprId;

/// The name a `RangeError`/`TypeMismatch` diagnostic quotes for a builtin
/// numeric type. Anything allocated by the checker itself (no `Number`
/// expression ever targets it before it exists) falls back to a generic
/// label rather than panicking a diagnostic path over a missing name.
fn canonical_name(id: TypeId) -> &'static str {
    match id {
        TypeId::INT => "int",
        TypeId::U8 => "u8",
        TypeId::U16 => "u16",
        TypeId::U32 => "u32",
        TypeId::U64 => "u64",
        TypeId::S8 => "s8",
        TypeId::S16 => "s16",
        TypeId::S32 => "s32",
        TypeId::S64 => "s64",
        TypeId::FLOAT => "float",
        TypeId::FLOAT64 => "float64",
        _ => "this numeric type",
    }
}

impl<'w> Checker<'w> {
    /// `check_number_expression` (C4 "Number" contract, spec §4.4). Called
    /// both as the first-class check for a `Number` expression reached by
    /// the flattener and, re-entrantly, from `check_that_types_match` (C7
    /// case 2) whenever an un-finalized literal meets a type it must now
    /// fit. Re-entry is safe: nothing here reads `inferred_type` on the way
    /// in, only `flags`/`value_bits`, so running it twice with two
    /// different `supplied_type`s (once during flatten, once during
    /// reconciliation) is exactly the idempotence the driver requires.
    pub fn check_number_expression(
        &mut self,
        expr: ExprId,
        supplied_type: Option<TypeId>,
    ) -> Result<(), Diagnostic> {
        let location = self.exprs.get(expr).location;
        let number = match &self.exprs.get(expr).kind {
            ExprKind::Number(n) => *n,
            _ => panic!("check_number_expression called on a non-Number expression"),
        };

        let Some(supplied_type) = supplied_type else {
            let inferred = if number.flags.contains(NumberFlags::FLOAT64) {
                TypeId::FLOAT64
            } else if number.flags.contains(NumberFlags::FLOAT) {
                TypeId::FLOAT
            } else {
                TypeId::INT
            };
            self.exprs.get_mut(expr).inferred_type = Some(inferred);
            return Ok(());
        };

        let Type::Number { float: target_is_float, float64: target_is_float64, low, high, .. } =
            *self.types.get(supplied_type)
        else {
            return Err(Diagnostic::error(
                ErrorKind::TypeMismatch,
                location,
                "numeric literal cannot be used where a non-numeric type is expected",
            ));
        };

        if number.flags.contains(NumberFlags::FLOAT) {
            if !target_is_float {
                return Err(Diagnostic::error(
                    ErrorKind::TypeMismatch,
                    location,
                    format!(
                        "floating-point literal cannot be assigned to '{}'",
                        canonical_name(supplied_type)
                    ),
                ));
            }
            if number.flags.contains(NumberFlags::FLOAT64) && !target_is_float64 {
                return Err(Diagnostic::error(
                    ErrorKind::TypeMismatch,
                    location,
                    format!(
                        "float64 literal would lose precision assigned to '{}'",
                        canonical_name(supplied_type)
                    ),
                ));
            }
            self.exprs.get_mut(expr).inferred_type = Some(supplied_type);
            return Ok(());
        }

        if target_is_float {
            self.exprs.get_mut(expr).inferred_type = Some(supplied_type);
            return Ok(());
        }

        let value = number.value_bits.as_value().as_integer().expect("non-float Number carries an integer value");
        if value < low {
            return Err(Diagnostic::error(
                ErrorKind::RangeError,
                location,
                format!(
                    "numeric constant too small for type (min for {} is {low})",
                    canonical_name(supplied_type)
                ),
            ));
        }
        if value > high {
            return Err(Diagnostic::error(
                ErrorKind::RangeError,
                location,
                format!(
                    "numeric constant too big for type (max for {} is {high})",
                    canonical_name(supplied_type)
                ),
            ));
        }

        self.exprs.get_mut(expr).inferred_type = Some(supplied_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expr, NumberData, NumberValueBits};
    use tc_common::Span;
    use crate::workspace::Workspace;
    use tc_common::SourceExcerpt;
    use crate::ids::{BlockId, DeclId};
    use crate::options::CheckerOptions;

    struct NullWorkspace;
    impl Workspace for NullWorkspace {
        fn find_declaration_from_identifier(&self, _ident: ExprId) -> Option<DeclId> {
            None
        }
        fn find_declaration_in_block(&self, _block: BlockId, _name: &str) -> Option<DeclId> {
            None
        }
        fn source_excerpt(&self, _span: Span) -> SourceExcerpt {
            unimplemented!()
        }
    }

    fn checker() -> Checker<'static> {
        Checker::new(Box::leak(Box::new(NullWorkspace)), CheckerOptions::default())
    }

    #[test]
    fn infers_int_with_no_supplied_type() {
        let mut checker = checker();
        let id = checker.exprs.alloc(Expr::new(
            ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(5),
                flags: NumberFlags::empty(),
                inferred_type_is_final: false,
            }),
            Span::dummy(),
        ));
        checker.check_number_expression(id, None).unwrap();
        assert_eq!(checker.exprs.get(id).inferred_type, Some(TypeId::INT));
    }

    #[test]
    fn rejects_value_above_range() {
        let mut checker = checker();
        let id = checker.exprs.alloc(Expr::new(
            ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(300),
                flags: NumberFlags::empty(),
                inferred_type_is_final: false,
            }),
            Span::dummy(),
        ));
        let err = checker.check_number_expression(id, Some(TypeId::U8)).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::RangeError));
    }

    #[test]
    fn accepts_integer_literal_into_float_type() {
        let mut checker = checker();
        let id = checker.exprs.alloc(Expr::new(
            ExprKind::Number(NumberData {
                value_bits: NumberValueBits::integer(3),
                flags: NumberFlags::empty(),
                inferred_type_is_final: false,
            }),
            Span::dummy(),
        ));
        checker.check_number_expression(id, Some(TypeId::FLOAT)).unwrap();
        assert_eq!(checker.exprs.get(id).inferred_type, Some(TypeId::FLOAT));
    }

    #[test]
    fn rejects_float_literal_into_integer_type() {
        let mut checker = checker();
        let id = checker.exprs.alloc(Expr::new(
            ExprKind::Number(NumberData {
                value_bits: NumberValueBits::real(1.5),
                flags: NumberFlags::FLOAT | NumberFlags::SIGNED,
                inferred_type_is_final: false,
            }),
            Span::dummy(),
        ));
        let err = checker.check_number_expression(id, Some(TypeId::INT)).unwrap_err();
        assert_eq!(err.kind, Some(ErrorKind::TypeMismatch));
    }
}
