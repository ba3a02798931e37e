//! Cross-module integration scenarios, one per concrete example in spec §8.
//! Unlike the per-file unit tests colocated with `number.rs`/`constants.rs`/
//! `lvalue.rs`/`arena.rs`, these drive the whole pipeline — flatten, dispatch,
//! finalize — the way `tsz-checker/tests` exercises the teacher's checker
//! end-to-end rather than one function at a time.
//!
//! There is no parser in this crate (spec §1 lists it as an external
//! collaborator), so every scenario builds its declarations and expressions
//! directly through the arenas, pre-resolving `Ident`/`Selector` references
//! the way a real scope-construction pass already would have by the time
//! the checker sees them.

use tc_checker::decl::{Decl, DeclFlags};
use tc_checker::driver::DriveOutcome;
use tc_checker::expr::{
    BinaryData, BinaryOp, Expr, ExprKind, IdentData, LiteralValue, NumberData, NumberFlags,
    NumberValue, NumberValueBits, TypeDefKind, TypeDefinitionData, TypeInstantiationData,
};
use tc_checker::ids::{BlockId, DeclId, ExprId};
use tc_checker::{Checker, CheckerOptions, Workspace};
use tc_common::{ErrorKind, SourceExcerpt, Span};
use tc_types::{ArrayKind, TypeId};

/// Every scenario resolves identifiers by construction (the `Ident`'s
/// `resolved_declaration` is set up front), so the workspace never needs to
/// answer a real lookup.
struct NullWorkspace;

impl Workspace for NullWorkspace {
    fn find_declaration_from_identifier(&self, _ident: ExprId) -> Option<DeclId> {
        None
    }
    fn find_declaration_in_block(&self, _block: BlockId, _name: &str) -> Option<DeclId> {
        None
    }
    fn source_excerpt(&self, _span: Span) -> SourceExcerpt {
        unimplemented!("no scenario here reports a diagnostic that needs rendering")
    }
}

fn checker() -> Checker<'static> {
    Checker::new(Box::leak(Box::new(NullWorkspace)), CheckerOptions::default())
}

fn number(checker: &mut Checker, value: i128, flags: NumberFlags) -> ExprId {
    checker.exprs.alloc(Expr::new(
        ExprKind::Number(NumberData {
            value_bits: NumberValueBits::integer(value),
            flags,
            inferred_type_is_final: false,
        }),
        Span::dummy(),
    ))
}

fn builtin_typedef(checker: &mut Checker, ty: TypeId) -> ExprId {
    checker.exprs.alloc(Expr::new(
        ExprKind::TypeDefinition(TypeDefinitionData { kind: TypeDefKind::Builtin(ty), constructed_type: None }),
        Span::dummy(),
    ))
}

fn run_to_completion(checker: &mut Checker, decl: DeclId) {
    loop {
        match checker.run(decl).expect("scenario expects no fatal diagnostic here") {
            DriveOutcome::Done => return,
            DriveOutcome::NotDone => panic!("declaration parked with nothing left to unblock it"),
        }
    }
}

/// `x :: 3 + 4;` → `x.my_value` folds to `Number { as.integer == 7 }`,
/// `inferred_type == int`, `x.my_type == int`.
#[test]
fn scenario_constant_folds_sum_of_two_literals() {
    let mut checker = checker();
    let left = number(&mut checker, 3, NumberFlags::empty());
    let right = number(&mut checker, 4, NumberFlags::empty());
    let sum = checker.exprs.alloc(Expr::new(
        ExprKind::Binary(BinaryData { op: BinaryOp::Add, left, right }),
        Span::dummy(),
    ));

    let mut decl = Decl::new(Span::dummy());
    decl.flags |= DeclFlags::IS_CONSTANT;
    decl.my_value = Some(sum);
    let decl_id = checker.decls.alloc(decl);

    run_to_completion(&mut checker, decl_id);

    assert_eq!(checker.decls.get(decl_id).my_type_id, Some(TypeId::INT));
    let folded = checker.decls.get(decl_id).my_value.expect("value still present");
    match &checker.exprs.get(folded).kind {
        ExprKind::Number(n) => assert_eq!(n.value_bits.as_value(), NumberValue::Integer(7)),
        other => panic!("expected a folded Number, got {other:?}"),
    }
    assert_eq!(checker.exprs.get(folded).inferred_type, Some(TypeId::INT));
}

/// `y : u8 = 300;` → fatal range error naming `u8`'s max.
#[test]
fn scenario_integer_literal_out_of_range_is_fatal() {
    let mut checker = checker();
    let value = number(&mut checker, 300, NumberFlags::empty());
    let type_expr = builtin_typedef(&mut checker, TypeId::U8);

    let mut decl = Decl::new(Span::dummy());
    decl.my_type = Some(type_expr);
    decl.my_value = Some(value);
    let decl_id = checker.decls.alloc(decl);

    let err = loop {
        match checker.run(decl_id) {
            Ok(DriveOutcome::NotDone) => continue,
            Ok(DriveOutcome::Done) => panic!("expected a fatal range error, got success"),
            Err(diagnostic) => break diagnostic,
        }
    };
    assert_eq!(err.kind, Some(ErrorKind::RangeError));
    assert!(err.message.contains("255"), "message should quote u8's max: {}", err.message);
}

/// `s :: "A"; c : int = s;` → `c.my_value` becomes `Number { as.integer == 65 }`
/// typed `int`.
#[test]
fn scenario_single_char_string_constant_coerces_to_char_code() {
    let mut checker = checker();

    let string_value = checker.exprs.alloc(Expr::new(ExprKind::Literal(LiteralValue::Str("A".to_string())), Span::dummy()));
    let mut s_decl = Decl::new(Span::dummy());
    s_decl.flags |= DeclFlags::IS_CONSTANT;
    s_decl.my_value = Some(string_value);
    let s_id = checker.decls.alloc(s_decl);
    run_to_completion(&mut checker, s_id);

    let ident = checker.exprs.alloc(Expr::new(
        ExprKind::Ident(IdentData { name: "s".to_string(), enclosing_block: BlockId(0), resolved_declaration: Some(s_id) }),
        Span::dummy(),
    ));
    let type_expr = builtin_typedef(&mut checker, TypeId::INT);
    let mut c_decl = Decl::new(Span::dummy());
    c_decl.my_type = Some(type_expr);
    c_decl.my_value = Some(ident);
    let c_id = checker.decls.alloc(c_decl);
    run_to_completion(&mut checker, c_id);

    assert_eq!(checker.decls.get(c_id).my_type_id, Some(TypeId::INT));
    let value = checker.decls.get(c_id).my_value.expect("value still present");
    match &checker.exprs.get(value).kind {
        ExprKind::Number(n) => assert_eq!(n.value_bits.as_value(), NumberValue::Integer('A' as i128)),
        other => panic!("expected a char-code Number, got {other:?}"),
    }
    assert_eq!(checker.exprs.get(value).inferred_type, Some(TypeId::INT));
}

/// `a : [3] int = .{1, 2, 3}; b : [] int = a;` → `b.my_value` becomes a slice
/// instantiation `{ *a[0], 3 }` typed as a slice of `int`.
#[test]
fn scenario_fixed_array_promotes_to_slice_on_assignment() {
    let mut checker = checker();

    let element_typedef = builtin_typedef(&mut checker, TypeId::INT);
    let length = number(&mut checker, 3, NumberFlags::empty());
    let array_typedef = checker.exprs.alloc(Expr::new(
        ExprKind::TypeDefinition(TypeDefinitionData {
            kind: TypeDefKind::Array { kind: ArrayKind::Fixed, length: Some(length), element: element_typedef },
            constructed_type: None,
        }),
        Span::dummy(),
    ));
    let one = number(&mut checker, 1, NumberFlags::empty());
    let two = number(&mut checker, 2, NumberFlags::empty());
    let three = number(&mut checker, 3, NumberFlags::empty());
    let instantiation = checker.exprs.alloc(Expr::new(
        ExprKind::TypeInstantiation(TypeInstantiationData { type_definition: array_typedef, arguments: vec![one, two, three] }),
        Span::dummy(),
    ));

    let mut a_decl = Decl::new(Span::dummy());
    a_decl.my_type = Some(array_typedef);
    a_decl.my_value = Some(instantiation);
    let a_id = checker.decls.alloc(a_decl);
    run_to_completion(&mut checker, a_id);

    let b_element_typedef = builtin_typedef(&mut checker, TypeId::INT);
    let slice_typedef = checker.exprs.alloc(Expr::new(
        ExprKind::TypeDefinition(TypeDefinitionData {
            kind: TypeDefKind::Array { kind: ArrayKind::Slice, length: None, element: b_element_typedef },
            constructed_type: None,
        }),
        Span::dummy(),
    ));
    let ident = checker.exprs.alloc(Expr::new(
        ExprKind::Ident(IdentData { name: "a".to_string(), enclosing_block: BlockId(0), resolved_declaration: Some(a_id) }),
        Span::dummy(),
    ));
    let mut b_decl = Decl::new(Span::dummy());
    b_decl.my_type = Some(slice_typedef);
    b_decl.my_value = Some(ident);
    let b_id = checker.decls.alloc(b_decl);
    run_to_completion(&mut checker, b_id);

    let value = checker.decls.get(b_id).my_value.expect("value still present");
    match &checker.exprs.get(value).kind {
        ExprKind::TypeInstantiation(inst) => {
            assert_eq!(inst.arguments.len(), 2, "slice instantiation is {{ *a[0], length }}");
        }
        other => panic!("expected the slice promotion's synthesized Type_Instantiation, got {other:?}"),
    }
    let b_type = checker.decls.get(b_id).my_type_id.expect("b's type resolved");
    match checker.types.get(b_type) {
        tc_types::Type::Array { kind: ArrayKind::Slice, element, .. } => {
            assert!(checker.types.types_are_equal(*element, TypeId::INT));
        }
        other => panic!("expected a Slice type, got {other:?}"),
    }
}

/// `A :: B; B :: 1;` → both succeed regardless of declaration order; `A`
/// ends up substituted to `Number 1` typed `int`.
#[test]
fn scenario_forward_reference_resolves_once_the_referent_completes() {
    let mut checker = checker();

    let b_value = number(&mut checker, 1, NumberFlags::empty());
    let mut b_decl = Decl::new(Span::dummy());
    b_decl.flags |= DeclFlags::IS_CONSTANT;
    b_decl.my_value = Some(b_value);
    let b_id = checker.decls.alloc(b_decl);

    let ident_to_b = checker.exprs.alloc(Expr::new(
        ExprKind::Ident(IdentData { name: "B".to_string(), enclosing_block: BlockId(0), resolved_declaration: Some(b_id) }),
        Span::dummy(),
    ));
    let mut a_decl = Decl::new(Span::dummy());
    a_decl.flags |= DeclFlags::IS_CONSTANT;
    a_decl.my_value = Some(ident_to_b);
    let a_id = checker.decls.alloc(a_decl);

    // Drive A first: it must park on B, which hasn't even started yet.
    assert_eq!(checker.run(a_id).unwrap(), DriveOutcome::NotDone);
    run_to_completion(&mut checker, b_id);
    run_to_completion(&mut checker, a_id);

    assert_eq!(checker.decls.get(a_id).my_type_id, Some(TypeId::INT));
    let value = checker.decls.get(a_id).my_value.expect("value still present");
    match &checker.exprs.get(value).kind {
        ExprKind::Number(n) => assert_eq!(n.value_bits.as_value(), NumberValue::Integer(1)),
        other => panic!("expected Number 1, got {other:?}"),
    }
}

/// `C :: C + 1;` → fatal "Circular dependency detected: 'C'".
#[test]
fn scenario_self_referential_constant_is_a_circular_dependency() {
    let mut checker = checker();
    let c_id = checker.decls.alloc(Decl::new(Span::dummy()));

    let self_ref = checker.exprs.alloc(Expr::new(
        ExprKind::Ident(IdentData { name: "C".to_string(), enclosing_block: BlockId(0), resolved_declaration: Some(c_id) }),
        Span::dummy(),
    ));
    let one = number(&mut checker, 1, NumberFlags::empty());
    let sum = checker.exprs.alloc(Expr::new(
        ExprKind::Binary(BinaryData { op: BinaryOp::Add, left: self_ref, right: one }),
        Span::dummy(),
    ));
    let mut c_decl = checker.decls.get(c_id).clone();
    c_decl.flags |= DeclFlags::IS_CONSTANT;
    c_decl.my_value = Some(sum);
    *checker.decls.get_mut(c_id) = c_decl;

    let err = checker.run(c_id).expect_err("a self-referential constant must be fatal");
    assert_eq!(err.kind, Some(ErrorKind::CircularDependency));
    assert!(err.message.contains('C'));
}

/// Idempotence (spec §8): re-running `run` on an already-`Done` declaration
/// is a no-op — the same `DriveOutcome::Done` with no change to its value.
#[test]
fn scenario_rerunning_a_completed_declaration_is_a_no_op() {
    let mut checker = checker();
    let left = number(&mut checker, 10, NumberFlags::empty());
    let right = number(&mut checker, 5, NumberFlags::empty());
    let difference = checker.exprs.alloc(Expr::new(
        ExprKind::Binary(BinaryData { op: BinaryOp::Sub, left, right }),
        Span::dummy(),
    ));
    let mut decl = Decl::new(Span::dummy());
    decl.flags |= DeclFlags::IS_CONSTANT;
    decl.my_value = Some(difference);
    let decl_id = checker.decls.alloc(decl);

    run_to_completion(&mut checker, decl_id);
    let value_after_first_run = checker.decls.get(decl_id).my_value;

    assert_eq!(checker.run(decl_id).unwrap(), DriveOutcome::Done);
    assert_eq!(checker.decls.get(decl_id).my_value, value_after_first_run);
}
