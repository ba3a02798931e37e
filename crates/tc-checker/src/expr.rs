use bitflags::bitflags;
use tc_common::Span;
use tc_types::{ArrayKind, TypeId};

use crate::ids::{BlockId, DeclId, ExprId};

bitflags! {
    /// Flags carried by a `Number` expression. `SIGNED` records the
    /// lexical form (a leading `-` or a signed target type already
    /// reconciled), not the final type — the final signedness is whatever
    /// `inferred_type` says once set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NumberFlags: u8 {
        const FLOAT   = 0b001;
        const FLOAT64 = 0b010;
        const SIGNED  = 0b100;
    }
}

/// The literal value carried by a `Number` expression, before or after a
/// target type has fixed its interpretation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Integer(i128),
    Real(f64),
}

impl NumberValue {
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            NumberValue::Integer(v) => Some(*v),
            NumberValue::Real(_) => None,
        }
    }

    pub fn as_real(&self) -> f64 {
        match self {
            NumberValue::Integer(v) => *v as f64,
            NumberValue::Real(v) => *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberData {
    pub value_bits: NumberValueBits,
    pub flags: NumberFlags,
    /// Once true, `inferred_type` is permanently fixed and a later
    /// `check_that_types_match` may no longer re-run the Number check in
    /// place (spec §4.7 case 2 only applies while this is false).
    pub inferred_type_is_final: bool,
}

/// `NumberValue` without the `f64`'s missing `Eq`, so `NumberData` can
/// derive it for test assertions. Real values compare by bit pattern.
#[derive(Debug, Clone, Copy)]
pub enum NumberValueBits {
    Integer(i128),
    Real(f64),
}

impl PartialEq for NumberValueBits {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberValueBits::Integer(a), NumberValueBits::Integer(b)) => a == b,
            (NumberValueBits::Real(a), NumberValueBits::Real(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}
impl Eq for NumberValueBits {}

impl NumberValueBits {
    pub fn as_value(&self) -> NumberValue {
        match self {
            NumberValueBits::Integer(v) => NumberValue::Integer(*v),
            NumberValueBits::Real(v) => NumberValue::Real(*v),
        }
    }

    pub fn integer(v: i128) -> Self {
        NumberValueBits::Integer(v)
    }

    pub fn real(v: f64) -> Self {
        NumberValueBits::Real(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Bool(bool),
    Str(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    BitwiseNot,
    AddressOf,
    Dereference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Subscript,
    Range,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_shift_or_bitwise(&self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnaryData {
    pub op: UnaryOp,
    pub sub: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryData {
    pub op: BinaryOp,
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentData {
    pub name: String,
    pub enclosing_block: BlockId,
    pub resolved_declaration: Option<DeclId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureData {
    pub lambda_type: ExprId,
    pub body_block: Option<BlockId>,
    pub foreign_library_name: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCallData {
    pub procedure: ExprId,
    pub arguments: Vec<ExprId>,
}

/// The substructure of an expression whose runtime value is a `Type`
/// (spec §3's `Type_Definition`). `Builtin` is what the parser emits for a
/// bare builtin name (`int`, `bool`, ...) — there is nothing further to
/// typecheck or flatten for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefKind {
    Builtin(TypeId),
    Pointer { pointee: ExprId },
    Array { kind: ArrayKind, length: Option<ExprId>, element: ExprId },
    Struct { block: BlockId },
    Enum { block: BlockId, underlying: ExprId },
    Lambda { argument_types: Vec<ExprId>, return_type: ExprId, variadic: bool },
    Ident { name: String, enclosing_block: BlockId, resolved_declaration: Option<DeclId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinitionData {
    pub kind: TypeDefKind,
    /// The `Type` this definition constructs (a pointer type, a struct
    /// type, ...), set once `check_type_definition_expression` finishes.
    /// Kept separate from `Expr::inferred_type`: per spec §3 a
    /// `Type_Definition` is "an expression whose runtime value *is* a
    /// Type", so its own `inferred_type` is always `TypeId::TYPE` (the
    /// meta-type), exactly as `typecheck_definition` in
    /// `original_source/typecheck.c` always finishes with
    /// `_expression.inferred_type = w->type_def_type` regardless of which
    /// kind was checked. Anything that needs the *concrete* type a
    /// declaration's `my_type` names (range checks, default-value
    /// synthesis, field layout) reads `constructed_type`, not
    /// `inferred_type`.
    pub constructed_type: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastData {
    pub target_type: ExprId,
    pub sub: ExprId,
    pub value_cast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorData {
    pub namespace_expression: ExprId,
    pub ident: String,
    /// Cached across a park/resume cycle so resuming does not repeat the
    /// block lookup (spec §9, "Cooperative suspension").
    pub resolved_declaration: Option<DeclId>,
    pub struct_field_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInstantiationData {
    pub type_definition: ExprId,
    pub arguments: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Number(NumberData),
    Literal(LiteralValue),
    Ident(IdentData),
    Unary(UnaryData),
    Binary(BinaryData),
    Procedure(ProcedureData),
    ProcedureCall(ProcedureCallData),
    TypeDefinition(TypeDefinitionData),
    Cast(CastData),
    Selector(SelectorData),
    TypeInstantiation(TypeInstantiationData),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Span,
    /// `None` is the park signal (spec §4.3/§5): a driver re-entering this
    /// declaration sees this expression is not yet done and returns early
    /// rather than re-running a check that completed last time.
    pub inferred_type: Option<TypeId>,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Span) -> Self {
        Expr { kind, location, inferred_type: None }
    }
}

/// Owns every expression for the lifetime of one compilation, exactly like
/// `tc_types::TypeArena` owns every type. Expressions are never freed
/// individually (spec §5's "Allocation" — process-lifetime arena).
#[derive(Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.0 as usize]
    }
}
