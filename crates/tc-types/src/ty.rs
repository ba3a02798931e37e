use smallvec::SmallVec;

use crate::ids::{BlockId, DeclId};
use crate::TypeId;

/// Kind of non-numeric literal a [`Type::Literal`] is inhabited by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Bool,
    /// No canonical builtin is registered for this kind — a null literal's
    /// `inferred_type` resolves straight to `Literal(Void)` once checked
    /// (see `tc_checker`'s expression checker), so this variant exists for
    /// completeness of the sum type rather than because anything
    /// constructs `Type::Literal(Null)` today.
    Null,
    Void,
    /// The type of an expression whose runtime value is itself a `Type`
    /// (a `Type_Definition` expression).
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Fixed,
    Slice,
    Dynamic,
}

/// Up to four arguments/fields inline before spilling — most lambdas and
/// structs in a typical program have only a handful.
pub type TypeIdVec = SmallVec<[TypeId; 4]>;

/// A type, as a tagged union over the shapes enumerated by the data model.
///
/// `Pointer`, `Array`, and `Lambda` compare structurally (equality recurses
/// through `TypeArena::types_are_equal`); `Struct` and `Enum` compare only
/// by `BlockId` identity; `Number` and `Literal` compare by canonical node
/// identity (there is exactly one arena slot per builtin, so `TypeId`
/// equality already is identity equality for them).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number {
        signed: bool,
        float: bool,
        float64: bool,
        /// Smallest representable value, inclusive. Meaningless for float
        /// kinds; used for the integer-literal range check in §4.4.
        low: i128,
        /// Largest representable value, inclusive.
        high: i128,
        size: u32,
    },
    Literal {
        kind: LiteralKind,
        size: u32,
    },
    Pointer {
        pointee: TypeId,
    },
    Array {
        kind: ArrayKind,
        /// Present only for `Fixed`; `Slice`/`Dynamic` carry their length
        /// at runtime, not in the type.
        length: Option<u64>,
        element: TypeId,
    },
    Struct {
        block: BlockId,
        field_types: TypeIdVec,
    },
    Enum {
        block: BlockId,
        underlying_int: TypeId,
    },
    Lambda {
        argument_types: TypeIdVec,
        return_type: TypeId,
        variadic: bool,
    },
    /// An unresolved reference to a named type. Parked until
    /// `resolved_declaration`'s value typechecks, at which point
    /// `TypeArena::replace` overwrites this slot with the resolved type,
    /// exactly as the source replaces `*defn` with `resolved->my_value`.
    Ident {
        name: String,
        resolved_declaration: Option<DeclId>,
    },
    /// Reserved; see spec §9 Open Questions. No operation constructs this
    /// variant beyond `Type_Instantiation`'s "Enum / Lambda / StructCall:
    /// error (unsupported)" rule — it exists so the tag space matches the
    /// data model even though every actual checker rule errors on it.
    StructCall,
}

impl Type {
    pub fn field_count(&self) -> Option<usize> {
        match self {
            Type::Struct { field_types, .. } => Some(field_types.len()),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Type::Number { .. })
    }

    pub fn is_integer_number(&self) -> bool {
        matches!(self, Type::Number { float: false, .. })
    }

    pub fn is_float_number(&self) -> bool {
        matches!(self, Type::Number { float: true, .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Literal { kind: LiteralKind::Void, .. })
    }
}
