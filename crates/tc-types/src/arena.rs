use crate::ty::{ArrayKind, LiteralKind, Type};

/// Handle into a [`TypeArena`]. Builtins get stable, well-known indices
/// (the `TypeId::INT`-style associated constants below) so that code in
/// `tc_checker` can refer to "the canonical `int` type" without holding a
/// `&TypeArena` around — matching spec §4.1's "one canonical node per
/// builtin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub u32);

macro_rules! builtin_ids {
    ($($name:ident = $index:expr),* $(,)?) => {
        impl TypeId {
            $(pub const $name: TypeId = TypeId($index);)*
        }
    };
}

builtin_ids! {
    INT = 0,
    U8 = 1,
    U16 = 2,
    U32 = 3,
    U64 = 4,
    S8 = 5,
    S16 = 6,
    S32 = 7,
    S64 = 8,
    FLOAT = 9,
    FLOAT64 = 10,
    BOOL = 11,
    STRING = 12,
    VOID = 13,
    TYPE = 14,
    COMPTIME_INT = 15,
    COMPTIME_FLOAT = 16,
    COMPTIME_STRING = 17,
}

const BUILTIN_COUNT: u32 = 18;

/// Owns every `Type` for the lifetime of one compilation. Builtins are
/// registered once at construction (§4.1); everything else is allocated on
/// demand by the checker (struct/enum/pointer/array/lambda construction,
/// and `Ident` placeholders awaiting resolution).
pub struct TypeArena {
    types: Vec<Type>,
}

impl TypeArena {
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(64);

        let signed_int = |low: i128, high: i128, size: u32| Type::Number {
            signed: true,
            float: false,
            float64: false,
            low,
            high,
            size,
        };
        let unsigned_int = |high: i128, size: u32| Type::Number {
            signed: false,
            float: false,
            float64: false,
            low: 0,
            high,
            size,
        };

        types.push(signed_int(i32::MIN as i128, i32::MAX as i128, 4)); // INT
        types.push(unsigned_int(u8::MAX as i128, 1)); // U8
        types.push(unsigned_int(u16::MAX as i128, 2)); // U16
        types.push(unsigned_int(u32::MAX as i128, 4)); // U32
        types.push(unsigned_int(u64::MAX as i128, 8)); // U64
        types.push(signed_int(i8::MIN as i128, i8::MAX as i128, 1)); // S8
        types.push(signed_int(i16::MIN as i128, i16::MAX as i128, 2)); // S16
        types.push(signed_int(i32::MIN as i128, i32::MAX as i128, 4)); // S32
        types.push(signed_int(i64::MIN as i128, i64::MAX as i128, 8)); // S64
        types.push(Type::Number {
            signed: true,
            float: true,
            float64: false,
            low: 0,
            high: 0,
            size: 4,
        }); // FLOAT
        types.push(Type::Number {
            signed: true,
            float: true,
            float64: true,
            low: 0,
            high: 0,
            size: 8,
        }); // FLOAT64
        types.push(Type::Literal { kind: LiteralKind::Bool, size: 1 }); // BOOL
        types.push(Type::Literal { kind: LiteralKind::String, size: 16 }); // STRING
        types.push(Type::Literal { kind: LiteralKind::Void, size: 0 }); // VOID
        types.push(Type::Literal { kind: LiteralKind::Type, size: 8 }); // TYPE
        types.push(signed_int(i64::MIN as i128, i64::MAX as i128, 8)); // COMPTIME_INT
        types.push(Type::Number {
            signed: true,
            float: true,
            float64: true,
            low: 0,
            high: 0,
            size: 8,
        }); // COMPTIME_FLOAT
        types.push(Type::Literal { kind: LiteralKind::String, size: 16 }); // COMPTIME_STRING

        debug_assert_eq!(types.len() as u32, BUILTIN_COUNT);
        TypeArena { types }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Overwrites an existing slot in place. Used exactly once per `Ident`
    /// type, when its `resolved_declaration`'s value typechecks — the
    /// equivalent of the source's `*defn := resolved->my_value`.
    pub fn replace(&mut self, id: TypeId, ty: Type) {
        self.types[id.0 as usize] = ty;
    }

    /// Structural/nominal equality per spec §4.1. `Number`/`Literal`
    /// compare by arena-slot identity only (there is exactly one canonical
    /// node per builtin, and constant folding always reuses or allocates a
    /// fresh node rather than mutating an existing Number in place for
    /// equality purposes); `Struct`/`Enum` compare by `BlockId`; `Pointer`,
    /// `Array`, and `Lambda` recurse structurally.
    pub fn types_are_equal(&self, x: TypeId, y: TypeId) -> bool {
        if x == y {
            return true;
        }
        match (self.get(x), self.get(y)) {
            (Type::Pointer { pointee: px }, Type::Pointer { pointee: py }) => {
                self.types_are_equal(*px, *py)
            }
            (
                Type::Array { kind: kx, length: lx, element: ex },
                Type::Array { kind: ky, length: ly, element: ey },
            ) => kx == ky && lx == ly && self.types_are_equal(*ex, *ey),
            (
                Type::Lambda { argument_types: ax, return_type: rx, variadic: vx },
                Type::Lambda { argument_types: ay, return_type: ry, variadic: vy },
            ) => {
                vx == vy
                    && ax.len() == ay.len()
                    && self.types_are_equal(*rx, *ry)
                    && ax.iter().zip(ay.iter()).all(|(a, b)| self.types_are_equal(*a, *b))
            }
            (Type::Struct { block: bx, .. }, Type::Struct { block: by, .. }) => bx == by,
            (Type::Enum { block: bx, .. }, Type::Enum { block: by, .. }) => bx == by,
            _ => false,
        }
    }

    /// Runtime size in bytes, per the invariant list in spec §3.
    pub fn size_of(&self, id: TypeId) -> u32 {
        match self.get(id) {
            Type::Number { size, .. } => *size,
            Type::Literal { size, .. } => *size,
            Type::Pointer { .. } => 8,
            Type::Array { kind: ArrayKind::Slice, .. } => 16,
            Type::Array { kind: ArrayKind::Dynamic, .. } => 24,
            Type::Array { kind: ArrayKind::Fixed, length, element } => {
                length.unwrap_or(0) as u32 * self.size_of(*element)
            }
            Type::Struct { field_types, .. } => {
                field_types.iter().map(|f| self.size_of(*f)).sum()
            }
            Type::Enum { underlying_int, .. } => self.size_of(*underlying_int),
            Type::Lambda { .. } => 8,
            Type::Ident { .. } => {
                panic!("size_of called on an unresolved Ident type")
            }
            Type::StructCall => 0,
        }
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_int_is_signed_32() {
        let arena = TypeArena::new();
        match arena.get(TypeId::INT) {
            Type::Number { signed, float, low, high, .. } => {
                assert!(*signed);
                assert!(!*float);
                assert_eq!(*low, i32::MIN as i128);
                assert_eq!(*high, i32::MAX as i128);
            }
            other => panic!("expected Number, got {other:?}"),
        }
    }

    #[test]
    fn u8_range_is_0_to_255() {
        let arena = TypeArena::new();
        match arena.get(TypeId::U8) {
            Type::Number { low, high, signed, .. } => {
                assert!(!*signed);
                assert_eq!(*low, 0);
                assert_eq!(*high, 255);
            }
            other => panic!("expected Number, got {other:?}"),
        }
    }

    #[test]
    fn builtin_identity_equality() {
        let arena = TypeArena::new();
        assert!(arena.types_are_equal(TypeId::INT, TypeId::INT));
        assert!(!arena.types_are_equal(TypeId::INT, TypeId::U8));
    }

    #[test]
    fn structurally_equal_pointers_compare_equal() {
        let mut arena = TypeArena::new();
        let p1 = arena.alloc(Type::Pointer { pointee: TypeId::INT });
        let p2 = arena.alloc(Type::Pointer { pointee: TypeId::INT });
        assert_ne!(p1, p2);
        assert!(arena.types_are_equal(p1, p2));
    }

    #[test]
    fn structurally_equal_fixed_arrays_compare_equal() {
        let mut arena = TypeArena::new();
        let a1 = arena.alloc(Type::Array {
            kind: ArrayKind::Fixed,
            length: Some(3),
            element: TypeId::INT,
        });
        let a2 = arena.alloc(Type::Array {
            kind: ArrayKind::Fixed,
            length: Some(3),
            element: TypeId::INT,
        });
        let a3 = arena.alloc(Type::Array {
            kind: ArrayKind::Fixed,
            length: Some(4),
            element: TypeId::INT,
        });
        assert!(arena.types_are_equal(a1, a2));
        assert!(!arena.types_are_equal(a1, a3));
    }

    #[test]
    fn structs_compare_by_block_identity_only() {
        use crate::ids::BlockId;
        let mut arena = TypeArena::new();
        let s1 = arena.alloc(Type::Struct {
            block: BlockId(1),
            field_types: smallvec::smallvec![TypeId::INT],
        });
        let s2 = arena.alloc(Type::Struct {
            block: BlockId(1),
            field_types: smallvec::smallvec![TypeId::INT],
        });
        let s3 = arena.alloc(Type::Struct {
            block: BlockId(2),
            field_types: smallvec::smallvec![TypeId::INT],
        });
        assert!(arena.types_are_equal(s1, s2));
        assert!(!arena.types_are_equal(s1, s3));
    }

    #[test]
    fn fixed_array_size_is_length_times_element() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::Array {
            kind: ArrayKind::Fixed,
            length: Some(3),
            element: TypeId::INT,
        });
        assert_eq!(arena.size_of(a), 12);
    }

    #[test]
    fn slice_is_16_bytes_dynamic_is_24() {
        let mut arena = TypeArena::new();
        let slice = arena.alloc(Type::Array { kind: ArrayKind::Slice, length: None, element: TypeId::INT });
        let dynamic = arena.alloc(Type::Array { kind: ArrayKind::Dynamic, length: None, element: TypeId::INT });
        assert_eq!(arena.size_of(slice), 16);
        assert_eq!(arena.size_of(dynamic), 24);
    }

    #[test]
    fn replace_overwrites_ident_slot() {
        let mut arena = TypeArena::new();
        let id = arena.alloc(Type::Ident { name: "Foo".to_string(), resolved_declaration: None });
        arena.replace(id, Type::Pointer { pointee: TypeId::INT });
        assert!(matches!(arena.get(id), Type::Pointer { .. }));
    }
}
