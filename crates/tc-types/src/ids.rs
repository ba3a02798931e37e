/// Identity of a declaration, owned by `tc_checker`'s declaration arena.
///
/// `tc-types` only needs this as an opaque nominal key — `Type::Ident`
/// carries one while still unresolved, and `Type::Struct`/`Type::Enum`'s
/// block identity is how nominal equality (spec §4.1) is implemented
/// without this crate knowing anything about declarations or blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(pub u32);

/// Identity of the block owning a struct's or enum's member declarations.
/// Two `Struct`/`Enum` types are equal iff their `BlockId`s are equal —
/// nominal typing is block identity, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);
