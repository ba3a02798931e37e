//! Field-index conventions for the built-in composite values, carried over
//! from `original_source/typecheck.c`'s `@Volatile` comments rather than
//! left as magic numbers scattered through the selector and autocast code.

pub const STRING_DATA_FIELD: u32 = 0;
pub const STRING_COUNT_FIELD: u32 = 1;

pub const ARRAY_DATA_FIELD: u32 = 0;
pub const ARRAY_COUNT_FIELD: u32 = 1;
pub const ARRAY_CAPACITY_FIELD: u32 = 2;
