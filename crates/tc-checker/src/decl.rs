use bitflags::bitflags;
use tc_common::Span;
use tc_types::TypeId;

use crate::ids::{BlockId, DeclId, ExprId};
use crate::slot::WorkItem;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeclFlags: u16 {
        const IS_CONSTANT               = 1 << 0;
        const IS_PROCEDURE               = 1 << 1;
        const IS_STRUCT_FIELD            = 1 << 2;
        const IS_ENUM_VALUE              = 1 << 3;
        const IS_FOR_LOOP_ITERATOR        = 1 << 4;
        const IS_GLOBAL_VARIABLE          = 1 << 5;
        const IS_FOREIGN                 = 1 << 6;
        const HAS_BEEN_TYPECHECKED        = 1 << 7;
        const TYPE_WAS_INFERRED_FROM_EXPRESSION = 1 << 8;
        const VALUE_WAS_INFERRED_FROM_TYPE       = 1 << 9;
    }
}

/// A declaration, per spec §3. `my_type`/`my_value` are `Type_Definition`
/// and arbitrary expressions respectively, living in the shared
/// `ExprArena` — a declaration does not own a private sub-arena.
#[derive(Debug, Clone)]
pub struct Decl {
    pub ident: Option<String>,
    pub my_type: Option<ExprId>,
    pub my_value: Option<ExprId>,
    /// The concrete type this declaration ends up with, set once by
    /// `finalize_declaration` regardless of where it came from: the
    /// explicit `my_type` annotation's `constructed_type`, the inferred
    /// type of `my_value`, or (for a procedure) its lambda type. Kept
    /// separate from `my_type` because the source can set `decl->my_type`
    /// to a bare `Ast_Type_Definition*` that was never an annotation at
    /// all (`typecheck_declaration`'s "inferred from expression" branch) —
    /// something with no `ExprId` of its own to point `my_type` at.
    pub my_type_id: Option<TypeId>,
    pub flags: DeclFlags,
    pub flattened: Vec<WorkItem>,
    pub typechecking_position: usize,
    /// Set for struct/enum/procedure declarations: the block the
    /// declaration's own members (fields, enum values, parameters) live
    /// in.
    pub my_block: Option<BlockId>,
    /// True when this declaration is an import binding. The source's
    /// `my_import` field also carries import-table details that belong to
    /// the module loader, an external collaborator here (spec §1); only
    /// the presence/absence the checker branches on is modeled.
    pub my_import: bool,
    pub struct_field_index: Option<u32>,
    pub location: Span,
}

impl Decl {
    pub fn new(location: Span) -> Self {
        Decl {
            ident: None,
            my_type: None,
            my_value: None,
            my_type_id: None,
            flags: DeclFlags::empty(),
            flattened: Vec::new(),
            typechecking_position: 0,
            my_block: None,
            my_import: false,
            struct_field_index: None,
            location,
        }
    }

    pub fn is_done(&self) -> bool {
        self.flags.contains(DeclFlags::HAS_BEEN_TYPECHECKED)
    }
}

#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        DeclArena { decls: Vec::new() }
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> &Decl {
        &self.decls[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.0 as usize]
    }
}

/// The concrete `TypeId` a declaration's `my_type` annotation expression
/// resolves to, if that expression has finished typechecking. This is
/// deliberately `TypeDefinitionData::constructed_type`, not
/// `Expr::inferred_type` — a `Type_Definition` expression's own
/// `inferred_type` is always the `Type` meta-type (spec §3), never the
/// type it constructs. Used while a declaration is still mid-queue (struct
/// field layout, enum underlying type); once a declaration is fully done,
/// prefer `decl.my_type_id`.
pub fn annotation_type_id(decl: &Decl, exprs: &crate::expr::ExprArena) -> Option<TypeId> {
    use crate::expr::ExprKind;
    let id = decl.my_type?;
    match &exprs.get(id).kind {
        ExprKind::TypeDefinition(t) => t.constructed_type,
        _ => None,
    }
}
