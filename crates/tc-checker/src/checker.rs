use tc_types::TypeArena;

use crate::block::{BlockArena, StmtArena};
use crate::decl::DeclArena;
use crate::expr::ExprArena;
use crate::options::CheckerOptions;
use crate::workspace::Workspace;

/// The compilation context: every arena plus the host-provided scope/file
/// API. This is the explicit, ownable replacement for the source's process
/// globals (spec §9, "Global context") — nothing here is thread-local or
/// static, so a caller can run several independent `Checker`s at once.
pub struct Checker<'w> {
    pub exprs: ExprArena,
    pub decls: DeclArena,
    pub blocks: BlockArena,
    pub stmts: StmtArena,
    pub types: TypeArena,
    pub options: CheckerOptions,
    pub workspace: &'w dyn Workspace,
}

impl<'w> Checker<'w> {
    pub fn new(workspace: &'w dyn Workspace, options: CheckerOptions) -> Self {
        Checker {
            exprs: ExprArena::new(),
            decls: DeclArena::new(),
            blocks: BlockArena::new(),
            stmts: StmtArena::new(),
            types: TypeArena::new(),
            options,
            workspace,
        }
    }
}
