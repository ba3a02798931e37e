use tc_common::Span;

use crate::ids::{BlockId, DeclId, ExprId, StmtId};

/// A lexical block: an ordered list of declarations plus the statements
/// that execute in it. Struct/enum nominal identity (spec §4.1) is this
/// block's own `BlockId` — a `Struct`/`Enum` type variant carries the
/// `BlockId` of the block holding its member declarations.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub declarations: Vec<DeclId>,
    pub statements: Vec<StmtId>,
}

#[derive(Debug, Default)]
pub struct BlockArena {
    blocks: Vec<Block>,
}

impl BlockArena {
    pub fn new() -> Self {
        BlockArena { blocks: Vec::new() }
    }

    pub fn alloc(&mut self, block: Block) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(block);
        id
    }

    pub fn get(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControlKind {
    Break,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    While { condition: ExprId, body: BlockId },
    If { condition: ExprId, then_block: BlockId, else_block: Option<BlockId> },
    /// `range` is either a `..` `Binary` or an array-typed expression
    /// (spec §4.5 For).
    For { iterator: DeclId, range: ExprId, body: BlockId },
    /// `enclosing_procedure` is the declaration whose `my_value` is the
    /// `Procedure` this return lives in, so the statement checker can reach
    /// its return type the way `typecheck_return` reaches
    /// `proc_i_belong_to->lambda_type->lambda.return_type` — nothing else
    /// on the statement tree points back up to an enclosing declaration.
    Return { value: Option<ExprId>, enclosing_procedure: DeclId },
    Variable { decl: DeclId },
    Assignment { target: ExprId, value: ExprId },
    /// Reserved; spec §9 marks `using` unimplemented.
    Using { sub: ExprId },
    Block(BlockId),
    LoopControl(LoopControlKind),
    Import(DeclId),
    ExpressionStatement(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Span,
    pub typechecked: bool,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Span) -> Self {
        Stmt { kind, location, typechecked: false }
    }
}

#[derive(Debug, Default)]
pub struct StmtArena {
    stmts: Vec<Stmt>,
}

impl StmtArena {
    pub fn new() -> Self {
        StmtArena { stmts: Vec::new() }
    }

    pub fn alloc(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn get(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id.0 as usize]
    }
}
