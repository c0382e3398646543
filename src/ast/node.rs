//! Flat node storage, the operator taxonomy, and the tree-building API.

use std::fmt;

use log::debug;

use crate::names::NameId;
use crate::symtab::SymId;

/// Index of a node in the [`Ast`] arena.
///
/// `NodeRef::DUMMY` (index 0) is the shared placeholder installed wherever a
/// child is absent; it is never overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(u32);

impl NodeRef {
    pub const DUMMY: NodeRef = NodeRef(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_dummy(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operator carried by an internal node. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Program,
    Body,
    Class,
    ClassDef,
    Method,
    Head,
    Spec,
    Decl,
    Comma,
    TypeId,
    ArrayType,
    Bound,
    Recomp,
    RArgType,
    VArgType,
    Stmt,
    IfElse,
    Loop,
    Return,
    Assign,
    RoutineCall,
    Var,
    Select,
    Index,
    Field,
    Subrange,
    Exit,
    To,
    DownTo,
    ConstantId,
    Proce,
    Func,
    Add,
    Sub,
    Mult,
    Div,
    Lt,
    Gt,
    Eq,
    Ne,
    Le,
    Ge,
    And,
    Or,
    UnaryNeg,
    Not,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpKind::Program => "ProgramOp",
            OpKind::Body => "BodyOp",
            OpKind::Class => "ClassOp",
            OpKind::ClassDef => "ClassDefOp",
            OpKind::Method => "MethodOp",
            OpKind::Head => "HeadOp",
            OpKind::Spec => "SpecOp",
            OpKind::Decl => "DeclOp",
            OpKind::Comma => "CommaOp",
            OpKind::TypeId => "TypeIdOp",
            OpKind::ArrayType => "ArrayTypeOp",
            OpKind::Bound => "BoundOp",
            OpKind::Recomp => "RecompOp",
            OpKind::RArgType => "RArgTypeOp",
            OpKind::VArgType => "VArgTypeOp",
            OpKind::Stmt => "StmtOp",
            OpKind::IfElse => "IfElseOp",
            OpKind::Loop => "LoopOp",
            OpKind::Return => "ReturnOp",
            OpKind::Assign => "AssignOp",
            OpKind::RoutineCall => "RoutineCallOp",
            OpKind::Var => "VarOp",
            OpKind::Select => "SelectOp",
            OpKind::Index => "IndexOp",
            OpKind::Field => "FieldOp",
            OpKind::Subrange => "SubrangeOp",
            OpKind::Exit => "ExitOp",
            OpKind::To => "ToOp",
            OpKind::DownTo => "DownToOp",
            OpKind::ConstantId => "ConstantIdOp",
            OpKind::Proce => "ProceOp",
            OpKind::Func => "FuncOp",
            OpKind::Add => "AddOp",
            OpKind::Sub => "SubOp",
            OpKind::Mult => "MultOp",
            OpKind::Div => "DivOp",
            OpKind::Lt => "LTOp",
            OpKind::Gt => "GTOp",
            OpKind::Eq => "EQOp",
            OpKind::Ne => "NEOp",
            OpKind::Le => "LEOp",
            OpKind::Ge => "GEOp",
            OpKind::And => "AndOp",
            OpKind::Or => "OrOp",
            OpKind::UnaryNeg => "UnaryNegOp",
            OpKind::Not => "NotOp",
        };
        f.write_str(name)
    }
}

/// Tagged payload of a single tree node.
///
/// Leaves carry an integer-like payload; the one internal variant carries an
/// operator and two children. Absent children are `NodeRef::DUMMY`, never a
/// missing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Shared placeholder for an absent child.
    Dummy,
    /// Identifier leaf produced by the parser, not yet resolved.
    Id(NameId),
    /// Post-resolution leaf pointing at a symbol-table entry.
    Sym(SymId),
    /// Integer literal.
    IntLit(i32),
    /// Character literal (code point value).
    CharLit(i32),
    /// String literal (interned text).
    StrLit(NameId),
    /// The primitive integer type marker.
    IntType,
    /// Internal node.
    Op {
        op: OpKind,
        left: NodeRef,
        right: NodeRef,
    },
}

/// The tree arena.
///
/// Replaced subtrees simply become unreachable; the whole arena is dropped at
/// once when analysis is finished.
#[derive(Debug)]
pub struct Ast {
    nodes: Vec<NodeKind>,
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: vec![NodeKind::Dummy],
        }
    }

    /// The shared placeholder node.
    pub fn null(&self) -> NodeRef {
        NodeRef::DUMMY
    }

    fn push(&mut self, kind: NodeKind) -> NodeRef {
        let r = NodeRef(self.nodes.len() as u32);
        self.nodes.push(kind);
        r
    }

    /// New identifier leaf.
    pub fn id(&mut self, name: NameId) -> NodeRef {
        self.push(NodeKind::Id(name))
    }

    /// New symbol-table-reference leaf.
    pub fn sym(&mut self, sym: SymId) -> NodeRef {
        self.push(NodeKind::Sym(sym))
    }

    /// New integer-literal leaf.
    pub fn int_lit(&mut self, value: i32) -> NodeRef {
        self.push(NodeKind::IntLit(value))
    }

    /// New character-literal leaf.
    pub fn char_lit(&mut self, value: i32) -> NodeRef {
        self.push(NodeKind::CharLit(value))
    }

    /// New string-literal leaf.
    pub fn str_lit(&mut self, text: NameId) -> NodeRef {
        self.push(NodeKind::StrLit(text))
    }

    /// New primitive-integer-type leaf.
    pub fn int_type(&mut self) -> NodeRef {
        self.push(NodeKind::IntType)
    }

    /// New internal node taking ownership of both children.
    pub fn op(&mut self, op: OpKind, left: NodeRef, right: NodeRef) -> NodeRef {
        self.push(NodeKind::Op { op, left, right })
    }

    pub fn kind(&self, n: NodeRef) -> NodeKind {
        self.nodes[n.index()]
    }

    /// Operator of an internal node; `None` for leaves and `Dummy`.
    pub fn op_of(&self, n: NodeRef) -> Option<OpKind> {
        match self.nodes[n.index()] {
            NodeKind::Op { op, .. } => Some(op),
            _ => None,
        }
    }

    pub fn is_null(&self, n: NodeRef) -> bool {
        matches!(self.nodes[n.index()], NodeKind::Dummy)
    }

    /// Left child; `Dummy` when `n` is not an internal node.
    pub fn left(&self, n: NodeRef) -> NodeRef {
        match self.nodes[n.index()] {
            NodeKind::Op { left, .. } => left,
            _ => NodeRef::DUMMY,
        }
    }

    /// Right child; `Dummy` when `n` is not an internal node.
    pub fn right(&self, n: NodeRef) -> NodeRef {
        match self.nodes[n.index()] {
            NodeKind::Op { right, .. } => right,
            _ => NodeRef::DUMMY,
        }
    }

    /// Replaces the left child of an internal node. The displaced subtree
    /// becomes unreachable arena garbage.
    pub fn set_left(&mut self, n: NodeRef, child: NodeRef) {
        match &mut self.nodes[n.index()] {
            NodeKind::Op { left, .. } => *left = child,
            other => debug!("set_left on a non-internal node {:?}", other),
        }
    }

    /// Replaces the right child of an internal node.
    pub fn set_right(&mut self, n: NodeRef, child: NodeRef) {
        match &mut self.nodes[n.index()] {
            NodeKind::Op { right, .. } => *right = child,
            other => debug!("set_right on a non-internal node {:?}", other),
        }
    }

    /// Overwrites a node's payload in place, keeping its `NodeRef` valid.
    /// The `Dummy` sentinel is never overwritten.
    pub fn replace(&mut self, n: NodeRef, kind: NodeKind) {
        if n.is_dummy() {
            debug!("replace on the dummy sentinel ignored");
            return;
        }
        self.nodes[n.index()] = kind;
    }

    /// Retags the operator of an internal node.
    pub fn set_op(&mut self, n: NodeRef, new_op: OpKind) {
        match &mut self.nodes[n.index()] {
            NodeKind::Op { op, .. } => *op = new_op,
            other => debug!("set_op on a non-internal node {:?}", other),
        }
    }

    /// Retags `n` and every node down its left spine.
    pub fn set_left_spine_op(&mut self, n: NodeRef, op: OpKind) {
        let mut p = n;
        while !self.is_null(p) {
            self.set_op(p, op);
            p = self.left(p);
        }
    }

    /// Installs `t1` at the leftmost open slot of `t2`.
    ///
    /// Walks `t2` down its left spine to the first `Dummy` child and attaches
    /// `t1` there; when `t2` itself is `Dummy`, `t1` becomes the whole tree.
    /// Together with [`Ast::attach_rightmost`] this is how comma-separated
    /// lists are assembled during parsing.
    pub fn attach_leftmost(&mut self, t1: NodeRef, t2: NodeRef) -> NodeRef {
        if self.is_null(t2) {
            return t1;
        }
        let mut p = t2;
        let mut q = self.left(p);
        while !self.is_null(q) {
            p = q;
            q = self.left(p);
        }
        self.set_left(p, t1);
        t2
    }

    /// Installs `t1` at the rightmost open slot of `t2`.
    pub fn attach_rightmost(&mut self, t1: NodeRef, t2: NodeRef) -> NodeRef {
        if self.is_null(t2) {
            return t1;
        }
        let mut p = t2;
        let mut q = self.right(p);
        while !self.is_null(q) {
            p = q;
            q = self.right(p);
        }
        self.set_right(p, t1);
        t2
    }

    /// Number of consecutive left children down to the first `Dummy`;
    /// counts the elements a parser chained into a comma list.
    pub fn left_depth(&self, n: NodeRef) -> usize {
        let mut depth = 0;
        let mut p = n;
        while !self.is_null(p) {
            depth += 1;
            p = self.left(p);
        }
        depth
    }

    /// Name carried by an identifier leaf.
    pub fn name_of(&self, n: NodeRef) -> Option<NameId> {
        match self.nodes[n.index()] {
            NodeKind::Id(name) => Some(name),
            _ => None,
        }
    }

    /// Symbol carried by a resolved leaf.
    pub fn sym_of(&self, n: NodeRef) -> Option<SymId> {
        match self.nodes[n.index()] {
            NodeKind::Sym(sym) => Some(sym),
            _ => None,
        }
    }

    /// Raw integer payload of a leaf, mirroring the untyped view a code
    /// generator sees: name/symbol handles and literal values alike.
    pub fn int_of(&self, n: NodeRef) -> i32 {
        match self.nodes[n.index()] {
            NodeKind::Dummy | NodeKind::IntType | NodeKind::Op { .. } => 0,
            NodeKind::Id(name) | NodeKind::StrLit(name) => name.index() as i32,
            NodeKind::Sym(sym) => sym.get() as i32,
            NodeKind::IntLit(v) | NodeKind::CharLit(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The sentinel is always present.
        false
    }
}
