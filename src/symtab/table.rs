//! The symbol table and its scope stack.

use std::fmt;
use std::num::NonZeroU32;

use log::debug;

use crate::ast::NodeRef;
use crate::diagnostic::{ErrorCode, FatalError, Reporter};
use crate::names::{NameId, NameTable};

/// Maximum number of live scope-stack frames.
pub const STACK_CAPACITY: usize = 100;
/// Maximum number of symbol-table entries.
pub const TABLE_CAPACITY: usize = 500;
/// Maximum number of cells in the shared attribute pool.
pub const ATTR_CAPACITY: usize = 2000;

/// Handle for a symbol-table entry. Entry ids start at 1; "no entry" is
/// represented as `Option::None`, never a reserved id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymId(NonZeroU32);

impl SymId {
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for SymId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.get())
    }
}

/// Classification of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymKind {
    Const,
    Var,
    FuncForward,
    Func,
    RefArg,
    ValueArg,
    Field,
    TypeDef,
    ProcForward,
    Proc,
    Class,
    Arr,
}

impl fmt::Display for SymKind {
    /// The pinned strings the debug dump prints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymKind::Const => "constant",
            SymKind::Var => "variable",
            SymKind::FuncForward => "funcforw",
            SymKind::Func => "function",
            SymKind::RefArg => "ref_arg",
            SymKind::ValueArg => "val_arg",
            SymKind::Field => "field",
            SymKind::TypeDef => "typedef",
            SymKind::ProcForward => "procforw",
            SymKind::Proc => "procedure",
            SymKind::Class => "class",
            SymKind::Arr => "array",
        };
        f.write_str(name)
    }
}

/// Attribute keys, ordered so that the most common keys compare smallest;
/// per-entry attribute lists are kept sorted ascending by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttrKind {
    Name,
    Nest,
    Tree,
    Predefined,
    Kind,
    Type,
    Value,
    Offset,
    Dimen,
    ArgNum,
}

impl AttrKind {
    /// All keys in ascending order, the order the debug dump walks.
    pub const ALL: [AttrKind; 10] = [
        AttrKind::Name,
        AttrKind::Nest,
        AttrKind::Tree,
        AttrKind::Predefined,
        AttrKind::Kind,
        AttrKind::Type,
        AttrKind::Value,
        AttrKind::Offset,
        AttrKind::Dimen,
        AttrKind::ArgNum,
    ];
}

/// Typed attribute payload. Each attribute key stores exactly one of these
/// shapes; the variants make the intended use explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue {
    Int(i32),
    Bool(bool),
    Name(NameId),
    Node(NodeRef),
    Kind(SymKind),
}

impl AttrValue {
    pub fn as_int(self) -> Option<i32> {
        match self {
            AttrValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_node(self) -> Option<NodeRef> {
        match self {
            AttrValue::Node(n) => Some(n),
            _ => None,
        }
    }
}

/// One cell of the shared attribute pool. Cells form per-entry singly linked
/// lists ordered by ascending [`AttrKind`].
#[derive(Debug, Clone, Copy)]
struct AttrCell {
    kind: AttrKind,
    value: AttrValue,
    next: Option<u32>,
}

/// One frame of the scope stack: either a block boundary or a binding.
#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Opens a scope; `close_block` pops everything above it.
    Marker,
    Binding {
        name: NameId,
        /// `None` for dummy frames pushed after a failed lookup.
        sym: Option<SymId>,
        used: bool,
    },
}

/// The symbol table: entry storage, attribute pool, and scope stack.
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Head of each entry's attribute list, indexed by `SymId - 1`.
    heads: Vec<Option<u32>>,
    attrs: Vec<AttrCell>,
    stack: Vec<Frame>,
    nesting: i32,
    /// Gates the unused-binding warning emitted by `close_block`.
    warn_unused: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unused_warnings(warn_unused: bool) -> Self {
        SymbolTable {
            warn_unused,
            ..Self::default()
        }
    }

    /// Installs the predefined environment: the class `system` and the
    /// procedures `readln` and `println`. The procedures are recorded one
    /// nesting level deeper than the current one, so member lookup through
    /// `system` finds them.
    pub fn init(
        &mut self,
        names: &mut NameTable,
        diag: &mut Reporter,
    ) -> Result<(), FatalError> {
        let system = names.intern("system");
        if let Some(sym) = self.insert_entry(system, names, diag)? {
            self.set_attr(sym, AttrKind::Predefined, AttrValue::Bool(true), diag)?;
            self.set_attr(sym, AttrKind::Kind, AttrValue::Kind(SymKind::Class), diag)?;
        }

        for proc_name in ["readln", "println"] {
            let name = names.intern(proc_name);
            if let Some(sym) = self.insert_entry(name, names, diag)? {
                self.set_attr(sym, AttrKind::Nest, AttrValue::Int(self.nesting + 1), diag)?;
                self.set_attr(sym, AttrKind::Predefined, AttrValue::Bool(true), diag)?;
                self.set_attr(sym, AttrKind::Kind, AttrValue::Kind(SymKind::Proc), diag)?;
            }
        }
        Ok(())
    }

    pub fn nesting(&self) -> i32 {
        self.nesting
    }

    /// Number of entries issued so far.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// All issued entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = SymId> {
        (1..=self.heads.len() as u32).map(|i| SymId::new(i).unwrap())
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    fn push(&mut self, frame: Frame, diag: &mut Reporter) -> Result<(), FatalError> {
        if self.stack.len() >= STACK_CAPACITY {
            return Err(diag.fatal(FatalError::StackOverflow));
        }
        self.stack.push(frame);
        Ok(())
    }

    /// Enters a new scope. The name owning the block (class or method) must
    /// already be inserted so it lives in the enclosing scope.
    pub fn open_block(&mut self, diag: &mut Reporter) -> Result<(), FatalError> {
        self.nesting += 1;
        debug!("open_block: nesting now {}", self.nesting);
        self.push(Frame::Marker, diag)
    }

    /// Leaves the current scope, trimming every frame above and including
    /// the nearest marker.
    pub fn close_block(&mut self, names: &NameTable, diag: &mut Reporter) {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Marker => break,
                Frame::Binding {
                    name,
                    sym: Some(_),
                    used,
                } => {
                    if self.warn_unused && !used {
                        diag.report(ErrorCode::NotUsed, Some(names.resolve(name)), None);
                    }
                }
                Frame::Binding { .. } => {}
            }
        }
        self.nesting -= 1;
        debug!("close_block: nesting now {}", self.nesting);
    }

    /// Creates a new entry for `name` in the current scope.
    ///
    /// Reports `Redeclaration` and returns `Ok(None)` when the name is
    /// already bound in the current scope. The new entry carries its `Name`
    /// and the current nesting depth.
    pub fn insert_entry(
        &mut self,
        name: NameId,
        names: &NameTable,
        diag: &mut Reporter,
    ) -> Result<Option<SymId>, FatalError> {
        if self.lookup_here(name).is_some() {
            diag.report(ErrorCode::Redeclaration, Some(names.resolve(name)), None);
            return Ok(None);
        }
        if self.heads.len() >= TABLE_CAPACITY {
            return Err(diag.fatal(FatalError::SymbolTableOverflow));
        }

        self.heads.push(None);
        let sym = SymId::new(self.heads.len() as u32).unwrap();
        self.set_attr(sym, AttrKind::Name, AttrValue::Name(name), diag)?;
        self.set_attr(sym, AttrKind::Nest, AttrValue::Int(self.nesting), diag)?;
        self.push(
            Frame::Binding {
                name,
                sym: Some(sym),
                used: false,
            },
            diag,
        )?;
        debug!("insert_entry: {} -> {}", names.resolve(name), sym);
        Ok(Some(sym))
    }

    /// Resolves `name` through all enclosing scopes, innermost first.
    ///
    /// A hit marks the frame used. A miss reports `Undeclared` once and
    /// pushes a dummy frame so further uses of the same undeclared name in
    /// this scope resolve to the dummy silently.
    pub fn lookup(
        &mut self,
        name: NameId,
        names: &NameTable,
        diag: &mut Reporter,
    ) -> Result<Option<SymId>, FatalError> {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Binding {
                name: bound,
                sym,
                used,
            } = frame
            {
                if *bound == name {
                    *used = true;
                    return Ok(*sym);
                }
            }
        }

        diag.report(ErrorCode::Undeclared, Some(names.resolve(name)), None);
        self.push(
            Frame::Binding {
                name,
                sym: None,
                used: false,
            },
            diag,
        )?;
        Ok(None)
    }

    /// Resolves `name` in the current scope only, ignoring dummy frames.
    pub fn lookup_here(&self, name: NameId) -> Option<SymId> {
        for frame in self.stack.iter().rev() {
            match frame {
                Frame::Marker => break,
                Frame::Binding {
                    name: bound,
                    sym: Some(sym),
                    ..
                } if *bound == name => return Some(*sym),
                Frame::Binding { .. } => {}
            }
        }
        None
    }

    pub fn has_attr(&self, sym: SymId, kind: AttrKind) -> bool {
        self.find_attr(sym, kind).is_some()
    }

    /// Fetches an attribute the caller expects to be present.
    ///
    /// A miss prints a diagnostic note and returns `None`; readers that
    /// tolerate absence probe with [`SymbolTable::has_attr`] first or use
    /// the typed accessors below.
    pub fn get_attr(
        &self,
        sym: SymId,
        kind: AttrKind,
        diag: &mut Reporter,
    ) -> Option<AttrValue> {
        let value = self.find_attr(sym, kind);
        if value.is_none() {
            diag.note(format!("attribute {:?} of entry {} is not set", kind, sym));
        }
        value
    }

    /// Walks an entry's sorted attribute list without reporting a miss.
    pub(crate) fn find_attr(&self, sym: SymId, kind: AttrKind) -> Option<AttrValue> {
        let mut cursor = self.heads[sym.slot()];
        while let Some(i) = cursor {
            let cell = &self.attrs[i as usize];
            if cell.kind == kind {
                return Some(cell.value);
            }
            if cell.kind > kind {
                break;
            }
            cursor = cell.next;
        }
        None
    }

    /// Sets an attribute, overwriting an existing value or splicing a new
    /// cell into the entry's list at its sorted position.
    pub fn set_attr(
        &mut self,
        sym: SymId,
        kind: AttrKind,
        value: AttrValue,
        diag: &mut Reporter,
    ) -> Result<(), FatalError> {
        // Overwrite in place when the key already exists.
        let mut cursor = self.heads[sym.slot()];
        while let Some(i) = cursor {
            let cell = &mut self.attrs[i as usize];
            if cell.kind == kind {
                cell.value = value;
                return Ok(());
            }
            if cell.kind > kind {
                break;
            }
            cursor = cell.next;
        }

        if self.attrs.len() >= ATTR_CAPACITY {
            return Err(diag.fatal(FatalError::AttributeOverflow));
        }

        // Find the link that should point at the new cell.
        let new_index = self.attrs.len() as u32;
        let mut prev: Option<u32> = None;
        let mut next = self.heads[sym.slot()];
        while let Some(i) = next {
            if self.attrs[i as usize].kind < kind {
                prev = Some(i);
                next = self.attrs[i as usize].next;
            } else {
                break;
            }
        }

        self.attrs.push(AttrCell { kind, value, next });
        match prev {
            Some(i) => self.attrs[i as usize].next = Some(new_index),
            None => self.heads[sym.slot()] = Some(new_index),
        }
        Ok(())
    }

    // Typed accessors for reads that tolerate absence, used where presence
    // is structurally guaranteed or probed beforehand.

    pub fn name_of(&self, sym: SymId) -> Option<NameId> {
        match self.find_attr(sym, AttrKind::Name) {
            Some(AttrValue::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn nest_of(&self, sym: SymId) -> i32 {
        self.find_attr(sym, AttrKind::Nest)
            .and_then(AttrValue::as_int)
            .unwrap_or(0)
    }

    pub fn kind_of(&self, sym: SymId) -> Option<SymKind> {
        match self.find_attr(sym, AttrKind::Kind) {
            Some(AttrValue::Kind(kind)) => Some(kind),
            _ => None,
        }
    }

    pub fn type_of(&self, sym: SymId) -> Option<NodeRef> {
        self.find_attr(sym, AttrKind::Type)
            .and_then(AttrValue::as_node)
    }

    pub fn dimen_of(&self, sym: SymId) -> i32 {
        self.find_attr(sym, AttrKind::Dimen)
            .and_then(AttrValue::as_int)
            .unwrap_or(0)
    }
}
