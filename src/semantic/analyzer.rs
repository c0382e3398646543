//! The tree-walking analyzer.

use crate::ast::{Ast, NodeKind, NodeRef, OpKind};
use crate::diagnostic::{ErrorCode, FatalError, Reporter};
use crate::names::{NameId, NameTable};
use crate::options::AnalyzerOptions;
use crate::symtab::{AttrKind, AttrValue, SymId, SymKind, SymbolTable};

/// Context a variable use appears in; changes what an access chain may
/// legally contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarContext {
    General,
    /// The use is the initializer position of a declaration.
    Declaration,
    /// The use is the callee position of a routine call.
    RoutineCall,
}

/// Walks a parsed tree once, populating the symbol table and rewriting
/// identifier leaves into symbol references.
///
/// Construction installs the predefined environment (`system`, `readln`,
/// `println`) and interns the two names the walker itself needs: `main`,
/// whose uniqueness is checked program-wide, and `length`, the one legal
/// non-index access on an array value.
#[derive(Debug)]
pub struct Analyzer {
    symbols: SymbolTable,
    reporter: Reporter,
    main_id: NameId,
    length_id: NameId,
}

impl Analyzer {
    pub fn new(names: &mut NameTable) -> Result<Self, FatalError> {
        Self::with_options(names, AnalyzerOptions::default())
    }

    pub fn with_options(
        names: &mut NameTable,
        options: AnalyzerOptions,
    ) -> Result<Self, FatalError> {
        let mut reporter = Reporter::new();
        let mut symbols = SymbolTable::with_unused_warnings(options.warn_unused);
        symbols.init(names, &mut reporter)?;
        let main_id = names.intern("main");
        let length_id = names.intern("length");
        Ok(Analyzer {
            symbols,
            reporter,
            main_id,
            length_id,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    /// Consumes the analyzer, yielding the populated table and the
    /// collected diagnostics.
    pub fn finish(self) -> (SymbolTable, Reporter) {
        (self.symbols, self.reporter)
    }

    /// Analyzes the subtree rooted at `root`.
    ///
    /// Re-running over an already-analyzed, error-free tree is a no-op:
    /// every handler recognizes a resolved name position and skips it.
    pub fn analyze(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        root: NodeRef,
    ) -> Result<(), FatalError> {
        self.visit(ast, names, root)
    }

    fn visit(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        if ast.is_null(node) {
            return Ok(());
        }
        match ast.op_of(node) {
            Some(OpKind::ClassDef) => self.class_def(ast, names, node),
            Some(OpKind::Method) => self.method_def(ast, names, node),
            Some(OpKind::Decl) => self.decl(ast, names, node).map(|_| ()),
            Some(OpKind::Spec) => self.param_spec(ast, names, node),
            Some(OpKind::TypeId) => self.type_id(ast, names, node),
            Some(OpKind::Var) => self.var_use(ast, names, node, VarContext::General),
            Some(OpKind::RoutineCall) => self.routine_call(ast, names, node),
            Some(_) => {
                self.visit(ast, names, ast.left(node))?;
                self.visit(ast, names, ast.right(node))
            }
            // Leaves carry nothing to check on their own.
            None => Ok(()),
        }
    }

    /// `ClassDefOp`: right child is the class name, left child the body.
    ///
    /// The name goes into the enclosing scope before the class block opens,
    /// so self-referential field types resolve to the class itself.
    fn class_def(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        let name_node = ast.right(node);
        if ast.sym_of(name_node).is_some() {
            return Ok(());
        }
        let Some(name) = ast.name_of(name_node) else {
            return Ok(());
        };
        let Some(sym) = self.symbols.insert_entry(name, names, &mut self.reporter)? else {
            return Ok(());
        };
        self.symbols.set_attr(
            sym,
            AttrKind::Kind,
            AttrValue::Kind(SymKind::Class),
            &mut self.reporter,
        )?;
        self.symbols.open_block(&mut self.reporter)?;
        ast.replace(name_node, NodeKind::Sym(sym));

        let result = self.visit(ast, names, ast.left(node));
        self.symbols.close_block(names, &mut self.reporter);
        result
    }

    /// `MethodOp`: left child is `HeadOp(name, SpecOp(params, returnType))`,
    /// right child the body.
    fn method_def(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        let head = ast.left(node);
        let name_node = ast.left(head);
        if ast.sym_of(name_node).is_some() {
            return Ok(());
        }
        let Some(name) = ast.name_of(name_node) else {
            return Ok(());
        };

        // `main` is the single program-wide unique name: scan the whole
        // table, not just the current scope.
        if name == self.main_id {
            for sym in self.symbols.entries() {
                if self.symbols.name_of(sym) == Some(name) {
                    self.reporter.report(
                        ErrorCode::Redeclaration,
                        Some(names.resolve(name)),
                        None,
                    );
                    return Ok(());
                }
            }
        }

        let Some(sym) = self.symbols.insert_entry(name, names, &mut self.reporter)? else {
            return Ok(());
        };
        self.symbols.open_block(&mut self.reporter)?;

        let spec = ast.right(head);
        let return_type = ast.right(spec);
        if !ast.is_null(return_type) {
            self.symbols.set_attr(
                sym,
                AttrKind::Kind,
                AttrValue::Kind(SymKind::Func),
                &mut self.reporter,
            )?;
            self.symbols.set_attr(
                sym,
                AttrKind::Type,
                AttrValue::Node(return_type),
                &mut self.reporter,
            )?;
        } else {
            self.symbols.set_attr(
                sym,
                AttrKind::Kind,
                AttrValue::Kind(SymKind::Proc),
                &mut self.reporter,
            )?;
        }
        ast.replace(name_node, NodeKind::Sym(sym));

        let mut result = self.visit(ast, names, spec);
        if result.is_ok() {
            result = self.visit(ast, names, ast.right(node));
        }
        self.symbols.close_block(names, &mut self.reporter);
        result
    }

    /// `DeclOp` spine, walked leaves-first so entries appear in source
    /// order. Returns `false` when a redeclaration stopped the walk.
    fn decl(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<bool, FatalError> {
        let left = ast.left(node);
        if ast.op_of(left) == Some(OpKind::Decl) && !self.decl(ast, names, left)? {
            return Ok(false);
        }
        self.declare_one(ast, names, ast.right(node))
    }

    /// One declarator: `CommaOp(name, CommaOp(type, initializer))`.
    fn declare_one(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        declarator: NodeRef,
    ) -> Result<bool, FatalError> {
        if ast.is_null(declarator) {
            return Ok(true);
        }
        let name_node = ast.left(declarator);
        if ast.sym_of(name_node).is_some() {
            return Ok(true);
        }
        let Some(name) = ast.name_of(name_node) else {
            return Ok(true);
        };
        let Some(sym) = self.symbols.insert_entry(name, names, &mut self.reporter)? else {
            return Ok(false);
        };

        let inner = ast.right(declarator);
        let type_node = ast.left(inner);
        self.symbols.set_attr(
            sym,
            AttrKind::Type,
            AttrValue::Node(type_node),
            &mut self.reporter,
        )?;
        ast.replace(name_node, NodeKind::Sym(sym));
        self.type_id(ast, names, type_node)?;

        // The type's right child decides the declared shape: nothing for a
        // scalar, an IndexOp chain for an array.
        let dims = ast.right(type_node);
        if ast.is_null(dims) {
            self.symbols.set_attr(
                sym,
                AttrKind::Kind,
                AttrValue::Kind(SymKind::Var),
                &mut self.reporter,
            )?;
        } else if ast.op_of(dims) == Some(OpKind::Index) {
            let mut count = 0;
            let mut cursor = dims;
            while !ast.is_null(cursor) {
                count += 1;
                cursor = ast.right(cursor);
            }
            self.symbols.set_attr(
                sym,
                AttrKind::Dimen,
                AttrValue::Int(count),
                &mut self.reporter,
            )?;
            self.symbols.set_attr(
                sym,
                AttrKind::Kind,
                AttrValue::Kind(SymKind::Arr),
                &mut self.reporter,
            )?;
        }

        let init = ast.right(inner);
        if ast.op_of(init) == Some(OpKind::Var) {
            self.var_use(ast, names, init, VarContext::Declaration)?;
        } else {
            self.visit(ast, names, init)?;
        }
        Ok(true)
    }

    /// `SpecOp`: the left child is a spine of `VArgTypeOp`/`RArgTypeOp`
    /// wrappers linked on their right children, one per parameter.
    fn param_spec(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        let mut wrapper = ast.left(node);
        while !ast.is_null(wrapper) {
            let arg_kind = match ast.op_of(wrapper) {
                Some(OpKind::VArgType) => SymKind::ValueArg,
                Some(OpKind::RArgType) => SymKind::RefArg,
                _ => break,
            };
            let inner = ast.left(wrapper);
            let name_node = ast.left(inner);
            if let Some(name) = ast.name_of(name_node) {
                if let Some(sym) = self.symbols.insert_entry(name, names, &mut self.reporter)? {
                    self.symbols.set_attr(
                        sym,
                        AttrKind::Type,
                        AttrValue::Node(ast.right(inner)),
                        &mut self.reporter,
                    )?;
                    self.symbols.set_attr(
                        sym,
                        AttrKind::Kind,
                        AttrValue::Kind(arg_kind),
                        &mut self.reporter,
                    )?;
                    ast.replace(name_node, NodeKind::Sym(sym));
                }
            }
            wrapper = ast.right(wrapper);
        }
        Ok(())
    }

    /// `TypeIdOp`: walk the right spine (array dimensions); resolve any
    /// user-type identifier on the way. An unresolved user type has been
    /// reported by the lookup and stays an identifier leaf; the spine walk
    /// continues regardless.
    fn type_id(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        let mut cursor = node;
        while !ast.is_null(cursor) {
            let base = ast.left(cursor);
            if let Some(name) = ast.name_of(base) {
                if let Some(sym) = self.symbols.lookup(name, names, &mut self.reporter)? {
                    ast.replace(base, NodeKind::Sym(sym));
                }
            }
            cursor = ast.right(cursor);
        }
        Ok(())
    }

    /// `VarOp`: `(base, access_chain)` where the chain is a `SelectOp`
    /// spine whose elements are `FieldOp` or `IndexOp` steps.
    ///
    /// The anchor starts at the resolved base symbol and is retargeted as
    /// the chain is consumed: through a variable's class type into the
    /// class, through a field into its own type, through array indexing
    /// into the element class.
    fn var_use(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
        ctx: VarContext,
    ) -> Result<(), FatalError> {
        let base = ast.left(node);
        let mut chain = ast.right(node);

        let mut anchor = if let Some(sym) = ast.sym_of(base) {
            sym
        } else {
            let Some(name) = ast.name_of(base) else {
                return Ok(());
            };
            match self.symbols.lookup(name, names, &mut self.reporter)? {
                Some(sym) => {
                    ast.replace(base, NodeKind::Sym(sym));
                    sym
                }
                // The failed lookup has already been reported.
                None => return Ok(()),
            }
        };

        loop {
            let anchor_kind = match self.symbols.get_attr(
                anchor,
                AttrKind::Kind,
                &mut self.reporter,
            ) {
                Some(AttrValue::Kind(kind)) => Some(kind),
                _ => None,
            };
            match anchor_kind {
                Some(SymKind::Var) => {
                    let ty = match self.symbols.get_attr(
                        anchor,
                        AttrKind::Type,
                        &mut self.reporter,
                    ) {
                        Some(AttrValue::Node(ty)) => ty,
                        _ => break,
                    };
                    let base_ty = if ast.op_of(ty) == Some(OpKind::TypeId) {
                        ast.left(ty)
                    } else {
                        ty
                    };
                    match ast.kind(base_ty) {
                        NodeKind::IntType => {
                            if ast.is_null(chain) {
                                return Ok(());
                            }
                            // Scalars have no members and no elements.
                            let accessor = ast.left(chain);
                            let offending = ast
                                .name_of(ast.left(accessor))
                                .or_else(|| self.symbols.name_of(anchor));
                            self.reporter.report(
                                ErrorCode::FieldMismatch,
                                offending.map(|n| names.resolve(n)),
                                None,
                            );
                            return Ok(());
                        }
                        NodeKind::Sym(class_sym) => {
                            // Object variable: continue resolution inside
                            // its class.
                            anchor = class_sym;
                        }
                        _ => break,
                    }
                }

                Some(SymKind::Proc) | Some(SymKind::Func) => {
                    if ast.is_null(chain) {
                        return Ok(());
                    }
                    let name = self
                        .symbols
                        .name_of(anchor)
                        .map(|n| names.resolve(n).to_string())
                        .unwrap_or_default();
                    return Err(self.reporter.fatal(FatalError::RoutineMemberAccess(name)));
                }

                Some(SymKind::Class) => {
                    if ast.is_null(chain) {
                        break;
                    }
                    let nest = self.symbols.nest_of(anchor);
                    let accessor = ast.left(chain);
                    match ast.op_of(accessor) {
                        Some(OpKind::Field) => {
                            let field_leaf = ast.left(accessor);
                            if let Some(sym) = ast.sym_of(field_leaf) {
                                anchor = sym;
                                chain = ast.right(chain);
                            } else {
                                let Some(field_name) = ast.name_of(field_leaf) else {
                                    break;
                                };
                                match self.find_member(anchor, nest, field_name) {
                                    Some(member) => {
                                        ast.replace(field_leaf, NodeKind::Sym(member));
                                        anchor = member;
                                        chain = ast.right(chain);
                                    }
                                    None => {
                                        self.reporter.report(
                                            ErrorCode::Undeclared,
                                            Some(names.resolve(field_name)),
                                            None,
                                        );
                                        return Ok(());
                                    }
                                }
                            }
                        }
                        Some(OpKind::Index) => {
                            // Indexing a class is only meaningful while
                            // declaring an array of class-typed elements.
                            if ctx != VarContext::Declaration {
                                self.report_sym(ErrorCode::TypeMismatch, anchor, names);
                                return Ok(());
                            }
                            chain = ast.right(chain);
                            while !ast.is_null(chain) {
                                let step = ast.left(chain);
                                if ast.op_of(step) != Some(OpKind::Index) {
                                    let offending = ast
                                        .name_of(ast.left(step))
                                        .or_else(|| self.symbols.name_of(anchor));
                                    self.reporter.report(
                                        ErrorCode::FieldMismatch,
                                        offending.map(|n| names.resolve(n)),
                                        None,
                                    );
                                    return Ok(());
                                }
                                chain = ast.right(chain);
                            }
                        }
                        _ => break,
                    }
                }

                Some(SymKind::Arr) => {
                    // Arrays must be indexed; `.length` is the one
                    // exception.
                    if ast.is_null(chain) {
                        self.report_sym(ErrorCode::IndexMismatch, anchor, names);
                        return Ok(());
                    }
                    let dim = match self.symbols.get_attr(
                        anchor,
                        AttrKind::Dimen,
                        &mut self.reporter,
                    ) {
                        Some(AttrValue::Int(dim)) => dim,
                        _ => 0,
                    };
                    let elem_class = match self.symbols.get_attr(
                        anchor,
                        AttrKind::Type,
                        &mut self.reporter,
                    ) {
                        Some(AttrValue::Node(ty)) => {
                            let base_ty = if ast.op_of(ty) == Some(OpKind::TypeId) {
                                ast.left(ty)
                            } else {
                                ty
                            };
                            ast.sym_of(base_ty)
                        }
                        _ => None,
                    };

                    let mut used = 0;
                    while !ast.is_null(chain)
                        && ast.op_of(ast.left(chain)) != Some(OpKind::Field)
                    {
                        used += 1;
                        if used > dim {
                            self.report_sym(ErrorCode::IndexMismatch, anchor, names);
                            return Ok(());
                        }
                        let index_expr = ast.left(ast.left(chain));
                        if ast.op_of(index_expr).is_some() {
                            self.visit(ast, names, index_expr)?;
                        }
                        chain = ast.right(chain);
                    }

                    if ast.is_null(chain) {
                        if used < dim {
                            self.report_sym(ErrorCode::IndexMismatch, anchor, names);
                            return Ok(());
                        }
                    } else {
                        let accessor = ast.left(chain);
                        let field_leaf = ast.left(accessor);
                        if ast.name_of(field_leaf) == Some(self.length_id) {
                            // `.length` must be the final access.
                            if !ast.is_null(ast.right(chain)) {
                                self.report_sym(ErrorCode::TypeMismatch, anchor, names);
                                return Ok(());
                            }
                            chain = ast.right(chain);
                        } else if let Some(class_sym) = elem_class {
                            // Field of a class-typed element: resolve it
                            // inside the element class.
                            anchor = class_sym;
                            continue;
                        } else {
                            self.report_sym(ErrorCode::TypeMismatch, anchor, names);
                            return Ok(());
                        }
                    }
                }

                _ => break,
            }

            if ast.is_null(chain) {
                break;
            }
        }
        Ok(())
    }

    /// Scans entries declared inside `class_sym`'s block for a member named
    /// `field_name` one level below `nest`. The scan starts right after the
    /// class entry and stops at the first entry back at or above the
    /// class's own level.
    fn find_member(&self, class_sym: SymId, nest: i32, field_name: NameId) -> Option<SymId> {
        let top = self.symbols.len() as u32;
        let mut i = class_sym.get() + 1;
        while i <= top {
            let sym = SymId::new(i).unwrap();
            if self.symbols.name_of(sym) == Some(field_name)
                && self.symbols.nest_of(sym) == nest + 1
            {
                return Some(sym);
            }
            if self.symbols.nest_of(sym) <= nest {
                return None;
            }
            i += 1;
        }
        None
    }

    /// `RoutineCallOp`: the callee resolves as a variable use in call
    /// context, then the argument expressions are analyzed.
    fn routine_call(
        &mut self,
        ast: &mut Ast,
        names: &NameTable,
        node: NodeRef,
    ) -> Result<(), FatalError> {
        let callee = ast.left(node);
        if ast.op_of(callee) == Some(OpKind::Var) {
            self.var_use(ast, names, callee, VarContext::RoutineCall)?;
        } else {
            self.visit(ast, names, callee)?;
        }
        self.visit(ast, names, ast.right(node))
    }

    fn report_sym(&mut self, code: ErrorCode, sym: SymId, names: &NameTable) {
        let name = self.symbols.name_of(sym).map(|n| names.resolve(n));
        self.reporter.report(code, name, None);
    }
}
