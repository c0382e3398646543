//! Indented syntax-tree printout.
//!
//! Prints the right subtree above its parent and the left subtree below, so
//! the text reads as a left-to-right tree when rotated. Used for debugging
//! and golden-file comparison.

use std::fmt;

use crate::ast::{Ast, NodeKind, NodeRef};
use crate::names::NameTable;
use crate::symtab::SymbolTable;

/// `fmt::Display` wrapper over a subtree.
///
/// `symbols` is optional so trees can be printed before analysis; resolved
/// leaves then render their entry id with an `err` placeholder name.
pub struct TreeDisplay<'a> {
    pub ast: &'a Ast,
    pub names: &'a NameTable,
    pub symbols: Option<&'a SymbolTable>,
    pub root: NodeRef,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "************* SYNTAX TREE PRINTOUT ***********")?;
        writeln!(f)?;
        let mut crosses = Vec::new();
        self.print(f, self.root, 0, &mut crosses)
    }
}

impl TreeDisplay<'_> {
    fn print(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: NodeRef,
        depth: usize,
        crosses: &mut Vec<bool>,
    ) -> fmt::Result {
        if self.ast.is_null(node) {
            indent(f, depth, crosses)?;
            return writeln!(f, "[DUMMYnode]");
        }

        let internal = self.ast.op_of(node).is_some();
        if internal {
            self.print(f, self.ast.right(node), depth + 1, crosses)?;
        }

        indent(f, depth, crosses)?;
        match self.ast.kind(node) {
            NodeKind::Dummy => unreachable!("handled above"),
            NodeKind::Id(name) => {
                writeln!(f, "[IDNode,{},\"{}\"]", name, self.names.resolve(name))?
            }
            NodeKind::Sym(sym) => {
                let name = self
                    .symbols
                    .and_then(|table| table.name_of(sym))
                    .map(|name| self.names.resolve(name))
                    .unwrap_or("err");
                writeln!(f, "[STNode,{},\"{}\"]", sym, name)?;
            }
            NodeKind::IntType => writeln!(f, "[INTEGERTNode]")?,
            NodeKind::IntLit(v) => writeln!(f, "[NUMNode,{}]", v)?,
            NodeKind::CharLit(v) => match char::from_u32(v as u32) {
                Some(c) if (0x20..0x7f).contains(&v) => {
                    writeln!(f, "[CHARNode,{},'{}']", v, c)?
                }
                _ => writeln!(f, "[CHARNode,{},'\\{:o}']", v, v)?,
            },
            NodeKind::StrLit(text) => {
                writeln!(f, "[STRINGNode,{},\"{}\"]", text, self.names.resolve(text))?
            }
            NodeKind::Op { op, .. } => writeln!(f, "[{}]", op)?,
        }

        if internal {
            self.print(f, self.ast.left(node), depth + 1, crosses)?;
        }
        Ok(())
    }
}

/// Prints the `| `-continuation columns and the branch marker for one line,
/// toggling the continuation state at the current depth.
fn indent(f: &mut fmt::Formatter<'_>, depth: usize, crosses: &mut Vec<bool>) -> fmt::Result {
    if crosses.len() <= depth {
        crosses.resize(depth + 1, false);
    }
    for &cross in crosses.iter().take(depth) {
        f.write_str(if cross { "| " } else { "  " })?;
    }
    f.write_str(if depth > 0 { "+-" } else { "R-" })?;
    if depth > 0 {
        crosses[depth] = !crosses[depth];
    }
    Ok(())
}
