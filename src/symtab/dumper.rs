//! Human-readable symbol-table dump.
//!
//! The layout is pinned: downstream harnesses diff this output against
//! golden files. One row per entry in insertion order, eleven-character
//! right-aligned columns in attribute order, blank columns for unset
//! attributes, and `Value` rendered only for constants.

use std::fmt;

use crate::ast::{Ast, NodeKind};
use crate::names::NameTable;
use crate::symtab::{AttrKind, AttrValue, SymId, SymKind, SymbolTable};

/// `fmt::Display` wrapper over a symbol table.
pub struct SymbolTableDisplay<'a> {
    pub table: &'a SymbolTable,
    pub names: &'a NameTable,
    pub ast: &'a Ast,
}

impl fmt::Display for SymbolTableDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "********************************Symbol Table************************************"
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "          Name Nest-Level  Tree-Node Predefined        Kind       Type      Value  Offset Dimension   Argnum"
        )?;
        writeln!(f)?;

        for sym in self.table.entries() {
            write!(f, "{:>3}", sym.get())?;
            for kind in AttrKind::ALL {
                // Absent attributes render as blank columns, so the probe
                // here must not report misses.
                match self.table.find_attr(sym, kind) {
                    Some(value) => self.column(f, kind, value, sym)?,
                    None => write!(f, "{:>11}", " ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl SymbolTableDisplay<'_> {
    fn column(
        &self,
        f: &mut fmt::Formatter<'_>,
        kind: AttrKind,
        value: AttrValue,
        sym: SymId,
    ) -> fmt::Result {
        match (kind, value) {
            (AttrKind::Name, AttrValue::Name(name)) => {
                write!(f, "{:>11}", self.names.resolve(name))
            }
            (AttrKind::Predefined, AttrValue::Bool(b)) => {
                write!(f, "{:>11}", if b { "yes" } else { "no" })
            }
            (AttrKind::Kind, AttrValue::Kind(k)) => write!(f, "{:>11}", k.to_string()),
            (AttrKind::Type | AttrKind::Tree, AttrValue::Node(node)) => {
                write!(f, "{:>11}", node.index())
            }
            (AttrKind::Value, AttrValue::Node(node)) => {
                // Only constants render their value.
                if self.table.kind_of(sym) != Some(SymKind::Const) {
                    return Ok(());
                }
                match self.ast.kind(node) {
                    NodeKind::IntLit(v) => write!(f, "{:>11}", v),
                    NodeKind::CharLit(v) => match char::from_u32(v as u32) {
                        Some(c) if (0x20..0x7f).contains(&v) => write!(f, "{:>11}", c),
                        _ => Ok(()),
                    },
                    NodeKind::StrLit(text) => {
                        write!(f, "{:>11}", self.names.resolve(text))
                    }
                    _ => Ok(()),
                }
            }
            (_, AttrValue::Int(v)) => write!(f, "{:>11}", v),
            // A value stored under an unexpected key; show its raw form.
            (_, other) => write!(f, "{:>11}", format!("{:?}", other)),
        }
    }
}
