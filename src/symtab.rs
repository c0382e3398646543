//! Symbol table, scope stack, and per-symbol attribute storage.
//!
//! The table proper is append-only: entries are issued monotonically and a
//! [`SymId`] never changes once returned. Visibility is a separate concern,
//! handled by a stack of frames that is pushed on block entry and trimmed
//! en masse on block exit.

pub mod dumper;
pub mod table;
#[cfg(test)]
mod tests_symtab;

pub use dumper::SymbolTableDisplay;
pub use table::{
    AttrKind, AttrValue, SymId, SymKind, SymbolTable, ATTR_CAPACITY, STACK_CAPACITY,
    TABLE_CAPACITY,
};
