//! Front-end for MJ, a small case-insensitive object-oriented language.
//!
//! The crate consumes a parsed syntax tree and produces (a) the same tree
//! with every identifier use resolved to a symbol-table entry and (b) the
//! symbol table itself, recording each declared name with its kind, type,
//! nesting level, and declaration-time attributes. A code generator
//! consumes both outputs.

/// Syntax-tree storage, builders, and the tree printout.
pub mod ast;
/// Error codes, severities, and the diagnostic reporter.
pub mod diagnostic;
/// Identifier interning.
pub mod names;
/// Analysis options.
pub mod options;
/// The semantic analyzer.
pub mod semantic;
/// Symbol table, scope stack, and attribute storage.
pub mod symtab;
