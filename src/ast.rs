//! Abstract syntax tree for the MJ front-end.
//!
//! The tree is stored as a flat vector of tagged nodes addressed by
//! [`NodeRef`] indices. The parser builds trees bottom-up through the
//! constructors on [`Ast`]; the semantic analyzer later rewrites identifier
//! leaves in place into symbol-table references, which keeps every
//! `NodeRef` handed out by the parser valid for downstream consumers.
//!
//! Node 0 is the shared `Dummy` sentinel: every absent child points at it,
//! and it is the only representation of "no node" in the API.

pub mod dumper;
pub mod node;
#[cfg(test)]
mod tests_ast;

pub use dumper::TreeDisplay;
pub use node::{Ast, NodeKind, NodeRef, OpKind};
