use crate::ast::{Ast, NodeKind, NodeRef, OpKind, TreeDisplay};
use crate::names::NameTable;

#[test]
fn leaf_children_are_dummy() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let x = ast.id(names.intern("x"));
    assert!(ast.is_null(ast.left(x)));
    assert!(ast.is_null(ast.right(x)));
    assert_eq!(ast.op_of(x), None);
}

#[test]
fn op_node_owns_both_children() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let lhs = ast.id(names.intern("a"));
    let rhs = ast.int_lit(2);
    let sum = ast.op(OpKind::Add, lhs, rhs);
    assert_eq!(ast.op_of(sum), Some(OpKind::Add));
    assert_eq!(ast.left(sum), lhs);
    assert_eq!(ast.right(sum), rhs);
}

#[test]
fn set_child_replaces_subtree() {
    let mut ast = Ast::new();
    let one = ast.int_lit(1);
    let two = ast.int_lit(2);
    let node = ast.op(OpKind::Add, one, NodeRef::DUMMY);
    ast.set_right(node, two);
    assert_eq!(ast.right(node), two);
    ast.set_left(node, two);
    assert_eq!(ast.left(node), two);
}

#[test]
fn replace_keeps_the_node_ref() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let leaf = ast.id(names.intern("x"));
    let parent = ast.op(OpKind::Var, leaf, NodeRef::DUMMY);
    ast.replace(leaf, NodeKind::IntLit(9));
    assert_eq!(ast.left(parent), leaf);
    assert_eq!(ast.kind(leaf), NodeKind::IntLit(9));
}

#[test]
fn replace_never_touches_the_sentinel() {
    let mut ast = Ast::new();
    ast.replace(NodeRef::DUMMY, NodeKind::IntLit(1));
    assert!(ast.is_null(NodeRef::DUMMY));
}

#[test]
fn attach_leftmost_on_dummy_returns_the_new_tree() {
    let mut ast = Ast::new();
    let leaf = ast.int_lit(1);
    assert_eq!(ast.attach_leftmost(leaf, NodeRef::DUMMY), leaf);
}

#[test]
fn attach_leftmost_extends_a_comma_list() {
    // The parser chains `a, b, c` by repeated left extension.
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("a");
    let b = names.intern("b");
    let c = names.intern("c");

    let mut list = NodeRef::DUMMY;
    for name in [a, b, c] {
        let leaf = ast.id(name);
        let elem = ast.op(OpKind::Comma, NodeRef::DUMMY, leaf);
        list = ast.attach_leftmost(elem, list);
    }

    assert_eq!(ast.left_depth(list), 3);
    // The first element stays at the head; the last sits at the bottom of
    // the left spine.
    assert_eq!(ast.name_of(ast.right(list)), Some(a));
    let bottom = ast.left(ast.left(list));
    assert_eq!(ast.name_of(ast.right(bottom)), Some(c));
}

#[test]
fn attach_rightmost_extends_the_right_spine() {
    let mut ast = Ast::new();
    let first = ast.op(OpKind::Index, NodeRef::DUMMY, NodeRef::DUMMY);
    let second = ast.op(OpKind::Index, NodeRef::DUMMY, NodeRef::DUMMY);
    let chain = ast.attach_rightmost(second, first);
    assert_eq!(chain, first);
    assert_eq!(ast.right(first), second);
}

#[test]
fn left_depth_of_dummy_is_zero() {
    let ast = Ast::new();
    assert_eq!(ast.left_depth(NodeRef::DUMMY), 0);
}

#[test]
fn spine_retagging() {
    let mut ast = Ast::new();
    let inner = ast.op(OpKind::Comma, NodeRef::DUMMY, NodeRef::DUMMY);
    let outer = ast.op(OpKind::Comma, inner, NodeRef::DUMMY);
    ast.set_left_spine_op(outer, OpKind::Decl);
    assert_eq!(ast.op_of(outer), Some(OpKind::Decl));
    assert_eq!(ast.op_of(inner), Some(OpKind::Decl));
}

#[test]
fn tree_printout_layout() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let x = ast.id(names.intern("x"));
    let one = ast.int_lit(1);
    let assign = ast.op(OpKind::Assign, x, one);

    let text = TreeDisplay {
        ast: &ast,
        names: &names,
        symbols: None,
        root: assign,
    }
    .to_string();

    let expected = "************* SYNTAX TREE PRINTOUT ***********\n\
                    \n  \
                    +-[NUMNode,1]\n\
                    R-[AssignOp]\n  \
                    +-[IDNode,0,\"x\"]\n";
    assert_eq!(text, expected);
}

#[test]
fn tree_printout_renders_dummy_children() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let x = ast.id(names.intern("x"));
    let var = ast.op(OpKind::Var, x, NodeRef::DUMMY);

    let text = TreeDisplay {
        ast: &ast,
        names: &names,
        symbols: None,
        root: var,
    }
    .to_string();

    assert!(text.contains("+-[DUMMYnode]"));
    assert!(text.contains("R-[VarOp]"));
    assert!(text.contains("+-[IDNode,0,\"x\"]"));
}

#[test]
fn operator_names_are_pinned() {
    assert_eq!(OpKind::VArgType.to_string(), "VArgTypeOp");
    assert_eq!(OpKind::Proce.to_string(), "ProceOp");
    assert_eq!(OpKind::UnaryNeg.to_string(), "UnaryNegOp");
    assert_eq!(OpKind::Le.to_string(), "LEOp");
    assert_eq!(OpKind::ClassDef.to_string(), "ClassDefOp");
}
