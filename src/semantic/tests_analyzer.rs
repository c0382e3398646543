//! Analyzer tests.
//!
//! The trees below are built through the public AST constructors exactly
//! the way the parser assembles them bottom-up, then handed to the
//! analyzer.

use crate::ast::{Ast, NodeRef, OpKind};
use crate::diagnostic::FatalError;
use crate::names::{NameId, NameTable};
use crate::options::AnalyzerOptions;
use crate::semantic::Analyzer;
use crate::symtab::{SymId, SymKind};

/// `TypeIdOp(IntType, Dummy)` — the scalar integer type.
fn int_type(ast: &mut Ast) -> NodeRef {
    let base = ast.int_type();
    ast.op(OpKind::TypeId, base, NodeRef::DUMMY)
}

/// `TypeIdOp(IntType, IndexOp(bound, IndexOp(...)))` — an integer array.
fn int_array_type(ast: &mut Ast, bounds: &[i32]) -> NodeRef {
    let mut dims = NodeRef::DUMMY;
    for &bound in bounds.iter().rev() {
        let lit = ast.int_lit(bound);
        dims = ast.op(OpKind::Index, lit, dims);
    }
    let base = ast.int_type();
    ast.op(OpKind::TypeId, base, dims)
}

/// `TypeIdOp(IdRef(class), dims)` — a user-typed declaration.
fn class_type(ast: &mut Ast, class: NameId, bounds: &[i32]) -> NodeRef {
    let mut dims = NodeRef::DUMMY;
    for &bound in bounds.iter().rev() {
        let lit = ast.int_lit(bound);
        dims = ast.op(OpKind::Index, lit, dims);
    }
    let base = ast.id(class);
    ast.op(OpKind::TypeId, base, dims)
}

/// `DeclOp(Dummy, CommaOp(name, CommaOp(type, init)))`.
fn decl(ast: &mut Ast, name: NameId, ty: NodeRef, init: NodeRef) -> NodeRef {
    let leaf = ast.id(name);
    let inner = ast.op(OpKind::Comma, ty, init);
    let declarator = ast.op(OpKind::Comma, leaf, inner);
    ast.op(OpKind::Decl, NodeRef::DUMMY, declarator)
}

/// Plain variable use: `VarOp(IdRef(name), Dummy)`.
fn var(ast: &mut Ast, name: NameId) -> NodeRef {
    let leaf = ast.id(name);
    ast.op(OpKind::Var, leaf, NodeRef::DUMMY)
}

/// One access-chain step.
enum Access {
    Index(NodeRef),
    Field(NameId),
}

/// `VarOp(IdRef(name), SelectOp(step, SelectOp(...)))`.
fn var_access(ast: &mut Ast, name: NameId, accesses: Vec<Access>) -> NodeRef {
    let mut chain = NodeRef::DUMMY;
    for access in accesses.into_iter().rev() {
        let step = match access {
            Access::Index(expr) => ast.op(OpKind::Index, expr, NodeRef::DUMMY),
            Access::Field(field) => {
                let leaf = ast.id(field);
                ast.op(OpKind::Field, leaf, NodeRef::DUMMY)
            }
        };
        chain = ast.op(OpKind::Select, step, chain);
    }
    let leaf = ast.id(name);
    ast.op(OpKind::Var, leaf, chain)
}

/// `MethodOp(HeadOp(name, SpecOp(params, return_type)), body)`.
fn method(
    ast: &mut Ast,
    name: NameId,
    params: NodeRef,
    return_type: NodeRef,
    body: NodeRef,
) -> NodeRef {
    let spec = ast.op(OpKind::Spec, params, return_type);
    let leaf = ast.id(name);
    let head = ast.op(OpKind::Head, leaf, spec);
    ast.op(OpKind::Method, head, body)
}

/// A single value parameter: `VArgTypeOp(CommaOp(name, type), rest)`.
fn val_param(ast: &mut Ast, name: NameId, ty: NodeRef, rest: NodeRef) -> NodeRef {
    let leaf = ast.id(name);
    let inner = ast.op(OpKind::Comma, leaf, ty);
    ast.op(OpKind::VArgType, inner, rest)
}

/// `ClassDefOp(body, IdRef(name))`.
fn class(ast: &mut Ast, name: NameId, body: NodeRef) -> NodeRef {
    let leaf = ast.id(name);
    ast.op(OpKind::ClassDef, body, leaf)
}

fn body(ast: &mut Ast, left: NodeRef, right: NodeRef) -> NodeRef {
    ast.op(OpKind::Body, left, right)
}

fn find_entry(analyzer: &Analyzer, names: &NameTable, text: &str) -> Option<SymId> {
    let id = names.find(text)?;
    analyzer
        .symbols()
        .entries()
        .find(|&sym| analyzer.symbols().name_of(sym) == Some(id))
}

fn messages(analyzer: &Analyzer) -> Vec<String> {
    analyzer
        .reporter()
        .diagnostics()
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

#[test]
fn empty_class_next_to_the_predefined_environment() {
    // program P; class C { }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let p = names.intern("P");
    let c = names.intern("C");
    let class_c = class(&mut ast, c, NodeRef::DUMMY);
    let program_name = ast.id(p);
    let root = ast.op(OpKind::Program, program_name, class_c);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors());
    // Predefined system/readln/println plus C; the program name is not a
    // declaration.
    assert_eq!(analyzer.symbols().len(), 4);
    let c_sym = find_entry(&analyzer, &names, "C").unwrap();
    assert_eq!(analyzer.symbols().kind_of(c_sym), Some(SymKind::Class));
    assert_eq!(analyzer.symbols().nest_of(c_sym), 0);
    // The class-name leaf was rewritten in place.
    assert_eq!(ast.sym_of(ast.right(class_c)), Some(c_sym));
}

#[test]
fn class_redeclaration_in_the_same_scope() {
    // class C { int x; } class C { }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let c = names.intern("C");
    let x = names.intern("x");

    let ty = int_type(&mut ast);
    let field = decl(&mut ast, x, ty, NodeRef::DUMMY);
    let first = class(&mut ast, c, field);
    let second = class(&mut ast, c, NodeRef::DUMMY);
    let root = ast.op(OpKind::Class, first, second);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol C: redeclared."]);
    // 3 predefined + C + x; the second C was skipped entirely.
    assert_eq!(analyzer.symbols().len(), 5);
}

#[test]
fn array_declaration_and_indexed_use_resolve() {
    // class A { int arr[5]; method int f(val int i) { return arr[i]; } }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let arr = names.intern("arr");
    let f = names.intern("f");
    let i = names.intern("i");

    let arr_ty = int_array_type(&mut ast, &[5]);
    let arr_decl = decl(&mut ast, arr, arr_ty, NodeRef::DUMMY);

    let index_expr = var(&mut ast, i);
    let arr_use = var_access(&mut ast, arr, vec![Access::Index(index_expr)]);
    let ret = ast.op(OpKind::Return, arr_use, NodeRef::DUMMY);
    let stmt = ast.op(OpKind::Stmt, NodeRef::DUMMY, ret);
    let method_body = body(&mut ast, NodeRef::DUMMY, stmt);

    let param_ty = int_type(&mut ast);
    let params = val_param(&mut ast, i, param_ty, NodeRef::DUMMY);
    let ret_ty = int_type(&mut ast);
    let f_method = method(&mut ast, f, params, ret_ty, method_body);

    let class_body = body(&mut ast, arr_decl, f_method);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors(), "{:?}", messages(&analyzer));

    let arr_sym = find_entry(&analyzer, &names, "arr").unwrap();
    assert_eq!(analyzer.symbols().kind_of(arr_sym), Some(SymKind::Arr));
    assert_eq!(analyzer.symbols().dimen_of(arr_sym), 1);
    // The Type attribute points back at the declared type subtree.
    assert_eq!(analyzer.symbols().type_of(arr_sym), Some(arr_ty));

    let f_sym = find_entry(&analyzer, &names, "f").unwrap();
    assert_eq!(analyzer.symbols().kind_of(f_sym), Some(SymKind::Func));

    let i_sym = find_entry(&analyzer, &names, "i").unwrap();
    assert_eq!(analyzer.symbols().kind_of(i_sym), Some(SymKind::ValueArg));

    // Both the array use and the index variable were rewritten.
    assert_eq!(ast.sym_of(ast.left(arr_use)), Some(arr_sym));
    assert_eq!(ast.sym_of(ast.left(index_expr)), Some(i_sym));
}

#[test]
fn member_access_on_a_scalar_is_a_field_mismatch() {
    // class A { int x; method void g() { x.y := 1; } }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let x = names.intern("x");
    let g = names.intern("g");
    let y = names.intern("y");

    let ty = int_type(&mut ast);
    let x_decl = decl(&mut ast, x, ty, NodeRef::DUMMY);

    let lhs = var_access(&mut ast, x, vec![Access::Field(y)]);
    let one = ast.int_lit(1);
    let assign = ast.op(OpKind::Assign, lhs, one);
    let method_body = body(&mut ast, NodeRef::DUMMY, assign);
    let g_method = method(&mut ast, g, NodeRef::DUMMY, NodeRef::DUMMY, method_body);

    let class_body = body(&mut ast, x_decl, g_method);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(
        messages(&analyzer),
        vec!["symbol y: is an undeclared field name."]
    );
}

#[test]
fn method_redeclaration_in_the_same_class() {
    // class A { method int m() {...} method int m() {...} }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let m = names.intern("m");

    let ret1 = int_type(&mut ast);
    let first = method(&mut ast, m, NodeRef::DUMMY, ret1, NodeRef::DUMMY);
    let ret2 = int_type(&mut ast);
    let second = method(&mut ast, m, NodeRef::DUMMY, ret2, NodeRef::DUMMY);
    let class_body = body(&mut ast, first, second);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol m: redeclared."]);
}

#[test]
fn main_is_unique_across_classes() {
    // class A { method int main(){...} } class B { method int main(){...} }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let b = names.intern("B");
    let main = names.intern("main");

    let ret1 = int_type(&mut ast);
    let main1 = method(&mut ast, main, NodeRef::DUMMY, ret1, NodeRef::DUMMY);
    let class_a = class(&mut ast, a, main1);
    let ret2 = int_type(&mut ast);
    let main2 = method(&mut ast, main, NodeRef::DUMMY, ret2, NodeRef::DUMMY);
    let class_b = class(&mut ast, b, main2);
    let root = ast.op(OpKind::Class, class_a, class_b);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    // The cross-scope scan reports a plain redeclaration.
    assert_eq!(messages(&analyzer), vec!["symbol main: redeclared."]);
}

#[test]
fn self_referential_field_type_resolves_to_the_class() {
    // class Node { Node next; }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let node = names.intern("Node");
    let next = names.intern("next");

    let ty = class_type(&mut ast, node, &[]);
    let next_decl = decl(&mut ast, next, ty, NodeRef::DUMMY);
    let root = class(&mut ast, node, next_decl);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors());
    let class_sym = find_entry(&analyzer, &names, "Node").unwrap();
    assert_eq!(ast.sym_of(ast.left(ty)), Some(class_sym));
}

#[test]
fn object_field_access_resolves_through_the_class() {
    // class Person { int age; }  Person p;  ... p.age ...
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let person = names.intern("Person");
    let age = names.intern("age");
    let p = names.intern("p");

    let age_ty = int_type(&mut ast);
    let age_decl = decl(&mut ast, age, age_ty, NodeRef::DUMMY);
    let person_class = class(&mut ast, person, age_decl);

    let p_ty = class_type(&mut ast, person, &[]);
    let p_decl = decl(&mut ast, p, p_ty, NodeRef::DUMMY);
    let p_use = var_access(&mut ast, p, vec![Access::Field(age)]);

    let uses = body(&mut ast, p_decl, p_use);
    let root = body(&mut ast, person_class, uses);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors(), "{:?}", messages(&analyzer));
    let age_sym = find_entry(&analyzer, &names, "age").unwrap();
    let field_leaf = ast.left(ast.left(ast.right(p_use)));
    assert_eq!(ast.sym_of(field_leaf), Some(age_sym));
}

#[test]
fn undeclared_object_field_reports_undeclared() {
    // class Person { int age; }  Person p;  ... p.height ...
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let person = names.intern("Person");
    let age = names.intern("age");
    let height = names.intern("height");
    let p = names.intern("p");

    let age_ty = int_type(&mut ast);
    let age_decl = decl(&mut ast, age, age_ty, NodeRef::DUMMY);
    let person_class = class(&mut ast, person, age_decl);

    let p_ty = class_type(&mut ast, person, &[]);
    let p_decl = decl(&mut ast, p, p_ty, NodeRef::DUMMY);
    let p_use = var_access(&mut ast, p, vec![Access::Field(height)]);

    let uses = body(&mut ast, p_decl, p_use);
    let root = body(&mut ast, person_class, uses);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol height: undeclared."]);
}

#[test]
fn index_counts_must_match_the_declared_dimension() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let m = names.intern("m");

    let ty = int_array_type(&mut ast, &[4, 4]);
    let m_decl = decl(&mut ast, m, ty, NodeRef::DUMMY);

    // m[1][2][3] — one too many.
    let (i1, i2, i3) = (ast.int_lit(1), ast.int_lit(2), ast.int_lit(3));
    let too_many = var_access(
        &mut ast,
        m,
        vec![Access::Index(i1), Access::Index(i2), Access::Index(i3)],
    );
    // m[1] — not enough.
    let j1 = ast.int_lit(1);
    let too_few = var_access(&mut ast, m, vec![Access::Index(j1)]);
    // m — arrays must be indexed.
    let bare = var(&mut ast, m);

    let uses = body(&mut ast, too_many, too_few);
    let uses = body(&mut ast, uses, bare);
    let root = body(&mut ast, m_decl, uses);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(
        messages(&analyzer),
        vec![
            "symbol m: has incorrect number of dimensions.",
            "symbol m: has incorrect number of dimensions.",
            "symbol m: has incorrect number of dimensions.",
        ]
    );
}

#[test]
fn length_is_the_only_pseudo_field_of_arrays() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let m = names.intern("m");
    let length = names.intern("length");
    let other = names.intern("other");

    let ty = int_array_type(&mut ast, &[4, 4]);
    let m_decl = decl(&mut ast, m, ty, NodeRef::DUMMY);

    // m.length is accepted.
    let ok = var_access(&mut ast, m, vec![Access::Field(length)]);
    // m.length.other is rejected.
    let chained = var_access(
        &mut ast,
        m,
        vec![Access::Field(length), Access::Field(other)],
    );

    let uses = body(&mut ast, ok, chained);
    let root = body(&mut ast, m_decl, uses);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol m: incorrect type usage."]);
}

#[test]
fn fields_of_class_typed_array_elements_resolve() {
    // class Person { int age; }  Person crowd[5];  ... crowd[1].age ...
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let person = names.intern("Person");
    let age = names.intern("age");
    let crowd = names.intern("crowd");

    let age_ty = int_type(&mut ast);
    let age_decl = decl(&mut ast, age, age_ty, NodeRef::DUMMY);
    let person_class = class(&mut ast, person, age_decl);

    let crowd_ty = class_type(&mut ast, person, &[5]);
    let crowd_decl = decl(&mut ast, crowd, crowd_ty, NodeRef::DUMMY);

    let index = ast.int_lit(1);
    let use_node = var_access(
        &mut ast,
        crowd,
        vec![Access::Index(index), Access::Field(age)],
    );

    let uses = body(&mut ast, crowd_decl, use_node);
    let root = body(&mut ast, person_class, uses);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors(), "{:?}", messages(&analyzer));
    let crowd_sym = find_entry(&analyzer, &names, "crowd").unwrap();
    assert_eq!(analyzer.symbols().kind_of(crowd_sym), Some(SymKind::Arr));
}

#[test]
fn indexing_a_class_outside_a_declaration_is_a_type_mismatch() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let c = names.intern("C");

    let class_c = class(&mut ast, c, NodeRef::DUMMY);
    let index = ast.int_lit(1);
    let misuse = var_access(&mut ast, c, vec![Access::Index(index)]);
    let root = body(&mut ast, class_c, misuse);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol C: incorrect type usage."]);
}

#[test]
fn member_access_on_a_routine_aborts() {
    // class A { method void p() {} method void q() { p.x; } }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let p = names.intern("p");
    let q = names.intern("q");
    let x = names.intern("x");

    let p_method = method(&mut ast, p, NodeRef::DUMMY, NodeRef::DUMMY, NodeRef::DUMMY);
    let misuse = var_access(&mut ast, p, vec![Access::Field(x)]);
    let q_body = body(&mut ast, NodeRef::DUMMY, misuse);
    let q_method = method(&mut ast, q, NodeRef::DUMMY, NodeRef::DUMMY, q_body);
    let class_body = body(&mut ast, p_method, q_method);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    let err = analyzer.analyze(&mut ast, &names, root).unwrap_err();

    assert_eq!(err, FatalError::RoutineMemberAccess("p".to_string()));
}

#[test]
fn plain_routine_call_resolves_the_callee() {
    // class A { method void p() {} method void q() { p(); } }
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let p = names.intern("p");
    let q = names.intern("q");

    let p_method = method(&mut ast, p, NodeRef::DUMMY, NodeRef::DUMMY, NodeRef::DUMMY);
    let callee = var(&mut ast, p);
    let call = ast.op(OpKind::RoutineCall, callee, NodeRef::DUMMY);
    let q_body = body(&mut ast, NodeRef::DUMMY, call);
    let q_method = method(&mut ast, q, NodeRef::DUMMY, NodeRef::DUMMY, q_body);
    let class_body = body(&mut ast, p_method, q_method);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert!(!analyzer.reporter().has_errors());
    let p_sym = find_entry(&analyzer, &names, "p").unwrap();
    assert_eq!(ast.sym_of(ast.left(callee)), Some(p_sym));
}

#[test]
fn undeclared_names_report_once_per_scope() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let ghost = names.intern("ghost");

    let first = var(&mut ast, ghost);
    let second = var(&mut ast, ghost);
    let root = body(&mut ast, first, second);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();

    assert_eq!(messages(&analyzer), vec!["symbol ghost: undeclared."]);
}

#[test]
fn declaration_list_entries_appear_in_source_order() {
    // int a, b, c; — a left-recursive DeclOp spine.
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("a");
    let b = names.intern("b");
    let c = names.intern("c");

    let mut spine = NodeRef::DUMMY;
    for name in [a, b, c] {
        let ty = int_type(&mut ast);
        let single = decl(&mut ast, name, ty, NodeRef::DUMMY);
        spine = ast.attach_leftmost(spine, single);
    }

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, spine).unwrap();

    assert!(!analyzer.reporter().has_errors());
    let declared: Vec<_> = analyzer
        .symbols()
        .entries()
        .skip(3) // predefined environment
        .filter_map(|sym| analyzer.symbols().name_of(sym))
        .collect();
    assert_eq!(declared, vec![a, b, c]);
}

#[test]
fn names_match_case_insensitively() {
    // class Point { int X; } ... declared `x` resolves the use of `X`.
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let point = names.intern("Point");
    let upper_x = names.intern("X");
    let lower_x = names.intern("x");
    assert_eq!(upper_x, lower_x);

    let ty = int_type(&mut ast);
    let x_decl = decl(&mut ast, upper_x, ty, NodeRef::DUMMY);
    let use_x = var(&mut ast, lower_x);
    let class_body = body(&mut ast, x_decl, use_x);
    let root = class(&mut ast, point, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();
    assert!(!analyzer.reporter().has_errors());
}

#[test]
fn a_second_pass_is_a_fixed_point() {
    // Re-analyzing an already-resolved, error-free tree must not report or
    // rewrite anything.
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let arr = names.intern("arr");
    let f = names.intern("f");
    let i = names.intern("i");

    let arr_ty = int_array_type(&mut ast, &[5]);
    let arr_decl = decl(&mut ast, arr, arr_ty, NodeRef::DUMMY);
    let index_expr = var(&mut ast, i);
    let arr_use = var_access(&mut ast, arr, vec![Access::Index(index_expr)]);
    let param_ty = int_type(&mut ast);
    let params = val_param(&mut ast, i, param_ty, NodeRef::DUMMY);
    let ret_ty = int_type(&mut ast);
    let f_method = method(&mut ast, f, params, ret_ty, arr_use);
    let class_body = body(&mut ast, arr_decl, f_method);
    let root = class(&mut ast, a, class_body);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();
    assert!(!analyzer.reporter().has_errors());
    let entries_after_first = analyzer.symbols().len();
    let nodes_after_first = ast.len();

    analyzer.analyze(&mut ast, &names, root).unwrap();
    assert!(!analyzer.reporter().has_errors());
    assert_eq!(analyzer.symbols().len(), entries_after_first);
    assert_eq!(ast.len(), nodes_after_first);
}

#[test]
fn unused_warning_is_off_by_default_and_gated() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let a = names.intern("A");
    let idle = names.intern("idle");

    let ty = int_type(&mut ast);
    let idle_decl = decl(&mut ast, idle, ty, NodeRef::DUMMY);
    let root = class(&mut ast, a, idle_decl);

    let mut quiet = Analyzer::new(&mut names).unwrap();
    quiet.analyze(&mut ast, &names, root).unwrap();
    assert!(!quiet.reporter().has_errors());

    // Same shape again, now with the warning enabled.
    let mut ast2 = Ast::new();
    let b = names.intern("B");
    let ty2 = int_type(&mut ast2);
    let idle_decl2 = decl(&mut ast2, idle, ty2, NodeRef::DUMMY);
    let root2 = class(&mut ast2, b, idle_decl2);

    let mut strict = Analyzer::with_options(&mut names, AnalyzerOptions::strict()).unwrap();
    strict.analyze(&mut ast2, &names, root2).unwrap();
    assert_eq!(
        messages(&strict),
        vec!["symbol idle: declared but never used."]
    );
}
