//! End-to-end front-end tests: build a tree the way the parser would,
//! analyze it, and inspect the two outputs a code generator consumes —
//! the rewritten tree and the symbol-table dump.

use mjc::ast::{Ast, NodeRef, OpKind, TreeDisplay};
use mjc::names::NameTable;
use mjc::semantic::Analyzer;
use mjc::symtab::{SymKind, SymbolTableDisplay};

/// `class C { int x; method int get() { return x; } }`
fn build_sample(names: &mut NameTable, ast: &mut Ast) -> NodeRef {
    let c = names.intern("C");
    let x = names.intern("x");
    let get = names.intern("get");

    // int x;
    let int_leaf = ast.int_type();
    let x_ty = ast.op(OpKind::TypeId, int_leaf, NodeRef::DUMMY);
    let x_leaf = ast.id(x);
    let no_init = ast.op(OpKind::Comma, x_ty, NodeRef::DUMMY);
    let declarator = ast.op(OpKind::Comma, x_leaf, no_init);
    let x_decl = ast.op(OpKind::Decl, NodeRef::DUMMY, declarator);

    // method int get() { return x; }
    let ret_int = ast.int_type();
    let ret_ty = ast.op(OpKind::TypeId, ret_int, NodeRef::DUMMY);
    let spec = ast.op(OpKind::Spec, NodeRef::DUMMY, ret_ty);
    let get_leaf = ast.id(get);
    let head = ast.op(OpKind::Head, get_leaf, spec);
    let x_use_leaf = ast.id(x);
    let x_use = ast.op(OpKind::Var, x_use_leaf, NodeRef::DUMMY);
    let ret_stmt = ast.op(OpKind::Return, x_use, NodeRef::DUMMY);
    let stmt = ast.op(OpKind::Stmt, NodeRef::DUMMY, ret_stmt);
    let method_body = ast.op(OpKind::Body, NodeRef::DUMMY, stmt);
    let get_method = ast.op(OpKind::Method, head, method_body);

    let class_body = ast.op(OpKind::Body, x_decl, get_method);
    let c_leaf = ast.id(c);
    ast.op(OpKind::ClassDef, class_body, c_leaf)
}

#[test]
fn analysis_resolves_every_name_position() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let root = build_sample(&mut names, &mut ast);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();
    assert!(!analyzer.reporter().has_errors());

    // Class name, member names, and the variable use are all symbol
    // references now; no identifier leaf remains in a visited position.
    assert!(ast.sym_of(ast.right(root)).is_some());
    let class_body = ast.left(root);
    let declarator = ast.right(ast.left(class_body));
    assert!(ast.sym_of(ast.left(declarator)).is_some());
    let get_method = ast.right(class_body);
    assert!(ast.sym_of(ast.left(ast.left(get_method))).is_some());
}

#[test]
fn symbol_table_dump_matches_the_documented_layout() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let root = build_sample(&mut names, &mut ast);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();
    let (symbols, reporter) = analyzer.finish();
    assert!(!reporter.has_errors());

    let dump = SymbolTableDisplay {
        table: &symbols,
        names: &names,
        ast: &ast,
    }
    .to_string();

    assert!(dump.starts_with(
        "********************************Symbol Table************************************"
    ));
    // One row per entry, insertion order: the predefined environment first,
    // then the program's own declarations.
    let expected_names = ["system", "readln", "println", "C", "x", "get"];
    let expected_kinds = ["class", "procedure", "procedure", "class", "variable", "function"];
    let rows: Vec<&str> = dump.lines().skip(4).collect();
    assert_eq!(rows.len(), expected_names.len());
    for ((row, name), kind) in rows.iter().zip(expected_names).zip(expected_kinds) {
        assert!(row.contains(name), "row {:?} missing {:?}", row, name);
        assert!(row.contains(kind), "row {:?} missing {:?}", row, kind);
    }

    // Predefined entries say so; user entries carry no Predefined column.
    assert!(dump.lines().nth(4).unwrap().contains("yes"));
    assert!(!dump.lines().nth(7).unwrap().contains("yes"));
}

#[test]
fn tree_dump_shows_symbol_references_after_analysis() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let root = build_sample(&mut names, &mut ast);

    let before = TreeDisplay {
        ast: &ast,
        names: &names,
        symbols: None,
        root,
    }
    .to_string();
    assert!(before.contains("[IDNode,"));
    assert!(!before.contains("[STNode,"));

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, root).unwrap();
    let (symbols, _) = analyzer.finish();

    let after = TreeDisplay {
        ast: &ast,
        names: &names,
        symbols: Some(&symbols),
        root,
    }
    .to_string();
    assert!(after.starts_with("************* SYNTAX TREE PRINTOUT ***********"));
    assert!(after.contains("[STNode,"));
    assert!(!after.contains("[IDNode,"));
    // Resolved references render the declared spelling.
    assert!(after.contains("\"C\""));
    assert!(after.contains("\"get\""));
}

#[test]
fn diagnostics_carry_the_tracked_line() {
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let ghost = names.intern("ghost");
    let leaf = ast.id(ghost);
    let use_node = ast.op(OpKind::Var, leaf, NodeRef::DUMMY);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.reporter_mut().set_line(12);
    analyzer.analyze(&mut ast, &names, use_node).unwrap();

    let diags = analyzer.reporter().diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].line, 12);
    assert_eq!(diags[0].message, "symbol ghost: undeclared.");
}

#[test]
fn the_predefined_system_class_exposes_its_procedures() {
    // system.println is a member access through the predefined class.
    let mut names = NameTable::new();
    let mut ast = Ast::new();
    let system = names.intern("system");
    let println = names.intern("println");

    let field_leaf = ast.id(println);
    let field = ast.op(OpKind::Field, field_leaf, NodeRef::DUMMY);
    let select = ast.op(OpKind::Select, field, NodeRef::DUMMY);
    let base = ast.id(system);
    let callee = ast.op(OpKind::Var, base, select);
    let call = ast.op(OpKind::RoutineCall, callee, NodeRef::DUMMY);

    let mut analyzer = Analyzer::new(&mut names).unwrap();
    analyzer.analyze(&mut ast, &names, call).unwrap();

    assert!(!analyzer.reporter().has_errors());
    let symbols = analyzer.symbols();
    let resolved = ast.sym_of(field_leaf).unwrap();
    assert_eq!(symbols.kind_of(resolved), Some(SymKind::Proc));
    assert_eq!(
        names.resolve(symbols.name_of(resolved).unwrap()),
        "println"
    );
}
