use crate::ast::{Ast, NodeRef};
use crate::diagnostic::{FatalError, Reporter};
use crate::names::NameTable;
use crate::symtab::{
    AttrKind, AttrValue, SymKind, SymbolTable, SymbolTableDisplay, STACK_CAPACITY,
};

fn setup() -> (NameTable, SymbolTable, Reporter) {
    (NameTable::new(), SymbolTable::new(), Reporter::new())
}

#[test]
fn init_installs_the_predefined_environment() {
    let (mut names, mut table, mut diag) = setup();
    table.init(&mut names, &mut diag).unwrap();

    assert_eq!(table.len(), 3);
    let mut entries = table.entries();
    let system = entries.next().unwrap();
    let readln = entries.next().unwrap();
    let println = entries.next().unwrap();

    assert_eq!(names.resolve(table.name_of(system).unwrap()), "system");
    assert_eq!(table.kind_of(system), Some(SymKind::Class));
    assert_eq!(table.nest_of(system), 0);
    assert_eq!(
        table.get_attr(system, AttrKind::Predefined, &mut diag),
        Some(AttrValue::Bool(true))
    );

    // The predefined procedures sit one level inside `system`, so member
    // lookup through the class finds them.
    for sym in [readln, println] {
        assert_eq!(table.kind_of(sym), Some(SymKind::Proc));
        assert_eq!(table.nest_of(sym), 1);
    }
    assert!(!diag.has_errors());
}

#[test]
fn insert_sets_name_and_nest() {
    let (mut names, mut table, mut diag) = setup();
    let x = names.intern("x");

    table.open_block(&mut diag).unwrap();
    let sym = table.insert_entry(x, &names, &mut diag).unwrap().unwrap();
    assert!(table.has_attr(sym, AttrKind::Name));
    assert!(table.has_attr(sym, AttrKind::Nest));
    assert_eq!(table.name_of(sym), Some(x));
    assert_eq!(table.nest_of(sym), 1);
}

#[test]
fn redeclaration_in_the_same_scope_is_reported() {
    let (mut names, mut table, mut diag) = setup();
    let x = names.intern("x");

    let first = table.insert_entry(x, &names, &mut diag).unwrap();
    assert!(first.is_some());
    let second = table.insert_entry(x, &names, &mut diag).unwrap();
    assert!(second.is_none());
    assert_eq!(table.len(), 1);
    assert_eq!(diag.diagnostics().len(), 1);
    assert_eq!(diag.diagnostics()[0].message, "symbol x: redeclared.");
}

#[test]
fn shadowing_in_an_inner_scope_is_allowed() {
    let (mut names, mut table, mut diag) = setup();
    let x = names.intern("x");

    let outer = table.insert_entry(x, &names, &mut diag).unwrap().unwrap();
    table.open_block(&mut diag).unwrap();
    let inner = table.insert_entry(x, &names, &mut diag).unwrap().unwrap();
    assert_ne!(outer, inner);

    // Innermost binding wins while the block is open.
    assert_eq!(table.lookup(x, &names, &mut diag).unwrap(), Some(inner));
    table.close_block(&names, &mut diag);
    assert_eq!(table.lookup(x, &names, &mut diag).unwrap(), Some(outer));
    assert!(!diag.has_errors());
}

#[test]
fn close_block_restores_the_stack() {
    let (mut names, mut table, mut diag) = setup();
    let a = names.intern("a");
    let b = names.intern("b");

    table.insert_entry(a, &names, &mut diag).unwrap();
    let depth_before = table.stack_depth();
    let nesting_before = table.nesting();

    table.open_block(&mut diag).unwrap();
    table.insert_entry(b, &names, &mut diag).unwrap();
    table.close_block(&names, &mut diag);

    assert_eq!(table.stack_depth(), depth_before);
    assert_eq!(table.nesting(), nesting_before);
    // The entry itself is permanent; only its visibility ended.
    assert_eq!(table.len(), 2);
    assert_eq!(table.lookup_here(b), None);
}

#[test]
fn lookup_miss_is_reported_once_per_scope() {
    let (mut names, mut table, mut diag) = setup();
    let ghost = names.intern("ghost");

    assert_eq!(table.lookup(ghost, &names, &mut diag).unwrap(), None);
    assert_eq!(diag.diagnostics().len(), 1);
    assert_eq!(diag.diagnostics()[0].message, "symbol ghost: undeclared.");

    // The dummy frame absorbs the second use silently.
    assert_eq!(table.lookup(ghost, &names, &mut diag).unwrap(), None);
    assert_eq!(diag.diagnostics().len(), 1);
}

#[test]
fn lookup_here_ignores_dummy_frames() {
    let (mut names, mut table, mut diag) = setup();
    let ghost = names.intern("ghost");

    table.lookup(ghost, &names, &mut diag).unwrap();
    assert_eq!(table.lookup_here(ghost), None);
    // A real declaration after the dummy still succeeds.
    assert!(table.insert_entry(ghost, &names, &mut diag).unwrap().is_some());
}

#[test]
fn attributes_overwrite_and_iterate_sorted() {
    let (mut names, mut table, mut diag) = setup();
    let x = names.intern("x");
    let sym = table.insert_entry(x, &names, &mut diag).unwrap().unwrap();

    // Insert out of key order; reads go through the sorted list.
    table
        .set_attr(sym, AttrKind::ArgNum, AttrValue::Int(2), &mut diag)
        .unwrap();
    table
        .set_attr(sym, AttrKind::Kind, AttrValue::Kind(SymKind::Func), &mut diag)
        .unwrap();
    table
        .set_attr(sym, AttrKind::Dimen, AttrValue::Int(3), &mut diag)
        .unwrap();
    assert_eq!(table.kind_of(sym), Some(SymKind::Func));
    assert_eq!(table.dimen_of(sym), 3);
    assert_eq!(
        table.get_attr(sym, AttrKind::ArgNum, &mut diag),
        Some(AttrValue::Int(2))
    );

    table
        .set_attr(sym, AttrKind::Dimen, AttrValue::Int(5), &mut diag)
        .unwrap();
    assert_eq!(table.dimen_of(sym), 5);
    assert!(!diag.has_errors());
}

#[test]
fn fetching_a_missing_attribute_is_diagnosed() {
    let (mut names, mut table, mut diag) = setup();
    let x = names.intern("x");
    let sym = table.insert_entry(x, &names, &mut diag).unwrap().unwrap();
    assert!(!diag.has_errors());

    assert_eq!(table.get_attr(sym, AttrKind::Offset, &mut diag), None);
    let diags = diag.diagnostics();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("Offset"), "got {:?}", diags[0]);

    // Presence probes stay silent.
    assert!(!table.has_attr(sym, AttrKind::Offset));
    assert_eq!(diag.diagnostics().len(), 1);
}

#[test]
fn opening_too_many_scopes_overflows_the_stack() {
    let mut table = SymbolTable::new();
    let mut diag = Reporter::new();
    for _ in 0..STACK_CAPACITY {
        table.open_block(&mut diag).unwrap();
    }
    let err = table.open_block(&mut diag).unwrap_err();
    assert_eq!(err, FatalError::StackOverflow);
}

#[test]
fn filling_the_table_overflows_at_the_limit() {
    let (mut names, mut table, mut diag) = setup();
    let mut inserted = 0usize;
    let err = 'outer: loop {
        if let Err(e) = table.open_block(&mut diag) {
            break 'outer e;
        }
        for _ in 0..50 {
            let name = names.intern(&format!("sym{}", inserted));
            match table.insert_entry(name, &names, &mut diag) {
                Ok(Some(_)) => inserted += 1,
                Ok(None) => panic!("unexpected redeclaration"),
                Err(e) => break 'outer e,
            }
        }
        table.close_block(&names, &mut diag);
    };
    assert_eq!(err, FatalError::SymbolTableOverflow);
    assert_eq!(inserted, 500);
}

#[test]
fn exhausting_the_attribute_pool_overflows() {
    let (mut names, mut table, mut diag) = setup();
    let mut i = 0usize;
    let err = 'outer: loop {
        if let Err(e) = table.open_block(&mut diag) {
            break 'outer e;
        }
        for _ in 0..50 {
            let name = names.intern(&format!("attr{}", i));
            i += 1;
            let sym = match table.insert_entry(name, &names, &mut diag) {
                Ok(Some(sym)) => sym,
                Ok(None) => continue,
                Err(e) => break 'outer e,
            };
            let extra = [
                (AttrKind::Tree, AttrValue::Node(NodeRef::DUMMY)),
                (AttrKind::Predefined, AttrValue::Bool(false)),
                (AttrKind::Kind, AttrValue::Kind(SymKind::Var)),
                (AttrKind::Type, AttrValue::Node(NodeRef::DUMMY)),
                (AttrKind::Value, AttrValue::Int(0)),
                (AttrKind::Offset, AttrValue::Int(4)),
                (AttrKind::Dimen, AttrValue::Int(1)),
                (AttrKind::ArgNum, AttrValue::Int(0)),
            ];
            for (kind, value) in extra {
                if let Err(e) = table.set_attr(sym, kind, value, &mut diag) {
                    break 'outer e;
                }
            }
        }
        table.close_block(&names, &mut diag);
    };
    assert_eq!(err, FatalError::AttributeOverflow);
}

#[test]
fn unused_bindings_warn_when_enabled() {
    let mut names = NameTable::new();
    let mut table = SymbolTable::with_unused_warnings(true);
    let mut diag = Reporter::new();
    let idle = names.intern("idle");
    let busy = names.intern("busy");

    table.open_block(&mut diag).unwrap();
    table.insert_entry(idle, &names, &mut diag).unwrap();
    table.insert_entry(busy, &names, &mut diag).unwrap();
    table.lookup(busy, &names, &mut diag).unwrap();
    table.close_block(&names, &mut diag);

    let messages: Vec<_> = diag.diagnostics().iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["symbol idle: declared but never used."]);
}

#[test]
fn kind_strings_are_pinned() {
    let expected = [
        (SymKind::Const, "constant"),
        (SymKind::Var, "variable"),
        (SymKind::FuncForward, "funcforw"),
        (SymKind::Func, "function"),
        (SymKind::RefArg, "ref_arg"),
        (SymKind::ValueArg, "val_arg"),
        (SymKind::Field, "field"),
        (SymKind::TypeDef, "typedef"),
        (SymKind::ProcForward, "procforw"),
        (SymKind::Proc, "procedure"),
        (SymKind::Class, "class"),
        (SymKind::Arr, "array"),
    ];
    for (kind, text) in expected {
        assert_eq!(kind.to_string(), text);
    }
}

#[test]
fn table_dump_layout() {
    let (mut names, mut table, mut diag) = setup();
    table.init(&mut names, &mut diag).unwrap();
    let ast = Ast::new();

    let dump = SymbolTableDisplay {
        table: &table,
        names: &names,
        ast: &ast,
    }
    .to_string();

    assert!(dump.starts_with(
        "********************************Symbol Table************************************"
    ));
    assert!(dump.contains(
        "          Name Nest-Level  Tree-Node Predefined        Kind       Type      Value  Offset Dimension   Argnum"
    ));

    // Row layout: three-wide index, then eleven-wide right-aligned columns
    // with blanks for unset attributes.
    let system_row = format!(
        "{:>3}{:>11}{:>11}{:>11}{:>11}{:>11}",
        1, "system", 0, " ", "yes", "class"
    );
    let readln_row = format!(
        "{:>3}{:>11}{:>11}{:>11}{:>11}{:>11}",
        2, "readln", 1, " ", "yes", "procedure"
    );
    assert!(dump.contains(&system_row), "dump was:\n{}", dump);
    assert!(dump.contains(&readln_row), "dump was:\n{}", dump);
}
