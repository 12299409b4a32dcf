use treelox::{
    environment::SharedEnvironment,
    value::{error::RuntimeErrorKind, LoxValue},
};

fn number(value: &LoxValue) -> f64 {
    match value {
        LoxValue::Number(v) => *v,
        other => panic!("expected a number, got {other}"),
    }
}

#[test]
fn define_then_get() {
    let environment = SharedEnvironment::new();
    environment.define("a", LoxValue::Number(1.0));
    assert_eq!(number(&environment.get("a").unwrap()), 1.0);
}

#[test]
fn define_replaces_binding_in_same_frame() {
    let environment = SharedEnvironment::new();
    environment.define("a", LoxValue::Number(1.0));
    environment.define("a", LoxValue::Number(2.0));
    assert_eq!(number(&environment.get("a").unwrap()), 2.0);
}

#[test]
fn get_walks_to_enclosing_frames() {
    let outer = SharedEnvironment::new();
    outer.define("a", LoxValue::Number(1.0));
    let inner = outer.new_scope().new_scope();
    assert_eq!(number(&inner.get("a").unwrap()), 1.0);
}

#[test]
fn missing_name_is_undefined_variable() {
    let environment = SharedEnvironment::new().new_scope();
    let error = environment.get("missing").unwrap_err();
    assert!(matches!(error, RuntimeErrorKind::UndefinedVariable(ref name) if name.as_str() == "missing"));
    let error = environment
        .assign("missing", LoxValue::Nil)
        .unwrap_err();
    assert!(matches!(error, RuntimeErrorKind::UndefinedVariable(_)));
}

#[test]
fn assign_updates_nearest_binding() {
    let outer = SharedEnvironment::new();
    outer.define("a", LoxValue::Number(1.0));
    let middle = outer.new_scope();
    middle.define("a", LoxValue::Number(2.0));
    let inner = middle.new_scope();

    inner.assign("a", LoxValue::Number(3.0)).unwrap();
    assert_eq!(number(&middle.get("a").unwrap()), 3.0);
    assert_eq!(number(&outer.get("a").unwrap()), 1.0);
}

#[test]
fn get_at_reads_exact_frame() {
    let outer = SharedEnvironment::new();
    outer.define("a", LoxValue::Number(1.0));
    let inner = outer.new_scope();
    inner.define("a", LoxValue::Number(2.0));

    assert_eq!(number(&inner.get_at(0, "a").unwrap()), 2.0);
    assert_eq!(number(&inner.get_at(1, "a").unwrap()), 1.0);
    // Does not fall back to other frames.
    let empty = inner.new_scope();
    assert!(empty.get_at(0, "a").is_err());
}

#[test]
fn assign_at_writes_exact_frame() {
    let outer = SharedEnvironment::new();
    outer.define("a", LoxValue::Number(1.0));
    let inner = outer.new_scope();
    inner.define("a", LoxValue::Number(2.0));

    inner.assign_at(1, "a", LoxValue::Number(10.0)).unwrap();
    assert_eq!(number(&outer.get("a").unwrap()), 10.0);
    assert_eq!(number(&inner.get("a").unwrap()), 2.0);
}

#[test]
fn ancestor_walks_parent_links() {
    let root = SharedEnvironment::new();
    let child = root.new_scope();
    let grandchild = child.new_scope();

    assert!(grandchild.ancestor(0).unwrap().is_same_frame(&grandchild));
    assert!(grandchild.ancestor(2).unwrap().is_same_frame(&root));
    assert!(grandchild.ancestor(3).is_none());
}

#[test]
fn clones_share_one_frame() {
    let environment = SharedEnvironment::new();
    let alias = environment.clone();
    alias.define("shared", LoxValue::Bool(true));
    assert!(environment.get("shared").unwrap().is_truthy());
    assert!(alias.is_same_frame(&environment));
}

#[test]
fn globals_provide_clock() {
    let globals = SharedEnvironment::globals();
    let clock = globals.get("clock").unwrap();
    assert_eq!(clock.to_string(), "<native fn>");
    assert_eq!(clock.as_callable().map(|c| c.arity()), Some(0));
}
