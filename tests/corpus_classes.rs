//! Class corpus: bodies, members, private names, static blocks

use ecma_parser::ast::{ClassElement, Expression, MethodKind, Statement};
use ecma_parser::parse;

fn assert_parses(source: &str) {
    let result = parse(source);
    assert!(
        result.is_ok(),
        "Failed to parse: {}\nError: {:?}",
        source,
        result.err()
    );
}

fn assert_fails(source: &str) {
    assert!(
        parse(source).is_err(),
        "Expected a parse error for: {}",
        source
    );
}

fn class_elements(source: &str) -> Vec<ClassElement> {
    let program = parse(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
    match program.body.into_iter().next() {
        Some(Statement::ClassDecl(c)) => c.body.body,
        other => panic!("Expected class declaration, got {:?}", other),
    }
}

// =============================================================================
// Shapes
// =============================================================================

#[test]
fn test_class_forms() {
    assert_parses("class C {}");
    assert_parses("class C extends B {}");
    assert_parses("class C extends mixin(A, B) {}");
    assert_parses("const C = class {};");
    assert_parses("const C = class Named {};");
    assert_fails("class {}");
}

#[test]
fn test_methods_and_kinds() {
    let elements = class_elements(
        "class C { constructor() {} m() {} get x() { return 1; } set x(v) {} static s() {} }",
    );
    assert_eq!(elements.len(), 5);
    let kinds: Vec<MethodKind> = elements
        .iter()
        .map(|e| match e {
            ClassElement::Method(m) => m.kind,
            other => panic!("Expected method, got {:?}", other),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            MethodKind::Constructor,
            MethodKind::Method,
            MethodKind::Get,
            MethodKind::Set,
            MethodKind::Method,
        ]
    );
    match &elements[4] {
        ClassElement::Method(m) => assert!(m.is_static),
        other => panic!("Expected method, got {:?}", other),
    }
}

#[test]
fn test_generator_and_async_methods() {
    assert_parses("class C { *gen() {} async m() {} async *both() {} }");
    assert_parses("class C { static *gen() {} static async m() {} }");
}

#[test]
fn test_modifier_words_as_names() {
    // static/async/get/set are contextual; alone they are plain member names
    assert_parses("class C { static() {} async() {} get() {} set() {} }");
    assert_parses("class C { static static() {} }");
    assert_parses("class C { get; set; async; static; }");
}

#[test]
fn test_computed_and_literal_keys() {
    assert_parses("class C { [computed()]() {} 'literal'() {} 42() {} }");
}

// =============================================================================
// Constructor rules
// =============================================================================

#[test]
fn test_constructor_rules() {
    assert_fails("class C { constructor() {} constructor() {} }");
    assert_fails("class C { *constructor() {} }");
    assert_fails("class C { async constructor() {} }");
    assert_fails("class C { get constructor() {} }");
    // a computed key is not the constructor
    assert_parses("class C { ['constructor']() {} constructor() {} }");
}

#[test]
fn test_static_prototype_rejected() {
    assert_fails("class C { static prototype() {} }");
    assert_fails("class C { static prototype = 1; }");
    assert_parses("class C { prototype() {} }");
}

#[test]
fn test_super_rules() {
    assert_parses("class C extends B { constructor() { super(); } }");
    assert_parses("class C extends B { m() { return super.x; } }");
    assert_fails("class C { constructor() { super(); } }");
    assert_fails("super.x;");
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn test_fields() {
    let elements = class_elements("class C { x; y = 1; static z = 2; }");
    assert_eq!(elements.len(), 3);
    match &elements[1] {
        ClassElement::Property(p) => assert!(p.value.is_some()),
        other => panic!("Expected field, got {:?}", other),
    }
    match &elements[2] {
        ClassElement::Property(p) => assert!(p.is_static),
        other => panic!("Expected field, got {:?}", other),
    }
}

#[test]
fn test_field_name_rules() {
    assert_fails("class C { constructor = 1; }");
    assert_fails("class C { 'constructor'; }");
}

#[test]
fn test_field_initializer_restrictions() {
    assert_fails("class C { x = arguments; }");
    assert_parses("class C { m() { return arguments; } }");
}

// =============================================================================
// Private names
// =============================================================================

#[test]
fn test_private_members() {
    assert_parses("class C { #x; method() { return this.#x; } }");
    assert_parses("class C { #m() {} call() { return this.#m(); } }");
    assert_parses("class C { static #s = 1; }");
    assert_parses("class C { get #x() { return 1; } set #x(v) {} }");
}

#[test]
fn test_private_forward_reference() {
    assert_parses("class C { m() { return this.#later; } #later; }");
}

#[test]
fn test_private_undeclared() {
    assert_fails("class C { method() { return this.#x; } }");
    assert_fails("this.#x;");
}

#[test]
fn test_private_resolution_through_nesting() {
    assert_parses("class A { #x; m() { class B { n(o) { return o.#x; } } } }");
    assert_fails("class A { m() { class B { n(o) { return o.#x; } } } }");
}

#[test]
fn test_private_duplicates() {
    assert_fails("class C { #x; #x; }");
    assert_fails("class C { #m() {} #m() {} }");
    assert_fails("class C { get #x() {} get #x() {} }");
    // a getter/setter pair shares the slot; a third declaration conflicts
    assert_parses("class C { get #x() {} set #x(v) {} }");
    assert_fails("class C { get #x() {} set #x(v) {} #x; }");
    // staticness must agree for the pair
    assert_fails("class C { get #x() {} static set #x(v) {} }");
}

#[test]
fn test_private_constructor_name_rejected() {
    assert_fails("class C { #constructor; }");
}

#[test]
fn test_private_in_operator() {
    assert_parses("class C { #x; m(o) { return #x in o; } }");
    assert_fails("#x in o;");
}

#[test]
fn test_delete_private_rejected() {
    assert_fails("class C { #x; m() { delete this.#x; } }");
}

// =============================================================================
// Static blocks
// =============================================================================

#[test]
fn test_static_blocks() {
    let elements = class_elements("class C { static { init(); } }");
    assert!(matches!(elements[0], ClassElement::StaticBlock { .. }));
    assert_parses("class C { static { let x = 1; use(x); } }");
    assert_fails("class C { static { return; } }");
    assert_fails("class C { static { arguments; } }");
}

#[test]
fn test_new_target() {
    assert_parses("function f() { return new.target; }");
    assert_parses("class C { static { new.target; } }");
    assert_fails("new.target;");
}

#[test]
fn test_class_is_strict() {
    // class bodies are strict even in sloppy surroundings
    assert_fails("class C { m() { with (x) {} } }");
    assert_fails("class C { m() { var let = 1; } }");
}

#[test]
fn test_class_expression_structure() {
    let program = parse("const C = class extends B { m() {} };").unwrap();
    let Statement::VariableDecl(d) = &program.body[0] else {
        panic!("Expected declaration");
    };
    match d.declarations[0].init.as_ref().unwrap() {
        Expression::Class(c) => {
            assert!(c.id.is_none());
            assert!(c.super_class.is_some());
            assert_eq!(c.body.body.len(), 1);
        }
        other => panic!("Expected class expression, got {:?}", other),
    }
}
