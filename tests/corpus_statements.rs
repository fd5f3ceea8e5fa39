//! Statement corpus: control flow, declarations, labels, strict mode

use ecma_parser::ast::{
    Expression, ForInit, ForTarget, Pattern, Statement, VariableKind,
};
use ecma_parser::{parse, parse_with, Options};

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

fn first_statement(source: &str) -> Statement {
    let program = parse(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
    program
        .body
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("Empty program for {}", source))
}

// =============================================================================
// Simple statements
// =============================================================================

#[test]
fn test_empty_and_block() {
    assert!(matches!(first_statement(";"), Statement::Empty { .. }));
    match first_statement("{ a; b; }") {
        Statement::Block(block) => assert_eq!(block.body.len(), 2),
        other => panic!("Expected block, got {:?}", other),
    }
}

#[test]
fn test_debugger() {
    assert!(matches!(
        first_statement("debugger;"),
        Statement::Debugger { .. }
    ));
}

#[test]
fn test_if_else() {
    match first_statement("if (a) b; else c;") {
        Statement::If { alternate, .. } => assert!(alternate.is_some()),
        other => panic!("Expected if, got {:?}", other),
    }
    assert_parses("if (a) b;");
    assert_parses("if (a) { b; } else if (c) { d; }");
}

#[test]
fn test_throw() {
    assert_parses("throw new Error('x');");
    assert_fails("throw\nx;");
}

// =============================================================================
// Loops
// =============================================================================

#[test]
fn test_while_and_do_while() {
    assert!(matches!(
        first_statement("while (a) b;"),
        Statement::While { .. }
    ));
    assert!(matches!(
        first_statement("do a; while (b);"),
        Statement::DoWhile { .. }
    ));
    assert_parses("do a; while (b)");
}

#[test]
fn test_for_classic() {
    match first_statement("for (let i = 0; i < 10; i++) body();") {
        Statement::For {
            init, test, update, ..
        } => {
            assert!(matches!(init, Some(ForInit::Declaration(_))));
            assert!(test.is_some());
            assert!(update.is_some());
        }
        other => panic!("Expected for, got {:?}", other),
    }
    assert_parses("for (;;) break;");
    assert_parses("for (i = 0; ; ) break;");
}

#[test]
fn test_for_in() {
    match first_statement("for (var k in obj) use(k);") {
        Statement::ForIn { left, .. } => {
            assert!(matches!(left, ForTarget::Declaration(_)));
        }
        other => panic!("Expected for-in, got {:?}", other),
    }
    assert_parses("for (k in obj) use(k);");
    assert_parses("for ([a, b] in obj) {}");
}

#[test]
fn test_for_of() {
    match first_statement("for (const x of xs) x;") {
        Statement::ForOf { is_await, left, .. } => {
            assert!(!is_await);
            match left {
                ForTarget::Declaration(d) => {
                    assert_eq!(d.kind, VariableKind::Const);
                    assert_eq!(d.declarations.len(), 1);
                    assert!(d.declarations[0].init.is_none());
                }
                other => panic!("Expected declaration, got {:?}", other),
            }
        }
        other => panic!("Expected for-of, got {:?}", other),
    }
    assert_parses("for ({a, b} of xs) {}");
}

#[test]
fn test_for_of_rejects_let_target() {
    assert_fails("for (let of xs) {}");
}

#[test]
fn test_for_in_of_initializers() {
    // only the legacy sloppy var-identifier form keeps an initializer
    assert_parses("for (var i = 0 in obj) {}");
    assert_fails("for (let i = 0 in obj) {}");
    assert_fails("for (var i = 0 of xs) {}");
    assert_fails("'use strict'; for (var i = 0 in obj) {}");
}

#[test]
fn test_for_await() {
    assert_parses("async function f() { for await (const x of xs) {} }");
    assert_fails("async function f() { for await (const x in xs) {} }");
    assert_fails("function f() { for await (const x of xs) {} }");
}

// =============================================================================
// Labels, break, continue
// =============================================================================

#[test]
fn test_labeled_statements() {
    match first_statement("outer: while (a) { break outer; }") {
        Statement::Labeled { label, .. } => assert_eq!(label.name, "outer"),
        other => panic!("Expected labeled, got {:?}", other),
    }
    assert_parses("outer: while (a) { continue outer; }");
    // every label stacked on the loop is a valid continue target
    assert_parses("a: b: while (x) { continue a; continue b; }");
}

#[test]
fn test_unsyntactic_break_continue() {
    assert_fails("break;");
    assert_fails("continue;");
    assert_fails("l: { continue l; }");
    assert_parses("l: { break l; }");
    assert_fails("while (a) { break missing; }");
}

#[test]
fn test_duplicate_label() {
    assert_fails("l: l: while (a) {}");
}

// =============================================================================
// Switch
// =============================================================================

#[test]
fn test_switch() {
    match first_statement("switch (x) { case 1: a; break; default: b; }") {
        Statement::Switch { cases, .. } => {
            assert_eq!(cases.len(), 2);
            assert!(cases[0].test.is_some());
            assert!(cases[1].test.is_none());
            assert_eq!(cases[0].consequent.len(), 2);
        }
        other => panic!("Expected switch, got {:?}", other),
    }
    assert_fails("switch (x) { default: a; default: b; }");
    assert_fails("switch (x) { a; }");
}

// =============================================================================
// Try
// =============================================================================

#[test]
fn test_try_forms() {
    match first_statement("try { a; } catch (e) { b; } finally { c; }") {
        Statement::Try {
            handler, finalizer, ..
        } => {
            assert!(handler.is_some());
            assert!(finalizer.is_some());
        }
        other => panic!("Expected try, got {:?}", other),
    }
    assert_parses("try { a; } catch { b; }");
    assert_parses("try { a; } finally { b; }");
    assert_parses("try { a; } catch ({message}) { b; }");
    assert_fails("try { a; }");
}

#[test]
fn test_simple_catch_allows_var_shadow() {
    assert_parses("try {} catch (e) { var e; }");
    assert_fails("try {} catch ([e]) { var e; }");
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn test_variable_declarations() {
    match first_statement("let a = 1, b;") {
        Statement::VariableDecl(d) => {
            assert_eq!(d.kind, VariableKind::Let);
            assert_eq!(d.declarations.len(), 2);
            assert!(d.declarations[0].init.is_some());
            assert!(d.declarations[1].init.is_none());
        }
        other => panic!("Expected declaration, got {:?}", other),
    }
    assert_parses("var x;");
    assert_parses("const c = 1;");
}

#[test]
fn test_const_requires_initializer() {
    assert_fails("const c;");
}

#[test]
fn test_destructuring_declarations() {
    match first_statement("let {a, b: [c], ...rest} = obj;") {
        Statement::VariableDecl(d) => {
            assert!(matches!(d.declarations[0].id, Pattern::Object { .. }));
        }
        other => panic!("Expected declaration, got {:?}", other),
    }
    assert_parses("let [a, , b = 1, ...rest] = xs;");
    assert_fails("let {a};");
    assert_fails("let [a];");
}

#[test]
fn test_let_disambiguation() {
    // `let` stays an identifier when nothing declaration-like follows
    assert_parses("let = 1;");
    assert_parses("let;");
    assert_parses("let + 1;");
    assert!(matches!(
        first_statement("let [a] = b;"),
        Statement::VariableDecl(_)
    ));
    assert!(matches!(
        first_statement("let {a} = b;"),
        Statement::VariableDecl(_)
    ));
}

#[test]
fn test_duplicate_bindings() {
    assert_fails("let x; let x;");
    assert_fails("let x; var x;");
    assert_fails("var x; let x;");
    assert_parses("var x; var x;");
    assert_parses("let x; { let x; }");
}

#[test]
fn test_function_declarations() {
    assert!(matches!(
        first_statement("function f(a, b) { return a + b; }"),
        Statement::FunctionDecl(f) if !f.is_generator && !f.is_async
    ));
    assert!(matches!(
        first_statement("function* g() {}"),
        Statement::FunctionDecl(f) if f.is_generator
    ));
    assert!(matches!(
        first_statement("async function f() {}"),
        Statement::FunctionDecl(f) if f.is_async
    ));
    assert!(matches!(
        first_statement("async function* f() {}"),
        Statement::FunctionDecl(f) if f.is_async && f.is_generator
    ));
}

#[test]
fn test_async_needs_same_line_function() {
    // a newline between `async` and `function` splits them apart
    let program = parse("async\nfunction f() {}").unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_function_as_bare_body() {
    assert_parses("if (a) function f() {}");
    assert_parses("l: function f() {}");
    assert_fails("'use strict'; if (a) function f() {}");
    assert_fails("while (a) function f() {}");
    assert_fails("if (a) class C {}");
}

#[test]
fn test_parameter_rules() {
    assert_parses("function f(a, a) {}");
    assert_fails("'use strict'; function f(a, a) {}");
    assert_fails("function f(a, [a]) {}");
    assert_parses("function f(a) { 'use strict'; }");
    assert_fails("function f(a = 1) { 'use strict'; }");
    assert_parses("function f(a = 1, {b}, ...c) {}");
}

// =============================================================================
// Return
// =============================================================================

#[test]
fn test_return() {
    assert_parses("function f() { return; }");
    assert_parses("function f() { return 1; }");
    assert_fails("return 1;");
    let options = Options {
        allow_return_outside_function: true,
        ..Options::default()
    };
    assert!(parse_with("return 1;", options).is_ok());
}

#[test]
fn test_return_asi() {
    let program = parse("function f() { return\n1; }").unwrap();
    let Statement::FunctionDecl(f) = &program.body[0] else {
        panic!("Expected function");
    };
    assert_eq!(f.body.body.len(), 2);
    assert!(matches!(f.body.body[0], Statement::Return { argument: None, .. }));
}

// =============================================================================
// Strict mode and directives
// =============================================================================

#[test]
fn test_directive_prologue() {
    let program = parse("'use strict';\n'other';\nx;").unwrap();
    match &program.body[0] {
        Statement::Expression { directive, .. } => {
            assert_eq!(directive.as_deref(), Some("use strict"));
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
    match &program.body[1] {
        Statement::Expression { directive, .. } => {
            assert_eq!(directive.as_deref(), Some("other"));
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
    match &program.body[2] {
        Statement::Expression { directive, .. } => assert!(directive.is_none()),
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_with_statement() {
    assert_parses("with (a) b;");
    assert_fails("'use strict'; with (a) b;");
}

#[test]
fn test_function_body_strictness() {
    assert_fails("function f() { 'use strict'; with (x) {} }");
    assert_parses("function f() { with (x) {} }");
}

#[test]
fn test_strict_reserved_words() {
    assert_fails("'use strict'; var let = 1;");
    assert_fails("'use strict'; var eval = 1;");
    assert_fails("'use strict'; arguments = 1;");
    assert_parses("var eval = 1;");
}

#[test]
fn test_strict_octal() {
    assert_fails("'use strict'; var x = 0644;");
    assert_parses("var x = 0644;");
    assert_fails("'use strict'; var s = '\\04';");
}

#[test]
fn test_delete_in_strict_mode() {
    assert_fails("'use strict'; delete x;");
    assert_parses("'use strict'; delete x.y;");
    assert_parses("delete x;");
}

// =============================================================================
// ASI
// =============================================================================

#[test]
fn test_automatic_semicolons() {
    let program = parse("a\nb").unwrap();
    assert_eq!(program.body.len(), 2);
    assert_parses("a; b");
    assert_fails("a b");
}

#[test]
fn test_postfix_needs_same_line() {
    // the newline forces ASI, so `++b` starts a new statement
    let program = parse("a\n++b").unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_hashbang() {
    let options = Options {
        allow_hash_bang: true,
        ..Options::default()
    };
    assert!(parse_with("#!/usr/bin/env node\nlet x = 1;", options).is_ok());
    assert!(parse("#!/usr/bin/env node\nlet x = 1;").is_err());
}

// =============================================================================
// Expression statement fallout
// =============================================================================

#[test]
fn test_expression_statements() {
    assert!(matches!(
        first_statement("f();"),
        Statement::Expression {
            expression: Expression::Call { .. },
            ..
        }
    ));
    assert_parses("a = b, c = d;");
}
