//! Structural invariants: node positions, pattern alphabets, chain shapes

use ecma_parser::ast::{
    ArrowBody, Expression, LiteralValue, ObjectPatternProp, Pattern, Statement, VariableKind,
};
use ecma_parser::{parse, parse_with_options, Options};

fn first_statement(source: &str) -> Statement {
    let program = parse(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
    program
        .body
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("Empty program for {}", source))
}

fn first_expr(source: &str) -> Expression {
    match first_statement(source) {
        Statement::Expression { expression, .. } => expression,
        other => panic!("Expected an expression statement, got {:?}", other),
    }
}

// =============================================================================
// Position invariants
// =============================================================================

#[test]
fn test_statement_spans_reproduce_source() {
    for source in [
        "let a = 1;",
        "for (const x of xs) x++;",
        "function f(a, b) { return a; }",
        "class C { m() {} }",
        "if (a) { b; } else { c; }",
    ] {
        let program = parse(source).unwrap();
        let span = program.body[0].span();
        assert_eq!(
            &source[span.start..span.end],
            source,
            "span should cover the whole statement for {:?}",
            source
        );
    }
}

#[test]
fn test_expression_spans_reproduce_source() {
    let source = "use(a + b * c);";
    let Statement::Expression { expression, .. } = first_statement(source) else {
        panic!("Expected expression statement");
    };
    let Expression::Call { arguments, .. } = &expression else {
        panic!("Expected call");
    };
    let arg_span = arguments[0].span();
    assert_eq!(&source[arg_span.start..arg_span.end], "a + b * c");
}

#[test]
fn test_child_spans_contained_in_parent() {
    let source = "while (cond) { body(); }";
    let Statement::While { span, test, body } = first_statement(source) else {
        panic!("Expected while");
    };
    let test_span = test.span();
    let body_span = body.span();
    assert!(span.start <= test_span.start && test_span.end <= span.end);
    assert!(span.start <= body_span.start && body_span.end <= span.end);
    assert!(test_span.end <= body_span.start);
}

#[test]
fn test_program_span_covers_input() {
    let source = "  let a = 1;  ";
    let program = parse(source).unwrap();
    assert_eq!(program.span.start, 0);
    assert_eq!(program.span.end, source.len());
}

#[test]
fn test_line_column_tracking() {
    let program = parse("a;\nlet b = 1;").unwrap();
    let span = program.body[1].span();
    assert_eq!(span.start_line, 2);
    assert_eq!(span.start_column, 0);
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn test_scenario_let_declaration() {
    let Statement::VariableDecl(d) = first_statement("let a = 1;") else {
        panic!("Expected declaration");
    };
    assert_eq!(d.kind, VariableKind::Let);
    assert_eq!(d.declarations.len(), 1);
    assert!(matches!(
        &d.declarations[0].id,
        Pattern::Identifier(id) if id.name == "a"
    ));
    assert!(matches!(
        d.declarations[0].init.as_ref().unwrap(),
        Expression::Literal(lit) if lit.value == LiteralValue::Number(1.0)
    ));
}

#[test]
fn test_scenario_const_for_of_head() {
    // no error despite `const` without an initializer
    let Statement::ForOf { left, .. } = first_statement("for (const x of xs) x++;") else {
        panic!("Expected for-of");
    };
    let ecma_parser::ast::ForTarget::Declaration(d) = left else {
        panic!("Expected declaration target");
    };
    assert_eq!(d.kind, VariableKind::Const);
    assert_eq!(d.declarations.len(), 1);
    assert!(d.declarations[0].init.is_none());
}

#[test]
fn test_scenario_shorthand_assign_pattern() {
    let Expression::Assignment { left, right, .. } = first_expr("({a=1}=b)") else {
        panic!("Expected assignment");
    };
    assert!(matches!(*right, Expression::Identifier(ref id) if id.name == "b"));
    let Pattern::Object { properties, .. } = *left else {
        panic!("Expected object pattern");
    };
    let ObjectPatternProp::Property(prop) = &properties[0] else {
        panic!("Expected property");
    };
    assert!(prop.shorthand);
    match &prop.value {
        Pattern::Assignment { left, right, .. } => {
            assert!(matches!(**left, Pattern::Identifier(ref id) if id.name == "a"));
            assert!(matches!(
                **right,
                Expression::Literal(ref lit) if lit.value == LiteralValue::Number(1.0)
            ));
        }
        other => panic!("Expected assignment pattern, got {:?}", other),
    }

    let err = parse("({a=1})").unwrap_err();
    assert!(
        err.to_string()
            .contains("Shorthand property assignments are valid only in destructuring patterns"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn test_scenario_private_field_resolution() {
    assert!(parse("class C { #x; method() { return this.#x; } }").is_ok());
    let err = parse("class C { method() { return this.#x; } }").unwrap_err();
    assert!(
        err.to_string()
            .contains("Private field '#x' must be declared in an enclosing class"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn test_scenario_chain_expression() {
    let Expression::Chain { expression, .. } = first_expr("a?.b.c?.()") else {
        panic!("Expected chain");
    };
    let Expression::Call {
        optional, callee, ..
    } = *expression
    else {
        panic!("Expected call on the spine");
    };
    assert!(optional);
    let Expression::Member(outer) = *callee else {
        panic!("Expected member");
    };
    assert!(!outer.optional); // `.c`
    let Expression::Member(inner) = outer.object else {
        panic!("Expected member");
    };
    assert!(inner.optional); // `?.b`
}

#[test]
fn test_scenario_new_with_optional_chain() {
    let err = parse("new a?.b()").unwrap_err();
    assert!(
        err.to_string()
            .contains("Optional chaining cannot appear in the callee of new expressions"),
        "unexpected message: {}",
        err
    );
}

#[test]
fn test_scenario_coalesce_mixing() {
    let err = parse("1 && 2 ?? 3").unwrap_err();
    assert!(
        err.to_string().contains("cannot be mixed"),
        "unexpected message: {}",
        err
    );
    assert!(parse("(1 && 2) ?? 3").is_ok());
}

#[test]
fn test_scenario_async_arrow() {
    let Expression::Arrow(arrow) = first_expr("async (x) => await x") else {
        panic!("Expected arrow");
    };
    assert!(arrow.is_async);
    assert_eq!(arrow.params.len(), 1);
    let ArrowBody::Expression(body) = &arrow.body else {
        panic!("Expected expression body");
    };
    let Expression::Await { argument, .. } = body.as_ref() else {
        panic!("Expected await");
    };
    assert!(matches!(**argument, Expression::Identifier(ref id) if id.name == "x"));
}

// =============================================================================
// Pattern alphabet
// =============================================================================

fn assert_pattern_alphabet(pattern: &Pattern) {
    match pattern {
        Pattern::Identifier(_) | Pattern::Member(_) => {}
        Pattern::Object { properties, .. } => {
            for prop in properties {
                match prop {
                    ObjectPatternProp::Property(p) => assert_pattern_alphabet(&p.value),
                    ObjectPatternProp::Rest { argument, .. } => assert_pattern_alphabet(argument),
                }
            }
        }
        Pattern::Array { elements, .. } => {
            for element in elements.iter().flatten() {
                assert_pattern_alphabet(element);
            }
        }
        Pattern::Assignment { left, .. } => assert_pattern_alphabet(left),
        Pattern::Rest { argument, .. } => assert_pattern_alphabet(argument),
    }
}

#[test]
fn test_converted_patterns_stay_in_pattern_alphabet() {
    for source in [
        "({a = 1, b: [c, ...d], e: {f}} = g)",
        "[a, [b, {c}], ...d] = e",
        "({x: o.prop} = y)",
    ] {
        let Expression::Assignment { left, .. } = first_expr(source) else {
            panic!("Expected assignment for {}", source);
        };
        assert_pattern_alphabet(&left);
    }
}

#[test]
fn test_binding_patterns_stay_in_pattern_alphabet() {
    let Statement::VariableDecl(d) = first_statement("let {a = 1, b: [c]} = o;") else {
        panic!("Expected declaration");
    };
    assert_pattern_alphabet(&d.declarations[0].id);
}

// =============================================================================
// Directives
// =============================================================================

#[test]
fn test_directive_only_for_leading_strings() {
    let program = parse("'one';\nfoo();\n'two';").unwrap();
    assert!(matches!(
        &program.body[0],
        Statement::Expression { directive: Some(d), .. } if d == "one"
    ));
    assert!(matches!(
        &program.body[2],
        Statement::Expression {
            directive: None,
            ..
        }
    ));
}

#[test]
fn test_directive_keeps_raw_text() {
    // the directive carries the raw inner text, escapes unresolved
    let program = parse(r"'use\x20strict';").unwrap();
    assert!(matches!(
        &program.body[0],
        Statement::Expression { directive: Some(d), .. } if d == r"use\x20strict"
    ));
}

// =============================================================================
// Recoverable-error collection
// =============================================================================

#[test]
fn test_recoverable_errors_are_collected_without_aborting() {
    // two independent static-rule violations: parsing continues past each,
    // the whole program is still built, and both surface in the output
    let source = "({__proto__: 1, __proto__: 2});\n({__proto__: 3, __proto__: 4});";
    let output = parse_with_options(source, Options::default()).unwrap();
    assert_eq!(output.program.body.len(), 2);
    assert_eq!(output.errors.len(), 2);
    for error in &output.errors {
        assert!(
            error.to_string().contains("Redefinition of __proto__ property"),
            "unexpected message: {}",
            error
        );
    }
    // the default entry point promotes the first collected error
    assert!(parse(source).is_err());
}

#[test]
fn test_duplicate_exports_collected_across_statements() {
    let source = "let a; export { a, a }; export { a as b, a as b };";
    let output = parse_with_options(source, Options::module()).unwrap();
    assert_eq!(output.program.body.len(), 3);
    assert_eq!(output.errors.len(), 2);
    assert!(output.errors[0].to_string().contains("Duplicate export 'a'"));
    assert!(output.errors[1].to_string().contains("Duplicate export 'b'"));
}

#[test]
fn test_unresolved_private_name_is_fatal_even_when_collecting() {
    // an undeclared private name is a hard error, not a collected one
    let result = parse_with_options(
        "class C { method() { return this.#x; } }",
        Options::default(),
    );
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Private field '#x' must be declared in an enclosing class"));
}

// =============================================================================
// JSON view
// =============================================================================

#[test]
fn test_json_view() {
    let program = parse("let a = 1;").unwrap();
    let json = program.to_json();
    assert_eq!(json["type"], "Program");
    assert_eq!(json["sourceType"], "script");
    assert_eq!(json["body"][0]["type"], "VariableDeclaration");
    assert_eq!(json["body"][0]["kind"], "let");
    assert_eq!(json["body"][0]["declarations"][0]["id"]["type"], "Identifier");
    assert_eq!(json["body"][0]["declarations"][0]["id"]["name"], "a");
    assert_eq!(json["body"][0]["start"], 0);
}
