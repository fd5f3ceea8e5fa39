//! Expression corpus: operators, literals, calls, arrows, objects

use ecma_parser::ast::{
    ArrowBody, BinaryOp, Expression, LiteralValue, LogicalOp, ObjectMember, Pattern,
    PropertyKind, Statement, UnaryOp, UpdateOp,
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

fn first_expr(source: &str) -> Expression {
    let program = parse(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
    match program.body.into_iter().next() {
        Some(Statement::Expression { expression, .. }) => expression,
        other => panic!("Expected an expression statement, got {:?}", other),
    }
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_number_literals() {
    for (source, expected) in [
        ("42", 42.0),
        ("0x10", 16.0),
        ("0o17", 15.0),
        ("0b101", 5.0),
        ("1_000", 1000.0),
        (".5", 0.5),
        ("1e3", 1000.0),
        ("2.5", 2.5),
    ] {
        match first_expr(source) {
            Expression::Literal(lit) => {
                assert_eq!(lit.value, LiteralValue::Number(expected), "for {}", source)
            }
            other => panic!("Expected literal for {}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_bigint_literal() {
    match first_expr("10n") {
        Expression::Literal(lit) => {
            assert_eq!(lit.value, LiteralValue::BigInt("10".to_string()));
            assert_eq!(lit.raw, "10n");
        }
        other => panic!("Expected literal, got {:?}", other),
    }
}

#[test]
fn test_string_literals() {
    match first_expr(r#"'a\nb'"#) {
        Expression::Literal(lit) => {
            assert_eq!(lit.value, LiteralValue::String("a\nb".to_string()));
        }
        other => panic!("Expected literal, got {:?}", other),
    }
    match first_expr(r#""A\u{1F600}""#) {
        Expression::Literal(lit) => {
            assert_eq!(lit.value, LiteralValue::String("A\u{1F600}".to_string()));
        }
        other => panic!("Expected literal, got {:?}", other),
    }
}

#[test]
fn test_keyword_literals() {
    assert!(matches!(
        first_expr("null"),
        Expression::Literal(lit) if lit.value == LiteralValue::Null
    ));
    assert!(matches!(
        first_expr("true"),
        Expression::Literal(lit) if lit.value == LiteralValue::Boolean(true)
    ));
}

#[test]
fn test_regex_literal() {
    match first_expr("/a[/]b/gi") {
        Expression::Literal(lit) => match lit.value {
            LiteralValue::Regex { pattern, flags } => {
                assert_eq!(pattern, "a[/]b");
                assert_eq!(flags, "gi");
            }
            other => panic!("Expected regex value, got {:?}", other),
        },
        other => panic!("Expected literal, got {:?}", other),
    }
}

#[test]
fn test_regex_flag_validation() {
    assert_fails("/a/ggx");
    assert_fails("/a/gg");
    assert_parses("/a/dgimsuy");
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_binary_precedence() {
    match first_expr("1 + 2 * 3") {
        Expression::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator, BinaryOp::Add);
            assert!(matches!(
                *right,
                Expression::Binary {
                    operator: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("Expected binary, got {:?}", other),
    }
}

#[test]
fn test_exponent_right_associative() {
    match first_expr("2 ** 3 ** 2") {
        Expression::Binary {
            operator, right, ..
        } => {
            assert_eq!(operator, BinaryOp::Exp);
            assert!(matches!(
                *right,
                Expression::Binary {
                    operator: BinaryOp::Exp,
                    ..
                }
            ));
        }
        other => panic!("Expected binary, got {:?}", other),
    }
}

#[test]
fn test_unary_before_exponent_rejected() {
    assert_fails("-a ** b");
    assert_parses("(-a) ** b");
    assert_parses("-(a ** b)");
}

#[test]
fn test_logical_operators() {
    assert!(matches!(
        first_expr("a && b"),
        Expression::Logical {
            operator: LogicalOp::And,
            ..
        }
    ));
    assert!(matches!(
        first_expr("a ?? b"),
        Expression::Logical {
            operator: LogicalOp::Coalesce,
            ..
        }
    ));
}

#[test]
fn test_coalesce_mixing() {
    assert_fails("1 && 2 ?? 3");
    assert_fails("1 ?? 2 || 3");
    assert_parses("(1 && 2) ?? 3");
    assert_parses("1 && (2 ?? 3)");
}

#[test]
fn test_in_and_instanceof() {
    assert!(matches!(
        first_expr("a in b"),
        Expression::Binary {
            operator: BinaryOp::In,
            ..
        }
    ));
    assert!(matches!(
        first_expr("a instanceof B"),
        Expression::Binary {
            operator: BinaryOp::Instanceof,
            ..
        }
    ));
}

#[test]
fn test_unary_and_update() {
    assert!(matches!(
        first_expr("typeof x"),
        Expression::Unary {
            operator: UnaryOp::Typeof,
            ..
        }
    ));
    assert!(matches!(
        first_expr("!x"),
        Expression::Unary {
            operator: UnaryOp::Not,
            ..
        }
    ));
    assert!(matches!(
        first_expr("++x"),
        Expression::Update {
            operator: UpdateOp::Inc,
            prefix: true,
            ..
        }
    ));
    assert!(matches!(
        first_expr("x--"),
        Expression::Update {
            operator: UpdateOp::Dec,
            prefix: false,
            ..
        }
    ));
}

#[test]
fn test_update_requires_target() {
    assert_fails("1++");
    assert_fails("++1");
}

#[test]
fn test_conditional() {
    assert!(matches!(
        first_expr("a ? b : c"),
        Expression::Conditional { .. }
    ));
    // `?.` before a digit re-lexes as `?` `.5`
    assert!(matches!(
        first_expr("a?.5:b"),
        Expression::Conditional { .. }
    ));
}

#[test]
fn test_sequence() {
    match first_expr("a, b, c") {
        Expression::Sequence { expressions, .. } => assert_eq!(expressions.len(), 3),
        other => panic!("Expected sequence, got {:?}", other),
    }
}

// =============================================================================
// Assignment
// =============================================================================

#[test]
fn test_simple_assignment() {
    match first_expr("x = 1") {
        Expression::Assignment { left, .. } => {
            assert!(matches!(*left, Pattern::Identifier(ref id) if id.name == "x"));
        }
        other => panic!("Expected assignment, got {:?}", other),
    }
}

#[test]
fn test_compound_assignment() {
    assert_parses("x += 1");
    assert_parses("x **= 2");
    assert_parses("x ??= y");
    assert_parses("x ||= y");
    assert_parses("a.b &&= c");
}

#[test]
fn test_compound_assignment_requires_simple_target() {
    assert_fails("{a} += 1");
    assert_fails("[a] -= 1");
}

#[test]
fn test_destructuring_assignment() {
    match first_expr("({a} = b)") {
        Expression::Assignment { left, .. } => {
            assert!(matches!(*left, Pattern::Object { .. }));
        }
        other => panic!("Expected assignment, got {:?}", other),
    }
    assert_parses("[a, b] = c");
    assert_parses("[a.b] = c");
    assert_parses("[...rest] = c");
    assert_parses("({a: {b}, c = 1} = d)");
}

#[test]
fn test_shorthand_default_needs_pattern_role() {
    assert_fails("({a=1})");
    assert_parses("({a=1} = b)");
}

#[test]
fn test_rest_must_be_last_in_pattern() {
    assert_fails("[...a, b] = c");
}

#[test]
fn test_assigning_to_rvalue() {
    assert_fails("1 = 2");
    assert_fails("a + b = c");
}

// =============================================================================
// Subscripts and calls
// =============================================================================

#[test]
fn test_member_expressions() {
    match first_expr("a.b.c") {
        Expression::Member(m) => {
            assert!(!m.computed);
            assert!(matches!(m.object, Expression::Member(_)));
        }
        other => panic!("Expected member, got {:?}", other),
    }
    assert!(matches!(first_expr("a[b + 1]"), Expression::Member(m) if m.computed));
}

#[test]
fn test_calls() {
    match first_expr("f(a, b)") {
        Expression::Call { arguments, .. } => assert_eq!(arguments.len(), 2),
        other => panic!("Expected call, got {:?}", other),
    }
    assert_parses("f(...args)");
    assert_parses("f(a, b,)");
}

#[test]
fn test_optional_chaining() {
    match first_expr("a?.b") {
        Expression::Chain { expression, .. } => {
            assert!(matches!(*expression, Expression::Member(m) if m.optional));
        }
        other => panic!("Expected chain, got {:?}", other),
    }
    assert_parses("a?.[b]");
    assert_parses("a?.(b)");
}

#[test]
fn test_chain_shape() {
    // both the `?.b` and the `?.()` carry the optional flag
    match first_expr("a?.b.c?.()") {
        Expression::Chain { expression, .. } => match *expression {
            Expression::Call {
                optional, callee, ..
            } => {
                assert!(optional);
                assert!(matches!(*callee, Expression::Member(_)));
            }
            other => panic!("Expected call on the spine, got {:?}", other),
        },
        other => panic!("Expected chain, got {:?}", other),
    }
}

#[test]
fn test_new_expressions() {
    assert!(matches!(first_expr("new A"), Expression::New { .. }));
    match first_expr("new A(1, 2)") {
        Expression::New { arguments, .. } => assert_eq!(arguments.len(), 2),
        other => panic!("Expected new, got {:?}", other),
    }
    assert_parses("new a.b.C()");
    assert_parses("new (f())()");
}

#[test]
fn test_new_rejects_optional_chain() {
    assert_fails("new a?.b()");
}

#[test]
fn test_tagged_templates() {
    assert!(matches!(
        first_expr("tag`x${1}`"),
        Expression::TaggedTemplate { .. }
    ));
    assert_fails("a?.b`x`");
}

#[test]
fn test_chain_not_assignable() {
    assert_fails("a?.b = 1");
}

// =============================================================================
// Templates
// =============================================================================

#[test]
fn test_template_literal() {
    match first_expr("`a${1 + 2}b`") {
        Expression::TemplateLiteral(t) => {
            assert_eq!(t.quasis.len(), 2);
            assert_eq!(t.expressions.len(), 1);
            assert_eq!(t.quasis[0].raw, "a");
            assert_eq!(t.quasis[0].cooked.as_deref(), Some("a"));
            assert!(!t.quasis[0].tail);
            assert!(t.quasis[1].tail);
        }
        other => panic!("Expected template, got {:?}", other),
    }
}

#[test]
fn test_template_invalid_escape() {
    assert_fails(r"`\u`");
    // tagged templates tolerate the invalid escape with a None cooked value
    match first_expr(r"tag`\u`") {
        Expression::TaggedTemplate { quasi, .. } => {
            assert_eq!(quasi.quasis[0].cooked, None);
        }
        other => panic!("Expected tagged template, got {:?}", other),
    }
}

#[test]
fn test_nested_templates() {
    assert_parses("`a${`b${c}`}d`");
}

// =============================================================================
// Arrays and objects
// =============================================================================

#[test]
fn test_array_holes() {
    match first_expr("[1, , 2]") {
        Expression::Array { elements, .. } => {
            assert_eq!(elements.len(), 3);
            assert!(elements[0].is_some());
            assert!(elements[1].is_none());
            assert!(elements[2].is_some());
        }
        other => panic!("Expected array, got {:?}", other),
    }
}

#[test]
fn test_array_spread_and_trailing_comma() {
    assert_parses("[...a]");
    assert_parses("[1, 2,]");
}

#[test]
fn test_object_literal_forms() {
    assert_parses("({})");
    assert_parses("({a: 1, 'b': 2, 3: c, [d]: e})");
    assert_parses("({a, b})");
    assert_parses("({m() {}, get x() {}, set x(v) {}})");
    assert_parses("({async m() {}, *g() {}, async *ag() {}})");
    assert_parses("({...spread})");
}

#[test]
fn test_object_shorthand_structure() {
    match first_expr("({a, b: 2})") {
        Expression::Object { properties, .. } => {
            assert_eq!(properties.len(), 2);
            match &properties[0] {
                ObjectMember::Property(p) => {
                    assert!(p.shorthand);
                    assert_eq!(p.kind, PropertyKind::Init);
                }
                other => panic!("Expected property, got {:?}", other),
            }
        }
        other => panic!("Expected object, got {:?}", other),
    }
}

#[test]
fn test_getter_setter_arity() {
    assert_fails("({get x(a) {}})");
    assert_fails("({set x() {}})");
    assert_fails("({set x(...v) {}})");
}

#[test]
fn test_double_proto() {
    assert_fails("({__proto__: 1, __proto__: 2})");
    assert_parses("({__proto__: 1, ['__proto__']: 2})");
    assert_parses("({__proto__, __proto__: 2})");
    // in pattern role both keys bind, so it is legal
    assert_parses("({__proto__: a, __proto__: b} = c)");
}

// =============================================================================
// Arrow functions
// =============================================================================

#[test]
fn test_arrow_forms() {
    assert_parses("x => x");
    assert_parses("(x) => x");
    assert_parses("() => 1");
    assert_parses("(a, b) => a + b");
    assert_parses("(a = 1, ...rest) => rest");
    assert_parses("({a}, [b]) => a + b");
    assert_parses("x => { return x; }");
}

#[test]
fn test_async_arrows() {
    assert_parses("async x => x");
    assert_parses("async (x) => await x");
    assert_parses("async () => {}");
}

#[test]
fn test_async_arrow_structure() {
    match first_expr("async (x) => await x") {
        Expression::Arrow(arrow) => {
            assert!(arrow.is_async);
            assert_eq!(arrow.params.len(), 1);
            assert!(matches!(arrow.params[0], Pattern::Identifier(ref id) if id.name == "x"));
            match &arrow.body {
                ArrowBody::Expression(e) => {
                    assert!(matches!(**e, Expression::Await { .. }));
                }
                other => panic!("Expected expression body, got {:?}", other),
            }
        }
        other => panic!("Expected arrow, got {:?}", other),
    }
}

#[test]
fn test_arrow_no_newline_before_arrow() {
    assert_fails("x\n=> x");
}

#[test]
fn test_parenthesized_pattern_rejected_as_arrow_param() {
    assert_fails("((a)) => 1");
}

#[test]
fn test_yield_default_in_arrow_params() {
    assert_fails("function* g() { (a = yield) => {}; }");
}

// =============================================================================
// yield / await
// =============================================================================

#[test]
fn test_yield_forms() {
    assert_parses("function* g() { yield; }");
    assert_parses("function* g() { yield 1; }");
    assert_parses("function* g() { yield* other(); }");
    assert_parses("function* g() { let x = yield 1; }");
}

#[test]
fn test_yield_is_identifier_outside_generators() {
    assert_parses("var yield = 1;");
    assert_fails("'use strict'; var yield = 1;");
    assert_fails("function* g() { var yield = 1; }");
}

#[test]
fn test_await_forms() {
    assert_parses("async function f() { await x; }");
    assert_parses("async function f() { await (a + b); }");
    assert_fails("async function f() { var await = 1; }");
}

#[test]
fn test_await_outside_function_option() {
    let options = Options {
        allow_await_outside_function: true,
        ..Options::default()
    };
    assert!(parse_with("await x", options).is_ok());
    assert!(parse("await x").is_err());
}

// =============================================================================
// Parenthesized expressions
// =============================================================================

#[test]
fn test_paren_sequence() {
    assert!(matches!(first_expr("(a, b)"), Expression::Sequence { .. }));
}

#[test]
fn test_empty_parens_need_arrow() {
    assert_fails("()");
    assert_fails("(,)");
    assert_fails("(a, )");
}

#[test]
fn test_preserve_parens_option() {
    let options = Options {
        preserve_parens: true,
        ..Options::default()
    };
    let program = parse_with("(a)", options).unwrap();
    match &program.body[0] {
        Statement::Expression { expression, .. } => {
            assert!(matches!(expression, Expression::Paren { .. }));
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
}

#[test]
fn test_division_vs_regex() {
    // after an operand `/` divides; in expression position it opens a regexp
    assert!(matches!(
        first_expr("a / b / c"),
        Expression::Binary {
            operator: BinaryOp::Div,
            ..
        }
    ));
    assert!(matches!(
        first_expr("a = /b/g"),
        Expression::Assignment { .. }
    ));
}
