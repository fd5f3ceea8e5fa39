//! Module corpus: import/export forms and their bookkeeping

use ecma_parser::ast::{
    ExportDefault, Expression, ImportSpecifier, ModuleExportName, Statement,
};
use ecma_parser::{parse, parse_module, parse_with, Options};

fn assert_parses(source: &str) {
    let result = parse_module(source);
    assert!(
        result.is_ok(),
        "Failed to parse module: {}\nError: {:?}",
        source,
        result.err()
    );
}

fn assert_fails(source: &str) {
    assert!(
        parse_module(source).is_err(),
        "Expected a module parse error for: {}",
        source
    );
}

fn first_statement(source: &str) -> Statement {
    let program =
        parse_module(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
    program
        .body
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("Empty module for {}", source))
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_forms() {
    assert_parses("import 'side-effect';");
    assert_parses("import def from 'm';");
    assert_parses("import * as ns from 'm';");
    assert_parses("import { a } from 'm';");
    assert_parses("import { a, b as c } from 'm';");
    assert_parses("import def, { a } from 'm';");
    assert_parses("import def, * as ns from 'm';");
    assert_parses("import { a, } from 'm';");
}

#[test]
fn test_import_structure() {
    match first_statement("import def, { a as b } from 'm';") {
        Statement::Import {
            specifiers, source, ..
        } => {
            assert_eq!(specifiers.len(), 2);
            assert!(matches!(
                &specifiers[0],
                ImportSpecifier::Default { local, .. } if local.name == "def"
            ));
            match &specifiers[1] {
                ImportSpecifier::Named {
                    local, imported, ..
                } => {
                    assert_eq!(local.name, "b");
                    assert!(matches!(
                        imported,
                        ModuleExportName::Identifier(id) if id.name == "a"
                    ));
                }
                other => panic!("Expected named specifier, got {:?}", other),
            }
            assert_eq!(source.raw, "'m'");
        }
        other => panic!("Expected import, got {:?}", other),
    }
}

#[test]
fn test_import_string_names() {
    assert_parses(r#"import { "a-b" as c } from 'm';"#);
    // a string import name needs an `as` alias
    assert_fails(r#"import { "a-b" } from 'm';"#);
}

#[test]
fn test_import_errors() {
    assert_fails("import;");
    assert_fails("import { a } 'm';");
    assert_fails("import { a };");
    assert_fails("import * from 'm';");
}

#[test]
fn test_import_bindings_clash() {
    assert_fails("import { a } from 'm'; let a;");
    assert_fails("import { a, b as a } from 'm';");
}

#[test]
fn test_import_outside_module() {
    assert!(parse("import { a } from 'm';").is_err());
    assert_fails("function f() { import { a } from 'm'; }");
    let options = Options {
        allow_import_export_everywhere: true,
        ..Options::default()
    };
    assert!(parse_with("import { a } from 'm';", options).is_ok());
}

// =============================================================================
// Dynamic import and import.meta
// =============================================================================

#[test]
fn test_dynamic_import() {
    match first_statement("import('m');") {
        Statement::Expression { expression, .. } => {
            assert!(matches!(expression, Expression::ImportCall { .. }));
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
    // dynamic import also works in plain scripts
    assert!(parse("import('m');").is_ok());
    assert_parses("import(specifier());");
}

#[test]
fn test_dynamic_import_trailing_comma() {
    assert_fails("import('m',);");
    assert_fails("import('m', other);");
    assert_fails("new import('m');");
}

#[test]
fn test_import_meta() {
    match first_statement("import.meta.url;") {
        Statement::Expression { expression, .. } => {
            assert!(matches!(expression, Expression::Member(_)));
        }
        other => panic!("Expected expression statement, got {:?}", other),
    }
    assert!(parse("import.meta;").is_err());
    assert_fails("import.other;");
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_declaration_forms() {
    assert_parses("export var a = 1;");
    assert_parses("export let b = 2;");
    assert_parses("export const c = 3;");
    assert_parses("export function f() {}");
    assert_parses("export async function g() {}");
    assert_parses("export class C {}");
}

#[test]
fn test_export_list_forms() {
    assert_parses("let a, b; export { a, b };");
    assert_parses("let a; export { a as renamed };");
    assert_parses("export { a, b as c } from 'm';");
    assert_parses("let a; export { a as 'string name' };");
}

#[test]
fn test_export_star() {
    assert_parses("export * from 'm';");
    assert_parses("export * as ns from 'm';");
    assert_fails("export *;");
}

#[test]
fn test_export_default_forms() {
    assert_parses("export default 42;");
    assert_parses("export default function () {}");
    assert_parses("export default function named() {}");
    assert_parses("export default class {}");
    assert_parses("export default async function () {}");
}

#[test]
fn test_export_default_structure() {
    match first_statement("export default function () {}") {
        Statement::ExportDefault { declaration, .. } => {
            assert!(matches!(declaration, ExportDefault::Function(f) if f.id.is_none()));
        }
        other => panic!("Expected export default, got {:?}", other),
    }
}

#[test]
fn test_duplicate_exports() {
    assert_fails("let a; export { a, a };");
    assert_fails("export var a; export var a;");
    assert_fails("export default 1; export default 2;");
    assert_fails("let a, b; export { a }; export { b as a };");
}

#[test]
fn test_undefined_export() {
    assert_fails("export { missing };");
    assert_parses("export { x }; let x;");
    assert_parses("let x; export { x };");
    // re-exports do not need a local binding
    assert_parses("export { missing } from 'm';");
}

#[test]
fn test_export_destructured_names() {
    assert_fails("export let {a} = o; export let a = 1;");
    assert_parses("export let {a, b: [c]} = o;");
}

#[test]
fn test_string_export_name_needs_from() {
    assert_fails("export { 'name' };");
    assert_parses("export { 'name' } from 'm';");
}

#[test]
fn test_lone_surrogate_export_name() {
    assert_fails(r#"let x; export { x as "\uD800" };"#);
    assert_parses(r#"let x; export { x as "😀" };"#);
}

#[test]
fn test_export_outside_module() {
    assert!(parse("export let a = 1;").is_err());
}

// =============================================================================
// Module environment
// =============================================================================

#[test]
fn test_modules_are_strict() {
    assert_fails("with (a) {}");
    assert_fails("var let = 1;");
    assert_fails("x = 0644;");
}

#[test]
fn test_top_level_await_in_modules() {
    assert_parses("await x;");
    assert_parses("const data = await load();");
    assert!(parse("const data = await load();").is_err());
}

#[test]
fn test_await_is_reserved_in_modules() {
    assert_fails("var await = 1;");
}
