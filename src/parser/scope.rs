//! Lexical scope, label and private-name tracking
//!
//! Scopes are bitflag records pushed around functions, blocks, arrows,
//! static blocks and simple catch clauses. `var` declarations bubble up to
//! the innermost var-holding scope; lexical declarations stay put. Function
//! declarations get Annex-B `var` treatment in sloppy function scopes.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::error::ParseResult;
use crate::span::Span;

use super::Parser;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ScopeFlags: u16 {
        const TOP = 1 << 0;
        const FUNCTION = 1 << 1;
        const ASYNC = 1 << 2;
        const GENERATOR = 1 << 3;
        const ARROW = 1 << 4;
        const SIMPLE_CATCH = 1 << 5;
        const SUPER = 1 << 6;
        const DIRECT_SUPER = 1 << 7;
        const CLASS_STATIC_BLOCK = 1 << 8;
    }
}

impl ScopeFlags {
    /// Flags for a function-like scope
    pub(crate) fn function(is_async: bool, is_generator: bool) -> Self {
        let mut flags = ScopeFlags::FUNCTION;
        if is_async {
            flags |= ScopeFlags::ASYNC;
        }
        if is_generator {
            flags |= ScopeFlags::GENERATOR;
        }
        flags
    }

    /// Does this scope hold `var` declarations?
    pub(crate) fn is_var_scope(self) -> bool {
        self.intersects(ScopeFlags::TOP | ScopeFlags::FUNCTION | ScopeFlags::CLASS_STATIC_BLOCK)
    }
}

#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) flags: ScopeFlags,
    /// `var`-declared names
    pub(crate) var: Vec<String>,
    /// `let`/`const`/class/import-declared names
    pub(crate) lexical: Vec<String>,
    /// Function-declared names (Annex-B bookkeeping)
    pub(crate) functions: Vec<String>,
    /// Set while a class field initializer is being parsed on the enclosing
    /// this-scope; forbids `arguments` and `await`
    pub(crate) in_class_field_init: bool,
}

impl Scope {
    pub(crate) fn new(flags: ScopeFlags) -> Self {
        Self {
            flags,
            var: Vec::new(),
            lexical: Vec::new(),
            functions: Vec::new(),
            in_class_field_init: false,
        }
    }
}

/// How a name is being introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindingKind {
    /// Plain assignment target, nothing declared
    None,
    Var,
    Lexical,
    Function,
    /// Function's own name seen from inside its body
    Outside,
    SimpleCatch,
}

/// What a label may be continued/broken to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelKind {
    None,
    Loop,
    Switch,
}

#[derive(Debug)]
pub(crate) struct Label {
    pub(crate) name: Option<String>,
    pub(crate) kind: LabelKind,
    pub(crate) statement_start: usize,
}

/// Slot a private name occupies in its class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrivateSlot {
    /// Field, method, or a completed getter/setter pair
    Value,
    InstanceGet,
    InstanceSet,
    StaticGet,
    StaticSet,
}

/// Per-class-body record of declared and referenced private names
#[derive(Debug, Default)]
pub(crate) struct PrivateNameFrame {
    pub(crate) declared: HashMap<String, PrivateSlot>,
    pub(crate) used: Vec<(String, Span)>,
}

impl<'a> Parser<'a> {
    pub(crate) fn enter_scope(&mut self, flags: ScopeFlags) {
        self.scope_stack.push(Scope::new(flags));
    }

    pub(crate) fn exit_scope(&mut self) {
        self.scope_stack.pop();
    }

    pub(crate) fn current_scope(&mut self) -> &mut Scope {
        self.scope_stack.last_mut().expect("scope stack is never empty")
    }

    fn current_var_scope_index(&self) -> usize {
        self.scope_stack
            .iter()
            .rposition(|s| s.flags.is_var_scope())
            .expect("a top scope always exists")
    }

    fn current_this_scope_index(&self) -> usize {
        self.scope_stack
            .iter()
            .rposition(|s| s.flags.is_var_scope() && !s.flags.contains(ScopeFlags::ARROW))
            .expect("a top scope always exists")
    }

    pub(crate) fn current_this_scope(&self) -> &Scope {
        &self.scope_stack[self.current_this_scope_index()]
    }

    pub(crate) fn current_this_scope_mut(&mut self) -> &mut Scope {
        let i = self.current_this_scope_index();
        &mut self.scope_stack[i]
    }

    pub(crate) fn in_function(&self) -> bool {
        self.scope_stack[self.current_var_scope_index()]
            .flags
            .contains(ScopeFlags::FUNCTION)
    }

    /// Is a `yield` expression legal here?
    pub(crate) fn in_generator(&self) -> bool {
        for scope in self.scope_stack.iter().rev() {
            if scope.in_class_field_init || scope.flags.contains(ScopeFlags::CLASS_STATIC_BLOCK) {
                return false;
            }
            if scope.flags.contains(ScopeFlags::FUNCTION) {
                return scope.flags.contains(ScopeFlags::GENERATOR);
            }
        }
        false
    }

    /// Is `await` forbidden as an identifier here?
    pub(crate) fn in_async(&self) -> bool {
        for scope in self.scope_stack.iter().rev() {
            if scope.in_class_field_init || scope.flags.contains(ScopeFlags::CLASS_STATIC_BLOCK) {
                return false;
            }
            if scope.flags.contains(ScopeFlags::FUNCTION) {
                return scope.flags.contains(ScopeFlags::ASYNC);
            }
        }
        false
    }

    /// Is an `await` expression legal here?
    pub(crate) fn can_await(&self) -> bool {
        for scope in self.scope_stack.iter().rev() {
            if scope.in_class_field_init || scope.flags.contains(ScopeFlags::CLASS_STATIC_BLOCK) {
                return false;
            }
            if scope.flags.contains(ScopeFlags::FUNCTION) {
                return scope.flags.contains(ScopeFlags::ASYNC);
            }
        }
        self.in_module || self.options.allow_await_outside_function
    }

    pub(crate) fn in_class_static_block(&self) -> bool {
        self.scope_stack
            .iter()
            .rev()
            .any(|s| s.flags.contains(ScopeFlags::CLASS_STATIC_BLOCK))
    }

    pub(crate) fn allow_super(&self) -> bool {
        let scope = self.current_this_scope();
        scope.flags.contains(ScopeFlags::SUPER)
            || scope.in_class_field_init
            || self.options.allow_super_outside_method
    }

    pub(crate) fn allow_direct_super(&self) -> bool {
        self.current_this_scope()
            .flags
            .contains(ScopeFlags::DIRECT_SUPER)
    }

    pub(crate) fn allow_new_dot_target(&self) -> bool {
        let scope = self.current_this_scope();
        scope
            .flags
            .intersects(ScopeFlags::FUNCTION | ScopeFlags::CLASS_STATIC_BLOCK)
            || scope.in_class_field_init
    }

    fn treat_functions_as_var_in_scope(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION)
            || (!self.in_module && scope.flags.contains(ScopeFlags::TOP))
    }

    pub(crate) fn treat_functions_as_var(&self) -> bool {
        let scope = self.scope_stack.last().expect("scope stack is never empty");
        scope.flags.contains(ScopeFlags::FUNCTION)
            || (!self.in_module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// Record a binding, raising a recoverable error on redeclaration
    pub(crate) fn declare_name(&mut self, name: &str, kind: BindingKind, span: Span) {
        let mut redeclared = false;
        match kind {
            BindingKind::Lexical => {
                let in_module = self.in_module;
                let scope = self.current_scope();
                redeclared = scope.lexical.iter().any(|n| n == name)
                    || scope.var.iter().any(|n| n == name)
                    || scope.functions.iter().any(|n| n == name);
                scope.lexical.push(name.to_string());
                let at_top = scope.flags.contains(ScopeFlags::TOP);
                if in_module && at_top {
                    self.undefined_exports.retain(|(n, _)| n != name);
                }
            }
            BindingKind::SimpleCatch => {
                self.current_scope().lexical.push(name.to_string());
            }
            BindingKind::Function => {
                let as_var = self.treat_functions_as_var();
                let scope = self.current_scope();
                redeclared = if as_var {
                    scope.lexical.iter().any(|n| n == name)
                } else {
                    scope.lexical.iter().any(|n| n == name) || scope.var.iter().any(|n| n == name)
                };
                scope.functions.push(name.to_string());
            }
            BindingKind::Var | BindingKind::None | BindingKind::Outside => {
                let in_module = self.in_module;
                for i in (0..self.scope_stack.len()).rev() {
                    let functions_as_var =
                        self.treat_functions_as_var_in_scope(&self.scope_stack[i]);
                    let scope = &mut self.scope_stack[i];
                    let lexical_clash = scope.lexical.iter().any(|n| n == name)
                        && !(scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                            && scope.lexical.first().map(String::as_str) == Some(name));
                    if lexical_clash
                        || (!functions_as_var && scope.functions.iter().any(|n| n == name))
                    {
                        redeclared = true;
                        break;
                    }
                    scope.var.push(name.to_string());
                    let at_top = scope.flags.contains(ScopeFlags::TOP);
                    let at_var_scope = scope.flags.is_var_scope();
                    if in_module && at_top {
                        self.undefined_exports.retain(|(n, _)| n != name);
                    }
                    if at_var_scope {
                        break;
                    }
                }
            }
        }
        if redeclared {
            self.raise_recoverable(
                span,
                format!("Identifier '{}' has already been declared", name),
            );
        }
    }

    // ==================== Private names ====================

    pub(crate) fn enter_class_body(&mut self) {
        self.private_name_stack.push(PrivateNameFrame::default());
    }

    /// Pop the class frame; unresolved uses propagate to the parent frame
    /// or, at the outermost class, raise a hard error
    pub(crate) fn exit_class_body(&mut self) -> ParseResult<()> {
        let frame = self
            .private_name_stack
            .pop()
            .expect("exit_class_body without enter");
        let unresolved: Vec<(String, Span)> = frame
            .used
            .into_iter()
            .filter(|(name, _)| !frame.declared.contains_key(name))
            .collect();
        if let Some(parent) = self.private_name_stack.last_mut() {
            parent.used.extend(unresolved);
        } else if let Some((name, span)) = unresolved.into_iter().next() {
            return self.raise(
                span,
                format!("Private field '#{}' must be declared in an enclosing class", name),
            );
        }
        Ok(())
    }

    /// Record a private-name declaration; returns true when it conflicts
    /// with an earlier one in the same class
    pub(crate) fn declare_private_name(&mut self, name: &str, slot: PrivateSlot) -> bool {
        let frame = self
            .private_name_stack
            .last_mut()
            .expect("private name outside class body");
        match frame.declared.get(name).copied() {
            None => {
                frame.declared.insert(name.to_string(), slot);
                false
            }
            Some(current) => {
                let compatible = matches!(
                    (current, slot),
                    (PrivateSlot::InstanceGet, PrivateSlot::InstanceSet)
                        | (PrivateSlot::InstanceSet, PrivateSlot::InstanceGet)
                        | (PrivateSlot::StaticGet, PrivateSlot::StaticSet)
                        | (PrivateSlot::StaticSet, PrivateSlot::StaticGet)
                );
                if compatible {
                    frame.declared.insert(name.to_string(), PrivateSlot::Value);
                    false
                } else {
                    true
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_flags() {
        let flags = ScopeFlags::function(true, false);
        assert!(flags.contains(ScopeFlags::FUNCTION));
        assert!(flags.contains(ScopeFlags::ASYNC));
        assert!(!flags.contains(ScopeFlags::GENERATOR));
        assert!(flags.is_var_scope());
    }

    #[test]
    fn test_block_scope_is_not_var_scope() {
        assert!(!ScopeFlags::empty().is_var_scope());
        assert!(ScopeFlags::TOP.is_var_scope());
        assert!(ScopeFlags::CLASS_STATIC_BLOCK.is_var_scope());
    }
}
