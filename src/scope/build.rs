//! The per-scope hoist-then-declare walker that fills in a [`super::Scope`]'s
//! bindings. Grounded on `analyzer::scope_builder`'s two-phase traversal
//! (hoist `var`/function declarations first, then walk normally) and on
//! `analyzer::semantic_analysis`'s unsafe-scope detection (`eval`, `with`,
//! dynamic `this`, indirect global access).
//!
//! Deliberately scoped to *one* scope at a time: this walker stops at
//! every nested scope root (nested function, nested block that itself
//! needs a scope, catch clause, loop with a `let`/`const` binding) rather
//! than recursing into it — that nested scope's own bindings are filled
//! in separately, when the incremental scope creator (§4.7) is asked for
//! it. This mirrors the inference engine's own "bottom-up over the scope
//! tree, one function scope at a time" structure (§4.6).

use std::collections::HashSet;

use crate::ast::{Arena, AstResult, NodeId, NodeKind, VarKind};
use crate::scope::{Scope, ScopeId, ScopeResult, ScopeTree, UnsafeReason, Variable, VariableKind};

/// True if this `BlockStatement`'s direct body needs its own block
/// scope — i.e. it directly declares a `let`/`const`/class (§4.1: hoisted
/// and block-scoped bindings differ only in owning scope; a block with
/// none just flattens into its parent).
pub fn block_needs_scope(arena: &Arena, body: &[NodeId]) -> bool {
    body.iter().any(|&id| {
        matches!(
            arena.get(id).map(|n| &n.kind),
            Ok(NodeKind::VariableDeclaration { kind: VarKind::Let | VarKind::Const, .. })
                | Ok(NodeKind::ClassDeclaration { .. })
        )
    })
}

fn for_init_is_binding(arena: &Arena, init: NodeId) -> bool {
    matches!(
        arena.get(init).map(|n| &n.kind),
        Ok(NodeKind::VariableDeclaration { kind: VarKind::Let | VarKind::Const, .. })
    )
}

/// True if `id` is itself the root of a scope distinct from its
/// syntactic parent's scope (§3's scope-root list: program, function,
/// block-with-lets, catch, for-with-binding). The program root is
/// handled separately by the scope creator, since it has no syntactic
/// parent to ask.
pub fn is_nested_scope_root(arena: &Arena, id: NodeId) -> bool {
    match arena.get(id).map(|n| &n.kind) {
        Ok(k) if k.is_function_like() => true,
        Ok(NodeKind::CatchClause { .. }) => true,
        Ok(NodeKind::BlockStatement { body }) => block_needs_scope(arena, body),
        Ok(NodeKind::ForStatement { init: Some(init), .. }) => for_init_is_binding(arena, *init),
        Ok(NodeKind::ForInStatement { is_decl: true, left, .. })
        | Ok(NodeKind::ForOfStatement { is_decl: true, left, .. }) => for_init_is_binding(arena, *left),
        _ => false,
    }
}

/// Walks every statement that belongs to `scope_root`'s own scope,
/// flattening control-flow wrappers (if/while/do-while/for/labeled/try/
/// switch) but stopping at nested scope roots. `f` is called once per
/// statement in that set, in source order.
fn each_owned_statement(arena: &Arena, stmt: NodeId, f: &mut impl FnMut(NodeId)) -> AstResult<()> {
    f(stmt);
    match &arena.get(stmt)?.kind {
        NodeKind::BlockStatement { body } => {
            if !block_needs_scope(arena, body) {
                for &s in body {
                    each_owned_statement(arena, s, f)?;
                }
            }
        }
        NodeKind::IfStatement { consequent, alternate, .. } => {
            each_owned_statement(arena, *consequent, f)?;
            if let Some(a) = alternate {
                each_owned_statement(arena, *a, f)?;
            }
        }
        NodeKind::WhileStatement { body, .. } | NodeKind::DoWhileStatement { body, .. } => {
            each_owned_statement(arena, *body, f)?;
        }
        NodeKind::ForStatement { body, .. } => {
            each_owned_statement(arena, *body, f)?;
        }
        NodeKind::ForInStatement { body, .. } | NodeKind::ForOfStatement { body, .. } => {
            each_owned_statement(arena, *body, f)?;
        }
        NodeKind::LabeledStatement { body, .. } => each_owned_statement(arena, *body, f)?,
        NodeKind::TryStatement { block, finalizer, .. } => {
            each_owned_statement(arena, *block, f)?;
            if let Some(fin) = finalizer {
                each_owned_statement(arena, *fin, f)?;
            }
        }
        NodeKind::SwitchStatement { cases, .. } => {
            for &case in cases {
                if let Ok(NodeKind::SwitchCase { consequent, .. }) = arena.get(case).map(|n| &n.kind) {
                    for &s in consequent {
                        each_owned_statement(arena, s, f)?;
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn pattern_names(arena: &Arena, pattern: NodeId, out: &mut Vec<NodeId>) {
    match arena.get(pattern).map(|n| &n.kind) {
        Ok(NodeKind::Identifier { .. }) => out.push(pattern),
        Ok(NodeKind::ArrayPattern { elements }) => {
            for el in elements.iter().flatten() {
                pattern_names(arena, *el, out);
            }
        }
        Ok(NodeKind::ObjectPattern { properties }) => {
            for &prop in properties {
                match arena.get(prop).map(|n| &n.kind) {
                    Ok(NodeKind::ObjectPatternProperty { value, .. }) => pattern_names(arena, *value, out),
                    Ok(NodeKind::RestElement { argument }) => pattern_names(arena, *argument, out),
                    _ => {}
                }
            }
        }
        Ok(NodeKind::AssignmentPattern { left, .. }) => pattern_names(arena, *left, out),
        Ok(NodeKind::RestElement { argument }) => pattern_names(arena, *argument, out),
        _ => {}
    }
}

fn declare(scope: &mut Scope, arena: &Arena, name_node: NodeId, kind: VariableKind) {
    let Ok(node) = arena.get(name_node) else { return };
    let NodeKind::Identifier { name } = &node.kind else { return };
    let source = node.source;
    let name = name.clone();
    scope.bindings.entry(name.clone()).or_insert(Variable {
        name,
        defining_node: name_node,
        declared_type: None,
        kind,
        scope: scope.id,
        source,
        is_captured: false,
    });
}

/// Phase 1: hoist `var` declarations and function declarations to the
/// nearest function/program scope (§4.1, grounded on
/// `scope_builder::hoist_statement_declarations`).
fn hoist(arena: &Arena, scope: &mut Scope, root_body: &[NodeId]) -> AstResult<()> {
    let mut statements = Vec::new();
    for &stmt in root_body {
        each_owned_statement(arena, stmt, &mut |s| statements.push(s))?;
    }
    for stmt in statements {
        match &arena.get(stmt)?.kind {
            NodeKind::VariableDeclaration { kind: VarKind::Var, declarators } => {
                for &decl in declarators {
                    if let Ok(NodeKind::VariableDeclarator { id, .. }) = arena.get(decl).map(|n| &n.kind) {
                        let mut names = Vec::new();
                        pattern_names(arena, *id, &mut names);
                        for n in names {
                            declare(scope, arena, n, VariableKind::VarDeclaration);
                        }
                    }
                }
            }
            NodeKind::FunctionDeclaration { id: Some(id), .. } => {
                declare(scope, arena, *id, VariableKind::FunctionDeclaration);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Phase 2: declare non-hoisted bindings (let/const/class) owned
/// directly by this scope, plus parameters/catch bindings if the scope
/// root itself introduces them, and detect the unsafe-scope triggers
/// (grounded on `semantic_analysis::analyze_expression_semantics`).
fn declare_own_and_detect_unsafe(arena: &Arena, scope: &mut Scope, root: NodeId) -> AstResult<()> {
    match &arena.get(root)?.kind {
        NodeKind::FunctionDeclaration { params, .. }
        | NodeKind::FunctionExpression { params, .. } => {
            for &p in params {
                let mut names = Vec::new();
                pattern_names(arena, p, &mut names);
                for n in names {
                    declare(scope, arena, n, VariableKind::Parameter);
                }
            }
        }
        NodeKind::ArrowFunctionExpression { params, .. } => {
            for &p in params {
                let mut names = Vec::new();
                pattern_names(arena, p, &mut names);
                for n in names {
                    declare(scope, arena, n, VariableKind::Parameter);
                }
            }
        }
        NodeKind::CatchClause { param: Some(p), .. } => {
            let mut names = Vec::new();
            pattern_names(arena, *p, &mut names);
            for n in names {
                declare(scope, arena, n, VariableKind::CatchBinding);
            }
        }
        NodeKind::ForStatement { init: Some(init), .. } => {
            if let Ok(NodeKind::VariableDeclaration { kind: VarKind::Let | VarKind::Const, declarators }) =
                arena.get(*init).map(|n| &n.kind)
            {
                for &decl in declarators {
                    if let Ok(NodeKind::VariableDeclarator { id, .. }) = arena.get(decl).map(|n| &n.kind) {
                        let mut names = Vec::new();
                        pattern_names(arena, *id, &mut names);
                        for n in names {
                            declare(scope, arena, n, VariableKind::LetConstBinding);
                        }
                    }
                }
            }
        }
        NodeKind::ForInStatement { left, is_decl: true, .. } | NodeKind::ForOfStatement { left, is_decl: true, .. } => {
            if let Ok(NodeKind::VariableDeclaration { declarators, .. }) = arena.get(*left).map(|n| &n.kind) {
                for &decl in declarators {
                    if let Ok(NodeKind::VariableDeclarator { id, .. }) = arena.get(decl).map(|n| &n.kind) {
                        let mut names = Vec::new();
                        pattern_names(arena, *id, &mut names);
                        for n in names {
                            declare(scope, arena, n, VariableKind::LetConstBinding);
                        }
                    }
                }
            }
        }
        _ => {}
    }

    let body = full_owned_body(arena, root)?;

    let mut statements = Vec::new();
    for &stmt in &body {
        each_owned_statement(arena, stmt, &mut |s| statements.push(s))?;
    }

    let mut unsafe_reason = None;
    for stmt in statements {
        match &arena.get(stmt)?.kind {
            NodeKind::VariableDeclaration { kind: VarKind::Let | VarKind::Const, declarators } => {
                for &decl in declarators {
                    if let Ok(NodeKind::VariableDeclarator { id, .. }) = arena.get(decl).map(|n| &n.kind) {
                        let mut names = Vec::new();
                        pattern_names(arena, *id, &mut names);
                        for n in names {
                            declare(scope, arena, n, VariableKind::LetConstBinding);
                        }
                    }
                }
            }
            NodeKind::ClassDeclaration { id: Some(id), .. } => {
                declare(scope, arena, *id, VariableKind::ClassDeclaration);
            }
            _ => {}
        }
        scan_for_unsafe_triggers(arena, stmt, &mut unsafe_reason)?;
    }
    scope.unsafe_reason = unsafe_reason;
    Ok(())
}

/// This scope root's own statements, same notion as [`owned_root_body`]
/// but covering every kind of scope root (arrow function, bare block,
/// catch clause, `for`/`for-in`/`for-of`), not just `Program`/function
/// declarations — needed here and by [`detect_captures`], neither of
/// which can skip a scope root just because it isn't hoisting-eligible.
fn full_owned_body(arena: &Arena, root: NodeId) -> AstResult<Vec<NodeId>> {
    Ok(match &arena.get(root)?.kind {
        NodeKind::Program { body } => body.clone(),
        NodeKind::FunctionDeclaration { body, .. } | NodeKind::FunctionExpression { body, .. } => {
            if let Ok(NodeKind::BlockStatement { body }) = arena.get(*body).map(|n| &n.kind) {
                body.clone()
            } else {
                vec![*body]
            }
        }
        NodeKind::ArrowFunctionExpression { body, is_expression_body, .. } => {
            if *is_expression_body {
                vec![*body]
            } else if let Ok(NodeKind::BlockStatement { body }) = arena.get(*body).map(|n| &n.kind) {
                body.clone()
            } else {
                vec![]
            }
        }
        NodeKind::BlockStatement { body } => body.clone(),
        NodeKind::CatchClause { body, .. } => {
            if let Ok(NodeKind::BlockStatement { body }) = arena.get(*body).map(|n| &n.kind) {
                body.clone()
            } else {
                vec![]
            }
        }
        NodeKind::ForStatement { body, .. } | NodeKind::ForInStatement { body, .. } | NodeKind::ForOfStatement { body, .. } => {
            vec![*body]
        }
        _ => vec![],
    })
}

/// Looks for `eval(...)` calls and reads inside this scope's own
/// statements, stopping at nested function boundaries (their own
/// `eval` usage is that scope's own problem, detected when it is
/// built). Grounded on `semantic_analysis`'s `UnsafeReason::EvalUsage`
/// detection; `with` is not modeled as a statement kind in this AST
/// (ES5 strict mode forbids it and it is absent from the parser's
/// supported statement set), so only `eval` and indirect
/// `window`/`global` member access are checked here.
fn scan_for_unsafe_triggers(arena: &Arena, stmt: NodeId, found: &mut Option<UnsafeReason>) -> AstResult<()> {
    let mut exprs = Vec::new();
    collect_owned_expressions(arena, stmt, &mut exprs)?;
    for expr in exprs {
        match arena.get(expr).map(|n| &n.kind) {
            Ok(NodeKind::Identifier { name }) if name == "eval" => {
                *found = Some(UnsafeReason::EvalUsage);
            }
            Ok(NodeKind::MemberExpression { object, computed: true, .. }) => {
                if let Ok(NodeKind::Identifier { name }) = arena.get(*object).map(|n| &n.kind) {
                    if name == "window" || name == "global" || name == "globalThis" {
                        found.get_or_insert(UnsafeReason::IndirectAccess);
                    }
                }
            }
            Ok(NodeKind::ThisExpression) => {
                found.get_or_insert(UnsafeReason::DynamicThis);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Expressions directly owned by this scope's statements — does not
/// descend into nested function/arrow bodies (those are a different
/// scope), matching `each_owned_statement`'s boundary.
fn collect_owned_expressions(arena: &Arena, node: NodeId, out: &mut Vec<NodeId>) -> AstResult<()> {
    let kind = &arena.get(node)?.kind;
    if kind.is_function_like() {
        return Ok(());
    }
    out.push(node);
    for child in arena.children(node)? {
        if !kind.is_function_like() {
            collect_owned_expressions(arena, child, out)?;
        }
    }
    Ok(())
}

/// Phase 3: mark which of this scope's own bindings are read or
/// written from inside a nested closure (§4.5 — a variable is captured
/// if any reference to it is recorded from a descendant scope).
/// `reference::collect`/`declare_own_and_detect_unsafe` both stop at a
/// nested function boundary and leave that scope's own references to
/// be collected separately when it is built; a pass renaming this
/// scope's binding still needs to know a closure reaches it, since that
/// closure's copy of the identifier lives outside the `body` a rename
/// walks. A structural proxy, not full scope resolution: a nested
/// function that shadows the name with its own parameter or declaration
/// is not distinguished from a real capture, so this can mark a binding
/// captured that every descendant closure actually shadows instead.
fn detect_captures(arena: &Arena, scope: &mut Scope, body: &[NodeId]) -> AstResult<()> {
    if scope.bindings.is_empty() {
        return Ok(());
    }
    let mut captured = HashSet::new();
    for &stmt in body {
        walk_for_capture(arena, stmt, false, scope, &mut captured)?;
    }
    for name in captured {
        if let Some(var) = scope.bindings.get_mut(&name) {
            var.is_captured = true;
        }
    }
    Ok(())
}

fn walk_for_capture(
    arena: &Arena,
    node: NodeId,
    inside_nested: bool,
    scope: &Scope,
    captured: &mut HashSet<String>,
) -> AstResult<()> {
    let kind = arena.get(node)?.kind.clone();
    if inside_nested {
        if let NodeKind::Identifier { name } = &kind {
            if scope.bindings.contains_key(name) {
                captured.insert(name.clone());
            }
        }
    }
    let crosses = kind.is_function_like();
    for child in crate::ast::children_of(&kind) {
        walk_for_capture(arena, child, inside_nested || crosses, scope, captured)?;
    }
    Ok(())
}

/// Populate `scope_id`'s bindings from scratch (both phases), used by
/// the scope creator on first build and on refresh (§4.7).
pub fn populate(arena: &Arena, tree: &mut ScopeTree, scope_id: ScopeId) -> ScopeResult<()> {
    let root = tree.get(scope_id)?.root;
    let body = owned_root_body(arena, root).unwrap_or_default();
    let capture_body = full_owned_body(arena, root).map_err(|_| ScopeError_from_ast())?;

    {
        let scope = tree.get_mut(scope_id)?;
        scope.bindings.clear();
        scope.unsafe_reason = None;
    }

    let scope = tree.get_mut(scope_id)?;
    hoist(arena, scope, &body).map_err(|_| ScopeError_from_ast())?;
    declare_own_and_detect_unsafe(arena, scope, root).map_err(|_| ScopeError_from_ast())?;
    detect_captures(arena, scope, &capture_body).map_err(|_| ScopeError_from_ast())?;
    Ok(())
}

/// Public so the pass layer can ask "what are this scope root's own
/// top-level statements" without re-deriving the function/program body
/// unwrapping logic itself.
pub fn owned_root_body(arena: &Arena, root: NodeId) -> AstResult<Vec<NodeId>> {
    match &arena.get(root)?.kind {
        NodeKind::Program { body } => Ok(body.clone()),
        NodeKind::FunctionDeclaration { body, .. } | NodeKind::FunctionExpression { body, .. } => {
            if let NodeKind::BlockStatement { body } = &arena.get(*body)?.kind {
                Ok(body.clone())
            } else {
                Ok(vec![*body])
            }
        }
        _ => Ok(vec![]),
    }
}

#[allow(non_snake_case)]
fn ScopeError_from_ast() -> crate::scope::ScopeError {
    // Structural AST lookups inside a scope we just allocated should
    // never fail; if they do, the arena and scope tree have drifted out
    // of sync, which is itself an internal invariant violation.
    crate::scope::ScopeError::MissingScope(ScopeId(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, NodeKind, SourceId, VarKind};

    fn ident(arena: &mut Arena, name: &str) -> NodeId {
        arena.alloc(NodeKind::Identifier { name: name.into() }, SourceId(0))
    }

    #[test]
    fn hoists_var_but_not_let() {
        let mut arena = Arena::new();
        let x = ident(&mut arena, "x");
        let decl_x = arena.alloc(
            NodeKind::VariableDeclarator { id: x, init: None },
            SourceId(0),
        );
        let var_decl = arena.alloc(
            NodeKind::VariableDeclaration { kind: VarKind::Var, declarators: vec![decl_x] },
            SourceId(0),
        );
        let y = ident(&mut arena, "y");
        let decl_y = arena.alloc(
            NodeKind::VariableDeclarator { id: y, init: None },
            SourceId(0),
        );
        let let_decl = arena.alloc(
            NodeKind::VariableDeclaration { kind: VarKind::Let, declarators: vec![decl_y] },
            SourceId(0),
        );
        let program = arena.alloc(NodeKind::Program { body: vec![var_decl, let_decl] }, SourceId(0));
        arena.set_root(program);

        let mut tree = ScopeTree::new();
        let scope_id = tree.alloc(program, None, false);
        populate(&arena, &mut tree, scope_id).unwrap();
        let scope = tree.get(scope_id).unwrap();
        assert!(scope.bindings.contains_key("x"));
        assert!(scope.bindings.contains_key("y"));
        assert_eq!(scope.bindings["x"].kind as u8, VariableKind::VarDeclaration as u8);
    }
}
