//! Pass: dead code elimination. Removes statements the control-flow
//! graph shows are unreachable from entry, and variable declarators
//! whose binding is never read and whose initializer cannot have a
//! side effect. Grounded on `transformer::dead_code_elimination`'s
//! placeholder (same pass name, same "Pass 2" slot in the pipeline),
//! rebuilt on the real [`crate::cfg`] and [`crate::reference`] layers
//! instead of its stub body.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::ast::{AstResult, NodeId, NodeKind};
use crate::cfg::{Builder, Cfg, Vertex};
use crate::context::Context;
use crate::passes::{Pass, PassResult};
use crate::scope::build::owned_root_body;

pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead-code-elimination"
    }

    fn run(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<bool> {
        let body = owned_root_body(&ctx.arena, scope_root)?;
        if body.is_empty() {
            return Ok(false);
        }

        let mut changed = remove_unreachable_statements(ctx, scope_root, &body)?;
        changed |= remove_dead_declarators(ctx, scope_root, &body)?;
        Ok(changed)
    }
}

fn reachable_from_entry(cfg: &Cfg) -> HashSet<NodeIndex> {
    let mut seen = HashSet::new();
    let mut stack = vec![cfg.entry()];
    while let Some(v) = stack.pop() {
        if !seen.insert(v) {
            continue;
        }
        for (next, _) in cfg.successors(v) {
            if !seen.contains(&next) {
                stack.push(next);
            }
        }
    }
    seen
}

/// Statements the CFG shows have no path from entry — classically, code
/// after a `return`/`throw`/unconditional `break`/`continue` in the same
/// block. Only statements that are direct children of a `Program`/
/// `BlockStatement` body are removed; unreachable branches nested inside
/// other containers (e.g. one arm of an `if`) need structural rewriting
/// rather than a plain detach and are left for a future pass.
fn remove_unreachable_statements(ctx: &mut Context, scope_root: NodeId, body: &[NodeId]) -> PassResult<bool> {
    let cfg = Builder::build(&ctx.arena, body)?;
    let reachable = reachable_from_entry(&cfg);

    let mut dead = Vec::new();
    for v in cfg.node_indices() {
        if reachable.contains(&v) {
            continue;
        }
        if let Vertex::Statement(node) = cfg.vertex(v) {
            dead.push(*node);
        }
    }

    let mut changed = false;
    for node in dead {
        let Ok(data) = ctx.arena.get(node) else { continue };
        if data.detached {
            continue;
        }
        let Some(parent) = data.parent else { continue };
        let is_function = matches!(data.kind, NodeKind::FunctionDeclaration { .. });
        if crate::ast::mutate::detach(ctx, parent, node, scope_root).is_ok() {
            changed = true;
            if is_function {
                ctx.report_deleted(node);
            }
        }
    }
    Ok(changed)
}

/// `var`/`let`/`const` declarators never read anywhere and whose
/// initializer can't itself have a side effect (no call, no assignment,
/// no update expression anywhere inside it) are pure dead stores.
fn remove_dead_declarators(ctx: &mut Context, scope_root: NodeId, body: &[NodeId]) -> PassResult<bool> {
    let scope_id = ctx.scope_creator.create_scope(&ctx.arena, scope_root, None)?;
    let tree = ctx.scope_creator.tree();
    let refs = crate::reference::collect(&ctx.arena, tree, body, scope_id)?;

    let mut candidates = Vec::new();
    for &stmt in body {
        collect_declarators(&ctx.arena, stmt, &mut candidates)?;
    }

    let mut changed = false;
    for (var_decl, declarator, name) in candidates {
        let has_reads = refs.get(scope_id, &name).map(|r| r.reads() > 0).unwrap_or(false);
        if has_reads {
            continue;
        }
        let Ok(NodeKind::VariableDeclarator { init, .. }) = ctx.arena.get(declarator).map(|n| &n.kind).cloned() else {
            continue;
        };
        if let Some(init) = init {
            if has_side_effect(&ctx.arena, init)? {
                continue;
            }
        }
        if crate::ast::mutate::detach(ctx, var_decl, declarator, scope_root).is_ok() {
            changed = true;
        }
    }
    Ok(changed)
}

fn collect_declarators(arena: &crate::ast::Arena, node: NodeId, out: &mut Vec<(NodeId, NodeId, String)>) -> AstResult<()> {
    if let NodeKind::VariableDeclaration { declarators, .. } = &arena.get(node)?.kind {
        for &decl in declarators {
            if let NodeKind::VariableDeclarator { id, .. } = &arena.get(decl)?.kind {
                if let NodeKind::Identifier { name } = &arena.get(*id)?.kind {
                    out.push((node, decl, name.clone()));
                }
            }
        }
    }
    for child in crate::ast::children_of(&arena.get(node)?.kind) {
        collect_declarators(arena, child, out)?;
    }
    Ok(())
}

fn has_side_effect(arena: &crate::ast::Arena, node: NodeId) -> AstResult<bool> {
    let kind = &arena.get(node)?.kind;
    if matches!(
        kind,
        NodeKind::CallExpression { .. } | NodeKind::NewExpression { .. } | NodeKind::AssignmentExpression { .. } | NodeKind::UpdateExpression { .. }
    ) {
        return Ok(true);
    }
    for child in crate::ast::children_of(kind) {
        if has_side_effect(arena, child)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, AssignmentOperator, LiteralValue, SourceId};
    use crate::context::{CompilerOptions, Context};
    use crate::diagnostics::VecSink;

    #[test]
    fn a_statement_after_return_is_removed() {
        let mut arena = Arena::new();
        let ret = arena.alloc(NodeKind::ReturnStatement { argument: None }, SourceId(0));
        let lit = arena.alloc(NodeKind::Literal(LiteralValue::Number(1.0)), SourceId(0));
        let after = arena.alloc(NodeKind::ExpressionStatement { expression: lit }, SourceId(0));
        let func_body = arena.alloc(NodeKind::BlockStatement { body: vec![ret, after] }, SourceId(0));
        let func = arena.alloc(
            NodeKind::FunctionDeclaration { id: None, params: vec![], body: func_body, is_async: false, is_generator: false },
            SourceId(0),
        );
        let program = arena.alloc(NodeKind::Program { body: vec![func] }, SourceId(0));
        arena.set_root(program);

        let mut ctx = Context::new(arena, CompilerOptions::default(), Box::new(VecSink::default()));
        let mut pass = DeadCodeElimination;
        let changed = pass.run(&mut ctx, func).unwrap();
        assert!(changed);
        assert!(!ctx.arena.is_reachable(after).unwrap());
    }

    #[test]
    fn an_unread_var_with_a_pure_initializer_is_removed() {
        let mut arena = Arena::new();
        let x = arena.alloc(NodeKind::Identifier { name: "x".into() }, SourceId(0));
        let lit = arena.alloc(NodeKind::Literal(LiteralValue::Number(1.0)), SourceId(0));
        let decl = arena.alloc(NodeKind::VariableDeclarator { id: x, init: Some(lit) }, SourceId(0));
        let var_decl = arena.alloc(NodeKind::VariableDeclaration { kind: crate::ast::VarKind::Let, declarators: vec![decl] }, SourceId(0));
        let program = arena.alloc(NodeKind::Program { body: vec![var_decl] }, SourceId(0));
        arena.set_root(program);

        let mut ctx = Context::new(arena, CompilerOptions::default(), Box::new(VecSink::default()));
        let mut pass = DeadCodeElimination;
        let changed = pass.run(&mut ctx, program).unwrap();
        assert!(changed);
        assert!(!ctx.arena.is_reachable(decl).unwrap());
        let _ = AssignmentOperator::Assign;
    }
}
