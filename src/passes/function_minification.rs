//! Pass: function minification. Inlines a function declaration whose
//! body is a single `return <expr>;`, whose parameters are plain
//! identifiers (no destructuring/defaults/rest), and which is called
//! exactly once, with a matching argument count, at a single call site —
//! splicing a copy of its return expression (parameters substituted for
//! arguments) directly into that call site and deleting the declaration.
//! Grounded on `transformer::function_minification`'s placeholder (same
//! "Pass 5", "function inlining" framing) — rebuilt on the reference
//! collector instead of its stub body.

use std::collections::HashMap;

use crate::ast::{Arena, AstResult, NodeId, NodeKind};
use crate::context::Context;
use crate::passes::{Pass, PassResult};
use crate::reference::RefKind;
use crate::scope::build::owned_root_body;

pub struct FunctionMinification;

impl Pass for FunctionMinification {
    fn name(&self) -> &'static str {
        "function-minification"
    }

    fn run(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<bool> {
        let body = owned_root_body(&ctx.arena, scope_root)?;
        if body.is_empty() {
            return Ok(false);
        }

        let scope_id = ctx.scope_creator.create_scope(&ctx.arena, scope_root, None)?;
        let tree = ctx.scope_creator.tree();
        let refs = crate::reference::collect(&ctx.arena, tree, &body, scope_id)?;

        let mut changed = false;
        for &stmt in &body {
            let Some(candidate) = inline_candidate(&ctx.arena, stmt)? else { continue };

            let Some(var) = ctx.scope_creator.tree().get(scope_id)?.bindings.get(&candidate.name).cloned() else { continue };
            if !matches!(var.kind, crate::scope::VariableKind::FunctionDeclaration) {
                continue;
            }
            let Some(refset) = refs.get(scope_id, &candidate.name) else { continue };
            if refset.references.len() != 1 || refset.references[0].kind != RefKind::Read {
                continue;
            }
            let call_callee = refset.references[0].occurrence;
            let Ok(Some(call_node)) = ctx.arena.get(call_callee).map(|n| n.parent) else { continue };
            let Ok(NodeKind::CallExpression { callee, arguments }) = ctx.arena.get(call_node).map(|n| n.kind.clone()) else { continue };
            if callee != call_callee || arguments.len() != candidate.params.len() {
                continue;
            }
            let Some(call_parent) = ctx.arena.get(call_node)?.parent else { continue };
            if calls_itself(&ctx.arena, candidate.return_expr, &candidate.name)? {
                continue;
            }

            let Some(decl_parent) = ctx.arena.get(stmt)?.parent else { continue };
            let subst: HashMap<String, NodeId> = candidate.params.iter().cloned().zip(arguments.iter().cloned()).collect();
            let cloned = clone_expr(ctx, candidate.return_expr, &subst)?;
            crate::ast::mutate::replace(ctx, call_parent, call_node, cloned, scope_root)?;
            crate::ast::mutate::detach(ctx, decl_parent, stmt, scope_root)?;
            ctx.report_deleted(stmt);
            changed = true;
        }

        Ok(changed)
    }
}

struct Candidate {
    name: String,
    params: Vec<String>,
    return_expr: NodeId,
}

fn inline_candidate(arena: &Arena, stmt: NodeId) -> AstResult<Option<Candidate>> {
    let NodeKind::FunctionDeclaration { id: Some(id), params, body, is_async: false, is_generator: false } = &arena.get(stmt)?.kind else {
        return Ok(None);
    };
    let NodeKind::Identifier { name } = &arena.get(*id)?.kind else { return Ok(None) };

    let mut param_names = Vec::with_capacity(params.len());
    for &p in params {
        let NodeKind::Identifier { name } = &arena.get(p)?.kind else { return Ok(None) };
        param_names.push(name.clone());
    }

    let NodeKind::BlockStatement { body: stmts } = &arena.get(*body)?.kind else { return Ok(None) };
    let [only] = stmts.as_slice() else { return Ok(None) };
    let NodeKind::ReturnStatement { argument: Some(expr) } = &arena.get(*only)?.kind else { return Ok(None) };
    if !is_inlinable_expr(arena, *expr)? {
        return Ok(None);
    }

    Ok(Some(Candidate { name: name.clone(), params: param_names, return_expr: *expr }))
}

fn calls_itself(arena: &Arena, node: NodeId, name: &str) -> AstResult<bool> {
    if let NodeKind::Identifier { name: n } = &arena.get(node)?.kind {
        if n == name {
            return Ok(true);
        }
    }
    for child in crate::ast::children_of(&arena.get(node)?.kind) {
        if calls_itself(arena, child, name)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Restricted to the expression kinds `clone_expr` below knows how to
/// rebuild; a nested function literal (captures its defining scope) or
/// an assignment/update (would need its own write-back semantics once
/// spliced into a different expression position) disqualifies a body
/// from inlining.
fn is_inlinable_expr(arena: &Arena, node: NodeId) -> AstResult<bool> {
    let kind = arena.get(node)?.kind.clone();
    if kind.is_function_like() {
        return Ok(false);
    }
    if matches!(kind, NodeKind::AssignmentExpression { .. } | NodeKind::UpdateExpression { .. }) {
        return Ok(false);
    }
    for child in crate::ast::children_of(&kind) {
        if !is_inlinable_expr(arena, child)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Deep-clones an expression subtree, substituting any `Identifier`
/// matching a key in `subst` with a fresh clone of the corresponding
/// replacement subtree (an inlined call's argument may need to be
/// duplicated more than once if the parameter is used more than once in
/// the body).
fn clone_expr(ctx: &mut Context, node: NodeId, subst: &HashMap<String, NodeId>) -> PassResult<NodeId> {
    let data = ctx.arena.get(node)?;
    let source = data.source;
    let kind = data.kind.clone();

    if let NodeKind::Identifier { name } = &kind {
        if let Some(&replacement) = subst.get(name) {
            return clone_expr(ctx, replacement, &HashMap::new());
        }
    }

    let new_kind = rebuild_with_cloned_children(ctx, &kind, subst)?;
    let new_node = ctx.arena.alloc(new_kind, source);
    Ok(new_node)
}

fn rebuild_with_cloned_children(ctx: &mut Context, kind: &NodeKind, subst: &HashMap<String, NodeId>) -> PassResult<NodeKind> {
    use NodeKind::*;
    Ok(match kind.clone() {
        Identifier { name } => Identifier { name },
        ThisExpression => ThisExpression,
        Literal(v) => Literal(v),
        TemplateLiteral { quasis, expressions } => {
            let mut cloned = Vec::with_capacity(expressions.len());
            for e in expressions {
                cloned.push(clone_expr(ctx, e, subst)?);
            }
            TemplateLiteral { quasis, expressions: cloned }
        }
        BinaryExpression { operator, left, right } => BinaryExpression {
            operator,
            left: clone_expr(ctx, left, subst)?,
            right: clone_expr(ctx, right, subst)?,
        },
        LogicalExpression { operator, left, right } => LogicalExpression {
            operator,
            left: clone_expr(ctx, left, subst)?,
            right: clone_expr(ctx, right, subst)?,
        },
        UnaryExpression { operator, argument } => UnaryExpression { operator, argument: clone_expr(ctx, argument, subst)? },
        ConditionalExpression { test, consequent, alternate } => ConditionalExpression {
            test: clone_expr(ctx, test, subst)?,
            consequent: clone_expr(ctx, consequent, subst)?,
            alternate: clone_expr(ctx, alternate, subst)?,
        },
        CallExpression { callee, arguments } => {
            let callee = clone_expr(ctx, callee, subst)?;
            let mut cloned = Vec::with_capacity(arguments.len());
            for a in arguments {
                cloned.push(clone_expr(ctx, a, subst)?);
            }
            CallExpression { callee, arguments: cloned }
        }
        NewExpression { callee, arguments } => {
            let callee = clone_expr(ctx, callee, subst)?;
            let mut cloned = Vec::with_capacity(arguments.len());
            for a in arguments {
                cloned.push(clone_expr(ctx, a, subst)?);
            }
            NewExpression { callee, arguments: cloned }
        }
        MemberExpression { object, property, computed } => {
            let object = clone_expr(ctx, object, subst)?;
            let property = if computed { clone_expr(ctx, property, subst)? } else { duplicate_leaf(ctx, property)? };
            MemberExpression { object, property, computed }
        }
        ArrayExpression { elements } => {
            let mut cloned = Vec::with_capacity(elements.len());
            for e in elements {
                cloned.push(match e {
                    Some(e) => Some(clone_expr(ctx, e, subst)?),
                    None => None,
                });
            }
            ArrayExpression { elements: cloned }
        }
        ObjectExpression { properties } => {
            let mut cloned = Vec::with_capacity(properties.len());
            for p in properties {
                cloned.push(clone_expr(ctx, p, subst)?);
            }
            ObjectExpression { properties: cloned }
        }
        ObjectProperty { key, value, kind, computed } => {
            let key = if computed { clone_expr(ctx, key, subst)? } else { duplicate_leaf(ctx, key)? };
            let value = clone_expr(ctx, value, subst)?;
            ObjectProperty { key, value, kind, computed }
        }
        other => other,
    })
}

/// A non-computed object/member key is never substituted (it is not a
/// value-producing expression in that position) but still needs a fresh
/// `NodeId` of its own when its parent is cloned.
fn duplicate_leaf(ctx: &mut Context, node: NodeId) -> PassResult<NodeId> {
    let data = ctx.arena.get(node)?;
    Ok(ctx.arena.alloc(data.kind.clone(), data.source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, LiteralValue, SourceId};
    use crate::context::{CompilerOptions, Context};
    use crate::diagnostics::VecSink;

    #[test]
    fn inlines_a_single_expression_function_called_once() {
        let mut arena = Arena::new();
        let param_a = arena.alloc(NodeKind::Identifier { name: "a".into() }, SourceId(0));
        let ret_ref = arena.alloc(NodeKind::Identifier { name: "a".into() }, SourceId(0));
        let one = arena.alloc(NodeKind::Literal(LiteralValue::Number(1.0)), SourceId(0));
        let sum = arena.alloc(NodeKind::BinaryExpression { operator: crate::ast::BinaryOperator::Add, left: ret_ref, right: one }, SourceId(0));
        let ret_stmt = arena.alloc(NodeKind::ReturnStatement { argument: Some(sum) }, SourceId(0));
        let fn_body = arena.alloc(NodeKind::BlockStatement { body: vec![ret_stmt] }, SourceId(0));
        let fn_id = arena.alloc(NodeKind::Identifier { name: "inc".into() }, SourceId(0));
        let fn_decl = arena.alloc(
            NodeKind::FunctionDeclaration { id: Some(fn_id), params: vec![param_a], body: fn_body, is_async: false, is_generator: false },
            SourceId(0),
        );

        let callee = arena.alloc(NodeKind::Identifier { name: "inc".into() }, SourceId(0));
        let arg = arena.alloc(NodeKind::Literal(LiteralValue::Number(4.0)), SourceId(0));
        let call = arena.alloc(NodeKind::CallExpression { callee, arguments: vec![arg] }, SourceId(0));
        let call_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: call }, SourceId(0));

        let program = arena.alloc(NodeKind::Program { body: vec![fn_decl, call_stmt] }, SourceId(0));
        arena.set_root(program);

        let mut ctx = Context::new(arena, CompilerOptions::default(), Box::new(VecSink::default()));
        let mut pass = FunctionMinification;
        assert!(pass.run(&mut ctx, program).unwrap());
        assert!(!ctx.arena.is_reachable(fn_decl).unwrap());
        let NodeKind::ExpressionStatement { expression } = ctx.arena.get(call_stmt).unwrap().kind.clone() else { panic!() };
        assert!(matches!(ctx.arena.get(expression).unwrap().kind, NodeKind::BinaryExpression { .. }));
    }
}
