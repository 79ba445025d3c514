//! Mutation primitives (§4.1 "append child, detach, replace"). Every
//! primitive here funnels through [`crate::context::Context::report_change`]
//! so "mutations must be reported" is structural rather than a
//! convention passes have to remember — see §4.10.

use crate::ast::{children_of, AstError, AstResult, NodeId, NodeKind};
use crate::context::Context;

/// Append `child` to the end of a `Program`/`BlockStatement`/`switch`
/// case body. `scope_root` is the enclosing scope root the caller is
/// operating in (a pass always knows this — it is iterating that
/// scope); it is what gets the change report, per §4.8's "a pass
/// reports which scope roots it mutated".
pub fn append_statement(ctx: &mut Context, container: NodeId, statement: NodeId, scope_root: NodeId) -> AstResult<()> {
    let node = ctx.arena.get_mut(container)?;
    match &mut node.kind {
        NodeKind::Program { body } | NodeKind::BlockStatement { body } => body.push(statement),
        _ => return Err(AstError::NotReachable(container)),
    }
    if let Ok(child) = ctx.arena.get_mut(statement) {
        child.parent = Some(container);
        child.detached = false;
    }
    ctx.report_change(scope_root);
    Ok(())
}

/// Detach `node` from its parent: it stops being reachable from the
/// root (§3 "a node that is detached ... is not reachable from the
/// current root") but remains a valid arena entry, since an analysis may
/// still hold a reference to it.
pub fn detach(ctx: &mut Context, parent: NodeId, node: NodeId, scope_root: NodeId) -> AstResult<()> {
    let removed = {
        let parent_data = ctx.arena.get_mut(parent)?;
        remove_child(&mut parent_data.kind, node)
    };
    if !removed {
        return Err(AstError::NotReachable(node));
    }
    if let Ok(child) = ctx.arena.get_mut(node) {
        child.detached = true;
    }
    ctx.report_change(scope_root);
    Ok(())
}

/// Replace every occurrence of `old` in `parent`'s kind with `new`.
/// Used by expression-simplification-style passes that swap a subtree
/// for a computed replacement (e.g. constant folding).
pub fn replace(ctx: &mut Context, parent: NodeId, old: NodeId, new: NodeId, scope_root: NodeId) -> AstResult<()> {
    let replaced = {
        let parent_data = ctx.arena.get_mut(parent)?;
        replace_child(&mut parent_data.kind, old, new)
    };
    if !replaced {
        return Err(AstError::NotReachable(old));
    }
    if let Ok(old_node) = ctx.arena.get_mut(old) {
        old_node.detached = true;
    }
    if let Ok(new_node) = ctx.arena.get_mut(new) {
        new_node.parent = Some(parent);
        new_node.detached = false;
    }
    ctx.report_change(scope_root);
    Ok(())
}

/// Remove the first occurrence of `target` from `kind`'s child slots.
/// Returns whether anything was removed.
fn remove_child(kind: &mut NodeKind, target: NodeId) -> bool {
    use NodeKind::*;
    fn drop_from_vec(v: &mut Vec<NodeId>, target: NodeId) -> bool {
        let before = v.len();
        v.retain(|id| *id != target);
        v.len() != before
    }
    fn drop_from_opt_vec(v: &mut Vec<Option<NodeId>>, target: NodeId) -> bool {
        let before = v.len();
        v.retain(|id| *id != Some(target));
        v.len() != before
    }
    fn clear_opt(o: &mut Option<NodeId>, target: NodeId) -> bool {
        if *o == Some(target) {
            *o = None;
            true
        } else {
            false
        }
    }

    match kind {
        Program { body } | BlockStatement { body } => drop_from_vec(body, target),
        VariableDeclaration { declarators, .. } => drop_from_vec(declarators, target),
        VariableDeclarator { init, .. } => clear_opt(init, target),
        ClassDeclaration { superclass, body, .. } => {
            clear_opt(superclass, target) || drop_from_vec(body, target)
        }
        ReturnStatement { argument } => clear_opt(argument, target),
        IfStatement { alternate, .. } => clear_opt(alternate, target),
        SwitchStatement { cases, .. } => drop_from_vec(cases, target),
        SwitchCase { test, consequent } => clear_opt(test, target) || drop_from_vec(consequent, target),
        TryStatement { handler, finalizer, .. } => clear_opt(handler, target) || clear_opt(finalizer, target),
        ImportDeclaration { specifiers, .. } => drop_from_vec(specifiers, target),
        ExportNamedDeclaration { declaration, specifiers } => {
            clear_opt(declaration, target) || drop_from_vec(specifiers, target)
        }
        CallExpression { arguments, .. } | NewExpression { arguments, .. } => drop_from_vec(arguments, target),
        ObjectExpression { properties } => drop_from_vec(properties, target),
        ArrayExpression { elements } => drop_from_opt_vec(elements, target),
        ArrayPattern { elements } => drop_from_opt_vec(elements, target),
        ObjectPattern { properties } => drop_from_vec(properties, target),
        TemplateLiteral { expressions, .. } => drop_from_vec(expressions, target),
        _ => false,
    }
}

/// Replace the first occurrence of `old` in `kind`'s child slots with
/// `new`. Returns whether anything was replaced.
fn replace_child(kind: &mut NodeKind, old: NodeId, new: NodeId) -> bool {
    use NodeKind::*;
    fn swap_vec(v: &mut [NodeId], old: NodeId, new: NodeId) -> bool {
        for slot in v.iter_mut() {
            if *slot == old {
                *slot = new;
                return true;
            }
        }
        false
    }
    fn swap_opt(o: &mut Option<NodeId>, old: NodeId, new: NodeId) -> bool {
        if *o == Some(old) {
            *o = Some(new);
            true
        } else {
            false
        }
    }
    fn swap_single(slot: &mut NodeId, old: NodeId, new: NodeId) -> bool {
        if *slot == old {
            *slot = new;
            true
        } else {
            false
        }
    }

    match kind {
        Program { body } | BlockStatement { body } => swap_vec(body, old, new),
        VariableDeclaration { declarators, .. } => swap_vec(declarators, old, new),
        VariableDeclarator { id, init } => swap_single(id, old, new) || swap_opt(init, old, new),
        ExpressionStatement { expression } => swap_single(expression, old, new),
        ReturnStatement { argument } => swap_opt(argument, old, new),
        ThrowStatement { argument } => swap_single(argument, old, new),
        IfStatement { test, consequent, alternate } => {
            swap_single(test, old, new) || swap_single(consequent, old, new) || swap_opt(alternate, old, new)
        }
        WhileStatement { test, body } => swap_single(test, old, new) || swap_single(body, old, new),
        DoWhileStatement { body, test } => swap_single(body, old, new) || swap_single(test, old, new),
        ForStatement { init, test, update, body } => {
            swap_opt(init, old, new) || swap_opt(test, old, new) || swap_opt(update, old, new) || swap_single(body, old, new)
        }
        ForInStatement { left, right, body, .. } | ForOfStatement { left, right, body, .. } => {
            swap_single(left, old, new) || swap_single(right, old, new) || swap_single(body, old, new)
        }
        BinaryExpression { left, right, .. } | LogicalExpression { left, right, .. } | AssignmentExpression { left, right, .. } => {
            swap_single(left, old, new) || swap_single(right, old, new)
        }
        UnaryExpression { argument, .. } | UpdateExpression { argument, .. } => swap_single(argument, old, new),
        ConditionalExpression { test, consequent, alternate } => {
            swap_single(test, old, new) || swap_single(consequent, old, new) || swap_single(alternate, old, new)
        }
        CallExpression { callee, arguments } | NewExpression { callee, arguments } => {
            swap_single(callee, old, new) || swap_vec(arguments, old, new)
        }
        MemberExpression { object, property, .. } => swap_single(object, old, new) || swap_single(property, old, new),
        ObjectProperty { key, value, .. } => swap_single(key, old, new) || swap_single(value, old, new),
        ArrayExpression { elements } => {
            for slot in elements.iter_mut() {
                if *slot == Some(old) {
                    *slot = Some(new);
                    return true;
                }
            }
            false
        }
        TemplateLiteral { expressions, .. } => swap_vec(expressions, old, new),
        _ => {
            // Fall back to a structural check so unhandled container
            // kinds fail loudly instead of silently no-op'ing.
            debug_assert!(
                !children_of(kind).contains(&old),
                "replace_child: unhandled NodeKind variant containing the target node"
            );
            false
        }
    }
}
