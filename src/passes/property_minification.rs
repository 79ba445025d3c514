//! Pass: property minification. Renames object-literal/member-access
//! property names to short consistent names across the whole program,
//! but only when no computed member access with a non-literal property
//! expression appears anywhere in it — a single `obj[x]` with a dynamic
//! `x` makes every property name in the program a potential target of
//! that dynamic lookup, so renaming bails out entirely rather than guess
//! which properties are actually safe. Grounded on
//! `transformer::property_minification`'s placeholder (same "Pass 4"
//! slot, same "safe property renaming" framing) — rebuilt on a real,
//! deliberately conservative safety check instead of its stub body.
//!
//! Intended to run once, at the program root, not once per function
//! scope: property names have no scope boundary the way variable names
//! do.

use std::collections::BTreeSet;

use crate::ast::{NodeId, NodeKind};
use crate::context::Context;
use crate::passes::{Pass, PassResult};

const RESERVED: &[&str] = &[
    "constructor", "prototype", "toString", "valueOf", "length", "__proto__", "call", "apply", "bind", "then", "catch", "finally", "name", "message", "stack",
];

pub struct PropertyMinification;

impl Pass for PropertyMinification {
    fn name(&self) -> &'static str {
        "property-minification"
    }

    fn run(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<bool> {
        if has_dynamic_member_access(&ctx.arena, scope_root)? {
            return Ok(false);
        }

        let mut names = BTreeSet::new();
        collect_property_names(&ctx.arena, scope_root, &mut names)?;
        names.retain(|n| !RESERVED.contains(&n.as_str()));
        if names.is_empty() {
            return Ok(false);
        }

        let plan: Vec<(String, String)> = names.into_iter().enumerate().map(|(i, old)| (old, super::identifier_renaming::short_name(i))).collect();
        let plan: Vec<(String, String)> = plan.into_iter().filter(|(old, new)| old != new).collect();
        if plan.is_empty() {
            return Ok(false);
        }

        let mut changed = false;
        for (old, new) in &plan {
            changed |= rename_property_occurrences(ctx, scope_root, old, new)?;
        }
        if changed {
            ctx.report_change(scope_root);
        }
        Ok(changed)
    }
}

fn has_dynamic_member_access(arena: &crate::ast::Arena, node: NodeId) -> crate::ast::AstResult<bool> {
    let kind = arena.get(node)?.kind.clone();
    if let NodeKind::MemberExpression { property, computed: true, .. } = &kind {
        if !matches!(arena.get(*property)?.kind, NodeKind::Literal(crate::ast::LiteralValue::String(_)) | NodeKind::Literal(crate::ast::LiteralValue::Number(_))) {
            return Ok(true);
        }
    }
    for child in crate::ast::children_of(&kind) {
        if has_dynamic_member_access(arena, child)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn collect_property_names(arena: &crate::ast::Arena, node: NodeId, out: &mut BTreeSet<String>) -> crate::ast::AstResult<()> {
    let kind = arena.get(node)?.kind.clone();
    match &kind {
        NodeKind::ObjectProperty { key, computed: false, .. } | NodeKind::ObjectPatternProperty { key, computed: false, .. } => {
            if let NodeKind::Identifier { name } = &arena.get(*key)?.kind {
                out.insert(name.clone());
            }
        }
        NodeKind::MethodDefinition { key, .. } | NodeKind::PropertyDefinition { key, .. } => {
            if let NodeKind::Identifier { name } = &arena.get(*key)?.kind {
                out.insert(name.clone());
            }
        }
        NodeKind::MemberExpression { property, computed: false, .. } => {
            if let NodeKind::Identifier { name } = &arena.get(*property)?.kind {
                out.insert(name.clone());
            }
        }
        _ => {}
    }
    for child in crate::ast::children_of(&kind) {
        collect_property_names(arena, child, out)?;
    }
    Ok(())
}

fn rename_property_occurrences(ctx: &mut Context, node: NodeId, old: &str, new: &str) -> PassResult<bool> {
    let kind = ctx.arena.get(node)?.kind.clone();
    let mut changed = false;
    let key_node = match &kind {
        NodeKind::ObjectProperty { key, computed: false, .. } | NodeKind::ObjectPatternProperty { key, computed: false, .. } => Some(*key),
        NodeKind::MethodDefinition { key, .. } | NodeKind::PropertyDefinition { key, .. } => Some(*key),
        NodeKind::MemberExpression { property, computed: false, .. } => Some(*property),
        _ => None,
    };
    if let Some(key_node) = key_node {
        if let Ok(NodeKind::Identifier { name }) = ctx.arena.get(key_node).map(|n| &n.kind) {
            if name == old {
                if let Ok(data) = ctx.arena.get_mut(key_node) {
                    if let NodeKind::Identifier { name } = &mut data.kind {
                        *name = new.to_string();
                        changed = true;
                    }
                }
            }
        }
    }
    for child in crate::ast::children_of(&kind) {
        changed |= rename_property_occurrences(ctx, child, old, new)?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, LiteralValue, PropertyKind, SourceId};
    use crate::context::{CompilerOptions, Context};
    use crate::diagnostics::VecSink;

    #[test]
    fn renames_a_property_with_no_dynamic_access_anywhere() {
        let mut arena = Arena::new();
        let key = arena.alloc(NodeKind::Identifier { name: "longPropertyName".into() }, SourceId(0));
        let val = arena.alloc(NodeKind::Literal(LiteralValue::Number(1.0)), SourceId(0));
        let prop = arena.alloc(NodeKind::ObjectProperty { key, value: val, kind: PropertyKind::Init, computed: false }, SourceId(0));
        let obj = arena.alloc(NodeKind::ObjectExpression { properties: vec![prop] }, SourceId(0));
        let stmt = arena.alloc(NodeKind::ExpressionStatement { expression: obj }, SourceId(0));
        let program = arena.alloc(NodeKind::Program { body: vec![stmt] }, SourceId(0));
        arena.set_root(program);

        let mut ctx = Context::new(arena, CompilerOptions::default(), Box::new(VecSink::default()));
        let mut pass = PropertyMinification;
        assert!(pass.run(&mut ctx, program).unwrap());
        let NodeKind::Identifier { name } = ctx.arena.get(key).unwrap().kind.clone() else { panic!() };
        assert_eq!(name, "a");
    }
}
