//! Pass: expression simplification. Constant-folds arithmetic,
//! comparison, bitwise, and logical expressions built entirely from
//! literals, and collapses a logical/conditional expression to whichever
//! side is statically known to run once its test or left operand is a
//! constant. Grounded on `transformer::expression_simplification`'s
//! placeholder (same "Pass 3" slot, same name) — rebuilt on real
//! evaluation instead of its stub body.

use crate::ast::{AstResult, BinaryOperator, LiteralValue, NodeId, NodeKind, UnaryOperator};
use crate::context::Context;
use crate::passes::{Pass, PassResult};
use crate::scope::build::owned_root_body;

pub struct ExpressionSimplification;

impl Pass for ExpressionSimplification {
    fn name(&self) -> &'static str {
        "expression-simplification"
    }

    fn run(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<bool> {
        let body = owned_root_body(&ctx.arena, scope_root)?;
        let mut changed = false;
        for stmt in body {
            changed |= simplify(ctx, stmt, scope_root)?;
        }
        Ok(changed)
    }
}

/// Folds `node`'s own constant subexpressions and recurses into its
/// children, stopping at nested function literals (those are a
/// different scope root's own pass invocation).
fn simplify(ctx: &mut Context, node: NodeId, scope_root: NodeId) -> PassResult<bool> {
    let kind = ctx.arena.get(node)?.kind.clone();
    if kind.is_function_like() && node != scope_root {
        return Ok(false);
    }

    let mut changed = false;
    for child in crate::ast::children_of(&kind) {
        changed |= simplify(ctx, child, scope_root)?;
    }

    let Some(parent) = ctx.arena.get(node)?.parent else {
        return Ok(changed);
    };

    match &kind {
        NodeKind::BinaryExpression { .. } | NodeKind::UnaryExpression { .. } => {
            if let Some(value) = fold_literal(&ctx.arena, node)? {
                let source = ctx.arena.get(node)?.source;
                let replacement = ctx.arena.alloc(NodeKind::Literal(value), source);
                crate::ast::mutate::replace(ctx, parent, node, replacement, scope_root)?;
                changed = true;
            }
        }
        NodeKind::LogicalExpression { operator, left, right } => {
            if let Some(truthy) = constant_truthiness(&ctx.arena, *left)? {
                let keep_left = matches!(operator, crate::ast::LogicalOperator::And) != truthy;
                let winner = if keep_left { *left } else { *right };
                crate::ast::mutate::replace(ctx, parent, node, winner, scope_root)?;
                changed = true;
            }
        }
        NodeKind::ConditionalExpression { test, consequent, alternate } => {
            if let Some(truthy) = constant_truthiness(&ctx.arena, *test)? {
                let winner = if truthy { *consequent } else { *alternate };
                crate::ast::mutate::replace(ctx, parent, node, winner, scope_root)?;
                changed = true;
            }
        }
        _ => {}
    }

    Ok(changed)
}

fn constant_truthiness(arena: &crate::ast::Arena, node: NodeId) -> AstResult<Option<bool>> {
    Ok(fold_literal(arena, node)?.map(|v| literal_truthy(&v)))
}

fn literal_truthy(v: &LiteralValue) -> bool {
    match v {
        LiteralValue::String(s) => !s.is_empty(),
        LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
        LiteralValue::Boolean(b) => *b,
        LiteralValue::Null => false,
        LiteralValue::RegExp { .. } => true,
    }
}

/// Evaluates `node` to a literal value if it is built entirely out of
/// literals and the handful of operators this folder understands,
/// otherwise returns `None` (the expression depends on something
/// runtime-only and is left alone).
fn fold_literal(arena: &crate::ast::Arena, node: NodeId) -> AstResult<Option<LiteralValue>> {
    Ok(match &arena.get(node)?.kind {
        NodeKind::Literal(v) => Some(v.clone()),
        NodeKind::UnaryExpression { operator, argument } => {
            let Some(v) = fold_literal(arena, *argument)? else { return Ok(None) };
            fold_unary(*operator, &v)
        }
        NodeKind::BinaryExpression { operator, left, right } => {
            let (Some(l), Some(r)) = (fold_literal(arena, *left)?, fold_literal(arena, *right)?) else {
                return Ok(None);
            };
            fold_binary(*operator, &l, &r)
        }
        _ => None,
    })
}

fn fold_unary(op: UnaryOperator, v: &LiteralValue) -> Option<LiteralValue> {
    match (op, v) {
        (UnaryOperator::Minus, LiteralValue::Number(n)) => Some(LiteralValue::Number(-n)),
        (UnaryOperator::Plus, LiteralValue::Number(n)) => Some(LiteralValue::Number(*n)),
        (UnaryOperator::Not, _) => Some(LiteralValue::Boolean(!literal_truthy(v))),
        (UnaryOperator::BitNot, LiteralValue::Number(n)) => Some(LiteralValue::Number(!(*n as i32) as f64)),
        _ => None,
    }
}

fn fold_binary(op: BinaryOperator, l: &LiteralValue, r: &LiteralValue) -> Option<LiteralValue> {
    use BinaryOperator::*;
    if let (LiteralValue::Number(a), LiteralValue::Number(b)) = (l, r) {
        return match op {
            Add => Some(LiteralValue::Number(a + b)),
            Sub => Some(LiteralValue::Number(a - b)),
            Mul => Some(LiteralValue::Number(a * b)),
            Div => Some(LiteralValue::Number(a / b)),
            Mod => Some(LiteralValue::Number(a % b)),
            Exponent => Some(LiteralValue::Number(a.powf(*b))),
            BitAnd => Some(LiteralValue::Number(((*a as i32) & (*b as i32)) as f64)),
            BitOr => Some(LiteralValue::Number(((*a as i32) | (*b as i32)) as f64)),
            BitXor => Some(LiteralValue::Number(((*a as i32) ^ (*b as i32)) as f64)),
            ShiftLeft => Some(LiteralValue::Number(((*a as i32) << (*b as i32 & 31)) as f64)),
            ShiftRight => Some(LiteralValue::Number(((*a as i32) >> (*b as i32 & 31)) as f64)),
            UnsignedShiftRight => Some(LiteralValue::Number(((*a as u32) >> (*b as i32 & 31)) as f64)),
            Equal | StrictEqual => Some(LiteralValue::Boolean(a == b)),
            NotEqual | StrictNotEqual => Some(LiteralValue::Boolean(a != b)),
            Less => Some(LiteralValue::Boolean(a < b)),
            LessEqual => Some(LiteralValue::Boolean(a <= b)),
            Greater => Some(LiteralValue::Boolean(a > b)),
            GreaterEqual => Some(LiteralValue::Boolean(a >= b)),
            In | InstanceOf => None,
        };
    }
    if op == Add {
        if let (LiteralValue::String(a), LiteralValue::String(b)) = (l, r) {
            return Some(LiteralValue::String(format!("{a}{b}")));
        }
    }
    match op {
        StrictEqual => Some(LiteralValue::Boolean(literal_eq(l, r))),
        StrictNotEqual => Some(LiteralValue::Boolean(!literal_eq(l, r))),
        _ => None,
    }
}

fn literal_eq(a: &LiteralValue, b: &LiteralValue) -> bool {
    match (a, b) {
        (LiteralValue::String(x), LiteralValue::String(y)) => x == y,
        (LiteralValue::Number(x), LiteralValue::Number(y)) => x == y,
        (LiteralValue::Boolean(x), LiteralValue::Boolean(y)) => x == y,
        (LiteralValue::Null, LiteralValue::Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, SourceId};
    use crate::context::{CompilerOptions, Context};
    use crate::diagnostics::VecSink;

    #[test]
    fn folds_a_constant_addition() {
        let mut arena = Arena::new();
        let a = arena.alloc(NodeKind::Literal(LiteralValue::Number(2.0)), SourceId(0));
        let b = arena.alloc(NodeKind::Literal(LiteralValue::Number(3.0)), SourceId(0));
        let sum = arena.alloc(NodeKind::BinaryExpression { operator: BinaryOperator::Add, left: a, right: b }, SourceId(0));
        let stmt = arena.alloc(NodeKind::ExpressionStatement { expression: sum }, SourceId(0));
        let program = arena.alloc(NodeKind::Program { body: vec![stmt] }, SourceId(0));
        arena.set_root(program);

        let mut ctx = Context::new(arena, CompilerOptions::default(), Box::new(VecSink::default()));
        let mut pass = ExpressionSimplification;
        assert!(pass.run(&mut ctx, program).unwrap());
        let NodeKind::ExpressionStatement { expression } = ctx.arena.get(stmt).unwrap().kind.clone() else { panic!() };
        assert_eq!(ctx.arena.get(expression).unwrap().kind, NodeKind::Literal(LiteralValue::Number(5.0)));
    }
}
