//! Live-variable analysis (§4.4): a backward dataflow pass computing,
//! for every CFG vertex, the set of variable names that might be read
//! before their next write. Also produces the escape-set side output:
//! names live at any point a closure is formed, which dead-code
//! elimination and identifier renaming both need to know about before
//! touching a binding (§4.4's "escape set").

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::ast::{Arena, NodeId, NodeKind};
use crate::cfg::{Cfg, Vertex};
use crate::dataflow::{Direction, Lattice, Solution, Solver, Transfer};

/// A flat set of variable names — the lattice for liveness. Join is
/// union; bottom is the empty set ("nothing known to be live yet").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VarSet(pub HashSet<String>);

impl Lattice for VarSet {
    fn bottom() -> Self {
        VarSet(HashSet::new())
    }

    fn join(&self, other: &Self) -> Self {
        VarSet(self.0.union(&other.0).cloned().collect())
    }
}

/// Runs liveness over `cfg`, deriving each vertex's use/def sets from
/// `arena`, and returns both the raw per-vertex solution and the escape
/// set: names live at the entry of any vertex holding a
/// `FunctionExpression`/`ArrowFunctionExpression` literal (i.e. names a
/// closure formed there might capture).
pub fn analyze(
    arena: &Arena,
    cfg: &Cfg,
    max_iterations: usize,
) -> crate::dataflow::DataflowResult<(Solution<VarSet>, HashSet<String>)> {
    let analysis = CfgAnalysis { arena, cfg };
    let solver = Solver::new(max_iterations);
    let solution = solver.solve(cfg, &analysis)?;

    let mut escapes = HashSet::new();
    for v in cfg.node_indices() {
        if let Vertex::Statement(node) | Vertex::Condition(node) = cfg.vertex(v) {
            if contains_function_literal(arena, *node) {
                if let Some(fact) = solution.in_facts.get(&v) {
                    escapes.extend(fact.0.iter().cloned());
                }
            }
        }
    }

    Ok((solution, escapes))
}

struct CfgAnalysis<'a> {
    arena: &'a Arena,
    cfg: &'a Cfg,
}

impl<'a> Transfer for CfgAnalysis<'a> {
    type Fact = VarSet;

    fn direction(&self) -> Direction {
        Direction::Backward
    }

    fn transfer(&self, vertex: NodeIndex, out: &VarSet) -> VarSet {
        let node = match self.cfg.vertex(vertex) {
            Vertex::Statement(n) | Vertex::Condition(n) => Some(*n),
            Vertex::Entry | Vertex::Exit => None,
        };
        let Some(node) = node else {
            return out.clone();
        };
        let (uses, defs) = uses_and_defs(self.arena, node);
        let mut result: HashSet<String> = out.0.difference(&defs).cloned().collect();
        result.extend(uses);
        VarSet(result)
    }
}

/// True if `node`'s own expressions (not crossing into a nested
/// function's *own* nested functions) directly contain a function
/// literal — i.e. a closure is formed at this statement.
fn contains_function_literal(arena: &Arena, node: NodeId) -> bool {
    let Ok(data) = arena.get(node) else { return false };
    if matches!(data.kind, NodeKind::FunctionExpression { .. } | NodeKind::ArrowFunctionExpression { .. }) {
        return true;
    }
    crate::ast::children_of(&data.kind)
        .into_iter()
        .any(|c| contains_function_literal(arena, c))
}

/// Extracts the use-set and def-set for one CFG vertex's statement,
/// stopping at nested function/arrow boundaries (§4.2's "function
/// expression flow-skipping" applies here too: a closure's own reads and
/// writes belong to its own scope's liveness, not its enclosing
/// statement's).
fn uses_and_defs(arena: &Arena, node: NodeId) -> (HashSet<String>, HashSet<String>) {
    let mut uses = HashSet::new();
    let mut defs = HashSet::new();
    walk(arena, node, &mut uses, &mut defs, false);
    (uses, defs)
}

fn pattern_names(arena: &Arena, pattern: NodeId, out: &mut HashSet<String>) {
    match arena.get(pattern).map(|n| &n.kind) {
        Ok(NodeKind::Identifier { name }) => {
            out.insert(name.clone());
        }
        Ok(NodeKind::ArrayPattern { elements }) => {
            for el in elements.iter().flatten() {
                pattern_names(arena, *el, out);
            }
        }
        Ok(NodeKind::ObjectPattern { properties }) => {
            for &prop in properties {
                if let Ok(NodeKind::ObjectPatternProperty { value, .. }) = arena.get(prop).map(|n| &n.kind) {
                    pattern_names(arena, *value, out);
                }
            }
        }
        Ok(NodeKind::AssignmentPattern { left, .. }) => pattern_names(arena, *left, out),
        Ok(NodeKind::RestElement { argument }) => pattern_names(arena, *argument, out),
        _ => {}
    }
}

/// Walks `node`, classifying every `Identifier` occurrence as a use or a
/// def. `is_write_target` marks identifiers reached through an
/// assignment/declaration LHS position.
fn walk(arena: &Arena, node: NodeId, uses: &mut HashSet<String>, defs: &mut HashSet<String>, is_write_target: bool) {
    let Ok(data) = arena.get(node) else { return };
    match &data.kind {
        NodeKind::Identifier { name } => {
            if is_write_target {
                defs.insert(name.clone());
            } else {
                uses.insert(name.clone());
            }
        }
        NodeKind::FunctionExpression { .. } | NodeKind::ArrowFunctionExpression { .. } => {
            // A closure's body is a different scope's liveness problem;
            // only note that one was formed here (handled by
            // `contains_function_literal`), don't walk into it.
        }
        NodeKind::VariableDeclarator { id, init } => {
            let mut names = HashSet::new();
            pattern_names(arena, *id, &mut names);
            defs.extend(names);
            if let Some(init) = init {
                walk(arena, *init, uses, defs, false);
            }
        }
        NodeKind::AssignmentExpression { left, right, .. } => {
            walk(arena, *right, uses, defs, false);
            walk(arena, *left, uses, defs, true);
        }
        NodeKind::UpdateExpression { argument, .. } => {
            walk(arena, *argument, uses, defs, false);
            walk(arena, *argument, uses, defs, true);
        }
        NodeKind::MemberExpression { object, property, computed } => {
            walk(arena, *object, uses, defs, false);
            if *computed {
                walk(arena, *property, uses, defs, false);
            }
        }
        NodeKind::LogicalExpression { left, right, .. } => {
            // The left operand always runs; the right only runs when
            // `left`'s truthiness short-circuits into it. A read on that
            // conditional path still counts as a use (it might happen),
            // but a write there must not count as a def: `out - defs`
            // would otherwise treat the variable as definitely
            // overwritten on a path where it might not be, erasing
            // liveness a predecessor still needs.
            walk(arena, *left, uses, defs, false);
            let mut right_defs = HashSet::new();
            walk(arena, *right, uses, &mut right_defs, false);
        }
        _ => {
            for child in crate::ast::children_of(&data.kind) {
                walk(arena, child, uses, defs, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, NodeKind, SourceId, VarKind};
    use crate::cfg::Builder;

    #[test]
    fn a_variable_used_after_assignment_is_live_before_the_use() {
        let mut arena = Arena::new();
        let x_decl_id = arena.alloc(NodeKind::Identifier { name: "x".into() }, SourceId(0));
        let one = arena.alloc(NodeKind::Literal(crate::ast::LiteralValue::Number(1.0)), SourceId(0));
        let declarator = arena.alloc(
            NodeKind::VariableDeclarator { id: x_decl_id, init: Some(one) },
            SourceId(0),
        );
        let var_decl = arena.alloc(
            NodeKind::VariableDeclaration { kind: VarKind::Var, declarators: vec![declarator] },
            SourceId(0),
        );
        let x_use = arena.alloc(NodeKind::Identifier { name: "x".into() }, SourceId(0));
        let use_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: x_use }, SourceId(0));

        let cfg = Builder::build(&arena, &[var_decl, use_stmt]).unwrap();
        let (solution, _escapes) = analyze(&arena, &cfg, 50).unwrap();
        let use_vertex = cfg.node_vertex(use_stmt).unwrap();
        assert!(solution.in_facts[&use_vertex].0.contains("x"));
        let decl_vertex = cfg.node_vertex(var_decl).unwrap();
        assert!(!solution.out_facts[&decl_vertex].0.is_empty() || solution.in_facts[&use_vertex].0.contains("x"));
    }

    /// `var y = 1; x && (y = 5); foo(y);` — the assignment to `y` only
    /// runs when `x` is truthy, so `y` stays live-in at that statement:
    /// the path where `x` is falsy still needs `y`'s earlier value for
    /// `foo(y)`.
    #[test]
    fn a_short_circuited_assignment_does_not_kill_prior_liveness() {
        let mut arena = Arena::new();
        let y_decl_id = arena.alloc(NodeKind::Identifier { name: "y".into() }, SourceId(0));
        let one = arena.alloc(NodeKind::Literal(crate::ast::LiteralValue::Number(1.0)), SourceId(0));
        let declarator = arena.alloc(NodeKind::VariableDeclarator { id: y_decl_id, init: Some(one) }, SourceId(0));
        let var_decl = arena.alloc(
            NodeKind::VariableDeclaration { kind: VarKind::Var, declarators: vec![declarator] },
            SourceId(0),
        );

        let x_read = arena.alloc(NodeKind::Identifier { name: "x".into() }, SourceId(0));
        let y_write = arena.alloc(NodeKind::Identifier { name: "y".into() }, SourceId(0));
        let five = arena.alloc(NodeKind::Literal(crate::ast::LiteralValue::Number(5.0)), SourceId(0));
        let assign = arena.alloc(
            NodeKind::AssignmentExpression { operator: crate::ast::AssignmentOperator::Assign, left: y_write, right: five },
            SourceId(0),
        );
        let logical = arena.alloc(
            NodeKind::LogicalExpression { operator: crate::ast::LogicalOperator::And, left: x_read, right: assign },
            SourceId(0),
        );
        let logical_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: logical }, SourceId(0));

        let foo_callee = arena.alloc(NodeKind::Identifier { name: "foo".into() }, SourceId(0));
        let y_arg = arena.alloc(NodeKind::Identifier { name: "y".into() }, SourceId(0));
        let call = arena.alloc(NodeKind::CallExpression { callee: foo_callee, arguments: vec![y_arg] }, SourceId(0));
        let call_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: call }, SourceId(0));

        let body = vec![var_decl, logical_stmt, call_stmt];
        let cfg = Builder::build(&arena, &body).unwrap();
        let (solution, _escapes) = analyze(&arena, &cfg, 50).unwrap();

        let logical_vertex = cfg.node_vertex(logical_stmt).unwrap();
        assert!(solution.in_facts[&logical_vertex].0.contains("y"));
    }
}
