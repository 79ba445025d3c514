//! Control-flow graph builder (§4.2). One [`Cfg`] is built per function
//! scope (and one for the top-level program), with a dedicated entry and
//! exit vertex so every dataflow pass has a single place to seed/collect
//! from regardless of how many `return`s or thrown exceptions the body
//! has.
//!
//! Grounded on `examples/synerthink-dotlanth/crates/dotvm/compiler/src/
//! dependency_analysis/core/graph.rs`'s `GraphBuilder`: a thin wrapper
//! around `petgraph::graph::Graph` plus a dedup index, here keyed by
//! [`NodeId`] instead of by name.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::ast::{Arena, AstResult, NodeId, NodeKind};

/// A CFG vertex. `Entry`/`Exit` are synthetic; every other variant wraps
/// the AST node that vertex represents control arriving at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    Entry,
    Exit,
    Statement(NodeId),
    /// A condition expression evaluated for its truth value; split out
    /// from its owning statement so short-circuiting (`&&`/`||`) and
    /// `? :` can each contribute their own test vertex (§4.2 "short
    /// circuit condition vertex-splitting").
    Condition(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Unconditional fallthrough.
    Normal,
    /// The `true` branch out of a `Condition` vertex.
    True,
    /// The `false` branch out of a `Condition` vertex.
    False,
    /// Exceptional control transfer into a `catch`/`finally`.
    Exception,
    /// `break`/`continue`/`return`/labeled jump.
    Jump,
}

#[derive(thiserror::Error, Debug)]
pub enum CfgError {
    #[error(transparent)]
    Ast(#[from] crate::ast::AstError),
    #[error("unresolved label {0:?}")]
    UnresolvedLabel(String),
}

pub type CfgResult<T> = Result<T, CfgError>;

/// One function (or the program top level)'s control-flow graph.
pub struct Cfg {
    graph: DiGraph<Vertex, EdgeKind>,
    by_node: HashMap<NodeId, NodeIndex>,
    entry: NodeIndex,
    exit: NodeIndex,
}

impl Cfg {
    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn exit(&self) -> NodeIndex {
        self.exit
    }

    pub fn vertex(&self, idx: NodeIndex) -> &Vertex {
        &self.graph[idx]
    }

    pub fn node_vertex(&self, node: NodeId) -> Option<NodeIndex> {
        self.by_node.get(&node).copied()
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeKind)> + '_ {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
    }

    pub fn predecessors(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeKind)> + '_ {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

struct Target {
    label: Option<String>,
    break_to: NodeIndex,
    continue_to: Option<NodeIndex>,
}

/// Builds the CFG for a single function body (or the program top level).
/// `body` is the flat statement list owned directly by that scope (the
/// same notion `scope::build::each_owned_statement` walks) — nested
/// function expressions inside it are represented as opaque `Statement`
/// vertices; their own bodies get their own `Cfg` when that nested scope
/// is analyzed (§4.2: "function-expression flow-skipping").
pub struct Builder<'a> {
    arena: &'a Arena,
    graph: DiGraph<Vertex, EdgeKind>,
    by_node: HashMap<NodeId, NodeIndex>,
    exit: NodeIndex,
    targets: Vec<Target>,
}

impl<'a> Builder<'a> {
    pub fn build(arena: &'a Arena, body: &[NodeId]) -> CfgResult<Cfg> {
        let mut graph = DiGraph::new();
        let entry = graph.add_node(Vertex::Entry);
        let exit = graph.add_node(Vertex::Exit);
        let mut builder = Builder { arena, graph, by_node: HashMap::new(), exit, targets: Vec::new() };
        let last = builder.lower_block(entry, body)?;
        builder.graph.add_edge(last, exit, EdgeKind::Normal);
        Ok(Cfg { graph: builder.graph, by_node: builder.by_node, entry, exit })
    }

    fn statement_vertex(&mut self, node: NodeId) -> NodeIndex {
        let idx = self.graph.add_node(Vertex::Statement(node));
        self.by_node.insert(node, idx);
        idx
    }

    fn condition_vertex(&mut self, node: NodeId) -> NodeIndex {
        self.graph.add_node(Vertex::Condition(node))
    }

    /// Lowers a condition expression, wiring its own `True`/`False` edges
    /// directly into `true_target`/`false_target` and returning the
    /// vertex a caller should treat as the condition's entry point.
    ///
    /// `&&`/`||` split into their own `Condition` vertices (§4.2 "short
    /// circuit condition vertex-splitting") rather than collapsing to a
    /// single vertex for the whole expression: `a && b` only evaluates
    /// `b` when `a` is true, so `b`'s vertex must sit strictly after
    /// `a`'s on the `True` edge, not be folded into one node that implies
    /// both operands always run.
    fn lower_condition(&mut self, node: NodeId, true_target: NodeIndex, false_target: NodeIndex) -> CfgResult<NodeIndex> {
        if let NodeKind::LogicalExpression { operator, left, right } = self.arena.get(node)?.kind.clone() {
            return match operator {
                crate::ast::LogicalOperator::And => {
                    let right_entry = self.lower_condition(right, true_target, false_target)?;
                    self.lower_condition(left, right_entry, false_target)
                }
                crate::ast::LogicalOperator::Or => {
                    let right_entry = self.lower_condition(right, true_target, false_target)?;
                    self.lower_condition(left, true_target, right_entry)
                }
            };
        }
        let cond = self.condition_vertex(node);
        self.graph.add_edge(cond, true_target, EdgeKind::True);
        self.graph.add_edge(cond, false_target, EdgeKind::False);
        Ok(cond)
    }

    /// Wires `cond -> marker` with `kind`, then lowers `target` from that
    /// marker. Routing every conditional branch through a fresh marker
    /// vertex (rather than rewriting the `Normal` edge `lower_statement`
    /// would otherwise create) keeps edge-kind assignment a pure
    /// local decision at the branch point.
    fn branch(&mut self, cond: NodeIndex, target: NodeId, kind: EdgeKind) -> CfgResult<NodeIndex> {
        let marker = self.graph.add_node(Vertex::Statement(target));
        self.graph.add_edge(cond, marker, kind);
        self.lower_statement(marker, target)
    }

    /// Lowers a flat statement list, wiring `pred -> first`, each
    /// statement to the next, and returning the last live vertex (the
    /// one the caller should wire to whatever comes after the block).
    /// Unreachable if the block ends in an unconditional jump
    /// (`return`/`throw`/`break`/`continue`); callers detect that by the
    /// returned vertex already having an outgoing edge.
    fn lower_block(&mut self, pred: NodeIndex, body: &[NodeId]) -> CfgResult<NodeIndex> {
        let mut cur = pred;
        for &stmt in body {
            cur = self.lower_statement(cur, stmt)?;
        }
        Ok(cur)
    }

    fn lower_statement(&mut self, pred: NodeIndex, stmt: NodeId) -> CfgResult<NodeIndex> {
        let kind = &self.arena.get(stmt)?.kind;
        match kind {
            NodeKind::BlockStatement { body } => {
                let body = body.clone();
                self.lower_block(pred, &body)
            }
            NodeKind::EmptyStatement => Ok(pred),
            NodeKind::IfStatement { test, consequent, alternate } => {
                let (test, consequent, alternate) = (*test, *consequent, *alternate);
                let join = self.graph.add_node(Vertex::Statement(stmt));
                let then_marker = self.graph.add_node(Vertex::Statement(consequent));
                let else_marker = match alternate {
                    Some(alt) => self.graph.add_node(Vertex::Statement(alt)),
                    None => join,
                };
                let cond_entry = self.lower_condition(test, then_marker, else_marker)?;
                self.graph.add_edge(pred, cond_entry, EdgeKind::Normal);
                let then_end = self.lower_statement(then_marker, consequent)?;
                self.graph.add_edge(then_end, join, EdgeKind::Normal);
                if let Some(alt) = alternate {
                    let else_end = self.lower_statement(else_marker, alt)?;
                    self.graph.add_edge(else_end, join, EdgeKind::Normal);
                }
                Ok(join)
            }
            NodeKind::WhileStatement { test, body } => self.lower_while(pred, stmt, *test, *body, None),
            NodeKind::DoWhileStatement { body, test } => self.lower_do_while(pred, stmt, *body, *test, None),
            NodeKind::ForStatement { init, test, update, body } => {
                self.lower_for(pred, stmt, *init, *test, *update, *body, None)
            }
            NodeKind::ForInStatement { right, body, .. } | NodeKind::ForOfStatement { right, body, .. } => {
                self.lower_for_each(pred, stmt, *right, *body, None)
            }
            NodeKind::SwitchStatement { discriminant, cases } => {
                self.lower_switch(pred, stmt, *discriminant, cases.clone())
            }
            NodeKind::TryStatement { block, handler, finalizer } => {
                self.lower_try(pred, stmt, *block, *handler, *finalizer)
            }
            NodeKind::LabeledStatement { label, body } => {
                let (label, body) = (label.clone(), *body);
                let join = self.graph.add_node(Vertex::Statement(stmt));
                // A label directly wrapping a loop attaches to that loop's own
                // target (so `continue label;` resolves to the loop's
                // continue edge) rather than getting a separate target with
                // no `continue_to` of its own, which `continue label;` could
                // never resolve through.
                let body_kind = self.arena.get(body)?.kind.clone();
                let end = match body_kind {
                    NodeKind::WhileStatement { test, body: inner } => self.lower_while(pred, body, test, inner, Some(label)),
                    NodeKind::DoWhileStatement { body: inner, test } => {
                        self.lower_do_while(pred, body, inner, test, Some(label))
                    }
                    NodeKind::ForStatement { init, test, update, body: inner } => {
                        self.lower_for(pred, body, init, test, update, inner, Some(label))
                    }
                    NodeKind::ForInStatement { right, body: inner, .. } | NodeKind::ForOfStatement { right, body: inner, .. } => {
                        self.lower_for_each(pred, body, right, inner, Some(label))
                    }
                    _ => {
                        self.targets.push(Target { label: Some(label), break_to: join, continue_to: None });
                        let result = self.lower_statement(pred, body);
                        self.targets.pop();
                        result
                    }
                }?;
                self.graph.add_edge(end, join, EdgeKind::Normal);
                Ok(join)
            }
            NodeKind::BreakStatement { label } => {
                let target = self.find_break_target(label.as_deref())?;
                let v = self.statement_vertex(stmt);
                self.graph.add_edge(pred, v, EdgeKind::Normal);
                self.graph.add_edge(v, target, EdgeKind::Jump);
                Ok(v)
            }
            NodeKind::ContinueStatement { label } => {
                let target = self.find_continue_target(label.as_deref())?;
                let v = self.statement_vertex(stmt);
                self.graph.add_edge(pred, v, EdgeKind::Normal);
                self.graph.add_edge(v, target, EdgeKind::Jump);
                Ok(v)
            }
            NodeKind::ReturnStatement { .. } | NodeKind::ThrowStatement { .. } => {
                let v = self.statement_vertex(stmt);
                self.graph.add_edge(pred, v, EdgeKind::Normal);
                self.graph.add_edge(v, self.exit, EdgeKind::Jump);
                Ok(v)
            }
            _ => {
                let v = self.statement_vertex(stmt);
                self.graph.add_edge(pred, v, EdgeKind::Normal);
                Ok(v)
            }
        }
    }

    fn lower_while(
        &mut self,
        pred: NodeIndex,
        stmt: NodeId,
        test: NodeId,
        body: NodeId,
        label: Option<String>,
    ) -> CfgResult<NodeIndex> {
        let join = self.graph.add_node(Vertex::Statement(stmt));
        let body_marker = self.graph.add_node(Vertex::Statement(body));
        let cond = self.lower_condition(test, body_marker, join)?;
        self.graph.add_edge(pred, cond, EdgeKind::Normal);
        self.targets.push(Target { label, break_to: join, continue_to: Some(cond) });
        let body_end = self.lower_statement(body_marker, body)?;
        self.targets.pop();
        self.graph.add_edge(body_end, cond, EdgeKind::Normal);
        Ok(join)
    }

    fn lower_do_while(
        &mut self,
        pred: NodeIndex,
        stmt: NodeId,
        body: NodeId,
        test: NodeId,
        label: Option<String>,
    ) -> CfgResult<NodeIndex> {
        let join = self.graph.add_node(Vertex::Statement(stmt));
        let cond = self.lower_condition(test, pred, join)?;
        self.targets.push(Target { label, break_to: join, continue_to: Some(cond) });
        let body_end = self.lower_statement(pred, body)?;
        self.targets.pop();
        self.graph.add_edge(body_end, cond, EdgeKind::Normal);
        Ok(join)
    }

    fn lower_for(
        &mut self,
        pred: NodeIndex,
        stmt: NodeId,
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
        label: Option<String>,
    ) -> CfgResult<NodeIndex> {
        let mut cur = pred;
        if let Some(init) = init {
            let v = self.statement_vertex(init);
            self.graph.add_edge(cur, v, EdgeKind::Normal);
            cur = v;
        }
        let join = self.graph.add_node(Vertex::Statement(stmt));
        let body_marker = test.map(|_| self.graph.add_node(Vertex::Statement(body)));
        let cond = match test {
            Some(t) => self.lower_condition(t, body_marker.unwrap(), join)?,
            None => self.graph.add_node(Vertex::Statement(stmt)),
        };
        self.graph.add_edge(cur, cond, EdgeKind::Normal);
        let update_v = match update {
            Some(u) => self.statement_vertex(u),
            None => cond,
        };
        self.targets.push(Target { label, break_to: join, continue_to: Some(update_v) });
        let body_end = match body_marker {
            Some(marker) => self.lower_statement(marker, body)?,
            None => self.lower_statement(cond, body)?,
        };
        self.targets.pop();
        if let Some(u) = update {
            self.graph.add_edge(body_end, update_v, EdgeKind::Normal);
            self.graph.add_edge(update_v, cond, EdgeKind::Normal);
        } else {
            self.graph.add_edge(body_end, cond, EdgeKind::Normal);
        }
        Ok(join)
    }

    fn lower_for_each(
        &mut self,
        pred: NodeIndex,
        stmt: NodeId,
        right: NodeId,
        body: NodeId,
        label: Option<String>,
    ) -> CfgResult<NodeIndex> {
        let head = self.statement_vertex(right);
        self.graph.add_edge(pred, head, EdgeKind::Normal);
        let cond = self.graph.add_node(Vertex::Statement(stmt));
        self.graph.add_edge(head, cond, EdgeKind::Normal);
        let join = self.graph.add_node(Vertex::Statement(stmt));
        self.targets.push(Target { label, break_to: join, continue_to: Some(cond) });
        let body_end = self.branch(cond, body, EdgeKind::True)?;
        self.targets.pop();
        self.graph.add_edge(body_end, cond, EdgeKind::Normal);
        self.graph.add_edge(cond, join, EdgeKind::False);
        Ok(join)
    }

    fn lower_switch(&mut self, pred: NodeIndex, stmt: NodeId, discriminant: NodeId, cases: Vec<NodeId>) -> CfgResult<NodeIndex> {
        let disc = self.statement_vertex(discriminant);
        self.graph.add_edge(pred, disc, EdgeKind::Normal);
        let join = self.graph.add_node(Vertex::Statement(stmt));
        self.targets.push(Target { label: None, break_to: join, continue_to: None });
        let mut fallthrough: Option<NodeIndex> = None;
        let mut has_default = false;
        for case in &cases {
            if let NodeKind::SwitchCase { test, consequent } = &self.arena.get(*case)?.kind {
                has_default |= test.is_none();
                let consequent = consequent.clone();
                let case_v = self.graph.add_node(Vertex::Statement(*case));
                self.graph.add_edge(disc, case_v, EdgeKind::Normal);
                if let Some(prev) = fallthrough {
                    self.graph.add_edge(prev, case_v, EdgeKind::Normal);
                }
                let end = self.lower_block(case_v, &consequent)?;
                fallthrough = Some(end);
            }
        }
        if let Some(last) = fallthrough {
            self.graph.add_edge(last, join, EdgeKind::Normal);
        }
        if !has_default {
            self.graph.add_edge(disc, join, EdgeKind::Normal);
        }
        self.targets.pop();
        Ok(join)
    }

    fn lower_try(
        &mut self,
        pred: NodeIndex,
        stmt: NodeId,
        block: NodeId,
        handler: Option<NodeId>,
        finalizer: Option<NodeId>,
    ) -> CfgResult<NodeIndex> {
        let try_start = self.statement_vertex(block);
        self.graph.add_edge(pred, try_start, EdgeKind::Normal);
        let try_body = if let NodeKind::BlockStatement { body } = &self.arena.get(block)?.kind {
            body.clone()
        } else {
            vec![]
        };
        let try_end = self.lower_block(try_start, &try_body)?;

        let join = self.graph.add_node(Vertex::Statement(stmt));
        let mut after_try = try_end;

        if let Some(handler) = handler {
            if let NodeKind::CatchClause { body, .. } = &self.arena.get(handler)?.kind {
                let catch_body = if let NodeKind::BlockStatement { body } = &self.arena.get(*body)?.kind {
                    body.clone()
                } else {
                    vec![]
                };
                let catch_entry = self.graph.add_node(Vertex::Statement(handler));
                self.graph.add_edge(try_start, catch_entry, EdgeKind::Exception);
                let catch_end = self.lower_block(catch_entry, &catch_body)?;
                if let Some(fin) = finalizer {
                    let fin_v = self.lower_finalizer(catch_end, fin)?;
                    after_try = fin_v;
                    let try_fin = self.lower_finalizer(try_end, fin)?;
                    self.graph.add_edge(try_fin, join, EdgeKind::Normal);
                } else {
                    self.graph.add_edge(catch_end, join, EdgeKind::Normal);
                }
            }
        }
        if handler.is_none() {
            if let Some(fin) = finalizer {
                after_try = self.lower_finalizer(try_end, fin)?;
            }
        }
        self.graph.add_edge(after_try, join, EdgeKind::Normal);
        Ok(join)
    }

    fn lower_finalizer(&mut self, pred: NodeIndex, finalizer: NodeId) -> CfgResult<NodeIndex> {
        let body = if let NodeKind::BlockStatement { body } = &self.arena.get(finalizer)?.kind {
            body.clone()
        } else {
            vec![]
        };
        self.lower_block(pred, &body)
    }

    fn find_break_target(&self, label: Option<&str>) -> CfgResult<NodeIndex> {
        match label {
            None => self
                .targets
                .last()
                .map(|t| t.break_to)
                .ok_or_else(|| CfgError::UnresolvedLabel("<unlabeled break>".into())),
            Some(l) => self
                .targets
                .iter()
                .rev()
                .find(|t| t.label.as_deref() == Some(l))
                .map(|t| t.break_to)
                .ok_or_else(|| CfgError::UnresolvedLabel(l.into())),
        }
    }

    fn find_continue_target(&self, label: Option<&str>) -> CfgResult<NodeIndex> {
        match label {
            None => self
                .targets
                .iter()
                .rev()
                .find_map(|t| t.continue_to)
                .ok_or_else(|| CfgError::UnresolvedLabel("<unlabeled continue>".into())),
            Some(l) => self
                .targets
                .iter()
                .rev()
                .find(|t| t.label.as_deref() == Some(l))
                .and_then(|t| t.continue_to)
                .ok_or_else(|| CfgError::UnresolvedLabel(l.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, NodeKind, SourceId, VarKind};

    #[test]
    fn if_statement_has_two_branches_into_a_join() {
        let mut arena = Arena::new();
        let test = arena.alloc(NodeKind::Literal(crate::ast::LiteralValue::Boolean(true)), SourceId(0));
        let cons_expr = arena.alloc(NodeKind::Identifier { name: "a".into() }, SourceId(0));
        let cons_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: cons_expr }, SourceId(0));
        let if_stmt = arena.alloc(
            NodeKind::IfStatement { test, consequent: cons_stmt, alternate: None },
            SourceId(0),
        );
        let cfg = Builder::build(&arena, &[if_stmt]).unwrap();
        assert!(cfg.len() > 2);
        let _ = VarKind::Var;
    }

    /// `outer: while (c) { continue outer; }` — a directly-labeled loop's
    /// own `continue` must resolve through the loop's own continue edge,
    /// not fail with `UnresolvedLabel`.
    #[test]
    fn continue_resolves_through_a_directly_labeled_loop() {
        let mut arena = Arena::new();
        let test = arena.alloc(NodeKind::Identifier { name: "c".into() }, SourceId(0));
        let cont = arena.alloc(NodeKind::ContinueStatement { label: Some("outer".into()) }, SourceId(0));
        let body = arena.alloc(NodeKind::BlockStatement { body: vec![cont] }, SourceId(0));
        let while_stmt = arena.alloc(NodeKind::WhileStatement { test, body }, SourceId(0));
        let labeled = arena.alloc(NodeKind::LabeledStatement { label: "outer".into(), body: while_stmt }, SourceId(0));

        let cfg = Builder::build(&arena, &[labeled]).unwrap();

        let cont_v = cfg.node_vertex(cont).unwrap();
        let jump_targets: Vec<_> = cfg
            .successors(cont_v)
            .filter(|(_, kind)| matches!(kind, EdgeKind::Jump))
            .collect();
        assert_eq!(jump_targets.len(), 1);
        let (target, _) = jump_targets[0];
        assert!(matches!(cfg.vertex(target), Vertex::Condition(_)));
    }

    /// `if (a && b) cons; else alt;` — `a` and `b` must get their own
    /// `Condition` vertices, with `a`'s `False` edge skipping straight to
    /// `alt` rather than ever reaching `b`.
    #[test]
    fn logical_and_condition_splits_into_two_vertices() {
        let mut arena = Arena::new();
        let a = arena.alloc(NodeKind::Identifier { name: "a".into() }, SourceId(0));
        let b = arena.alloc(NodeKind::Identifier { name: "b".into() }, SourceId(0));
        let test = arena.alloc(
            NodeKind::LogicalExpression { operator: crate::ast::LogicalOperator::And, left: a, right: b },
            SourceId(0),
        );
        let cons_expr = arena.alloc(NodeKind::Identifier { name: "cons".into() }, SourceId(0));
        let cons_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: cons_expr }, SourceId(0));
        let alt_expr = arena.alloc(NodeKind::Identifier { name: "alt".into() }, SourceId(0));
        let alt_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: alt_expr }, SourceId(0));
        let if_stmt = arena.alloc(
            NodeKind::IfStatement { test, consequent: cons_stmt, alternate: Some(alt_stmt) },
            SourceId(0),
        );

        let cfg = Builder::build(&arena, &[if_stmt]).unwrap();

        let find_condition = |node: NodeId| {
            cfg.node_indices()
                .find(|&v| matches!(cfg.vertex(v), Vertex::Condition(n) if *n == node))
                .unwrap()
        };
        let a_vertex = find_condition(a);
        let b_vertex = find_condition(b);
        assert_ne!(a_vertex, b_vertex);

        let a_true = cfg.successors(a_vertex).find(|(_, k)| matches!(k, EdgeKind::True)).unwrap().0;
        assert_eq!(a_true, b_vertex);

        let a_false = cfg.successors(a_vertex).find(|(_, k)| matches!(k, EdgeKind::False)).unwrap().0;
        let alt_vertex = cfg.node_vertex(alt_stmt).unwrap();
        let a_false_successor = cfg.successors(a_false).find(|(_, k)| matches!(k, EdgeKind::Normal)).unwrap().0;
        assert_eq!(a_false_successor, alt_vertex);
    }
}
