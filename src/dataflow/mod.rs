//! Generic monotone dataflow framework (§4.3). No teacher/pack precedent
//! exists for this shape, so it follows the textbook worklist
//! presentation the specification itself describes: a [`Lattice`], a
//! [`Direction`], and a [`Transfer`] function driven to a fixed point by
//! [`Solver`].
//!
//! Individual analyses (e.g. [`live_variables`]) implement [`Transfer`]
//! and get the worklist, convergence, and monotonicity check for free.

pub mod live_variables;

use std::collections::{HashSet, VecDeque};

use petgraph::graph::NodeIndex;

use crate::cfg::{Cfg, EdgeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A bounded join-semilattice over per-vertex facts. `bottom` is the
/// "no information yet" starting value every vertex is seeded with.
pub trait Lattice: Clone + PartialEq {
    fn bottom() -> Self;
    fn join(&self, other: &Self) -> Self;
    /// `self <= other` under the lattice's partial order — used only by
    /// the debug-only monotonicity assertion, never by the solver's
    /// control flow itself.
    fn le(&self, other: &Self) -> bool {
        &self.join(other) == other
    }
}

/// The per-analysis transfer function: given the incoming fact (the join
/// of predecessors' outs, or successors' ins if running backward) and
/// the vertex itself, produce the outgoing fact.
pub trait Transfer {
    type Fact: Lattice;

    fn direction(&self) -> Direction;

    fn transfer(&self, vertex: NodeIndex, input: &Self::Fact) -> Self::Fact;
}

#[derive(thiserror::Error, Debug)]
pub enum DataflowError {
    #[error("dataflow analysis failed to reach a fixed point within {0} iterations")]
    DidNotConverge(usize),
    #[error("transfer function for vertex {0:?} was not monotone: {1:?} is not <= its join with the previous fact")]
    NonMonotone(NodeIndex, String),
}

pub type DataflowResult<T> = Result<T, DataflowError>;

/// Result of running an analysis: the fact computed at the "in" edge and
/// at the "out" edge of every vertex, in the analysis's own direction
/// (forward: in = join(preds' out); backward: in = join(succs' out), but
/// always addressable by vertex regardless of direction).
pub struct Solution<F> {
    pub in_facts: std::collections::HashMap<NodeIndex, F>,
    pub out_facts: std::collections::HashMap<NodeIndex, F>,
}

/// Drives a [`Transfer`] function over a [`Cfg`] to a fixed point via
/// worklist iteration (§4.3). `max_iterations` bounds runaway
/// non-monotone transfer functions (Open Question: the framework does
/// not attempt a static monotonicity proof; see DESIGN.md).
pub struct Solver {
    pub max_iterations: usize,
}

impl Solver {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn solve<T: Transfer>(&self, cfg: &Cfg, transfer: &T) -> DataflowResult<Solution<T::Fact>> {
        let mut in_facts = std::collections::HashMap::new();
        let mut out_facts = std::collections::HashMap::new();
        for v in cfg.node_indices() {
            in_facts.insert(v, T::Fact::bottom());
            out_facts.insert(v, T::Fact::bottom());
        }

        let forward = transfer.direction() == Direction::Forward;
        let mut worklist: VecDeque<NodeIndex> = cfg.node_indices().collect();
        let mut queued: HashSet<NodeIndex> = worklist.iter().copied().collect();

        let mut iterations = 0usize;
        while let Some(v) = worklist.pop_front() {
            queued.remove(&v);
            iterations += 1;
            if iterations > self.max_iterations * cfg.len().max(1) {
                return Err(DataflowError::DidNotConverge(self.max_iterations));
            }

            let incoming: Vec<NodeIndex> = if forward {
                cfg.predecessors(v).map(|(p, _)| p).collect()
            } else {
                cfg.successors(v).map(|(s, _)| s).collect()
            };
            let mut input = T::Fact::bottom();
            for p in &incoming {
                let fact = if forward { &out_facts[p] } else { &in_facts[p] };
                input = input.join(fact);
            }
            if forward {
                in_facts.insert(v, input.clone());
            } else {
                out_facts.insert(v, input.clone());
            }

            let new_fact = transfer.transfer(v, &input);
            let slot = if forward { &mut out_facts } else { &mut in_facts };
            let old = slot.get(&v).cloned().unwrap_or_else(T::Fact::bottom);

            debug_assert!(old.le(&new_fact), "dataflow transfer function for {v:?} was not monotone");

            if new_fact != old {
                slot.insert(v, new_fact);
                let next: Vec<NodeIndex> = if forward {
                    cfg.successors(v).map(|(s, _)| s).collect()
                } else {
                    cfg.predecessors(v).map(|(p, _)| p).collect()
                };
                for n in next {
                    if queued.insert(n) {
                        worklist.push_back(n);
                    }
                }
            }
        }

        Ok(Solution { in_facts, out_facts })
    }
}

/// Filters out exceptional edges, for analyses that want to treat
/// `try`/`catch` control transfer as a separate concern (most do not;
/// this is here because §4.2 calls out exceptional edges as a distinct
/// [`EdgeKind`] precisely so an analysis can choose to ignore them).
pub fn is_normal_flow(kind: EdgeKind) -> bool {
    !matches!(kind, EdgeKind::Exception)
}
