//! The pass manager (§4.8): runs a sequence of [`Pass`]es to a fixed
//! point, each pass gated by the active [`FeatureSet`] and required to
//! report every scope it touched through [`crate::context::Context`].
//! Grounded on `transformer::mod.rs`'s `Transformer`/`TransformerConfig`
//! orchestration (sequential passes, per-pass stats, enable flags) —
//! replaced internally with repeat-to-fixed-point semantics instead of
//! one pass each.

pub mod dead_code_elimination;
pub mod expression_simplification;
pub mod function_minification;
pub mod identifier_renaming;
pub mod property_minification;

use serde::{Deserialize, Serialize};

use crate::ast::NodeId;
use crate::context::Context;

/// Which syntax a pass is allowed to introduce or assume already exists
/// in its input — gates passes the way `TransformerConfig`'s
/// `enable_*` flags gate the teacher's five fixed phases, but as an
/// ordered language-version lattice rather than independent booleans,
/// since ES2017 syntax support implies ES2015 support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureSet {
    Es3,
    Es5,
    Es2015,
    Es2017,
}

impl FeatureSet {
    pub fn supports(self, required: FeatureSet) -> bool {
        self >= required
    }
}

/// Per-run bookkeeping a pass accumulates, generalizing
/// `TransformationStats`'s per-kind counters into one shared shape every
/// pass reports through instead of each owning its own counter struct.
#[derive(Debug, Clone, Default)]
pub struct PassStats {
    pub nodes_changed: u64,
    pub nodes_removed: u64,
}

impl PassStats {
    pub fn merge(&mut self, other: &PassStats) {
        self.nodes_changed += other.nodes_changed;
        self.nodes_removed += other.nodes_removed;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PassError {
    #[error(transparent)]
    Ast(#[from] crate::ast::AstError),
    #[error(transparent)]
    Scope(#[from] crate::scope::ScopeError),
    #[error(transparent)]
    Cfg(#[from] crate::cfg::CfgError),
    #[error(transparent)]
    Dataflow(#[from] crate::dataflow::DataflowError),
    #[error(transparent)]
    Type(#[from] crate::types::TypeError),
    #[error(transparent)]
    Verify(#[from] crate::verify::VerifyError),
    #[error("pass {0} requires feature set {1:?}, which {2:?} does not provide")]
    UnsupportedFeatures(&'static str, FeatureSet, FeatureSet),
}

pub type PassResult<T> = Result<T, PassError>;

/// One rewriting pass over the program rooted at `scope_root` (§4.8).
/// Every concrete pass in `SPEC_FULL.md §0` implements this; a pass is
/// expected to be idempotent on an already-fully-transformed tree (the
/// pass manager relies on "ran and found nothing to do" as its
/// fixed-point signal).
pub trait Pass {
    fn name(&self) -> &'static str;

    /// The minimum feature set this pass's output assumes is acceptable
    /// at the pass's call site; the manager skips the pass entirely
    /// (rather than erroring) when the active feature set doesn't
    /// support it.
    fn required_features(&self) -> FeatureSet {
        FeatureSet::Es3
    }

    /// Runs once over `scope_root`. Returns `true` if it changed
    /// anything — the manager's fixed-point signal, alongside whatever
    /// the pass itself reported via `ctx.report_change`.
    fn run(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<bool>;
}

/// Runs `passes` in order over `scope_root`, repeating the whole
/// sequence until a full round changes nothing or `max_iterations` is
/// reached (§4.8's fixed-point contract), freezing the scope creator for
/// the duration of each round so every pass in that round sees the same
/// scope tree (§4.7).
pub struct PassManager {
    pub passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self {
        Self { passes }
    }

    pub fn run_to_fixed_point(&mut self, ctx: &mut Context, scope_root: NodeId) -> PassResult<PassStats> {
        let mut stats = PassStats::default();
        let max_iterations = ctx.options.max_pass_iterations;
        let active_features = ctx.options.feature_set;

        for _ in 0..max_iterations {
            ctx.scope_creator.freeze();
            let mut any_changed = false;
            let mut round_report = crate::context::ChangeReport::default();
            for pass in self.passes.iter_mut() {
                if !active_features.supports(pass.required_features()) {
                    continue;
                }
                // Per-pass granularity (§4.10): snapshot right before this
                // pass runs and audit its own report immediately after, so
                // an unreported mutation is caught against the pass that
                // made it rather than diluted into the whole round.
                let before = crate::verify::snapshot(&ctx.arena, scope_root);
                let changed = pass.run(ctx, scope_root)?;
                any_changed |= changed;
                if changed {
                    stats.nodes_changed += 1;
                }
                let pass_report = ctx.take_change_report();
                crate::verify::audit_pass(ctx, &before, &pass_report, scope_root)?;
                round_report.changed_scopes.extend(pass_report.changed_scopes);
                round_report.deleted_scopes.extend(pass_report.deleted_scopes);
            }
            ctx.scope_creator.thaw();
            if !round_report.changed_scopes.is_empty() || !round_report.deleted_scopes.is_empty() {
                crate::verify::audit(ctx, &round_report)?;
            }
            if !any_changed {
                break;
            }
        }
        Ok(stats)
    }
}
