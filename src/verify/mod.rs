//! The change verifier (§4.10): audits a pass's own
//! [`crate::context::ChangeReport`] against what actually moved in the
//! arena, rather than trusting the pass's self-report at face value.
//! Grounded on `transformer::rollback.rs`'s checkpoint idiom
//! (`TransformationCheckpoint`, `RollbackManager`) — restructured, not
//! copied, since this verifier's job is to *detect* an unreported
//! mutation rather than to undo one.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::ast::{Arena, NodeId};
use crate::context::{ChangeReport, Context};

#[derive(thiserror::Error, Debug)]
pub enum VerifyError {
    #[error("scope root {0:?} changed structurally but no pass reported it")]
    UnreportedMutation(NodeId),
    #[error("pass reported changing scope root {0:?}, which is neither reachable nor marked deleted")]
    ReportedRootMissing(NodeId),
    #[error("pass reported deleting {0:?}, but it is still reachable from the root")]
    ClaimedDeletionStillReachable(NodeId),
}

pub type VerifyResult<T> = Result<T, VerifyError>;

/// A structural fingerprint of a subtree: the set of (kind name, parent,
/// detached) triples reachable from `root`, folded with each node's
/// change stamp. Two snapshots differing means *something* moved —
/// sufficient to catch nodes added, removed, reparented, or touched via
/// `Context::report_change`'s stamp bump, though not an in-place edit of
/// a leaf value (e.g. a literal's payload) that never calls `touch` at
/// all; such an edit is already a bug on its own (§4.1 requires mutation
/// through `ast::mutate`, which always reports), so this audit targets
/// structural drift specifically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    fingerprint: u64,
    reachable: bool,
}

pub fn snapshot(arena: &Arena, scope_root: NodeId) -> Snapshot {
    let Ok(reachable) = arena.is_reachable(scope_root) else {
        return Snapshot { fingerprint: 0, reachable: false };
    };
    if !reachable {
        return Snapshot { fingerprint: 0, reachable: false };
    }
    let mut hasher = DefaultHasher::new();
    hash_subtree(arena, scope_root, &mut hasher);
    Snapshot { fingerprint: hasher.finish(), reachable: true }
}

fn hash_subtree(arena: &Arena, node: NodeId, hasher: &mut DefaultHasher) {
    let Ok(data) = arena.get(node) else { return };
    data.kind.name().hash(hasher);
    data.parent.hash(hasher);
    data.detached.hash(hasher);
    data.change_stamp.hash(hasher);
    for child in crate::ast::children_of(&data.kind) {
        hash_subtree(arena, child, hasher);
    }
}

/// Audits one pass's `report` against the arena state it left behind,
/// given a `before` snapshot taken right before that pass ran.
pub fn audit_pass(ctx: &Context, before: &Snapshot, report: &ChangeReport, scope_root: NodeId) -> VerifyResult<()> {
    let after = snapshot(&ctx.arena, scope_root);

    if after != *before && !report.changed_scopes.contains(&scope_root) && !report.deleted_scopes.contains(&scope_root) {
        return Err(VerifyError::UnreportedMutation(scope_root));
    }

    for &root in &report.changed_scopes {
        let s = snapshot(&ctx.arena, root);
        if !s.reachable && !report.deleted_scopes.contains(&root) {
            return Err(VerifyError::ReportedRootMissing(root));
        }
    }

    for &node in &report.deleted_scopes {
        if ctx.arena.is_reachable(node).unwrap_or(false) {
            return Err(VerifyError::ClaimedDeletionStillReachable(node));
        }
    }

    Ok(())
}

/// Audits an accumulated, whole-round report (every pass's reports
/// merged) against the current arena state — the coarser check
/// [`crate::passes::PassManager`] runs once per round as a backstop,
/// independent of the finer per-pass audit a `PassManager` may also run.
pub fn audit(ctx: &Context, report: &ChangeReport) -> VerifyResult<()> {
    for &root in &report.changed_scopes {
        if !ctx.arena.is_reachable(root).unwrap_or(false) && !report.deleted_scopes.contains(&root) {
            return Err(VerifyError::ReportedRootMissing(root));
        }
    }
    for &node in &report.deleted_scopes {
        if ctx.arena.is_reachable(node).unwrap_or(false) {
            return Err(VerifyError::ClaimedDeletionStillReachable(node));
        }
    }
    Ok(())
}
