//! The explicit `Context` value (Design Notes: mutable-global compiler
//! state becomes a value threaded through every pass, rather than a
//! singleton). A `Context` owns everything one compilation needs: the
//! AST arena, the memoizing scope creator, the diagnostic sink, and the
//! bookkeeping the change verifier (§4.10) audits between passes.
//!
//! `Context` deliberately holds no `Arc`/`Mutex` — §5 requires a
//! compiler instance to be single-threaded and synchronous, and this
//! makes that a type-level fact (no `Sync` impl can exist for a type
//! containing `RefCell`/raw collections like this) rather than a
//! comment.

use std::collections::HashSet;

use crate::ast::{Arena, NodeId};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::passes::FeatureSet;
use crate::scope::creator::ScopeCreator;

/// Compile-wide options threaded alongside the tree, mirroring the
/// teacher's per-component `*Config` structs but collected in one place
/// since every in-scope component needs to see the same feature set.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub feature_set: FeatureSet,
    pub verbose: bool,
    pub strict_conformance: bool,
    pub max_pass_iterations: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            feature_set: FeatureSet::Es2017,
            verbose: false,
            strict_conformance: false,
            max_pass_iterations: 100,
        }
    }
}

/// Per-pass-invocation record of what a pass reported changing. The
/// change verifier (§4.10) compares this against what it observes
/// structurally.
#[derive(Debug, Default, Clone)]
pub struct ChangeReport {
    pub changed_scopes: HashSet<NodeId>,
    pub deleted_scopes: HashSet<NodeId>,
}

pub struct Context {
    pub arena: Arena,
    pub scope_creator: ScopeCreator,
    pub options: CompilerOptions,
    diagnostics: Box<dyn DiagnosticSink>,
    pending: ChangeReport,
}

impl Context {
    pub fn new(arena: Arena, options: CompilerOptions, diagnostics: Box<dyn DiagnosticSink>) -> Self {
        Self {
            arena,
            scope_creator: ScopeCreator::new(),
            options,
            diagnostics,
            pending: ChangeReport::default(),
        }
    }

    /// A pass calls this after mutating the subtree rooted at
    /// `scope_root` — the pass manager's change-report hook (§4.8).
    /// Also bumps the node's own change stamp (§3's "change timestamp").
    pub fn report_change(&mut self, scope_root: NodeId) {
        self.pending.changed_scopes.insert(scope_root);
        let _ = self.arena.touch(scope_root);
    }

    /// A pass calls this in addition to `report_change` on the enclosing
    /// script when it detaches a function node (§4.10: "a pass that
    /// detaches a function node must issue a function-deletion report in
    /// addition to the change report for the enclosing script").
    pub fn report_deleted(&mut self, scope_root: NodeId) {
        self.pending.deleted_scopes.insert(scope_root);
    }

    /// Drains the accumulated change report, handing it to the caller
    /// (typically the change verifier) and resetting it for the next
    /// pass invocation.
    pub fn take_change_report(&mut self) -> ChangeReport {
        std::mem::take(&mut self.pending)
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}
