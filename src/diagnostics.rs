//! Shared diagnostic channel (§6 "Diagnostic output", §7 error taxonomy).
//!
//! Every component reports through this instead of owning its own ad hoc
//! `Vec<String>` of warnings — the teacher does that per-component
//! (`GeneratorDiagnostics`, `TransformationResult::warnings`); this crate
//! generalizes it into one shared sink so the CLI, tests, and an
//! `ErrorManager`-style collaborator can all consume the same stream.

use serde::{Deserialize, Serialize};

/// §7's taxonomy, by axis rather than by identifier: the level a report
/// is rendered at is a property of *why* it exists, not a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    /// User-source defect; compilation continues so multiple errors
    /// surface in one run.
    Error,
    /// Definite warning: provable from declared types.
    Warning,
    /// Possible warning: depends on an inferred, possibly loose type
    /// (§4.6 "possibly-inexistent property", §7).
    PossibleWarning,
    /// Malformed configuration (conformance rules, regexes). Reported
    /// against a synthetic location; the offending rule is skipped, not
    /// fatal to the run.
    ConfigError,
    /// Internal invariant violation (change-verifier audit failure,
    /// impossible type-operation state, malformed mutation). Fatal.
    Internal,
    Off,
}

impl DiagnosticLevel {
    pub fn is_fatal(self) -> bool {
        matches!(self, DiagnosticLevel::Internal)
    }

    pub fn is_error(self) -> bool {
        matches!(self, DiagnosticLevel::Error | DiagnosticLevel::Internal)
    }
}

/// One reportable fact: file/line/column per §6, a stable `key` for
/// programmatic matching (tests assert on `key`, not on `message` text),
/// the level, and the rendered message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub key: String,
    pub level: DiagnosticLevel,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: u32, column: u32, key: impl Into<String>, level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            key: key.into(),
            level,
            message: message.into(),
        }
    }

    /// A synthetic location for diagnostics that aren't tied to a real
    /// source position (§7 "configuration errors ... synthetic source
    /// location").
    pub fn synthetic(key: impl Into<String>, level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self::new("<synthetic>", 0, 0, key, level, message)
    }
}

/// The collaborator interface the pass manager reports every diagnostic
/// to (§6 "exposes every report to an error manager collaborator"). A
/// trait rather than a concrete type so the CLI, tests, and any future
/// IDE-style consumer can each supply their own sink.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn has_errors(&self) -> bool;
}

/// The sink used pervasively in tests: just collects everything.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.key == key)
    }
}

impl DiagnosticSink for VecSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level.is_error())
    }
}

/// The sink used by the CLI: prints as it goes, in the teacher's
/// emoji-decorated `println!` style, and still remembers whether an
/// error-level report was seen so `main` can pick the right exit code.
#[derive(Debug, Default)]
pub struct PrintingSink {
    saw_error: bool,
    pub verbose: bool,
}

impl PrintingSink {
    pub fn new(verbose: bool) -> Self {
        Self { saw_error: false, verbose }
    }
}

impl DiagnosticSink for PrintingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.saw_error |= diagnostic.level.is_error();
        let icon = match diagnostic.level {
            DiagnosticLevel::Error => "❌",
            DiagnosticLevel::Warning => "⚠️",
            DiagnosticLevel::PossibleWarning => "❓",
            DiagnosticLevel::ConfigError => "🛠️",
            DiagnosticLevel::Internal => "💥",
            DiagnosticLevel::Off => return,
        };
        if self.verbose || diagnostic.level.is_error() {
            println!(
                "{icon} {}:{}:{} [{}] {}",
                diagnostic.file, diagnostic.line, diagnostic.column, diagnostic.key, diagnostic.message
            );
        }
    }

    fn has_errors(&self) -> bool {
        self.saw_error
    }
}
