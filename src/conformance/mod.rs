//! The conformance engine (§4.9): declarative rules evaluated against
//! the typed AST. Grounded on spec §4.9/§6's rule model; the `regex`
//! dependency is adopted from `examples/synerthink-dotlanth`'s
//! `dotvm/compiler` crate, which reaches for the same crate to do its
//! own structural/textual matching.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::{Arena, AstResult, NodeId, NodeKind, SourceId};
use crate::types::infer::SummaryTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    BannedName,
    BannedNameCall,
    BannedPropertyRead,
    BannedPropertyWrite,
    BannedPropertyAll,
    BannedPropertyNonConstantWrite,
    BannedCodePattern,
    BannedDependency,
    RestrictedMethodCall,
    Custom,
}

/// One `requirement` record from the declarative configuration (§6).
/// Field names mirror the wire format so `serde_json` deserializes a
/// configuration file directly into this shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default)]
    pub value: Vec<String>,
    pub error_message: String,
    #[serde(default)]
    pub whitelist: Vec<String>,
    pub whitelist_regexp: Option<String>,
    #[serde(default)]
    pub only_apply_to: Vec<String>,
    pub only_apply_to_regexp: Option<String>,
    #[serde(default)]
    pub report_loose_type_violations: bool,
    pub rule_id: String,
    pub extends: Option<String>,
    /// Carried through verbatim for `Custom` rules; this engine has no
    /// plugin loader to resolve it against, so a `Custom` rule is parsed
    /// but never matched (see `evaluate`).
    pub java_class: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RuleConfig {
    pub requirement: Vec<Rule>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConformanceError {
    #[error("rule {0}: invalid regex {1:?}: {2}")]
    InvalidRegex(String, String, regex::Error),
}

/// Merges rules sharing a `rule_id` (the `extends` link, §4.9): their
/// whitelists union and deduplicate; the later rule's other fields win,
/// matching "combine their whitelists" as the only specified merge
/// behavior.
pub fn merge_rules(rules: Vec<Rule>) -> Vec<Rule> {
    let mut by_id: HashMap<String, Rule> = HashMap::new();
    let mut order = Vec::new();
    for rule in rules {
        if let Some(existing) = by_id.get_mut(&rule.rule_id) {
            let mut merged: HashSet<String> = existing.whitelist.drain(..).collect();
            merged.extend(rule.whitelist.iter().cloned());
            let mut new_whitelist: Vec<String> = merged.into_iter().collect();
            new_whitelist.sort();
            *existing = Rule { whitelist: new_whitelist, ..rule };
        } else {
            order.push(rule.rule_id.clone());
            by_id.insert(rule.rule_id.clone(), rule);
        }
    }
    order.into_iter().filter_map(|id| by_id.remove(&id)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Violation,
    PossibleViolation,
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub rule_id: String,
    pub node: NodeId,
    pub message: String,
    pub severity: Severity,
}

struct CompiledRule<'a> {
    rule: &'a Rule,
    whitelist_regexp: Option<Regex>,
    only_apply_to_regexp: Option<Regex>,
}

fn compile(rule: &Rule) -> Result<CompiledRule<'_>, ConformanceError> {
    let whitelist_regexp = rule
        .whitelist_regexp
        .as_ref()
        .map(|p| Regex::new(p).map_err(|e| ConformanceError::InvalidRegex(rule.rule_id.clone(), p.clone(), e)))
        .transpose()?;
    let only_apply_to_regexp = rule
        .only_apply_to_regexp
        .as_ref()
        .map(|p| Regex::new(p).map_err(|e| ConformanceError::InvalidRegex(rule.rule_id.clone(), p.clone(), e)))
        .transpose()?;
    Ok(CompiledRule { rule, whitelist_regexp, only_apply_to_regexp })
}

fn file_is_whitelisted(c: &CompiledRule, file: &str) -> bool {
    c.rule.whitelist.iter().any(|w| w == file) || c.whitelist_regexp.as_ref().is_some_and(|r| r.is_match(file))
}

fn file_is_in_scope(c: &CompiledRule, file: &str) -> bool {
    if c.rule.only_apply_to.is_empty() && c.only_apply_to_regexp.is_none() {
        return true;
    }
    c.rule.only_apply_to.iter().any(|w| w == file) || c.only_apply_to_regexp.as_ref().is_some_and(|r| r.is_match(file))
}

/// Evaluates every rule against the subtree rooted at `scope_root`.
/// Malformed rules (bad regex) are skipped and reported as a
/// `ConformanceError`, matching §7's "configuration errors ... the
/// offending rule is skipped" rather than aborting the whole pass.
/// `BannedDependency` and `Custom` rules are recognized (so a
/// configuration containing them parses and merges cleanly) but never
/// produce findings — the former needs a module dependency graph this
/// engine doesn't build, the latter needs a predicate plugin loader
/// this engine doesn't have.
pub fn evaluate(
    arena: &Arena,
    scope_root: NodeId,
    summaries: &SummaryTable,
    rules: &[Rule],
    source_names: &HashMap<SourceId, String>,
    errors: &mut Vec<ConformanceError>,
) -> AstResult<Vec<Finding>> {
    let mut compiled = Vec::new();
    for rule in rules {
        match compile(rule) {
            Ok(c) => compiled.push(c),
            Err(e) => errors.push(e),
        }
    }

    let mut fn_by_name = HashMap::new();
    collect_function_decls(arena, scope_root, &mut fn_by_name)?;

    let mut findings = Vec::new();
    walk(arena, scope_root, &compiled, summaries, source_names, &fn_by_name, &mut findings)?;
    Ok(findings)
}

fn collect_function_decls(arena: &Arena, node: NodeId, out: &mut HashMap<String, NodeId>) -> AstResult<()> {
    let kind = arena.get(node)?.kind.clone();
    if let NodeKind::FunctionDeclaration { id: Some(id), .. } = &kind {
        if let NodeKind::Identifier { name } = &arena.get(*id)?.kind {
            out.insert(name.clone(), node);
        }
    }
    for child in crate::ast::children_of(&kind) {
        collect_function_decls(arena, child, out)?;
    }
    Ok(())
}

fn file_for(arena: &Arena, node: NodeId, source_names: &HashMap<SourceId, String>) -> String {
    arena.get(node).ok().and_then(|n| source_names.get(&n.source)).cloned().unwrap_or_default()
}

fn walk(
    arena: &Arena,
    node: NodeId,
    rules: &[CompiledRule],
    summaries: &SummaryTable,
    source_names: &HashMap<SourceId, String>,
    fn_by_name: &HashMap<String, NodeId>,
    out: &mut Vec<Finding>,
) -> AstResult<()> {
    let kind = arena.get(node)?.kind.clone();
    let file = file_for(arena, node, source_names);

    for c in rules {
        if !file_is_in_scope(c, &file) || file_is_whitelisted(c, &file) {
            continue;
        }
        check_rule(arena, node, &kind, c, summaries, fn_by_name, out)?;
    }

    for child in crate::ast::children_of(&kind) {
        walk(arena, child, rules, summaries, source_names, fn_by_name, out)?;
    }
    Ok(())
}

fn check_rule(
    arena: &Arena,
    node: NodeId,
    kind: &NodeKind,
    c: &CompiledRule,
    summaries: &SummaryTable,
    fn_by_name: &HashMap<String, NodeId>,
    out: &mut Vec<Finding>,
) -> AstResult<()> {
    let names = || c.rule.value.iter();

    match c.rule.kind {
        RuleKind::BannedName => {
            if let NodeKind::Identifier { name } = kind {
                if names().any(|v| v == name) {
                    out.push(finding(c, node, Severity::Violation));
                }
            }
        }
        RuleKind::BannedNameCall => {
            if let NodeKind::CallExpression { callee, .. } | NodeKind::NewExpression { callee, .. } = kind {
                if let Ok(NodeKind::Identifier { name }) = arena.get(*callee).map(|n| &n.kind) {
                    if names().any(|v| v == name) {
                        out.push(finding(c, node, Severity::Violation));
                    }
                }
            }
        }
        RuleKind::BannedPropertyRead | RuleKind::BannedPropertyWrite | RuleKind::BannedPropertyAll => {
            if let NodeKind::MemberExpression { property, computed: false, .. } = kind {
                if let Ok(NodeKind::Identifier { name }) = arena.get(*property).map(|n| &n.kind) {
                    if names().any(|v| v == name) {
                        let is_write = arena.get(node)?.parent.is_some_and(|p| is_write_target(arena, p, node));
                        let applies = matches!(
                            (c.rule.kind, is_write),
                            (RuleKind::BannedPropertyAll, _) | (RuleKind::BannedPropertyWrite, true) | (RuleKind::BannedPropertyRead, false)
                        );
                        if applies {
                            out.push(finding(c, node, Severity::Violation));
                        }
                    }
                }
            }
        }
        RuleKind::BannedPropertyNonConstantWrite => {
            if let NodeKind::AssignmentExpression { left, right, .. } = kind {
                if let Ok(NodeKind::MemberExpression { property, computed: false, .. }) = arena.get(*left).map(|n| &n.kind) {
                    if let Ok(NodeKind::Identifier { name }) = arena.get(*property).map(|n| &n.kind) {
                        if names().any(|v| v == name) && !matches!(arena.get(*right).map(|n| &n.kind), Ok(NodeKind::Literal(_))) {
                            out.push(finding(c, node, Severity::Violation));
                        }
                    }
                }
            }
        }
        RuleKind::BannedCodePattern => {
            if let Some(pattern) = c.rule.value.first() {
                if let Ok(re) = Regex::new(pattern) {
                    if let Some(text) = structural_fingerprint(arena, node) {
                        if re.is_match(&text) {
                            out.push(finding(c, node, Severity::PossibleViolation));
                        }
                    }
                }
            }
        }
        RuleKind::RestrictedMethodCall => {
            if let NodeKind::CallExpression { callee, arguments } = kind {
                if let Ok(NodeKind::Identifier { name }) = arena.get(*callee).map(|n| &n.kind) {
                    if names().any(|v| v == name) {
                        if let Some(summary) = fn_by_name.get(name).and_then(|&decl| summaries.get(decl)) {
                            if summary.signature.params.len() != arguments.len() {
                                out.push(finding(c, node, if summary.fully_resolved { Severity::Violation } else { Severity::PossibleViolation }));
                            }
                        }
                    }
                }
            }
        }
        RuleKind::BannedDependency | RuleKind::Custom => {}
    }
    Ok(())
}

fn is_write_target(arena: &Arena, parent: NodeId, node: NodeId) -> bool {
    matches!(arena.get(parent).map(|n| &n.kind), Ok(NodeKind::AssignmentExpression { left, .. }) if *left == node)
}

fn structural_fingerprint(arena: &Arena, node: NodeId) -> Option<String> {
    match &arena.get(node).ok()?.kind {
        NodeKind::Identifier { name } => Some(name.clone()),
        NodeKind::CallExpression { callee, .. } => structural_fingerprint(arena, *callee).map(|c| format!("{c}(...)")),
        NodeKind::MemberExpression { object, property, computed: false } => {
            let obj = structural_fingerprint(arena, *object)?;
            let prop = structural_fingerprint(arena, *property)?;
            Some(format!("{obj}.{prop}"))
        }
        _ => None,
    }
}

fn finding(c: &CompiledRule, node: NodeId, severity: Severity) -> Finding {
    Finding { rule_id: c.rule.rule_id.clone(), node, message: c.rule.error_message.clone(), severity }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, SourceId};
    use crate::types::infer::SummaryTable;

    fn rule(kind: RuleKind, value: &str) -> Rule {
        Rule {
            kind,
            value: vec![value.to_string()],
            error_message: "banned".into(),
            whitelist: vec![],
            whitelist_regexp: None,
            only_apply_to: vec![],
            only_apply_to_regexp: None,
            report_loose_type_violations: false,
            rule_id: "r1".into(),
            extends: None,
            java_class: None,
        }
    }

    #[test]
    fn flags_a_banned_global_read() {
        let mut arena = Arena::new();
        let id = arena.alloc(NodeKind::Identifier { name: "eval".into() }, SourceId(0));
        let stmt = arena.alloc(NodeKind::ExpressionStatement { expression: id }, SourceId(0));
        let program = arena.alloc(NodeKind::Program { body: vec![stmt] }, SourceId(0));
        arena.set_root(program);

        let rules = vec![rule(RuleKind::BannedName, "eval")];
        let summaries = SummaryTable::default();
        let mut errors = Vec::new();
        let findings = evaluate(&arena, program, &summaries, &rules, &HashMap::new(), &mut errors).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Violation);
    }

    /// An arity mismatch against a callee whose summary isn't
    /// `fully_resolved` is reported as a `PossibleViolation`, not a
    /// definite `Violation` — the summary itself might still be wrong.
    #[test]
    fn restricted_method_call_with_unresolved_summary_is_a_possible_violation() {
        use crate::types::engine::Summary;
        use crate::types::{FunctionType, Type};

        let mut arena = Arena::new();
        let fn_id = arena.alloc(NodeKind::Identifier { name: "restricted".into() }, SourceId(0));
        let ret = arena.alloc(NodeKind::ReturnStatement { argument: None }, SourceId(0));
        let block = arena.alloc(NodeKind::BlockStatement { body: vec![ret] }, SourceId(0));
        let fn_decl = arena.alloc(
            NodeKind::FunctionDeclaration { id: Some(fn_id), params: vec![], body: block, is_async: false, is_generator: false },
            SourceId(0),
        );
        let callee = arena.alloc(NodeKind::Identifier { name: "restricted".into() }, SourceId(0));
        let extra_arg = arena.alloc(NodeKind::Literal(crate::ast::LiteralValue::Number(1.0)), SourceId(0));
        let call = arena.alloc(NodeKind::CallExpression { callee, arguments: vec![extra_arg] }, SourceId(0));
        let call_stmt = arena.alloc(NodeKind::ExpressionStatement { expression: call }, SourceId(0));
        let program = arena.alloc(NodeKind::Program { body: vec![fn_decl, call_stmt] }, SourceId(0));
        arena.set_root(program);

        let mut summaries = SummaryTable::default();
        summaries.set(Summary {
            defining_node: fn_decl,
            signature: FunctionType { type_params: vec![], params: vec![], return_type: Box::new(Type::Undefined) },
            fully_resolved: false,
        });

        let rules = vec![rule(RuleKind::RestrictedMethodCall, "restricted")];
        let mut errors = Vec::new();
        let findings = evaluate(&arena, program, &summaries, &rules, &HashMap::new(), &mut errors).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::PossibleViolation);
    }
}
