//! The type lattice and inference engine (§4.6) — the largest of the
//! new subsystems, with no direct teacher precedent. Built as a
//! worklist-driven abstract interpreter over the [`crate::dataflow`]
//! framework: forward propagation of declared/inferred types through
//! expressions, a backward pass for declaration-site inference from
//! first-use, and a deferred queue for calls to not-yet-summarized
//! functions.

pub mod engine;
pub mod infer;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// §4.6's type lattice. `Unknown` is "no information" (both the forward
/// pass's bottom and, per the Open Question decision in DESIGN.md, the
/// default a variable keeps if it never receives a concrete type).
/// `Any` is the separate, opt-in compatibility top that suppresses
/// downstream warnings instead of reporting them against `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Unknown,
    Any,
    Void,
    Null,
    Undefined,
    Number,
    String,
    Boolean,
    /// A record type: known property names mapped to their types. Two
    /// object types unify structurally (§4.6 "object types unify by
    /// shape"), not nominally.
    Object(ObjectType),
    Function(FunctionType),
    /// A type variable introduced by a generic function/class, resolved
    /// during specialization (§4.6 "generics unification").
    TypeParam(String),
    /// An instantiation of a generic type with concrete arguments.
    Generic(String, Vec<Type>),
    /// The join of two or more incompatible types observed at the same
    /// program point. Stored as a sorted, deduplicated list of
    /// non-union summaries so two unions with the same members compare
    /// equal regardless of join order.
    Union(Vec<Type>),
    /// The bottom of the lattice: a program point provably never
    /// reached (e.g. after an unconditional `return`/`throw`).
    Never,
}

impl Type {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Type::Any)
    }

    /// True if this type is "nullable" in the Closure-style sense: can
    /// observably be `null` or `undefined` at runtime, which gates the
    /// possible-vs-definite distinction in property-access warnings
    /// (§4.6 "possibly-inexistent property", §7).
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Null | Type::Undefined | Type::Unknown | Type::Any)
            || matches!(self, Type::Union(members) if members.iter().any(Type::is_nullable))
    }

    /// The least upper bound of two types under the lattice (§4.6).
    /// `Unknown`/`Any` absorb anything; identical types are idempotent;
    /// anything else joins into a (deduplicated, sorted-by-debug-repr)
    /// `Union`.
    pub fn join(&self, other: &Type) -> Type {
        if self == other {
            return self.clone();
        }
        match (self, other) {
            (Type::Never, t) | (t, Type::Never) => t.clone(),
            (Type::Any, _) | (_, Type::Any) => Type::Any,
            (Type::Unknown, _) | (_, Type::Unknown) => Type::Unknown,
            (Type::Object(a), Type::Object(b)) if a.name == b.name => {
                Type::Object(a.merge_shape(b))
            }
            _ => {
                let mut members = BTreeSet::new();
                flatten_union(self, &mut members);
                flatten_union(other, &mut members);
                let mut members: Vec<Type> = members.into_iter().collect();
                if members.len() == 1 {
                    members.pop().unwrap()
                } else {
                    Type::Union(members)
                }
            }
        }
    }
}

// `Type` needs a total order only to dedup inside `Union`; derive it
// structurally off the Debug representation rather than hand-rolling a
// comparator for every variant.
impl Eq for Type {}
impl Ord for Type {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        format!("{self:?}").cmp(&format!("{other:?}"))
    }
}
impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn flatten_union(ty: &Type, out: &mut BTreeSet<Type>) {
    match ty {
        Type::Union(members) => {
            for m in members {
                out.insert(m.clone());
            }
        }
        Type::Never => {}
        other => {
            out.insert(other.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: Option<String>,
    pub properties: Vec<(String, Box<TypeOrd>)>,
}

/// `Type` isn't `Ord` in a way that composes cleanly into a `BTreeMap`
/// key position inline, so property lists are kept as a sorted `Vec`
/// instead — property order then doubles as a stable iteration order
/// for structural-equality comparisons.
pub type TypeOrd = Type;

impl ObjectType {
    pub fn new(name: Option<String>) -> Self {
        Self { name, properties: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.properties.iter().find(|(n, _)| n == name).map(|(_, t)| t.as_ref())
    }

    pub fn set(&mut self, name: impl Into<String>, ty: Type) {
        let name = name.into();
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = Box::new(ty);
        } else {
            self.properties.push((name, Box::new(ty)));
            self.properties.sort_by(|a, b| a.0.cmp(&b.0));
        }
    }

    /// Structural merge used when joining two object types with the
    /// same nominal name: properties present on both join their types;
    /// properties present on only one become nullable (they might not
    /// exist along the other path), matching §4.6's possibly-inexistent
    /// property model.
    fn merge_shape(&self, other: &ObjectType) -> ObjectType {
        let mut merged = ObjectType::new(self.name.clone());
        let mut names: BTreeSet<&str> = self.properties.iter().map(|(n, _)| n.as_str()).collect();
        names.extend(other.properties.iter().map(|(n, _)| n.as_str()));
        for name in names {
            let a = self.get(name);
            let b = other.get(name);
            let joined = match (a, b) {
                (Some(a), Some(b)) => a.join(b),
                (Some(a), None) => a.join(&Type::Undefined),
                (None, Some(b)) => b.join(&Type::Undefined),
                (None, None) => Type::Undefined,
            };
            merged.set(name, joined);
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionType {
    pub type_params: Vec<String>,
    pub params: Vec<Type>,
    pub return_type: Box<Type>,
}

#[derive(thiserror::Error, Debug)]
pub enum TypeError {
    #[error(transparent)]
    Ast(#[from] crate::ast::AstError),
    #[error(transparent)]
    Dataflow(#[from] crate::dataflow::DataflowError),
    #[error("could not unify {0:?} with {1:?} for generic parameter {2}")]
    UnificationConflict(Type, Type, String),
    #[error("call to {0} referenced before its summary was available and never resolved")]
    UnresolvedDeferredCall(String),
}

pub type TypeResult<T> = Result<T, TypeError>;
