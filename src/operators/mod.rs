pub mod arcs;
pub mod kinds;
pub mod pool;

pub use self::arcs::ArcOperatorSet;
pub use self::kinds::KindOperatorSet;
pub use self::pool::OperatorPool;

use crate::error::DfResult;
use crate::model::{ArcSet, Dag, NodeKind};
use crate::score::Score;
use std::collections::HashSet;
use std::fmt;

/// A proposed atomic structural edit, carrying its precomputed score delta.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    AddArc {
        source: usize,
        target: usize,
        delta: f64,
    },
    RemoveArc {
        source: usize,
        target: usize,
        delta: f64,
    },
    FlipArc {
        source: usize,
        target: usize,
        delta: f64,
    },
    ChangeNodeKind {
        node: usize,
        kind: NodeKind,
        delta: f64,
    },
}

impl Operator {
    #[inline]
    pub fn delta(&self) -> f64 {
        match *self {
            Operator::AddArc { delta, .. }
            | Operator::RemoveArc { delta, .. }
            | Operator::FlipArc { delta, .. }
            | Operator::ChangeNodeKind { delta, .. } => delta,
        }
    }

    pub fn apply(&self, model: &mut Dag) -> DfResult<()> {
        match *self {
            Operator::AddArc { source, target, .. } => model.add_arc(source, target),
            Operator::RemoveArc { source, target, .. } => model.remove_arc(source, target),
            Operator::FlipArc { source, target, .. } => model.flip_arc(source, target),
            Operator::ChangeNodeKind { node, kind, .. } => {
                model.set_node_kind(node, kind);
                Ok(())
            }
        }
    }

    /// The exact structural inverse, with the delta negated.
    pub fn opposite(&self) -> Operator {
        match *self {
            Operator::AddArc {
                source,
                target,
                delta,
            } => Operator::RemoveArc {
                source,
                target,
                delta: -delta,
            },
            Operator::RemoveArc {
                source,
                target,
                delta,
            } => Operator::AddArc {
                source,
                target,
                delta: -delta,
            },
            Operator::FlipArc {
                source,
                target,
                delta,
            } => Operator::FlipArc {
                source: target,
                target: source,
                delta: -delta,
            },
            Operator::ChangeNodeKind { node, kind, delta } => Operator::ChangeNodeKind {
                node,
                kind: match kind {
                    NodeKind::LinearGaussian => NodeKind::Kde,
                    NodeKind::Kde => NodeKind::LinearGaussian,
                },
                delta: -delta,
            },
        }
    }

    /// Structural identity (delta excluded), used by the tabu set.
    pub fn key(&self) -> OperatorKey {
        match *self {
            Operator::AddArc { source, target, .. } => OperatorKey::AddArc(source, target),
            Operator::RemoveArc { source, target, .. } => OperatorKey::RemoveArc(source, target),
            Operator::FlipArc { source, target, .. } => OperatorKey::FlipArc(source, target),
            Operator::ChangeNodeKind { node, kind, .. } => OperatorKey::ChangeNodeKind(node, kind),
        }
    }

    /// Human-readable form with node names resolved against `model`.
    pub fn describe(&self, model: &Dag) -> String {
        match *self {
            Operator::AddArc { source, target, delta } => format!(
                "AddArc({} -> {}; delta {:.4})",
                model.name(source),
                model.name(target),
                delta
            ),
            Operator::RemoveArc { source, target, delta } => format!(
                "RemoveArc({} -> {}; delta {:.4})",
                model.name(source),
                model.name(target),
                delta
            ),
            Operator::FlipArc { source, target, delta } => format!(
                "FlipArc({} -> {}; delta {:.4})",
                model.name(source),
                model.name(target),
                delta
            ),
            Operator::ChangeNodeKind { node, kind, delta } => format!(
                "ChangeNodeKind({} => {}; delta {:.4})",
                model.name(node),
                kind,
                delta
            ),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operator::AddArc { source, target, delta } => {
                write!(f, "AddArc({} -> {}; delta {:.4})", source, target, delta)
            }
            Operator::RemoveArc { source, target, delta } => {
                write!(f, "RemoveArc({} -> {}; delta {:.4})", source, target, delta)
            }
            Operator::FlipArc { source, target, delta } => {
                write!(f, "FlipArc({} -> {}; delta {:.4})", source, target, delta)
            }
            Operator::ChangeNodeKind { node, kind, delta } => {
                write!(f, "ChangeNodeKind({} => {}; delta {:.4})", node, kind, delta)
            }
        }
    }
}

/// Structural identity of an operator, ignoring its delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKey {
    AddArc(usize, usize),
    RemoveArc(usize, usize),
    FlipArc(usize, usize),
    ChangeNodeKind(usize, NodeKind),
}

/// Bounded-by-run-length history of forbidden moves. Cleared whenever an
/// accepted improvement resets the patience counter.
#[derive(Debug, Clone, Default)]
pub struct TabuSet {
    set: HashSet<OperatorKey>,
}

impl TabuSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, op: &Operator) {
        self.set.insert(op.key());
    }

    pub fn contains(&self, op: &Operator) -> bool {
        self.set.contains(&op.key())
    }

    pub fn contains_key(&self, key: &OperatorKey) -> bool {
        self.set.contains(key)
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Candidate generator consumed by the search loop.
///
/// Implementations own an incremental candidate cache: `cache_scores`
/// rebuilds it from scratch, `update_scores` refreshes only the entries
/// invalidated by the applied operator.
pub trait OperatorSet {
    fn set_arc_blacklist(&mut self, blacklist: ArcSet);
    fn set_arc_whitelist(&mut self, whitelist: ArcSet);
    fn set_kind_whitelist(&mut self, whitelist: &[(usize, NodeKind)]);
    /// `0` means unbounded.
    fn set_max_indegree(&mut self, max_indegree: usize);

    fn cache_scores(&mut self, model: &Dag, score: &dyn Score);

    /// Best legal candidate, or `None` if the neighborhood is exhausted.
    fn find_max(&self, model: &Dag) -> Option<Operator>;

    /// As [`find_max`](OperatorSet::find_max), additionally masking
    /// candidates present in `tabu`.
    fn find_max_tabu(&self, model: &Dag, tabu: &TabuSet) -> Option<Operator>;

    /// Incremental cache refresh after `applied` has mutated `model`.
    fn update_scores(&mut self, model: &Dag, score: &dyn Score, applied: &Operator);
}
