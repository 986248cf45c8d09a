use crate::model::{ArcSet, Dag, NodeKind};
use crate::operators::{Operator, OperatorSet, TabuSet};
use crate::score::Score;
use rayon::prelude::*;

/// Candidate set for [`Operator::ChangeNodeKind`].
///
/// With two families the neighborhood per node is a single toggle; the cache
/// holds the score gain of switching each node to the other family. Nodes
/// pinned by the kind whitelist produce no candidates.
pub struct KindOperatorSet {
    pinned: Vec<(usize, NodeKind)>,
    deltas: Vec<f64>,
    n: usize,
}

impl Default for KindOperatorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl KindOperatorSet {
    pub fn new() -> Self {
        Self {
            pinned: Vec::new(),
            deltas: Vec::new(),
            n: 0,
        }
    }

    fn is_pinned(&self, node: usize) -> bool {
        self.pinned.iter().any(|&(pinned, _)| pinned == node)
    }

    fn toggle_delta(model: &Dag, score: &dyn Score, node: usize) -> f64 {
        let mut probe = model.clone();
        probe.set_node_kind(node, other_kind(model.node_kind(node)));
        score.local_score(&probe, node) - score.local_score(model, node)
    }

    fn refresh_node(&mut self, model: &Dag, score: &dyn Score, node: usize) {
        self.deltas[node] = Self::toggle_delta(model, score, node);
    }
}

fn other_kind(kind: NodeKind) -> NodeKind {
    match kind {
        NodeKind::LinearGaussian => NodeKind::Kde,
        NodeKind::Kde => NodeKind::LinearGaussian,
    }
}

impl OperatorSet for KindOperatorSet {
    fn set_arc_blacklist(&mut self, _blacklist: ArcSet) {}

    fn set_arc_whitelist(&mut self, _whitelist: ArcSet) {}

    fn set_kind_whitelist(&mut self, whitelist: &[(usize, NodeKind)]) {
        self.pinned = whitelist.to_vec();
    }

    fn set_max_indegree(&mut self, _max_indegree: usize) {}

    fn cache_scores(&mut self, model: &Dag, score: &dyn Score) {
        self.n = model.num_nodes();
        self.deltas = (0..self.n)
            .into_par_iter()
            .map(|node| Self::toggle_delta(model, score, node))
            .collect();
    }

    fn find_max(&self, model: &Dag) -> Option<Operator> {
        self.find_max_tabu(model, &TabuSet::new())
    }

    fn find_max_tabu(&self, model: &Dag, tabu: &TabuSet) -> Option<Operator> {
        let mut best: Option<Operator> = None;
        for node in 0..self.n {
            if self.is_pinned(node) {
                continue;
            }
            let delta = self.deltas[node];
            if !delta.is_finite() {
                continue;
            }
            let op = Operator::ChangeNodeKind {
                node,
                kind: other_kind(model.node_kind(node)),
                delta,
            };
            if tabu.contains(&op) {
                continue;
            }
            if best.as_ref().map(|b| delta > b.delta()).unwrap_or(true) {
                best = Some(op);
            }
        }
        best
    }

    fn update_scores(&mut self, model: &Dag, score: &dyn Score, applied: &Operator) {
        match *applied {
            Operator::AddArc { target, .. } | Operator::RemoveArc { target, .. } => {
                self.refresh_node(model, score, target);
            }
            Operator::FlipArc { source, target, .. } => {
                self.refresh_node(model, score, source);
                self.refresh_node(model, score, target);
            }
            Operator::ChangeNodeKind { node, .. } => {
                self.refresh_node(model, score, node);
            }
        }
    }
}
