use crate::model::Dag;
use crate::operators::Operator;
use crate::score::ValidatedScore;

/// Per-node memo of the last computed validated local score.
///
/// Entries for nodes untouched by an applied operator stay valid, so a step
/// only pays for re-evaluating the operator's own nodes.
#[derive(Debug, Clone)]
pub struct LocalScoreCache {
    scores: Vec<f64>,
}

impl LocalScoreCache {
    pub fn new(model: &Dag) -> Self {
        Self {
            scores: vec![0.0; model.num_nodes()],
        }
    }

    /// Seeds every entry from the validated score.
    pub fn cache_vlocal_scores(&mut self, model: &Dag, score: &dyn ValidatedScore) {
        for node in 0..model.num_nodes() {
            self.scores[node] = score.vlocal_score(model, node);
        }
    }

    /// Refreshes only the entries for the nodes `op` touches: the target for
    /// add/remove/change-kind, both endpoints for a flip.
    pub fn update_vlocal_score(&mut self, model: &Dag, score: &dyn ValidatedScore, op: &Operator) {
        match *op {
            Operator::AddArc { target, .. } | Operator::RemoveArc { target, .. } => {
                self.scores[target] = score.vlocal_score(model, target);
            }
            Operator::FlipArc { source, target, .. } => {
                self.scores[source] = score.vlocal_score(model, source);
                self.scores[target] = score.vlocal_score(model, target);
            }
            Operator::ChangeNodeKind { node, .. } => {
                self.scores[node] = score.vlocal_score(model, node);
            }
        }
    }

    #[inline]
    pub fn local_score(&self, node: usize) -> f64 {
        self.scores[node]
    }

    pub fn sum(&self) -> f64 {
        self.scores.iter().sum()
    }
}
