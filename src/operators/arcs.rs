use crate::model::{ArcSet, Dag, NodeKind};
use crate::operators::{Operator, OperatorSet, TabuSet};
use crate::score::Score;
use rayon::prelude::*;
use tracing::debug;

/// Candidate set for the arc operators (add / remove / flip).
///
/// Keeps a per-node local-score cache and an n x n delta matrix. For a
/// missing arc (s, t), `delta[s][t]` is the gain of adding it; for a present
/// arc, the gain of removing it. A flip's gain is the removal delta plus the
/// reversed addition delta — exact, because the two touch disjoint parent
/// sets. `update_scores` refreshes only the columns of nodes whose parent
/// set changed.
pub struct ArcOperatorSet {
    blacklist: ArcSet,
    whitelist: ArcSet,
    max_indegree: usize,
    local_scores: Vec<f64>,
    delta: Vec<f64>,
    n: usize,
}

impl Default for ArcOperatorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcOperatorSet {
    pub fn new() -> Self {
        Self {
            blacklist: ArcSet::new(),
            whitelist: ArcSet::new(),
            max_indegree: 0,
            local_scores: Vec::new(),
            delta: Vec::new(),
            n: 0,
        }
    }

    #[inline]
    fn delta_at(&self, source: usize, target: usize) -> f64 {
        self.delta[source * self.n + target]
    }

    /// Local score of `target` with `flipped` toggled in/out of its parents.
    fn hypothetical_local(
        model: &Dag,
        score: &dyn Score,
        target: usize,
        flipped: usize,
    ) -> f64 {
        let mut probe = model.clone();
        let present = probe.has_arc(flipped, target);
        probe.set_arc_unchecked(flipped, target, !present);
        score.local_score(&probe, target)
    }

    /// Recomputes the delta column of `target`: one hypothetical local score
    /// per possible co-parent.
    fn refresh_column(&mut self, model: &Dag, score: &dyn Score, target: usize) {
        self.local_scores[target] = score.local_score(model, target);
        let base = self.local_scores[target];
        let n = self.n;
        let column: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|source| {
                if source == target {
                    0.0
                } else {
                    Self::hypothetical_local(model, score, target, source) - base
                }
            })
            .collect();
        for (source, d) in column.into_iter().enumerate() {
            self.delta[source * n + target] = d;
        }
    }

    fn indegree_ok(&self, model: &Dag, target: usize) -> bool {
        self.max_indegree == 0 || model.in_degree(target) < self.max_indegree
    }

    /// Scans candidates in deterministic order, deferring the (costly)
    /// acyclicity check until a candidate actually beats the running best.
    fn scan(&self, model: &Dag, tabu: Option<&TabuSet>) -> Option<Operator> {
        let mut best: Option<Operator> = None;
        let mut best_delta = f64::NEG_INFINITY;

        let mut consider = |op: Operator, legal: &dyn Fn() -> bool| {
            let d = op.delta();
            if !d.is_finite() || d <= best_delta {
                return;
            }
            if let Some(tabu) = tabu {
                if tabu.contains(&op) {
                    return;
                }
            }
            if legal() {
                best_delta = d;
                best = Some(op);
            }
        };

        for source in 0..self.n {
            for target in 0..self.n {
                if source == target {
                    continue;
                }
                if model.has_arc(source, target) {
                    if !self.whitelist.contains(&(source, target)) {
                        consider(
                            Operator::RemoveArc {
                                source,
                                target,
                                delta: self.delta_at(source, target),
                            },
                            &|| true,
                        );

                        if !self.blacklist.contains(&(target, source))
                            && self.indegree_ok(model, source)
                        {
                            consider(
                                Operator::FlipArc {
                                    source,
                                    target,
                                    delta: self.delta_at(source, target)
                                        + self.delta_at(target, source),
                                },
                                &|| !model.flip_would_close_cycle(source, target),
                            );
                        }
                    }
                } else if !model.has_arc(target, source)
                    && !self.blacklist.contains(&(source, target))
                    && self.indegree_ok(model, target)
                {
                    consider(
                        Operator::AddArc {
                            source,
                            target,
                            delta: self.delta_at(source, target),
                        },
                        &|| !model.would_close_cycle(source, target),
                    );
                }
            }
        }
        best
    }
}

impl OperatorSet for ArcOperatorSet {
    fn set_arc_blacklist(&mut self, blacklist: ArcSet) {
        self.blacklist = blacklist;
    }

    fn set_arc_whitelist(&mut self, whitelist: ArcSet) {
        self.whitelist = whitelist;
    }

    fn set_kind_whitelist(&mut self, _whitelist: &[(usize, NodeKind)]) {}

    fn set_max_indegree(&mut self, max_indegree: usize) {
        self.max_indegree = max_indegree;
    }

    fn cache_scores(&mut self, model: &Dag, score: &dyn Score) {
        self.n = model.num_nodes();
        self.local_scores = vec![0.0; self.n];
        self.delta = vec![0.0; self.n * self.n];
        for target in 0..self.n {
            self.refresh_column(model, score, target);
        }
        debug!(nodes = self.n, "Arc candidate cache rebuilt");
    }

    fn find_max(&self, model: &Dag) -> Option<Operator> {
        self.scan(model, None)
    }

    fn find_max_tabu(&self, model: &Dag, tabu: &TabuSet) -> Option<Operator> {
        self.scan(model, Some(tabu))
    }

    fn update_scores(&mut self, model: &Dag, score: &dyn Score, applied: &Operator) {
        match *applied {
            Operator::AddArc { target, .. } | Operator::RemoveArc { target, .. } => {
                self.refresh_column(model, score, target);
            }
            Operator::FlipArc { source, target, .. } => {
                self.refresh_column(model, score, source);
                self.refresh_column(model, score, target);
            }
            Operator::ChangeNodeKind { node, .. } => {
                // A family change alters the node's own local score under
                // family-aware scores, so its column must be refreshed too.
                self.refresh_column(model, score, node);
            }
        }
    }
}
