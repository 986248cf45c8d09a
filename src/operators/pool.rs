use crate::model::{ArcSet, Dag, NodeKind};
use crate::operators::{Operator, OperatorSet, TabuSet};
use crate::score::Score;

/// Composes several operator sets behind the single [`OperatorSet`] contract
/// the search loop consumes. `find_max` takes the best candidate across all
/// members; cache maintenance fans out to every member.
pub struct OperatorPool {
    members: Vec<Box<dyn OperatorSet>>,
}

impl OperatorPool {
    pub fn new(members: Vec<Box<dyn OperatorSet>>) -> Self {
        debug_assert!(!members.is_empty());
        Self { members }
    }
}

impl OperatorSet for OperatorPool {
    fn set_arc_blacklist(&mut self, blacklist: ArcSet) {
        for member in &mut self.members {
            member.set_arc_blacklist(blacklist.clone());
        }
    }

    fn set_arc_whitelist(&mut self, whitelist: ArcSet) {
        for member in &mut self.members {
            member.set_arc_whitelist(whitelist.clone());
        }
    }

    fn set_kind_whitelist(&mut self, whitelist: &[(usize, NodeKind)]) {
        for member in &mut self.members {
            member.set_kind_whitelist(whitelist);
        }
    }

    fn set_max_indegree(&mut self, max_indegree: usize) {
        for member in &mut self.members {
            member.set_max_indegree(max_indegree);
        }
    }

    fn cache_scores(&mut self, model: &Dag, score: &dyn Score) {
        for member in &mut self.members {
            member.cache_scores(model, score);
        }
    }

    fn find_max(&self, model: &Dag) -> Option<Operator> {
        self.members
            .iter()
            .filter_map(|member| member.find_max(model))
            .max_by(|a, b| a.delta().total_cmp(&b.delta()))
    }

    fn find_max_tabu(&self, model: &Dag, tabu: &TabuSet) -> Option<Operator> {
        self.members
            .iter()
            .filter_map(|member| member.find_max_tabu(model, tabu))
            .max_by(|a, b| a.delta().total_cmp(&b.delta()))
    }

    fn update_scores(&mut self, model: &Dag, score: &dyn Score, applied: &Operator) {
        for member in &mut self.members {
            member.update_scores(model, score, applied);
        }
    }
}
