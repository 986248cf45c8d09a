pub mod bic;
pub mod cache;
pub mod holdout;

pub use self::bic::GaussianBic;
pub use self::cache::LocalScoreCache;
pub use self::holdout::HoldoutLikelihood;

use crate::model::Dag;

/// Decomposable model score. Implementations must return
/// `f64::NEG_INFINITY` for local configurations they cannot evaluate
/// (e.g. a singular fit) so the search simply never selects them.
pub trait Score: Sync {
    /// The portion of the total score attributable to `node` given its
    /// current parents and distribution family in `model`.
    fn local_score(&self, model: &Dag, node: usize) -> f64;

    fn score(&self, model: &Dag) -> f64 {
        (0..model.num_nodes())
            .map(|node| self.local_score(model, node))
            .sum()
    }
}

/// A score with a second, held-out evaluation path used only to accept or
/// reject moves, decoupled from the score driving candidate ranking.
pub trait ValidatedScore: Score {
    fn vlocal_score(&self, model: &Dag, node: usize) -> f64;

    fn vscore(&self, model: &Dag) -> f64 {
        (0..model.num_nodes())
            .map(|node| self.vlocal_score(model, node))
            .sum()
    }
}
