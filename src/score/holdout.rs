use crate::data::DataSet;
use crate::error::DfResult;
use crate::factors::Cpd;
use crate::model::Dag;
use crate::score::{Score, ValidatedScore};

/// Holdout-validated likelihood.
///
/// The driving score fits each node's CPD (honoring its distribution
/// family) on the training split and returns the training log-likelihood;
/// the validated path returns the held-out log-likelihood of that same
/// training fit. Overfitting moves rank well on the former and are caught
/// by the latter.
pub struct HoldoutLikelihood {
    train: DataSet,
    test: DataSet,
}

impl HoldoutLikelihood {
    /// Splits `data` once; the split is fixed for the lifetime of the score.
    pub fn new(data: &DataSet, test_ratio: f64, seed: Option<u64>) -> DfResult<Self> {
        let (train, test) = data.split_holdout(test_ratio, seed)?;
        Ok(Self { train, test })
    }

    pub fn from_parts(train: DataSet, test: DataSet) -> Self {
        Self { train, test }
    }

    pub fn train(&self) -> &DataSet {
        &self.train
    }

    pub fn test(&self) -> &DataSet {
        &self.test
    }

    fn fit_node(&self, model: &Dag, node: usize) -> Option<Cpd> {
        let variable = model.name(node).to_string();
        let evidence: Vec<String> = model
            .parents(node)
            .iter()
            .map(|&p| model.name(p).to_string())
            .collect();
        let mut cpd = Cpd::new(model.node_kind(node), variable, evidence);
        cpd.fit(&self.train).ok()?;
        Some(cpd)
    }
}

impl Score for HoldoutLikelihood {
    fn local_score(&self, model: &Dag, node: usize) -> f64 {
        match self.fit_node(model, node) {
            Some(cpd) => cpd.slogl(&self.train).unwrap_or(f64::NEG_INFINITY),
            None => f64::NEG_INFINITY,
        }
    }
}

impl ValidatedScore for HoldoutLikelihood {
    fn vlocal_score(&self, model: &Dag, node: usize) -> f64 {
        match self.fit_node(model, node) {
            Some(cpd) => cpd.slogl(&self.test).unwrap_or(f64::NEG_INFINITY),
            None => f64::NEG_INFINITY,
        }
    }
}
