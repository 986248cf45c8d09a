pub mod gaussian;
pub mod kde;

pub use self::gaussian::LinearGaussianCpd;
pub use self::kde::KdeCpd;

use crate::data::DataSet;
use crate::error::{DagForgeError, DfResult};
use crate::model::NodeKind;
use serde::{Deserialize, Serialize};

/// Conditional distribution of one node given its parents.
///
/// Closed union over the supported families; every capability dispatches on
/// the variant so callers never inspect the family themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Cpd {
    LinearGaussian(LinearGaussianCpd),
    Kde(KdeCpd),
}

impl Cpd {
    /// Unfitted CPD of the given family.
    pub fn new(kind: NodeKind, variable: String, evidence: Vec<String>) -> Self {
        match kind {
            NodeKind::LinearGaussian => {
                Cpd::LinearGaussian(LinearGaussianCpd::new(variable, evidence))
            }
            NodeKind::Kde => Cpd::Kde(KdeCpd::new(variable, evidence)),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Cpd::LinearGaussian(_) => NodeKind::LinearGaussian,
            Cpd::Kde(_) => NodeKind::Kde,
        }
    }

    pub fn variable(&self) -> &str {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.variable(),
            Cpd::Kde(cpd) => cpd.variable(),
        }
    }

    pub fn evidence(&self) -> &[String] {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.evidence(),
            Cpd::Kde(cpd) => cpd.evidence(),
        }
    }

    pub fn fitted(&self) -> bool {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.fitted(),
            Cpd::Kde(cpd) => cpd.fitted(),
        }
    }

    pub fn fit(&mut self, data: &DataSet) -> DfResult<()> {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.fit(data),
            Cpd::Kde(cpd) => cpd.fit(data),
        }
    }

    /// Per-row log-likelihood.
    pub fn logl(&self, data: &DataSet) -> DfResult<Vec<f64>> {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.logl(data),
            Cpd::Kde(cpd) => cpd.logl(data),
        }
    }

    /// Summed log-likelihood.
    pub fn slogl(&self, data: &DataSet) -> DfResult<f64> {
        Ok(self.logl(data)?.iter().sum())
    }

    /// Draws `n` values of the variable given evidence columns in `data`.
    pub fn sample(&self, n: usize, evidence: &DataSet, rng: &mut fastrand::Rng) -> DfResult<Vec<f64>> {
        match self {
            Cpd::LinearGaussian(cpd) => cpd.sample(n, evidence, rng),
            Cpd::Kde(cpd) => cpd.sample(n, evidence, rng),
        }
    }

    /// Number of free parameters, used by penalized scores.
    pub fn num_params(&self) -> usize {
        match self {
            // intercept + one coefficient per parent + variance
            Cpd::LinearGaussian(cpd) => cpd.evidence().len() + 2,
            // one bandwidth per dimension
            Cpd::Kde(cpd) => cpd.evidence().len() + 1,
        }
    }
}

pub(crate) fn evidence_columns<'a>(
    data: &'a DataSet,
    evidence: &[String],
) -> DfResult<Vec<&'a [f64]>> {
    evidence
        .iter()
        .map(|name| {
            data.column_index(name)
                .map(|idx| data.column(idx))
                .ok_or_else(|| {
                    DagForgeError::Validation(format!("Evidence column '{}' missing", name))
                })
        })
        .collect()
}

pub(crate) fn variable_column<'a>(data: &'a DataSet, variable: &str) -> DfResult<&'a [f64]> {
    data.column_index(variable)
        .map(|idx| data.column(idx))
        .ok_or_else(|| DagForgeError::Validation(format!("Variable column '{}' missing", variable)))
}

/// Standard normal draw via Box-Muller.
pub(crate) fn sample_normal(rng: &mut fastrand::Rng) -> f64 {
    let u1 = loop {
        let u = rng.f64();
        if u > 0.0 {
            break u;
        }
    };
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
