use crate::data::DataSet;
use crate::error::{DagForgeError, DfResult};
use crate::factors::{evidence_columns, sample_normal, variable_column};
use serde::{Deserialize, Serialize};

const LOG_2PI: f64 = 1.8378770664093453;
const MIN_BANDWIDTH: f64 = 1e-6;

/// Conditional kernel density estimate with product Gaussian kernels.
///
/// The conditional density is the ratio of a joint KDE over
/// (variable, evidence) and a marginal KDE over the evidence alone, both
/// sharing the training sample and Scott's-rule bandwidths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdeCpd {
    variable: String,
    evidence: Vec<String>,
    /// Training sample, one inner Vec per dimension (variable first).
    train: Vec<Vec<f64>>,
    /// Per-dimension bandwidths, variable first.
    bandwidth: Vec<f64>,
    fitted: bool,
}

impl KdeCpd {
    pub fn new(variable: String, evidence: Vec<String>) -> Self {
        Self {
            variable,
            evidence,
            train: Vec::new(),
            bandwidth: Vec::new(),
            fitted: false,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    pub fn fitted(&self) -> bool {
        self.fitted
    }

    pub fn n_train(&self) -> usize {
        self.train.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn fit(&mut self, data: &DataSet) -> DfResult<()> {
        let y = variable_column(data, &self.variable)?;
        let ev = evidence_columns(data, &self.evidence)?;
        let n = y.len();
        let d = ev.len() + 1;
        if n < 2 {
            return Err(DagForgeError::Validation(format!(
                "Cannot fit KDE for '{}' with {} rows",
                self.variable, n
            )));
        }

        let mut train = Vec::with_capacity(d);
        train.push(y.to_vec());
        for col in &ev {
            train.push(col.to_vec());
        }

        // Scott's rule: h_d = sigma_d * n^(-1 / (d + 4)).
        let factor = (n as f64).powf(-1.0 / (d as f64 + 4.0));
        let bandwidth = train
            .iter()
            .map(|col| (std_dev(col) * factor).max(MIN_BANDWIDTH))
            .collect();

        self.train = train;
        self.bandwidth = bandwidth;
        self.fitted = true;
        Ok(())
    }

    pub fn logl(&self, data: &DataSet) -> DfResult<Vec<f64>> {
        if !self.fitted {
            return Err(DagForgeError::Validation(format!(
                "CPD for '{}' is not fitted",
                self.variable
            )));
        }
        let y = variable_column(data, &self.variable)?;
        let ev = evidence_columns(data, &self.evidence)?;

        let mut out = Vec::with_capacity(y.len());
        let mut point = vec![0.0; self.train.len()];
        for i in 0..y.len() {
            point[0] = y[i];
            for (k, col) in ev.iter().enumerate() {
                point[k + 1] = col[i];
            }
            let joint = self.log_density(&point, 0);
            // Marginal over evidence only; empty evidence makes it log(1) = 0
            // so the conditional degenerates to the joint, as it should.
            let marginal = if ev.is_empty() {
                0.0
            } else {
                self.log_density(&point, 1)
            };
            out.push(joint - marginal);
        }
        Ok(out)
    }

    /// Log of the product-kernel density over dimensions `skip..`, evaluated
    /// with log-sum-exp across training points.
    fn log_density(&self, point: &[f64], skip: usize) -> f64 {
        let n = self.n_train();
        let dims = self.train.len() - skip;

        let mut log_norm = -(n as f64).ln();
        for d in skip..self.train.len() {
            log_norm -= self.bandwidth[d].ln();
        }
        log_norm -= 0.5 * dims as f64 * LOG_2PI;

        let mut max_exp = f64::NEG_INFINITY;
        let mut exps = Vec::with_capacity(n);
        for j in 0..n {
            let mut e = 0.0;
            for d in skip..self.train.len() {
                let z = (point[d] - self.train[d][j]) / self.bandwidth[d];
                e -= 0.5 * z * z;
            }
            if e > max_exp {
                max_exp = e;
            }
            exps.push(e);
        }

        let sum: f64 = exps.iter().map(|e| (e - max_exp).exp()).sum();
        log_norm + max_exp + sum.ln()
    }

    /// Smoothed bootstrap: resample a training row, perturb by the kernel.
    /// Evidence values are ignored; the simulators only need marginal draws.
    pub fn sample(
        &self,
        n: usize,
        _evidence: &DataSet,
        rng: &mut fastrand::Rng,
    ) -> DfResult<Vec<f64>> {
        if !self.fitted {
            return Err(DagForgeError::Validation(format!(
                "CPD for '{}' is not fitted",
                self.variable
            )));
        }
        let n_train = self.n_train();
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            let j = rng.usize(0..n_train);
            out.push(self.train[0][j] + self.bandwidth[0] * sample_normal(rng));
        }
        Ok(out)
    }
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}
