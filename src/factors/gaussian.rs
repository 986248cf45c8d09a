use crate::data::DataSet;
use crate::error::{DagForgeError, DfResult};
use crate::factors::{evidence_columns, sample_normal, variable_column};
use serde::{Deserialize, Serialize};

const LOG_2PI: f64 = 1.8378770664093453;
// Floor on the residual variance so degenerate fits stay finite.
const MIN_VARIANCE: f64 = 1e-9;

/// Linear-Gaussian conditional distribution:
/// variable ~ N(beta0 + beta · evidence, variance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearGaussianCpd {
    variable: String,
    evidence: Vec<String>,
    /// Intercept followed by one coefficient per evidence column.
    pub beta: Vec<f64>,
    pub variance: f64,
    fitted: bool,
}

impl LinearGaussianCpd {
    pub fn new(variable: String, evidence: Vec<String>) -> Self {
        Self {
            variable,
            evidence,
            beta: Vec::new(),
            variance: 0.0,
            fitted: false,
        }
    }

    /// Pre-parameterized CPD, used by the known-network simulators.
    pub fn with_params(
        variable: String,
        evidence: Vec<String>,
        beta: Vec<f64>,
        variance: f64,
    ) -> Self {
        debug_assert_eq!(beta.len(), evidence.len() + 1);
        Self {
            variable,
            evidence,
            beta,
            variance,
            fitted: true,
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

    /// Ordinary least squares via normal equations.
    pub fn fit(&mut self, data: &DataSet) -> DfResult<()> {
        let y = variable_column(data, &self.variable)?;
        let ev = evidence_columns(data, &self.evidence)?;
        let n = y.len();
        let p = ev.len() + 1;
        if n < p + 1 {
            return Err(DagForgeError::Validation(format!(
                "Cannot fit '{}' on {} parents with only {} rows",
                self.variable,
                ev.len(),
                n
            )));
        }

        // Design row i is [1, ev_0[i], .., ev_k[i]].
        let mut xtx = vec![0.0; p * p];
        let mut xty = vec![0.0; p];
        for i in 0..n {
            let mut row = Vec::with_capacity(p);
            row.push(1.0);
            for col in &ev {
                row.push(col[i]);
            }
            for a in 0..p {
                xty[a] += row[a] * y[i];
                for b in a..p {
                    xtx[a * p + b] += row[a] * row[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                xtx[a * p + b] = xtx[b * p + a];
            }
        }

        let beta = solve_spd(&mut xtx, &xty, p)?;

        let mut rss = 0.0;
        for i in 0..n {
            let mut mu = beta[0];
            for (k, col) in ev.iter().enumerate() {
                mu += beta[k + 1] * col[i];
            }
            let r = y[i] - mu;
            rss += r * r;
        }

        self.beta = beta;
        self.variance = (rss / n as f64).max(MIN_VARIANCE);
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
        let inv_2var = 0.5 / self.variance;
        let log_norm = -0.5 * (LOG_2PI + self.variance.ln());

        let mut out = Vec::with_capacity(y.len());
        for i in 0..y.len() {
            let mut mu = self.beta[0];
            for (k, col) in ev.iter().enumerate() {
                mu += self.beta[k + 1] * col[i];
            }
            let r = y[i] - mu;
            out.push(log_norm - r * r * inv_2var);
        }
        Ok(out)
    }

    pub fn sample(
        &self,
        n: usize,
        evidence: &DataSet,
        rng: &mut fastrand::Rng,
    ) -> DfResult<Vec<f64>> {
        if !self.fitted {
            return Err(DagForgeError::Validation(format!(
                "CPD for '{}' is not fitted",
                self.variable
            )));
        }
        let ev = evidence_columns(evidence, &self.evidence)?;
        let sd = self.variance.sqrt();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let mut mu = self.beta[0];
            for (k, col) in ev.iter().enumerate() {
                mu += self.beta[k + 1] * col[i];
            }
            out.push(mu + sd * sample_normal(rng));
        }
        Ok(out)
    }
}

/// Solves `a * x = b` for symmetric positive-definite `a` (row-major, p x p)
/// by Cholesky decomposition, with a ridge retry for near-singular systems.
fn solve_spd(a: &mut [f64], b: &[f64], p: usize) -> DfResult<Vec<f64>> {
    for attempt in 0..2 {
        if attempt == 1 {
            for d in 0..p {
                a[d * p + d] += 1e-8;
            }
        }
        if let Some(x) = try_cholesky_solve(a, b, p) {
            return Ok(x);
        }
    }
    Err(DagForgeError::Validation(
        "Singular design matrix in least-squares fit (collinear parents?)".to_string(),
    ))
}

fn try_cholesky_solve(a: &[f64], b: &[f64], p: usize) -> Option<Vec<f64>> {
    // Lower-triangular factor L with a = L L^T.
    let mut l = vec![0.0; p * p];
    for i in 0..p {
        for j in 0..=i {
            let mut sum = a[i * p + j];
            for k in 0..j {
                sum -= l[i * p + k] * l[j * p + k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i * p + i] = sum.sqrt();
            } else {
                l[i * p + j] = sum / l[j * p + j];
            }
        }
    }
    // Forward then backward substitution.
    let mut y = vec![0.0; p];
    for i in 0..p {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i * p + k] * y[k];
        }
        y[i] = sum / l[i * p + i];
    }
    let mut x = vec![0.0; p];
    for i in (0..p).rev() {
        let mut sum = y[i];
        for k in (i + 1)..p {
            sum -= l[k * p + i] * x[k];
        }
        x[i] = sum / l[i * p + i];
    }
    Some(x)
}
