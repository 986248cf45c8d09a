use crate::data::DataSet;
use crate::factors::LinearGaussianCpd;
use crate::model::Dag;
use crate::score::Score;

/// Linear-Gaussian BIC: per-node Gaussian log-likelihood of the OLS fit
/// minus `0.5 * ln(N)` per free parameter.
///
/// Node distribution-family tags are ignored; BIC is defined for the
/// all-Gaussian network class.
pub struct GaussianBic {
    data: DataSet,
}

impl GaussianBic {
    pub fn new(data: DataSet) -> Self {
        Self { data }
    }
}

impl Score for GaussianBic {
    fn local_score(&self, model: &Dag, node: usize) -> f64 {
        let variable = model.name(node).to_string();
        let evidence: Vec<String> = model
            .parents(node)
            .iter()
            .map(|&p| model.name(p).to_string())
            .collect();
        let n_params = evidence.len() + 2;

        let mut cpd = LinearGaussianCpd::new(variable, evidence);
        if cpd.fit(&self.data).is_err() {
            return f64::NEG_INFINITY;
        }
        match cpd.logl(&self.data) {
            Ok(logl) => {
                let slogl: f64 = logl.iter().sum();
                slogl - 0.5 * (self.data.n_rows() as f64).ln() * n_params as f64
            }
            Err(_) => f64::NEG_INFINITY,
        }
    }
}
