use crate::data::DataSet;
use crate::error::DfResult;
use crate::factors::LinearGaussianCpd;
use crate::model::Dag;
use strum_macros::{Display, EnumIter, EnumString};

/// Catalog of small reference structures with fixed linear-Gaussian
/// parameters, used by the CLI, benches and recovery tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum KnownNetwork {
    /// a -> b -> c
    Chain3,
    /// a -> b, a -> c
    Fork3,
    /// a -> c <- b
    Collider3,
    /// a -> b, a -> c, b -> d, c -> d
    Diamond4,
    /// a -> b -> c -> d -> e
    Chain5,
}

impl KnownNetwork {
    pub fn names(&self) -> Vec<String> {
        let names: &[&str] = match self {
            KnownNetwork::Chain3 | KnownNetwork::Fork3 | KnownNetwork::Collider3 => {
                &["a", "b", "c"]
            }
            KnownNetwork::Diamond4 => &["a", "b", "c", "d"],
            KnownNetwork::Chain5 => &["a", "b", "c", "d", "e"],
        };
        names.iter().map(|n| n.to_string()).collect()
    }

    pub fn arcs(&self) -> &'static [(usize, usize)] {
        match self {
            KnownNetwork::Chain3 => &[(0, 1), (1, 2)],
            KnownNetwork::Fork3 => &[(0, 1), (0, 2)],
            KnownNetwork::Collider3 => &[(0, 2), (1, 2)],
            KnownNetwork::Diamond4 => &[(0, 1), (0, 2), (1, 3), (2, 3)],
            KnownNetwork::Chain5 => &[(0, 1), (1, 2), (2, 3), (3, 4)],
        }
    }

    pub fn dag(&self) -> Dag {
        let mut dag = Dag::new(self.names());
        for &(s, t) in self.arcs() {
            // Catalog arcs are acyclic by construction.
            dag.add_arc(s, t).expect("catalog arc");
        }
        dag
    }

    /// One CPD per node, in node order. Coefficients are fixed and strong
    /// enough that moderate samples identify the skeleton.
    fn cpds(&self) -> Vec<LinearGaussianCpd> {
        let dag = self.dag();
        let names = self.names();
        (0..names.len())
            .map(|node| {
                let parents: Vec<String> = dag
                    .parents(node)
                    .iter()
                    .map(|&p| names[p].clone())
                    .collect();
                // Intercept 0, coefficient pattern 2.0, -1.5, 2.0, ...
                let mut beta = vec![0.0];
                for k in 0..parents.len() {
                    beta.push(if k % 2 == 0 { 2.0 } else { -1.5 });
                }
                LinearGaussianCpd::with_params(names[node].clone(), parents, beta, 1.0)
            })
            .collect()
    }

    /// Forward-samples `n` rows. Nodes are topologically ordered in the
    /// catalog definitions, so sampling in node order is valid.
    pub fn sample(&self, n: usize, seed: u64) -> DfResult<DataSet> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let names = self.names();
        let mut generated: Vec<Vec<f64>> = Vec::with_capacity(names.len());

        for cpd in self.cpds() {
            let evidence = DataSet::new(
                names[..generated.len()].to_vec(),
                generated.clone(),
            )?;
            generated.push(cpd.sample(n, &evidence, &mut rng)?);
        }

        DataSet::new(names, generated)
    }
}
