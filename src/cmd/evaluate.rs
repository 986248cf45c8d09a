use crate::reports;
use clap::Args;
use dagforge::data::DataSet;
use dagforge::error::{DagForgeError, DfResult};
use dagforge::model::Dag;
use dagforge::networks::KnownNetwork;
use dagforge::score::GaussianBic;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Catalog network to score, e.g. "chain3".
    #[arg(long)]
    pub network: Option<KnownNetwork>,

    /// Saved network JSON to score instead of a catalog entry.
    #[arg(long)]
    pub model: Option<String>,
}

pub fn run(args: EvaluateArgs, data: DataSet) -> DfResult<()> {
    let dag: Dag = match (&args.network, &args.model) {
        (Some(network), None) => network.dag(),
        (None, Some(path)) => {
            let json = std::fs::read_to_string(path)?;
            serde_json::from_str(&json)?
        }
        _ => {
            return Err(DagForgeError::Config(
                "Pass exactly one of --network or --model".to_string(),
            ))
        }
    };

    for name in dag.names() {
        if data.column_index(name).is_none() {
            return Err(DagForgeError::Validation(format!(
                "Dataset has no column '{}' required by the network",
                name
            )));
        }
    }

    let score = GaussianBic::new(data);
    println!("\n📊 Scoring structure against dataset (BIC)");
    reports::print_structure(&dag);
    reports::print_local_scores(&dag, &score);
    Ok(())
}
