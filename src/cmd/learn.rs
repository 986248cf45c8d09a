use crate::reports;
use clap::Args;
use dagforge::config::Config;
use dagforge::data::DataSet;
use dagforge::error::{DagForgeError, DfResult};
use dagforge::model::{Dag, NodeKind};
use dagforge::operators::{ArcOperatorSet, KindOperatorSet, Operator, OperatorPool};
use dagforge::score::{GaussianBic, HoldoutLikelihood, Score};
use dagforge::search::{estimate_hc, estimate_validated_hc, ProgressCallback};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct LearnArgs {
    #[command(flatten)]
    pub config: Config,

    /// Plain BIC hill climbing instead of the holdout-validated variant.
    #[arg(long, default_value_t = false)]
    pub no_validation: bool,

    /// Compare the learned arcs against a catalog network.
    #[arg(long)]
    pub reference: Option<dagforge::networks::KnownNetwork>,

    /// Write the learned network as JSON.
    #[arg(short, long)]
    pub output: Option<String>,
}

struct LogCallback;

impl ProgressCallback for LogCallback {
    fn on_step(
        &self,
        model: &Dag,
        op: Option<&Operator>,
        _score: &dyn Score,
        iteration: usize,
    ) -> bool {
        match op {
            Some(op) => info!(iteration, "{}", op.describe(model)),
            None => info!(iteration, arcs = model.num_arcs(), "checkpoint"),
        }
        true
    }
}

pub fn run(args: LearnArgs, data: DataSet, seed: Option<u64>) -> DfResult<()> {
    let start = Dag::new(data.names.clone());

    let blacklist = start.resolve_arcs(&args.config.constraints.get_blacklist()?)?;
    let whitelist = start.resolve_arcs(&args.config.constraints.get_whitelist()?)?;
    let kind_whitelist: Vec<(usize, NodeKind)> = args
        .config
        .constraints
        .get_kind_whitelist()?
        .into_iter()
        .map(|(name, kind)| {
            start
                .node_index(&name)
                .map(|idx| (idx, kind))
                .ok_or_else(|| {
                    DagForgeError::Validation(format!("Unknown node '{}' in kind whitelist", name))
                })
        })
        .collect::<DfResult<_>>()?;

    let params = &args.config.search;
    let callback = LogCallback;

    let learned = if args.no_validation {
        println!("🔎 Plain hill climbing (BIC)...");
        let score = GaussianBic::new(data);
        let mut op_set = ArcOperatorSet::new();
        estimate_hc(
            &mut op_set,
            &score,
            &start,
            &blacklist,
            &whitelist,
            params.max_indegree,
            params.max_iters,
            params.epsilon,
            Some(&callback),
        )?
    } else {
        println!(
            "🔎 Validated hill climbing (holdout ratio {})...",
            params.holdout_ratio
        );
        let score = HoldoutLikelihood::new(&data, params.holdout_ratio, seed)?;
        let mut op_set = OperatorPool::new(vec![
            Box::new(ArcOperatorSet::new()),
            Box::new(KindOperatorSet::new()),
        ]);
        estimate_validated_hc(
            &mut op_set,
            &score,
            &start,
            &blacklist,
            &whitelist,
            &kind_whitelist,
            params.max_indegree,
            params.max_iters,
            params.epsilon,
            params.patience,
            Some(&callback),
        )?
    };

    println!("\n✅ Finished: {} arcs learned", learned.num_arcs());
    reports::print_structure(&learned);

    if let Some(reference) = &args.reference {
        println!("🆚 Comparison against {}:", reference);
        reports::print_comparison(&learned, &reference.dag());
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&learned)?;
        std::fs::write(path, json)?;
        println!("💾 Saved network to {}", path);
    }

    Ok(())
}
