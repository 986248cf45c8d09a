use clap::{Parser, Subcommand};
use dagforge::data::DataSet;
use std::process;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/dataset.csv")]
    data: String,

    #[arg(global = true, short = 'S', long)]
    seed: Option<u64>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Learn(cmd::learn::LearnArgs),
    Evaluate(cmd::evaluate::EvaluateArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    println!("\n🚀 Initializing DagForge Core...");
    println!("📂 Loading Dataset: {}", cli.data);

    let data = match DataSet::from_csv_path(&cli.data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("\n❌ FATAL ERROR LOADING DATASET:");
            eprintln!("   {}", e);
            process::exit(1);
        }
    };
    println!(
        "   {} rows x {} columns",
        data.n_rows(),
        data.n_cols()
    );

    let result = match cli.command {
        Commands::Learn(args) => cmd::learn::run(args, data, cli.seed),
        Commands::Evaluate(args) => cmd::evaluate::run(args, data),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        process::exit(1);
    }
}
