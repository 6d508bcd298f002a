use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use arbor_id3::{Dataset, Id3Config, stratified_holdout};
use arbor_io::{DiscretizationMode, ExperimentName, Preprocessor, ResultWriter, TableReader};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "ID3 decision-tree induction and evaluation on tabular data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

/// Induction parameters.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Minimum parent information gain for a branch to keep growing
    #[arg(long, default_value_t = 0.01)]
    threshold: f64,

    /// Maximum number of rows passed down each branch
    #[arg(long, default_value_t = arbor_id3::DEFAULT_MAX_BRANCH_ROWS)]
    max_branch_rows: usize,

    /// Maximum tree depth (unbounded if omitted)
    #[arg(long)]
    max_depth: Option<usize>,
}

/// Preprocessing parameters for numeric columns.
#[derive(Args, Debug, Clone)]
struct DiscretizeArgs {
    /// Number of buckets per numeric column
    #[arg(long, default_value_t = 5)]
    bins: usize,

    /// How numeric columns are cut into buckets
    #[arg(long, value_enum, default_value_t = Discretization::EqualWidth)]
    discretization: Discretization,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Discretization {
    EqualWidth,
    EqualFrequency,
}

impl From<Discretization> for DiscretizationMode {
    fn from(d: Discretization) -> Self {
        match d {
            Discretization::EqualWidth => DiscretizationMode::EqualWidth,
            Discretization::EqualFrequency => DiscretizationMode::EqualFrequency,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Build a tree on a training table and score it on held-out rows
    Run {
        /// Path to the training CSV file (last column is the label)
        #[arg(long)]
        train: PathBuf,

        /// Path to a separate test CSV file with the same header
        #[arg(long, conflicts_with = "test_fraction")]
        test: Option<PathBuf>,

        /// Fraction of training rows held out per class when no test file is given
        #[arg(long, default_value_t = 0.25)]
        test_fraction: f64,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".", requires = "experiment")]
        output_dir: PathBuf,

        /// Print the fitted tree and confusion matrix to stderr
        #[arg(long, default_value_t = false)]
        print_tree: bool,

        #[command(flatten)]
        tree: TreeArgs,

        #[command(flatten)]
        discretize: DiscretizeArgs,
    },
}

// --- Stdout summary struct ---

#[derive(Serialize)]
struct RunOutput {
    experiment: Option<String>,
    n_train: usize,
    n_test: usize,
    n_features: usize,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    n_correct: usize,
    n_incorrect: usize,
    n_unknown: usize,
    accuracy_percent: Option<f64>,
}

/// Load the training table, preprocess it, and split off the test rows.
fn load_datasets(
    train: &Path,
    test: Option<&Path>,
    test_fraction: f64,
    preprocessor: &Preprocessor,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    let train_table = TableReader::new(train)
        .read()
        .context("failed to read training CSV")?;
    let fitted = preprocessor
        .fit(&train_table)
        .context("failed to fit preprocessor")?;
    let train_data = fitted
        .transform(&train_table)
        .context("failed to preprocess training table")?;

    match test {
        Some(path) => {
            let test_table = TableReader::new(path)
                .read()
                .context("failed to read test CSV")?;
            let test_data = fitted
                .transform(&test_table)
                .context("failed to preprocess test table")?;
            Ok((train_data, test_data))
        }
        None => {
            let split = stratified_holdout(&train_data, test_fraction, seed)
                .context("failed to split holdout set")?;
            info!(
                test_fraction,
                n_train = split.train.n_rows(),
                n_test = split.test.n_rows(),
                "holdout split"
            );
            Ok((split.train, split.test))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Run {
            train,
            test,
            test_fraction,
            experiment,
            output_dir,
            print_tree,
            tree: tree_args,
            discretize,
        } => {
            // Validate the name before doing any work.
            let experiment_name = experiment.clone().map(ExperimentName::new).transpose()?;

            // 1. Read and preprocess
            let preprocessor = Preprocessor::new()
                .with_bins(discretize.bins)
                .with_mode(discretize.discretization.into());
            let (train_data, test_data) = load_datasets(
                &train,
                test.as_deref(),
                test_fraction,
                &preprocessor,
                cli.seed,
            )?;
            if test_data.is_empty() {
                warn!("test set is empty; accuracy is undefined");
            }

            // 2. Build the tree
            let config = Id3Config::new()
                .with_prune_threshold(tree_args.threshold)
                .with_max_branch_rows(tree_args.max_branch_rows)
                .with_max_depth(tree_args.max_depth);
            let tree = config.fit(&train_data).context("tree induction failed")?;
            info!(
                n_nodes = tree.n_nodes(),
                n_leaves = tree.n_leaves(),
                depth = tree.depth(),
                "tree built"
            );

            // 3. Evaluate
            let report = tree.evaluate(&test_data);
            info!("{report}");

            if print_tree {
                eprintln!("{tree}");
                eprintln!("{}", report.confusion_matrix());
            }

            // 4. Write JSON artifacts
            if let Some(name) = experiment_name {
                let writer = ResultWriter::new(&output_dir, name)?;
                writer.write_tree(&tree)?;
                writer.write_report(&report)?;
            }

            // 5. Print summary
            let output = RunOutput {
                experiment,
                n_train: train_data.n_rows(),
                n_test: test_data.n_rows(),
                n_features: tree.feature_columns().len(),
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                n_correct: report.n_correct(),
                n_incorrect: report.n_incorrect(),
                n_unknown: report.n_unknown(),
                accuracy_percent: report.accuracy_percent(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
