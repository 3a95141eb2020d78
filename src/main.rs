//! Trains a good/bad classifier on every dataset file found under a
//! directory and writes the per-epoch metrics of each run as CSV.
//!
//! ```bash
//! cargo run --release -- --file ../data --folds 3 --epochs 1000
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use binclass_nn::data::csv::save_as_csv;
use binclass_nn::data::loader::load_data_files_from_path;
use binclass_nn::{
    ActivationFunction, DataFile, DataPoint, FoldGroups, Network, NetworkSpec, Sgd,
    TrainConfig, train_loop,
};

/// Train a feed-forward bin classifier with k-fold rotation.
#[derive(Parser, Debug)]
#[command(name = "binclass-nn")]
#[command(about = "Train a good/bad bin classifier on .out dataset files")]
struct Args {
    /// Path to the data files
    #[arg(short, long, default_value = "../data")]
    file: PathBuf,

    /// Directory the metric CSV files are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Number of training epochs
    #[arg(long, default_value_t = 1000)]
    epochs: usize,

    /// Number of stratified folds
    #[arg(short = 'k', long, default_value_t = 3, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    folds: usize,

    /// Rotate the test fold every N epochs (0 keeps it fixed)
    #[arg(long, default_value_t = 0)]
    rotate_every: usize,

    /// Number of hidden layers
    #[arg(long, default_value_t = 1)]
    hidden_count: usize,

    /// Neurons per hidden layer
    #[arg(long, default_value_t = 8, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    hidden_size: usize,

    /// Learning rate
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Momentum coefficient (0 disables momentum)
    #[arg(long, default_value_t = 0.0)]
    momentum: f64,

    /// Training steps taken on each example per epoch
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    repeats: usize,

    /// Random seed for weight initialisation and fold shuffling
    #[arg(long, default_value_t = 691)]
    seed: u64,

    /// Merge every file into one dataset, zero-padding to the widest bin count
    #[arg(long)]
    combine: bool,

    /// Save each trained network as JSON next to its metrics
    #[arg(long)]
    save_model: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut data_files = load_data_files_from_path(&args.file)?;
    data_files.retain(|f| !f.is_empty());
    if data_files.is_empty() {
        bail!("no usable .out data files under {}", args.file.display());
    }
    if args.combine {
        data_files = vec![combine(&data_files)];
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    for (i, data) in data_files.iter().enumerate() {
        run(&args, i, data)?;
    }
    Ok(())
}

fn run(args: &Args, index: usize, data: &DataFile) -> Result<()> {
    let bin_count = data.bin_count().unwrap_or(0);
    if args.folds > data.len() {
        warn!(
            "data file {} has {} examples, fewer than {} folds; skipped",
            index,
            data.len(),
            args.folds
        );
        return Ok(());
    }

    let spec = NetworkSpec::stacked(bin_count, args.hidden_count, args.hidden_size, 2, ActivationFunction::Sigmoid)
        .with_seed(args.seed)
        .with_name(format!("run-{}", index));
    let mut network = Network::from_spec(&spec);
    let mut folds = FoldGroups::partition(&data.data_points, args.folds, args.seed);
    let optimizer = Sgd::with_momentum(args.learning_rate, args.momentum);

    let mut config = TrainConfig::new(args.epochs);
    config.repeats_per_example = args.repeats;
    config.rotate_every = args.rotate_every;

    info!(
        "{}: {} examples ({} bad), {} bins, {} fold(s)",
        spec.name,
        data.len(),
        data.bad_count(),
        bin_count,
        folds.k()
    );
    let history = train_loop(&mut network, &mut folds, &optimizer, &config);

    if let (Some(train), Some(test)) = (history.train_error.last(), history.test_error.last()) {
        info!(
            "{}: final train error {:.6}, test error {:.6}, test accuracy {:.1}%",
            spec.name,
            train,
            test,
            history.correct_test.last().copied().unwrap_or(0.0) * 100.0
        );
    }

    let csv_path = args.output.join(format!("{}.csv", spec.name));
    save_as_csv(&csv_path, &history.series())?;
    info!("metrics written to {}", csv_path.display());

    if args.save_model {
        let model_path = args.output.join(format!("{}.json", spec.name));
        network.save_json(&model_path.to_string_lossy())
            .with_context(|| format!("failed to save {}", model_path.display()))?;
        info!("model written to {}", model_path.display());
    }
    Ok(())
}

/// All examples of all files, padded with zeros to the widest bin count.
fn combine(files: &[DataFile]) -> DataFile {
    let width = files.iter().filter_map(|f| f.bin_count()).max().unwrap_or(0);
    let points: Vec<DataPoint> = files.iter()
        .flat_map(|f| f.data_points.iter())
        .map(|p| p.with_padding(width, 0.0))
        .collect();
    DataFile::new(points)
}
