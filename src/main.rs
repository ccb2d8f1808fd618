/// CLI: describe, train и predict

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use dslr::{
    io::{read_weights, write_predictions, write_weights, RawTable},
    prepare, DescriptiveReporter, FeatureEngineer, GradientMethod, House, OneVsRest,
    TracingObserver, TrainConfig, TrainingObserver,
};

fn cli() -> Command {
    Command::new("dslr")
        .version(clap::crate_version!())
        .about("One-vs-rest logistic regression and descriptive statistics")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("describe")
                .about("Show key statistic metrics for every numeric column")
                .arg(
                    Arg::new("datafile")
                        .help("Path to dataset file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("extended")
                        .short('e')
                        .long("extended")
                        .action(ArgAction::SetTrue)
                        .help("Additional statistic metrics"),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Train one-vs-rest logistic regression and save the weights")
                .arg(
                    Arg::new("data")
                        .help("Path to train data file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("JSON file with training parameters. Flags below override it.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("gradient")
                        .short('g')
                        .long("gradient")
                        .help("Gradient descent method")
                        .value_parser(["batch", "mini_batch", "sgd"]),
                )
                .arg(
                    Arg::new("alpha")
                        .long("alpha")
                        .help("Learning rate")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("cycles")
                        .long("cycles")
                        .help("Iteration budget for batch and sgd")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("batch_size")
                        .long("batch-size")
                        .help("Mini-batch size")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("epochs")
                        .long("epochs")
                        .help("Full passes over the data for mini_batch")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for weight initialization and shuffling")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue)
                        .help("Train the per-class models in parallel"),
                )
                .arg(
                    Arg::new("debug")
                        .short('d')
                        .long("debug")
                        .action(ArgAction::SetTrue)
                        .help("Print loss and accuracy while training"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value("datasets/weights.csv")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict houses with trained weights")
                .arg(
                    Arg::new("data")
                        .help("Path to test data file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("weights")
                        .help("Path to weights file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .default_value("houses.csv")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() -> Result<()> {
    let matches = cli().get_matches();

    let debug = matches
        .subcommand_matches("train")
        .map(|m| m.get_flag("debug"))
        .unwrap_or(false);

    // Инициализация логирования
    let default_level = if debug { "dslr=debug" } else { "dslr=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match matches.subcommand() {
        Some(("describe", m)) => describe(m),
        Some(("train", m)) => train(m),
        Some(("predict", m)) => predict(m),
        _ => unreachable!("subcommand is required"),
    }
}

fn describe(m: &ArgMatches) -> Result<()> {
    let path = m.get_one::<PathBuf>("datafile").context("missing datafile")?;
    let table = RawTable::from_path(path).with_context(|| format!("Cannot read {}", path.display()))?;

    let data = FeatureEngineer::extract_numeric_columns(&table)?;
    let summary = DescriptiveReporter::new(m.get_flag("extended")).describe(&data)?;
    print!("{}", summary);
    Ok(())
}

fn train_config(m: &ArgMatches) -> Result<TrainConfig> {
    let mut config = match m.get_one::<PathBuf>("config") {
        Some(path) => TrainConfig::from_json_file(path)
            .with_context(|| format!("Cannot load config {}", path.display()))?,
        None => TrainConfig::default(),
    };

    if let Some(method) = m.get_one::<String>("gradient") {
        config.method = method.parse::<GradientMethod>()?;
    }
    if let Some(&alpha) = m.get_one::<f64>("alpha") {
        config.alpha = alpha;
    }
    if let Some(&n_cycle) = m.get_one::<usize>("cycles") {
        config.n_cycle = n_cycle;
    }
    if let Some(&batch_size) = m.get_one::<usize>("batch_size") {
        config.batch_size = batch_size;
    }
    if let Some(&epochs) = m.get_one::<usize>("epochs") {
        config.mini_batch_epochs = epochs;
    }
    if let Some(&seed) = m.get_one::<u64>("seed") {
        config.seed = Some(seed);
    }
    config.parallel |= m.get_flag("parallel");
    config.debug |= m.get_flag("debug");

    Ok(config)
}

fn train(m: &ArgMatches) -> Result<()> {
    let config = train_config(m)?;
    let path = m.get_one::<PathBuf>("data").context("missing data file")?;
    let output = m.get_one::<PathBuf>("output").context("missing output path")?;

    let table = RawTable::from_path(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let (raw, labels) = FeatureEngineer::extract_training_features(&table)?;
    let data = prepare(raw)?;
    tracing::info!(
        rows = data.nrows(),
        features = data.ncols(),
        method = %config.method,
        "training data ready"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let trainer = OneVsRest::from_config(House::names(), &config);
    let weights = if config.parallel {
        trainer.fit_parallel(&data.features, &labels, &mut rng)?
    } else {
        let mut tracer = TracingObserver::default();
        let observer: Option<&mut dyn TrainingObserver> =
            if config.debug { Some(&mut tracer) } else { None };
        trainer.fit(&data.features, &labels, &mut rng, observer)?
    };

    let accuracy = weights.accuracy(&data.features, &labels)?;
    tracing::info!("Training accuracy: {:.4}", accuracy);

    write_weights(output, &weights).with_context(|| format!("Cannot write {}", output.display()))?;
    tracing::info!("All done!");
    Ok(())
}

fn predict(m: &ArgMatches) -> Result<()> {
    let path = m.get_one::<PathBuf>("data").context("missing data file")?;
    let weights_path = m.get_one::<PathBuf>("weights").context("missing weights file")?;
    let output = m.get_one::<PathBuf>("output").context("missing output path")?;

    let table = RawTable::from_path(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let weights = read_weights(weights_path)
        .with_context(|| format!("Cannot read {}", weights_path.display()))?;

    let (index, raw) = FeatureEngineer::extract_prediction_features(&table)?;
    let data = prepare(raw)?;
    let predicted = weights.predict(&data.features)?;

    let houses: Vec<&str> = predicted.iter().map(|&c| weights.classes[c].as_str()).collect();
    write_predictions(output, &index, &houses)
        .with_context(|| format!("Cannot write {}", output.display()))?;
    tracing::info!(rows = houses.len(), path = %output.display(), "predictions saved");
    Ok(())
}
