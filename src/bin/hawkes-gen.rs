//! hawkes-gen - Generate a synthetic Hawkes-format loan dataset
//!
//! With no arguments: 2000 customers, 70/15/15 split, artifacts written to
//! the current directory as train.json, dev.json, test.json and vocab.json.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use hawkes_prep::{
    generate_and_save, AgeOrdering, ArtifactFormat, PrepError, RunConfig, RunSummary, PREP_VERSION,
};

/// Generate synthetic loan histories and write Hawkes-format train/dev/test files
#[derive(Parser)]
#[command(name = "hawkes-gen")]
#[command(version = PREP_VERSION)]
#[command(about = "Generate a Hawkes-format loan event dataset", long_about = None)]
struct Cli {
    /// Load run settings from a JSON file (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of synthetic customers
    #[arg(short = 'n', long)]
    customers: Option<usize>,

    /// Maximum loans per customer
    #[arg(long)]
    max_loans: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Train fraction
    #[arg(long)]
    train: Option<f64>,

    /// Dev fraction
    #[arg(long)]
    dev: Option<f64>,

    /// Test fraction (test takes whatever train and dev leave)
    #[arg(long)]
    test: Option<f64>,

    /// Directory for the output files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Artifact format
    #[arg(long)]
    format: Option<FormatArg>,

    /// Accept decreasing ages instead of rejecting the record
    #[arg(long)]
    permissive_ages: bool,

    /// Skip writing the vocabulary sidecar
    #[arg(long)]
    no_vocab: bool,
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

impl From<FormatArg> for ArtifactFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ArtifactFormat::Json,
            FormatArg::JsonPretty => ArtifactFormat::JsonPretty,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PrepError> {
    let config = build_config(cli)?;

    println!(
        "Generating {} customer loan records...",
        config.generator.customers
    );
    println!("Converting to Hawkes format...");
    println!("Saving to {}...", config.output_dir.display());

    let summary = generate_and_save(&config)?;
    print_summary(&summary);

    Ok(())
}

fn build_config(cli: Cli) -> Result<RunConfig, PrepError> {
    let mut config = match cli.config {
        Some(path) => RunConfig::from_json_file(&path)?,
        None => RunConfig::default(),
    };

    if let Some(customers) = cli.customers {
        config.generator.customers = customers;
    }
    if let Some(max_loans) = cli.max_loans {
        config.generator.max_loans = max_loans;
    }
    if let Some(seed) = cli.seed {
        config.generator.seed = Some(seed);
    }
    if let Some(train) = cli.train {
        config.ratios.train = train;
    }
    if let Some(dev) = cli.dev {
        config.ratios.dev = dev;
    }
    if let Some(test) = cli.test {
        config.ratios.test = test;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if cli.permissive_ages {
        config.age_ordering = AgeOrdering::Permissive;
    }
    if cli.no_vocab {
        config.write_vocabulary = false;
    }

    config.validate()?;
    Ok(config)
}

fn print_summary(summary: &RunSummary) {
    let saved: Vec<String> = summary
        .artifacts
        .iter()
        .map(|(slice, path)| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            format!("{} ({} samples)", name, summary.counts.get(*slice))
        })
        .collect();
    println!("Saved {}", saved.join(", "));

    if let Some(path) = &summary.vocabulary_path {
        println!("Saved vocabulary to {}", path.display());
    }

    println!();
    println!("✓ Total: {} samples", summary.total_customers);
    println!("✓ Events: {}", summary.total_events);
    println!("✓ Number of event types: {}", summary.num_types);
    println!(
        "✓ Train/Dev/Test split: {:.1}%/{:.1}%/{:.1}%",
        summary.ratios.train * 100.0,
        summary.ratios.dev * 100.0,
        summary.ratios.test * 100.0
    );
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PrepError> for CliError {
    fn from(e: PrepError) -> Self {
        match e {
            PrepError::MalformedRecord { .. } => CliError {
                code: "MALFORMED_RECORD".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Check that loan_type_seq, loan_amt_seq and age_seq have matching token counts"
                        .to_string(),
                ),
            },
            PrepError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the output directory exists and is writable".to_string()),
            },
            PrepError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax of the config file".to_string()),
            },
            PrepError::InvalidConfig(msg) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: msg,
                hint: Some("Ratios must be non-negative and max_loans at least 1".to_string()),
            },
        }
    }
}
