use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;
use disease_core::persistence::{load_snapshot, save_snapshot};
use disease_core::recognizer::{LexiconRecognizer, PrecomputedRecognizer, Recognizer};
use disease_core::table::{check_repredicted, read_records, read_table, repredict, write_table, TableRow};
use disease_core::{CorpusPipeline, PipelineConfig, PipelineError, RecordAnalysis};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "disease_core=info,disease_predict=info";

#[derive(Debug, Parser)]
#[command(name = "disease_predict", about = "Rank the most likely diseases per record")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every pass over a corpus of records.
    Run(RunArgs),
    /// Re-predict from the merged columns of a previously written table.
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON lines with `id`, `title` and optional `description`.
    #[arg(long, value_name = "FILE")]
    records: PathBuf,

    /// Dictionary for the built-in lexicon recognizer.
    #[arg(long, value_name = "FILE", conflicts_with = "annotations", required_unless_present = "annotations")]
    lexicon: Option<PathBuf>,

    /// Annotations precomputed by an external recognizer, keyed by text.
    #[arg(long, value_name = "FILE")]
    annotations: Option<PathBuf>,

    /// Pipeline configuration (term lists and switches).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, short = 'o', value_name = "FILE")]
    output: PathBuf,

    /// Where to save the pipeline state after the run.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Extract records in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long, value_name = "FILE")]
    table: PathBuf,

    /// Snapshot holding the concept map of the run that wrote the table.
    #[arg(long, value_name = "FILE")]
    snapshot: PathBuf,

    #[arg(long, short = 'o', value_name = "FILE")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Predict(args) => predict(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<(), PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.parallel_extraction |= args.parallel;

    let records = read_records(&args.records)?;
    let analyses = match (&args.lexicon, &args.annotations) {
        (Some(path), _) => run_with(&LexiconRecognizer::from_file(path)?, config, records, &args)?,
        (None, Some(path)) => run_with(&PrecomputedRecognizer::from_file(path)?, config, records, &args)?,
        (None, None) => return Err(PipelineError::Config("either --lexicon or --annotations is required".into())),
    };

    let rows: Vec<TableRow> = analyses.iter().map(TableRow::from).collect();
    write_table(&rows, &args.output)?;
    print_summary(&rows);
    Ok(())
}

fn run_with<R: Recognizer>(
    recognizer: &R,
    config: PipelineConfig,
    records: Vec<disease_core::Record>,
    args: &RunArgs,
) -> Result<Vec<RecordAnalysis>, PipelineError> {
    let mut pipeline = CorpusPipeline::new(config, recognizer);
    pipeline.run(records)?;
    if let Some(path) = &args.snapshot {
        save_snapshot(&pipeline.snapshot(), path)?;
    }
    Ok(pipeline.into_analyses())
}

fn predict(args: PredictArgs) -> Result<(), PipelineError> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let mut rows = read_table(&args.table)?;
    let failures = repredict(&mut rows, &snapshot.concepts);
    write_table(&rows, &args.output)?;
    print_summary(&rows);

    if !failures.is_empty() {
        println!("{}", format!("{} row(s) left without a prediction:", failures.len()).yellow());
        for (id, e) in &failures {
            println!("  {}: {}", id, e);
        }
    }
    check_repredicted(&failures)
}

fn print_summary(rows: &[TableRow]) {
    let count = |conf: Option<u8>| rows.iter().filter(|r| r.prediction_confidence == conf).count();

    println!("{}", "Disease prediction summary".bold());
    println!("---------------------------------------------------------------");
    println!("Records:           {}", rows.len());
    println!("Confidence 100:    {}", count(Some(100)).to_string().green());
    println!("Confidence 90:     {}", count(Some(90)).to_string().cyan());
    println!("Confidence 80:     {}", count(Some(80)).to_string().yellow());
    println!("No prediction:     {}", count(None).to_string().red());
}
