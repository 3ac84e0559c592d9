use std::path::PathBuf;
use clap::Parser;

mod commands;
mod datasets;
mod errors;
mod features;
mod graph;
mod models;
mod utils;

#[derive(clap::Parser)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Predict(PredictCommand),
    Evaluate(EvaluateCommand),
}

#[derive(clap::Args)]
struct PredictCommand {
    #[clap(short, long)]
    training_file: PathBuf,

    #[clap(short, long)]
    inference_file: PathBuf,

    #[clap(short, long)]
    output_file: PathBuf,

    #[clap(long, default_value_t = 0.2)]
    holdout_fraction: f64,

    #[clap(long, default_value_t = 42)]
    seed: u64,

    #[clap(long)]
    strict_adamic_adar: bool,

    #[clap(long)]
    dump_features: Option<PathBuf>,
}

#[derive(clap::Args)]
struct EvaluateCommand {
    #[clap(short, long)]
    training_file: PathBuf,

    #[clap(long, default_value_t = 0.2)]
    holdout_fraction: f64,

    #[clap(long, default_value_t = 42)]
    seed: u64,

    #[clap(long)]
    strict_adamic_adar: bool,
}

fn setup_logging() -> anyhow::Result<()> {
    let spec = flexi_logger::LogSpecification::parse("warn,link_predictor=debug")?;
    flexi_logger::Logger::with(spec)
        .log_to_file(
            flexi_logger::FileSpec::default()
                .directory("logs")
                .basename("link-predictor")
                .use_timestamp(false),
        )
        .duplicate_to_stdout(flexi_logger::Duplicate::Info)
        .format_for_files(flexi_logger::detailed_format)
        .format_for_stdout(flexi_logger::colored_detailed_format)
        .set_palette("b1;3;2;4;6".to_string())
        .start()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    setup_logging()?;
    log::info!("Starting link predictor!");

    let cli = Cli::parse();

    match cli.command {
        Command::Predict(predict) => {
            commands::predict::predict_links(
                predict.training_file,
                predict.inference_file,
                predict.output_file,
                predict.holdout_fraction,
                predict.seed,
                predict.strict_adamic_adar,
                predict.dump_features,
            )?;
        }
        Command::Evaluate(evaluate) => {
            commands::evaluate::evaluate(
                evaluate.training_file,
                evaluate.holdout_fraction,
                evaluate.seed,
                evaluate.strict_adamic_adar,
            )?;
        }
    }

    Ok(())
}
