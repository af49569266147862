use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trap_activity_tracker::services::{ActivityError, ActivityService};

#[derive(Parser)]
#[command(name = "trap-activity-tracker")]
#[command(about = "Aggregate camera-trap activity sheets into per-season active-day counts", long_about = None)]
struct Cli {
    /// Season definition file
    #[arg(long, env = "SEASONS_FILE", default_value = "seasons.json")]
    seasons: PathBuf,

    /// Where to write the report
    #[arg(short, long, env = "REPORT_FILE", default_value = "trap_activity.csv")]
    output: PathBuf,

    /// Trap activity workbooks (xlsx), merged in the given order
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,trap_activity_tracker=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ActivityError> {
    let mut service = ActivityService::from_config_file(&cli.seasons)?;

    let pb = ProgressBar::new(cli.files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    for file in &cli.files {
        pb.set_message(file.display().to_string());
        service.load_file(file).map_err(ActivityError::from)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    service.finish_loading();
    let summary = service.aggregate();
    service.write_report(&cli.output, &summary)?;

    info!(
        "Processed {} traps from {} files, report saved to {}",
        service.store().len(),
        cli.files.len(),
        cli.output.display()
    );
    Ok(())
}
