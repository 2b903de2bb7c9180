use anyhow::{Context, Result};
use bandwatch::{
    bands::Bands,
    cli::{Cli, OutputFormat},
    hyperparams::Hyperparameters,
    report,
    run::{AnalyzerConfig, NoProgress, ProgressObserver, RunAnalyzer},
};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints `[ 42%] Processing <file>` lines to stderr
struct StderrProgress;

impl ProgressObserver for StderrProgress {
    fn on_progress(&mut self, fraction: f64, label: &str) {
        eprintln!("[{:>3.0}%] Processing {}", fraction * 100.0, label);
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let bands = Bands::from_toml(&args.bands)?;
    let params = Hyperparameters {
        outlier_tolerance: args.outlier_tolerance,
        grouping_time_window: Duration::from_secs(args.grouping_window),
        anomaly_threshold: args.anomaly_threshold,
        selected_variable: args.variable.clone(),
        bands,
    };

    let config = AnalyzerConfig::new()
        .with_cache_root(&args.cache_dir)
        .with_file_marker(&args.marker)
        .with_default_mode(args.mode.into());
    let analyzer = RunAnalyzer::new(config);

    let window = args.window();
    let mut progress: Box<dyn ProgressObserver> = if args.no_progress {
        Box::new(NoProgress)
    } else {
        Box::new(StderrProgress)
    };

    let result = analyzer
        .process_htol_run(&args.run_dir, &params, window.as_ref(), progress.as_mut())
        .with_context(|| format!("failed to analyze run {}", args.run_dir.display()))?;

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&result)),
        OutputFormat::Json => println!("{}", report::render_json(&result)?),
    }

    Ok(())
}
