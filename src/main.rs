use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use automutate::{
    AutoMutator, MutationsApplier, QueuedWaveProducer, RunRequest, RunResponse, Settings,
    TracingObserver, TransformerRegistry,
};
use clap::Parser;
use tracing::{error, info};

/// Applies waves of positional text mutations to files
#[derive(Parser, Debug)]
#[command(name = "automutate")]
#[command(version = "0.1.0")]
#[command(about = "Apply waves of range-addressed file mutations", long_about = None)]
struct Args {
    /// JSON file containing the waves to run (omit to read from stdin)
    #[arg(short, long)]
    waves: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory file names are resolved against
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Maximum files of one wave processed at once
    #[arg(long)]
    max_concurrent_files: Option<usize>,

    /// Output structured JSON instead of human-readable
    #[arg(short, long)]
    json: bool,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Read the run request from file path or stdin
fn read_run_request(path: Option<&PathBuf>) -> Result<RunRequest, Box<dyn std::error::Error>> {
    let json_str = if let Some(p) = path {
        fs::read_to_string(p)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    Ok(serde_json::from_str(&json_str)?)
}

fn resolve_settings(args: &Args) -> automutate::Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(root) = &args.root {
        settings.root = Some(root.clone());
    }
    if args.max_concurrent_files.is_some() {
        settings.max_concurrent_files = args.max_concurrent_files;
    }
    settings.validate()?;
    Ok(settings)
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let settings = match resolve_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing("info");
            let response = RunResponse::failure("none".to_string(), e.to_string());
            output_response(&response, args.json, args.output.as_ref());
            std::process::exit(1);
        }
    };
    init_tracing(&settings.log_filter);

    let request = match read_run_request(args.waves.as_ref()) {
        Ok(request) => request,
        Err(e) => {
            let response =
                RunResponse::failure("none".to_string(), format!("Error reading waves: {}", e));
            output_response(&response, args.json, args.output.as_ref());
            std::process::exit(1);
        }
    };

    let execution_id = request.resolve_execution_id();
    info!(
        execution_id = %execution_id,
        waves = request.waves.len(),
        root = ?settings.root,
        "Starting mutation run"
    );

    let store = Arc::new(settings.store());
    let applier = MutationsApplier::new(store, TransformerRegistry::with_builtins())
        .with_max_concurrent_files(settings.max_concurrent_files);
    let mut mutator = AutoMutator::new(QueuedWaveProducer::new(request.waves), applier)
        .with_observer(TracingObserver);

    let response = match mutator.run().await {
        Ok(report) => RunResponse::success(execution_id, &report),
        Err(e) => {
            error!(execution_id = %execution_id, "Run failed: {e}");
            RunResponse::failure(execution_id, e.to_string())
        }
    };

    output_response(&response, args.json, args.output.as_ref());

    if !response.success {
        std::process::exit(1);
    }
}

/// Format and output the response
fn output_response(response: &RunResponse, json_mode: bool, output_path: Option<&PathBuf>) {
    let output = if json_mode {
        serde_json::to_string_pretty(response)
            .unwrap_or_else(|_| r#"{"error": "Failed to serialize response"}"#.to_string())
    } else if response.success {
        format!(
            "Applied {} mutation(s) across {} wave(s)\nFiles written: {}\nSkipped: {}\nDropped: {}",
            response.applied_count,
            response.waves_applied,
            response.files_written,
            response.skipped_count,
            response.dropped_count
        )
    } else {
        format!("Error: {}", response.error.as_deref().unwrap_or("Unknown error"))
    };

    if let Some(path) = output_path {
        if let Err(e) = fs::write(path, &output) {
            eprintln!("Failed to write output to '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    } else {
        println!("{}", output);
    }
}
