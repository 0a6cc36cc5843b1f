use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use treetype_config::Config;
use treetype_engine::batch::{BatchJob, FileResult, default_jobs, run_batch};

mod inputs;

use inputs::resolve_inputs;

#[derive(Parser)]
#[command(name = "treetype")]
#[command(about = "Encode source files into line-by-line typing practice snippets")]
#[command(version)]
struct Cli {
    /// Files, directories (searched recursively), or glob patterns like "src/**/*.py"
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output path for the encoded document (only with a single input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Run the round-trip verifier before writing each document
    #[arg(long)]
    verify: bool,

    /// Path to the config file (default ~/.config/treetype/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads for batch mode (default: available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = Config::load_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "Failed to load config from {}",
            cli.config
                .clone()
                .unwrap_or_else(Config::config_path)
                .display()
        )
    })?;
    log::debug!("using {config:?}");

    let files = resolve_inputs(&cli.inputs)?;
    if files.is_empty() {
        bail!("No input files found");
    }
    if cli.output.is_some() && files.len() > 1 {
        bail!(
            "--output needs exactly one input, but {} files were given",
            files.len()
        );
    }

    let batch: Vec<BatchJob> = files
        .into_iter()
        .map(|input| BatchJob {
            input,
            output: cli.output.clone(),
        })
        .collect();

    let options = config.process_options(cli.verify);
    let jobs = cli.jobs.unwrap_or_else(default_jobs);
    let results = run_batch(&batch, &options, jobs);

    let failed = report(&results, cli.quiet);
    if failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints one line per file and a summary. Returns the number of failures.
fn report(results: &[FileResult], quiet: bool) -> usize {
    let mut failed = 0;
    for result in results {
        match result {
            Ok(file) => {
                if !quiet {
                    println!(
                        "✓ {} → {} ({} lines, {} chars)",
                        file.input.display(),
                        file.output.display(),
                        file.total_lines,
                        file.typeable_chars
                    );
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("✗ {e}");
            }
        }
    }

    if !quiet && results.len() > 1 {
        println!(
            "Encoded {} of {} files",
            results.len() - failed,
            results.len()
        );
    }
    failed
}
