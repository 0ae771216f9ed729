use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use shader_pipeline::config::{DEFAULT_HEADER_DIR, DEFAULT_OUTPUT_DIR};
use shader_pipeline::{PipelineConfig, log};

/// Compile GLSL shaders to SPIR-V and generate C sources embedding them.
#[derive(Parser, Debug)]
#[command(version)]
struct Options {
    /// Directory containing the GLSL sources (not searched recursively)
    #[arg(long, default_value = ".")]
    shader_dir: PathBuf,
    /// Directory receiving the compiled `.spv` files
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,
    /// Directory receiving the generated `.c` files
    #[arg(long, default_value = DEFAULT_HEADER_DIR)]
    header_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let options = Options::parse();

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error_details(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(options: Options) -> Result<()> {
    let config = PipelineConfig {
        shader_dir: options.shader_dir,
        output_dir: options.output_dir,
        header_dir: options.header_dir,
        ..PipelineConfig::default()
    };

    let report = shader_pipeline::run(&config).context("Shader build aborted")?;

    // Individual shader failures were already logged as they happened.
    if !report.is_clean() {
        log::warn!("{} shader(s) had errors", report.failures.len());
    }

    Ok(())
}
