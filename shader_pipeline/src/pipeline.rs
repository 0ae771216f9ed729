//! Runs discovery, compiler lookup, compilation and header generation in
//! sequence.
//!
//! Failures fall into two classes. A [`SetupError`] is fatal: nothing useful
//! can be produced, so the run stops and the caller is expected to exit
//! non-zero. A [`ShaderFailure`] only affects one shader: it is logged,
//! recorded in the [`RunReport`], and the batch carries on. Outputs written
//! before or after a per-shader failure are kept.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compile::{self, CompileError, CompiledArtifact};
use crate::config::PipelineConfig;
use crate::discover::discover;
use crate::header::{self, HeaderError};
use crate::locator::{self, Compiler};
use crate::log;
use crate::stage::ShaderFile;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("shader directory '{}' not found", .0.display())]
    ShaderDirMissing(PathBuf),
    #[error("failed to read shader directory '{}': {source}", .dir.display())]
    ReadShaderDir { dir: PathBuf, source: io::Error },
    #[error("no shader files found in '{}'", .0.display())]
    NoShaders(PathBuf),
    #[error("no GLSL compiler found (tried {tried}); install the Vulkan SDK or glslang")]
    NoCompiler { tried: String },
}

#[derive(Debug, Error)]
pub enum ShaderFailure {
    #[error("{}: {source}", .shader.file_name())]
    Compile {
        shader: ShaderFile,
        source: CompileError,
    },
    #[error("{}: {source}", .artifact.display())]
    Header {
        artifact: PathBuf,
        source: HeaderError,
    },
}

/// Outcome of a run that got past setup.
#[derive(Debug)]
pub struct RunReport {
    pub compiler: Compiler,
    pub shaders: Vec<ShaderFile>,
    pub compiled: Vec<CompiledArtifact>,
    pub headers: Vec<PathBuf>,
    pub failures: Vec<ShaderFailure>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn run(config: &PipelineConfig) -> Result<RunReport, SetupError> {
    let shaders = discover(&config.shader_dir)?;

    log::info!("Found {} shader(s):", shaders.len());
    for shader in &shaders {
        match shader.stage() {
            Some(stage) => log::info!("  {} ({stage})", shader.file_name()),
            None => log::info!("  {}", shader.file_name()),
        }
    }

    let compiler = locator::locate(&config.compilers, config.probe_timeout).ok_or_else(|| {
        SetupError::NoCompiler {
            tried: config
                .compilers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }
    })?;

    let mut failures = Vec::new();

    let mut compiled = Vec::new();
    for shader in &shaders {
        match compile::compile(&compiler, shader, &config.output_dir, config.compile_timeout) {
            Ok(artifact) => compiled.push(artifact),
            Err(source) => failures.push(ShaderFailure::Compile {
                shader: shader.clone(),
                source,
            }),
        }
    }

    let mut headers = Vec::new();
    for artifact in &compiled {
        match header::generate_header(&artifact.path, &config.header_dir) {
            Ok(path) => headers.push(path),
            Err(source) => failures.push(ShaderFailure::Header {
                artifact: artifact.path.clone(),
                source,
            }),
        }
    }

    log::info!(
        "Compiled {}/{} shader(s), generated {} header(s)",
        compiled.len(),
        shaders.len(),
        headers.len()
    );

    Ok(RunReport {
        compiler,
        shaders,
        compiled,
        headers,
        failures,
    })
}
