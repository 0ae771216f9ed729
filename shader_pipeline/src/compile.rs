use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Duration;

use thiserror::Error;

use crate::locator::{Compiler, CompilerKind};
use crate::log;
use crate::process::{ToolError, run_with_timeout};
use crate::stage::ShaderFile;

/// Characters of compiler diagnostics surfaced per failure.
const DIAGNOSTIC_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum CompileError {
    /// The compiler could not be run to completion (not found, failed to
    /// launch, timed out).
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// The compiler ran but rejected the shader. `diagnostic` holds the
    /// start of its error stream.
    #[error("{diagnostic}... ({status})")]
    Failed {
        status: ExitStatus,
        diagnostic: String,
    },
    #[error("failed to create output directory {}: {source}", .dir.display())]
    CreateOutputDir { dir: PathBuf, source: io::Error },
    #[error("failed to read compiled artifact {}: {source}", .path.display())]
    ReadArtifact { path: PathBuf, source: io::Error },
}

fn excerpt(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_EXCERPT_CHARS).collect()
}

/// SPIR-V binary produced for one shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub source: ShaderFile,
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// `<output_dir>/<stem>_<ext>.spv`
pub fn artifact_path(shader: &ShaderFile, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}_{}.spv", shader.stem(), shader.extension()))
}

pub fn build_command(compiler: &Compiler, shader: &ShaderFile, output: &Path) -> Command {
    let mut cmd = compiler.command();

    match compiler.kind {
        CompilerKind::Glslc => {
            cmd.arg(shader.path()).arg("-o").arg(output);
        }
        CompilerKind::GlslangValidator => {
            cmd.arg("-V").arg(shader.path()).arg("-o").arg(output);
            if let Some(stage) = shader.stage() {
                cmd.arg("-S").arg(stage.glslang_name());
            }
        }
    }

    cmd
}

/// Compiles one shader into `output_dir`, creating the directory if needed.
pub fn compile(
    compiler: &Compiler,
    shader: &ShaderFile,
    output_dir: &Path,
    timeout: Duration,
) -> Result<CompiledArtifact, CompileError> {
    let output = artifact_path(shader, output_dir);
    let output_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let progress = format!("  {} -> {output_name}", shader.file_name());

    let result = run(compiler, shader, output_dir, &output, timeout);
    match &result {
        Ok(artifact) => log::info!("{progress} [SUCCESS] ({} bytes)", artifact.size),
        Err(err) => log::warn!("{progress} [FAILURE]: {err}"),
    }

    result
}

fn run(
    compiler: &Compiler,
    shader: &ShaderFile,
    output_dir: &Path,
    output: &Path,
    timeout: Duration,
) -> Result<CompiledArtifact, CompileError> {
    fs::create_dir_all(output_dir).map_err(|source| CompileError::CreateOutputDir {
        dir: output_dir.to_path_buf(),
        source,
    })?;

    let result = run_with_timeout(build_command(compiler, shader, output), timeout)?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        log::debug!("{compiler} stderr:\n{stderr}");
        return Err(CompileError::Failed {
            status: result.status,
            diagnostic: excerpt(stderr.trim_end()),
        });
    }

    let size = fs::metadata(output)
        .map_err(|source| CompileError::ReadArtifact {
            path: output.to_path_buf(),
            source,
        })?
        .len();

    Ok(CompiledArtifact {
        source: shader.clone(),
        path: output.to_path_buf(),
        size,
    })
}
