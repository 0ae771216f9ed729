use std::path::PathBuf;
use std::time::Duration;

use crate::locator::Compiler;

pub const DEFAULT_OUTPUT_DIR: &str = "bin";
pub const DEFAULT_HEADER_DIR: &str = "../../evk/include/shader";

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for shader sources.
    /// Defaults to the working directory.
    pub shader_dir: PathBuf,
    /// Where `.spv` binaries are written. Defaults to `bin`.
    pub output_dir: PathBuf,
    /// Where generated `.c` sources are written.
    /// Defaults to `../../evk/include/shader`.
    pub header_dir: PathBuf,
    /// Limit for the `--version` probe of each compiler candidate.
    pub probe_timeout: Duration,
    /// Limit for a single shader compilation.
    pub compile_timeout: Duration,
    /// Compiler candidates in preference order.
    pub compilers: Vec<Compiler>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            header_dir: PathBuf::from(DEFAULT_HEADER_DIR),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            compilers: Compiler::candidates(),
        }
    }
}
