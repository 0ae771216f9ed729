//! Compiles GLSL shaders to SPIR-V with an external compiler and embeds the
//! binaries into generated C sources.

pub mod compile;
pub mod config;
pub mod discover;
pub mod header;
pub mod locator;
pub mod log;
pub mod pipeline;
pub mod process;
pub mod stage;

pub use compile::{CompileError, CompiledArtifact};
pub use config::PipelineConfig;
pub use header::HeaderError;
pub use locator::{Compiler, CompilerKind};
pub use pipeline::{RunReport, SetupError, ShaderFailure, run};
pub use process::ToolError;
pub use stage::{ShaderFile, ShaderStage};
