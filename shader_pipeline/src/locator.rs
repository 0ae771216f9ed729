use std::ffi::OsString;
use std::fmt;
use std::process::Command;
use std::time::Duration;

use crate::log;
use crate::process::run_with_timeout;

/// The two supported GLSL compiler families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerKind {
    /// `glslc` from shaderc: `glslc <input> -o <output>`
    Glslc,
    /// `glslangValidator`: `glslangValidator -V <input> -o <output> [-S <stage>]`
    GlslangValidator,
}

impl CompilerKind {
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::Glslc => "glslc",
            Self::GlslangValidator => "glslangValidator",
        }
    }
}

/// A compiler family together with the program used to invoke it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub program: OsString,
}

impl Compiler {
    /// Invokes the family's binary through `PATH`.
    pub fn new(kind: CompilerKind) -> Self {
        Self {
            kind,
            program: kind.binary_name().into(),
        }
    }

    pub fn with_program(kind: CompilerKind, program: impl Into<OsString>) -> Self {
        Self {
            kind,
            program: program.into(),
        }
    }

    /// Default candidates, most preferred first.
    pub fn candidates() -> Vec<Self> {
        vec![
            Self::new(CompilerKind::Glslc),
            Self::new(CompilerKind::GlslangValidator),
        ]
    }

    pub fn command(&self) -> Command {
        Command::new(&self.program)
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())
    }
}

/// Returns the first candidate that answers `--version` within `timeout`.
///
/// The exit code of the probe is ignored; only a failure to launch or a
/// timeout rejects a candidate.
pub fn locate(candidates: &[Compiler], timeout: Duration) -> Option<Compiler> {
    for candidate in candidates {
        let mut cmd = candidate.command();
        cmd.arg("--version");

        match run_with_timeout(cmd, timeout) {
            Ok(_) => {
                log::info!("Compiler: {candidate}");
                return Some(candidate.clone());
            }
            Err(err) => log::debug!("rejected compiler candidate: {err}"),
        }
    }

    None
}
