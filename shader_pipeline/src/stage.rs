use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

const GENERIC_EXTENSION: &str = "glsl";

/// Pipeline role of a shader, inferred from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
    Geometry,
}

impl ShaderStage {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "vert" => Some(Self::Vertex),
            "frag" => Some(Self::Fragment),
            "comp" => Some(Self::Compute),
            "geom" => Some(Self::Geometry),
            _ => None,
        }
    }

    /// Stage name accepted by `glslangValidator -S`.
    pub fn glslang_name(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Fragment => "frag",
            Self::Compute => "comp",
            Self::Geometry => "geom",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
            Self::Geometry => "geometry",
        };
        f.write_str(name)
    }
}

/// True for `.vert`, `.frag`, `.comp`, `.geom` and `.glsl`, in any case.
pub fn is_shader_extension(ext: &str) -> bool {
    ShaderStage::from_extension(ext).is_some() || ext.eq_ignore_ascii_case(GENERIC_EXTENSION)
}

/// A shader source file with a recognised extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFile {
    path: PathBuf,
    stage: Option<ShaderStage>,
}

impl ShaderFile {
    /// Returns `None` when the path has no recognised shader extension.
    pub fn new(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let ext = path.extension().and_then(OsStr::to_str)?;
        if !is_shader_extension(ext) {
            return None;
        }

        let stage = ShaderStage::from_extension(ext);
        Some(Self { path, stage })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` for generic `.glsl` sources.
    pub fn stage(&self) -> Option<ShaderStage> {
        self.stage
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension without the dot, in its original case.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
