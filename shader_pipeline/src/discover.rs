use std::fs;
use std::path::Path;

use crate::pipeline::SetupError;
use crate::stage::ShaderFile;

/// Lists the shader sources placed directly inside `dir`, sorted by file
/// name.
///
/// Subdirectories are not descended into. A missing directory, an
/// unreadable one, or one with no recognised sources is a setup error.
pub fn discover(dir: &Path) -> Result<Vec<ShaderFile>, SetupError> {
    if !dir.is_dir() {
        return Err(SetupError::ShaderDirMissing(dir.to_path_buf()));
    }

    let read_error = |source| SetupError::ReadShaderDir {
        dir: dir.to_path_buf(),
        source,
    };

    let mut shaders = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(shader) = ShaderFile::new(path) {
            shaders.push(shader);
        }
    }

    if shaders.is_empty() {
        return Err(SetupError::NoShaders(dir.to_path_buf()));
    }

    shaders.sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));
    Ok(shaders)
}
