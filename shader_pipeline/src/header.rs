//! Embeds SPIR-V binaries into C sources as `uint32_t` arrays.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::log;

const WORDS_PER_LINE: usize = 8;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to create header directory {}: {source}", .dir.display())]
    CreateDir { dir: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Reinterprets `bytes` as little-endian words, zero-padding a trailing
/// partial word.
pub fn to_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect()
}

/// Array name used for an artifact: `<artifact stem>_spv`.
pub fn variable_name(artifact: &Path) -> String {
    let stem = artifact
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    format!("{stem}_spv")
}

/// Renders the C source for `words`. The output is a pure function of its
/// arguments and has no trailing newline.
pub fn render_header(source_name: &str, var_name: &str, words: &[u32]) -> String {
    let guard = format!("{}_H", var_name.to_uppercase());

    let mut lines = vec![
        format!("// Auto-generated from {source_name}"),
        format!("#ifndef {guard}"),
        format!("#define {guard}\n"),
        "#include <stdint.h>\n".to_string(),
        format!("const uint32_t {var_name}[] = {{"),
    ];

    lines.extend(words.chunks(WORDS_PER_LINE).map(|line| {
        let values = line
            .iter()
            .map(|word| format!("0x{word:08x}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("    {values},")
    }));

    lines.push("};".to_string());
    lines.push(format!("const uint32_t {var_name}_size = {};", words.len()));
    lines.push(format!("#endif // {guard}"));

    lines.join("\n")
}

/// Writes `<header_dir>/<artifact stem>_spv.c` for a compiled artifact and
/// returns its path.
pub fn generate_header(artifact: &Path, header_dir: &Path) -> Result<PathBuf, HeaderError> {
    let result = write_header(artifact, header_dir);
    match &result {
        Ok(path) => log::info!(
            "    Header: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        Err(err) => log::warn!("    Header generation failed: {err}"),
    }
    result
}

fn write_header(artifact: &Path, header_dir: &Path) -> Result<PathBuf, HeaderError> {
    let bytes = fs::read(artifact).map_err(|source| HeaderError::Read {
        path: artifact.to_path_buf(),
        source,
    })?;

    let var_name = variable_name(artifact);
    let source_name = artifact
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let text = render_header(&source_name, &var_name, &to_words(&bytes));

    fs::create_dir_all(header_dir).map_err(|source| HeaderError::CreateDir {
        dir: header_dir.to_path_buf(),
        source,
    })?;

    let path = header_dir.join(format!("{var_name}.c"));
    fs::write(&path, text).map_err(|source| HeaderError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
