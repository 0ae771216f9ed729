//! End-to-end runs against shell-script stand-ins for the GLSL compilers.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use shader_pipeline::locator::locate;
use shader_pipeline::{
    CompileError, Compiler, CompilerKind, HeaderError, PipelineConfig, ShaderFailure, ToolError,
};
use tempfile::{TempDir, tempdir};

/// Copies its input, rejecting sources that contain "syntax error".
const FAKE_GLSLC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "fake glslc"; exit 0; fi
if grep -q "syntax error" "$1"; then
    echo "$1:1: error: syntax error, unexpected IDENTIFIER" >&2
    exit 1
fi
cp "$1" "$3"
"#;

/// Writes its own argument list into the output file.
const FAKE_GLSLANG: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then echo "fake glslangValidator"; exit 0; fi
printf '%s ' "$@" > "$4"
"#;

const SLOW_GLSLC: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then exit 0; fi
exec sleep 5
"#;

/// Never answers the version query in time.
const HANGING_PROBE: &str = r#"#!/bin/sh
exec sleep 5
"#;

struct FakeCompilers {
    glslc: PathBuf,
    glslang: PathBuf,
    slow: PathBuf,
    hanging: PathBuf,
}

/// Scripts are written once, before any test spawns a process, so no
/// executable is still open for writing when another test forks.
fn fakes() -> &'static FakeCompilers {
    static FAKES: OnceLock<FakeCompilers> = OnceLock::new();
    FAKES.get_or_init(|| {
        let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("fake-compilers");
        fs::create_dir_all(&dir).unwrap();

        let write = |name: &str, script: &str| {
            let path = dir.join(name);
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        };

        FakeCompilers {
            glslc: write("glslc", FAKE_GLSLC),
            glslang: write("glslangValidator", FAKE_GLSLANG),
            slow: write("slow-glslc", SLOW_GLSLC),
            hanging: write("hanging-glslc", HANGING_PROBE),
        }
    })
}

fn workspace(shaders: &[(&str, &[u8])]) -> (TempDir, PipelineConfig) {
    let dir = tempdir().unwrap();
    let shader_dir = dir.path().join("shaders");
    fs::create_dir(&shader_dir).unwrap();
    for (name, source) in shaders {
        fs::write(shader_dir.join(name), source).unwrap();
    }

    let config = PipelineConfig {
        shader_dir,
        output_dir: dir.path().join("bin"),
        header_dir: dir.path().join("include/shader"),
        compilers: vec![Compiler::with_program(CompilerKind::Glslc, &fakes().glslc)],
        ..PipelineConfig::default()
    };
    (dir, config)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn triangle_is_compiled_and_embedded() {
    let (_dir, config) = workspace(&[("triangle.vert", b"#version 450")]);

    let report = shader_pipeline::run(&config).unwrap();
    assert!(report.is_clean());

    let artifact = &report.compiled[0];
    assert_eq!(artifact.path, config.output_dir.join("triangle_vert.spv"));
    assert_eq!(artifact.size, 12);

    assert_eq!(report.headers, [config.header_dir.join("triangle_vert_spv.c")]);
    let text = fs::read_to_string(&report.headers[0]).unwrap();
    assert!(text.starts_with("// Auto-generated from triangle_vert.spv\n"));
    assert!(text.contains("#ifndef TRIANGLE_VERT_SPV_H"));
    // "#ver" "sion" " 450"
    assert!(text.contains("const uint32_t triangle_vert_spv[] = {\n    0x72657623, 0x6e6f6973, 0x30353420,\n};"));
    assert!(text.contains("const uint32_t triangle_vert_spv_size = 3;"));
    assert!(text.ends_with("#endif // TRIANGLE_VERT_SPV_H"));
}

#[test]
fn one_bad_shader_does_not_stop_the_batch() {
    let (_dir, config) = workspace(&[
        ("a.vert", b"#version 450\nvoid main() {}\n"),
        ("b.frag", b"#version 450\nsyntax error here\n"),
        ("c.comp", b"#version 450\nvoid main() {}\n"),
    ]);

    let report = shader_pipeline::run(&config).unwrap();

    assert_eq!(report.shaders.len(), 3);
    assert_eq!(report.compiled.len(), 2);
    assert_eq!(report.headers.len(), 2);
    assert_eq!(file_names(&config.output_dir), ["a_vert.spv", "c_comp.spv"]);
    assert_eq!(file_names(&config.header_dir), ["a_vert_spv.c", "c_comp_spv.c"]);

    match &report.failures[..] {
        [ShaderFailure::Compile { shader, source }] => {
            assert_eq!(shader.file_name(), "b.frag");
            let CompileError::Failed { status, diagnostic } = source else {
                panic!("unexpected failure: {source}");
            };
            assert_eq!(status.code(), Some(1));
            assert!(diagnostic.contains("syntax error"), "{diagnostic}");
            assert!(diagnostic.chars().count() <= 100);
        }
        other => panic!("unexpected failures: {other:?}"),
    }
}

#[test]
fn glslang_validator_gets_stage_only_for_staged_extensions() {
    let (_dir, mut config) = workspace(&[("a.frag", b"x"), ("common.glsl", b"x")]);
    config.compilers = vec![Compiler::with_program(
        CompilerKind::GlslangValidator,
        &fakes().glslang,
    )];

    let report = shader_pipeline::run(&config).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.compiler.kind, CompilerKind::GlslangValidator);

    let frag = fs::read_to_string(config.output_dir.join("a_frag.spv")).unwrap();
    assert!(frag.starts_with("-V "), "{frag}");
    assert!(frag.ends_with("-S frag "), "{frag}");

    let generic = fs::read_to_string(config.output_dir.join("common_glsl.spv")).unwrap();
    assert!(!generic.contains("-S"), "{generic}");
}

#[test]
fn preferred_compiler_is_used_when_both_are_present() {
    let (_dir, mut config) = workspace(&[("a.vert", b"#version 450")]);
    config.compilers = vec![
        Compiler::with_program(CompilerKind::Glslc, &fakes().glslc),
        Compiler::with_program(CompilerKind::GlslangValidator, &fakes().glslang),
    ];

    let report = shader_pipeline::run(&config).unwrap();
    assert_eq!(report.compiler.kind, CompilerKind::Glslc);
    assert_eq!(fs::read(&report.compiled[0].path).unwrap(), b"#version 450");
}

#[test]
fn compile_timeout_is_a_per_shader_failure() {
    let (_dir, mut config) = workspace(&[("a.vert", b"x")]);
    config.compilers = vec![Compiler::with_program(CompilerKind::Glslc, &fakes().slow)];
    config.compile_timeout = Duration::from_millis(200);

    let report = shader_pipeline::run(&config).unwrap();

    assert!(report.compiled.is_empty());
    assert!(report.headers.is_empty());
    assert!(matches!(
        &report.failures[..],
        [ShaderFailure::Compile {
            source: CompileError::Tool(ToolError::Timeout { .. }),
            ..
        }]
    ));
}

#[test]
fn header_failure_keeps_compiled_artifacts() {
    let (dir, mut config) = workspace(&[("a.vert", b"#version 450")]);
    // A regular file where the header directory should be.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    config.header_dir = blocker.join("shader");

    let report = shader_pipeline::run(&config).unwrap();

    assert_eq!(report.compiled.len(), 1);
    assert!(report.compiled[0].path.is_file());
    assert!(report.headers.is_empty());
    assert!(matches!(
        &report.failures[..],
        [ShaderFailure::Header {
            source: HeaderError::CreateDir { .. },
            ..
        }]
    ));
}

#[test]
fn candidate_hanging_on_version_query_is_skipped() {
    let candidates = [
        Compiler::with_program(CompilerKind::Glslc, &fakes().hanging),
        Compiler::with_program(CompilerKind::GlslangValidator, "true"),
    ];

    let started = Instant::now();
    let found = locate(&candidates, Duration::from_millis(100)).unwrap();
    assert_eq!(found.kind, CompilerKind::GlslangValidator);
    assert_eq!(found.program.to_str(), Some("true"));
    assert!(started.elapsed() < Duration::from_secs(4));
}
