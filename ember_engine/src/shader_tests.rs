use super::*;
use std::collections::HashMap;

fn files(entries: &[(&str, &str)]) -> HashMap<PathBuf, String> {
    entries
        .iter()
        .map(|(path, content)| (PathBuf::from(path), content.to_string()))
        .collect()
}

#[test]
fn test_stage_from_extension() {
    assert_eq!(ShaderStage::from_extension(Path::new("a/b/tri.vert")), Some(ShaderStage::Vertex));
    assert_eq!(ShaderStage::from_extension(Path::new("tri.frag")), Some(ShaderStage::Fragment));
    assert_eq!(ShaderStage::from_extension(Path::new("cull.comp")), Some(ShaderStage::Compute));
    assert_eq!(ShaderStage::from_extension(Path::new("m.mesh")), Some(ShaderStage::Mesh));
    assert_eq!(ShaderStage::from_extension(Path::new("hit.rchit")), Some(ShaderStage::ClosestHit));
    assert_eq!(ShaderStage::from_extension(Path::new("common.glsl")), None);
    assert_eq!(ShaderStage::from_extension(Path::new("noext")), None);
}

#[test]
fn test_stage_is_graphics() {
    assert!(ShaderStage::Vertex.is_graphics());
    assert!(ShaderStage::Mesh.is_graphics());
    assert!(!ShaderStage::Compute.is_graphics());
    assert!(!ShaderStage::RayGeneration.is_graphics());
}

#[test]
fn test_relative_include_prefers_requesting_directory() {
    let fs = files(&[
        ("shaders/lighting/common.glsl", "// local"),
        ("include/common.glsl", "// root"),
    ]);
    let resolver = IncludeResolver::new("include");

    let resolved = resolver
        .resolve_with("common.glsl", IncludeKind::Relative, "shaders/lighting/pbr.frag", 1, |p| {
            fs.get(p).cloned()
        })
        .unwrap();

    assert_eq!(resolved.content, "// local");
    assert_eq!(PathBuf::from(&resolved.name), PathBuf::from("shaders/lighting/common.glsl"));
}

#[test]
fn test_relative_include_falls_back_to_root() {
    let fs = files(&[("include/common.glsl", "// root")]);
    let resolver = IncludeResolver::new("include");

    let resolved = resolver
        .resolve_with("common.glsl", IncludeKind::Relative, "shaders/pbr.frag", 1, |p| {
            fs.get(p).cloned()
        })
        .unwrap();

    assert_eq!(resolved.content, "// root");
}

#[test]
fn test_standard_include_ignores_requesting_directory() {
    let fs = files(&[
        ("shaders/common.glsl", "// local"),
        ("include/common.glsl", "// root"),
    ]);
    let resolver = IncludeResolver::new("include");

    let resolved = resolver
        .resolve_with("common.glsl", IncludeKind::Standard, "shaders/pbr.frag", 1, |p| {
            fs.get(p).cloned()
        })
        .unwrap();

    assert_eq!(resolved.content, "// root");
}

#[test]
fn test_requesting_file_without_directory() {
    let fs = files(&[("include/noise.glsl", "float noise();")]);
    let resolver = IncludeResolver::new("include");

    let resolved = resolver
        .resolve_with("noise.glsl", IncludeKind::Relative, "main.comp", 1, |p| fs.get(p).cloned())
        .unwrap();

    assert_eq!(resolved.content, "float noise();");
}

#[test]
fn test_not_found_lists_searched_paths() {
    let resolver = IncludeResolver::new("include");

    let err = resolver
        .resolve_with("missing.glsl", IncludeKind::Relative, "shaders/a.vert", 1, |_| None)
        .unwrap_err();

    match &err {
        IncludeError::NotFound { requested, searched } => {
            assert_eq!(requested, "missing.glsl");
            assert_eq!(
                searched,
                &vec![
                    PathBuf::from("shaders").join("missing.glsl"),
                    PathBuf::from("include").join("missing.glsl"),
                ]
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("missing.glsl"));
}

#[test]
fn test_depth_limit() {
    let resolver = IncludeResolver::new("include").with_max_depth(4);
    assert_eq!(resolver.max_depth(), 4);

    let ok = resolver.resolve_with("a.glsl", IncludeKind::Standard, "x.frag", 4, |_| {
        Some(String::new())
    });
    assert!(ok.is_ok());

    let err = resolver
        .resolve_with("a.glsl", IncludeKind::Standard, "x.frag", 5, |_| Some(String::new()))
        .unwrap_err();
    assert_eq!(
        err,
        IncludeError::DepthExceeded {
            requested: "a.glsl".to_string(),
            depth: 5,
            max_depth: 4,
        }
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let fs = files(&[("include/a.glsl", "A")]);
    let resolver = IncludeResolver::new("include");
    let read = |p: &Path| fs.get(p).cloned();

    let first = resolver.resolve_with("a.glsl", IncludeKind::Relative, "s/x.frag", 2, read);
    let second = resolver.resolve_with("a.glsl", IncludeKind::Relative, "s/x.frag", 2, read);
    assert_eq!(first, second);
}

#[test]
fn test_resolve_reads_from_disk() {
    let dir = std::env::temp_dir().join(format!("ember_include_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("disk.glsl"), "#define FROM_DISK 1\n").unwrap();

    let resolver = IncludeResolver::new(&dir);
    let resolved = resolver.resolve("disk.glsl", IncludeKind::Standard, "main.frag", 1).unwrap();
    assert_eq!(resolved.content, "#define FROM_DISK 1\n");

    let missing = resolver.resolve("nope.glsl", IncludeKind::Standard, "main.frag", 1);
    assert!(matches!(missing, Err(IncludeError::NotFound { .. })));

    std::fs::remove_dir_all(&dir).unwrap();
}
