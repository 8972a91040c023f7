//! Layering guardrails for the workspace crates.
//!
//! `bdl_core` is pure vocabulary and `bdl_syntax` is a single-file, single-threaded front end. Multi-file programs,
//! parallel loading and shared maps belong to the `bdl` crate. These tests scan the sub-crate manifests and fail if a
//! lower layer picks up an upper layer or a concurrency dependency in `[dependencies]`.

fn dependency_names(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn syntax_crate_stays_single_threaded() {
    let names = dependency_names(include_str!("../crates/bdl_syntax/Cargo.toml"));
    assert!(names.iter().any(|n| n == "bdl_core"), "bdl_syntax should depend on bdl_core, got {names:?}");
    for forbidden in ["rayon", "dashmap", "bdl"] {
        assert!(
            !names.iter().any(|n| n == forbidden),
            "`{forbidden}` must not appear in bdl_syntax [dependencies]"
        );
    }
}

#[test]
fn core_crate_has_no_workspace_dependencies() {
    let names = dependency_names(include_str!("../crates/bdl_core/Cargo.toml"));
    for forbidden in ["bdl_syntax", "bdl", "miette", "rayon"] {
        assert!(
            !names.iter().any(|n| n == forbidden),
            "`{forbidden}` must not appear in bdl_core [dependencies]"
        );
    }
}
