use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use d2::D2Error;
use d2_cli::{Args, Emit, run};

/// Collects all .d2 files from a directory
fn collect_d2_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("d2"))
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn args(input: &Path, emit: Emit, output: &Path, config: Option<&Path>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        emit,
        output: Some(output.to_string_lossy().to_string()),
        config: config.map(|path| path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

/// Config that leaves every check on, so a local or user config cannot
/// change the outcome.
fn default_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "[validate]\nstyles = true\nshapes = true\n").expect("write config");
    path
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = default_config(temp_dir.path());

    let valid_fixtures = collect_d2_files(fixtures().join("valid"));
    assert!(
        !valid_fixtures.is_empty(),
        "No valid fixtures found in tests/fixtures/valid/"
    );

    let mut failed = Vec::new();

    for fixture in &valid_fixtures {
        for emit in [Emit::Tree, Emit::Diagnostics, Emit::Outline] {
            let output = temp_dir.path().join(format!(
                "{}.{emit:?}.txt",
                fixture.file_stem().unwrap().to_string_lossy()
            ));

            if let Err(e) = run(&args(fixture, emit, &output, Some(&config))) {
                failed.push((fixture.clone(), e));
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nValid fixtures that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid fixture run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = default_config(temp_dir.path());

    let error_fixtures = collect_d2_files(fixtures().join("errors"));
    assert!(
        !error_fixtures.is_empty(),
        "No error fixtures found in tests/fixtures/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for fixture in &error_fixtures {
        let output = temp_dir.path().join(format!(
            "error_{}.txt",
            fixture.file_stem().unwrap().to_string_lossy()
        ));

        match run(&args(fixture, Emit::Diagnostics, &output, Some(&config))) {
            Err(D2Error::Parse { err, .. }) => {
                // The diagnostics view is written before the run fails.
                let written = fs::read_to_string(&output).expect("output written");
                assert_eq!(written.lines().count(), err.diagnostics().len());
            }
            Err(other) => panic!("{}: unexpected error {other}", fixture.display()),
            Ok(()) => unexpectedly_succeeded.push(fixture.clone()),
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError fixtures that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error fixture(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_outline_output() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("outline.txt");
    let input = fixtures().join("valid").join("containers.d2");

    run(&args(&input, Emit::Outline, &output, None)).expect("containers.d2 is valid");

    let outline = fs::read_to_string(&output).expect("output written");
    assert!(outline.starts_with("shapes:\n  cloud: AWS\n"), "{outline}");
    assert!(outline.contains("  cloud.db: Postgres [cylinder]\n"), "{outline}");
    assert!(outline.contains("  cloud.lb -> cloud.api: queries\n"), "{outline}");
    assert!(outline.contains("  users -> cloud.lb: HTTPS\n"), "{outline}");
}

#[test]
fn e2e_tree_output_is_lossless() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("tree.txt");
    let input = fixtures().join("errors").join("unclosed_block.d2");

    assert!(run(&args(&input, Emit::Tree, &output, None)).is_err());

    let source = fs::read_to_string(&input).expect("read fixture");
    let tree = fs::read_to_string(&output).expect("output written");
    assert!(tree.starts_with(&format!("Document@0..{}\n", source.len())), "{tree}");
}

#[test]
fn e2e_config_disables_style_checks() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[validate]\nstyles = false\n").expect("write config");
    let output = temp_dir.path().join("out.txt");
    let input = fixtures().join("errors").join("invalid_style.d2");

    assert!(run(&args(&input, Emit::Diagnostics, &output, Some(&config))).is_ok());
    assert_eq!(fs::read_to_string(&output).expect("output written"), "");
}

#[test]
fn e2e_missing_input() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("absent.d2");
    let output = temp_dir.path().join("out.txt");

    let err = run(&args(&input, Emit::Tree, &output, None)).unwrap_err();
    assert!(matches!(err, D2Error::Io(_)));
}
