//! Integration tests for the scenario runner
//!
//! The non-ignored tests drive the full clean/build/compare path with a
//! stub build tool so they run anywhere. The ignored tests run the real
//! fixture suite and need `grunt` plus `node` with Playwright on PATH;
//! run them with `cargo test --test scenarios -- --ignored`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use test_case::test_case;

use iconfont_harness::build::BuildConfig;
use iconfont_harness::render::RenderConfig;
use iconfont_harness::runner::{HarnessConfig, ScenarioRunner};
use iconfont_harness::scenario::{FontCheck, FontFormat, Scenario, StylesheetCheck};

#[cfg(unix)]
fn write_stub_tool(root: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = root.join("stub-tool.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn harness_config(root: &Path, tool: &Path) -> HarnessConfig {
    HarnessConfig {
        build: BuildConfig {
            program: tool.to_string_lossy().into_owned(),
            task_prefix: "font:".to_string(),
            working_dir: root.to_path_buf(),
            timeout: Duration::from_secs(10),
        },
        render: RenderConfig::default(),
        fixture_root: root.to_path_buf(),
        line_threshold: 3,
        visual_threshold: 0.0,
        output_dir: root.join("test-results"),
    }
}

fn stylesheet_scenario(file: &str) -> Scenario {
    Scenario {
        name: "stylesheet-only".to_string(),
        description: String::new(),
        task: "default".to_string(),
        stylesheets: vec![StylesheetCheck {
            file: file.to_string(),
            threshold: None,
        }],
        fonts: vec![],
        renders: vec![],
    }
}

#[cfg(unix)]
#[tokio::test]
async fn stylesheet_check_passes_within_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(
        root.join("expected_files/font.styl"),
        "icon-eye = \"\\e000\"\nicon-moon = \"\\e001\"\nbody\n  color #000\n",
    )
    .unwrap();

    // Regenerates the stylesheet with different codepoint lines, the
    // kind of volatile difference the threshold exists for
    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\n\
         printf 'icon-eye = \"\\\\e005\"\\nicon-moon = \"\\\\e006\"\\nbody\\n  color #000\\n' > actual_files/font.styl",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner
        .run_scenario(&stylesheet_scenario("font.styl"))
        .await
        .unwrap();

    assert!(result.success, "checks: {:?}", result.checks);
    assert_eq!(result.checks.len(), 1);
    assert!(result.checks[0].passed);
}

#[cfg(unix)]
#[tokio::test]
async fn stylesheet_check_fails_beyond_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(
        root.join("expected_files/font.styl"),
        "one\ntwo\nthree\nfour\nshared\n",
    )
    .unwrap();

    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\nprintf 'shared\\n' > actual_files/font.styl",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner
        .run_scenario(&stylesheet_scenario("font.styl"))
        .await
        .unwrap();

    // 4 missing lines, threshold 3
    assert!(!result.success);
    assert!(!result.checks[0].passed);
    assert!(result.error.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn build_failure_fails_the_scenario_before_any_checks() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let tool = write_stub_tool(root, "echo progress; exit 2");

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner
        .run_scenario(&stylesheet_scenario("font.styl"))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.checks.is_empty());
    assert!(result.error.as_deref().unwrap_or("").contains("exited"));
}

#[cfg(unix)]
#[tokio::test]
async fn stderr_output_fails_the_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\ntouch actual_files/font.styl\necho 'Warning: deprecated option' >&2",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner
        .run_scenario(&stylesheet_scenario("font.styl"))
        .await
        .unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or("").contains("stderr"));
}

#[cfg(unix)]
#[tokio::test]
async fn font_checks_distinguish_strict_and_weak_modes() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(root.join("expected_files/font.ttf"), b"\x00\x01\x00\x00abc").unwrap();
    std::fs::write(root.join("expected_files/font.woff"), b"wOFFxyz").unwrap();

    // font.ttf is copied verbatim; font.woff drifts
    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\n\
         cp expected_files/font.ttf actual_files/font.ttf\n\
         printf 'wOFFdrifted' > actual_files/font.woff",
    );

    let scenario = Scenario {
        name: "fonts".to_string(),
        description: String::new(),
        task: "default".to_string(),
        stylesheets: vec![],
        fonts: vec![
            FontCheck {
                file: "font.ttf".to_string(),
                require_identical: true,
            },
            FontCheck {
                file: "font.woff".to_string(),
                require_identical: true,
            },
            FontCheck {
                file: "font.woff".to_string(),
                require_identical: false,
            },
        ],
        renders: vec![],
    };

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner.run_scenario(&scenario).await.unwrap();

    assert!(result.checks[0].passed, "identical font should pass");
    assert!(!result.checks[1].passed, "drifted font should fail strict mode");
    assert!(result.checks[2].passed, "drifted font passes weak mode");
    assert!(!result.success);
}

#[cfg(unix)]
#[tokio::test]
async fn rerunning_a_scenario_stays_within_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(
        root.join("expected_files/font.styl"),
        "stable-one\nstable-two\ngenerated 1700000000\n",
    )
    .unwrap();

    // One volatile timestamp line per run
    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\n\
         printf 'stable-one\\nstable-two\\ngenerated %s\\n' \"$(date +%s%N)\" > actual_files/font.styl",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let scenario = stylesheet_scenario("font.styl");

    for _ in 0..2 {
        let result = runner.run_scenario(&scenario).await.unwrap();
        assert!(result.success, "checks: {:?}", result.checks);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn each_run_starts_from_a_clean_actual_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(root.join("expected_files/font.styl"), "a\n").unwrap();

    // Stale output from an earlier run
    std::fs::create_dir_all(root.join("actual_files")).unwrap();
    std::fs::write(root.join("actual_files/stale.png"), b"old").unwrap();

    let tool = write_stub_tool(
        root,
        "test ! -e actual_files/stale.png || exit 9\n\
         mkdir -p actual_files\nprintf 'a\\n' > actual_files/font.styl",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let result = runner
        .run_scenario(&stylesheet_scenario("font.styl"))
        .await
        .unwrap();

    assert!(result.success, "stale file survived cleanup: {:?}", result.error);
    assert!(!root.join("actual_files/stale.png").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn suite_report_is_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("expected_files")).unwrap();
    std::fs::write(root.join("expected_files/font.styl"), "a\n").unwrap();

    let tool = write_stub_tool(
        root,
        "mkdir -p actual_files\nprintf 'a\\n' > actual_files/font.styl",
    );

    let runner = ScenarioRunner::with_config(harness_config(root, &tool));
    let results = runner
        .run_suite(&[stylesheet_scenario("font.styl")])
        .await
        .unwrap();

    assert_eq!(results.total, 1);
    assert_eq!(results.passed, 1);
    assert_eq!(results.failed, 0);

    let path = runner.write_results(&results).unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(report["passed"], 1);
    assert_eq!(report["results"][0]["name"], "stylesheet-only");
}

// The tests below run the shipped fixture suite against the real build
// tool and renderer.

fn real_suite_runner() -> ScenarioRunner {
    ScenarioRunner::with_config(HarnessConfig::default())
}

/// Full built-in suite: default, single, multiple, overrides.
#[tokio::test]
#[ignore]
async fn full_builtin_suite_matches_golden_fixtures() {
    let runner = real_suite_runner();
    let results = runner.run_suite(&Scenario::builtin()).await.unwrap();
    runner.write_results(&results).unwrap();
    assert_eq!(results.failed, 0, "results: {:?}", results.results);
}

/// `single`: actual and expected font.styl+font.svg renders must be
/// pixel-identical.
#[tokio::test]
#[ignore]
async fn single_scenario_renders_pixel_match() {
    let result = real_suite_runner()
        .run_scenario(&Scenario::single())
        .await
        .unwrap();
    assert!(result.success, "checks: {:?}", result.checks);
}

/// `multiple`: each font format must render identically on its own.
#[test_case(FontFormat::Svg)]
#[test_case(FontFormat::Ttf)]
#[test_case(FontFormat::Eot)]
#[test_case(FontFormat::Woff)]
#[tokio::test]
#[ignore]
async fn multiple_scenario_renders_pixel_match(format: FontFormat) {
    let mut scenario = Scenario::multiple();
    scenario.renders.retain(|r| r.format == format);
    assert_eq!(scenario.renders.len(), 1);

    let result = real_suite_runner().run_scenario(&scenario).await.unwrap();
    assert!(result.success, "checks: {:?}", result.checks);
}

/// `overrides`: the remapped font file names (svg stored as
/// essveegee.eot, woff stored as waffles.ttf) must be honored on both
/// sides of the comparison.
#[tokio::test]
#[ignore]
async fn overrides_scenario_honors_font_name_remapping() {
    let result = real_suite_runner()
        .run_scenario(&Scenario::overrides())
        .await
        .unwrap();
    assert!(result.success, "checks: {:?}", result.checks);
}
