//! Scenario orchestration
//!
//! One scenario at a time: wipe the actual tree, run the build task,
//! then walk the scenario's checks against the files the task left
//! behind. A build failure fails the whole scenario; a comparison
//! failure fails only its check.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::build::{BuildConfig, BuildRunner};
use crate::error::HarnessResult;
use crate::fixture::{self, FixtureLayout};
use crate::fontbin;
use crate::lines::LineComparator;
use crate::render::{RenderConfig, RenderRequest, Renderer};
use crate::scenario::{FontCheck, RenderCheck, Scenario, StylesheetCheck};
use crate::visual::{VisualComparator, VisualDiff};

/// Outcome of one check within a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: Option<String>,
}

/// Outcome of one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub checks: Vec<CheckResult>,
    pub error: Option<String>,
}

/// Outcome of a full suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

/// Configuration for the scenario runner.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub build: BuildConfig,
    pub render: RenderConfig,

    /// Directory holding `actual_files/` and `expected_files/`
    pub fixture_root: PathBuf,

    /// Default missing-line tolerance for stylesheet checks
    pub line_threshold: usize,

    /// Allowed percentage of differing pixels for render checks
    pub visual_threshold: f64,

    /// Directory for the JSON results report
    pub output_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            render: RenderConfig::default(),
            fixture_root: PathBuf::from("tests/fixtures"),
            line_threshold: crate::lines::DEFAULT_LINE_THRESHOLD,
            visual_threshold: 0.0,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Runs scenarios sequentially against one fixture tree.
pub struct ScenarioRunner {
    build: BuildRunner,
    renderer: Renderer,
    layout: FixtureLayout,
    lines: LineComparator,
    visual: VisualComparator,
    output_dir: PathBuf,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self {
            build: BuildRunner::new(config.build),
            renderer: Renderer::new(config.render),
            layout: FixtureLayout::new(config.fixture_root),
            lines: LineComparator::new(config.line_threshold),
            visual: VisualComparator::new(config.visual_threshold),
            output_dir: config.output_dir,
        }
    }

    /// Run a list of scenarios in order.
    pub async fn run_suite(&self, scenarios: &[Scenario]) -> HarnessResult<SuiteResult> {
        let start = Instant::now();

        if scenarios.iter().any(|s| !s.renders.is_empty()) {
            Renderer::ensure_available()?;
        }

        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            match self.run_scenario(scenario).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("check failure")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", scenario.name, e);
                    results.push(ScenarioResult {
                        name: scenario.name.clone(),
                        success: false,
                        duration_ms: 0,
                        checks: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Suite results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run one scenario: clean, build, compare.
    pub async fn run_scenario(&self, scenario: &Scenario) -> HarnessResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        // Fresh slate; the actual tree belongs to this scenario alone.
        // The expected tree is never touched.
        fixture::clean_output_tree(&self.layout.actual_root)?;

        let mut checks = Vec::new();
        let mut scenario_error = None;

        match self.build.run(&scenario.task).await {
            Ok(output) => {
                debug!(
                    "Task `{}` produced {} bytes of output",
                    scenario.task,
                    output.stdout.len()
                );
            }
            Err(e) => scenario_error = Some(e.to_string()),
        }

        // The output tree is only readable after a clean build exit
        if scenario_error.is_none() {
            for check in &scenario.stylesheets {
                checks.push(self.run_stylesheet_check(check));
            }
            for check in &scenario.fonts {
                checks.push(self.run_font_check(check));
            }
            for check in &scenario.renders {
                checks.push(self.run_render_check(check).await);
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = scenario_error.is_none() && checks.iter().all(|c| c.passed);

        Ok(ScenarioResult {
            name: scenario.name.clone(),
            success,
            duration_ms,
            checks,
            error: scenario_error,
        })
    }

    fn run_stylesheet_check(&self, check: &StylesheetCheck) -> CheckResult {
        let name = format!("stylesheet {}", check.file);
        let actual = self.layout.actual(&check.file);
        let expected = self.layout.expected(&check.file);

        match self.lines.compare_files(&actual, &expected, check.threshold) {
            Ok(diff) if diff.within_threshold() => CheckResult {
                name,
                passed: true,
                detail: Some(format!(
                    "{} missing line(s), threshold {}",
                    diff.missing.len(),
                    diff.threshold
                )),
            },
            Ok(diff) => CheckResult {
                name,
                passed: false,
                detail: Some(format!(
                    "{} expected line(s) absent (threshold {}): {:?}",
                    diff.missing.len(),
                    diff.threshold,
                    diff.missing
                )),
            },
            Err(e) => CheckResult {
                name,
                passed: false,
                detail: Some(e.to_string()),
            },
        }
    }

    fn run_font_check(&self, check: &FontCheck) -> CheckResult {
        let name = format!("font {}", check.file);
        let actual = self.layout.actual(&check.file);
        let expected = self.layout.expected(&check.file);

        match fontbin::compare(&actual, &expected) {
            Ok(diff) if diff.identical || !check.require_identical => CheckResult {
                name,
                passed: true,
                detail: Some(format!("{} bytes", diff.actual_len)),
            },
            Ok(diff) => CheckResult {
                name,
                passed: false,
                detail: Some(format!(
                    "bytes differ: {} ({}) vs {} ({})",
                    diff.actual_len, diff.actual_sha256, diff.expected_len, diff.expected_sha256
                )),
            },
            Err(e) => CheckResult {
                name,
                passed: false,
                detail: Some(e.to_string()),
            },
        }
    }

    async fn run_render_check(&self, check: &RenderCheck) -> CheckResult {
        let name = format!("render {} ({})", check.screenshot, check.format);

        match self.render_and_diff(check).await {
            Ok(diff) if diff.matches => CheckResult {
                name,
                passed: true,
                detail: Some(format!("{} pixel(s) compared", diff.total_pixels)),
            },
            Ok(diff) => CheckResult {
                name,
                passed: false,
                detail: Some(format!(
                    "{:.2}% pixels differ ({} of {}), diff image: {}",
                    diff.diff_percent,
                    diff.diff_pixels,
                    diff.total_pixels,
                    diff.diff_image_path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "none".to_string())
                )),
            },
            Err(e) => CheckResult {
                name,
                passed: false,
                detail: Some(e.to_string()),
            },
        }
    }

    /// Render the actual and expected pairs, then pixel-diff them. All
    /// three screenshots land in the actual tree so the golden fixture
    /// set stays read-only.
    async fn render_and_diff(&self, check: &RenderCheck) -> HarnessResult<VisualDiff> {
        let actual_shot = self.layout.actual(&format!("{}.actual.png", check.screenshot));
        let expected_shot = self.layout.actual(&format!("{}.expected.png", check.screenshot));
        let diff_shot = self.layout.actual(&format!("{}.diff.png", check.screenshot));

        self.renderer
            .render(&RenderRequest {
                stylesheet: self.layout.actual(&check.stylesheet),
                font: self.layout.actual(&check.font),
                screenshot: actual_shot.clone(),
                check: check.clone(),
            })
            .await?;

        self.renderer
            .render(&RenderRequest {
                stylesheet: self.layout.expected(&check.stylesheet),
                font: self.layout.expected(&check.font),
                screenshot: expected_shot.clone(),
                check: check.clone(),
            })
            .await?;

        self.visual.compare(&actual_shot, &expected_shot, &diff_shot)
    }

    /// Write the suite report to a JSON file.
    pub fn write_results(&self, results: &SuiteResult) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("suite-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
