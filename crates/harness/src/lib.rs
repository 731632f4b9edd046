//! Iconfont Plugin Verification Harness
//!
//! This crate verifies a build-tool plugin that converts sets of SVG
//! images into icon fonts and stylesheets. The plugin itself is an
//! external collaborator: the harness
//! - spawns one build task per scenario and captures its output,
//! - diffs the generated stylesheets line-by-line against golden
//!   fixtures, tolerating a small number of volatile lines,
//! - compares generated font binaries byte-for-byte,
//! - renders stylesheet+font pairs to screenshots through a headless
//!   browser and diffs them pixel-by-pixel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ScenarioRunner (sequential)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  per Scenario:                                              │
//! │    ├── fixture::clean_output_tree(actual_files/)            │
//! │    ├── BuildRunner::run(task)  ->  BuildOutput              │
//! │    ├── LineComparator          ->  LineDiff   (stylesheets) │
//! │    ├── fontbin::compare        ->  FontDiff   (binaries)    │
//! │    └── Renderer + VisualComparator -> VisualDiff (renders)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The output tree of a scenario is only read after its build task has
//! exited cleanly (zero status, empty stderr).

pub mod build;
pub mod error;
pub mod fixture;
pub mod fontbin;
pub mod lines;
pub mod render;
pub mod runner;
pub mod scenario;
pub mod visual;

pub use build::{BuildConfig, BuildRunner};
pub use error::{HarnessError, HarnessResult};
pub use lines::LineComparator;
pub use runner::{HarnessConfig, ScenarioRunner, SuiteResult};
pub use scenario::{FontFormat, Scenario};
pub use visual::VisualComparator;
