//! Error types for the verification harness

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to spawn build command `{command}`: {source}")]
    BuildSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("Build task `{task}` exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    BuildFailed {
        task: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Build task `{task}` wrote to stderr:\n{stderr}")]
    BuildStderr { task: String, stderr: String },

    #[error("Build task `{task}` did not finish within {timeout_secs}s")]
    BuildTimeout { task: String, timeout_secs: u64 },

    #[error("Renderer not found. Install with: npx playwright install chromium")]
    RendererNotFound,

    #[error("Render script failed:\nstdout: {stdout}\nstderr: {stderr}")]
    RenderFailed { stdout: String, stderr: String },

    #[error("Render of `{screenshot}` did not finish within {timeout_secs}s")]
    RenderTimeout {
        screenshot: PathBuf,
        timeout_secs: u64,
    },

    #[error("Expected output file missing: {0}")]
    MissingOutput(PathBuf),

    #[error("{file}: {missing} expected line(s) absent from actual output (threshold: {threshold})")]
    LineMismatch {
        file: PathBuf,
        missing: usize,
        threshold: usize,
    },

    #[error("Font `{file}` was generated empty")]
    EmptyFont { file: PathBuf },

    #[error("Screenshot dimensions differ: actual {actual_w}x{actual_h} vs expected {expected_w}x{expected_h}")]
    DimensionMismatch {
        actual_w: u32,
        actual_h: u32,
        expected_w: u32,
        expected_h: u32,
    },

    #[error("Screenshot mismatch: {name} differs by {diff_percent:.2}% ({diff_pixels} pixel(s))")]
    VisualMismatch {
        name: String,
        diff_percent: f64,
        diff_pixels: u64,
    },

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
