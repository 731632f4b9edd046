//! Headless screenshot rendering of stylesheet+font pairs
//!
//! The harness never interprets stylesheets or fonts itself. It
//! generates a small Playwright script that builds a page from the
//! stylesheet's glyph codepoints with the font inlined as a data URL,
//! then runs the script under `node` and collects the screenshot it
//! writes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::scenario::RenderCheck;

/// Configuration for the render page.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub glyph_size_px: u32,
    pub headless: bool,

    /// Upper bound on how long one render may run
    pub timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 600,
            glyph_size_px: 48,
            headless: true,
            timeout: Duration::from_secs(60),
        }
    }
}

/// One render request: a stylesheet+font pair and a screenshot target.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub stylesheet: PathBuf,
    pub font: PathBuf,
    pub screenshot: PathBuf,
    pub check: RenderCheck,
}

/// Drives the headless browser through generated scripts.
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Check that the browser runner is installed.
    pub fn ensure_available() -> HarnessResult<()> {
        let status = std::process::Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(HarnessError::RendererNotFound),
        }
    }

    /// The font file the render page should load: the remapping table
    /// wins over the request's font path for the requested format.
    pub fn resolve_font_path(request: &RenderRequest) -> PathBuf {
        match request.check.font_names.get(&request.check.format) {
            Some(name) => match request.font.parent() {
                Some(parent) => parent.join(name),
                None => PathBuf::from(name),
            },
            None => request.font.clone(),
        }
    }

    /// Build the render script for one request.
    pub fn build_script(&self, request: &RenderRequest) -> String {
        let stylesheet = js_str(&request.stylesheet);
        let font = js_str(&Self::resolve_font_path(request));
        let screenshot = js_str(&request.screenshot);
        let mime = request.check.format.mime();
        let css_format = request.check.format.css_format();

        format!(
            r#"const {{ chromium }} = require('playwright');
const fs = require('fs');

(async () => {{
  const browser = await chromium.launch({{ headless: {headless} }});
  const page = await browser.newPage({{
    viewport: {{ width: {width}, height: {height} }}
  }});

  // Glyph codepoints are whatever the generated stylesheet assigned
  const stylesheet = fs.readFileSync({stylesheet}, 'utf8');
  const codepoints = Array.from(
    new Set(stylesheet.match(/\\[0-9a-fA-F]{{2,6}}/g) || [])
  ).sort();
  const font = fs.readFileSync({font}).toString('base64');

  const face = "@font-face {{ font-family: 'iconfont'; " +
    "src: url(data:{mime};base64," + font + ") format('{css_format}'); }}";
  const spans = codepoints
    .map((cp) => '<span class="glyph">&#x' + cp.slice(1) + ';</span>')
    .join('');
  const html = '<!DOCTYPE html><html><head><style>' + face +
    ' body {{ margin: 0; background: #fff; }}' +
    ' .glyph {{ font-family: iconfont; font-size: {glyph_size}px; }}' +
    '</style></head><body>' + spans + '</body></html>';

  await page.setContent(html);
  await page.evaluate(() => document.fonts.ready);
  await page.screenshot({{ path: {screenshot} }});
  await browser.close();
}})().catch((err) => {{
  console.error(err.stack || String(err));
  process.exit(1);
}});
"#,
            headless = self.config.headless,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            glyph_size = self.config.glyph_size_px,
            stylesheet = stylesheet,
            font = font,
            screenshot = screenshot,
            mime = mime,
            css_format = css_format,
        )
    }

    /// Render one stylesheet+font pair to a screenshot.
    pub async fn render(&self, request: &RenderRequest) -> HarnessResult<()> {
        if !request.stylesheet.exists() {
            return Err(HarnessError::MissingOutput(request.stylesheet.clone()));
        }
        let font = Self::resolve_font_path(request);
        if !font.exists() {
            return Err(HarnessError::MissingOutput(font));
        }
        if let Some(parent) = request.screenshot.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let script = self.build_script(request);
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("render.js");
        std::fs::write(&script_path, script)?;

        debug!("Rendering {} via {}", request.screenshot.display(), script_path.display());

        // Like the build tool, a timed-out renderer must not keep a
        // detached browser writing screenshots into the output tree
        let output = timeout(
            self.config.timeout,
            Command::new("node")
                .arg(&script_path)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| HarnessError::RenderTimeout {
            screenshot: request.screenshot.clone(),
            timeout_secs: self.config.timeout.as_secs(),
        })??;

        if !output.status.success() {
            return Err(HarnessError::RenderFailed {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        if !request.screenshot.exists() {
            return Err(HarnessError::MissingOutput(request.screenshot.clone()));
        }

        Ok(())
    }
}

/// Quote a path as a JS string literal.
fn js_str(path: &Path) -> String {
    serde_json::to_string(&path.to_string_lossy())
        .unwrap_or_else(|_| format!("{:?}", path.to_string_lossy()))
}
