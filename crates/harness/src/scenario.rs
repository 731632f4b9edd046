//! Declarative scenario specification
//!
//! A scenario names one build task and the checks to run against the
//! output tree it produces: line-level stylesheet comparisons, binary
//! font comparisons, and screenshot render comparisons. Scenarios are
//! parsed from YAML files or constructed in code for the built-in
//! fixture suite.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};

/// A complete scenario: one build task plus its expected output checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Build task identifier passed to the external tool
    pub task: String,

    /// Stylesheet files compared line-by-line
    #[serde(default)]
    pub stylesheets: Vec<StylesheetCheck>,

    /// Font binaries compared byte-by-byte
    #[serde(default)]
    pub fonts: Vec<FontCheck>,

    /// Stylesheet+font pairs rendered and pixel-diffed
    #[serde(default)]
    pub renders: Vec<RenderCheck>,
}

/// A line-level comparison of one generated text file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylesheetCheck {
    /// Path relative to both the actual and expected trees
    pub file: String,

    /// Per-file override of the missing-line threshold
    #[serde(default)]
    pub threshold: Option<usize>,
}

/// A byte-level comparison of one generated font binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontCheck {
    /// Path relative to both the actual and expected trees
    pub file: String,

    /// Require exact byte equality. When false only non-emptiness is
    /// asserted, for fonts that legitimately embed volatile bytes.
    #[serde(default = "default_true")]
    pub require_identical: bool,
}

fn default_true() -> bool {
    true
}

/// A render-and-diff comparison of one stylesheet+font pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderCheck {
    /// Stylesheet path relative to both trees
    pub stylesheet: String,

    /// Font file path relative to both trees
    pub font: String,

    /// Format the render page declares for the font source
    pub format: FontFormat,

    /// Remaps the file name a format resolves to inside the render page
    #[serde(default)]
    pub font_names: BTreeMap<FontFormat, String>,

    /// Stem for the actual/expected/diff screenshot triplet, relative
    /// to the actual tree
    pub screenshot: String,
}

/// Font container formats the build tool emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Svg,
    Ttf,
    Eot,
    Woff,
}

impl FontFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFormat::Svg => "svg",
            FontFormat::Ttf => "ttf",
            FontFormat::Eot => "eot",
            FontFormat::Woff => "woff",
        }
    }

    /// CSS `format()` hint for the @font-face source
    pub fn css_format(&self) -> &'static str {
        match self {
            FontFormat::Svg => "svg",
            FontFormat::Ttf => "truetype",
            FontFormat::Eot => "embedded-opentype",
            FontFormat::Woff => "woff",
        }
    }

    /// MIME type used for the inlined data URL
    pub fn mime(&self) -> &'static str {
        match self {
            FontFormat::Svg => "image/svg+xml",
            FontFormat::Ttf => "font/ttf",
            FontFormat::Eot => "application/vnd.ms-fontobject",
            FontFormat::Woff => "font/woff",
        }
    }
}

impl std::fmt::Display for FontFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a scenario from a YAML file. Parse errors name the file,
    /// since a suite may load a whole directory of scenarios.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| HarnessError::ScenarioParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory
    pub fn load_all(dir: &Path) -> HarnessResult<Vec<Self>> {
        let mut scenarios = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            scenarios.push(Self::from_file(entry.path())?);
        }

        Ok(scenarios)
    }

    /// The `default` task: one stylesheet plus all four font binaries.
    /// The font checks keep the historical non-empty assertion because
    /// the generated binaries embed volatile bytes.
    pub fn default_task() -> Self {
        Scenario {
            name: "default".to_string(),
            description: "one font in every format plus a Stylus stylesheet".to_string(),
            task: "default".to_string(),
            stylesheets: vec![StylesheetCheck {
                file: "font.styl".to_string(),
                threshold: None,
            }],
            fonts: [FontFormat::Eot, FontFormat::Svg, FontFormat::Ttf, FontFormat::Woff]
                .iter()
                .map(|format| FontCheck {
                    file: format!("font.{}", format),
                    require_identical: false,
                })
                .collect(),
            renders: vec![],
        }
    }

    /// The `single` task: one font, one stylesheet, one render check.
    pub fn single() -> Self {
        Scenario {
            name: "single".to_string(),
            description: "a single font and stylesheet".to_string(),
            task: "single".to_string(),
            stylesheets: vec![StylesheetCheck {
                file: "single/font.styl".to_string(),
                threshold: None,
            }],
            fonts: vec![],
            renders: vec![RenderCheck {
                stylesheet: "single/font.styl".to_string(),
                font: "single/font.svg".to_string(),
                format: FontFormat::Svg,
                font_names: BTreeMap::new(),
                screenshot: "single/font.svg".to_string(),
            }],
        }
    }

    /// The `multiple` task: every font format rendered independently.
    pub fn multiple() -> Self {
        Scenario {
            name: "multiple".to_string(),
            description: "multiple fonts and stylesheets".to_string(),
            task: "multiple".to_string(),
            stylesheets: vec![
                StylesheetCheck {
                    file: "multiple/font.styl".to_string(),
                    threshold: None,
                },
                StylesheetCheck {
                    file: "multiple/font.json".to_string(),
                    threshold: None,
                },
            ],
            fonts: vec![],
            renders: [FontFormat::Svg, FontFormat::Ttf, FontFormat::Eot, FontFormat::Woff]
                .iter()
                .map(|format| RenderCheck {
                    stylesheet: "multiple/font.styl".to_string(),
                    font: format!("multiple/font.{}", format),
                    format: *format,
                    font_names: BTreeMap::new(),
                    screenshot: format!("multiple/font.{}", format),
                })
                .collect(),
        }
    }

    /// The `overrides` task: custom destination file names, including
    /// fonts stored under extensions that lie about their format.
    pub fn overrides() -> Self {
        let font_names: BTreeMap<FontFormat, String> = [
            (FontFormat::Svg, "essveegee.eot".to_string()),
            (FontFormat::Woff, "waffles.ttf".to_string()),
        ]
        .into_iter()
        .collect();

        Scenario {
            name: "overrides".to_string(),
            description: "overridden font and stylesheet destinations".to_string(),
            task: "overrides".to_string(),
            stylesheets: vec![
                StylesheetCheck {
                    file: "overrides/jason.less".to_string(),
                    threshold: None,
                },
                StylesheetCheck {
                    file: "overrides/styleee.json".to_string(),
                    threshold: None,
                },
            ],
            fonts: vec![],
            renders: vec![
                RenderCheck {
                    stylesheet: "overrides/styleee.json".to_string(),
                    font: "overrides/waffles.ttf".to_string(),
                    format: FontFormat::Woff,
                    font_names: font_names.clone(),
                    screenshot: "overrides/waffles.ttf".to_string(),
                },
                RenderCheck {
                    stylesheet: "overrides/styleee.json".to_string(),
                    font: "overrides/essveegee.eot".to_string(),
                    format: FontFormat::Svg,
                    font_names,
                    screenshot: "overrides/essveegee.eot".to_string(),
                },
            ],
        }
    }

    /// The full built-in fixture suite, in execution order.
    pub fn builtin() -> Vec<Self> {
        vec![
            Self::default_task(),
            Self::single(),
            Self::multiple(),
            Self::overrides(),
        ]
    }
}
