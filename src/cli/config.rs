use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for comparing evaluation results
///
/// Every field is optional: combos, modes, tasks and groups are discovered
/// from the loaded results, the config only orders and names them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Title of the generated report
    #[serde(default = "default_title")]
    pub title: String,

    /// Mode every other mode is compared against
    #[serde(default = "default_baseline_mode")]
    pub baseline_mode: String,

    /// Preferred display order of modes (after the baseline)
    #[serde(default)]
    pub mode_order: Vec<String>,

    /// Preferred display order of combos
    #[serde(default)]
    pub combo_order: Vec<String>,

    /// Preferred display order of tasks
    #[serde(default)]
    pub task_order: Vec<String>,

    /// Display names for combo ids
    #[serde(default)]
    pub combo_display: BTreeMap<String, String>,

    /// Display names for task ids
    #[serde(default)]
    pub task_display: BTreeMap<String, String>,

    /// Group assigned to results that carry none
    #[serde(default = "default_group")]
    pub default_group: String,

    /// Where `--emit-site` publishes the HTML report
    #[serde(default = "default_site_path")]
    pub site_path: PathBuf,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            baseline_mode: default_baseline_mode(),
            mode_order: Vec::new(),
            combo_order: Vec::new(),
            task_order: Vec::new(),
            combo_display: BTreeMap::new(),
            task_display: BTreeMap::new(),
            default_group: default_group(),
            site_path: default_site_path(),
        }
    }
}

fn default_title() -> String {
    "AI Agent Code Quality Benchmark".to_string()
}

fn default_baseline_mode() -> String {
    "vanilla".to_string()
}

fn default_group() -> String {
    "standard".to_string()
}

fn default_site_path() -> PathBuf {
    PathBuf::from("docs/index.html")
}

impl CompareConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: CompareConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .context(format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Modes in preferred order, baseline first
    pub fn preferred_modes(&self) -> Vec<String> {
        let mut modes = vec![self.baseline_mode.clone()];
        for mode in &self.mode_order {
            if !modes.contains(mode) {
                modes.push(mode.clone());
            }
        }
        modes
    }

    /// Generate a sample configuration
    pub fn sample() -> Self {
        let combos = [
            ("claude-code", "Claude Opus 4.6"),
            ("claude-code-sonnet", "Claude Sonnet 4.5"),
            ("codex", "Codex (GPT-5.3)"),
            ("gemini-cli", "Gemini CLI"),
        ];
        let tasks = [
            ("react-todo", "React TODO"),
            ("astro-landing", "Astro Landing"),
            ("python-crawler", "Python Crawler"),
            ("cpp-calculator", "C++ Calculator"),
            ("go-loganalyzer", "Go Log Analyzer"),
        ];

        Self {
            mode_order: vec!["roam-cli".to_string(), "roam-mcp".to_string()],
            combo_order: combos.iter().map(|(id, _)| id.to_string()).collect(),
            task_order: tasks.iter().map(|(id, _)| id.to_string()).collect(),
            combo_display: combos
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            task_display: tasks
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            ..Default::default()
        }
    }
}
