use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout_engine::{InsertionPolicy, TilingMode};

/// Largest gap the preferences UI ever offered.
pub const MAX_GAP: i32 = 30;

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autotiling-wm")
}
pub fn config_file() -> PathBuf { config_dir().join("config.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Master switch. When off, no window is tiled.
    #[serde(default = "yes")]
    pub tiling_on: bool,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Where new windows go when there is no explicit target
    #[serde(default)]
    pub insertion: InsertionPolicy,
    /// Mode of newly created leaves
    #[serde(default)]
    pub default_mode: TilingMode,
    #[serde(default)]
    pub gaps: GapSettings,
}

/// Gap configuration for window spacing, in pixels
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Space between sibling windows
    #[serde(default)]
    pub inner: i32,
    /// Space between windows and the work area edge
    #[serde(default)]
    pub outer: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tiling_on: true,
            layout: LayoutSettings::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> { self.layout.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.layout.auto_fix_values() }
}

impl LayoutSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.default_mode == TilingMode::Split {
            issues.push("default_mode \"split\" is reserved and behaves as \"stack\"".to_string());
        }

        issues.extend(self.gaps.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize { self.gaps.auto_fix_values() }
}

impl GapSettings {
    pub fn inner_px(&self) -> f64 { self.inner.max(0) as f64 }

    pub fn outer_px(&self) -> f64 { self.outer.max(0) as f64 }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, value) in [("inner", self.inner), ("outer", self.outer)] {
            if value < 0 {
                issues.push(format!("{name} gap must be non-negative, got {value}"));
            } else if value > MAX_GAP {
                issues.push(format!("{name} gap should not exceed {MAX_GAP}, got {value}"));
            }
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        for value in [&mut self.inner, &mut self.outer] {
            let fixed = (*value).clamp(0, MAX_GAP);
            if fixed != *value {
                *value = fixed;
                fixes += 1;
            }
        }

        fixes
    }
}

fn yes() -> bool { true }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Reads `path` if it exists, falling back to the defaults otherwise.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() { Self::read(path) } else { Ok(Config::default()) }
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }
}
