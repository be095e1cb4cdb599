//! Runtime settings and the category allow-list.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Input path used by flat mode when no `-f`/`--file` is given.
pub const DEFAULT_FLAT_INPUT: &str = "scores.txt";

/// Categories accepted in categorized mode unless configured otherwise.
pub const DEFAULT_CATEGORIES: &[&str] = &["math", "english", "physics"];

/// Settings read from an optional JSON file.
///
/// ```json
/// {
///   "categories": ["math", "english", "physics"],
///   "flat_input": "scores.txt"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub categories: Vec<String>,
    pub flat_input: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            flat_input: DEFAULT_FLAT_INPUT.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`. Missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn category_set(&self) -> CategorySet {
        CategorySet::new(self.categories.iter().cloned())
    }
}

/// Closed set of category names a categorized record may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self { names: Vec::new() };
        for name in names {
            let name = name.into();
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.iter().any(|n| n == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES.iter().copied())
    }
}
