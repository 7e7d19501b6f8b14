//! Default catalog loading.
//!
//! The catalog lists the life areas every user is expected to have and the metrics
//! seeded into each. It is read from a TOML file named by `CATALOG_PATH`, or from the
//! copy of `catalog.toml` compiled into the binary.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("../../catalog.toml");

/// Configuration structure representing the entire catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    /// Default life areas, in display order
    pub categories: Vec<CategorySeed>,
}

/// One default life area
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    /// Natural key
    pub title: String,
    /// Display icon
    pub icon: String,
    /// Accent colour
    #[serde(default)]
    pub color: Option<String>,
    /// Metrics seeded into this area
    #[serde(default)]
    pub metrics: Vec<MetricSeed>,
}

/// One default metric
#[derive(Debug, Clone, Deserialize)]
pub struct MetricSeed {
    /// Natural key within its area
    pub name: String,
    /// Unit label
    pub unit: String,
}

impl Catalog {
    /// Default metrics for a category title; empty for titles outside the catalog.
    #[must_use]
    pub fn metrics_for(&self, title: &str) -> &[MetricSeed] {
        self.categories
            .iter()
            .find(|seed| seed.title == title)
            .map(|seed| seed.metrics.as_slice())
            .unwrap_or(&[])
    }
}

/// Parses a catalog from TOML text.
pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog: {e}"),
    })
}

/// Loads a catalog from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid catalog.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path_ref = path.as_ref();
    debug!("Loading catalog from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read catalog file {}: {e}", path_ref.display()),
    })?;
    parse_catalog(&contents)
}

/// The catalog compiled into the binary.
pub fn builtin_catalog() -> Result<Catalog> {
    parse_catalog(BUILTIN_CATALOG)
}

/// Loads the catalog named by `CATALOG_PATH`, falling back to the built-in one.
pub fn load_default_catalog() -> Result<Catalog> {
    match std::env::var("CATALOG_PATH") {
        Ok(path) => load_catalog(path),
        Err(_) => builtin_catalog(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let toml_str = r#"
            [[categories]]
            title = "Health"
            icon = "💪"
            metrics = [{ name = "Weight", unit = "kg" }]

            [[categories]]
            title = "Fun"
            icon = "🎨"
        "#;

        let catalog = parse_catalog(toml_str).unwrap();
        assert_eq!(catalog.categories.len(), 2);
        assert_eq!(catalog.metrics_for("Health")[0].unit, "kg");
        assert!(catalog.metrics_for("Fun").is_empty());
        assert!(catalog.metrics_for("Unknown").is_empty());
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = builtin_catalog().unwrap();
        assert!(!catalog.categories.is_empty());
        assert!(catalog.categories.iter().any(|c| c.title == "Health"));
    }

    #[test]
    fn test_invalid_catalog_is_config_error() {
        let result = parse_catalog("[[categories]]\ntitle = 3");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
