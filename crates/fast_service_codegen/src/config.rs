//! Generator configuration.
//!
//! Filled from the `fast_service!` arguments or from the build-script
//! builder. Relative paths resolve against the crate's manifest directory.

use std::path::{Path, PathBuf};

use fast_service_core::EmptySegment;
use serde::{Deserialize, Serialize};

use crate::scanner::ScanRoot;

pub const DEFAULT_DIR: &str = "services";
pub const DEFAULT_MARKER: &str = "FastApi";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Folder to scan, relative to `src/`
    pub dir: String,
    /// Module path of that folder; derived from `dir` when absent
    pub module: Option<String>,
    /// Library manifests whose services are routed as well
    pub references: Vec<PathBuf>,
    /// Name of the marker trait
    pub marker: String,
    pub empty_segment: EmptySegment,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_DIR.to_string(),
            module: None,
            references: Vec::new(),
            marker: DEFAULT_MARKER.to_string(),
            empty_segment: EmptySegment::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Module path the scanned folder is mounted at.
    ///
    /// `services/admin` maps to `crate::services::admin`, an empty folder to
    /// the crate root.
    pub fn module_path(&self) -> String {
        if let Some(module) = &self.module {
            return module.clone();
        }
        let segments: Vec<&str> = self
            .dir
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if segments.is_empty() {
            "crate".to_string()
        } else {
            format!("crate::{}", segments.join("::"))
        }
    }

    pub fn scan_root(&self, manifest_dir: &Path) -> ScanRoot {
        ScanRoot {
            dir: manifest_dir.join("src").join(&self.dir),
            module: self.module_path(),
        }
    }

    /// Manifest paths resolved against `manifest_dir`.
    pub fn reference_paths(&self, manifest_dir: &Path) -> Vec<PathBuf> {
        self.references
            .iter()
            .map(|path| manifest_dir.join(path))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("services", "crate::services")]
    #[case("services/admin", "crate::services::admin")]
    #[case("./api/", "crate::api")]
    #[case("", "crate")]
    fn test_module_path_from_dir(#[case] dir: &str, #[case] expected: &str) {
        assert_eq!(GeneratorConfig::new(dir).module_path(), expected);
    }

    #[test]
    fn test_explicit_module_wins() {
        let config = GeneratorConfig {
            module: Some("crate::fixtures".to_string()),
            ..GeneratorConfig::new("../tests/fixtures")
        };
        assert_eq!(config.module_path(), "crate::fixtures");
    }

    #[test]
    fn test_scan_root_under_src() {
        let root = GeneratorConfig::default().scan_root(Path::new("/work/app"));
        assert_eq!(root.dir, Path::new("/work/app/src/services"));
        assert_eq!(root.module, "crate::services");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "dir": "api", "empty_segment": "method_name" }"#).unwrap();
        assert_eq!(config.dir, "api");
        assert_eq!(config.marker, DEFAULT_MARKER);
        assert_eq!(config.empty_segment, EmptySegment::MethodName);
    }
}
