//! Build-script entry points.
//!
//! For crates that prefer a generated file over the `fast_service!` macro:
//!
//! ```ignore
//! // build.rs
//! fn main() -> anyhow::Result<()> {
//!     fast_service::build::Builder::new().dir("api").generate()?;
//!     Ok(())
//! }
//!
//! // src/main.rs
//! include!(concat!(env!("OUT_DIR"), "/fast_service.rs"));
//! ```
//!
//! Library crates export their services for dependents with
//! [`Builder::export_manifest`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fast_service_codegen::manifest::LibraryManifest;
use fast_service_codegen::pipeline::fingerprint_line;
use fast_service_codegen::{GeneratorConfig, extractor, scanner};
use fast_service_core::EmptySegment;

/// File name written under `$OUT_DIR`.
pub const OUTPUT_FILE: &str = "fast_service.rs";

/// Default manifest name written by [`Builder::export_manifest`].
pub const MANIFEST_FILE: &str = "fast_service.json";

#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: GeneratorConfig,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Folder to scan, relative to `src/`.
    pub fn dir(mut self, dir: impl Into<String>) -> Self {
        self.config.dir = dir.into();
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.config.module = Some(module.into());
        self
    }

    /// Add a library manifest, relative to the manifest directory.
    pub fn reference(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.config.references.push(manifest.into());
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.config.marker = marker.into();
        self
    }

    pub fn empty_segment(mut self, policy: EmptySegment) -> Self {
        self.config.empty_segment = policy;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Write the routines to `$OUT_DIR/fast_service.rs`.
    pub fn generate(&self) -> Result<PathBuf> {
        let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
        let out = env_path("OUT_DIR")?.join(OUTPUT_FILE);
        self.generate_into(&manifest_dir, &out)?;
        Ok(out)
    }

    /// Run a pass for the crate at `manifest_dir` and write it to `out`.
    ///
    /// Returns `false` when `out` already holds output with the same
    /// fingerprint and was left alone.
    pub fn generate_into(&self, manifest_dir: &Path, out: &Path) -> Result<bool> {
        let output = fast_service_codegen::generate(&self.config, manifest_dir)
            .with_context(|| format!("fast_service generation failed for {}", manifest_dir.display()))?;

        let scan_dir = self.config.scan_root(manifest_dir).dir;
        println!("cargo:rerun-if-changed={}", scan_dir.display());
        for source in &output.sources {
            println!("cargo:rerun-if-changed={}", source.display());
        }

        let fingerprint = fingerprint_line(output.fingerprint);
        if is_current(out, &fingerprint) {
            tracing::debug!(out = %out.display(), "generated routines unchanged");
            return Ok(false);
        }

        let rendered = output.render()?;
        write_atomic(out, &rendered)?;
        tracing::debug!(
            out = %out.display(),
            routes = output.unit.routes().count(),
            "wrote generated routines"
        );
        Ok(true)
    }

    /// Export this crate's services to `$OUT_DIR/fast_service.json`, named
    /// after `$CARGO_PKG_NAME`.
    pub fn export_manifest(&self) -> Result<PathBuf> {
        let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
        let crate_name = std::env::var("CARGO_PKG_NAME").context("CARGO_PKG_NAME is not set")?;
        let out = env_path("OUT_DIR")?.join(MANIFEST_FILE);
        self.export_manifest_to(&manifest_dir, &crate_name, &out)?;
        Ok(out)
    }

    /// Export the locally declared services of the crate at `manifest_dir`.
    ///
    /// Referenced manifests are not re-exported.
    pub fn export_manifest_to(&self, manifest_dir: &Path, crate_name: &str, out: &Path) -> Result<()> {
        let root = self.config.scan_root(manifest_dir);
        let index = scanner::scan(&root, &self.config.marker)
            .with_context(|| format!("failed to scan {}", root.dir.display()))?;
        println!("cargo:rerun-if-changed={}", root.dir.display());
        for file in index.files() {
            println!("cargo:rerun-if-changed={}", file.display());
        }
        let declarations = extractor::extract(&index);
        let manifest = LibraryManifest::export(crate_name, &declarations);
        manifest.save(out)?;
        tracing::debug!(
            out = %out.display(),
            services = manifest.declarations.len(),
            "exported library manifest"
        );
        Ok(())
    }
}

/// [`Builder::generate`] with the default configuration.
pub fn generate() -> Result<PathBuf> {
    Builder::new().generate()
}

fn env_path(name: &str) -> Result<PathBuf> {
    std::env::var_os(name)
        .map(PathBuf::from)
        .with_context(|| format!("{name} is not set, run from a build script"))
}

fn is_current(out: &Path, fingerprint: &str) -> bool {
    std::fs::read_to_string(out)
        .is_ok_and(|existing| existing.lines().nth(1) == Some(fingerprint))
}

/// Write through a sibling temp file so a failed write never leaves a
/// truncated unit behind.
fn write_atomic(out: &Path, content: &str) -> Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let staging = out.with_extension("rs.tmp");
    std::fs::write(&staging, content)
        .with_context(|| format!("failed to write {}", staging.display()))?;
    std::fs::rename(&staging, out)
        .with_context(|| format!("failed to move generated routines to {}", out.display()))
}
