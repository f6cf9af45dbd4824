//! One build pass: scan, extract, merge referenced manifests, synthesize.
//!
//! Every stage consumes the complete output of the previous one and nothing
//! is kept between passes. The only memoization hook is
//! [`DeclarationSet::fingerprint`], a content hash of everything synthesis
//! reads.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use fast_service_core::{EmptySegment, ServiceDeclaration};
use proc_macro2::TokenStream;
use quote::ToTokens;
use xxhash_rust::xxh3::Xxh3;

use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::extractor::extract;
use crate::manifest::LibraryManifest;
use crate::scanner::scan;
use crate::synth::GeneratedUnit;

/// Header written above rendered output.
pub const GENERATED_HEADER: &str = "// @generated by fast_service. Do not edit.";

/// De-duplicated declarations of one build pass, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    declarations: Vec<ServiceDeclaration>,
}

impl DeclarationSet {
    pub fn new(local: Vec<ServiceDeclaration>) -> Self {
        let mut set = Self::default();
        set.merge(local);
        set
    }

    /// Append `declarations`, dropping those whose identity is already
    /// present. Returns how many were dropped.
    pub fn merge(&mut self, declarations: impl IntoIterator<Item = ServiceDeclaration>) -> usize {
        let mut dropped = 0;
        for decl in declarations {
            if self
                .declarations
                .iter()
                .any(|known| known.identity() == decl.identity())
            {
                tracing::warn!(service = %decl.qualified_path(), "dropping duplicate service declaration");
                dropped += 1;
            } else {
                self.declarations.push(decl);
            }
        }
        dropped
    }

    pub fn declarations(&self) -> &[ServiceDeclaration] {
        &self.declarations
    }

    pub fn into_declarations(self) -> Vec<ServiceDeclaration> {
        self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Content hash of the set, the policy synthesis runs with and the
    /// generator version, so upgrading the generator invalidates old output.
    pub fn fingerprint(&self, empty: EmptySegment) -> u64 {
        self.fingerprint_for(empty, env!("CARGO_PKG_VERSION"))
    }

    fn fingerprint_for(&self, empty: EmptySegment, version: &str) -> u64 {
        let mut hasher = Xxh3::new();
        version.hash(&mut hasher);
        self.declarations.hash(&mut hasher);
        empty.hash(&mut hasher);
        hasher.finish()
    }
}

/// Scan the configured folder and merge the referenced manifests.
///
/// Returns the set and every file it was read from.
pub fn collect_declarations(
    config: &GeneratorConfig,
    manifest_dir: &Path,
) -> Result<(DeclarationSet, Vec<PathBuf>)> {
    let root = config.scan_root(manifest_dir);
    let index = scan(&root, &config.marker)?;
    let mut set = DeclarationSet::new(extract(&index));
    let mut sources = index.files().to_vec();
    tracing::debug!(dir = %root.dir.display(), services = set.len(), "collected local services");

    for path in config.reference_paths(manifest_dir) {
        let manifest = LibraryManifest::load(&path)?;
        let total = manifest.declarations.len();
        let dropped = set.merge(manifest.declarations);
        tracing::debug!(
            manifest = %path.display(),
            library = %manifest.crate_name,
            services = total - dropped,
            "merged library manifest"
        );
        sources.push(path);
    }
    Ok((set, sources))
}

pub fn synthesize(set: &DeclarationSet, empty: EmptySegment) -> Result<GeneratedUnit> {
    GeneratedUnit::build(set.declarations(), empty)
}

/// Result of a complete pass.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    pub unit: GeneratedUnit,
    pub fingerprint: u64,
    /// Files the pass read, for change tracking
    pub sources: Vec<PathBuf>,
}

impl GeneratedOutput {
    pub fn to_tokens(&self) -> TokenStream {
        self.unit.to_token_stream()
    }

    /// Formatted source with the generated header and fingerprint line.
    pub fn render(&self) -> Result<String> {
        let tokens = self.to_tokens();
        let file: syn::File = syn::parse2(tokens).map_err(|e| GenerateError::InvalidTokens {
            what: "generated unit",
            text: e.to_string(),
        })?;
        Ok(format!(
            "{GENERATED_HEADER}\n{}\n\n{}",
            fingerprint_line(self.fingerprint),
            prettyplease::unparse(&file)
        ))
    }
}

/// The second line of rendered output.
pub fn fingerprint_line(fingerprint: u64) -> String {
    format!("// fingerprint: {fingerprint:016x}")
}

/// Run a whole pass for the crate at `manifest_dir`.
pub fn generate(config: &GeneratorConfig, manifest_dir: &Path) -> Result<GeneratedOutput> {
    let (set, sources) = collect_declarations(config, manifest_dir)?;
    let fingerprint = set.fingerprint(config.empty_segment);
    let unit = synthesize(&set, config.empty_segment)?;
    tracing::debug!(
        services = set.len(),
        routes = unit.routes().count(),
        fingerprint = %format!("{fingerprint:016x}"),
        "generated unit"
    );
    Ok(GeneratedOutput {
        unit,
        fingerprint,
        sources,
    })
}
