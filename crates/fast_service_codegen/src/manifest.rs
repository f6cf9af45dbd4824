//! Library manifests.
//!
//! A library crate cannot be scanned from its dependents, so it exports its
//! service declarations into a JSON manifest at build time. Paths recorded
//! relative to `crate` are rewritten to the library's crate name on export,
//! which makes them valid in the consuming crate.

use std::path::Path;

use fast_service_core::ServiceDeclaration;
use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryManifest {
    pub crate_name: String,
    #[serde(default)]
    pub declarations: Vec<ServiceDeclaration>,
}

impl LibraryManifest {
    /// Build the manifest of `crate_name` from its local declarations.
    pub fn export(crate_name: &str, declarations: &[ServiceDeclaration]) -> Self {
        let crate_name = crate_name.replace('-', "_");
        let declarations = declarations
            .iter()
            .map(|decl| {
                let mut decl = decl.clone();
                decl.namespace = rewrite_anchor(&decl.namespace, &crate_name);
                rewrite_all(&mut decl.filters, &crate_name);
                for method in &mut decl.methods {
                    rewrite_all(&mut method.filters, &crate_name);
                    for param in &mut method.parameters {
                        param.ty = rewrite_anchor(&param.ty, &crate_name);
                    }
                    if let Some(output) = &mut method.output {
                        *output = rewrite_anchor(output, &crate_name);
                    }
                }
                decl
            })
            .collect();
        Self {
            crate_name,
            declarations,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| GenerateError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| GenerateError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
        }
        std::fs::write(path, text).map_err(|e| GenerateError::io(path, e))
    }
}

fn rewrite_all(values: &mut [String], crate_name: &str) {
    for value in values {
        *value = rewrite_anchor(value, crate_name);
    }
}

/// Replace every `crate` path anchor in `text` by `crate_name`.
///
/// Only whole words directly followed by `::` (or ending the text, for a
/// namespace that is the crate root) are anchors.
fn rewrite_anchor(text: &str, crate_name: &str) -> String {
    const ANCHOR: &str = "crate";
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(ANCHOR) {
        let before = &rest[..pos];
        let after = &rest[pos + ANCHOR.len()..];
        let starts_word = before
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let is_anchor = starts_word
            && (after.starts_with("::") || (after.is_empty() && before.is_empty()));
        out.push_str(before);
        out.push_str(if is_anchor { crate_name } else { ANCHOR });
        rest = after;
    }
    out.push_str(rest);
    out
}
