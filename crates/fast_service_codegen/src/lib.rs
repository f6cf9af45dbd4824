//! Declaration scanning and code synthesis for fast_service.
//!
//! The pipeline runs once per build pass and keeps no state between passes:
//!
//! 1. [`scanner`] parses the configured source tree and keeps the types that
//!    carry the service marker;
//! 2. [`extractor`] turns each of them into a [`ServiceDeclaration`];
//! 3. [`pipeline`] merges referenced library [`manifest`]s and de-duplicates;
//! 4. [`synth`] builds the output tree and serializes it to tokens.
//!
//! [`ServiceDeclaration`]: fast_service_core::ServiceDeclaration

pub mod attrs;
pub mod config;
pub mod error;
pub mod extractor;
pub mod file_utils;
pub mod manifest;
pub mod pipeline;
pub mod resolve;
pub mod scanner;
pub mod synth;

#[cfg(test)]
mod test_helpers;

pub use config::GeneratorConfig;
pub use error::{GenerateError, Result};
pub use pipeline::{DeclarationSet, GeneratedOutput, collect_declarations, generate, synthesize};
pub use synth::GeneratedUnit;
