#![cfg(test)]
//! Shared test utilities for fast_service_codegen tests.
//!
//! - [`parse_file!`] - parse a whole source file from a string
//! - [`test_impl!`] - parse the first `impl` block of a source string
//! - [`create_test_temp_dir`] / [`write_file`] - scratch service trees on disk

use std::path::Path;

/// Parse a source file for testing
#[macro_export]
macro_rules! parse_file {
    ($code:expr) => {{
        let file: syn::File = syn::parse_str($code).expect("parse failed");
        file
    }};
}

/// Parse the first impl block of a source string for testing
#[macro_export]
macro_rules! test_impl {
    ($code:expr) => {{
        let file: syn::File = syn::parse_str($code).expect("parse failed");
        file.items
            .into_iter()
            .find_map(|item| {
                if let syn::Item::Impl(i) = item {
                    Some(i)
                } else {
                    None
                }
            })
            .expect("no impl found")
    }};
}

/// Create temp directory for tests
pub fn create_test_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("Failed to create temp dir")
}

/// Write `content` to `base/relative`, creating parent folders.
pub fn write_file(base: &Path, relative: &str, content: &str) {
    let path = base.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create dir");
    }
    std::fs::write(&path, content).expect("Failed to write file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_impl_macro() {
        let i = test_impl!("struct A; impl A { fn f(&self) {} }");
        assert_eq!(i.items.len(), 1);
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = create_test_temp_dir();
        write_file(dir.path(), "a/b/c.rs", "pub struct C;");
        let text = std::fs::read_to_string(dir.path().join("a/b/c.rs")).unwrap();
        assert_eq!(text, "pub struct C;");
    }
}
