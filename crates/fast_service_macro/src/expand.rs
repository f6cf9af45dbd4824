//! Expansion of `fast_service!`.

use std::path::{Path, PathBuf};

use fast_service_codegen::pipeline::GeneratedOutput;
use proc_macro2::TokenStream;
use quote::quote;

use crate::args::ServiceArgs;
use crate::error::{MacroResult, err_call_site};

/// Manifest directory of the crate being compiled.
pub fn manifest_dir() -> MacroResult<PathBuf> {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .map_err(|_| err_call_site("fast_service!: CARGO_MANIFEST_DIR is not set, the macro must be expanded by cargo"))
}

pub fn expand_fast_service(input: TokenStream) -> MacroResult<TokenStream> {
    let args: ServiceArgs = syn::parse2(input)?;
    let manifest_dir = manifest_dir()?;
    expand_with(&args, &manifest_dir)
}

pub fn expand_with(args: &ServiceArgs, manifest_dir: &Path) -> MacroResult<TokenStream> {
    let output = fast_service_codegen::generate(&args.config, manifest_dir)
        .map_err(|e| err_call_site(format!("fast_service!: {e}")))?;
    Ok(emit(&output))
}

/// The generated routines plus one `include_bytes!` per source read, so
/// editing a scanned file or manifest re-runs the expansion.
fn emit(output: &GeneratedOutput) -> TokenStream {
    let unit = output.to_tokens();
    let guards = output.sources.iter().map(|path| {
        let path = path.display().to_string();
        quote! {
            const _: &[u8] = include_bytes!(#path);
        }
    });
    quote! {
        #(#guards)*
        #unit
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn write(base: &Path, relative: &str, content: &str) {
        let path = base.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn args(tokens: TokenStream) -> ServiceArgs {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn test_expand_with_scanned_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/api/users.rs",
            r#"
            #[derive(FastApi)]
            pub struct UserService;
            impl UserService {
                pub fn get_all(&self) -> Vec<String> { Vec::new() }
            }
            "#,
        );

        let tokens = expand_with(&args(quote!("api")), dir.path()).unwrap();
        let file: syn::File = syn::parse2(tokens).unwrap();
        // one guard const, then the two routines
        assert_eq!(file.items.len(), 3);
        let text = quote!(#file).to_string();
        assert!(text.contains("include_bytes !"));
        assert!(text.contains("users.rs"));
        assert!(text.contains("add_scoped :: < crate :: api :: users :: UserService >"));
        assert!(text.contains("map_get (\"/all\" , handle_get_all)"));
    }

    #[test]
    fn test_generation_errors_become_compile_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_with(&args(quote!("missing")), dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("fast_service!: failed to read"));
    }

    #[test]
    fn test_collision_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "src/services/a.rs",
            "#[derive(FastApi)] pub struct UserService;",
        );
        write(
            dir.path(),
            "src/services/b.rs",
            "#[derive(FastApi)] pub struct User;",
        );
        let err = expand_with(&args(quote!()), dir.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("crate::services::a::UserService"));
        assert!(message.contains("crate::services::b::User"));
    }

    #[test]
    #[serial]
    fn test_expand_reads_manifest_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/services/mod.rs", "pub struct NotAService;");
        let previous = std::env::var("CARGO_MANIFEST_DIR").ok();
        unsafe { std::env::set_var("CARGO_MANIFEST_DIR", dir.path()) };

        let tokens = expand_fast_service(quote!()).unwrap();
        let file: syn::File = syn::parse2(tokens).unwrap();
        assert_eq!(file.items.len(), 3);

        match previous {
            Some(value) => unsafe { std::env::set_var("CARGO_MANIFEST_DIR", value) },
            None => unsafe { std::env::remove_var("CARGO_MANIFEST_DIR") },
        }
    }

    #[test]
    #[serial]
    fn test_missing_manifest_dir() {
        let previous = std::env::var("CARGO_MANIFEST_DIR").ok();
        unsafe { std::env::remove_var("CARGO_MANIFEST_DIR") };

        let err = expand_fast_service(quote!()).unwrap_err();
        assert!(err.to_string().contains("CARGO_MANIFEST_DIR is not set"));

        if let Some(value) = previous {
            unsafe { std::env::set_var("CARGO_MANIFEST_DIR", value) };
        }
    }
}
