//! Arguments of `fast_service!`.
//!
//! ```ignore
//! fast_service!();
//! fast_service!("api");
//! fast_service!(
//!     dir = "services",
//!     module = "crate::services",
//!     references = ["../billing/fast_service.json"],
//!     marker = "FastApi",
//!     empty_segment = "method_name",
//! );
//! ```

use std::path::PathBuf;

use fast_service_codegen::GeneratorConfig;
use fast_service_core::EmptySegment;
use syn::parse::{Parse, ParseStream};
use syn::{LitStr, Token};

use crate::error::err_spanned;
use crate::parse_utils::{parse_bracketed_list, parse_key_value_list};

/// Parsed macro input, already folded into a generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArgs {
    pub config: GeneratorConfig,
}

impl Parse for ServiceArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = GeneratorConfig::default();

        if input.peek(LitStr) {
            config.dir = input.parse::<LitStr>()?.value();
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            } else if !input.is_empty() {
                return Err(input.error("expected `,` after the folder name"));
            }
        }

        let mut seen = Vec::new();
        parse_key_value_list(input, |key, input| {
            let name = key.to_string();
            if seen.contains(&name) {
                return Err(err_spanned(&key, format!("duplicate argument `{name}`")));
            }
            input.parse::<Token![=]>()?;
            match name.as_str() {
                "dir" => config.dir = input.parse::<LitStr>()?.value(),
                "module" => {
                    let lit: LitStr = input.parse()?;
                    if syn::parse_str::<syn::Path>(&lit.value()).is_err() {
                        return Err(err_spanned(&lit, "`module` must be a module path like `crate::services`"));
                    }
                    config.module = Some(lit.value());
                }
                "references" => {
                    let paths = parse_bracketed_list(input, |input| input.parse::<LitStr>())?;
                    config.references = paths.iter().map(|lit| PathBuf::from(lit.value())).collect();
                }
                "marker" => {
                    let lit: LitStr = input.parse()?;
                    if syn::parse_str::<syn::Ident>(&lit.value()).is_err() {
                        return Err(err_spanned(&lit, "`marker` must be a trait name"));
                    }
                    config.marker = lit.value();
                }
                "empty_segment" => {
                    let lit: LitStr = input.parse()?;
                    config.empty_segment = lit
                        .value()
                        .parse::<EmptySegment>()
                        .map_err(|message| err_spanned(&lit, message))?;
                }
                _ => {
                    return Err(err_spanned(
                        &key,
                        format!(
                            "unknown argument `{name}`, expected one of `dir`, `module`, `references`, `marker`, `empty_segment`"
                        ),
                    ));
                }
            }
            seen.push(name);
            Ok(())
        })?;

        Ok(Self { config })
    }
}
