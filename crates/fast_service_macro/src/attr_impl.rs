//! The configuration attributes.
//!
//! `#[route]`, `#[tags]`, `#[filter]`/`#[endpoint_filter]`, the verb
//! attributes and `#[ignore_route]` generate nothing themselves: the
//! `fast_service!` scan reads them from source. Expanding them only checks
//! their arguments and placement, then hands the item back untouched.

use fast_service_codegen::attrs::Vocabulary;
use proc_macro2::TokenStream;
use syn::{ImplItemFn, Item, LitStr};

use crate::error::{MacroResult, err_call_site, err_spanned};

/// What an attribute was written on.
enum Target {
    Type,
    Method,
}

fn target_of(name: &str, item: &TokenStream) -> MacroResult<Target> {
    if let Ok(item) = syn::parse2::<Item>(item.clone()) {
        match item {
            Item::Struct(_) | Item::Enum(_) => return Ok(Target::Type),
            Item::Fn(_) => return Ok(Target::Method),
            other => {
                return Err(err_spanned(
                    other,
                    format!("#[{name}] attribute: can only be applied to a service type or one of its methods"),
                ));
            }
        }
    }
    syn::parse2::<ImplItemFn>(item.clone())
        .map(|_| Target::Method)
        .map_err(|e| err_spanned(item, format!("#[{name}] attribute: {e}")))
}

/// Validate one vocabulary attribute and return `item` unchanged.
pub fn process_attribute(name: &str, attr: TokenStream, item: TokenStream) -> MacroResult<TokenStream> {
    let Some(vocabulary) = Vocabulary::from_name(name) else {
        return Err(err_call_site(format!("unknown fast_service attribute `{name}`")));
    };
    let target = target_of(name, &item)?;
    match vocabulary {
        Vocabulary::Route => {
            let path: LitStr = syn::parse2(attr)
                .map_err(|e| err_call_site(format!("#[route] attribute: expected a path string, {e}")))?;
            if matches!(target, Target::Type) && path.value().is_empty() {
                return Err(err_spanned(path, "#[route] attribute: the group prefix must not be empty"));
            }
        }
        Vocabulary::Tags => {
            if matches!(target, Target::Method) {
                return Err(err_call_site("#[tags] attribute: tags apply to the whole service, move it to the type"));
            }
            let tag: LitStr = syn::parse2(attr)
                .map_err(|e| err_call_site(format!("#[tags] attribute: expected a single label string, {e}")))?;
            if tag.value().is_empty() {
                return Err(err_spanned(tag, "#[tags] attribute: the label must not be empty"));
            }
        }
        Vocabulary::Filter => {
            if attr.is_empty() {
                return Err(err_call_site(format!("#[{name}] attribute: expected at least one filter type")));
            }
        }
        Vocabulary::Verb(method) => {
            if matches!(target, Target::Type) {
                return Err(err_call_site(format!("#[{name}] attribute: can only be applied to a method")));
            }
            if !attr.is_empty() {
                syn::parse2::<LitStr>(attr).map_err(|e| {
                    err_call_site(format!("#[{}] attribute: expected an optional path string, {e}", method.as_lower()))
                })?;
            }
        }
        Vocabulary::IgnoreRoute => {
            if matches!(target, Target::Type) {
                return Err(err_call_site("#[ignore_route] attribute: can only be applied to a method"));
            }
            if !attr.is_empty() {
                return Err(err_spanned(attr, "#[ignore_route] attribute: takes no arguments"));
            }
        }
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use rstest::rstest;

    use super::*;

    fn method() -> TokenStream {
        quote!(pub async fn get_all(&self) -> Vec<u8> { Vec::new() })
    }

    fn service() -> TokenStream {
        quote!(pub struct OrderService;)
    }

    #[rstest]
    #[case("route", quote!("/orders"), service())]
    #[case("route", quote!("custom"), method())]
    #[case("tags", quote!("Orders"), service())]
    #[case("filter", quote!(Auth, crate::filters::Audit), service())]
    #[case("endpoint_filter", quote!(Auth), method())]
    #[case("get", quote!(), method())]
    #[case("post", quote!("/{id}"), method())]
    #[case("delete", quote!(), quote!(pub fn remove(&mut self, id: u64) {}))]
    #[case("ignore_route", quote!(), method())]
    #[case("route", quote!("/enum"), quote!(pub enum Api { A }))]
    fn test_valid_attribute_returns_item(
        #[case] name: &str,
        #[case] attr: TokenStream,
        #[case] item: TokenStream,
    ) {
        let out = process_attribute(name, attr, item.clone()).unwrap();
        assert_eq!(out.to_string(), item.to_string());
    }

    #[rstest]
    #[case("route", quote!(), service(), "expected a path string")]
    #[case("route", quote!(""), service(), "must not be empty")]
    #[case("tags", quote!("a"), method(), "move it to the type")]
    #[case("tags", quote!("a", "b"), service(), "single label string")]
    #[case("tags", quote!(""), service(), "label must not be empty")]
    #[case("filter", quote!(), service(), "at least one filter type")]
    #[case("get", quote!(), service(), "can only be applied to a method")]
    #[case("put", quote!(42), method(), "optional path string")]
    #[case("ignore_route", quote!(yes), method(), "takes no arguments")]
    #[case("ignore_route", quote!(), service(), "can only be applied to a method")]
    #[case("route", quote!("/x"), quote!(pub const X: u8 = 1;), "service type or one of its methods")]
    #[case("nonsense", quote!(), service(), "unknown fast_service attribute")]
    fn test_invalid_attribute(
        #[case] name: &str,
        #[case] attr: TokenStream,
        #[case] item: TokenStream,
        #[case] message: &str,
    ) {
        let err = process_attribute(name, attr, item).unwrap_err();
        assert!(
            err.to_string().contains(message),
            "`{err}` does not mention `{message}`"
        );
    }
}
