//! The attribute vocabulary services are configured with.
//!
//! Attributes are recognised by their last path segment, written either bare
//! (`#[get]`) or through the facade crate (`#[fast_service::get]`). Anything
//! else is not ours and is carried through untouched.

use fast_service_core::HttpMethod;
use proc_macro2::TokenTree;
use quote::ToTokens;
use syn::parse::{ParseStream, Parser};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Path, Token, Type};

/// Crate name vocabulary attributes may be qualified with.
pub const CRATE_NAMESPACE: &str = "fast_service";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// `#[route("/x")]`
    Route,
    /// `#[tags("label")]`
    Tags,
    /// `#[filter(..)]` or `#[endpoint_filter(..)]`
    Filter,
    /// `#[get]`, `#[post("/x")]`, ...
    Verb(HttpMethod),
    /// `#[ignore_route]`
    IgnoreRoute,
}

impl Vocabulary {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "route" => Some(Self::Route),
            "tags" => Some(Self::Tags),
            "filter" | "endpoint_filter" => Some(Self::Filter),
            "ignore_route" => Some(Self::IgnoreRoute),
            other => HttpMethod::from_attribute(other).map(Self::Verb),
        }
    }

    /// Classify an attribute, `None` when it is not part of the vocabulary.
    pub fn classify(attr: &Attribute) -> Option<Self> {
        let path = attr.path();
        let segments = &path.segments;
        let qualified = match segments.len() {
            1 => path.leading_colon.is_none(),
            2 => segments[0].ident == CRATE_NAMESPACE,
            _ => false,
        };
        if !qualified {
            return None;
        }
        let last = segments.last()?;
        Self::from_name(&last.ident.to_string())
    }
}

/// The single string argument of `#[name("value")]` or `#[name = "value"]`.
pub fn string_arg(attr: &Attribute) -> Option<String> {
    match &attr.meta {
        Meta::List(_) => attr.parse_args::<LitStr>().ok().map(|lit| lit.value()),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Some(lit.value()),
            _ => None,
        },
        Meta::Path(_) => None,
    }
}

/// Type arguments of a filter attribute, in written order.
///
/// Arguments that are not plain type paths (string literals, expressions,
/// qualified-self paths) are skipped with a warning.
pub fn filter_types(attr: &Attribute) -> Vec<Type> {
    let Meta::List(list) = &attr.meta else {
        return Vec::new();
    };
    let parser = |input: ParseStream| {
        let mut types = Vec::new();
        while !input.is_empty() {
            let fork = input.fork();
            let parsed = fork.parse::<Type>();
            let at_boundary = fork.is_empty() || fork.peek(Token![,]);
            match parsed {
                Ok(Type::Path(ty)) if ty.qself.is_none() && at_boundary => {
                    syn::parse::discouraged::Speculative::advance_to(input, &fork);
                    types.push(Type::Path(ty));
                }
                _ => {
                    let skipped = skip_argument(input)?;
                    tracing::warn!(argument = %skipped, "skipping filter argument that is not a type");
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(types)
    };
    parser.parse2(list.tokens.clone()).unwrap_or_default()
}

/// Consume tokens up to the next top-level comma and return them as text.
fn skip_argument(input: ParseStream) -> syn::Result<String> {
    let mut skipped = proc_macro2::TokenStream::new();
    let mut angle_depth = 0usize;
    while !input.is_empty() {
        if angle_depth == 0 && input.peek(Token![,]) {
            break;
        }
        let tree: TokenTree = input.parse()?;
        if let TokenTree::Punct(punct) = &tree {
            match punct.as_char() {
                '<' => angle_depth += 1,
                '>' => angle_depth = angle_depth.saturating_sub(1),
                _ => {}
            }
        }
        tree.to_tokens(&mut skipped);
    }
    Ok(skipped.to_string())
}

/// Whether `#[derive(..)]` among `attrs` names the marker trait.
pub fn derives_marker(attrs: &[Attribute], marker: &str) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .filter_map(|attr| {
            attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()
        })
        .flatten()
        .any(|path| path.segments.last().is_some_and(|s| s.ident == marker))
}

/// Whether an attribute is `#[cfg(test)]`.
pub fn is_cfg_test(attr: &Attribute) -> bool {
    if !attr.path().is_ident("cfg") {
        return false;
    }
    let Meta::List(list) = &attr.meta else {
        return false;
    };
    let mut tokens = list.tokens.clone().into_iter();
    matches!(
        (tokens.next(), tokens.next()),
        (Some(TokenTree::Ident(ident)), None) if ident == "test"
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn attr(src: &str) -> Attribute {
        let item: syn::ItemStruct = syn::parse_str(&format!("{src} struct S;")).unwrap();
        item.attrs.into_iter().next().unwrap()
    }

    fn filter_names(src: &str) -> Vec<String> {
        filter_types(&attr(src))
            .iter()
            .map(crate::resolve::compact_tokens)
            .collect()
    }

    #[rstest]
    #[case("#[route(\"/x\")]", Some(Vocabulary::Route))]
    #[case("#[fast_service::route(\"/x\")]", Some(Vocabulary::Route))]
    #[case("#[tags(\"a\")]", Some(Vocabulary::Tags))]
    #[case("#[filter(A)]", Some(Vocabulary::Filter))]
    #[case("#[endpoint_filter(A)]", Some(Vocabulary::Filter))]
    #[case("#[fast_service::endpoint_filter(A)]", Some(Vocabulary::Filter))]
    #[case("#[get]", Some(Vocabulary::Verb(HttpMethod::Get)))]
    #[case("#[post(\"/x\")]", Some(Vocabulary::Verb(HttpMethod::Post)))]
    #[case("#[put]", Some(Vocabulary::Verb(HttpMethod::Put)))]
    #[case("#[delete]", Some(Vocabulary::Verb(HttpMethod::Delete)))]
    #[case("#[ignore_route]", Some(Vocabulary::IgnoreRoute))]
    #[case("#[doc = \"x\"]", None)]
    #[case("#[serde(rename = \"x\")]", None)]
    #[case("#[other::get]", None)]
    #[case("#[::get]", None)]
    #[case("#[a::fast_service::get]", None)]
    #[case("#[patch]", None)]
    fn test_classify(#[case] src: &str, #[case] expected: Option<Vocabulary>) {
        assert_eq!(Vocabulary::classify(&attr(src)), expected);
    }

    #[rstest]
    #[case("#[route(\"/orders\")]", Some("/orders"))]
    #[case("#[route = \"/orders\"]", Some("/orders"))]
    #[case("#[get]", None)]
    #[case("#[get(42)]", None)]
    #[case("#[tags(\"a\", \"b\")]", None)]
    fn test_string_arg(#[case] src: &str, #[case] expected: Option<&str>) {
        assert_eq!(string_arg(&attr(src)).as_deref(), expected);
    }

    #[test]
    fn test_filter_types_in_order() {
        assert_eq!(
            filter_names("#[filter(Auth, crate::filters::Audit, Wrap<Inner, u8>)]"),
            ["Auth", "crate::filters::Audit", "Wrap<Inner, u8>"]
        );
    }

    #[test]
    fn test_filter_types_skip_non_types() {
        assert_eq!(
            filter_names("#[endpoint_filter(\"Auth\", Logging, 1 + 2, <T as X>::Y, Timing,)]"),
            ["Logging", "Timing"]
        );
    }

    #[rstest]
    #[case("#[filter]")]
    #[case("#[filter = \"Auth\"]")]
    #[case("#[filter()]")]
    fn test_filter_types_empty(#[case] src: &str) {
        assert!(filter_names(src).is_empty());
    }

    #[rstest]
    #[case("#[derive(Debug, FastApi)]", true)]
    #[case("#[derive(fast_service::FastApi)]", true)]
    #[case("#[derive(Debug, Clone)]", false)]
    #[case("#[route(\"FastApi\")]", false)]
    fn test_derives_marker(#[case] src: &str, #[case] expected: bool) {
        assert_eq!(derives_marker(&[attr(src)], "FastApi"), expected);
    }

    #[rstest]
    #[case("#[cfg(test)]", true)]
    #[case("#[cfg(not(test))]", false)]
    #[case("#[cfg(feature = \"x\")]", false)]
    #[case("#[test]", false)]
    fn test_is_cfg_test(#[case] src: &str, #[case] expected: bool) {
        assert_eq!(is_cfg_test(&attr(src)), expected);
    }
}
