//! Metadata extraction.
//!
//! Turns each marked type of a [`SourceIndex`] into a [`ServiceDeclaration`].
//! Extraction never fails: absent attributes fall back to their defaults and
//! methods that cannot be forwarded by a plain handler are left out.

use fast_service_core::{
    MethodDeclaration, Parameter, Receiver, ServiceDeclaration, VerbOverride,
};
use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{Attribute, FnArg, ImplItemFn, Pat, Path, ReturnType, Type, Visibility};

use crate::attrs::{Vocabulary, filter_types, string_arg};
use crate::resolve::{ImportScope, compact_tokens};
use crate::scanner::{SourceIndex, TypeEntry};

/// Extract a declaration for every service in `index`.
pub fn extract(index: &SourceIndex) -> Vec<ServiceDeclaration> {
    index
        .services()
        .into_iter()
        .map(|entry| extract_service(index, entry))
        .collect()
}

fn extract_service(index: &SourceIndex, entry: &TypeEntry) -> ServiceDeclaration {
    let scope = index.scope(entry.scope);
    let mut decl = ServiceDeclaration::new(&entry.namespace, &entry.name);

    for attr in &entry.attrs {
        match Vocabulary::classify(attr) {
            Some(Vocabulary::Route) if decl.route.is_none() => decl.route = string_arg(attr),
            Some(Vocabulary::Tags) if decl.tag.is_none() => {
                decl.tag = string_arg(attr).filter(|tag| !tag.is_empty());
            }
            Some(Vocabulary::Filter) => decl.filters.extend(qualified_filters(scope, attr)),
            _ => {}
        }
    }

    let key = entry.key();
    let self_path = syn::parse_str::<Path>(&key).ok();
    for method in index.methods(&key) {
        if !is_ordinary(&method.item) {
            tracing::trace!(service = %key, method = %method.item.sig.ident, "skipping non-routable method");
            continue;
        }
        let method_scope = index.scope(method.scope);
        decl.methods
            .push(extract_method(method_scope, self_path.as_ref(), &method.item));
    }

    tracing::debug!(
        service = %key,
        methods = decl.methods.len(),
        filters = decl.filters.len(),
        "extracted service declaration"
    );
    decl
}

fn extract_method(scope: &ImportScope, self_path: Option<&Path>, item: &ImplItemFn) -> MethodDeclaration {
    let sig = &item.sig;
    let mut method = MethodDeclaration::new(sig.ident.unraw().to_string());
    method.is_async = sig.asyncness.is_some();

    for attr in &item.attrs {
        match Vocabulary::classify(attr) {
            Some(Vocabulary::Verb(http_method)) => {
                if method.verb.is_none() {
                    method.verb = Some(VerbOverride::new(http_method, string_arg(attr)));
                }
            }
            Some(Vocabulary::Route) => {
                if method.route.is_none() {
                    method.route = string_arg(attr);
                }
            }
            Some(Vocabulary::Filter) => method.filters.extend(qualified_filters(scope, attr)),
            Some(Vocabulary::IgnoreRoute) => method.ignored = true,
            // a tag is a group property
            Some(Vocabulary::Tags) => {}
            None => method.attributes.push(attr.to_token_stream().to_string()),
        }
    }

    for (i, input) in sig.inputs.iter().enumerate() {
        match input {
            FnArg::Receiver(receiver) => {
                method.receiver = match (receiver.reference.is_some(), receiver.mutability.is_some()) {
                    (true, false) => Receiver::Ref,
                    (true, true) => Receiver::RefMut,
                    (false, false) => Receiver::Value,
                    (false, true) => Receiver::MutValue,
                };
            }
            FnArg::Typed(typed) => {
                let name = match typed.pat.as_ref() {
                    Pat::Ident(pat) => pat.ident.unraw().to_string(),
                    _ => format!("arg{i}"),
                };
                let ty = scope.qualify_type(&typed.ty, self_path);
                method.parameters.push(Parameter::new(name, compact_tokens(&ty)));
            }
        }
    }

    if let ReturnType::Type(_, ty) = &sig.output {
        let ty = scope.qualify_type(ty, self_path);
        method.output = Some(compact_tokens(&ty));
    }
    method
}

fn qualified_filters(scope: &ImportScope, attr: &Attribute) -> Vec<String> {
    filter_types(attr)
        .iter()
        .map(|ty| compact_tokens(&scope.qualify_type(ty, None)))
        .collect()
}

/// Public, takes a plain `self` receiver, and has a signature a generated
/// handler can forward to.
fn is_ordinary(item: &ImplItemFn) -> bool {
    let sig = &item.sig;
    let plain_receiver = sig
        .receiver()
        .is_some_and(|receiver| receiver.colon_token.is_none());
    let impl_trait_arg = sig.inputs.iter().any(|input| match input {
        FnArg::Typed(typed) => mentions_impl_trait(typed.ty.to_token_stream()),
        FnArg::Receiver(_) => false,
    });
    let borrowed_output = match &sig.output {
        ReturnType::Type(_, ty) => borrows(ty),
        ReturnType::Default => false,
    };
    matches!(item.vis, Visibility::Public(_))
        && plain_receiver
        && sig.generics.params.is_empty()
        && sig.constness.is_none()
        && sig.unsafety.is_none()
        && sig.abi.is_none()
        && sig.variadic.is_none()
        && !impl_trait_arg
        && !borrowed_output
}

fn mentions_impl_trait(tokens: TokenStream) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => ident == "impl",
        TokenTree::Group(group) => mentions_impl_trait(group.stream()),
        _ => false,
    })
}

/// Whether a return type holds a non-`'static` borrow, which a handler that
/// owns the service instance could not return.
fn borrows(ty: &Type) -> bool {
    fn walk(tokens: TokenStream) -> bool {
        let trees: Vec<TokenTree> = tokens.into_iter().collect();
        for (i, tree) in trees.iter().enumerate() {
            let next_is_static = || {
                matches!(
                    (trees.get(i + 1), trees.get(i + 2)),
                    (Some(TokenTree::Punct(p)), Some(TokenTree::Ident(ident)))
                        if p.as_char() == '\'' && ident == "static"
                )
            };
            match tree {
                TokenTree::Punct(p) if p.as_char() == '&' && !next_is_static() => return true,
                TokenTree::Punct(p) if p.as_char() == '\'' => {
                    if !matches!(trees.get(i + 1), Some(TokenTree::Ident(ident)) if ident == "static") {
                        return true;
                    }
                }
                TokenTree::Group(group) if walk(group.stream()) => return true,
                _ => {}
            }
        }
        false
    }
    walk(ty.to_token_stream())
}
