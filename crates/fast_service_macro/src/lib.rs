//! Procedural macros for fast_service.
//!
//! - [`fast_service!`](macro@fast_service) scans a source folder and expands
//!   to `register_services` and `map_routes`;
//! - [`FastApi`](derive@FastApi) marks a type as a service;
//! - the configuration attributes ([`route`](macro@route),
//!   [`tags`](macro@tags), [`filter`](macro@filter), the verbs, ...) are read
//!   by the scan and validated where they are written.

use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

mod args;
mod attr_impl;
mod error;
mod expand;
mod parse_utils;

/// Generate the registration and mapping routines for every service under
/// `src/<dir>`.
///
/// ```ignore
/// mod services;
///
/// fast_service::fast_service!(dir = "services");
///
/// fn main() {
///     let mut container = Container::default();
///     register_services(&mut container, ServiceLifetime::Scoped);
///     let mut app = App::default();
///     map_routes(&mut app);
/// }
/// ```
///
/// Arguments, all optional: `dir` (or a bare string), `module`,
/// `references`, `marker`, `empty_segment`.
#[proc_macro]
pub fn fast_service(input: TokenStream) -> TokenStream {
    match expand::expand_fast_service(input.into()) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Mark a type as a service.
#[proc_macro_derive(FastApi)]
pub fn derive_fast_api(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::fast_service::FastApi for #name #ty_generics #where_clause {}
    }
    .into()
}

fn attribute(name: &str, attr: TokenStream, item: TokenStream) -> TokenStream {
    match attr_impl::process_attribute(name, attr.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Group prefix on a service type, or a path override on a method.
///
/// ```ignore
/// #[route("/orders")]
/// #[derive(FastApi)]
/// pub struct OrderService;
/// ```
#[proc_macro_attribute]
pub fn route(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("route", attr, item)
}

/// Tag label applied to a service's route group.
#[proc_macro_attribute]
pub fn tags(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("tags", attr, item)
}

/// Endpoint filters, attached in the order written.
#[proc_macro_attribute]
pub fn filter(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("filter", attr, item)
}

/// Long spelling of [`filter`](macro@filter).
#[proc_macro_attribute]
pub fn endpoint_filter(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("endpoint_filter", attr, item)
}

/// Map a method as GET, optionally at an explicit path.
#[proc_macro_attribute]
pub fn get(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("get", attr, item)
}

/// Map a method as POST, optionally at an explicit path.
#[proc_macro_attribute]
pub fn post(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("post", attr, item)
}

/// Map a method as PUT, optionally at an explicit path.
#[proc_macro_attribute]
pub fn put(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("put", attr, item)
}

/// Map a method as DELETE, optionally at an explicit path.
#[proc_macro_attribute]
pub fn delete(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("delete", attr, item)
}

/// Keep a public method out of the route table.
#[proc_macro_attribute]
pub fn ignore_route(attr: TokenStream, item: TokenStream) -> TokenStream {
    attribute("ignore_route", attr, item)
}
