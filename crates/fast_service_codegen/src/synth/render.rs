use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, format_ident, quote};

use super::unit::{EndpointMapping, GeneratedUnit, GroupMapping, HandlerFn, Registration};

impl ToTokens for GeneratedUnit {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let registrations = &self.registrations;
        let groups = &self.groups;
        tokens.extend(quote! {
            /// Register every discovered service with the given lifetime.
            #[allow(unused_variables)]
            pub fn register_services<C>(
                services: &mut C,
                lifetime: ::fast_service::ServiceLifetime,
            ) -> &mut C
            where
                C: ::fast_service::ServiceCollection + ?Sized,
            {
                #(#registrations)*
                services
            }

            /// Map one route group per discovered service.
            pub fn map_routes<A>(app: &mut A) -> &mut A
            where
                A: ::fast_service::EndpointRouteBuilder + ?Sized,
            {
                #[allow(unused_imports)]
                use ::fast_service::{EndpointBuilder as _, RouteGroup as _};
                #(#groups)*
                app
            }
        });
    }
}

impl ToTokens for Registration {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let service = &self.service;
        tokens.extend(quote! {
            match lifetime {
                ::fast_service::ServiceLifetime::Singleton => {
                    services.add_singleton::<#service>();
                }
                ::fast_service::ServiceLifetime::Scoped => {
                    services.add_scoped::<#service>();
                }
                ::fast_service::ServiceLifetime::Transient => {
                    services.add_transient::<#service>();
                }
            }
        });
    }
}

impl ToTokens for GroupMapping {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let binding = &self.binding;
        let prefix = &self.prefix;
        let filters = &self.filters;
        let tag = self.tag.iter();
        let group = quote! {
            app.map_group(#prefix)
                #(.add_endpoint_filter::<#filters>())*
                #(.with_tags(#tag))*
        };
        if self.endpoints.is_empty() {
            tokens.extend(quote! {
                {
                    let _ = #group;
                }
            });
            return;
        }
        let endpoints = self
            .endpoints
            .iter()
            .map(|endpoint| endpoint_tokens(binding, endpoint));
        let allow = self
            .endpoints
            .iter()
            .any(|endpoint| !endpoint.cfgs.is_empty())
            .then(|| quote!(#[allow(unused_mut, unused_variables)]));
        tokens.extend(quote! {
            {
                #allow
                let mut #binding = #group;
                #(#endpoints)*
            }
        });
    }
}

fn endpoint_tokens(binding: &Ident, endpoint: &EndpointMapping) -> TokenStream {
    let handler = &endpoint.handler;
    let handler_name = &handler.name;
    let map = format_ident!("map_{}", endpoint.route.method.as_lower());
    let path = &endpoint.route.path;
    let filters = &endpoint.filters;
    let cfgs = &endpoint.cfgs;
    quote! {
        #(#cfgs)*
        {
            #handler
            #binding.#map(#path, #handler_name)
                #(.add_endpoint_filter::<#filters>())*;
        }
    }
}

impl ToTokens for HandlerFn {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let Self {
            attrs,
            name,
            is_async,
            receiver,
            mut_receiver,
            service,
            method,
            params,
            output,
        } = self;
        let asyncness = is_async.then(|| quote!(async));
        let await_call = is_async.then(|| quote!(.await));
        let mutability = mut_receiver.then(|| quote!(mut));
        let param_names = params.iter().map(|(ident, _)| ident);
        let param_types = params.iter().map(|(_, ty)| ty);
        let arguments = param_names.clone();
        let output = output.as_ref().map(|ty| quote!(-> #ty));
        tokens.extend(quote! {
            #(#attrs)*
            #asyncness fn #name(#mutability #receiver: #service, #(#param_names: #param_types),*) #output {
                #receiver.#method(#(#arguments),*) #await_call
            }
        });
    }
}
