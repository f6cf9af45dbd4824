use std::collections::BTreeMap;

use fast_service_core::{
    EmptySegment, RouteDescriptor, ServiceDeclaration, infer_route,
};
use syn::parse::Parser;
use syn::{Attribute, Ident, Path, Type};

use crate::error::{GenerateError, Result};

/// Identifiers the generated code cannot bind.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Output of one build pass: a registration routine and a mapping routine.
#[derive(Debug, Clone, Default)]
pub struct GeneratedUnit {
    pub registrations: Vec<Registration>,
    pub groups: Vec<GroupMapping>,
}

/// One `add_*::<Service>()` dispatch on the requested lifetime.
#[derive(Debug, Clone)]
pub struct Registration {
    pub service: Path,
}

/// The route group of one service and its endpoints.
#[derive(Debug, Clone)]
pub struct GroupMapping {
    pub binding: Ident,
    pub prefix: String,
    pub filters: Vec<Type>,
    pub tag: Option<String>,
    pub endpoints: Vec<EndpointMapping>,
}

#[derive(Debug, Clone)]
pub struct EndpointMapping {
    /// `#[cfg]` attributes of the method, gating the whole endpoint
    pub cfgs: Vec<Attribute>,
    pub route: RouteDescriptor,
    pub handler: HandlerFn,
    pub filters: Vec<Type>,
}

/// Function forwarding a request to a service method.
///
/// It takes the service instance first and then the method's own parameters
/// in declaration order.
#[derive(Debug, Clone)]
pub struct HandlerFn {
    pub attrs: Vec<Attribute>,
    pub name: Ident,
    pub is_async: bool,
    pub receiver: Ident,
    pub mut_receiver: bool,
    pub service: Path,
    pub method: Ident,
    pub params: Vec<(Ident, Type)>,
    pub output: Option<Type>,
}

impl GeneratedUnit {
    /// Build the unit for `declarations`, in the given order.
    ///
    /// Fails only when two declarations derive the same instance identifier,
    /// or when a declaration read from a manifest holds malformed tokens.
    pub fn build(declarations: &[ServiceDeclaration], empty: EmptySegment) -> Result<Self> {
        let mut taken: BTreeMap<String, String> = BTreeMap::new();
        let mut unit = Self::default();
        for decl in declarations {
            let identifier = instance_identifier(decl);
            if let Some(first) = taken.get(&identifier) {
                return Err(GenerateError::InstanceCollision {
                    identifier,
                    first: first.clone(),
                    second: decl.qualified_path(),
                });
            }
            taken.insert(identifier.clone(), decl.qualified_path());

            let service = parse_path(&decl.qualified_path())?;
            unit.registrations.push(Registration {
                service: service.clone(),
            });
            unit.groups
                .push(build_group(decl, &identifier, &service, empty)?);
        }
        Ok(unit)
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Every mapped route as (group prefix, route), in emission order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &RouteDescriptor)> {
        self.groups.iter().flat_map(|group| {
            group
                .endpoints
                .iter()
                .map(move |endpoint| (group.prefix.as_str(), &endpoint.route))
        })
    }
}

fn build_group(
    decl: &ServiceDeclaration,
    identifier: &str,
    service: &Path,
    empty: EmptySegment,
) -> Result<GroupMapping> {
    let prefix = decl.effective_prefix();
    let mut endpoints = Vec::new();
    for method in decl.routed_methods() {
        let route = infer_route(method, empty);
        tracing::trace!(service = %decl.class_name, method = %method.name, %prefix, %route, "inferred route");

        let mut params = Vec::with_capacity(method.parameters.len());
        for param in &method.parameters {
            params.push((parse_ident(&param.name)?, parse_type(&param.ty)?));
        }
        let mut receiver = identifier.to_string();
        while method.parameters.iter().any(|p| p.name == receiver) {
            receiver.push_str("_service");
        }
        let mut attrs = Vec::new();
        for attr in &method.attributes {
            attrs.extend(parse_attributes(attr)?);
        }
        let (cfgs, attrs): (Vec<_>, Vec<_>) = attrs
            .into_iter()
            .partition(|attr| attr.path().is_ident("cfg"));

        endpoints.push(EndpointMapping {
            cfgs,
            route,
            handler: HandlerFn {
                attrs,
                name: parse_ident(&format!("handle_{}", method.name))?,
                is_async: method.is_async,
                receiver: parse_ident(&receiver)?,
                mut_receiver: method.receiver.needs_mut_binding(),
                service: service.clone(),
                method: parse_ident(&method.name)?,
                params,
                output: method.output.as_deref().map(parse_type).transpose()?,
            },
            filters: parse_types(&method.filters)?,
        });
    }
    Ok(GroupMapping {
        binding: parse_ident(identifier)?,
        prefix,
        filters: parse_types(&decl.filters)?,
        tag: decl.tag.clone().filter(|tag| !tag.is_empty()),
        endpoints,
    })
}

/// Identifier the generated code uses for `decl`: snake_case of the class
/// name without its `Service` suffix, with a trailing `_` for keywords.
pub fn instance_identifier(decl: &ServiceDeclaration) -> String {
    let mut identifier = decl.instance_base();
    if KEYWORDS.contains(&identifier.as_str()) {
        identifier.push('_');
    }
    identifier
}

fn invalid(what: &'static str, text: &str) -> GenerateError {
    GenerateError::InvalidTokens {
        what,
        text: text.to_string(),
    }
}

/// Parse an identifier, falling back to its raw form for keywords.
fn parse_ident(name: &str) -> Result<Ident> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{name}")))
        .map_err(|_| invalid("identifier", name))
}

fn parse_path(text: &str) -> Result<Path> {
    syn::parse_str(text).map_err(|_| invalid("type path", text))
}

fn parse_type(text: &str) -> Result<Type> {
    syn::parse_str(text).map_err(|_| invalid("type", text))
}

fn parse_types(texts: &[String]) -> Result<Vec<Type>> {
    texts.iter().map(|text| parse_type(text)).collect()
}

fn parse_attributes(text: &str) -> Result<Vec<Attribute>> {
    Attribute::parse_outer
        .parse_str(text)
        .map_err(|_| invalid("attribute", text))
}
