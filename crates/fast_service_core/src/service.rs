//! Declaration records extracted from service types.
//!
//! A [`ServiceDeclaration`] is built once per build pass from a type carrying
//! the service marker and is immutable afterwards. Types are stored as token
//! strings so the records can be written to and read from library manifests.

use serde::{Deserialize, Serialize};

use crate::route::HttpMethod;

/// Class name suffix dropped when deriving the default prefix and identifier.
pub const SERVICE_SUFFIX: &str = "Service";

/// Group prefix used when a service has no explicit `#[route]`.
pub const DEFAULT_ROUTE_PREFIX: &str = "/api/";

/// Object lifetime the dependency-injection collaborator registers services with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLifetime {
    Singleton,
    #[default]
    Scoped,
    Transient,
}

impl ServiceLifetime {
    pub const ALL: [Self; 3] = [Self::Singleton, Self::Scoped, Self::Transient];
}

/// One service type and everything the synthesizer needs to route it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDeclaration {
    /// Module path of the type (`crate::services::orders`), empty at an unnamed root
    pub namespace: String,
    /// Type name as declared
    pub class_name: String,
    /// Explicit group prefix from `#[route]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Tag label from `#[tags]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Qualified filter types attached to the whole group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    /// Routable methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,
}

impl ServiceDeclaration {
    pub fn new(namespace: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
            route: None,
            tag: None,
            filters: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// De-duplication key.
    pub fn identity(&self) -> (&str, &str) {
        (&self.namespace, &self.class_name)
    }

    /// Path the generated code names the type by.
    pub fn qualified_path(&self) -> String {
        if self.namespace.is_empty() {
            self.class_name.clone()
        } else {
            format!("{}::{}", self.namespace, self.class_name)
        }
    }

    /// Class name without its trailing [`SERVICE_SUFFIX`].
    pub fn stripped_name(&self) -> &str {
        strip_service_suffix(&self.class_name)
    }

    /// Group prefix: the explicit route verbatim, or `/api/` + stripped name.
    pub fn effective_prefix(&self) -> String {
        match self.route.as_deref().filter(|route| !route.is_empty()) {
            Some(route) => route.to_string(),
            None => format!("{DEFAULT_ROUTE_PREFIX}{}", self.stripped_name()),
        }
    }

    /// Base of the identifier the generated code binds the group to.
    ///
    /// `UserProfileService` becomes `user_profile`. A class named exactly
    /// `Service` keeps its full name.
    pub fn instance_base(&self) -> String {
        let stripped = self.stripped_name();
        if stripped.is_empty() {
            to_snake_case(&self.class_name)
        } else {
            to_snake_case(stripped)
        }
    }

    /// Methods that produce an endpoint.
    pub fn routed_methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.methods.iter().filter(|method| !method.ignored)
    }
}

/// Explicit verb attribute on a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerbOverride {
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl VerbOverride {
    pub fn new(method: HttpMethod, path: Option<String>) -> Self {
        Self { method, path }
    }
}

/// How a method takes `self`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    #[default]
    Ref,
    RefMut,
    Value,
    MutValue,
}

impl Receiver {
    /// Whether the forwarding handler has to bind the instance as `mut`.
    pub fn needs_mut_binding(self) -> bool {
        matches!(self, Self::RefMut | Self::MutValue)
    }
}

/// A declared method parameter with its qualified type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// One public instance method of a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<VerbOverride>,
    /// Method-level `#[route]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Attributes re-emitted verbatim on the generated handler
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub receiver: Receiver,
    /// Qualified return type, `None` for `()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verb: None,
            route: None,
            parameters: Vec::new(),
            attributes: Vec::new(),
            filters: Vec::new(),
            ignored: false,
            is_async: false,
            receiver: Receiver::Ref,
            output: None,
        }
    }
}

/// Drop one literal trailing `Service` from a class name.
pub fn strip_service_suffix(name: &str) -> &str {
    name.strip_suffix(SERVICE_SUFFIX).unwrap_or(name)
}

/// Convert a type name to a snake_case identifier (`HTTPClient` -> `http_client`).
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p == '_' => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
