//! HTTP verbs and the route inference engine.
//!
//! [`infer_route`] maps a [`MethodDeclaration`] to a [`RouteDescriptor`].
//! Explicit metadata always wins over the naming convention:
//!
//! 1. a verb attribute (`#[get]`, `#[post("/x")]`, ...) fixes the verb, and its
//!    path argument (or the raw method name) is used verbatim;
//! 2. a method-level `#[route("x")]` fixes the path, the verb is still inferred;
//! 3. otherwise the verb and path come from the method name prefix.
//!
//! The function is total: a name that matches no prefix is a POST.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::service::MethodDeclaration;

/// HTTP verbs a service method can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub const ALL: [Self; 4] = [Self::Get, Self::Post, Self::Put, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Lowercase name, as used by the verb attributes and the `map_*` calls.
    pub fn as_lower(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }

    /// Resolve a verb attribute name (`get`, `post`, `put`, `delete`).
    pub fn from_attribute(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_lower() == name)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an inferred route becomes when prefix and suffix stripping leave
/// nothing behind (`remove_async`, `Get`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySegment {
    /// Register at the group root: `/orders` + `/` = `/orders/`.
    #[default]
    Root,
    /// Fall back to the unstripped method name: `/orders/remove_async`.
    MethodName,
}

impl FromStr for EmptySegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" => Ok(Self::Root),
            "method_name" => Ok(Self::MethodName),
            other => Err(format!(
                "unknown empty segment policy `{other}`, expected `root` or `method_name`"
            )),
        }
    }
}

/// The (verb, path) pair a method is registered under inside its group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub method: HttpMethod,
    /// Route pattern handed to the group, never empty.
    pub path: String,
}

impl RouteDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// The path without the leading `/` that inferred routes carry.
    pub fn segment(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }

    /// The route as seen from outside: group prefix joined with the path.
    pub fn full_path(&self, prefix: &str) -> String {
        format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Method name prefixes in precedence order.
const CONVENTIONS: &[(HttpMethod, &[&str])] = &[
    (HttpMethod::Get, &["get"]),
    (HttpMethod::Delete, &["remove", "delete"]),
    (HttpMethod::Post, &["post", "create", "add", "insert"]),
    (HttpMethod::Put, &["put", "update", "modify"]),
];

const STRIPPED_SUFFIXES: &[&str] = &["async", "service"];

/// Infer the route of a method.
pub fn infer_route(method: &MethodDeclaration, empty: EmptySegment) -> RouteDescriptor {
    if let Some(verb) = &method.verb {
        let path = verb
            .path
            .as_deref()
            .filter(|path| !path.is_empty())
            .unwrap_or(&method.name);
        return RouteDescriptor::new(verb.method, path);
    }

    let (http_method, rest) = match_convention(&method.name);

    if let Some(route) = method.route.as_deref().filter(|route| !route.is_empty()) {
        return RouteDescriptor::new(http_method, route);
    }

    let segment = strip_suffixes(rest);
    let path = if segment.is_empty() {
        match empty {
            EmptySegment::Root => "/".to_string(),
            EmptySegment::MethodName => format!("/{}", method.name),
        }
    } else {
        format!("/{segment}")
    };
    RouteDescriptor::new(http_method, path)
}

/// Match the name against [`CONVENTIONS`], returning the verb and what is
/// left once the matched prefix is removed.
fn match_convention(name: &str) -> (HttpMethod, &str) {
    for (http_method, prefixes) in CONVENTIONS {
        for prefix in *prefixes {
            if let Some(rest) = strip_prefix_ignore_case(name, prefix) {
                return (*http_method, rest);
            }
        }
    }
    (HttpMethod::Post, name)
}

fn strip_suffixes(rest: &str) -> &str {
    let mut segment = rest.trim_start_matches('_');
    for suffix in STRIPPED_SUFFIXES {
        if let Some(stripped) = strip_suffix_ignore_case(segment, suffix) {
            segment = stripped;
        }
        segment = segment.trim_end_matches('_');
    }
    segment
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..split])
}
