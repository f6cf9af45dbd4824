//! Syntactic path resolution.
//!
//! The generated code lives at the macro call site, not in the module a
//! service was declared in, so every type it names has to be qualified. An
//! [`ImportScope`] records what a module brings into scope (its `use`
//! declarations and its own items) and rewrites type paths against it.
//! Glob imports are followed with [`link_globs`] when they point at another
//! scanned module. Names it knows nothing about (prelude types, primitives,
//! globs from other crates) are left as written.

use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::Span;
use quote::ToTokens;
use syn::visit_mut::{self, VisitMut};
use syn::{Ident, Item, Path, PathArguments, PathSegment, Type, UseTree};

/// Names visible in one module.
#[derive(Debug, Clone, Default)]
pub struct ImportScope {
    module: Vec<String>,
    imports: BTreeMap<String, Vec<String>>,
    locals: BTreeSet<String>,
    /// Absolute module paths of `use path::*` declarations
    globs: Vec<Vec<String>>,
}

impl ImportScope {
    /// Build the scope of the module at `module` (`crate::services`, or empty)
    /// whose body is `items`.
    pub fn new(module: &str, items: &[Item]) -> Self {
        let mut scope = Self {
            module: split_path(module),
            ..Self::default()
        };
        for item in items {
            if let Some(ident) = item_ident(item) {
                scope.locals.insert(ident.to_string());
            }
        }
        let mut raw = Vec::new();
        let mut globs = Vec::new();
        for item in items {
            if let Item::Use(item_use) = item {
                collect_use_tree(&item_use.tree, Vec::new(), &mut raw, &mut globs);
            }
        }
        for (name, path) in raw {
            let absolute = scope.absolutize_use(path);
            scope.imports.insert(name, absolute);
        }
        scope.globs = globs
            .into_iter()
            .map(|path| scope.absolutize_use(path))
            .collect();
        scope
    }

    /// Module path as a string, empty at an unnamed root.
    pub fn module(&self) -> String {
        self.module.join("::")
    }

    /// Absolute form of `path`, or `None` when its head is unknown here.
    pub fn resolve(&self, path: &Path) -> Option<Vec<String>> {
        if path.leading_colon.is_some() {
            return None;
        }
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let (head, consumed) = self.resolve_head(&segments)?;
        let mut absolute = head;
        absolute.extend(segments[consumed..].iter().cloned());
        Some(absolute)
    }

    /// Key under which a declared item is indexed: its absolute path when
    /// resolvable, its written path otherwise.
    pub fn item_key(&self, path: &Path) -> String {
        match self.resolve(path) {
            Some(absolute) => absolute.join("::"),
            None => path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect::<Vec<_>>()
                .join("::"),
        }
    }

    /// Key of an item declared in this module.
    pub fn local_key(&self, name: &str) -> String {
        if self.module.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.module())
        }
    }

    /// Every name this module declares or imports, with its absolute path.
    fn visible_names(&self) -> BTreeMap<String, Vec<String>> {
        let mut names = self.imports.clone();
        for local in &self.locals {
            let mut path = self.module.clone();
            path.push(local.clone());
            names.insert(local.clone(), path);
        }
        names
    }

    /// Qualify every path in `ty`, replacing `Self` by `self_path`.
    pub fn qualify_type(&self, ty: &Type, self_path: Option<&Path>) -> Type {
        let mut ty = ty.clone();
        let mut qualifier = Qualifier {
            scope: self,
            self_path,
        };
        qualifier.visit_type_mut(&mut ty);
        ty
    }

    /// Replacement for the leading segments of a path and how many of them it
    /// consumes.
    fn resolve_head(&self, segments: &[String]) -> Option<(Vec<String>, usize)> {
        let first = segments.first()?;
        match first.as_str() {
            "crate" => None,
            "self" => (!self.module.is_empty()).then(|| (self.module.clone(), 1)),
            "super" => {
                let depth = segments.iter().take_while(|s| *s == "super").count();
                // never climb above the crate anchor
                let keep = self.module.len().checked_sub(depth)?;
                (keep >= 1).then(|| (self.module[..keep].to_vec(), depth))
            }
            name => {
                if let Some(import) = self.imports.get(name) {
                    Some((import.clone(), 1))
                } else if self.locals.contains(name) && !self.module.is_empty() {
                    let mut path = self.module.clone();
                    path.push(name.to_string());
                    Some((path, 1))
                } else {
                    None
                }
            }
        }
    }

    /// Turn a `use` path into an absolute one. Paths starting at another crate
    /// are already absolute.
    fn absolutize_use(&self, path: Vec<String>) -> Vec<String> {
        let Some(first) = path.first() else {
            return path;
        };
        match first.as_str() {
            "crate" => path,
            "self" | "super" => match self.resolve_head(&path) {
                Some((mut head, consumed)) => {
                    head.extend(path[consumed..].iter().cloned());
                    head
                }
                None => path,
            },
            name if self.locals.contains(name) && !self.module.is_empty() => {
                let mut absolute = self.module.clone();
                absolute.extend(path);
                absolute
            }
            _ => path,
        }
    }
}

/// Bind the names glob imports bring in, for globs that target one of
/// `scopes`. Declared and explicitly imported names shadow glob-imported
/// ones. Runs to a fixpoint so globs of globs resolve as well.
pub fn link_globs(scopes: &mut [ImportScope]) {
    loop {
        let visible: BTreeMap<Vec<String>, BTreeMap<String, Vec<String>>> = scopes
            .iter()
            .filter(|scope| !scope.module.is_empty())
            .map(|scope| (scope.module.clone(), scope.visible_names()))
            .collect();
        let mut changed = false;
        for scope in scopes.iter_mut() {
            for glob in &scope.globs {
                let Some(names) = visible.get(glob) else {
                    continue;
                };
                for (name, path) in names {
                    if scope.locals.contains(name) || scope.imports.contains_key(name) {
                        continue;
                    }
                    scope.imports.insert(name.clone(), path.clone());
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

struct Qualifier<'a> {
    scope: &'a ImportScope,
    self_path: Option<&'a Path>,
}

impl Qualifier<'_> {
    fn rewrite(&self, path: &mut Path) {
        if let Some(self_path) = self.self_path
            && path.leading_colon.is_none()
            && path.segments.len() == 1
            && path.segments[0].ident == "Self"
            && path.segments[0].arguments.is_none()
        {
            *path = self_path.clone();
            return;
        }
        if path.leading_colon.is_some() {
            return;
        }
        let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let Some((head, consumed)) = self.scope.resolve_head(&names) else {
            return;
        };
        let original: Vec<PathSegment> = path.segments.iter().cloned().collect();
        // arguments written on a renamed head (`Json<T>`) move to its replacement
        let head_arguments = match original[consumed - 1].ident.to_string().as_str() {
            "self" | "super" => PathArguments::None,
            _ => original[consumed - 1].arguments.clone(),
        };
        let mut segments: Vec<PathSegment> = head
            .iter()
            .map(|name| PathSegment::from(make_ident(name)))
            .collect();
        if let Some(last) = segments.last_mut() {
            last.arguments = head_arguments;
        }
        segments.extend(original[consumed..].iter().cloned());
        path.segments = segments.into_iter().collect();
    }
}

impl VisitMut for Qualifier<'_> {
    fn visit_type_path_mut(&mut self, node: &mut syn::TypePath) {
        visit_mut::visit_type_path_mut(self, node);
        if node.qself.is_none() {
            self.rewrite(&mut node.path);
        }
    }

    fn visit_trait_bound_mut(&mut self, node: &mut syn::TraitBound) {
        visit_mut::visit_trait_bound_mut(self, node);
        self.rewrite(&mut node.path);
    }
}

fn item_ident(item: &Item) -> Option<&Ident> {
    match item {
        Item::Struct(i) => Some(&i.ident),
        Item::Enum(i) => Some(&i.ident),
        Item::Union(i) => Some(&i.ident),
        Item::Trait(i) => Some(&i.ident),
        Item::TraitAlias(i) => Some(&i.ident),
        Item::Type(i) => Some(&i.ident),
        Item::Mod(i) => Some(&i.ident),
        Item::Const(i) => Some(&i.ident),
        Item::Static(i) => Some(&i.ident),
        Item::Fn(i) => Some(&i.sig.ident),
        _ => None,
    }
}

/// Flatten a `use` tree into (local name, written path) pairs and the
/// written paths of its globs. `as _` imports bind nothing and are dropped.
fn collect_use_tree(
    tree: &UseTree,
    prefix: Vec<String>,
    out: &mut Vec<(String, Vec<String>)>,
    globs: &mut Vec<Vec<String>>,
) {
    match tree {
        UseTree::Path(p) => {
            let mut prefix = prefix;
            prefix.push(p.ident.to_string());
            collect_use_tree(&p.tree, prefix, out, globs);
        }
        UseTree::Name(n) => {
            if n.ident == "self" {
                if let Some(last) = prefix.last() {
                    out.push((last.clone(), prefix.clone()));
                }
            } else {
                let mut path = prefix;
                path.push(n.ident.to_string());
                out.push((n.ident.to_string(), path));
            }
        }
        UseTree::Rename(r) => {
            if r.rename == "_" {
                return;
            }
            let mut path = prefix;
            if r.ident != "self" {
                path.push(r.ident.to_string());
            }
            out.push((r.rename.to_string(), path));
        }
        UseTree::Glob(_) => {
            if !prefix.is_empty() {
                globs.push(prefix);
            }
        }
        UseTree::Group(g) => {
            for tree in &g.items {
                collect_use_tree(tree, prefix.clone(), out, globs);
            }
        }
    }
}

fn make_ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Render tokens the way a person would write them: `crate::a::B<C>` rather
/// than `crate :: a :: B < C >`. The result parses back to the same tokens.
pub fn compact_tokens(tokens: &impl ToTokens) -> String {
    let raw = tokens.to_token_stream().to_string();
    raw.replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace(" ;", ";")
        .replace("& ", "&")
}
