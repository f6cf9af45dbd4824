//! Declaration scanner.
//!
//! Parses every `.rs` file under the scanned folder and indexes what the
//! later stages need: type declarations, trait impls, trait supertraits and
//! inherent methods. [`SourceIndex::services`] then keeps the types that carry
//! the service marker, either derived (`#[derive(FastApi)]`), implemented
//! directly, or implemented through a capability trait whose supertraits
//! reach the marker.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use syn::{Attribute, Generics, ImplItem, ImplItemFn, Item, Type, TypeParamBound};

use crate::attrs::{derives_marker, is_cfg_test};
use crate::error::{GenerateError, Result};
use crate::file_utils::{collect_files, file_to_segments};
use crate::resolve::{ImportScope, link_globs};

/// Folder to scan and the module path it is mounted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRoot {
    pub dir: PathBuf,
    pub module: String,
}

/// A struct or enum found in the scanned tree.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub namespace: String,
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub generic: bool,
    /// Index of the [`ImportScope`] the type was declared in
    pub scope: usize,
    pub file: PathBuf,
}

impl TypeEntry {
    pub fn key(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }
}

/// A method from an inherent impl block, with the scope it was written in.
#[derive(Debug, Clone)]
pub struct ImplMethod {
    pub item: ImplItemFn,
    pub scope: usize,
}

#[derive(Debug, Default)]
pub struct SourceIndex {
    marker: String,
    scopes: Vec<ImportScope>,
    types: Vec<TypeEntry>,
    /// (trait key, implementing type key)
    trait_impls: Vec<(String, String)>,
    supertraits: BTreeMap<String, Vec<String>>,
    methods: BTreeMap<String, Vec<ImplMethod>>,
    files: Vec<PathBuf>,
}

/// One module's items, file-level or inline.
struct ModuleSource<'a> {
    module: String,
    items: &'a [Item],
    file: &'a Path,
}

/// Scan `root` for declarations, recognising `marker` as the service marker.
pub fn scan(root: &ScanRoot, marker: &str) -> Result<SourceIndex> {
    let mut index = SourceIndex {
        marker: marker.to_string(),
        ..SourceIndex::default()
    };
    let mut parsed_files = Vec::new();
    for file in collect_files(&root.dir)? {
        let segments = file_to_segments(&file, &root.dir);
        if let Some(bad) = segments
            .iter()
            .find(|s| syn::parse_str::<syn::Ident>(s).is_err())
        {
            tracing::warn!(file = %file.display(), segment = %bad, "skipping file that is not a module");
            continue;
        }
        let content = std::fs::read_to_string(&file).map_err(|e| GenerateError::io(&file, e))?;
        let parsed = syn::parse_file(&content).map_err(|e| GenerateError::Parse {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let module = join_module(&root.module, &segments);
        tracing::debug!(file = %file.display(), module = %module, "scanning source file");
        parsed_files.push((module, parsed, file));
    }

    let mut sources = Vec::new();
    for (module, parsed, file) in &parsed_files {
        flatten_module(module.clone(), &parsed.items, file, &mut sources);
    }
    index.add_modules(&sources);
    index.files = parsed_files.into_iter().map(|(_, _, file)| file).collect();
    Ok(index)
}

impl SourceIndex {
    /// Index already parsed items as the module `module`.
    pub fn from_items(module: &str, items: &[Item], marker: &str) -> Self {
        let mut index = Self {
            marker: marker.to_string(),
            ..Self::default()
        };
        let mut sources = Vec::new();
        flatten_module(module.to_string(), items, Path::new(""), &mut sources);
        index.add_modules(&sources);
        index
    }

    /// Build every module's scope first so glob imports can see the whole
    /// tree, then index the items against the linked scopes.
    fn add_modules(&mut self, sources: &[ModuleSource<'_>]) {
        let mut scopes: Vec<ImportScope> = sources
            .iter()
            .map(|source| ImportScope::new(&source.module, source.items))
            .collect();
        link_globs(&mut scopes);
        for (scope_idx, source) in sources.iter().enumerate() {
            self.add_items(&scopes[scope_idx], scope_idx, source.items, source.file);
        }
        self.scopes = scopes;
    }

    fn add_items(&mut self, scope: &ImportScope, scope_idx: usize, items: &[Item], file: &Path) {
        for item in items {
            if has_cfg_test(item) {
                continue;
            }
            match item {
                Item::Struct(s) => self.add_type(scope, scope_idx, &s.ident, &s.attrs, &s.generics, file),
                Item::Enum(e) => self.add_type(scope, scope_idx, &e.ident, &e.attrs, &e.generics, file),
                Item::Trait(t) => {
                    let supers = t
                        .supertraits
                        .iter()
                        .filter_map(|bound| match bound {
                            TypeParamBound::Trait(tb) => Some(scope.item_key(&tb.path)),
                            _ => None,
                        })
                        .collect();
                    self.supertraits
                        .insert(scope.local_key(&t.ident.to_string()), supers);
                }
                Item::Impl(imp) => {
                    if !imp.generics.params.is_empty() {
                        continue;
                    }
                    let Some(self_key) = self_type_key(scope, &imp.self_ty) else {
                        continue;
                    };
                    if let Some((_, trait_path, _)) = &imp.trait_ {
                        self.trait_impls.push((scope.item_key(trait_path), self_key));
                    } else {
                        let methods = self.methods.entry(self_key).or_default();
                        methods.extend(imp.items.iter().filter_map(|item| match item {
                            ImplItem::Fn(f) if !f.attrs.iter().any(is_cfg_test) => Some(ImplMethod {
                                item: f.clone(),
                                scope: scope_idx,
                            }),
                            _ => None,
                        }));
                    }
                }
                _ => {}
            }
        }
    }

    fn add_type(
        &mut self,
        scope: &ImportScope,
        scope_idx: usize,
        ident: &syn::Ident,
        attrs: &[Attribute],
        generics: &Generics,
        file: &Path,
    ) {
        self.types.push(TypeEntry {
            namespace: scope.module(),
            name: ident.to_string(),
            attrs: attrs.to_vec(),
            generic: !generics.params.is_empty(),
            scope: scope_idx,
            file: file.to_path_buf(),
        });
    }

    /// Types carrying the service marker, in file then declaration order.
    pub fn services(&self) -> Vec<&TypeEntry> {
        let implemented: BTreeSet<&str> = self
            .trait_impls
            .iter()
            .filter(|(trait_key, _)| self.reaches_marker(trait_key))
            .map(|(_, self_key)| self_key.as_str())
            .collect();
        for (trait_key, self_key) in &self.trait_impls {
            if !self.types.iter().any(|t| &t.key() == self_key) && self.reaches_marker(trait_key) {
                tracing::warn!(ty = %self_key, "marker implemented for a type outside the scanned folder");
            }
        }
        self.types
            .iter()
            .filter(|entry| {
                let marked = derives_marker(&entry.attrs, &self.marker)
                    || implemented.contains(entry.key().as_str());
                if marked && entry.generic {
                    tracing::warn!(ty = %entry.key(), "skipping generic service type");
                }
                marked && !entry.generic
            })
            .collect()
    }

    /// Whether `trait_key` is the marker or has it among its transitive
    /// supertraits. Supertrait cycles terminate.
    pub fn reaches_marker(&self, trait_key: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut pending = vec![trait_key];
        while let Some(key) = pending.pop() {
            if last_segment(key) == self.marker {
                return true;
            }
            if !visited.insert(key) {
                continue;
            }
            if let Some(supers) = self.supertraits.get(key) {
                pending.extend(supers.iter().map(String::as_str));
            }
        }
        false
    }

    /// Inherent methods of the type with `key`, in file then item order.
    pub fn methods(&self, key: &str) -> &[ImplMethod] {
        self.methods.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn scope(&self, idx: usize) -> &ImportScope {
        &self.scopes[idx]
    }

    /// Files the index was built from.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

/// Push `items` and then its inline modules, depth first.
fn flatten_module<'a>(module: String, items: &'a [Item], file: &'a Path, out: &mut Vec<ModuleSource<'a>>) {
    let children: Vec<(String, &'a [Item])> = items
        .iter()
        .filter(|item| !has_cfg_test(item))
        .filter_map(|item| match item {
            Item::Mod(m) => m
                .content
                .as_ref()
                .map(|(_, content)| (join_module(&module, &[m.ident.to_string()]), content.as_slice())),
            _ => None,
        })
        .collect();
    out.push(ModuleSource { module, items, file });
    for (child, content) in children {
        flatten_module(child, content, file, out);
    }
}

fn has_cfg_test(item: &Item) -> bool {
    let attrs = match item {
        Item::Struct(i) => &i.attrs,
        Item::Enum(i) => &i.attrs,
        Item::Trait(i) => &i.attrs,
        Item::Impl(i) => &i.attrs,
        Item::Mod(i) => &i.attrs,
        _ => return false,
    };
    attrs.iter().any(is_cfg_test)
}

/// Key of an impl's self type, `None` for anything but a plain path.
fn self_type_key(scope: &ImportScope, ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() || path.path.segments.iter().any(|s| !s.arguments.is_none()) {
        return None;
    }
    Some(scope.item_key(&path.path))
}

fn join_module(base: &str, segments: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !base.is_empty() {
        parts.push(base);
    }
    parts.extend(segments.iter().map(String::as_str));
    parts.join("::")
}

fn last_segment(key: &str) -> &str {
    key.rsplit("::").next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_helpers::{create_test_temp_dir, write_file};

    fn index(src: &str) -> SourceIndex {
        let file = crate::parse_file!(src);
        SourceIndex::from_items("crate::services", &file.items, "FastApi")
    }

    fn service_names(index: &SourceIndex) -> Vec<String> {
        index.services().iter().map(|t| t.key()).collect()
    }

    #[test]
    fn test_derive_marks_service() {
        let index = index(
            r#"
            #[derive(Clone, FastApi)]
            pub struct OrderService;
            #[derive(Clone)]
            pub struct Plain;
            "#,
        );
        assert_eq!(service_names(&index), ["crate::services::OrderService"]);
    }

    #[rstest]
    #[case("use fast_service::FastApi; impl FastApi for OrderService {}")]
    #[case("impl fast_service::FastApi for OrderService {}")]
    #[case("impl ::fast_service::FastApi for OrderService {}")]
    #[case("impl FastApi for crate::services::OrderService {}")]
    #[case("impl FastApi for self::OrderService {}")]
    fn test_direct_impl_marks_service(#[case] imp: &str) {
        let index = index(&format!("pub struct OrderService; {imp}"));
        assert_eq!(service_names(&index), ["crate::services::OrderService"]);
    }

    #[test]
    fn test_capability_chain_marks_service() {
        let index = index(
            r#"
            use fast_service::FastApi;
            pub trait Api: FastApi {}
            pub trait AdminApi: Api + Send {}
            pub struct AdminService;
            impl AdminApi for AdminService {}
            pub struct Helper;
            impl Clone for Helper { fn clone(&self) -> Self { Helper } }
            "#,
        );
        assert_eq!(service_names(&index), ["crate::services::AdminService"]);
    }

    #[test]
    fn test_supertrait_cycle_terminates() {
        let index = index(
            r#"
            pub trait A: B {}
            pub trait B: A {}
            pub struct S;
            impl A for S {}
            "#,
        );
        assert!(index.services().is_empty());
        assert!(!index.reaches_marker("crate::services::A"));
    }

    #[test]
    fn test_unmarked_and_generic_types_excluded() {
        let index = index(
            r#"
            pub struct NoImpls;
            #[derive(FastApi)]
            pub struct Generic<T>(T);
            pub struct Other;
            impl UnknownTrait for Other {}
            pub struct Wrapped<T>(T);
            impl<T> FastApi for Wrapped<T> {}
            "#,
        );
        assert!(index.services().is_empty());
    }

    #[test]
    fn test_custom_marker_name() {
        let file = crate::parse_file!(
            "#[derive(Endpoints)] pub struct A; #[derive(FastApi)] pub struct B;"
        );
        let index = SourceIndex::from_items("crate", &file.items, "Endpoints");
        assert_eq!(service_names(&index), ["crate::A"]);
    }

    #[test]
    fn test_inline_modules_and_cfg_test() {
        let index = index(
            r#"
            pub mod admin {
                #[derive(FastApi)]
                pub struct UserService;
                impl UserService {
                    pub fn get_all(&self) {}
                }
            }
            #[cfg(test)]
            mod tests {
                #[derive(FastApi)]
                pub struct MockService;
            }
            "#,
        );
        assert_eq!(service_names(&index), ["crate::services::admin::UserService"]);
        let methods = index.methods("crate::services::admin::UserService");
        assert_eq!(methods.len(), 1);
        assert_eq!(index.scope(methods[0].scope).module(), "crate::services::admin");
    }

    #[test]
    fn test_cfg_test_methods_skipped() {
        let index = index(
            r#"
            #[derive(FastApi)]
            pub struct OrderService;
            impl OrderService {
                pub fn get_all(&self) {}
                #[cfg(test)]
                pub fn get_fixture(&self) {}
            }
            "#,
        );
        let methods = index.methods("crate::services::OrderService");
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].item.sig.ident, "get_all");
    }

    #[test]
    fn test_glob_imports_link_across_files() {
        let dir = create_test_temp_dir();
        write_file(dir.path(), "mod.rs", "pub struct Order;");
        write_file(
            dir.path(),
            "orders.rs",
            r#"
            use super::*;
            #[derive(FastApi)]
            pub struct OrderService;
            pub mod dto {
                use super::*;
            }
            "#,
        );
        let root = ScanRoot {
            dir: dir.path().to_path_buf(),
            module: "crate::services".to_string(),
        };
        let index = scan(&root, "FastApi").unwrap();
        let service = index.services()[0];
        let scope = index.scope(service.scope);
        let ty: Type = syn::parse_str("Vec<Order>").unwrap();
        assert_eq!(
            crate::resolve::compact_tokens(&scope.qualify_type(&ty, None)),
            "Vec<crate::services::Order>"
        );
        let dto = (0..3)
            .map(|idx| index.scope(idx))
            .find(|scope| scope.module() == "crate::services::orders::dto")
            .unwrap();
        assert_eq!(
            crate::resolve::compact_tokens(&dto.qualify_type(&ty, None)),
            "Vec<crate::services::Order>"
        );
    }

    #[test]
    fn test_methods_collected_across_impl_blocks() {
        let index = index(
            r#"
            #[derive(FastApi)]
            pub struct OrderService;
            impl OrderService { pub fn get(&self) {} pub fn add(&self) {} }
            impl Default for OrderService { fn default() -> Self { OrderService } }
            impl OrderService { pub fn remove(&self) {} }
            "#,
        );
        let names: Vec<String> = index
            .methods("crate::services::OrderService")
            .iter()
            .map(|m| m.item.sig.ident.to_string())
            .collect();
        assert_eq!(names, ["get", "add", "remove"]);
    }

    #[test]
    fn test_scan_directory_in_stable_order() {
        let dir = create_test_temp_dir();
        write_file(
            dir.path(),
            "orders.rs",
            "#[derive(FastApi)] pub struct OrderService;",
        );
        write_file(
            dir.path(),
            "admin/mod.rs",
            "#[derive(FastApi)] pub struct AdminService;",
        );
        write_file(
            dir.path(),
            "admin/users.rs",
            "use fast_service::FastApi; pub struct UserService; impl FastApi for UserService {}",
        );
        write_file(dir.path(), "readme.txt", "ignored");

        let root = ScanRoot {
            dir: dir.path().to_path_buf(),
            module: "crate::services".to_string(),
        };
        let first = scan(&root, "FastApi").unwrap();
        let second = scan(&root, "FastApi").unwrap();
        let expected = [
            "crate::services::admin::AdminService",
            "crate::services::admin::users::UserService",
            "crate::services::orders::OrderService",
        ];
        assert_eq!(service_names(&first), expected);
        assert_eq!(service_names(&second), expected);
        assert_eq!(first.files().len(), 3);
    }

    #[test]
    fn test_scan_reports_parse_errors() {
        let dir = create_test_temp_dir();
        write_file(dir.path(), "broken.rs", "pub struct {");
        let root = ScanRoot {
            dir: dir.path().to_path_buf(),
            module: "crate".to_string(),
        };
        let err = scan(&root, "FastApi").unwrap_err();
        assert!(matches!(err, GenerateError::Parse { .. }));
    }

    #[test]
    fn test_scan_missing_folder_is_io_error() {
        let dir = create_test_temp_dir();
        let root = ScanRoot {
            dir: dir.path().join("missing"),
            module: "crate".to_string(),
        };
        assert!(matches!(
            scan(&root, "FastApi").unwrap_err(),
            GenerateError::Io { .. }
        ));
    }
}
