//! Resolved view over a set of parsed compilation units.
//!
//! Building happens in two passes. The first records every declared type's
//! fully qualified name; the second lowers each declaration into a
//! [`TypeDecl`], resolving every simple name it mentions against the scope
//! it was written in.
use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::ast::{Annotation, ClassDecl, CompilationUnit, Import, TypeArg, TypeExpr};
use super::javadoc::Javadoc;
use super::{jdk, parser, ParseError, SourceError};
use crate::types::{simple_name, DeclKind, FieldDecl, Primitive, TypeDecl, TypeRef, TypeSource, Wildcard};

// ————————————————————————————————————————————————————————————————————————————
// ENTRIES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodEntry {
    pub name: String,
    pub doc: Option<Javadoc>,
    pub annotations: Vec<Annotation>,
    pub return_type: TypeRef,
    pub params: Vec<ParamEntry>,
}

impl MethodEntry {
    pub fn annotation(&self, simple: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name() == simple)
    }
}

impl ParamEntry {
    pub fn annotation(&self, simple: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name() == simple)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub decl: TypeDecl,
    pub doc: Option<Javadoc>,
    pub annotations: Vec<Annotation>,
    pub methods: Vec<MethodEntry>,
    /// File the declaration was read from.
    pub path: String,
}

impl ClassEntry {
    pub fn annotation(&self, simple: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name() == simple)
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.decl.name)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INDEX
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct SourceIndex {
    entries: IndexMap<String, ClassEntry>,
}

impl SourceIndex {
    /// Parse and index `(path, source)` pairs; the first parse failure aborts.
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let units = sources
            .into_iter()
            .map(|(path, src)| {
                parser::parse_unit(src)
                    .map(|unit| (path.to_string(), unit))
                    .map_err(|error| SourceError { path: path.to_string(), error })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_units(units))
    }

    pub fn from_units(units: Vec<(String, CompilationUnit)>) -> Self {
        let mut known = HashSet::new();
        for (_, unit) in &units {
            for decl in &unit.types {
                collect_names(decl, unit.package.as_deref(), &mut known);
            }
        }

        let mut index = SourceIndex::default();
        for (path, unit) in &units {
            for decl in &unit.types {
                let scope = Scope {
                    known: &known,
                    package: unit.package.as_deref(),
                    imports: &unit.imports,
                    enclosing: Vec::new(),
                    type_params: Vec::new(),
                };
                index.lower_decl(path, decl, scope);
            }
        }
        debug!(types = index.entries.len(), files = units.len(), "indexed sources");
        index
    }

    fn lower_decl(&mut self, path: &str, decl: &ClassDecl, parent: Scope<'_>) {
        let fq = parent.child_name(&decl.name);
        let mut scope = parent;
        scope.enclosing.push(fq.clone());
        scope.type_params = decl.type_params.iter().chain(&scope.type_params).cloned().collect();

        let mut ty = TypeDecl::new(fq.clone(), decl.kind);
        ty.type_params = decl.type_params.clone();
        match decl.kind {
            DeclKind::Interface => {
                ty.interfaces = decl.extends.iter().map(|e| scope.lower(e, &[])).collect();
            }
            _ => {
                ty.superclass = decl.extends.first().map(|e| scope.lower(e, &[]));
                ty.interfaces = decl.implements.iter().map(|e| scope.lower(e, &[])).collect();
            }
        }
        if decl.kind != DeclKind::Annotation {
            ty.fields = decl
                .fields
                .iter()
                .map(|f| FieldDecl {
                    name: f.name.clone(),
                    ty: scope.lower(&f.ty, &[]),
                    is_static: f.modifiers.has("static") || decl.kind == DeclKind::Interface,
                    is_transient: f.modifiers.has("transient"),
                })
                .collect();
        }
        ty.enum_constants = decl.enum_constants.clone();

        let methods = decl
            .methods
            .iter()
            .map(|m| MethodEntry {
                name: m.name.clone(),
                doc: m.doc.clone(),
                annotations: m.modifiers.annotations.clone(),
                return_type: scope.lower(&m.return_type, &m.type_params),
                params: m
                    .params
                    .iter()
                    .map(|p| ParamEntry {
                        name: p.name.clone(),
                        annotations: p.modifiers.annotations.clone(),
                        ty: scope.lower(&p.ty, &m.type_params),
                    })
                    .collect(),
            })
            .collect();

        let entry = ClassEntry {
            decl: ty,
            doc: decl.doc.clone(),
            annotations: decl.modifiers.annotations.clone(),
            methods,
            path: path.to_string(),
        };
        if self.entries.contains_key(&fq) {
            warn!(name = %fq, path, "duplicate declaration ignored");
        } else {
            self.entries.insert(fq, entry);
        }

        for nested in &decl.nested {
            self.lower_decl(path, nested, scope.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.entries.get(name)
    }

    /// Declarations in file order, nested types after their outer type.
    pub fn entries(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve free-standing type text (`Page<User>`, `int[]`, `com.acme.Order`)
    /// without any file scope: exact qualified names first, then the first
    /// indexed type with that simple name, then the platform catalog.
    pub fn resolve_type_text(&self, text: &str) -> Result<TypeRef, ParseError> {
        let expr = parser::parse_type_expr(text.trim())?;
        Ok(lower_with(&expr, &|name| TypeRef::class(self.global_name(name))))
    }

    fn global_name(&self, name: &str) -> String {
        if self.entries.contains_key(name) || jdk::lookup(name).is_some() {
            return name.to_string();
        }
        if name.contains('.') {
            return name.to_string();
        }
        self.entries
            .keys()
            .find(|fq| simple_name(fq) == name)
            .cloned()
            .or_else(|| jdk::by_simple_name(name).map(|d| d.name.clone()))
            .unwrap_or_else(|| name.to_string())
    }
}

impl TypeSource for SourceIndex {
    fn declaration(&self, name: &str) -> Option<&TypeDecl> {
        self.entries.get(name).map(|e| &e.decl).or_else(|| jdk::lookup(name))
    }
}

fn collect_names(decl: &ClassDecl, outer: Option<&str>, known: &mut HashSet<String>) {
    let fq = qualify(outer, &decl.name);
    for nested in &decl.nested {
        collect_names(nested, Some(&fq), known);
    }
    known.insert(fq);
}

fn qualify(outer: Option<&str>, name: &str) -> String {
    match outer {
        Some(outer) => format!("{outer}.{name}"),
        None => name.to_string(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCOPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone)]
struct Scope<'a> {
    known: &'a HashSet<String>,
    package: Option<&'a str>,
    imports: &'a [Import],
    /// Enclosing declarations, outermost first.
    enclosing: Vec<String>,
    /// Visible type parameters, innermost declaration first.
    type_params: Vec<String>,
}

impl Scope<'_> {
    fn child_name(&self, simple: &str) -> String {
        match self.enclosing.last() {
            Some(outer) => format!("{outer}.{simple}"),
            None => qualify(self.package, simple),
        }
    }

    fn lower(&self, expr: &TypeExpr, method_params: &[String]) -> TypeRef {
        lower_with(expr, &|name| self.resolve(name, method_params))
    }

    /// Type parameters, then nested types, single imports, the current
    /// package, on-demand imports and `java.lang`. A name still unknown is
    /// placed in the first on-demand platform import, else kept as written.
    fn resolve(&self, name: &str, method_params: &[String]) -> TypeRef {
        if let Some((head, rest)) = name.split_once('.') {
            return match self.resolve_class(head) {
                Some(fq) => TypeRef::class(format!("{fq}.{rest}")),
                None => TypeRef::class(name),
            };
        }
        if method_params.iter().chain(&self.type_params).any(|p| p == name) {
            return TypeRef::param(name);
        }
        TypeRef::class(self.resolve_class(name).unwrap_or_else(|| name.to_string()))
    }

    fn resolve_class(&self, simple: &str) -> Option<String> {
        let is_known = |fq: &str| self.known.contains(fq) || jdk::lookup(fq).is_some();

        let nested = self.enclosing.iter().rev().map(|outer| format!("{outer}.{simple}")).find(|fq| is_known(fq.as_str()));
        if nested.is_some() {
            return nested;
        }
        let single = self
            .imports
            .iter()
            .filter(|i| !i.is_static && !i.on_demand)
            .find(|i| simple_name(&i.path) == simple);
        if let Some(import) = single {
            return Some(import.path.clone());
        }
        let same_package = qualify(self.package, simple);
        if self.known.contains(&same_package) {
            return Some(same_package);
        }
        let on_demand = self
            .imports
            .iter()
            .filter(|i| !i.is_static && i.on_demand)
            .map(|i| format!("{}.{simple}", i.path))
            .find(|fq| is_known(fq.as_str()));
        if on_demand.is_some() {
            return on_demand;
        }
        if let Some(lang) = jdk::java_lang(simple) {
            return Some(lang.name.clone());
        }
        // uncatalogued platform type pulled in by `import java.util.*`
        self.imports
            .iter()
            .find(|i| !i.is_static && i.on_demand && jdk::is_platform_package(&i.path))
            .map(|i| format!("{}.{simple}", i.path))
    }
}

/// Turn a written type into a [`TypeRef`]; `resolve` maps each bare name.
fn lower_with(expr: &TypeExpr, resolve: &dyn Fn(&str) -> TypeRef) -> TypeRef {
    let base = if expr.name == "void" {
        TypeRef::Void
    } else if let Some(primitive) = Primitive::from_keyword(&expr.name) {
        TypeRef::Primitive(primitive)
    } else {
        match resolve(&expr.name) {
            TypeRef::Class { name, .. } => {
                let args = expr
                    .args
                    .iter()
                    .map(|arg| match arg {
                        TypeArg::Type(t) => lower_with(t, resolve),
                        TypeArg::Wildcard => TypeRef::Wildcard(Wildcard::Any),
                        TypeArg::Extends(t) => TypeRef::Wildcard(Wildcard::Extends(Box::new(lower_with(t, resolve)))),
                        TypeArg::Super(t) => TypeRef::Wildcard(Wildcard::Super(Box::new(lower_with(t, resolve)))),
                    })
                    .collect();
                TypeRef::Class { name, args }
            }
            other => other,
        }
    };
    (0..expr.dims).fold(base, |ty, _| TypeRef::array_of(ty))
}
