//! Generic substitution: which concrete type each type parameter stands for.
use std::collections::HashMap;

use crate::types::{TypeRef, TypeSource, Wildcard};

/// Type-parameter name → type bound at a use site. Never mutated once built;
/// nested scopes are produced with [`Bindings::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    map: HashMap<String, TypeRef>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop the given parameters. A declaration's own parameters never
    /// inherit from the enclosing scope, so a raw `Box` stays unbound.
    pub fn without(&self, params: &[String]) -> Bindings {
        if params.iter().all(|p| !self.map.contains_key(p)) {
            return self.clone();
        }
        let map = self.map.iter()
            .filter(|(k, _)| !params.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Bindings { map }
    }

    /// `inner` shadows `outer` on collision.
    pub fn merge(outer: &Bindings, inner: &Bindings) -> Bindings {
        if inner.is_empty() {
            return outer.clone();
        }
        let mut map = outer.map.clone();
        map.extend(inner.map.iter().map(|(k, v)| (k.clone(), v.clone())));
        Bindings { map }
    }
}

impl FromIterator<(String, TypeRef)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, TypeRef)>>(iter: I) -> Self {
        Bindings { map: iter.into_iter().collect() }
    }
}

/// Zip the declaration's type parameters with the arguments written at the
/// use site: `Response<User>` over `Response<T>` gives `{T: User}`.
///
/// Raw references, non-generic types and unknown declarations give an empty
/// map. `? extends X` / `? super X` bind `X`; a bare `?` binds nothing.
pub fn resolve_bindings<S: TypeSource + ?Sized>(ty: &TypeRef, source: &S) -> Bindings {
    let TypeRef::Class { name, args } = ty else {
        return Bindings::new();
    };
    if args.is_empty() {
        return Bindings::new();
    }
    let Some(decl) = source.declaration(name) else {
        return Bindings::new();
    };
    decl.type_params
        .iter()
        .zip(args)
        .filter_map(|(param, arg)| {
            let bound = match arg {
                TypeRef::Wildcard(Wildcard::Any) => return None,
                TypeRef::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => bound.as_ref().clone(),
                other => other.clone(),
            };
            Some((param.clone(), bound))
        })
        .collect()
}

/// Structurally replace every bound parameter, at any nesting depth.
pub fn substitute(ty: &TypeRef, bindings: &Bindings) -> TypeRef {
    if bindings.is_empty() || !ty.contains_param() {
        return ty.clone();
    }
    match ty {
        TypeRef::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| ty.clone()),
        TypeRef::Class { name, args } => TypeRef::Class {
            name: name.clone(),
            args: args.iter().map(|a| substitute(a, bindings)).collect(),
        },
        TypeRef::Array(elem) => TypeRef::Array(Box::new(substitute(elem, bindings))),
        TypeRef::Wildcard(Wildcard::Extends(bound)) => {
            TypeRef::Wildcard(Wildcard::Extends(Box::new(substitute(bound, bindings))))
        }
        TypeRef::Wildcard(Wildcard::Super(bound)) => {
            TypeRef::Wildcard(Wildcard::Super(Box::new(substitute(bound, bindings))))
        }
        TypeRef::Wildcard(Wildcard::Any) | TypeRef::Void | TypeRef::Primitive(_) => ty.clone(),
    }
}

/// Memo key: canonical text after substitution. `Box<T>` under `{T: User}`
/// and `Box<T>` under `{T: String}` yield different keys.
pub fn key_for(ty: &TypeRef, bindings: &Bindings) -> String {
    substitute(ty, bindings).canonical_text()
}

/// Follow a bare placeholder (or a bounded wildcard) to the type it stands
/// for. A parameter chain that loops back on itself stops at the parameter.
pub fn effective<'a>(ty: &'a TypeRef, bindings: &'a Bindings) -> &'a TypeRef {
    let mut current = ty;
    for _ in 0..=bindings.len() {
        current = match current {
            TypeRef::Param(name) => match bindings.get(name) {
                Some(bound) if bound != current => bound,
                _ => return current,
            },
            TypeRef::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => bound.as_ref(),
            _ => return current,
        };
    }
    current
}

/// All supertypes reachable from `ty`, `ty` itself first, each with its
/// type arguments substituted along the way.
pub fn supertype_closure<S: TypeSource + ?Sized>(ty: &TypeRef, source: &S) -> Vec<TypeRef> {
    let mut out = vec![ty.clone()];
    let mut seen = std::collections::HashSet::new();
    let mut cursor = 0;
    while cursor < out.len() {
        let current = out[cursor].clone();
        cursor += 1;
        let Some(name) = current.class_name() else { continue };
        if !seen.insert(name.to_string()) {
            continue;
        }
        let Some(decl) = source.declaration(name) else { continue };
        // arguments pass through verbatim so `Set<?>` reaches `Iterable<?>`
        let scope: Bindings = decl.type_params.iter().cloned().zip(current.type_args().iter().cloned()).collect();
        for sup in decl.supertypes() {
            out.push(substitute(sup, &scope));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::jdk;
    use crate::types::{DeclKind, TypeDecl};

    fn source() -> HashMap<String, TypeDecl> {
        let mut decls = HashMap::new();
        let mut pair = TypeDecl::new("com.acme.Pair", DeclKind::Class);
        pair.type_params = vec!["K".into(), "V".into()];
        decls.insert(pair.name.clone(), pair);
        let mut tags = TypeDecl::new("com.acme.Tags", DeclKind::Class);
        tags.superclass = Some(TypeRef::generic("java.util.ArrayList", vec![TypeRef::class("java.lang.String")]));
        decls.insert(tags.name.clone(), tags);
        for decl in jdk::catalog() {
            decls.insert(decl.name.clone(), decl.clone());
        }
        decls
    }

    #[test]
    fn zips_parameters_with_arguments() {
        let ty = TypeRef::generic("com.acme.Pair", vec![
            TypeRef::class("java.lang.String"),
            TypeRef::class("java.lang.Integer"),
        ]);
        let b = resolve_bindings(&ty, &source());
        assert_eq!(b.get("K"), Some(&TypeRef::class("java.lang.String")));
        assert_eq!(b.get("V"), Some(&TypeRef::class("java.lang.Integer")));
        assert!(resolve_bindings(&TypeRef::class("com.acme.Pair"), &source()).is_empty());
    }

    #[test]
    fn inner_bindings_shadow_outer() {
        let outer: Bindings = [("T".to_string(), TypeRef::class("a.A")), ("U".to_string(), TypeRef::class("a.U"))]
            .into_iter().collect();
        let inner: Bindings = [("T".to_string(), TypeRef::class("b.B"))].into_iter().collect();
        let merged = Bindings::merge(&outer, &inner);
        assert_eq!(merged.get("T"), Some(&TypeRef::class("b.B")));
        assert_eq!(merged.get("U"), Some(&TypeRef::class("a.U")));
    }

    #[test]
    fn substitution_handles_nested_multi_argument_generics() {
        // Map<String, List<Pair<A,B>>>
        let ty = TypeRef::generic("java.util.Map", vec![
            TypeRef::class("java.lang.String"),
            TypeRef::generic("java.util.List", vec![
                TypeRef::generic("com.acme.Pair", vec![TypeRef::param("A"), TypeRef::param("B")]),
            ]),
        ]);
        let b: Bindings = [
            ("A".to_string(), TypeRef::class("com.acme.User")),
            ("B".to_string(), TypeRef::generic("java.util.List", vec![TypeRef::class("java.lang.Long")])),
        ].into_iter().collect();
        assert_eq!(
            key_for(&ty, &b),
            "java.util.Map<java.lang.String,java.util.List<com.acme.Pair<com.acme.User,java.util.List<java.lang.Long>>>>"
        );
        // unbound placeholders survive untouched
        let partial: Bindings = [("A".to_string(), TypeRef::class("com.acme.User"))].into_iter().collect();
        assert!(key_for(&ty, &partial).ends_with("com.acme.Pair<com.acme.User,B>>>"));
    }

    #[test]
    fn effective_follows_placeholders_and_stops_on_loops() {
        let b: Bindings = [("T".to_string(), TypeRef::param("U")), ("U".to_string(), TypeRef::class("x.Y"))]
            .into_iter().collect();
        assert_eq!(effective(&TypeRef::param("T"), &b), &TypeRef::class("x.Y"));
        let looping: Bindings = [("T".to_string(), TypeRef::param("U")), ("U".to_string(), TypeRef::param("T"))]
            .into_iter().collect();
        assert!(matches!(effective(&TypeRef::param("T"), &looping), TypeRef::Param(_)));
    }

    #[test]
    fn closure_reaches_iterable_through_user_subclass() {
        let closure = supertype_closure(&TypeRef::class("com.acme.Tags"), &source());
        let iterable = closure.iter().find(|t| t.simple_name() == Some("Iterable")).expect("iterable ancestor");
        assert_eq!(iterable.type_args(), &[TypeRef::class("java.lang.String")]);
    }
}
