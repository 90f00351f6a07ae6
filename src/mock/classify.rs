use super::bindings::{self, Bindings};
use super::scalar;
use crate::types::{Primitive, TypeDecl, TypeRef, TypeSource, Wildcard};

/// Simple name of the marker interface every collection reaches.
const ITERABLE: &str = "Iterable";

#[derive(Debug, Clone, PartialEq)]
pub enum Category<'a> {
    Primitive(Primitive),
    /// Boxed/base scalar, by presentable name.
    Scalar(String),
    /// Deep element type of an array.
    Array(&'a TypeRef),
    Collection(Element),
    /// A type parameter with nothing bound to it.
    Placeholder,
    Enum(&'a TypeDecl),
    Opaque,
    Composite(&'a TypeDecl),
    /// A class type whose declaration is nowhere to be found.
    Unresolvable,
}

/// What a collection holds, read off its `Iterable<X>` ancestor.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Of(TypeRef),
    /// `List<?>`
    Unbounded,
    /// Raw or otherwise unknown element type.
    Unknown,
}

pub struct Classifier<'s, S: TypeSource + ?Sized> {
    source: &'s S,
    opaque_prefixes: Vec<String>,
}

impl<'s, S: TypeSource + ?Sized> Classifier<'s, S> {
    pub fn new(source: &'s S, opaque_prefixes: Vec<String>) -> Self {
        Self { source, opaque_prefixes }
    }

    pub fn source(&self) -> &'s S {
        self.source
    }

    pub fn is_opaque(&self, name: &str) -> bool {
        self.opaque_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// First matching category wins; the order below is significant.
    pub fn classify<'a>(&self, ty: &'a TypeRef, bindings: &'a Bindings) -> Category<'a>
    where
        's: 'a,
    {
        let ty = bindings::effective(ty, bindings);
        if let TypeRef::Primitive(p) = ty {
            return Category::Primitive(*p);
        }
        let presentable = ty.presentable_text();
        if scalar::is_scalar(&presentable) {
            return Category::Scalar(presentable);
        }
        if ty.is_array() {
            return Category::Array(ty.deep_component());
        }
        if let Some(element) = self.iterable_element(ty, bindings) {
            return Category::Collection(element);
        }
        let name = match ty {
            TypeRef::Class { name, .. } => name,
            TypeRef::Param(_) | TypeRef::Wildcard(_) => return Category::Placeholder,
            // void is rejected before classification
            TypeRef::Void | TypeRef::Primitive(_) | TypeRef::Array(_) => return Category::Unresolvable,
        };
        let decl = self.source.declaration(name);
        if let Some(decl) = decl {
            if decl.is_enum() {
                return Category::Enum(decl);
            }
        }
        if self.is_opaque(name) {
            return Category::Opaque;
        }
        match decl {
            Some(decl) => Category::Composite(decl),
            None => Category::Unresolvable,
        }
    }

    /// `Some` when any transitive supertype is named `Iterable`.
    fn iterable_element(&self, ty: &TypeRef, bindings: &Bindings) -> Option<Element> {
        if ty.class_name().is_none() {
            return None;
        }
        let concrete = bindings::substitute(ty, bindings);
        let closure = bindings::supertype_closure(&concrete, self.source);
        let iterable = closure.iter().find(|t| t.simple_name() == Some(ITERABLE))?;
        let element = match iterable.type_args() {
            [TypeRef::Wildcard(Wildcard::Any)] => Element::Unbounded,
            [TypeRef::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound))] => {
                Element::Of(bound.as_ref().clone())
            }
            // raw collection: the parameter never got an argument
            [TypeRef::Param(_)] => Element::Unknown,
            [arg] => Element::Of(arg.clone()),
            _ => Element::Unknown,
        };
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::SourceIndex;

    const SOURCE: &str = r#"
        package com.acme;
        import java.util.*;
        public class Shapes {
            public enum Color { RED, GREEN }
            public static class Bag extends ArrayList<String> {}
            public static class Holder<T> { T value; }
        }
    "#;

    fn index() -> SourceIndex {
        SourceIndex::from_sources([("Shapes.java", SOURCE)]).unwrap()
    }

    fn classify_text(index: &SourceIndex, text: &str) -> String {
        let ty = index.resolve_type_text(text).unwrap();
        let classifier = Classifier::new(index, vec!["java.".to_string()]);
        let b = Bindings::new();
        match classifier.classify(&ty, &b) {
            Category::Primitive(_) => "primitive".into(),
            Category::Scalar(name) => format!("scalar:{name}"),
            Category::Array(elem) => format!("array:{}", elem.presentable_text()),
            Category::Collection(Element::Of(elem)) => format!("collection:{}", elem.presentable_text()),
            Category::Collection(Element::Unbounded) => "collection:?".into(),
            Category::Collection(Element::Unknown) => "collection:raw".into(),
            Category::Placeholder => "placeholder".into(),
            Category::Enum(_) => "enum".into(),
            Category::Opaque => "opaque".into(),
            Category::Composite(decl) => format!("composite:{}", decl.name),
            Category::Unresolvable => "unresolvable".into(),
        }
    }

    #[test]
    fn precedence_order() {
        let index = index();
        assert_eq!(classify_text(&index, "int"), "primitive");
        assert_eq!(classify_text(&index, "String"), "scalar:String");
        assert_eq!(classify_text(&index, "Color[][]"), "array:Color");
        assert_eq!(classify_text(&index, "List<Color>"), "collection:Color");
        assert_eq!(classify_text(&index, "Set<?>"), "collection:?");
        assert_eq!(classify_text(&index, "List"), "collection:raw");
        assert_eq!(classify_text(&index, "Bag"), "collection:String");
        assert_eq!(classify_text(&index, "Color"), "enum");
        assert_eq!(classify_text(&index, "Map<String,Color>"), "opaque");
        assert_eq!(classify_text(&index, "Holder<Color>"), "composite:com.acme.Shapes.Holder");
        assert_eq!(classify_text(&index, "org.nowhere.Ghost"), "unresolvable");
    }

    #[test]
    fn bound_placeholder_classifies_as_its_binding() {
        let index = index();
        let classifier = Classifier::new(&index, vec!["java.".to_string()]);
        let bound: Bindings = [("T".to_string(), TypeRef::class("java.lang.Integer"))].into_iter().collect();
        let t = TypeRef::param("T");
        assert_eq!(classifier.classify(&t, &bound), Category::Scalar("Integer".into()));
        assert_eq!(classifier.classify(&t, &Bindings::new()), Category::Placeholder);
    }
}
