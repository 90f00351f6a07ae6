//! Type descriptors shared by the Java source index and the mock synthesizer.
//!
//! `TypeRef` is what a use site says (`List<User>`, `T`, `int[]`); `TypeDecl`
//! is what a declaration says (fields, type parameters, supertypes). The
//! synthesizer only ever reads these through the [`TypeSource`] trait.
use std::collections::HashMap;
use std::fmt;

// ————————————————————————————————————————————————————————————————————————————
// TYPE REFERENCES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "boolean" => Self::Boolean,
            "byte" => Self::Byte,
            "char" => Self::Char,
            "short" => Self::Short,
            "int" => Self::Int,
            "long" => Self::Long,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

/// Bound of a `?` type argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wildcard {
    Any,
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// `void`: never a valid synthesis target.
    Void,
    Primitive(Primitive),
    /// A named class, interface, enum or record. `name` is fully qualified
    /// whenever the index could resolve it.
    Class { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    /// A type parameter in scope at the use site (`T` in `List<T>`).
    Param(String),
    Wildcard(Wildcard),
}

impl TypeRef {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class { name: name.into(), args: Vec::new() }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Class { name: name.into(), args }
    }

    pub fn param(name: impl Into<String>) -> Self {
        TypeRef::Param(name.into())
    }

    pub fn array_of(elem: TypeRef) -> Self {
        TypeRef::Array(Box::new(elem))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Innermost element of a (possibly multi-dimensional) array; `self` otherwise.
    pub fn deep_component(&self) -> &TypeRef {
        match self {
            TypeRef::Array(elem) => elem.deep_component(),
            other => other,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRef::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Last segment of a class name (`java.util.List` → `List`).
    pub fn simple_name(&self) -> Option<&str> {
        self.class_name().map(simple_name)
    }

    pub fn type_args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Class { args, .. } => args,
            _ => &[],
        }
    }

    /// True when a type parameter occurs anywhere inside this reference.
    pub fn contains_param(&self) -> bool {
        match self {
            TypeRef::Param(_) => true,
            TypeRef::Class { args, .. } => args.iter().any(TypeRef::contains_param),
            TypeRef::Array(elem) => elem.contains_param(),
            TypeRef::Wildcard(Wildcard::Extends(bound) | Wildcard::Super(bound)) => bound.contains_param(),
            TypeRef::Wildcard(Wildcard::Any) | TypeRef::Void | TypeRef::Primitive(_) => false,
        }
    }

    /// Fully qualified text with generic arguments, e.g. `java.util.List<com.acme.User>`.
    pub fn canonical_text(&self) -> String {
        self.render(true)
    }

    /// Short display text, e.g. `List<User>`.
    pub fn presentable_text(&self) -> String {
        self.render(false)
    }

    fn render(&self, qualified: bool) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive(p) => p.keyword().to_string(),
            TypeRef::Param(name) => name.clone(),
            TypeRef::Array(elem) => format!("{}[]", elem.render(qualified)),
            TypeRef::Wildcard(Wildcard::Any) => "?".to_string(),
            TypeRef::Wildcard(Wildcard::Extends(bound)) => format!("? extends {}", bound.render(qualified)),
            TypeRef::Wildcard(Wildcard::Super(bound)) => format!("? super {}", bound.render(qualified)),
            TypeRef::Class { name, args } => {
                let mut out = if qualified { name.clone() } else { simple_name(name).to_string() };
                if !args.is_empty() {
                    let args = args.iter().map(|a| a.render(qualified)).collect::<Vec<_>>();
                    let sep = if qualified { "," } else { ", " };
                    out.push('<');
                    out.push_str(&args.join(sep));
                    out.push('>');
                }
                out
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATIONS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    pub is_transient: bool,
}

impl FieldDecl {
    /// Static and transient fields never reach the wire.
    pub fn is_serialized(&self) -> bool {
        !self.is_static && !self.is_transient
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    /// Fully qualified name; nested types use `Outer.Inner`.
    pub name: String,
    pub kind: DeclKind,
    pub type_params: Vec<String>,
    pub superclass: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub enum_constants: Vec<String>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == DeclKind::Enum
    }

    /// Direct supertypes, superclass first, with the declaration's own
    /// type parameters left unsubstituted.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass.iter().chain(self.interfaces.iter())
    }
}

/// Read-only view over whatever knows the declarations behind class names.
pub trait TypeSource {
    fn declaration(&self, name: &str) -> Option<&TypeDecl>;
}

impl TypeSource for HashMap<String, TypeDecl> {
    fn declaration(&self, name: &str) -> Option<&TypeDecl> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_presentable_text() {
        let ty = TypeRef::generic(
            "java.util.Map",
            vec![
                TypeRef::class("java.lang.String"),
                TypeRef::generic("java.util.List", vec![TypeRef::param("T")]),
            ],
        );
        assert_eq!(ty.canonical_text(), "java.util.Map<java.lang.String,java.util.List<T>>");
        assert_eq!(ty.presentable_text(), "Map<String, List<T>>");
        assert!(ty.contains_param());
    }

    #[test]
    fn deep_component_unwraps_every_dimension() {
        let ty = TypeRef::array_of(TypeRef::array_of(TypeRef::Primitive(Primitive::Int)));
        assert_eq!(ty.canonical_text(), "int[][]");
        assert_eq!(ty.deep_component(), &TypeRef::Primitive(Primitive::Int));
    }

    #[test]
    fn wildcard_text() {
        let ty = TypeRef::generic(
            "java.util.List",
            vec![TypeRef::Wildcard(Wildcard::Extends(Box::new(TypeRef::class("com.acme.User"))))],
        );
        assert_eq!(ty.canonical_text(), "java.util.List<? extends com.acme.User>");
        assert!(!ty.contains_param());
    }
}
