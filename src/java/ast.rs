// Syntactic declarations as written in a `.java` file. Names are unresolved.

use super::javadoc::Javadoc;
use crate::types::DeclKind;

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    /// `import a.b.*;`
    pub on_demand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Literal(String),
    /// Dotted name such as `RequestMethod.POST`.
    Name(String),
    List(Vec<AnnotationValue>),
    /// Anything we do not evaluate (expressions, nested annotations, numbers).
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    /// Positional argument is stored under `value`.
    pub args: Vec<(String, AnnotationValue)>,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        crate::types::simple_name(&self.name)
    }

    pub fn arg(&self, key: &str) -> Option<&AnnotationValue> {
        self.args.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// String literals under `key`, flattening `{"a", "b"}` lists.
    pub fn strings(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(value) = self.arg(key) {
            flatten(value, &mut out, |v| match v {
                AnnotationValue::Literal(s) => Some(s.clone()),
                _ => None,
            });
        }
        out
    }

    /// Last segments of dotted names under `key` (`RequestMethod.POST` → `POST`).
    pub fn names(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(value) = self.arg(key) {
            flatten(value, &mut out, |v| match v {
                AnnotationValue::Name(s) => Some(crate::types::simple_name(s).to_string()),
                _ => None,
            });
        }
        out
    }
}

fn flatten(value: &AnnotationValue, out: &mut Vec<String>, pick: impl Fn(&AnnotationValue) -> Option<String> + Copy) {
    match value {
        AnnotationValue::List(items) => items.iter().for_each(|v| flatten(v, out, pick)),
        other => out.extend(pick(other)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Modifiers {
    pub keywords: Vec<String>,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn has(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    pub fn annotation(&self, simple: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name() == simple)
    }
}

/// A type as written: `java.util.List<? extends User>[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeArg>,
    pub dims: usize,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), args: Vec::new(), dims: 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    Type(TypeExpr),
    Wildcard,
    Extends(TypeExpr),
    Super(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub doc: Option<Javadoc>,
    pub modifiers: Modifiers,
    pub ty: TypeExpr,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub modifiers: Modifiers,
    pub ty: TypeExpr,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub doc: Option<Javadoc>,
    pub modifiers: Modifiers,
    pub type_params: Vec<String>,
    pub return_type: TypeExpr,
    pub name: String,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub doc: Option<Javadoc>,
    pub modifiers: Modifiers,
    pub kind: DeclKind,
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Vec<TypeExpr>,
    pub implements: Vec<TypeExpr>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub enum_constants: Vec<String>,
    pub nested: Vec<ClassDecl>,
}

impl ClassDecl {
    pub fn new(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            doc: None,
            modifiers: Modifiers::default(),
            kind,
            name: name.into(),
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            enum_constants: Vec::new(),
            nested: Vec::new(),
        }
    }
}
