//! Declaration-level recursive-descent parser.
//!
//! Reads packages, imports, (nested) type declarations, fields, method
//! signatures, enum constants and annotations. Method bodies, initializers
//! and annotation-type bodies are skipped by bracket balancing.
use super::ast::{
    Annotation, AnnotationValue, ClassDecl, CompilationUnit, Field, Import, Method, Modifiers, Param,
    TypeArg, TypeExpr,
};
use super::javadoc::Javadoc;
use super::lexer::{tokenize, Tok, Token};
use super::ParseError;
use crate::types::DeclKind;

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "protected", "private", "static", "final", "abstract", "transient", "volatile",
    "synchronized", "native", "strictfp", "default", "sealed",
];

pub fn parse_unit(src: &str) -> Result<CompilationUnit, ParseError> {
    Parser::new(tokenize(src)?).unit()
}

/// Parse a standalone type such as `Page<List<User>>` or `int[]`.
pub fn parse_type_expr(src: &str) -> Result<TypeExpr, ParseError> {
    let mut parser = Parser::new(tokenize(src)?);
    let ty = parser.type_expr()?;
    if !matches!(parser.peek(), Tok::Eof) {
        return Err(parser.error("unexpected trailing input after type"));
    }
    Ok(ty)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // -------------------------------- cursor -------------------------------- //

    fn peek(&self) -> &Tok {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> &Tok {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].tok
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos.min(self.tokens.len() - 1)].line
    }

    fn bump(&mut self) -> Tok {
        let tok = self.peek().clone();
        if !matches!(tok, Tok::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line(), message)
    }

    fn is_punct(&self, c: char) -> bool {
        *self.peek() == Tok::Punct(c)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        let hit = self.is_punct(c);
        if hit {
            self.bump();
        }
        hit
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{c}`, found {:?}", self.peek())))
        }
    }

    fn is_ident(&self, word: &str) -> bool {
        matches!(self.peek(), Tok::Ident(s) if s == word)
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        let hit = self.is_ident(word);
        if hit {
            self.bump();
        }
        hit
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Tok::Ident(s) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    /// `a.b.c`, stopping before a trailing `.*`.
    fn qualified(&mut self) -> Result<String, ParseError> {
        let mut name = self.ident()?;
        while self.is_punct('.') && matches!(self.peek_at(1), Tok::Ident(_)) {
            self.bump();
            name.push('.');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    fn doc_here(&self) -> Option<Javadoc> {
        self.tokens.get(self.pos).and_then(|t| t.doc.as_deref()).map(Javadoc::parse)
    }

    /// Skip from an opening bracket to its partner, inclusive.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let line = self.line();
        let mut depth = 0usize;
        loop {
            match self.bump() {
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Tok::Eof => return Err(ParseError::new(line, "unbalanced brackets")),
                _ => {}
            }
        }
    }

    // ------------------------------ structure ------------------------------- //

    fn unit(&mut self) -> Result<CompilationUnit, ParseError> {
        let mut unit = CompilationUnit::default();
        let mut pending = None;

        let doc = self.doc_here();
        let modifiers = self.modifiers()?;
        if self.eat_ident("package") {
            unit.package = Some(self.qualified()?);
            self.expect_punct(';')?;
        } else if !is_empty(&modifiers) {
            pending = Some((doc, modifiers));
        }

        loop {
            if matches!(self.peek(), Tok::Eof) {
                break;
            }
            if self.eat_punct(';') {
                continue;
            }
            if pending.is_none() && self.is_ident("import") {
                unit.imports.push(self.import()?);
                continue;
            }
            let (doc, modifiers) = match pending.take() {
                Some(p) => p,
                None => (self.doc_here(), self.modifiers()?),
            };
            match self.type_decl(doc, modifiers)? {
                Some(decl) => unit.types.push(decl),
                None => return Err(self.error(format!("expected a type declaration, found {:?}", self.peek()))),
            }
        }
        Ok(unit)
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        self.bump();
        let is_static = self.eat_ident("static");
        let path = self.qualified()?;
        let on_demand = self.eat_punct('.');
        if on_demand {
            self.expect_punct('*')?;
        }
        self.expect_punct(';')?;
        Ok(Import { path, is_static, on_demand })
    }

    fn modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::default();
        loop {
            match self.peek() {
                Tok::Punct('@') if !matches!(self.peek_at(1), Tok::Ident(s) if s == "interface") => {
                    modifiers.annotations.push(self.annotation()?);
                }
                Tok::Ident(word) if MODIFIER_KEYWORDS.contains(&word.as_str()) => {
                    modifiers.keywords.push(word.clone());
                    self.bump();
                }
                Tok::Ident(word)
                    if word == "non"
                        && *self.peek_at(1) == Tok::Punct('-')
                        && matches!(self.peek_at(2), Tok::Ident(s) if s == "sealed") =>
                {
                    modifiers.keywords.push("non-sealed".to_string());
                    self.pos += 3;
                }
                _ => return Ok(modifiers),
            }
        }
    }

    fn type_decl(&mut self, doc: Option<Javadoc>, modifiers: Modifiers) -> Result<Option<ClassDecl>, ParseError> {
        let kind = match self.peek() {
            Tok::Ident(s) if s == "class" => DeclKind::Class,
            Tok::Ident(s) if s == "interface" => DeclKind::Interface,
            Tok::Ident(s) if s == "enum" => DeclKind::Enum,
            Tok::Ident(s) if s == "record" && matches!(self.peek_at(1), Tok::Ident(_))
                && matches!(self.peek_at(2), Tok::Punct('(' | '<')) => DeclKind::Record,
            Tok::Punct('@') if matches!(self.peek_at(1), Tok::Ident(s) if s == "interface") => {
                self.pos += 2;
                let mut decl = ClassDecl::new(DeclKind::Annotation, self.ident()?);
                decl.doc = doc;
                decl.modifiers = modifiers;
                self.skip_balanced()?;
                return Ok(Some(decl));
            }
            _ => return Ok(None),
        };
        self.bump();

        let mut decl = ClassDecl::new(kind, self.ident()?);
        decl.doc = doc;
        decl.modifiers = modifiers;
        if self.is_punct('<') {
            decl.type_params = self.type_params()?;
        }
        if kind == DeclKind::Record {
            self.record_components(&mut decl)?;
        }
        loop {
            if self.eat_ident("extends") {
                decl.extends = self.type_list()?;
            } else if self.eat_ident("implements") {
                decl.implements = self.type_list()?;
            } else if self.eat_ident("permits") {
                self.type_list()?;
            } else {
                break;
            }
        }
        self.class_body(&mut decl)?;
        Ok(Some(decl))
    }

    fn record_components(&mut self, decl: &mut ClassDecl) -> Result<(), ParseError> {
        self.expect_punct('(')?;
        if self.eat_punct(')') {
            return Ok(());
        }
        loop {
            let modifiers = self.modifiers()?;
            let mut ty = self.type_expr()?;
            if *self.peek() == Tok::Ellipsis {
                self.bump();
                ty.dims += 1;
            }
            let name = self.ident()?;
            decl.fields.push(Field { doc: None, modifiers, ty, name });
            if self.eat_punct(',') {
                continue;
            }
            return self.expect_punct(')');
        }
    }

    fn class_body(&mut self, decl: &mut ClassDecl) -> Result<(), ParseError> {
        self.expect_punct('{')?;
        if decl.kind == DeclKind::Enum {
            self.enum_constants(decl)?;
        }
        loop {
            if self.eat_punct('}') {
                return Ok(());
            }
            if matches!(self.peek(), Tok::Eof) {
                return Err(self.error(format!("unexpected end of file in body of `{}`", decl.name)));
            }
            if self.eat_punct(';') {
                continue;
            }
            self.member(decl)?;
        }
    }

    fn enum_constants(&mut self, decl: &mut ClassDecl) -> Result<(), ParseError> {
        loop {
            if self.eat_punct(';') || self.is_punct('}') {
                return Ok(());
            }
            self.modifiers()?;
            decl.enum_constants.push(self.ident()?);
            if self.is_punct('(') {
                self.skip_balanced()?;
            }
            if self.is_punct('{') {
                self.skip_balanced()?;
            }
            if self.eat_punct(',') {
                continue;
            }
            if self.eat_punct(';') || self.is_punct('}') {
                return Ok(());
            }
            return Err(self.error(format!("malformed enum constant in `{}`", decl.name)));
        }
    }

    fn member(&mut self, decl: &mut ClassDecl) -> Result<(), ParseError> {
        let doc = self.doc_here();
        let modifiers = self.modifiers()?;
        if self.is_punct('{') {
            // instance or static initializer
            return self.skip_balanced();
        }
        if let Some(nested) = self.type_decl(doc.clone(), modifiers.clone())? {
            decl.nested.push(nested);
            return Ok(());
        }
        let type_params = if self.is_punct('<') { self.type_params()? } else { Vec::new() };

        let is_constructor = matches!(self.peek(), Tok::Ident(s) if *s == decl.name)
            && *self.peek_at(1) == Tok::Punct('(');
        if is_constructor {
            self.bump();
            self.skip_balanced()?;
            return self.method_tail();
        }

        let ty = self.type_expr()?;
        let name = self.ident()?;
        if self.is_punct('(') {
            let params = self.params()?;
            let mut return_type = ty;
            return_type.dims += self.dims();
            self.method_tail()?;
            decl.methods.push(Method { doc, modifiers, type_params, return_type, name, params });
            return Ok(());
        }

        let mut name = name;
        loop {
            let mut field_ty = ty.clone();
            field_ty.dims += self.dims();
            decl.fields.push(Field { doc: doc.clone(), modifiers: modifiers.clone(), ty: field_ty, name });
            if self.eat_punct('=') {
                self.skip_initializer()?;
            }
            if self.eat_punct(';') {
                return Ok(());
            }
            if self.eat_punct(',') {
                name = self.ident()?;
                continue;
            }
            return Err(self.error(format!("expected `;` after field in `{}`", decl.name)));
        }
    }

    /// `throws ...` then a body, `;`, or an annotation-member default.
    fn method_tail(&mut self) -> Result<(), ParseError> {
        if self.eat_ident("throws") {
            self.type_list()?;
        }
        if self.is_punct('{') {
            return self.skip_balanced();
        }
        if self.eat_ident("default") {
            while !self.is_punct(';') {
                if matches!(self.bump(), Tok::Eof) {
                    return Err(self.error("unterminated default value"));
                }
            }
        }
        self.expect_punct(';')
    }

    /// Stop (without consuming) at the `;` or declarator `,` ending an initializer.
    fn skip_initializer(&mut self) -> Result<(), ParseError> {
        let line = self.line();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Tok::Eof => return Err(ParseError::new(line, "unterminated field initializer")),
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                Tok::Punct(';') if depth == 0 => return Ok(()),
                Tok::Punct(',') if depth == 0 && self.next_is_declarator() => return Ok(()),
                _ => {}
            }
            self.bump();
        }
    }

    fn next_is_declarator(&self) -> bool {
        matches!(self.peek_at(1), Tok::Ident(_)) && matches!(self.peek_at(2), Tok::Punct('=' | ',' | ';' | '['))
    }

    fn params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        if self.eat_punct(')') {
            return Ok(params);
        }
        loop {
            let modifiers = self.modifiers()?;
            let mut ty = self.type_expr()?;
            if *self.peek() == Tok::Ellipsis {
                self.bump();
                ty.dims += 1;
            }
            let name = if self.eat_ident("this") { "this".to_string() } else { self.ident()? };
            ty.dims += self.dims();
            params.push(Param { modifiers, ty, name });
            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            return Ok(params);
        }
    }

    // -------------------------------- types --------------------------------- //

    fn type_params(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect_punct('<')?;
        let mut names = Vec::new();
        loop {
            self.modifiers()?;
            names.push(self.ident()?);
            if self.eat_ident("extends") {
                self.type_expr()?;
                while self.eat_punct('&') {
                    self.type_expr()?;
                }
            }
            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct('>')?;
            return Ok(names);
        }
    }

    fn type_list(&mut self) -> Result<Vec<TypeExpr>, ParseError> {
        let mut out = vec![self.type_expr()?];
        while self.eat_punct(',') {
            out.push(self.type_expr()?);
        }
        Ok(out)
    }

    fn type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        self.modifiers()?;
        let mut ty = TypeExpr::named(self.ident()?);
        if self.is_punct('<') {
            ty.args = self.type_args()?;
        }
        while self.is_punct('.') && matches!(self.peek_at(1), Tok::Ident(_) | Tok::Punct('@')) {
            self.bump();
            self.modifiers()?;
            ty.name.push('.');
            ty.name.push_str(&self.ident()?);
            if self.is_punct('<') {
                ty.args = self.type_args()?;
            }
        }
        ty.dims = self.dims();
        Ok(ty)
    }

    fn type_args(&mut self) -> Result<Vec<TypeArg>, ParseError> {
        self.expect_punct('<')?;
        let mut args = Vec::new();
        if self.eat_punct('>') {
            return Ok(args);
        }
        loop {
            self.modifiers()?;
            let arg = if self.eat_punct('?') {
                if self.eat_ident("extends") {
                    TypeArg::Extends(self.type_expr()?)
                } else if self.eat_ident("super") {
                    TypeArg::Super(self.type_expr()?)
                } else {
                    TypeArg::Wildcard
                }
            } else {
                TypeArg::Type(self.type_expr()?)
            };
            args.push(arg);
            if self.eat_punct(',') {
                continue;
            }
            self.expect_punct('>')?;
            return Ok(args);
        }
    }

    fn dims(&mut self) -> usize {
        let mut dims = 0;
        while self.is_punct('[') && *self.peek_at(1) == Tok::Punct(']') {
            self.pos += 2;
            dims += 1;
        }
        dims
    }

    // ----------------------------- annotations ------------------------------ //

    fn annotation(&mut self) -> Result<Annotation, ParseError> {
        self.expect_punct('@')?;
        let name = self.qualified()?;
        let mut args = Vec::new();
        if self.eat_punct('(') {
            if !self.is_punct(')') {
                let named = matches!(self.peek(), Tok::Ident(_)) && *self.peek_at(1) == Tok::Punct('=');
                if named {
                    loop {
                        let key = self.ident()?;
                        self.expect_punct('=')?;
                        args.push((key, self.element_value()?));
                        if !self.eat_punct(',') {
                            break;
                        }
                    }
                } else {
                    args.push(("value".to_string(), self.element_value()?));
                }
            }
            self.expect_punct(')')?;
        }
        Ok(Annotation { name, args })
    }

    fn element_value(&mut self) -> Result<AnnotationValue, ParseError> {
        if self.eat_punct('{') {
            let mut items = Vec::new();
            loop {
                if self.eat_punct('}') {
                    return Ok(AnnotationValue::List(items));
                }
                items.push(self.element_value()?);
                if !self.eat_punct(',') {
                    self.expect_punct('}')?;
                    return Ok(AnnotationValue::List(items));
                }
            }
        }
        if self.is_punct('@') {
            self.annotation()?;
            return Ok(AnnotationValue::Other);
        }

        // Plain expression up to the next top-level `,` `)` or `}`.
        let mut parts = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Tok::Eof => return Err(self.error("unterminated annotation")),
                Tok::Punct(',' | ')' | '}') if depth == 0 => break,
                Tok::Punct('(' | '[' | '{') => depth += 1,
                Tok::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                _ => {}
            }
            parts.push(self.bump());
        }
        Ok(expression_value(&parts))
    }
}

fn is_empty(modifiers: &Modifiers) -> bool {
    modifiers.keywords.is_empty() && modifiers.annotations.is_empty()
}

/// `"a" + "b"` folds to a literal, `A.B.C` stays a name, anything else is opaque.
fn expression_value(parts: &[Tok]) -> AnnotationValue {
    let mut literal = String::new();
    let all_literal = !parts.is_empty() && parts.iter().enumerate().all(|(i, tok)| match tok {
        Tok::Str(s) if i % 2 == 0 => {
            literal.push_str(s);
            true
        }
        Tok::Punct('+') => i % 2 == 1,
        _ => false,
    });
    if all_literal && parts.len() % 2 == 1 {
        return AnnotationValue::Literal(literal);
    }
    let mut name = String::new();
    let is_name = parts.len() % 2 == 1 && parts.iter().enumerate().all(|(i, tok)| match tok {
        Tok::Ident(s) if i % 2 == 0 => {
            name.push_str(s);
            true
        }
        Tok::Punct('.') if i % 2 == 1 => {
            name.push('.');
            true
        }
        _ => false,
    });
    if is_name {
        return AnnotationValue::Name(name);
    }
    AnnotationValue::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLER: &str = r#"
        package com.acme.web;

        import com.acme.model.*;
        import org.springframework.web.bind.annotation.*;
        import static java.util.Collections.emptyList;

        /**
         * User endpoints
         * @menu Accounts
         */
        @RestController
        @RequestMapping(value = "/users", produces = {"application/json"})
        public class UserController<X> extends BaseController implements Api, Audited {
            private static final String PREFIX = "/v" + 1, OTHER = "x";
            private final Map<String, List<Integer>> cache = new HashMap<String, List<Integer>>(), spare;
            int[] counts, matrix[];

            static { init(); }

            public UserController(UserService service) { this.service = service; }

            /** Fetch one user. */
            @GetMapping("/{id}")
            public Result<User> get(@PathVariable("id") Long id, @RequestParam(value = "v", required = false) String... tags) throws IOException {
                Runnable r = () -> { if (id > 0) { return; } };
                return null;
            }

            @RequestMapping(path = "/" + "search", method = {RequestMethod.POST, RequestMethod.PUT})
            public <T> Page<T> search(@RequestBody final Query<? extends T> query) { return null; }

            public abstract void ping();

            public enum Kind { A("a") { void x() {} }, B, ; Kind() {} Kind(String s) {} }
            record Point(int x, @Min(0) int y) implements Shape {}
            @interface Marker { String value() default "}"; }
            sealed interface Shape permits Point {}
            non-sealed class Free {}
        }
    "#;

    #[test]
    fn parses_controller_shape() {
        let unit = parse_unit(CONTROLLER).unwrap();
        assert_eq!(unit.package.as_deref(), Some("com.acme.web"));
        assert_eq!(unit.imports.len(), 3);
        assert!(unit.imports[0].on_demand);
        assert!(unit.imports[2].is_static);

        let class = &unit.types[0];
        assert_eq!(class.name, "UserController");
        assert_eq!(class.type_params, ["X"]);
        assert_eq!(class.extends[0].name, "BaseController");
        assert_eq!(class.implements.len(), 2);
        assert_eq!(class.doc.as_ref().unwrap().tag("menu"), Some("Accounts"));

        let mapping = class.modifiers.annotation("RequestMapping").unwrap();
        assert_eq!(mapping.strings("value"), ["/users"]);
        assert_eq!(mapping.strings("produces"), ["application/json"]);

        let names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["PREFIX", "OTHER", "cache", "spare", "counts", "matrix"]);
        assert_eq!(class.fields[5].ty.dims, 2);
        assert_eq!(class.fields[2].ty.args.len(), 2);
        assert!(class.fields[0].modifiers.has("static"));
    }

    #[test]
    fn parses_method_signatures() {
        let unit = parse_unit(CONTROLLER).unwrap();
        let class = &unit.types[0];
        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["get", "search", "ping"]);

        let get = &class.methods[0];
        assert_eq!(get.doc.as_ref().unwrap().summary.as_deref(), Some("Fetch one user."));
        assert_eq!(get.return_type.name, "Result");
        assert_eq!(get.params.len(), 2);
        assert_eq!(get.params[0].modifiers.annotation("PathVariable").unwrap().strings("value"), ["id"]);
        assert_eq!(get.params[1].ty.dims, 1);

        let search = &class.methods[1];
        assert_eq!(search.type_params, ["T"]);
        let mapping = search.modifiers.annotation("RequestMapping").unwrap();
        assert_eq!(mapping.strings("path"), ["/search"]);
        assert_eq!(mapping.names("method"), ["POST", "PUT"]);
        assert!(matches!(search.params[0].ty.args[0], TypeArg::Extends(_)));
        assert_eq!(class.methods[2].return_type.name, "void");
    }

    #[test]
    fn parses_nested_declarations() {
        let unit = parse_unit(CONTROLLER).unwrap();
        let nested = &unit.types[0].nested;
        let kinds: Vec<_> = nested.iter().map(|n| (n.name.as_str(), n.kind)).collect();
        assert_eq!(kinds, [
            ("Kind", DeclKind::Enum),
            ("Point", DeclKind::Record),
            ("Marker", DeclKind::Annotation),
            ("Shape", DeclKind::Interface),
            ("Free", DeclKind::Class),
        ]);
        assert_eq!(nested[0].enum_constants, ["A", "B"]);
        let point: Vec<_> = nested[1].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(point, ["x", "y"]);
    }

    #[test]
    fn standalone_type_text() {
        let ty = parse_type_expr("Map<String, List<Pair<A,B>>>[]").unwrap();
        assert_eq!(ty.name, "Map");
        assert_eq!(ty.dims, 1);
        let TypeArg::Type(list) = &ty.args[1] else { panic!("expected type arg") };
        assert_eq!(list.name, "List");
        assert!(parse_type_expr("List<String> extra").is_err());
    }

    #[test]
    fn reports_line_of_error() {
        let err = parse_unit("package a;\n\nclass A {\n  int x\n}").unwrap_err();
        assert_eq!(err.line, 5);
    }
}
