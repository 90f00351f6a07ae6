//! Token stream for the declaration-level Java parser.
//!
//! Only what declarations need survives: identifiers, literals, single-char
//! punctuation and `...`. Comments are dropped, except that a `/** ... */`
//! block is attached to the next token as its javadoc.
use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Str(String),
    Char,
    Number,
    Punct(char),
    Ellipsis,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub line: u32,
    /// Raw javadoc text directly preceding this token.
    pub doc: Option<String>,
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    Lexer { chars: src.chars().collect(), pos: 0, line: 1 }.run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl Lexer {
    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        let mut doc: Option<String> = None;
        loop {
            let Some(c) = self.peek(0) else { break };
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if self.starts_with("//") {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            if self.starts_with("/*") {
                let is_doc = self.starts_with("/**") && !self.starts_with("/**/");
                let text = self.block_comment()?;
                if is_doc {
                    doc = Some(text);
                }
                continue;
            }
            let line = self.line;
            let tok = self.token()?;
            out.push(Token { tok, line, doc: doc.take() });
        }
        out.push(Token { tok: Tok::Eof, line: self.line, doc: None });
        Ok(out)
    }

    fn block_comment(&mut self) -> Result<String, ParseError> {
        let line = self.line;
        let start = self.pos;
        self.pos += 2;
        while self.peek(0).is_some() {
            if self.starts_with("*/") {
                self.pos += 2;
                return Ok(self.chars[start..self.pos].iter().collect());
            }
            self.bump();
        }
        Err(ParseError::new(line, "unterminated comment"))
    }

    fn token(&mut self) -> Result<Tok, ParseError> {
        let line = self.line;
        let c = self.peek(0).unwrap_or('\0');
        if self.starts_with("\"\"\"") {
            self.pos += 3;
            let mut text = String::new();
            while !self.starts_with("\"\"\"") {
                match self.bump() {
                    Some('\\') => {
                        self.bump();
                    }
                    Some(c) => text.push(c),
                    None => return Err(ParseError::new(line, "unterminated text block")),
                }
            }
            self.pos += 3;
            return Ok(Tok::Str(text));
        }
        if c == '"' || c == '\'' {
            self.bump();
            let text = self.quoted(c, line)?;
            return Ok(if c == '"' { Tok::Str(text) } else { Tok::Char });
        }
        if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
            while let Some(d) = self.peek(0) {
                if d.is_ascii_alphanumeric() || d == '_' || d == '.' {
                    let exponent = matches!(d, 'e' | 'E' | 'p' | 'P');
                    self.bump();
                    if exponent && matches!(self.peek(0), Some('+' | '-')) {
                        self.bump();
                    }
                } else {
                    break;
                }
            }
            return Ok(Tok::Number);
        }
        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut ident = String::new();
            while let Some(d) = self.peek(0) {
                if d.is_alphanumeric() || d == '_' || d == '$' {
                    ident.push(d);
                    self.bump();
                } else {
                    break;
                }
            }
            return Ok(Tok::Ident(ident));
        }
        if self.starts_with("...") {
            self.pos += 3;
            return Ok(Tok::Ellipsis);
        }
        self.bump();
        Ok(Tok::Punct(c))
    }

    fn quoted(&mut self, quote: char, line: u32) -> Result<String, ParseError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\\') => {
                    let escaped = self.bump().ok_or_else(|| ParseError::new(line, "unterminated literal"))?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                Some(c) if c == quote => return Ok(text),
                Some('\n') | None => return Err(ParseError::new(line, "unterminated literal")),
                Some(c) => text.push(c),
            }
        }
    }
}
