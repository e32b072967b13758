//! Recursive-descent parser for markup programs.
//!
//! A program is a statement list. Inline programs are restricted to a single
//! expression statement by the evaluator; the deferred form allows `let`
//! bindings and `render(...)` calls. Type annotations (`{count: Int}`,
//! `let x: String = ...`) belong to the typed superset and only parse when
//! the typed flag is set.

use crate::error::{MarkupError, Result};

/// One statement of a program.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = expr` (annotation optional in typed mode).
    Let { name: String, value: Expr },
    /// `render(expr)` — drives the deferred settlement.
    Render(Expr),
    /// A bare expression; its value is the inline program's result.
    Expr(Expr),
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
    /// Identifier with optional field accesses: `user.name`.
    Path(Vec<String>),
    Element(ElementExpr),
    /// Typed-superset annotation, checked against the value's shape.
    Annotated { expr: Box<Expr>, ty: TypeTag },
}

/// An unevaluated element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementExpr {
    pub tag: String,
    pub attrs: Vec<(String, AttrValue)>,
    pub children: Vec<Child>,
}

/// An attribute's right-hand side.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// `attr="literal"`
    Literal(String),
    /// `attr={expr}`
    Expr(Expr),
    /// Bare attribute: `<input disabled />`
    Flag,
}

/// One child of an element body.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Text(String),
    Element(ElementExpr),
    Expr(Expr),
}

/// Annotation of the typed superset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Str,
    Int,
    Float,
    Bool,
    Element,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Str => "String",
            TypeTag::Int => "Int",
            TypeTag::Float => "Float",
            TypeTag::Bool => "Bool",
            TypeTag::Element => "Element",
        }
    }
}

/// Parse a program. `typed` gates the annotation syntax.
pub fn parse(source: &str, typed: bool) -> Result<Vec<Stmt>> {
    let mut parser = Parser::new(source, typed);
    parser.program()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    typed: bool,
}

impl Parser {
    fn new(source: &str, typed: bool) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            typed,
        }
    }

    fn program(&mut self) -> Result<Vec<Stmt>> {
        let mut stmts = Vec::new();
        self.skip_ws();
        while self.pos < self.chars.len() {
            stmts.push(self.statement()?);
            self.skip_ws();
        }
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt> {
        if self.keyword("let") {
            self.skip_ws();
            let name = self.ident()?;
            self.skip_ws();
            let annotation = self.annotation()?;
            self.skip_ws();
            self.expect('=')?;
            let mut value = self.expr()?;
            if let Some(ty) = annotation {
                value = Expr::Annotated {
                    expr: Box::new(value),
                    ty,
                };
            }
            self.skip_ws();
            self.eat(';');
            return Ok(Stmt::Let { name, value });
        }

        if self.keyword("render") {
            self.skip_ws();
            self.expect('(')?;
            let expr = self.expr()?;
            self.skip_ws();
            self.expect(')')?;
            self.skip_ws();
            self.eat(';');
            return Ok(Stmt::Render(expr));
        }

        let expr = self.expr()?;
        self.skip_ws();
        self.eat(';');
        Ok(Stmt::Expr(expr))
    }

    fn expr(&mut self) -> Result<Expr> {
        self.skip_ws();
        match self.peek() {
            Some('<') => Ok(Expr::Element(self.element()?)),
            Some('"') => Ok(Expr::Str(self.string_lit()?)),
            Some(c) if c.is_ascii_digit() || c == '-' => self.number(),
            Some(c) if is_ident_start(c) => self.path_or_literal(),
            Some(c) => Err(self.error(format!("expected an expression, found `{c}`"))),
            None => Err(self.error("expected an expression, found end of input")),
        }
    }

    fn path_or_literal(&mut self) -> Result<Expr> {
        let first = self.ident()?;
        match first.as_str() {
            "true" => return Ok(Expr::Bool(true)),
            "false" => return Ok(Expr::Bool(false)),
            "null" => return Ok(Expr::Null),
            _ => {}
        }

        let mut segments = vec![first];
        while self.peek() == Some('.') && self.peek_at(1).is_some_and(is_ident_start) {
            self.bump();
            segments.push(self.ident()?);
        }
        Ok(Expr::Path(segments))
    }

    fn element(&mut self) -> Result<ElementExpr> {
        self.expect('<')?;
        let tag = self.tag_name()?;
        let mut attrs = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                Some('/') => {
                    self.bump();
                    self.expect('>')?;
                    return Ok(ElementExpr {
                        tag,
                        attrs,
                        children: Vec::new(),
                    });
                }
                Some('>') => {
                    self.bump();
                    break;
                }
                Some(c) if is_ident_start(c) => {
                    let name = self.tag_name()?;
                    self.skip_ws();
                    if self.eat('=') {
                        self.skip_ws();
                        let value = match self.peek() {
                            Some('"') => AttrValue::Literal(self.string_lit()?),
                            Some('{') => AttrValue::Expr(self.braced_expr()?),
                            _ => {
                                return Err(self.error(format!(
                                    "attribute `{name}` needs a string or {{expression}} value"
                                )));
                            }
                        };
                        attrs.push((name, value));
                    } else {
                        attrs.push((name, AttrValue::Flag));
                    }
                }
                Some(c) => return Err(self.error(format!("unexpected `{c}` in <{tag}>"))),
                None => return Err(self.error(format!("unclosed element <{tag}>"))),
            }
        }

        let children = self.children(&tag)?;
        Ok(ElementExpr {
            tag,
            attrs,
            children,
        })
    }

    fn children(&mut self, tag: &str) -> Result<Vec<Child>> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => return Err(self.error(format!("unclosed element <{tag}>"))),
                Some('<') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    let closing = self.tag_name()?;
                    self.skip_ws();
                    self.expect('>')?;
                    if closing != tag {
                        return Err(self.error(format!(
                            "mismatched closing tag: expected </{tag}>, found </{closing}>"
                        )));
                    }
                    return Ok(children);
                }
                Some('<') => children.push(Child::Element(self.element()?)),
                Some('{') => children.push(Child::Expr(self.braced_expr()?)),
                Some(_) => {
                    let text = self.raw_text();
                    if !text.chars().all(char::is_whitespace) {
                        children.push(Child::Text(text));
                    }
                }
            }
        }
    }

    /// `{ expr }` with an optional typed-superset annotation.
    fn braced_expr(&mut self) -> Result<Expr> {
        self.expect('{')?;
        let mut expr = self.expr()?;
        self.skip_ws();
        if let Some(ty) = self.annotation()? {
            expr = Expr::Annotated {
                expr: Box::new(expr),
                ty,
            };
            self.skip_ws();
        }
        self.expect('}')?;
        Ok(expr)
    }

    /// `: Type`, when present. Rejected outside the typed superset.
    fn annotation(&mut self) -> Result<Option<TypeTag>> {
        if self.peek() != Some(':') {
            return Ok(None);
        }
        if !self.typed {
            return Err(self.error("type annotations require typed mode"));
        }
        self.bump();
        self.skip_ws();
        let name = self.ident()?;
        let tag = match name.as_str() {
            "String" => TypeTag::Str,
            "Int" => TypeTag::Int,
            "Float" => TypeTag::Float,
            "Bool" => TypeTag::Bool,
            "Element" => TypeTag::Element,
            other => return Err(self.error(format!("unknown type `{other}`"))),
        };
        Ok(Some(tag))
    }

    fn raw_text(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '<' || c == '{' {
                break;
            }
            self.bump();
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn string_lit(&mut self) -> Result<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => return Err(self.error(format!("unknown escape `\\{c}`"))),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn number(&mut self) -> Result<Expr> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Expr::Number)
            .map_err(|_| self.error(format!("invalid number `{text}`")))
    }

    fn ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(c) if is_ident_start(c) => {}
            Some(c) => return Err(self.error(format!("expected a name, found `{c}`"))),
            None => return Err(self.error("expected a name, found end of input")),
        }
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Like `ident`, but dashes are allowed after the first character
    /// (custom-element style tags and attributes).
    fn tag_name(&mut self) -> Result<String> {
        let mut name = self.ident()?;
        while self.peek() == Some('-') && self.peek_at(1).is_some_and(is_ident_start) {
            self.bump();
            name.push('-');
            name.push_str(&self.ident()?);
        }
        Ok(name)
    }

    /// Consume `word` if it appears here as a whole keyword.
    fn keyword(&mut self, word: &str) -> bool {
        let end = self.pos + word.len();
        if end > self.chars.len() {
            return false;
        }
        let matches = self.chars[self.pos..end]
            .iter()
            .zip(word.chars())
            .all(|(&a, b)| a == b);
        if matches && !self.chars.get(end).copied().is_some_and(is_ident_continue) {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(self.error(format!("expected `{c}`, found `{found}`"))),
                None => Err(self.error(format!("expected `{c}`, found end of input"))),
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> MarkupError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..self.pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        MarkupError::Parse {
            line,
            column,
            message: message.into(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
