//! Recursive-descent parser for templates.
//!
//! Supported syntax:
//!
//! - HTML elements with quoted, unquoted, valueless and mustache attributes
//! - element modifiers `<div {{on "click" this.save}}>`
//! - `{{path params key=value}}` and trusting `{{{path}}}` mustaches
//! - `{{#path ... as |a b|}}...{{else}}...{{/path}}` blocks, including
//!   chained `{{else if cond}}` inverses
//! - `(sub expressions)`, string/number/boolean/null/undefined literals
//! - `{{! comments }}`, `{{!-- comments --}}` and `<!-- comments -->`

use crate::{
    ast::{
        AttrNode, AttrValue, Block, BlockStatement, CommentStatement, ConcatPart, ElementNode,
        Expression, Hash, HashPair, Literal, MustacheStatement, PathExpression, Span, Statement,
        SubExpression, Template, TextNode, is_void_tag,
    },
    error::{Result, SourceContext},
};

const DEFAULT_FILENAME: &str = "template.hbs";

/// Parse a template from a string (uses "template.hbs" as the filename)
pub fn parse(source: &str) -> Result<Template> {
    parse_with_filename(source, DEFAULT_FILENAME)
}

/// Parse a template with a custom filename for error reporting
pub fn parse_with_filename(source: &str, filename: &str) -> Result<Template> {
    let mut parser = Parser::new(source, filename);
    let (body, end) = parser.parse_statements()?;

    match end {
        End::Eof => Ok(Template {
            body,
            block_params: Vec::new(),
        }),
        End::CloseTag { name, span } => {
            Err(parser.ctx.unexpected(format!("unexpected closing tag </{}>", name), span))
        }
        End::CloseBlock { name, span } => Err(parser
            .ctx
            .unexpected(format!("unexpected closing block {{{{/{}}}}}", name), span)),
        End::Else { span, .. } => Err(parser
            .ctx
            .unexpected("{{else}} outside of a block", span)),
    }
}

/// What stopped a statement list.
enum End {
    Eof,
    CloseTag { name: String, span: Span },
    CloseBlock { name: String, span: Span },
    Else { span: Span, chained: Option<BlockHead> },
}

/// The opening part of a block: `{{#each items key="id" as |item|}}`.
struct BlockHead {
    path: Expression,
    params: Vec<Expression>,
    hash: Hash,
    block_params: Vec<String>,
    start: usize,
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    ctx: SourceContext,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, filename: &str) -> Self {
        Self {
            src,
            pos: 0,
            ctx: SourceContext::new(src, filename),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<()> {
        if self.eat(token) {
            return Ok(());
        }
        if self.eof() {
            return Err(self.ctx.unexpected_eof(format!("'{}'", token)));
        }
        let found = self.peek().map(String::from).unwrap_or_default();
        Err(self.ctx.unexpected(
            format!("expected '{}', found '{}'", token, found),
            self.span_from(self.pos),
        ))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos.max(start))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn at_tag_start(&self) -> bool {
        self.rest().starts_with('<')
            && self
                .peek_nth(1)
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
    }

    fn at_else(&self) -> bool {
        let rest = self.rest();
        rest.starts_with("{{else")
            && rest[6..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '}')
    }

    // ---- statements -------------------------------------------------------

    fn parse_statements(&mut self) -> Result<(Vec<Statement>, End)> {
        let mut body = Vec::new();

        loop {
            if self.eof() {
                return Ok((body, End::Eof));
            }

            let start = self.pos;
            let rest = self.rest();

            if rest.starts_with("</") {
                self.pos += 2;
                let name = self.take_while(is_tag_char).to_string();
                self.skip_whitespace();
                self.expect(">")?;
                let span = self.span_from(start);
                return Ok((body, End::CloseTag { name, span }));
            }

            if rest.starts_with("{{/") {
                self.pos += 3;
                self.skip_whitespace();
                let name = self.take_while(is_path_char).to_string();
                self.skip_whitespace();
                self.expect("}}")?;
                let span = self.span_from(start);
                return Ok((body, End::CloseBlock { name, span }));
            }

            if self.at_else() {
                self.pos += "{{else".len();
                self.skip_whitespace();
                let chained = if self.eat("}}") {
                    None
                } else {
                    let head = self.parse_block_head(start)?;
                    self.expect("}}")?;
                    Some(head)
                };
                let span = self.span_from(start);
                return Ok((body, End::Else { span, chained }));
            }

            let statement = if rest.starts_with("{{!") {
                Statement::Comment(self.parse_mustache_comment()?)
            } else if rest.starts_with("{{#") {
                self.pos += 3;
                self.skip_whitespace();
                let head = self.parse_block_head(start)?;
                self.expect("}}")?;
                let close_name = head_name(&head.path);
                Statement::Block(self.finish_block(head, &close_name)?)
            } else if rest.starts_with("{{") {
                Statement::Mustache(self.parse_mustache()?)
            } else if rest.starts_with("<!--") {
                Statement::Comment(self.parse_html_comment()?)
            } else if self.at_tag_start() {
                Statement::Element(self.parse_element()?)
            } else {
                Statement::Text(self.parse_text())
            };

            body.push(statement);
        }
    }

    fn parse_text(&mut self) -> TextNode {
        let start = self.pos;
        while !self.eof() {
            let rest = self.rest();
            if rest.starts_with("{{")
                || (self.pos > start && (self.at_tag_start() || rest.starts_with("<!--")))
            {
                break;
            }
            self.bump();
        }
        TextNode {
            chars: self.src[start..self.pos].to_string(),
            span: self.span_from(start),
        }
    }

    fn parse_mustache_comment(&mut self) -> Result<CommentStatement> {
        let start = self.pos;
        let (open, close) = if self.rest().starts_with("{{!--") {
            ("{{!--", "--}}")
        } else {
            ("{{!", "}}")
        };
        self.pos += open.len();

        let Some(offset) = self.rest().find(close) else {
            return Err(self.ctx.unexpected_eof(format!("'{}' to close comment", close)));
        };
        let value = self.rest()[..offset].to_string();
        self.pos += offset + close.len();

        Ok(CommentStatement {
            value,
            html: false,
            span: self.span_from(start),
        })
    }

    fn parse_html_comment(&mut self) -> Result<CommentStatement> {
        let start = self.pos;
        self.pos += "<!--".len();

        let Some(offset) = self.rest().find("-->") else {
            return Err(self.ctx.unexpected_eof("'-->' to close comment"));
        };
        let value = self.rest()[..offset].to_string();
        self.pos += offset + "-->".len();

        Ok(CommentStatement {
            value,
            html: true,
            span: self.span_from(start),
        })
    }

    fn parse_mustache(&mut self) -> Result<MustacheStatement> {
        let start = self.pos;
        let trusting = self.eat("{{{");
        if !trusting {
            self.expect("{{")?;
        }
        self.skip_whitespace();

        let (path, params, hash) = self.parse_call(start)?;
        self.skip_whitespace();
        self.expect(if trusting { "}}}" } else { "}}" })?;

        Ok(MustacheStatement {
            path,
            params,
            hash,
            trusting,
            span: self.span_from(start),
        })
    }

    fn parse_block_head(&mut self, start: usize) -> Result<BlockHead> {
        let (path, params, hash) = self.parse_call(start)?;
        self.skip_whitespace();

        let mut block_params = Vec::new();
        if self.eat("as") {
            self.skip_whitespace();
            self.expect("|")?;
            loop {
                self.skip_whitespace();
                if self.eat("|") {
                    break;
                }
                let name = self.take_while(is_ident_char);
                if name.is_empty() {
                    return Err(self
                        .ctx
                        .unexpected("expected a block param name", self.span_from(self.pos)));
                }
                block_params.push(name.to_string());
            }
            self.skip_whitespace();
        }

        Ok(BlockHead {
            path,
            params,
            hash,
            block_params,
            start,
        })
    }

    fn finish_block(&mut self, head: BlockHead, close_name: &str) -> Result<BlockStatement> {
        let (body, end) = self.parse_statements()?;
        let program = Block {
            body,
            block_params: head.block_params,
        };

        let inverse = match end {
            End::CloseBlock { name, span } => {
                self.check_block_close(close_name, &name, span)?;
                None
            }
            End::Else { chained: None, .. } => {
                let (body, end) = self.parse_statements()?;
                match end {
                    End::CloseBlock { name, span } => {
                        self.check_block_close(close_name, &name, span)?;
                    }
                    _ => {
                        return Err(self
                            .ctx
                            .unclosed_block(close_name, self.span_from(head.start)));
                    }
                }
                Some(Block {
                    body,
                    block_params: Vec::new(),
                })
            }
            End::Else {
                chained: Some(inner),
                ..
            } => {
                let chained = self.finish_block(inner, close_name)?;
                Some(Block {
                    body: vec![Statement::Block(chained)],
                    block_params: Vec::new(),
                })
            }
            End::Eof => {
                return Err(self
                    .ctx
                    .unclosed_block(close_name, self.span_from(head.start)));
            }
            End::CloseTag { name, span } => {
                return Err(self.ctx.unexpected(
                    format!("closing tag </{}> inside {{{{#{}}}}}", name, close_name),
                    span,
                ));
            }
        };

        Ok(BlockStatement {
            path: head.path,
            params: head.params,
            hash: head.hash,
            program,
            inverse,
            span: self.span_from(head.start),
        })
    }

    fn check_block_close(&self, expected: &str, found: &str, span: Span) -> Result<()> {
        if expected == found {
            Ok(())
        } else {
            Err(self.ctx.unexpected(
                format!(
                    "{{{{/{}}}}} does not close {{{{#{}}}}}",
                    found, expected
                ),
                span,
            ))
        }
    }

    // ---- elements ---------------------------------------------------------

    fn parse_element(&mut self) -> Result<ElementNode> {
        let start = self.pos;
        self.expect("<")?;
        let tag = self.take_while(is_tag_char).to_string();

        let mut attributes = Vec::new();
        let mut modifiers = Vec::new();
        let self_closing;

        loop {
            self.skip_whitespace();
            if self.eof() {
                return Err(self.ctx.unclosed_element(&tag, self.span_from(start)));
            }
            if self.eat("/>") {
                self_closing = true;
                break;
            }
            if self.eat(">") {
                self_closing = false;
                break;
            }
            if self.rest().starts_with("{{") {
                modifiers.push(self.parse_mustache()?);
                continue;
            }
            attributes.push(self.parse_attribute()?);
        }

        let mut element = ElementNode {
            tag,
            attributes,
            modifiers,
            children: Vec::new(),
            self_closing,
            span: Span::default(),
        };

        if !self_closing && !is_void_tag(&element.tag) {
            let (children, end) = self.parse_statements()?;
            match end {
                End::CloseTag { name, .. } if name == element.tag => {}
                End::CloseTag { name, span } => {
                    return Err(self.ctx.mismatched_close(&element.tag, name, span));
                }
                End::Eof => {
                    return Err(self.ctx.unclosed_element(&element.tag, self.span_from(start)));
                }
                End::CloseBlock { name, span } => {
                    return Err(self.ctx.unexpected(
                        format!("{{{{/{}}}}} inside <{}>", name, element.tag),
                        span,
                    ));
                }
                End::Else { span, .. } => {
                    return Err(self.ctx.unexpected(
                        format!("{{{{else}}}} directly inside <{}>", element.tag),
                        span,
                    ));
                }
            }
            element.children = children;
        }

        element.span = self.span_from(start);
        Ok(element)
    }

    fn parse_attribute(&mut self) -> Result<AttrNode> {
        let start = self.pos;
        let name = self
            .take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\''))
            .to_string();
        if name.is_empty() {
            let found = self.peek().map(String::from).unwrap_or_default();
            return Err(self.ctx.unexpected(
                format!("unexpected '{}' in element", found),
                self.span_from(start),
            ));
        }

        self.skip_whitespace();
        let value = if self.eat("=") {
            self.skip_whitespace();
            self.parse_attribute_value()?
        } else {
            AttrValue::Text(TextNode {
                chars: String::new(),
                span: Span::new(self.pos, self.pos),
            })
        };

        Ok(AttrNode {
            name,
            value,
            span: self.span_from(start),
        })
    }

    fn parse_attribute_value(&mut self) -> Result<AttrValue> {
        let start = self.pos;

        if self.rest().starts_with("{{") {
            return Ok(AttrValue::Mustache(self.parse_mustache()?));
        }

        let Some(quote) = self.peek().filter(|c| *c == '"' || *c == '\'') else {
            let chars = self
                .take_while(|c| !c.is_whitespace() && c != '>' && c != '/')
                .to_string();
            return Ok(AttrValue::Text(TextNode {
                chars,
                span: self.span_from(start),
            }));
        };
        self.bump();

        let mut parts = Vec::new();
        let mut text_start = self.pos;
        loop {
            if self.eof() {
                return Err(self.ctx.unexpected_eof(format!("closing {} for attribute", quote)));
            }
            if self.peek() == Some(quote) || self.rest().starts_with("{{") {
                if self.pos > text_start {
                    parts.push(ConcatPart::Text(TextNode {
                        chars: self.src[text_start..self.pos].to_string(),
                        span: self.span_from(text_start),
                    }));
                }
                if self.peek() == Some(quote) {
                    self.bump();
                    break;
                }
                parts.push(ConcatPart::Mustache(self.parse_mustache()?));
                text_start = self.pos;
                continue;
            }
            self.bump();
        }

        let value = match parts.as_slice() {
            [] => AttrValue::Text(TextNode {
                chars: String::new(),
                span: self.span_from(start),
            }),
            [ConcatPart::Text(text)] => AttrValue::Text(text.clone()),
            _ => AttrValue::Concat { parts },
        };
        Ok(value)
    }

    // ---- expressions ------------------------------------------------------

    /// Parse `path params key=value` up to (not including) the closing delimiter.
    fn parse_call(&mut self, start: usize) -> Result<(Expression, Vec<Expression>, Hash)> {
        if self.at_call_end() {
            return Err(self
                .ctx
                .unexpected("expected an expression", self.span_from(start)));
        }
        let path = self.parse_expression()?;
        let mut params = Vec::new();
        let mut hash = Hash::default();

        loop {
            self.skip_whitespace();
            if self.at_call_end() {
                break;
            }
            if let Some(key) = self.peek_hash_key() {
                self.pos += key.len() + 1;
                self.skip_whitespace();
                let value = self.parse_expression()?;
                hash.pairs.push(HashPair {
                    key: key.to_string(),
                    value,
                });
                continue;
            }
            if !hash.is_empty() {
                return Err(self.ctx.unexpected(
                    "positional arguments must come before named arguments",
                    self.span_from(self.pos),
                ));
            }
            params.push(self.parse_expression()?);
        }

        Ok((path, params, hash))
    }

    fn at_call_end(&self) -> bool {
        let rest = self.rest();
        rest.is_empty()
            || rest.starts_with("}}")
            || rest.starts_with(')')
            || (rest.starts_with("as")
                && rest[2..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_whitespace() || c == '|'))
    }

    fn peek_hash_key(&self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len > 0 && rest[len..].starts_with('=') {
            Some(&rest[..len])
        } else {
            None
        }
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let start = self.pos;

        match self.peek() {
            Some('(') => {
                self.bump();
                self.skip_whitespace();
                let (path, params, hash) = self.parse_call(start)?;
                self.skip_whitespace();
                self.expect(")")?;
                Ok(Expression::SubExpression(SubExpression {
                    path: Box::new(path),
                    params,
                    hash,
                    span: self.span_from(start),
                }))
            }
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let Some(offset) = self.rest().find(quote) else {
                    return Err(self.ctx.unexpected_eof(format!("closing {} for string", quote)));
                };
                let value = self.rest()[..offset].to_string();
                self.pos += offset + 1;
                Ok(Expression::Literal(Literal::String(value)))
            }
            Some(c)
                if c.is_ascii_digit()
                    || (c == '-' && self.peek_nth(1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                self.bump();
                let digits = self.take_while(|c| c.is_ascii_digit() || c == '.');
                let text = &self.src[start..start + 1 + digits.len()];
                let value = text.parse::<f64>().map_err(|_| {
                    self.ctx
                        .unexpected(format!("invalid number '{}'", text), self.span_from(start))
                })?;
                Ok(Expression::Literal(Literal::Number(value)))
            }
            Some(c) if is_path_char(c) => {
                let original = self.take_while(is_path_char);
                let expr = match original {
                    "true" => Expression::Literal(Literal::Boolean(true)),
                    "false" => Expression::Literal(Literal::Boolean(false)),
                    "null" => Expression::Literal(Literal::Null),
                    "undefined" => Expression::Literal(Literal::Undefined),
                    _ => Expression::Path(PathExpression {
                        original: original.to_string(),
                        span: self.span_from(start),
                    }),
                };
                Ok(expr)
            }
            Some(c) => Err(self.ctx.unexpected(
                format!("unexpected '{}' in expression", c),
                Span::new(start, start + c.len_utf8()),
            )),
            None => Err(self.ctx.unexpected_eof("an expression")),
        }
    }
}

fn head_name(path: &Expression) -> String {
    match path {
        Expression::Path(path) => path.original.clone(),
        _ => String::new(),
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | ':' | '.' | '_' | '@')
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '$')
}

fn is_path_char(c: char) -> bool {
    is_ident_char(c) || matches!(c, '.' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(template: &Template) -> &Statement {
        template.body.first().expect("template should not be empty")
    }

    #[test]
    fn test_parse_element_with_attributes() {
        let template = parse(r#"<div data-test="foo" data-blah="derp" class="hahaha"></div>"#)
            .expect("should parse");

        let Statement::Element(div) = first(&template) else {
            panic!("expected element");
        };
        assert_eq!(div.tag, "div");
        let names: Vec<_> = div.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["data-test", "data-blah", "class"]);
        assert!(div.children.is_empty());
    }

    #[test]
    fn test_parse_block_with_inverse() {
        let template =
            parse("{{#if cond}}yes{{else}}no{{/if}}").expect("should parse");

        let Statement::Block(block) = first(&template) else {
            panic!("expected block");
        };
        assert_eq!(block.callee(), Some("if"));
        assert_eq!(block.params.len(), 1);
        assert_eq!(block.program.body.len(), 1);
        assert!(block.inverse.is_some());
    }

    #[test]
    fn test_parse_chained_else_if() {
        let template =
            parse("{{#if a}}A{{else if b}}B{{else}}C{{/if}}").expect("should parse");

        let Statement::Block(block) = first(&template) else {
            panic!("expected block");
        };
        let inverse = block.inverse.as_ref().expect("inverse");
        let Some(Statement::Block(chained)) = inverse.body.first() else {
            panic!("expected chained block");
        };
        assert_eq!(chained.callee(), Some("if"));
        assert!(chained.inverse.is_some());
    }

    #[test]
    fn test_parse_block_params_and_hash() {
        let template = parse(r#"{{#each items key="id" as |item index|}}{{item}}{{/each}}"#)
            .expect("should parse");

        let Statement::Block(block) = first(&template) else {
            panic!("expected block");
        };
        assert_eq!(block.program.block_params, vec!["item", "index"]);
        assert_eq!(
            block.hash.get("key"),
            Some(&Expression::Literal(Literal::String("id".into())))
        );
    }

    #[test]
    fn test_parse_quoted_binding_is_concat() {
        let template = parse(r#"<a href="{{url}}"></a>"#).expect("should parse");

        let Statement::Element(a) = first(&template) else {
            panic!("expected element");
        };
        assert!(matches!(
            &a.attributes[0].value,
            AttrValue::Concat { parts } if parts.len() == 1
        ));
    }

    #[test]
    fn test_parse_sub_expression_and_literals() {
        let template =
            parse(r#"{{concat (upper "a") 1 true null}}"#).expect("should parse");

        let Statement::Mustache(mustache) = first(&template) else {
            panic!("expected mustache");
        };
        assert_eq!(mustache.params.len(), 4);
        assert!(matches!(mustache.params[0], Expression::SubExpression(_)));
        assert_eq!(
            mustache.params[1],
            Expression::Literal(Literal::Number(1.0))
        );
    }

    #[test]
    fn test_parse_void_and_self_closing() {
        let template = parse(r#"<input disabled><br /><p>x</p>"#).expect("should parse");
        assert_eq!(template.body.len(), 3);
    }

    #[test]
    fn test_parse_comments() {
        let template = parse("{{!-- a }} b --}}<!-- c -->{{! d }}").expect("should parse");
        assert_eq!(template.body.len(), 3);
        let Statement::Comment(comment) = first(&template) else {
            panic!("expected comment");
        };
        assert_eq!(comment.value, " a }} b ");
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<div><span></span>").expect_err("should fail");
        assert!(matches!(*err, crate::ParseError::UnclosedElement { ref tag, .. } if tag == "div"));
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse("<div></span>").expect_err("should fail");
        assert!(matches!(*err, crate::ParseError::MismatchedClose { .. }));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("{{#if x}}nope").expect_err("should fail");
        assert!(matches!(*err, crate::ParseError::UnclosedBlock { ref name, .. } if name == "if"));
    }

    #[test]
    fn test_wrong_block_close() {
        let err = parse("{{#if x}}nope{{/each}}").expect_err("should fail");
        assert!(matches!(*err, crate::ParseError::Unexpected { .. }));
    }

    #[test]
    fn test_stray_else() {
        let err = parse("a{{else}}b").expect_err("should fail");
        assert!(matches!(*err, crate::ParseError::Unexpected { .. }));
    }

    #[test]
    fn test_text_with_lone_angle_bracket() {
        let template = parse("a < b").expect("should parse");
        assert_eq!(template.body.len(), 1);
    }
}
