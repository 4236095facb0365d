//! Node constructors for plugins that synthesise AST.
//!
//! Built nodes carry empty spans.

use crate::ast::{
    AttrNode, AttrValue, Block, BlockStatement, ElementNode, Expression, Hash, HashPair, Literal,
    MustacheStatement, PathExpression, Span, Statement, SubExpression, TextNode,
};

pub fn path(original: impl Into<String>) -> Expression {
    Expression::Path(PathExpression::new(original))
}

pub fn string(value: impl Into<String>) -> Expression {
    Expression::Literal(Literal::String(value.into()))
}

pub fn number(value: f64) -> Expression {
    Expression::Literal(Literal::Number(value))
}

pub fn boolean(value: bool) -> Expression {
    Expression::Literal(Literal::Boolean(value))
}

pub fn text(chars: impl Into<String>) -> TextNode {
    TextNode {
        chars: chars.into(),
        span: Span::default(),
    }
}

pub fn hash(pairs: impl IntoIterator<Item = (String, Expression)>) -> Hash {
    Hash {
        pairs: pairs
            .into_iter()
            .map(|(key, value)| HashPair { key, value })
            .collect(),
    }
}

pub fn mustache(path: Expression, params: Vec<Expression>, hash: Hash) -> MustacheStatement {
    MustacheStatement {
        path,
        params,
        hash,
        trusting: false,
        span: Span::default(),
    }
}

pub fn sexpr(path: Expression, params: Vec<Expression>, hash: Hash) -> Expression {
    Expression::SubExpression(SubExpression {
        path: Box::new(path),
        params,
        hash,
        span: Span::default(),
    })
}

pub fn attr(name: impl Into<String>, value: AttrValue) -> AttrNode {
    AttrNode {
        name: name.into(),
        value,
        span: Span::default(),
    }
}

pub fn element(tag: impl Into<String>, attributes: Vec<AttrNode>, children: Vec<Statement>) -> ElementNode {
    ElementNode {
        tag: tag.into(),
        attributes,
        modifiers: Vec::new(),
        children,
        self_closing: false,
        span: Span::default(),
    }
}

pub fn block(
    path: Expression,
    params: Vec<Expression>,
    program: Vec<Statement>,
    inverse: Option<Vec<Statement>>,
) -> BlockStatement {
    BlockStatement {
        path,
        params,
        hash: Hash::default(),
        program: Block {
            body: program,
            block_params: Vec::new(),
        },
        inverse: inverse.map(|body| Block {
            body,
            block_params: Vec::new(),
        }),
        span: Span::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Template, print};

    #[test]
    fn test_built_nodes_print() {
        let template = Template {
            body: vec![Statement::Element(element(
                "p",
                vec![attr("class", AttrValue::Text(text("note")))],
                vec![Statement::Block(block(
                    path("if"),
                    vec![path("ok")],
                    vec![Statement::Mustache(mustache(
                        path("t"),
                        vec![string("yes"), number(1.0)],
                        hash([("strict".to_string(), boolean(true))]),
                    ))],
                    Some(vec![Statement::Text(text("no"))]),
                ))],
            ))],
            block_params: Vec::new(),
        };

        assert_eq!(
            print(&template),
            r#"<p class="note">{{#if ok}}{{t "yes" 1 strict=true}}{{else}}no{{/if}}</p>"#
        );
    }
}
