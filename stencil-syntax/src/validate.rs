//! Structural checks for ASTs produced by transforms.
//!
//! The parser never produces a tree that fails these checks; a failure means
//! a plugin rewrote the tree into something the generator cannot emit.

use thiserror::Error;

use crate::ast::{
    AttrValue, Block, ConcatPart, Expression, Hash, MustacheStatement, NodeKind, Statement,
    Template,
};

/// A node that cannot be generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {message}")]
pub struct InvalidNode {
    pub kind: NodeKind,
    pub message: String,
}

impl InvalidNode {
    fn new(kind: NodeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Check a template, returning the first invalid node in document order.
pub fn validate(template: &Template) -> Result<(), InvalidNode> {
    check_params(&template.block_params, NodeKind::Template)?;
    check_statements(&template.body)
}

fn check_statements(body: &[Statement]) -> Result<(), InvalidNode> {
    body.iter().try_for_each(check_statement)
}

fn check_statement(statement: &Statement) -> Result<(), InvalidNode> {
    match statement {
        Statement::Element(element) => {
            let valid_start = element
                .tag
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '@' || c == ':');
            if !valid_start || element.tag.chars().any(char::is_whitespace) {
                return Err(InvalidNode::new(
                    NodeKind::Element,
                    format!("'{}' is not a valid tag name", element.tag),
                ));
            }
            if element.is_void() && !element.children.is_empty() {
                return Err(InvalidNode::new(
                    NodeKind::Element,
                    format!("void element <{}> cannot have children", element.tag),
                ));
            }
            for attr in &element.attributes {
                if attr.name.is_empty()
                    || attr
                        .name
                        .chars()
                        .any(|c| c.is_whitespace() || matches!(c, '=' | '>' | '"' | '\'' | '/'))
                {
                    return Err(InvalidNode::new(
                        NodeKind::Attr,
                        format!("'{}' is not a valid attribute name", attr.name),
                    ));
                }
                match &attr.value {
                    AttrValue::Text(_) => {}
                    AttrValue::Mustache(mustache) => check_mustache(mustache)?,
                    AttrValue::Concat { parts } => {
                        if parts.is_empty() {
                            return Err(InvalidNode::new(
                                NodeKind::Attr,
                                format!("attribute '{}' has an empty concat value", attr.name),
                            ));
                        }
                        for part in parts {
                            if let ConcatPart::Mustache(mustache) = part {
                                check_mustache(mustache)?;
                            }
                        }
                    }
                }
            }
            for modifier in &element.modifiers {
                check_mustache(modifier)?;
            }
            check_statements(&element.children)
        }
        Statement::Text(_) | Statement::Comment(_) => Ok(()),
        Statement::Mustache(mustache) => check_mustache(mustache),
        Statement::Block(block) => {
            if !matches!(block.path, Expression::Path(_)) {
                return Err(InvalidNode::new(
                    NodeKind::BlockStatement,
                    "block callee must be a path",
                ));
            }
            check_call(&block.path, &block.params, &block.hash)?;
            check_block(&block.program)?;
            if let Some(inverse) = &block.inverse {
                check_block(inverse)?;
            }
            Ok(())
        }
    }
}

fn check_block(block: &Block) -> Result<(), InvalidNode> {
    check_params(&block.block_params, NodeKind::Block)?;
    check_statements(&block.body)
}

fn check_params(params: &[String], kind: NodeKind) -> Result<(), InvalidNode> {
    match params.iter().find(|p| p.is_empty() || p.contains(char::is_whitespace)) {
        Some(param) => Err(InvalidNode::new(
            kind,
            format!("'{}' is not a valid block param", param),
        )),
        None => Ok(()),
    }
}

fn check_mustache(mustache: &MustacheStatement) -> Result<(), InvalidNode> {
    check_call(&mustache.path, &mustache.params, &mustache.hash)
}

fn check_call(path: &Expression, params: &[Expression], hash: &Hash) -> Result<(), InvalidNode> {
    check_expression(path)?;
    params.iter().try_for_each(check_expression)?;
    for pair in &hash.pairs {
        if pair.key.is_empty() {
            return Err(InvalidNode::new(NodeKind::Mustache, "empty named argument"));
        }
        check_expression(&pair.value)?;
    }
    Ok(())
}

fn check_expression(expression: &Expression) -> Result<(), InvalidNode> {
    match expression {
        Expression::Path(path) => {
            if path.original.is_empty()
                || path.original.contains(char::is_whitespace)
                || path.original.split('.').any(str::is_empty)
            {
                Err(InvalidNode::new(
                    NodeKind::Path,
                    format!("'{}' is not a valid path", path.original),
                ))
            } else {
                Ok(())
            }
        }
        Expression::Literal(_) => Ok(()),
        Expression::SubExpression(sub) => check_call(&sub.path, &sub.params, &sub.hash),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builders, parse};

    #[test]
    fn test_parsed_templates_are_valid() {
        let template = parse(r#"<ul>{{#each items as |i|}}<li class="x {{i.kind}}">{{i}}</li>{{/each}}</ul>"#)
            .expect("should parse");
        assert!(validate(&template).is_ok());
    }

    #[test]
    fn test_empty_tag_is_invalid() {
        let mut template = parse("<div></div>").expect("should parse");
        if let Statement::Element(element) = &mut template.body[0] {
            element.tag.clear();
        }
        let err = validate(&template).expect_err("should fail");
        assert_eq!(err.kind, NodeKind::Element);
    }

    #[test]
    fn test_bad_path_is_invalid() {
        let mut template = parse("{{name}}").expect("should parse");
        if let Statement::Mustache(mustache) = &mut template.body[0] {
            mustache.path = builders::path("user..name");
        }
        let err = validate(&template).expect_err("should fail");
        assert_eq!(err.kind, NodeKind::Path);
        assert_eq!(err.to_string(), "invalid PathExpression: 'user..name' is not a valid path");
    }

    #[test]
    fn test_void_element_with_children_is_invalid() {
        let mut template = parse("<br>").expect("should parse");
        if let Statement::Element(element) = &mut template.body[0] {
            element
                .children
                .push(Statement::Text(builders::text("oops")));
        }
        assert!(validate(&template).is_err());
    }
}
