//! AST traversal.
//!
//! A [`Visitor`] maps node kinds to handlers; [`traverse`] walks a template
//! depth-first and calls the handler for each node before descending into its
//! children, so a handler may rewrite or drop children before they are seen.
//!
//! # Example
//!
//! ```ignore
//! let mut visitor = Visitor::new().element(|node| {
//!     node.remove_attribute("data-test");
//!     Ok(())
//! });
//! traverse(&mut template, &mut visitor)?;
//! ```

use std::collections::HashMap;

use eyre::Result;

use crate::ast::{
    AttrNode, AttrValue, Block, BlockStatement, CommentStatement, ConcatPart, ElementNode,
    Expression, Hash, MustacheStatement, Node, NodeKind, PathExpression, Statement,
    SubExpression, Template, TextNode,
};

/// A node handler.
pub type Handler<'a> = Box<dyn FnMut(Node<'_>) -> Result<()> + 'a>;

/// Node-kind to handler mapping used for a single traversal.
#[derive(Default)]
pub struct Visitor<'a> {
    handlers: HashMap<NodeKind, Handler<'a>>,
    fallback: Option<Handler<'a>>,
}

impl<'a> Visitor<'a> {
    /// Create an empty visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a node kind, replacing any previous one.
    pub fn on(mut self, kind: NodeKind, handler: impl FnMut(Node<'_>) -> Result<()> + 'a) -> Self {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// Register a handler for every node kind without a dedicated handler.
    pub fn any(mut self, handler: impl FnMut(Node<'_>) -> Result<()> + 'a) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    pub fn template(self, mut f: impl FnMut(&mut Template) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Template, move |node| match node {
            Node::Template(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn block(self, mut f: impl FnMut(&mut Block) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Block, move |node| match node {
            Node::Block(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn element(self, mut f: impl FnMut(&mut ElementNode) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Element, move |node| match node {
            Node::Element(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn attr(self, mut f: impl FnMut(&mut AttrNode) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Attr, move |node| match node {
            Node::Attr(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn text(self, mut f: impl FnMut(&mut TextNode) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Text, move |node| match node {
            Node::Text(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn mustache(self, mut f: impl FnMut(&mut MustacheStatement) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Mustache, move |node| match node {
            Node::Mustache(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn block_statement(
        self,
        mut f: impl FnMut(&mut BlockStatement) -> Result<()> + 'a,
    ) -> Self {
        self.on(NodeKind::BlockStatement, move |node| match node {
            Node::BlockStatement(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn comment(self, mut f: impl FnMut(&mut CommentStatement) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Comment, move |node| match node {
            Node::Comment(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn path(self, mut f: impl FnMut(&mut PathExpression) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::Path, move |node| match node {
            Node::Path(n) => f(n),
            _ => Ok(()),
        })
    }

    pub fn sub_expression(self, mut f: impl FnMut(&mut SubExpression) -> Result<()> + 'a) -> Self {
        self.on(NodeKind::SubExpression, move |node| match node {
            Node::SubExpression(n) => f(n),
            _ => Ok(()),
        })
    }

    /// Node kinds with a dedicated handler, in sorted order.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.fallback.is_none()
    }

    fn enter(&mut self, node: Node<'_>) -> Result<()> {
        let kind = node.kind();
        if let Some(handler) = self.handlers.get_mut(&kind) {
            handler(node)
        } else if let Some(fallback) = self.fallback.as_mut() {
            fallback(node)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Visitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor")
            .field("kinds", &self.kinds())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Walk a template once, calling the visitor's handlers in document order.
///
/// # Errors
///
/// Stops at the first handler error and returns it.
pub fn traverse(template: &mut Template, visitor: &mut Visitor<'_>) -> Result<()> {
    visitor.enter(Node::Template(&mut *template))?;
    visit_statements(&mut template.body, visitor)
}

/// Visits every node with a single callback.
///
/// This is the walker handed to legacy transforms through their syntax
/// context.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker;

impl Walker {
    pub fn new() -> Self {
        Self
    }

    /// Call `callback` for every node in the template.
    pub fn visit(
        &self,
        template: &mut Template,
        callback: impl FnMut(Node<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut visitor = Visitor::new().any(callback);
        traverse(template, &mut visitor)
    }
}

fn visit_statements(body: &mut [Statement], visitor: &mut Visitor<'_>) -> Result<()> {
    for statement in body.iter_mut() {
        visit_statement(statement, visitor)?;
    }
    Ok(())
}

fn visit_statement(statement: &mut Statement, visitor: &mut Visitor<'_>) -> Result<()> {
    match statement {
        Statement::Element(element) => {
            visitor.enter(Node::Element(&mut *element))?;
            for attr in element.attributes.iter_mut() {
                visit_attr(attr, visitor)?;
            }
            for modifier in element.modifiers.iter_mut() {
                visit_mustache(modifier, visitor)?;
            }
            visit_statements(&mut element.children, visitor)
        }
        Statement::Text(text) => visitor.enter(Node::Text(text)),
        Statement::Mustache(mustache) => visit_mustache(mustache, visitor),
        Statement::Block(block) => {
            visitor.enter(Node::BlockStatement(&mut *block))?;
            visit_expression(&mut block.path, visitor)?;
            visit_arguments(&mut block.params, &mut block.hash, visitor)?;
            visit_block(&mut block.program, visitor)?;
            if let Some(inverse) = block.inverse.as_mut() {
                visit_block(inverse, visitor)?;
            }
            Ok(())
        }
        Statement::Comment(comment) => visitor.enter(Node::Comment(comment)),
    }
}

fn visit_block(block: &mut Block, visitor: &mut Visitor<'_>) -> Result<()> {
    visitor.enter(Node::Block(&mut *block))?;
    visit_statements(&mut block.body, visitor)
}

fn visit_attr(attr: &mut AttrNode, visitor: &mut Visitor<'_>) -> Result<()> {
    visitor.enter(Node::Attr(&mut *attr))?;
    match &mut attr.value {
        AttrValue::Text(text) => visitor.enter(Node::Text(text)),
        AttrValue::Mustache(mustache) => visit_mustache(mustache, visitor),
        AttrValue::Concat { parts } => {
            for part in parts.iter_mut() {
                match part {
                    ConcatPart::Text(text) => visitor.enter(Node::Text(text))?,
                    ConcatPart::Mustache(mustache) => visit_mustache(mustache, visitor)?,
                }
            }
            Ok(())
        }
    }
}

fn visit_mustache(mustache: &mut MustacheStatement, visitor: &mut Visitor<'_>) -> Result<()> {
    visitor.enter(Node::Mustache(&mut *mustache))?;
    visit_expression(&mut mustache.path, visitor)?;
    visit_arguments(&mut mustache.params, &mut mustache.hash, visitor)
}

fn visit_arguments(
    params: &mut [Expression],
    hash: &mut Hash,
    visitor: &mut Visitor<'_>,
) -> Result<()> {
    for param in params.iter_mut() {
        visit_expression(param, visitor)?;
    }
    for pair in hash.pairs.iter_mut() {
        visit_expression(&mut pair.value, visitor)?;
    }
    Ok(())
}

fn visit_expression(expression: &mut Expression, visitor: &mut Visitor<'_>) -> Result<()> {
    match expression {
        Expression::Path(path) => visitor.enter(Node::Path(path)),
        Expression::Literal(_) => Ok(()),
        Expression::SubExpression(sub) => {
            visitor.enter(Node::SubExpression(&mut *sub))?;
            visit_expression(&mut sub.path, visitor)?;
            visit_arguments(&mut sub.params, &mut sub.hash, visitor)
        }
    }
}
