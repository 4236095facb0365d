//! Template AST node definitions.
//!
//! The node shapes follow the usual Handlebars-in-HTML layout: a [`Template`]
//! holds a list of [`Statement`]s, elements own attributes and children, and
//! mustaches/blocks carry a callee path plus positional and named arguments.

use serde::Serialize;

/// Byte range into the template source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

/// Root of a parsed template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Template {
    pub body: Vec<Statement>,
    /// Block params the template is invoked with (empty for top-level templates).
    pub block_params: Vec<String>,
}

/// A top-level or nested statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    Element(ElementNode),
    Text(TextNode),
    Mustache(MustacheStatement),
    Block(BlockStatement),
    Comment(CommentStatement),
}

impl Statement {
    /// The kind of node this statement wraps.
    pub fn kind(&self) -> NodeKind {
        match self {
            Statement::Element(_) => NodeKind::Element,
            Statement::Text(_) => NodeKind::Text,
            Statement::Mustache(_) => NodeKind::Mustache,
            Statement::Block(_) => NodeKind::BlockStatement,
            Statement::Comment(_) => NodeKind::Comment,
        }
    }
}

/// An HTML element: `<div class="x">...</div>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    pub tag: String,
    pub attributes: Vec<AttrNode>,
    /// Element modifiers, e.g. `<div {{on "click" this.go}}>`.
    pub modifiers: Vec<MustacheStatement>,
    pub children: Vec<Statement>,
    pub self_closing: bool,
    pub span: Span,
}

impl ElementNode {
    /// Find an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&AttrNode> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Remove every attribute with the given name, returning how many were removed.
    pub fn remove_attribute(&mut self, name: &str) -> usize {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.name != name);
        before - self.attributes.len()
    }

    /// Returns true for HTML void elements, which never have a closing tag.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

/// An attribute on an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttrNode {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

/// The value side of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum AttrValue {
    /// `name="text"`, or a valueless attribute (empty text).
    Text(TextNode),
    /// `name={{expr}}`
    Mustache(MustacheStatement),
    /// `name="text {{expr}} text"`
    Concat { parts: Vec<ConcatPart> },
}

/// One part of a quoted attribute value containing mustaches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ConcatPart {
    Text(TextNode),
    Mustache(MustacheStatement),
}

/// Literal text content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub chars: String,
    pub span: Span,
}

/// `{{path params hash}}`, or `{{{path params hash}}}` when trusting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub trusting: bool,
    pub span: Span,
}

impl MustacheStatement {
    /// The callee path when the mustache head is a path expression.
    pub fn callee(&self) -> Option<&str> {
        match &self.path {
            Expression::Path(path) => Some(path.original.as_str()),
            _ => None,
        }
    }
}

/// `{{#path params hash as |x|}}program{{else}}inverse{{/path}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub program: Block,
    pub inverse: Option<Block>,
    pub span: Span,
}

impl BlockStatement {
    /// The callee path when the block head is a path expression.
    pub fn callee(&self) -> Option<&str> {
        match &self.path {
            Expression::Path(path) => Some(path.original.as_str()),
            _ => None,
        }
    }
}

/// A nested list of statements with optional block params.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub body: Vec<Statement>,
    pub block_params: Vec<String>,
}

/// `{{!-- comment --}}` or `<!-- comment -->`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentStatement {
    pub value: String,
    /// True for HTML comments, false for mustache comments.
    pub html: bool,
    pub span: Span,
}

/// An expression in argument position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    Path(PathExpression),
    Literal(Literal),
    SubExpression(SubExpression),
}

impl Expression {
    /// Build a path expression from its original text.
    pub fn path(original: impl Into<String>) -> Self {
        Expression::Path(PathExpression::new(original))
    }
}

/// `foo.bar`, `this.x`, `@arg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathExpression {
    pub original: String,
    pub span: Span,
}

impl PathExpression {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            span: Span::default(),
        }
    }

    /// The first segment of the path (`@foo` for `@foo.bar`).
    pub fn head(&self) -> &str {
        self.original.split('.').next().unwrap_or_default()
    }

    /// The path segments after the head.
    pub fn tail(&self) -> impl Iterator<Item = &str> {
        self.original.split('.').skip(1)
    }

    /// Returns true for `@name` paths.
    pub fn is_named_argument(&self) -> bool {
        self.original.starts_with('@')
    }

    /// Returns true for `this` and `this.x` paths.
    pub fn is_this(&self) -> bool {
        self.head() == "this"
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Literal {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

/// `(path params hash)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub span: Span,
}

/// Named arguments: `key=value key2=value2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
}

impl Hash {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Look up a named argument.
    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.pairs.iter().find(|p| p.key == key).map(|p| &p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
}

/// Node kinds a visitor can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeKind {
    Template,
    Block,
    Element,
    Attr,
    Text,
    Mustache,
    BlockStatement,
    Comment,
    Path,
    SubExpression,
}

impl NodeKind {
    /// The conventional node type name (`ElementNode`, `MustacheStatement`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Template => "Template",
            NodeKind::Block => "Block",
            NodeKind::Element => "ElementNode",
            NodeKind::Attr => "AttrNode",
            NodeKind::Text => "TextNode",
            NodeKind::Mustache => "MustacheStatement",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::Comment => "CommentStatement",
            NodeKind::Path => "PathExpression",
            NodeKind::SubExpression => "SubExpression",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mutable borrow of any node, handed to visitor callbacks.
#[derive(Debug)]
pub enum Node<'a> {
    Template(&'a mut Template),
    Block(&'a mut Block),
    Element(&'a mut ElementNode),
    Attr(&'a mut AttrNode),
    Text(&'a mut TextNode),
    Mustache(&'a mut MustacheStatement),
    BlockStatement(&'a mut BlockStatement),
    Comment(&'a mut CommentStatement),
    Path(&'a mut PathExpression),
    SubExpression(&'a mut SubExpression),
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Template(_) => NodeKind::Template,
            Node::Block(_) => NodeKind::Block,
            Node::Element(_) => NodeKind::Element,
            Node::Attr(_) => NodeKind::Attr,
            Node::Text(_) => NodeKind::Text,
            Node::Mustache(_) => NodeKind::Mustache,
            Node::BlockStatement(_) => NodeKind::BlockStatement,
            Node::Comment(_) => NodeKind::Comment,
            Node::Path(_) => NodeKind::Path,
            Node::SubExpression(_) => NodeKind::SubExpression,
        }
    }
}
