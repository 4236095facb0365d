//! Template syntax for the Stencil template compiler.
//!
//! This crate owns everything the compiler pipeline treats as an external
//! collaborator: the AST, the parser, the tree walker and the printer.
//!
//! ```text
//! source → parse → Template → (plugins, via traverse/Walker) → print / generate
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod ast;
pub mod builders;
mod error;
mod parse;
mod print;
mod validate;
mod walk;

pub use ast::{
    AttrNode, AttrValue, Block, BlockStatement, CommentStatement, ConcatPart, ElementNode,
    Expression, Hash, HashPair, Literal, MustacheStatement, Node, NodeKind, PathExpression, Span,
    Statement, SubExpression, Template, TextNode,
};
pub use error::{ParseError, Result, SourceContext};
pub use parse::{parse, parse_with_filename};
pub use print::{print, print_expression};
pub use validate::{InvalidNode, validate};
pub use walk::{Handler, Visitor, Walker, traverse};
