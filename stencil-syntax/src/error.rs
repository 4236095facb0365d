use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// Result type for parsing (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<ParseError>>;

/// Source context for error reporting.
///
/// Holds the template source and its display name so parse errors can be
/// built without threading both through every call.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// An unexpected character or token.
    pub fn unexpected(&self, message: impl Into<String>, span: Span) -> Box<ParseError> {
        Box::new(ParseError::Unexpected {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
        })
    }

    /// Input ended while more was expected.
    pub fn unexpected_eof(&self, expected: impl Into<String>) -> Box<ParseError> {
        let end = self.src.len();
        Box::new(ParseError::UnexpectedEof {
            src: self.named_source(),
            span: (end, 0).into(),
            expected: expected.into(),
        })
    }

    /// An element was opened but never closed.
    pub fn unclosed_element(&self, tag: impl Into<String>, span: Span) -> Box<ParseError> {
        Box::new(ParseError::UnclosedElement {
            src: self.named_source(),
            span: span.into(),
            tag: tag.into(),
        })
    }

    /// A closing tag does not match the open element.
    pub fn mismatched_close(
        &self,
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Box<ParseError> {
        Box::new(ParseError::MismatchedClose {
            src: self.named_source(),
            span: span.into(),
            expected: expected.into(),
            found: found.into(),
        })
    }

    /// A block was opened but never closed, or closed with the wrong name.
    pub fn unclosed_block(&self, name: impl Into<String>, span: Span) -> Box<ParseError> {
        Box::new(ParseError::UnclosedBlock {
            src: self.named_source(),
            span: span.into(),
            name: name.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("{message}")]
    #[diagnostic(code(stencil::parse::unexpected))]
    Unexpected {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
        message: String,
    },

    #[error("unexpected end of template, expected {expected}")]
    #[diagnostic(code(stencil::parse::eof))]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("template ends here")]
        span: SourceSpan,
        expected: String,
    },

    #[error("unclosed element <{tag}>")]
    #[diagnostic(
        code(stencil::parse::unclosed_element),
        help("add a closing </{tag}> tag, or self-close it with <{tag} />")
    )]
    UnclosedElement {
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        span: SourceSpan,
        tag: String,
    },

    #[error("closing tag </{found}> does not match <{expected}>")]
    #[diagnostic(code(stencil::parse::mismatched_close))]
    MismatchedClose {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected </{expected}>")]
        span: SourceSpan,
        expected: String,
        found: String,
    },

    #[error("unclosed block {{{{#{name}}}}}")]
    #[diagnostic(
        code(stencil::parse::unclosed_block),
        help("close the block with {{{{/{name}}}}}")
    )]
    UnclosedBlock {
        #[source_code]
        src: NamedSource<String>,
        #[label("block opened here")]
        span: SourceSpan,
        name: String,
    },
}

impl ParseError {
    /// The labelled span in the template source.
    pub fn span(&self) -> SourceSpan {
        match self {
            ParseError::Unexpected { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::UnclosedElement { span, .. }
            | ParseError::MismatchedClose { span, .. }
            | ParseError::UnclosedBlock { span, .. } => *span,
        }
    }
}
