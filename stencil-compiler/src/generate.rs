//! Lowering of the transformed AST into the JSON wire format.

use indexmap::IndexMap;
use serde::Serialize;
use stencil_syntax::{
    AttrValue, Block, ConcatPart, Expression, Hash, Literal, MustacheStatement, Statement,
    Template,
};

use crate::{error::CompileError, pipeline::CompileOptions};

/// Turns a transformed template into its compiled form.
pub trait Generator: Send + Sync {
    fn generate(
        &self,
        ast: &Template,
        options: &CompileOptions,
    ) -> Result<CompiledTemplate, CompileError>;
}

/// The default generator, emitting [`CompiledTemplate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WireGenerator;

impl Generator for WireGenerator {
    fn generate(
        &self,
        ast: &Template,
        options: &CompileOptions,
    ) -> Result<CompiledTemplate, CompileError> {
        let mut lowering = Lowering {
            symbols: ast.block_params.clone(),
        };
        let statements = lowering.statements(&ast.body)?;

        Ok(CompiledTemplate {
            block: WireBlock {
                statements,
                symbols: lowering.symbols,
            },
            module_name: options.module_name.clone(),
            is_strict_mode: options.strict_mode,
            meta: options.meta.clone(),
        })
    }
}

/// A compiled template in wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTemplate {
    pub block: WireBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    pub is_strict_mode: bool,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub meta: IndexMap<String, serde_json::Value>,
}

impl CompiledTemplate {
    /// Serialise as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CompileError> {
        serde_json::to_string_pretty(self).map_err(|e| CompileError::generate(e.to_string()))
    }
}

/// A list of statements plus the symbols they bind or read.
///
/// At the top level `symbols` holds the template's block params followed by
/// every named argument it reads, in first-use order. Nested blocks list
/// their own block params.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WireBlock {
    pub statements: Vec<WireStatement>,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum WireStatement {
    Text {
        value: String,
    },
    Append {
        expr: WireExpr,
        trusting: bool,
    },
    Comment {
        value: String,
    },
    Element {
        tag: String,
        attrs: Vec<WireAttr>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        modifiers: Vec<WireExpr>,
        children: Vec<WireStatement>,
    },
    Block {
        call: WireExpr,
        program: WireBlock,
        #[serde(skip_serializing_if = "Option::is_none")]
        inverse: Option<WireBlock>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAttr {
    pub name: String,
    pub value: WireExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum WireExpr {
    Get {
        path: String,
    },
    Literal {
        value: serde_json::Value,
    },
    Undefined,
    Call {
        path: String,
        params: Vec<WireExpr>,
        #[serde(skip_serializing_if = "IndexMap::is_empty")]
        hash: IndexMap<String, WireExpr>,
    },
    Concat {
        parts: Vec<WireExpr>,
    },
}

struct Lowering {
    symbols: Vec<String>,
}

impl Lowering {
    fn statements(&mut self, body: &[Statement]) -> Result<Vec<WireStatement>, CompileError> {
        body.iter().map(|s| self.statement(s)).collect()
    }

    fn statement(&mut self, statement: &Statement) -> Result<WireStatement, CompileError> {
        Ok(match statement {
            Statement::Text(text) => WireStatement::Text {
                value: text.chars.clone(),
            },
            Statement::Comment(comment) => WireStatement::Comment {
                value: comment.value.clone(),
            },
            Statement::Mustache(mustache) => WireStatement::Append {
                expr: self.mustache(mustache)?,
                trusting: mustache.trusting,
            },
            Statement::Element(element) => WireStatement::Element {
                tag: element.tag.clone(),
                attrs: element
                    .attributes
                    .iter()
                    .map(|attr| {
                        Ok(WireAttr {
                            name: attr.name.clone(),
                            value: self.attr_value(&attr.value)?,
                        })
                    })
                    .collect::<Result<_, CompileError>>()?,
                modifiers: element
                    .modifiers
                    .iter()
                    .map(|m| self.call(&m.path, &m.params, &m.hash))
                    .collect::<Result<_, _>>()?,
                children: self.statements(&element.children)?,
            },
            Statement::Block(block) => WireStatement::Block {
                call: self.call(&block.path, &block.params, &block.hash)?,
                program: self.block(&block.program)?,
                inverse: block.inverse.as_ref().map(|b| self.block(b)).transpose()?,
            },
        })
    }

    fn block(&mut self, block: &Block) -> Result<WireBlock, CompileError> {
        Ok(WireBlock {
            statements: self.statements(&block.body)?,
            symbols: block.block_params.clone(),
        })
    }

    fn attr_value(&mut self, value: &AttrValue) -> Result<WireExpr, CompileError> {
        match value {
            AttrValue::Text(text) => Ok(string(&text.chars)),
            AttrValue::Mustache(mustache) => self.mustache(mustache),
            AttrValue::Concat { parts } => Ok(WireExpr::Concat {
                parts: parts
                    .iter()
                    .map(|part| match part {
                        ConcatPart::Text(text) => Ok(string(&text.chars)),
                        ConcatPart::Mustache(mustache) => self.mustache(mustache),
                    })
                    .collect::<Result<_, CompileError>>()?,
            }),
        }
    }

    /// `{{x}}` reads `x`; `{{x y}}` calls `x`.
    fn mustache(&mut self, mustache: &MustacheStatement) -> Result<WireExpr, CompileError> {
        if mustache.params.is_empty() && mustache.hash.is_empty() {
            self.expression(&mustache.path)
        } else {
            self.call(&mustache.path, &mustache.params, &mustache.hash)
        }
    }

    fn call(
        &mut self,
        path: &Expression,
        params: &[Expression],
        hash: &Hash,
    ) -> Result<WireExpr, CompileError> {
        let Expression::Path(callee) = path else {
            return Err(CompileError::generate("callee must be a path expression"));
        };
        self.read(&callee.original);

        Ok(WireExpr::Call {
            path: callee.original.clone(),
            params: params
                .iter()
                .map(|p| self.expression(p))
                .collect::<Result<_, _>>()?,
            hash: hash
                .pairs
                .iter()
                .map(|pair| Ok((pair.key.clone(), self.expression(&pair.value)?)))
                .collect::<Result<_, CompileError>>()?,
        })
    }

    fn expression(&mut self, expression: &Expression) -> Result<WireExpr, CompileError> {
        match expression {
            Expression::Path(path) => {
                self.read(&path.original);
                Ok(WireExpr::Get {
                    path: path.original.clone(),
                })
            }
            Expression::Literal(literal) => Ok(lower_literal(literal)),
            Expression::SubExpression(sub) => self.call(&sub.path, &sub.params, &sub.hash),
        }
    }

    fn read(&mut self, path: &str) {
        let head = path.split('.').next().unwrap_or(path);
        if head.starts_with('@') && !self.symbols.iter().any(|s| s == head) {
            self.symbols.push(head.to_string());
        }
    }
}

fn string(value: &str) -> WireExpr {
    WireExpr::Literal {
        value: serde_json::Value::String(value.to_string()),
    }
}

fn lower_literal(literal: &Literal) -> WireExpr {
    let value = match literal {
        Literal::String(s) => serde_json::Value::String(s.clone()),
        Literal::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Literal::Boolean(b) => serde_json::Value::Bool(*b),
        Literal::Null => serde_json::Value::Null,
        Literal::Undefined => return WireExpr::Undefined,
    };
    WireExpr::Literal { value }
}
