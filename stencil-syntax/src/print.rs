//! Template printer.
//!
//! Turns an AST back into template source. Formatting is normalised (comments
//! always use the `{{!-- --}}` form, `{{else if}}` chains print as nested
//! blocks) but the printed output parses back to an equivalent tree.

use crate::ast::{
    AttrNode, AttrValue, Block, BlockStatement, CommentStatement, ConcatPart, ElementNode,
    Expression, Hash, Literal, MustacheStatement, Statement, Template,
};

/// Print a template back to source.
pub fn print(template: &Template) -> String {
    let mut out = String::new();
    print_statements(&template.body, &mut out);
    out
}

/// Print a single expression (`foo.bar`, `"str"`, `(helper a)`).
pub fn print_expression(expression: &Expression) -> String {
    let mut out = String::new();
    write_expression(expression, &mut out);
    out
}

fn print_statements(body: &[Statement], out: &mut String) {
    for statement in body {
        print_statement(statement, out);
    }
}

fn print_statement(statement: &Statement, out: &mut String) {
    match statement {
        Statement::Element(element) => write_element(element, out),
        Statement::Text(text) => out.push_str(&text.chars),
        Statement::Mustache(mustache) => write_mustache(mustache, out),
        Statement::Block(block) => write_block(block, out),
        Statement::Comment(comment) => write_comment(comment, out),
    }
}

fn write_element(element: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    for attr in &element.attributes {
        out.push(' ');
        write_attr(attr, out);
    }
    for modifier in &element.modifiers {
        out.push(' ');
        write_mustache(modifier, out);
    }

    if element.self_closing {
        out.push_str(" />");
        return;
    }
    out.push('>');
    if element.is_void() {
        return;
    }
    print_statements(&element.children, out);
    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

fn write_attr(attr: &AttrNode, out: &mut String) {
    out.push_str(&attr.name);
    match &attr.value {
        AttrValue::Text(text) if text.chars.is_empty() => {}
        AttrValue::Text(text) => {
            out.push_str("=\"");
            out.push_str(&text.chars);
            out.push('"');
        }
        AttrValue::Mustache(mustache) => {
            out.push('=');
            write_mustache(mustache, out);
        }
        AttrValue::Concat { parts } => {
            out.push_str("=\"");
            for part in parts {
                match part {
                    ConcatPart::Text(text) => out.push_str(&text.chars),
                    ConcatPart::Mustache(mustache) => write_mustache(mustache, out),
                }
            }
            out.push('"');
        }
    }
}

fn write_mustache(mustache: &MustacheStatement, out: &mut String) {
    let (open, close) = if mustache.trusting {
        ("{{{", "}}}")
    } else {
        ("{{", "}}")
    };
    out.push_str(open);
    write_call(&mustache.path, &mustache.params, &mustache.hash, out);
    out.push_str(close);
}

fn write_block(block: &BlockStatement, out: &mut String) {
    out.push_str("{{#");
    write_call(&block.path, &block.params, &block.hash, out);
    write_block_params(&block.program, out);
    out.push_str("}}");
    print_statements(&block.program.body, out);

    if let Some(inverse) = &block.inverse {
        out.push_str("{{else");
        write_block_params(inverse, out);
        out.push_str("}}");
        print_statements(&inverse.body, out);
    }

    out.push_str("{{/");
    if let Expression::Path(path) = &block.path {
        out.push_str(&path.original);
    }
    out.push_str("}}");
}

fn write_block_params(block: &Block, out: &mut String) {
    if block.block_params.is_empty() {
        return;
    }
    out.push_str(" as |");
    out.push_str(&block.block_params.join(" "));
    out.push('|');
}

fn write_comment(comment: &CommentStatement, out: &mut String) {
    if comment.html {
        out.push_str("<!--");
        out.push_str(&comment.value);
        out.push_str("-->");
    } else {
        out.push_str("{{!--");
        out.push_str(&comment.value);
        out.push_str("--}}");
    }
}

fn write_call(path: &Expression, params: &[Expression], hash: &Hash, out: &mut String) {
    write_expression(path, out);
    for param in params {
        out.push(' ');
        write_expression(param, out);
    }
    for pair in &hash.pairs {
        out.push(' ');
        out.push_str(&pair.key);
        out.push('=');
        write_expression(&pair.value, out);
    }
}

fn write_expression(expression: &Expression, out: &mut String) {
    match expression {
        Expression::Path(path) => out.push_str(&path.original),
        Expression::Literal(literal) => write_literal(literal, out),
        Expression::SubExpression(sub) => {
            out.push('(');
            write_call(&sub.path, &sub.params, &sub.hash, out);
            out.push(')');
        }
    }
}

fn write_literal(literal: &Literal, out: &mut String) {
    match literal {
        Literal::String(value) => {
            let quote = if value.contains('"') { '\'' } else { '"' };
            out.push(quote);
            out.push_str(value);
            out.push(quote);
        }
        Literal::Number(value) => out.push_str(&value.to_string()),
        Literal::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
        Literal::Null => out.push_str("null"),
        Literal::Undefined => out.push_str("undefined"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn roundtrip(source: &str) -> String {
        print(&parse(source).expect("should parse"))
    }

    #[test]
    fn test_print_element_with_attributes() {
        insta::assert_snapshot!(
            roundtrip(r#"<div data-test="foo" data-blah="derp" class="hahaha"></div>"#),
            @r#"<div data-test="foo" data-blah="derp" class="hahaha"></div>"#
        );
    }

    #[test]
    fn test_print_block_with_params() {
        insta::assert_snapshot!(
            roundtrip(r#"{{#each items key="id" as |item|}}<li>{{item.name}}</li>{{else}}none{{/each}}"#),
            @r#"{{#each items key="id" as |item|}}<li>{{item.name}}</li>{{else}}none{{/each}}"#
        );
    }

    #[test]
    fn test_print_void_and_modifiers() {
        insta::assert_snapshot!(
            roundtrip(r#"<input disabled value={{this.name}} {{on "input" this.update}}><br />"#),
            @r#"<input disabled value={{this.name}} {{on "input" this.update}}><br />"#
        );
    }

    #[test]
    fn test_print_concat_and_literals() {
        insta::assert_snapshot!(
            roundtrip(r#"<a href="/users/{{id}}/edit">{{{html (t 'say "hi"' 2 false)}}}</a>"#),
            @r#"<a href="/users/{{id}}/edit">{{{html (t 'say "hi"' 2 false)}}}</a>"#
        );
    }

    #[test]
    fn test_print_comments() {
        assert_eq!(roundtrip("{{! note }}<!-- html -->"), "{{!-- note --}}<!-- html -->");
    }
}
