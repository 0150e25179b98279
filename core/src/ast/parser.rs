use crate::ast::expr::{CallExpr, Expr};
use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// Lowered view of one parsed source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub calls: Vec<CallExpr>,
}

pub struct GoParser {
    parsers: HashMap<String, Parser>,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let mut parsers = HashMap::new();

        let supported_extensions: Vec<(&str, Language)> =
            vec![(".go", tree_sitter_go::LANGUAGE.into())];

        for (ext, language) in supported_extensions {
            let mut parser = Parser::new();
            parser
                .set_language(&language)
                .map_err(|e| CoreError::Ast(format!("Failed to load parser for {}: {}", ext, e)))?;
            parsers.insert(ext.to_string(), parser);
        }

        Ok(Self { parsers })
    }

    /// Parses `content` and collects every call expression, nested ones included.
    /// A tree containing syntax errors counts as a parse failure.
    pub fn parse_file(&mut self, file_path: &Path, content: &str) -> Result<ParsedFile> {
        let ext = file_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| format!(".{}", s))
            .unwrap_or_default();

        let parser = self
            .parsers
            .get_mut(&ext)
            .ok_or_else(|| CoreError::Parse(format!("Unsupported file extension: {}", ext)))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| CoreError::Parse("Failed to parse file".to_string()))?;

        let root_node = tree.root_node();
        if root_node.has_error() {
            let line = first_error_line(root_node).unwrap_or(1);
            return Err(CoreError::Parse(format!("syntax error near line {}", line)));
        }

        let mut calls = Vec::new();

        fn visit_node(node: Node, content: &str, calls: &mut Vec<CallExpr>) {
            if node.kind() == "call_expression" {
                calls.push(lower_call(node, content));
            }

            for child in node.children(&mut node.walk()) {
                visit_node(child, content, calls);
            }
        }

        visit_node(root_node, content, &mut calls);
        Ok(ParsedFile { calls })
    }
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    for child in node.children(&mut node.walk()) {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

fn lower_call(node: Node, content: &str) -> CallExpr {
    let callee = node
        .child_by_field_name("function")
        .map(|f| lower_expr(f, content))
        .unwrap_or(Expr::Other);

    let mut args = Vec::new();
    if let Some(arguments) = node.child_by_field_name("arguments") {
        for child in arguments.named_children(&mut arguments.walk()) {
            if child.kind() != "comment" {
                args.push(lower_expr(child, content));
            }
        }
    }

    CallExpr {
        callee,
        args,
        line: node.start_position().row + 1,
    }
}

fn lower_expr(node: Node, content: &str) -> Expr {
    let text = |n: Node| content[n.byte_range()].to_string();

    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => {
            Expr::StringLit(unquote(&content[node.byte_range()]))
        }
        "identifier" | "package_identifier" | "field_identifier" => Expr::Ident(text(node)),
        "selector_expression" => {
            let operand = node
                .child_by_field_name("operand")
                .map(|o| lower_expr(o, content))
                .unwrap_or(Expr::Other);
            match node.child_by_field_name("field") {
                Some(field) => Expr::Selector {
                    operand: Box::new(operand),
                    field: text(field),
                },
                None => Expr::Other,
            }
        }
        "binary_expression" => {
            match (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(op), Some(right)) => Expr::Binary {
                    op: text(op),
                    left: Box::new(lower_expr(left, content)),
                    right: Box::new(lower_expr(right, content)),
                },
                _ => Expr::Other,
            }
        }
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| lower_expr(inner, content))
            .unwrap_or(Expr::Other),
        "call_expression" => Expr::Call(Box::new(lower_call(node, content))),
        _ => Expr::Other,
    }
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('`').and_then(|s| s.strip_suffix('`')));
    inner.unwrap_or(trimmed).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_SRC: &str = r#"package bastion

import (
	"context"
	"fmt"
	"net/http"
)

func readUser(ctx context.Context, c *Client, name string) {
	body, code, err := c.newRequest(ctx, "/users/"+name, http.MethodGet, nil)
	_ = fmt.Sprintf("/devices/%s", name)
}
"#;

    #[test]
    fn collects_nested_calls() {
        let mut parser = GoParser::new().unwrap();
        let parsed = parser.parse_file(Path::new("client.go"), CLIENT_SRC).unwrap();

        let names: Vec<_> = parsed.calls.iter().filter_map(|c| c.callee_name()).collect();
        assert_eq!(names, vec!["newRequest", "Sprintf"]);

        let request = &parsed.calls[0];
        assert_eq!(request.line, 10);
        assert_eq!(request.args.len(), 4);
        assert_eq!(request.args[1].path_text().as_deref(), Some("/users/"));
        assert_eq!(request.args[2].method_token().as_deref(), Some("GET"));
    }

    #[test]
    fn syntax_errors_fail_the_parse() {
        let mut parser = GoParser::new().unwrap();
        let err = parser
            .parse_file(Path::new("broken.go"), "package main\nfunc broken( {\n")
            .unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let mut parser = GoParser::new().unwrap();
        assert!(parser.parse_file(Path::new("main.py"), "print(1)").is_err());
    }

    #[test]
    fn unquote_handles_raw_strings() {
        assert_eq!(unquote("\"/users\""), "/users");
        assert_eq!(unquote("`/raw`"), "/raw");
    }
}
