//! Diagnostic AST printer.
//!
//! Renders the node tree as an indented outline. Purely diagnostic: the
//! driver prints this under `--dump-ast`.

use std::fmt::Write;

use minc_util::NodeId;

use crate::ast::{Ast, NodeKind};

/// Renders every root of `ast` into one string.
pub fn render_ast(ast: &Ast) -> String {
    let mut out = String::new();
    for &root in &ast.roots {
        render_node(ast, root, 0, &mut out);
    }
    out
}

fn indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn render_opt(ast: &Ast, node: Option<NodeId>, depth: usize, out: &mut String) {
    if let Some(node) = node {
        render_node(ast, node, depth, out);
    }
}

fn render_node(ast: &Ast, node: NodeId, depth: usize, out: &mut String) {
    indent(depth, out);
    match &ast.arena[node].kind {
        NodeKind::Number { value } => {
            let _ = writeln!(out, "number: {value}");
        }
        NodeKind::Str { text } => {
            let _ = writeln!(out, "string: {text:?}");
        }
        NodeKind::Identifier { name } => {
            let _ = writeln!(out, "identifier: {name}");
        }
        NodeKind::Expression { left, right, op } => {
            let _ = writeln!(out, "expression: {op}");
            render_node(ast, *left, depth + 1, out);
            render_node(ast, *right, depth + 1, out);
        }
        NodeKind::Parentheses { inner } => {
            let _ = writeln!(out, "parentheses");
            render_node(ast, *inner, depth + 1, out);
        }
        NodeKind::Unary { op, operand } => {
            let _ = writeln!(out, "unary: {op}");
            render_node(ast, *operand, depth + 1, out);
        }
        NodeKind::Ternary { true_node, false_node } => {
            let _ = writeln!(out, "ternary");
            render_node(ast, *true_node, depth + 1, out);
            render_node(ast, *false_node, depth + 1, out);
        }
        NodeKind::Bracket { inner } => {
            let _ = writeln!(out, "bracket");
            render_node(ast, *inner, depth + 1, out);
        }
        NodeKind::Cast { dtype, operand } => {
            let _ = writeln!(out, "cast: {}", dtype.name);
            render_node(ast, *operand, depth + 1, out);
        }
        NodeKind::Variable(var) => {
            let name = var.name.map_or_else(|| String::from("<unnamed>"), |n| n.to_string());
            let _ = writeln!(
                out,
                "variable: {name} (size {}, offset {}, padding {})",
                var.dtype.byte_size(),
                var.aligned_offset,
                var.padding
            );
            render_opt(ast, var.value, depth + 1, out);
        }
        NodeKind::VariableList { variables } => {
            let _ = writeln!(out, "variable list");
            for &variable in variables {
                render_node(ast, variable, depth + 1, out);
            }
        }
        NodeKind::Function(func) => {
            let _ = writeln!(out, "function: {} (stack size {})", func.name, func.stack_size);
            for &arg in &func.args {
                render_node(ast, arg, depth + 1, out);
            }
            render_opt(ast, func.body, depth + 1, out);
        }
        NodeKind::Body(body) => {
            let _ = writeln!(out, "body (size {}, padded {})", body.size, body.padded);
            for &statement in &body.statements {
                render_node(ast, statement, depth + 1, out);
            }
        }
        NodeKind::Struct(aggregate) => {
            let _ = writeln!(out, "struct: {}", aggregate.name);
            render_opt(ast, aggregate.body, depth + 1, out);
            render_opt(ast, aggregate.variable, depth + 1, out);
        }
        NodeKind::Union(aggregate) => {
            let _ = writeln!(out, "union: {}", aggregate.name);
            render_opt(ast, aggregate.body, depth + 1, out);
            render_opt(ast, aggregate.variable, depth + 1, out);
        }
        NodeKind::ReturnStmt { expr } => {
            let _ = writeln!(out, "return");
            render_opt(ast, *expr, depth + 1, out);
        }
        NodeKind::IfStmt { condition, body, else_node } => {
            let _ = writeln!(out, "if");
            render_node(ast, *condition, depth + 1, out);
            render_node(ast, *body, depth + 1, out);
            render_opt(ast, *else_node, depth + 1, out);
        }
        NodeKind::ElseStmt { body } => {
            let _ = writeln!(out, "else");
            render_node(ast, *body, depth + 1, out);
        }
        NodeKind::WhileStmt { condition, body } => {
            let _ = writeln!(out, "while");
            render_node(ast, *condition, depth + 1, out);
            render_node(ast, *body, depth + 1, out);
        }
        NodeKind::DoWhileStmt { body, condition } => {
            let _ = writeln!(out, "do while");
            render_node(ast, *body, depth + 1, out);
            render_node(ast, *condition, depth + 1, out);
        }
        NodeKind::ForStmt { init, condition, increment, body } => {
            let _ = writeln!(out, "for");
            render_opt(ast, *init, depth + 1, out);
            render_opt(ast, *condition, depth + 1, out);
            render_opt(ast, *increment, depth + 1, out);
            render_node(ast, *body, depth + 1, out);
        }
        NodeKind::SwitchStmt { expr, body, cases, has_default } => {
            let _ = writeln!(out, "switch (cases {}, default {has_default})", cases.len());
            render_node(ast, *expr, depth + 1, out);
            render_node(ast, *body, depth + 1, out);
        }
        NodeKind::CaseStmt { expr } => {
            let _ = writeln!(out, "case");
            render_node(ast, *expr, depth + 1, out);
        }
        NodeKind::DefaultStmt => {
            let _ = writeln!(out, "default");
        }
        NodeKind::BreakStmt => {
            let _ = writeln!(out, "break");
        }
        NodeKind::ContinueStmt => {
            let _ = writeln!(out, "continue");
        }
        NodeKind::GotoStmt { label } => {
            let _ = writeln!(out, "goto");
            render_node(ast, *label, depth + 1, out);
        }
        NodeKind::Label { name } => {
            let _ = writeln!(out, "label");
            render_node(ast, *name, depth + 1, out);
        }
        NodeKind::Blank => {
            let _ = writeln!(out, "blank");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::render_ast;
    use crate::test_support::parse_source;

    #[test]
    fn test_render_variable_with_initializer() {
        let ast = parse_source("int a = 1 + 2;");
        let rendered = render_ast(&ast);
        assert!(rendered.contains("variable: a"));
        assert!(rendered.contains("expression: +"));
        assert!(rendered.contains("number: 1"));
        assert!(rendered.contains("number: 2"));
    }

    #[test]
    fn test_render_indents_children() {
        let ast = parse_source("int f() { return 0; }");
        let rendered = render_ast(&ast);
        assert!(rendered.contains("function: f"));
        assert!(rendered.contains("\n  body"));
        assert!(rendered.contains("\n    return"));
    }
}
