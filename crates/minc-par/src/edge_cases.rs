//! Edge case and invariant tests for minc-par.

#[cfg(test)]
mod tests {
    use minc_util::{Handler, NodeId, Symbol};

    use crate::ast::NodeKind;
    use crate::print::render_ast;
    use crate::test_support::{parse_error, parse_source};
    use crate::Parser;

    fn initializer_of_first_root(ast: &crate::Ast) -> NodeId {
        ast.arena[ast.roots[0]].as_variable().unwrap().value.unwrap()
    }

    fn root_operator(source: &str) -> String {
        let ast = parse_source(source);
        let value = initializer_of_first_root(&ast);
        match &ast.arena[value].kind {
            NodeKind::Expression { op, .. } => op.as_str().to_string(),
            other => panic!("expected expression for {source:?}, got {other:?}"),
        }
    }

    // The root operator of `a op1 b op2 c` is always the looser binder.
    #[test]
    fn test_root_operator_respects_precedence() {
        for (op1, op2, expected_root) in [
            ("+", "*", "+"),
            ("*", "+", "+"),
            ("<<", "+", "<<"),
            ("+", "<<", "<<"),
            ("==", "&&", "&&"),
            ("&&", "==", "&&"),
            ("*", "/", "/"),
            ("+", "-", "-"),
            ("|", "^", "|"),
        ] {
            let source = format!("int r = 1 {op1} 2 {op2} 3;");
            assert_eq!(root_operator(&source), expected_root, "{source}");
        }
    }

    // Reordering an already-reordered tree changes nothing.
    #[test]
    fn test_reorder_is_idempotent() {
        for source in [
            "int r = 1 + 2 * 3;",
            "int r = 1 * 2 + 3;",
            "int r = 1 + 2 + 3 + 4;",
            "int r = 1 * 2 + 3 * 4 - 5;",
            "int r = a = b + c * d;",
        ] {
            let handler = Handler::new();
            let tokens = minc_lex::lex_string(source, "t.c").unwrap();
            let mut parser = Parser::new(tokens, Symbol::intern("t.c"), &handler);
            parser.parse().unwrap();

            let expressions: Vec<NodeId> = parser
                .cx
                .arena
                .iter_enumerated()
                .filter(|(_, node)| matches!(node.kind, NodeKind::Expression { .. }))
                .map(|(id, _)| id)
                .collect();
            let before: Vec<crate::Node> = expressions.iter().map(|&id| parser.cx.arena[id].clone()).collect();

            for &id in &expressions {
                parser.reorder_expression(id);
            }
            for (id, snapshot) in expressions.iter().zip(before) {
                assert_eq!(parser.cx.arena[*id], snapshot, "{source}");
            }
        }
    }

    // Every expression node's children can stand as sub-expressions.
    #[test]
    fn test_expression_children_are_expressionable() {
        let ast = parse_source(
            "int f(int x, int y) { int r = x + y * 2 - f(x, y) + a[3]; return r ? r : 0 - r; }\nint a[5];",
        );
        for node in ast.arena.iter() {
            if let NodeKind::Expression { left, right, op } = &node.kind {
                let left_ok = ast.arena[*left].is_expressionable();
                // The right child of call/subscript/ternary wrappers is the
                // structural node itself.
                let right_ok = ast.arena[*right].is_expressionable()
                    || matches!(
                        ast.arena[*right].kind,
                        NodeKind::Bracket { .. } | NodeKind::Ternary { .. } | NodeKind::Parentheses { .. }
                    );
                assert!(left_ok, "bad left child under {op}");
                assert!(right_ok, "bad right child under {op}");
            }
        }
    }

    #[test]
    fn test_function_call_wraps_callee() {
        let ast = parse_source("int r = f(1, 2);");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, right, op } = &ast.arena[value].kind else {
            panic!("expected call expression");
        };
        assert_eq!(op.as_str(), "()");
        assert!(matches!(&ast.arena[*left].kind, NodeKind::Identifier { name } if name.as_str() == "f"));
        match &ast.arena[*right].kind {
            NodeKind::Parentheses { inner } => match &ast.arena[*inner].kind {
                NodeKind::Expression { op, .. } => assert_eq!(op.as_str(), ","),
                other => panic!("expected comma arguments, got {other:?}"),
            },
            other => panic!("expected parentheses, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_call_gets_blank_inner() {
        let ast = parse_source("int r = f();");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { right, op, .. } = &ast.arena[value].kind else {
            panic!("expected call expression");
        };
        assert_eq!(op.as_str(), "()");
        match &ast.arena[*right].kind {
            NodeKind::Parentheses { inner } => {
                assert!(matches!(ast.arena[*inner].kind, NodeKind::Blank));
            }
            other => panic!("expected parentheses, got {other:?}"),
        }
    }

    #[test]
    fn test_subscript_expression() {
        let ast = parse_source("int r = a[5];");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, right, op } = &ast.arena[value].kind else {
            panic!("expected subscript expression");
        };
        assert_eq!(op.as_str(), "[]");
        assert!(matches!(ast.arena[*left].kind, NodeKind::Identifier { .. }));
        assert!(matches!(ast.arena[*right].kind, NodeKind::Bracket { .. }));
    }

    #[test]
    fn test_chained_subscripts() {
        let ast = parse_source("int r = m[1][2];");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, op, .. } = &ast.arena[value].kind else {
            panic!("expected subscript expression");
        };
        assert_eq!(op.as_str(), "[]");
        let NodeKind::Expression { op: inner_op, .. } = &ast.arena[*left].kind else {
            panic!("expected nested subscript");
        };
        assert_eq!(inner_op.as_str(), "[]");
    }

    #[test]
    fn test_ternary_expression() {
        let ast = parse_source("int r = c ? 1 : 2;");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, right, op } = &ast.arena[value].kind else {
            panic!("expected ternary wrapper");
        };
        assert_eq!(op.as_str(), "?");
        assert!(matches!(ast.arena[*left].kind, NodeKind::Identifier { .. }));
        match &ast.arena[*right].kind {
            NodeKind::Ternary { true_node, false_node } => {
                assert!(matches!(ast.arena[*true_node].kind, NodeKind::Number { value: 1 }));
                assert!(matches!(ast.arena[*false_node].kind, NodeKind::Number { value: 2 }));
            }
            other => panic!("expected ternary, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_operators() {
        let ast = parse_source("int r = -x;");
        let value = initializer_of_first_root(&ast);
        match &ast.arena[value].kind {
            NodeKind::Unary { op, operand } => {
                assert_eq!(op.as_str(), "-");
                assert!(matches!(ast.arena[*operand].kind, NodeKind::Identifier { .. }));
            }
            other => panic!("expected unary, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_unary() {
        let ast = parse_source("int r = !!x;");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Unary { operand, .. } = &ast.arena[value].kind else {
            panic!("expected unary");
        };
        assert!(matches!(ast.arena[*operand].kind, NodeKind::Unary { .. }));
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let ast = parse_source("int r = -x + y;");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, op, .. } = &ast.arena[value].kind else {
            panic!("expected binary expression");
        };
        assert_eq!(op.as_str(), "+");
        assert!(matches!(ast.arena[*left].kind, NodeKind::Unary { .. }));
    }

    #[test]
    fn test_cast_expression() {
        let ast = parse_source("int r = (char) x;");
        let value = initializer_of_first_root(&ast);
        match &ast.arena[value].kind {
            NodeKind::Cast { dtype, operand } => {
                assert_eq!(dtype.kind, crate::DataTypeKind::Char);
                assert!(matches!(ast.arena[*operand].kind, NodeKind::Identifier { .. }));
            }
            other => panic!("expected cast, got {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_grouping() {
        let ast = parse_source("int r = (1 + 2) * 3;");
        let value = initializer_of_first_root(&ast);
        let NodeKind::Expression { left, op, .. } = &ast.arena[value].kind else {
            panic!("expected expression");
        };
        assert_eq!(op.as_str(), "*");
        assert!(matches!(ast.arena[*left].kind, NodeKind::Parentheses { .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let ast = parse_source("int r = a = b = 1;");
        let value = initializer_of_first_root(&ast);
        // `a = (b = 1)` - the inner assignment stays on the right.
        let NodeKind::Expression { right, op, .. } = &ast.arena[value].kind else {
            panic!("expected assignment");
        };
        assert_eq!(op.as_str(), "=");
        assert!(matches!(&ast.arena[*right].kind, NodeKind::Expression { op, .. } if op.as_str() == "="));
    }

    #[test]
    fn test_comments_and_newlines_are_skipped() {
        let ast = parse_source("int a /* size */ = \n // trailing\n 5;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(matches!(ast.arena[var.value.unwrap()].kind, NodeKind::Number { value: 5 }));
    }

    #[test]
    fn test_include_line_becomes_blank_root() {
        let ast = parse_source("#include <stdio.h>\nint a;");
        assert_eq!(ast.roots.len(), 2);
        assert!(matches!(ast.arena[ast.roots[0]].kind, NodeKind::Blank));
    }

    #[test]
    fn test_global_scope_variables_have_no_offset() {
        let ast = parse_source("int a; int b;");
        for &root in &ast.roots {
            let var = ast.arena[root].as_variable().unwrap();
            assert_eq!(var.aligned_offset, 0);
            assert_eq!(var.padding, 0);
        }
    }

    #[test]
    fn test_struct_containing_struct_pointer() {
        let ast = parse_source("struct inner { int a; int b; }; struct outer { struct inner* i; int c; };");
        let NodeKind::Struct(outer) = &ast.arena[ast.roots[1]].kind else {
            panic!("expected struct");
        };
        let NodeKind::Body(body) = &ast.arena[outer.body.unwrap()].kind else {
            panic!("expected body");
        };
        // A DWORD pointer plus 4 bytes of c.
        assert_eq!(body.size, 8);
        let c = ast.arena[body.statements[1]].as_variable().unwrap();
        assert_eq!(c.aligned_offset, 4);
    }

    #[test]
    fn test_nested_aggregate_member_completed_by_fixup() {
        // Aggregate lookup scans the active symbol frame only, so a by-value
        // member of another struct type resolves through the fix-up system
        // at end of parse.
        let ast = parse_source("struct inner { int a; int b; }; struct outer { struct inner i; };");
        let NodeKind::Struct(outer) = &ast.arena[ast.roots[1]].kind else {
            panic!("expected struct");
        };
        let NodeKind::Body(body) = &ast.arena[outer.body.unwrap()].kind else {
            panic!("expected body");
        };
        let i = ast.arena[body.statements[0]].as_variable().unwrap();
        assert_eq!(i.dtype.size, 8);
        assert!(i.dtype.aggregate_node.is_some());
    }

    #[test]
    fn test_self_referential_struct() {
        let ast = parse_source("struct node { int value; struct node* next; };");
        let NodeKind::Struct(aggregate) = &ast.arena[ast.roots[0]].kind else {
            panic!("expected struct");
        };
        let NodeKind::Body(body) = &ast.arena[aggregate.body.unwrap()].kind else {
            panic!("expected body");
        };
        assert_eq!(body.size, 8);
        let next = ast.arena[body.statements[1]].as_variable().unwrap();
        assert_eq!(next.aligned_offset, 4);
        assert_eq!(next.dtype.byte_size(), 4);
        // The fix-up bound the struct to its own definition.
        assert_eq!(next.dtype.aggregate_node, Some(ast.roots[0]));
    }

    #[test]
    fn test_struct_with_inline_declarator() {
        let ast = parse_source("struct point { int x; int y; } origin;");
        let NodeKind::Struct(aggregate) = &ast.arena[ast.roots[0]].kind else {
            panic!("expected struct");
        };
        let variable = aggregate.variable.expect("inline declarator variable");
        let var = ast.arena[variable].as_variable().unwrap();
        assert_eq!(var.name.unwrap().as_str(), "origin");
        assert_eq!(var.dtype.size, 8);
        assert!(ast.arena[ast.roots[0]].flags.contains(crate::NodeFlags::HAS_VARIABLE_COMBINED));
    }

    #[test]
    fn test_unexpected_keyword_is_fatal() {
        let err = parse_error("int f() { sizeof; }");
        assert!(err.to_string().contains("unexpected keyword"));
    }

    #[test]
    fn test_missing_semicolon_is_fatal() {
        let err = parse_error("int a = 5");
        assert!(err.to_string().contains("expecting symbol ;"));
    }

    #[test]
    fn test_renderer_smoke() {
        let ast = parse_source("struct s { int a; }; int f(int x) { if (x) { return x; } return 0; }");
        let rendered = render_ast(&ast);
        assert!(rendered.contains("struct: s"));
        assert!(rendered.contains("function: f"));
        assert!(rendered.contains("if"));
    }

    #[test]
    fn test_char_literal_initializer() {
        let ast = parse_source("char c = 'A';");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(matches!(ast.arena[var.value.unwrap()].kind, NodeKind::Number { value: 65 }));
    }

    #[test]
    fn test_hex_initializer_through_parser() {
        let ast = parse_source("int mask = 0xFF + 0b1010;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        let NodeKind::Expression { left, right, op } = &ast.arena[var.value.unwrap()].kind else {
            panic!("expected expression");
        };
        assert_eq!(op.as_str(), "+");
        assert!(matches!(ast.arena[*left].kind, NodeKind::Number { value: 255 }));
        assert!(matches!(ast.arena[*right].kind, NodeKind::Number { value: 10 }));
    }
}
