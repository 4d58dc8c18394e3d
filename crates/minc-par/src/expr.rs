//! Expression parsing and precedence reordering.
//!
//! Expressions are first assembled right-leaning in encounter order:
//! `50 * 10 + 20` initially becomes `50 * (10 + 20)`, because the right
//! operand parse swallows the rest of the expression. A reorder pass then
//! rotates the tree into precedence order using the group table below.
//!
//! # Precedence groups (group 0 binds tightest)
//!
//! | Group | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 0 | `++ -- () [] ( ) . ->` | Left |
//! | 1 | `* / %` | Left |
//! | 2 | `+ -` | Left |
//! | 3 | `<< >>` | Left |
//! | 4 | `< <= > >=` | Left |
//! | 5 | `== !=` | Left |
//! | 6 | `&` | Left |
//! | 7 | `^` | Left |
//! | 8 | `\|` | Left |
//! | 9 | `&&` | Left |
//! | 10 | `\|\|` | Left |
//! | 11 | `?` | Right |
//! | 12 | `= += -= *= /= %= <<= >>= &= \|= ^=` | Right |
//! | 13 | `,` | Left |

use minc_lex::TokenKind;
use minc_util::{NodeId, Result, Symbol};

use crate::ast::NodeKind;
use crate::{History, Parser};

/// Operator associativity within one precedence group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

/// One precedence group: its operator spellings and associativity.
pub struct OperatorPrecedenceGroup {
    pub operators: &'static [&'static str],
    pub associativity: Associativity,
}

/// The precedence table; the index of a group is its precedence, and lower
/// binds tighter.
pub static OPERATOR_PRECEDENCE: &[OperatorPrecedenceGroup] = &[
    OperatorPrecedenceGroup {
        operators: &["++", "--", "()", "[]", "(", ")", ".", "->"],
        associativity: Associativity::LeftToRight,
    },
    OperatorPrecedenceGroup { operators: &["*", "/", "%"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["+", "-"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["<<", ">>"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["<", "<=", ">", ">="], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["==", "!="], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["&"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["^"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["|"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["&&"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["||"], associativity: Associativity::LeftToRight },
    OperatorPrecedenceGroup { operators: &["?"], associativity: Associativity::RightToLeft },
    OperatorPrecedenceGroup {
        operators: &["=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "|=", "^="],
        associativity: Associativity::RightToLeft,
    },
    OperatorPrecedenceGroup { operators: &[","], associativity: Associativity::LeftToRight },
];

/// Looks an operator up in the table: `(precedence, group)`.
pub fn precedence_for_operator(op: &str) -> Option<(usize, &'static OperatorPrecedenceGroup)> {
    OPERATOR_PRECEDENCE
        .iter()
        .enumerate()
        .find(|(_, group)| group.operators.contains(&op))
        .map(|(index, group)| (index, group))
}

/// The precedence comparison driving reordering.
///
/// Equal operators never outrank each other; a right-associative left group
/// never rotates; otherwise the left operator outranks when its group does
/// not bind looser.
pub fn left_outranks_right(left: &str, right: &str) -> bool {
    if left == right {
        return false;
    }
    let Some((left_precedence, left_group)) = precedence_for_operator(left) else {
        return false;
    };
    let Some((right_precedence, _)) = precedence_for_operator(right) else {
        return false;
    };
    if left_group.associativity == Associativity::RightToLeft {
        return false;
    }
    left_precedence <= right_precedence
}

/// Operators forming assignment expressions.
fn is_assignment_operator(op: &str) -> bool {
    matches!(op, "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "<<=" | ">>=" | "&=" | "|=" | "^=")
}

/// Operators that may begin a unary expression.
fn is_unary_operator(op: &str) -> bool {
    matches!(op, "-" | "!" | "~" | "*" | "&" | "++" | "--")
}

impl<'a> Parser<'a> {
    /// Parses expressionable units until the tokens stop forming one.
    pub(crate) fn parse_expressionable(&mut self, history: History) -> Result<()> {
        while self.parse_expressionable_single(history)? {}
        Ok(())
    }

    /// Like [`Parser::parse_expressionable`], but guarantees a node was
    /// produced.
    pub(crate) fn parse_expressionable_root(&mut self, history: History) -> Result<()> {
        self.parse_expressionable(history)?;
        if self.peek_node_or_null().is_none() {
            return Err(self.err_syntactic("expected an expression"));
        }
        Ok(())
    }

    /// Parses one expressionable unit; false when the next token cannot
    /// start or extend an expression.
    pub(crate) fn parse_expressionable_single(&mut self, history: History) -> Result<bool> {
        let Some(token) = self.peek_token() else {
            return Ok(false);
        };
        let history = history.with(History::INSIDE_EXPRESSION);
        match &token.kind {
            TokenKind::Number { .. } | TokenKind::Str(_) => {
                self.parse_single_token_to_node()?;
                Ok(true)
            }
            TokenKind::Identifier(_) => {
                self.parse_single_token_to_node()?;
                Ok(true)
            }
            TokenKind::Operator(_) => {
                self.parse_expression(history)?;
                Ok(true)
            }
            TokenKind::Keyword(_) => {
                self.parse_keyword(history)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Turns a single number/string/identifier token into a leaf node.
    pub(crate) fn parse_single_token_to_node(&mut self) -> Result<()> {
        let Some(token) = self.next_token() else {
            return Err(self.err_syntactic("expected an expression"));
        };
        let kind = match token.kind {
            TokenKind::Number { value, .. } => NodeKind::Number { value },
            TokenKind::Str(text) => NodeKind::Str { text },
            TokenKind::Identifier(name) => NodeKind::Identifier { name },
            _ => return Err(self.err_syntactic("this token cannot form a single node")),
        };
        let node = self.create_node(kind, token.pos);
        self.push_node(node);
        Ok(())
    }

    /// Dispatches on the operator at the cursor.
    pub(crate) fn parse_expression(&mut self, history: History) -> Result<()> {
        if self.is_next_operator("(") {
            self.parse_for_parenthesis(history)
        } else if self.is_next_operator("?") {
            self.parse_for_ternary(history)
        } else if self.is_next_operator(",") {
            self.parse_for_comma(history)
        } else if self.is_next_operator("[") {
            self.parse_for_array(history)
        } else {
            self.parse_normal_expression(history)
        }
    }

    /// Parses a binary expression: pops the left operand off the node stack,
    /// consumes the operator, parses the right side and reorders.
    fn parse_normal_expression(&mut self, history: History) -> Result<()> {
        let op = self.peek_operator()?;
        let Some(left) = self.peek_expressionable_or_null() else {
            if is_unary_operator(op.as_str()) {
                return self.parse_for_unary(history);
            }
            return Err(self.err_syntactic(format!("operator {op} has nothing to operate on")));
        };
        let pos = self.peek_pos();
        self.next_token();
        self.pop_node()?;
        self.set_node_flag(left, crate::NodeFlags::INSIDE_EXPRESSION);

        // The right side swallows the rest of the expression; the reorder
        // pass afterwards restores precedence order.
        self.parse_operator_expression(history, op)?;
        let right = self.pop_node()?;
        self.set_node_flag(right, crate::NodeFlags::INSIDE_EXPRESSION);

        let expression = self.create_node(NodeKind::Expression { left, right, op }, pos);
        self.reorder_expression(expression);
        self.push_node(expression);
        Ok(())
    }

    /// Parses the right-hand side of `op`.
    fn parse_operator_expression(&mut self, history: History, _op: Symbol) -> Result<()> {
        self.parse_expressionable_root(history)
    }

    /// Parses a prefix unary expression.
    fn parse_for_unary(&mut self, history: History) -> Result<()> {
        let op = self.peek_operator()?;
        let pos = self.peek_pos();
        self.next_token();
        if !self.parse_expressionable_single(history)? {
            return Err(self.err_syntactic(format!("operator {op} has no operand")));
        }
        let operand = self.pop_node()?;
        self.set_node_flag(operand, crate::NodeFlags::INSIDE_EXPRESSION);
        let unary = self.create_node(NodeKind::Unary { op, operand }, pos);
        self.push_node(unary);
        Ok(())
    }

    /// Parses `(...)`: a cast, a grouping, or a call when an expressionable
    /// node is already on the stack.
    fn parse_for_parenthesis(&mut self, history: History) -> Result<()> {
        // The not-a-function-call marker applies to this group only; calls
        // nested inside it parse normally.
        let not_a_call = history.has(History::PARENTHESES_IS_NOT_FUNCTION_CALL);
        let history = history.without(History::PARENTHESES_IS_NOT_FUNCTION_CALL);

        let pos = self.peek_pos();
        self.expect_operator("(")?;

        if self.peek_token().is_some_and(|t| matches!(t.kind, TokenKind::Keyword(_))) {
            return self.parse_for_cast(history, pos);
        }

        let callee = if not_a_call {
            None
        } else {
            match self.peek_expressionable_or_null() {
                Some(node) => {
                    self.pop_node()?;
                    Some(node)
                }
                None => None,
            }
        };

        let inner = if self.is_next_symbol(')') {
            self.create_node(NodeKind::Blank, self.pos)
        } else {
            self.parse_expressionable_root(history)?;
            self.pop_node()?
        };
        self.expect_symbol(')')?;

        let parentheses = self.create_node(NodeKind::Parentheses { inner }, pos);
        let result = match callee {
            Some(callee) => {
                let call_op = Symbol::intern("()");
                self.create_node(NodeKind::Expression { left: callee, right: parentheses, op: call_op }, pos)
            }
            None => parentheses,
        };
        self.push_node(result);

        // Chain postfix forms: `f(a)(b)`, `(a + b) * c`.
        if self.peek_token().is_some_and(|t| matches!(t.kind, TokenKind::Operator(_))) {
            self.parse_expression(history)?;
        }
        Ok(())
    }

    /// Parses `(type) operand` after the `(` has been consumed.
    fn parse_for_cast(&mut self, history: History, pos: minc_util::Pos) -> Result<()> {
        let dtype = self.parse_datatype()?;
        self.expect_symbol(')')?;
        self.parse_expressionable_root(history)?;
        let operand = self.pop_node()?;
        let cast = self.create_node(NodeKind::Cast { dtype, operand }, pos);
        self.push_node(cast);
        Ok(())
    }

    /// Parses `cond ? a : b` with the condition already on the stack.
    fn parse_for_ternary(&mut self, history: History) -> Result<()> {
        let condition = self.pop_node()?;
        let pos = self.peek_pos();
        self.expect_operator("?")?;

        self.parse_expressionable_root(history)?;
        let true_node = self.pop_node()?;
        self.expect_symbol(':')?;
        self.parse_expressionable_root(history)?;
        let false_node = self.pop_node()?;

        let ternary = self.create_node(NodeKind::Ternary { true_node, false_node }, pos);
        let op = Symbol::intern("?");
        let expression = self.create_node(NodeKind::Expression { left: condition, right: ternary, op }, pos);
        self.push_node(expression);
        Ok(())
    }

    /// Parses `left, right` with the left side already on the stack.
    fn parse_for_comma(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.next_token();
        let left = self.pop_node()?;
        self.parse_expressionable_root(history)?;
        let right = self.pop_node()?;
        let op = Symbol::intern(",");
        let expression = self.create_node(NodeKind::Expression { left, right, op }, pos);
        self.push_node(expression);
        Ok(())
    }

    /// Parses `[index]`, wrapping a left operand into a subscript
    /// expression when one is on the stack.
    fn parse_for_array(&mut self, history: History) -> Result<()> {
        let left = match self.peek_node_or_null() {
            Some(node) => {
                self.pop_node()?;
                Some(node)
            }
            None => None,
        };
        let pos = self.peek_pos();
        self.expect_operator("[")?;
        self.parse_expressionable_root(history)?;
        let inner = self.pop_node()?;
        self.expect_symbol(']')?;

        let bracket = self.create_node(NodeKind::Bracket { inner }, pos);
        let result = match left {
            Some(left) => {
                let op = Symbol::intern("[]");
                self.create_node(NodeKind::Expression { left, right: bracket, op }, pos)
            }
            None => bracket,
        };
        self.push_node(result);
        Ok(())
    }

    /// The operator spelling at the cursor.
    fn peek_operator(&mut self) -> Result<Symbol> {
        match self.peek_token().map(|t| &t.kind) {
            Some(TokenKind::Operator(op)) => Ok(*op),
            _ => Err(self.err_syntactic("expecting an operator")),
        }
    }

    // ========================================================================
    // Reordering
    // ========================================================================

    fn expression_parts(&self, node: NodeId) -> Option<(NodeId, NodeId, Symbol)> {
        match &self.cx.arena[node].kind {
            NodeKind::Expression { left, right, op } => Some((*left, *right, *op)),
            _ => None,
        }
    }

    /// Rotates a freshly built expression into precedence order.
    ///
    /// Idempotent: reordering an already-ordered tree leaves it unchanged.
    pub(crate) fn reorder_expression(&mut self, node: NodeId) {
        let Some((left, right, op)) = self.expression_parts(node) else {
            return;
        };
        let left_is_expression = self.expression_parts(left).is_some();
        let right_parts = self.expression_parts(right);
        if !left_is_expression && right_parts.is_none() {
            return;
        }

        if !left_is_expression {
            if let Some((_, _, right_op)) = right_parts {
                if left_outranks_right(op.as_str(), right_op.as_str()) {
                    self.shift_right_to_left(node);
                    if let Some((new_left, new_right, _)) = self.expression_parts(node) {
                        self.reorder_expression(new_left);
                        self.reorder_expression(new_right);
                    }
                }
            }
        }

        // Post-rotations: a subscript assigned to, and a call whose
        // arguments were swallowed by the right-leaning build.
        if let Some((left, right, _)) = self.expression_parts(node) {
            let left_op = self.expression_parts(left).map(|(_, _, op)| op);
            let right_op = self.expression_parts(right).map(|(_, _, op)| op);
            let subscript_assignment = left_op.is_some_and(|op| op.as_str() == "[]")
                && right_op.is_some_and(|op| is_assignment_operator(op.as_str()));
            let call_with_arguments =
                left_op.is_some_and(|op| op.as_str() == "()") && right_op.is_some_and(|op| op.as_str() == ",");
            if subscript_assignment || call_with_arguments {
                self.shift_right_to_left(node);
            }
        }
    }

    /// The rotation: `L op (RL rop RR)` becomes `(L op RL) rop RR`.
    fn shift_right_to_left(&mut self, node: NodeId) {
        let Some((left, right, op)) = self.expression_parts(node) else {
            return;
        };
        let Some((right_left, right_right, right_op)) = self.expression_parts(right) else {
            return;
        };
        let pos = self.cx.arena[node].pos;
        let new_left = self.create_node(NodeKind::Expression { left, right: right_left, op }, pos);
        self.set_node_flag(new_left, crate::NodeFlags::INSIDE_EXPRESSION);
        self.cx.arena[node].kind = NodeKind::Expression { left: new_left, right: right_right, op: right_op };
    }
}
