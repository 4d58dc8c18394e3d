//! Statements and bodies.
//!
//! Bodies open a scope, collect statements, and finalize into a size
//! summary: per-variable padding is summed, the total is rounded to the
//! alignment of the largest primitive variable, and union bodies collapse
//! to the size of their largest member. Function bodies additionally
//! accumulate their size into the enclosing function's stack size.

use minc_lex::TokenKind;
use minc_util::{align_value, NodeId, Result};

use crate::ast::{
    is_variable_node_primitive, variable_aggregate_body_node, variable_node_or_list, variable_size, BodyNode,
    DataTypeFlags, NodeKind,
};
use crate::{History, Parser, SwitchCaseData};

impl<'a> Parser<'a> {
    /// Statement-position keywords that are not declarations.
    pub(crate) fn parse_keyword_statement(&mut self, keyword: String, history: History) -> Result<()> {
        match keyword.as_str() {
            "return" => self.parse_return(history),
            "if" => self.parse_if(history),
            "while" => self.parse_while(history),
            "do" => self.parse_do_while(history),
            "for" => self.parse_for(history),
            "switch" => self.parse_switch(history),
            "continue" => self.parse_continue(),
            "break" => self.parse_break(),
            "goto" => self.parse_goto(),
            "case" => self.parse_case(history),
            "default" => self.parse_default(),
            _ => Err(self.err_syntactic(format!("unexpected keyword {keyword}"))),
        }
    }

    /// Parses one statement: a keyword form, a nested body, or an
    /// expression terminated by `;` (or forming a label).
    pub(crate) fn parse_statement(&mut self, history: History) -> Result<()> {
        if matches!(self.peek_token().map(|t| &t.kind), Some(TokenKind::Keyword(_))) {
            return self.parse_keyword(history);
        }
        if self.is_next_symbol('{') {
            self.parse_body(history)?;
            return Ok(());
        }
        self.parse_expressionable_root(history)?;
        if let Some(token) = self.peek_token() {
            if matches!(token.kind, TokenKind::Symbol(_)) && !token.is_symbol(';') {
                return self.parse_statement_symbol(history);
            }
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    /// A symbol directly after an expression: only `:` (label) is legal.
    fn parse_statement_symbol(&mut self, _history: History) -> Result<()> {
        if self.is_next_symbol(':') {
            return self.parse_label();
        }
        Err(self.err_syntactic("unexpected symbol after expression"))
    }

    /// `name:` with the name already parsed onto the node stack.
    fn parse_label(&mut self) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_symbol(':')?;
        let name = self.pop_node()?;
        if !matches!(self.cx.arena[name].kind, NodeKind::Identifier { .. }) {
            return Err(self.err_syntactic("label name must be an identifier"));
        }
        let label = self.create_node(NodeKind::Label { name }, pos);
        self.push_node(label);
        Ok(())
    }

    // ========================================================================
    // Keyword statements
    // ========================================================================

    fn parse_return(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("return")?;
        let expr = if self.is_next_symbol(';') {
            None
        } else {
            self.parse_expressionable_root(history)?;
            Some(self.pop_node()?)
        };
        self.expect_symbol(';')?;
        let node = self.create_node(NodeKind::ReturnStmt { expr }, pos);
        self.push_node(node);
        Ok(())
    }

    /// Parses a parenthesized condition expression.
    ///
    /// The group goes through the parenthesis machinery with the
    /// not-a-function-call marker so a node left on the stack by an outer
    /// context is never mistaken for a callee.
    fn parse_condition(&mut self, history: History) -> Result<NodeId> {
        if !self.is_next_operator("(") {
            return Err(self.err_syntactic("expecting operator ("));
        }
        self.parse_expression(history.with(History::PARENTHESES_IS_NOT_FUNCTION_CALL))?;
        let parens = self.pop_node()?;
        let condition = match self.cx.arena[parens].kind {
            NodeKind::Parentheses { inner } => inner,
            _ => parens,
        };
        if matches!(self.cx.arena[condition].kind, NodeKind::Blank) {
            return Err(self.err_syntactic("expected an expression"));
        }
        Ok(condition)
    }

    fn parse_if(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("if")?;
        let condition = self.parse_condition(history)?;
        self.parse_body(history)?;
        let body = self.pop_node()?;
        let else_node = self.parse_else_or_else_if(history)?;
        let node = self.create_node(NodeKind::IfStmt { condition, body, else_node }, pos);
        self.push_node(node);
        Ok(())
    }

    /// After an `if` body: nothing, an `else` body, or an `else if` chain
    /// represented as a nested if node.
    fn parse_else_or_else_if(&mut self, history: History) -> Result<Option<NodeId>> {
        if !self.is_next_keyword("else") {
            return Ok(None);
        }
        let pos = self.peek_pos();
        self.next_token();
        if self.is_next_keyword("if") {
            self.parse_if(history)?;
            return Ok(Some(self.pop_node()?));
        }
        self.parse_body(history)?;
        let body = self.pop_node()?;
        let node = self.create_node(NodeKind::ElseStmt { body }, pos);
        Ok(Some(node))
    }

    fn parse_while(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("while")?;
        let condition = self.parse_condition(history)?;
        self.parse_body(history)?;
        let body = self.pop_node()?;
        let node = self.create_node(NodeKind::WhileStmt { condition, body }, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_do_while(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("do")?;
        self.parse_body(history)?;
        let body = self.pop_node()?;
        self.expect_keyword("while")?;
        let condition = self.parse_condition(history)?;
        self.expect_symbol(';')?;
        let node = self.create_node(NodeKind::DoWhileStmt { body, condition }, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_for(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("for")?;
        self.expect_operator("(")?;

        let init = if self.is_next_symbol(';') {
            None
        } else {
            self.parse_expressionable_root(history)?;
            Some(self.pop_node()?)
        };
        self.expect_symbol(';')?;

        let condition = if self.is_next_symbol(';') {
            None
        } else {
            self.parse_expressionable_root(history)?;
            Some(self.pop_node()?)
        };
        self.expect_symbol(';')?;

        let increment = if self.is_next_symbol(')') {
            None
        } else {
            self.parse_expressionable_root(history)?;
            Some(self.pop_node()?)
        };
        self.expect_symbol(')')?;

        self.parse_body(history)?;
        let body = self.pop_node()?;
        let node = self.create_node(NodeKind::ForStmt { init, condition, increment, body }, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_switch(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("switch")?;
        let expr = self.parse_condition(history)?;

        self.switch_stack_mut().push(SwitchCaseData::default());
        let body_result = self.parse_body(history.with(History::INSIDE_SWITCH));
        let data = self.switch_stack_mut().pop().unwrap_or_default();
        body_result?;
        let body = self.pop_node()?;

        let node = self.create_node(
            NodeKind::SwitchStmt { expr, body, cases: data.cases, has_default: data.has_default },
            pos,
        );
        self.push_node(node);
        Ok(())
    }

    fn parse_case(&mut self, history: History) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("case")?;
        self.parse_expressionable_root(history)?;
        let expr = self.pop_node()?;
        if !matches!(self.cx.arena[expr].kind, NodeKind::Number { .. }) {
            return Err(self.err_syntactic("case expression must be a number literal"));
        }
        self.expect_symbol(':')?;
        let node = self.create_node(NodeKind::CaseStmt { expr }, pos);
        match self.switch_stack_mut().last_mut() {
            Some(data) => data.cases.push(node),
            None => return Err(self.err_syntactic("case outside of a switch statement")),
        }
        self.push_node(node);
        Ok(())
    }

    fn parse_default(&mut self) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("default")?;
        self.expect_symbol(':')?;
        match self.switch_stack_mut().last_mut() {
            Some(data) => data.has_default = true,
            None => return Err(self.err_syntactic("default outside of a switch statement")),
        }
        let node = self.create_node(NodeKind::DefaultStmt, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_continue(&mut self) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("continue")?;
        self.expect_symbol(';')?;
        let node = self.create_node(NodeKind::ContinueStmt, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_break(&mut self) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("break")?;
        self.expect_symbol(';')?;
        let node = self.create_node(NodeKind::BreakStmt, pos);
        self.push_node(node);
        Ok(())
    }

    fn parse_goto(&mut self) -> Result<()> {
        let pos = self.peek_pos();
        self.expect_keyword("goto")?;
        self.parse_single_token_to_node()?;
        let label = self.pop_node()?;
        if !matches!(self.cx.arena[label].kind, NodeKind::Identifier { .. }) {
            return Err(self.err_syntactic("goto requires a label name"));
        }
        self.expect_symbol(';')?;
        let node = self.create_node(NodeKind::GotoStmt { label }, pos);
        self.push_node(node);
        Ok(())
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Parses a body - braced or single-statement - in a fresh scope,
    /// pushing the finished body node. Returns the body's variable size.
    pub(crate) fn parse_body(&mut self, history: History) -> Result<usize> {
        self.new_scope();
        let result = if self.is_next_symbol('{') {
            self.parse_body_multiple_statements(history)
        } else {
            self.parse_body_single_statement(history)
        };
        self.finish_scope();
        let size = result?;
        if history.has(History::INSIDE_FUNCTION_BODY) {
            self.grow_function_stack(size);
        }
        Ok(size)
    }

    fn parse_body_single_statement(&mut self, history: History) -> Result<usize> {
        let pos = self.peek_pos();
        let body = self.create_node(NodeKind::Body(BodyNode::default()), pos);
        let previous_body = self.current_body();
        self.cx.arena[body].binded.body = previous_body;
        self.set_current_body(Some(body));

        self.parse_statement(history)?;
        let statement = self.pop_node()?;

        let mut size = 0usize;
        if let Some(variable) = variable_node_or_list(&self.cx.arena, statement) {
            self.append_size_for_node(history, &mut size, variable);
        }
        let largest = matches!(self.cx.arena[statement].kind, NodeKind::Variable(_)).then_some(statement);

        self.finalize_body(history, body, vec![statement], &mut size, largest, largest);
        self.set_current_body(previous_body);
        self.push_node(body);
        Ok(size)
    }

    fn parse_body_multiple_statements(&mut self, history: History) -> Result<usize> {
        let pos = self.peek_pos();
        let body = self.create_node(NodeKind::Body(BodyNode::default()), pos);
        let previous_body = self.current_body();
        self.cx.arena[body].binded.body = previous_body;
        self.set_current_body(Some(body));

        let mut statements = Vec::new();
        let mut size = 0usize;
        let mut largest_possible: Option<NodeId> = None;
        let mut largest_align_eligible: Option<NodeId> = None;

        self.expect_symbol('{')?;
        while !self.is_next_symbol('}') {
            if self.peek_token().is_none() {
                return Err(self.err_syntactic("expecting symbol }"));
            }
            self.parse_statement(history)?;
            let statement = self.pop_node()?;

            if matches!(self.cx.arena[statement].kind, NodeKind::Variable(_)) {
                let full_size = variable_size(&self.cx.arena, statement);
                if largest_possible.is_none_or(|best| variable_size(&self.cx.arena, best) <= full_size) {
                    largest_possible = Some(statement);
                }
                if is_variable_node_primitive(&self.cx.arena, statement) {
                    let base_size = self.cx.arena[statement].as_variable().map_or(0, |v| v.dtype.size);
                    let best_base =
                        largest_align_eligible.map_or(0, |b| self.cx.arena[b].as_variable().map_or(0, |v| v.dtype.size));
                    if largest_align_eligible.is_none() || best_base <= base_size {
                        largest_align_eligible = Some(statement);
                    }
                }
            }

            if let Some(variable) = variable_node_or_list(&self.cx.arena, statement) {
                self.append_size_for_node(history, &mut size, variable);
            }
            statements.push(statement);
        }
        self.expect_symbol('}')?;

        self.finalize_body(history, body, statements, &mut size, largest_align_eligible, largest_possible);
        self.set_current_body(previous_body);
        self.push_node(body);
        Ok(size)
    }

    /// Adds a declaration's bytes to the running body size.
    fn append_size_for_node(&mut self, history: History, size: &mut usize, node: NodeId) {
        match &self.cx.arena[node].kind {
            NodeKind::Variable(var) => {
                if var.dtype.is_struct_or_union() {
                    self.append_size_for_aggregate_variable(size, node);
                } else {
                    *size += variable_size(&self.cx.arena, node);
                }
            }
            NodeKind::VariableList { variables } => {
                for variable in variables.clone() {
                    self.append_size_for_node(history, size, variable);
                }
            }
            _ => {}
        }
    }

    /// An embedded aggregate contributes its size and re-aligns the running
    /// total to its largest primitive member.
    fn append_size_for_aggregate_variable(&mut self, size: &mut usize, node: NodeId) {
        *size += variable_size(&self.cx.arena, node);
        let is_pointer = self.cx.arena[node]
            .as_variable()
            .is_some_and(|var| var.dtype.flags.contains(DataTypeFlags::POINTER));
        if is_pointer {
            return;
        }
        let largest = variable_aggregate_body_node(&self.cx.arena, node).and_then(|body| {
            match &self.cx.arena[body].kind {
                NodeKind::Body(body) => body.largest_var,
                _ => None,
            }
        });
        if let Some(largest) = largest {
            let align_to = self.cx.arena[largest].as_variable().map_or(0, |v| v.dtype.size);
            *size = align_value(*size as i32, align_to as i32) as usize;
        }
    }

    /// Sum of the padding recorded on the body's variable statements.
    fn compute_sum_padding(&self, statements: &[NodeId]) -> i32 {
        statements
            .iter()
            .filter_map(|&statement| self.cx.arena[statement].as_variable())
            .map(|var| var.padding)
            .sum()
    }

    /// Writes the finished size summary into the body node.
    ///
    /// A union body collapses to its largest member. Otherwise the
    /// inter-variable padding is added and the total is rounded to the
    /// alignment of the largest primitive variable.
    fn finalize_body(
        &mut self,
        history: History,
        body: NodeId,
        statements: Vec<NodeId>,
        size: &mut usize,
        largest_align_eligible: Option<NodeId>,
        largest_possible: Option<NodeId>,
    ) {
        let mut padded = false;
        if history.has(History::INSIDE_UNION) {
            if let Some(largest) = largest_possible {
                *size = variable_size(&self.cx.arena, largest);
            }
        } else {
            let padding_sum = self.compute_sum_padding(&statements);
            *size = (*size as i32 + padding_sum) as usize;
            if let Some(largest) = largest_align_eligible {
                let align_to = self.cx.arena[largest].as_variable().map_or(0, |v| v.dtype.size);
                *size = align_value(*size as i32, align_to as i32) as usize;
            }
            padded = padding_sum != 0;
        }

        if let NodeKind::Body(body_node) = &mut self.cx.arena[body].kind {
            body_node.statements = statements;
            body_node.size = *size;
            body_node.padded = padded;
            body_node.largest_var = largest_align_eligible;
        }
    }
}
