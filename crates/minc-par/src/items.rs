//! Declarations: variables, functions, structs and unions.
//!
//! This module also owns the offset rules. A declared variable's offset is
//! computed the moment it is parsed, driven by the history flags: nothing
//! for globals, an aligned running offset for struct fields, a negative
//! downward offset for stack locals and a positive upward offset for
//! function arguments. Each variable then becomes an entity of the current
//! scope so the next declaration can find it.

use minc_lex::TokenKind;
use minc_sem::{Fixup, SymbolKind};
use minc_util::{
    align_value, align_value_as_positive, padding, NodeId, Result, Symbol, DATA_SIZE_DDWORD, DATA_SIZE_DWORD,
    STACK_ALIGNMENT,
};

use crate::ast::{
    is_variable_node_primitive, variable_node, variable_size, AggregateNode, ArrayBrackets, ArrayInfo, DataType,
    DataTypeFlags, DataTypeKind, FunctionNode, NodeKind, VarNode,
};
use crate::types::{is_datatype_keyword, is_keyword_variable_modifier};
use crate::{FixupContext, History, Parser, ParserScopeEntity};

/// Completes a variable's datatype once its aggregate is defined.
pub(crate) struct DatatypeFixup {
    variable: NodeId,
    type_name: Symbol,
}

impl DatatypeFixup {
    pub(crate) fn new(variable: NodeId, type_name: Symbol) -> DatatypeFixup {
        DatatypeFixup { variable, type_name }
    }
}

impl Fixup<FixupContext> for DatatypeFixup {
    fn fix(&mut self, cx: &mut FixupContext) -> bool {
        let Some(aggregate) = cx.symbols.get_node(self.type_name) else {
            return false;
        };
        let body = match &cx.arena[aggregate].kind {
            NodeKind::Struct(node) | NodeKind::Union(node) => node.body,
            _ => return false,
        };
        let Some(body) = body else {
            // Still only forward-declared.
            return false;
        };
        let size = match &cx.arena[body].kind {
            NodeKind::Body(body) => body.size,
            _ => return false,
        };
        if let Some(var) = cx.arena[self.variable].as_variable_mut() {
            var.dtype.size = size;
            var.dtype.aggregate_node = Some(aggregate);
        }
        true
    }
}

impl<'a> Parser<'a> {
    /// Statement-position keyword dispatch: declarations here, control flow
    /// in `stmt.rs`.
    pub(crate) fn parse_keyword(&mut self, history: History) -> Result<()> {
        let Some(token) = self.peek_token() else {
            return Err(self.err_syntactic("expecting a keyword"));
        };
        let TokenKind::Keyword(keyword) = &token.kind else {
            return Err(self.err_syntactic("expecting a keyword"));
        };
        let keyword = keyword.as_str();
        if is_keyword_variable_modifier(keyword) || is_datatype_keyword(keyword) {
            return self.parse_variable_function_or_struct_union(history);
        }
        self.parse_keyword_statement(keyword.to_owned(), history)
    }

    /// Parses everything a datatype can open: a struct/union definition, a
    /// function, a variable or a comma-separated variable list.
    pub(crate) fn parse_variable_function_or_struct_union(&mut self, history: History) -> Result<()> {
        let dtype = self.parse_datatype()?;

        if dtype.is_struct_or_union() && (self.is_next_symbol('{') || self.is_next_symbol(';')) {
            self.parse_struct_or_union(dtype)?;
            let node = self.pop_node()?;
            self.register_aggregate_symbol(node)?;
            self.push_node(node);
            return Ok(());
        }

        self.ignore_int(&dtype)?;
        let name = self.expect_identifier("variable or function")?;

        if self.is_next_operator("(") {
            return self.parse_function(dtype, name, history);
        }

        self.parse_variable(dtype.clone(), Some(name), history)?;
        if self.is_next_operator(",") {
            let mut variables = vec![self.pop_node()?];
            while self.is_next_operator(",") {
                self.next_token();
                let name = self.expect_identifier("variable")?;
                self.parse_variable(dtype.clone(), Some(name), history)?;
                variables.push(self.pop_node()?);
            }
            let pos = self.cx.arena[variables[0]].pos;
            let list = self.create_node(NodeKind::VariableList { variables }, pos);
            self.push_node(list);
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    // ========================================================================
    // Variables
    // ========================================================================

    /// Parses the declarator tail of one variable: array brackets and an
    /// optional initializer, then registers the variable in the scope.
    pub(crate) fn parse_variable(
        &mut self,
        mut dtype: DataType,
        name: Option<Symbol>,
        history: History,
    ) -> Result<()> {
        if self.is_next_operator("[") {
            let brackets = self.parse_array_brackets(history)?;
            let size = brackets.size(dtype.size, &self.cx.arena);
            dtype.flags.insert(DataTypeFlags::ARRAY);
            dtype.array = Some(ArrayInfo { brackets, size });
        }
        let value = if self.is_next_operator("=") {
            self.next_token();
            self.parse_expressionable_root(history)?;
            Some(self.pop_node()?)
        } else {
            None
        };
        self.make_variable_node_and_register(history, dtype, name, value)
    }

    /// Parses one full variable: datatype, optional name, declarator tail.
    /// Used for function parameters.
    pub(crate) fn parse_variable_full(&mut self, history: History) -> Result<()> {
        let dtype = self.parse_datatype()?;
        let name = match self.peek_token().map(|t| t.kind.clone()) {
            Some(TokenKind::Identifier(name)) => {
                self.next_token();
                Some(name)
            }
            _ => None,
        };
        self.parse_variable(dtype, name, history)
    }

    /// Parses `[expr][expr]...`; every non-empty bracket must hold a number
    /// literal.
    pub(crate) fn parse_array_brackets(&mut self, history: History) -> Result<ArrayBrackets> {
        let mut brackets = ArrayBrackets::new();
        while self.is_next_operator("[") {
            let pos = self.peek_pos();
            self.expect_operator("[")?;
            if self.is_next_symbol(']') {
                self.expect_symbol(']')?;
                break;
            }
            self.parse_expressionable_root(history)?;
            self.expect_symbol(']')?;
            let inner = self.pop_node()?;
            if !matches!(self.cx.arena[inner].kind, NodeKind::Number { .. }) {
                return Err(self.err_syntactic("array size must be a number literal"));
            }
            let bracket = self.create_node(NodeKind::Bracket { inner }, pos);
            brackets.push(bracket);
        }
        Ok(brackets)
    }

    /// Creates the variable node, computes its offset and pushes it as an
    /// entity of the current scope.
    pub(crate) fn make_variable_node_and_register(
        &mut self,
        history: History,
        dtype: DataType,
        name: Option<Symbol>,
        value: Option<NodeId>,
    ) -> Result<()> {
        let pos = self.pos;
        let needs_fixup = dtype.is_struct_or_union() && dtype.aggregate_node.is_none();
        let type_name = dtype.name;
        let variable = self.create_node(
            NodeKind::Variable(VarNode { dtype, name, value, padding: 0, aligned_offset: 0 }),
            pos,
        );
        if needs_fixup {
            self.register_datatype_fixup(variable, type_name, pos);
        }

        self.calculate_scope_offset(history, variable);
        let aligned_offset = self.cx.arena[variable].as_variable().map_or(0, |v| v.aligned_offset);
        let element_size = variable_size(&self.cx.arena, variable);
        self.push_scope_entity(
            ParserScopeEntity { flags: 0, stack_offset: aligned_offset, variable },
            element_size,
        );
        self.push_node(variable);
        Ok(())
    }

    // ========================================================================
    // Offsets
    // ========================================================================

    /// Offset dispatch on the history flags.
    fn calculate_scope_offset(&mut self, history: History, variable: NodeId) {
        if history.has(History::IS_GLOBAL_SCOPE) {
            // Globals are addressed by name; no offset.
            return;
        }
        if history.has(History::INSIDE_STRUCTURE) {
            self.calculate_offset_for_struct(history, variable);
            return;
        }
        self.calculate_offset_for_stack(history, variable);
    }

    /// Struct fields: running offset from the previous field, padded to the
    /// new field's own size when it is primitive. Union members all sit at
    /// offset zero.
    fn calculate_offset_for_struct(&mut self, history: History, variable: NodeId) {
        if history.has(History::INSIDE_UNION) {
            return;
        }
        let Some(last) = self.scopes().last_entity_current_scope().copied() else {
            return;
        };
        let previous = variable_node(&self.cx.arena, last.variable).unwrap_or(last.variable);
        let mut offset = last.stack_offset + variable_size(&self.cx.arena, previous) as i32;

        let own_size = self.cx.arena[variable].as_variable().map_or(0, |v| v.dtype.size) as i32;
        let mut pad = 0;
        if is_variable_node_primitive(&self.cx.arena, variable) {
            pad = padding(offset, own_size);
        }
        offset += pad;
        if let Some(var) = self.cx.arena[variable].as_variable_mut() {
            var.padding = pad;
            var.aligned_offset = offset;
        }
    }

    /// Stack variables: locals grow downwards from the previous entity's
    /// aligned offset; arguments grow upwards from the function's argument
    /// stack addition.
    fn calculate_offset_for_stack(&mut self, history: History, variable: NodeId) {
        let upward = history.has(History::IS_UPWARD_STACK);
        let last = self.scopes().last_entity_stop_at_root().copied();

        let mut offset = if upward {
            match last {
                Some(last) => {
                    let previous = variable_node(&self.cx.arena, last.variable).unwrap_or(last.variable);
                    self.cx.arena[previous].as_variable().map_or(0, |v| v.dtype.byte_size()) as i32
                }
                None => self
                    .current_function()
                    .and_then(|f| match &self.cx.arena[f].kind {
                        NodeKind::Function(func) => Some(func.args_stack_addition as i32),
                        _ => None,
                    })
                    .unwrap_or(DATA_SIZE_DDWORD as i32),
            }
        } else {
            -(variable_size(&self.cx.arena, variable) as i32)
        };

        let mut pad = 0;
        let mut aligned_offset = offset;
        if let Some(last) = last {
            let previous = variable_node(&self.cx.arena, last.variable).unwrap_or(last.variable);
            offset += self.cx.arena[previous].as_variable().map_or(0, |v| v.aligned_offset);
            aligned_offset = offset;
            if is_variable_node_primitive(&self.cx.arena, variable) {
                let own_size = self.cx.arena[variable].as_variable().map_or(0, |v| v.dtype.size) as i32;
                // Alignment moves the offset away from zero: downwards for
                // negative stack offsets, upwards for argument offsets.
                aligned_offset = align_value_as_positive(offset, own_size);
                pad = (aligned_offset - offset).abs();
            }
        }

        if let Some(var) = self.cx.arena[variable].as_variable_mut() {
            var.padding = pad;
            var.aligned_offset = aligned_offset;
        }
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Parses a function after its return type and name.
    fn parse_function(&mut self, return_type: DataType, name: Symbol, _history: History) -> Result<()> {
        let pos = self.pos;
        self.new_scope();

        let mut args_stack_addition = DATA_SIZE_DDWORD;
        if return_type.is_struct_or_union() {
            // Hidden return slot for aggregate returns.
            args_stack_addition += DATA_SIZE_DWORD;
        }
        let is_native = self.cx.symbols.get_native_function(name).is_some();

        let function = self.create_node(
            NodeKind::Function(FunctionNode {
                return_type,
                name,
                args: Vec::new(),
                args_stack_addition,
                body: None,
                stack_size: 0,
                is_native,
                is_variadic: false,
            }),
            pos,
        );
        let previous_function = self.current_function();
        self.set_current_function(Some(function));
        self.cx.symbols.push_frame();

        let result = self.parse_function_signature_and_body(function);

        self.cx.symbols.pop_frame();
        self.set_current_function(previous_function);
        self.finish_scope();
        result?;
        self.push_node(function);
        Ok(())
    }

    /// Arguments and optional body of the function node being built.
    fn parse_function_signature_and_body(&mut self, function: NodeId) -> Result<()> {
        self.expect_operator("(")?;
        let (args, is_variadic) = self.parse_function_arguments(History::IS_UPWARD_STACK)?;
        self.expect_symbol(')')?;
        if let NodeKind::Function(func) = &mut self.cx.arena[function].kind {
            func.args = args;
            func.is_variadic = is_variadic;
        }

        if self.is_next_symbol('{') {
            self.parse_body(History::INSIDE_FUNCTION_BODY)?;
            let body = self.pop_node()?;
            if let NodeKind::Function(func) = &mut self.cx.arena[function].kind {
                func.body = Some(body);
                func.stack_size = align_value(func.stack_size as i32, STACK_ALIGNMENT) as usize;
            }
        } else {
            self.expect_symbol(';')?;
        }
        Ok(())
    }

    /// Parses the comma-separated parameter list; `...` ends it variadic.
    fn parse_function_arguments(&mut self, history: History) -> Result<(Vec<NodeId>, bool)> {
        let mut args = Vec::new();
        let mut is_variadic = false;
        while !self.is_next_symbol(')') {
            if self.is_next_operator("...") {
                self.next_token();
                is_variadic = true;
                break;
            }
            self.parse_variable_full(history)?;
            args.push(self.pop_node()?);
            if !self.is_next_operator(",") {
                break;
            }
            self.next_token();
        }
        Ok((args, is_variadic))
    }

    /// Adds `size` to the function currently being parsed; called by body
    /// finalization when inside a function body.
    pub(crate) fn grow_function_stack(&mut self, size: usize) {
        if let Some(function) = self.current_function() {
            if let NodeKind::Function(func) = &mut self.cx.arena[function].kind {
                func.stack_size += size;
            }
        }
    }

    // ========================================================================
    // Structs and unions
    // ========================================================================

    fn parse_struct_or_union(&mut self, dtype: DataType) -> Result<()> {
        match dtype.kind {
            DataTypeKind::Struct => self.parse_struct(dtype),
            DataTypeKind::Union => self.parse_union(dtype),
            _ => Err(self.err_syntactic("expecting a struct or union")),
        }
    }

    fn parse_struct(&mut self, dtype: DataType) -> Result<()> {
        let forward_declaration = !self.is_next_symbol('{');
        if !forward_declaration {
            self.new_scope();
            self.cx.symbols.push_frame();
        }
        let result = self.parse_aggregate_no_new_scope(dtype, forward_declaration, History::INSIDE_STRUCTURE);
        if !forward_declaration {
            self.cx.symbols.pop_frame();
            self.finish_scope();
        }
        result
    }

    fn parse_union(&mut self, dtype: DataType) -> Result<()> {
        let forward_declaration = !self.is_next_symbol('{');
        if !forward_declaration {
            self.new_scope();
            self.cx.symbols.push_frame();
        }
        let result = self.parse_aggregate_no_new_scope(
            dtype,
            forward_declaration,
            History::INSIDE_STRUCTURE | History::INSIDE_UNION,
        );
        if !forward_declaration {
            self.cx.symbols.pop_frame();
            self.finish_scope();
        }
        result
    }

    /// Parses the body and the optional inline declarator of an aggregate.
    fn parse_aggregate_no_new_scope(
        &mut self,
        mut dtype: DataType,
        forward_declaration: bool,
        body_history: History,
    ) -> Result<()> {
        let pos = self.pos;
        let mut body = None;
        if !forward_declaration {
            self.parse_body(body_history)?;
            body = Some(self.pop_node()?);
        }

        let aggregate = AggregateNode { name: dtype.name, body, variable: None };
        let node_kind = match dtype.kind {
            DataTypeKind::Union => NodeKind::Union(aggregate),
            _ => NodeKind::Struct(aggregate),
        };
        let node = self.create_node(node_kind, pos);
        if forward_declaration {
            self.set_node_flag(node, crate::NodeFlags::FORWARD_DECLARATION);
        }
        if let Some(body) = body {
            if let NodeKind::Body(body_node) = &self.cx.arena[body].kind {
                dtype.size = body_node.size;
            }
        }
        dtype.aggregate_node = Some(node);

        if matches!(self.peek_token().map(|t| &t.kind), Some(TokenKind::Identifier(_))) {
            let variable_name = self.expect_identifier("variable")?;
            self.set_node_flag(node, crate::NodeFlags::HAS_VARIABLE_COMBINED);
            if dtype.flags.contains(DataTypeFlags::ANON_AGGREGATE) {
                // The anonymous aggregate adopts the declarator's name.
                dtype.name = variable_name;
                dtype.flags.remove(DataTypeFlags::ANON_AGGREGATE);
                match &mut self.cx.arena[node].kind {
                    NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.name = variable_name,
                    _ => {}
                }
            }
            self.make_variable_node_and_register(History::INSIDE_STRUCTURE, dtype, Some(variable_name), None)?;
            let variable = self.pop_node()?;
            match &mut self.cx.arena[node].kind {
                NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.variable = Some(variable),
                _ => {}
            }
        }

        self.expect_symbol(';')?;
        self.push_node(node);
        Ok(())
    }

    /// Registers a completed aggregate definition under its tag. Forward
    /// declarations register nothing.
    fn register_aggregate_symbol(&mut self, node: NodeId) -> Result<()> {
        if self.cx.arena[node].flags.contains(crate::NodeFlags::FORWARD_DECLARATION) {
            return Ok(());
        }
        let name = match &self.cx.arena[node].kind {
            NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.name,
            _ => return Ok(()),
        };
        if !self.cx.symbols.register(name, SymbolKind::Node(node)) {
            return Err(self.err_semantic(format!("symbol {name} already exists")));
        }
        Ok(())
    }
}
