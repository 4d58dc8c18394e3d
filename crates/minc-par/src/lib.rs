//! minc-par - Parser (Syntactic Analyzer)
//!
//! ============================================================================
//! PARSING OVERVIEW
//! ============================================================================
//!
//! A hand-written recursive-descent parser for the accepted C subset. The
//! input is the token vector from minc-lex; the output is an [`Ast`]: a node
//! arena plus the root nodes in source order.
//!
//! THE NODE STACK:
//! ---------------
//! Expression parsing is stack-shaped rather than return-value-shaped: each
//! parse routine pushes the node it produced onto the parser's node stack,
//! and binary operators pop their left operand from it. This is what makes
//! postfix forms natural - when `(` is seen and an expressionable node is
//! already on the stack, that node becomes the callee of a call expression.
//!
//! PRECEDENCE BY REORDERING:
//! -------------------------
//! Binary expressions are first built right-leaning in encounter order, then
//! rotated into precedence order by a reorder pass over the freshly built
//! node (see `expr.rs`). The precedence table is an ordered list of operator
//! groups: group 0 binds tightest, and each group carries its associativity.
//!
//! SCOPES, SYMBOLS, OFFSETS:
//! -------------------------
//! The parser drives the scope stack and symbol table from minc-sem while it
//! walks the tokens: every variable declaration computes its stack or struct
//! offset immediately, every struct/union/function definition registers its
//! node under its name, and every reference to a not-yet-defined aggregate
//! registers a fix-up that is retried until fixpoint at end of parse.
//!
//! CONTEXT, NOT GLOBALS:
//! ---------------------
//! All parser state - token cursor, node stack, arena, scope stack, symbol
//! table, fix-ups, current body/function - lives in the [`Parser`] value.
//! The recursive routines additionally thread a small [`History`] value of
//! contextual flags (inside expression, inside structure, upward stack, ...)
//! downwards; switch case-collection state lives in a stack on the parser so
//! that nested switches compose.

pub mod ast;
pub mod expr;
pub mod items;
pub mod print;
pub mod stmt;
pub mod types;

mod edge_cases;

pub use ast::{Ast, DataType, DataTypeFlags, DataTypeKind, Node, NodeArena, NodeFlags, NodeKind};

use minc_lex::{Token, TokenKind};
use minc_sem::{FixupSystem, ScopeStack, SymbolTable};
use minc_util::{CompileError, Handler, NodeId, Pos, Result, Symbol};

use ast::BindedTo;

/// Contextual flags threaded through the recursive parse routines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct History(u16);

impl History {
    pub const INSIDE_EXPRESSION: History = History(1 << 0);
    pub const INSIDE_UNION: History = History(1 << 1);
    pub const IS_UPWARD_STACK: History = History(1 << 2);
    pub const IS_GLOBAL_SCOPE: History = History(1 << 3);
    pub const INSIDE_STRUCTURE: History = History(1 << 4);
    pub const INSIDE_FUNCTION_BODY: History = History(1 << 5);
    pub const INSIDE_SWITCH: History = History(1 << 6);
    pub const PARENTHESES_IS_NOT_FUNCTION_CALL: History = History(1 << 7);

    /// A history carrying exactly `flags`.
    pub fn begin(flags: History) -> History {
        flags
    }

    /// True when every flag in `other` is set.
    pub fn has(self, other: History) -> bool {
        self.0 & other.0 == other.0
    }

    /// This history with the flags in `other` added.
    pub fn with(self, other: History) -> History {
        History(self.0 | other.0)
    }

    /// This history with the flags in `other` cleared.
    pub fn without(self, other: History) -> History {
        History(self.0 & !other.0)
    }
}

impl std::ops::BitOr for History {
    type Output = History;

    fn bitor(self, rhs: History) -> History {
        History(self.0 | rhs.0)
    }
}

/// Case-collection state of one `switch` statement being parsed.
#[derive(Debug, Default)]
pub(crate) struct SwitchCaseData {
    pub cases: Vec<NodeId>,
    pub has_default: bool,
}

/// A scope entity: a declared variable and its resolved offset.
#[derive(Clone, Copy, Debug)]
pub struct ParserScopeEntity {
    /// Entity flags (reserved).
    pub flags: u32,
    /// Offset recorded at push time: negative for stack locals, positive for
    /// function arguments, the aligned field offset inside an aggregate.
    pub stack_offset: i32,
    /// The variable node.
    pub variable: NodeId,
}

/// The state fix-ups operate on: the arena and the symbol table.
///
/// Grouped so the fix-up system can borrow it independently of the rest of
/// the parser.
#[derive(Debug, Default)]
pub struct FixupContext {
    /// Node storage.
    pub arena: NodeArena,
    /// Symbol frames.
    pub symbols: SymbolTable,
}

/// The recursive-descent parser.
pub struct Parser<'a> {
    /// Token stream from the lexer.
    tokens: Vec<Token>,
    /// Cursor into `tokens`.
    position: usize,
    /// Position of the last consumed token, used by diagnostics.
    pos: Pos,
    /// Warning sink.
    handler: &'a Handler,
    /// Arena and symbol table (grouped for the fix-up system).
    pub cx: FixupContext,
    /// Expression node stack.
    node_stack: Vec<NodeId>,
    /// Parsed roots in source order.
    pub roots: Vec<NodeId>,
    /// Lexical scopes with offset entities.
    scopes: ScopeStack<ParserScopeEntity>,
    /// Deferred aggregate-type completions.
    fixups: FixupSystem<FixupContext>,
    /// `(type name, position)` per registered fix-up, for error reporting.
    fixup_notes: Vec<(Symbol, Pos)>,
    /// Innermost body node being parsed.
    current_body: Option<NodeId>,
    /// Innermost function node being parsed.
    current_function: Option<NodeId>,
    /// Case data of the switches currently open, innermost last.
    switch_stack: Vec<SwitchCaseData>,
    /// Counter behind generated anonymous aggregate names.
    anonymous_index: u32,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `tokens`; `file` names the translation unit for
    /// positions produced before any token is consumed.
    pub fn new(tokens: Vec<Token>, file: Symbol, handler: &'a Handler) -> Parser<'a> {
        Parser {
            tokens,
            position: 0,
            pos: Pos::start(file),
            handler,
            cx: FixupContext::default(),
            node_stack: Vec::new(),
            roots: Vec::new(),
            scopes: ScopeStack::new(),
            fixups: FixupSystem::new(),
            fixup_notes: Vec::new(),
            current_body: None,
            current_function: None,
            switch_stack: Vec::new(),
            anonymous_index: 0,
        }
    }

    /// Registers a native function name in the global symbol frame.
    ///
    /// Functions defined in the source under such a name are marked native
    /// instead of being registered again.
    pub fn register_native_function(&mut self, name: Symbol) {
        self.cx.symbols.register_native_function(name);
    }

    /// Parses the whole token stream.
    ///
    /// On success every root is in [`Parser::roots`] and the fix-up system
    /// has reached fixpoint.
    pub fn parse(&mut self) -> Result<()> {
        while self.peek_token().is_some() {
            self.parse_next()?;
            let root = self.pop_node()?;
            self.roots.push(root);
        }
        self.assert_fixups_resolved()?;
        Ok(())
    }

    /// Consumes the parser into the finished [`Ast`].
    pub fn into_ast(self) -> Ast {
        Ast { arena: self.cx.arena, roots: self.roots }
    }

    /// Parses one top-level construct, leaving its node on the stack.
    fn parse_next(&mut self) -> Result<()> {
        let Some(token) = self.peek_token() else {
            return Ok(());
        };
        match &token.kind {
            TokenKind::Number { .. } | TokenKind::Str(_) | TokenKind::Identifier(_) => {
                self.parse_expressionable(History::default())
            }
            TokenKind::Keyword(_) => self.parse_keyword_for_global(),
            TokenKind::Symbol('#') => self.parse_preprocessor_line(),
            TokenKind::Symbol('{') => {
                self.parse_body(History::IS_GLOBAL_SCOPE)?;
                Ok(())
            }
            _ => Err(self.err_syntactic("unexpected token at top level")),
        }
    }

    /// Parses a top-level keyword and registers the produced definition.
    fn parse_keyword_for_global(&mut self) -> Result<()> {
        self.parse_keyword(History::IS_GLOBAL_SCOPE)?;
        let node = self.pop_node()?;
        self.build_symbol_for_node(node)?;
        self.push_node(node);
        Ok(())
    }

    /// Tokenized-but-not-expanded `#include <...>` lines produce a blank
    /// root.
    fn parse_preprocessor_line(&mut self) -> Result<()> {
        let pos = self.pos;
        self.next_token();
        if self.is_next_keyword("include") {
            self.next_token();
            if matches!(self.peek_token().map(|t| &t.kind), Some(TokenKind::Str(_))) {
                self.next_token();
            }
        }
        let blank = self.create_node(NodeKind::Blank, pos);
        self.push_node(blank);
        Ok(())
    }

    /// Registers a finished top-level function under its name. Aggregates
    /// register at their definition site; everything else is not a symbol.
    fn build_symbol_for_node(&mut self, node: NodeId) -> Result<()> {
        if let NodeKind::Function(func) = &self.cx.arena[node].kind {
            if func.is_native {
                return Ok(());
            }
            let name = func.name;
            if !self.cx.symbols.register(name, minc_sem::SymbolKind::Node(node)) {
                return Err(self.err_semantic(format!("symbol {name} already exists")));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    /// Skips the tokens the parser never sees: newlines, comments and the
    /// `\` separator symbol.
    fn skip_ignored_tokens(&mut self) {
        while self.tokens.get(self.position).is_some_and(Token::is_parser_skippable) {
            self.position += 1;
        }
    }

    /// Peeks the next meaningful token.
    pub(crate) fn peek_token(&mut self) -> Option<&Token> {
        self.skip_ignored_tokens();
        self.tokens.get(self.position)
    }

    /// Consumes the next meaningful token, recording its position.
    pub(crate) fn next_token(&mut self) -> Option<Token> {
        self.skip_ignored_tokens();
        let token = self.tokens.get(self.position).cloned()?;
        self.pos = token.pos;
        self.position += 1;
        Some(token)
    }

    /// The position of the next meaningful token, or of the last consumed
    /// token at end of input.
    pub(crate) fn peek_pos(&mut self) -> Pos {
        let fallback = self.pos;
        self.peek_token().map_or(fallback, |t| t.pos)
    }

    pub(crate) fn is_next_operator(&mut self, op: &str) -> bool {
        self.peek_token().is_some_and(|t| t.is_operator(op))
    }

    pub(crate) fn is_next_symbol(&mut self, symbol: char) -> bool {
        self.peek_token().is_some_and(|t| t.is_symbol(symbol))
    }

    pub(crate) fn is_next_keyword(&mut self, keyword: &str) -> bool {
        self.peek_token().is_some_and(|t| t.is_keyword(keyword))
    }

    // ========================================================================
    // Expectations; the parser's only form of error recovery is none at all
    // ========================================================================

    pub(crate) fn err_syntactic(&self, message: impl Into<String>) -> CompileError {
        CompileError::syntactic(message, self.pos)
    }

    pub(crate) fn err_semantic(&self, message: impl Into<String>) -> CompileError {
        CompileError::semantic(message, self.pos)
    }

    /// Consumes one token, failing unless it is the symbol `symbol`.
    pub(crate) fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        match self.next_token() {
            Some(token) if token.is_symbol(symbol) => Ok(()),
            _ => Err(self.err_syntactic(format!("expecting symbol {symbol}"))),
        }
    }

    /// Consumes one token, failing unless it is the operator `op`.
    pub(crate) fn expect_operator(&mut self, op: &str) -> Result<()> {
        match self.next_token() {
            Some(token) if token.is_operator(op) => Ok(()),
            _ => Err(self.err_syntactic(format!("expecting operator {op}"))),
        }
    }

    /// Consumes one token, failing unless it is the keyword `keyword`.
    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next_token() {
            Some(token) if token.is_keyword(keyword) => Ok(()),
            _ => Err(self.err_syntactic(format!("expecting keyword {keyword}"))),
        }
    }

    /// Consumes one token, failing unless it is an identifier.
    pub(crate) fn expect_identifier(&mut self, what: &str) -> Result<Symbol> {
        match self.next_token() {
            Some(token) => match token.kind {
                TokenKind::Identifier(name) => Ok(name),
                _ => Err(self.err_syntactic(format!("expecting a valid name for {what}"))),
            },
            None => Err(self.err_syntactic(format!("expecting a valid name for {what}"))),
        }
    }

    // ========================================================================
    // Node arena and node stack
    // ========================================================================

    /// Allocates a node, binding it to the current body and function.
    pub(crate) fn create_node(&mut self, kind: NodeKind, pos: Pos) -> NodeId {
        self.cx.arena.push(Node {
            kind,
            pos,
            flags: NodeFlags::default(),
            binded: BindedTo { body: self.current_body, function: self.current_function },
        })
    }

    pub(crate) fn push_node(&mut self, node: NodeId) {
        self.node_stack.push(node);
    }

    pub(crate) fn pop_node(&mut self) -> Result<NodeId> {
        self.node_stack.pop().ok_or_else(|| self.err_syntactic("expected an expression"))
    }

    pub(crate) fn peek_node_or_null(&self) -> Option<NodeId> {
        self.node_stack.last().copied()
    }

    /// The top of the node stack, but only when it can stand as a
    /// sub-expression.
    pub(crate) fn peek_expressionable_or_null(&self) -> Option<NodeId> {
        let node = self.peek_node_or_null()?;
        self.cx.arena[node].is_expressionable().then_some(node)
    }

    pub(crate) fn set_node_flag(&mut self, node: NodeId, flags: NodeFlags) {
        self.cx.arena[node].flags.insert(flags);
    }

    /// Emits a warning at the current parser position.
    pub(crate) fn warn_here(&self, message: impl Into<String>) {
        self.handler.warn(message, self.pos);
    }

    // ========================================================================
    // Scope plumbing (items.rs computes the offsets)
    // ========================================================================

    pub(crate) fn new_scope(&mut self) {
        self.scopes.new_scope(0);
    }

    pub(crate) fn finish_scope(&mut self) {
        self.scopes.finish_scope();
    }

    pub(crate) fn scopes(&self) -> &ScopeStack<ParserScopeEntity> {
        &self.scopes
    }

    pub(crate) fn push_scope_entity(&mut self, entity: ParserScopeEntity, element_size: usize) {
        self.scopes.push_entity(entity, element_size);
    }

    pub(crate) fn current_body(&self) -> Option<NodeId> {
        self.current_body
    }

    pub(crate) fn set_current_body(&mut self, body: Option<NodeId>) {
        self.current_body = body;
    }

    pub(crate) fn current_function(&self) -> Option<NodeId> {
        self.current_function
    }

    pub(crate) fn set_current_function(&mut self, function: Option<NodeId>) {
        self.current_function = function;
    }

    pub(crate) fn switch_stack_mut(&mut self) -> &mut Vec<SwitchCaseData> {
        &mut self.switch_stack
    }

    /// The next generated name for an anonymous struct or union.
    pub(crate) fn next_anonymous_name(&mut self) -> Symbol {
        let name = Symbol::intern(&format!("customtypename_{}", self.anonymous_index));
        self.anonymous_index += 1;
        name
    }

    // ========================================================================
    // Fix-ups
    // ========================================================================

    /// Registers a deferred aggregate-type completion for `variable`.
    pub(crate) fn register_datatype_fixup(&mut self, variable: NodeId, type_name: Symbol, pos: Pos) {
        self.fixups.register(Box::new(items::DatatypeFixup::new(variable, type_name)));
        self.fixup_notes.push((type_name, pos));
    }

    /// Runs the fix-up system to fixpoint; anything left unresolved is an
    /// undefined aggregate and therefore fatal.
    fn assert_fixups_resolved(&mut self) -> Result<()> {
        let mut fixups = std::mem::take(&mut self.fixups);
        let resolved = fixups.resolve_all(&mut self.cx);
        fixups.finish(&mut self.cx);
        if resolved {
            return Ok(());
        }
        for &(name, pos) in &self.fixup_notes {
            if self.cx.symbols.get_node(name).is_none() {
                return Err(CompileError::semantic(format!("aggregate type {name} was never defined"), pos));
            }
        }
        Err(CompileError::semantic("unresolved aggregate type at end of parse", self.pos))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use minc_util::{Handler, Symbol};

    use crate::ast::Ast;

    /// Lexes and parses `source`, panicking on any error.
    pub(crate) fn parse_source(source: &str) -> Ast {
        let handler = Handler::new();
        let tokens = minc_lex::lex_string(source, "test.c").expect("test source lexes");
        crate::parse(tokens, Symbol::intern("test.c"), &handler).expect("test source parses")
    }

    /// Lexes and parses `source`, returning the error.
    pub(crate) fn parse_error(source: &str) -> minc_util::CompileError {
        let handler = Handler::new();
        let tokens = minc_lex::lex_string(source, "test.c").expect("test source lexes");
        crate::parse(tokens, Symbol::intern("test.c"), &handler).expect_err("test source fails to parse")
    }
}

/// Parses `tokens` into an [`Ast`].
///
/// `file` names the translation unit; warnings land in `handler`.
///
/// # Example
///
/// ```
/// use minc_util::{Handler, Symbol};
///
/// let handler = Handler::new();
/// let tokens = minc_lex::lex_string("int a = 1 + 2;", "ex.c").unwrap();
/// let ast = minc_par::parse(tokens, Symbol::intern("ex.c"), &handler).unwrap();
/// assert_eq!(ast.roots.len(), 1);
/// ```
pub fn parse(tokens: Vec<Token>, file: Symbol, handler: &Handler) -> Result<Ast> {
    let mut parser = Parser::new(tokens, file, handler);
    parser.parse()?;
    Ok(parser.into_ast())
}
