//! AST node definitions.
//!
//! Every node lives in the [`NodeArena`] and is referred to by [`NodeId`];
//! the back-references (a node's enclosing body and function, a datatype's
//! defining aggregate) are plain ids into the same arena, so the graph's
//! cycles never become ownership cycles.

use minc_util::{IndexVec, NodeId, Pos, Symbol};

/// The arena all nodes are allocated into.
pub type NodeArena = IndexVec<NodeId, Node>;

/// The parsed program: the arena plus the root nodes in source order.
#[derive(Debug)]
pub struct Ast {
    /// Node storage.
    pub arena: NodeArena,
    /// Top-level nodes, in the order they were parsed.
    pub roots: Vec<NodeId>,
}

/// Flags on a [`DataType`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataTypeFlags(u16);

impl DataTypeFlags {
    pub const SIGNED: DataTypeFlags = DataTypeFlags(1 << 0);
    pub const STATIC: DataTypeFlags = DataTypeFlags(1 << 1);
    pub const CONST: DataTypeFlags = DataTypeFlags(1 << 2);
    pub const POINTER: DataTypeFlags = DataTypeFlags(1 << 3);
    pub const ARRAY: DataTypeFlags = DataTypeFlags(1 << 4);
    pub const EXTERN: DataTypeFlags = DataTypeFlags(1 << 5);
    pub const RESTRICT: DataTypeFlags = DataTypeFlags(1 << 6);
    pub const IGNORE_TYPE_CHECK: DataTypeFlags = DataTypeFlags(1 << 7);
    pub const HAS_SECONDARY: DataTypeFlags = DataTypeFlags(1 << 8);
    pub const ANON_AGGREGATE: DataTypeFlags = DataTypeFlags(1 << 9);
    pub const LITERAL: DataTypeFlags = DataTypeFlags(1 << 10);

    /// True when every flag in `other` is set.
    pub fn contains(self, other: DataTypeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: DataTypeFlags) {
        self.0 |= other.0;
    }

    /// Clears the flags in `other`.
    pub fn remove(&mut self, other: DataTypeFlags) {
        self.0 &= !other.0;
    }
}

/// The base kind of a [`DataType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataTypeKind {
    Void,
    Int,
    Char,
    Float,
    Double,
    Long,
    Short,
    Struct,
    Union,
    Unknown,
}

/// The ordered array-bracket chain of a declarator, e.g. `[3][4]`.
///
/// Each element is a `Bracket` node whose inner expression is a number
/// literal; an empty `[]` contributes no element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArrayBrackets {
    brackets: Vec<NodeId>,
}

impl ArrayBrackets {
    /// Creates an empty chain.
    pub fn new() -> ArrayBrackets {
        ArrayBrackets::default()
    }

    /// Appends a bracket node.
    pub fn push(&mut self, bracket: NodeId) {
        self.brackets.push(bracket);
    }

    /// The bracket nodes, outermost first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.brackets
    }

    /// Number of bracket positions.
    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    /// True when the chain holds no brackets.
    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    /// `element_size` times the product of the bracket literals from
    /// `index` onwards.
    pub fn size_from_index(&self, element_size: usize, arena: &NodeArena, index: usize) -> usize {
        let mut size = element_size;
        for &bracket in self.brackets.iter().skip(index) {
            if let NodeKind::Bracket { inner } = &arena[bracket].kind {
                if let NodeKind::Number { value } = &arena[*inner].kind {
                    size *= *value as usize;
                }
            }
        }
        size
    }

    /// The full byte size of the array.
    pub fn size(&self, element_size: usize, arena: &NodeArena) -> usize {
        self.size_from_index(element_size, arena, 0)
    }
}

/// Array information attached to a datatype.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayInfo {
    /// The declarator's bracket chain.
    pub brackets: ArrayBrackets,
    /// The full array byte size, element size times every bracket literal.
    pub size: usize,
}

/// The parser's representation of a type.
#[derive(Clone, Debug, PartialEq)]
pub struct DataType {
    /// Base kind.
    pub kind: DataTypeKind,
    /// The type's name: the primitive keyword or the aggregate tag.
    pub name: Symbol,
    /// In-memory size of the base type in bytes.
    pub size: usize,
    /// Pointer depth; 0 means not a pointer.
    pub pointer_level: u32,
    /// Flag set.
    pub flags: DataTypeFlags,
    /// Second word of combinations such as `long long` and `long double`.
    pub secondary: Option<Box<DataType>>,
    /// Array declarator information.
    pub array: Option<ArrayInfo>,
    /// The struct or union node defining this type, once known.
    pub aggregate_node: Option<NodeId>,
}

impl DataType {
    /// A blank datatype with the default `Signed` flag, the starting point
    /// of declaration parsing.
    pub fn unknown() -> DataType {
        DataType {
            kind: DataTypeKind::Unknown,
            name: Symbol::intern(""),
            size: 0,
            pointer_level: 0,
            flags: DataTypeFlags::SIGNED,
            secondary: None,
            array: None,
            aggregate_node: None,
        }
    }

    /// True for struct and union types.
    pub fn is_struct_or_union(&self) -> bool {
        matches!(self.kind, DataTypeKind::Struct | DataTypeKind::Union)
    }

    /// True for everything that is not an aggregate.
    pub fn is_primitive(&self) -> bool {
        !self.is_struct_or_union()
    }

    /// The in-memory size: pointers collapse to a DWORD, arrays to their
    /// full size.
    pub fn byte_size(&self) -> usize {
        if self.flags.contains(DataTypeFlags::POINTER) && self.pointer_level > 0 {
            return minc_util::DATA_SIZE_DWORD;
        }
        if self.flags.contains(DataTypeFlags::ARRAY) {
            if let Some(array) = &self.array {
                return array.size;
            }
        }
        self.size
    }

    /// The element size for array access: pointers are a DWORD, otherwise
    /// the base size.
    pub fn element_size(&self) -> usize {
        if self.flags.contains(DataTypeFlags::POINTER) {
            return minc_util::DATA_SIZE_DWORD;
        }
        self.size
    }
}

/// Flags on a [`Node`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const INSIDE_EXPRESSION: NodeFlags = NodeFlags(1 << 0);
    pub const FORWARD_DECLARATION: NodeFlags = NodeFlags(1 << 1);
    pub const HAS_VARIABLE_COMBINED: NodeFlags = NodeFlags(1 << 2);

    /// True when every flag in `other` is set.
    pub fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the flags in `other`.
    pub fn insert(&mut self, other: NodeFlags) {
        self.0 |= other.0;
    }
}

/// The body/function a node is nested inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindedTo {
    /// The enclosing body node.
    pub body: Option<NodeId>,
    /// The enclosing function node.
    pub function: Option<NodeId>,
}

/// A variable declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct VarNode {
    /// Declared type.
    pub dtype: DataType,
    /// Declared name; absent for unnamed function parameters.
    pub name: Option<Symbol>,
    /// Initializer expression.
    pub value: Option<NodeId>,
    /// Padding inserted before this variable for alignment.
    pub padding: i32,
    /// Offset after alignment: negative for stack locals, positive for
    /// function arguments, field offset inside a struct.
    pub aligned_offset: i32,
}

/// A function definition or declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionNode {
    /// Return type.
    pub return_type: DataType,
    /// Function name.
    pub name: Symbol,
    /// Parameter variable nodes.
    pub args: Vec<NodeId>,
    /// Bytes between the stack pointer and the first argument at call time;
    /// grows by one DWORD when the return type is an aggregate (hidden
    /// return slot).
    pub args_stack_addition: usize,
    /// Body, absent for a declaration.
    pub body: Option<NodeId>,
    /// Total local variable bytes, aligned to the stack alignment.
    pub stack_size: usize,
    /// True when a native-function symbol with this name pre-exists.
    pub is_native: bool,
    /// True when the parameter list ended with `...`.
    pub is_variadic: bool,
}

/// A sequence of statements with its layout summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyNode {
    /// Statements in source order.
    pub statements: Vec<NodeId>,
    /// Total byte size of the variables declared in this body, padded.
    pub size: usize,
    /// True when inter-variable padding was inserted.
    pub padded: bool,
    /// The largest primitive variable, used for outer alignment.
    pub largest_var: Option<NodeId>,
}

/// A struct or union definition.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateNode {
    /// Tag name (possibly generated for anonymous aggregates).
    pub name: Symbol,
    /// Body node; absent for forward declarations.
    pub body: Option<NodeId>,
    /// Inline declarator variable (`struct S { ... } x;`).
    pub variable: Option<NodeId>,
}

/// Node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Number { value: u64 },
    Str { text: String },
    Identifier { name: Symbol },
    Expression { left: NodeId, right: NodeId, op: Symbol },
    Parentheses { inner: NodeId },
    Unary { op: Symbol, operand: NodeId },
    Ternary { true_node: NodeId, false_node: NodeId },
    Bracket { inner: NodeId },
    Cast { dtype: DataType, operand: NodeId },
    Variable(VarNode),
    VariableList { variables: Vec<NodeId> },
    Function(FunctionNode),
    Body(BodyNode),
    Struct(AggregateNode),
    Union(AggregateNode),
    ReturnStmt { expr: Option<NodeId> },
    IfStmt { condition: NodeId, body: NodeId, else_node: Option<NodeId> },
    ElseStmt { body: NodeId },
    WhileStmt { condition: NodeId, body: NodeId },
    DoWhileStmt { body: NodeId, condition: NodeId },
    ForStmt { init: Option<NodeId>, condition: Option<NodeId>, increment: Option<NodeId>, body: NodeId },
    SwitchStmt { expr: NodeId, body: NodeId, cases: Vec<NodeId>, has_default: bool },
    CaseStmt { expr: NodeId },
    DefaultStmt,
    BreakStmt,
    ContinueStmt,
    GotoStmt { label: NodeId },
    Label { name: NodeId },
    Blank,
}

/// One AST node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Payload.
    pub kind: NodeKind,
    /// Source position.
    pub pos: Pos,
    /// Node flags.
    pub flags: NodeFlags,
    /// Enclosing body and function.
    pub binded: BindedTo,
}

impl Node {
    /// True for nodes that can stand as a sub-expression.
    pub fn is_expressionable(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Expression { .. }
                | NodeKind::Parentheses { .. }
                | NodeKind::Unary { .. }
                | NodeKind::Ternary { .. }
                | NodeKind::Identifier { .. }
                | NodeKind::Number { .. }
                | NodeKind::Str { .. }
        )
    }

    /// The variable payload, if this is a variable node.
    pub fn as_variable(&self) -> Option<&VarNode> {
        match &self.kind {
            NodeKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// Mutable variant of [`Node::as_variable`].
    pub fn as_variable_mut(&mut self) -> Option<&mut VarNode> {
        match &mut self.kind {
            NodeKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// True for a variable node of struct or union type.
    pub fn is_struct_or_union_variable(&self) -> bool {
        self.as_variable().is_some_and(|var| var.dtype.is_struct_or_union())
    }
}

/// The byte size a variable node occupies.
pub fn variable_size(arena: &NodeArena, variable: NodeId) -> usize {
    arena[variable].as_variable().map_or(0, |var| var.dtype.byte_size())
}

/// The summed byte size of a variable list.
pub fn variable_size_for_list(arena: &NodeArena, list: NodeId) -> usize {
    match &arena[list].kind {
        NodeKind::VariableList { variables } => variables.iter().map(|&v| variable_size(arena, v)).sum(),
        _ => 0,
    }
}

/// Resolves a node to its variable node: a variable is itself, an aggregate
/// resolves to its inline declarator.
pub fn variable_node(arena: &NodeArena, node: NodeId) -> Option<NodeId> {
    match &arena[node].kind {
        NodeKind::Variable(_) => Some(node),
        NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.variable,
        _ => None,
    }
}

/// Like [`variable_node`], but a variable list resolves to itself.
pub fn variable_node_or_list(arena: &NodeArena, node: NodeId) -> Option<NodeId> {
    match &arena[node].kind {
        NodeKind::VariableList { .. } => Some(node),
        _ => variable_node(arena, node),
    }
}

/// True when the node is a variable of a primitive (non-aggregate) type.
pub fn is_variable_node_primitive(arena: &NodeArena, node: NodeId) -> bool {
    arena[node].as_variable().is_some_and(|var| var.dtype.is_primitive())
}

/// The body node of the struct or union a variable's type refers to.
pub fn variable_aggregate_body_node(arena: &NodeArena, node: NodeId) -> Option<NodeId> {
    let var = arena[node].as_variable()?;
    if !var.dtype.is_struct_or_union() {
        return None;
    }
    let aggregate = var.dtype.aggregate_node?;
    match &arena[aggregate].kind {
        NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.body,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minc_util::NodeId;

    fn leaf(kind: NodeKind) -> Node {
        Node {
            kind,
            pos: Pos::start(Symbol::intern("t.c")),
            flags: NodeFlags::default(),
            binded: BindedTo::default(),
        }
    }

    #[test]
    fn test_datatype_flags() {
        let mut flags = DataTypeFlags::SIGNED;
        assert!(flags.contains(DataTypeFlags::SIGNED));
        flags.insert(DataTypeFlags::POINTER);
        assert!(flags.contains(DataTypeFlags::POINTER));
        flags.remove(DataTypeFlags::SIGNED);
        assert!(!flags.contains(DataTypeFlags::SIGNED));
    }

    #[test]
    fn test_pointer_size_collapses_to_dword() {
        let mut dtype = DataType::unknown();
        dtype.kind = DataTypeKind::Char;
        dtype.size = 1;
        dtype.pointer_level = 2;
        dtype.flags.insert(DataTypeFlags::POINTER);
        assert_eq!(dtype.byte_size(), 4);
        assert_eq!(dtype.element_size(), 4);
    }

    #[test]
    fn test_array_bracket_size_product() {
        let mut arena: NodeArena = NodeArena::new();
        let three = arena.push(leaf(NodeKind::Number { value: 3 }));
        let four = arena.push(leaf(NodeKind::Number { value: 4 }));
        let b0 = arena.push(leaf(NodeKind::Bracket { inner: three }));
        let b1 = arena.push(leaf(NodeKind::Bracket { inner: four }));

        let mut brackets = ArrayBrackets::new();
        brackets.push(b0);
        brackets.push(b1);

        assert_eq!(brackets.size(1, &arena), 12);
        assert_eq!(brackets.size_from_index(1, &arena, 1), 4);
        assert_eq!(brackets.size_from_index(1, &arena, 2), 1);
        assert_eq!(brackets.size(4, &arena), 48);
    }

    #[test]
    fn test_expressionable_set() {
        assert!(leaf(NodeKind::Number { value: 1 }).is_expressionable());
        assert!(leaf(NodeKind::Identifier { name: Symbol::intern("x") }).is_expressionable());
        assert!(leaf(NodeKind::Ternary { true_node: NodeId(0), false_node: NodeId(1) }).is_expressionable());
        assert!(!leaf(NodeKind::Blank).is_expressionable());
        assert!(!leaf(NodeKind::BreakStmt).is_expressionable());
    }

    #[test]
    fn test_variable_size_uses_full_array_size() {
        let mut arena: NodeArena = NodeArena::new();
        let nine = arena.push(leaf(NodeKind::Number { value: 9 }));
        let bracket = arena.push(leaf(NodeKind::Bracket { inner: nine }));
        let mut brackets = ArrayBrackets::new();
        brackets.push(bracket);

        let mut dtype = DataType::unknown();
        dtype.kind = DataTypeKind::Char;
        dtype.size = 1;
        dtype.flags.insert(DataTypeFlags::ARRAY);
        let size = brackets.size(1, &arena);
        dtype.array = Some(ArrayInfo { brackets, size });

        let var = arena.push(leaf(NodeKind::Variable(VarNode {
            dtype,
            name: Some(Symbol::intern("b")),
            value: None,
            padding: 0,
            aligned_offset: 0,
        })));
        assert_eq!(variable_size(&arena, var), 9);
    }
}
