//! Datatype parsing.
//!
//! A declaration's type is parsed as: modifier keywords, the type keyword
//! (with an optional secondary primitive for `long long`-style combinations
//! and a tag name for aggregates), pointer stars, then trailing modifiers.
//! Sizes follow the 32-bit model; `long long` clamps to a DWORD with a
//! warning.

use minc_lex::TokenKind;
use minc_util::{Result, Symbol, DATA_SIZE_BYTE, DATA_SIZE_DWORD, DATA_SIZE_WORD, DATA_SIZE_ZERO};

use crate::ast::{DataType, DataTypeFlags, DataTypeKind, NodeKind};
use crate::Parser;

/// What the leading type keyword announced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpectedType {
    Primitive,
    Struct,
    Union,
}

/// Keywords that modify a declaration rather than name its type.
pub(crate) fn is_keyword_variable_modifier(value: &str) -> bool {
    matches!(value, "unsigned" | "signed" | "static" | "const" | "extern" | "__ignore_typecheck__")
}

/// Keywords that can open a datatype.
pub(crate) fn is_datatype_keyword(value: &str) -> bool {
    matches!(value, "int" | "char" | "float" | "double" | "void" | "long" | "short" | "struct" | "union")
}

/// Primitives allowed to carry a secondary primitive (`long long`,
/// `long double`, ...).
fn is_secondary_allowed_for(value: &str) -> bool {
    matches!(value, "float" | "double" | "long" | "short")
}

impl<'a> Parser<'a> {
    /// Parses a full datatype: modifiers, type, secondary, pointer level,
    /// trailing modifiers.
    pub(crate) fn parse_datatype(&mut self) -> Result<DataType> {
        let mut dtype = DataType::unknown();
        self.parse_datatype_modifiers(&mut dtype)?;
        self.parse_datatype_type(&mut dtype)?;
        self.parse_datatype_modifiers(&mut dtype)?;
        Ok(dtype)
    }

    /// Consumes modifier keywords, folding them into the flag set.
    fn parse_datatype_modifiers(&mut self, dtype: &mut DataType) -> Result<()> {
        while let Some(token) = self.peek_token() {
            let TokenKind::Keyword(keyword) = &token.kind else {
                break;
            };
            let keyword = keyword.as_str();
            if !is_keyword_variable_modifier(keyword) {
                break;
            }
            match keyword {
                "unsigned" => dtype.flags.remove(DataTypeFlags::SIGNED),
                "signed" => dtype.flags.insert(DataTypeFlags::SIGNED),
                "static" => dtype.flags.insert(DataTypeFlags::STATIC),
                "const" => dtype.flags.insert(DataTypeFlags::CONST),
                "extern" => dtype.flags.insert(DataTypeFlags::EXTERN),
                "__ignore_typecheck__" => dtype.flags.insert(DataTypeFlags::IGNORE_TYPE_CHECK),
                _ => return Err(self.err_syntactic("unknown datatype modifier")),
            }
            self.next_token();
        }
        Ok(())
    }

    /// Parses the type keyword, optional secondary, aggregate tag and
    /// pointer level.
    fn parse_datatype_type(&mut self, dtype: &mut DataType) -> Result<()> {
        let (type_token, secondary_token) = self.get_datatype_tokens()?;
        let expected = match type_token.as_str() {
            "struct" => ExpectedType::Struct,
            "union" => ExpectedType::Union,
            _ => ExpectedType::Primitive,
        };

        let mut name_token = type_token;
        if expected != ExpectedType::Primitive {
            match self.peek_token().map(|t| t.kind.clone()) {
                Some(TokenKind::Identifier(tag)) => {
                    self.next_token();
                    name_token = tag;
                }
                _ => {
                    // Anonymous aggregate: give it a generated tag.
                    name_token = self.next_anonymous_name();
                    dtype.flags.insert(DataTypeFlags::ANON_AGGREGATE);
                }
            }
        }

        let pointer_level = self.parse_pointer_level();
        self.datatype_init(name_token, secondary_token, dtype, pointer_level, expected)
    }

    /// Reads the type keyword and the optional secondary primitive keyword.
    fn get_datatype_tokens(&mut self) -> Result<(Symbol, Option<Symbol>)> {
        let type_token = match self.next_token().map(|t| t.kind) {
            Some(TokenKind::Keyword(keyword)) => keyword,
            _ => return Err(self.err_syntactic("expecting a datatype keyword")),
        };
        let secondary = match self.peek_token() {
            Some(token) if token.is_primitive_keyword() => match self.next_token().map(|t| t.kind) {
                Some(TokenKind::Keyword(keyword)) => Some(keyword),
                _ => None,
            },
            _ => None,
        };
        Ok((type_token, secondary))
    }

    /// Counts the `*` stars of a pointer declarator.
    fn parse_pointer_level(&mut self) -> u32 {
        let mut depth = 0;
        while self.is_next_operator("*") {
            self.next_token();
            depth += 1;
        }
        depth
    }

    /// Fills in kind, size, name and pointer data.
    fn datatype_init(
        &mut self,
        name_token: Symbol,
        secondary_token: Option<Symbol>,
        dtype: &mut DataType,
        pointer_level: u32,
        expected: ExpectedType,
    ) -> Result<()> {
        self.datatype_init_type_and_size(name_token, secondary_token, dtype, expected)?;
        dtype.name = name_token;
        if pointer_level > 0 {
            dtype.flags.insert(DataTypeFlags::POINTER);
            dtype.pointer_level = pointer_level;
        }
        if name_token.as_str() == "long" && secondary_token.is_some_and(|s| s.as_str() == "long") {
            self.warn_here("compiler does not support 64 bit longs, using 32 bit longs instead");
            dtype.size = DATA_SIZE_DWORD;
        }
        Ok(())
    }

    fn datatype_init_type_and_size(
        &mut self,
        name_token: Symbol,
        secondary_token: Option<Symbol>,
        dtype: &mut DataType,
        expected: ExpectedType,
    ) -> Result<()> {
        if expected != ExpectedType::Primitive && secondary_token.is_some() {
            return Err(self.err_semantic("secondary datatype not allowed"));
        }
        match expected {
            ExpectedType::Primitive => self.datatype_init_primitive(name_token, secondary_token, dtype),
            ExpectedType::Struct => {
                dtype.kind = DataTypeKind::Struct;
                dtype.size = self.size_of_aggregate(name_token);
                dtype.aggregate_node = self.aggregate_node_for_name(name_token, DataTypeKind::Struct);
                Ok(())
            }
            ExpectedType::Union => {
                dtype.kind = DataTypeKind::Union;
                dtype.size = self.size_of_aggregate(name_token);
                dtype.aggregate_node = self.aggregate_node_for_name(name_token, DataTypeKind::Union);
                Ok(())
            }
        }
    }

    fn datatype_init_primitive(
        &mut self,
        name_token: Symbol,
        secondary_token: Option<Symbol>,
        dtype: &mut DataType,
    ) -> Result<()> {
        let name = name_token.as_str();
        if secondary_token.is_some() && !is_secondary_allowed_for(name) {
            return Err(self.err_semantic("secondary datatype not allowed"));
        }
        let (kind, size) = match name {
            "void" => (DataTypeKind::Void, DATA_SIZE_ZERO),
            "char" => (DataTypeKind::Char, DATA_SIZE_BYTE),
            "short" => (DataTypeKind::Short, DATA_SIZE_WORD),
            "int" => (DataTypeKind::Int, DATA_SIZE_DWORD),
            "float" => (DataTypeKind::Float, DATA_SIZE_DWORD),
            "double" => (DataTypeKind::Double, DATA_SIZE_DWORD),
            "long" => (DataTypeKind::Long, DATA_SIZE_DWORD),
            _ => return Err(self.err_syntactic(format!("unknown primitive datatype {name}"))),
        };
        dtype.kind = kind;
        dtype.size = size;

        if let Some(secondary) = secondary_token {
            let mut secondary_dtype = DataType::unknown();
            self.datatype_init_primitive(secondary, None, &mut secondary_dtype)?;
            secondary_dtype.name = secondary;
            dtype.size += secondary_dtype.size;
            dtype.secondary = Some(Box::new(secondary_dtype));
            dtype.flags.insert(DataTypeFlags::HAS_SECONDARY);
        }
        Ok(())
    }

    /// The body size of a named aggregate, 0 when it is not defined yet.
    fn size_of_aggregate(&mut self, name: Symbol) -> usize {
        let Some(node) = self.cx.symbols.get_node(name) else {
            return 0;
        };
        let body = match &self.cx.arena[node].kind {
            NodeKind::Struct(aggregate) | NodeKind::Union(aggregate) => aggregate.body,
            _ => return 0,
        };
        body.map_or(0, |body| match &self.cx.arena[body].kind {
            NodeKind::Body(body) => body.size,
            _ => 0,
        })
    }

    /// The defining node of a named aggregate, when it exists and matches
    /// the expected kind.
    fn aggregate_node_for_name(&mut self, name: Symbol, kind: DataTypeKind) -> Option<minc_util::NodeId> {
        let node = self.cx.symbols.get_node(name)?;
        let matches_kind = match &self.cx.arena[node].kind {
            NodeKind::Struct(_) => kind == DataTypeKind::Struct,
            NodeKind::Union(_) => kind == DataTypeKind::Union,
            _ => false,
        };
        matches_kind.then_some(node)
    }

    /// Consumes a redundant `int` after `long`, `float` or `double`
    /// (`long int x` means `long x`).
    pub(crate) fn ignore_int(&mut self, dtype: &DataType) -> Result<()> {
        if !self.is_next_keyword("int") {
            return Ok(());
        }
        if !matches!(dtype.kind, DataTypeKind::Long | DataTypeKind::Float | DataTypeKind::Double) {
            return Err(self.err_semantic("provided secondary datatype int is not valid"));
        }
        self.next_token();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{DataTypeFlags, DataTypeKind, NodeKind};
    use crate::test_support::parse_source;

    #[test]
    fn test_basic_primitive_sizes() {
        for (source, kind, size) in [
            ("void* a;", DataTypeKind::Void, 0),
            ("char a;", DataTypeKind::Char, 1),
            ("short a;", DataTypeKind::Short, 2),
            ("int a;", DataTypeKind::Int, 4),
            ("float a;", DataTypeKind::Float, 4),
            ("double a;", DataTypeKind::Double, 4),
            ("long a;", DataTypeKind::Long, 4),
        ] {
            let ast = parse_source(source);
            let var = ast.arena[ast.roots[0]].as_variable().unwrap();
            assert_eq!(var.dtype.kind, kind, "{source}");
            assert_eq!(var.dtype.size, size, "{source}");
        }
    }

    #[test]
    fn test_unsigned_clears_signed_flag() {
        let ast = parse_source("unsigned int a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(!var.dtype.flags.contains(DataTypeFlags::SIGNED));

        let ast = parse_source("int a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(var.dtype.flags.contains(DataTypeFlags::SIGNED));
    }

    #[test]
    fn test_modifier_flags() {
        let ast = parse_source("static const int a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(var.dtype.flags.contains(DataTypeFlags::STATIC));
        assert!(var.dtype.flags.contains(DataTypeFlags::CONST));

        let ast = parse_source("extern __ignore_typecheck__ int a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(var.dtype.flags.contains(DataTypeFlags::EXTERN));
        assert!(var.dtype.flags.contains(DataTypeFlags::IGNORE_TYPE_CHECK));
    }

    #[test]
    fn test_pointer_level() {
        let ast = parse_source("char** p;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert!(var.dtype.flags.contains(DataTypeFlags::POINTER));
        assert_eq!(var.dtype.pointer_level, 2);
        assert_eq!(var.dtype.byte_size(), 4);
    }

    #[test]
    fn test_long_long_clamps_with_warning() {
        let handler = minc_util::Handler::new();
        let tokens = minc_lex::lex_string("long long a;", "t.c").unwrap();
        let ast = crate::parse(tokens, minc_util::Symbol::intern("t.c"), &handler).unwrap();
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert_eq!(var.dtype.size, 4);
        assert!(var.dtype.flags.contains(DataTypeFlags::HAS_SECONDARY));
        assert_eq!(handler.warning_count(), 1);
        let warning = handler.take().remove(0);
        assert!(warning.message.contains("32 bit longs"));
    }

    #[test]
    fn test_long_double_adds_sizes() {
        let ast = parse_source("long double a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert_eq!(var.dtype.size, 8);
        assert!(var.dtype.secondary.is_some());
    }

    #[test]
    fn test_long_int_elision() {
        let ast = parse_source("long int a;");
        let var = ast.arena[ast.roots[0]].as_variable().unwrap();
        assert_eq!(var.dtype.kind, DataTypeKind::Long);
        assert_eq!(var.dtype.size, 8);
    }

    #[test]
    fn test_secondary_not_allowed_for_int() {
        let handler = minc_util::Handler::new();
        let tokens = minc_lex::lex_string("int char a;", "t.c").unwrap();
        let err = crate::parse(tokens, minc_util::Symbol::intern("t.c"), &handler).unwrap_err();
        assert!(err.to_string().contains("secondary datatype not allowed"));
    }

    #[test]
    fn test_anonymous_struct_gets_generated_name() {
        let ast = parse_source("struct { int a; } thing;");
        let root = &ast.arena[ast.roots[0]];
        match &root.kind {
            NodeKind::Struct(aggregate) => {
                // The inline declarator adopts the variable's name.
                assert_eq!(aggregate.name.as_str(), "thing");
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }
}
