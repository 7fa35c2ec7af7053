//! CAst-style node vocabulary and the factory interface the translator
//! builds nodes through.
//!
//! The translator never owns nodes; it receives opaque [`NodeHandle`]s from
//! an [`AstFactory`] and wires them together. [`TreeFactory`] is the
//! in-process implementation used by the CLI and the tests.

mod tree;

use std::fmt;

pub use tree::{Entry, TreeFactory};

/// Kinds of structural AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Var,
    Assign,
    Call,
    UnaryExpr,
    BinaryExpr,
    IfStmt,
    Goto,
    LabelStmt,
    BlockStmt,
    Switch,
    Return,
    Throw,
    Try,
    Cast,
    ObjectLiteral,
    ObjectRef,
    ArrayRef,
    FunctionExpr,
    Constant,
    Primitive,
    Empty,
    Assert,
    YieldStmt,
    Unwind,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Var => "VAR",
            Self::Assign => "ASSIGN",
            Self::Call => "CALL",
            Self::UnaryExpr => "UNARY_EXPR",
            Self::BinaryExpr => "BINARY_EXPR",
            Self::IfStmt => "IF_STMT",
            Self::Goto => "GOTO",
            Self::LabelStmt => "LABEL_STMT",
            Self::BlockStmt => "BLOCK_STMT",
            Self::Switch => "SWITCH",
            Self::Return => "RETURN",
            Self::Throw => "THROW",
            Self::Try => "TRY",
            Self::Cast => "CAST",
            Self::ObjectLiteral => "OBJECT_LITERAL",
            Self::ObjectRef => "OBJECT_REF",
            Self::ArrayRef => "ARRAY_REF",
            Self::FunctionExpr => "FUNCTION_EXPR",
            Self::Constant => "CONSTANT",
            Self::Primitive => "PRIMITIVE",
            Self::Empty => "EMPTY",
            Self::Assert => "ASSERT",
            Self::YieldStmt => "YIELD_STMT",
            Self::Unwind => "UNWIND",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constant payloads
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Numeric text that could not be parsed, kept verbatim
    Decimal(String),
}

impl Literal {
    /// Integer value, for the integral variants
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}L", v),
            Self::U32(v) => write!(f, "{}u", v),
            Self::U64(v) => write!(f, "{}uL", v),
            Self::F32(v) => write!(f, "{:?}f", v),
            Self::F64(v) => write!(f, "{:?}", v),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Decimal(s) => write!(f, "{}d", s),
        }
    }
}

/// Native operator tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
    LShift,
    RShift,
    Lt,
    Le,
    Gt,
    Ge,
    Not,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "OP_EQ",
            Self::Ne => "OP_NE",
            Self::Add => "OP_ADD",
            Self::Sub => "OP_SUB",
            Self::Mul => "OP_MUL",
            Self::Div => "OP_DIV",
            Self::LShift => "OP_LSH",
            Self::RShift => "OP_RSH",
            Self::Lt => "OP_LT",
            Self::Le => "OP_LE",
            Self::Gt => "OP_GT",
            Self::Ge => "OP_GE",
            Self::Not => "OP_NOT",
            Self::BitNot => "OP_BITNOT",
            Self::BitAnd => "OP_BIT_AND",
            Self::BitOr => "OP_BIT_OR",
            Self::BitXor => "OP_BIT_XOR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque node reference; equality is node identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Opaque reference to a node array built with [`AstFactory::make_array`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayHandle(u32);

impl ArrayHandle {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// A child position: a single node, or an array spliced in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(NodeHandle),
    Array(ArrayHandle),
}

impl From<NodeHandle> for Child {
    fn from(node: NodeHandle) -> Self {
        Child::Node(node)
    }
}

impl From<ArrayHandle> for Child {
    fn from(array: ArrayHandle) -> Self {
        Child::Array(array)
    }
}

/// Faults reported by a factory; always fatal to the translation
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryError {
    /// Handle not produced by this factory
    UnknownNode(NodeHandle),
    /// Array handle not produced by this factory
    UnknownArray(ArrayHandle),
    /// Node arena exhausted
    CapacityExceeded,
    /// Fault raised by an out-of-process runtime
    Runtime(String),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(node) => write!(f, "Unknown node handle #{}", node.index()),
            Self::UnknownArray(array) => write!(f, "Unknown array handle #{}", array.index()),
            Self::CapacityExceeded => write!(f, "Node capacity exceeded"),
            Self::Runtime(msg) => write!(f, "AST runtime fault: {}", msg),
        }
    }
}

impl std::error::Error for FactoryError {}

/// Result type for factory calls
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Node construction and output interface
///
/// Implementations own the nodes; the translator only sees handles.
pub trait AstFactory {
    /// Build a structural node; [`Child::Array`] entries are spliced in order
    fn make_node(&mut self, kind: NodeKind, children: &[Child]) -> FactoryResult<NodeHandle>;

    /// Build a constant leaf
    fn make_constant(&mut self, value: Literal) -> FactoryResult<NodeHandle>;

    /// Build an operator leaf for unary/binary expressions
    fn make_operator(&mut self, op: Operator) -> FactoryResult<NodeHandle>;

    /// Group nodes for use as a spliced child list
    fn make_array(&mut self, nodes: Vec<NodeHandle>) -> FactoryResult<ArrayHandle>;

    /// Hand a finished top-level node downstream
    fn print(&mut self, node: NodeHandle) -> FactoryResult<()>;
}
