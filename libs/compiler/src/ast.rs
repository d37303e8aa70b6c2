//! Abstract syntax tree for parsed search queries.
//!
//! The AST is produced by an external tokenizer/parser and consumed once
//! per compile call. Nodes are a plain tagged enum; the compiler carries
//! one compile path per variant.

use scour_schema::Operator;

/// Logical connective for [`Ast::Logical`] nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One node of a parsed search query.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A bare value: a free-text keyword, or a field/value position inside
    /// an operator node.
    Leaf(String),
    /// An operator applied to one child (unary forms) or two children
    /// (field and value).
    Op { op: Operator, children: Vec<Ast> },
    /// AND/OR over one or more children.
    Logical { op: LogicalOp, children: Vec<Ast> },
}

impl Ast {
    pub fn leaf(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }

    pub fn unary(op: Operator, child: Ast) -> Self {
        Self::Op {
            op,
            children: vec![child],
        }
    }

    /// Binary field test: `field <op> value`.
    pub fn binary(op: Operator, field: &str, value: &str) -> Self {
        Self::Op {
            op,
            children: vec![Self::leaf(field), Self::leaf(value)],
        }
    }

    pub fn not(child: Ast) -> Self {
        Self::unary(Operator::Not, child)
    }

    pub fn and(children: Vec<Ast>) -> Self {
        Self::Logical {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Ast>) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            children,
        }
    }
}
