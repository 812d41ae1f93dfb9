//! Abstract syntax tree.
//!
//! Pure data: an owned tagged union with exclusive child ownership, built
//! once by the parser (or by the builder helpers below) and never mutated.
//! The optimizer produces fresh trees instead of editing in place, so a
//! parsed AST can be cached and shared across evaluations by the caller.

use std::fmt;

use ecow::EcoString;

use crate::values::Value;

/// One AST node. `Program` only ever appears as the root.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Two or more statements; the program's value is the last one's.
    Program(Vec<Node>),
    Number(f64),
    String(EcoString),
    Boolean(bool),
    Array(Vec<Node>),
    Identifier(EcoString),
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Call {
        name: EcoString,
        args: Vec<Node>,
    },
    Assignment {
        name: EcoString,
        value: Box<Node>,
    },
    Conditional {
        condition: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
    },
    Range {
        start: Box<Node>,
        end: Box<Node>,
        inclusive: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl Node {
    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn assignment(name: impl Into<EcoString>, value: Node) -> Self {
        Node::Assignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn call(name: impl Into<EcoString>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args,
        }
    }

    pub fn identifier(name: impl Into<EcoString>) -> Self {
        Node::Identifier(name.into())
    }

    pub fn string(value: impl Into<EcoString>) -> Self {
        Node::String(value.into())
    }

    pub fn conditional(condition: Node, consequent: Node, alternate: Node) -> Self {
        Node::Conditional {
            condition: Box::new(condition),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn index(object: Node, index: Node) -> Self {
        Node::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    pub fn range(start: Node, end: Node, inclusive: bool) -> Self {
        Node::Range {
            start: Box::new(start),
            end: Box::new(end),
            inclusive,
        }
    }

    /// The statements of this node viewed as a program. A non-`Program`
    /// node is a single-statement program.
    pub fn statements(&self) -> std::slice::Iter<'_, Node> {
        match self {
            Node::Program(statements) => statements.iter(),
            _ => std::slice::from_ref(self).iter(),
        }
    }

    /// Scalar literal value of this node, if it is one. Array literals are
    /// deliberately excluded: their element types are only checked when the
    /// array value is built, and folding must not skip that check.
    pub fn as_constant(&self) -> Option<Value> {
        match self {
            Node::Number(n) => Some(Value::Number(*n)),
            Node::String(s) => Some(Value::String(s.clone())),
            Node::Boolean(b) => Some(Value::Boolean(*b)),
            _ => None,
        }
    }
}
