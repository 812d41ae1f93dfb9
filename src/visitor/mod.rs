//! AST traversal support shared by the optimizer and the compiler.
//!
//! [`Transformer`] is the rewrite seam: an exhaustive match over node
//! kinds producing a new output per node. The free functions below cover
//! the read-only analyses (child iteration, recursive predicates) that
//! both consumers need.


use crate::ast::Node;

/// An exhaustive AST rewriter. Implementations match on every node kind
/// and produce a fresh output, typically recursing through their own
/// `transform` for children.
pub trait Transformer {
    type Output;

    fn transform(&mut self, node: &Node) -> Self::Output;
}

/// Invoke `f` on each direct child of `node`, in evaluation order.
///
/// `Assignment` and `Call` names are not nodes and are not visited; an
/// `Identifier` reached through here is therefore always a variable read.
pub fn each_child(node: &Node, f: &mut impl FnMut(&Node)) {
    match node {
        Node::Program(statements) => statements.iter().for_each(&mut *f),
        Node::Number(_) | Node::String(_) | Node::Boolean(_) | Node::Identifier(_) => {}
        Node::Array(elements) => elements.iter().for_each(&mut *f),
        Node::Binary { left, right, .. } => {
            f(left);
            f(right);
        }
        Node::Unary { operand, .. } => f(operand),
        Node::Call { args, .. } => args.iter().for_each(&mut *f),
        Node::Assignment { value, .. } => f(value),
        Node::Conditional {
            condition,
            consequent,
            alternate,
        } => {
            f(condition);
            f(consequent);
            f(alternate);
        }
        Node::Index { object, index } => {
            f(object);
            f(index);
        }
        Node::Range { start, end, .. } => {
            f(start);
            f(end);
        }
    }
}

/// True if `pred` holds for `node` or any descendant.
pub fn any_node(node: &Node, pred: &mut impl FnMut(&Node) -> bool) -> bool {
    if pred(node) {
        return true;
    }
    let mut found = false;
    each_child(node, &mut |child| {
        found = found || any_node(child, &mut *pred);
    });
    found
}

/// True if any descendant (or `node` itself) reads the variable `name`.
pub fn reads_variable(node: &Node, name: &str) -> bool {
    any_node(node, &mut |n| matches!(n, Node::Identifier(id) if id == name))
}

/// True if evaluating `node` could have an observable effect beyond its
/// result: a host function call or a variable assignment.
pub fn has_side_effects(node: &Node) -> bool {
    any_node(node, &mut |n| {
        matches!(n, Node::Call { .. } | Node::Assignment { .. })
    })
}
