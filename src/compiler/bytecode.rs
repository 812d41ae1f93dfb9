//! Bytecode emission.
//!
//! Two passes over the (already optimized) AST. The scan pass assigns
//! variable and function slots in first-appearance order, so only names
//! the program actually touches are materialized, and decides which
//! variables qualify for the literal-default specialization. The
//! emission pass walks the tree again producing instructions, patching
//! forward jumps and tracking the worst-case operand stack depth.
//!
//! The specialization: a variable whose only assignment is a top-level
//! statement with a scalar-literal right-hand side, and which is never
//! read before that statement, gets the literal as its slot default.
//! Its assignment then compiles to a plain `LoadVar`, which yields the
//! host's value for an external slot and the literal otherwise. Any
//! read preceding the assignment disqualifies it, since that read must
//! still fail on an undefined variable exactly as the evaluator's would.

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};

use crate::ast::{BinaryOp, Node};
use crate::values::Value;
use crate::visitor::{each_child, Transformer};
use crate::vm::{BoolContext, Code, Instruction, VarSpec};

/// Compile an AST. Infallible: anything this rejects was already
/// rejected by the parser or the optimizer.
pub fn compile(ast: &Node) -> Code {
    let mut compiler = Compiler::default();
    for statement in ast.statements() {
        compiler.scan(statement, true);
    }
    compiler.decide_specialization();
    compiler.compile_statements(ast);
    compiler.emit(Instruction::Return);
    compiler.into_code()
}

#[derive(Default)]
struct VarInfo {
    assignments: usize,
    read_before_assignment: bool,
    top_level_literal: Option<Value>,
}

#[derive(Default)]
struct Compiler {
    constants: Vec<Value>,
    instructions: Vec<Instruction>,
    variable_names: Vec<EcoString>,
    variable_slots: HashMap<EcoString, u32>,
    functions: Vec<EcoString>,
    function_slots: HashMap<EcoString, u32>,
    info: HashMap<EcoString, VarInfo>,
    specialized: HashSet<EcoString>,
    stack_depth: usize,
    max_stack: usize,
}

impl Compiler {
    /// Scan pass: slot registration in evaluation order plus the
    /// bookkeeping behind the specialization decision.
    fn scan(&mut self, node: &Node, top_level: bool) {
        match node {
            Node::Identifier(name) => {
                self.variable_slot(name);
                let info = self.info.entry(name.clone()).or_default();
                if info.assignments == 0 {
                    info.read_before_assignment = true;
                }
            }
            Node::Assignment { name, value } => {
                self.scan(value, false);
                self.variable_slot(name);
                let literal = if top_level { value.as_constant() } else { None };
                let info = self.info.entry(name.clone()).or_default();
                info.assignments += 1;
                info.top_level_literal = literal;
            }
            Node::Call { name, args } => {
                self.function_slot(name);
                for arg in args {
                    self.scan(arg, false);
                }
            }
            _ => each_child(node, &mut |child| self.scan(child, false)),
        }
    }

    fn decide_specialization(&mut self) {
        let eligible: Vec<EcoString> = self
            .info
            .iter()
            .filter(|(_, info)| {
                info.assignments == 1
                    && !info.read_before_assignment
                    && info.top_level_literal.is_some()
            })
            .map(|(name, _)| name.clone())
            .collect();
        self.specialized.extend(eligible);
    }

    fn compile_statements(&mut self, ast: &Node) {
        let total = ast.statements().count();
        for (i, statement) in ast.statements().enumerate() {
            self.transform(statement);
            if i + 1 < total {
                self.emit(Instruction::Pop);
                self.pop_stack(1);
            }
        }
    }

    fn into_code(self) -> Code {
        let variables = self
            .variable_names
            .iter()
            .map(|name| {
                let default = self
                    .specialized
                    .contains(name)
                    .then(|| self.info.get(name))
                    .flatten()
                    .and_then(|info| info.top_level_literal.clone());
                VarSpec {
                    name: name.clone(),
                    default,
                }
            })
            .collect();
        Code {
            constants: self.constants,
            instructions: self.instructions,
            variables,
            functions: self.functions,
            max_stack: self.max_stack,
        }
    }

    fn variable_slot(&mut self, name: &EcoString) -> u32 {
        if let Some(slot) = self.variable_slots.get(name) {
            return *slot;
        }
        let slot = self.variable_names.len() as u32;
        self.variable_names.push(name.clone());
        self.variable_slots.insert(name.clone(), slot);
        slot
    }

    fn function_slot(&mut self, name: &EcoString) -> u32 {
        if let Some(slot) = self.function_slots.get(name) {
            return *slot;
        }
        let slot = self.functions.len() as u32;
        self.functions.push(name.clone());
        self.function_slots.insert(name.clone(), slot);
        slot
    }

    fn constant_slot(&mut self, value: Value) -> u32 {
        if let Some(existing) = self.constants.iter().position(|c| *c == value) {
            return existing as u32;
        }
        self.constants.push(value);
        (self.constants.len() - 1) as u32
    }

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn emit_constant(&mut self, value: Value) {
        let slot = self.constant_slot(value);
        self.emit(Instruction::Const(slot));
        self.push_stack(1);
    }

    /// Emit a jump with a placeholder target; [`Compiler::patch_jump`]
    /// later points it at the then-current end of the instruction list.
    fn jump_placeholder(&mut self, make: fn(u32) -> Instruction) -> usize {
        let at = self.instructions.len();
        self.emit(make(u32::MAX));
        at
    }

    fn patch_jump(&mut self, at: usize) {
        let target = self.instructions.len() as u32;
        if let Some(instruction) = self.instructions.get_mut(at) {
            match instruction {
                Instruction::Jump(t)
                | Instruction::JumpIfFalse(t)
                | Instruction::JumpIfFalseNoPop(t)
                | Instruction::JumpIfTrueNoPop(t) => *t = target,
                _ => {}
            }
        }
    }

    fn push_stack(&mut self, n: usize) {
        self.stack_depth += n;
        self.max_stack = self.max_stack.max(self.stack_depth);
    }

    fn pop_stack(&mut self, n: usize) {
        self.stack_depth = self.stack_depth.saturating_sub(n);
    }

    fn compile_logical(&mut self, op: BinaryOp, left: &Node, right: &Node) {
        self.transform(left);
        let skip = match op {
            BinaryOp::And => self.jump_placeholder(Instruction::JumpIfFalseNoPop),
            _ => self.jump_placeholder(Instruction::JumpIfTrueNoPop),
        };
        self.emit(Instruction::Pop);
        self.pop_stack(1);
        self.transform(right);
        self.emit(Instruction::AssertBool(if op == BinaryOp::And {
            BoolContext::And
        } else {
            BoolContext::Or
        }));
        self.patch_jump(skip);
    }
}

impl Transformer for Compiler {
    type Output = ();

    fn transform(&mut self, node: &Node) {
        match node {
            // A program node below the root cannot occur; compiled for
            // completeness as a statement sequence.
            Node::Program(_) => self.compile_statements(node),
            Node::Number(n) => self.emit_constant(Value::Number(*n)),
            Node::String(s) => self.emit_constant(Value::String(s.clone())),
            Node::Boolean(b) => self.emit_constant(Value::Boolean(*b)),
            Node::Array(elements) => {
                for element in elements {
                    self.transform(element);
                }
                self.emit(Instruction::MakeArray(elements.len() as u32));
                self.pop_stack(elements.len());
                self.push_stack(1);
            }
            Node::Identifier(name) => {
                let slot = self.variable_slot(name);
                self.emit(Instruction::LoadVar(slot));
                self.push_stack(1);
            }
            Node::Binary {
                op: op @ (BinaryOp::And | BinaryOp::Or),
                left,
                right,
            } => self.compile_logical(*op, left, right),
            Node::Binary { op, left, right } => {
                self.transform(left);
                self.transform(right);
                self.emit(Instruction::Binary(*op));
                self.pop_stack(2);
                self.push_stack(1);
            }
            Node::Unary { op, operand } => {
                self.transform(operand);
                self.emit(Instruction::Unary(*op));
            }
            Node::Call { name, args } => {
                let function = self.function_slot(name);
                self.emit(Instruction::CheckFunction(function));
                for arg in args {
                    self.transform(arg);
                }
                self.emit(Instruction::Call {
                    function,
                    argc: args.len() as u32,
                });
                self.pop_stack(args.len());
                self.push_stack(1);
            }
            Node::Assignment { name, value } => {
                let slot = self.variable_slot(name);
                if self.specialized.contains(name.as_str()) {
                    // The slot default already encodes "external value,
                    // else literal"; the assignment reduces to a read.
                    self.emit(Instruction::LoadVar(slot));
                    self.push_stack(1);
                } else {
                    self.transform(value);
                    self.emit(Instruction::Assign(slot));
                }
            }
            Node::Conditional {
                condition,
                consequent,
                alternate,
            } => {
                self.transform(condition);
                let to_else = self.jump_placeholder(Instruction::JumpIfFalse);
                self.pop_stack(1);
                let base = self.stack_depth;
                self.transform(consequent);
                let to_end = self.jump_placeholder(Instruction::Jump);
                self.patch_jump(to_else);
                // Both branches grow the stack from the same base.
                self.stack_depth = base;
                self.transform(alternate);
                self.patch_jump(to_end);
            }
            Node::Index { object, index } => {
                self.transform(object);
                self.transform(index);
                self.emit(Instruction::Index);
                self.pop_stack(2);
                self.push_stack(1);
            }
            Node::Range {
                start,
                end,
                inclusive,
            } => {
                self.transform(start);
                self.transform(end);
                self.emit(Instruction::MakeRange {
                    inclusive: *inclusive,
                });
                self.pop_stack(2);
                self.push_stack(1);
            }
        }
    }
}
