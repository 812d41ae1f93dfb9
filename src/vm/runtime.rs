//! The execution loop.

use ecow::EcoVec;
use smallvec::SmallVec;

use crate::api::ExecutionContext;
use crate::evaluator::{operators, RuntimeError};
use crate::values::Value;
use crate::vm::code::{Code, Instruction};

/// Execute a compiled program against a context.
///
/// Slot initialization realizes the external-override and
/// literal-default rules: a context value wins over a slot default, and
/// `Assign` on an external slot discards the computed value in favor of
/// the host's.
pub fn run(code: &Code, ctx: &ExecutionContext) -> Result<Value, RuntimeError> {
    let mut slots: Vec<Option<Value>> = Vec::with_capacity(code.variables.len());
    let mut external: Vec<bool> = Vec::with_capacity(code.variables.len());
    for spec in &code.variables {
        match ctx.variable(&spec.name) {
            Some(value) => {
                slots.push(Some(value.clone()));
                external.push(true);
            }
            None => {
                slots.push(spec.default.clone());
                external.push(false);
            }
        }
    }

    let mut stack: Vec<Value> = Vec::with_capacity(code.max_stack);
    let mut pc = 0usize;

    while let Some(instruction) = code.instructions.get(pc) {
        pc += 1;
        match instruction {
            Instruction::Const(i) => {
                let value = code
                    .constants
                    .get(*i as usize)
                    .ok_or_else(|| internal("constant index out of range"))?;
                stack.push(value.clone());
            }
            Instruction::LoadVar(i) => {
                let (slot, spec) = slot_pair(&slots, code, *i)?;
                match slot {
                    Some(value) => stack.push(value.clone()),
                    None => {
                        return Err(RuntimeError::undefined_variable(spec.name.clone()));
                    }
                }
            }
            Instruction::Assign(i) => {
                let computed = pop(&mut stack)?;
                let index = *i as usize;
                if *external.get(index).unwrap_or(&false) {
                    let (slot, _) = slot_pair(&slots, code, *i)?;
                    let Some(host_value) = slot else {
                        return Err(internal("external slot left uninitialized"));
                    };
                    stack.push(host_value.clone());
                } else {
                    let Some(slot) = slots.get_mut(index) else {
                        return Err(internal("variable slot out of range"));
                    };
                    *slot = Some(computed.clone());
                    stack.push(computed);
                }
            }
            Instruction::Pop => {
                pop(&mut stack)?;
            }
            Instruction::Jump(target) => pc = *target as usize,
            Instruction::JumpIfFalse(target) => {
                let condition = pop(&mut stack)?;
                if !operators::boolean_operand(&condition, "a condition")? {
                    pc = *target as usize;
                }
            }
            Instruction::JumpIfFalseNoPop(target) => {
                if !operators::boolean_operand(peek(&stack)?, "'&&'")? {
                    pc = *target as usize;
                }
            }
            Instruction::JumpIfTrueNoPop(target) => {
                if operators::boolean_operand(peek(&stack)?, "'||'")? {
                    pc = *target as usize;
                }
            }
            Instruction::AssertBool(context) => {
                operators::boolean_operand(peek(&stack)?, context.role())?;
            }
            Instruction::Binary(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(operators::binary(*op, &left, &right)?);
            }
            Instruction::Unary(op) => {
                let operand = pop(&mut stack)?;
                stack.push(operators::unary(*op, &operand)?);
            }
            Instruction::MakeArray(n) => {
                let base = stack
                    .len()
                    .checked_sub(*n as usize)
                    .ok_or_else(|| internal("array elements missing from stack"))?;
                let elements: EcoVec<Value> = stack.drain(base..).collect();
                operators::check_homogeneous(elements.as_slice())?;
                stack.push(Value::Array(elements));
            }
            Instruction::MakeRange { inclusive } => {
                let end = pop(&mut stack)?;
                let start = pop(&mut stack)?;
                stack.push(operators::make_range(&start, &end, *inclusive)?);
            }
            Instruction::Index => {
                let index = pop(&mut stack)?;
                let object = pop(&mut stack)?;
                stack.push(operators::index(&object, &index)?);
            }
            Instruction::CheckFunction(i) => {
                let name = function_name(code, *i)?;
                if ctx.function(name).is_none() {
                    return Err(RuntimeError::undefined_function(name.clone()));
                }
            }
            Instruction::Call { function, argc } => {
                let name = function_name(code, *function)?;
                let Some(callable) = ctx.function(name).cloned() else {
                    return Err(RuntimeError::undefined_function(name.clone()));
                };
                let base = stack
                    .len()
                    .checked_sub(*argc as usize)
                    .ok_or_else(|| internal("call arguments missing from stack"))?;
                let args: SmallVec<[Value; 4]> = stack.drain(base..).collect();
                stack.push(callable.call(&args)?);
            }
            Instruction::Return => break,
        }
    }

    pop(&mut stack)
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, RuntimeError> {
    stack
        .pop()
        .ok_or_else(|| internal("value stack underflow"))
}

fn peek(stack: &[Value]) -> Result<&Value, RuntimeError> {
    stack
        .last()
        .ok_or_else(|| internal("value stack underflow"))
}

fn slot_pair<'a>(
    slots: &'a [Option<Value>],
    code: &'a Code,
    i: u32,
) -> Result<(&'a Option<Value>, &'a crate::vm::code::VarSpec), RuntimeError> {
    match (slots.get(i as usize), code.variables.get(i as usize)) {
        (Some(slot), Some(spec)) => Ok((slot, spec)),
        _ => Err(internal("variable slot out of range")),
    }
}

fn function_name(code: &Code, i: u32) -> Result<&ecow::EcoString, RuntimeError> {
    code.functions
        .get(i as usize)
        .ok_or_else(|| internal("function index out of range"))
}

fn internal(message: &str) -> RuntimeError {
    RuntimeError::Internal {
        message: message.into(),
    }
}
