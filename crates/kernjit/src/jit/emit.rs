//! Operator-to-instruction mapping.

use cranelift_codegen::ir::{InstBuilder, Value};
use cranelift_frontend::FunctionBuilder;

use crate::operator::Operator;

/// Emits the instruction realizing `op` on two `i32` values at the current
/// insertion point and returns the result.
///
/// Straight-line only: no blocks are created and control flow is untouched.
/// `sdiv` traps on a zero divisor and on `i32::MIN / -1`; `srem` traps on a
/// zero divisor.
pub fn emit_scalar_op(
    builder: &mut FunctionBuilder,
    op: Operator,
    lhs: Value,
    rhs: Value,
) -> Value {
    let ins = builder.ins();
    match op {
        Operator::Plus => ins.iadd(lhs, rhs),
        Operator::Minus => ins.isub(lhs, rhs),
        Operator::Multiply => ins.imul(lhs, rhs),
        Operator::Divide => ins.sdiv(lhs, rhs),
        Operator::Modular => ins.srem(lhs, rhs),
    }
}
