//! JIT compilation of fused three-array kernels to native code via Cranelift.
//!
//! A kernel computes `out[i] = op2(op1(a[i], b[i]), c[i])` for `0 <= i < size`,
//! where `op1` and `op2` come from the [`Operator`](crate::Operator) catalog.
//!
//! # Kernel Signature
//!
//! ```text
//! extern "C" fn(size: i32, a: *const i32, b: *const i32, c: *const i32, out: *mut i32)
//! ```
//!
//! # Pipeline
//!
//! - [`CodeUnit::compile`] emits one kernel per call into the unit
//! - [`CodeUnit::finalize`] links the unit into an [`ExecutionSession`]
//! - [`ExecutionSession::resolve`] returns a [`KernelFn`] borrowing the session


mod assembler;
mod emit;
mod engine;
mod skeleton;

pub use assembler::{CodeUnit, KernelHandle};
pub use emit::emit_scalar_op;
pub use engine::{ExecutionSession, KernelFn, RawKernel};
pub use skeleton::{Element, LoopSkeleton};
