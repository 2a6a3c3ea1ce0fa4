//! Runtime compilation of fused integer kernels.
//!
//! Given two operators from a small catalog, kernjit generates native code for
//!
//! ```text
//! for i in 0..size { out[i] = op2(op1(a[i], b[i]), c[i]) }
//! ```
//!
//! links it into executable memory via Cranelift, and hands back a callable
//! kernel. Operator choice happens at runtime without an interpreter in the
//! inner loop.
//!
//! # Example
//!
//! ```
//! use kernjit::{CodeUnit, Operator};
//!
//! let mut unit = CodeUnit::new()?;
//! let fma = unit.compile(Operator::Multiply, Operator::Plus)?;
//! let session = unit.finalize()?;
//! let kernel = session.kernel(&fma)?;
//!
//! let mut out = [0; 5];
//! kernel.call(&[1, 2, 3, 4, 5], &[10; 5], &[1; 5], &mut out)?;
//! assert_eq!(out, [11, 21, 31, 41, 51]);
//! # Ok::<(), kernjit::JitError>(())
//! ```
//!
//! # Hazards
//!
//! - Division and remainder by zero, and `i32::MIN / -1`, trap inside the
//!   generated code and terminate the process. They are never reported as
//!   [`JitError`]s.
//! - [`KernelFn::call_raw`] and [`RawKernel`] do not check buffer lengths.
//! - Kernels never outlive their [`ExecutionSession`]; a pointer taken out via
//!   [`KernelFn::as_raw`] is dangling once the session is dropped.

#[cfg(feature = "console")]
pub mod console;
mod error;
pub mod jit;
mod naming;
mod operator;

pub use error::{JitError, Result};
pub use jit::{CodeUnit, ExecutionSession, KernelFn, KernelHandle, RawKernel};
pub use kernjit_config::{JitConfig, OptLevel};
pub use naming::NameGenerator;
pub use operator::Operator;
