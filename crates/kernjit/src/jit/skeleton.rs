//! Counted loop construction.
//!
//! The skeleton lays out four blocks around a caller-supplied body:
//!
//! ```text
//! init:  index = 0                      ; jump cond
//! cond:  brif index < size, body, exit  ; signed, strict
//! body:  out[index] = <body>(index)     ; index += 1 ; jump cond
//! exit:  return
//! ```
//!
//! The bound is strict: a kernel of size `n` touches elements `0..n` only, and
//! a zero or negative size runs no iterations.

use cranelift_codegen::ir::condcodes::IntCC;
use cranelift_codegen::ir::types::I32;
use cranelift_codegen::ir::{InstBuilder, MemFlags, Type, Value};
use cranelift_frontend::{FunctionBuilder, Variable};

/// Size in bytes of one `i32` element.
const ELEMENT_BYTES: i64 = 4;

/// Address offset of the current loop element.
///
/// Computed once per iteration and shared by every load and the final store.
pub struct Element {
    offset: Value,
}

impl Element {
    fn at(builder: &mut FunctionBuilder, ptr_type: Type, index: Value) -> Self {
        let wide = if ptr_type.bits() > I32.bits() {
            builder.ins().sextend(ptr_type, index)
        } else {
            index
        };
        let offset = builder.ins().imul_imm(wide, ELEMENT_BYTES);
        Self { offset }
    }

    /// Loads `base[index]`.
    pub fn load(&self, builder: &mut FunctionBuilder, base: Value) -> Value {
        let addr = builder.ins().iadd(base, self.offset);
        builder.ins().load(I32, MemFlags::trusted(), addr, 0)
    }

    /// Stores `value` into `base[index]`.
    pub fn store(&self, builder: &mut FunctionBuilder, base: Value, value: Value) {
        let addr = builder.ins().iadd(base, self.offset);
        builder.ins().store(MemFlags::trusted(), value, addr, 0);
    }
}

/// Builder for the `for index in 0..size` loop of a kernel.
pub struct LoopSkeleton {
    index: Variable,
    ptr_type: Type,
}

impl LoopSkeleton {
    /// `index` must not be declared elsewhere in the function.
    pub fn new(index: Variable, ptr_type: Type) -> Self {
        Self { index, ptr_type }
    }

    /// Emits the loop starting in the builder's current block, which becomes
    /// the init block. `body` runs with the insertion point inside the loop
    /// body and returns the value stored to `out[index]`.
    ///
    /// On return the function is terminated; nothing may be emitted after.
    pub fn build<F>(self, builder: &mut FunctionBuilder, size: Value, out: Value, body: F)
    where
        F: FnOnce(&mut FunctionBuilder, &Element) -> Value,
    {
        let cond_block = builder.create_block();
        let body_block = builder.create_block();
        let exit_block = builder.create_block();

        // init
        builder.declare_var(self.index, I32);
        let zero = builder.ins().iconst(I32, 0);
        builder.def_var(self.index, zero);
        builder.ins().jump(cond_block, &[]);

        // cond
        builder.switch_to_block(cond_block);
        let index = builder.use_var(self.index);
        let in_bounds = builder.ins().icmp(IntCC::SignedLessThan, index, size);
        builder
            .ins()
            .brif(in_bounds, body_block, &[], exit_block, &[]);
        builder.seal_block(body_block);
        builder.seal_block(exit_block);

        // body
        builder.switch_to_block(body_block);
        let index = builder.use_var(self.index);
        let element = Element::at(builder, self.ptr_type, index);
        let value = body(builder, &element);
        element.store(builder, out, value);
        let next = builder.ins().iadd_imm(index, 1);
        builder.def_var(self.index, next);
        builder.ins().jump(cond_block, &[]);
        // Both predecessors (init, body) are now known.
        builder.seal_block(cond_block);

        // exit
        builder.switch_to_block(exit_block);
        builder.ins().return_(&[]);
    }
}
