//! Linking and symbol resolution.

use std::collections::HashMap;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use cranelift_jit::JITModule;
use tracing::{info, trace};

use super::assembler::{CodeUnit, KernelHandle};
use crate::error::{JitError, Result};

/// Native kernel entry point.
///
/// `size` elements are read from `a`, `b` and `c` and written to `out`. Each
/// pointer must be valid for `size` elements; nothing is checked.
pub type RawKernel = unsafe extern "C" fn(i32, *const i32, *const i32, *const i32, *mut i32);

/// Owns a `JITModule` and releases its code memory on drop.
///
/// `JITModule` alone leaks its allocations so that stray function pointers
/// stay valid; here every pointer handed out borrows the owner, so freeing
/// on drop is sound.
pub(crate) struct CodeMemory {
    module: ManuallyDrop<JITModule>,
}

impl CodeMemory {
    pub(crate) fn new(module: JITModule) -> Self {
        Self {
            module: ManuallyDrop::new(module),
        }
    }
}

impl Deref for CodeMemory {
    type Target = JITModule;

    fn deref(&self) -> &JITModule {
        &self.module
    }
}

impl DerefMut for CodeMemory {
    fn deref_mut(&mut self) -> &mut JITModule {
        &mut self.module
    }
}

impl Drop for CodeMemory {
    fn drop(&mut self) {
        // SAFETY: `module` is not used after this point, and no pointer into
        // its memory outlives the `CodeUnit` or `ExecutionSession` owning it.
        unsafe {
            let module = ManuallyDrop::take(&mut self.module);
            module.free_memory();
        }
    }
}

struct LinkedKernel {
    handle: KernelHandle,
    ir: Option<String>,
    ptr: *const u8,
}

/// Executable code of a finalized [`CodeUnit`].
///
/// Kernels resolved from a session borrow it; dropping the session frees the
/// code. Calling a pointer obtained through [`KernelFn::as_raw`] after that
/// is undefined behavior.
pub struct ExecutionSession {
    unit_id: u64,
    kernels: Vec<LinkedKernel>,
    by_name: HashMap<String, usize>,
    _memory: CodeMemory,
}

// SAFETY: the code memory is immutable once finalized, and generated kernels
// keep no state between calls.
unsafe impl Send for ExecutionSession {}
unsafe impl Sync for ExecutionSession {}

impl ExecutionSession {
    pub(crate) fn link(unit: CodeUnit) -> Result<Self> {
        let CodeUnit {
            id: unit_id,
            mut memory,
            kernels,
            ..
        } = unit;

        memory
            .finalize_definitions()
            .map_err(|e| JitError::Codegen(format!("finalize_definitions: {e}")))?;

        let kernels: Vec<LinkedKernel> = kernels
            .into_iter()
            .map(|k| LinkedKernel {
                ptr: memory.get_finalized_function(k.handle.func_id),
                handle: k.handle,
                ir: k.ir,
            })
            .collect();
        let by_name = kernels
            .iter()
            .enumerate()
            .map(|(idx, k)| (k.handle.name().to_string(), idx))
            .collect();

        info!(event = "unit_finalized", kernel_count = kernels.len());

        Ok(Self {
            unit_id,
            kernels,
            by_name,
            _memory: memory,
        })
    }

    /// Resolves the kernel exported as `name`.
    pub fn resolve(&self, name: &str) -> Result<KernelFn<'_>> {
        let kernel = self
            .by_name
            .get(name)
            .map(|&idx| &self.kernels[idx])
            .ok_or_else(|| JitError::SymbolNotFound(name.to_string()))?;
        trace!(event = "symbol_resolved", name = name);

        // SAFETY: the function was defined with the `RawKernel` signature in
        // the host's default (C) calling convention.
        let raw = unsafe { std::mem::transmute::<*const u8, RawKernel>(kernel.ptr) };
        Ok(KernelFn {
            handle: &kernel.handle,
            raw,
        })
    }

    /// Resolves the kernel behind `handle`.
    ///
    /// Fails with [`JitError::SymbolNotFound`] if `handle` was compiled by a
    /// different [`CodeUnit`], even when this session exports the same name.
    pub fn kernel(&self, handle: &KernelHandle) -> Result<KernelFn<'_>> {
        if handle.unit_id != self.unit_id {
            return Err(JitError::SymbolNotFound(handle.name().to_string()));
        }
        self.resolve(handle.name())
    }

    /// Exported symbol names in compile order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.kernels.iter().map(|k| k.handle.name())
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Textual IR captured at compile time, if enabled.
    pub fn ir(&self, name: &str) -> Option<&str> {
        self.by_name
            .get(name)
            .and_then(|&idx| self.kernels[idx].ir.as_deref())
    }
}

/// A callable kernel borrowed from its [`ExecutionSession`].
///
/// # Aborts
///
/// Kernels using [`Operator::Divide`](crate::Operator::Divide) or
/// [`Operator::Modular`](crate::Operator::Modular) trap on a zero divisor
/// (and `Divide` on `i32::MIN / -1`). The trap terminates the process; it is
/// not reported as an error.
#[derive(Clone, Copy)]
pub struct KernelFn<'s> {
    handle: &'s KernelHandle,
    raw: RawKernel,
}

impl<'s> KernelFn<'s> {
    pub fn name(&self) -> &'s str {
        self.handle.name()
    }

    pub fn handle(&self) -> &'s KernelHandle {
        self.handle
    }

    /// Runs the kernel over `out.len()` elements.
    ///
    /// Fails with [`JitError::BufferTooShort`] if an input is shorter than
    /// `out`, or [`JitError::SizeOverflow`] if `out.len()` exceeds `i32::MAX`.
    pub fn call(&self, a: &[i32], b: &[i32], c: &[i32], out: &mut [i32]) -> Result<()> {
        let size = i32::try_from(out.len()).map_err(|_| JitError::SizeOverflow(out.len()))?;
        for (buffer, len) in [("a", a.len()), ("b", b.len()), ("c", c.len())] {
            if len < out.len() {
                return Err(JitError::BufferTooShort {
                    buffer,
                    len,
                    size: out.len(),
                });
            }
        }
        // SAFETY: every buffer holds at least `size` elements.
        unsafe { (self.raw)(size, a.as_ptr(), b.as_ptr(), c.as_ptr(), out.as_mut_ptr()) };
        Ok(())
    }

    /// Runs the kernel on raw pointers.
    ///
    /// # Safety
    ///
    /// For `size > 0`, `a`, `b` and `c` must be readable and `out` writable
    /// for `size` consecutive `i32`s, and `out` must not be aliased by a
    /// concurrent caller. A `size <= 0` touches no memory.
    pub unsafe fn call_raw(
        &self,
        size: i32,
        a: *const i32,
        b: *const i32,
        c: *const i32,
        out: *mut i32,
    ) {
        (self.raw)(size, a, b, c, out)
    }

    /// The native entry point.
    ///
    /// The pointer is valid only while the owning session is alive.
    pub fn as_raw(&self) -> RawKernel {
        self.raw
    }
}

impl std::fmt::Debug for KernelFn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelFn")
            .field("name", &self.handle.name())
            .field("op1", &self.handle.op1())
            .field("op2", &self.handle.op2())
            .finish()
    }
}
