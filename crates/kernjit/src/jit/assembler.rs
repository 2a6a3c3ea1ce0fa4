//! Kernel assembly: one code unit, many kernels.

use std::sync::atomic::{AtomicU64, Ordering};

use cranelift_codegen::ir::types::I32;
use cranelift_codegen::ir::{AbiParam, Function, Signature, Type, UserFuncName};
use cranelift_codegen::settings::{self, Configurable};
use cranelift_codegen::Context;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext, Variable};
use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId, Linkage, Module, ModuleError};
use tracing::{debug, warn};

use kernjit_config::JitConfig;

use super::emit::emit_scalar_op;
use super::engine::{CodeMemory, ExecutionSession};
use super::skeleton::LoopSkeleton;
use crate::error::{JitError, Result};
use crate::naming::NameGenerator;
use crate::operator::Operator;

/// A compiled kernel inside a [`CodeUnit`].
///
/// The handle is only a name and its operator pair; executable code is
/// obtained from the [`ExecutionSession`] the unit is finalized into. A handle
/// resolves only in the session of the unit that compiled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelHandle {
    name: String,
    op1: Operator,
    op2: Operator,
    pub(crate) func_id: FuncId,
    pub(crate) unit_id: u64,
}

impl KernelHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op1(&self) -> Operator {
        self.op1
    }

    pub fn op2(&self) -> Operator {
        self.op2
    }
}

/// Source of process-unique [`CodeUnit`] ids.
static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) struct CompiledKernel {
    pub(crate) handle: KernelHandle,
    pub(crate) ir: Option<String>,
}

/// An in-memory, not yet executable collection of kernels.
///
/// Compiling requires `&mut self`, so one unit is never compiled into from
/// two threads at once. [`finalize`](Self::finalize) consumes the unit; adding
/// kernels afterwards does not type-check.
pub struct CodeUnit {
    pub(crate) id: u64,
    pub(crate) memory: CodeMemory,
    pub(crate) kernels: Vec<CompiledKernel>,
    names: NameGenerator,
    builder_ctx: FunctionBuilderContext,
    capture_ir: bool,
}

impl CodeUnit {
    /// Creates a unit for the host ISA with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&JitConfig::default())
    }

    /// Creates a unit for the host ISA.
    pub fn with_config(config: &JitConfig) -> Result<Self> {
        Self::with_names(config, NameGenerator::new(config.symbol_prefix.clone()))
    }

    /// Creates a unit that draws symbol names from `names` instead of the
    /// configured prefix.
    ///
    /// Both the configured prefix and the prefix of `names` must be
    /// identifiers; see [`JitConfig::validate`].
    pub fn with_names(config: &JitConfig, names: NameGenerator) -> Result<Self> {
        config.validate()?;
        config
            .clone()
            .with_symbol_prefix(names.prefix())
            .validate()?;
        Ok(Self {
            id: NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed),
            memory: CodeMemory::new(make_jit_module(config)?),
            kernels: Vec::new(),
            names,
            builder_ctx: FunctionBuilderContext::new(),
            capture_ir: config.capture_ir,
        })
    }

    /// Compiles `out[i] = op2(op1(a[i], b[i]), c[i])` under a fresh name.
    ///
    /// The name is taken from the unit's generator before code generation; if
    /// compilation fails it is discarded and never reissued.
    pub fn compile(&mut self, op1: Operator, op2: Operator) -> Result<KernelHandle> {
        let name = self.names.next_name();
        self.compile_as(&name, op1, op2)
    }

    /// Like [`compile`](Self::compile), with operators given by name or
    /// symbol (`"multiply"`, `"+"`, ...).
    ///
    /// Fails with [`JitError::UnsupportedOperator`] before any name is taken
    /// or code is emitted.
    pub fn compile_str(&mut self, op1: &str, op2: &str) -> Result<KernelHandle> {
        let op1: Operator = op1.parse()?;
        let op2: Operator = op2.parse()?;
        self.compile(op1, op2)
    }

    /// Compiles a kernel under a caller-chosen symbol name.
    ///
    /// Fails with [`JitError::DuplicateSymbol`] if `name` is already defined
    /// in this unit. Symbol names are scoped to the unit: two units may both
    /// define `name`.
    pub fn compile_as(
        &mut self,
        name: &str,
        op1: Operator,
        op2: Operator,
    ) -> Result<KernelHandle> {
        if self.handle(name).is_some() {
            warn!(event = "duplicate_symbol", name = name);
            return Err(JitError::DuplicateSymbol(name.to_string()));
        }

        let ptr_type = self.memory.target_config().pointer_type();
        let sig = kernel_signature(&self.memory, ptr_type);
        let func_id = self
            .memory
            .declare_function(name, Linkage::Export, &sig)
            .map_err(|e| module_error(name, e))?;

        let mut func =
            Function::with_name_signature(UserFuncName::user(0, func_id.as_u32()), sig);
        {
            let mut builder = FunctionBuilder::new(&mut func, &mut self.builder_ctx);
            emit_kernel(&mut builder, ptr_type, op1, op2);
            builder.finalize();
        }
        let ir = self.capture_ir.then(|| func.display().to_string());

        let mut ctx = Context::for_function(func);
        self.memory
            .define_function(func_id, &mut ctx)
            .map_err(|e| module_error(name, e))?;
        self.memory.clear_context(&mut ctx);

        let handle = KernelHandle {
            name: name.to_string(),
            op1,
            op2,
            func_id,
            unit_id: self.id,
        };
        debug!(
            event = "kernel_compiled",
            name = name,
            op1 = %op1,
            op2 = %op2,
        );
        self.kernels.push(CompiledKernel {
            handle: handle.clone(),
            ir,
        });
        Ok(handle)
    }

    /// Handle of the kernel compiled under `name`, if any.
    pub fn handle(&self, name: &str) -> Option<&KernelHandle> {
        self.kernels
            .iter()
            .map(|k| &k.handle)
            .find(|h| h.name == name)
    }

    /// Kernels in compile order.
    pub fn kernels(&self) -> impl Iterator<Item = &KernelHandle> {
        self.kernels.iter().map(|k| &k.handle)
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Textual Cranelift IR of a kernel, when `capture_ir` is enabled.
    pub fn ir(&self, name: &str) -> Option<&str> {
        self.kernels
            .iter()
            .find(|k| k.handle.name == name)
            .and_then(|k| k.ir.as_deref())
    }

    /// Links every kernel into executable memory.
    ///
    /// Consumes the unit. Further kernels need a new `CodeUnit`.
    pub fn finalize(self) -> Result<ExecutionSession> {
        ExecutionSession::link(self)
    }
}

fn make_jit_module(config: &JitConfig) -> Result<JITModule> {
    let mut flag_builder = settings::builder();
    let flags = [
        ("use_colocated_libcalls", "false"),
        ("is_pic", "false"),
        ("opt_level", config.opt_level.as_setting()),
        (
            "enable_verifier",
            if config.enable_verifier { "true" } else { "false" },
        ),
    ];
    for (flag, value) in flags {
        flag_builder
            .set(flag, value)
            .map_err(|e| JitError::NativeTarget(format!("setting {flag}={value}: {e}")))?;
    }
    let isa_builder = cranelift_native::builder()
        .map_err(|e| JitError::NativeTarget(format!("host ISA: {e}")))?;
    let isa = isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| JitError::NativeTarget(format!("ISA finish: {e}")))?;
    let builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
    Ok(JITModule::new(builder))
}

/// `(i32 size, ptr a, ptr b, ptr c, ptr out) -> ()` in the host C convention.
fn kernel_signature(module: &JITModule, ptr_type: Type) -> Signature {
    let mut sig = module.make_signature();
    sig.params.push(AbiParam::new(I32));
    for _ in 0..4 {
        sig.params.push(AbiParam::new(ptr_type));
    }
    sig
}

/// Emits the full kernel body into an empty function.
fn emit_kernel(builder: &mut FunctionBuilder, ptr_type: Type, op1: Operator, op2: Operator) {
    let entry = builder.create_block();
    builder.append_block_params_for_function_params(entry);
    builder.switch_to_block(entry);
    builder.seal_block(entry);

    let (size, a, b, c, out) = match *builder.block_params(entry) {
        [size, a, b, c, out] => (size, a, b, c, out),
        ref params => unreachable!("kernel signature has 5 params, got {}", params.len()),
    };

    let skeleton = LoopSkeleton::new(Variable::from_u32(0), ptr_type);
    skeleton.build(builder, size, out, |builder, element| {
        let lhs = element.load(builder, a);
        let rhs = element.load(builder, b);
        let partial = emit_scalar_op(builder, op1, lhs, rhs);
        let third = element.load(builder, c);
        emit_scalar_op(builder, op2, partial, third)
    });
}

fn module_error(name: &str, e: ModuleError) -> JitError {
    JitError::Codegen(format!("{name}: {e}"))
}
