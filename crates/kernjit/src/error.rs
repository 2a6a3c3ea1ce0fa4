//! Error types for kernjit

use kernjit_config::ConfigError;
use thiserror::Error;

/// Main error type for kernel compilation, linking and invocation.
///
/// Arithmetic hazards of the generated code (division by zero,
/// `i32::MIN / -1`) are not represented here: they trap at execution time.
#[derive(Debug, Error)]
pub enum JitError {
    /// The requested operator is not part of the catalog
    #[error("unsupported operator: {0:?}")]
    UnsupportedOperator(String),

    /// A symbol was defined twice in one code unit
    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    /// No kernel with this name was compiled into the session
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    /// An input buffer is shorter than the output buffer
    #[error("buffer `{buffer}` has {len} elements but the kernel size is {size}")]
    BufferTooShort {
        buffer: &'static str,
        len: usize,
        size: usize,
    },

    /// The output length does not fit the kernel's `i32` size parameter
    #[error("buffer length {0} exceeds the kernel size range")]
    SizeOverflow(usize),

    /// The host ISA could not be detected or configured
    #[error("native target error: {0}")]
    NativeTarget(String),

    /// Cranelift rejected a function or failed to link the unit
    #[error("codegen error: {0}")]
    Codegen(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for kernjit operations
pub type Result<T> = std::result::Result<T, JitError>;
