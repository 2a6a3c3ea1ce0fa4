//! Symbol naming for compiled kernels.

use kernjit_config::DEFAULT_SYMBOL_PREFIX;

/// Monotonic generator of `<prefix>_<n>` symbol names.
///
/// Each [`CodeUnit`](crate::jit::CodeUnit) owns one generator, so two units
/// built from the same configuration produce the same sequence. A name is
/// never handed out twice by the same generator, including names discarded
/// by a failed compile.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    prefix: String,
    next: u64,
}

impl NameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Returns a fresh name and advances the counter.
    pub fn next_name(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("{}_{}", self.prefix, n)
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u64 {
        self.next
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL_PREFIX)
    }
}
