//! The operator catalog.

use std::fmt;
use std::str::FromStr;

use crate::error::JitError;

/// A binary operator on 32-bit signed integers.
///
/// The catalog is closed: every operator maps to exactly one native
/// instruction in [`emit_scalar_op`](crate::jit::emit_scalar_op).
///
/// # Arithmetic hazards
///
/// `Plus`, `Minus` and `Multiply` wrap on overflow. `Divide` traps when the
/// divisor is zero or on `i32::MIN / -1`; `Modular` traps when the divisor is
/// zero. A trap in compiled code terminates the process. Avoiding these
/// inputs is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modular,
}

impl Operator {
    /// Every operator, in catalog order.
    pub const ALL: [Operator; 5] = [
        Operator::Plus,
        Operator::Minus,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modular,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modular => "%",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Plus => "plus",
            Operator::Minus => "minus",
            Operator::Multiply => "multiply",
            Operator::Divide => "divide",
            Operator::Modular => "modular",
        }
    }

    /// Scalar semantics of the operator as executed by compiled code.
    ///
    /// Returns `None` for inputs on which the native instruction traps.
    pub fn apply(self, lhs: i32, rhs: i32) -> Option<i32> {
        match self {
            Operator::Plus => Some(lhs.wrapping_add(rhs)),
            Operator::Minus => Some(lhs.wrapping_sub(rhs)),
            Operator::Multiply => Some(lhs.wrapping_mul(rhs)),
            Operator::Divide => lhs.checked_div(rhs),
            // srem defines i32::MIN % -1 as 0; only a zero divisor traps.
            Operator::Modular => (rhs != 0).then(|| lhs.wrapping_rem(rhs)),
        }
    }

    /// Returns `true` if some inputs make the native instruction trap.
    pub fn can_trap(self) -> bool {
        matches!(self, Operator::Divide | Operator::Modular)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = JitError;

    /// Parses a catalog name (case-insensitive) or symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == trimmed || op.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| JitError::UnsupportedOperator(s.to_string()))
    }
}

impl TryFrom<u32> for Operator {
    type Error = JitError;

    /// Converts a catalog index (`0..=4`).
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Operator::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| JitError::UnsupportedOperator(code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_symbols() {
        assert_eq!("plus".parse::<Operator>().unwrap(), Operator::Plus);
        assert_eq!("MULTIPLY".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!(" % ".parse::<Operator>().unwrap(), Operator::Modular);
        assert_eq!("/".parse::<Operator>().unwrap(), Operator::Divide);
        for op in Operator::ALL {
            assert_eq!(op.to_string().parse::<Operator>().unwrap(), op);
        }
    }

    #[test]
    fn test_parse_unsupported() {
        for bad in ["pow", "^", "", "<<"] {
            let err = bad.parse::<Operator>().unwrap_err();
            assert!(matches!(err, JitError::UnsupportedOperator(ref s) if s == bad));
        }
    }

    #[test]
    fn test_try_from_code() {
        assert_eq!(Operator::try_from(0).unwrap(), Operator::Plus);
        assert_eq!(Operator::try_from(4).unwrap(), Operator::Modular);
        assert!(matches!(
            Operator::try_from(5),
            Err(JitError::UnsupportedOperator(_))
        ));
    }

    #[test]
    fn test_apply_wraps() {
        assert_eq!(Operator::Plus.apply(i32::MAX, 1), Some(i32::MIN));
        assert_eq!(Operator::Minus.apply(i32::MIN, 1), Some(i32::MAX));
        assert_eq!(Operator::Multiply.apply(i32::MAX, 2), Some(-2));
    }

    #[test]
    fn test_apply_signed_division() {
        assert_eq!(Operator::Divide.apply(-7, 2), Some(-3));
        assert_eq!(Operator::Modular.apply(-7, 2), Some(-1));
        assert_eq!(Operator::Modular.apply(i32::MIN, -1), Some(0));
    }

    #[test]
    fn test_division_hazard_is_reported_not_computed() {
        assert_eq!(Operator::Divide.apply(5, 0), None);
        assert_eq!(Operator::Divide.apply(i32::MIN, -1), None);
        assert_eq!(Operator::Modular.apply(5, 0), None);
        assert!(Operator::Divide.can_trap());
        assert!(Operator::Modular.can_trap());
        assert!(!Operator::Plus.can_trap());
    }
}
