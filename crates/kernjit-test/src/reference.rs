//! Scalar reference evaluation.

/// Computes `op2(op1(a[i], b[i]), c[i])` for every index of `a`.
///
/// # Panics
///
/// Panics if `b` or `c` is shorter than `a`.
pub fn fused_reference<F, G>(a: &[i32], b: &[i32], c: &[i32], op1: F, op2: G) -> Vec<i32>
where
    F: Fn(i32, i32) -> i32,
    G: Fn(i32, i32) -> i32,
{
    assert!(b.len() >= a.len() && c.len() >= a.len());
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((&x, &y), &z)| op2(op1(x, y), z))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply_then_plus() {
        let out = fused_reference(
            &[1, 2, 3, 4, 5],
            &[10; 5],
            &[1; 5],
            i32::wrapping_mul,
            i32::wrapping_add,
        );
        assert_eq!(out, vec![11, 21, 31, 41, 51]);
    }

    #[test]
    fn test_empty() {
        let out = fused_reference(&[], &[], &[], i32::wrapping_add, i32::wrapping_sub);
        assert!(out.is_empty());
    }
}
