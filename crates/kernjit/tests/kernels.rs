//! End-to-end coverage of the full operator catalog.

use kernjit::{CodeUnit, ExecutionSession, JitError, KernelHandle, Operator};
use kernjit_test::{fused_reference, GuardedBuffer, VectorGen};

const SIZES: [usize; 5] = [0, 1, 5, 16, 257];

fn compile_all_pairs() -> (ExecutionSession, Vec<KernelHandle>) {
    let mut unit = CodeUnit::new().unwrap();
    let mut handles = Vec::new();
    for op1 in Operator::ALL {
        for op2 in Operator::ALL {
            handles.push(unit.compile(op1, op2).unwrap());
        }
    }
    (unit.finalize().unwrap(), handles)
}

/// Inputs on which neither operator traps.
fn inputs(op1: Operator, op2: Operator, n: usize, seed: u64) -> [Vec<i32>; 3] {
    let mut gen = VectorGen::seeded(seed);
    let a = if op1.can_trap() || op2.can_trap() {
        gen.values(n, -10_000..=10_000)
    } else {
        gen.full_range(n)
    };
    let b = if op1.can_trap() {
        gen.divisors(n, -50..=50)
    } else {
        gen.full_range(n)
    };
    let c = if op2.can_trap() {
        gen.divisors(n, -50..=50)
    } else {
        gen.full_range(n)
    };
    [a, b, c]
}

#[test]
fn all_25_pairs_compile_into_distinct_symbols() {
    let (session, handles) = compile_all_pairs();
    assert_eq!(handles.len(), 25);
    assert_eq!(session.len(), 25);

    let mut names: Vec<&str> = session.symbols().collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 25);
}

#[test]
fn all_25_pairs_match_reference() {
    let (session, handles) = compile_all_pairs();
    for (seed, handle) in handles.iter().enumerate() {
        let (op1, op2) = (handle.op1(), handle.op2());
        let kernel = session.kernel(handle).unwrap();
        for n in SIZES {
            let [a, b, c] = inputs(op1, op2, n, seed as u64 * 1000 + n as u64);
            let expected = fused_reference(
                &a,
                &b,
                &c,
                |x, y| op1.apply(x, y).unwrap(),
                |x, y| op2.apply(x, y).unwrap(),
            );

            let mut out = vec![0; n];
            kernel.call(&a, &b, &c, &mut out).unwrap();
            assert_eq!(out, expected, "({op1}, {op2}) size {n}");
        }
    }
}

#[test]
fn all_25_pairs_stay_within_bounds() {
    let (session, handles) = compile_all_pairs();
    for handle in &handles {
        let (op1, op2) = (handle.op1(), handle.op2());
        let kernel = session.kernel(handle).unwrap();
        for n in SIZES {
            let [a, b, c] = inputs(op1, op2, n, 7);
            let (a, b, c) = (
                GuardedBuffer::from_slice(&a),
                GuardedBuffer::from_slice(&b),
                GuardedBuffer::from_slice(&c),
            );
            let mut out = GuardedBuffer::filled(n, 0x0BAD);
            unsafe {
                kernel.call_raw(
                    n as i32,
                    a.as_ptr(),
                    b.as_ptr(),
                    c.as_ptr(),
                    out.as_mut_ptr(),
                )
            };
            assert!(out.guards_intact(), "({op1}, {op2}) wrote past size {n}");
            assert!(a.guards_intact() && b.guards_intact() && c.guards_intact());
            let expected = fused_reference(
                a.as_slice(),
                b.as_slice(),
                c.as_slice(),
                |x, y| op1.apply(x, y).unwrap(),
                |x, y| op2.apply(x, y).unwrap(),
            );
            assert_eq!(out.as_slice(), expected.as_slice());
        }
    }
}

#[test]
fn multiply_then_plus_scenario() {
    let mut unit = CodeUnit::new().unwrap();
    let handle = unit.compile(Operator::Multiply, Operator::Plus).unwrap();
    let session = unit.finalize().unwrap();

    let mut out = [0; 5];
    session
        .kernel(&handle)
        .unwrap()
        .call(&[1, 2, 3, 4, 5], &[10; 5], &[1; 5], &mut out)
        .unwrap();
    assert_eq!(out, [11, 21, 31, 41, 51]);
}

#[test]
fn separate_units_for_more_kernels() {
    let mut first = CodeUnit::new().unwrap();
    let add = first.compile(Operator::Plus, Operator::Plus).unwrap();
    let first = first.finalize().unwrap();

    let mut second = CodeUnit::new().unwrap();
    let sub = second.compile(Operator::Minus, Operator::Minus).unwrap();
    let second = second.finalize().unwrap();

    let mut out = [0; 1];
    first.kernel(&add).unwrap().call(&[5], &[3], &[1], &mut out).unwrap();
    assert_eq!(out, [9]);
    second.kernel(&sub).unwrap().call(&[5], &[3], &[1], &mut out).unwrap();
    assert_eq!(out, [1]);

    // Sessions are independent: dropping one leaves the other callable.
    drop(first);
    second.kernel(&sub).unwrap().call(&[9], &[3], &[1], &mut out).unwrap();
    assert_eq!(out, [5]);
}

#[test]
fn handle_from_another_unit_does_not_resolve() {
    let mut adds = CodeUnit::new().unwrap();
    let add = adds.compile(Operator::Plus, Operator::Plus).unwrap();
    let adds = adds.finalize().unwrap();

    let mut muls = CodeUnit::new().unwrap();
    let mul = muls.compile(Operator::Multiply, Operator::Multiply).unwrap();
    let muls = muls.finalize().unwrap();

    // Both units name their first kernel identically.
    assert_eq!(add.name(), mul.name());
    assert!(matches!(
        adds.kernel(&mul),
        Err(JitError::SymbolNotFound(ref s)) if s == mul.name()
    ));
    assert!(matches!(muls.kernel(&add), Err(JitError::SymbolNotFound(_))));

    let mut out = [0; 1];
    muls.kernel(&mul).unwrap().call(&[2], &[3], &[4], &mut out).unwrap();
    assert_eq!(out, [24]);
    adds.kernel(&add).unwrap().call(&[2], &[3], &[4], &mut out).unwrap();
    assert_eq!(out, [9]);
}
