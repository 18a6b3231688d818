// verify.rs — host-side correctness check of the device result.
//
// Comparison is exact floating-point equality, not an epsilon: a single
// f32 addition has one correctly-rounded result, so the device output
// must be bit-equal to the host sum computed from the same inputs.

use crate::error::BenchError;

/// Check that every `c[i]` equals `a[i] + b[i]` exactly.
///
/// Stops at the first mismatch and reports its index together with the
/// three values involved.
///
/// # Panics
/// Panics if the slice lengths differ — the equal-length invariant is a
/// caller bug.
pub fn verify_sum(a: &[f32], b: &[f32], c: &[f32]) -> Result<(), BenchError> {
    assert!(
        a.len() == b.len() && b.len() == c.len(),
        "buffer lengths differ: a = {}, b = {}, c = {}",
        a.len(),
        b.len(),
        c.len()
    );

    for i in 0..c.len() {
        if c[i] != a[i] + b[i] {
            return Err(BenchError::Mismatch {
                index: i,
                got: c[i],
                lhs: a[i],
                rhs: b[i],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_nines() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = [8.0f32, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let c = [9.0f32; 8];
        assert!(verify_sum(&a, &b, &c).is_ok());
    }

    #[test]
    fn test_corrupted_element_is_reported() {
        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = [8.0f32, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let mut c = [9.0f32; 8];
        c[5] = 9.5;
        match verify_sum(&a, &b, &c) {
            Err(BenchError::Mismatch { index, got, lhs, rhs }) => {
                assert_eq!(index, 5);
                assert_eq!(got, 9.5);
                assert_eq!(lhs, 6.0);
                assert_eq!(rhs, 3.0);
            }
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_first_mismatch_wins() {
        let a = [0.5f32; 4];
        let b = [0.25f32; 4];
        let c = [0.0f32; 4];
        match verify_sum(&a, &b, &c) {
            Err(BenchError::Mismatch { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_equality_is_exact() {
        // One ulp off must fail: no tolerance is applied.
        let a = [0.1f32];
        let b = [0.2f32];
        let exact = [0.1f32 + 0.2f32];
        assert!(verify_sum(&a, &b, &exact).is_ok());

        let off = [f32::from_bits(exact[0].to_bits() + 1)];
        assert!(verify_sum(&a, &b, &off).is_err());
    }

    #[test]
    fn test_empty_buffers_pass() {
        assert!(verify_sum(&[], &[], &[]).is_ok());
    }
}
