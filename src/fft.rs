//! Complex FFT convolution over limb sequences.
//!
//! Coefficients are plain `f64` complex numbers, so the result is exact only
//! while the rounding error of every output coefficient stays below 0.5.
//! With limbs below 10^4 that holds comfortably for the operand sizes this
//! crate dispatches here; `BigInt::FFT_THRESHOLD` keeps tiny operands on the
//! schoolbook path.

use core::f64::consts::PI;

use num_complex::Complex64;

/// Returns the padded transform length for operands of `a_len` and `b_len` limbs.
///
/// The smallest power of two that is at least `2 * max(a_len, b_len)`.
#[inline]
pub(crate) fn padded_len(a_len: usize, b_len: usize) -> usize {
    (2 * a_len.max(b_len)).max(1).next_power_of_two()
}

/// Multiplies two little-endian limb sequences in base `radix`.
///
/// The returned sequence is little-endian, every limb is `< radix`, and it may
/// carry most-significant zero limbs; the caller normalizes.
pub(crate) fn multiply(a: &[u32], b: &[u32], radix: u32) -> Vec<u32> {
    let n = padded_len(a.len(), b.len());
    let twiddles = twiddle_table(n);

    let mut fa = to_coefficients(a, n);
    let mut fb = to_coefficients(b, n);

    transform(&mut fa, &twiddles, false);
    transform(&mut fb, &twiddles, false);

    for (x, y) in fa.iter_mut().zip(fb.iter()) {
        *x *= *y;
    }

    transform(&mut fa, &twiddles, true);

    let radix = u64::from(radix);
    let mut limbs = Vec::with_capacity(n + 1);
    let mut carry = 0u64;
    for coefficient in &fa {
        // Tiny negative noise around zero rounds to -0.0, clamp it.
        carry += coefficient.re.round().max(0.0) as u64;
        limbs.push((carry % radix) as u32);
        carry /= radix;
    }
    while carry > 0 {
        limbs.push((carry % radix) as u32);
        carry /= radix;
    }
    limbs
}

fn to_coefficients(limbs: &[u32], n: usize) -> Vec<Complex64> {
    let mut coefficients = vec![Complex64::new(0.0, 0.0); n];
    for (slot, &limb) in coefficients.iter_mut().zip(limbs) {
        slot.re = f64::from(limb);
    }
    coefficients
}

/// Builds the `n / 2` roots of unity `e^(2πik/n)` used by the butterflies.
///
/// A stage of length `len` reads every `n / len`-th entry, i.e. the angle step
/// halves from one stage to the next. Entries are computed directly from
/// their angle rather than by repeated multiplication so the error stays
/// flat in `n`.
fn twiddle_table(n: usize) -> Vec<Complex64> {
    let step = 2.0 * PI / n as f64;
    (0..n / 2)
        .map(|k| {
            let angle = step * k as f64;
            Complex64::new(angle.cos(), angle.sin())
        })
        .collect()
}

/// In-place iterative radix-2 Cooley-Tukey transform.
///
/// `values.len()` must be a power of two and `twiddles` the table built for
/// that length. With `invert` the conjugated twiddles are used and the
/// output is scaled by `1 / n`.
fn transform(values: &mut [Complex64], twiddles: &[Complex64], invert: bool) {
    let n = values.len();
    debug_assert!(n.is_power_of_two());
    if n == 1 {
        return;
    }

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            values.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let stride = n / len;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let w = if invert {
                    twiddles[k * stride].conj()
                } else {
                    twiddles[k * stride]
                };
                let u = values[start + k];
                let v = values[start + k + half] * w;
                values[start + k] = u + v;
                values[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }

    if invert {
        let scale = 1.0 / n as f64;
        for value in values.iter_mut() {
            *value *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_convolution(a: &[u32], b: &[u32], radix: u32) -> Vec<u32> {
        let mut raw = vec![0u64; a.len() + b.len()];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                raw[i + j] += u64::from(x) * u64::from(y);
            }
        }
        let mut out = Vec::with_capacity(raw.len() + 1);
        let mut carry = 0u64;
        for value in raw {
            carry += value;
            out.push((carry % u64::from(radix)) as u32);
            carry /= u64::from(radix);
        }
        while carry > 0 {
            out.push((carry % u64::from(radix)) as u32);
            carry /= u64::from(radix);
        }
        out
    }

    fn trim(mut limbs: Vec<u32>) -> Vec<u32> {
        while limbs.len() > 1 && limbs.last() == Some(&0) {
            limbs.pop();
        }
        limbs
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(padded_len(1, 1), 2);
        assert_eq!(padded_len(3, 1), 8);
        assert_eq!(padded_len(8, 8), 16);
        assert_eq!(padded_len(9, 2), 32);
    }

    #[test]
    fn test_transform_round_trip() {
        let original: Vec<Complex64> = (0..16).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let twiddles = twiddle_table(original.len());

        let mut values = original.clone();
        transform(&mut values, &twiddles, false);
        transform(&mut values, &twiddles, true);

        for (got, want) in values.iter().zip(&original) {
            assert!((got.re - want.re).abs() < 1e-9);
            assert!(got.im.abs() < 1e-9);
        }
    }

    #[test]
    fn test_transform_of_impulse_is_flat() {
        let mut values = vec![Complex64::new(0.0, 0.0); 8];
        values[0] = Complex64::new(1.0, 0.0);
        let twiddles = twiddle_table(8);
        transform(&mut values, &twiddles, false);
        for value in values {
            assert!((value.re - 1.0).abs() < 1e-12);
            assert!(value.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_multiply_small() {
        // 1234 * 5678 = 7006652
        let product = trim(multiply(&[1234], &[5678], 10_000));
        assert_eq!(product, vec![6652, 700]);
    }

    #[test]
    fn test_multiply_matches_naive() {
        let a: Vec<u32> = (0..37).map(|i| (i * 7919 + 13) % 10_000).collect();
        let b: Vec<u32> = (0..23).map(|i| (i * 104_729 + 5) % 10_000).collect();
        assert_eq!(
            trim(multiply(&a, &b, 10_000)),
            trim(naive_convolution(&a, &b, 10_000))
        );
    }

    #[test]
    fn test_multiply_all_nines() {
        // Worst case for coefficient magnitude
        let a = vec![9_999u32; 200];
        let b = vec![9_999u32; 200];
        assert_eq!(
            trim(multiply(&a, &b, 10_000)),
            trim(naive_convolution(&a, &b, 10_000))
        );
    }
}
