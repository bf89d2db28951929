//! Orthonormal 8×8 DCT-II and its inverse.
//!
//! Blocks are 64 values in natural (row-major) order, index = row * 8 + col.
//! The transform is separable and orthonormal, so `inverse_dct(forward_dct(b))`
//! reproduces `b` up to floating point rounding and coefficient changes map to
//! pixel changes of the same energy.

use std::sync::OnceLock;

/// One 8×8 block of samples or coefficients.
pub type Block = [f64; 64];

/// `COSINE[u][x] = cos((2*x + 1) * u * PI / 16)`
static COSINE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();

/// Normalization: C(0) = 1/sqrt(8), C(u>0) = 1/2.
static NORM: OnceLock<[f64; 8]> = OnceLock::new();

fn cosine_table() -> &'static [[f64; 8]; 8] {
    COSINE.get_or_init(|| {
        let mut table = [[0.0f64; 8]; 8];
        for (u, row) in table.iter_mut().enumerate() {
            for (x, value) in row.iter_mut().enumerate() {
                *value = ((2 * x + 1) as f64 * u as f64 * std::f64::consts::PI / 16.0).cos();
            }
        }
        table
    })
}

fn norm_table() -> &'static [f64; 8] {
    NORM.get_or_init(|| {
        let mut n = [0.5f64; 8];
        n[0] = 1.0 / (8.0f64).sqrt();
        n
    })
}

/// Forward 2-D DCT of a (level-shifted) block.
pub fn forward_dct(samples: &Block) -> Block {
    let cos = cosine_table();
    let c = norm_table();

    // Rows first.
    let mut temp = [0.0f64; 64];
    for row in 0..8 {
        for u in 0..8 {
            let mut sum = 0.0;
            for x in 0..8 {
                sum += samples[row * 8 + x] * cos[u][x];
            }
            temp[row * 8 + u] = c[u] * sum;
        }
    }

    // Then columns.
    let mut coeffs = [0.0f64; 64];
    for col in 0..8 {
        for v in 0..8 {
            let mut sum = 0.0;
            for y in 0..8 {
                sum += temp[y * 8 + col] * cos[v][y];
            }
            coeffs[v * 8 + col] = c[v] * sum;
        }
    }

    coeffs
}

/// Inverse 2-D DCT back to (level-shifted) samples.
pub fn inverse_dct(coeffs: &Block) -> Block {
    let cos = cosine_table();
    let c = norm_table();

    // Columns first.
    let mut temp = [0.0f64; 64];
    for col in 0..8 {
        for y in 0..8 {
            let mut sum = 0.0;
            for v in 0..8 {
                sum += c[v] * coeffs[v * 8 + col] * cos[v][y];
            }
            temp[y * 8 + col] = sum;
        }
    }

    // Then rows.
    let mut samples = [0.0f64; 64];
    for row in 0..8 {
        for x in 0..8 {
            let mut sum = 0.0;
            for u in 0..8 {
                sum += c[u] * temp[row * 8 + u] * cos[u][x];
            }
            samples[row * 8 + x] = sum;
        }
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_constant_block_has_only_dc() {
        let block = [100.0f64; 64];
        let coeffs = forward_dct(&block);
        // DC = 8 * mean for the orthonormal transform.
        assert!((coeffs[0] - 800.0).abs() < EPS);
        for (i, &c) in coeffs.iter().enumerate().skip(1) {
            assert!(c.abs() < EPS, "AC coefficient {i} = {c}");
        }
    }

    #[test]
    fn test_inverse_restores_block() {
        let mut block = [0.0f64; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = ((i * 37) % 255) as f64 - 128.0;
        }
        let restored = inverse_dct(&forward_dct(&block));
        for i in 0..64 {
            assert!((restored[i] - block[i]).abs() < EPS, "sample {i}");
        }
    }

    #[test]
    fn test_energy_is_preserved() {
        let mut block = [0.0f64; 64];
        for (i, v) in block.iter_mut().enumerate() {
            *v = ((i * 13) % 31) as f64;
        }
        let coeffs = forward_dct(&block);
        let e_samples: f64 = block.iter().map(|v| v * v).sum();
        let e_coeffs: f64 = coeffs.iter().map(|v| v * v).sum();
        assert!((e_samples - e_coeffs).abs() < 1e-6);
    }

    #[test]
    fn test_single_coefficient_roundtrip() {
        let mut coeffs = [0.0f64; 64];
        coeffs[10] = 10.0;
        let back = forward_dct(&inverse_dct(&coeffs));
        assert!((back[10] - 10.0).abs() < EPS);
        assert!(back[17].abs() < EPS);
    }
}
