//! Hadamard matrix constructions.
//!
//! A Hadamard matrix H of order n has entries ±1 and satisfies HHᵀ = nI.
//! Dropping its all-ones column after normalisation gives a two-level
//! screening design with n runs and up to n - 1 balanced, mutually
//! orthogonal columns.
//!
//! ## Constructions
//!
//! | Construction | Order |
//! |-------------|-------|
//! | Sylvester | 2^m |
//! | Doubling | 2n from any order n |
//! | Paley I | p + 1, p prime, p ≡ 3 (mod 4) |
//! | Paley II | 2(q + 1), q prime, q ≡ 1 (mod 4) |
//!
//! Together these cover every multiple of 4 up to 48.

use ndarray::{s, Array2};

use crate::utils::{is_prime, mod_pow};

/// Find a Hadamard matrix of order `n`, normalised so column 0 is all +1.
///
/// Returns `None` when none of the available constructions reaches `n`.
pub(crate) fn hadamard(n: usize) -> Option<Array2<i8>> {
    let mut h = build(n)?;
    normalize_first_column(&mut h);
    Some(h)
}

fn build(n: usize) -> Option<Array2<i8>> {
    if n == 0 {
        return None;
    }
    if n.is_power_of_two() {
        return Some(sylvester(n));
    }
    if n % 8 == 0 {
        if let Some(half) = build(n / 2) {
            return Some(double(&half));
        }
    }
    if let Ok(p) = u32::try_from(n - 1) {
        if p % 4 == 3 && is_prime(p) {
            return Some(paley_one(p));
        }
    }
    if n % 4 == 0 {
        if let Ok(q) = u32::try_from(n / 2 - 1) {
            if q % 4 == 1 && is_prime(q) {
                return Some(paley_two(q));
            }
        }
    }
    None
}

/// Sylvester construction of order `n` (a power of 2).
///
/// H₁ = \[1\], H₂ₙ = \[\[Hₙ, Hₙ\], \[Hₙ, -Hₙ\]\].
fn sylvester(n: usize) -> Array2<i8> {
    let mut h = Array2::from_elem((n, n), 1i8);

    // h[0..size, 0..size] holds H_size at the start of each pass
    let mut size = 1;
    while size < n {
        for i in 0..size {
            for j in 0..size {
                let v = h[[i, j]];
                h[[i, j + size]] = v;
                h[[i + size, j]] = v;
                h[[i + size, j + size]] = -v;
            }
        }
        size *= 2;
    }

    h
}

/// \[\[H, H\], \[H, -H\]\]
fn double(h: &Array2<i8>) -> Array2<i8> {
    let n = h.nrows();
    let mut out = Array2::zeros((2 * n, 2 * n));
    out.slice_mut(s![..n, ..n]).assign(h);
    out.slice_mut(s![..n, n..]).assign(h);
    out.slice_mut(s![n.., ..n]).assign(h);
    out.slice_mut(s![n.., n..]).assign(&h.mapv(|v| -v));
    out
}

/// Quadratic character χ(a) of GF(p).
fn legendre(a: u32, p: u32) -> i8 {
    let a = a % p;
    if a == 0 {
        return 0;
    }

    // Euler's criterion: a^((p-1)/2) ≡ (a/p) (mod p)
    let result = mod_pow(u64::from(a), u64::from((p - 1) / 2), u64::from(p));
    if result == 1 {
        1
    } else {
        -1
    }
}

/// Paley type I construction of order p + 1 for a prime p ≡ 3 (mod 4).
///
/// H = \[\[1, 1ᵀ\], \[-1, Q + I\]\] with Q the Jacobsthal matrix of GF(p).
fn paley_one(p: u32) -> Array2<i8> {
    let n = p as usize + 1;
    let mut h = Array2::from_elem((n, n), 1i8);

    for i in 1..n {
        h[[i, 0]] = -1;
        for j in 1..n {
            if i != j {
                let (fi, fj) = ((i - 1) as u32, (j - 1) as u32);
                h[[i, j]] = legendre((fj + p - fi) % p, p);
            }
        }
    }

    h
}

/// Paley type II construction of order 2(q + 1) for a prime q ≡ 1 (mod 4).
///
/// With C the symmetric conference matrix \[\[0, 1ᵀ\], \[1, Q\]\]:
/// H = C ⊗ \[\[1, 1\], \[1, -1\]\] + I ⊗ \[\[1, -1\], \[-1, -1\]\].
fn paley_two(q: u32) -> Array2<i8> {
    let m = q as usize + 1;

    let conference = |i: usize, j: usize| -> i8 {
        match (i, j) {
            _ if i == j => 0,
            (0, _) | (_, 0) => 1,
            _ => {
                let (fi, fj) = ((i - 1) as u32, (j - 1) as u32);
                legendre((fj + q - fi) % q, q)
            }
        }
    };

    let mut h = Array2::zeros((2 * m, 2 * m));
    for i in 0..m {
        for j in 0..m {
            let block: [[i8; 2]; 2] = match conference(i, j) {
                0 => [[1, -1], [-1, -1]],
                c => [[c, c], [c, -c]],
            };
            for (di, block_row) in block.iter().enumerate() {
                for (dj, &v) in block_row.iter().enumerate() {
                    h[[2 * i + di, 2 * j + dj]] = v;
                }
            }
        }
    }

    h
}

/// Negate rows so that column 0 is all +1; orthogonality is preserved.
fn normalize_first_column(h: &mut Array2<i8>) {
    for mut row in h.rows_mut() {
        if row[0] < 0 {
            row.mapv_inplace(|v| -v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_hadamard(h: &Array2<i8>) {
        let n = h.nrows();
        assert_eq!(h.ncols(), n);
        assert!(h.iter().all(|&v| v == 1 || v == -1));

        let hf = h.mapv(f64::from);
        let product = hf.dot(&hf.t());
        for i in 0..n {
            for j in 0..n {
                let expected = if i == j { n as f64 } else { 0.0 };
                assert_eq!(product[[i, j]], expected, "order {n}: HHᵀ[{i},{j}]");
            }
        }
    }

    #[test]
    fn test_every_multiple_of_four_to_48() {
        for n in (4..=48).step_by(4) {
            let h = hadamard(n).unwrap_or_else(|| panic!("no Hadamard matrix of order {n}"));
            assert_hadamard(&h);
            assert!(h.column(0).iter().all(|&v| v == 1));
        }
    }

    #[test]
    fn test_paley_two_orders() {
        assert_hadamard(&paley_two(5)); // 12
        assert_hadamard(&paley_two(13)); // 28
        assert_hadamard(&paley_two(17)); // 36
    }

    #[test]
    fn test_paley_one_orders() {
        for p in [3, 7, 11, 19, 23, 43, 47] {
            assert_hadamard(&paley_one(p));
        }
    }

    #[test]
    fn test_sylvester_structure() {
        let h = sylvester(8);
        assert_hadamard(&h);
        assert!(h.row(0).iter().all(|&v| v == 1));
        assert!(h.column(0).iter().all(|&v| v == 1));
    }

    #[test]
    fn test_unreachable_orders() {
        assert!(hadamard(0).is_none());
        assert!(hadamard(6).is_none());
        assert!(hadamard(52).is_none());
    }

    #[test]
    fn test_legendre_symbol() {
        // Quadratic residues mod 7: {1, 2, 4}
        assert_eq!(legendre(1, 7), 1);
        assert_eq!(legendre(2, 7), 1);
        assert_eq!(legendre(3, 7), -1);
        assert_eq!(legendre(4, 7), 1);
        assert_eq!(legendre(0, 7), 0);
    }
}
