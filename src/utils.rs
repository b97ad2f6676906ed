//! Small integer helpers shared by the design generators.

/// Binomial coefficient C(n, k), or `None` on `u64` overflow.
///
/// Counts the runs of a simplex-lattice design: `q` components at degree
/// `m` give C(m + q - 1, q - 1) blends.
///
/// ```
/// use doekit::utils::binomial;
///
/// assert_eq!(binomial(5, 2), Some(10));
/// assert_eq!(binomial(4, 2), Some(6)); // {3,2} lattice
/// assert_eq!(binomial(3, 5), Some(0));
/// ```
#[must_use]
pub fn binomial(n: u64, k: u64) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        // exact at every step: result holds C(n, i) * (n - i) / (i + 1)
        result = result.checked_mul(n - i)? / (i + 1);
    }
    Some(result)
}

/// `base^exp mod modulus` by square-and-multiply.
///
/// # Panics
///
/// Panics if `modulus` is 0.
///
/// ```
/// use doekit::utils::mod_pow;
///
/// assert_eq!(mod_pow(3, 5, 7), 5);
/// ```
#[must_use]
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    assert!(modulus > 0, "modulus must be positive");
    let m = u128::from(modulus);
    let mut base = u128::from(base) % m;
    let mut acc = 1 % m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    // acc < modulus, so the narrowing is lossless
    acc as u64
}

/// Primality by 6k ± 1 trial division.
///
/// Only used to pick Paley orders, so inputs stay small.
///
/// ```
/// use doekit::utils::is_prime;
///
/// assert!(is_prime(19));
/// assert!(!is_prime(21));
/// ```
#[must_use]
pub fn is_prime(n: u32) -> bool {
    match n {
        0 | 1 => false,
        2 | 3 => true,
        _ if n % 2 == 0 || n % 3 == 0 => false,
        _ => {
            let n = u64::from(n);
            let mut d = 5u64;
            while d * d <= n {
                if n % d == 0 || n % (d + 2) == 0 {
                    return false;
                }
                d += 6;
            }
            true
        }
    }
}

/// All `k`-subsets of `0..n` as sorted index vectors, in lexicographic
/// order.
///
/// ```
/// use doekit::utils::combinations;
///
/// let pairs: Vec<Vec<usize>> = combinations(3, 2).collect();
/// assert_eq!(pairs, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
/// ```
pub fn combinations(n: usize, k: usize) -> impl Iterator<Item = Vec<usize>> {
    Combinations {
        n,
        next: (k <= n).then(|| (0..k).collect()),
    }
}

struct Combinations {
    n: usize,
    next: Option<Vec<usize>>,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let k = current.len();

        // rightmost position that is not yet at its maximum n - k + i
        if let Some(i) = (0..k).rev().find(|&i| current[i] < self.n - k + i) {
            let mut successor = current.clone();
            successor[i] += 1;
            for j in i + 1..k {
                successor[j] = successor[j - 1] + 1;
            }
            self.next = Some(successor);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(6, 3), Some(20));
        assert_eq!(binomial(20, 10), Some(184_756));
        assert_eq!(binomial(200, 100), None);
    }

    #[test]
    fn test_mod_pow() {
        assert_eq!(mod_pow(2, 10, 1000), 24);
        assert_eq!(mod_pow(5, 0, 7), 1);
        assert_eq!(mod_pow(5, 3, 1), 0);
        assert_eq!(mod_pow(u64::MAX, 2, u64::MAX - 1), 1);
    }

    #[test]
    fn test_is_prime() {
        let primes: Vec<u32> = (0..50).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
        assert!(!is_prime(25));
        assert!(!is_prime(49));
        assert!(is_prime(7919));
    }

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(5, 3).count(), 10);
        assert_eq!(combinations(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        assert_eq!(combinations(2, 3).count(), 0);
        assert_eq!(combinations(4, 4).collect::<Vec<_>>(), vec![vec![0, 1, 2, 3]]);
    }
}
