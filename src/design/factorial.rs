//! Full and fractional factorial designs.
//!
//! ## Run order
//!
//! Full factorial runs are enumerated like an odometer whose **first factor
//! is the fastest-varying digit**:
//!
//! ```text
//! levels = [2, 3]      F1 F2
//!                       1  1
//!                       2  1
//!                       1  2
//!                       2  2
//!                       1  3
//!                       2  3
//! ```
//!
//! Fractional factorial base columns use the same order with codes -1, +1.

use std::collections::HashMap;

use super::{numbered_names, DesignKind, DesignMatrix, Level};
use crate::error::{Error, Result};

/// Enumerate all level combinations, 0-based, first factor fastest.
///
/// Callers guarantee every level count is at least 1.
pub(crate) fn odometer(levels: &[u32]) -> Vec<Vec<u32>> {
    let total: usize = levels.iter().map(|&l| l as usize).product();
    let mut rows = Vec::with_capacity(total);
    let mut digits = vec![0u32; levels.len()];

    for _ in 0..total {
        rows.push(digits.clone());
        for (digit, &radix) in digits.iter_mut().zip(levels) {
            *digit += 1;
            if *digit < radix {
                break;
            }
            *digit = 0;
        }
    }

    rows
}

/// Two-level full factorial coded -1/+1, first factor fastest.
pub(crate) fn two_level_factorial(factors: usize) -> Vec<Vec<i8>> {
    odometer(&vec![2; factors])
        .into_iter()
        .map(|row| row.into_iter().map(|d| if d == 0 { -1 } else { 1 }).collect())
        .collect()
}

/// Validate a level list and return its run count.
pub(crate) fn factorial_size(levels: &[u32]) -> Result<usize> {
    if levels.is_empty() {
        return Err(Error::invalid_params("at least one factor is required"));
    }
    if let Some(pos) = levels.iter().position(|&l| l < 1) {
        return Err(Error::invalid_params(format!(
            "factor {} has {} levels, must be at least 1",
            pos + 1,
            levels[pos]
        )));
    }
    levels.iter().try_fold(1usize, |acc, &l| {
        acc.checked_mul(l as usize)
            .ok_or_else(|| Error::invalid_params("full factorial run count overflows"))
    })
}

/// Generate a general full factorial design.
///
/// Produces every combination of `levels[i]` levels per factor, coded
/// `1..=levels[i]`, in odometer order with `F1` varying fastest.
///
/// # Errors
///
/// Returns an error if `levels` is empty or any level count is below 1.
///
/// # Example
///
/// ```
/// use doekit::design::full_factorial;
///
/// let design = full_factorial(&[2, 3, 2]).unwrap();
/// assert_eq!(design.runs(), 12);
/// ```
pub fn full_factorial(levels: &[u32]) -> Result<DesignMatrix> {
    factorial_size(levels)?;

    let rows: Vec<Vec<Level>> = odometer(levels)
        .into_iter()
        .map(|row| row.into_iter().map(|d| Level::Int(i64::from(d) + 1)).collect())
        .collect();

    DesignMatrix::from_rows(
        DesignKind::FullFactorial,
        numbered_names("F", levels.len()),
        rows,
    )
}

/// A parsed generator token: a sign and the base columns it multiplies.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GeneratorTerm {
    negate: bool,
    base: Vec<usize>,
}

/// Parse a fractional factorial generator such as `"a b c -abc"`.
///
/// Single-letter tokens declare base factors in order of appearance; longer
/// tokens are products of previously or subsequently declared base letters.
/// Letters are case-insensitive and a token may carry a leading `+` or `-`.
fn parse_generator(generator: &str) -> Result<(usize, Vec<GeneratorTerm>)> {
    let tokens: Vec<&str> = generator.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(Error::invalid_params("generator string is empty"));
    }

    let mut parsed: Vec<(bool, Vec<char>)> = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let (negate, body) = match token.as_bytes()[0] {
            b'-' => (true, &token[1..]),
            b'+' => (false, &token[1..]),
            _ => (false, *token),
        };
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::invalid_params(format!(
                "malformed generator token `{token}`"
            )));
        }
        let letters: Vec<char> = body.chars().map(|c| c.to_ascii_lowercase()).collect();
        let mut sorted = letters.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != letters.len() {
            return Err(Error::invalid_params(format!(
                "generator token `{token}` repeats a letter"
            )));
        }
        parsed.push((negate, letters));
    }

    let mut base_index: HashMap<char, usize> = HashMap::new();
    for (_, letters) in &parsed {
        if let [letter] = letters.as_slice() {
            let next = base_index.len();
            if base_index.insert(*letter, next).is_some() {
                return Err(Error::invalid_params(format!(
                    "base factor `{letter}` is declared twice"
                )));
            }
        }
    }
    if base_index.is_empty() {
        return Err(Error::invalid_params(
            "generator declares no single-letter base factors",
        ));
    }

    let mut terms = Vec::with_capacity(parsed.len());
    for (token, (negate, letters)) in tokens.iter().zip(parsed) {
        let base = letters
            .iter()
            .map(|c| {
                base_index.get(c).copied().ok_or_else(|| {
                    Error::invalid_params(format!(
                        "generator token `{token}` references undefined base letter `{c}`"
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        terms.push(GeneratorTerm { negate, base });
    }

    Ok((base_index.len(), terms))
}

/// Generate a two-level fractional factorial design from a generator string.
///
/// Each whitespace-separated token yields one ±1 column. Single letters are
/// independent base factors (a full 2^k factorial over them); multi-letter
/// tokens are the product of the named base columns, so `"a b ab"` is the
/// 2^(3-1) design with `F3 = F1·F2`. A leading `-` negates the column.
///
/// # Errors
///
/// Returns an error for an empty generator, a token that is not letters,
/// a repeated base letter or a reference to an undeclared base letter.
///
/// # Example
///
/// ```
/// use doekit::design::{fractional_factorial, Level};
///
/// let design = fractional_factorial("a b ab").unwrap();
/// assert_eq!(design.runs(), 4);
/// for run in design.iter_runs() {
///     let v: Vec<i64> = run.values().iter().filter_map(Level::as_int).collect();
///     assert_eq!(v[2], v[0] * v[1]);
/// }
/// ```
pub fn fractional_factorial(generator: &str) -> Result<DesignMatrix> {
    let (base_count, terms) = parse_generator(generator)?;
    if base_count >= usize::BITS as usize - 1 {
        return Err(Error::invalid_params(format!(
            "{base_count} base factors is too many"
        )));
    }

    let base_runs = two_level_factorial(base_count);
    let rows: Vec<Vec<Level>> = base_runs
        .iter()
        .map(|base| {
            terms
                .iter()
                .map(|term| {
                    let product: i64 = term.base.iter().map(|&b| i64::from(base[b])).product();
                    Level::Int(if term.negate { -product } else { product })
                })
                .collect()
        })
        .collect();

    DesignMatrix::from_rows(
        DesignKind::FractionalFactorial,
        numbered_names("F", terms.len()),
        rows,
    )
}
