//! Indel-based string similarity on a 0-100 scale.
//!
//! All scores compare Unicode scalar values. Any empty input scores 0.

use std::collections::BTreeSet;

/// Length of the longest common subsequence of `a` and `b`.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[allow(clippy::cast_precision_loss)]
fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    200.0 * lcs_len(a, b) as f64 / (a.len() + b.len()) as f64
}

/// Normalized Indel similarity: `200 * LCS / (len(a) + len(b))`.
///
/// # Example
///
/// ```rust
/// use gpumatch::services::resolution::fuzzy::ratio;
///
/// assert!((ratio("a6000", "a6000") - 100.0).abs() < f64::EPSILON);
/// assert!((ratio("a100", "a10") - 200.0 * 3.0 / 7.0).abs() < 1e-9);
/// assert_eq!(ratio("", "t4"), 0.0);
/// ```
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any window of the longer.
///
/// Windows are every full-length slice of the longer string plus the shorter
/// prefixes and suffixes at its edges, so a short needle partially overhanging
/// either end is still scored.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let (m, n) = (short.len(), long.len());

    let prefixes = (1..m).map(|len| &long[..len]);
    let full = (0..=n - m).map(|start| &long[start..start + m]);
    let suffixes = (1..m).map(|len| &long[n - len..]);

    let mut best = 0.0f64;
    for window in prefixes.chain(full).chain(suffixes) {
        best = best.max(ratio_chars(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Token-set similarity.
///
/// Whitespace tokens are deduplicated and sorted. Returns 100 when the token
/// sets share a token and one is a subset of the other; otherwise compares the
/// shared tokens with each side's remainder.
///
/// # Example
///
/// ```rust
/// use gpumatch::services::resolution::fuzzy::token_set_ratio;
///
/// assert_eq!(token_set_ratio("nvidia tesla t4 16gb", "tesla t4"), 100.0);
/// assert_eq!(token_set_ratio("", "tesla t4"), 0.0);
/// ```
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied().collect());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied().collect());

    if sect.is_empty() {
        return ratio(&diff_ab, &diff_ba);
    }
    if diff_ab.is_empty() || diff_ba.is_empty() {
        return 100.0;
    }

    let sect_ab = format!("{sect} {diff_ab}");
    let sect_ba = format!("{sect} {diff_ba}");
    ratio(&sect, &sect_ab)
        .max(ratio(&sect, &sect_ba))
        .max(ratio(&sect_ab, &sect_ba))
}
