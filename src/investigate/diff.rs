//! Line diff of two sorted hit logs.
//!
//! Both inputs are sorted, so their longest common subsequence is the
//! multiset intersection and a single merge walk finds it.

use std::cmp::Ordering;

/// Replaced lines at least this similar get a `? ` hint line.
const HINT_RATIO: f64 = 0.75;

/// Longest pair of lines (in characters, multiplied) worth hinting.
const HINT_CELLS: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op<'a> {
    Equal,
    Delete(&'a str),
    Insert(&'a str),
}

fn merge_walk<'a>(old: &'a [String], new: &'a [String]) -> Vec<Op<'a>> {
    let (mut i, mut j) = (0, 0);
    let mut ops = Vec::with_capacity(old.len().max(new.len()));
    while i < old.len() || j < new.len() {
        let order = match (old.get(i), new.get(j)) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, _) => Ordering::Greater,
        };
        match order {
            Ordering::Equal => {
                ops.push(Op::Equal);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                ops.push(Op::Delete(&old[i]));
                i += 1;
            }
            Ordering::Greater => {
                ops.push(Op::Insert(&new[j]));
                j += 1;
            }
        }
    }
    ops
}

/// Per-character match flags of `b` against `a`, and the match count.
fn char_matches(a: &[char], b: &[char]) -> (Vec<bool>, usize) {
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for x in (0..n).rev() {
        for y in (0..m).rev() {
            table[x][y] = if a[x] == b[y] {
                table[x + 1][y + 1] + 1
            } else {
                table[x + 1][y].max(table[x][y + 1])
            };
        }
    }

    let mut matched = vec![false; m];
    let (mut x, mut y) = (0, 0);
    while x < n && y < m {
        if a[x] == b[y] {
            matched[y] = true;
            x += 1;
            y += 1;
        } else if table[x + 1][y] >= table[x][y + 1] {
            x += 1;
        } else {
            y += 1;
        }
    }
    (matched, table[0][0])
}

/// Per-character match flags for `b` and the similarity in `[0, 1]`
/// (twice the matched characters over the total). `None` for pairs too
/// long to compare.
fn similarity(a: &[char], b: &[char]) -> Option<(Vec<bool>, f64)> {
    if a.len().saturating_mul(b.len()) > HINT_CELLS {
        return None;
    }
    let total = a.len() + b.len();
    if total == 0 {
        return Some((Vec::new(), 1.0));
    }
    let (matched, matches) = char_matches(a, b);
    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * matches) as f64 / total as f64;
    Some((matched, ratio))
}

/// `? ` line with `^` under the characters of `new` absent from `old`.
fn hint(old: &str, new: &str) -> Option<String> {
    let (a, b): (Vec<char>, Vec<char>) = (old.chars().collect(), new.chars().collect());
    let (matched, ratio) = similarity(&a, &b)?;
    if ratio < HINT_RATIO {
        return None;
    }
    let marks: String = matched.iter().map(|&m| if m { ' ' } else { '^' }).collect();
    let marks = marks.trim_end();
    // Only deletions: nothing to point at in the new line.
    (!marks.is_empty()).then(|| format!("? {marks}"))
}

/// `- `/`+ ` lines for every difference between two sorted line sets,
/// with `? ` hints under near-identical replacements. Empty when equal.
#[must_use]
pub fn ndiff(old: &[String], new: &[String]) -> Vec<String> {
    let ops = merge_walk(old, new);
    let mut out = Vec::new();
    let mut iter = ops.iter().peekable();
    while let Some(op) = iter.next() {
        match *op {
            Op::Equal => {}
            Op::Delete(line) => {
                out.push(format!("- {line}"));
                if let Some(Op::Insert(next)) = iter.peek().copied() {
                    out.push(format!("+ {next}"));
                    out.extend(hint(line, next));
                    iter.next();
                }
            }
            Op::Insert(line) => out.push(format!("+ {line}")),
        }
    }
    out
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
