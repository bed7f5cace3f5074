use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub const DEFAULT_MAX_CHARS: usize = 4_000;

/// One step of a global alignment. Indices are char positions in the input
/// and target sequences respectively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignOp {
    Match { input: usize, target: usize },
    Substitute { input: usize, target: usize },
    /// Extra char in the input with no counterpart in the target.
    Insert { input: usize },
    /// Target char the input skipped.
    Delete { target: usize },
}

impl AlignOp {
    pub fn is_match(self) -> bool {
        matches!(self, AlignOp::Match { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    ops: Vec<AlignOp>,
    unfixed_errors: usize,
}

impl Alignment {
    fn from_ops(ops: Vec<AlignOp>) -> Self {
        let unfixed_errors = ops.iter().filter(|op| !op.is_match()).count();
        Self {
            ops,
            unfixed_errors,
        }
    }

    pub fn operations(&self) -> &[AlignOp] {
        &self.ops
    }

    /// Number of non-match operations, i.e. the edit distance.
    pub fn unfixed_errors(&self) -> usize {
        self.unfixed_errors
    }

    pub fn match_count(&self) -> usize {
        self.ops.len() - self.unfixed_errors
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Levenshtein aligner with an input-size ceiling. The distance table is
/// quadratic in memory so oversized inputs are rejected up front.
#[derive(Clone, Copy, Debug)]
pub struct Aligner {
    max_chars: usize,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl Aligner {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn align(&self, input: &[char], target: &[char]) -> Result<Alignment, EngineError> {
        self.check_len(input.len())?;
        self.check_len(target.len())?;
        let table = DistanceTable::build(input, target);
        let ops = table.backtrack(input, target, input.len(), target.len());
        Ok(Alignment::from_ops(ops))
    }

    pub fn align_str(&self, input: &str, target: &str) -> Result<Alignment, EngineError> {
        let input: Vec<char> = input.chars().collect();
        let target: Vec<char> = target.chars().collect();
        self.align(&input, &target)
    }

    /// Align the whole input against the target prefix it most plausibly
    /// covers. Uses the same global distance table; the end column is the one
    /// with the lowest cost in the last row (ties go to the column closest to
    /// the input length). Returns the alignment and the length of the covered
    /// target prefix.
    pub fn align_prefix(
        &self,
        input: &[char],
        target: &[char],
    ) -> Result<(Alignment, usize), EngineError> {
        self.check_len(input.len())?;
        self.check_len(target.len())?;
        let table = DistanceTable::build(input, target);
        let covered = table
            .last_row()
            .iter()
            .enumerate()
            .min_by_key(|&(j, &cost)| (cost, j.abs_diff(input.len()), j))
            .map(|(j, _)| j)
            .unwrap_or(0);
        let ops = table.backtrack(input, target, input.len(), covered);
        Ok((Alignment::from_ops(ops), covered))
    }

    fn check_len(&self, len: usize) -> Result<(), EngineError> {
        if len > self.max_chars {
            return Err(EngineError::InvalidInput {
                len,
                limit: self.max_chars,
            });
        }
        Ok(())
    }
}

/// Align with the default size ceiling.
pub fn align(input: &[char], target: &[char]) -> Result<Alignment, EngineError> {
    Aligner::default().align(input, target)
}

pub fn edit_distance(a: &str, b: &str) -> Result<usize, EngineError> {
    Ok(Aligner::default().align_str(a, b)?.unfixed_errors())
}

/// Row-major (|input|+1) x (|target|+1) cost table, sized once from the two
/// lengths so every (i, j) visited by `build` and `backtrack` is in range.
struct DistanceTable {
    cols: usize,
    cells: Vec<u32>,
}

impl DistanceTable {
    fn build(input: &[char], target: &[char]) -> Self {
        let rows = input.len() + 1;
        let cols = target.len() + 1;
        let mut cells = vec![0u32; rows * cols];

        for (j, cell) in cells[..cols].iter_mut().enumerate() {
            *cell = j as u32;
        }
        for (i, &input_ch) in input.iter().enumerate() {
            let (done, rest) = cells.split_at_mut((i + 1) * cols);
            let prev = &done[i * cols..];
            let cur = &mut rest[..cols];
            cur[0] = (i + 1) as u32;
            for (j, &target_ch) in target.iter().enumerate() {
                let sub_cost = u32::from(input_ch != target_ch);
                cur[j + 1] = (prev[j + 1] + 1)
                    .min(cur[j] + 1)
                    .min(prev[j] + sub_cost);
            }
        }

        Self { cols, cells }
    }

    fn get(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.cols + j]
    }

    fn last_row(&self) -> &[u32] {
        &self.cells[self.cells.len() - self.cols..]
    }

    /// Walk back from (i, j) to the origin. Tie-break order is fixed:
    /// diagonal, then vertical (insert), then horizontal (delete).
    fn backtrack(&self, input: &[char], target: &[char], i: usize, j: usize) -> Vec<AlignOp> {
        let (mut i, mut j) = (i, j);
        let mut ops = Vec::with_capacity(i.max(j));

        while i > 0 || j > 0 {
            let here = self.get(i, j);

            if i > 0 && j > 0 {
                let same = input[i - 1] == target[j - 1];
                if here == self.get(i - 1, j - 1) + u32::from(!same) {
                    ops.push(if same {
                        AlignOp::Match {
                            input: i - 1,
                            target: j - 1,
                        }
                    } else {
                        AlignOp::Substitute {
                            input: i - 1,
                            target: j - 1,
                        }
                    });
                    i -= 1;
                    j -= 1;
                    continue;
                }
            }

            if i > 0 && here == self.get(i - 1, j) + 1 {
                ops.push(AlignOp::Insert { input: i - 1 });
                i -= 1;
            } else {
                ops.push(AlignOp::Delete { target: j - 1 });
                j -= 1;
            }
        }

        ops.reverse();
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn reference_levenshtein(a: &str, b: &str) -> usize {
        let a = chars(a);
        let b = chars(b);
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for i in 1..=a.len() {
            let mut cur = vec![i; b.len() + 1];
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
            }
            prev = cur;
        }
        prev[b.len()]
    }

    #[test]
    fn test_non_match_count_equals_levenshtein() {
        let pairs = [
            ("kitten", "sitting"),
            ("flaw", "lawn"),
            ("The cat sat.", "The cat sit."),
            ("", "abc"),
            ("abc", ""),
            ("intention", "execution"),
            ("café au lait", "cafe au lait"),
            ("teh quick brwon fox", "the quick brown fox"),
            ("aaaa", "aa"),
        ];
        for (a, b) in pairs {
            let alignment = Aligner::default().align_str(a, b).unwrap();
            assert_eq!(
                alignment.unfixed_errors(),
                reference_levenshtein(a, b),
                "distance mismatch for {a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn test_identical_input_is_all_matches() {
        let text = chars("hello, world");
        let alignment = align(&text, &text).unwrap();
        assert_eq!(alignment.operations().len(), text.len());
        assert!(alignment.operations().iter().all(|op| op.is_match()));
        assert_eq!(alignment.unfixed_errors(), 0);
    }

    #[test]
    fn test_empty_input_deletes_every_target_char() {
        let alignment = align(&[], &chars("abc")).unwrap();
        assert_eq!(
            alignment.operations(),
            &[
                AlignOp::Delete { target: 0 },
                AlignOp::Delete { target: 1 },
                AlignOp::Delete { target: 2 },
            ]
        );
    }

    #[test]
    fn test_empty_target_inserts_every_input_char() {
        let alignment = align(&chars("ab"), &[]).unwrap();
        assert_eq!(
            alignment.operations(),
            &[AlignOp::Insert { input: 0 }, AlignOp::Insert { input: 1 }]
        );
    }

    #[test]
    fn test_both_empty() {
        let alignment = align(&[], &[]).unwrap();
        assert!(alignment.is_empty());
        assert_eq!(alignment.unfixed_errors(), 0);
    }

    #[test]
    fn test_single_substitution() {
        let alignment = Aligner::default()
            .align_str("The cat sit.", "The cat sat.")
            .unwrap();
        let subs: Vec<_> = alignment
            .operations()
            .iter()
            .filter(|op| matches!(op, AlignOp::Substitute { .. }))
            .collect();
        assert_eq!(subs, vec![&AlignOp::Substitute { input: 9, target: 9 }]);
        assert_eq!(alignment.match_count(), 11);
    }

    #[test]
    fn test_tie_break_prefers_diagonal() {
        // "ab" -> "ba" costs 2 either as two substitutions or insert+delete.
        let alignment = Aligner::default().align_str("ab", "ba").unwrap();
        assert_eq!(
            alignment.operations(),
            &[
                AlignOp::Substitute { input: 0, target: 0 },
                AlignOp::Substitute { input: 1, target: 1 },
            ]
        );
    }

    #[test]
    fn test_tie_break_prefers_insert_over_delete() {
        let alignment = Aligner::default().align_str("abx", "ab").unwrap();
        assert_eq!(
            alignment.operations().last(),
            Some(&AlignOp::Insert { input: 2 })
        );
        let alignment = Aligner::default().align_str("ab", "abx").unwrap();
        assert_eq!(
            alignment.operations().last(),
            Some(&AlignOp::Delete { target: 2 })
        );
    }

    #[test]
    fn test_alignment_is_deterministic() {
        let aligner = Aligner::default();
        let a = aligner.align_str("teh quikc", "the quick").unwrap();
        let b = aligner.align_str("teh quikc", "the quick").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_oversize_input_fails_fast() {
        let aligner = Aligner::new(8);
        let long = chars("123456789");
        let err = aligner.align(&long, &chars("x")).unwrap_err();
        assert_eq!(err, EngineError::InvalidInput { len: 9, limit: 8 });
        assert!(aligner.align(&chars("x"), &long).is_err());
        assert!(aligner.align(&long[..8], &long[..8]).is_ok());
    }

    #[test]
    fn test_align_prefix_leaves_untyped_tail_uncovered() {
        let (alignment, covered) = Aligner::default()
            .align_prefix(&chars("The c"), &chars("The cat sat."))
            .unwrap();
        assert_eq!(covered, 5);
        assert_eq!(alignment.unfixed_errors(), 0);
    }

    #[test]
    fn test_align_prefix_prefers_column_near_input_length() {
        let (alignment, covered) = Aligner::default()
            .align_prefix(&chars("Thx"), &chars("The cat"))
            .unwrap();
        assert_eq!(covered, 3);
        assert_eq!(
            alignment.operations().last(),
            Some(&AlignOp::Substitute { input: 2, target: 2 })
        );
    }

    #[test]
    fn test_edit_distance_counts_unicode_chars() {
        assert_eq!(edit_distance("naïve", "naive").unwrap(), 1);
    }
}
