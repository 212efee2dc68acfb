//! Word-level diff used for the grammar score.
//!
//! This reproduces Python's `difflib.ndiff` closely enough that the
//! removed/added line counts agree: a Ratcliff/Obershelp matcher (including
//! the popular-element heuristic for sequences of 200+ items) produces the
//! opcodes, and replace blocks are refined by pairing the most similar words
//! (character ratio >= 0.75) or, failing that, the first identical pair.
//!
//! The score it feeds is a tally of add/remove operations, not an edit
//! distance.

use std::collections::HashMap;
use std::hash::Hash;

/// Sequences at least this long have their over-represented elements ignored
/// when looking for match anchors.
const AUTOJUNK_MIN_LEN: usize = 200;

const SIMILARITY_CUTOFF: f64 = 0.75;
const SIMILARITY_FLOOR: f64 = 0.74;

/// One line of diff output. Hint lines are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Equal(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

impl DiffLine<'_> {
    pub fn is_change(&self) -> bool {
        !matches!(self, DiffLine::Equal(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// Turns `a[a_lo..a_hi]` into `b[b_lo..b_hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub a_lo: usize,
    pub a_hi: usize,
    pub b_lo: usize,
    pub b_hi: usize,
}

/// `a[a..a + size] == b[b..b + size]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// Longest-contiguous-match sequence matcher.
pub struct SequenceMatcher<'s, T> {
    a: &'s [T],
    b: &'s [T],
    /// Positions of each element of `b`, minus popular elements.
    b2j: HashMap<&'s T, Vec<usize>>,
}

impl<'s, T: Eq + Hash> SequenceMatcher<'s, T> {
    pub fn new(a: &'s [T], b: &'s [T]) -> Self {
        let mut b2j: HashMap<&T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let threshold = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }
        Self { a, b, b2j }
    }

    fn find_longest_match(&self, a_lo: usize, a_hi: usize, b_lo: usize, b_hi: usize) -> Block {
        let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);

        // j2len[j] = length of the match ending at a[i - 1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in a_lo..a_hi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Popular elements never anchor a match but may still extend one.
        while best_i > a_lo && best_j > b_lo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        Block {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// Matching blocks in order, ending with a zero-size sentinel at `(len(a), len(b))`.
    fn matching_blocks(&self) -> Vec<Block> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();
        while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
            let m = self.find_longest_match(a_lo, a_hi, b_lo, b_hi);
            if m.size == 0 {
                continue;
            }
            found.push(m);
            if a_lo < m.a && b_lo < m.b {
                queue.push((a_lo, m.a, b_lo, m.b));
            }
            if m.a + m.size < a_hi && m.b + m.size < b_hi {
                queue.push((m.a + m.size, a_hi, m.b + m.size, b_hi));
            }
        }
        found.sort_by_key(|m| (m.a, m.b, m.size));

        let mut blocks = Vec::with_capacity(found.len() + 1);
        let mut current = Block { a: 0, b: 0, size: 0 };
        for m in found {
            if current.a + current.size == m.a && current.b + current.size == m.b {
                current.size += m.size;
            } else {
                if current.size > 0 {
                    blocks.push(current);
                }
                current = m;
            }
        }
        if current.size > 0 {
            blocks.push(current);
        }
        blocks.push(Block {
            a: self.a.len(),
            b: self.b.len(),
            size: 0,
        });
        blocks
    }

    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);
        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(OpTag::Replace),
                (true, false) => Some(OpTag::Delete),
                (false, true) => Some(OpTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a_lo: i,
                    a_hi: m.a,
                    b_lo: j,
                    b_hi: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                ops.push(Opcode {
                    tag: OpTag::Equal,
                    a_lo: m.a,
                    a_hi: i,
                    b_lo: m.b,
                    b_hi: j,
                });
            }
        }
        ops
    }

    /// Similarity in `[0, 1]`: twice the matched element count over the total length.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        2.0 * matches as f64 / total as f64
    }
}

/// Line-oriented diff of two word lists, one word per line.
pub fn ndiff<'w>(a: &[&'w str], b: &[&'w str]) -> Vec<DiffLine<'w>> {
    let mut out = Vec::new();
    for op in SequenceMatcher::new(a, b).opcodes() {
        match op.tag {
            OpTag::Replace => fancy_replace(a, op.a_lo, op.a_hi, b, op.b_lo, op.b_hi, &mut out),
            OpTag::Delete => dump(DiffLine::Removed, &a[op.a_lo..op.a_hi], &mut out),
            OpTag::Insert => dump(DiffLine::Added, &b[op.b_lo..op.b_hi], &mut out),
            OpTag::Equal => dump(DiffLine::Equal, &a[op.a_lo..op.a_hi], &mut out),
        }
    }
    out
}

/// Number of word edits between `original` and `corrected`: removed plus
/// added words in the diff, halved (rounding down).
pub fn count_text_differences(original: &str, corrected: &str) -> usize {
    let a: Vec<&str> = original.split_whitespace().collect();
    let b: Vec<&str> = corrected.split_whitespace().collect();
    ndiff(&a, &b).iter().filter(|line| line.is_change()).count() / 2
}

fn dump<'w>(kind: fn(&'w str) -> DiffLine<'w>, words: &[&'w str], out: &mut Vec<DiffLine<'w>>) {
    out.extend(words.iter().map(|&w| kind(w)));
}

fn plain_replace<'w>(
    a: &[&'w str],
    b: &[&'w str],
    out: &mut Vec<DiffLine<'w>>,
) {
    if b.len() < a.len() {
        dump(DiffLine::Added, b, out);
        dump(DiffLine::Removed, a, out);
    } else {
        dump(DiffLine::Removed, a, out);
        dump(DiffLine::Added, b, out);
    }
}

fn char_ratio(x: &str, y: &str) -> f64 {
    let xs: Vec<char> = x.chars().collect();
    let ys: Vec<char> = y.chars().collect();
    SequenceMatcher::new(&xs, &ys).ratio()
}

/// Split a replace block around its best-matching pair of words and recurse.
fn fancy_replace<'w>(
    a: &[&'w str],
    a_lo: usize,
    a_hi: usize,
    b: &[&'w str],
    b_lo: usize,
    b_hi: usize,
    out: &mut Vec<DiffLine<'w>>,
) {
    let mut best_ratio = SIMILARITY_FLOOR;
    let mut best = None;
    let mut first_identical = None;

    for j in b_lo..b_hi {
        for i in a_lo..a_hi {
            if a[i] == b[j] {
                first_identical.get_or_insert((i, j));
                continue;
            }
            let ratio = char_ratio(a[i], b[j]);
            if ratio > best_ratio {
                best_ratio = ratio;
                best = Some((i, j));
            }
        }
    }

    let (best_i, best_j, identical) = match (best, first_identical) {
        (Some((i, j)), _) if best_ratio >= SIMILARITY_CUTOFF => (i, j, false),
        (_, Some((i, j))) => (i, j, true),
        _ => {
            plain_replace(&a[a_lo..a_hi], &b[b_lo..b_hi], out);
            return;
        }
    };

    fancy_helper(a, a_lo, best_i, b, b_lo, best_j, out);
    if identical {
        out.push(DiffLine::Equal(a[best_i]));
    } else {
        out.push(DiffLine::Removed(a[best_i]));
        out.push(DiffLine::Added(b[best_j]));
    }
    fancy_helper(a, best_i + 1, a_hi, b, best_j + 1, b_hi, out);
}

fn fancy_helper<'w>(
    a: &[&'w str],
    a_lo: usize,
    a_hi: usize,
    b: &[&'w str],
    b_lo: usize,
    b_hi: usize,
    out: &mut Vec<DiffLine<'w>>,
) {
    if a_lo < a_hi {
        if b_lo < b_hi {
            fancy_replace(a, a_lo, a_hi, b, b_lo, b_hi, out);
        } else {
            dump(DiffLine::Removed, &a[a_lo..a_hi], out);
        }
    } else if b_lo < b_hi {
        dump(DiffLine::Added, &b[b_lo..b_hi], out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DiffLine::{Added, Equal, Removed};

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    // Expected values below were produced with Python's difflib.ndiff.

    #[test]
    fn identical_texts_have_no_differences() {
        assert_eq!(count_text_differences("the cat sat", "the cat sat"), 0);
        assert_eq!(count_text_differences("", ""), 0);
    }

    #[test]
    fn substitution_and_deletion() {
        let original = "This are a test sentence with a grammatical errors.";
        let corrected = "This is a test sentence with grammatical errors.";
        assert_eq!(count_text_differences(original, corrected), 1);

        let a = words(original);
        let b = words(corrected);
        assert_eq!(
            ndiff(&a, &b),
            vec![
                Equal("This"),
                Removed("are"),
                Added("is"),
                Equal("a"),
                Equal("test"),
                Equal("sentence"),
                Equal("with"),
                Removed("a"),
                Equal("grammatical"),
                Equal("errors."),
            ]
        );
    }

    #[test]
    fn several_corrections() {
        assert_eq!(
            count_text_differences(
                "He go to school yesterday and buy a apple.",
                "He went to school yesterday and bought an apple."
            ),
            3
        );
    }

    #[test]
    fn pure_insertion_is_halved() {
        assert_eq!(count_text_differences("", "hello world"), 1);
    }

    #[test]
    fn reorder_counts_one_move_as_one_edit() {
        let a = words("one two three four");
        let b = words("one three two four");
        assert_eq!(
            ndiff(&a, &b),
            vec![
                Equal("one"),
                Added("three"),
                Equal("two"),
                Removed("three"),
                Equal("four"),
            ]
        );
        assert_eq!(count_text_differences("one two three four", "one three two four"), 1);
    }

    #[test]
    fn dissimilar_replacement_lists_shorter_side_first() {
        let a = words("a b c");
        let b = words("x y");
        assert_eq!(
            ndiff(&a, &b),
            vec![Added("x"), Added("y"), Removed("a"), Removed("b"), Removed("c")]
        );
        assert_eq!(count_text_differences("a b c", "x y"), 2);
    }

    #[test]
    fn earliest_match_wins() {
        let a = words("colour colour");
        let b = words("color colour");
        assert_eq!(
            ndiff(&a, &b),
            vec![Added("color"), Equal("colour"), Removed("colour")]
        );
    }

    #[test]
    fn popular_words_do_not_anchor_long_texts() {
        let original: Vec<String> = (0..80).map(|i| format!("the word{i} the")).collect();
        let corrected: Vec<String> = (0..80).map(|i| format!("the word{i} a")).collect();
        assert_eq!(
            count_text_differences(&original.join(" "), &corrected.join(" ")),
            80
        );
    }

    #[test]
    fn char_ratio_matches_difflib() {
        assert_eq!(char_ratio("abcd", "bcde"), 0.75);
        assert_eq!(char_ratio("", ""), 1.0);
        assert_eq!(char_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn opcodes_cover_both_sequences() {
        let a = words("a b c d e");
        let b = words("a x c e f");
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        assert_eq!(ops.first().map(|o| (o.a_lo, o.b_lo)), Some((0, 0)));
        assert_eq!(ops.last().map(|o| (o.a_hi, o.b_hi)), Some((5, 5)));
        for pair in ops.windows(2) {
            assert_eq!(pair[0].a_hi, pair[1].a_lo);
            assert_eq!(pair[0].b_hi, pair[1].b_lo);
        }
    }
}
