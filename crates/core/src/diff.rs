//! Line-level diff between two versions of a file context.
//!
//! Matching follows Python's difflib.SequenceMatcher (without the junk
//! heuristic), so rendered diffs line up with what the dataset tooling has
//! always produced.

use std::collections::HashMap;
use std::ops::Range;

/// Which side(s) of the diff a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Equal,
    Removed,
    Added,
}

/// One line of a rendered diff.
///
/// `source_index` is the 0-based index in the original lines and is `None`
/// for added lines; `target_index` is the index in the edited lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
    pub source_index: Option<usize>,
    pub target_index: Option<usize>,
}

impl DiffLine {
    /// The line in `diff`-style notation (`  `, `- `, `+ ` prefixes).
    pub fn render(&self) -> String {
        let prefix = match self.tag {
            DiffTag::Equal => "  ",
            DiffTag::Removed => "- ",
            DiffTag::Added => "+ ",
        };
        format!("{prefix}{}", self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpcodeTag {
    Replace,
    Delete,
    Insert,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Opcode {
    tag: OpcodeTag,
    a: Range<usize>,
    b: Range<usize>,
}

/// `a[i..i + n] == b[j..j + n]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Match {
    i: usize,
    j: usize,
    n: usize,
}

struct SequenceMatcher<'a> {
    a: &'a [String],
    b: &'a [String],
    b2j: HashMap<&'a str, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [String], b: &'a [String]) -> Self {
        let mut b2j: HashMap<&str, Vec<usize>> = HashMap::new();
        for (j, line) in b.iter().enumerate() {
            b2j.entry(line.as_str()).or_default().push(j);
        }
        Self { a, b, b2j }
    }

    fn find_longest_match(&self, a: Range<usize>, b: Range<usize>) -> Match {
        let mut best = Match {
            i: a.start,
            j: b.start,
            n: 0,
        };
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in a.clone() {
            let mut next_runs = HashMap::new();
            for &j in self.b2j.get(self.a[i].as_str()).into_iter().flatten() {
                if j < b.start {
                    continue;
                }
                if j >= b.end {
                    break;
                }
                let n = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, n);
                if n > best.n {
                    best = Match {
                        i: i + 1 - n,
                        j: j + 1 - n,
                        n,
                    };
                }
            }
            run_ending_at = next_runs;
        }

        while best.i > a.start && best.j > b.start && self.a[best.i - 1] == self.b[best.j - 1] {
            best.i -= 1;
            best.j -= 1;
            best.n += 1;
        }
        while best.i + best.n < a.end
            && best.j + best.n < b.end
            && self.a[best.i + best.n] == self.b[best.j + best.n]
        {
            best.n += 1;
        }
        best
    }

    fn matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(0..self.a.len(), 0..self.b.len())];
        let mut found = Vec::new();

        while let Some((a, b)) = queue.pop() {
            let m = self.find_longest_match(a.clone(), b.clone());
            if m.n == 0 {
                continue;
            }
            if a.start < m.i && b.start < m.j {
                queue.push((a.start..m.i, b.start..m.j));
            }
            if m.i + m.n < a.end && m.j + m.n < b.end {
                queue.push((m.i + m.n..a.end, m.j + m.n..b.end));
            }
            found.push(m);
        }
        found.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(found.len() + 1);
        for m in found {
            match merged.last_mut() {
                Some(last) if last.i + last.n == m.i && last.j + last.n == m.j => last.n += m.n,
                _ => merged.push(m),
            }
        }
        merged.push(Match {
            i: self.a.len(),
            j: self.b.len(),
            n: 0,
        });
        merged
    }

    fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);

        for m in self.matching_blocks() {
            let tag = match (i < m.i, j < m.j) {
                (true, true) => Some(OpcodeTag::Replace),
                (true, false) => Some(OpcodeTag::Delete),
                (false, true) => Some(OpcodeTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode {
                    tag,
                    a: i..m.i,
                    b: j..m.j,
                });
            }
            if m.n > 0 {
                opcodes.push(Opcode {
                    tag: OpcodeTag::Equal,
                    a: m.i..m.i + m.n,
                    b: m.j..m.j + m.n,
                });
            }
            i = m.i + m.n;
            j = m.j + m.n;
        }
        opcodes
    }
}

/// Diff `before` against `after` line by line.
///
/// Replaced blocks are emitted as all removed lines followed by all added
/// lines.
pub fn line_diff(before: &[String], after: &[String]) -> Vec<DiffLine> {
    let matcher = SequenceMatcher::new(before, after);
    let mut out = Vec::with_capacity(before.len().max(after.len()));

    let removed = |range: Range<usize>, out: &mut Vec<DiffLine>| {
        out.extend(range.map(|i| DiffLine {
            tag: DiffTag::Removed,
            text: before[i].clone(),
            source_index: Some(i),
            target_index: None,
        }));
    };
    let added = |range: Range<usize>, out: &mut Vec<DiffLine>| {
        out.extend(range.map(|j| DiffLine {
            tag: DiffTag::Added,
            text: after[j].clone(),
            source_index: None,
            target_index: Some(j),
        }));
    };

    for op in matcher.opcodes() {
        match op.tag {
            OpcodeTag::Equal => out.extend(op.a.zip(op.b).map(|(i, j)| DiffLine {
                tag: DiffTag::Equal,
                text: before[i].clone(),
                source_index: Some(i),
                target_index: Some(j),
            })),
            OpcodeTag::Delete => removed(op.a, &mut out),
            OpcodeTag::Insert => added(op.b, &mut out),
            OpcodeTag::Replace => {
                removed(op.a, &mut out);
                added(op.b, &mut out);
            }
        }
    }
    out
}
