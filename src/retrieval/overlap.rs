//! Suffix/prefix overlap between chunk texts

/// Overlaps of this many characters or fewer are treated as coincidental
pub const MIN_OVERLAP: usize = 20;

/// Largest `n > MIN_OVERLAP` such that the last `n` chars of `a` equal the
/// first `n` chars of `b`, or 0 if there is none
///
/// Not symmetric: `overlap(a, b)` measures `a` followed by `b`.
pub fn overlap(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    overlap_chars(&a, &b)
}

pub(crate) fn overlap_chars(a: &[char], b: &[char]) -> usize {
    let longest = a.len().min(b.len());

    (MIN_OVERLAP + 1..=longest)
        .rev()
        .find(|&n| a[a.len() - n..] == b[..n])
        .unwrap_or(0)
}

/// Flattened `dim x dim` overlap matrix for one group of documents
///
/// Entry `(prefix, suffix)` holds how many chars of `prefix`'s tail match
/// `suffix`'s head. Diagonal and consumed entries are -1.
#[derive(Debug, Clone)]
pub struct OverlapMatrix {
    dim: usize,
    cells: Vec<i64>,
}

impl OverlapMatrix {
    /// Compute all pairwise overlaps of the given texts
    pub fn build(texts: &[Vec<char>]) -> Self {
        let dim = texts.len();
        let mut cells = Vec::with_capacity(dim * dim);

        for (row, prefix) in texts.iter().enumerate() {
            for (col, suffix) in texts.iter().enumerate() {
                let value = if row == col {
                    -1
                } else {
                    overlap_chars(prefix, suffix) as i64
                };
                cells.push(value);
            }
        }

        Self { dim, cells }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, prefix: usize, suffix: usize) -> i64 {
        self.cells[prefix * self.dim + suffix]
    }

    pub fn set(&mut self, prefix: usize, suffix: usize, value: i64) {
        self.cells[prefix * self.dim + suffix] = value;
    }

    /// First maximal entry in row-major order, if it is positive
    ///
    /// Ties go to the lowest prefix index, then the lowest suffix index.
    pub fn max_entry(&self) -> Option<(usize, usize, usize)> {
        let mut best: Option<(usize, i64)> = None;

        for (idx, &value) in self.cells.iter().enumerate() {
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((idx, value));
            }
        }

        match best {
            Some((idx, value)) if value > 0 => {
                Some((idx / self.dim, idx % self.dim, value as usize))
            }
            _ => None,
        }
    }

    /// Retire `prefix` as a prefix and `suffix` as a suffix
    ///
    /// Blanks the prefix row, the suffix column and the reversed pair.
    pub fn consume(&mut self, prefix: usize, suffix: usize) {
        for col in 0..self.dim {
            self.set(prefix, col, -1);
        }
        for row in 0..self.dim {
            self.set(row, suffix, -1);
        }
        self.set(suffix, prefix, -1);
    }
}
