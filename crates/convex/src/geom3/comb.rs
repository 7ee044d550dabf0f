//! Lazy lexicographic k-of-m combinations.
//!
//! The generator holds one index vector and advances it in place; face-removal
//! searches walk neighbor triples through `triples`.

/// Stateful enumerator of `n`-subsets of `0..m`, starting at `(0, 1, ..., n-1)`.
#[derive(Clone, Debug)]
pub struct CombGenerator {
    cur: Vec<usize>,
    n: usize,
    m: usize,
    solvable: bool,
    exhausted: bool,
}

impl CombGenerator {
    /// Unsolvable (and immediately exhausted) when `n == 0`, `m == 0` or `n > m`.
    pub fn new(n: usize, m: usize) -> Self {
        let solvable = n > 0 && m > 0 && n <= m;
        Self {
            cur: if solvable { (0..n).collect() } else { Vec::new() },
            n,
            m,
            solvable,
            exhausted: !solvable,
        }
    }

    #[inline]
    pub fn is_solvable(&self) -> bool {
        self.solvable
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Current combination, or `None` once every subset was produced.
    #[inline]
    pub fn current(&self) -> Option<&[usize]> {
        (!self.exhausted).then_some(self.cur.as_slice())
    }

    fn advance(&mut self) {
        // Rightmost slot that can still grow.
        let mut pos = None;
        for i in (0..self.n).rev() {
            if self.cur[i] != self.m - self.n + i {
                pos = Some(i);
                break;
            }
        }
        let Some(k) = pos else {
            self.exhausted = true;
            return;
        };
        self.cur[k] += 1;
        for i in k + 1..self.n {
            self.cur[i] = self.cur[i - 1] + 1;
        }
    }
}

impl Iterator for CombGenerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let out = self.cur.clone();
        self.advance();
        Some(out)
    }
}

/// All index triples of `0..m` in lexicographic order.
pub fn triples(m: usize) -> impl Iterator<Item = [usize; 3]> {
    CombGenerator::new(3, m).map(|c| [c[0], c[1], c[2]])
}
