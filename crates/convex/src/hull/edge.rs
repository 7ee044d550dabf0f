//! Work items of the gift-wrap builder: unordered edges, the cancelling edge
//! stack, and emitted triangles.

/// Edge between two point indices. Equality ignores direction.
#[derive(Clone, Copy, Debug, Eq)]
pub struct Edge {
    pub start: usize,
    pub end: usize,
}

impl Edge {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn in_face(&self, f: &TriFace) -> bool {
        f.v.contains(&self.start) && f.v.contains(&self.end)
    }
}

impl PartialEq for Edge {
    fn eq(&self, o: &Self) -> bool {
        (self.start == o.start && self.end == o.end) || (self.start == o.end && self.end == o.start)
    }
}

/// Triangle emitted by the builder. `in_polygon` marks the fan triangles
/// that only triangulate a coplanar group for bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriFace {
    pub v: [usize; 3],
    pub in_polygon: bool,
}

impl TriFace {
    #[inline]
    pub fn new(a: usize, b: usize, c: usize, in_polygon: bool) -> Self {
        Self {
            v: [a, b, c],
            in_polygon,
        }
    }
}

/// LIFO of open edges where pushing an edge already present removes it.
///
/// Each hull edge is reached from its two adjacent faces; the second visit
/// cancels the first instead of queueing the edge twice.
#[derive(Clone, Debug, Default)]
pub struct EdgeStack {
    items: Vec<Edge>,
}

impl EdgeStack {
    #[inline]
    pub fn push(&mut self, e: Edge) {
        self.items.push(e);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Edge> {
        self.items.pop()
    }

    /// Push `e` unless an equal edge is queued; in that case remove the
    /// topmost match. Returns `true` if `e` was pushed.
    pub fn push_or_cancel(&mut self, e: Edge) -> bool {
        if let Some(pos) = self.items.iter().rposition(|x| *x == e) {
            self.items.remove(pos);
            false
        } else {
            self.items.push(e);
            true
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
