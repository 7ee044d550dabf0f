//! Coplanar expansion: walk the points tied on one plane into an ordered
//! polygon, emit its fan triangles, and record it as a group.

use super::{Edge, GiftWrap, TriFace};
use crate::geom3::{normalize_or_zero, HalfSpace};

impl GiftWrap {
    /// `cop` holds the points found on the plane of `e` (two or more).
    pub(crate) fn deal_coplanar(&mut self, e: Edge, mut cop: Vec<usize>) {
        if self.invalid[e.start] || self.invalid[e.end] {
            return;
        }
        let eps = self.dist_eps;
        cop.push(e.start);
        cop.push(e.end);

        let ps = self.pts[e.start];
        let normal = normalize_or_zero((self.pts[e.end] - ps).cross(&(self.pts[cop[0]] - ps)));

        // Polygon boundary from e.end around to e.start, inside the plane.
        let mut ring: Vec<usize> = Vec::new();
        let (mut from, mut to) = (e.end, cop[0]);
        let mut budget = cop.len() as isize;
        while from != e.start {
            let pf = self.pts[from];
            let mut hs = HalfSpace::from_points(&pf, &self.pts[to], &(pf + normal));
            let mut line = vec![to];
            for &i in &cop {
                if i == from || i == to || self.invalid[i] || hs.inside(&self.pts[i], eps) {
                    continue;
                }
                if hs.on_plane(&self.pts[i], eps) {
                    line.push(i);
                } else {
                    to = i;
                    hs = HalfSpace::from_points(&pf, &self.pts[i], &(pf + normal));
                    line.clear();
                    line.push(i);
                }
            }

            let next_to = if line.len() == 1 {
                from = line[0];
                cop.iter().copied().find(|&j| j != from)
            } else {
                self.sort_by_dist(from, &mut line);
                from = line[line.len() - 1];
                cop.iter().copied().find(|&j| j != from && !self.invalid[j])
            };
            ring.push(from);
            budget -= 1;
            match next_to {
                Some(j) if budget >= 0 => to = j,
                _ => {
                    self.exception = true;
                    return;
                }
            }
        }

        if ring.len() <= 1 {
            self.exception = true;
            return;
        }

        // Fan from e.start; the last fan edge is queued without the hull
        // check because its triangle was just emitted.
        self.selective_push(Edge::new(ring[0], e.end));
        self.faces.push(TriFace::new(e.start, e.end, ring[0], true));
        let last = ring.len() - 2;
        for i in 0..last {
            self.selective_push(Edge::new(ring[i + 1], ring[i]));
            self.faces.push(TriFace::new(e.start, ring[i], ring[i + 1], true));
        }
        self.stack.push_or_cancel(Edge::new(ring[last + 1], ring[last]));

        for &i in &cop {
            self.invalid[i] = true;
        }
        ring.push(e.end);
        for &i in &ring {
            self.invalid[i] = false;
            self.extreme[i] = true;
        }
        tracing::trace!(size = ring.len(), "coplanar group");
        self.groups.push(ring);
    }
}
