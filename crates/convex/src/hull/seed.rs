//! Seed edge search: a first edge that is guaranteed to lie on the hull.
//!
//! Start from the lowest point(s) in `y`. A single lowest point is swept
//! against planes containing the reference direction; ties at the same height
//! are resolved by `z`, then by the extreme `x` pair.

use super::{Edge, GiftWrap};
use crate::geom3::{HalfSpace, Vec3};

impl GiftWrap {
    /// Points within `identical_eps` of the running minimum of `key`.
    fn lowest_by(&self, ids: impl IntoIterator<Item = usize>, key: impl Fn(&Vec3) -> f64) -> Vec<usize> {
        let tol = self.identical_eps;
        let mut it = ids.into_iter();
        let Some(first) = it.next() else {
            return Vec::new();
        };
        let mut low = vec![first];
        let mut min = key(&self.pts[first]);
        for i in it {
            let k = key(&self.pts[i]);
            if min - k > tol {
                min = k;
                low.clear();
                low.push(i);
            } else if (min - k).abs() < tol {
                low.push(i);
            }
        }
        low
    }

    /// Sweep `cands` around `start` with planes through `start + dir`; returns
    /// the final plane and the candidates lying on it.
    fn sweep(&self, start: usize, cands: &[usize], dir: &Vec3) -> (HalfSpace, Vec<usize>) {
        let ps = self.pts[start];
        let apex = ps + dir;
        let eps = self.dist_eps;
        let mut hs = HalfSpace::from_points(&ps, &self.pts[cands[0]], &apex);
        let mut on = vec![cands[0]];
        for &i in &cands[1..] {
            if i == start || hs.inside(&self.pts[i], eps) {
                continue;
            }
            if hs.on_plane(&self.pts[i], eps) {
                on.push(i);
            } else {
                hs = HalfSpace::from_points(&ps, &self.pts[i], &apex);
                on.clear();
                on.push(i);
            }
        }
        (hs, on)
    }

    /// Farthest of several collinear survivors ends the edge; the nearer ones
    /// can never be hull vertices and are invalidated.
    fn farthest_collinear(&mut self, start: usize, mut line: Vec<usize>) -> Edge {
        if line.len() == 1 {
            return Edge::new(start, line[0]);
        }
        self.sort_by_dist(start, &mut line);
        let Some(end) = line.pop() else {
            return Edge::new(start, start);
        };
        for i in line {
            self.invalid[i] = true;
        }
        Edge::new(start, end)
    }

    pub(crate) fn search_first_edge(&mut self, ref_dir: &Vec3) -> Edge {
        let n = self.pts.len();
        let low = self.lowest_by(0..n, |p| p.y);

        match low.len() {
            1 => {
                let start = low[0];
                let others: Vec<usize> = (0..n).filter(|&i| i != start).collect();
                if others.is_empty() {
                    return Edge::new(start, start);
                }
                let (hs, on) = self.sweep(start, &others, ref_dir);
                if on.len() == 1 {
                    return Edge::new(start, on[0]);
                }
                // Several points on the supporting plane: sweep again inside it.
                let (_, line) = self.sweep(start, &on, &hs.n);
                self.farthest_collinear(start, line)
            }
            2 => Edge::new(low[0], low[1]),
            _ => {
                let zlow = self.lowest_by(low.iter().copied(), |p| p.z);
                if zlow.len() == 1 {
                    let start = zlow[0];
                    let others: Vec<usize> = low.iter().copied().filter(|&i| i != start).collect();
                    let (_, line) = self.sweep(start, &others, &Vec3::new(0.0, -1.0, 0.0));
                    return self.farthest_collinear(start, line);
                }
                let tol = self.identical_eps;
                let (mut xmin, mut xmax) = (zlow[0], zlow[0]);
                let (mut vmin, mut vmax) = (self.pts[xmin].x, self.pts[xmax].x);
                for &i in &zlow[1..] {
                    let x = self.pts[i].x;
                    if vmin - x > tol {
                        vmin = x;
                        xmin = i;
                    }
                    if x - vmax > tol {
                        vmax = x;
                        xmax = i;
                    }
                }
                for &i in &zlow {
                    self.invalid[i] = true;
                }
                for i in [xmin, xmax] {
                    self.invalid[i] = false;
                    self.extreme[i] = true;
                }
                Edge::new(xmin, xmax)
            }
        }
    }
}
