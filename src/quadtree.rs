//! Point-region quad-tree over `(x, y, length)` match records, plus the
//! area-match counting routine used to render a [`crate::grid::DotGrid`].
//!
//! A node is a Rust enum, statically either a leaf or an internal node
//! with four children, rather than a tagged union — there is no way to
//! read the wrong variant.
//!
//! Area-match counting lives here as [`QuadTree::count_area_matches`]
//! rather than on the dot store, since it needs to probe the tree
//! directly via [`QuadTree::point_lookup`].

use crate::dotstore::DotHandle;

/// Leaves hold up to this many distinct `(x, y)` points before splitting.
const NUM_DOTS: usize = 16;

const NW: usize = 0;
const NE: usize = 1;
const SW: usize = 2;
const SE: usize = 3;

/// A point stored in the index: the match record plus a handle back to the
/// owning [`crate::dotstore::DotStore`] entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedDot {
    pub x: i64,
    pub y: i64,
    pub length: i64,
    pub handle: DotHandle,
}

#[derive(Debug)]
enum QuadNode {
    Leaf {
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        dots: [Option<IndexedDot>; NUM_DOTS],
    },
    Internal {
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        split_x: i64,
        split_y: i64,
        children: [Option<Box<QuadNode>>; 4],
    },
}

impl QuadNode {
    fn new_leaf(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        QuadNode::Leaf { x1, y1, x2, y2, dots: [None; NUM_DOTS] }
    }

    fn bbox(&self) -> (i64, i64, i64, i64) {
        match *self {
            QuadNode::Leaf { x1, y1, x2, y2, .. } => (x1, y1, x2, y2),
            QuadNode::Internal { x1, y1, x2, y2, .. } => (x1, y1, x2, y2),
        }
    }

    fn insert(&mut self, dot: IndexedDot) {
        match self {
            QuadNode::Internal { split_x, split_y, children, x1, y1, x2, y2 } => {
                let (sx, sy) = (*split_x, *split_y);
                let (bx1, by1, bx2, by2) = (*x1, *y1, *x2, *y2);
                let direction = if dot.x < sx {
                    if dot.y < sy { NW } else { SW }
                } else if dot.y < sy {
                    NE
                } else {
                    SE
                };
                if children[direction].is_none() {
                    let child_bbox = match direction {
                        NW => (bx1, by1, sx, sy),
                        NE => (sx, by1, bx2, sy),
                        SW => (bx1, sy, sx, by2),
                        SE => (sx, sy, bx2, by2),
                        _ => unreachable!(),
                    };
                    children[direction] = Some(Box::new(QuadNode::new_leaf(
                        child_bbox.0,
                        child_bbox.1,
                        child_bbox.2,
                        child_bbox.3,
                    )));
                }
                children[direction].as_mut().unwrap().insert(dot);
            }
            QuadNode::Leaf { x1, y1, x2, y2, dots } => {
                // merge: a coincident (x, y) keeps the longer match.
                for slot in dots.iter_mut().flatten() {
                    if slot.x == dot.x && slot.y == dot.y {
                        if slot.length < dot.length {
                            slot.length = dot.length;
                            slot.handle = dot.handle;
                        }
                        return;
                    }
                }

                if let Some(slot) = dots.iter_mut().find(|s| s.is_none()) {
                    *slot = Some(dot);
                    return;
                }

                // the leaf is full of distinct points: split and retry.
                let (bx1, by1, bx2, by2) = (*x1, *y1, *x2, *y2);
                let saved: Vec<IndexedDot> = dots.iter().filter_map(|d| *d).collect();
                let split_x = (bx2 - bx1) / 2 + bx1;
                let split_y = (by2 - by1) / 2 + by1;
                *self = QuadNode::Internal {
                    x1: bx1,
                    y1: by1,
                    x2: bx2,
                    y2: by2,
                    split_x,
                    split_y,
                    children: [None, None, None, None],
                };

                // a 2x2-or-smaller node receiving NUM_DOTS distinct
                // coordinates cannot actually spread across all four
                // quadrants and would split forever; assert that does not
                // happen rather than looping.
                if bx2 - bx1 <= 2 && by2 - by1 <= 2 {
                    debug_assert!(
                        saved.iter().map(|d| (d.x, d.y)).collect::<std::collections::HashSet<_>>().len() > 1,
                        "quad-tree leaf of size <=2x2 received NUM_DOTS coincident points"
                    );
                }

                for d in saved {
                    self.insert(d);
                }
                self.insert(dot);
            }
        }
    }

    fn delete(&mut self, x: i64, y: i64) -> bool {
        match self {
            QuadNode::Leaf { dots, .. } => {
                if let Some(pos) = dots.iter().position(|d| matches!(d, Some(d) if d.x == x && d.y == y)) {
                    dots[pos] = None;
                    true
                } else {
                    false
                }
            }
            QuadNode::Internal { split_x, split_y, children, .. } => {
                let (sx, sy) = (*split_x, *split_y);
                let direction = if x < sx {
                    if y < sy { NW } else { SW }
                } else if y < sy {
                    NE
                } else {
                    SE
                };
                match children[direction].as_mut() {
                    Some(child) => child.delete(x, y),
                    None => false,
                }
            }
        }
    }

    fn range_query(&self, qx1: i64, qy1: i64, qx2: i64, qy2: i64, out: &mut Vec<IndexedDot>) {
        let (x1, y1, x2, y2) = self.bbox();
        if x1 > qx2 || x2 < qx1 || y1 > qy2 || y2 < qy1 {
            return;
        }
        match self {
            QuadNode::Leaf { dots, .. } => {
                for dot in dots.iter().flatten() {
                    if dot.x >= qx1 && dot.x <= qx2 && dot.y >= qy1 && dot.y <= qy2 {
                        out.push(*dot);
                    }
                }
            }
            QuadNode::Internal { children, .. } => {
                for child in children.iter().flatten() {
                    child.range_query(qx1, qy1, qx2, qy2, out);
                }
            }
        }
    }
}

/// A spatial index over a fixed `[x1, y1, x2, y2]` world, built once and
/// queried many times.
#[derive(Debug)]
pub struct QuadTree {
    root: Option<QuadNode>,
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

impl QuadTree {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        assert!(x1 < x2, "quad-tree requires x1 < x2");
        assert!(y1 < y2, "quad-tree requires y1 < y2");
        QuadTree { root: None, x1, y1, x2, y2 }
    }

    pub fn insert(&mut self, x: i64, y: i64, length: i64, handle: DotHandle) {
        if self.root.is_none() {
            self.root = Some(QuadNode::new_leaf(self.x1, self.y1, self.x2, self.y2));
        }
        self.root.as_mut().unwrap().insert(IndexedDot { x, y, length, handle });
    }

    /// Removes the point at `(x, y)`. The point must not have moved from
    /// its insertion coordinates.
    pub fn delete(&mut self, x: i64, y: i64) -> bool {
        match self.root.as_mut() {
            Some(root) => root.delete(x, y),
            None => false,
        }
    }

    pub fn range_query(&self, x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<IndexedDot> {
        assert!(x1 <= x2 && y1 <= y2);
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.range_query(x1, y1, x2, y2, &mut out);
        }
        out
    }

    /// Exact point lookup.
    pub fn point_lookup(&self, x: i64, y: i64) -> Option<IndexedDot> {
        self.range_query(x, y, x, y).into_iter().next()
    }

    pub fn longest_in_row(&self, y: i64) -> Option<IndexedDot> {
        self.range_query(self.x1, y, self.x2, y)
            .into_iter()
            .max_by_key(|d| d.length)
    }

    pub fn longest_in_column(&self, x: i64) -> Option<IndexedDot> {
        self.range_query(x, self.y1, x, self.y2)
            .into_iter()
            .max_by_key(|d| d.length)
    }

    /// Counts how many unit steps of stored matches fall inside the
    /// rectangle `[x1, x2) x [y1, y2)`, accounting for diagonals that begin
    /// outside the window (above it or to its left) but protrude into it.
    ///
    /// The three-zone geometry (inside / above / left) and the
    /// intentional `>=`/`>` edge asymmetry between the "above" and "left"
    /// tests avoid double-counting a diagonal that crosses the window's
    /// top-left corner exactly once.
    pub fn count_area_matches(&self, x1: f64, y1: f64, x2: f64, y2: f64, window: f64) -> i64 {
        let qx1 = (x1 - window).floor() as i64;
        let qy1 = (y1 - window).floor() as i64;
        let qx2 = x2.ceil() as i64;
        let qy2 = y2.ceil() as i64;

        let candidates = self.range_query(qx1, qy1, qx2, qy2);
        let mut count: i64 = 0;

        for dot in candidates {
            let in_outer = dot.x as f64 >= x1 - window
                && dot.y as f64 >= y1 - window
                && (dot.x as f64) < x2
                && (dot.y as f64) < y2;
            if !in_outer {
                continue;
            }

            let x = dot.x as f64 + 0.5;
            let y = dot.y as f64 + 0.5;
            let length = dot.length as f64;
            let mut protrude;

            if x >= x1 && x < x2 && y >= y1 && y < y2 {
                // zone 1: inside the window.
                protrude = length;
                if x + protrude > x2 {
                    protrude = x2 - x;
                }
                if y + protrude > y2 {
                    protrude = y2 - y;
                }
                if protrude > 0.0 {
                    let mut xp = x as i64;
                    let mut yp = y as i64;
                    loop {
                        count += 1;
                        protrude -= 1.0;
                        xp += 1;
                        yp += 1;
                        if self.point_lookup(xp, yp).is_some() || protrude < 1.0 {
                            break;
                        }
                    }
                }
            } else if x >= (y - y1 + x1) && x < (y - y1 + x2) {
                // zone 2: the parallelogram above the window (on the line
                // counts as "above" -- the `>=` side of the asymmetry).
                if length > y1 - y {
                    protrude = length - (y1 - y);
                    let sigma = length - (x2 - x);
                    if sigma > 0.0 {
                        protrude -= sigma;
                    }
                    let mut xp = x as i64;
                    let mut yp = y as i64;
                    loop {
                        if yp as f64 >= y1 {
                            count += 1;
                            protrude -= 1.0;
                        }
                        xp += 1;
                        yp += 1;
                        if self.point_lookup(xp, yp).is_some() || protrude < 1.0 {
                            break;
                        }
                    }
                }
            } else if y > (x - x1 + y1) && y < (x - x1 + y2) {
                // zone 3: the parallelogram to the left of the window (the
                // `>` side of the asymmetry -- the shared diagonal belongs
                // to zone 2, not zone 3).
                if length > x1 - x {
                    protrude = length - (x1 - x);
                    let sigma = length - (y2 - y);
                    if sigma > 0.0 {
                        protrude -= sigma;
                    }
                    let mut xp = x as i64;
                    let mut yp = y as i64;
                    loop {
                        if xp as f64 >= x1 {
                            count += 1;
                            protrude -= 1.0;
                        }
                        xp += 1;
                        yp += 1;
                        if self.point_lookup(xp, yp).is_some() || protrude < 1.0 {
                            break;
                        }
                    }
                }
            }
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: u32) -> DotHandle {
        DotHandle::new_for_test(0, i)
    }

    #[test]
    fn range_query_returns_points_in_rect() {
        let mut tree = QuadTree::new(0, 0, 100, 100);
        tree.insert(5, 5, 3, handle(0));
        tree.insert(50, 50, 7, handle(1));
        tree.insert(99, 99, 1, handle(2));

        let found = tree.range_query(0, 0, 10, 10);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].x, 5);
    }

    #[test]
    fn duplicate_coordinates_merge_to_max_length() {
        let mut tree = QuadTree::new(0, 0, 16, 16);
        tree.insert(4, 4, 2, handle(0));
        tree.insert(4, 4, 9, handle(1));
        tree.insert(4, 4, 3, handle(2));

        let found = tree.point_lookup(4, 4).unwrap();
        assert_eq!(found.length, 9);
    }

    #[test]
    fn splitting_preserves_all_distinct_points() {
        let mut tree = QuadTree::new(0, 0, 1000, 1000);
        for i in 0..200i64 {
            tree.insert(i, i, 1, handle(i as u32));
        }
        let found = tree.range_query(0, 0, 999, 999);
        assert_eq!(found.len(), 200);
    }

    #[test]
    fn delete_removes_exact_point() {
        let mut tree = QuadTree::new(0, 0, 100, 100);
        tree.insert(10, 20, 5, handle(0));
        assert!(tree.point_lookup(10, 20).is_some());
        assert!(tree.delete(10, 20));
        assert!(tree.point_lookup(10, 20).is_none());
    }

    #[test]
    fn count_area_matches_on_diagonal_dots() {
        let mut tree = QuadTree::new(0, 0, 300, 300);
        for i in 0..=299i64 {
            tree.insert(i, i, 300 - i, handle(i as u32));
        }

        // a window entirely inside the diagonal's run should count every
        // unit step the longest diagonal protrudes through it.
        let count = tree.count_area_matches(0.0, 0.0, 10.0, 10.0, 0.0);
        assert!(count >= 10);
    }

    #[test]
    fn unit_cell_invariant_is_zero_or_one() {
        // every integer-aligned 1x1 cell sees at most one dot.
        let mut tree = QuadTree::new(0, 0, 120, 120);
        for i in 0..114i64 {
            tree.insert(i, i % 37, 1, handle(i as u32));
        }
        for i in 0..114i64 {
            let c = tree.count_area_matches(i as f64, (i % 37) as f64, i as f64 + 1.0, (i % 37) as f64 + 1.0, 0.0);
            assert!(c == 0 || c == 1, "cell at {} had count {}", i, c);
        }
    }
}
