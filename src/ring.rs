//! Ring construction and clean-up.

use alloc::vec::Vec;
use num_traits::float::Float;

use crate::node::{insert_node, remove_node, ring_nodes, Node, NodeIndex};
use crate::predicates::{area, equals};

/// Twice the signed area of a closed ring of points (positive when counter-clockwise with y up).
pub(crate) fn signed_area<T: Float>(
    points: impl DoubleEndedIterator<Item = [T; 2]> + Clone,
) -> T {
    let Some([mut bx, mut by]) = points.clone().next_back() else {
        return T::zero();
    };
    points.fold(T::zero(), |sum, [ax, ay]| {
        let sum = sum + (bx - ax) * (ay + by);
        (bx, by) = (ax, ay);
        sum
    })
}

#[inline]
fn collinear<T: Float>([ax, ay]: [T; 2], [bx, by]: [T; 2], [cx, cy]: [T; 2]) -> bool {
    (by - ay) * (cx - bx) - (bx - ax) * (cy - by) == T::zero()
}

/// Collect the positions in `start..end` that survive duplicate and collinear filtering.
///
/// A vertex is dropped when it repeats the previous kept vertex, and a kept vertex is dropped
/// when it sits on a straight (or folded back) run between its kept neighbours. The seam
/// between the last and the first vertex is filtered as well.
fn retain_vertices<T: Float>(data: &[[T; 2]], start: usize, end: usize, kept: &mut Vec<u32>) {
    kept.clear();
    for (i, &p) in data[start..end].iter().enumerate() {
        let mut duplicate = false;
        while let Some(&last) = kept.last() {
            let last = data[last as usize];
            if last == p {
                duplicate = true;
                break;
            }
            let n = kept.len();
            if n >= 2 && collinear(data[kept[n - 2] as usize], last, p) {
                kept.pop();
            } else {
                break;
            }
        }
        if !duplicate {
            kept.push((start + i) as u32);
        }
    }

    let mut head = 0;
    while kept.len() - head >= 3 {
        let n = kept.len();
        let [first, second] = [kept[head], kept[head + 1]].map(|k| data[k as usize]);
        let [before_last, last] = [kept[n - 2], kept[n - 1]].map(|k| data[k as usize]);
        if last == first || collinear(before_last, last, first) {
            kept.pop();
        } else if collinear(last, first, second) {
            head += 1;
        } else {
            break;
        }
    }
    kept.drain(..head);
}

/// Build a circular doubly linked ring over vertices `start..end` with the requested winding.
///
/// `clockwise` is meant in screen space (y down); outer rings are linked clockwise and
/// holes counter-clockwise.
///
/// Duplicate and collinear vertices are skipped unless that would leave fewer than three,
/// in which case the raw sequence is linked as-is. Returns the last linked node, or `None`
/// for an empty range.
pub(crate) fn linked_list<T: Float>(
    nodes: &mut Vec<Node<T>>,
    data: &[[T; 2]],
    start: usize,
    end: usize,
    clockwise: bool,
    kept: &mut Vec<u32>,
) -> Option<NodeIndex> {
    if start >= end {
        return None;
    }
    retain_vertices(data, start, end, kept);
    if kept.len() < 3 {
        kept.clear();
        kept.extend(start as u32..end as u32);
    }

    let area = signed_area(kept.iter().map(|&k| data[k as usize]));
    let mut last_i: Option<NodeIndex> = None;
    let mut link = |k: u32| {
        let [x, y] = data[k as usize];
        last_i = Some(insert_node(nodes, k, x, y, last_i));
    };
    if clockwise == (area > T::zero()) {
        kept.iter().copied().for_each(&mut link);
    } else {
        kept.iter().rev().copied().for_each(&mut link);
    }

    if let Some(li) = last_i {
        let last = node!(nodes, li);
        if equals(last, node!(nodes, last.next_i)) {
            let (_, next_i) = remove_node(nodes, li);
            last_i = Some(next_i);
        }
    }
    last_i
}

/// Remove duplicate and collinear nodes between `start_i` and `end_i` (the whole ring when
/// `end_i` is `None`). Steiner nodes are kept. Returns a node that is still in the ring.
pub(crate) fn filter_points<T: Float>(
    nodes: &mut [Node<T>],
    start_i: NodeIndex,
    end_i: Option<NodeIndex>,
) -> NodeIndex {
    let mut end_i = end_i.unwrap_or(start_i);

    let mut p_i = start_i;
    loop {
        let p = node!(nodes, p_i);
        let p_next = node!(nodes, p.next_i);
        let removable = !p.steiner
            && (equals(p, p_next) || area(node!(nodes, p.prev_i), p, p_next) == T::zero());
        if removable {
            let (prev_i, next_i) = remove_node(nodes, p_i);
            (p_i, end_i) = (prev_i, prev_i);
            if p_i == next_i {
                return end_i;
            }
        } else {
            p_i = p.next_i;
            if p_i == end_i {
                return end_i;
            }
        }
    }
}

/// Leftmost node of a ring, lowest y on ties.
pub(crate) fn get_leftmost<T: Float>(nodes: &[Node<T>], start_i: NodeIndex) -> NodeIndex {
    let first = (start_i, node!(nodes, start_i));
    let (leftmost_i, _) = ring_nodes(nodes, start_i).fold(first, |(l_i, l), (p_i, p)| {
        if p.x < l.x || (p.x == l.x && p.y < l.y) {
            (p_i, p)
        } else {
            (l_i, l)
        }
    });
    leftmost_i
}
