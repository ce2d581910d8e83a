//! The ear slicing loop and its fallback tiers.

use alloc::vec::Vec;
use core::ops::RangeInclusive;
use core::ptr;
use num_traits::float::Float;

use crate::node::{remove_node, split_polygon, Node, NodeIndex};
use crate::predicates::{
    area, equals, intersects, is_valid_diagonal, locally_inside, point_in_triangle_except_first,
};
use crate::ring::filter_points;
use crate::zorder::{index_curve, ZOrder};
use crate::Index;

/// Preparation a ring has been through before the current clipping attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    /// plain clipping
    Clip,
    /// duplicates and collinear runs were filtered again
    Refiltered,
    /// small self-intersections were cured
    Cured,
}

/// A ring waiting to be clipped.
pub(crate) type Job = (NodeIndex, Tier);

/// Triangulate the ring containing `start_i`, escalating through the fallback tiers.
///
/// Sub-rings produced by splitting are processed depth-first from `work` instead of by
/// recursion. When `zorder` is set every fresh ring is indexed on the curve first.
pub(crate) fn earcut_linked<T: Float, N: Index>(
    nodes: &mut Vec<Node<T>>,
    start_i: NodeIndex,
    triangles: &mut Vec<N>,
    zorder: Option<&ZOrder<T>>,
    work: &mut Vec<Job>,
) {
    work.clear();
    work.push((start_i, Tier::Clip));

    while let Some((ear_i, tier)) = work.pop() {
        if tier == Tier::Clip {
            if let Some(zorder) = zorder {
                index_curve(nodes, ear_i, zorder);
            }
        }
        let Some(stuck_i) = clip_ears(nodes, ear_i, triangles, zorder) else {
            continue;
        };

        match tier {
            Tier::Clip => {
                let vertex = node!(nodes, stuck_i).i;
                log::trace!("no ear found; filtering ring at vertex {vertex}");
                let ear_i = filter_points(nodes, stuck_i, None);
                work.push((ear_i, Tier::Refiltered));
            }
            Tier::Refiltered => {
                log::trace!("no ear found; curing local intersections");
                let filtered_i = filter_points(nodes, stuck_i, None);
                let ear_i = cure_local_intersections(nodes, filtered_i, triangles);
                work.push((ear_i, Tier::Cured));
            }
            Tier::Cured => match split_earcut(nodes, stuck_i) {
                Some((a_i, c_i)) => {
                    // `a` is popped first so output order matches a depth-first recursion
                    work.push((c_i, Tier::Clip));
                    work.push((a_i, Tier::Clip));
                }
                None => {
                    log::debug!(
                        "no valid diagonal; abandoning ring at vertex {}",
                        node!(nodes, stuck_i).i
                    );
                }
            },
        }
    }
}

/// Clip ears off the ring until it is exhausted (`None`) or a full lap finds no ear, in which
/// case the node where the lap ended is returned.
fn clip_ears<T: Float, N: Index>(
    nodes: &mut [Node<T>],
    mut ear_i: NodeIndex,
    triangles: &mut Vec<N>,
    zorder: Option<&ZOrder<T>>,
) -> Option<NodeIndex> {
    let mut stop_i = ear_i;
    loop {
        let ear = node!(nodes, ear_i);
        if ear.prev_i == ear.next_i {
            return None;
        }
        let (prev_i, next_i) = (ear.prev_i, ear.next_i);

        let found = match zorder {
            Some(zorder) => is_ear_hashed(nodes, ear_i, zorder),
            None => is_ear(nodes, ear_i),
        };
        if found {
            let next = node!(nodes, next_i);
            let prev = node!(nodes, prev_i);
            triangles.extend([prev.i, ear.i, next.i].map(|i| N::from_usize(i as usize)));
            let next_next_i = next.next_i;
            remove_node(nodes, ear_i);

            // skipping the next vertex leads to less sliver triangles
            (ear_i, stop_i) = (next_next_i, next_next_i);
            continue;
        }

        ear_i = next_i;
        if ear_i == stop_i {
            return Some(ear_i);
        }
    }
}

#[inline]
fn bbox<T: Float>(a: &Node<T>, b: &Node<T>, c: &Node<T>) -> [T; 4] {
    [
        a.x.min(b.x.min(c.x)),
        a.y.min(b.y.min(c.y)),
        a.x.max(b.x.max(c.x)),
        a.y.max(b.y.max(c.y)),
    ]
}

/// Whether `p` prevents the triangle `abc` from being cut off.
#[inline]
fn blocks_ear<T: Float>(
    nodes: &[Node<T>],
    [x0, y0, x1, y1]: [T; 4],
    a: &Node<T>,
    b: &Node<T>,
    c: &Node<T>,
    p: &Node<T>,
) -> bool {
    (p.x >= x0 && p.x <= x1 && p.y >= y0 && p.y <= y1)
        && point_in_triangle_except_first(a.x, a.y, b.x, b.y, c.x, c.y, p.x, p.y)
        && area(node!(nodes, p.prev_i), p, node!(nodes, p.next_i)) >= T::zero()
}

/// Check whether a ring node forms a valid ear with its neighbours, scanning the whole ring.
fn is_ear<T: Float>(nodes: &[Node<T>], ear_i: NodeIndex) -> bool {
    let b = node!(nodes, ear_i);
    let a = node!(nodes, b.prev_i);
    let c = node!(nodes, b.next_i);

    if area(a, b, c) >= T::zero() {
        // reflex, can't be an ear
        return false;
    }

    let bbox = bbox(a, b, c);
    let mut p = node!(nodes, c.next_i);
    while !ptr::eq(p, a) {
        if blocks_ear(nodes, bbox, a, b, c, p) {
            return false;
        }
        p = node!(nodes, p.next_i);
    }
    true
}

/// Follow a z-order link unless it leads out of the key range.
#[inline]
fn z_step<'a, T: Float>(
    nodes: &'a [Node<T>],
    link: Option<NodeIndex>,
    keys: &RangeInclusive<u32>,
) -> Option<&'a Node<T>> {
    link.map(|i| node!(nodes, i)).filter(|p| keys.contains(&p.z))
}

/// Same as [`is_ear`], but only visits nodes whose curve key lies in the key range of the
/// triangle's bbox, walking the z-order chain outwards from the ear in both directions.
fn is_ear_hashed<T: Float>(nodes: &[Node<T>], ear_i: NodeIndex, zorder: &ZOrder<T>) -> bool {
    let b = node!(nodes, ear_i);
    let a = node!(nodes, b.prev_i);
    let c = node!(nodes, b.next_i);

    if area(a, b, c) >= T::zero() {
        return false;
    }

    let bbox @ [x0, y0, x1, y1] = bbox(a, b, c);
    let keys = zorder.key(x0, y0)..=zorder.key(x1, y1);
    let blocks = |p: &Node<T>| {
        !ptr::eq(p, a) && !ptr::eq(p, c) && blocks_ear(nodes, bbox, a, b, c, p)
    };

    let mut down = z_step(nodes, b.prev_z_i, &keys);
    let mut up = z_step(nodes, b.next_z_i, &keys);
    while down.is_some() || up.is_some() {
        if let Some(p) = down {
            if blocks(p) {
                return false;
            }
            down = z_step(nodes, p.prev_z_i, &keys);
        }
        if let Some(n) = up {
            if blocks(n) {
                return false;
            }
            up = z_step(nodes, n.next_z_i, &keys);
        }
    }
    true
}

/// Cure small local self-intersections: where edge `a → p` crosses edge `q → b` (with
/// `q = p.next`), cut off triangle `a p b` and drop `p` and `q` from the ring.
///
/// A cut whose triangle repeats a vertex index has no area and is not emitted.
fn cure_local_intersections<T: Float, N: Index>(
    nodes: &mut [Node<T>],
    mut start_i: NodeIndex,
    triangles: &mut Vec<N>,
) -> NodeIndex {
    let mut p_i = start_i;
    loop {
        let p = node!(nodes, p_i);
        let (a, q_i) = (node!(nodes, p.prev_i), p.next_i);
        let b_i = node!(nodes, q_i).next_i;
        let b = node!(nodes, b_i);

        if crosses_locally(nodes, a, p, node!(nodes, q_i), b) {
            if p.i != a.i && p.i != b.i {
                triangles.extend([a.i, p.i, b.i].map(|i| N::from_usize(i as usize)));
            }
            remove_node(nodes, p_i);
            remove_node(nodes, q_i);
            (p_i, start_i) = (b_i, b_i);
        }

        p_i = node!(nodes, p_i).next_i;
        if p_i == start_i {
            return filter_points(nodes, p_i, None);
        }
    }
}

#[inline]
fn crosses_locally<T: Float>(
    nodes: &[Node<T>],
    a: &Node<T>,
    p: &Node<T>,
    q: &Node<T>,
    b: &Node<T>,
) -> bool {
    !equals(a, b)
        && intersects(a, p, q, b)
        && locally_inside(nodes, a, b)
        && locally_inside(nodes, b, a)
}

/// Split the ring in two along the shortest valid diagonal. Returns one node of each half,
/// or `None` when no valid diagonal exists.
fn split_earcut<T: Float>(
    nodes: &mut Vec<Node<T>>,
    start_i: NodeIndex,
) -> Option<(NodeIndex, NodeIndex)> {
    let mut best: Option<(NodeIndex, NodeIndex, T)> = None;

    let mut a_i = start_i;
    loop {
        let a = node!(nodes, a_i);
        let mut b_i = node!(nodes, a.next_i).next_i;
        while b_i != a.prev_i {
            let b = node!(nodes, b_i);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let dist = dx * dx + dy * dy;
            if a.i != b.i
                && best.map_or(true, |(_, _, best_dist)| dist < best_dist)
                && is_valid_diagonal(nodes, a, b)
            {
                best = Some((a_i, b_i, dist));
            }
            b_i = b.next_i;
        }
        a_i = a.next_i;
        if a_i == start_i {
            break;
        }
    }

    let (a_i, b_i, _) = best?;
    log::trace!(
        "splitting ring along diagonal {} - {}",
        node!(nodes, a_i).i,
        node!(nodes, b_i).i
    );
    let c_i = split_polygon(nodes, a_i, b_i);

    // filter collinear points around the cuts
    let end_i = Some(node!(nodes, a_i).next_i);
    let a_i = filter_points(nodes, a_i, end_i);
    let end_i = Some(node!(nodes, c_i).next_i);
    let c_i = filter_points(nodes, c_i, end_i);
    Some((a_i, c_i))
}
