//! Splicing hole rings into the outer ring through bridge diagonals.

use alloc::vec::Vec;
use core::cmp::Ordering;
use num_traits::float::Float;

use crate::node::{ring_nodes, split_polygon, Node, NodeIndex};
use crate::predicates::{equals, locally_inside, point_in_triangle, sector_contains_sector};
use crate::ring::filter_points;

/// Order holes by their leftmost vertex: x, then y, then the slope of the first edge, so that
/// holes meeting at a shared leftmost vertex are bridged counter-clockwise.
fn compare_x_y_slope<T: Float>(nodes: &[Node<T>], a_i: NodeIndex, b_i: NodeIndex) -> Ordering {
    let a = node!(nodes, a_i);
    let b = node!(nodes, b_i);
    let by_position = a
        .x
        .partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));
    by_position.then_with(|| {
        let slope = |p: &Node<T>| {
            let n = node!(nodes, p.next_i);
            (n.y - p.y) / (n.x - p.x)
        };
        slope(a).partial_cmp(&slope(b)).unwrap_or(Ordering::Equal)
    })
}

/// Bridge every queued hole (given by its leftmost node) into the outer ring, left to right.
/// Returns a node of the merged ring.
pub(crate) fn eliminate_holes<T: Float>(
    nodes: &mut Vec<Node<T>>,
    queue: &mut [NodeIndex],
    mut outer_node_i: NodeIndex,
) -> NodeIndex {
    queue.sort_by(|&a, &b| compare_x_y_slope(nodes, a, b));
    for &hole_i in queue.iter() {
        outer_node_i = eliminate_hole(nodes, hole_i, outer_node_i);
    }
    outer_node_i
}

/// Find a bridge for one hole and link it. A hole without a bridge is dropped.
fn eliminate_hole<T: Float>(
    nodes: &mut Vec<Node<T>>,
    hole_i: NodeIndex,
    outer_node_i: NodeIndex,
) -> NodeIndex {
    let Some(bridge_i) = find_hole_bridge(nodes, hole_i, outer_node_i) else {
        let hole = node!(nodes, hole_i);
        log::debug!(
            "no bridge found for hole at vertex {} ({:?}, {:?}); dropping it",
            hole.i,
            hole.x.to_f64(),
            hole.y.to_f64()
        );
        return outer_node_i;
    };
    let bridge_reverse_i = split_polygon(nodes, bridge_i, hole_i);

    // filter collinear points around the cuts
    let end_i = Some(node!(nodes, bridge_reverse_i).next_i);
    filter_points(nodes, bridge_reverse_i, end_i);
    let end_i = Some(node!(nodes, bridge_i).next_i);
    filter_points(nodes, bridge_i, end_i)
}

/// David Eberly's bridge search: cast a ray from the hole's leftmost vertex towards -x, take
/// the closest outer edge it hits and refine the endpoint against reflex vertices inside the
/// visibility triangle.
fn find_hole_bridge<T: Float>(
    nodes: &[Node<T>],
    hole_i: NodeIndex,
    outer_node_i: NodeIndex,
) -> Option<NodeIndex> {
    let hole = node!(nodes, hole_i);
    let (hx, hy) = (hole.x, hole.y);
    if equals(hole, node!(nodes, outer_node_i)) {
        return Some(outer_node_i);
    }

    // closest edge on the left, and its endpoint with the lesser x
    let mut qx = T::neg_infinity();
    let mut hit_i = None;
    for (p_i, p) in ring_nodes(nodes, outer_node_i) {
        let next = node!(nodes, p.next_i);
        if equals(hole, next) {
            // the hole touches the outer ring at a vertex
            return Some(p.next_i);
        }
        let spans = hy <= p.y && hy >= next.y && next.y != p.y;
        if !spans {
            continue;
        }
        let x = p.x + (hy - p.y) * (next.x - p.x) / (next.y - p.y);
        if x <= hx && x > qx {
            qx = x;
            hit_i = Some(if p.x < next.x { p_i } else { p.next_i });
            if x == hx {
                // the hole touches the edge itself
                return hit_i;
            }
        }
    }
    let hit_i = hit_i?;

    // Vertices inside the triangle (hole, ray hit, endpoint) may hide the endpoint; the one
    // closest in angle to the ray wins.
    let hit = node!(nodes, hit_i);
    let (mx, my) = (hit.x, hit.y);
    let (tx0, tx1) = if hy < my { (hx, qx) } else { (qx, hx) };
    let (mut best_i, mut best, mut tan_min) = (hit_i, hit, T::infinity());
    for (p_i, p) in ring_nodes(nodes, hit_i) {
        let candidate = hx >= p.x
            && p.x >= mx
            && hx != p.x
            && point_in_triangle(tx0, hy, mx, my, tx1, hy, p.x, p.y);
        if !candidate {
            continue;
        }
        let tan = (hy - p.y).abs() / (hx - p.x);
        let closer = tan < tan_min
            || (tan == tan_min
                && (p.x > best.x || (p.x == best.x && sector_contains_sector(nodes, best, p))));
        if closer && locally_inside(nodes, p, hole) {
            (best_i, best, tan_min) = (p_i, p, tan);
        }
    }
    Some(best_i)
}
