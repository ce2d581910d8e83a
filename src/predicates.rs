//! Orientation and visibility tests on ring nodes.
//!
//! All comparisons are exact floating-point sign tests. There is no epsilon: a cross product
//! has to be exactly zero to count as collinear.

use num_traits::float::Float;

use crate::node::{ring_nodes, Node};

/// Twice the signed area of triangle `pqr`. Negative when `p → q → r` turns the way the
/// engine expects of a convex ring vertex.
#[inline]
pub(crate) fn area<T: Float>(p: &Node<T>, q: &Node<T>, r: &Node<T>) -> T {
    (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y)
}

#[inline]
pub(crate) fn equals<T: Float>(p1: &Node<T>, p2: &Node<T>) -> bool {
    p1.x == p2.x && p1.y == p2.y
}

#[inline]
fn sign<T: Float>(v: T) -> i8 {
    (v > T::zero()) as i8 - (v < T::zero()) as i8
}

/// Whether `p` lies inside triangle `abc` or on its boundary.
#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn point_in_triangle<T: Float>(
    ax: T,
    ay: T,
    bx: T,
    by: T,
    cx: T,
    cy: T,
    px: T,
    py: T,
) -> bool {
    (cx - px) * (ay - py) >= (ax - px) * (cy - py)
        && (ax - px) * (by - py) >= (bx - px) * (ay - py)
        && (bx - px) * (cy - py) >= (cx - px) * (by - py)
}

/// Like [`point_in_triangle`], but a point coincident with `a` never counts.
#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn point_in_triangle_except_first<T: Float>(
    ax: T,
    ay: T,
    bx: T,
    by: T,
    cx: T,
    cy: T,
    px: T,
    py: T,
) -> bool {
    !(ax == px && ay == py) && point_in_triangle(ax, ay, bx, by, cx, cy, px, py)
}

/// For collinear `p`, `q`, `r`: whether `q` lies on segment `pr`.
#[inline]
fn on_segment<T: Float>(p: &Node<T>, q: &Node<T>, r: &Node<T>) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Whether segments `p1q1` and `p2q2` cross or touch.
pub(crate) fn intersects<T: Float>(p1: &Node<T>, q1: &Node<T>, p2: &Node<T>, q2: &Node<T>) -> bool {
    let o1 = sign(area(p1, q1, p2));
    let o2 = sign(area(p1, q1, q2));
    let o3 = sign(area(p2, q2, p1));
    let o4 = sign(area(p2, q2, q1));
    (o1 != o2 && o3 != o4)
        || (o3 == 0 && on_segment(p2, p1, q2))
        || (o4 == 0 && on_segment(p2, q1, q2))
        || (o2 == 0 && on_segment(p1, q2, q1))
        || (o1 == 0 && on_segment(p1, p2, q1))
}

/// Whether segment `ab` crosses any ring edge that does not share a vertex index with it.
pub(crate) fn intersects_polygon<T: Float>(nodes: &[Node<T>], a: &Node<T>, b: &Node<T>) -> bool {
    let touches = |p: &Node<T>| p.i == a.i || p.i == b.i;
    ring_nodes(nodes, a.next_i).any(|(_, p)| {
        let q = node!(nodes, p.next_i);
        !touches(p) && !touches(q) && intersects(p, q, a, b)
    })
}

/// Whether the diagonal `a → b` leaves `a` into the ring interior.
pub(crate) fn locally_inside<T: Float>(nodes: &[Node<T>], a: &Node<T>, b: &Node<T>) -> bool {
    let (prev, next) = (node!(nodes, a.prev_i), node!(nodes, a.next_i));
    let convex = area(prev, a, next) < T::zero();
    if convex {
        // b has to lie between the two edges
        area(a, b, next) >= T::zero() && area(a, prev, b) >= T::zero()
    } else {
        // b must not fall into the wedge outside the reflex corner
        area(a, b, prev) < T::zero() || area(a, next, b) < T::zero()
    }
}

/// Even-odd test of the midpoint of `ab` against the ring containing `a`.
pub(crate) fn middle_inside<T: Float>(nodes: &[Node<T>], a: &Node<T>, b: &Node<T>) -> bool {
    let two = T::one() + T::one();
    let (mx, my) = ((a.x + b.x) / two, (a.y + b.y) / two);
    ring_nodes(nodes, a.next_i).fold(false, |inside, (_, p)| {
        let q = node!(nodes, p.next_i);
        let crossing = (p.y > my) != (q.y > my)
            && q.y != p.y
            && mx < (q.x - p.x) * (my - p.y) / (q.y - p.y) + p.x;
        inside ^ crossing
    })
}

/// Whether the sector at `m` contains the sector at `p` (both at the same position).
pub(crate) fn sector_contains_sector<T: Float>(
    nodes: &[Node<T>],
    m: &Node<T>,
    p: &Node<T>,
) -> bool {
    area(node!(nodes, m.prev_i), m, node!(nodes, p.prev_i)) < T::zero()
        && area(node!(nodes, p.next_i), m, node!(nodes, m.next_i)) < T::zero()
}

/// Whether `a`–`b` can split the ring: it crosses no edge, is visible from both ends,
/// runs through the interior and does not create opposite-facing sectors.
pub(crate) fn is_valid_diagonal<T: Float>(nodes: &[Node<T>], a: &Node<T>, b: &Node<T>) -> bool {
    let a_next = node!(nodes, a.next_i);
    let a_prev = node!(nodes, a.prev_i);
    let b_next = node!(nodes, b.next_i);
    let b_prev = node!(nodes, b.prev_i);

    if a_next.i == b.i || a_prev.i == b.i || intersects_polygon(nodes, a, b) {
        return false;
    }
    let visible = locally_inside(nodes, a, b)
        && locally_inside(nodes, b, a)
        && middle_inside(nodes, a, b)
        && (area(a_prev, a, b_prev) != T::zero() || area(a, b_prev, b) != T::zero());
    // zero-length diagonal between two duplicates of a pinch point
    let zero_length =
        equals(a, b) && area(a_prev, a, a_next) > T::zero() && area(b_prev, b, b_next) > T::zero();
    visible || zero_length
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::test::ring_of;

    fn n(x: f64, y: f64) -> Node<f64> {
        Node::new(0, x, y)
    }

    #[test]
    fn test_area_sign() {
        // counter-clockwise in y-up coordinates is negative
        assert!(area(&n(0., 0.), &n(1., 0.), &n(0., 1.)) < 0.);
        assert!(area(&n(0., 0.), &n(0., 1.), &n(1., 0.)) > 0.);
        assert_eq!(area(&n(0., 0.), &n(1., 1.), &n(2., 2.)), 0.);
    }

    #[test]
    fn test_point_in_triangle() {
        let (a, b, c) = ((0., 0.), (10., 0.), (0., 10.));
        assert!(point_in_triangle(a.0, a.1, b.0, b.1, c.0, c.1, 2., 2.));
        assert!(!point_in_triangle(a.0, a.1, b.0, b.1, c.0, c.1, 8., 8.));
        // boundary counts as inside, except on the first vertex for the ear test
        assert!(point_in_triangle(a.0, a.1, b.0, b.1, c.0, c.1, 0., 0.));
        let except_first =
            |px, py| point_in_triangle_except_first(a.0, a.1, b.0, b.1, c.0, c.1, px, py);
        assert!(!except_first(0., 0.));
        assert!(except_first(0., 10.));
    }

    #[test]
    fn test_intersects() {
        assert!(intersects(&n(0., 0.), &n(2., 2.), &n(0., 2.), &n(2., 0.)));
        assert!(!intersects(&n(0., 0.), &n(1., 0.), &n(0., 1.), &n(1., 1.)));
        // collinear overlap
        assert!(intersects(&n(0., 0.), &n(2., 0.), &n(1., 0.), &n(3., 0.)));
        // collinear but disjoint, including below the segment's y range
        assert!(!intersects(&n(0., 0.), &n(1., 0.), &n(2., 0.), &n(3., 0.)));
        assert!(!intersects(&n(0., 2.), &n(0., 4.), &n(0., 0.), &n(0., 1.)));
    }

    #[test]
    fn test_middle_inside_and_diagonal() {
        // an L-shaped ring: the diagonal across the notch runs outside
        let (nodes, start) = ring_of(&[
            [0., 0.],
            [5., 0.],
            [5., 5.],
            [10., 5.],
            [10., 10.],
            [0., 10.],
        ]);
        let get = |k: usize| {
            let mut p = node!(nodes, start);
            for _ in 0..k {
                p = node!(nodes, p.next_i);
            }
            p
        };
        assert!(middle_inside(&nodes, get(0), get(2)));
        assert!(!middle_inside(&nodes, get(1), get(3)));
        assert!(locally_inside(&nodes, get(2), get(0)));
        assert!(!locally_inside(&nodes, get(1), get(3)));
        assert!(is_valid_diagonal(&nodes, get(0), get(2)));
        assert!(!is_valid_diagonal(&nodes, get(1), get(3)));
        assert!(!is_valid_diagonal(&nodes, get(0), get(1)));
    }
}
