use alloc::vec::Vec;
use num_traits::float::Float;

use crate::ring::signed_area;
use crate::Index;

/// Returns the relative difference between the total area of the triangles and the area of the
/// input polygon (outer ring minus holes). `0` means the triangulation is fully correct.
///
/// When the polygon itself has no area the absolute triangle area is returned instead.
/// Input that can't describe a polygon (`dim < 2`) has nothing to compare against and yields
/// `0`. Hole ranges and triangle indices that don't fit the vertex buffer are skipped rather
/// than reported.
pub fn deviation<T: Float, N: Index>(
    vertices: &[T],
    hole_indices: &[N],
    dim: usize,
    triangles: &[N],
) -> T {
    if dim < 2 {
        return T::zero();
    }
    let points: Vec<[T; 2]> = vertices.chunks_exact(dim).map(|c| [c[0], c[1]]).collect();
    let len = points.len();
    let ring_area = |start: usize, end: usize| match points.get(start..end) {
        Some(ring) => signed_area(ring.iter().copied()).abs(),
        None => T::zero(),
    };

    let outer_len = hole_indices.first().map_or(len, |h| h.into_usize().min(len));
    let mut polygon_area = ring_area(0, outer_len);
    for (k, start) in hole_indices.iter().enumerate() {
        let end = hole_indices.get(k + 1).map_or(len, |h| h.into_usize().min(len));
        polygon_area = polygon_area - ring_area(start.into_usize(), end);
    }

    let triangles_area = triangles
        .chunks_exact(3)
        .filter_map(|t| {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| points.get(i.into_usize()));
            let ([ax, ay], [bx, by], [cx, cy]) = (*a?, *b?, *c?);
            Some(((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs())
        })
        .fold(T::zero(), |sum, a| sum + a);

    if polygon_area == T::zero() {
        // both sums are doubled areas
        triangles_area / (T::one() + T::one())
    } else {
        ((polygon_area - triangles_area) / polygon_area).abs()
    }
}
