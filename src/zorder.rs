//! Z-order (Morton) curve keys and the sorted node chain used to prune ear checks.

use num_traits::float::Float;

use crate::node::{ring_nodes, Node, NodeIndex};

/// Coordinates are quantized into this many steps along the longer bbox side.
const GRID: f64 = 32767.0;

/// Normalization parameters of the curve, computed once from the merged ring's bbox.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZOrder<T: Float> {
    min_x: T,
    min_y: T,
    inv_size: T,
    grid: T,
}

impl<T: Float> ZOrder<T> {
    /// Normalization for the ring containing `start_i`. `None` when the bbox is empty
    /// or not finite, in which case the engine falls back to exhaustive scans.
    pub(crate) fn for_ring(nodes: &[Node<T>], start_i: NodeIndex) -> Option<Self> {
        let first = node!(nodes, start_i);
        let [min_x, min_y, max_x, max_y] = ring_nodes(nodes, start_i).fold(
            [first.x, first.y, first.x, first.y],
            |[x0, y0, x1, y1], (_, p)| [x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)],
        );

        let size = (max_x - min_x).max(max_y - min_y);
        if size == T::zero() || !size.is_finite() {
            return None;
        }
        let grid = T::from(GRID)?;
        Some(Self {
            min_x,
            min_y,
            inv_size: grid / size,
            grid,
        })
    }

    /// Curve key of a point: both coordinates quantized to 15 bits and bit-interleaved.
    pub(crate) fn key(&self, x: T, y: T) -> u32 {
        let quantize = |v: T, min: T| {
            ((v - min) * self.inv_size)
                .max(T::zero())
                .min(self.grid)
                .to_u32()
                .unwrap_or(0)
        };
        spread_bits(quantize(x, self.min_x)) | (spread_bits(quantize(y, self.min_y)) << 1)
    }
}

/// Insert a zero bit above each of the low 16 bits of `v`.
#[inline]
fn spread_bits(v: u32) -> u32 {
    let mut v = v & 0x0000_FFFF;
    v = (v | (v << 8)) & 0x00FF_00FF;
    v = (v | (v << 4)) & 0x0F0F_0F0F;
    v = (v | (v << 2)) & 0x3333_3333;
    v = (v | (v << 1)) & 0x5555_5555;
    v
}

/// Key every node of the ring and link them into one open chain sorted by key.
pub(crate) fn index_curve<T: Float>(
    nodes: &mut [Node<T>],
    start_i: NodeIndex,
    zorder: &ZOrder<T>,
) {
    let mut p_i = start_i;
    loop {
        let p = node_mut!(nodes, p_i);
        p.z = zorder.key(p.x, p.y);
        p.prev_z_i = Some(p.prev_i);
        p.next_z_i = Some(p.next_i);
        p_i = p.next_i;
        if p_i == start_i {
            break;
        }
    }

    // cut the cycle open in front of the start node
    let start = node_mut!(nodes, start_i);
    if let Some(prev_z_i) = start.prev_z_i.take() {
        node_mut!(nodes, prev_z_i).next_z_i = None;
    }
    sort_linked(nodes, start_i);
}

/// Simon Tatham's bottom-up merge sort over the z-order chain. Stable.
/// http://www.chiark.greenend.org.uk/~sgtatham/algorithms/listsort.html
fn sort_linked<T: Float>(nodes: &mut [Node<T>], head_i: NodeIndex) {
    let mut head = head_i;
    let mut in_size: usize = 1;

    loop {
        let mut p = Some(head);
        let mut tail: Option<NodeIndex> = None;
        let mut num_merges = 0;

        while let Some(p_start) = p {
            num_merges += 1;

            // step `in_size` places along from p to find q
            let mut q = Some(p_start);
            let mut p_size = 0;
            while p_size < in_size {
                let Some(q_i) = q else { break };
                p_size += 1;
                q = node!(nodes, q_i).next_z_i;
            }
            let mut q_size = in_size;

            loop {
                let take_p = match (p.filter(|_| p_size > 0), q.filter(|_| q_size > 0)) {
                    (Some(p_i), Some(q_i)) => node!(nodes, p_i).z <= node!(nodes, q_i).z,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (None, None) => break,
                };
                let e_i = if take_p {
                    let Some(p_i) = p else { break };
                    p_size -= 1;
                    p = node!(nodes, p_i).next_z_i;
                    p_i
                } else {
                    let Some(q_i) = q else { break };
                    q_size -= 1;
                    q = node!(nodes, q_i).next_z_i;
                    q_i
                };

                node_mut!(nodes, e_i).prev_z_i = tail;
                match tail {
                    Some(tail_i) => node_mut!(nodes, tail_i).next_z_i = Some(e_i),
                    None => head = e_i,
                }
                tail = Some(e_i);
            }

            p = q;
        }

        if let Some(tail_i) = tail {
            node_mut!(nodes, tail_i).next_z_i = None;
        }
        if num_merges <= 1 {
            return;
        }
        in_size *= 2;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::test::ring_of;
    use alloc::vec::Vec;

    fn chain(nodes: &[Node<f64>]) -> Vec<u32> {
        let mut head = nodes
            .iter()
            .position(|n| n.prev_z_i.is_none() && n.next_z_i.is_some())
            .and_then(|k| NodeIndex::new(k as u32));
        let mut out = Vec::new();
        while let Some(h) = head {
            out.push(node!(nodes, h).i);
            head = node!(nodes, h).next_z_i;
        }
        out
    }

    #[test]
    fn test_spread_bits() {
        assert_eq!(spread_bits(0b1011), 0b1000101);
        assert_eq!(spread_bits(0xFFFF), 0x5555_5555);
    }

    #[test]
    fn test_key_is_monotonic() {
        let z = ZOrder {
            min_x: 0.0,
            min_y: 0.0,
            inv_size: GRID / 100.0,
            grid: GRID,
        };
        assert_eq!(z.key(0.0, 0.0), 0);
        assert!(z.key(10.0, 10.0) < z.key(20.0, 10.0));
        assert!(z.key(10.0, 10.0) < z.key(10.0, 20.0));
        assert!(z.key(50.0, 50.0) <= z.key(100.0, 100.0));
        // out-of-box coordinates clamp instead of wrapping
        assert_eq!(z.key(-5.0, -5.0), 0);
        assert_eq!(z.key(1e9, 1e9), 0x3FFF_FFFF);
    }

    #[test]
    fn test_for_ring_rejects_flat_bbox() {
        let (nodes, start) = ring_of(&[[1., 1.], [1., 1.], [1., 1.]]);
        assert!(ZOrder::for_ring(&nodes, start).is_none());
        let (nodes, start) = ring_of(&[[0., 0.], [10., 0.], [0., 5.]]);
        let z = ZOrder::for_ring(&nodes, start).unwrap();
        assert_eq!(z.inv_size, GRID / 10.0);
    }

    #[test]
    fn test_index_curve_sorts_chain() {
        let coords = [
            [9., 9.],
            [0., 0.],
            [5., 1.],
            [1., 5.],
            [9., 0.],
            [0., 9.],
            [4., 4.],
        ];
        let (mut nodes, start) = ring_of(&coords);
        let z = ZOrder::for_ring(&nodes, start).unwrap();
        index_curve(&mut nodes, start, &z);

        let order = chain(&nodes);
        assert_eq!(order.len(), coords.len());
        let keys: Vec<u32> = order
            .iter()
            .map(|&i| z.key(coords[i as usize][0], coords[i as usize][1]))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(order[0], 1);
        assert_eq!(*order.last().unwrap(), 0);
    }
}
