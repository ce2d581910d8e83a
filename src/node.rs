//! Vertex records stored in a flat arena and the link surgery performed on them.

use alloc::vec::Vec;
use core::iter;
use core::num::NonZeroU32;
use num_traits::float::Float;

macro_rules! node {
    ($self:ident.$nodes:ident, $index:expr) => {
        unsafe {
            debug_assert!($index.get() < $self.$nodes.len() as u32);
            $self.$nodes.get_unchecked($index.get() as usize)
        }
    };
    ($nodes:ident, $index:expr) => {
        unsafe {
            debug_assert!($index.get() < $nodes.len() as u32);
            $nodes.get_unchecked($index.get() as usize)
        }
    };
}

macro_rules! node_mut {
    ($self:ident.$nodes:ident, $index:expr) => {
        unsafe {
            debug_assert!($index.get() < $self.$nodes.len() as u32);
            $self.$nodes.get_unchecked_mut($index.get() as usize)
        }
    };
    ($nodes:ident, $index:expr) => {
        unsafe {
            debug_assert!($index.get() < $nodes.len() as u32);
            $nodes.get_unchecked_mut($index.get() as usize)
        }
    };
}

/// Handle of a node in the arena. Slot 0 holds a sentinel so every live handle is non-zero.
pub(crate) type NodeIndex = NonZeroU32;

pub(crate) struct Node<T: Float> {
    /// vertex position in the input buffer
    pub(crate) i: u32,
    /// z-order curve key
    pub(crate) z: u32,
    pub(crate) x: T,
    pub(crate) y: T,
    /// previous node in the ring
    pub(crate) prev_i: NodeIndex,
    /// next node in the ring
    pub(crate) next_i: NodeIndex,
    /// previous node in z-order
    pub(crate) prev_z_i: Option<NodeIndex>,
    /// next node in z-order
    pub(crate) next_z_i: Option<NodeIndex>,
    /// point-like hole vertex that filtering must never remove
    pub(crate) steiner: bool,
}

impl<T: Float> Node<T> {
    pub(crate) fn new(i: u32, x: T, y: T) -> Self {
        Self {
            i,
            z: 0,
            x,
            y,
            prev_i: sentinel(),
            next_i: sentinel(),
            prev_z_i: None,
            next_z_i: None,
            steiner: false,
        }
    }
}

#[inline]
pub(crate) fn sentinel() -> NodeIndex {
    NodeIndex::MIN
}

#[inline]
fn next_handle<T: Float>(nodes: &[Node<T>], offset: u32) -> NodeIndex {
    debug_assert!(!nodes.is_empty());
    // the sentinel occupies slot 0, so `len + offset` is never zero
    NodeIndex::new(nodes.len() as u32 + offset).unwrap_or(NodeIndex::MIN)
}

/// Create a node and link it after `last` (or as a single-node ring when `last` is `None`).
pub(crate) fn insert_node<T: Float>(
    nodes: &mut Vec<Node<T>>,
    i: u32,
    x: T,
    y: T,
    last: Option<NodeIndex>,
) -> NodeIndex {
    let mut p = Node::new(i, x, y);
    let p_i = next_handle(nodes, 0);
    match last {
        Some(last_i) => {
            let last = node_mut!(nodes, last_i);
            let last_next_i = last.next_i;
            (p.next_i, last.next_i) = (last_next_i, p_i);
            p.prev_i = last_i;
            node_mut!(nodes, last_next_i).prev_i = p_i;
        }
        None => {
            (p.prev_i, p.next_i) = (p_i, p_i);
        }
    }
    nodes.push(p);
    p_i
}

/// Unlink a node from both the ring and the z-order chain. Returns its former `(prev, next)`.
pub(crate) fn remove_node<T: Float>(
    nodes: &mut [Node<T>],
    p_i: NodeIndex,
) -> (NodeIndex, NodeIndex) {
    let Node {
        prev_i,
        next_i,
        prev_z_i,
        next_z_i,
        ..
    } = *node!(nodes, p_i);

    node_mut!(nodes, next_i).prev_i = prev_i;
    node_mut!(nodes, prev_i).next_i = next_i;

    if let Some(prev_z_i) = prev_z_i {
        node_mut!(nodes, prev_z_i).next_z_i = next_z_i;
    }
    if let Some(next_z_i) = next_z_i {
        node_mut!(nodes, next_z_i).prev_z_i = prev_z_i;
    }
    (prev_i, next_i)
}

/// Connect `a` and `b` with a two-way diagonal by duplicating both endpoints.
///
/// If the nodes belong to the same ring the ring is split in two: `a → b → …` and
/// `b' → a' → …`. If `b` belongs to another ring (a hole) the rings are fused into one.
/// Returns the handle of `b'`.
pub(crate) fn split_polygon<T: Float>(
    nodes: &mut Vec<Node<T>>,
    a_i: NodeIndex,
    b_i: NodeIndex,
) -> NodeIndex {
    let a2_i = next_handle(nodes, 0);
    let b2_i = next_handle(nodes, 1);

    let a = node_mut!(nodes, a_i);
    let mut a2 = Node::new(a.i, a.x, a.y);
    let an_i = a.next_i;
    a.next_i = b_i;
    a2.prev_i = b2_i;
    a2.next_i = an_i;
    node_mut!(nodes, an_i).prev_i = a2_i;

    let b = node_mut!(nodes, b_i);
    let mut b2 = Node::new(b.i, b.x, b.y);
    let bp_i = b.prev_i;
    b.prev_i = a_i;
    b2.next_i = a2_i;
    b2.prev_i = bp_i;
    node_mut!(nodes, bp_i).next_i = b2_i;

    nodes.extend([a2, b2]);

    b2_i
}

/// Walk the ring once, starting at `start_i`, yielding every node with its handle.
pub(crate) fn ring_nodes<'a, T: Float + 'a>(
    nodes: &'a [Node<T>],
    start_i: NodeIndex,
) -> impl Iterator<Item = (NodeIndex, &'a Node<T>)> + 'a {
    iter::successors(Some(start_i), move |&p_i| {
        let next_i = node!(nodes, p_i).next_i;
        (next_i != start_i).then_some(next_i)
    })
    .map(move |p_i| (p_i, node!(nodes, p_i)))
}

/// Number of nodes in the ring containing `start_i`.
pub(crate) fn ring_len<T: Float>(nodes: &[Node<T>], start_i: NodeIndex) -> usize {
    ring_nodes(nodes, start_i).count()
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Build an arena holding one ring over `coords`, in order.
    pub(crate) fn ring_of(coords: &[[f64; 2]]) -> (Vec<Node<f64>>, NodeIndex) {
        let mut nodes = alloc::vec![Node::new(0, f64::INFINITY, f64::INFINITY)];
        let mut last = None;
        for (i, &[x, y]) in coords.iter().enumerate() {
            last = Some(insert_node(&mut nodes, i as u32, x, y, last));
        }
        let start = node!(nodes, last.unwrap()).next_i;
        (nodes, start)
    }

    pub(crate) fn ring_indices(nodes: &[Node<f64>], start_i: NodeIndex) -> Vec<u32> {
        ring_nodes(nodes, start_i).map(|(_, p)| p.i).collect()
    }

    #[test]
    fn test_insert_and_remove() {
        let (mut nodes, start) = ring_of(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        assert_eq!(ring_indices(&nodes, start), [0, 1, 2, 3]);
        assert_eq!(ring_len(&nodes, start), 4);

        let second = node!(nodes, start).next_i;
        let (prev, next) = remove_node(&mut nodes, second);
        assert_eq!((prev, node!(nodes, next).i), (start, 2));
        assert_eq!(ring_indices(&nodes, start), [0, 2, 3]);
    }

    #[test]
    fn test_ring_nodes_single() {
        let (nodes, start) = ring_of(&[[3., 4.]]);
        let walked: Vec<_> = ring_nodes(&nodes, start).map(|(i, p)| (i, p.x)).collect();
        assert_eq!(walked, [(start, 3.)]);
        assert_eq!(ring_len(&nodes, start), 1);
    }

    #[test]
    fn test_split_polygon_same_ring() {
        let (mut nodes, a) = ring_of(&[[0., 0.], [1., 0.], [2., 1.], [1., 2.], [0., 1.]]);
        let b = node!(nodes, node!(nodes, a).next_i).next_i;
        let b2 = split_polygon(&mut nodes, a, b);
        assert_eq!(ring_indices(&nodes, a), [0, 2, 3, 4]);
        assert_eq!(ring_indices(&nodes, b2), [2, 0, 1]);
    }
}
