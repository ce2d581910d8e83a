//! Ear-clipping triangulation of polygons with holes.
//!
//! Holes are bridged into the outer ring, and ears are then cut off one by one. Large rings
//! are indexed along a z-order curve so each ear test only visits nearby vertices. When no ear
//! can be found the ring is filtered again, then cured of small self-intersections, and
//! finally split in two along a diagonal. Bad geometry degrades the result but never fails.
//!
//! ```
//! let vertices = [10.0, 0.0, 0.0, 50.0, 60.0, 60.0, 70.0, 10.0];
//! let triangles: Vec<u32> = earclip::earcut(&vertices, &[], 2).unwrap();
//! assert_eq!(triangles, [1, 0, 3, 3, 2, 1]);
//! ```

#![no_std]

extern crate alloc;

#[macro_use]
mod node;
mod deviation;
mod ear;
mod error;
mod holes;
mod predicates;
mod ring;
mod zorder;

use alloc::vec::Vec;
use num_traits::float::Float;

pub use deviation::deviation;
pub use error::Error;

use ear::{earcut_linked, Job};
use holes::eliminate_holes;
use node::{ring_len, Node, NodeIndex};
use ring::{get_leftmost, linked_list};
use zorder::ZOrder;

/// Index of a vertex
pub trait Index: Copy {
    /// Largest vertex index the type can hold.
    const MAX: usize;

    fn into_usize(self) -> usize;
    fn from_usize(v: usize) -> Self;
}
impl Index for u32 {
    const MAX: usize = u32::MAX as usize;

    fn into_usize(self) -> usize {
        self as usize
    }
    fn from_usize(v: usize) -> Self {
        v as Self
    }
}
impl Index for u16 {
    const MAX: usize = u16::MAX as usize;

    fn into_usize(self) -> usize {
        self as usize
    }
    fn from_usize(v: usize) -> Self {
        v as Self
    }
}
impl Index for usize {
    const MAX: usize = usize::MAX;

    fn into_usize(self) -> usize {
        self
    }
    fn from_usize(v: usize) -> Self {
        v as Self
    }
}

/// Tuning knobs of [`Earcut`]. None of them change the produced triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Index the merged ring on a z-order curve to speed up ear tests.
    pub spatial_index: bool,
    /// The index is only built for rings with more vertices than this.
    pub spatial_index_threshold: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            spatial_index: true,
            spatial_index_threshold: 80,
        }
    }
}

impl Options {
    /// Always scan the whole ring when testing ears.
    pub fn without_spatial_index(self) -> Self {
        Self {
            spatial_index: false,
            ..self
        }
    }

    pub fn with_spatial_index_threshold(self, threshold: usize) -> Self {
        Self {
            spatial_index_threshold: threshold,
            ..self
        }
    }
}

/// Triangulate a polygon given as a flat coordinate buffer.
///
/// `vertices` holds `dim` numbers per vertex, of which only the first two (x and y) are used.
/// `hole_indices` are the vertex offsets where each hole ring starts. The result holds three
/// vertex indices per triangle.
///
/// Fails only for structurally invalid input, see [`Error`].
pub fn earcut<T: Float, N: Index>(
    vertices: &[T],
    hole_indices: &[N],
    dim: usize,
) -> Result<Vec<N>, Error> {
    let mut triangles = Vec::new();
    Earcut::new().earcut(vertices, hole_indices, dim, &mut triangles)?;
    Ok(triangles)
}

/// Instance of the earcut algorithm.
pub struct Earcut<T: Float> {
    data: Vec<[T; 2]>,
    nodes: Vec<Node<T>>,
    queue: Vec<NodeIndex>,
    kept: Vec<u32>,
    work: Vec<Job>,
    options: Options,
}

impl<T: Float> Default for Earcut<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Earcut<T> {
    /// Creates a new instance of the earcut algorithm.
    ///
    /// You can reuse a single instance for multiple triangulations to reduce memory allocations.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            data: Vec::new(),
            nodes: Vec::new(),
            queue: Vec::new(),
            kept: Vec::new(),
            work: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    fn reset(&mut self, capacity: usize) {
        self.nodes.clear();
        self.nodes.reserve(capacity);
        self.nodes.push(Node::new(0, T::infinity(), T::infinity())); // dummy node
    }

    /// Performs the earcut triangulation on a flat coordinate buffer with `dim` numbers per
    /// vertex. A trailing partial vertex is ignored.
    ///
    /// The triangles are written to `triangles_out`, which is cleared first.
    pub fn earcut<N: Index>(
        &mut self,
        vertices: &[T],
        hole_indices: &[N],
        dim: usize,
        triangles_out: &mut Vec<N>,
    ) -> Result<(), Error> {
        triangles_out.clear();
        if dim < 2 {
            return Err(Error::InvalidDimension { dim });
        }
        self.data.clear();
        self.data.extend(vertices.chunks_exact(dim).map(|c| [c[0], c[1]]));
        self.triangulate(hole_indices, triangles_out)
    }

    /// Same as [`Earcut::earcut`] for input that is already a sequence of 2D points.
    pub fn earcut_points<N: Index>(
        &mut self,
        points: impl IntoIterator<Item = [T; 2]>,
        hole_indices: &[N],
        triangles_out: &mut Vec<N>,
    ) -> Result<(), Error> {
        triangles_out.clear();
        self.data.clear();
        self.data.extend(points);
        self.triangulate(hole_indices, triangles_out)
    }

    fn triangulate<N: Index>(
        &mut self,
        hole_indices: &[N],
        triangles_out: &mut Vec<N>,
    ) -> Result<(), Error> {
        let len = self.data.len();
        check_vertex_count::<N>(len)?;
        check_hole_indices(hole_indices, len)?;
        if len < 3 {
            return Ok(());
        }

        triangles_out.reserve(len + 1);
        self.reset(len / 2 * 3);

        let outer_len = hole_indices.first().map_or(len, |h| h.into_usize());

        // create nodes
        let Some(mut outer_node_i) = linked_list(
            &mut self.nodes,
            &self.data,
            0,
            outer_len,
            true,
            &mut self.kept,
        ) else {
            return Ok(());
        };
        let outer_node = node!(self.nodes, outer_node_i);
        if outer_node.next_i == outer_node.prev_i {
            return Ok(());
        }

        if !hole_indices.is_empty() {
            self.queue.clear();
            for (k, start) in hole_indices.iter().enumerate() {
                let end = hole_indices.get(k + 1).map_or(len, |h| h.into_usize());
                let Some(list_i) = linked_list(
                    &mut self.nodes,
                    &self.data,
                    start.into_usize(),
                    end,
                    false,
                    &mut self.kept,
                ) else {
                    continue;
                };
                if list_i == node!(self.nodes, list_i).next_i {
                    node_mut!(self.nodes, list_i).steiner = true;
                }
                self.queue.push(get_leftmost(&self.nodes, list_i));
            }
            outer_node_i = eliminate_holes(&mut self.nodes, &mut self.queue, outer_node_i);
        }

        // large rings are worth indexing on the z-order curve
        let merged_len = ring_len(&self.nodes, outer_node_i);
        let zorder = if self.options.spatial_index
            && merged_len > self.options.spatial_index_threshold
        {
            ZOrder::for_ring(&self.nodes, outer_node_i)
        } else {
            None
        };

        earcut_linked(
            &mut self.nodes,
            outer_node_i,
            triangles_out,
            zorder.as_ref(),
            &mut self.work,
        );

        log::debug!(
            "triangulated {} vertices and {} holes into {} triangles (ring {}, indexed: {})",
            len,
            hole_indices.len(),
            triangles_out.len() / 3,
            merged_len,
            zorder.is_some()
        );
        Ok(())
    }
}

/// Every vertex index has to fit both `N` and the arena's `u32` vertex ids.
fn check_vertex_count<N: Index>(len: usize) -> Result<(), Error> {
    let max = N::MAX.min(u32::MAX as usize);
    match len.checked_sub(1) {
        Some(last) if last > max => Err(Error::TooManyVertices { len, max }),
        _ => Ok(()),
    }
}

/// Hole offsets have to be non-decreasing and within the vertex buffer.
fn check_hole_indices<N: Index>(hole_indices: &[N], len: usize) -> Result<(), Error> {
    let mut previous = 0;
    for (position, index) in hole_indices.iter().map(|h| h.into_usize()).enumerate() {
        if index > len {
            return Err(Error::HoleIndexOutOfBounds { index, len });
        }
        if index < previous {
            return Err(Error::UnorderedHoleIndices {
                position,
                index,
                previous,
            });
        }
        previous = index;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_hole_indices() {
        assert_eq!(check_hole_indices::<u32>(&[], 0), Ok(()));
        assert_eq!(check_hole_indices(&[4u32, 4, 8], 8), Ok(()));
        assert_eq!(
            check_hole_indices(&[4u32, 9], 8),
            Err(Error::HoleIndexOutOfBounds { index: 9, len: 8 })
        );
        assert_eq!(
            check_hole_indices(&[5u32, 3], 8),
            Err(Error::UnorderedHoleIndices {
                position: 1,
                index: 3,
                previous: 5
            })
        );
    }

    #[test]
    fn test_check_vertex_count() {
        assert_eq!(check_vertex_count::<u16>(0), Ok(()));
        assert_eq!(check_vertex_count::<u16>(65_536), Ok(()));
        assert_eq!(
            check_vertex_count::<u16>(65_537),
            Err(Error::TooManyVertices {
                len: 65_537,
                max: 65_535
            })
        );
        assert_eq!(check_vertex_count::<u32>(65_537), Ok(()));
    }

    #[test]
    fn test_options() {
        let options = Options::default()
            .without_spatial_index()
            .with_spatial_index_threshold(10);
        assert!(!options.spatial_index);
        assert_eq!(options.spatial_index_threshold, 10);
        assert_eq!(Earcut::<f32>::with_options(options).options(), options);
    }

    #[test]
    fn test_reuse_instance() {
        let mut earcut = Earcut::new();
        let mut triangles: Vec<u16> = Vec::new();
        earcut
            .earcut(&[0., 0., 1., 0., 1., 1.], &[], 2, &mut triangles)
            .unwrap();
        assert_eq!(triangles.len(), 3);
        earcut
            .earcut_points([[0., 0.], [1., 0.]], &[], &mut triangles)
            .unwrap();
        assert!(triangles.is_empty());
        assert_eq!(
            earcut.earcut(&[0.; 6], &[], 1, &mut triangles),
            Err(Error::InvalidDimension { dim: 1 })
        );
    }
}
