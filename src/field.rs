//! The size field: an adaptively refined tree of [`Cell`]s.

use crate::bounds::Aabb;
use crate::cell::Cell;
use crate::error::SizeFieldError;
use crate::metrics::FieldMetrics;
use crate::pool::{AllocPtr, CellPool, EMPTY_PTR};
use crate::shape::{CellShape, OctShape, QuadShape};

use glam::DVec3;
use std::fmt;
use std::marker::PhantomData;
use std::mem;

/// Sentinel returned by [`SizeField::min_over_box`] when the query box misses
/// the tree. Callers treat values at or above it as "no constraint found".
pub const NO_CONSTRAINT: f64 = 1e8;

/// Asymmetric enlargement applied per axis to the domain box so that domain
/// points never land exactly on a partition plane.
const ENLARGE: f64 = 0.0879;

/// An imposed size is accepted only when it beats the recorded value by this
/// factor. The slack bounds the graded propagation's mutual recursion.
const HYSTERESIS: f64 = 1.2;

/// A local mesh-size field over a cubical domain.
///
/// Leaves of the tree record a size target `hopt`; [`impose`](Self::impose)
/// refines the tree at a point and spreads the constraint outward, growing
/// by the grading coefficient per cell edge, so that
/// [`query`](Self::query) answers with a graded, Lipschitz-bounded field.
///
/// Use the [`SizeField2`] and [`SizeField3`] aliases.
#[derive(Debug)]
pub struct SizeField<S, const CHILDREN: usize> {
    pub(crate) pool: CellPool<CHILDREN>,
    pub(crate) root: AllocPtr,
    pub(crate) metrics: FieldMetrics,
    domain: Aabb,
    grading: f64,
    shape: PhantomData<S>,
}

/// A quadtree size field; the z coordinate of every point is ignored.
pub type SizeField2 = SizeField<QuadShape, 4>;

/// An octree size field.
pub type SizeField3 = SizeField<OctShape, 8>;

impl<S: CellShape, const CHILDREN: usize> SizeField<S, CHILDREN> {
    /// Builds a field over the domain box `[min, max]` with the given
    /// grading coefficient (conventionally within `(0.1, 0.9)`; smaller
    /// grades slower).
    ///
    /// The root cube is the domain enlarged asymmetrically per axis and
    /// squared to the largest side, so that no domain point sits exactly on
    /// a partition plane.
    pub fn new(min: DVec3, max: DVec3, grading: f64) -> Result<Self, SizeFieldError> {
        for axis in 0..S::DIM {
            if !min[axis].is_finite() || !max[axis].is_finite() {
                return Err(SizeFieldError::NonFiniteBounds);
            }
            if min[axis] >= max[axis] {
                return Err(SizeFieldError::DegenerateBounds {
                    axis,
                    min: min[axis],
                    max: max[axis],
                });
            }
        }
        if grading <= 0.0 || grading > 1.0 {
            tracing::warn!(grading, "grading coefficient outside (0, 1]");
        }

        let mut lo = DVec3::ZERO;
        let mut hi = DVec3::ZERO;
        for axis in 0..S::DIM {
            let f = ENLARGE * (axis + 1) as f64;
            lo[axis] = (1.0 + f) * min[axis] - f * max[axis];
            hi[axis] = 1.1 * max[axis] - 0.1 * min[axis];
        }
        let mut edge = hi.x - lo.x;
        for axis in 1..S::DIM {
            edge = edge.max(hi[axis] - lo[axis]);
        }
        for axis in 0..S::DIM {
            hi[axis] = lo[axis] + edge;
        }

        let mut pool = CellPool::new();
        let root = pool.insert(Cell::from_corners(lo, hi));

        Ok(Self {
            pool,
            root,
            metrics: FieldMetrics::default(),
            domain: Aabb::new(min, max),
            grading,
            shape: PhantomData,
        })
    }

    /// Imposes the size target `h` at `p` and spreads it outward, relaxing
    /// by one grading step per cell edge.
    ///
    /// Constraints outside the root cube are dropped, as are constraints no
    /// tighter than what the field already records at `p`.
    pub fn impose(&mut self, p: DVec3, h: f64) {
        debug_assert!(h > 0.0 && h.is_finite());

        let (root_center, root_half) = {
            let root = &self.pool[self.root];
            (root.center, root.half)
        };
        if !S::contains(root_center, root_half, p) {
            return;
        }
        if self.query(p) <= HYSTERESIS * h {
            return;
        }

        // Finest existing cell on the descent path of `p`.
        let mut cur = self.root;
        loop {
            let cell = &self.pool[cur];
            let next = cell.child(S::child_code(cell.center, p));
            if next == EMPTY_PTR {
                break;
            }
            cur = next;
        }

        // Split until the cell is at least as fine as the target.
        while self.pool[cur].edge() > h {
            let (center, half) = {
                let cell = &self.pool[cur];
                (cell.center, cell.half)
            };
            let code = S::child_code(center, p);
            let (lo, hi) = S::child_corners(center, half, code);
            let mut child = Cell::from_corners(lo, hi);
            child.parent = cur;
            let ptr = self.pool.insert(child);
            self.pool[cur].children[code as usize] = ptr;
            cur = ptr;
        }

        self.pool[cur].hopt = h;

        let step = self.pool[cur].edge();
        let relaxed = h + self.grading * step;
        for axis in 0..S::DIM {
            let mut np = p;
            np[axis] = p[axis] + step;
            self.impose(np, relaxed);
            np[axis] = p[axis] - step;
            self.impose(np, relaxed);
        }
    }

    /// Target size at `p`: the `hopt` of the finest cell on its descent
    /// path. Defined for any point.
    pub fn query(&self, p: DVec3) -> f64 {
        let mut cell = &self.pool[self.root];
        loop {
            let next = cell.child(S::child_code(cell.center, p));
            if next == EMPTY_PTR {
                return cell.hopt;
            }
            cell = &self.pool[next];
        }
    }

    /// Lower bound on cell edge length over `[lo, hi]`; corner order per
    /// axis does not matter. Returns [`NO_CONSTRAINT`] when the box misses
    /// the tree entirely.
    pub fn min_over_box(&self, lo: DVec3, hi: DVec3) -> f64 {
        let b = Aabb::from_points(lo, hi);
        self.min_edge_rec(self.root, b.min, b.max)
    }

    fn min_edge_rec(&self, ptr: AllocPtr, lo: DVec3, hi: DVec3) -> f64 {
        let cell = &self.pool[ptr];
        if S::disjoint(cell.center, cell.half, lo, hi) {
            return NO_CONSTRAINT;
        }
        let mut min = cell.edge();
        for &child in &cell.children {
            if child != EMPTY_PTR {
                min = min.min(self.min_edge_rec(child, lo, hi));
            }
        }
        min
    }

    /// Pads every refined region with a one-cell buffer of comparable size:
    /// each registered cell re-imposes `1.001 * hopt` at the 27 lattice
    /// offsets of its own `hopt` around its center.
    pub fn widen(&mut self) {
        let seeds: Vec<(DVec3, f64)> = self
            .pool
            .iter()
            .map(|cell| (cell.center, cell.hopt))
            .collect();
        for (center, h) in seeds {
            for i in -1..=1 {
                for j in -1..=1 {
                    for k in -1..=1 {
                        let offset = DVec3::new(i as f64, j as f64, k as f64);
                        self.impose(center + h * offset, 1.001 * h);
                    }
                }
            }
        }
    }

    /// Closes axis-wise concavities in the size function: a cell whose
    /// target exceeds all of its axis neighbors' is pulled down to the
    /// largest neighboring value.
    pub fn convexify(&mut self) {
        self.convexify_rec(self.root);
    }

    fn convexify_rec(&mut self, ptr: AllocPtr) {
        let (center, edge, hopt) = {
            let cell = &self.pool[ptr];
            (cell.center, cell.edge(), cell.hopt)
        };
        let dx = 0.6 * edge;

        let mut maxh = hopt;
        for axis in 0..3 {
            let mut probe = center;
            probe[axis] = center[axis] + dx;
            maxh = maxh.max(self.query(probe));
            probe[axis] = center[axis] - dx;
            maxh = maxh.max(self.query(probe));
        }

        if maxh < 0.95 * hopt {
            self.impose(center, maxh);
        }

        for code in 0..CHILDREN {
            let child = self.pool[ptr].children[code];
            if child != EMPTY_PTR {
                self.convexify_rec(child);
            }
        }
    }

    /// Drops every cell and restarts from a fresh root over the same cube.
    pub fn clear(&mut self) {
        let (center, half) = {
            let root = &self.pool[self.root];
            (root.center, root.half)
        };
        self.pool.clear();
        let offset = S::corner_offset(half);
        self.root = self.pool.insert(Cell::from_corners(center - offset, center + offset));
    }

    /// Midpoints of cells classified as entirely inner. A quadtree field
    /// reports only refined inner cells; an octree field reports all of
    /// them.
    pub fn inner_points(&self) -> Vec<DVec3> {
        self.pool
            .iter()
            .filter(|cell| cell.flags.is_inner && (S::DIM == 3 || cell.has_children()))
            .map(|cell| cell.midpoint())
            .collect()
    }

    /// Midpoints of cells on neither side of the boundary: not inner and
    /// not cut.
    pub fn outer_points(&self) -> Vec<DVec3> {
        self.pool
            .iter()
            .filter(|cell| !cell.flags.is_inner && !cell.flags.cut_boundary)
            .map(|cell| cell.midpoint())
            .collect()
    }

    /// The domain box the field was constructed over, before enlargement.
    #[inline]
    pub fn domain(&self) -> Aabb {
        self.domain
    }

    /// The grading coefficient.
    #[inline]
    pub fn grading(&self) -> f64 {
        self.grading
    }

    /// The enlarged root cube. Inactive axes have zero extent.
    pub fn root_box(&self) -> Aabb {
        let root = &self.pool[self.root];
        let offset = S::corner_offset(root.half);
        Aabb::new(root.center - offset, root.center + offset)
    }

    /// Number of live cells, root included.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.pool.len()
    }

    /// Creation-order iteration over every cell.
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = &Cell<CHILDREN>> {
        self.pool.iter()
    }

    /// Looks up a cell by pointer, e.g. one obtained from
    /// [`Cell::parent`].
    #[inline]
    pub fn cell(&self, ptr: AllocPtr) -> Option<&Cell<CHILDREN>> {
        self.pool.get(ptr)
    }

    /// Timers recorded by the classification passes.
    #[inline]
    pub fn metrics(&self) -> &FieldMetrics {
        &self.metrics
    }

    /// Cell count and per-cell storage cost.
    pub fn memory_report(&self) -> MemoryReport {
        MemoryReport {
            cells: self.pool.len(),
            cell_bytes: mem::size_of::<Cell<CHILDREN>>(),
        }
    }
}

/// Storage summary of a field, printable as `N cells of B bytes = X bytes`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryReport {
    pub cells: usize,
    pub cell_bytes: usize,
}

impl MemoryReport {
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.cells * self.cell_bytes
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cells of {} bytes = {} bytes",
            self.cells,
            self.cell_bytes,
            self.total_bytes()
        )
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
