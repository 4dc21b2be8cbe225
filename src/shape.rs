use crate::ChildIndex;

use glam::DVec3;

/// Dimension dispatch for the shared tree skeleton.
///
/// The skeleton never branches on the dimension itself; which axes are
/// active, how a point maps to a child slot, and the geometry of a child box
/// all come through this trait. Points are 3-D in either case; [`QuadShape`]
/// keeps the third coordinate pinned to 0 and ignores it in every test.
pub trait CellShape {
    /// Number of active axes.
    const DIM: usize;

    /// Child slot code of `p` relative to `center`, one bit per active axis.
    #[inline]
    fn child_code(center: DVec3, p: DVec3) -> ChildIndex {
        let mut code: ChildIndex = 0;
        for axis in 0..Self::DIM {
            if p[axis] > center[axis] {
                code |= 1 << axis;
            }
        }
        code
    }

    /// Corners of the child box selected by `code` inside the parent of the
    /// given center and half-edge. Inactive axes stay pinned to 0.
    #[inline]
    fn child_corners(center: DVec3, half: f64, code: ChildIndex) -> (DVec3, DVec3) {
        let mut lo = DVec3::ZERO;
        let mut hi = DVec3::ZERO;
        for axis in 0..Self::DIM {
            if code & (1 << axis) != 0 {
                lo[axis] = center[axis];
                hi[axis] = lo[axis] + half;
            } else {
                hi[axis] = center[axis];
                lo[axis] = hi[axis] - half;
            }
        }
        (lo, hi)
    }

    /// Is `p` within the box of the given center and half-edge?
    #[inline]
    fn contains(center: DVec3, half: f64, p: DVec3) -> bool {
        (0..Self::DIM).all(|axis| (p[axis] - center[axis]).abs() <= half)
    }

    /// Is the box of the given center and half-edge disjoint from `[lo, hi]`?
    #[inline]
    fn disjoint(center: DVec3, half: f64, lo: DVec3, hi: DVec3) -> bool {
        (0..Self::DIM)
            .any(|axis| hi[axis] < center[axis] - half || lo[axis] > center[axis] + half)
    }

    /// Offset from a box center to its upper corner, active axes only.
    #[inline]
    fn corner_offset(half: f64) -> DVec3 {
        let mut v = DVec3::ZERO;
        for axis in 0..Self::DIM {
            v[axis] = half;
        }
        v
    }
}

/// Shape of quadtree cells: axes x and y, four child slots.
#[derive(Debug)]
pub enum QuadShape {}

impl CellShape for QuadShape {
    const DIM: usize = 2;
}

/// Shape of octree cells: all three axes, eight child slots.
#[derive(Debug)]
pub enum OctShape {}

impl CellShape for OctShape {
    const DIM: usize = 3;
}
