use crate::pool::{AllocPtr, EMPTY_PTR};
use crate::ChildIndex;

use glam::DVec3;

/// Classification flags, all clear on a fresh cell.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CellFlags {
    /// The cell's box straddles the advancing front.
    pub cut_boundary: bool,
    /// The whole cell lies in the domain interior.
    pub is_inner: bool,
    /// The cell's center lies in the domain interior.
    pub p_inner: bool,
    /// Marks cells that predate the current refinement pass.
    pub old_cell: bool,
}

/// A node of the size tree: a cube of edge `2 * half` around `center`,
/// carrying the local size target `hopt`.
///
/// Child slots are indexed by the 3-bit code `bx | by << 1 | bz << 2`, where
/// each bit is set iff the point lies past the center on that axis. A
/// quadtree cell only ever populates codes 0..4.
#[derive(Clone, Debug)]
pub struct Cell<const CHILDREN: usize> {
    pub(crate) center: DVec3,
    pub(crate) half: f64,
    pub(crate) hopt: f64,
    pub(crate) parent: AllocPtr,
    pub(crate) children: [AllocPtr; CHILDREN],
    pub(crate) flags: CellFlags,
}

impl<const CHILDREN: usize> Cell<CHILDREN> {
    /// Builds the cell spanning `[lo, hi]`. The half-edge is taken from the
    /// first axis; callers pass cubical corners. A fresh cell advertises no
    /// target tighter than its own edge.
    pub(crate) fn from_corners(lo: DVec3, hi: DVec3) -> Self {
        Self {
            center: 0.5 * (lo + hi),
            half: 0.5 * (hi.x - lo.x),
            hopt: hi.x - lo.x,
            parent: EMPTY_PTR,
            children: [EMPTY_PTR; CHILDREN],
            flags: CellFlags::default(),
        }
    }

    /// The cell's center point.
    #[inline]
    pub fn midpoint(&self) -> DVec3 {
        self.center
    }

    #[inline]
    pub fn half(&self) -> f64 {
        self.half
    }

    /// Edge length of the cell's box.
    #[inline]
    pub fn edge(&self) -> f64 {
        2.0 * self.half
    }

    /// The recorded size target.
    #[inline]
    pub fn hopt(&self) -> f64 {
        self.hopt
    }

    #[inline]
    pub fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Pointer to the parent cell, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<AllocPtr> {
        (self.parent != EMPTY_PTR).then_some(self.parent)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children.iter().any(|&child| child != EMPTY_PTR)
    }

    /// Pointers to the occupied child slots.
    #[inline]
    pub fn children(&self) -> impl Iterator<Item = AllocPtr> + '_ {
        self.children.iter().copied().filter(|&child| child != EMPTY_PTR)
    }

    /// Pointer to the child at `code`, if that slot is occupied.
    #[inline]
    pub fn child_at(&self, code: ChildIndex) -> Option<AllocPtr> {
        let child = self.children[code as usize];
        (child != EMPTY_PTR).then_some(child)
    }

    #[inline]
    pub(crate) fn child(&self, code: ChildIndex) -> AllocPtr {
        self.children[code as usize]
    }
}
