//! Classification of cells against an advancing front.
//!
//! The front is consulted through the [`AdvancingFront`] oracle. Phase A
//! ([`SizeField::cut_boundary`]) marks cells whose boxes touch boundary
//! features; phase B ([`SizeField::find_inner_boxes`]) decides for every
//! cell whether it lies in the domain interior, sweeping depth-first and
//! narrowing the candidate face set as it descends.

use crate::bounds::Aabb;
use crate::field::SizeField;
use crate::pool::{AllocPtr, EMPTY_PTR};
use crate::shape::CellShape;

use glam::{DVec2, DVec3};
use smallvec::SmallVec;
use std::time::Instant;

/// Face lists are partitioned in place on the stack up to this many entries
/// per level.
type FaceList = SmallVec<[u32; 100]>;

/// Oracle describing the advancing front as a set of faces.
///
/// `same_side` must report whether a continuous path between the two points
/// can avoid crossing the front; the `among` variant restricts the test to
/// the given face indices. An inconsistent oracle yields consistent flag
/// values whose inner/outer meaning may be wrong; no attempt is made to
/// detect that.
pub trait AdvancingFront {
    fn face_count(&self) -> usize;

    /// Bounding box of face `index`.
    fn face_box(&self, index: usize) -> Aabb;

    fn same_side(&self, a: DVec3, b: DVec3) -> bool;

    /// `same_side` restricted to a subset of faces; only faces that might
    /// lie between the two points matter.
    fn same_side_among(&self, a: DVec3, b: DVec3, faces: &[u32]) -> bool;
}

/// A 2-D front described by line segments.
pub trait FrontSegments {
    fn segment_count(&self) -> usize;

    /// Endpoints of segment `index`.
    fn segment(&self, index: usize) -> (DVec2, DVec2);

    fn same_side(&self, a: DVec2, b: DVec2) -> bool;

    fn same_side_among(&self, a: DVec2, b: DVec2, segments: &[u32]) -> bool;
}

/// Adapter presenting a segment front as a face oracle: segment endpoints
/// become face boxes at z = 0, points are classified in the plane.
pub struct SegmentFront<T>(pub T);

impl<T: FrontSegments> AdvancingFront for SegmentFront<T> {
    fn face_count(&self) -> usize {
        self.0.segment_count()
    }

    fn face_box(&self, index: usize) -> Aabb {
        let (a, b) = self.0.segment(index);
        Aabb::from_points(a.extend(0.0), b.extend(0.0))
    }

    fn same_side(&self, a: DVec3, b: DVec3) -> bool {
        self.0.same_side(a.truncate(), b.truncate())
    }

    fn same_side_among(&self, a: DVec3, b: DVec3, faces: &[u32]) -> bool {
        self.0.same_side_among(a.truncate(), b.truncate(), faces)
    }
}

impl<S: CellShape, const CHILDREN: usize> SizeField<S, CHILDREN> {
    /// Phase A: marks every cell whose box intersects `[lo, hi]` as
    /// boundary-cutting. Disjoint subtrees are pruned; a box outside the
    /// tree marks nothing.
    pub fn cut_boundary(&mut self, lo: DVec3, hi: DVec3) {
        let b = Aabb::from_points(lo, hi);
        self.cut_boundary_rec(self.root, b.min, b.max);
    }

    fn cut_boundary_rec(&mut self, ptr: AllocPtr, lo: DVec3, hi: DVec3) {
        let cell = &self.pool[ptr];
        if S::disjoint(cell.center, cell.half, lo, hi) {
            return;
        }
        self.pool[ptr].flags.cut_boundary = true;
        for code in 0..CHILDREN {
            let child = self.pool[ptr].children[code];
            if child != EMPTY_PTR {
                self.cut_boundary_rec(child, lo, hi);
            }
        }
    }

    /// Phase B: decides `p_inner` and `is_inner` for every cell.
    ///
    /// The root's center is seeded against one of its corners; from there a
    /// depth-first sweep inherits side information from each parent,
    /// calling the oracle only across cells the front actually cuts and
    /// only against faces whose boxes could lie between the two centers.
    ///
    /// `probe`, when given, is evaluated at the root center and compared
    /// against the seed classification for debugging.
    pub fn find_inner_boxes<F: AdvancingFront>(
        &mut self,
        front: &F,
        probe: Option<&dyn Fn(DVec3) -> bool>,
    ) {
        let started = Instant::now();
        let face_count = front.face_count();

        for cell in self.pool.iter_mut() {
            cell.flags.is_inner = false;
        }

        let (root_center, root_half) = {
            let root = &self.pool[self.root];
            (root.center, root.half)
        };
        let corner = root_center + S::corner_offset(root_half);
        let seed = !front.same_side(root_center, corner);
        self.pool[self.root].flags.p_inner = seed;

        if let Some(probe) = probe {
            tracing::debug!(seed, probe = probe(root_center), "inner seed vs probe");
        }

        let mut face_inds: Vec<u32> = (0..face_count as u32).collect();
        let face_boxes: Vec<Aabb> = (0..face_count).map(|i| front.face_box(i)).collect();

        for code in 0..CHILDREN {
            let child = self.pool[self.root].children[code];
            if child != EMPTY_PTR {
                self.find_inner_rec(child, front, &face_boxes, &mut face_inds, face_count);
            }
        }

        self.metrics.classify.record(started.elapsed());
    }

    fn find_inner_rec<F: AdvancingFront>(
        &mut self,
        ptr: AllocPtr,
        front: &F,
        face_boxes: &[Aabb],
        face_inds: &mut [u32],
        in_count: usize,
    ) {
        let (center, half, parent) = {
            let cell = &self.pool[ptr];
            (cell.center, cell.half, cell.parent)
        };
        let parent_center = self.pool[parent].center;

        let cell_box = Aabb::from_center_half(center, half);
        let link_box = Aabb::from_points(center, parent_center);

        let mut used: FaceList = SmallVec::new();
        let mut used2: FaceList = SmallVec::new();
        let mut not_used: FaceList = SmallVec::new();

        for &face in &face_inds[..in_count] {
            let face_box = &face_boxes[face as usize];
            if cell_box.intersects(face_box) {
                used.push(face);
            } else {
                not_used.push(face);
            }
            if link_box.intersects(face_box) {
                used2.push(face);
            }
        }

        // Children see only the faces touching this cell, at the front of
        // the shared index array.
        face_inds[..used.len()].copy_from_slice(&used);
        face_inds[used.len()..in_count].copy_from_slice(&not_used);

        let parent_flags = self.pool[parent].flags;
        if !parent_flags.cut_boundary {
            let flags = &mut self.pool[ptr].flags;
            flags.is_inner = parent_flags.is_inner;
            flags.p_inner = parent_flags.p_inner;
        } else {
            let p_inner = if parent_flags.is_inner {
                true
            } else if front.same_side_among(center, parent_center, &used2) {
                parent_flags.p_inner
            } else {
                !parent_flags.p_inner
            };
            let flags = &mut self.pool[ptr].flags;
            flags.p_inner = p_inner;
            flags.is_inner = if flags.cut_boundary { false } else { p_inner };
        }

        let next_count = used.len();
        for code in 0..CHILDREN {
            let child = self.pool[ptr].children[code];
            if child != EMPTY_PTR {
                self.find_inner_rec(child, front, face_boxes, face_inds, next_count);
            }
        }
    }

    /// Classifies cells with a point-membership oracle instead of a front:
    /// boundary-cutting cells are descended, and every other cell whose
    /// midpoint tests inner absorbs its whole subtree.
    pub fn find_inner_boxes_by<F: Fn(DVec3) -> bool>(&mut self, inner: F) {
        self.find_inner_by_rec(self.root, &inner);
    }

    fn find_inner_by_rec<F: Fn(DVec3) -> bool>(&mut self, ptr: AllocPtr, inner: &F) {
        if self.pool[ptr].flags.cut_boundary {
            for code in 0..CHILDREN {
                let child = self.pool[ptr].children[code];
                if child != EMPTY_PTR {
                    self.find_inner_by_rec(child, inner);
                }
            }
        } else if inner(self.pool[ptr].midpoint()) {
            self.set_inner_rec(ptr);
        }
    }

    /// Marks `ptr` inner; its descendants are subsumed and lose their
    /// boundary flags.
    fn set_inner_rec(&mut self, ptr: AllocPtr) {
        self.pool[ptr].flags.is_inner = true;
        for code in 0..CHILDREN {
            let child = self.pool[ptr].children[code];
            if child != EMPTY_PTR {
                self.clear_flags_rec(child);
            }
        }
    }

    fn clear_flags_rec(&mut self, ptr: AllocPtr) {
        {
            let flags = &mut self.pool[ptr].flags;
            flags.cut_boundary = false;
            flags.is_inner = false;
        }
        for code in 0..CHILDREN {
            let child = self.pool[ptr].children[code];
            if child != EMPTY_PTR {
                self.clear_flags_rec(child);
            }
        }
    }
}
