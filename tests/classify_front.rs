//! Boundary classification against concrete advancing fronts.

use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};
use size_tree::{Aabb, AdvancingFront, FrontSegments, SegmentFront, SizeField2, SizeField3};

/// An axis-aligned square boundary, described by its four sides.
struct SquareFront {
    lo: DVec2,
    hi: DVec2,
}

impl SquareFront {
    fn inside(&self, p: DVec2) -> bool {
        p.x > self.lo.x && p.x < self.hi.x && p.y > self.lo.y && p.y < self.hi.y
    }
}

impl FrontSegments for SquareFront {
    fn segment_count(&self) -> usize {
        4
    }

    fn segment(&self, index: usize) -> (DVec2, DVec2) {
        let (lo, hi) = (self.lo, self.hi);
        match index {
            0 => (lo, DVec2::new(hi.x, lo.y)),
            1 => (DVec2::new(hi.x, lo.y), hi),
            2 => (hi, DVec2::new(lo.x, hi.y)),
            _ => (DVec2::new(lo.x, hi.y), lo),
        }
    }

    // The boundary is closed and convex: a path between mixed sides always
    // crosses it, any other pair can route around.
    fn same_side(&self, a: DVec2, b: DVec2) -> bool {
        self.inside(a) == self.inside(b)
    }

    fn same_side_among(&self, a: DVec2, b: DVec2, _segments: &[u32]) -> bool {
        self.same_side(a, b)
    }
}

/// A closed polygonal boundary with crossing-parity side tests.
struct PolygonFront {
    vertices: Vec<DVec2>,
}

fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

fn strictly_crossing(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    orient(a, b, c) * orient(a, b, d) < 0.0 && orient(c, d, a) * orient(c, d, b) < 0.0
}

impl PolygonFront {
    fn circle(center: DVec2, radius: f64, segments: usize) -> Self {
        let vertices = (0..segments)
            .map(|i| {
                let angle = TAU * i as f64 / segments as f64;
                center + radius * DVec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { vertices }
    }

    fn side(&self, index: usize) -> (DVec2, DVec2) {
        let a = self.vertices[index];
        let b = self.vertices[(index + 1) % self.vertices.len()];
        (a, b)
    }

    fn crossings<I: IntoIterator<Item = usize>>(&self, a: DVec2, b: DVec2, sides: I) -> usize {
        sides
            .into_iter()
            .filter(|&i| {
                let (c, d) = self.side(i);
                strictly_crossing(a, b, c, d)
            })
            .count()
    }
}

impl FrontSegments for PolygonFront {
    fn segment_count(&self) -> usize {
        self.vertices.len()
    }

    fn segment(&self, index: usize) -> (DVec2, DVec2) {
        self.side(index)
    }

    fn same_side(&self, a: DVec2, b: DVec2) -> bool {
        self.crossings(a, b, 0..self.vertices.len()) % 2 == 0
    }

    fn same_side_among(&self, a: DVec2, b: DVec2, segments: &[u32]) -> bool {
        self.crossings(a, b, segments.iter().map(|&i| i as usize)) % 2 == 0
    }
}

/// A sphere tessellated into latitude/longitude patches. Patch boxes are
/// padded a little so their union covers the whole surface.
struct SphereFront {
    center: DVec3,
    radius: f64,
    faces: Vec<Aabb>,
}

impl SphereFront {
    const STACKS: usize = 12;
    const SLICES: usize = 16;

    fn new(center: DVec3, radius: f64) -> Self {
        let dir = |phi: f64, theta: f64| {
            DVec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
        };
        let pad = DVec3::splat(0.1 * radius);
        let mut faces = Vec::with_capacity(Self::STACKS * Self::SLICES);
        for si in 0..Self::STACKS {
            for sj in 0..Self::SLICES {
                let phi0 = PI * si as f64 / Self::STACKS as f64;
                let phi1 = PI * (si + 1) as f64 / Self::STACKS as f64;
                let theta0 = TAU * sj as f64 / Self::SLICES as f64;
                let theta1 = TAU * (sj + 1) as f64 / Self::SLICES as f64;
                let mut b = Aabb::from_points(
                    center + radius * dir(phi0, theta0),
                    center + radius * dir(phi0, theta1),
                );
                b.add_point(center + radius * dir(phi1, theta0));
                b.add_point(center + radius * dir(phi1, theta1));
                faces.push(Aabb::new(b.min - pad, b.max + pad));
            }
        }
        Self {
            center,
            radius,
            faces,
        }
    }

    fn inside(&self, p: DVec3) -> bool {
        (p - self.center).length() < self.radius
    }
}

impl AdvancingFront for SphereFront {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_box(&self, index: usize) -> Aabb {
        self.faces[index]
    }

    // Closed convex surface: mixed sides always cross it.
    fn same_side(&self, a: DVec3, b: DVec3) -> bool {
        self.inside(a) == self.inside(b)
    }

    fn same_side_among(&self, a: DVec3, b: DVec3, _faces: &[u32]) -> bool {
        self.same_side(a, b)
    }
}

fn mark_cut_cells<F, S, const CHILDREN: usize>(
    field: &mut size_tree::SizeField<S, CHILDREN>,
    front: &F,
) where
    F: AdvancingFront,
    S: size_tree::CellShape,
{
    for i in 0..front.face_count() {
        let b = front.face_box(i);
        field.cut_boundary(b.min, b.max);
    }
}

#[test]
fn square_front_classifies_quadtree_cells() {
    let mut field = SizeField2::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0), 0.3).unwrap();
    let front = SegmentFront(SquareFront {
        lo: DVec2::splat(0.25),
        hi: DVec2::splat(0.75),
    });

    // Refine along the boundary so cells exist on both sides of it.
    for i in 0..=20 {
        let t = 0.25 + 0.5 * i as f64 / 20.0;
        for p in [(t, 0.25), (t, 0.75), (0.25, t), (0.75, t)] {
            field.impose(DVec3::new(p.0, p.1, 0.0), 0.03);
        }
    }

    mark_cut_cells(&mut field, &front);
    field.find_inner_boxes(&front, None);

    let m = 1e-6;
    let mut inside_cells = 0;
    let mut outside_cells = 0;
    for cell in field.cells() {
        let flags = cell.flags();
        assert!(!(flags.cut_boundary && flags.is_inner));

        let c = cell.midpoint();
        let half = cell.half();
        let strictly_inside = c.x - half > 0.25 + m
            && c.x + half < 0.75 - m
            && c.y - half > 0.25 + m
            && c.y + half < 0.75 - m;
        let strictly_outside = c.x + half < 0.25 - m
            || c.x - half > 0.75 + m
            || c.y + half < 0.25 - m
            || c.y - half > 0.75 + m;
        if strictly_inside {
            assert!(flags.is_inner && !flags.cut_boundary);
            inside_cells += 1;
        } else if strictly_outside {
            assert!(!flags.is_inner && !flags.cut_boundary);
            outside_cells += 1;
        }
    }
    assert!(inside_cells > 0 && outside_cells > 0);

    // Only refined inner cells contribute points in the plane.
    let inner_cells = field.cells().filter(|c| c.flags().is_inner).count();
    let inner_leaves = field
        .cells()
        .filter(|c| c.flags().is_inner && !c.has_children())
        .count();
    assert!(inner_leaves > 0);
    assert_eq!(field.inner_points().len(), inner_cells - inner_leaves);

    for p in field.inner_points() {
        assert!(front.0.inside(p.truncate()));
    }
    for p in field.outer_points() {
        assert!(!front.0.inside(p.truncate()));
    }
}

#[test]
fn circular_front_classifies_quadtree_cells() {
    let center = DVec2::splat(0.5);
    let radius = 0.3;
    let mut field = SizeField2::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0), 0.3).unwrap();
    let front = SegmentFront(PolygonFront::circle(center, radius, 32));

    for i in 0..64 {
        let angle = TAU * i as f64 / 64.0;
        let p = center + radius * DVec2::new(angle.cos(), angle.sin());
        field.impose(p.extend(0.0), 0.03);
    }

    mark_cut_cells(&mut field, &front);
    field.find_inner_boxes(&front, None);

    // The polygon deviates from the circle by at most its sagitta, which
    // the margin dominates.
    let margin = 0.02;
    let mut inside_cells = 0;
    let mut outside_cells = 0;
    let mut cut_cells = 0;
    for cell in field.cells() {
        let flags = cell.flags();
        assert!(!(flags.cut_boundary && flags.is_inner));
        if flags.cut_boundary {
            cut_cells += 1;
        }

        let d = (cell.midpoint().truncate() - center).length();
        let reach = cell.half() * 2f64.sqrt();
        if d + reach < radius - margin {
            assert!(flags.is_inner && !flags.cut_boundary);
            inside_cells += 1;
        } else if d - reach > radius + margin {
            assert!(!flags.is_inner && !flags.cut_boundary);
            outside_cells += 1;
        }
    }
    assert!(inside_cells > 0 && outside_cells > 0 && cut_cells > 0);

    for p in field.inner_points() {
        assert!((p.truncate() - center).length() < radius + margin);
    }
    for p in field.outer_points() {
        assert!((p.truncate() - center).length() > radius - margin);
    }
}

#[test]
fn spherical_front_classifies_octree_cells() {
    let center = DVec3::splat(0.5);
    let radius = 0.3;
    let mut field = SizeField3::new(DVec3::ZERO, DVec3::ONE, 0.3).unwrap();

    // Refine along the surface, around the middle, and out at two domain
    // corners, so every region holds cells fine enough to classify.
    for si in 0..=12 {
        for sj in 0..16 {
            let phi = PI * si as f64 / 12.0;
            let theta = TAU * sj as f64 / 16.0;
            let dir = DVec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            field.impose(center + radius * dir, 0.05);
        }
    }
    field.impose(center, 0.05);
    field.impose(DVec3::splat(0.95), 0.05);
    field.impose(DVec3::splat(0.05), 0.05);

    let front = SphereFront::new(center, radius);
    mark_cut_cells(&mut field, &front);
    field.find_inner_boxes(&front, Some(&|p: DVec3| (p - center).length() < radius));

    assert_eq!(field.metrics().classify.count(), 1);

    let margin = 0.1;
    let mut inside_cells = 0;
    let mut outside_cells = 0;
    for cell in field.cells() {
        let flags = cell.flags();
        assert!(!(flags.cut_boundary && flags.is_inner));

        let c = cell.midpoint();
        let half = cell.half();
        let reach = half * 3f64.sqrt();
        let d = (c - center).length();
        if d + reach < radius - margin {
            assert!(flags.is_inner && !flags.cut_boundary);
            inside_cells += 1;
        } else if d - reach > radius + margin {
            assert!(!flags.is_inner && !flags.cut_boundary);
            outside_cells += 1;
        }

        // A box with corners on both sides of the surface straddles it and
        // must have been marked.
        let mut any_in = false;
        let mut any_out = false;
        for dx in [-1.0, 1.0] {
            for dy in [-1.0, 1.0] {
                for dz in [-1.0, 1.0] {
                    let corner = c + half * DVec3::new(dx, dy, dz);
                    if (corner - center).length() < radius {
                        any_in = true;
                    } else {
                        any_out = true;
                    }
                }
            }
        }
        if any_in && any_out {
            assert!(flags.cut_boundary);
        }
    }
    assert!(inside_cells > 0 && outside_cells > 0);

    // Unlike the plane case, every inner cell contributes a point.
    let inner_cells = field.cells().filter(|c| c.flags().is_inner).count();
    assert_eq!(field.inner_points().len(), inner_cells);

    for p in field.inner_points() {
        assert!((p - center).length() < radius + 1e-9);
    }
    for p in field.outer_points() {
        assert!((p - center).length() > radius - 1e-9);
    }
}
