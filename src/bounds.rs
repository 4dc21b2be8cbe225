use glam::DVec3;

/// An axis-aligned box, closed on both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing both points, given in any order.
    #[inline]
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// The cube of the given half-edge around `center`, extended on all
    /// three axes.
    #[inline]
    pub fn from_center_half(center: DVec3, half: f64) -> Self {
        let v = DVec3::splat(half);
        Self {
            min: center - v,
            max: center + v,
        }
    }

    /// Grows the box to contain `p`.
    #[inline]
    pub fn add_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    #[inline]
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }
}
