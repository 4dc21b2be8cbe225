//! [![Crates.io](https://img.shields.io/crates/v/size-tree.svg)](https://crates.io/crates/size-tree)
//! [![Docs.rs](https://docs.rs/size-tree/badge.svg)](https://docs.rs/size-tree)
//!
//! Graded mesh-size quadtrees and octrees.
//!
//! A [`SizeField`] answers, at any point of a meshing domain, "what is the
//! target element size here?". It is an adaptively refined octree
//! ([`SizeField3`]) or quadtree ([`SizeField2`]) whose leaves record a local
//! size target. Imposing a size at a point refines the tree there and spreads
//! the constraint outward, growing by the grading coefficient per cell edge,
//! so the field stays Lipschitz-bounded: a tight size at one point smoothly
//! enlarges with distance.
//!
//! During meshing the field is queried pointwise ([`SizeField::query`]), over
//! boxes ([`SizeField::min_over_box`]), padded ([`SizeField::widen`]) and
//! smoothed ([`SizeField::convexify`]), and classified against the advancing
//! front (the [`AdvancingFront`] oracle) to find cells that are inside,
//! outside, or straddling the domain boundary.
//!
//! # Design Advantages
//!
//! - Cells live in a [`CellPool`] and link to parents and children through
//!   plain indices, so there are no ownership cycles, no per-node
//!   allocations, and global passes iterate the pool linearly instead of
//!   walking the tree.
//! - The tree skeleton is dimension-agnostic. Everything that depends on the
//!   dimension, such as active axes, child slot codes and child box
//!   geometry, goes through [`CellShape`], instantiated by [`QuadShape`] and
//!   [`OctShape`]. Quadtree cells keep their third coordinate pinned to 0.
//! - All cells are cubical by construction and refinement keeps every
//!   recorded target within a factor of two of its cell's edge, so `query`
//!   is a single root-to-leaf descent and range minima prune whole subtrees
//!   on box disjointness.
//! - Boundary classification narrows its candidate face set as it descends,
//!   partitioning one shared index array in place, so the expensive
//!   side-of-front tests run against a shrinking, locality-filtered subset.
//!
//! # Performance
//!
//! - `query`: O(depth)
//! - `impose`: O(depth) splits plus graded propagation bounded by the
//!   refinement hysteresis
//! - pool iteration: O(cells)
//!
//! with depth bounded by `log2(root edge / finest imposed size)`.

mod bounds;
mod cell;
mod classify;
mod error;
mod field;
mod metrics;
mod pool;
mod shape;

pub use bounds::Aabb;
pub use cell::{Cell, CellFlags};
pub use classify::{AdvancingFront, FrontSegments, SegmentFront};
pub use error::SizeFieldError;
pub use field::{MemoryReport, SizeField, SizeField2, SizeField3, NO_CONSTRAINT};
pub use metrics::{FieldMetrics, Timer, TimerGuard};
pub use pool::{AllocPtr, CellPool, EMPTY_PTR};
pub use shape::{CellShape, OctShape, QuadShape};

pub use glam;

/// A linear index of a child slot relative to its parent.
pub type ChildIndex = u8;
