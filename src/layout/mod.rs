//! Spatial layouts: the relaxed 3-D sphere with its camera, and the ring
//! layout for a single member's ego network.

pub mod camera;
pub mod orbit;
pub mod sphere;

pub use camera::{Camera, ProjectedNode, Projection, project};
pub use orbit::{EgoNeighbor, OrbitEdge, OrbitLayout, OrbitNode, Ring, ego_neighbors};
pub use sphere::{LayoutCache, LayoutSnapshot, relax, seed_positions};
