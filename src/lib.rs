//! Collaboration graph analytics and layout.
//!
//! Work items flow through [`graph::build_graph`] into two consumers: the
//! metrics and insight functions for reporting, and the sphere and orbit
//! layouts for interactive viewing.

pub mod config;
pub mod graph;
pub mod insights;
pub mod interaction;
pub mod layout;
pub mod load;
pub mod metrics;
pub mod model;

pub use config::{CameraParams, EngineConfig, OrbitParams, SimulationParams, load_config};
pub use graph::{CollabGraph, Edge, GraphKey, Node, build_graph};
pub use insights::{Insight, InsightKind, personal_insights, team_insights};
pub use load::{LoadError, load_items, parse_items};
pub use metrics::TeamSnapshot;
pub use model::{Collaborator, Relation, UNKNOWN_GROUP, WorkItem};
