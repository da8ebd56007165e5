//! Engine data structures: mesh buffers, scene graphs and textures.
//!
//! This module contains the core data types for scene representation:
//!
//! - `mesh` contains CPU-side vertex/index arrays and procedural mesh builders
//! - `scene_graph` enables hierarchical scene organization with per-node GPU resources
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod mesh;
pub mod scene_graph;
pub mod texture;
