//! glider
//!
//! A lightweight, cross-platform flight-scene renderer for native and WASM
//! targets. The crate organizes triangle meshes into a hierarchical scene
//! graph with per-node GPU resources and renders an animated flight scene
//! (an articulated airplane with moving control surfaces circling a textured
//! sphere) in a single depth-tested render pass per frame.
//!
//! High-level modules
//! - `transform`: self-contained vector/matrix kernel (translate, rotate,
//!   look-at, perspective, inverses) used for all transform composition
//! - `context`: central GPU and window context that owns device/queue/surface
//! - `data_structures`: engine data models (mesh buffers, scene graph, textures)
//! - `pipelines`: render pipeline and bind group layout construction
//! - `renderer`: per-frame scene traversal, uniform refresh and draw submission
//! - `resources`: helpers to load textures and OBJ meshes into mesh buffers
//! - `flight`: the flight scene itself (input, per-frame state, node tree)
//! - `app`: winit event loop driving the demo
//!

pub mod app;
pub mod context;
pub mod data_structures;
pub mod flight;
pub mod pipelines;
pub mod renderer;
pub mod resources;
pub mod transform;

// Re-exports commonly used types for convenience in downstream code.
pub use wgpu::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
