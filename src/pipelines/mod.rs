//! Render pipeline construction.
//!
//! `flight` builds the single textured-and-lit pipeline the renderer draws
//! every scene node with, along with the per-node bind group layout.

pub mod flight;
