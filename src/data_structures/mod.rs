//! Renderer data structures: static geometry and GPU textures.
//!
//! - `geometry` contains the immutable cube and screen-quad meshes
//! - `texture` contains the GPU texture wrapper and the offscreen target

pub mod geometry;
pub mod texture;
