//! chromix
//!
//! A real-time compositing renderer: a live camera feed is chroma-keyed
//! against a user-tunable key color and composited over a 3D scene (a
//! textured, rotating cube) that is pre-rendered into an offscreen buffer
//! every tick.
//!
//! High-level modules
//! - `context`: central GPU context that owns device/queue/surface/offscreen target
//! - `data_structures`: static geometry and GPU texture wrappers
//! - `scene`: offscreen cube pass (perspective, one directional light + ambient)
//! - `video`: camera seam and per-tick video texture upload
//! - `compositor`: chroma-key full-screen pass over the visible surface
//! - `driver`: event loop, tick orchestration and cancellation
//! - `math`: fixed-dimension transform helpers
//! - `pipelines`: render pipeline and uniform definitions
//! - `resources`: asset loading
//!

pub mod compositor;
pub mod context;
pub mod data_structures;
pub mod driver;
pub mod math;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod video;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::event::WindowEvent;
