//! The chroma-key compositing pass.
//!
//! Draws the full-screen quad to the visible surface, replacing every video
//! pixel that lies within `threshold` of the key color with the offscreen
//! scene pixel at the same screen coordinate.
//!
//! The per-pixel policy is defined once, in [`composite_pixel`], and the
//! fragment shader mirrors it exactly; tests exercise the CPU side.

use cgmath::Vector3;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::QuadGeometry,
        texture::{OffscreenTarget, create_clamp_sampler},
    },
    pipelines::composite::{
        ChromaUniform, mk_composite_pipeline, mk_params_layout, mk_textures_layout,
    },
    video::VideoFrameSource,
};

/// `1 / sqrt(3)`: normalizes the RGB Euclidean distance so the maximum
/// achievable distance (between diagonally opposite corners of the color
/// cube, e.g. black and white) is exactly 1.0.
pub const INV_SQRT3: f32 = 0.577_350_26;

/// Normalized Euclidean distance between two RGB colors in `[0, 1]^3`.
pub fn chroma_distance(color: [f32; 3], key: [f32; 3]) -> f32 {
    let d = [color[0] - key[0], color[1] - key[1], color[2] - key[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() * INV_SQRT3
}

/// The compositing policy for one pixel: background where the video color
/// is strictly within `threshold` of the key, the video pixel otherwise.
/// The boundary `distance == threshold` keeps the video pixel, so a static
/// input composites identically frame after frame.
pub fn composite_pixel(
    video: [f32; 4],
    background: [f32; 4],
    key: [f32; 3],
    threshold: f32,
) -> [f32; 4] {
    if chroma_distance([video[0], video[1], video[2]], key) < threshold {
        background
    } else {
        video
    }
}

/// User-tunable keying parameters. Consumed at the start of every composite
/// pass; writes from UI events are plain scalar stores on the loop thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChromaKeyParams {
    pub key: Vector3<f32>,
    pub threshold: f32,
}

impl ChromaKeyParams {
    /// Set the key color, components clamped into `[0, 1]`.
    pub fn set_key(&mut self, key: Vector3<f32>) {
        self.key = key.map(|c| c.clamp(0.0, 1.0));
    }

    /// Set the threshold, clamped into `[0, 1]`.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }
}

impl Default for ChromaKeyParams {
    /// Green key at a moderate threshold, the classic green-screen setup.
    fn default() -> Self {
        Self {
            key: Vector3::new(0.0, 1.0, 0.0),
            threshold: 0.3,
        }
    }
}

/// Full-screen compositing pass over the visible surface.
pub struct Compositor {
    params: ChromaKeyParams,
    pipeline: wgpu::RenderPipeline,
    quad: QuadGeometry,
    textures_layout: wgpu::BindGroupLayout,
    textures_bind_group: Option<wgpu::BindGroup>,
    bound_generation: u64,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
}

impl Compositor {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let textures_layout = mk_textures_layout(device);
        let params_layout = mk_params_layout(device);
        let pipeline =
            mk_composite_pipeline(device, surface_format, &textures_layout, &params_layout);
        let quad = QuadGeometry::new(device);

        let params = ChromaKeyParams::default();
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Chroma Params Buffer"),
            contents: bytemuck::cast_slice(&[ChromaUniform {
                key: params.key.into(),
                threshold: params.threshold,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &params_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
            label: Some("chroma params_bind_group"),
        });

        Self {
            params,
            pipeline,
            quad,
            textures_layout,
            textures_bind_group: None,
            bound_generation: 0,
            params_buffer,
            params_bind_group,
        }
    }

    /// Set the key color, clamped into `[0, 1]`. Takes effect on the next
    /// composite pass; no interpolation across frames.
    pub fn set_chroma_key(&mut self, key: Vector3<f32>) {
        self.params.set_key(key);
    }

    /// Set the keying threshold, clamped into `[0, 1]`. Takes effect on the
    /// next composite pass.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.params.set_threshold(threshold);
    }

    pub fn params(&self) -> ChromaKeyParams {
        self.params
    }

    /// The texture bind group references concrete texture views, so it must
    /// be rebuilt whenever the video texture was reallocated or the
    /// offscreen target was resized.
    fn ensure_textures_bind_group(
        &mut self,
        device: &wgpu::Device,
        offscreen: &OffscreenTarget,
        video: &VideoFrameSource,
    ) {
        if self.textures_bind_group.is_none() || self.bound_generation != video.generation() {
            let video_sampler = video
                .texture
                .sampler
                .clone()
                .unwrap_or_else(|| create_clamp_sampler(device));
            let background_sampler = offscreen
                .color
                .sampler
                .clone()
                .unwrap_or_else(|| create_clamp_sampler(device));
            let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.textures_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&video.texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&video_sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&offscreen.color.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&background_sampler),
                    },
                ],
                label: Some("composite texture_bind_group"),
            });
            self.textures_bind_group = Some(group);
            self.bound_generation = video.generation();
        }
    }

    /// Called by the context when the offscreen target was rebuilt and the
    /// cached bind group points at a stale view.
    pub fn invalidate_bindings(&mut self) {
        self.textures_bind_group = None;
    }

    /// Draw the composite to `surface_view`. Clears to opaque black, then
    /// covers the viewport with the keyed quad. Current parameters are
    /// flushed to the GPU at the start of the pass.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        offscreen: &OffscreenTarget,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        video: &VideoFrameSource,
    ) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::cast_slice(&[ChromaUniform {
                key: self.params.key.into(),
                threshold: self.params.threshold,
            }]),
        );
        self.ensure_textures_bind_group(device, offscreen, video);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        if let Some(group) = self.textures_bind_group.as_ref() {
            render_pass.set_bind_group(0, group, &[]);
        }
        render_pass.set_bind_group(1, &self.params_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
        render_pass.draw(0..self.quad.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [f32; 3] = [0.0, 1.0, 0.0];

    #[test]
    fn distance_is_zero_for_equal_colors() {
        assert_eq!(chroma_distance(GREEN, GREEN), 0.0);
    }

    #[test]
    fn distance_is_one_at_opposite_corners() {
        let d = chroma_distance([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!((d - 1.0).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn zero_threshold_never_replaces() {
        // Even an exact key match has distance 0, which is not < 0.
        let video = [0.0, 1.0, 0.0, 1.0];
        let background = [0.9, 0.1, 0.2, 1.0];
        assert_eq!(composite_pixel(video, background, GREEN, 0.0), video);
    }

    #[test]
    fn boundary_distance_keeps_video_pixel() {
        let video = [1.0, 1.0, 0.0, 1.0];
        let background = [0.0; 4];
        let t = chroma_distance([1.0, 1.0, 0.0], GREEN);
        assert_eq!(composite_pixel(video, background, GREEN, t), video);
    }

    #[test]
    fn params_default_is_green_screen() {
        let p = ChromaKeyParams::default();
        assert_eq!(p.key, Vector3::new(0.0, 1.0, 0.0));
        assert!((p.threshold - 0.3).abs() < 1e-6);
    }

    #[test]
    fn setters_clamp_into_unit_range() {
        let mut p = ChromaKeyParams::default();
        p.set_key(Vector3::new(1.5, -0.2, 0.5));
        p.set_threshold(1.7);
        assert_eq!(p.key, Vector3::new(1.0, 0.0, 0.5));
        assert_eq!(p.threshold, 1.0);
        p.set_threshold(-0.4);
        assert_eq!(p.threshold, 0.0);
    }
}
