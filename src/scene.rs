//! The offscreen scene pass: a textured, lit, rotating cube.

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        geometry::CubeGeometry,
        texture::{OffscreenTarget, create_repeat_sampler},
    },
    math,
    pipelines::scene::{SceneUniform, mk_diffuse_layout, mk_scene_pipeline, mk_uniform_layout},
    resources,
};

/// Clear color of the offscreen target (sky blue).
pub const SKY_BLUE: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.7,
    b: 0.9,
    a: 1.0,
};

/// Draws the cube into the offscreen target. Owns the cube geometry, its
/// surface texture and the per-frame uniform buffer.
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    cube: CubeGeometry,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    diffuse_bind_group: wgpu::BindGroup,
}

impl SceneRenderer {
    pub async fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let diffuse =
            resources::load_texture_or_default("cube_diffuse.png", device, queue).await;

        let diffuse_layout = mk_diffuse_layout(device);
        let uniform_layout = mk_uniform_layout(device);
        let pipeline = mk_scene_pipeline(device, &diffuse_layout, &uniform_layout);
        let cube = CubeGeometry::new(device);

        let initial = SceneUniform::new(
            math::model_view(0.0),
            math::projection(1, 1),
            cgmath::Matrix3::from_angle_y(cgmath::Deg(0.0)),
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[initial]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("scene uniform_bind_group"),
        });

        let sampler = diffuse
            .sampler
            .clone()
            .unwrap_or_else(|| create_repeat_sampler(device));
        let diffuse_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &diffuse_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("cube diffuse_bind_group"),
        });

        Self {
            pipeline,
            cube,
            uniform_buffer,
            uniform_bind_group,
            diffuse_bind_group,
        }
    }

    /// Render one frame of the cube at `angle` degrees into the offscreen
    /// target. Clears color (sky blue) and depth first.
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        offscreen: &OffscreenTarget,
        encoder: &mut wgpu::CommandEncoder,
        angle: f32,
    ) -> Result<()> {
        let model_view = math::model_view(angle);
        let normal = math::normal_matrix(&model_view)?;
        let projection = math::projection(offscreen.width, offscreen.height);
        let uniform = SceneUniform::new(model_view, projection, normal);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &offscreen.color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(SKY_BLUE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &offscreen.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.diffuse_bind_group, &[]);
        render_pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.cube.index_count, 0, 0..1);

        Ok(())
    }
}
