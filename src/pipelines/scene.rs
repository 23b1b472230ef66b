//! Pipeline and uniforms for the offscreen cube pass.

use cgmath::{Matrix3, Matrix4};

use crate::{
    data_structures::{geometry::CubeVertex, texture::Texture},
    pipelines::{mk_render_pipeline, single_texture_layout, uniform_layout},
};

/// Fixed directional light, expressed in view space. Unit length.
pub const LIGHT_DIRECTION: [f32; 3] = [0.0, 0.0, 1.0];

/// Fixed ambient term. No specular component.
pub const AMBIENT_LIGHT: [f32; 4] = [0.3, 0.3, 0.3, 1.0];

/// Per-frame uniforms for the cube pass.
///
/// Matches the WGSL uniform layout: mat3x3 columns and vec3s are padded to
/// 16 bytes each, hence the padding fields.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    model_view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    light_direction: [f32; 3],
    _padding: u32,
    ambient: [f32; 4],
}

impl SceneUniform {
    pub fn new(
        model_view: Matrix4<f32>,
        projection: Matrix4<f32>,
        normal: Matrix3<f32>,
    ) -> Self {
        Self {
            model_view: model_view.into(),
            projection: projection.into(),
            normal: [
                [normal.x.x, normal.x.y, normal.x.z, 0.0],
                [normal.y.x, normal.y.y, normal.y.z, 0.0],
                [normal.z.x, normal.z.y, normal.z.z, 0.0],
            ],
            light_direction: LIGHT_DIRECTION,
            _padding: 0,
            ambient: AMBIENT_LIGHT,
        }
    }
}

pub fn mk_diffuse_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    single_texture_layout(device, "cube diffuse_bind_group_layout")
}

pub fn mk_uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        "scene uniform_bind_group_layout",
    )
}

/// The cube pipeline renders into the offscreen color target with depth
/// testing enabled. The compositor pipeline carries no depth state, which
/// realizes the scene-then-composite ordering the frame driver relies on.
pub fn mk_scene_pipeline(
    device: &wgpu::Device,
    diffuse_layout: &wgpu::BindGroupLayout,
    uniform_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[diffuse_layout, uniform_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        Texture::COLOR_FORMAT,
        Some(Texture::DEPTH_FORMAT),
        &[CubeVertex::desc()],
        shader,
        "Scene Pipeline",
    )
}
