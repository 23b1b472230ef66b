//! Pipeline and uniforms for the chroma-key compositing pass.

use crate::{
    data_structures::geometry::QuadVertex,
    pipelines::{mk_render_pipeline, uniform_layout},
};

/// Chroma-key parameters as laid out in the fragment shader: the key color
/// followed by the threshold, which doubles as the vec3's 16-byte padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChromaUniform {
    pub key: [f32; 3],
    pub threshold: f32,
}

/// Video texture + sampler at bindings 0/1, offscreen (background) texture
/// + sampler at bindings 2/3.
pub fn mk_textures_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("composite texture_bind_group_layout"),
    })
}

pub fn mk_params_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        wgpu::ShaderStages::FRAGMENT,
        "chroma params_bind_group_layout",
    )
}

/// Full-screen pass writing to the visible surface. No depth state.
pub fn mk_composite_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    textures_layout: &wgpu::BindGroupLayout,
    params_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Composite Pipeline Layout"),
        bind_group_layouts: &[textures_layout, params_layout],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Composite Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("composite_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        surface_format,
        None,
        &[QuadVertex::desc()],
        shader,
        "Composite Pipeline",
    )
}
