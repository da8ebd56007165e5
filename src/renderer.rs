//! Frame rendering and GPU buffer management.
//!
//! The [`Renderer`] owns the render pipeline and two ways to feed it:
//!
//! - simple mode: one set of growable vertex/index buffers plus one uniform
//!   block, uploaded with the `update_*_buffer` methods and drawn with
//!   [`Renderer::render`]
//! - hierarchy mode: a [`SceneGraph`] of [`MeshNode`]s, each carrying its
//!   own buffers and uniform block, drawn with
//!   [`Renderer::render_hierarchy`]
//!
//! Growable buffers never shrink. When an upload exceeds a buffer's
//! capacity the buffer is recreated at twice the required size and the old
//! one is destroyed afterwards. Recreation does not copy: growth invalidates
//! the previous contents, and the caller owns re-uploading every stream it
//! still needs.

use std::iter;

use crate::context::Context;
use crate::data_structures::scene_graph::{MeshNode, NodeIndex, SceneGraph};
use crate::data_structures::texture::{Texture, create_default_sampler};
use crate::pipelines::flight::{mk_flight_pipeline, node_bind_group_layout};
use crate::transform::Mat4;

/// Light color and material scalars shared by every node.
pub mod material {
    pub const LIGHT_COLOR: [f32; 4] = [1.0, 0.98, 0.94, 0.0];
    pub const DIFFUSE: f32 = 0.5;
    pub const SPECULAR: f32 = 0.2;
    pub const SHININESS: f32 = 64.0;
    pub const EMISSIVE: f32 = 0.5;
    pub const AMBIENT: f32 = 0.03;
}

/// Per-draw uniform block, 256 bytes.
///
/// Matrices are stored column-major as the shader expects; [`pack`] handles
/// the transpose from the row-major kernel representation. The two material
/// words pack the five shading scalars plus padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    // diffuse, specular, shininess, emissive
    pub material0: [f32; 4],
    // ambient, unused x3
    pub material1: [f32; 4],
}

impl NodeUniform {
    pub fn pack(world: &Mat4, view: &Mat4, proj: &Mat4, light_dir: [f32; 4]) -> Self {
        Self {
            world: world.to_columns_2d(),
            view: view.to_columns_2d(),
            proj: proj.to_columns_2d(),
            light_dir,
            light_color: material::LIGHT_COLOR,
            material0: [
                material::DIFFUSE,
                material::SPECULAR,
                material::SHININESS,
                material::EMISSIVE,
            ],
            material1: [material::AMBIENT, 0.0, 0.0, 0.0],
        }
    }
}

/// Directional light that slowly orbits the scene in the XZ plane.
///
/// Advances by a fixed angle per frame while spinning. An explicit
/// [`set_direction`](Self::set_direction) overrides the orbit until the
/// next advance while spinning, so callers pinning the light should stop
/// the spin first.
#[derive(Clone, Copy, Debug)]
pub struct LightRig {
    theta: f32,
    spinning: bool,
    direction: [f32; 4],
}

impl LightRig {
    const SPIN_PER_FRAME: f32 = 0.002;

    pub fn new() -> Self {
        Self {
            theta: 0.0,
            spinning: true,
            direction: [1.0, 0.0, 0.0, 0.0],
        }
    }

    /// Steps the orbit by one frame. No-op while the spin is disabled.
    pub fn advance(&mut self) {
        if self.spinning {
            self.theta += Self::SPIN_PER_FRAME;
            self.direction = [self.theta.cos(), 0.0, self.theta.sin(), 0.0];
        }
    }

    pub fn set_direction(&mut self, direction: [f32; 4]) {
        self.direction = direction;
    }

    pub fn toggle_spin(&mut self) {
        self.spinning = !self.spinning;
    }

    pub fn direction(&self) -> [f32; 4] {
        self.direction
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacity bookkeeping for one growable buffer, counted in elements.
#[derive(Clone, Copy, Debug)]
pub struct CapacityTracker {
    capacity: usize,
}

impl CapacityTracker {
    pub fn new(initial: usize) -> Self {
        Self { capacity: initial }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn fits(&self, required: usize) -> bool {
        required <= self.capacity
    }

    /// Records a grow to twice the required size and returns the new
    /// capacity. Callers decide when to grow; the tracker never shrinks.
    pub fn grow_to(&mut self, required: usize) -> usize {
        self.capacity = required * 2;
        self.capacity
    }
}

/// A GPU buffer that recreates itself at double capacity when an upload
/// does not fit. Recreation leaves the new buffer empty apart from the
/// upload that triggered it.
struct GrowableBuffer {
    buffer: wgpu::Buffer,
    tracker: CapacityTracker,
    element_size: wgpu::BufferAddress,
    usage: wgpu::BufferUsages,
    label: String,
}

impl GrowableBuffer {
    fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        element_size: wgpu::BufferAddress,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: initial_capacity as wgpu::BufferAddress * element_size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            tracker: CapacityTracker::new(initial_capacity),
            element_size,
            usage,
            label: label.to_string(),
        }
    }

    /// Writes `elements` items of raw data, growing first when needed. The
    /// old buffer is destroyed only after its replacement exists.
    fn upload(&mut self, ctx: &Context, data: &[u8], elements: usize) {
        if !self.tracker.fits(elements) {
            let new_capacity = self.tracker.grow_to(elements);
            log::debug!(
                "growing {} to {} elements, previous contents dropped",
                self.label,
                new_capacity
            );
            let replacement = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as wgpu::BufferAddress * self.element_size,
                usage: self.usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let old = std::mem::replace(&mut self.buffer, replacement);
            old.destroy();
        }
        ctx.queue.write_buffer(&self.buffer, 0, data);
    }
}

/// Initial element capacities for the simple-mode buffers.
#[derive(Clone, Copy, Debug)]
pub struct RendererConfig {
    pub initial_vertex_capacity: usize,
    pub initial_index_capacity: usize,
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            initial_index_capacity: 4096,
            clear_color: wgpu::Color {
                r: 0.53,
                g: 0.81,
                b: 0.92,
                a: 1.0,
            },
        }
    }
}

pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    node_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_texture: Texture,
    clear_color: wgpu::Color,

    // Simple mode: one growable buffer per vertex stream, one uniform block.
    positions: GrowableBuffer,
    colors: GrowableBuffer,
    normals: GrowableBuffer,
    uvs: GrowableBuffer,
    indices: GrowableBuffer,
    uniform_buffer: wgpu::Buffer,
    simple_bind_group: wgpu::BindGroup,
    num_indices: u32,

    pub light: LightRig,
}

impl Renderer {
    pub fn new(ctx: &Context, config: RendererConfig) -> Self {
        let node_layout = node_bind_group_layout(&ctx.device);
        let pipeline = mk_flight_pipeline(&ctx.device, &ctx.config, &node_layout);
        let sampler = create_default_sampler(&ctx.device);
        let fallback_texture = Texture::create_fallback_texture(&ctx.device, &ctx.queue);

        const FLOAT4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        const FLOAT2: wgpu::BufferAddress = std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress;
        let vertices = config.initial_vertex_capacity;
        let positions = GrowableBuffer::new(
            &ctx.device,
            "Simple Position Buffer",
            vertices,
            FLOAT4,
            wgpu::BufferUsages::VERTEX,
        );
        let colors = GrowableBuffer::new(
            &ctx.device,
            "Simple Color Buffer",
            vertices,
            FLOAT4,
            wgpu::BufferUsages::VERTEX,
        );
        let normals = GrowableBuffer::new(
            &ctx.device,
            "Simple Normal Buffer",
            vertices,
            FLOAT4,
            wgpu::BufferUsages::VERTEX,
        );
        let uvs = GrowableBuffer::new(
            &ctx.device,
            "Simple UV Buffer",
            vertices,
            FLOAT2,
            wgpu::BufferUsages::VERTEX,
        );
        let indices = GrowableBuffer::new(
            &ctx.device,
            "Simple Index Buffer",
            config.initial_index_capacity,
            std::mem::size_of::<u32>() as wgpu::BufferAddress,
            wgpu::BufferUsages::INDEX,
        );

        let uniform_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Simple Uniform Buffer"),
            size: std::mem::size_of::<NodeUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let simple_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &node_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&fallback_texture.view),
                },
            ],
            label: Some("Simple Bind Group"),
        });

        Self {
            pipeline,
            node_layout,
            sampler,
            fallback_texture,
            clear_color: config.clear_color,
            positions,
            colors,
            normals,
            uvs,
            indices,
            uniform_buffer,
            simple_bind_group,
            num_indices: 0,
            light: LightRig::new(),
        }
    }

    /// Bind group layout shared by the simple bind group and every
    /// [`MeshNode`], for callers building their own nodes.
    pub fn node_layout(&self) -> &wgpu::BindGroupLayout {
        &self.node_layout
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn fallback_texture(&self) -> &Texture {
        &self.fallback_texture
    }

    pub fn update_position_buffer(&mut self, ctx: &Context, data: &[[f32; 4]]) {
        self.positions
            .upload(ctx, bytemuck::cast_slice(data), data.len());
    }

    pub fn update_color_buffer(&mut self, ctx: &Context, data: &[[f32; 4]]) {
        self.colors
            .upload(ctx, bytemuck::cast_slice(data), data.len());
    }

    pub fn update_normal_buffer(&mut self, ctx: &Context, data: &[[f32; 4]]) {
        self.normals
            .upload(ctx, bytemuck::cast_slice(data), data.len());
    }

    pub fn update_uv_buffer(&mut self, ctx: &Context, data: &[[f32; 2]]) {
        self.uvs.upload(ctx, bytemuck::cast_slice(data), data.len());
    }

    /// Uploads the index stream and remembers how many indices to draw.
    pub fn update_index_buffer(&mut self, ctx: &Context, data: &[u32]) {
        self.indices
            .upload(ctx, bytemuck::cast_slice(data), data.len());
        self.num_indices = data.len() as u32;
    }

    /// Rewrites the simple-mode uniform block with the given matrices and
    /// the current light direction.
    pub fn update_uniform(&mut self, ctx: &Context, world: &Mat4, view: &Mat4, proj: &Mat4) {
        let uniform = NodeUniform::pack(world, view, proj, self.light.direction());
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Draws the simple-mode buffers as one indexed triangle list.
    pub fn render(&mut self, ctx: &Context) -> Result<(), wgpu::SurfaceStatus> {
        self.light.advance();
        let output = acquire_surface_texture(&ctx.surface)?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = self.begin_pass(&mut encoder, &view, &ctx.depth_texture.view);
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.simple_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.positions.buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.colors.buffer.slice(..));
            render_pass.set_vertex_buffer(2, self.normals.buffer.slice(..));
            render_pass.set_vertex_buffer(3, self.uvs.buffer.slice(..));
            render_pass
                .set_index_buffer(self.indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Draws a scene-graph tree rooted at `root`.
    ///
    /// One traversal composes world transforms and rewrites every node's
    /// uniform block, then a single render pass draws each node with its own
    /// buffers and bind group. `root_model` is the transform applied above
    /// the root's local matrix.
    pub fn render_hierarchy(
        &mut self,
        ctx: &Context,
        graph: &SceneGraph<MeshNode>,
        root: NodeIndex,
        root_model: &Mat4,
        view_matrix: &Mat4,
        proj: &Mat4,
    ) -> Result<(), wgpu::SurfaceStatus> {
        self.light.advance();
        let light_dir = self.light.direction();

        let mut draw_order: Vec<NodeIndex> = Vec::with_capacity(graph.len());
        graph.traverse(root, root_model, |idx, world, node| {
            let uniform = NodeUniform::pack(world, view_matrix, proj, light_dir);
            ctx.queue
                .write_buffer(&node.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
            draw_order.push(idx);
        });

        let output = acquire_surface_texture(&ctx.surface)?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Hierarchy Render Encoder"),
            });
        {
            let mut render_pass = self.begin_pass(&mut encoder, &view, &ctx.depth_texture.view);
            render_pass.set_pipeline(&self.pipeline);
            for idx in &draw_order {
                let node = &graph.get(*idx).data;
                render_pass.set_bind_group(0, &node.bind_group, &[]);
                render_pass.set_vertex_buffer(0, node.position_buffer.slice(..));
                render_pass.set_vertex_buffer(1, node.color_buffer.slice(..));
                render_pass.set_vertex_buffer(2, node.normal_buffer.slice(..));
                render_pass.set_vertex_buffer(3, node.uv_buffer.slice(..));
                render_pass
                    .set_index_buffer(node.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..node.num_indices, 0, 0..1);
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn begin_pass<'a>(
        &self,
        encoder: &'a mut wgpu::CommandEncoder,
        view: &'a wgpu::TextureView,
        depth_view: &'a wgpu::TextureView,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        })
    }

    pub fn set_light_direction(&mut self, direction: [f32; 4]) {
        self.light.set_direction(direction);
    }

    pub fn toggle_light_spin(&mut self) {
        self.light.toggle_spin();
    }
}

/// Acquires the next surface texture, mapping the non-success statuses to
/// errors. A suboptimal texture is still usable, so it counts as success.
fn acquire_surface_texture(
    surface: &wgpu::Surface<'_>,
) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceStatus> {
    match surface.get_current_texture() {
        wgpu::CurrentSurfaceTexture::Success(texture)
        | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => Ok(texture),
        wgpu::CurrentSurfaceTexture::Timeout => Err(wgpu::SurfaceStatus::Timeout),
        wgpu::CurrentSurfaceTexture::Occluded => Err(wgpu::SurfaceStatus::Occluded),
        wgpu::CurrentSurfaceTexture::Outdated => Err(wgpu::SurfaceStatus::Outdated),
        wgpu::CurrentSurfaceTexture::Lost => Err(wgpu::SurfaceStatus::Lost),
        wgpu::CurrentSurfaceTexture::Validation => Err(wgpu::SurfaceStatus::Validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::translate;

    #[test]
    fn node_uniform_is_256_bytes() {
        assert_eq!(std::mem::size_of::<NodeUniform>(), 256);
    }

    #[test]
    fn node_uniform_stores_matrices_column_major() {
        let world = translate(1.0, 2.0, 3.0);
        let uniform = NodeUniform::pack(
            &world,
            &Mat4::identity(),
            &Mat4::identity(),
            [1.0, 0.0, 0.0, 0.0],
        );
        // Column-major: the translation lands in the fourth column.
        assert_eq!(uniform.world[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.world[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn node_uniform_packs_material_scalars() {
        let uniform = NodeUniform::pack(
            &Mat4::identity(),
            &Mat4::identity(),
            &Mat4::identity(),
            [0.0, 1.0, 0.0, 0.0],
        );
        assert_eq!(uniform.light_color, material::LIGHT_COLOR);
        assert_eq!(uniform.material0, [0.5, 0.2, 64.0, 0.5]);
        assert_eq!(uniform.material1, [0.03, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn capacity_tracker_grows_to_double_required() {
        let mut tracker = CapacityTracker::new(4);
        assert!(tracker.fits(4));
        assert!(!tracker.fits(5));
        assert_eq!(tracker.grow_to(5), 10);
        assert!(tracker.fits(10));
        assert!(!tracker.fits(11));
    }

    #[test]
    fn capacity_tracker_never_shrinks_on_fit() {
        let tracker = CapacityTracker::new(100);
        assert!(tracker.fits(1));
        assert_eq!(tracker.capacity(), 100);
    }

    #[test]
    fn light_rig_orbits_in_xz_plane() {
        let mut light = LightRig::new();
        light.advance();
        let [x, y, z, w] = light.direction();
        assert_eq!(y, 0.0);
        assert_eq!(w, 0.0);
        assert!((x - 0.002f32.cos()).abs() < 1e-6);
        assert!((z - 0.002f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn light_rig_holds_direction_while_stopped() {
        let mut light = LightRig::new();
        light.toggle_spin();
        light.set_direction([0.0, -1.0, 0.0, 0.0]);
        light.advance();
        assert_eq!(light.direction(), [0.0, -1.0, 0.0, 0.0]);
    }
}
