//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena of nodes addressed by [`NodeIndex`]. Each node
//! stores a local model matrix and reaches its children through
//! first-child/next-sibling links, so inserting a child or a sibling is O(1)
//! and there are no ownership cycles. Traversal is depth-first, child before
//! sibling: a child composes with its parent's accumulated world transform,
//! a sibling receives the same parent transform its predecessor received.
//!
//! The hierarchy must be a tree. The graph performs no cycle detection; a
//! child/sibling assignment that makes a node reachable from itself leaves
//! traversal non-terminating. That is a caller contract, not a guarded
//! condition.

use wgpu::util::DeviceExt;

use crate::renderer::NodeUniform;
use crate::transform::Mat4;

use super::mesh::MeshBuffers;

/// Handle to a node inside a [`SceneGraph`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeIndex(usize);

/// A single node: local transform, tree links and a caller-chosen payload
/// (GPU resources for rendering, plain mesh data in tests).
#[derive(Debug)]
pub struct SceneNode<T> {
    pub local: Mat4,
    pub first_child: Option<NodeIndex>,
    pub next_sibling: Option<NodeIndex>,
    pub data: T,
}

/// Arena of scene nodes forming one or more trees.
#[derive(Debug, Default)]
pub struct SceneGraph<T> {
    nodes: Vec<SceneNode<T>>,
}

impl<T> SceneGraph<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds an unlinked node and returns its handle.
    pub fn insert(&mut self, local: Mat4, data: T) -> NodeIndex {
        self.nodes.push(SceneNode {
            local,
            first_child: None,
            next_sibling: None,
            data,
        });
        NodeIndex(self.nodes.len() - 1)
    }

    /// Links `child` under `parent`, appending to the end of the existing
    /// child chain so traversal visits children in insertion order.
    pub fn add_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        match self.nodes[parent.0].first_child {
            None => self.nodes[parent.0].first_child = Some(child),
            Some(first) => self.add_sibling(first, child),
        }
    }

    /// Links `sibling` at the end of `node`'s sibling chain. Siblings are
    /// peers: they share `node`'s parent frame and do not inherit each
    /// other's local transforms.
    pub fn add_sibling(&mut self, node: NodeIndex, sibling: NodeIndex) {
        let mut cursor = node;
        while let Some(next) = self.nodes[cursor.0].next_sibling {
            cursor = next;
        }
        self.nodes[cursor.0].next_sibling = Some(sibling);
    }

    /// Replaces a node's local model matrix. Pure assignment; the GPU sees
    /// the new transform on the next traversal.
    pub fn set_local(&mut self, node: NodeIndex, local: Mat4) {
        self.nodes[node.0].local = local;
    }

    pub fn local(&self, node: NodeIndex) -> Mat4 {
        self.nodes[node.0].local
    }

    pub fn get(&self, node: NodeIndex) -> &SceneNode<T> {
        &self.nodes[node.0]
    }

    pub fn get_mut(&mut self, node: NodeIndex) -> &mut SceneNode<T> {
        &mut self.nodes[node.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first traversal from `root`, child before sibling, composing
    /// world transforms on the way down.
    ///
    /// For every visited node the visitor receives the node handle, the
    /// composed world matrix `parent_world * local` and the node payload. A
    /// child recursion continues with the composed matrix; a sibling
    /// continues with the same `parent_world` this node received.
    ///
    /// Uses an explicit stack, so hierarchy depth is bounded by memory
    /// rather than the call stack.
    pub fn traverse<F>(&self, root: NodeIndex, parent_world: &Mat4, mut visit: F)
    where
        F: FnMut(NodeIndex, &Mat4, &T),
    {
        let mut stack = vec![(root, *parent_world)];
        while let Some((idx, parent)) = stack.pop() {
            let node = &self.nodes[idx.0];
            let world = parent * node.local;
            visit(idx, &world, &node.data);
            // Sibling first so the LIFO pops the child chain before it.
            if let Some(sibling) = node.next_sibling {
                stack.push((sibling, parent));
            }
            if let Some(child) = node.first_child {
                stack.push((child, world));
            }
        }
    }
}

/// GPU-resident mesh payload for a scene node.
///
/// Owns device-side copies of the node's vertex/index streams, a fixed-size
/// uniform buffer for the per-node matrix and lighting block, and the bind
/// group tying the uniform buffer to the node's sampler/texture. Everything
/// is allocated and uploaded eagerly at construction and never resized; the
/// only per-frame mutation is the uniform-buffer rewrite during traversal.
#[derive(Debug)]
pub struct MeshNode {
    pub mesh: MeshBuffers,
    pub position_buffer: wgpu::Buffer,
    pub color_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub uv_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub num_indices: u32,
}

impl MeshNode {
    /// Uploads `mesh` to the device and binds it to `texture_view` through
    /// `layout`. The mesh is immutable for the node's lifetime.
    pub fn new(
        device: &wgpu::Device,
        mesh: MeshBuffers,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        texture_view: &wgpu::TextureView,
        label: &str,
    ) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Position Buffer")),
            contents: bytemuck::cast_slice(&mesh.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Color Buffer")),
            contents: bytemuck::cast_slice(&mesh.colors),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Normal Buffer")),
            contents: bytemuck::cast_slice(&mesh.normals),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uv_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} UV Buffer")),
            contents: bytemuck::cast_slice(&mesh.uvs),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniform Buffer")),
            size: std::mem::size_of::<NodeUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
            ],
            label: Some(&format!("{label} Bind Group")),
        });
        let num_indices = mesh.index_count() as u32;

        Self {
            mesh,
            position_buffer,
            color_buffer,
            normal_buffer,
            uv_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            num_indices,
        }
    }
}
