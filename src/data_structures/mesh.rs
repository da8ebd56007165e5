//! CPU-side mesh data.
//!
//! A mesh is four index-aligned vertex streams (positions, normals, colors,
//! UVs) plus a triangle-list index array. Positions, normals and colors are
//! stored as float quadruples so every mesh shares one GPU vertex layout;
//! UVs are float pairs and default to zero when a mesh has none.

use anyhow::{Result, bail};

/// Per-mesh vertex and index arrays, validated on construction.
///
/// Invariants held for the lifetime of the value:
/// - `positions`, `normals` and `colors` have the same length (in quadruple
///   units), `uvs` matches it in pair units
/// - every index is `< positions.len()` and indices form whole triangles
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 4]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Builds a mesh after checking the stream invariants. A missing UV
    /// stream is zero-filled so the vertex-layout stride stays uniform
    /// across meshes.
    pub fn new(
        positions: Vec<[f32; 4]>,
        normals: Vec<[f32; 4]>,
        colors: Vec<[f32; 4]>,
        uvs: Option<Vec<[f32; 2]>>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let n = positions.len();
        if normals.len() != n || colors.len() != n {
            bail!(
                "mesh stream length mismatch: {} positions, {} normals, {} colors",
                n,
                normals.len(),
                colors.len()
            );
        }
        let uvs = match uvs {
            Some(uvs) => {
                if uvs.len() != n {
                    bail!("mesh has {} uvs for {} vertices", uvs.len(), n);
                }
                uvs
            }
            None => vec![[0.0, 0.0]; n],
        };
        if indices.len() % 3 != 0 {
            bail!("index count {} is not a whole number of triangles", indices.len());
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= n) {
            bail!("index {bad} out of range for {n} vertices");
        }
        Ok(Self {
            positions,
            normals,
            colors,
            uvs,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Unit quad in the XY plane, two triangles over four vertices.
    pub fn unit_quad() -> Self {
        let positions = vec![
            [0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0, 1.0],
        ];
        let normals = vec![[0.0, 0.0, 1.0, 0.0]; 4];
        let colors = vec![[1.0, 1.0, 1.0, 1.0]; 4];
        let indices = vec![0, 1, 2, 3, 2, 1];
        Self::new(positions, normals, colors, None, indices)
            .expect("unit quad streams are well formed")
    }

    /// UV sphere with `stacks` latitude bands and `slices` longitude bands.
    ///
    /// Vertices are white so a bound texture keeps its own colors; UVs map
    /// longitude to u and latitude to v.
    pub fn uv_sphere(radius: f32, stacks: u32, slices: u32) -> Self {
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut colors = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();

        for stack in 0..=stacks {
            let theta = std::f32::consts::PI * stack as f32 / stacks as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for slice in 0..=slices {
                let phi = 2.0 * std::f32::consts::PI * slice as f32 / slices as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();

                // Unit-sphere point doubles as the normal.
                let x = sin_theta * cos_phi;
                let y = cos_theta;
                let z = sin_theta * sin_phi;

                positions.push([radius * x, radius * y, radius * z, 1.0]);
                normals.push([x, y, z, 0.0]);
                colors.push([1.0, 1.0, 1.0, 1.0]);
                uvs.push([
                    phi / (2.0 * std::f32::consts::PI),
                    1.0 - theta / std::f32::consts::PI,
                ]);
            }
        }

        let stride = slices + 1;
        for stack in 0..stacks {
            for slice in 0..slices {
                let first = stack * stride + slice;
                let second = first + stride;
                indices.extend_from_slice(&[first, second, first + 1]);
                indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }

        Self::new(positions, normals, colors, Some(uvs), indices)
            .expect("generated sphere streams are well formed")
    }
}
